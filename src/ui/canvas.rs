// Copyright (c) 2025, Jason Jenkins
// SPDX-License-Identifier: BSD-3-Clause

//! Drawing canvas for image display and box annotation.
//!
//! This module places the open image in the available space, forwards
//! pointer events to the editor in image coordinates and paints the
//! editor's draw commands on top of the image.

use crate::editor::{Editor, HitKind};
use crate::models::annotation::Corner;
use crate::models::style::Color;
use crate::render::{self, DrawCommand, Rect};
use crate::util::geometry::ViewTransform;

/// Display the main canvas area and handle mouse interactions.
pub fn show(
    ui: &mut egui::Ui,
    editor: &mut Editor,
    image_texture: Option<&egui::TextureHandle>,
    image_size: Option<(u32, u32)>,
) {
    // Set background color
    ui.style_mut().visuals.extreme_bg_color = egui::Color32::from_gray(40);

    let available_size = ui.available_size();

    egui::Frame::canvas(ui.style()).show(ui, |ui| {
        ui.set_min_size(available_size);

        let (Some(texture), Some(size)) = (image_texture, image_size) else {
            placeholder(ui, editor.image().is_some());
            return;
        };

        let area = ui.max_rect();
        let view = ViewTransform::fit(
            size,
            (area.min.x, area.min.y),
            (area.width(), area.height()),
        );
        let (min_x, min_y) = view.to_screen(0.0, 0.0);
        let (max_x, max_y) = view.to_screen(size.0 as f64, size.1 as f64);
        let image_rect = egui::Rect::from_min_max(egui::pos2(min_x, min_y), egui::pos2(max_x, max_y));

        let response = ui.allocate_rect(image_rect, egui::Sense::click_and_drag());
        handle_pointer(ui, editor, &response, image_rect, &view);

        let painter = ui.painter_at(area);
        for command in render::render(&editor.scene(Some(size))) {
            paint(&painter, &command, texture, &view);
        }
    });
}

/// Feed this frame's pointer state to the editor.
fn handle_pointer(
    ui: &egui::Ui,
    editor: &mut Editor,
    response: &egui::Response,
    image_rect: egui::Rect,
    view: &ViewTransform,
) {
    let (pressed, released, latest) = ui.input(|i| {
        (
            i.pointer.primary_pressed(),
            i.pointer.primary_released(),
            i.pointer.latest_pos(),
        )
    });

    if let Some(pos) = latest {
        let inside = image_rect.contains(pos);
        let point = view.to_image(pos.x, pos.y);

        if pressed && inside && response.hovered() {
            editor.pointer_down(point);
        }
        if editor.is_interacting() {
            if inside {
                editor.pointer_move(point);
            } else {
                editor.pointer_leave();
            }
        } else if inside {
            let icon = match editor.hover(point) {
                Some(HitKind::Handle(Corner::TopLeft | Corner::BottomRight)) => {
                    egui::CursorIcon::ResizeNwSe
                }
                Some(HitKind::Handle(_)) => egui::CursorIcon::ResizeNeSw,
                Some(HitKind::Body) => egui::CursorIcon::Move,
                None => egui::CursorIcon::Crosshair,
            };
            ui.ctx().set_cursor_icon(icon);
        }
    }

    if released && editor.is_interacting() {
        editor.pointer_up();
    }
}

fn to_color32(color: Color) -> egui::Color32 {
    egui::Color32::from_rgb(color.r, color.g, color.b)
}

fn screen_rect(rect: &Rect, view: &ViewTransform) -> egui::Rect {
    let (x0, y0) = view.to_screen(rect.x, rect.y);
    let (x1, y1) = view.to_screen(rect.x + rect.width, rect.y + rect.height);
    egui::Rect::from_min_max(egui::pos2(x0, y0), egui::pos2(x1, y1))
}

/// Paint one draw command on the canvas.
fn paint(
    painter: &egui::Painter,
    command: &DrawCommand,
    texture: &egui::TextureHandle,
    view: &ViewTransform,
) {
    match command {
        DrawCommand::Image { width, height } => {
            let rect = screen_rect(
                &Rect {
                    x: 0.0,
                    y: 0.0,
                    width: *width as f64,
                    height: *height as f64,
                },
                view,
            );
            painter.image(
                texture.id(),
                rect,
                egui::Rect::from_min_max(egui::pos2(0.0, 0.0), egui::pos2(1.0, 1.0)),
                egui::Color32::WHITE,
            );
        }
        DrawCommand::StrokeRect {
            rect,
            color,
            width,
            dash,
        } => {
            let rect = screen_rect(rect, view);
            let stroke = egui::Stroke::new((width * view.scale).max(1.0), to_color32(*color));
            match dash {
                None => {
                    painter.rect_stroke(rect, 0.0, stroke);
                }
                Some((on, off)) => {
                    let outline = [
                        rect.left_top(),
                        rect.right_top(),
                        rect.right_bottom(),
                        rect.left_bottom(),
                        rect.left_top(),
                    ];
                    painter.extend(egui::Shape::dashed_line(
                        &outline,
                        stroke,
                        (on * view.scale).max(1.0),
                        (off * view.scale).max(1.0),
                    ));
                }
            }
        }
        DrawCommand::FillRect { rect, color } => {
            painter.rect_filled(screen_rect(rect, view), 0.0, to_color32(*color));
        }
        DrawCommand::Text {
            x,
            y,
            text,
            color,
            size,
        } => {
            let (sx, sy) = view.to_screen(*x, *y);
            painter.text(
                egui::pos2(sx, sy),
                egui::Align2::LEFT_BOTTOM,
                text,
                egui::FontId::proportional((size * view.scale).max(8.0)),
                to_color32(*color),
            );
        }
    }
}

fn placeholder(ui: &mut egui::Ui, image_open: bool) {
    if image_open {
        ui.centered_and_justified(|ui| {
            ui.label(egui::RichText::new("Loading image...").color(egui::Color32::WHITE));
        });
        return;
    }

    // Show welcome message when nothing is open
    ui.centered_and_justified(|ui| {
        ui.vertical_centered(|ui| {
            ui.add_space(20.0);
            ui.heading(
                egui::RichText::new("Annotate")
                    .size(32.0)
                    .color(egui::Color32::from_gray(200)),
            );
            ui.label(
                egui::RichText::new("Bounding box annotation")
                    .size(14.0)
                    .color(egui::Color32::from_gray(150)),
            );
            ui.add_space(20.0);
            ui.label(
                egui::RichText::new("Upload or pick an image to begin annotating")
                    .color(egui::Color32::from_gray(180)),
            );
            ui.add_space(10.0);
            ui.label(
                egui::RichText::new("File → Upload Images...")
                    .weak()
                    .color(egui::Color32::from_gray(130)),
            );
        });
    });
}
