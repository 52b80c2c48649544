// Copyright (c) 2025, Jason Jenkins
// SPDX-License-Identifier: BSD-3-Clause

//! Scene rendering.
//!
//! [`render`] turns the editor state into a flat list of draw commands in
//! image pixel coordinates. The egui canvas paints that list on screen and
//! [`raster`] paints it into an offscreen image for export, so both outputs
//! come from the same description.

pub mod font;
pub mod raster;

use crate::models::{
    annotation::{BoundingBox, Corner, HANDLE_SIZE},
    style::{AnnotationStyle, Color, LabelStyle},
};

/// Stroke color of a box being drawn.
pub const PENDING_COLOR: Color = Color::BLUE;
/// Stroke width of a box being drawn.
pub const PENDING_WIDTH: f32 = 2.0;
/// Label font size in pixels.
pub const LABEL_SIZE: f32 = 12.0;
/// Gap between a box's stored origin and its label baseline.
pub const LABEL_OFFSET: f64 = 5.0;

/// Axis-aligned rectangle with non-negative extent.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Rect {
    pub x: f64,
    pub y: f64,
    pub width: f64,
    pub height: f64,
}

impl From<&BoundingBox> for Rect {
    fn from(b: &BoundingBox) -> Self {
        let n = b.normalized();
        Rect {
            x: n.x,
            y: n.y,
            width: n.width,
            height: n.height,
        }
    }
}

/// One drawing primitive.
#[derive(Debug, Clone, PartialEq)]
pub enum DrawCommand {
    /// The source image, at the origin, unscaled.
    Image { width: u32, height: u32 },
    StrokeRect {
        rect: Rect,
        color: Color,
        width: f32,
        /// Dash and gap lengths; `None` is a solid line.
        dash: Option<(f32, f32)>,
    },
    FillRect { rect: Rect, color: Color },
    /// Text whose baseline starts at (`x`, `y`).
    Text {
        x: f64,
        y: f64,
        text: String,
        color: Color,
        size: f32,
    },
}

/// Everything a frame depends on.
#[derive(Debug, Clone, Copy)]
pub struct Scene<'a> {
    pub image_size: Option<(u32, u32)>,
    pub boxes: &'a [BoundingBox],
    pub selected: Option<usize>,
    pub pending: Option<&'a BoundingBox>,
    pub style: &'a AnnotationStyle,
}

/// Text drawn above the box at `index`.
pub fn label_text(b: &BoundingBox, index: usize, style: &AnnotationStyle) -> String {
    match (&b.label, style.label_style) {
        (Some(label), LabelStyle::Custom) => label.clone(),
        _ => format!("Box {}", index + 1),
    }
}

/// Produce the draw commands for a scene.
pub fn render(scene: &Scene<'_>) -> Vec<DrawCommand> {
    let mut commands = Vec::with_capacity(scene.boxes.len() * 3 + 2);
    let style = scene.style;

    if let Some((width, height)) = scene.image_size {
        commands.push(DrawCommand::Image { width, height });
    }

    for (index, b) in scene.boxes.iter().enumerate() {
        let selected = scene.selected == Some(index);
        let color = if selected { Color::GOLD } else { style.color };
        let rect = Rect::from(b);

        commands.push(DrawCommand::StrokeRect {
            rect,
            color,
            width: style.line_width as f32,
            dash: style.line_style.dash_pattern(),
        });

        if selected {
            let half = HANDLE_SIZE / 2.0;
            for corner in Corner::ALL {
                let c = b.corner(corner);
                commands.push(DrawCommand::FillRect {
                    rect: Rect {
                        x: c.x - half,
                        y: c.y - half,
                        width: HANDLE_SIZE,
                        height: HANDLE_SIZE,
                    },
                    color: Color::GOLD,
                });
            }
        }

        commands.push(DrawCommand::Text {
            x: b.x,
            y: b.y - LABEL_OFFSET,
            text: label_text(b, index, style),
            color,
            size: LABEL_SIZE,
        });
    }

    if let Some(pending) = scene.pending {
        commands.push(DrawCommand::StrokeRect {
            rect: Rect::from(pending),
            color: PENDING_COLOR,
            width: PENDING_WIDTH,
            dash: None,
        });
    }

    commands
}
