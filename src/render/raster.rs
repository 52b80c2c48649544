// Copyright (c) 2025, Jason Jenkins
// SPDX-License-Identifier: BSD-3-Clause

//! Offscreen compositing of draw commands and PNG snapshot export.

use super::{font, render, DrawCommand, Rect, Scene};
use crate::models::{annotation::BoundingBox, style::AnnotationStyle, style::Color};
use anyhow::{Context, Result};
use image::{ImageFormat, Rgba, RgbaImage};
use imageproc::drawing::draw_filled_rect_mut;
use imageproc::rect::Rect as ProcRect;
use std::io::Cursor;

/// Paint `commands` onto a canvas the size of `source`.
///
/// The canvas starts transparent; an `Image` command copies `source` in.
/// Everything is clipped to the canvas.
pub fn rasterize(source: &RgbaImage, commands: &[DrawCommand]) -> RgbaImage {
    let mut canvas = RgbaImage::new(source.width(), source.height());

    for command in commands {
        match command {
            DrawCommand::Image { .. } => image::imageops::replace(&mut canvas, source, 0, 0),
            DrawCommand::StrokeRect {
                rect,
                color,
                width,
                dash,
            } => stroke_rect(&mut canvas, rect, *color, *width, *dash),
            DrawCommand::FillRect { rect, color } => fill_rect(&mut canvas, rect, *color),
            DrawCommand::Text {
                x,
                y,
                text,
                color,
                size,
            } => draw_text(&mut canvas, *x, *y, text, *color, *size),
        }
    }

    canvas
}

/// Composite the image with every box and label (no selection highlight)
/// and encode the result as PNG.
pub fn export_png(
    source: &RgbaImage,
    boxes: &[BoundingBox],
    style: &AnnotationStyle,
) -> Result<Vec<u8>> {
    let scene = Scene {
        image_size: Some((source.width(), source.height())),
        boxes,
        selected: None,
        pending: None,
        style,
    };
    let canvas = rasterize(source, &render(&scene));

    let mut bytes = Cursor::new(Vec::new());
    canvas
        .write_to(&mut bytes, ImageFormat::Png)
        .context("Failed to encode snapshot")?;
    Ok(bytes.into_inner())
}

fn to_pixel(color: Color) -> Rgba<u8> {
    Rgba(color.to_rgba())
}

/// Fill the pixel block `x0..=x1`, `y0..=y1`; imageproc clips it to the canvas.
fn fill_block(canvas: &mut RgbaImage, x0: i64, y0: i64, x1: i64, y1: i64, px: Rgba<u8>) {
    let (left, right) = (x0.min(x1), x0.max(x1));
    let (top, bottom) = (y0.min(y1), y0.max(y1));
    let width = (right - left + 1).clamp(1, u32::MAX as i64) as u32;
    let height = (bottom - top + 1).clamp(1, u32::MAX as i64) as u32;
    let block = ProcRect::at(clamp_i32(left), clamp_i32(top)).of_size(width, height);
    draw_filled_rect_mut(canvas, block, px);
}

fn clamp_i32(v: i64) -> i32 {
    v.clamp(i32::MIN as i64, i32::MAX as i64) as i32
}

fn fill_rect(canvas: &mut RgbaImage, rect: &Rect, color: Color) {
    let x0 = rect.x.floor() as i64;
    let y0 = rect.y.floor() as i64;
    let x1 = (rect.x + rect.width).ceil() as i64;
    let y1 = (rect.y + rect.height).ceil() as i64;
    if x1 > x0 && y1 > y0 {
        fill_block(canvas, x0, y0, x1 - 1, y1 - 1, to_pixel(color));
    }
}

/// Stroke the outline clockwise from the top-left corner. The dash phase
/// carries over from one edge to the next.
///
/// Every edge is axis-aligned, so each visible dash is a filled block
/// `thickness` pixels across.
fn stroke_rect(canvas: &mut RgbaImage, rect: &Rect, color: Color, width: f32, dash: Option<(f32, f32)>) {
    if rect.width == 0.0 && rect.height == 0.0 {
        return;
    }

    let (l, t) = (rect.x, rect.y);
    let (r, b) = (rect.x + rect.width, rect.y + rect.height);
    let path = [(l, t), (r, t), (r, b), (l, b), (l, t)];

    let px = to_pixel(color);
    let thickness = width.max(1.0).round() as i64;
    let lo = -(thickness / 2);
    let hi = lo + thickness - 1;

    let dash = dash
        .map(|(on, off)| (on as f64, off as f64))
        .filter(|&(on, off)| on > 0.0 && on + off > 0.0);

    let mut travelled = 0.0_f64;
    for segment in path.windows(2) {
        let (x0, y0) = segment[0];
        let (x1, y1) = segment[1];
        let len = (x1 - x0).abs() + (y1 - y0).abs();

        for (a, b, cut) in dash_pieces(travelled, len, dash) {
            // A piece cut short by a gap stops just before the gap starts.
            let b = if cut { (b - 1e-6).max(a) } else { b };
            let point = |d: f64| {
                let t = if len > 0.0 { d / len } else { 0.0 };
                (
                    (x0 + (x1 - x0) * t).floor() as i64,
                    (y0 + (y1 - y0) * t).floor() as i64,
                )
            };
            let (ax, ay) = point(a);
            let (bx, by) = point(b);
            fill_block(canvas, ax.min(bx) + lo, ay.min(by) + lo, ax.max(bx) + hi, ay.max(by) + hi, px);
        }
        travelled += len;
    }
}

/// Visible stretches of an edge, as offsets `(start, end, cut)` from the
/// edge's first point. `cut` is set when the stretch ends at a gap rather
/// than at the end of the edge.
fn dash_pieces(travelled: f64, len: f64, dash: Option<(f64, f64)>) -> Vec<(f64, f64, bool)> {
    let Some((on, off)) = dash else {
        return vec![(0.0, len, false)];
    };

    let period = on + off;
    let mut pieces = Vec::new();
    let mut pos = 0.0;
    while pos < len {
        let phase = (travelled + pos) % period;
        if phase < on {
            let end = pos + (on - phase);
            if end < len {
                pieces.push((pos, end, true));
            } else {
                pieces.push((pos, len, false));
            }
            pos = end;
        } else {
            pos += period - phase;
        }
    }
    pieces
}

fn draw_text(canvas: &mut RgbaImage, x: f64, baseline: f64, text: &str, color: Color, size: f32) {
    let px = to_pixel(color);
    let scale = font::scale_for(size) as i64;
    let top = baseline.round() as i64 - font::GLYPH_HEIGHT as i64 * scale;
    let mut left = x.round() as i64;

    for c in text.chars() {
        for (row, bits) in font::glyph(c).iter().enumerate() {
            for col in 0..font::GLYPH_WIDTH as i64 {
                if bits & (0x10 >> col) == 0 {
                    continue;
                }
                let gx = left + col * scale;
                let gy = top + row as i64 * scale;
                fill_block(canvas, gx, gy, gx + scale - 1, gy + scale - 1, px);
            }
        }
        left += font::ADVANCE as i64 * scale;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::style::LineStyle;

    const GREY: Rgba<u8> = Rgba([128, 128, 128, 255]);

    fn source() -> RgbaImage {
        RgbaImage::from_pixel(100, 80, GREY)
    }

    fn stroke(rect: Rect, width: f32, dash: Option<(f32, f32)>) -> RgbaImage {
        rasterize(
            &source(),
            &[
                DrawCommand::Image { width: 100, height: 80 },
                DrawCommand::StrokeRect {
                    rect,
                    color: Color::RED,
                    width,
                    dash,
                },
            ],
        )
    }

    const RED: Rgba<u8> = Rgba([255, 0, 0, 255]);

    #[test]
    fn test_image_command_copies_source() {
        let canvas = rasterize(&source(), &[DrawCommand::Image { width: 100, height: 80 }]);
        assert_eq!(canvas.get_pixel(50, 40), &GREY);

        let blank = rasterize(&source(), &[]);
        assert_eq!(blank.get_pixel(50, 40), &Rgba([0, 0, 0, 0]));
    }

    #[test]
    fn test_solid_stroke_outlines_only() {
        let canvas = stroke(
            Rect { x: 10.0, y: 10.0, width: 20.0, height: 20.0 },
            1.0,
            None,
        );
        assert_eq!(canvas.get_pixel(10, 10), &RED);
        assert_eq!(canvas.get_pixel(20, 10), &RED);
        assert_eq!(canvas.get_pixel(30, 20), &RED);
        assert_eq!(canvas.get_pixel(20, 30), &RED);
        assert_eq!(canvas.get_pixel(20, 20), &GREY);
    }

    #[test]
    fn test_dashed_stroke_has_gaps() {
        let canvas = stroke(
            Rect { x: 10.0, y: 10.0, width: 40.0, height: 20.0 },
            1.0,
            LineStyle::Dashed.dash_pattern(),
        );
        // First dash covers 0..5 along the top edge, then a 5px gap.
        assert_eq!(canvas.get_pixel(12, 10), &RED);
        assert_eq!(canvas.get_pixel(17, 10), &GREY);
        assert_eq!(canvas.get_pixel(22, 10), &RED);
    }

    #[test]
    fn test_dash_phase_carries_across_edges() {
        // 7 along the first edge leaves 3 of a gap for the next one.
        let pieces = dash_pieces(7.0, 20.0, Some((5.0, 5.0)));
        assert_eq!(pieces, vec![(3.0, 8.0, true), (13.0, 18.0, true)]);

        assert_eq!(dash_pieces(0.0, 12.0, None), vec![(0.0, 12.0, false)]);
        assert_eq!(dash_pieces(0.0, 7.0, Some((5.0, 5.0))), vec![(0.0, 5.0, true)]);
        assert_eq!(dash_pieces(0.0, 4.0, Some((5.0, 5.0))), vec![(0.0, 4.0, false)]);
    }

    #[test]
    fn test_thick_stroke_straddles_edge() {
        let canvas = stroke(
            Rect { x: 20.0, y: 20.0, width: 40.0, height: 30.0 },
            3.0,
            None,
        );
        assert_eq!(canvas.get_pixel(40, 19), &RED);
        assert_eq!(canvas.get_pixel(40, 21), &RED);
        assert_eq!(canvas.get_pixel(40, 22), &GREY);
        assert_eq!(canvas.get_pixel(61, 35), &RED);
    }

    #[test]
    fn test_stroke_is_clipped() {
        let canvas = stroke(
            Rect { x: -10.0, y: -10.0, width: 200.0, height: 200.0 },
            3.0,
            None,
        );
        assert_eq!(canvas.dimensions(), (100, 80));
        assert_eq!(canvas.get_pixel(50, 40), &GREY);
    }

    #[test]
    fn test_label_pixels_are_drawn_above_box() {
        let canvas = rasterize(
            &source(),
            &[DrawCommand::Text {
                x: 10.0,
                y: 30.0,
                text: "1".to_string(),
                color: Color::RED,
                size: 7.0,
            }],
        );
        // '1' has its foot row fully set from column 1 to 3.
        assert_eq!(canvas.get_pixel(12, 29), &RED);
        assert_eq!(canvas.get_pixel(12, 31), &Rgba([0, 0, 0, 0]));
    }

    #[test]
    fn test_export_png_decodes_to_annotated_image() {
        let style = AnnotationStyle::default();
        let boxes = [BoundingBox::new(20.0, 30.0, 40.0, 30.0)];

        let png = export_png(&source(), &boxes, &style).unwrap();
        assert_eq!(image::guess_format(&png).unwrap(), ImageFormat::Png);

        let decoded = image::load_from_memory(&png).unwrap().to_rgba8();
        assert_eq!(decoded.dimensions(), (100, 80));
        assert_eq!(decoded.get_pixel(40, 30), &RED);
        assert_eq!(decoded.get_pixel(40, 45), &GREY);
        // Label sits above the top edge.
        let label_row = (0..100).any(|x| decoded.get_pixel(x, 24) == &RED);
        assert!(label_row);
    }
}
