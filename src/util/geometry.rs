// Copyright (c) 2025, Jason Jenkins
// SPDX-License-Identifier: BSD-3-Clause

//! Geometric utility functions.
//!
//! This module maps between screen coordinates of the canvas widget and
//! image pixel coordinates used by the editor.

use crate::models::annotation::Point;

/// Placement of an image inside the canvas: uniform scale plus offset.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ViewTransform {
    /// Screen position of the image's top-left pixel.
    pub origin: (f32, f32),
    /// Screen pixels per image pixel.
    pub scale: f32,
}

impl ViewTransform {
    /// Fit an image into the available area, preserving aspect ratio and
    /// centering it. Images are never scaled up.
    pub fn fit(image_size: (u32, u32), area_min: (f32, f32), area_size: (f32, f32)) -> Self {
        let (w, h) = (image_size.0.max(1) as f32, image_size.1.max(1) as f32);
        let scale = (area_size.0 / w).min(area_size.1 / h).min(1.0).max(f32::EPSILON);
        let x_offset = (area_size.0 - w * scale) / 2.0;
        let y_offset = (area_size.1 - h * scale) / 2.0;
        Self {
            origin: (area_min.0 + x_offset, area_min.1 + y_offset),
            scale,
        }
    }

    /// Convert screen coordinates to image pixel coordinates.
    pub fn to_image(&self, screen_x: f32, screen_y: f32) -> Point {
        Point {
            x: ((screen_x - self.origin.0) / self.scale) as f64,
            y: ((screen_y - self.origin.1) / self.scale) as f64,
        }
    }

    /// Convert image pixel coordinates to screen coordinates.
    pub fn to_screen(&self, x: f64, y: f64) -> (f32, f32) {
        (
            self.origin.0 + x as f32 * self.scale,
            self.origin.1 + y as f32 * self.scale,
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_screen_image_roundtrip() {
        let view = ViewTransform::fit((1920, 1080), (100.0, 50.0), (960.0, 720.0));
        let (sx, sy) = view.to_screen(960.0, 540.0);
        let p = view.to_image(sx, sy);

        assert!((p.x - 960.0).abs() < 0.01);
        assert!((p.y - 540.0).abs() < 0.01);
    }

    #[test]
    fn test_fit_wide_image_is_centered_vertically() {
        let view = ViewTransform::fit((1920, 1080), (0.0, 0.0), (960.0, 720.0));
        assert_eq!(view.scale, 0.5);
        assert_eq!(view.origin, (0.0, 90.0));

        // Top-left and bottom-right corners
        assert_eq!(view.to_screen(0.0, 0.0), (0.0, 90.0));
        assert_eq!(view.to_screen(1920.0, 1080.0), (960.0, 630.0));
    }

    #[test]
    fn test_small_image_is_not_upscaled() {
        let view = ViewTransform::fit((100, 50), (0.0, 0.0), (400.0, 300.0));
        assert_eq!(view.scale, 1.0);
        assert_eq!(view.origin, (150.0, 125.0));
    }
}
