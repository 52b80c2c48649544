// Copyright (c) 2025, Jason Jenkins
// SPDX-License-Identifier: BSD-3-Clause

//! Image loading.
//!
//! This module decodes image bytes fetched from the backend into RGBA
//! pixels suitable for display in egui and for compositing.

use anyhow::{Context, Result};
use image::RgbaImage;

/// Decoded image pixels.
///
/// Loaded once per image change and never mutated afterwards.
#[derive(Debug, Clone)]
pub struct LoadedImage {
    pub image: RgbaImage,
}

impl LoadedImage {
    pub fn width(&self) -> u32 {
        self.image.width()
    }

    pub fn height(&self) -> u32 {
        self.image.height()
    }

    /// Raw RGBA bytes, row major.
    pub fn pixels(&self) -> &[u8] {
        self.image.as_raw()
    }
}

/// Decode image bytes of any supported format.
pub fn decode_image(bytes: &[u8]) -> Result<LoadedImage> {
    let img = image::load_from_memory(bytes).context("Failed to decode image")?;
    Ok(LoadedImage {
        image: img.to_rgba8(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Cursor;

    #[test]
    fn test_decode_png() {
        let src = RgbaImage::from_pixel(3, 2, image::Rgba([10, 20, 30, 255]));
        let mut bytes = Cursor::new(Vec::new());
        src.write_to(&mut bytes, image::ImageFormat::Png).unwrap();

        let loaded = decode_image(bytes.get_ref()).unwrap();
        assert_eq!((loaded.width(), loaded.height()), (3, 2));
        assert_eq!(&loaded.pixels()[..4], &[10, 20, 30, 255]);
    }

    #[test]
    fn test_decode_garbage_fails() {
        assert!(decode_image(b"definitely not an image").is_err());
    }
}
