// Copyright (c) 2025, Jason Jenkins
// SPDX-License-Identifier: BSD-3-Clause

//! Annotation display style.
//!
//! The style is a global display preference shared by every box. Its JSON
//! form is what gets persisted in the preference store.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// An opaque RGB color, serialized as `#RRGGBB`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct Color {
    pub r: u8,
    pub g: u8,
    pub b: u8,
}

impl Color {
    pub const RED: Color = Color::rgb(0xFF, 0x00, 0x00);
    pub const BLUE: Color = Color::rgb(0x00, 0x00, 0xFF);
    pub const GREEN: Color = Color::rgb(0x00, 0xFF, 0x00);
    pub const YELLOW: Color = Color::rgb(0xFF, 0xFF, 0x00);
    pub const PURPLE: Color = Color::rgb(0x80, 0x00, 0x80);
    /// Highlight used for the selected box and its handles.
    pub const GOLD: Color = Color::rgb(0xFF, 0xD7, 0x00);

    pub const fn rgb(r: u8, g: u8, b: u8) -> Self {
        Self { r, g, b }
    }

    pub fn to_rgba(self) -> [u8; 4] {
        [self.r, self.g, self.b, 0xFF]
    }
}

impl fmt::Display for Color {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{:02X}{:02X}{:02X}", self.r, self.g, self.b)
    }
}

impl FromStr for Color {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let hex = s
            .strip_prefix('#')
            .ok_or_else(|| format!("color must start with '#': {s}"))?;
        if hex.len() != 6 || !hex.is_ascii() {
            return Err(format!("expected #RRGGBB, got {s}"));
        }
        let channel = |i: usize| {
            u8::from_str_radix(&hex[i..i + 2], 16).map_err(|e| format!("bad color {s}: {e}"))
        };
        Ok(Color::rgb(channel(0)?, channel(2)?, channel(4)?))
    }
}

impl TryFrom<String> for Color {
    type Error = String;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

impl From<Color> for String {
    fn from(color: Color) -> Self {
        color.to_string()
    }
}

/// Stroke pattern for box outlines.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LineStyle {
    #[default]
    Solid,
    Dashed,
    Dotted,
}

impl LineStyle {
    pub const ALL: [LineStyle; 3] = [LineStyle::Solid, LineStyle::Dashed, LineStyle::Dotted];

    /// Dash and gap lengths, or `None` for a continuous line.
    pub fn dash_pattern(self) -> Option<(f32, f32)> {
        match self {
            LineStyle::Solid => None,
            LineStyle::Dashed => Some((5.0, 5.0)),
            LineStyle::Dotted => Some((2.0, 2.0)),
        }
    }

    pub fn name(self) -> &'static str {
        match self {
            LineStyle::Solid => "Solid",
            LineStyle::Dashed => "Dashed",
            LineStyle::Dotted => "Dotted",
        }
    }
}

/// How box labels are chosen.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LabelStyle {
    /// `Box N`, with N the 1-based position in the list.
    #[default]
    Number,
    /// The box's own label when it has one, numbered otherwise.
    Custom,
}

/// Global annotation display preference.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AnnotationStyle {
    pub color: Color,
    pub line_width: u32,
    pub line_style: LineStyle,
    pub label_style: LabelStyle,
}

impl Default for AnnotationStyle {
    fn default() -> Self {
        Self {
            color: Color::RED,
            line_width: 2,
            line_style: LineStyle::Solid,
            label_style: LabelStyle::Number,
        }
    }
}

/// Named colors offered in the style picker.
pub const PALETTE: [(&str, Color); 5] = [
    ("Red", Color::RED),
    ("Blue", Color::BLUE),
    ("Green", Color::GREEN),
    ("Yellow", Color::YELLOW),
    ("Purple", Color::PURPLE),
];

/// Line widths offered in the style picker.
pub const LINE_WIDTHS: [u32; 5] = [1, 2, 3, 4, 5];

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_style_json() {
        let json = serde_json::to_string(&AnnotationStyle::default()).unwrap();
        assert_eq!(
            json,
            r##"{"color":"#FF0000","lineWidth":2,"lineStyle":"solid","labelStyle":"number"}"##
        );
    }

    #[test]
    fn test_parse_stored_style() {
        let style: AnnotationStyle = serde_json::from_str(
            r##"{"color":"#800080","lineWidth":4,"lineStyle":"dotted","labelStyle":"custom"}"##,
        )
        .unwrap();
        assert_eq!(style.color, Color::PURPLE);
        assert_eq!(style.line_width, 4);
        assert_eq!(style.line_style.dash_pattern(), Some((2.0, 2.0)));
        assert_eq!(style.label_style, LabelStyle::Custom);
    }

    #[test]
    fn test_color_parsing() {
        assert_eq!("#ffd700".parse::<Color>(), Ok(Color::GOLD));
        assert!("FF0000".parse::<Color>().is_err());
        assert!("#FF00".parse::<Color>().is_err());
        assert!("#GG0000".parse::<Color>().is_err());
    }
}
