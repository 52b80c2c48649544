// Copyright (c) 2025, Jason Jenkins
// SPDX-License-Identifier: BSD-3-Clause

//! Annotation data structures.
//!
//! This module defines the bounding box annotation and the geometry the
//! editor needs on it: normalization, containment and corner handles.

use serde::{Deserialize, Serialize};

/// Side length of the square hit region around each corner, in image pixels.
pub const HANDLE_SIZE: f64 = 6.0;

/// A 2D point in image pixel coordinates (top-left origin).
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Point {
    pub x: f64,
    pub y: f64,
}

impl Point {
    /// Create a new point.
    pub fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }
}

/// One of the four corners of a bounding box.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Corner {
    TopLeft,
    TopRight,
    BottomLeft,
    BottomRight,
}

impl Corner {
    /// Corners in the order they are probed during hit-testing.
    pub const ALL: [Corner; 4] = [
        Corner::TopLeft,
        Corner::TopRight,
        Corner::BottomLeft,
        Corner::BottomRight,
    ];
}

/// An axis-aligned rectangle annotation with an optional text label.
///
/// Width and height are non-negative once [`BoundingBox::normalized`] has been
/// applied. Resizing can leave them negative; such a box has no body to grab
/// until it is normalized, only its corner handles.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BoundingBox {
    pub x: f64,
    pub y: f64,
    pub width: f64,
    pub height: f64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub label: Option<String>,
}

impl BoundingBox {
    /// Create an unlabeled box.
    pub fn new(x: f64, y: f64, width: f64, height: f64) -> Self {
        Self {
            x,
            y,
            width,
            height,
            label: None,
        }
    }

    /// Attach a label.
    #[cfg(test)]
    pub fn with_label(mut self, label: impl Into<String>) -> Self {
        self.label = Some(label.into());
        self
    }

    /// Flip the origin of a negative-extent box so width and height become
    /// non-negative.
    pub fn normalized(&self) -> Self {
        Self {
            x: if self.width < 0.0 { self.x + self.width } else { self.x },
            y: if self.height < 0.0 { self.y + self.height } else { self.y },
            width: self.width.abs(),
            height: self.height.abs(),
            label: self.label.clone(),
        }
    }

    /// Whether the point lies inside the stored `x..=x+width`,
    /// `y..=y+height` span. Always false along a negative axis.
    pub fn contains(&self, point: Point) -> bool {
        point.x >= self.x
            && point.x <= self.x + self.width
            && point.y >= self.y
            && point.y <= self.y + self.height
    }

    /// Position of a corner as stored (not normalized).
    pub fn corner(&self, corner: Corner) -> Point {
        match corner {
            Corner::TopLeft => Point::new(self.x, self.y),
            Corner::TopRight => Point::new(self.x + self.width, self.y),
            Corner::BottomLeft => Point::new(self.x, self.y + self.height),
            Corner::BottomRight => Point::new(self.x + self.width, self.y + self.height),
        }
    }

    /// The first corner whose handle region contains the point.
    pub fn handle_at(&self, point: Point) -> Option<Corner> {
        let half = HANDLE_SIZE / 2.0;
        Corner::ALL.into_iter().find(|&corner| {
            let c = self.corner(corner);
            (point.x - c.x).abs() <= half && (point.y - c.y).abs() <= half
        })
    }

    /// Shift the box by a delta.
    pub fn translate(&mut self, dx: f64, dy: f64) {
        self.x += dx;
        self.y += dy;
    }

    /// Grow or shrink the box from its far corner; the origin stays put.
    pub fn resize_by(&mut self, dw: f64, dh: f64) {
        self.width += dw;
        self.height += dh;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_normalize_flips_negative_extent() {
        let b = BoundingBox::new(10.0, 10.0, -5.0, -5.0).normalized();
        assert_eq!(b, BoundingBox::new(5.0, 5.0, 5.0, 5.0));
    }

    #[test]
    fn test_normalize_keeps_label() {
        let b = BoundingBox::new(0.0, 20.0, 4.0, -8.0)
            .with_label("cat")
            .normalized();
        assert_eq!(b.y, 12.0);
        assert_eq!(b.height, 8.0);
        assert_eq!(b.label.as_deref(), Some("cat"));
    }

    #[test]
    fn test_contains_edges_and_negative_boxes() {
        let b = BoundingBox::new(0.0, 0.0, 10.0, 10.0);
        assert!(b.contains(Point::new(0.0, 0.0)));
        assert!(b.contains(Point::new(10.0, 10.0)));
        assert!(!b.contains(Point::new(10.1, 5.0)));

        // Dragged past its origin: the body is no longer hit, the handles are.
        let flipped = BoundingBox::new(10.0, 10.0, -10.0, -10.0);
        assert!(!flipped.contains(Point::new(5.0, 5.0)));
        assert!(flipped.normalized().contains(Point::new(5.0, 5.0)));
        assert_eq!(flipped.handle_at(Point::new(1.0, 1.0)), Some(Corner::BottomRight));

        let flat = BoundingBox::new(0.0, 0.0, 10.0, -4.0);
        assert!(!flat.contains(Point::new(5.0, -2.0)));
    }

    #[test]
    fn test_handle_hit_region() {
        let b = BoundingBox::new(20.0, 20.0, 40.0, 30.0);
        assert_eq!(b.handle_at(Point::new(22.0, 18.0)), Some(Corner::TopLeft));
        assert_eq!(b.handle_at(Point::new(60.0, 50.0)), Some(Corner::BottomRight));
        assert_eq!(b.handle_at(Point::new(63.0, 53.0)), Some(Corner::BottomRight));
        assert_eq!(b.handle_at(Point::new(64.0, 50.0)), None);
        assert_eq!(b.handle_at(Point::new(40.0, 35.0)), None);
    }

    #[test]
    fn test_label_is_omitted_when_absent() {
        let json = serde_json::to_string(&BoundingBox::new(1.0, 2.0, 3.0, 4.0)).unwrap();
        assert_eq!(json, r#"{"x":1.0,"y":2.0,"width":3.0,"height":4.0}"#);

        let parsed: BoundingBox =
            serde_json::from_str(r#"{"_id":"abc","x":1,"y":2,"width":3,"height":4,"label":"dog"}"#)
                .unwrap();
        assert_eq!(parsed.label.as_deref(), Some("dog"));
    }
}
