// Copyright (c) 2025, Jason Jenkins
// SPDX-License-Identifier: BSD-3-Clause

//! Image records as stored by the backend.
//!
//! An image record carries the server path of the pixel data and the ordered
//! list of bounding boxes attached to it.

use super::annotation::BoundingBox;
use serde::{Deserialize, Serialize};

/// An uploaded image and its annotations.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ImageRecord {
    #[serde(rename = "_id", alias = "id")]
    pub id: String,
    /// Server-relative path of the pixel data, e.g. `/uploads/123-cat.png`.
    pub path: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub filename: Option<String>,
    #[serde(default)]
    pub bounding_boxes: Vec<BoundingBox>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub upload_date: Option<String>,
}

impl ImageRecord {
    /// Create a record with no annotations.
    #[cfg(test)]
    pub fn new(id: impl Into<String>, path: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            path: path.into(),
            filename: None,
            bounding_boxes: Vec::new(),
            upload_date: None,
        }
    }

    /// Name to show in lists: the stored filename, else the last path segment.
    pub fn display_name(&self) -> &str {
        self.filename
            .as_deref()
            .unwrap_or_else(|| self.path.rsplit('/').next().unwrap_or(&self.path))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_backend_record() {
        let json = r#"{
            "_id": "65f0c0ffee",
            "userId": "u1",
            "path": "/uploads/1700000000-cat.png",
            "filename": "1700000000-cat.png",
            "boundingBoxes": [{"_id": "b1", "x": 1, "y": 2, "width": 3, "height": 4}],
            "uploadDate": "2024-03-01T10:00:00.000Z",
            "__v": 0
        }"#;

        let record: ImageRecord = serde_json::from_str(json).unwrap();
        assert_eq!(record.id, "65f0c0ffee");
        assert_eq!(record.bounding_boxes.len(), 1);
        assert_eq!(record.display_name(), "1700000000-cat.png");
    }

    #[test]
    fn test_missing_boxes_default_to_empty() {
        let record: ImageRecord =
            serde_json::from_str(r#"{"id": "a", "path": "/uploads/dog.jpg"}"#).unwrap();
        assert!(record.bounding_boxes.is_empty());
        assert_eq!(record.display_name(), "dog.jpg");
    }
}
