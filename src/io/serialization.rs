// Copyright (c) 2025, Jason Jenkins
// SPDX-License-Identifier: BSD-3-Clause

//! Annotation file export and import.
//!
//! An image record (with its boxes) can be written to and read back from
//! YAML or JSON, independent of the backend.

use crate::models::image::ImageRecord;
use anyhow::{bail, Result};
use std::path::Path;

/// Export an image record to YAML format.
pub fn export_yaml(record: &ImageRecord, path: &Path) -> Result<()> {
    let yaml = serde_yaml::to_string(record)?;
    std::fs::write(path, yaml)?;
    Ok(())
}

/// Export an image record to JSON format.
pub fn export_json(record: &ImageRecord, path: &Path) -> Result<()> {
    let json = serde_json::to_string_pretty(record)?;
    std::fs::write(path, json)?;
    Ok(())
}

/// Import an image record from YAML format.
pub fn import_yaml(path: &Path) -> Result<ImageRecord> {
    let yaml = std::fs::read_to_string(path)?;
    let record = serde_yaml::from_str(&yaml)?;
    Ok(record)
}

/// Import an image record from JSON format.
pub fn import_json(path: &Path) -> Result<ImageRecord> {
    let json = std::fs::read_to_string(path)?;
    let record = serde_json::from_str(&json)?;
    Ok(record)
}

/// Export, choosing the format from the file extension.
pub fn export_by_extension(record: &ImageRecord, path: &Path) -> Result<()> {
    match path.extension().and_then(|s| s.to_str()) {
        Some("yaml") | Some("yml") => export_yaml(record, path),
        Some("json") => export_json(record, path),
        other => bail!("Unsupported file extension: {:?}", other),
    }
}

/// Import, choosing the format from the file extension.
pub fn import_by_extension(path: &Path) -> Result<ImageRecord> {
    match path.extension().and_then(|s| s.to_str()) {
        Some("yaml") | Some("yml") => import_yaml(path),
        Some("json") => import_json(path),
        other => bail!("Unsupported file extension: {:?}", other),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::annotation::BoundingBox;

    fn sample() -> ImageRecord {
        let mut record = ImageRecord::new("img-7", "/uploads/7-street.jpg");
        record.bounding_boxes = vec![
            BoundingBox::new(12.0, 8.0, 40.0, 30.0).with_label("car"),
            BoundingBox::new(100.0, 50.0, 0.0, 0.0),
        ];
        record
    }

    #[test]
    fn test_yaml_file_keeps_boxes_and_labels() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("street.yaml");

        export_by_extension(&sample(), &path).unwrap();
        let text = std::fs::read_to_string(&path).unwrap();
        assert!(text.contains("boundingBoxes"));
        assert!(text.contains("img-7"));

        assert_eq!(import_by_extension(&path).unwrap(), sample());
    }

    #[test]
    fn test_json_file_uses_backend_field_names() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("street.json");

        export_json(&sample(), &path).unwrap();
        let value: serde_json::Value =
            serde_json::from_str(&std::fs::read_to_string(&path).unwrap()).unwrap();
        assert_eq!(value["_id"], "img-7");
        assert_eq!(value["boundingBoxes"][0]["label"], "car");
        assert!(value["boundingBoxes"][1].get("label").is_none());
    }

    #[test]
    fn test_unknown_extension_is_rejected() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("street.csv");
        assert!(export_by_extension(&sample(), &path).is_err());
        assert!(import_by_extension(&path).is_err());
    }
}
