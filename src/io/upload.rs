// Copyright (c) 2025, Jason Jenkins
// SPDX-License-Identifier: BSD-3-Clause

//! Client-side screening of upload batches.
//!
//! Every file in a batch is checked on its own. Files that are not images are
//! reported and dropped; the remaining files are still uploaded.

use anyhow::{Context, Result};
use std::path::{Path, PathBuf};

/// A file accepted for upload.
#[derive(Debug, Clone)]
pub struct UploadFile {
    pub name: String,
    pub mime: &'static str,
    pub bytes: Vec<u8>,
}

/// A file left out of the batch, and why.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Rejection {
    pub name: String,
    pub reason: String,
}

/// Result of screening a batch.
#[derive(Debug, Default)]
pub struct UploadBatch {
    pub accepted: Vec<UploadFile>,
    pub rejected: Vec<Rejection>,
}

impl UploadBatch {
    /// Whether anything is left to send.
    pub fn has_uploads(&self) -> bool {
        !self.accepted.is_empty()
    }
}

/// Screen in-memory files, keeping those whose content is a known image format.
pub fn partition_batch(files: impl IntoIterator<Item = (String, Vec<u8>)>) -> UploadBatch {
    let mut batch = UploadBatch::default();

    for (name, bytes) in files {
        match image::guess_format(&bytes) {
            Ok(format) => batch.accepted.push(UploadFile {
                name,
                mime: format.to_mime_type(),
                bytes,
            }),
            Err(_) => {
                log::warn!("Rejecting {}: not an image file", name);
                batch.rejected.push(Rejection {
                    reason: format!("{} is not an image file", name),
                    name,
                });
            }
        }
    }

    batch
}

/// Read files from disk and screen them. Unreadable files are rejected too.
pub fn read_batch(paths: &[PathBuf]) -> UploadBatch {
    let mut readable = Vec::new();
    let mut unreadable = Vec::new();

    for path in paths {
        let name = file_name(path);
        match read_file(path) {
            Ok(bytes) => readable.push((name, bytes)),
            Err(e) => unreadable.push(Rejection {
                reason: format!("{:#}", e),
                name,
            }),
        }
    }

    let mut batch = partition_batch(readable);
    batch.rejected.extend(unreadable);
    batch
}

fn read_file(path: &Path) -> Result<Vec<u8>> {
    std::fs::read(path).with_context(|| format!("Failed to read {}", path.display()))
}

fn file_name(path: &Path) -> String {
    path.file_name()
        .map(|n| n.to_string_lossy().to_string())
        .unwrap_or_else(|| path.display().to_string())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Cursor;

    fn png_bytes() -> Vec<u8> {
        let img = image::RgbaImage::new(2, 2);
        let mut out = Cursor::new(Vec::new());
        img.write_to(&mut out, image::ImageFormat::Png).unwrap();
        out.into_inner()
    }

    #[test]
    fn test_one_non_image_among_images() {
        let files = vec![
            ("a.png".to_string(), png_bytes()),
            ("notes.txt".to_string(), b"hello there".to_vec()),
            ("b.png".to_string(), png_bytes()),
            ("c.png".to_string(), png_bytes()),
        ];

        let batch = partition_batch(files);
        assert_eq!(batch.accepted.len(), 3);
        assert_eq!(batch.rejected.len(), 1);
        assert_eq!(batch.rejected[0].name, "notes.txt");
        assert!(batch.accepted.iter().all(|f| f.mime == "image/png"));
    }

    #[test]
    fn test_extension_does_not_make_an_image() {
        let batch = partition_batch(vec![("fake.png".to_string(), b"plain text".to_vec())]);
        assert!(!batch.has_uploads());
        assert_eq!(batch.rejected.len(), 1);
    }

    #[test]
    fn test_read_batch_from_disk() {
        let dir = tempfile::tempdir().unwrap();
        let image_path = dir.path().join("photo.png");
        let text_path = dir.path().join("readme.md");
        std::fs::write(&image_path, png_bytes()).unwrap();
        std::fs::write(&text_path, "# notes").unwrap();
        let missing = dir.path().join("missing.jpg");

        let batch = read_batch(&[image_path, text_path, missing]);
        assert_eq!(batch.accepted.len(), 1);
        assert_eq!(batch.accepted[0].name, "photo.png");
        let rejected: Vec<_> = batch.rejected.iter().map(|r| r.name.as_str()).collect();
        assert_eq!(rejected, vec!["readme.md", "missing.jpg"]);
    }
}
