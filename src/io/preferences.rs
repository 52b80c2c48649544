// Copyright (c) 2025, Jason Jenkins
// SPDX-License-Identifier: BSD-3-Clause

//! Key/value preference storage.
//!
//! The annotation style is the only preference the application keeps. It is
//! stored as serialized JSON under [`STYLE_KEY`] in whatever store the editor
//! was constructed with.

use crate::models::style::AnnotationStyle;
use anyhow::{Context, Result};
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

/// Key under which the annotation style is persisted.
pub const STYLE_KEY: &str = "annotationStyles";

/// A simple persisted string map.
pub trait PreferenceStore: Send {
    fn get(&self, key: &str) -> Result<Option<String>>;
    fn set(&mut self, key: &str, value: &str) -> Result<()>;
}

/// Preferences kept in a JSON object file.
///
/// The file is read on every `get` and rewritten on every `set`; there are
/// few keys and they change only on user action.
#[derive(Debug, Clone)]
pub struct FilePreferenceStore {
    path: PathBuf,
}

impl FilePreferenceStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    /// Store in the platform config directory, falling back to the working
    /// directory when none is known.
    pub fn default_location() -> Self {
        let dir = dirs::config_dir()
            .map(|d| d.join("annotate"))
            .unwrap_or_else(|| PathBuf::from("."));
        Self::new(dir.join("preferences.json"))
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn read_all(&self) -> Result<BTreeMap<String, String>> {
        if !self.path.exists() {
            return Ok(BTreeMap::new());
        }
        let json = std::fs::read_to_string(&self.path)
            .with_context(|| format!("reading {}", self.path.display()))?;
        if json.trim().is_empty() {
            return Ok(BTreeMap::new());
        }
        serde_json::from_str(&json).with_context(|| format!("parsing {}", self.path.display()))
    }
}

impl PreferenceStore for FilePreferenceStore {
    fn get(&self, key: &str) -> Result<Option<String>> {
        Ok(self.read_all()?.remove(key))
    }

    fn set(&mut self, key: &str, value: &str) -> Result<()> {
        // A corrupt file is replaced rather than blocking every later write.
        let mut values = self.read_all().unwrap_or_else(|e| {
            log::warn!("Discarding unreadable preferences: {:#}", e);
            BTreeMap::new()
        });
        values.insert(key.to_string(), value.to_string());

        if let Some(parent) = self.path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        let json = serde_json::to_string_pretty(&values)?;
        std::fs::write(&self.path, json)
            .with_context(|| format!("writing {}", self.path.display()))?;
        Ok(())
    }
}

/// Preferences that live only as long as the process.
#[cfg(test)]
#[derive(Debug, Clone, Default)]
pub struct MemoryPreferenceStore {
    values: BTreeMap<String, String>,
}

#[cfg(test)]
impl MemoryPreferenceStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[cfg(test)]
impl PreferenceStore for MemoryPreferenceStore {
    fn get(&self, key: &str) -> Result<Option<String>> {
        Ok(self.values.get(key).cloned())
    }

    fn set(&mut self, key: &str, value: &str) -> Result<()> {
        self.values.insert(key.to_string(), value.to_string());
        Ok(())
    }
}

/// Read the saved style, or the default when nothing usable is stored.
pub fn load_style(store: &dyn PreferenceStore) -> AnnotationStyle {
    let raw = match store.get(STYLE_KEY) {
        Ok(Some(raw)) => raw,
        Ok(None) => return AnnotationStyle::default(),
        Err(e) => {
            log::warn!("Could not read style preference: {:#}", e);
            return AnnotationStyle::default();
        }
    };

    match serde_json::from_str(&raw) {
        Ok(style) => style,
        Err(e) => {
            log::warn!("Ignoring malformed style preference: {}", e);
            AnnotationStyle::default()
        }
    }
}

/// Persist the style under [`STYLE_KEY`].
pub fn store_style(store: &mut dyn PreferenceStore, style: &AnnotationStyle) -> Result<()> {
    let json = serde_json::to_string(style)?;
    store.set(STYLE_KEY, &json)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::style::{Color, LineStyle};

    #[test]
    fn test_missing_style_falls_back_to_default() {
        let store = MemoryPreferenceStore::new();
        assert_eq!(load_style(&store), AnnotationStyle::default());
    }

    #[test]
    fn test_malformed_style_falls_back_to_default() {
        let mut store = MemoryPreferenceStore::new();
        store.set(STYLE_KEY, "{not json").unwrap();
        assert_eq!(load_style(&store), AnnotationStyle::default());
    }

    #[test]
    fn test_file_store_survives_reopen() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested").join("preferences.json");

        let style = AnnotationStyle {
            color: Color::BLUE,
            line_width: 5,
            line_style: LineStyle::Dashed,
            ..AnnotationStyle::default()
        };
        let mut store = FilePreferenceStore::new(&path);
        store_style(&mut store, &style).unwrap();
        store.set("other", "kept").unwrap();

        let reopened = FilePreferenceStore::new(&path);
        assert_eq!(load_style(&reopened), style);
        assert_eq!(reopened.get("other").unwrap().as_deref(), Some("kept"));
    }

    #[test]
    fn test_file_store_replaces_corrupt_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("preferences.json");
        std::fs::write(&path, "garbage").unwrap();

        let mut store = FilePreferenceStore::new(&path);
        assert!(store.get(STYLE_KEY).is_err());
        store.set("k", "v").unwrap();
        assert_eq!(store.get("k").unwrap().as_deref(), Some("v"));
    }
}
