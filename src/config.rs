// Copyright (c) 2025, Jason Jenkins
// SPDX-License-Identifier: BSD-3-Clause

//! Application configuration.
//!
//! Settings come from `{config_dir}/annotate/config.yaml` when it exists,
//! then from `ANNOTATE_SERVER_URL` / `ANNOTATE_AUTH_TOKEN`.

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

pub const ENV_SERVER_URL: &str = "ANNOTATE_SERVER_URL";
pub const ENV_AUTH_TOKEN: &str = "ANNOTATE_AUTH_TOKEN";

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AppConfig {
    /// Base URL serving both the API and uploaded files.
    #[serde(default = "default_server_url")]
    pub server_url: String,
    #[serde(default = "default_api_prefix")]
    pub api_prefix: String,
    /// Session token sent as `x-auth-token`.
    #[serde(default)]
    pub auth_token: Option<String>,
    #[serde(default = "default_timeout")]
    pub request_timeout_secs: u64,
    /// Overrides the preference file location.
    #[serde(default)]
    pub preferences_path: Option<PathBuf>,
    #[serde(default)]
    pub editor: EditorConfig,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct EditorConfig {
    /// Keep width/height non-negative while resizing.
    #[serde(default)]
    pub normalize_on_resize: bool,
}

fn default_server_url() -> String {
    "http://localhost:5000".to_string()
}

fn default_api_prefix() -> String {
    "/api".to_string()
}

fn default_timeout() -> u64 {
    30
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            server_url: default_server_url(),
            api_prefix: default_api_prefix(),
            auth_token: None,
            request_timeout_secs: default_timeout(),
            preferences_path: None,
            editor: EditorConfig::default(),
        }
    }
}

impl AppConfig {
    /// Default config file location.
    pub fn default_path() -> Option<PathBuf> {
        dirs::config_dir().map(|d| d.join("annotate").join("config.yaml"))
    }

    /// Load from the default location (if present) and apply environment overrides.
    pub fn load() -> Result<Self> {
        let mut config = match Self::default_path() {
            Some(path) if path.exists() => Self::from_file(&path)?,
            _ => Self::default(),
        };
        config.apply_overrides(
            std::env::var(ENV_SERVER_URL).ok(),
            std::env::var(ENV_AUTH_TOKEN).ok(),
        );
        Ok(config)
    }

    pub fn from_file(path: &Path) -> Result<Self> {
        let yaml = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read config {}", path.display()))?;
        let config = serde_yaml::from_str(&yaml)
            .with_context(|| format!("Failed to parse config {}", path.display()))?;
        log::info!("Loaded config from {}", path.display());
        Ok(config)
    }

    fn apply_overrides(&mut self, server_url: Option<String>, auth_token: Option<String>) {
        if let Some(url) = server_url.filter(|u| !u.trim().is_empty()) {
            self.server_url = url;
        }
        if let Some(token) = auth_token.filter(|t| !t.is_empty()) {
            self.auth_token = Some(token);
        }
    }
}
