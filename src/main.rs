// Copyright (c) 2025, Jason Jenkins
// SPDX-License-Identifier: BSD-3-Clause

//! Annotate - image bounding box annotation client
//!
//! A cross-platform desktop application for drawing, editing and saving
//! rectangular annotations on images stored by an annotation server.

mod app;
mod config;
mod editor;
mod gallery;
mod io;
mod models;
mod render;
mod ui;
mod util;

use anyhow::Result;
use app::AnnotateApp;
use config::AppConfig;
use io::backend::HttpBackend;
use io::preferences::FilePreferenceStore;
use std::sync::Arc;

fn main() -> Result<()> {
    // Initialize logging
    env_logger::init();

    let config = AppConfig::load().unwrap_or_else(|e| {
        log::error!("Failed to load configuration, using defaults: {:#}", e);
        AppConfig::default()
    });
    log::info!("Using annotation server at {}", config.server_url);

    let preferences = match &config.preferences_path {
        Some(path) => FilePreferenceStore::new(path.clone()),
        None => FilePreferenceStore::default_location(),
    };
    log::debug!("Preferences stored at {}", preferences.path().display());

    let backend = HttpBackend::new(&config)
        .map_err(|e| anyhow::anyhow!("Could not create backend client: {}", e))?;

    // Configure egui options
    let options = eframe::NativeOptions {
        viewport: egui::ViewportBuilder::default()
            .with_inner_size([1280.0, 720.0])
            .with_min_inner_size([800.0, 600.0])
            .with_title("Annotate"),
        ..Default::default()
    };

    // Run the application
    eframe::run_native(
        "Annotate",
        options,
        Box::new(move |_cc| {
            Ok(Box::new(AnnotateApp::new(
                &config,
                Arc::new(backend),
                Box::new(preferences),
            )))
        }),
    )
    .map_err(|e| anyhow::anyhow!("Application error: {}", e))?;

    Ok(())
}
