// Copyright (c) 2025, Jason Jenkins
// SPDX-License-Identifier: BSD-3-Clause

//! Main application state and egui App implementation.
//!
//! This module contains the main application structure that implements
//! the eframe::App trait. It owns the editor and the gallery, runs backend
//! calls on background threads and applies their results on the UI thread.

use crate::config::AppConfig;
use crate::editor::{Editor, EditorOptions};
use crate::gallery::Gallery;
use crate::io::backend::{BackendResult, ImageBackend};
use crate::io::media::{self, LoadedImage};
use crate::io::preferences::PreferenceStore;
use crate::io::upload::{self, Rejection};
use crate::models::image::ImageRecord;
use crate::render::raster;
use crate::ui::{canvas, gallery as gallery_panel, notifications::Notifications, properties, toolbar};
use std::path::PathBuf;
use std::sync::mpsc::{channel, Receiver, Sender};
use std::sync::Arc;

/// Result of a background operation.
enum TaskResult {
    ImagesListed(BackendResult<Vec<ImageRecord>>),
    ImageLoaded {
        image_id: String,
        result: Result<LoadedImage, String>,
    },
    Saved(BackendResult<ImageRecord>),
    Uploaded {
        result: BackendResult<Vec<ImageRecord>>,
    },
    Deleted {
        image_id: String,
        result: BackendResult<()>,
    },
}

/// Main application state.
pub struct AnnotateApp {
    backend: Arc<dyn ImageBackend>,

    /// Box editor for the open image
    editor: Editor,

    /// The user's images
    gallery: Gallery,

    /// Loaded image texture for display
    image_texture: Option<egui::TextureHandle>,

    /// Decoded pixels of the open image, kept for snapshot export
    loaded_image: Option<LoadedImage>,

    /// Label text being edited, and the box it belongs to
    label_draft: String,
    label_draft_for: Option<usize>,

    /// Channel for background task results
    task_sender: Sender<TaskResult>,
    task_receiver: Receiver<TaskResult>,

    saves_in_flight: usize,

    /// Loading state message
    loading_message: Option<String>,

    notifications: Notifications,
}

impl AnnotateApp {
    /// Create the application and start fetching the image list.
    pub fn new(
        config: &AppConfig,
        backend: Arc<dyn ImageBackend>,
        preferences: Box<dyn PreferenceStore>,
    ) -> Self {
        let options = EditorOptions {
            normalize_on_resize: config.editor.normalize_on_resize,
        };
        let (task_sender, task_receiver) = channel();

        let mut app = Self {
            backend,
            editor: Editor::new(preferences, options),
            gallery: Gallery::new(),
            image_texture: None,
            loaded_image: None,
            label_draft: String::new(),
            label_draft_for: None,
            task_sender,
            task_receiver,
            saves_in_flight: 0,
            loading_message: None,
            notifications: Notifications::new(),
        };
        app.refresh_images();
        app
    }

    /// Run `task` on a background thread and deliver its result to `update`.
    fn spawn<F>(&self, task: F)
    where
        F: FnOnce(&dyn ImageBackend) -> TaskResult + Send + 'static,
    {
        let backend = Arc::clone(&self.backend);
        let sender = self.task_sender.clone();
        std::thread::spawn(move || {
            let _ = sender.send(task(backend.as_ref()));
        });
    }

    fn refresh_images(&mut self) {
        self.loading_message = Some("Loading images...".to_string());
        self.spawn(|backend| TaskResult::ImagesListed(backend.list_images()));
    }

    /// Open the gallery's current image in the editor and fetch its pixels.
    fn open_current_image(&mut self) {
        self.image_texture = None;
        self.loaded_image = None;

        let Some(record) = self.gallery.current().cloned() else {
            self.editor.clear();
            return;
        };
        self.editor.load(record.clone());
        self.loading_message = Some(format!("Loading {}...", record.display_name()));

        self.spawn(move |backend| {
            let result = backend
                .fetch_image_bytes(&record.path)
                .map_err(|e| e.to_string())
                .and_then(|bytes| media::decode_image(&bytes).map_err(|e| format!("{:#}", e)));
            TaskResult::ImageLoaded {
                image_id: record.id,
                result,
            }
        });
    }

    fn navigate(&mut self, moved: bool) {
        if moved {
            self.open_current_image();
            if let Some(index) = self.gallery.current_index() {
                self.notifications
                    .info(format!("Viewing image {} of {}", index + 1, self.gallery.len()));
            }
        }
    }

    /// Send the editor's boxes to the backend without blocking input.
    fn save(&mut self) {
        let Some(request) = self.editor.save_request() else {
            self.notifications.error("No image is open");
            return;
        };
        self.saves_in_flight += 1;
        self.spawn(move |backend| {
            TaskResult::Saved(backend.save_boxes(&request.image_id, &request.boxes))
        });
    }

    fn upload(&mut self, paths: Vec<PathBuf>) {
        let batch = upload::read_batch(&paths);
        for Rejection { reason, .. } in &batch.rejected {
            self.notifications.error(reason.clone());
        }
        if !batch.has_uploads() {
            return;
        }

        self.loading_message = Some(format!("Uploading {} image(s)...", batch.accepted.len()));
        let files = batch.accepted;
        self.spawn(move |backend| TaskResult::Uploaded {
            result: backend.upload_images(&files),
        });
    }

    fn delete_image(&mut self, image_id: String) {
        self.spawn(move |backend| {
            let result = backend.delete_image(&image_id);
            TaskResult::Deleted { image_id, result }
        });
    }

    /// Export the open image with its boxes as a PNG file.
    fn export_snapshot(&mut self, path: PathBuf) {
        let Some(loaded) = &self.loaded_image else {
            self.notifications.error("Image is not loaded yet");
            return;
        };
        let result = raster::export_png(&loaded.image, self.editor.boxes(), self.editor.style())
            .and_then(|png| std::fs::write(&path, png).map_err(anyhow::Error::from));

        match result {
            Ok(()) => {
                log::info!("Exported snapshot to {}", path.display());
                self.notifications.success("Annotated image saved");
            }
            Err(e) => {
                log::error!("Failed to export snapshot: {:#}", e);
                self.notifications.error(format!("Export failed: {}", e));
            }
        }
    }

    /// Export annotations to a file.
    fn export_annotations(&mut self, path: PathBuf) {
        let Some(image) = self.editor.image() else {
            return;
        };
        let mut record = image.clone();
        record.bounding_boxes = self.editor.boxes().to_vec();

        match crate::io::serialization::export_by_extension(&record, &path) {
            Ok(()) => {
                log::info!("Exported annotations to {}", path.display());
                self.notifications.success("Annotations exported");
            }
            Err(e) => {
                log::error!("Failed to export annotations: {:#}", e);
                self.notifications.error(format!("Export failed: {}", e));
            }
        }
    }

    /// Replace the open image's boxes with those from an annotation file.
    fn import_annotations(&mut self, path: PathBuf) {
        let Some(image) = self.editor.image().cloned() else {
            self.notifications.error("Open an image before importing annotations");
            return;
        };

        match crate::io::serialization::import_by_extension(&path) {
            Ok(imported) => {
                log::info!(
                    "Imported {} box(es) from {}",
                    imported.bounding_boxes.len(),
                    path.display()
                );
                let mut record = image;
                record.bounding_boxes = imported.bounding_boxes;
                self.editor.load(record);
                self.notifications.info("Annotations imported; save to keep them");
            }
            Err(e) => {
                log::error!("Failed to import annotations: {:#}", e);
                self.notifications.error(format!("Import failed: {}", e));
            }
        }
    }

    fn handle_task(&mut self, ctx: &egui::Context, task: TaskResult) {
        match task {
            TaskResult::ImagesListed(result) => {
                self.loading_message = None;
                match result {
                    Ok(images) => {
                        log::info!("Fetched {} image(s)", images.len());
                        let before = self.gallery.current().map(|r| r.id.clone());
                        self.gallery.replace(images);
                        if self.gallery.current().map(|r| r.id.clone()) != before
                            || self.editor.image().is_none()
                        {
                            self.open_current_image();
                        }
                    }
                    Err(e) => {
                        log::error!("Failed to fetch images: {}", e);
                        self.notifications.error(format!("Could not load images: {}", e));
                    }
                }
            }
            TaskResult::ImageLoaded { image_id, result } => {
                if self.editor.image_id() != Some(image_id.as_str()) {
                    // The user moved on before this finished.
                    return;
                }
                self.loading_message = None;
                match result {
                    Ok(loaded) => {
                        let size = [loaded.width() as usize, loaded.height() as usize];
                        let color_image = egui::ColorImage::from_rgba_unmultiplied(size, loaded.pixels());
                        self.image_texture = Some(ctx.load_texture(
                            "loaded_image",
                            color_image,
                            egui::TextureOptions::LINEAR,
                        ));
                        log::info!("Loaded image {} ({}x{})", image_id, loaded.width(), loaded.height());
                        self.loaded_image = Some(loaded);
                    }
                    Err(e) => {
                        log::error!("Failed to load image {}: {}", image_id, e);
                        self.notifications.error(format!("Could not load image: {}", e));
                    }
                }
            }
            TaskResult::Saved(result) => {
                self.saves_in_flight = self.saves_in_flight.saturating_sub(1);
                if let Ok(record) = &result {
                    self.gallery.update_boxes(&record.id, &record.bounding_boxes);
                }
                match self.editor.apply_save_result(result) {
                    Ok(()) => self.notifications.success("Annotations saved successfully"),
                    Err(e) if e.is_retryable() => self.notifications.error(format!(
                        "Error saving annotations: {}. Your boxes are kept, save again to retry",
                        e
                    )),
                    Err(e) => self.notifications.error(format!("Error saving annotations: {}", e)),
                }
            }
            TaskResult::Uploaded { result } => {
                self.loading_message = None;
                match result {
                    Ok(records) => {
                        let count = records.len();
                        let was_empty = self.gallery.is_empty();
                        self.gallery.append(records);
                        if was_empty {
                            self.open_current_image();
                        }
                        self.notifications
                            .success(format!("Successfully uploaded {} image(s)", count));
                    }
                    Err(e) => {
                        log::error!("Upload failed: {}", e);
                        self.notifications.error(format!("Error uploading images: {}", e));
                    }
                }
            }
            TaskResult::Deleted { image_id, result } => match result {
                Ok(()) => {
                    self.gallery.remove(&image_id);
                    if self.editor.image_id() == Some(image_id.as_str()) {
                        self.open_current_image();
                    }
                    self.notifications.success("Image deleted successfully");
                }
                Err(e) => {
                    log::error!("Failed to delete image {}: {}", image_id, e);
                    self.notifications.error(format!("Error deleting image: {}", e));
                }
            },
        }
    }

    /// Keep the label text field in step with the selection.
    fn sync_label_draft(&mut self) {
        let selected = self.editor.selected();
        if selected != self.label_draft_for {
            self.label_draft = selected
                .and_then(|i| self.editor.boxes().get(i))
                .and_then(|b| b.label.clone())
                .unwrap_or_default();
            self.label_draft_for = selected;
        }
    }

    fn menu_bar(&mut self, ctx: &egui::Context) {
        egui::TopBottomPanel::top("menu_bar").show(ctx, |ui| {
            egui::menu::bar(ui, |ui| {
                ui.menu_button("File", |ui| {
                    if ui.button("Upload Images...").clicked() {
                        if let Some(paths) = rfd::FileDialog::new()
                            .add_filter("Images", &["jpg", "jpeg", "png", "bmp", "gif", "webp", "tiff", "tif"])
                            .add_filter("All files", &["*"])
                            .pick_files()
                        {
                            self.upload(paths);
                        }
                        ui.close_menu();
                    }
                    if ui.button("Refresh").clicked() {
                        self.refresh_images();
                        ui.close_menu();
                    }
                    ui.separator();
                    if ui
                        .add_enabled(self.loaded_image.is_some(), egui::Button::new("Download Annotated Image..."))
                        .clicked()
                    {
                        if let Some(path) = rfd::FileDialog::new()
                            .add_filter("PNG", &["png"])
                            .set_file_name("annotated_image.png")
                            .save_file()
                        {
                            self.export_snapshot(path);
                        }
                        ui.close_menu();
                    }
                    let has_image = self.editor.image().is_some();
                    ui.add_enabled_ui(has_image, |ui| {
                        ui.menu_button("Export Annotations", |ui| {
                            if ui.button("Export as YAML...").clicked() {
                                if let Some(path) = rfd::FileDialog::new()
                                    .add_filter("YAML", &["yaml", "yml"])
                                    .set_file_name("annotations.yaml")
                                    .save_file()
                                {
                                    self.export_annotations(path);
                                }
                                ui.close_menu();
                            }
                            if ui.button("Export as JSON...").clicked() {
                                if let Some(path) = rfd::FileDialog::new()
                                    .add_filter("JSON", &["json"])
                                    .set_file_name("annotations.json")
                                    .save_file()
                                {
                                    self.export_annotations(path);
                                }
                                ui.close_menu();
                            }
                        });
                        if ui.button("Load Annotations...").clicked() {
                            if let Some(path) = rfd::FileDialog::new()
                                .add_filter("Annotations", &["yaml", "yml", "json"])
                                .pick_file()
                            {
                                self.import_annotations(path);
                            }
                            ui.close_menu();
                        }
                    });
                    ui.separator();
                    if ui.button("Quit").clicked() {
                        ctx.send_viewport_cmd(egui::ViewportCommand::Close);
                    }
                });

                ui.menu_button("Edit", |ui| {
                    let selected = self.editor.selected();
                    if ui
                        .add_enabled(selected.is_some(), egui::Button::new("Delete Selected (Del)"))
                        .clicked()
                    {
                        if let Some(index) = selected {
                            self.editor.delete(index);
                        }
                        ui.close_menu();
                    }
                    if ui
                        .add_enabled(self.editor.image().is_some(), egui::Button::new("Save Annotations"))
                        .clicked()
                    {
                        self.save();
                        ui.close_menu();
                    }
                });
            });
        });
    }

    fn handle_keys(&mut self, ctx: &egui::Context) {
        if ctx.wants_keyboard_input() {
            return;
        }

        let (left, right, delete, escape) = ctx.input(|i| {
            (
                i.key_pressed(egui::Key::ArrowLeft),
                i.key_pressed(egui::Key::ArrowRight),
                i.key_pressed(egui::Key::Delete) || i.key_pressed(egui::Key::Backspace),
                i.key_pressed(egui::Key::Escape),
            )
        });

        if left {
            let moved = self.gallery.previous();
            self.navigate(moved);
        }
        if right {
            let moved = self.gallery.next();
            self.navigate(moved);
        }
        if delete {
            if let Some(index) = self.editor.selected() {
                self.editor.delete(index);
                self.notifications.info("Box deleted");
            }
        }
        if escape {
            self.editor.select(None);
        }
    }
}

impl eframe::App for AnnotateApp {
    fn update(&mut self, ctx: &egui::Context, _frame: &mut eframe::Frame) {
        // Apply finished background work
        while let Ok(task) = self.task_receiver.try_recv() {
            self.handle_task(ctx, task);
        }

        // Request repaint while waiting on background work
        if self.loading_message.is_some() || self.saves_in_flight > 0 {
            ctx.request_repaint_after(std::time::Duration::from_millis(100));
        }

        self.menu_bar(ctx);

        // Style toolbar
        egui::TopBottomPanel::top("toolbar").show(ctx, |ui| {
            if let Some(style) = toolbar::show(ui, self.editor.style()) {
                if let Err(e) = self.editor.set_style(style) {
                    log::warn!("Failed to persist style: {:#}", e);
                    self.notifications.error("Could not save style preference");
                }
            }
        });

        // Gallery panel (left side)
        let gallery_action = egui::SidePanel::left("gallery")
            .default_width(220.0)
            .show(ctx, |ui| gallery_panel::show(ui, &self.gallery))
            .inner;

        match gallery_action {
            gallery_panel::GalleryAction::Open(index) => {
                let moved = self.gallery.select(index);
                self.navigate(moved);
            }
            gallery_panel::GalleryAction::First => {
                let moved = self.gallery.first();
                self.navigate(moved);
            }
            gallery_panel::GalleryAction::Previous => {
                let moved = self.gallery.previous();
                self.navigate(moved);
            }
            gallery_panel::GalleryAction::Next => {
                let moved = self.gallery.next();
                self.navigate(moved);
            }
            gallery_panel::GalleryAction::Last => {
                let moved = self.gallery.last();
                self.navigate(moved);
            }
            gallery_panel::GalleryAction::Delete(image_id) => self.delete_image(image_id),
            gallery_panel::GalleryAction::Upload => {
                if let Some(paths) = rfd::FileDialog::new().pick_files() {
                    self.upload(paths);
                }
            }
            gallery_panel::GalleryAction::Refresh => self.refresh_images(),
            gallery_panel::GalleryAction::None => {}
        }

        // Properties panel (right side)
        self.sync_label_draft();
        let properties_action = egui::SidePanel::right("properties")
            .default_width(250.0)
            .show(ctx, |ui| {
                properties::show(ui, &self.editor, &mut self.label_draft, self.saves_in_flight)
            })
            .inner;

        match properties_action {
            properties::PropertiesAction::Select(index) => self.editor.select(Some(index)),
            properties::PropertiesAction::Delete(index) => {
                self.editor.delete(index);
                self.notifications.info("Box deleted");
            }
            properties::PropertiesAction::SetLabel(index, label) => {
                self.editor.set_label(index, Some(label));
            }
            properties::PropertiesAction::Save => self.save(),
            properties::PropertiesAction::None => {}
        }

        self.handle_keys(ctx);

        // Main canvas (center)
        egui::CentralPanel::default().show(ctx, |ui| {
            if let Some(ref message) = self.loading_message {
                if self.image_texture.is_none() {
                    ui.centered_and_justified(|ui| {
                        ui.vertical_centered(|ui| {
                            ui.add_space(20.0);
                            ui.spinner();
                            ui.add_space(10.0);
                            ui.label(
                                egui::RichText::new(message)
                                    .size(16.0)
                                    .color(egui::Color32::from_gray(200)),
                            );
                        });
                    });
                    return;
                }
            }

            let image_size = self.loaded_image.as_ref().map(|l| (l.width(), l.height()));
            canvas::show(ui, &mut self.editor, self.image_texture.as_ref(), image_size);
        });

        self.notifications.show(ctx);
    }
}
