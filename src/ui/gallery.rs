// Copyright (c) 2025, Jason Jenkins
// SPDX-License-Identifier: BSD-3-Clause

//! Image gallery panel.
//!
//! Lists the user's images and provides navigation between them.

use crate::gallery::Gallery;

/// Result of gallery panel interaction.
pub enum GalleryAction {
    None,
    Open(usize),
    First,
    Previous,
    Next,
    Last,
    Delete(String),
    Upload,
    Refresh,
}

/// Display the gallery list with navigation controls.
pub fn show(ui: &mut egui::Ui, gallery: &Gallery) -> GalleryAction {
    let mut action = GalleryAction::None;

    ui.horizontal(|ui| {
        ui.heading("Images");
        ui.with_layout(egui::Layout::right_to_left(egui::Align::Center), |ui| {
            if ui.small_button("⟳").on_hover_text("Refresh").clicked() {
                action = GalleryAction::Refresh;
            }
            if ui.small_button("⬆").on_hover_text("Upload images").clicked() {
                action = GalleryAction::Upload;
            }
        });
    });
    ui.separator();

    let position = match gallery.current_index() {
        Some(i) => format!("{} / {}", i + 1, gallery.len()),
        None => "No images".to_string(),
    };
    ui.horizontal(|ui| {
        if ui.small_button("⏮").clicked() {
            action = GalleryAction::First;
        }
        if ui.small_button("◀").clicked() {
            action = GalleryAction::Previous;
        }
        ui.label(position);
        if ui.small_button("▶").clicked() {
            action = GalleryAction::Next;
        }
        if ui.small_button("⏭").clicked() {
            action = GalleryAction::Last;
        }
    });
    ui.separator();

    egui::ScrollArea::vertical()
        .auto_shrink([false, false])
        .show(ui, |ui| {
            for (index, record) in gallery.images().iter().enumerate() {
                let current = gallery.current_index() == Some(index);
                ui.horizontal(|ui| {
                    let text = format!(
                        "{} ({})",
                        record.display_name(),
                        record.bounding_boxes.len()
                    );
                    if ui.selectable_label(current, text).clicked() {
                        action = GalleryAction::Open(index);
                    }
                    ui.with_layout(egui::Layout::right_to_left(egui::Align::Center), |ui| {
                        if ui.small_button("🗑").on_hover_text("Delete image").clicked() {
                            action = GalleryAction::Delete(record.id.clone());
                        }
                    });
                });
            }
        });

    action
}
