// Copyright (c) 2025, Jason Jenkins
// SPDX-License-Identifier: BSD-3-Clause

//! Bounding box list panel.
//!
//! Lists the boxes of the open image with select/delete buttons, the label
//! editor for the selected box and the save button.

use crate::editor::Editor;
use crate::render::label_text;

/// Result of properties panel interaction.
pub enum PropertiesAction {
    None,
    Select(usize),
    Delete(usize),
    SetLabel(usize, String),
    Save,
}

/// Display the box list. `label_draft` holds the text being typed for the
/// selected box's label.
pub fn show(
    ui: &mut egui::Ui,
    editor: &Editor,
    label_draft: &mut String,
    saves_in_flight: usize,
) -> PropertiesAction {
    let mut action = PropertiesAction::None;

    ui.heading("Bounding Boxes");
    ui.separator();

    if editor.image().is_none() {
        ui.label(egui::RichText::new("No image open").weak());
        return action;
    }

    egui::ScrollArea::vertical()
        .max_height(400.0)
        .auto_shrink([false, true])
        .show(ui, |ui| {
            if editor.boxes().is_empty() {
                ui.label(egui::RichText::new("Drag on the image to add a box").weak());
            }

            for (index, b) in editor.boxes().iter().enumerate() {
                let selected = editor.selected() == Some(index);
                ui.horizontal(|ui| {
                    let title = label_text(b, index, editor.style());
                    if ui.selectable_label(selected, title).clicked() {
                        action = PropertiesAction::Select(index);
                    }
                    ui.label(
                        egui::RichText::new(format!(
                            "{:.0},{:.0} {:.0}×{:.0}",
                            b.x, b.y, b.width, b.height
                        ))
                        .weak()
                        .small(),
                    );
                    ui.with_layout(egui::Layout::right_to_left(egui::Align::Center), |ui| {
                        if ui.small_button("🗑").on_hover_text("Delete box").clicked() {
                            action = PropertiesAction::Delete(index);
                        }
                    });
                });
            }
        });

    if let Some(index) = editor.selected() {
        ui.separator();
        ui.label(format!("Label for box {}", index + 1));
        ui.horizontal(|ui| {
            let edit = ui.text_edit_singleline(label_draft);
            let submitted = edit.lost_focus() && ui.input(|i| i.key_pressed(egui::Key::Enter));
            if ui.button("Apply").clicked() || submitted {
                action = PropertiesAction::SetLabel(index, label_draft.clone());
            }
        });
    }

    ui.separator();

    let save_label = if saves_in_flight > 0 {
        format!("Save Annotations (saving {})", saves_in_flight)
    } else {
        "Save Annotations".to_string()
    };
    if ui
        .add_sized([ui.available_width(), 28.0], egui::Button::new(save_label))
        .clicked()
    {
        action = PropertiesAction::Save;
    }

    action
}
