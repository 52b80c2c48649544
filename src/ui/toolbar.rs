// Copyright (c) 2025, Jason Jenkins
// SPDX-License-Identifier: BSD-3-Clause

//! Annotation style toolbar.
//!
//! This module provides the controls for the global box style: color,
//! line pattern, line width and label mode.

use crate::models::style::{AnnotationStyle, LabelStyle, LineStyle, LINE_WIDTHS, PALETTE};

/// Display the style controls. Returns the new style when the user changed it.
pub fn show(ui: &mut egui::Ui, current: &AnnotationStyle) -> Option<AnnotationStyle> {
    let mut style = current.clone();

    ui.horizontal(|ui| {
        ui.spacing_mut().item_spacing.x = 8.0;

        ui.label("Style:");

        ui.separator();

        let color_name = PALETTE
            .iter()
            .find(|(_, c)| *c == style.color)
            .map(|(name, _)| name.to_string())
            .unwrap_or_else(|| style.color.to_string());
        egui::ComboBox::from_id_source("style_color")
            .selected_text(color_name)
            .show_ui(ui, |ui| {
                for (name, color) in PALETTE {
                    ui.selectable_value(&mut style.color, color, name);
                }
            });

        egui::ComboBox::from_id_source("style_line")
            .selected_text(style.line_style.name())
            .show_ui(ui, |ui| {
                for line_style in LineStyle::ALL {
                    ui.selectable_value(&mut style.line_style, line_style, line_style.name());
                }
            });

        egui::ComboBox::from_id_source("style_width")
            .selected_text(format!("{}px", style.line_width))
            .show_ui(ui, |ui| {
                for width in LINE_WIDTHS {
                    ui.selectable_value(&mut style.line_width, width, format!("{}px", width));
                }
            });

        ui.separator();

        ui.label("Labels:");
        ui.selectable_value(&mut style.label_style, LabelStyle::Number, "# Number");
        ui.selectable_value(&mut style.label_style, LabelStyle::Custom, "✎ Custom");

        ui.separator();

        if ui.button("Reset Style").clicked() {
            style = AnnotationStyle::default();
        }
    });

    (style != *current).then_some(style)
}
