// Copyright (c) 2025, Jason Jenkins
// SPDX-License-Identifier: BSD-3-Clause

//! Transient notifications shown in the top-right corner.

use std::collections::VecDeque;
use std::time::{Duration, Instant};

/// How long a notification stays on screen.
pub const DISPLAY_TIME: Duration = Duration::from_secs(3);
const MAX_VISIBLE: usize = 4;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Severity {
    Info,
    Success,
    Error,
}

#[derive(Debug, Clone)]
pub struct Notification {
    pub message: String,
    pub severity: Severity,
    shown_at: Instant,
}

#[derive(Debug, Default)]
pub struct Notifications {
    items: VecDeque<Notification>,
}

impl Notifications {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, severity: Severity, message: impl Into<String>) {
        self.push_at(severity, message.into(), Instant::now());
    }

    fn push_at(&mut self, severity: Severity, message: String, now: Instant) {
        self.items.push_back(Notification {
            message,
            severity,
            shown_at: now,
        });
        while self.items.len() > MAX_VISIBLE {
            self.items.pop_front();
        }
    }

    pub fn info(&mut self, message: impl Into<String>) {
        self.push(Severity::Info, message);
    }

    pub fn success(&mut self, message: impl Into<String>) {
        self.push(Severity::Success, message);
    }

    pub fn error(&mut self, message: impl Into<String>) {
        self.push(Severity::Error, message);
    }

    /// Drop expired notifications.
    fn prune(&mut self, now: Instant) {
        self.items
            .retain(|n| now.saturating_duration_since(n.shown_at) < DISPLAY_TIME);
    }

    #[cfg(test)]
    fn visible(&self) -> impl Iterator<Item = &Notification> {
        self.items.iter()
    }

    /// Draw the live notifications and schedule a repaint for when the next
    /// one expires.
    pub fn show(&mut self, ctx: &egui::Context) {
        let now = Instant::now();
        self.prune(now);
        let Some(oldest) = self.items.front() else {
            return;
        };
        let remaining = DISPLAY_TIME.saturating_sub(now.saturating_duration_since(oldest.shown_at));
        ctx.request_repaint_after(remaining);

        egui::Area::new(egui::Id::new("notifications"))
            .anchor(egui::Align2::RIGHT_TOP, egui::vec2(-12.0, 40.0))
            .order(egui::Order::Foreground)
            .show(ctx, |ui| {
                for n in &self.items {
                    let (fill, text) = match n.severity {
                        Severity::Info => (egui::Color32::from_rgb(33, 80, 140), egui::Color32::WHITE),
                        Severity::Success => (egui::Color32::from_rgb(36, 110, 50), egui::Color32::WHITE),
                        Severity::Error => (egui::Color32::from_rgb(150, 35, 35), egui::Color32::WHITE),
                    };
                    egui::Frame::none()
                        .fill(fill)
                        .rounding(6.0)
                        .inner_margin(egui::Margin::symmetric(10.0, 6.0))
                        .show(ui, |ui| {
                            ui.label(egui::RichText::new(&n.message).color(text));
                        });
                    ui.add_space(4.0);
                }
            });
    }
}
