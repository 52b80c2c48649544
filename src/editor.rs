// Copyright (c) 2025, Jason Jenkins
// SPDX-License-Identifier: BSD-3-Clause

//! Bounding box editor state machine.
//!
//! The editor owns the box list of the open image and turns pointer events
//! into edits. It is independent of any widget toolkit: the canvas feeds it
//! points in image pixel coordinates and asks it for a [`Scene`] to draw.
//!
//! Modes:
//!
//! - `Idle`: waiting for a pointer press.
//! - `Drawing`: a new box is being dragged out from an anchor.
//! - `Dragging`: an existing box follows the pointer.
//! - `Resizing`: an existing box grows/shrinks from its origin.
//!
//! A pointer press over a box (or one of its corner handles) always wins over
//! starting a new box. Boxes are probed in list order and the first hit wins,
//! so when boxes overlap the earlier one is picked regardless of how they
//! look on screen.

use crate::io::backend::BackendResult;
use crate::io::preferences::{self, PreferenceStore};
use crate::models::{
    annotation::{BoundingBox, Corner, Point},
    image::ImageRecord,
    style::AnnotationStyle,
};
use crate::render::Scene;

/// Behaviour switches for the editor.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct EditorOptions {
    /// Normalize a box after every resize step instead of letting width and
    /// height go negative when dragged past the opposite edge.
    pub normalize_on_resize: bool,
}

/// Current interaction.
#[derive(Debug, Clone, PartialEq)]
pub enum Mode {
    Idle,
    Drawing { anchor: Point, pending: BoundingBox },
    Dragging { index: usize, last: Point },
    Resizing { index: usize, corner: Corner, last: Point },
}

/// What part of a box a point landed on.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HitKind {
    Body,
    Handle(Corner),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Hit {
    pub index: usize,
    pub kind: HitKind,
}

/// Find the first box, in list order, whose handles or body contain `point`.
///
/// This is a plain linear scan on purpose: the tie-break between overlapping
/// boxes is list order.
pub fn hit_test(boxes: &[BoundingBox], point: Point) -> Option<Hit> {
    boxes.iter().enumerate().find_map(|(index, b)| {
        if let Some(corner) = b.handle_at(point) {
            Some(Hit {
                index,
                kind: HitKind::Handle(corner),
            })
        } else if b.contains(point) {
            Some(Hit {
                index,
                kind: HitKind::Body,
            })
        } else {
            None
        }
    })
}

/// Snapshot of the box list to send to the backend.
#[derive(Debug, Clone, PartialEq)]
pub struct SaveRequest {
    pub image_id: String,
    pub boxes: Vec<BoundingBox>,
}

/// The annotation editor for one open image at a time.
pub struct Editor {
    image: Option<ImageRecord>,
    boxes: Vec<BoundingBox>,
    selected: Option<usize>,
    mode: Mode,
    style: AnnotationStyle,
    preferences: Box<dyn PreferenceStore>,
    options: EditorOptions,
}

impl Editor {
    /// Create an editor. The style is read from `preferences` once, here.
    pub fn new(preferences: Box<dyn PreferenceStore>, options: EditorOptions) -> Self {
        let style = preferences::load_style(preferences.as_ref());
        Self {
            image: None,
            boxes: Vec::new(),
            selected: None,
            mode: Mode::Idle,
            style,
            preferences,
            options,
        }
    }

    /// Open an image, replacing the box list wholesale.
    pub fn load(&mut self, record: ImageRecord) {
        log::info!(
            "Opened image {} with {} box(es)",
            record.id,
            record.bounding_boxes.len()
        );
        self.boxes = record.bounding_boxes.clone();
        self.image = Some(record);
        self.selected = None;
        self.mode = Mode::Idle;
    }

    /// Close the open image.
    pub fn clear(&mut self) {
        self.image = None;
        self.boxes.clear();
        self.selected = None;
        self.mode = Mode::Idle;
    }

    pub fn image(&self) -> Option<&ImageRecord> {
        self.image.as_ref()
    }

    pub fn image_id(&self) -> Option<&str> {
        self.image.as_ref().map(|i| i.id.as_str())
    }

    pub fn boxes(&self) -> &[BoundingBox] {
        &self.boxes
    }

    pub fn selected(&self) -> Option<usize> {
        self.selected
    }

    #[cfg(test)]
    pub fn mode(&self) -> &Mode {
        &self.mode
    }

    /// Whether a pointer interaction is in progress.
    pub fn is_interacting(&self) -> bool {
        self.mode != Mode::Idle
    }

    /// The box currently being drawn, if any.
    pub fn pending(&self) -> Option<&BoundingBox> {
        match &self.mode {
            Mode::Drawing { pending, .. } => Some(pending),
            _ => None,
        }
    }

    pub fn style(&self) -> &AnnotationStyle {
        &self.style
    }

    /// Change the display style and persist it.
    ///
    /// The new style is applied even when it cannot be written; the error is
    /// returned so the caller can report it.
    pub fn set_style(&mut self, style: AnnotationStyle) -> anyhow::Result<()> {
        if style == self.style {
            return Ok(());
        }
        self.style = style;
        preferences::store_style(self.preferences.as_mut(), &self.style)
    }

    /// What the pointer is over, for cursor feedback.
    pub fn hover(&self, point: Point) -> Option<HitKind> {
        hit_test(&self.boxes, point).map(|hit| hit.kind)
    }

    /// Pointer pressed at `point`.
    pub fn pointer_down(&mut self, point: Point) {
        if self.mode != Mode::Idle {
            // The release was lost (e.g. focus change); finish that first.
            self.pointer_up();
        }

        self.mode = match hit_test(&self.boxes, point) {
            Some(Hit {
                index,
                kind: HitKind::Handle(corner),
            }) => {
                self.selected = Some(index);
                Mode::Resizing {
                    index,
                    corner,
                    last: point,
                }
            }
            Some(Hit {
                index,
                kind: HitKind::Body,
            }) => {
                self.selected = Some(index);
                Mode::Dragging { index, last: point }
            }
            None => {
                self.selected = None;
                Mode::Drawing {
                    anchor: point,
                    pending: BoundingBox::new(point.x, point.y, 0.0, 0.0),
                }
            }
        };
    }

    /// Pointer moved to `point`. Ignored while idle.
    pub fn pointer_move(&mut self, point: Point) {
        let normalize = self.options.normalize_on_resize;
        match &mut self.mode {
            Mode::Idle => {}
            Mode::Drawing { anchor, pending } => {
                pending.width = point.x - anchor.x;
                pending.height = point.y - anchor.y;
            }
            Mode::Dragging { index, last } => {
                if let Some(b) = self.boxes.get_mut(*index) {
                    b.translate(point.x - last.x, point.y - last.y);
                }
                *last = point;
            }
            Mode::Resizing { index, last, .. } => {
                if let Some(b) = self.boxes.get_mut(*index) {
                    b.resize_by(point.x - last.x, point.y - last.y);
                    if normalize {
                        *b = b.normalized();
                    }
                }
                *last = point;
            }
        }
    }

    /// Pointer released. Commits a box being drawn.
    pub fn pointer_up(&mut self) {
        match std::mem::replace(&mut self.mode, Mode::Idle) {
            Mode::Drawing { pending, .. } => {
                self.boxes.push(pending.normalized());
                self.selected = Some(self.boxes.len() - 1);
                log::debug!("Added box, total: {}", self.boxes.len());
            }
            Mode::Dragging { index, .. } | Mode::Resizing { index, .. } => {
                log::debug!("Finished editing box {}", index);
            }
            Mode::Idle => {}
        }
    }

    /// Pointer left the canvas; ends the interaction like a release.
    pub fn pointer_leave(&mut self) {
        self.pointer_up();
    }

    /// Select a box from outside the canvas (e.g. the box list).
    pub fn select(&mut self, index: Option<usize>) {
        self.selected = index.filter(|&i| i < self.boxes.len());
    }

    /// Remove the box at `index`. Clears the selection if it was selected.
    pub fn delete(&mut self, index: usize) -> Option<BoundingBox> {
        if index >= self.boxes.len() {
            return None;
        }
        let removed = self.boxes.remove(index);

        self.selected = match self.selected {
            Some(s) if s == index => None,
            Some(s) if s > index => Some(s - 1),
            other => other,
        };

        if let Mode::Dragging { index: i, .. } | Mode::Resizing { index: i, .. } = &mut self.mode {
            if *i > index {
                *i -= 1;
            } else if *i == index {
                self.mode = Mode::Idle;
            }
        }

        log::info!("Deleted box {}, total: {}", index + 1, self.boxes.len());
        Some(removed)
    }

    /// Set or clear the custom label of a box.
    pub fn set_label(&mut self, index: usize, label: Option<String>) {
        if let Some(b) = self.boxes.get_mut(index) {
            b.label = label.filter(|l| !l.trim().is_empty());
        }
    }

    /// The data a save should send, or `None` with no image open.
    pub fn save_request(&self) -> Option<SaveRequest> {
        self.image_id().map(|id| SaveRequest {
            image_id: id.to_string(),
            boxes: self.boxes.clone(),
        })
    }

    /// Apply the outcome of a save.
    ///
    /// On success the box list is replaced by the persisted one, provided the
    /// acknowledged image is still the one open. On failure nothing changes
    /// and the error is handed back for reporting.
    pub fn apply_save_result(&mut self, result: BackendResult<ImageRecord>) -> BackendResult<()> {
        let record = result.map_err(|e| {
            log::error!("Failed to save annotations: {}", e);
            e
        })?;

        if self.image_id() != Some(record.id.as_str()) {
            log::debug!("Ignoring save acknowledgment for {}", record.id);
            return Ok(());
        }

        log::info!(
            "Saved {} box(es) for image {}",
            record.bounding_boxes.len(),
            record.id
        );
        self.boxes = record.bounding_boxes.clone();
        self.image = Some(record);

        let len = self.boxes.len();
        self.selected = self.selected.filter(|&i| i < len);
        if let Mode::Dragging { index, .. } | Mode::Resizing { index, .. } = self.mode {
            if index >= len {
                self.mode = Mode::Idle;
            }
        }
        Ok(())
    }

    /// Everything needed to draw the current state.
    pub fn scene(&self, image_size: Option<(u32, u32)>) -> Scene<'_> {
        Scene {
            image_size,
            boxes: &self.boxes,
            selected: self.selected,
            pending: self.pending(),
            style: &self.style,
        }
    }
}
