// Copyright (c) 2025, Jason Jenkins
// SPDX-License-Identifier: BSD-3-Clause

//! The user's image list and which image is open.

use crate::models::{annotation::BoundingBox, image::ImageRecord};

#[derive(Debug, Default)]
pub struct Gallery {
    images: Vec<ImageRecord>,
    current: usize,
}

impl Gallery {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn images(&self) -> &[ImageRecord] {
        &self.images
    }

    pub fn len(&self) -> usize {
        self.images.len()
    }

    pub fn is_empty(&self) -> bool {
        self.images.is_empty()
    }

    pub fn current_index(&self) -> Option<usize> {
        (!self.images.is_empty()).then_some(self.current)
    }

    pub fn current(&self) -> Option<&ImageRecord> {
        self.images.get(self.current)
    }

    /// Replace the list after a fetch, staying on the same image when it is
    /// still present.
    pub fn replace(&mut self, images: Vec<ImageRecord>) {
        let keep = self.current().map(|r| r.id.clone());
        self.images = images;
        self.current = keep
            .and_then(|id| self.images.iter().position(|r| r.id == id))
            .unwrap_or(0);
    }

    /// Append freshly uploaded images.
    pub fn append(&mut self, images: Vec<ImageRecord>) {
        self.images.extend(images);
    }

    /// Drop an image; the selection moves to its neighbour.
    pub fn remove(&mut self, id: &str) -> Option<ImageRecord> {
        let index = self.images.iter().position(|r| r.id == id)?;
        let removed = self.images.remove(index);
        if self.current > index || self.current >= self.images.len() {
            self.current = self.current.saturating_sub(1);
        }
        Some(removed)
    }

    /// Record the boxes the backend acknowledged for an image.
    pub fn update_boxes(&mut self, id: &str, boxes: &[BoundingBox]) {
        if let Some(record) = self.images.iter_mut().find(|r| r.id == id) {
            record.bounding_boxes = boxes.to_vec();
        }
    }

    /// Open the image at `index`. Returns false when out of range or already open.
    pub fn select(&mut self, index: usize) -> bool {
        if index >= self.images.len() || index == self.current {
            return false;
        }
        self.current = index;
        true
    }

    pub fn next(&mut self) -> bool {
        self.select(self.current + 1)
    }

    pub fn previous(&mut self) -> bool {
        self.current > 0 && self.select(self.current - 1)
    }

    pub fn first(&mut self) -> bool {
        self.select(0)
    }

    pub fn last(&mut self) -> bool {
        !self.images.is_empty() && self.select(self.images.len() - 1)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn records(ids: &[&str]) -> Vec<ImageRecord> {
        ids.iter()
            .map(|id| ImageRecord::new(*id, format!("/uploads/{}.png", id)))
            .collect()
    }

    #[test]
    fn test_navigation_bounds() {
        let mut g = Gallery::new();
        assert!(!g.next());
        assert_eq!(g.current_index(), None);

        g.replace(records(&["a", "b", "c"]));
        assert_eq!(g.current_index(), Some(0));
        assert!(!g.previous());
        assert!(g.next());
        assert!(g.last());
        assert_eq!(g.current().unwrap().id, "c");
        assert!(!g.next());
        assert!(g.first());
        assert_eq!(g.current_index(), Some(0));
    }

    #[test]
    fn test_replace_keeps_open_image() {
        let mut g = Gallery::new();
        g.replace(records(&["a", "b", "c"]));
        g.select(2);
        g.replace(records(&["c", "d"]));
        assert_eq!(g.current().unwrap().id, "c");
    }

    #[test]
    fn test_remove_moves_to_neighbour() {
        let mut g = Gallery::new();
        g.replace(records(&["a", "b", "c"]));
        g.select(2);
        g.remove("c");
        assert_eq!(g.current().unwrap().id, "b");

        g.remove("a");
        assert_eq!(g.current().unwrap().id, "b");
        assert!(g.remove("zzz").is_none());
    }

    #[test]
    fn test_update_boxes() {
        let mut g = Gallery::new();
        g.replace(records(&["a"]));
        g.update_boxes("a", &[BoundingBox::new(1.0, 2.0, 3.0, 4.0)]);
        assert_eq!(g.current().unwrap().bounding_boxes.len(), 1);
    }
}
