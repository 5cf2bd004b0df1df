// Copyright 2026 the Strata Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Change draining.
//!
//! Every stamp, reclassification and selection change marks a dirty channel
//! (see [`dirty`](crate::dirty)). Draining collects each channel in
//! deterministic order and moves the lifecycle lists out of the store.
//!
//! [`KeyChanges`] uses raw slot indices (`u32`) rather than [`ItemId`]
//! handles so that a compositor can look values up directly through the
//! `*_at()` accessors (e.g. [`key_at`](super::ItemStore::key_at)) without
//! carrying handles around.
//!
//! [`ItemId`]: super::ItemId

use alloc::vec::Vec;

use super::store::ItemStore;
use crate::dirty;

/// The set of changes accumulated since the previous drain.
///
/// A slot removed and reused within one drain window can appear in both
/// `removed` and `added`.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct KeyChanges {
    /// Items whose display key changed.
    pub keys: Vec<u32>,
    /// Items moved to another category.
    pub categories: Vec<u32>,
    /// Items selected or deselected.
    pub selection: Vec<u32>,
    /// Items inserted since the last drain.
    pub added: Vec<u32>,
    /// Items removed since the last drain.
    pub removed: Vec<u32>,
}

impl KeyChanges {
    /// Clears all change lists.
    pub fn clear(&mut self) {
        self.keys.clear();
        self.categories.clear();
        self.selection.clear();
        self.added.clear();
        self.removed.clear();
    }

    /// Returns whether nothing changed.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.keys.is_empty()
            && self.categories.is_empty()
            && self.selection.is_empty()
            && self.added.is_empty()
            && self.removed.is_empty()
    }
}

impl ItemStore {
    /// Drains every dirty channel and returns the accumulated changes.
    pub fn drain_changes(&mut self) -> KeyChanges {
        let mut changes = KeyChanges::default();
        self.drain_changes_into(&mut changes);
        changes
    }

    /// Like [`drain_changes`](Self::drain_changes), but reuses a
    /// caller-provided buffer to avoid allocation.
    pub fn drain_changes_into(&mut self, changes: &mut KeyChanges) {
        changes.clear();
        changes.keys = self.dirty.drain(dirty::KEY).deterministic().run().collect();
        changes.categories = self
            .dirty
            .drain(dirty::CATEGORY)
            .deterministic()
            .run()
            .collect();
        changes.selection = self
            .dirty
            .drain(dirty::SELECTION)
            .deterministic()
            .run()
            .collect();

        core::mem::swap(&mut self.pending_added, &mut changes.added);
        core::mem::swap(&mut self.pending_removed, &mut changes.removed);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::category::{ItemKind, ItemTag, LayerCategory};
    use crate::item::INVALID;
    use crate::scene::LayerScene;

    fn stroke() -> ItemTag {
        ItemTag::new(ItemKind::Stroke)
    }

    #[test]
    fn first_drain_reports_additions() {
        let mut store = ItemStore::new();
        let a = store.insert(stroke(), LayerCategory::Drawing, 0.0, None);
        let changes = store.drain_changes();
        assert_eq!(changes.added, [a.index()]);
        assert!(changes.keys.is_empty(), "insertion is not a key change");
        assert!(store.drain_changes().is_empty(), "second drain is empty");
    }

    #[test]
    fn set_key_marks_key_channel() {
        let mut store = ItemStore::new();
        let a = store.insert(stroke(), LayerCategory::Drawing, 0.0, None);
        let _ = store.drain_changes();

        store.set_key(a, 4.0);
        let changes = store.drain_changes();
        assert_eq!(changes.keys, [a.index()]);
        assert_eq!(store.key_at(a.index()), Some(4.0));
    }

    #[test]
    fn raw_slots_resolve_to_current_handles() {
        let mut store = ItemStore::new();
        let a = store.insert(stroke(), LayerCategory::Drawing, 0.0, None);
        store.remove(a);
        let changes = store.drain_changes();
        assert_eq!(store.id_at_slot(changes.removed[0]), None, "slot is free");

        let b = store.insert(stroke(), LayerCategory::Drawing, 1.0, None);
        let changes = store.drain_changes();
        assert_eq!(store.id_at_slot(changes.added[0]), Some(b));
        assert_eq!(b.generation(), a.generation() + 1, "slot was recycled");
        assert_eq!(store.category_at(INVALID), None);
    }

    #[test]
    fn category_and_selection_channels_are_independent() {
        let mut store = ItemStore::new();
        let a = store.insert(stroke(), LayerCategory::Drawing, 0.0, None);
        let b = store.insert(stroke(), LayerCategory::Drawing, 1.0, None);
        let _ = store.drain_changes();

        store.set_category(a, LayerCategory::Tool);
        store.lift(b, 50.0);
        let changes = store.drain_changes();
        assert_eq!(changes.categories, [a.index()]);
        assert_eq!(store.category_at(a.index()), Some(LayerCategory::Tool));
        assert_eq!(changes.selection, [b.index()]);
        assert_eq!(changes.keys, [b.index()], "lift changes the display key");
    }

    #[test]
    fn removed_items_drop_pending_marks() {
        let mut store = ItemStore::new();
        let a = store.insert(stroke(), LayerCategory::Drawing, 0.0, None);
        let _ = store.drain_changes();

        store.set_key(a, 2.0);
        store.remove(a);
        let changes = store.drain_changes();
        assert!(changes.keys.is_empty(), "removed item leaves no key mark");
        assert_eq!(changes.removed, [a.index()]);
    }

    #[test]
    fn drain_into_reuses_buffer() {
        let mut store = ItemStore::new();
        let mut changes = KeyChanges::default();
        let _ = store.insert(stroke(), LayerCategory::Drawing, 0.0, None);
        store.drain_changes_into(&mut changes);
        assert_eq!(changes.added.len(), 1);
        store.drain_changes_into(&mut changes);
        assert!(changes.is_empty(), "stale entries are cleared");
    }
}
