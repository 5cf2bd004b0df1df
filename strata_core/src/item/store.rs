// Copyright 2026 the Strata Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Struct-of-arrays item storage with allocation, category membership and key stamping.

use alloc::vec::Vec;

use kurbo::Rect;
use understory_dirty::{CycleHandling, DirtyTracker};

use super::id::ItemId;
use crate::category::{ItemTag, LayerCategory};
use crate::dirty;
use crate::scene::LayerScene;

/// Struct-of-arrays storage for all scene items.
///
/// Items are addressed by [`ItemId`] handles. Internally, each item occupies
/// a slot in parallel arrays. Removed items are recycled via a free list,
/// and generation counters make stale handles miss instead of aliasing the
/// slot's new occupant.
///
/// Every item carries two keys: its *own* key, allocated and mutated by the
/// [`LayerManager`](crate::manager::LayerManager), and an optional *lifted*
/// key that overrides it for compositing while the item is selected.
#[derive(Debug)]
pub struct ItemStore {
    // -- Classification --
    pub(crate) tag: Vec<ItemTag>,
    pub(crate) category: Vec<LayerCategory>,

    // -- Ordering --
    pub(crate) own_key: Vec<f64>,
    pub(crate) lifted_key: Vec<Option<f64>>,
    pub(crate) seq: Vec<i64>,

    // -- Geometry --
    pub(crate) bounds: Vec<Option<Rect>>,

    // -- Allocation --
    pub(crate) generation: Vec<u32>,
    pub(crate) live: Vec<bool>,
    pub(crate) free_list: Vec<u32>,
    pub(crate) len: u32,
    pub(crate) live_count: u32,
    pub(crate) next_seq: i64,
    pub(crate) next_back_seq: i64,

    // -- Category membership cache --
    pub(crate) members: [Vec<u32>; LayerCategory::COUNT],

    // -- Dirty tracking --
    pub(crate) dirty: DirtyTracker<u32>,

    // -- Lifecycle tracking --
    pub(crate) pending_added: Vec<u32>,
    pub(crate) pending_removed: Vec<u32>,
}

impl Default for ItemStore {
    fn default() -> Self {
        Self::new()
    }
}

impl ItemStore {
    /// Creates an empty item store.
    #[must_use]
    pub fn new() -> Self {
        Self {
            tag: Vec::new(),
            category: Vec::new(),
            own_key: Vec::new(),
            lifted_key: Vec::new(),
            seq: Vec::new(),
            bounds: Vec::new(),
            generation: Vec::new(),
            live: Vec::new(),
            free_list: Vec::new(),
            len: 0,
            live_count: 0,
            next_seq: 0,
            next_back_seq: -1,
            members: core::array::from_fn(|_| Vec::new()),
            dirty: DirtyTracker::with_cycle_handling(CycleHandling::Error),
            pending_added: Vec::new(),
            pending_removed: Vec::new(),
        }
    }

    // -- Allocation --

    /// Stores a new item that was already classified and given a key.
    pub(crate) fn insert(
        &mut self,
        tag: ItemTag,
        category: LayerCategory,
        key: f64,
        bounds: Option<Rect>,
    ) -> ItemId {
        let seq = self.next_seq;
        self.next_seq += 1;

        let idx = if let Some(idx) = self.free_list.pop() {
            let i = idx as usize;
            self.generation[i] = self.generation[i].wrapping_add(1);
            self.tag[i] = tag;
            self.category[i] = category;
            self.own_key[i] = key;
            self.lifted_key[i] = None;
            self.seq[i] = seq;
            self.bounds[i] = bounds;
            self.live[i] = true;
            idx
        } else {
            let idx = self.len;
            self.len += 1;
            self.tag.push(tag);
            self.category.push(category);
            self.own_key.push(key);
            self.lifted_key.push(None);
            self.seq.push(seq);
            self.bounds.push(bounds);
            self.generation.push(0);
            self.live.push(true);
            idx
        };

        self.live_count += 1;
        self.members[category.index()].push(idx);
        self.pending_added.push(idx);

        ItemId {
            idx,
            generation: self.generation[idx as usize],
        }
    }

    /// Removes an item, returning its category and own key.
    ///
    /// The item leaves the membership cache and the dirty tracker at once,
    /// so no later sibling lookup or drain can see it.
    pub(crate) fn remove(&mut self, id: ItemId) -> Option<(LayerCategory, f64)> {
        let i = self.slot(id)?;
        let category = self.category[i];
        self.unlink_member(id.idx, category);
        self.dirty.remove_key(id.idx);

        self.live[i] = false;
        self.lifted_key[i] = None;
        self.live_count -= 1;
        self.free_list.push(id.idx);
        self.pending_removed.push(id.idx);
        Some((category, self.own_key[i]))
    }

    /// Returns whether the given handle refers to a live item.
    #[must_use]
    pub fn is_alive(&self, id: ItemId) -> bool {
        self.slot(id).is_some()
    }

    /// Returns the number of live items.
    #[must_use]
    pub fn len(&self) -> usize {
        self.live_count as usize
    }

    /// Returns whether the store holds no live items.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.live_count == 0
    }

    /// Iterates over every live item in slot order.
    pub fn iter(&self) -> impl Iterator<Item = ItemId> + '_ {
        (0..self.len)
            .filter(|&idx| self.live[idx as usize])
            .map(|idx| self.id_at(idx))
    }

    /// Iterates over the live items of `category`, in no particular order.
    pub fn members(&self, category: LayerCategory) -> impl Iterator<Item = ItemId> + '_ {
        self.members[category.index()]
            .iter()
            .map(|&idx| self.id_at(idx))
    }

    /// Returns the number of live items in `category`.
    #[must_use]
    pub fn member_count(&self, category: LayerCategory) -> usize {
        self.members[category.index()].len()
    }

    // -- Getters --

    /// Returns the item's classification metadata.
    #[must_use]
    pub fn tag(&self, id: ItemId) -> Option<ItemTag> {
        self.slot(id).map(|i| self.tag[i])
    }

    /// Returns the category the item was stamped with.
    #[must_use]
    pub fn category(&self, id: ItemId) -> Option<LayerCategory> {
        self.slot(id).map(|i| self.category[i])
    }

    /// Returns the key the item is composited with.
    ///
    /// This is the lifted selection key while the item is selected and its
    /// own key otherwise.
    #[must_use]
    pub fn key(&self, id: ItemId) -> Option<f64> {
        self.slot(id).map(|i| self.display_key(i))
    }

    /// Returns the key allocated to the item, ignoring any selection lift.
    #[must_use]
    pub fn own_key(&self, id: ItemId) -> Option<f64> {
        self.slot(id).map(|i| self.own_key[i])
    }

    /// Returns the item's visual region, if it has one.
    #[must_use]
    pub fn bounds(&self, id: ItemId) -> Option<Rect> {
        self.slot(id).and_then(|i| self.bounds[i])
    }

    /// Returns whether the item's display key is lifted.
    #[must_use]
    pub fn is_selected(&self, id: ItemId) -> bool {
        self.slot(id).is_some_and(|i| self.lifted_key[i].is_some())
    }

    /// Returns the rank that orders the item among items with an equal key.
    ///
    /// This is the insertion sequence number, or a negative rank once the
    /// item was clamped to the back of its category.
    #[must_use]
    pub fn seq(&self, id: ItemId) -> Option<i64> {
        self.slot(id).map(|i| self.seq[i])
    }

    // -- Raw-index accessors --
    //
    // These accept raw slot indices (as found in `KeyChanges`) rather than
    // `ItemId` handles. They return `None` for free or out-of-range slots.

    /// Returns the display key at raw slot `idx`.
    #[must_use]
    pub fn key_at(&self, idx: u32) -> Option<f64> {
        self.live_slot(idx).map(|i| self.display_key(i))
    }

    /// Returns the category at raw slot `idx`.
    #[must_use]
    pub fn category_at(&self, idx: u32) -> Option<LayerCategory> {
        self.live_slot(idx).map(|i| self.category[i])
    }

    /// Returns the live handle at raw slot `idx`.
    #[must_use]
    pub fn id_at_slot(&self, idx: u32) -> Option<ItemId> {
        self.live_slot(idx).map(|_| self.id_at(idx))
    }

    // -- Mutation --

    /// Replaces the item's visual region. Returns `false` for stale handles.
    pub(crate) fn set_bounds(&mut self, id: ItemId, bounds: Option<Rect>) -> bool {
        let Some(i) = self.slot(id) else {
            return false;
        };
        self.bounds[i] = bounds;
        true
    }

    /// Overrides the display key with `key`.
    pub(crate) fn lift(&mut self, id: ItemId, key: f64) -> bool {
        let Some(i) = self.slot(id) else {
            return false;
        };
        self.lifted_key[i] = Some(key);
        self.dirty.mark(id.idx, dirty::SELECTION);
        self.dirty.mark(id.idx, dirty::KEY);
        true
    }

    /// Drops the display key override. Returns whether one was present.
    pub(crate) fn unlift(&mut self, id: ItemId) -> bool {
        let Some(i) = self.slot(id) else {
            return false;
        };
        if self.lifted_key[i].take().is_none() {
            return false;
        }
        self.dirty.mark(id.idx, dirty::SELECTION);
        self.dirty.mark(id.idx, dirty::KEY);
        true
    }

    /// Ranks the item below every item it may tie with.
    ///
    /// Used when send-to-back clamps an item onto a key that is already
    /// taken. Returns `false` for stale handles.
    pub(crate) fn send_behind_ties(&mut self, id: ItemId) -> bool {
        let Some(i) = self.slot(id) else {
            return false;
        };
        self.seq[i] = self.next_back_seq;
        self.next_back_seq -= 1;
        true
    }

    /// Returns the live items of `category` in own-key order, ties broken by
    /// insertion sequence.
    pub(crate) fn members_by_key(&self, category: LayerCategory) -> Vec<ItemId> {
        let mut slots = self.members[category.index()].clone();
        slots.sort_by(|&a, &b| {
            let (a, b) = (a as usize, b as usize);
            self.own_key[a]
                .total_cmp(&self.own_key[b])
                .then(self.seq[a].cmp(&self.seq[b]))
        });
        slots.into_iter().map(|idx| self.id_at(idx)).collect()
    }

    /// Removes every live item in `category`. Returns the removed handles.
    pub(crate) fn remove_category(&mut self, category: LayerCategory) -> Vec<ItemId> {
        let doomed: Vec<_> = self.members(category).collect();
        for &id in &doomed {
            self.remove(id);
        }
        doomed
    }

    // -- Internal helpers --

    /// Returns the array index for a live handle.
    fn slot(&self, id: ItemId) -> Option<usize> {
        let i = id.idx as usize;
        (id.idx < self.len && self.live[i] && self.generation[i] == id.generation).then_some(i)
    }

    fn live_slot(&self, idx: u32) -> Option<usize> {
        (idx < self.len && self.live[idx as usize]).then_some(idx as usize)
    }

    fn id_at(&self, idx: u32) -> ItemId {
        ItemId {
            idx,
            generation: self.generation[idx as usize],
        }
    }

    pub(crate) fn display_key(&self, i: usize) -> f64 {
        self.lifted_key[i].unwrap_or(self.own_key[i])
    }

    fn unlink_member(&mut self, idx: u32, category: LayerCategory) {
        let list = &mut self.members[category.index()];
        if let Some(pos) = list.iter().position(|&m| m == idx) {
            list.swap_remove(pos);
        }
    }
}

impl LayerScene for ItemStore {
    type Item = ItemId;

    fn index_of(&self, item: ItemId) -> u32 {
        item.idx
    }

    fn tag(&self, item: ItemId) -> Option<ItemTag> {
        Self::tag(self, item)
    }

    fn category(&self, item: ItemId) -> Option<LayerCategory> {
        Self::category(self, item)
    }

    /// Reordering always works on own keys, never on the selection lift.
    fn key(&self, item: ItemId) -> Option<f64> {
        self.own_key(item)
    }

    fn set_key(&mut self, item: ItemId, key: f64) {
        if let Some(i) = self.slot(item) {
            self.own_key[i] = key;
            self.dirty.mark(item.idx, dirty::KEY);
        }
    }

    fn set_category(&mut self, item: ItemId, category: LayerCategory) {
        let Some(i) = self.slot(item) else {
            return;
        };
        let old = self.category[i];
        if old == category {
            return;
        }
        self.unlink_member(item.idx, old);
        self.members[category.index()].push(item.idx);
        self.category[i] = category;
        self.dirty.mark(item.idx, dirty::CATEGORY);
    }

    fn siblings(&self, item: ItemId, out: &mut Vec<ItemId>) {
        let Some(i) = self.slot(item) else {
            return;
        };
        out.extend(self.overlapping(self.category[i], self.bounds[i]));
    }
}
