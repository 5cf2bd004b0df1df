// Copyright 2026 the Strata Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Tracing and diagnostics for key operations.
//!
//! This module provides a [`TraceSink`] trait with per-event methods that
//! registry instrumentation calls after each operation. All method bodies
//! default to no-ops, so implementing only the events you care about is fine.
//!
//! Nothing in this crate emits events on its own. Registry operations return
//! outcome values ([`Inserted`], [`Reordered`], ...) and the caller converts
//! them into events with `From` and hands them to a [`Tracer`].
//!
//! [`Tracer`] wraps an optional `&mut dyn TraceSink`. When the `trace` feature
//! is **off**, every `Tracer` method compiles to nothing (zero overhead). When
//! **on**, each method performs a single `Option` branch before dispatching.
//!
//! # Crate features
//!
//! - `trace`: enables the `Tracer` method bodies (one branch per call).
//! - `trace-rich` (implies `trace`): gates [`PaintEntry`] events plus the
//!   corresponding `TraceSink` method.

#[cfg(feature = "trace-rich")]
use alloc::vec::Vec;

use crate::category::LayerCategory;
use crate::error::KeyError;
use crate::item::{INVALID, ItemId};
use crate::manager::Reorder;
use crate::registry::{Compaction, Inserted, ItemRegistry, Reclassified, Removed, Reordered};
use crate::scene::MoveDestination;
use crate::scope::RangeState;

// ---------------------------------------------------------------------------
// Enums
// ---------------------------------------------------------------------------

/// Which registry operation an event describes.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum OpKind {
    /// Item insertion.
    Insert,
    /// Item removal.
    Remove,
    /// Relative reorder.
    Reorder,
    /// Move to another category.
    Reclassify,
    /// Selection lift.
    Select,
    /// Selection drop.
    Deselect,
    /// Category compaction.
    Compact,
}

impl OpKind {
    /// All operation kinds.
    pub const ALL: [Self; 7] = [
        Self::Insert,
        Self::Remove,
        Self::Reorder,
        Self::Reclassify,
        Self::Select,
        Self::Deselect,
        Self::Compact,
    ];

    /// Returns a short name for diagnostics.
    #[must_use]
    pub const fn name(self) -> &'static str {
        match self {
            Self::Insert => "insert",
            Self::Remove => "remove",
            Self::Reorder => "reorder",
            Self::Reclassify => "reclassify",
            Self::Select => "select",
            Self::Deselect => "deselect",
            Self::Compact => "compact",
        }
    }
}

// ---------------------------------------------------------------------------
// Event structs
// ---------------------------------------------------------------------------

/// Emitted after an item is registered.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct InsertEvent {
    /// Slot index of the new item.
    pub item: u32,
    /// Category the item was classified into.
    pub category: LayerCategory,
    /// Key the item was stamped with.
    pub key: f64,
}

impl From<&Inserted> for InsertEvent {
    fn from(outcome: &Inserted) -> Self {
        Self {
            item: outcome.id.index(),
            category: outcome.category,
            key: outcome.key,
        }
    }
}

/// Emitted after an item is unregistered.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct RemoveEvent {
    /// Slot index of the removed item.
    pub item: u32,
    /// Category the item belonged to.
    pub category: LayerCategory,
    /// The item's last own key.
    pub key: f64,
}

impl From<&Removed> for RemoveEvent {
    fn from(outcome: &Removed) -> Self {
        Self {
            item: outcome.id.index(),
            category: outcome.category,
            key: outcome.key,
        }
    }
}

/// Emitted after a relative reorder.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct ReorderEvent {
    /// Slot index of the moved item.
    pub item: u32,
    /// The item's category.
    pub category: LayerCategory,
    /// The requested destination.
    pub destination: MoveDestination,
    /// Key before the move.
    pub old_key: f64,
    /// Key after the move.
    pub new_key: f64,
    /// Slot index of the sibling whose key was exchanged, or [`INVALID`].
    pub swapped_with: u32,
}

impl From<&Reorder<ItemId>> for ReorderEvent {
    fn from(reorder: &Reorder<ItemId>) -> Self {
        Self {
            item: reorder.item.index(),
            category: reorder.category,
            destination: reorder.destination,
            old_key: reorder.old_key,
            new_key: reorder.new_key,
            swapped_with: reorder.swapped_with.map_or(INVALID, ItemId::index),
        }
    }
}

impl From<&Reordered> for ReorderEvent {
    fn from(outcome: &Reordered) -> Self {
        Self::from(&outcome.reorder)
    }
}

/// Emitted after an item moves to another category.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct ReclassifyEvent {
    /// Slot index of the item.
    pub item: u32,
    /// Category before the move.
    pub from: LayerCategory,
    /// Category after the move.
    pub to: LayerCategory,
    /// Key before the move.
    pub old_key: f64,
    /// Key after the move.
    pub new_key: f64,
}

impl From<&Reclassified> for ReclassifyEvent {
    fn from(outcome: &Reclassified) -> Self {
        Self {
            item: outcome.id.index(),
            from: outcome.from,
            to: outcome.to,
            old_key: outcome.old_key,
            new_key: outcome.new_key,
        }
    }
}

/// Emitted after a category's keys were redistributed.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct CompactEvent {
    /// The compacted category.
    pub category: LayerCategory,
    /// Number of items redistributed.
    pub items: u32,
    /// Lowest key after compaction.
    pub floor: f64,
    /// Next key allocation will hand out.
    pub next: f64,
}

impl From<&Compaction> for CompactEvent {
    fn from(compaction: &Compaction) -> Self {
        Self {
            category: compaction.category,
            items: compaction.items,
            floor: compaction.floor,
            next: compaction.next,
        }
    }
}

/// Emitted when an operation fails.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct FailureEvent {
    /// The failed operation.
    pub op: OpKind,
    /// Slot index of the item involved, or [`INVALID`].
    pub item: u32,
    /// Why the operation failed.
    pub error: KeyError,
}

impl FailureEvent {
    /// Creates a failure event for `op` on `item`.
    #[must_use]
    pub fn new(op: OpKind, item: Option<ItemId>, error: KeyError) -> Self {
        Self {
            op,
            item: item.map_or(INVALID, ItemId::index),
            error,
        }
    }

    /// Returns the key a raw-key caller observed.
    #[must_use]
    pub fn sentinel(&self) -> f64 {
        self.error.sentinel()
    }
}

/// Snapshot of one category's range state.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct ScopeSummary {
    /// Registry revision the snapshot was taken at.
    pub revision: u64,
    /// The category.
    pub category: LayerCategory,
    /// Lowest key in the scope.
    pub lower: f64,
    /// Highest key in the scope.
    pub upper: f64,
    /// Next key allocation will hand out.
    pub current: f64,
    /// Lowest key handed out by send-to-back.
    pub floor: f64,
    /// Number of live items in the category.
    pub live: u32,
    /// Whether allocation is exhausted.
    pub top_exhausted: bool,
    /// Whether send-to-back is exhausted.
    pub bottom_exhausted: bool,
}

impl ScopeSummary {
    /// Creates a summary from raw range state.
    #[must_use]
    pub fn new(revision: u64, category: LayerCategory, scope: &RangeState, live: u32) -> Self {
        use crate::error::Edge;

        Self {
            revision,
            category,
            lower: scope.lower(),
            upper: scope.upper(),
            current: scope.current(),
            floor: scope.floor(),
            live,
            top_exhausted: scope.is_exhausted(Edge::Top),
            bottom_exhausted: scope.is_exhausted(Edge::Bottom),
        }
    }

    /// Snapshots `category` in `registry`, if it is configured.
    #[must_use]
    pub fn of(registry: &ItemRegistry, category: LayerCategory) -> Option<Self> {
        let scope = registry.layers().scope(category)?;
        let live = u32::try_from(registry.items().member_count(category)).unwrap_or(u32::MAX);
        Some(Self::new(registry.revision(), category, scope, live))
    }
}

/// One item in a paint-order dump.
#[cfg(feature = "trace-rich")]
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct PaintEntry {
    /// Slot index of the item.
    pub item: u32,
    /// The item's category.
    pub category: LayerCategory,
    /// The key the item is composited with.
    pub key: f64,
}

#[cfg(feature = "trace-rich")]
impl PaintEntry {
    /// Fills `out` with the registry's paint order, bottom first.
    pub fn collect_into(registry: &ItemRegistry, out: &mut Vec<Self>) {
        out.clear();
        out.extend(registry.paint_order().into_iter().filter_map(|id| {
            Some(Self {
                item: id.index(),
                category: registry.category(id)?,
                key: registry.key(id)?,
            })
        }));
    }
}

// ---------------------------------------------------------------------------
// TraceSink trait
// ---------------------------------------------------------------------------

/// Receives trace events from registry instrumentation.
///
/// All methods have default no-op implementations, so you only need to
/// override the events you care about.
pub trait TraceSink {
    /// Called after an item is registered.
    fn on_insert(&mut self, e: &InsertEvent) {
        _ = e;
    }

    /// Called after an item is unregistered.
    fn on_remove(&mut self, e: &RemoveEvent) {
        _ = e;
    }

    /// Called after a relative reorder.
    fn on_reorder(&mut self, e: &ReorderEvent) {
        _ = e;
    }

    /// Called after a reclassification.
    fn on_reclassify(&mut self, e: &ReclassifyEvent) {
        _ = e;
    }

    /// Called after a compaction.
    fn on_compact(&mut self, e: &CompactEvent) {
        _ = e;
    }

    /// Called when an operation fails.
    fn on_failure(&mut self, e: &FailureEvent) {
        _ = e;
    }

    /// Called with a range-state snapshot.
    fn on_scope_summary(&mut self, s: &ScopeSummary) {
        _ = s;
    }

    /// Called with the full paint order (requires `trace-rich` feature).
    #[cfg(feature = "trace-rich")]
    fn on_paint_order(&mut self, revision: u64, entries: &[PaintEntry]) {
        _ = (revision, entries);
    }
}

// ---------------------------------------------------------------------------
// NoopSink
// ---------------------------------------------------------------------------

/// A [`TraceSink`] that discards all events.
#[derive(Clone, Copy, Debug, Default)]
pub struct NoopSink;

impl TraceSink for NoopSink {}

// ---------------------------------------------------------------------------
// Tracer wrapper
// ---------------------------------------------------------------------------

/// Thin wrapper around an optional [`TraceSink`].
///
/// When the `trace` feature is **off**, every method compiles to nothing. When
/// **on**, each method checks the inner `Option` (one branch) before
/// dispatching to the sink.
pub struct Tracer<'a> {
    #[cfg(feature = "trace")]
    sink: Option<&'a mut dyn TraceSink>,
    #[cfg(not(feature = "trace"))]
    _marker: core::marker::PhantomData<&'a mut dyn TraceSink>,
}

impl core::fmt::Debug for Tracer<'_> {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("Tracer").finish_non_exhaustive()
    }
}

impl<'a> Tracer<'a> {
    /// Creates a tracer that dispatches to the given sink.
    #[inline]
    #[must_use]
    pub fn new(sink: &'a mut dyn TraceSink) -> Self {
        #[cfg(feature = "trace")]
        {
            Self { sink: Some(sink) }
        }
        #[cfg(not(feature = "trace"))]
        {
            _ = sink;
            Self {
                _marker: core::marker::PhantomData,
            }
        }
    }

    /// Creates a tracer that discards all events.
    #[inline]
    #[must_use]
    pub fn none() -> Self {
        #[cfg(feature = "trace")]
        {
            Self { sink: None }
        }
        #[cfg(not(feature = "trace"))]
        {
            Self {
                _marker: core::marker::PhantomData,
            }
        }
    }

    /// Emits an [`InsertEvent`].
    #[inline]
    pub fn insert(&mut self, e: &InsertEvent) {
        #[cfg(feature = "trace")]
        if let Some(s) = &mut self.sink {
            s.on_insert(e);
        }
        #[cfg(not(feature = "trace"))]
        {
            _ = e;
        }
    }

    /// Emits a [`RemoveEvent`].
    #[inline]
    pub fn remove(&mut self, e: &RemoveEvent) {
        #[cfg(feature = "trace")]
        if let Some(s) = &mut self.sink {
            s.on_remove(e);
        }
        #[cfg(not(feature = "trace"))]
        {
            _ = e;
        }
    }

    /// Emits a [`ReorderEvent`].
    #[inline]
    pub fn reorder(&mut self, e: &ReorderEvent) {
        #[cfg(feature = "trace")]
        if let Some(s) = &mut self.sink {
            s.on_reorder(e);
        }
        #[cfg(not(feature = "trace"))]
        {
            _ = e;
        }
    }

    /// Emits a [`ReclassifyEvent`].
    #[inline]
    pub fn reclassify(&mut self, e: &ReclassifyEvent) {
        #[cfg(feature = "trace")]
        if let Some(s) = &mut self.sink {
            s.on_reclassify(e);
        }
        #[cfg(not(feature = "trace"))]
        {
            _ = e;
        }
    }

    /// Emits a [`CompactEvent`].
    #[inline]
    pub fn compact(&mut self, e: &CompactEvent) {
        #[cfg(feature = "trace")]
        if let Some(s) = &mut self.sink {
            s.on_compact(e);
        }
        #[cfg(not(feature = "trace"))]
        {
            _ = e;
        }
    }

    /// Emits a [`FailureEvent`].
    #[inline]
    pub fn failure(&mut self, e: &FailureEvent) {
        #[cfg(feature = "trace")]
        if let Some(s) = &mut self.sink {
            s.on_failure(e);
        }
        #[cfg(not(feature = "trace"))]
        {
            _ = e;
        }
    }

    /// Emits a [`ScopeSummary`].
    #[inline]
    pub fn scope_summary(&mut self, s: &ScopeSummary) {
        #[cfg(feature = "trace")]
        if let Some(sink) = &mut self.sink {
            sink.on_scope_summary(s);
        }
        #[cfg(not(feature = "trace"))]
        {
            _ = s;
        }
    }

    /// Emits the paint order (requires `trace-rich` feature).
    #[cfg(feature = "trace-rich")]
    #[inline]
    pub fn paint_order(&mut self, revision: u64, entries: &[PaintEntry]) {
        if let Some(s) = &mut self.sink {
            s.on_paint_order(revision, entries);
        }
    }

    /// Emits the events for an insertion outcome: the compaction that made
    /// room, if any, then the insertion.
    #[inline]
    pub fn inserted(&mut self, outcome: &Inserted) {
        if let Some(compaction) = &outcome.compaction {
            self.compact(&compaction.into());
        }
        self.insert(&outcome.into());
    }

    /// Emits the events for a reorder outcome: the compaction that made
    /// room, if any, then the reorder.
    #[inline]
    pub fn reordered(&mut self, outcome: &Reordered) {
        if let Some(compaction) = &outcome.compaction {
            self.compact(&compaction.into());
        }
        self.reorder(&outcome.into());
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use crate::category::{ItemKind, ItemTag};
    use crate::error::Edge;

    #[test]
    fn insert_event_from_outcome() {
        let mut registry = ItemRegistry::board();
        let outcome = registry
            .insert(ItemTag::new(ItemKind::Stroke), None)
            .unwrap();
        let evt = InsertEvent::from(&outcome);
        assert_eq!(evt.item, outcome.id.index());
        assert_eq!(evt.category, LayerCategory::Drawing);
        assert_eq!(evt.key, 500_000.0);
    }

    #[test]
    fn reorder_event_marks_missing_swap_as_invalid() {
        let mut registry = ItemRegistry::board();
        let id = registry
            .insert(ItemTag::new(ItemKind::Stroke), None)
            .unwrap()
            .id;
        let outcome = registry
            .reorder(id, MoveDestination::BringToFront)
            .unwrap();
        let evt = ReorderEvent::from(&outcome);
        assert_eq!(evt.swapped_with, INVALID);
        assert_eq!((evt.old_key, evt.new_key), (500_000.0, 500_001.0));
    }

    #[test]
    fn failure_event_carries_sentinel() {
        let error = KeyError::Exhausted {
            category: LayerCategory::Tool,
            edge: Edge::Top,
        };
        let evt = FailureEvent::new(OpKind::Insert, None, error);
        assert_eq!(evt.item, INVALID);
        assert_eq!(evt.sentinel(), crate::error::ERROR_KEY);
    }

    #[test]
    fn scope_summary_counts_live_items() {
        let mut registry = ItemRegistry::board();
        for _ in 0..3 {
            registry
                .insert(ItemTag::new(ItemKind::Pixmap), None)
                .unwrap();
        }
        let summary = ScopeSummary::of(&registry, LayerCategory::Object).unwrap();
        assert_eq!(summary.live, 3);
        assert_eq!(summary.current, -499_997.0);
        assert_eq!(summary.revision, 3);
        assert!(!summary.top_exhausted, "fresh scope has headroom");
        assert!(
            ScopeSummary::of(&registry, LayerCategory::Unassigned).is_none(),
            "unassigned is never configured"
        );
    }

    #[test]
    fn noop_sink_compiles() {
        let mut sink = NoopSink;
        sink.on_compact(&CompactEvent {
            category: LayerCategory::Drawing,
            items: 0,
            floor: 0.0,
            next: 0.0,
        });
        sink.on_failure(&FailureEvent::new(
            OpKind::Select,
            None,
            KeyError::StaleItem(0),
        ));
    }

    #[test]
    fn tracer_none_does_nothing() {
        let mut registry = ItemRegistry::board();
        let outcome = registry
            .insert(ItemTag::new(ItemKind::Stroke), None)
            .unwrap();
        let mut tracer = Tracer::none();
        tracer.inserted(&outcome);
    }

    #[cfg(feature = "trace")]
    #[test]
    fn tracer_dispatches_to_sink() {
        use alloc::vec::Vec;

        use crate::scope::{LayerConfig, ScopeConfig};

        #[derive(Default)]
        struct RecordingSink {
            ops: Vec<&'static str>,
        }
        impl TraceSink for RecordingSink {
            fn on_insert(&mut self, _: &InsertEvent) {
                self.ops.push("insert");
            }
            fn on_compact(&mut self, _: &CompactEvent) {
                self.ops.push("compact");
            }
        }

        let config = LayerConfig::empty()
            .with_scope(LayerCategory::Drawing, ScopeConfig::new(0.0, 1.0));
        let mut registry = ItemRegistry::new(&config).unwrap();
        let first = registry.insert(ItemTag::new(ItemKind::Stroke), None).unwrap();
        let _ = registry.insert(ItemTag::new(ItemKind::Stroke), None).unwrap();
        registry.remove(first.id).unwrap();
        let third = registry.insert(ItemTag::new(ItemKind::Stroke), None).unwrap();
        assert!(third.compaction.is_some(), "third insert compacts");

        let mut sink = RecordingSink::default();
        let mut tracer = Tracer::new(&mut sink);
        tracer.inserted(&third);
        // Access sink after tracer is dropped.
        drop(tracer);
        assert_eq!(sink.ops, ["compact", "insert"]);
    }

    #[cfg(feature = "trace-rich")]
    #[test]
    fn paint_entries_follow_paint_order() {
        let mut registry = ItemRegistry::board();
        let stroke = registry
            .insert(ItemTag::new(ItemKind::Stroke), None)
            .unwrap()
            .id;
        let picture = registry
            .insert(ItemTag::new(ItemKind::Pixmap), None)
            .unwrap()
            .id;
        let mut entries = Vec::new();
        PaintEntry::collect_into(&registry, &mut entries);
        let items: Vec<_> = entries.iter().map(|e| e.item).collect();
        assert_eq!(items, [picture.index(), stroke.index()]);
    }
}
