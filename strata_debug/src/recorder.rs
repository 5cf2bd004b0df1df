// Copyright 2026 the Strata Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Compact binary event recording and decoding.
//!
//! [`RecorderSink`] implements [`TraceSink`] and encodes events into a
//! `Vec<u8>` as fixed-size little-endian records. [`decode`] reads them back
//! as an iterator of [`RecordedEvent`].
//!
//! Keys are stored as the raw bits of their `f64`, so decoding reproduces
//! them exactly, sentinel included. The rich paint-order event
//! ([`on_paint_order`](TraceSink::on_paint_order)) stores only the count.

use strata_core::category::LayerCategory;
use strata_core::error::{Edge, KeyError};
use strata_core::scene::MoveDestination;
use strata_core::trace::{
    CompactEvent, FailureEvent, InsertEvent, OpKind, PaintEntry, ReclassifyEvent, RemoveEvent,
    ReorderEvent, ScopeSummary, TraceSink,
};

// ---------------------------------------------------------------------------
// Event type discriminants
// ---------------------------------------------------------------------------

const TAG_INSERT: u8 = 1;
const TAG_REMOVE: u8 = 2;
const TAG_REORDER: u8 = 3;
const TAG_RECLASSIFY: u8 = 4;
const TAG_COMPACT: u8 = 5;
const TAG_FAILURE: u8 = 6;
const TAG_SCOPE_SUMMARY: u8 = 7;
const TAG_PAINT_ORDER_COUNT: u8 = 8;

const ERR_INVALID_CATEGORY: u8 = 0;
const ERR_EXHAUSTED: u8 = 1;
const ERR_STALE_ITEM: u8 = 2;

// ---------------------------------------------------------------------------
// RecorderSink
// ---------------------------------------------------------------------------

/// A [`TraceSink`] that encodes events into a compact binary buffer.
#[derive(Debug, Default)]
pub struct RecorderSink {
    buf: Vec<u8>,
}

impl RecorderSink {
    /// Creates an empty recorder.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns a view of the recorded bytes.
    #[must_use]
    pub fn as_bytes(&self) -> &[u8] {
        &self.buf
    }

    /// Consumes the recorder and returns the recorded bytes.
    #[must_use]
    pub fn into_bytes(self) -> Vec<u8> {
        self.buf
    }

    // -- encoding helpers --------------------------------------------------

    fn write_u8(&mut self, v: u8) {
        self.buf.push(v);
    }

    fn write_u32(&mut self, v: u32) {
        self.buf.extend_from_slice(&v.to_le_bytes());
    }

    fn write_u64(&mut self, v: u64) {
        self.buf.extend_from_slice(&v.to_le_bytes());
    }

    fn write_f64(&mut self, v: f64) {
        self.write_u64(v.to_bits());
    }

    fn write_category(&mut self, c: LayerCategory) {
        #[expect(
            clippy::cast_possible_truncation,
            reason = "category indices are below LayerCategory::COUNT"
        )]
        self.write_u8(c.index() as u8);
    }

    fn write_edge(&mut self, e: Edge) {
        self.write_u8(match e {
            Edge::Top => 0,
            Edge::Bottom => 1,
        });
    }

    fn write_destination(&mut self, d: MoveDestination) {
        self.write_u8(match d {
            MoveDestination::RaiseOne => 0,
            MoveDestination::LowerOne => 1,
            MoveDestination::BringToFront => 2,
            MoveDestination::SendToBack => 3,
        });
    }

    fn write_op(&mut self, op: OpKind) {
        self.write_u8(match op {
            OpKind::Insert => 0,
            OpKind::Remove => 1,
            OpKind::Reorder => 2,
            OpKind::Reclassify => 3,
            OpKind::Select => 4,
            OpKind::Deselect => 5,
            OpKind::Compact => 6,
        });
    }

    /// Writes `kind, category, edge, slot` for every variant.
    fn write_error(&mut self, error: KeyError) {
        match error {
            KeyError::InvalidCategory(category) => {
                self.write_u8(ERR_INVALID_CATEGORY);
                self.write_category(category);
                self.write_edge(Edge::Top);
                self.write_u32(0);
            }
            KeyError::Exhausted { category, edge } => {
                self.write_u8(ERR_EXHAUSTED);
                self.write_category(category);
                self.write_edge(edge);
                self.write_u32(0);
            }
            KeyError::StaleItem(slot) => {
                self.write_u8(ERR_STALE_ITEM);
                self.write_category(LayerCategory::Unassigned);
                self.write_edge(Edge::Top);
                self.write_u32(slot);
            }
        }
    }
}

impl TraceSink for RecorderSink {
    fn on_insert(&mut self, e: &InsertEvent) {
        self.write_u8(TAG_INSERT);
        self.write_u32(e.item);
        self.write_category(e.category);
        self.write_f64(e.key);
    }

    fn on_remove(&mut self, e: &RemoveEvent) {
        self.write_u8(TAG_REMOVE);
        self.write_u32(e.item);
        self.write_category(e.category);
        self.write_f64(e.key);
    }

    fn on_reorder(&mut self, e: &ReorderEvent) {
        self.write_u8(TAG_REORDER);
        self.write_u32(e.item);
        self.write_category(e.category);
        self.write_destination(e.destination);
        self.write_f64(e.old_key);
        self.write_f64(e.new_key);
        self.write_u32(e.swapped_with);
    }

    fn on_reclassify(&mut self, e: &ReclassifyEvent) {
        self.write_u8(TAG_RECLASSIFY);
        self.write_u32(e.item);
        self.write_category(e.from);
        self.write_category(e.to);
        self.write_f64(e.old_key);
        self.write_f64(e.new_key);
    }

    fn on_compact(&mut self, e: &CompactEvent) {
        self.write_u8(TAG_COMPACT);
        self.write_category(e.category);
        self.write_u32(e.items);
        self.write_f64(e.floor);
        self.write_f64(e.next);
    }

    fn on_failure(&mut self, e: &FailureEvent) {
        self.write_u8(TAG_FAILURE);
        self.write_op(e.op);
        self.write_u32(e.item);
        self.write_error(e.error);
    }

    fn on_scope_summary(&mut self, s: &ScopeSummary) {
        self.write_u8(TAG_SCOPE_SUMMARY);
        self.write_u64(s.revision);
        self.write_category(s.category);
        self.write_f64(s.lower);
        self.write_f64(s.upper);
        self.write_f64(s.current);
        self.write_f64(s.floor);
        self.write_u32(s.live);
        self.write_u8(u8::from(s.top_exhausted) | (u8::from(s.bottom_exhausted) << 1));
    }

    fn on_paint_order(&mut self, revision: u64, entries: &[PaintEntry]) {
        self.write_u8(TAG_PAINT_ORDER_COUNT);
        self.write_u64(revision);
        #[expect(
            clippy::cast_possible_truncation,
            reason = "paint entry count capped at u32::MAX for recording"
        )]
        self.write_u32(entries.len().min(u32::MAX as usize) as u32);
    }
}

// ---------------------------------------------------------------------------
// Decoder
// ---------------------------------------------------------------------------

/// A decoded event from a binary recording.
#[derive(Clone, Debug, PartialEq)]
pub enum RecordedEvent {
    /// An [`InsertEvent`].
    Insert(InsertEvent),
    /// A [`RemoveEvent`].
    Remove(RemoveEvent),
    /// A [`ReorderEvent`].
    Reorder(ReorderEvent),
    /// A [`ReclassifyEvent`].
    Reclassify(ReclassifyEvent),
    /// A [`CompactEvent`].
    Compact(CompactEvent),
    /// A [`FailureEvent`].
    Failure(FailureEvent),
    /// A [`ScopeSummary`].
    ScopeSummary(ScopeSummary),
    /// Paint-order length at a revision.
    PaintOrderCount {
        /// Registry revision.
        revision: u64,
        /// Number of painted items.
        count: u32,
    },
}

/// Decodes a byte slice produced by [`RecorderSink`] into an iterator of
/// [`RecordedEvent`].
///
/// Iteration stops at the first truncated or unrecognized record.
pub fn decode(bytes: &[u8]) -> DecodeIter<'_> {
    DecodeIter {
        data: bytes,
        pos: 0,
    }
}

/// Iterator over decoded events.
#[derive(Debug)]
pub struct DecodeIter<'a> {
    data: &'a [u8],
    pos: usize,
}

impl DecodeIter<'_> {
    fn remaining(&self) -> usize {
        self.data.len() - self.pos
    }

    fn read_u8(&mut self) -> Option<u8> {
        if self.remaining() < 1 {
            return None;
        }
        let v = self.data[self.pos];
        self.pos += 1;
        Some(v)
    }

    fn read_u32(&mut self) -> Option<u32> {
        if self.remaining() < 4 {
            return None;
        }
        let v = u32::from_le_bytes(self.data[self.pos..self.pos + 4].try_into().ok()?);
        self.pos += 4;
        Some(v)
    }

    fn read_u64(&mut self) -> Option<u64> {
        if self.remaining() < 8 {
            return None;
        }
        let v = u64::from_le_bytes(self.data[self.pos..self.pos + 8].try_into().ok()?);
        self.pos += 8;
        Some(v)
    }

    fn read_f64(&mut self) -> Option<f64> {
        self.read_u64().map(f64::from_bits)
    }

    fn read_category(&mut self) -> Option<LayerCategory> {
        LayerCategory::from_index(usize::from(self.read_u8()?))
    }

    fn read_edge(&mut self) -> Option<Edge> {
        Some(match self.read_u8()? {
            0 => Edge::Top,
            _ => Edge::Bottom,
        })
    }

    fn read_destination(&mut self) -> Option<MoveDestination> {
        MoveDestination::ALL
            .get(usize::from(self.read_u8()?))
            .copied()
    }

    fn read_op(&mut self) -> Option<OpKind> {
        OpKind::ALL.get(usize::from(self.read_u8()?)).copied()
    }

    fn read_error(&mut self) -> Option<KeyError> {
        let kind = self.read_u8()?;
        let category = self.read_category()?;
        let edge = self.read_edge()?;
        let slot = self.read_u32()?;
        match kind {
            ERR_INVALID_CATEGORY => Some(KeyError::InvalidCategory(category)),
            ERR_EXHAUSTED => Some(KeyError::Exhausted { category, edge }),
            ERR_STALE_ITEM => Some(KeyError::StaleItem(slot)),
            _ => None,
        }
    }

    fn decode_insert(&mut self) -> Option<RecordedEvent> {
        Some(RecordedEvent::Insert(InsertEvent {
            item: self.read_u32()?,
            category: self.read_category()?,
            key: self.read_f64()?,
        }))
    }

    fn decode_remove(&mut self) -> Option<RecordedEvent> {
        Some(RecordedEvent::Remove(RemoveEvent {
            item: self.read_u32()?,
            category: self.read_category()?,
            key: self.read_f64()?,
        }))
    }

    fn decode_reorder(&mut self) -> Option<RecordedEvent> {
        Some(RecordedEvent::Reorder(ReorderEvent {
            item: self.read_u32()?,
            category: self.read_category()?,
            destination: self.read_destination()?,
            old_key: self.read_f64()?,
            new_key: self.read_f64()?,
            swapped_with: self.read_u32()?,
        }))
    }

    fn decode_reclassify(&mut self) -> Option<RecordedEvent> {
        Some(RecordedEvent::Reclassify(ReclassifyEvent {
            item: self.read_u32()?,
            from: self.read_category()?,
            to: self.read_category()?,
            old_key: self.read_f64()?,
            new_key: self.read_f64()?,
        }))
    }

    fn decode_compact(&mut self) -> Option<RecordedEvent> {
        Some(RecordedEvent::Compact(CompactEvent {
            category: self.read_category()?,
            items: self.read_u32()?,
            floor: self.read_f64()?,
            next: self.read_f64()?,
        }))
    }

    fn decode_failure(&mut self) -> Option<RecordedEvent> {
        Some(RecordedEvent::Failure(FailureEvent {
            op: self.read_op()?,
            item: self.read_u32()?,
            error: self.read_error()?,
        }))
    }

    fn decode_scope_summary(&mut self) -> Option<RecordedEvent> {
        let revision = self.read_u64()?;
        let category = self.read_category()?;
        let lower = self.read_f64()?;
        let upper = self.read_f64()?;
        let current = self.read_f64()?;
        let floor = self.read_f64()?;
        let live = self.read_u32()?;
        let flags = self.read_u8()?;
        Some(RecordedEvent::ScopeSummary(ScopeSummary {
            revision,
            category,
            lower,
            upper,
            current,
            floor,
            live,
            top_exhausted: flags & 1 != 0,
            bottom_exhausted: flags & 2 != 0,
        }))
    }

    fn decode_paint_order_count(&mut self) -> Option<RecordedEvent> {
        let revision = self.read_u64()?;
        let count = self.read_u32()?;
        Some(RecordedEvent::PaintOrderCount { revision, count })
    }
}

impl Iterator for DecodeIter<'_> {
    type Item = RecordedEvent;

    fn next(&mut self) -> Option<Self::Item> {
        let tag = self.read_u8()?;
        match tag {
            TAG_INSERT => self.decode_insert(),
            TAG_REMOVE => self.decode_remove(),
            TAG_REORDER => self.decode_reorder(),
            TAG_RECLASSIFY => self.decode_reclassify(),
            TAG_COMPACT => self.decode_compact(),
            TAG_FAILURE => self.decode_failure(),
            TAG_SCOPE_SUMMARY => self.decode_scope_summary(),
            TAG_PAINT_ORDER_COUNT => self.decode_paint_order_count(),
            _ => None, // unknown tag → stop iteration
        }
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use strata_core::ERROR_KEY;
    use strata_core::item::INVALID;

    fn sample_reorder() -> ReorderEvent {
        ReorderEvent {
            item: 4,
            category: LayerCategory::Drawing,
            destination: MoveDestination::RaiseOne,
            old_key: 500_002.0,
            new_key: 500_003.0,
            swapped_with: 7,
        }
    }

    fn sample_summary() -> ScopeSummary {
        ScopeSummary {
            revision: 12,
            category: LayerCategory::Curtain,
            lower: 1_000_200.0,
            upper: 1_000_989.0,
            current: 1_000_989.0,
            floor: 1_000_200.0,
            live: 3,
            top_exhausted: true,
            bottom_exhausted: false,
        }
    }

    #[test]
    fn reorder_record_decodes() {
        let mut rec = RecorderSink::new();
        let orig = sample_reorder();
        rec.on_reorder(&orig);

        let events: Vec<_> = decode(rec.as_bytes()).collect();
        assert_eq!(events, [RecordedEvent::Reorder(orig)]);
    }

    #[test]
    fn failure_preserves_error_variant() {
        let mut rec = RecorderSink::new();
        let failures = [
            FailureEvent {
                op: OpKind::Insert,
                item: INVALID,
                error: KeyError::InvalidCategory(LayerCategory::Unassigned),
            },
            FailureEvent {
                op: OpKind::Reorder,
                item: 2,
                error: KeyError::Exhausted {
                    category: LayerCategory::Drawing,
                    edge: Edge::Bottom,
                },
            },
            FailureEvent {
                op: OpKind::Select,
                item: 9,
                error: KeyError::StaleItem(9),
            },
        ];
        for failure in &failures {
            rec.on_failure(failure);
        }

        let decoded: Vec<_> = decode(rec.as_bytes())
            .map(|event| match event {
                RecordedEvent::Failure(f) => f,
                other => panic!("expected Failure, got {other:?}"),
            })
            .collect();
        assert_eq!(decoded, failures);
    }

    #[test]
    fn scope_summary_flags_survive() {
        let mut rec = RecorderSink::new();
        rec.on_scope_summary(&sample_summary());
        match decode(rec.as_bytes()).next() {
            Some(RecordedEvent::ScopeSummary(s)) => {
                assert!(s.top_exhausted, "top flag lost");
                assert!(!s.bottom_exhausted, "bottom flag invented");
                assert_eq!(s.live, 3);
                assert_eq!(s.category, LayerCategory::Curtain);
            }
            other => panic!("expected ScopeSummary, got {other:?}"),
        }
    }

    #[test]
    fn sentinel_key_is_bit_exact() {
        let mut rec = RecorderSink::new();
        rec.on_insert(&InsertEvent {
            item: 0,
            category: LayerCategory::Object,
            key: ERROR_KEY,
        });
        match decode(rec.as_bytes()).next() {
            Some(RecordedEvent::Insert(e)) => assert_eq!(e.key.to_bits(), ERROR_KEY.to_bits()),
            other => panic!("expected Insert, got {other:?}"),
        }
    }

    #[test]
    fn mixed_stream_decodes_in_order() {
        let mut rec = RecorderSink::new();
        rec.on_insert(&InsertEvent {
            item: 1,
            category: LayerCategory::Drawing,
            key: 500_000.0,
        });
        rec.on_reorder(&sample_reorder());
        rec.on_compact(&CompactEvent {
            category: LayerCategory::Drawing,
            items: 2,
            floor: 500_000.0,
            next: 500_002.0,
        });
        rec.on_reclassify(&ReclassifyEvent {
            item: 1,
            from: LayerCategory::Drawing,
            to: LayerCategory::Tool,
            old_key: 500_000.0,
            new_key: 1_000_000.0,
        });
        rec.on_remove(&RemoveEvent {
            item: 1,
            category: LayerCategory::Tool,
            key: 1_000_000.0,
        });
        rec.on_paint_order(5, &[]);

        let events: Vec<_> = decode(rec.as_bytes()).collect();
        assert_eq!(events.len(), 6);
        assert!(matches!(events[0], RecordedEvent::Insert(_)));
        assert!(matches!(events[1], RecordedEvent::Reorder(_)));
        assert!(matches!(events[2], RecordedEvent::Compact(_)));
        assert!(matches!(events[3], RecordedEvent::Reclassify(_)));
        assert!(matches!(events[4], RecordedEvent::Remove(_)));
        assert_eq!(
            events[5],
            RecordedEvent::PaintOrderCount {
                revision: 5,
                count: 0
            }
        );
    }

    #[test]
    fn truncated_record_stops_decoding() {
        let mut rec = RecorderSink::new();
        rec.on_reorder(&sample_reorder());
        rec.on_reorder(&sample_reorder());
        let bytes = rec.into_bytes();
        let events: Vec<_> = decode(&bytes[..bytes.len() - 1]).collect();
        assert_eq!(events.len(), 1, "partial trailing record is dropped");
    }

    #[test]
    fn empty_buffer_decodes_to_nothing() {
        let events: Vec<_> = decode(&[]).collect();
        assert!(events.is_empty(), "no records in an empty buffer");
    }
}
