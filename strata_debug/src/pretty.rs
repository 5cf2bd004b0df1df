// Copyright 2026 the Strata Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Human-readable trace output.
//!
//! [`PrettyPrintSink`] implements [`TraceSink`] and writes one line per event
//! to a [`Write`](std::io::Write) destination (default: stderr).

use std::io::Write;

use strata_core::error::KeyError;
use strata_core::item::INVALID;
use strata_core::trace::{
    CompactEvent, FailureEvent, InsertEvent, PaintEntry, ReclassifyEvent, RemoveEvent,
    ReorderEvent, ScopeSummary, TraceSink,
};

/// Writes human-readable trace lines to a [`Write`](std::io::Write) destination.
pub struct PrettyPrintSink<W: Write = Box<dyn Write>> {
    writer: W,
}

impl<W: Write> std::fmt::Debug for PrettyPrintSink<W> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PrettyPrintSink").finish_non_exhaustive()
    }
}

impl PrettyPrintSink {
    /// Creates a sink that writes to stderr.
    #[must_use]
    pub fn stderr() -> Self {
        Self {
            writer: Box::new(std::io::stderr()),
        }
    }

    /// Creates a sink that writes to a boxed writer.
    #[must_use]
    pub fn new(writer: Box<dyn Write>) -> Self {
        Self { writer }
    }
}

impl<W: Write> PrettyPrintSink<W> {
    /// Creates a sink that writes to the given destination.
    #[must_use]
    pub fn with_writer(writer: W) -> Self {
        Self { writer }
    }

    /// Consumes the sink and returns the destination.
    #[must_use]
    pub fn into_inner(self) -> W {
        self.writer
    }
}

/// Formats a raw slot index, rendering [`INVALID`] as `-`.
fn slot(idx: u32) -> String {
    if idx == INVALID {
        "-".to_owned()
    } else {
        idx.to_string()
    }
}

fn error_detail(error: &KeyError) -> String {
    match error {
        KeyError::InvalidCategory(category) => format!("invalid category={}", category.name()),
        KeyError::Exhausted { category, edge } => {
            format!("exhausted category={} edge={edge:?}", category.name())
        }
        KeyError::StaleItem(idx) => format!("stale item={idx}"),
    }
}

impl<W: Write> TraceSink for PrettyPrintSink<W> {
    fn on_insert(&mut self, e: &InsertEvent) {
        let _ = writeln!(
            self.writer,
            "[insert] item={} category={} key={}",
            e.item,
            e.category.name(),
            e.key,
        );
    }

    fn on_remove(&mut self, e: &RemoveEvent) {
        let _ = writeln!(
            self.writer,
            "[remove] item={} category={} key={}",
            e.item,
            e.category.name(),
            e.key,
        );
    }

    fn on_reorder(&mut self, e: &ReorderEvent) {
        let _ = writeln!(
            self.writer,
            "[reorder] item={} category={} {} key={} -> {} swapped={}",
            e.item,
            e.category.name(),
            e.destination.name(),
            e.old_key,
            e.new_key,
            slot(e.swapped_with),
        );
    }

    fn on_reclassify(&mut self, e: &ReclassifyEvent) {
        let _ = writeln!(
            self.writer,
            "[reclassify] item={} {} -> {} key={} -> {}",
            e.item,
            e.from.name(),
            e.to.name(),
            e.old_key,
            e.new_key,
        );
    }

    fn on_compact(&mut self, e: &CompactEvent) {
        let _ = writeln!(
            self.writer,
            "[compact] category={} items={} floor={} next={}",
            e.category.name(),
            e.items,
            e.floor,
            e.next,
        );
    }

    fn on_failure(&mut self, e: &FailureEvent) {
        let _ = writeln!(
            self.writer,
            "[failure] op={} item={} {} key={}",
            e.op.name(),
            slot(e.item),
            error_detail(&e.error),
            e.sentinel(),
        );
    }

    fn on_scope_summary(&mut self, s: &ScopeSummary) {
        let exhausted = match (s.top_exhausted, s.bottom_exhausted) {
            (false, false) => "none",
            (true, false) => "TOP",
            (false, true) => "BOTTOM",
            (true, true) => "BOTH",
        };
        let _ = writeln!(
            self.writer,
            "[scope] rev={} category={} range=[{}, {}] floor={} current={} live={} exhausted={exhausted}",
            s.revision,
            s.category.name(),
            s.lower,
            s.upper,
            s.floor,
            s.current,
            s.live,
        );
    }

    fn on_paint_order(&mut self, revision: u64, entries: &[PaintEntry]) {
        let _ = writeln!(
            self.writer,
            "[paint] rev={revision} items={}",
            entries.len(),
        );
        for (depth, entry) in entries.iter().enumerate() {
            let _ = writeln!(
                self.writer,
                "  {depth:>4} item={} category={} key={}",
                entry.item,
                entry.category.name(),
                entry.key,
            );
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use strata_core::category::LayerCategory;
    use strata_core::error::Edge;
    use strata_core::scene::MoveDestination;
    use strata_core::trace::OpKind;

    fn render(emit: impl FnOnce(&mut PrettyPrintSink<Vec<u8>>)) -> String {
        let mut sink = PrettyPrintSink::with_writer(Vec::<u8>::new());
        emit(&mut sink);
        String::from_utf8(sink.into_inner()).unwrap()
    }

    #[test]
    fn pretty_print_reorder() {
        let output = render(|sink| {
            sink.on_reorder(&ReorderEvent {
                item: 1,
                category: LayerCategory::Drawing,
                destination: MoveDestination::BringToFront,
                old_key: 0.0,
                new_key: 3.0,
                swapped_with: INVALID,
            });
        });
        assert!(output.starts_with("[reorder]"), "got: {output}");
        assert!(output.contains("bring_to_front"), "got: {output}");
        assert!(output.contains("key=0 -> 3"), "got: {output}");
        assert!(output.contains("swapped=-"), "got: {output}");
    }

    #[test]
    fn pretty_print_failure_shows_sentinel() {
        let output = render(|sink| {
            sink.on_failure(&FailureEvent {
                op: OpKind::Reorder,
                item: 2,
                error: KeyError::Exhausted {
                    category: LayerCategory::Drawing,
                    edge: Edge::Bottom,
                },
            });
        });
        assert!(output.contains("op=reorder"), "got: {output}");
        assert!(output.contains("edge=Bottom"), "got: {output}");
        assert!(output.contains("key=-20000001"), "got: {output}");
    }

    #[test]
    fn pretty_print_paint_order_lists_entries() {
        let output = render(|sink| {
            sink.on_paint_order(
                3,
                &[
                    PaintEntry {
                        item: 0,
                        category: LayerCategory::Object,
                        key: -500_000.0,
                    },
                    PaintEntry {
                        item: 1,
                        category: LayerCategory::Drawing,
                        key: 500_000.0,
                    },
                ],
            );
        });
        assert_eq!(output.lines().count(), 3, "header plus one line per entry");
        assert!(output.contains("items=2"), "got: {output}");
    }
}
