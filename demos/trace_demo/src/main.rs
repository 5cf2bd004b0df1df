// Copyright 2026 the Strata Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Simulated whiteboard session that exercises the tracing and diagnostics
//! pipeline.
//!
//! Places strokes, objects and tools on a board, reorders, selects and
//! reclassifies them, provokes a few failures and an automatic compaction,
//! and records every outcome to both a
//! [`PrettyPrintSink`](strata_debug::pretty::PrettyPrintSink) and a
//! [`RecorderSink`](strata_debug::recorder::RecorderSink). The recording is
//! then exported as a Chrome trace JSON file.
//!
//! Usage: `trace_demo [config.json]`. Without an argument the whiteboard
//! preset is used.

use std::error::Error;
use std::fs::File;
use std::io::{BufReader, BufWriter};

use kurbo::Rect;

use strata_core::category::{ItemKind, ItemTag, LayerCategory};
use strata_core::error::KeyError;
use strata_core::item::ItemId;
use strata_core::scene::MoveDestination;
use strata_core::scope::LayerConfig;
use strata_core::trace::{
    CompactEvent, FailureEvent, InsertEvent, OpKind, PaintEntry, ReclassifyEvent, RemoveEvent,
    ReorderEvent, ScopeSummary, TraceSink, Tracer,
};
use strata_core::{ItemRegistry, KeyChanges};

use strata_debug::pretty::PrettyPrintSink;
use strata_debug::recorder::RecorderSink;

const STROKE_COUNT: u32 = 6;
const TOOL_SHUFFLES: usize = 120;

/// Forwards every event to both sinks.
struct Tee<'a> {
    pretty: &'a mut PrettyPrintSink,
    recorder: &'a mut RecorderSink,
}

impl TraceSink for Tee<'_> {
    fn on_insert(&mut self, e: &InsertEvent) {
        self.pretty.on_insert(e);
        self.recorder.on_insert(e);
    }

    fn on_remove(&mut self, e: &RemoveEvent) {
        self.pretty.on_remove(e);
        self.recorder.on_remove(e);
    }

    fn on_reorder(&mut self, e: &ReorderEvent) {
        self.pretty.on_reorder(e);
        self.recorder.on_reorder(e);
    }

    fn on_reclassify(&mut self, e: &ReclassifyEvent) {
        self.pretty.on_reclassify(e);
        self.recorder.on_reclassify(e);
    }

    fn on_compact(&mut self, e: &CompactEvent) {
        self.pretty.on_compact(e);
        self.recorder.on_compact(e);
    }

    fn on_failure(&mut self, e: &FailureEvent) {
        self.pretty.on_failure(e);
        self.recorder.on_failure(e);
    }

    fn on_scope_summary(&mut self, s: &ScopeSummary) {
        self.pretty.on_scope_summary(s);
        self.recorder.on_scope_summary(s);
    }

    fn on_paint_order(&mut self, revision: u64, entries: &[PaintEntry]) {
        self.pretty.on_paint_order(revision, entries);
        self.recorder.on_paint_order(revision, entries);
    }
}

fn main() -> Result<(), Box<dyn Error>> {
    let config = match std::env::args().nth(1) {
        Some(path) => {
            let reader = BufReader::new(File::open(&path)?);
            let config: LayerConfig = serde_json::from_reader(reader)?;
            println!("Loaded layer config from {path}");
            config
        }
        None => LayerConfig::board(),
    };
    let mut registry = ItemRegistry::new(&config)?;

    // -- sinks -------------------------------------------------------------
    let mut pretty = PrettyPrintSink::new(Box::new(std::io::stdout()));
    let mut recorder = RecorderSink::new();

    {
        let mut tee = Tee {
            pretty: &mut pretty,
            recorder: &mut recorder,
        };
        let mut tracer = Tracer::new(&mut tee);
        run_session(&mut registry, &mut tracer);
    }

    let changes: KeyChanges = registry.drain_changes();
    println!(
        "Pending changes: {} keys, {} categories, {} selection, {} added, {} removed",
        changes.keys.len(),
        changes.categories.len(),
        changes.selection.len(),
        changes.added.len(),
        changes.removed.len(),
    );
    for &idx in &changes.categories {
        let items = registry.items();
        if let (Some(id), Some(category)) = (items.id_at_slot(idx), items.category_at(idx)) {
            println!(
                "  slot {} (generation {}) moved to {}",
                id.index(),
                id.generation(),
                category.name()
            );
        }
    }

    // -- export Chrome trace -----------------------------------------------
    let path = "trace.json";
    let mut writer = BufWriter::new(File::create(path)?);
    strata_debug::chrome::export(recorder.as_bytes(), &mut writer)?;

    println!(
        "Wrote {path} ({} live items, revision {})",
        registry.len(),
        registry.revision(),
    );
    Ok(())
}

fn run_session(registry: &mut ItemRegistry, tracer: &mut Tracer<'_>) {
    // 1. Content: a background, a picture and a row of overlapping strokes.
    place(registry, tracer, ItemTag::new(ItemKind::Background), None);
    let picture = place(
        registry,
        tracer,
        ItemTag::new(ItemKind::Pixmap),
        Some(Rect::new(0.0, 0.0, 400.0, 300.0)),
    );
    let strokes: Vec<ItemId> = (0..STROKE_COUNT)
        .filter_map(|i| {
            let x = f64::from(i) * 40.0;
            place(
                registry,
                tracer,
                ItemTag::new(ItemKind::Stroke),
                Some(Rect::new(x, 0.0, x + 60.0, 60.0)),
            )
        })
        .collect();
    emit_paint_order(registry, tracer);

    // 2. Relative moves inside the drawing tier.
    if let (Some(&first), Some(&last)) = (strokes.first(), strokes.last()) {
        apply_reorder(registry, tracer, first, MoveDestination::RaiseOne);
        apply_reorder(registry, tracer, first, MoveDestination::BringToFront);
        apply_reorder(registry, tracer, last, MoveDestination::SendToBack);
        apply_reorder(registry, tracer, last, MoveDestination::LowerOne);
    }

    // 3. Selection lifts a stroke above every tier but the overlays.
    if let Some(&second) = strokes.get(1) {
        if let Some(key) = check(tracer, OpKind::Select, Some(second), registry.select(second)) {
            println!("Selected {second:?} at key {key}");
        }
        apply_reorder(registry, tracer, second, MoveDestination::BringToFront);
        let deselected = check(
            tracer,
            OpKind::Deselect,
            Some(second),
            registry.deselect(second),
        );
        if deselected == Some(true) {
            println!("Deselected {second:?}, back at key {:?}", registry.key(second));
        }
    }

    // 4. A stroke converted into an object, and one sent to an unconfigured
    //    category.
    if let Some(&third) = strokes.get(2) {
        if let Some(outcome) = check(
            tracer,
            OpKind::Reclassify,
            Some(third),
            registry.reclassify(third, LayerCategory::Object),
        ) {
            tracer.reclassify(&(&outcome).into());
        }
        let _ = check(
            tracer,
            OpKind::Reclassify,
            Some(third),
            registry.reclassify(third, LayerCategory::Unassigned),
        );
    }

    // 5. Erasing a stroke leaves a stale handle behind.
    if let Some(&fourth) = strokes.get(3) {
        if let Some(removed) = check(tracer, OpKind::Remove, Some(fourth), registry.remove(fourth))
        {
            tracer.remove(&(&removed).into());
        }
        apply_reorder(registry, tracer, fourth, MoveDestination::RaiseOne);
    }
    if let Some(picture) = picture {
        apply_reorder(registry, tracer, picture, MoveDestination::BringToFront);
    }

    // 6. Tools start at the bottom of their range, so sending one back
    //    compacts the others. Then they are juggled to the front until the
    //    range runs out and gets compacted. Only the shuffles that compacted
    //    are traced.
    let tools: Vec<ItemId> = [ItemKind::Ruler, ItemKind::Protractor, ItemKind::Compass]
        .into_iter()
        .filter_map(|kind| place(registry, tracer, ItemTag::new(kind), None))
        .collect();
    if let Some(&last) = tools.last() {
        apply_reorder(registry, tracer, last, MoveDestination::SendToBack);
    }
    for &tool in tools.iter().cycle().take(TOOL_SHUFFLES) {
        match registry.reorder(tool, MoveDestination::BringToFront) {
            Ok(outcome) if outcome.compaction.is_some() => tracer.reordered(&outcome),
            Ok(_) => {}
            Err(err) => tracer.failure(&FailureEvent::new(OpKind::Reorder, Some(tool), err)),
        }
    }

    // 7. Explicit renormalization of the drawing tier.
    if let Some(compaction) = check(
        tracer,
        OpKind::Compact,
        None,
        registry.compact(LayerCategory::Drawing),
    ) {
        tracer.compact(&(&compaction).into());
    }

    for category in LayerCategory::ALL {
        if let Some(summary) = ScopeSummary::of(registry, category) {
            tracer.scope_summary(&summary);
        }
    }
    emit_paint_order(registry, tracer);
}

fn place(
    registry: &mut ItemRegistry,
    tracer: &mut Tracer<'_>,
    tag: ItemTag,
    bounds: Option<Rect>,
) -> Option<ItemId> {
    let outcome = check(tracer, OpKind::Insert, None, registry.insert(tag, bounds))?;
    tracer.inserted(&outcome);
    Some(outcome.id)
}

fn apply_reorder(
    registry: &mut ItemRegistry,
    tracer: &mut Tracer<'_>,
    id: ItemId,
    destination: MoveDestination,
) {
    if let Some(outcome) = check(
        tracer,
        OpKind::Reorder,
        Some(id),
        registry.reorder(id, destination),
    ) {
        tracer.reordered(&outcome);
    }
}

/// Reports a failed operation to the tracer.
fn check<T>(
    tracer: &mut Tracer<'_>,
    op: OpKind,
    item: Option<ItemId>,
    result: Result<T, KeyError>,
) -> Option<T> {
    match result {
        Ok(value) => Some(value),
        Err(err) => {
            tracer.failure(&FailureEvent::new(op, item, err));
            None
        }
    }
}

fn emit_paint_order(registry: &ItemRegistry, tracer: &mut Tracer<'_>) {
    let mut entries = Vec::new();
    PaintEntry::collect_into(registry, &mut entries);
    tracer.paint_order(registry.revision(), &entries);
}
