// Copyright 2026 the Strata Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Chrome Trace Event Format exporter.
//!
//! [`export`] reads recorded bytes from a [`RecorderSink`](super::recorder::RecorderSink)
//! and writes [Chrome Trace Event Format][spec] JSON to the given writer.
//!
//! Key operations carry no wall-clock time, so each record is placed at its
//! ordinal position: the n-th record gets a timestamp of n microseconds.
//! Every category gets its own track (`tid` is the category index), and
//! scope summaries become counter events so key usage can be plotted over
//! the session.
//!
//! [spec]: https://docs.google.com/document/d/1CvAClvFfyA5R-PhYUmn5OOQtYMH4h6I0nSsKchNAySU

use std::io::{self, Write};

use serde_json::{Value, json};

use strata_core::error::KeyError;
use strata_core::item::INVALID;

use crate::recorder::{RecordedEvent, decode};

/// Exports recorded events as Chrome Trace Event Format JSON.
///
/// The output is a complete JSON array of trace event objects, suitable for
/// loading into `chrome://tracing` or [Perfetto](https://ui.perfetto.dev/).
pub fn export(bytes: &[u8], writer: &mut dyn Write) -> io::Result<()> {
    let mut events: Vec<Value> = Vec::new();

    for (ts, recorded) in (0_u32..).zip(decode(bytes)) {
        let ts = f64::from(ts);
        match recorded {
            RecordedEvent::Insert(e) => {
                events.push(json!({
                    "ph": "i",
                    "name": "Insert",
                    "cat": e.category.name(),
                    "ts": ts,
                    "pid": 0,
                    "tid": e.category.index(),
                    "s": "t",
                    "args": {
                        "item": e.item,
                        "key": e.key,
                    }
                }));
            }
            RecordedEvent::Remove(e) => {
                events.push(json!({
                    "ph": "i",
                    "name": "Remove",
                    "cat": e.category.name(),
                    "ts": ts,
                    "pid": 0,
                    "tid": e.category.index(),
                    "s": "t",
                    "args": {
                        "item": e.item,
                        "key": e.key,
                    }
                }));
            }
            RecordedEvent::Reorder(e) => {
                events.push(json!({
                    "ph": "i",
                    "name": e.destination.name(),
                    "cat": e.category.name(),
                    "ts": ts,
                    "pid": 0,
                    "tid": e.category.index(),
                    "s": "t",
                    "args": {
                        "item": e.item,
                        "old_key": e.old_key,
                        "new_key": e.new_key,
                        "swapped_with": optional_slot(e.swapped_with),
                    }
                }));
            }
            RecordedEvent::Reclassify(e) => {
                events.push(json!({
                    "ph": "i",
                    "name": "Reclassify",
                    "cat": e.to.name(),
                    "ts": ts,
                    "pid": 0,
                    "tid": e.to.index(),
                    "s": "t",
                    "args": {
                        "item": e.item,
                        "from": e.from.name(),
                        "old_key": e.old_key,
                        "new_key": e.new_key,
                    }
                }));
            }
            RecordedEvent::Compact(e) => {
                events.push(json!({
                    "ph": "i",
                    "name": "Compact",
                    "cat": e.category.name(),
                    "ts": ts,
                    "pid": 0,
                    "tid": e.category.index(),
                    "s": "p",
                    "args": {
                        "items": e.items,
                        "floor": e.floor,
                        "next": e.next,
                    }
                }));
            }
            RecordedEvent::Failure(e) => {
                events.push(json!({
                    "ph": "i",
                    "name": "Failure",
                    "cat": "Failure",
                    "ts": ts,
                    "pid": 0,
                    "tid": e.error.category().map_or(0, |c| c.index()),
                    "s": "g",
                    "args": {
                        "op": e.op.name(),
                        "item": optional_slot(e.item),
                        "error": error_name(&e.error),
                        "key": e.sentinel(),
                    }
                }));
            }
            RecordedEvent::ScopeSummary(s) => {
                events.push(json!({
                    "ph": "C",
                    "name": s.category.name(),
                    "ts": ts,
                    "pid": 0,
                    "tid": s.category.index(),
                    "args": {
                        "used": s.current - s.floor,
                        "live": s.live,
                    }
                }));
            }
            RecordedEvent::PaintOrderCount { revision, count } => {
                events.push(json!({
                    "ph": "i",
                    "name": "PaintOrder",
                    "cat": "Rich",
                    "ts": ts,
                    "pid": 0,
                    "tid": 0,
                    "s": "p",
                    "args": {
                        "revision": revision,
                        "count": count,
                    }
                }));
            }
        }
    }

    serde_json::to_writer_pretty(writer, &events)?;
    Ok(())
}

fn optional_slot(idx: u32) -> Value {
    if idx == INVALID {
        Value::Null
    } else {
        json!(idx)
    }
}

fn error_name(error: &KeyError) -> &'static str {
    match error {
        KeyError::InvalidCategory(_) => "InvalidCategory",
        KeyError::Exhausted { .. } => "Exhausted",
        KeyError::StaleItem(_) => "StaleItem",
    }
}
