// Copyright 2026 the Strata Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Scoped z-order management for interactive scenes.
//!
//! `strata_core` decides *in what relative order* scene items are
//! composited. Every item belongs to a semantic [`LayerCategory`], and every
//! configured category owns a disjoint numeric range of ordering keys, so an
//! item in a higher tier always stacks above an item in a lower one. It is
//! `no_std` compatible (with `alloc`) and uses struct-of-arrays item storage
//! with generational handles.
//!
//! # Architecture
//!
//! ```text
//!   ItemTag ──► ItemRegistry::insert() ──► LayerManager::allocate()
//!                      │                           │
//!                      ▼                           ▼
//!                 ItemStore  ◄──── stamp ─── ordering key
//!                      │
//!                      ▼
//!   ItemRegistry::drain_changes() ──► KeyChanges ──► compositor
//! ```
//!
//! **[`category`]**: Layer categories, item kinds and classification.
//!
//! **[`scope`]**: Per-category range configuration ([`LayerConfig`]) and
//! range state.
//!
//! **[`manager`]**: [`LayerManager`], the sole allocator of ordering keys:
//! allocation, raise/lower/to-front/to-back, reclassification and exhaustion
//! signalling.
//!
//! **[`scene`]**: The [`LayerScene`](scene::LayerScene) trait the manager
//! operates on.
//!
//! **[`item`]**: Struct-of-arrays item store, paint order and change lists.
//!
//! **[`registry`]**: [`ItemRegistry`], which owns a manager and a store and
//! adds selection lifting and compaction.
//!
//! **[`dirty`]**: Dirty-tracking channels via `understory_dirty`.
//!
//! **[`trace`]**: [`TraceSink`](trace::TraceSink) trait and event types for
//! key-operation instrumentation, with zero-overhead [`Tracer`](trace::Tracer)
//! wrapper.
//!
//! # Example
//!
//! ```
//! use strata_core::{ItemKind, ItemRegistry, ItemTag, MoveDestination};
//!
//! let mut registry = ItemRegistry::board();
//! let a = registry.insert(ItemTag::new(ItemKind::Stroke), None).unwrap().id;
//! let b = registry.insert(ItemTag::new(ItemKind::Stroke), None).unwrap().id;
//! registry.reorder(a, MoveDestination::BringToFront).unwrap();
//! assert_eq!(registry.paint_order(), [b, a]);
//! ```
//!
//! # Crate features
//!
//! - `std` (disabled by default): Enables `std` support in dependencies.
//! - `serde` (disabled by default): `Serialize`/`Deserialize` for
//!   [`LayerConfig`] and [`LayerCategory`].
//! - `trace` (disabled by default): Enables `Tracer` method bodies (one branch
//!   per call site).
//! - `trace-rich` (disabled by default, implies `trace`): Gates paint-order
//!   events.

#![no_std]
#![cfg_attr(docsrs, feature(doc_auto_cfg))]

extern crate alloc;

pub mod category;
pub mod dirty;
pub mod error;
pub mod item;
pub mod manager;
pub mod registry;
pub mod scene;
pub mod scope;
pub mod trace;

pub use category::{ItemKind, ItemTag, LayerCategory};
pub use error::{ConfigError, ERROR_KEY, Edge, KeyError, KeyResultExt};
pub use item::{ItemId, KeyChanges};
pub use manager::LayerManager;
pub use registry::ItemRegistry;
pub use scene::MoveDestination;
pub use scope::{LayerConfig, ScopeConfig};
