// Copyright 2026 the Strata Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Item data model.
//!
//! An *item* is anything the scene composites: a stroke, a picture, a tool
//! widget, an overlay. Each item has:
//!
//! - An identity ([`ItemId`]), a generational handle that stops resolving
//!   once the item is removed.
//! - Classification: the [`ItemTag`](crate::category::ItemTag) it was
//!   inserted with and the [`LayerCategory`](crate::category::LayerCategory)
//!   it was stamped with.
//! - An *own* ordering key and, while selected, a *lifted* display key.
//! - Optional bounds used to find the siblings that share its visual region.
//!
//! Items are stored in struct-of-arrays layout with index-based handles.
//!
//! # Dirty tracking
//!
//! Stamping marks the channels in [`dirty`](crate::dirty); draining them
//! produces [`KeyChanges`].

mod changes;
mod id;
mod order;
mod store;

pub use changes::KeyChanges;
pub use id::{INVALID, ItemId};
pub use order::Overlapping;
pub use store::ItemStore;
