// Copyright 2026 the Strata Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! The contract between the layer manager and the scene that owns the items.
//!
//! The [`LayerManager`](crate::manager::LayerManager) never stores items or
//! per-item keys. Whatever owns the items implements [`LayerScene`] so the
//! manager can read and stamp keys and ask for the items that share an
//! item's visual region. [`ItemRegistry`](crate::registry::ItemRegistry)
//! provides the implementation used in practice.

use alloc::vec::Vec;

use crate::category::{ItemTag, LayerCategory};

/// Where a relative reorder moves an item within its category.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum MoveDestination {
    /// Swap with the nearest same-category sibling above.
    RaiseOne,
    /// Swap with the nearest same-category sibling below.
    LowerOne,
    /// Take a fresh key above every key allocated so far.
    BringToFront,
    /// Take a key below every key handed out so far.
    SendToBack,
}

impl MoveDestination {
    /// All destinations.
    pub const ALL: [Self; 4] = [
        Self::RaiseOne,
        Self::LowerOne,
        Self::BringToFront,
        Self::SendToBack,
    ];

    /// Returns a short name for diagnostics.
    #[must_use]
    pub const fn name(self) -> &'static str {
        match self {
            Self::RaiseOne => "raise_one",
            Self::LowerOne => "lower_one",
            Self::BringToFront => "bring_to_front",
            Self::SendToBack => "send_to_back",
        }
    }
}

/// Item storage the layer manager operates on.
///
/// Every accessor returns `None` for items that are no longer live; the
/// manager turns that into [`KeyError::StaleItem`](crate::error::KeyError::StaleItem).
pub trait LayerScene {
    /// Handle type for items.
    type Item: Copy + Eq;

    /// Returns the raw slot index of `item`, for diagnostics.
    fn index_of(&self, item: Self::Item) -> u32;

    /// Returns the item's classification metadata.
    fn tag(&self, item: Self::Item) -> Option<ItemTag>;

    /// Returns the category the item was stamped with.
    fn category(&self, item: Self::Item) -> Option<LayerCategory>;

    /// Returns the item's ordering key.
    fn key(&self, item: Self::Item) -> Option<f64>;

    /// Stamps the item with a new ordering key.
    fn set_key(&mut self, item: Self::Item, key: f64);

    /// Stamps the item with a new category.
    fn set_category(&mut self, item: Self::Item, category: LayerCategory);

    /// Appends the live items that share `item`'s visual region to `out`.
    ///
    /// The result may include `item` itself and items of other categories;
    /// the manager filters both out.
    fn siblings(&self, item: Self::Item, out: &mut Vec<Self::Item>);
}
