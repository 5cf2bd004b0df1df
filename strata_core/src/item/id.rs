// Copyright 2026 the Strata Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Item identity.

use core::fmt;

/// Sentinel value indicating "no item" in raw slot fields.
pub const INVALID: u32 = u32::MAX;

/// A handle to an item in an [`ItemStore`](super::ItemStore).
///
/// Contains both a slot index and a generation counter so that stale handles
/// can be detected after an item is removed and the slot is reused.
#[derive(Clone, Copy, PartialEq, Eq, Hash)]
pub struct ItemId {
    /// Slot index into the store's arrays.
    pub(crate) idx: u32,
    /// Generation counter; must match the store's generation for this slot.
    pub(crate) generation: u32,
}

impl ItemId {
    /// A handle that never refers to a live item.
    pub const DANGLING: Self = Self {
        idx: INVALID,
        generation: 0,
    };

    /// Returns the raw slot index (for diagnostics only).
    #[inline]
    #[must_use]
    pub const fn index(self) -> u32 {
        self.idx
    }

    /// Returns the generation counter.
    #[inline]
    #[must_use]
    pub const fn generation(self) -> u32 {
        self.generation
    }
}

impl fmt::Debug for ItemId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "ItemId({}@gen{})", self.idx, self.generation)
    }
}
