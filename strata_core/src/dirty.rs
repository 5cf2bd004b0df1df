// Copyright 2026 the Strata Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Dirty-tracking channel constants.
//!
//! The item store records per-item changes with [`understory_dirty`], one
//! channel per kind of change. None of the channels propagate: items have no
//! parent/child dependencies for ordering purposes, so only the explicitly
//! marked item appears in the drain output.
//!
//! Callers never query dirty state directly. Each
//! [`ItemRegistry::drain_changes`](crate::registry::ItemRegistry::drain_changes)
//! call drains all channels and surfaces the results as
//! [`KeyChanges`](crate::item::KeyChanges).

use understory_dirty::Channel;

/// Display key changed; the compositor must restack the item.
pub const KEY: Channel = Channel::new(0);

/// Category changed through reclassification.
pub const CATEGORY: Channel = Channel::new(1);

/// Item was selected or deselected.
pub const SELECTION: Channel = Channel::new(2);
