// Copyright 2026 the Strata Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Scene-side bookkeeping: the item registry.
//!
//! [`ItemRegistry`] owns a [`LayerManager`] and the [`ItemStore`] it stamps,
//! which ties the range state to exactly one scene. Insertion classifies the
//! item, allocates a key in its category and stamps it; removal drops the
//! item from every cache without touching range state.
//!
//! The manager only *signals* exhaustion. The registry is what can act on
//! it, because it knows every live key: [`compact`](ItemRegistry::compact)
//! redistributes a category's keys around the scope origin and resets the
//! cursors. With auto-compaction on (the default), an insertion or
//! bring-to-front that hits the top edge compacts once and retries, and a
//! send-to-back that hits the bottom edge compacts the rest of the category
//! one step above the lower bound and retries.
//!
//! Every mutating operation returns an outcome value describing what
//! happened. Outcomes convert into [`trace`](crate::trace) events, so callers
//! that want diagnostics emit them through a [`Tracer`](crate::trace::Tracer)
//! themselves.
//!
//! Stale handles never panic: queries return `None` and mutations return
//! [`KeyError::StaleItem`].

use alloc::vec::Vec;

use kurbo::Rect;

use crate::category::{ItemTag, LayerCategory};
use crate::error::{ConfigError, Edge, KeyError};
use crate::item::{ItemId, ItemStore, KeyChanges};
use crate::manager::{LayerManager, Reorder};
use crate::scene::{LayerScene, MoveDestination};
use crate::scope::LayerConfig;

/// A category renormalization performed by [`ItemRegistry::compact`].
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Compaction {
    /// The compacted category.
    pub category: LayerCategory,
    /// Number of live items that were redistributed.
    pub items: u32,
    /// Lowest key after compaction.
    pub floor: f64,
    /// Next key allocation will hand out.
    pub next: f64,
}

/// The result of [`ItemRegistry::insert`].
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Inserted {
    /// Handle of the new item.
    pub id: ItemId,
    /// Category the item was classified into.
    pub category: LayerCategory,
    /// Key the item was stamped with.
    pub key: f64,
    /// Compaction that ran to make room, if any.
    pub compaction: Option<Compaction>,
}

/// The result of [`ItemRegistry::remove`].
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Removed {
    /// Handle of the removed item (now stale).
    pub id: ItemId,
    /// Category the item belonged to.
    pub category: LayerCategory,
    /// The item's last own key.
    pub key: f64,
}

/// The result of [`ItemRegistry::reorder`].
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Reordered {
    /// What the layer manager did.
    pub reorder: Reorder<ItemId>,
    /// Compaction that ran to make room, if any.
    pub compaction: Option<Compaction>,
}

/// The result of [`ItemRegistry::reclassify`].
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Reclassified {
    /// The reclassified item.
    pub id: ItemId,
    /// Category before the move.
    pub from: LayerCategory,
    /// Category after the move.
    pub to: LayerCategory,
    /// Own key before the move.
    pub old_key: f64,
    /// Own key after the move.
    pub new_key: f64,
}

/// Live items of one scene, stamped with ordering keys.
#[derive(Debug)]
pub struct ItemRegistry {
    layers: LayerManager,
    items: ItemStore,
    auto_compact: bool,
    revision: u64,
}

impl Default for ItemRegistry {
    fn default() -> Self {
        Self::board()
    }
}

impl ItemRegistry {
    /// Creates an empty registry for a validated scope table.
    pub fn new(config: &LayerConfig) -> Result<Self, ConfigError> {
        Ok(Self::with_manager(LayerManager::new(config)?))
    }

    /// Creates an empty registry using the [`LayerConfig::board`] preset.
    #[must_use]
    pub fn board() -> Self {
        Self::with_manager(LayerManager::board())
    }

    /// Creates an empty registry around an existing manager.
    #[must_use]
    pub fn with_manager(layers: LayerManager) -> Self {
        Self {
            layers,
            items: ItemStore::new(),
            auto_compact: true,
            revision: 0,
        }
    }

    /// Enables or disables compaction on exhaustion.
    pub fn set_auto_compact(&mut self, enabled: bool) {
        self.auto_compact = enabled;
    }

    /// Returns whether compaction on exhaustion is enabled.
    #[must_use]
    pub fn auto_compact(&self) -> bool {
        self.auto_compact
    }

    /// Returns the layer manager.
    #[must_use]
    pub fn layers(&self) -> &LayerManager {
        &self.layers
    }

    /// Returns the item store.
    #[must_use]
    pub fn items(&self) -> &ItemStore {
        &self.items
    }

    /// Returns a counter bumped by every operation that changed a key,
    /// category, selection or membership.
    #[must_use]
    pub fn revision(&self) -> u64 {
        self.revision
    }

    // -- Membership --

    /// Classifies `tag`, allocates a key in its category and registers the
    /// item.
    ///
    /// Fails with [`KeyError::InvalidCategory`] for tags that classify into
    /// an unconfigured category and with [`KeyError::Exhausted`] when the
    /// category has no headroom even after compaction. Nothing is
    /// registered on failure.
    pub fn insert(&mut self, tag: ItemTag, bounds: Option<Rect>) -> Result<Inserted, KeyError> {
        let category = self.layers.classify(tag);
        let (key, compaction) = self.allocate_compacting(category)?;
        let id = self.items.insert(tag, category, key, bounds);
        self.revision += 1;
        Ok(Inserted {
            id,
            category,
            key,
            compaction,
        })
    }

    /// Unregisters an item.
    ///
    /// The item's key is abandoned; range state is not touched.
    pub fn remove(&mut self, id: ItemId) -> Result<Removed, KeyError> {
        let (category, key) = self.items.remove(id).ok_or(KeyError::StaleItem(id.index()))?;
        self.revision += 1;
        Ok(Removed { id, category, key })
    }

    /// Removes every item and resets every scope to its origin.
    ///
    /// Returns the number of items removed.
    pub fn clear(&mut self) -> usize {
        let doomed: Vec<_> = self.items.iter().collect();
        for &id in &doomed {
            self.items.remove(id);
        }
        self.layers.reset_all();
        self.revision += 1;
        doomed.len()
    }

    /// Removes every item in `category` and resets its scope.
    ///
    /// Returns the number of items removed.
    pub fn clear_category(&mut self, category: LayerCategory) -> Result<usize, KeyError> {
        self.layers.reset_scope(category)?;
        let removed = self.items.remove_category(category).len();
        self.revision += 1;
        Ok(removed)
    }

    // -- Queries --

    /// Returns whether the given handle refers to a live item.
    #[must_use]
    pub fn is_alive(&self, id: ItemId) -> bool {
        self.items.is_alive(id)
    }

    /// Returns the number of live items.
    #[must_use]
    pub fn len(&self) -> usize {
        self.items.len()
    }

    /// Returns whether no items are registered.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    /// Iterates over every live item in slot order.
    pub fn iter(&self) -> impl Iterator<Item = ItemId> + '_ {
        self.items.iter()
    }

    /// Returns the key the item is composited with.
    #[must_use]
    pub fn key(&self, id: ItemId) -> Option<f64> {
        self.items.key(id)
    }

    /// Returns the key allocated to the item, ignoring any selection lift.
    #[must_use]
    pub fn own_key(&self, id: ItemId) -> Option<f64> {
        self.items.own_key(id)
    }

    /// Returns the item's category.
    #[must_use]
    pub fn category(&self, id: ItemId) -> Option<LayerCategory> {
        self.items.category(id)
    }

    /// Returns the tag the item was inserted with.
    #[must_use]
    pub fn tag(&self, id: ItemId) -> Option<ItemTag> {
        self.items.tag(id)
    }

    /// Returns the item's bounds.
    #[must_use]
    pub fn bounds(&self, id: ItemId) -> Option<Rect> {
        self.items.bounds(id)
    }

    /// Returns whether the item is selected.
    #[must_use]
    pub fn is_selected(&self, id: ItemId) -> bool {
        self.items.is_selected(id)
    }

    /// Returns the same-category items that share `id`'s visual region,
    /// excluding `id` itself.
    #[must_use]
    pub fn siblings(&self, id: ItemId) -> Vec<ItemId> {
        let mut out = Vec::new();
        self.items.siblings(id, &mut out);
        out.retain(|&sibling| sibling != id);
        out
    }

    /// Returns every live item, bottom first.
    #[must_use]
    pub fn paint_order(&self) -> Vec<ItemId> {
        self.items.paint_order()
    }

    /// Like [`paint_order`](Self::paint_order), but reuses a caller-provided
    /// buffer.
    pub fn paint_order_into(&self, order: &mut Vec<ItemId>) {
        self.items.paint_order_into(order);
    }

    // -- Key mutation --

    /// Replaces the item's visual region.
    pub fn set_bounds(&mut self, id: ItemId, bounds: Option<Rect>) -> Result<(), KeyError> {
        if self.items.set_bounds(id, bounds) {
            Ok(())
        } else {
            Err(KeyError::StaleItem(id.index()))
        }
    }

    /// Moves an item within its category.
    ///
    /// See [`LayerManager::reorder`] for the per-destination rules. A
    /// send-to-back that clamps to the lower bound ranks the item below any
    /// item sharing that key, so it paints at the back even when the call
    /// returns an error. With auto-compaction on, the clamp is followed by a
    /// compaction that frees the key below the rest of the category, and the
    /// move is retried.
    pub fn reorder(
        &mut self,
        id: ItemId,
        destination: MoveDestination,
    ) -> Result<Reordered, KeyError> {
        let old_key = self.items.own_key(id);
        match self.layers.reorder(&mut self.items, id, destination) {
            Ok(reorder) => {
                self.revision += 1;
                Ok(Reordered {
                    reorder,
                    compaction: None,
                })
            }
            Err(KeyError::Exhausted {
                category,
                edge: Edge::Top,
            }) if self.auto_compact && destination == MoveDestination::BringToFront => {
                let compaction = self.compact(category)?;
                let reorder = self.layers.reorder(&mut self.items, id, destination)?;
                self.revision += 1;
                Ok(Reordered {
                    reorder,
                    compaction: Some(compaction),
                })
            }
            Err(
                err @ KeyError::Exhausted {
                    category,
                    edge: Edge::Bottom,
                },
            ) => {
                self.items.send_behind_ties(id);
                self.revision += 1;
                if !self.auto_compact {
                    return Err(err);
                }
                let compaction = self.renormalize(category, Some(id))?;
                let mut reorder = self.layers.reorder(&mut self.items, id, destination)?;
                if let Some(old_key) = old_key {
                    reorder.old_key = old_key;
                }
                Ok(Reordered {
                    reorder,
                    compaction: Some(compaction),
                })
            }
            Err(err) => Err(err),
        }
    }

    /// Moves an item into another category with a fresh key.
    pub fn reclassify(
        &mut self,
        id: ItemId,
        category: LayerCategory,
    ) -> Result<Reclassified, KeyError> {
        let stale = KeyError::StaleItem(id.index());
        let from = self.items.category(id).ok_or(stale)?;
        let old_key = self.items.own_key(id).ok_or(stale)?;
        let new_key = self.layers.reclassify(&mut self.items, id, category)?;
        self.revision += 1;
        Ok(Reclassified {
            id,
            from,
            to: category,
            old_key,
            new_key,
        })
    }

    /// Lifts the item's display key to the selection key.
    ///
    /// The own key is kept, so reordering while selected and deselecting
    /// afterwards both behave as if the lift never happened. Returns the
    /// lifted key.
    pub fn select(&mut self, id: ItemId) -> Result<f64, KeyError> {
        if !self.items.is_alive(id) {
            return Err(KeyError::StaleItem(id.index()));
        }
        let key = self.layers.allocate(LayerCategory::Selection)?;
        self.items.lift(id, key);
        self.revision += 1;
        Ok(key)
    }

    /// Restores the item's display key to its own key.
    ///
    /// Returns whether the item was selected.
    pub fn deselect(&mut self, id: ItemId) -> Result<bool, KeyError> {
        if !self.items.is_alive(id) {
            return Err(KeyError::StaleItem(id.index()));
        }
        let was_selected = self.items.unlift(id);
        if was_selected {
            self.revision += 1;
        }
        Ok(was_selected)
    }

    /// Redistributes the live keys of `category` on consecutive steps
    /// starting at the scope origin, then resets the scope's cursors.
    ///
    /// Relative order is preserved, with equal keys ordered by insertion
    /// unless an item was clamped behind them. When the items do not fit
    /// above the origin, the run is shifted down toward the lower bound. If
    /// they do not fit in the whole range the top edge stays exhausted.
    pub fn compact(&mut self, category: LayerCategory) -> Result<Compaction, KeyError> {
        self.renormalize(category, None)
    }

    /// Compacts `category`, leaving `behind` where it is.
    ///
    /// When `behind` is set, the run starts at least one step above the lower
    /// bound if the range has room, so the next send-to-back can descend
    /// below it.
    fn renormalize(
        &mut self,
        category: LayerCategory,
        behind: Option<ItemId>,
    ) -> Result<Compaction, KeyError> {
        let scope = *self
            .layers
            .scope(category)
            .ok_or(KeyError::InvalidCategory(category))?;
        let mut members = self.items.members_by_key(category);
        if let Some(behind) = behind {
            members.retain(|&id| id != behind);
        }
        let items = u32::try_from(members.len()).unwrap_or(u32::MAX);

        let (floor, next) = if scope.is_pinned() {
            (scope.lower(), scope.lower())
        } else {
            let step = scope.step();
            let span = f64::from(items) * step;
            let mut start = scope.origin().min(scope.upper() - span).max(scope.lower());
            if behind.is_some() && scope.lower() + span.max(step) <= scope.upper() {
                start = start.max(scope.lower() + step);
            }
            (start, start + span)
        };

        for (i, id) in (0_u32..).zip(members) {
            let key = if scope.is_pinned() {
                floor
            } else {
                floor + f64::from(i) * scope.step()
            };
            if self.items.own_key(id) != Some(key) {
                self.items.set_key(id, key);
            }
        }
        self.layers.set_cursors(category, floor, next)?;
        self.revision += 1;
        Ok(Compaction {
            category,
            items,
            floor,
            next,
        })
    }

    // -- Changes --

    /// Drains the changes accumulated since the previous drain.
    pub fn drain_changes(&mut self) -> KeyChanges {
        self.items.drain_changes()
    }

    /// Like [`drain_changes`](Self::drain_changes), but reuses a
    /// caller-provided buffer.
    pub fn drain_changes_into(&mut self, changes: &mut KeyChanges) {
        self.items.drain_changes_into(changes);
    }

    fn allocate_compacting(
        &mut self,
        category: LayerCategory,
    ) -> Result<(f64, Option<Compaction>), KeyError> {
        match self.layers.allocate(category) {
            Ok(key) => Ok((key, None)),
            Err(KeyError::Exhausted {
                edge: Edge::Top, ..
            }) if self.auto_compact => {
                let compaction = self.compact(category)?;
                let key = self.layers.allocate(category)?;
                Ok((key, Some(compaction)))
            }
            Err(err) => Err(err),
        }
    }
}
