// Copyright 2026 the Strata Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Ordering-key allocation and relative reordering.
//!
//! [`LayerManager`] owns one [`RangeState`] per configured category and is
//! the only component that hands out ordering keys. Because configured ranges
//! are disjoint, a key allocated for one category can never compare equal to
//! or interleave with a key of another, whatever order allocations happen in.
//!
//! # Exhaustion
//!
//! Allocation detects the top edge one call late: the call that pushes the
//! cursor past the upper bound still returns a valid key, and only the
//! following calls fail with [`KeyError::Exhausted`]. Send-to-back clamps the
//! item to the lower bound and reports the bottom edge on the same call.
//! Either condition persists until [`set_cursors`](LayerManager::set_cursors)
//! or [`reset_scope`](LayerManager::reset_scope) is called by whoever
//! renormalizes the category's keys.
//!
//! # Threading
//!
//! A manager has exactly one owner. It performs no internal synchronization
//! and no I/O; every operation runs to completion synchronously.

use alloc::vec::Vec;

use crate::category::{ItemTag, LayerCategory};
use crate::error::{ConfigError, ERROR_KEY, Edge, KeyError};
use crate::scene::{LayerScene, MoveDestination};
use crate::scope::{LayerConfig, RangeState};

/// The result of a successful [`LayerManager::reorder`].
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Reorder<I> {
    /// The item that was moved.
    pub item: I,
    /// The item's category.
    pub category: LayerCategory,
    /// The requested destination.
    pub destination: MoveDestination,
    /// The item's key before the move.
    pub old_key: f64,
    /// The item's key after the move.
    pub new_key: f64,
    /// The sibling whose key was exchanged, for single-step moves.
    pub swapped_with: Option<I>,
}

impl<I> Reorder<I> {
    /// Returns whether the move left every key unchanged.
    #[must_use]
    pub fn is_noop(&self) -> bool {
        self.swapped_with.is_none() && self.old_key == self.new_key
    }
}

/// Allocates and mutates ordering keys within per-category ranges.
#[derive(Clone, Debug)]
pub struct LayerManager {
    scopes: [Option<RangeState>; LayerCategory::COUNT],
}

impl Default for LayerManager {
    fn default() -> Self {
        Self::board()
    }
}

impl LayerManager {
    /// Creates a manager for a validated scope table.
    pub fn new(config: &LayerConfig) -> Result<Self, ConfigError> {
        config.validate()?;
        Ok(Self::from_config(config))
    }

    /// Creates a manager using the [`LayerConfig::board`] preset.
    #[must_use]
    pub fn board() -> Self {
        Self::from_config(&LayerConfig::board())
    }

    fn from_config(config: &LayerConfig) -> Self {
        let mut scopes = [None; LayerCategory::COUNT];
        for (category, scope) in config.iter() {
            scopes[category.index()] = Some(RangeState::new(scope));
        }
        Self { scopes }
    }

    // -- Queries --

    /// Returns the range state of `category`, if configured.
    #[must_use]
    pub fn scope(&self, category: LayerCategory) -> Option<&RangeState> {
        self.scopes[category.index()].as_ref()
    }

    /// Returns whether `category` has a configured range.
    #[must_use]
    pub fn is_valid_category(&self, category: LayerCategory) -> bool {
        self.scope(category).is_some()
    }

    /// Returns the lowest key of `category`, or [`ERROR_KEY`] if it is not
    /// configured.
    #[must_use]
    pub fn lower_bound(&self, category: LayerCategory) -> f64 {
        self.scope(category).map_or(ERROR_KEY, RangeState::lower)
    }

    /// Returns the highest key of `category`, or [`ERROR_KEY`] if it is not
    /// configured.
    #[must_use]
    pub fn upper_bound(&self, category: LayerCategory) -> f64 {
        self.scope(category).map_or(ERROR_KEY, RangeState::upper)
    }

    /// Returns whether `category` is exhausted at `edge`.
    #[must_use]
    pub fn is_exhausted(&self, category: LayerCategory, edge: Edge) -> bool {
        self.scope(category)
            .is_some_and(|scope| scope.is_exhausted(edge))
    }

    /// Returns whether `key` lies in the range of `category`.
    #[must_use]
    pub fn contains(&self, category: LayerCategory, key: f64) -> bool {
        self.scope(category).is_some_and(|scope| scope.contains(key))
    }

    /// Returns the category whose range contains `key`.
    #[must_use]
    pub fn category_of_key(&self, key: f64) -> Option<LayerCategory> {
        LayerCategory::ALL
            .into_iter()
            .find(|&category| self.contains(category, key))
    }

    /// Returns the category `tag` classifies into.
    ///
    /// This is a pure function of the tag; it does not consult or change any
    /// range state.
    #[must_use]
    pub fn classify(&self, tag: ItemTag) -> LayerCategory {
        tag.classify()
    }

    // -- Allocation --

    /// Allocates the next key of `category`.
    pub fn allocate(&mut self, category: LayerCategory) -> Result<f64, KeyError> {
        let scope = self.scope_mut(category)?;
        scope.advance().ok_or(KeyError::Exhausted {
            category,
            edge: Edge::Top,
        })
    }

    /// Classifies `item` and allocates the next key of its category.
    ///
    /// The item itself is not stamped.
    pub fn allocate_for<S: LayerScene>(
        &mut self,
        scene: &S,
        item: S::Item,
    ) -> Result<f64, KeyError> {
        let tag = scene
            .tag(item)
            .ok_or(KeyError::StaleItem(scene.index_of(item)))?;
        self.allocate(self.classify(tag))
    }

    // -- Mutation of item keys --

    /// Moves `item` within its category.
    ///
    /// Only siblings of the same category are consulted; keys of every other
    /// category are untouched. A single-step move with no sibling in that
    /// direction is a no-op that reports the existing key.
    ///
    /// Send-to-back past the lower bound still stamps the item with the lower
    /// bound before returning [`KeyError::Exhausted`] with [`Edge::Bottom`].
    /// Every other failure leaves the item untouched.
    pub fn reorder<S: LayerScene>(
        &mut self,
        scene: &mut S,
        item: S::Item,
        destination: MoveDestination,
    ) -> Result<Reorder<S::Item>, KeyError> {
        let stale = KeyError::StaleItem(scene.index_of(item));
        let category = scene.category(item).ok_or(stale)?;
        let old_key = scene.key(item).ok_or(stale)?;
        let mut outcome = Reorder {
            item,
            category,
            destination,
            old_key,
            new_key: old_key,
            swapped_with: None,
        };

        match destination {
            MoveDestination::BringToFront => {
                outcome.new_key = self.allocate(category)?;
                scene.set_key(item, outcome.new_key);
            }
            MoveDestination::SendToBack => {
                let scope = self.scope_mut(category)?;
                match scope.descend() {
                    Some(key) => {
                        outcome.new_key = key;
                        scene.set_key(item, key);
                    }
                    None => {
                        let lower = scope.lower();
                        scene.set_key(item, lower);
                        return Err(KeyError::Exhausted {
                            category,
                            edge: Edge::Bottom,
                        });
                    }
                }
            }
            MoveDestination::RaiseOne | MoveDestination::LowerOne => {
                if !self.is_valid_category(category) {
                    return Err(KeyError::InvalidCategory(category));
                }
                let upward = destination == MoveDestination::RaiseOne;
                if let Some((neighbor, neighbor_key)) =
                    nearest_sibling(scene, item, category, old_key, upward)
                {
                    scene.set_key(item, neighbor_key);
                    scene.set_key(neighbor, old_key);
                    outcome.new_key = neighbor_key;
                    outcome.swapped_with = Some(neighbor);
                }
            }
        }
        Ok(outcome)
    }

    /// Moves `item` into `category` with a fresh key from that range.
    ///
    /// The old key is abandoned; the old category is not compacted. On
    /// failure the item keeps its category and key.
    pub fn reclassify<S: LayerScene>(
        &mut self,
        scene: &mut S,
        item: S::Item,
        category: LayerCategory,
    ) -> Result<f64, KeyError> {
        if scene.category(item).is_none() {
            return Err(KeyError::StaleItem(scene.index_of(item)));
        }
        let key = self.allocate(category)?;
        scene.set_category(item, category);
        scene.set_key(item, key);
        Ok(key)
    }

    // -- Renormalization hooks --

    /// Resets the cursors of `category` after its keys were redistributed.
    ///
    /// `floor` is the lowest occupied key and `next` the next key to hand
    /// out. Both exhaustion flags are cleared unless `next` already lies past
    /// the upper bound.
    pub fn set_cursors(
        &mut self,
        category: LayerCategory,
        floor: f64,
        next: f64,
    ) -> Result<(), KeyError> {
        self.scope_mut(category)?.set_cursors(floor, next);
        Ok(())
    }

    /// Moves both cursors of `category` back to the configured origin.
    pub fn reset_scope(&mut self, category: LayerCategory) -> Result<(), KeyError> {
        self.scope_mut(category)?.reset();
        Ok(())
    }

    /// Resets every configured scope.
    pub fn reset_all(&mut self) {
        for scope in self.scopes.iter_mut().flatten() {
            scope.reset();
        }
    }

    fn scope_mut(&mut self, category: LayerCategory) -> Result<&mut RangeState, KeyError> {
        self.scopes[category.index()]
            .as_mut()
            .ok_or(KeyError::InvalidCategory(category))
    }
}

/// Finds the same-category sibling whose key is nearest to `key` in the
/// given direction, excluding equal keys.
fn nearest_sibling<S: LayerScene>(
    scene: &S,
    item: S::Item,
    category: LayerCategory,
    key: f64,
    upward: bool,
) -> Option<(S::Item, f64)> {
    let mut candidates = Vec::new();
    scene.siblings(item, &mut candidates);

    let mut best: Option<(S::Item, f64)> = None;
    for sibling in candidates {
        if sibling == item || scene.category(sibling) != Some(category) {
            continue;
        }
        let Some(sibling_key) = scene.key(sibling) else {
            continue;
        };
        let beyond = if upward {
            sibling_key > key
        } else {
            sibling_key < key
        };
        if !beyond {
            continue;
        }
        let closer = match best {
            None => true,
            Some((_, best_key)) if upward => sibling_key < best_key,
            Some((_, best_key)) => sibling_key > best_key,
        };
        if closer {
            best = Some((sibling, sibling_key));
        }
    }
    best
}
