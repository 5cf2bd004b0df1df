// Copyright 2026 the Strata Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Scope configuration and per-category range state.
//!
//! A [`LayerConfig`] lists one [`ScopeConfig`] per configured category. When a
//! [`LayerManager`](crate::manager::LayerManager) is built, each scope becomes
//! a [`RangeState`] with two cursors:
//!
//! - `current`: the next key handed out by allocation; it only moves up.
//! - `floor`: the lowest key handed out so far; it only moves down, by
//!   send-to-back.
//!
//! Both start at the scope's origin. A scope whose bounds are equal is
//! *pinned*: it holds a single key that every allocation returns.

use alloc::vec::Vec;

use crate::category::LayerCategory;
use crate::error::{ConfigError, Edge};

/// Range settings for one category.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct ScopeConfig {
    /// Lowest key in the scope (inclusive).
    pub lower: f64,
    /// Highest key in the scope (inclusive).
    pub upper: f64,
    /// Distance between consecutive keys.
    pub step: f64,
    /// Where both cursors start. `None` means `lower`.
    pub origin: Option<f64>,
}

impl ScopeConfig {
    /// A scope covering `lower..=upper` with a unit step.
    #[must_use]
    pub const fn new(lower: f64, upper: f64) -> Self {
        Self {
            lower,
            upper,
            step: 1.0,
            origin: None,
        }
    }

    /// A scope holding the single key `key`.
    #[must_use]
    pub const fn pinned(key: f64) -> Self {
        Self::new(key, key)
    }

    /// Returns this scope with a different step.
    #[must_use]
    pub const fn with_step(mut self, step: f64) -> Self {
        self.step = step;
        self
    }

    /// Returns this scope with its cursors starting at `origin`.
    #[must_use]
    pub const fn with_origin(mut self, origin: f64) -> Self {
        self.origin = Some(origin);
        self
    }

    /// Returns where the cursors start.
    #[must_use]
    pub const fn start(&self) -> f64 {
        match self.origin {
            Some(origin) => origin,
            None => self.lower,
        }
    }

    /// Returns whether the scope holds a single key.
    #[must_use]
    pub fn is_pinned(&self) -> bool {
        self.lower == self.upper
    }

    fn validate(&self, category: LayerCategory) -> Result<(), ConfigError> {
        let start = self.start();
        if !(self.lower.is_finite()
            && self.upper.is_finite()
            && self.step.is_finite()
            && start.is_finite())
        {
            return Err(ConfigError::NonFinite(category));
        }
        if self.step <= 0.0 {
            return Err(ConfigError::NonPositiveStep(category));
        }
        if self.lower > self.upper {
            return Err(ConfigError::InvertedRange(category));
        }
        if !self.is_pinned()
            && (self.lower + self.step == self.lower || self.upper - self.step == self.upper)
        {
            return Err(ConfigError::StepTooSmall(category));
        }
        if start < self.lower || start > self.upper {
            return Err(ConfigError::OriginOutOfRange(category));
        }
        Ok(())
    }

    fn overlaps(&self, other: &Self) -> bool {
        self.lower <= other.upper && other.lower <= self.upper
    }
}

/// The full scope table for a scene.
///
/// Categories without a scope are invalid: every key operation on them
/// fails with [`KeyError::InvalidCategory`](crate::error::KeyError::InvalidCategory).
#[derive(Clone, Debug, PartialEq)]
pub struct LayerConfig {
    scopes: [Option<ScopeConfig>; LayerCategory::COUNT],
}

impl Default for LayerConfig {
    fn default() -> Self {
        Self::board()
    }
}

impl LayerConfig {
    /// A table with no configured categories.
    #[must_use]
    pub const fn empty() -> Self {
        Self {
            scopes: [None; LayerCategory::COUNT],
        }
    }

    /// The whiteboard preset.
    ///
    /// Background sits at a pinned key below all content. Objects stack below
    /// drawings, and both start mid-range so send-to-back has headroom. Tool,
    /// curtain and overlay tiers follow, with the selection lift just under
    /// the eraser and the cache overlay on top.
    #[must_use]
    pub const fn board() -> Self {
        Self::empty()
            .with_scope(
                LayerCategory::Background,
                ScopeConfig::pinned(-1_000_001.0),
            )
            .with_scope(
                LayerCategory::Object,
                ScopeConfig::new(-1_000_000.0, -1.0).with_origin(-500_000.0),
            )
            .with_scope(
                LayerCategory::Drawing,
                ScopeConfig::new(0.0, 999_999.0).with_origin(500_000.0),
            )
            .with_scope(
                LayerCategory::Tool,
                ScopeConfig::new(1_000_000.0, 1_000_099.0),
            )
            .with_scope(
                LayerCategory::BuiltinTool,
                ScopeConfig::new(1_000_100.0, 1_000_199.0),
            )
            .with_scope(
                LayerCategory::Curtain,
                ScopeConfig::new(1_000_200.0, 1_000_989.0),
            )
            .with_scope(LayerCategory::Selection, ScopeConfig::pinned(1_000_990.0))
            .with_scope(
                LayerCategory::Eraser,
                ScopeConfig::new(1_001_000.0, 1_001_099.0),
            )
            .with_scope(
                LayerCategory::Pointer,
                ScopeConfig::new(1_001_100.0, 1_001_199.0),
            )
            .with_scope(
                LayerCategory::Cache,
                ScopeConfig::new(1_001_300.0, 1_001_399.0),
            )
    }

    /// Returns this table with `category` set to `scope`.
    #[must_use]
    pub const fn with_scope(mut self, category: LayerCategory, scope: ScopeConfig) -> Self {
        self.scopes[category.index()] = Some(scope);
        self
    }

    /// Returns this table with `category` unconfigured.
    #[must_use]
    pub const fn without_scope(mut self, category: LayerCategory) -> Self {
        self.scopes[category.index()] = None;
        self
    }

    /// Returns the scope configured for `category`.
    #[must_use]
    pub fn scope(&self, category: LayerCategory) -> Option<&ScopeConfig> {
        self.scopes[category.index()].as_ref()
    }

    /// Iterates over configured `(category, scope)` pairs in category order.
    pub fn iter(&self) -> impl Iterator<Item = (LayerCategory, &ScopeConfig)> + '_ {
        LayerCategory::ALL
            .into_iter()
            .filter_map(|category| self.scope(category).map(|scope| (category, scope)))
    }

    /// Checks every scope and the pairwise disjointness of all ranges.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.scope(LayerCategory::Unassigned).is_some() {
            return Err(ConfigError::UnassignedScope);
        }
        for (category, scope) in self.iter() {
            scope.validate(category)?;
        }
        let configured: Vec<_> = self.iter().collect();
        for (i, &(first, a)) in configured.iter().enumerate() {
            for &(second, b) in &configured[i + 1..] {
                if a.overlaps(b) {
                    return Err(ConfigError::Overlap { first, second });
                }
            }
        }
        Ok(())
    }
}

/// Mutable range state for one configured category.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct RangeState {
    pub(crate) lower: f64,
    pub(crate) upper: f64,
    pub(crate) step: f64,
    pub(crate) origin: f64,
    pub(crate) current: f64,
    pub(crate) floor: f64,
    pub(crate) top_exhausted: bool,
    pub(crate) bottom_exhausted: bool,
}

impl RangeState {
    pub(crate) fn new(config: &ScopeConfig) -> Self {
        let origin = config.start();
        Self {
            lower: config.lower,
            upper: config.upper,
            step: config.step,
            origin,
            current: origin,
            floor: origin,
            top_exhausted: false,
            bottom_exhausted: false,
        }
    }

    /// Lowest key in the scope.
    #[must_use]
    pub const fn lower(&self) -> f64 {
        self.lower
    }

    /// Highest key in the scope.
    #[must_use]
    pub const fn upper(&self) -> f64 {
        self.upper
    }

    /// Distance between consecutive keys.
    #[must_use]
    pub const fn step(&self) -> f64 {
        self.step
    }

    /// Where the cursors start after a reset.
    #[must_use]
    pub const fn origin(&self) -> f64 {
        self.origin
    }

    /// The key the next allocation returns.
    #[must_use]
    pub const fn current(&self) -> f64 {
        self.current
    }

    /// The lowest key handed out so far.
    #[must_use]
    pub const fn floor(&self) -> f64 {
        self.floor
    }

    /// Returns whether the scope holds a single key.
    #[must_use]
    pub fn is_pinned(&self) -> bool {
        self.lower == self.upper
    }

    /// Returns whether the cursor at `edge` is exhausted.
    #[must_use]
    pub const fn is_exhausted(&self, edge: Edge) -> bool {
        match edge {
            Edge::Top => self.top_exhausted,
            Edge::Bottom => self.bottom_exhausted,
        }
    }

    /// Returns whether `key` lies inside the scope.
    #[must_use]
    pub fn contains(&self, key: f64) -> bool {
        self.lower <= key && key <= self.upper
    }

    /// Returns the current key and advances the allocation cursor.
    ///
    /// The call that pushes the cursor past `upper` still succeeds; it clamps
    /// the cursor and marks the top edge exhausted so the *next* call fails.
    pub(crate) fn advance(&mut self) -> Option<f64> {
        if self.is_pinned() {
            return Some(self.lower);
        }
        if self.top_exhausted {
            return None;
        }
        let key = self.current;
        let next = key + self.step;
        if next > self.upper {
            self.current = self.upper;
            self.top_exhausted = true;
        } else {
            self.current = next;
        }
        Some(key)
    }

    /// Moves the floor cursor one step down and returns it.
    ///
    /// On failure the floor is clamped to `lower` and the bottom edge is
    /// marked exhausted.
    pub(crate) fn descend(&mut self) -> Option<f64> {
        if self.is_pinned() {
            return Some(self.lower);
        }
        if self.bottom_exhausted {
            return None;
        }
        let candidate = self.floor - self.step;
        if candidate >= self.lower {
            self.floor = candidate;
            Some(candidate)
        } else {
            self.floor = self.lower;
            self.bottom_exhausted = true;
            None
        }
    }

    /// Resets both cursors after renormalization.
    ///
    /// `floor` is the lowest occupied key and `next` the next key to hand
    /// out. Both are clamped into the range; a `next` past `upper` leaves the
    /// top edge exhausted.
    pub(crate) fn set_cursors(&mut self, floor: f64, next: f64) {
        self.floor = floor.max(self.lower).min(self.upper);
        self.bottom_exhausted = false;
        if next > self.upper {
            self.current = self.upper;
            self.top_exhausted = true;
        } else {
            self.current = next.max(self.floor);
            self.top_exhausted = false;
        }
    }

    pub(crate) fn reset(&mut self) {
        self.current = self.origin;
        self.floor = self.origin;
        self.top_exhausted = false;
        self.bottom_exhausted = false;
    }
}

#[cfg(feature = "serde")]
mod serde_impl {
    //! File representation: a list of `{category, lower, upper, step, origin}`.

    use alloc::vec::Vec;

    use serde::{Deserialize, Serialize};

    use super::{LayerConfig, ScopeConfig};
    use crate::category::LayerCategory;
    use crate::error::ConfigError;

    #[derive(Serialize, Deserialize)]
    struct ScopeEntry {
        category: LayerCategory,
        lower: f64,
        upper: f64,
        #[serde(default = "unit_step")]
        step: f64,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        origin: Option<f64>,
    }

    fn unit_step() -> f64 {
        1.0
    }

    fn from_entries(entries: Vec<ScopeEntry>) -> Result<LayerConfig, ConfigError> {
        let mut config = LayerConfig::empty();
        for e in entries {
            if config.scope(e.category).is_some() {
                return Err(ConfigError::DuplicateScope(e.category));
            }
            config = config.with_scope(
                e.category,
                ScopeConfig {
                    lower: e.lower,
                    upper: e.upper,
                    step: e.step,
                    origin: e.origin,
                },
            );
        }
        config.validate()?;
        Ok(config)
    }

    fn to_entries(config: &LayerConfig) -> Vec<ScopeEntry> {
        config
            .iter()
            .map(|(category, scope)| ScopeEntry {
                category,
                lower: scope.lower,
                upper: scope.upper,
                step: scope.step,
                origin: scope.origin,
            })
            .collect()
    }

    impl Serialize for LayerConfig {
        fn serialize<S: serde::Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
            to_entries(self).serialize(serializer)
        }
    }

    impl<'de> Deserialize<'de> for LayerConfig {
        fn deserialize<D: serde::Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
            let entries = Vec::<ScopeEntry>::deserialize(deserializer)?;
            from_entries(entries).map_err(serde::de::Error::custom)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn drawing_scope(config: &LayerConfig) -> RangeState {
        RangeState::new(config.scope(LayerCategory::Drawing).unwrap())
    }

    #[test]
    fn board_preset_is_valid() {
        assert_eq!(LayerConfig::board().validate(), Ok(()));
    }

    #[test]
    fn board_preset_orders_tiers() {
        let config = LayerConfig::board();
        let upper = |c| config.scope(c).unwrap().upper;
        let lower = |c| config.scope(c).unwrap().lower;
        assert!(upper(LayerCategory::Background) < lower(LayerCategory::Object));
        assert!(upper(LayerCategory::Object) < lower(LayerCategory::Drawing));
        assert!(upper(LayerCategory::Drawing) < lower(LayerCategory::Tool));
        assert!(upper(LayerCategory::Curtain) < lower(LayerCategory::Selection));
        assert!(upper(LayerCategory::Pointer) < lower(LayerCategory::Cache));
        assert!(config.scope(LayerCategory::Unassigned).is_none());
    }

    #[test]
    fn overlapping_scopes_are_rejected() {
        let config = LayerConfig::empty()
            .with_scope(LayerCategory::Object, ScopeConfig::new(-10.0, 0.0))
            .with_scope(LayerCategory::Drawing, ScopeConfig::new(0.0, 10.0));
        assert_eq!(
            config.validate(),
            Err(ConfigError::Overlap {
                first: LayerCategory::Object,
                second: LayerCategory::Drawing,
            })
        );
    }

    #[test]
    fn malformed_scopes_are_rejected() {
        let cases = [
            (
                ScopeConfig::new(0.0, 10.0).with_step(0.0),
                ConfigError::NonPositiveStep(LayerCategory::Tool),
            ),
            (
                ScopeConfig::new(10.0, 0.0),
                ConfigError::InvertedRange(LayerCategory::Tool),
            ),
            (
                ScopeConfig::new(0.0, 10.0).with_origin(11.0),
                ConfigError::OriginOutOfRange(LayerCategory::Tool),
            ),
            (
                ScopeConfig::new(0.0, f64::INFINITY),
                ConfigError::NonFinite(LayerCategory::Tool),
            ),
            (
                ScopeConfig::new(0.0, 1e20),
                ConfigError::StepTooSmall(LayerCategory::Tool),
            ),
            (
                ScopeConfig::new(1e20, 2e20).with_step(1e3),
                ConfigError::StepTooSmall(LayerCategory::Tool),
            ),
        ];
        for (scope, expected) in cases {
            let config = LayerConfig::empty().with_scope(LayerCategory::Tool, scope);
            assert_eq!(config.validate(), Err(expected), "{scope:?}");
        }
        let unassigned =
            LayerConfig::empty().with_scope(LayerCategory::Unassigned, ScopeConfig::new(0.0, 1.0));
        assert_eq!(unassigned.validate(), Err(ConfigError::UnassignedScope));

        let pinned =
            LayerConfig::empty().with_scope(LayerCategory::Tool, ScopeConfig::pinned(1e20));
        assert_eq!(pinned.validate(), Ok(()), "pinned scopes never step");
    }

    #[test]
    fn advance_exhausts_one_call_late() {
        let mut state = RangeState::new(&ScopeConfig::new(0.0, 2.0));
        assert_eq!(state.advance(), Some(0.0));
        assert_eq!(state.advance(), Some(1.0));
        assert_eq!(state.advance(), Some(2.0));
        assert!(state.is_exhausted(Edge::Top), "cursor passed the upper bound");
        assert_eq!(state.current(), 2.0);
        assert_eq!(state.advance(), None);
        assert_eq!(state.advance(), None);
    }

    #[test]
    fn descend_clamps_at_lower_bound() {
        let mut state = drawing_scope(&LayerConfig::empty().with_scope(
            LayerCategory::Drawing,
            ScopeConfig::new(0.0, 10.0).with_origin(2.0),
        ));
        assert_eq!(state.descend(), Some(1.0));
        assert_eq!(state.descend(), Some(0.0));
        assert_eq!(state.descend(), None);
        assert_eq!(state.floor(), 0.0);
        assert!(state.is_exhausted(Edge::Bottom), "floor reached the lower bound");
        assert!(!state.is_exhausted(Edge::Top), "top edge is independent");
    }

    #[test]
    fn bottom_exhaustion_holds_until_cursors_reset() {
        let mut state = RangeState::new(&ScopeConfig::new(0.0, 10.0).with_origin(1.0));
        assert_eq!(state.descend(), Some(0.0));
        assert_eq!(state.descend(), None);
        assert_eq!(state.descend(), None, "stays exhausted");
        assert_eq!(state.floor(), 0.0);

        state.set_cursors(3.0, 6.0);
        assert!(!state.is_exhausted(Edge::Bottom), "renormalization frees the floor");
        assert_eq!(state.descend(), Some(2.0));

        let _ = state.descend();
        let _ = state.descend();
        assert_eq!(state.descend(), None);
        state.reset();
        assert!(!state.is_exhausted(Edge::Bottom), "reset returns to the origin");
        assert_eq!(state.descend(), Some(0.0));
    }

    #[test]
    fn pinned_scope_never_exhausts() {
        let mut state = RangeState::new(&ScopeConfig::pinned(5.0));
        for _ in 0..4 {
            assert_eq!(state.advance(), Some(5.0));
            assert_eq!(state.descend(), Some(5.0));
        }
        assert!(!state.is_exhausted(Edge::Top), "pinned scopes stay usable");
    }

    #[test]
    fn set_cursors_clears_exhaustion() {
        let mut state = RangeState::new(&ScopeConfig::new(0.0, 1.0));
        let _ = state.advance();
        let _ = state.advance();
        assert_eq!(state.advance(), None);
        state.set_cursors(0.0, 1.0);
        assert!(!state.is_exhausted(Edge::Top), "renormalization resets the cursor");
        assert_eq!(state.advance(), Some(1.0));

        state.set_cursors(0.0, 3.0);
        assert!(state.is_exhausted(Edge::Top), "next key beyond upper bound");

        state.reset();
        assert_eq!(state.current(), 0.0);
        assert_eq!(state.floor(), 0.0);
    }

    #[cfg(feature = "serde")]
    #[test]
    fn config_loads_from_json() {
        let json = r#"[
            {"category": "object", "lower": -100.0, "upper": -1.0, "origin": -50.0},
            {"category": "drawing", "lower": 0.0, "upper": 100.0, "step": 0.5}
        ]"#;
        let config: LayerConfig = serde_json::from_str(json).unwrap();
        assert_eq!(
            config.scope(LayerCategory::Object),
            Some(&ScopeConfig::new(-100.0, -1.0).with_origin(-50.0))
        );
        assert_eq!(
            config.scope(LayerCategory::Drawing),
            Some(&ScopeConfig::new(0.0, 100.0).with_step(0.5))
        );
        assert!(config.scope(LayerCategory::Tool).is_none());
    }

    #[cfg(feature = "serde")]
    #[test]
    fn config_json_is_validated() {
        use alloc::string::ToString;

        let json = r#"[
            {"category": "object", "lower": 0.0, "upper": 10.0},
            {"category": "drawing", "lower": 5.0, "upper": 20.0}
        ]"#;
        let err = serde_json::from_str::<LayerConfig>(json).unwrap_err();
        assert!(err.to_string().contains("overlap"), "got: {err}");

        let json = r#"[
            {"category": "tool", "lower": 0.0, "upper": 10.0},
            {"category": "tool", "lower": 20.0, "upper": 30.0}
        ]"#;
        let err = serde_json::from_str::<LayerConfig>(json).unwrap_err();
        assert!(err.to_string().contains("more than once"), "got: {err}");
    }
}
