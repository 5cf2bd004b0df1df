// Copyright 2026 the Strata Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Error types and the shared sentinel key.
//!
//! Every failed key operation surfaces the same reserved value,
//! [`ERROR_KEY`], to callers that only deal in raw keys. [`KeyError`] keeps
//! the reason alongside it so diagnostics can tell an unconfigured category
//! from an exhausted one.

use thiserror::Error;

use crate::category::LayerCategory;

/// Reserved ordering key returned in place of a real key when an operation
/// fails.
///
/// It lies below every range of the [`board`](crate::scope::LayerConfig::board)
/// preset. Callers must check for it before using a key for compositing.
pub const ERROR_KEY: f64 = -20_000_001.0;

/// Which edge of a scope's range a cursor ran into.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Edge {
    /// The allocation cursor passed the upper bound.
    Top,
    /// The send-to-back cursor reached the lower bound.
    Bottom,
}

/// Why a key operation did not produce a usable key.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Error)]
pub enum KeyError {
    /// The category has no configured range.
    #[error("layer category `{}` is not configured", .0.name())]
    InvalidCategory(LayerCategory),
    /// The category's range has no headroom left at `edge`.
    #[error("layer category `{}` is exhausted at the {edge:?} edge", .category.name())]
    Exhausted {
        /// The exhausted category.
        category: LayerCategory,
        /// The edge that was reached.
        edge: Edge,
    },
    /// The item handle no longer refers to a live item.
    #[error("item slot {0} is stale or was never registered")]
    StaleItem(u32),
}

impl KeyError {
    /// Returns the sentinel key callers observe for this failure.
    ///
    /// This is [`ERROR_KEY`] for every variant.
    #[inline]
    #[must_use]
    pub const fn sentinel(self) -> f64 {
        ERROR_KEY
    }

    /// Returns the category involved, if any.
    #[must_use]
    pub const fn category(self) -> Option<LayerCategory> {
        match self {
            Self::InvalidCategory(category) | Self::Exhausted { category, .. } => Some(category),
            Self::StaleItem(_) => None,
        }
    }

    /// Returns whether this failure asks for renormalization of a scope.
    #[inline]
    #[must_use]
    pub const fn is_exhaustion(self) -> bool {
        matches!(self, Self::Exhausted { .. })
    }
}

/// Collapses a key result into a raw key, substituting [`ERROR_KEY`] on
/// failure.
pub trait KeyResultExt {
    /// Returns the key, or [`ERROR_KEY`] if the operation failed.
    fn or_sentinel(self) -> f64;
}

impl KeyResultExt for Result<f64, KeyError> {
    #[inline]
    fn or_sentinel(self) -> f64 {
        self.unwrap_or_else(KeyError::sentinel)
    }
}

/// A rejected [`LayerConfig`](crate::scope::LayerConfig).
#[derive(Clone, Copy, Debug, PartialEq, Eq, Error)]
pub enum ConfigError {
    /// A bound, step or origin is NaN or infinite.
    #[error("scope `{}` has a non-finite bound, step or origin", .0.name())]
    NonFinite(LayerCategory),
    /// The step is zero or negative.
    #[error("scope `{}` must have a positive step", .0.name())]
    NonPositiveStep(LayerCategory),
    /// Adding the step to a bound does not change it in `f64`.
    #[error("scope `{}` has a step too small for its bounds", .0.name())]
    StepTooSmall(LayerCategory),
    /// The lower bound is above the upper bound.
    #[error("scope `{}` has its lower bound above its upper bound", .0.name())]
    InvertedRange(LayerCategory),
    /// The origin lies outside the range.
    #[error("scope `{}` has its origin outside its range", .0.name())]
    OriginOutOfRange(LayerCategory),
    /// A category was listed more than once.
    #[error("scope `{}` is configured more than once", .0.name())]
    DuplicateScope(LayerCategory),
    /// `Unassigned` cannot own a range.
    #[error("the unassigned category cannot be configured")]
    UnassignedScope,
    /// Two ranges share at least one key.
    #[error("scopes `{}` and `{}` overlap", .first.name(), .second.name())]
    Overlap {
        /// The lower-indexed category.
        first: LayerCategory,
        /// The higher-indexed category.
        second: LayerCategory,
    },
}

#[cfg(test)]
mod tests {
    use alloc::string::ToString;

    use super::*;

    #[test]
    fn every_failure_surfaces_the_same_sentinel() {
        let failures = [
            KeyError::InvalidCategory(LayerCategory::Unassigned),
            KeyError::Exhausted {
                category: LayerCategory::Drawing,
                edge: Edge::Top,
            },
            KeyError::StaleItem(3),
        ];
        for failure in failures {
            assert_eq!(failure.sentinel(), ERROR_KEY, "{failure:?}");
            assert_eq!(
                Err::<f64, KeyError>(failure).or_sentinel(),
                ERROR_KEY,
                "{failure:?}"
            );
        }
        assert_eq!(Ok::<f64, KeyError>(4.0).or_sentinel(), 4.0);
    }

    #[test]
    fn messages_name_the_category() {
        let message = KeyError::Exhausted {
            category: LayerCategory::Curtain,
            edge: Edge::Bottom,
        }
        .to_string();
        assert!(message.contains("curtain"), "got: {message}");
        assert!(message.contains("Bottom"), "got: {message}");
    }

    #[test]
    fn exhaustion_is_distinguished_from_invalid_category() {
        assert!(
            KeyError::Exhausted {
                category: LayerCategory::Tool,
                edge: Edge::Top
            }
            .is_exhaustion()
        );
        assert!(!KeyError::InvalidCategory(LayerCategory::Tool).is_exhaustion());
        assert_eq!(KeyError::StaleItem(0).category(), None);
    }
}
