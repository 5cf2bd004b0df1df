// Copyright 2026 the Strata Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Region queries and paint order.

use alloc::vec::Vec;

use kurbo::Rect;

use super::id::ItemId;
use super::store::ItemStore;
use crate::category::LayerCategory;

/// An iterator over the live items of one category whose bounds overlap a
/// region.
///
/// Created by [`ItemStore::overlapping`]. Items without bounds overlap
/// everything, and so does a `None` region.
#[derive(Debug)]
pub struct Overlapping<'a> {
    store: &'a ItemStore,
    slots: core::slice::Iter<'a, u32>,
    region: Option<Rect>,
}

impl Iterator for Overlapping<'_> {
    type Item = ItemId;

    fn next(&mut self) -> Option<ItemId> {
        for &idx in self.slots.by_ref() {
            if overlaps(self.region, self.store.bounds[idx as usize]) {
                return Some(ItemId {
                    idx,
                    generation: self.store.generation[idx as usize],
                });
            }
        }
        None
    }
}

/// Returns whether two optional regions share interior area.
///
/// Edge-adjacent rectangles do not overlap.
fn overlaps(a: Option<Rect>, b: Option<Rect>) -> bool {
    match (a, b) {
        (Some(a), Some(b)) => {
            let (a, b) = (a.abs(), b.abs());
            a.x0 < b.x1 && b.x0 < a.x1 && a.y0 < b.y1 && b.y0 < a.y1
        }
        _ => true,
    }
}

impl ItemStore {
    /// Returns the live items of `category` that overlap `region`.
    #[must_use]
    pub fn overlapping(&self, category: LayerCategory, region: Option<Rect>) -> Overlapping<'_> {
        Overlapping {
            store: self,
            slots: self.members[category.index()].iter(),
            region,
        }
    }

    /// Returns every live item, bottom first.
    ///
    /// Items are sorted by display key; equal keys keep insertion order.
    #[must_use]
    pub fn paint_order(&self) -> Vec<ItemId> {
        let mut order = Vec::new();
        self.paint_order_into(&mut order);
        order
    }

    /// Like [`paint_order`](Self::paint_order), but reuses a caller-provided
    /// buffer to avoid allocation.
    pub fn paint_order_into(&self, order: &mut Vec<ItemId>) {
        order.clear();
        order.extend(self.iter());
        order.sort_by(|a, b| {
            let (a, b) = (a.idx as usize, b.idx as usize);
            self.display_key(a)
                .total_cmp(&self.display_key(b))
                .then(self.seq[a].cmp(&self.seq[b]))
        });
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::category::{ItemKind, ItemTag};

    #[test]
    fn overlap_rules() {
        let unit = Some(Rect::new(0.0, 0.0, 1.0, 1.0));
        let flipped = Some(Rect::new(1.5, 1.5, 0.5, 0.5));
        let adjacent = Some(Rect::new(1.0, 0.0, 2.0, 1.0));
        assert!(overlaps(unit, flipped), "unnormalized rects are normalized");
        assert!(!overlaps(unit, adjacent), "shared edges do not overlap");
        assert!(overlaps(None, adjacent), "unbounded region overlaps all");
    }

    #[test]
    fn paint_order_uses_display_key_then_insertion() {
        let tag = ItemTag::new(ItemKind::Stroke);
        let mut store = ItemStore::new();
        let a = store.insert(tag, LayerCategory::Drawing, 2.0, None);
        let b = store.insert(tag, LayerCategory::Drawing, 1.0, None);
        let c = store.insert(tag, LayerCategory::Drawing, 2.0, None);
        assert_eq!(store.paint_order(), [b, a, c]);

        store.lift(b, 10.0);
        assert_eq!(store.paint_order(), [a, c, b], "lifted item paints last");
    }

    #[test]
    fn overlapping_skips_removed_items() {
        let tag = ItemTag::new(ItemKind::Stroke);
        let mut store = ItemStore::new();
        let a = store.insert(tag, LayerCategory::Drawing, 0.0, None);
        let b = store.insert(tag, LayerCategory::Drawing, 1.0, None);
        store.remove(a);
        let found: Vec<_> = store.overlapping(LayerCategory::Drawing, None).collect();
        assert_eq!(found, [b]);
    }
}
