// Copyright 2026 the Strata Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Layer categories and item classification.
//!
//! Every scene item belongs to exactly one [`LayerCategory`]. Categories are a
//! closed set; each configured category owns a disjoint numeric range of
//! ordering keys, so an item in a higher category always composites above an
//! item in a lower one no matter when either key was allocated.
//!
//! Classification is a pure function of an item's externally visible
//! metadata, its [`ItemTag`]: an explicit category wins, otherwise the
//! [`ItemKind`] decides.

/// A semantic stacking tier.
///
/// Variants are listed roughly bottom to top in the
/// [`board`](crate::scope::LayerConfig::board) preset, but the actual
/// stacking order is defined only by the configured ranges.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[cfg_attr(
    feature = "serde",
    derive(serde::Serialize, serde::Deserialize),
    serde(rename_all = "snake_case")
)]
pub enum LayerCategory {
    /// No layer. Never configured, so always an invalid category.
    Unassigned,
    /// Page background.
    Background,
    /// Pictures, media, widgets, text, PDF pages and groups.
    Object,
    /// Pen and marker strokes.
    Drawing,
    /// Interactive tool widgets.
    Tool,
    /// Built-in measuring tools (ruler, protractor, compass, triangle).
    BuiltinTool,
    /// Curtain masks.
    Curtain,
    /// Eraser preview.
    Eraser,
    /// Laser pointer.
    Pointer,
    /// Temporary lift for the selected item.
    Selection,
    /// Cache overlay that hides the whole board.
    Cache,
}

impl LayerCategory {
    /// Number of categories.
    pub const COUNT: usize = 11;

    /// All categories, in declaration order.
    pub const ALL: [Self; Self::COUNT] = [
        Self::Unassigned,
        Self::Background,
        Self::Object,
        Self::Drawing,
        Self::Tool,
        Self::BuiltinTool,
        Self::Curtain,
        Self::Eraser,
        Self::Pointer,
        Self::Selection,
        Self::Cache,
    ];

    /// Returns the dense table index of this category.
    #[inline]
    #[must_use]
    pub const fn index(self) -> usize {
        self as usize
    }

    /// Returns the category at a dense table index.
    #[must_use]
    pub const fn from_index(index: usize) -> Option<Self> {
        if index < Self::COUNT {
            Some(Self::ALL[index])
        } else {
            None
        }
    }

    /// Returns a short lowercase name for diagnostics.
    #[must_use]
    pub const fn name(self) -> &'static str {
        match self {
            Self::Unassigned => "unassigned",
            Self::Background => "background",
            Self::Object => "object",
            Self::Drawing => "drawing",
            Self::Tool => "tool",
            Self::BuiltinTool => "builtin_tool",
            Self::Curtain => "curtain",
            Self::Eraser => "eraser",
            Self::Pointer => "pointer",
            Self::Selection => "selection",
            Self::Cache => "cache",
        }
    }
}

/// The type discriminant a scene attaches to each item.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum ItemKind {
    /// Page background.
    Background,
    /// Raster picture.
    Pixmap,
    /// Vector picture.
    Svg,
    /// Rich text box.
    Text,
    /// Audio or video player.
    Media,
    /// Embedded web widget.
    Widget,
    /// Imported PDF page.
    Pdf,
    /// Group container of other items.
    Group,
    /// Pen or marker stroke.
    Stroke,
    /// Interactive tool widget.
    ToolWidget,
    /// Ruler.
    Ruler,
    /// Protractor.
    Protractor,
    /// Compass.
    Compass,
    /// Set square.
    Triangle,
    /// Curtain mask.
    Curtain,
    /// Eraser preview.
    Eraser,
    /// Laser pointer.
    Pointer,
    /// Cache overlay.
    Cache,
    /// Anything the scene cannot classify.
    Unknown,
}

impl ItemKind {
    /// Returns the category items of this kind belong to by default.
    #[must_use]
    pub const fn default_category(self) -> LayerCategory {
        match self {
            Self::Background => LayerCategory::Background,
            Self::Pixmap
            | Self::Svg
            | Self::Text
            | Self::Media
            | Self::Widget
            | Self::Pdf
            | Self::Group => LayerCategory::Object,
            Self::Stroke => LayerCategory::Drawing,
            Self::ToolWidget => LayerCategory::Tool,
            Self::Ruler | Self::Protractor | Self::Compass | Self::Triangle => {
                LayerCategory::BuiltinTool
            }
            Self::Curtain => LayerCategory::Curtain,
            Self::Eraser => LayerCategory::Eraser,
            Self::Pointer => LayerCategory::Pointer,
            Self::Cache => LayerCategory::Cache,
            Self::Unknown => LayerCategory::Unassigned,
        }
    }
}

/// Externally visible item metadata used for classification.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct ItemTag {
    /// The item's type discriminant.
    pub kind: ItemKind,
    /// A category the scene already knows, overriding the kind's default.
    pub category: Option<LayerCategory>,
}

impl ItemTag {
    /// A tag classified by kind alone.
    #[inline]
    #[must_use]
    pub const fn new(kind: ItemKind) -> Self {
        Self {
            kind,
            category: None,
        }
    }

    /// Returns this tag with an explicit category override.
    #[inline]
    #[must_use]
    pub const fn with_category(mut self, category: LayerCategory) -> Self {
        self.category = Some(category);
        self
    }

    /// Returns the category this tag classifies into.
    #[must_use]
    pub const fn classify(self) -> LayerCategory {
        match self.category {
            Some(category) => category,
            None => self.kind.default_category(),
        }
    }
}

impl From<ItemKind> for ItemTag {
    fn from(kind: ItemKind) -> Self {
        Self::new(kind)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn index_round_trips_for_every_category() {
        for (i, category) in LayerCategory::ALL.iter().enumerate() {
            assert_eq!(category.index(), i, "{category:?} is out of place");
            assert_eq!(LayerCategory::from_index(i), Some(*category));
        }
        assert_eq!(LayerCategory::from_index(LayerCategory::COUNT), None);
    }

    #[test]
    fn kind_maps_to_expected_category() {
        assert_eq!(
            ItemTag::new(ItemKind::Stroke).classify(),
            LayerCategory::Drawing
        );
        assert_eq!(
            ItemTag::new(ItemKind::Pixmap).classify(),
            LayerCategory::Object
        );
        assert_eq!(
            ItemTag::new(ItemKind::Compass).classify(),
            LayerCategory::BuiltinTool
        );
        assert_eq!(
            ItemTag::new(ItemKind::Unknown).classify(),
            LayerCategory::Unassigned
        );
    }

    #[test]
    fn explicit_category_overrides_kind() {
        let tag = ItemTag::new(ItemKind::Pixmap).with_category(LayerCategory::Tool);
        assert_eq!(tag.classify(), LayerCategory::Tool);
    }
}
