//! The global skin/style display-metadata table used to resolve
//! construction-recipe products.
//!
//! Skin declarations and the entities that reference them are not
//! guaranteed to appear in file order, so the table is built across all
//! parsed files before any recipe resolves against it.

use serde::Serialize;
use std::collections::BTreeMap;

/// Display metadata for one skin/style pair.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DisplayInfo {
    pub display_name: String,
    pub icon: Option<String>,
}

/// skin → style → display metadata, plus per-skin fallback icons taken
/// from entity sprite tables.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct SkinTable {
    styles: BTreeMap<String, BTreeMap<String, DisplayInfo>>,
    fallback_icons: BTreeMap<String, String>,
}

impl SkinTable {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a style under a skin; the first registration wins.
    /// Returns `false` when the pair was already present.
    pub fn insert_style(&mut self, skin: &str, style: &str, info: DisplayInfo) -> bool {
        let styles = self.styles.entry(skin.to_string()).or_default();
        if styles.contains_key(style) {
            return false;
        }
        styles.insert(style.to_string(), info);
        true
    }

    /// Register a fallback icon for a skin; the first registration wins.
    pub fn insert_fallback_icon(&mut self, skin: &str, icon: &str) -> bool {
        if self.fallback_icons.contains_key(skin) {
            return false;
        }
        self.fallback_icons.insert(skin.to_string(), icon.to_string());
        true
    }

    pub fn style(&self, skin: &str, style: &str) -> Option<&DisplayInfo> {
        self.styles.get(skin)?.get(style)
    }

    pub fn fallback_icon(&self, skin: &str) -> Option<&str> {
        self.fallback_icons.get(skin).map(String::as_str)
    }

    /// Fold another table into this one; existing entries win.
    pub fn merge(&mut self, other: SkinTable) {
        for (skin, styles) in other.styles {
            let own = self.styles.entry(skin).or_default();
            for (style, info) in styles {
                own.entry(style).or_insert(info);
            }
        }
        for (skin, icon) in other.fallback_icons {
            self.fallback_icons.entry(skin).or_insert(icon);
        }
    }

    pub fn style_count(&self) -> usize {
        self.styles.values().map(BTreeMap::len).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.styles.is_empty() && self.fallback_icons.is_empty()
    }
}
