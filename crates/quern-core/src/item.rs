//! Modules and items: the two-level property tables produced by the
//! module/item parser.

use crate::value::PropertyValue;
use serde::Serialize;
use std::collections::BTreeMap;

/// A named entity with a flat property bag, scoped to a module.
///
/// `block_kind` records which section keyword the item was parsed from
/// (e.g. `"item"` vs `"fixing"`), so callers can disambiguate files
/// that define more than one block kind.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Item {
    pub name: String,
    pub block_kind: String,
    /// The (possibly localized) display name, when one was declared.
    pub display_name: Option<String>,
    properties: BTreeMap<String, PropertyValue>,
}

impl Item {
    pub fn new(name: impl Into<String>, block_kind: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            block_kind: block_kind.into(),
            display_name: None,
            properties: BTreeMap::new(),
        }
    }

    /// Set a property, replacing any previous value for the key.
    pub fn set_property(&mut self, key: impl Into<String>, value: PropertyValue) {
        self.properties.insert(key.into(), value);
    }

    pub fn property(&self, key: &str) -> Option<&PropertyValue> {
        self.properties.get(key)
    }

    pub fn properties(&self) -> impl Iterator<Item = (&str, &PropertyValue)> {
        self.properties.iter().map(|(k, v)| (k.as_str(), v))
    }

    pub fn property_count(&self) -> usize {
        self.properties.len()
    }
}

/// A named namespace owning items keyed by name.
///
/// Modules may reappear across files and are merged; duplicate item
/// names keep the first definition.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Module {
    pub name: String,
    items: BTreeMap<String, Item>,
}

impl Module {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            items: BTreeMap::new(),
        }
    }

    /// Insert an item, keeping the first definition on a name clash.
    /// Returns `false` when the name was already taken.
    pub fn insert(&mut self, item: Item) -> bool {
        if self.items.contains_key(&item.name) {
            return false;
        }
        self.items.insert(item.name.clone(), item);
        true
    }

    pub fn get(&self, name: &str) -> Option<&Item> {
        self.items.get(name)
    }

    pub fn items(&self) -> impl Iterator<Item = &Item> {
        self.items.values()
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    /// Merge another module's items into this one; existing entries win.
    /// Returns the names that were rejected as duplicates.
    pub fn merge(&mut self, other: Module) -> Vec<String> {
        let mut rejected = Vec::new();
        for (name, item) in other.items {
            if self.items.contains_key(&name) {
                rejected.push(name);
            } else {
                self.items.insert(name, item);
            }
        }
        rejected
    }
}
