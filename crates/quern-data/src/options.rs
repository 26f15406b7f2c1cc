//! Per-invocation parser configuration.
//!
//! All configuration is scoped to one parse call and passed explicitly;
//! there is no process-wide parser state.

use quern_core::item::Item;

/// Hook through which a caller substitutes localized display names.
///
/// The module/item parser intercepts the `DisplayName` property and
/// offers it here; returning `None` keeps the raw script value.
pub trait Localizer: Send + Sync {
    fn localize(&self, item_name: &str, raw: &str) -> Option<String>;
}

/// Options controlling one parse invocation.
pub struct ParseOptions {
    /// Keyword introducing item blocks inside a module (`"item"`,
    /// `"fixing"`).
    pub block_kind: String,
    /// Namespace prefixed onto identifiers with no qualifier.
    pub default_namespace: String,
    /// Item-name prefixes dropped after an item fully parses.
    pub skip_prefixes: Vec<String>,
    /// Property/value pair marking an item as obsolete; matching items
    /// are dropped after parsing. Value comparison is case-insensitive.
    pub obsolete_property: Option<(String, String)>,
    /// Display-name localization hook.
    pub localizer: Option<Box<dyn Localizer>>,
}

impl Default for ParseOptions {
    fn default() -> Self {
        Self {
            block_kind: "item".to_string(),
            default_namespace: "Base".to_string(),
            skip_prefixes: Vec::new(),
            obsolete_property: None,
            localizer: None,
        }
    }
}

impl ParseOptions {
    /// Options for a different block kind, everything else default.
    pub fn for_block_kind(kind: &str) -> Self {
        Self {
            block_kind: kind.to_string(),
            ..Self::default()
        }
    }

    pub(crate) fn localize(&self, item_name: &str, raw: &str) -> Option<String> {
        self.localizer.as_ref()?.localize(item_name, raw)
    }

    /// Qualify an identifier with the default namespace when it carries
    /// none.
    pub(crate) fn qualify(&self, id: &str) -> String {
        if id.contains('.') {
            id.to_string()
        } else {
            format!("{}.{}", self.default_namespace, id)
        }
    }

    /// The wildcard identifier matching any fluid container.
    pub(crate) fn wildcard(&self) -> String {
        format!("{}.*", self.default_namespace)
    }

    /// Blacklisting applied after an item fully parses.
    pub(crate) fn should_skip(&self, item: &Item) -> bool {
        if self.skip_prefixes.iter().any(|p| item.name.starts_with(p.as_str())) {
            return true;
        }
        if let Some((key, value)) = &self.obsolete_property {
            if let Some(actual) = item.property(key).and_then(|v| v.as_str()) {
                return actual.eq_ignore_ascii_case(value);
            }
        }
        false
    }
}
