//! Property values: the three shapes a script value can take.

use serde::Serialize;

/// A parsed property value.
///
/// The script grammar encodes values three ways: a plain scalar, a
/// `;`-separated list, or a `;`-separated list of `key:value` pairs.
/// Everything is kept as strings; numeric coercion is deferred to the
/// consumer via the `as_*` helpers.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub enum PropertyValue {
    Scalar(String),
    List(Vec<String>),
    Map(Vec<(String, String)>),
}

impl PropertyValue {
    /// The scalar text, if this is a `Scalar`.
    pub fn as_str(&self) -> Option<&str> {
        match self {
            PropertyValue::Scalar(s) => Some(s),
            _ => None,
        }
    }

    /// Parse a scalar as an integer.
    pub fn as_int(&self) -> Option<i64> {
        self.as_str()?.trim().parse().ok()
    }

    /// Parse a scalar as a float.
    pub fn as_float(&self) -> Option<f64> {
        self.as_str()?.trim().parse().ok()
    }

    /// Parse a scalar as a boolean (`true`/`false`, case-insensitive).
    pub fn as_bool(&self) -> Option<bool> {
        match self.as_str()?.trim().to_ascii_lowercase().as_str() {
            "true" => Some(true),
            "false" => Some(false),
            _ => None,
        }
    }

    /// View as a list of segments. A `Scalar` coerces to a one-element
    /// list; a `Map` has no list view.
    pub fn as_list(&self) -> Vec<&str> {
        match self {
            PropertyValue::Scalar(s) => vec![s.as_str()],
            PropertyValue::List(items) => items.iter().map(String::as_str).collect(),
            PropertyValue::Map(_) => Vec::new(),
        }
    }

    /// The `key:value` pairs, empty for non-`Map` values.
    pub fn as_pairs(&self) -> &[(String, String)] {
        match self {
            PropertyValue::Map(pairs) => pairs,
            _ => &[],
        }
    }
}
