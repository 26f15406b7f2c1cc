//! Lexical utilities: comment stripping and scalar value splitting.
//!
//! Script files carry two line-comment forms (`--` and `//`) plus block
//! comments (`/* ... */`) that may span lines and ignore brace depth.
//! The grammar never quotes comment markers or braces inside values, so
//! plain left-to-right scans are sufficient.

use crate::value::PropertyValue;

/// Strip line comments from a single line.
///
/// Returns `None` when the line starts with a comment marker (after
/// leading whitespace), otherwise the line truncated at the first
/// inline marker.
pub fn strip_comments(line: &str) -> Option<&str> {
    let trimmed = line.trim_start();
    if trimmed.starts_with("--") || trimmed.starts_with("//") {
        return None;
    }
    let cut = match (line.find("--"), line.find("//")) {
        (Some(a), Some(b)) => Some(a.min(b)),
        (a, b) => a.or(b),
    };
    match cut {
        Some(idx) => Some(&line[..idx]),
        None => Some(line),
    }
}

/// Line filter that removes `/* ... */` block comments, carrying the
/// open/closed state across lines.
#[derive(Debug, Default)]
pub struct BlockCommentFilter {
    in_comment: bool,
}

impl BlockCommentFilter {
    pub fn new() -> Self {
        Self::default()
    }

    /// The visible portion of `line` with block-comment spans removed.
    pub fn filter(&mut self, line: &str) -> String {
        let mut out = String::new();
        let mut rest = line;
        loop {
            if self.in_comment {
                match rest.find("*/") {
                    Some(idx) => {
                        self.in_comment = false;
                        rest = &rest[idx + 2..];
                    }
                    None => break,
                }
            } else {
                match rest.find("/*") {
                    Some(idx) => {
                        out.push_str(&rest[..idx]);
                        self.in_comment = true;
                        rest = &rest[idx + 2..];
                    }
                    None => {
                        out.push_str(rest);
                        break;
                    }
                }
            }
        }
        out
    }
}

/// Remove all comments from a multi-line text, preserving line structure.
pub fn strip_comment_lines(text: &str) -> String {
    let mut filter = BlockCommentFilter::new();
    let mut out = String::with_capacity(text.len());
    for line in text.lines() {
        let line = filter.filter(line);
        if let Some(kept) = strip_comments(&line) {
            out.push_str(kept);
        }
        out.push('\n');
    }
    out
}

/// Split a raw value into its [`PropertyValue`] shape.
///
/// Trims, drops one trailing comma, then: a `;`-separated value becomes
/// a `List` (or a `Map` when every segment pair-splits on `:`); a lone
/// `key:value` becomes a one-pair `Map`; anything else is a `Scalar`.
/// An odd or unterminated value falls through as a `Scalar` holding the
/// raw text -- this never fails.
pub fn split_scalar(raw: &str) -> PropertyValue {
    let mut value = raw.trim();
    if let Some(stripped) = value.strip_suffix(',') {
        value = stripped.trim_end();
    }

    if value.contains(';') {
        let parts: Vec<&str> = value
            .split(';')
            .map(str::trim)
            .filter(|s| !s.is_empty())
            .collect();
        if !parts.is_empty() && parts.iter().all(|p| split_pair(p).is_some()) {
            let pairs = parts
                .iter()
                .map(|p| {
                    let (k, v) = split_pair(p).unwrap_or((p, ""));
                    (k.to_string(), v.to_string())
                })
                .collect();
            return PropertyValue::Map(pairs);
        }
        return PropertyValue::List(parts.into_iter().map(String::from).collect());
    }

    if let Some((k, v)) = split_pair(value) {
        return PropertyValue::Map(vec![(k.to_string(), v.to_string())]);
    }

    PropertyValue::Scalar(value.to_string())
}

/// Split `key:value` with non-empty halves, `None` otherwise.
pub fn split_pair(raw: &str) -> Option<(&str, &str)> {
    let (k, v) = raw.split_once(':')?;
    let (k, v) = (k.trim(), v.trim());
    if k.is_empty() || v.is_empty() {
        return None;
    }
    Some((k, v))
}

/// Repair the historically malformed `skill:level:skill:level` form by
/// turning every second `:` in a segment into a `;` separator, so
/// `Woodwork:2:Maintenance:1` reads as `Woodwork:2;Maintenance:1`.
pub fn repair_pair_list(raw: &str) -> String {
    let mut out = String::with_capacity(raw.len());
    for (i, seg) in raw.split(';').enumerate() {
        if i > 0 {
            out.push(';');
        }
        let mut colons = 0;
        for ch in seg.chars() {
            if ch == ':' {
                colons += 1;
                if colons % 2 == 0 {
                    out.push(';');
                    continue;
                }
            }
            out.push(ch);
        }
    }
    out
}
