//! Brace-balance block extraction.
//!
//! The single primitive every higher-level block parser builds on:
//! given the index of an opening `{`, find the matching `}` accounting
//! for nesting. The grammar never puts braces inside quoted values, so
//! the scan is purely character-driven.

/// The content of one balanced `{ ... }` block.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BlockContent<'a> {
    /// Text strictly between the outermost brace pair.
    pub content: &'a str,
    /// Index just past the closing brace (or `text.len()` when
    /// unterminated).
    pub end: usize,
    /// Depth never returned to zero; `content` is the best-effort
    /// remainder.
    pub unterminated: bool,
}

/// Extract the block opened by the `{` at `open_idx`.
pub fn extract_block(text: &str, open_idx: usize) -> BlockContent<'_> {
    let mut depth = 0usize;
    for (i, ch) in text[open_idx..].char_indices() {
        let at = open_idx + i;
        match ch {
            '{' => depth += 1,
            '}' => {
                depth = depth.saturating_sub(1);
                if depth == 0 {
                    return BlockContent {
                        content: &text[open_idx + 1..at],
                        end: at + 1,
                        unterminated: false,
                    };
                }
            }
            _ => {}
        }
    }
    BlockContent {
        content: &text[(open_idx + 1).min(text.len())..],
        end: text.len(),
        unterminated: true,
    }
}

/// A located `keyword [Name] { ... }` block.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BlockMatch<'a> {
    /// The name token between the keyword and the brace, empty when
    /// absent.
    pub name: &'a str,
    pub content: &'a str,
    /// Byte offset of the keyword.
    pub start: usize,
    /// Byte offset just past the closing brace.
    pub end: usize,
    pub unterminated: bool,
}

/// Locate the first `keyword [Name] { ... }` block in `text`.
///
/// The keyword must stand on its own (not a prefix of a longer word, so
/// `item` never matches `itemMapper`), followed by an optional name
/// token and an opening brace.
pub fn find_block<'a>(text: &'a str, keyword: &str) -> Option<BlockMatch<'a>> {
    let mut from = 0;
    while let Some(rel) = text[from..].find(keyword) {
        let start = from + rel;
        from = start + keyword.len();

        if !is_word_boundary_before(text, start) {
            continue;
        }
        let after = &text[start + keyword.len()..];
        if after.starts_with(|c: char| c.is_alphanumeric() || c == '_') {
            continue;
        }

        // Optional name token, then the opening brace.
        let mut idx = start + keyword.len();
        let rest = after.trim_start();
        idx += after.len() - rest.len();
        let name_len = rest
            .find(|c: char| c.is_whitespace() || c == '{')
            .unwrap_or(rest.len());
        let name = &rest[..name_len];
        idx += name_len;
        let tail = &text[idx..];
        let brace_off = tail.len() - tail.trim_start().len();
        if !tail.trim_start().starts_with('{') {
            continue;
        }
        let open_idx = idx + brace_off;

        let block = extract_block(text, open_idx);
        return Some(BlockMatch {
            name,
            content: block.content,
            start,
            end: block.end,
            unterminated: block.unterminated,
        });
    }
    None
}

fn is_word_boundary_before(text: &str, idx: usize) -> bool {
    match text[..idx].chars().next_back() {
        Some(c) => !c.is_alphanumeric() && c != '_',
        None => true,
    }
}
