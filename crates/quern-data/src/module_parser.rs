//! State-machine parser for two-level `module NAME { <kind> NAME { … } }`
//! script files.
//!
//! The machine walks comment-stripped lines through four states
//! (outside, inside imports, inside a module, inside an item). The
//! block kind is caller-supplied, so the same machine parses `item`
//! and `fixing` sections from the same files. Unknown nested blocks
//! (recipes, entities) are skipped wholesale by brace counting.

use crate::ParseOptions;
use crate::note;
use quern_core::item::{Item, Module};
use quern_core::lex::{BlockCommentFilter, split_scalar, strip_comments};
use quern_core::registry::{Anomaly, AnomalyKind};
use quern_core::value::PropertyValue;
use tracing::debug;

/// The module/item sections parsed from one file.
#[derive(Debug, Default)]
pub struct ModuleParseResult {
    pub modules: Vec<Module>,
    pub anomalies: Vec<Anomaly>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum State {
    Outside,
    InModule,
    InItem,
}

/// Parse the module/item sections of a script text.
pub fn parse_module_text(text: &str, opts: &ParseOptions) -> ModuleParseResult {
    let mut result = ModuleParseResult::default();
    let mut comments = BlockCommentFilter::new();
    let mut state = State::Outside;
    let mut in_imports = false;
    let mut skip_depth = 0usize;
    let mut current_module: Option<Module> = None;
    let mut current_item: Option<Item> = None;

    for raw in text.lines() {
        let line = comments.filter(raw);
        let Some(line) = strip_comments(&line) else { continue };
        let line = line.trim();
        if line.is_empty() {
            continue;
        }

        // Imports bodies are irrelevant to item data; a dedicated flag
        // tracks them instead of the depth counter.
        if in_imports {
            if line.contains('}') {
                in_imports = false;
            }
            continue;
        }

        // Inside a skipped (unknown) nested block.
        if skip_depth > 0 {
            skip_depth += line.matches('{').count();
            skip_depth = skip_depth.saturating_sub(line.matches('}').count());
            continue;
        }

        match state {
            State::Outside => {
                if let Some(name) = block_header(line, "module") {
                    if name.is_empty() {
                        continue;
                    }
                    if inline_body(line).is_some_and(|body| body.trim().is_empty()) {
                        // `module X { }` on one line
                        push_module(&mut result, Module::new(name));
                        continue;
                    }
                    current_module = Some(Module::new(name));
                    state = State::InModule;
                }
                // Anything else at top level (craftRecipe, entity, …)
                // belongs to the other scanners.
            }
            State::InModule => {
                if line == "{" {
                    continue;
                }
                if block_header(line, "imports").is_some() {
                    if !line.contains('}') {
                        in_imports = true;
                    }
                    continue;
                }
                if let Some(name) = block_header(line, &opts.block_kind) {
                    if name.is_empty() {
                        note(
                            &mut result.anomalies,
                            AnomalyKind::UnrecognizedLine,
                            format!("unnamed {} block", opts.block_kind),
                        );
                        continue;
                    }
                    let mut item = Item::new(name, opts.block_kind.as_str());
                    if let Some(body) = inline_body(line) {
                        // Compact one-line block: `item X { K = V, … }`
                        parse_inline_properties(body, &mut item, opts);
                        if let Some(module) = current_module.as_mut() {
                            finish_item(item, module, opts, &mut result.anomalies);
                        }
                    } else {
                        current_item = Some(item);
                        state = State::InItem;
                    }
                    continue;
                }
                if line.starts_with('}') {
                    if let Some(module) = current_module.take() {
                        push_module(&mut result, module);
                    }
                    state = State::Outside;
                    continue;
                }
                let opens = line.matches('{').count();
                let closes = line.matches('}').count();
                if opens > closes {
                    // Some other block kind at module depth; skip its body.
                    skip_depth = opens - closes;
                    continue;
                }
                if opens > 0 {
                    // A balanced unknown block on a single line.
                    continue;
                }
                note(
                    &mut result.anomalies,
                    AnomalyKind::UnrecognizedLine,
                    format!("stray line at module depth: {line}"),
                );
            }
            State::InItem => {
                if line == "{" {
                    continue;
                }
                if line.starts_with('}') {
                    let item = current_item.take();
                    if let (Some(item), Some(module)) = (item, current_module.as_mut()) {
                        finish_item(item, module, opts, &mut result.anomalies);
                    }
                    state = State::InModule;
                    continue;
                }
                let Some(item) = current_item.as_mut() else {
                    state = State::InModule;
                    continue;
                };
                match line.split_once('=') {
                    Some((key, value)) => set_item_property(item, key.trim(), value, opts),
                    None => note(
                        &mut result.anomalies,
                        AnomalyKind::UnrecognizedLine,
                        format!("stray line in {} '{}': {line}", item.block_kind, item.name),
                    ),
                }
            }
        }
    }

    // Unterminated trailing state: keep the partial content.
    if current_item.is_some() || current_module.is_some() {
        let context = match (&current_item, &current_module) {
            (Some(item), _) => format!("unterminated {} '{}'", item.block_kind, item.name),
            (_, Some(module)) => format!("unterminated module '{}'", module.name),
            _ => String::new(),
        };
        note(&mut result.anomalies, AnomalyKind::UnterminatedBlock, context);
        if let (Some(item), Some(module)) = (current_item.take(), current_module.as_mut()) {
            finish_item(item, module, opts, &mut result.anomalies);
        }
        if let Some(module) = current_module.take() {
            push_module(&mut result, module);
        }
    }

    result
}

/// Match a `keyword [Name] [{ …]` header line; returns the name token
/// (possibly empty). The keyword must be a whole token.
fn block_header<'a>(line: &'a str, keyword: &str) -> Option<&'a str> {
    let rest = line.strip_prefix(keyword)?;
    if !rest.is_empty() && !rest.starts_with(|c: char| c.is_whitespace() || c == '{') {
        return None;
    }
    let rest = rest.trim_start();
    let end = rest
        .find(|c: char| c.is_whitespace() || c == '{')
        .unwrap_or(rest.len());
    Some(&rest[..end])
}

/// The text between `{` and the final `}` when a header line carries a
/// complete block.
fn inline_body(line: &str) -> Option<&str> {
    let open = line.find('{')?;
    let close = line.rfind('}')?;
    (close > open).then(|| &line[open + 1..close])
}

/// Parse the `K = V, K = V,` body of a compact one-line block.
fn parse_inline_properties(body: &str, item: &mut Item, opts: &ParseOptions) {
    for segment in body.split(',') {
        if let Some((key, value)) = segment.split_once('=') {
            set_item_property(item, key.trim(), value, opts);
        }
    }
}

fn set_item_property(item: &mut Item, key: &str, value: &str, opts: &ParseOptions) {
    if key == "DisplayName" {
        let raw = value.trim().trim_end_matches(',').trim_end();
        let display = opts.localize(&item.name, raw).unwrap_or_else(|| raw.to_string());
        item.display_name = Some(display.clone());
        item.set_property(key, PropertyValue::Scalar(display));
    } else {
        item.set_property(key, split_scalar(value));
    }
}

/// Apply post-parse blacklisting, then insert into the module.
fn finish_item(item: Item, module: &mut Module, opts: &ParseOptions, anomalies: &mut Vec<Anomaly>) {
    if opts.should_skip(&item) {
        debug!(item = %item.name, "dropping blacklisted item");
        return;
    }
    let name = item.name.clone();
    if !module.insert(item) {
        note(
            anomalies,
            AnomalyKind::DuplicateDefinition,
            format!("{} '{}' in module '{}'", opts.block_kind, name, module.name),
        );
    }
}

/// Append a module to the result, merging with an earlier appearance of
/// the same name in this file.
fn push_module(result: &mut ModuleParseResult, module: Module) {
    if let Some(existing) = result.modules.iter_mut().find(|m| m.name == module.name) {
        let module_name = module.name.clone();
        for name in existing.merge(module) {
            note(
                &mut result.anomalies,
                AnomalyKind::DuplicateDefinition,
                format!("item '{name}' in module '{module_name}'"),
            );
        }
    } else {
        result.modules.push(module);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse(text: &str) -> ModuleParseResult {
        parse_module_text(text, &ParseOptions::default())
    }

    #[test]
    fn parses_flat_module() {
        let result = parse(
            "module Base {\n\
             \titem Axe {\n\
             \t\tDisplayName = Axe,\n\
             \t\tWeight = 3,\n\
             \t\tTags = Axe;ChopTree,\n\
             \t}\n\
             }\n",
        );
        assert_eq!(result.modules.len(), 1);
        let module = &result.modules[0];
        assert_eq!(module.name, "Base");
        let item = module.get("Axe").unwrap();
        assert_eq!(item.display_name.as_deref(), Some("Axe"));
        assert_eq!(item.property("Weight").unwrap().as_int(), Some(3));
        assert_eq!(
            item.property("Tags").unwrap(),
            &PropertyValue::List(vec!["Axe".into(), "ChopTree".into()])
        );
        assert!(result.anomalies.is_empty());
    }

    #[test]
    fn compact_one_line_item() {
        let result = parse("module Base {\n\titem Axe { Weight = 3, Type = Weapon, }\n}\n");
        let item = result.modules[0].get("Axe").unwrap();
        assert_eq!(item.property("Weight").unwrap().as_int(), Some(3));
        assert_eq!(item.property("Type").unwrap().as_str(), Some("Weapon"));
    }

    #[test]
    fn imports_block_is_skipped() {
        let result = parse(
            "module Farming {\n\
             \timports {\n\
             \t\tBase\n\
             \t}\n\
             \titem Hoe {\n\
             \t\tWeight = 1,\n\
             \t}\n\
             }\n",
        );
        let module = &result.modules[0];
        assert_eq!(module.len(), 1);
        assert!(module.get("Hoe").is_some());
    }

    #[test]
    fn single_line_imports_block() {
        let result = parse("module Farming {\n\timports { Base }\n\titem Hoe { Weight = 1, }\n}\n");
        assert_eq!(result.modules[0].len(), 1);
    }

    #[test]
    fn duplicate_item_keeps_first_and_records_anomaly() {
        let result = parse(
            "module Base {\n\
             \titem Axe { Weight = 3, }\n\
             \titem Axe { Weight = 9, }\n\
             }\n",
        );
        let module = &result.modules[0];
        assert_eq!(module.len(), 1);
        assert_eq!(
            module.get("Axe").unwrap().property("Weight").unwrap().as_int(),
            Some(3)
        );
        assert_eq!(result.anomalies.len(), 1);
        assert_eq!(result.anomalies[0].kind, AnomalyKind::DuplicateDefinition);
    }

    #[test]
    fn block_comments_span_items() {
        let result = parse(
            "module Base {\n\
             /* item Ghost {\n\
             \tWeight = 1,\n\
             } */\n\
             \titem Axe { Weight = 3, }\n\
             }\n",
        );
        let module = &result.modules[0];
        assert_eq!(module.len(), 1);
        assert!(module.get("Ghost").is_none());
    }

    #[test]
    fn unknown_nested_block_is_skipped() {
        let result = parse(
            "module Base {\n\
             \tcraftRecipe MakeAxe {\n\
             \t\tinputs {\n\
             \t\t\titem 1 [Base.Plank],\n\
             \t\t}\n\
             \t}\n\
             \titem Axe { Weight = 3, }\n\
             }\n",
        );
        let module = &result.modules[0];
        assert_eq!(module.len(), 1);
        assert!(module.get("Axe").is_some());
    }

    #[test]
    fn fixing_block_kind_uses_same_machine() {
        let text = "module Base {\n\
                    \tfixing FixAxe {\n\
                    \t\tRequire = Axe,\n\
                    \t}\n\
                    \titem Axe { Weight = 3, }\n\
                    }\n";
        let fixings = parse_module_text(text, &ParseOptions::for_block_kind("fixing"));
        let module = &fixings.modules[0];
        assert_eq!(module.len(), 1);
        let fixing = module.get("FixAxe").unwrap();
        assert_eq!(fixing.block_kind, "fixing");
        assert_eq!(fixing.property("Require").unwrap().as_str(), Some("Axe"));

        let items = parse_module_text(text, &ParseOptions::default());
        assert!(items.modules[0].get("Axe").is_some());
        assert!(items.modules[0].get("FixAxe").is_none());
    }

    #[test]
    fn localizer_substitutes_display_name() {
        struct Caps;
        impl crate::Localizer for Caps {
            fn localize(&self, _item: &str, raw: &str) -> Option<String> {
                Some(raw.to_uppercase())
            }
        }
        let opts = ParseOptions {
            localizer: Some(Box::new(Caps)),
            ..ParseOptions::default()
        };
        let result = parse_module_text(
            "module Base {\n\titem Axe {\n\t\tDisplayName = Stone Axe,\n\t}\n}\n",
            &opts,
        );
        let item = result.modules[0].get("Axe").unwrap();
        assert_eq!(item.display_name.as_deref(), Some("STONE AXE"));
    }

    #[test]
    fn blacklisted_prefix_is_dropped() {
        let opts = ParseOptions {
            skip_prefixes: vec!["Wbs".to_string()],
            ..ParseOptions::default()
        };
        let result = parse_module_text(
            "module Base {\n\
             \titem WbsCrate { Weight = 1, }\n\
             \titem Axe { Weight = 3, }\n\
             }\n",
            &opts,
        );
        let module = &result.modules[0];
        assert_eq!(module.len(), 1);
        assert!(module.get("WbsCrate").is_none());
    }

    #[test]
    fn obsolete_item_is_dropped() {
        let opts = ParseOptions {
            obsolete_property: Some(("OBSOLETE".to_string(), "true".to_string())),
            ..ParseOptions::default()
        };
        let result = parse_module_text(
            "module Base {\n\
             \titem OldAxe { OBSOLETE = TRUE, }\n\
             \titem Axe { Weight = 3, }\n\
             }\n",
            &opts,
        );
        assert_eq!(result.modules[0].len(), 1);
    }

    #[test]
    fn unterminated_module_keeps_partial_content() {
        let result = parse(
            "module Base {\n\
             \titem Axe {\n\
             \t\tWeight = 3,\n",
        );
        assert_eq!(result.modules.len(), 1);
        let item = result.modules[0].get("Axe").unwrap();
        assert_eq!(item.property("Weight").unwrap().as_int(), Some(3));
        assert!(
            result
                .anomalies
                .iter()
                .any(|a| a.kind == AnomalyKind::UnterminatedBlock)
        );
    }

    #[test]
    fn module_reappearing_in_one_file_merges() {
        let result = parse(
            "module Base {\n\titem Axe { Weight = 3, }\n}\n\
             module Base {\n\titem Knife { Weight = 1, }\n}\n",
        );
        assert_eq!(result.modules.len(), 1);
        assert_eq!(result.modules[0].len(), 2);
    }

    #[test]
    fn empty_single_line_module() {
        let result = parse("module Empty { }\n");
        assert_eq!(result.modules.len(), 1);
        assert!(result.modules[0].is_empty());
    }

    #[test]
    fn parse_is_idempotent() {
        let text = "module Base {\n\
                    \titem Axe {\n\
                    \t\tDisplayName = Axe,\n\
                    \t\tWeight = 3,\n\
                    \t}\n\
                    \titem Knife { Weight = 1, Tags = Sharp, }\n\
                    }\n";
        let a = parse(text);
        let b = parse(text);
        assert_eq!(a.modules, b.modules);
    }
}
