//! Adversarial input tests: hand-authored text at its worst.
//!
//! Every case must parse without panicking and without aborting the
//! batch; the worst allowed outcome is recorded anomalies and partial
//! data.

use quern_core::registry::AnomalyKind;
use quern_data::{ParseOptions, parse_str};

#[test]
fn empty_input() {
    let data = parse_str("", &ParseOptions::default());
    assert_eq!(data.summary.items, 0);
    assert_eq!(data.summary.recipes, 0);
}

#[test]
fn only_comments() {
    let data = parse_str(
        "-- line comment\n// another\n/* block\nspanning */\n",
        &ParseOptions::default(),
    );
    assert_eq!(data.summary.items, 0);
    assert!(data.summary.anomalies.is_empty());
}

#[test]
fn unterminated_module_and_item() {
    let data = parse_str(
        "module Base {\n\titem Axe {\n\t\tWeight = 3,\n",
        &ParseOptions::default(),
    );
    assert_eq!(data.summary.items, 1);
    assert!(
        data.summary
            .anomalies
            .iter()
            .any(|a| a.kind == AnomalyKind::UnterminatedBlock)
    );
}

#[test]
fn unterminated_recipe_block() {
    let data = parse_str(
        "craftRecipe Broken {\n\tinputs {\n\t\titem 1 [Base.Plank],\n",
        &ParseOptions::default(),
    );
    assert_eq!(data.summary.recipes, 1);
    assert!(
        data.summary
            .anomalies
            .iter()
            .any(|a| a.kind == AnomalyKind::UnterminatedBlock)
    );
}

#[test]
fn stray_close_braces_at_top_level() {
    let data = parse_str(
        "}\n}\nmodule Base {\n\titem Axe { Weight = 3, }\n}\n}\n",
        &ParseOptions::default(),
    );
    assert_eq!(data.summary.items, 1);
}

#[test]
fn unclosed_block_comment_swallows_the_rest() {
    let data = parse_str(
        "module Base {\n\titem Axe { Weight = 3, }\n/* forgotten\n\titem Knife { Weight = 1, }\n",
        &ParseOptions::default(),
    );
    // Only the item before the comment survives; the module never
    // closes, which is an anomaly, not a failure.
    assert_eq!(data.summary.items, 1);
    assert!(data.item("Base", "Axe").is_some());
}

#[test]
fn garbage_lines_inside_blocks() {
    let data = parse_str(
        "module Base {\n\
         \t???\n\
         \titem Axe {\n\
         \t\tWeight = 3,\n\
         \t\tnot a property line\n\
         \t}\n\
         }\n",
        &ParseOptions::default(),
    );
    assert_eq!(data.summary.items, 1);
    assert_eq!(
        data.summary
            .anomalies
            .iter()
            .filter(|a| a.kind == AnomalyKind::UnrecognizedLine)
            .count(),
        2
    );
}

#[test]
fn recipe_with_unclosed_inputs_block() {
    let data = parse_str(
        "craftRecipe Odd {\n\
         \tinputs {\n\
         \t\titem 1 [Base.Plank],\n\
         \toutputs {\n\
         \t\titem 1 [Base.Axe],\n\
         \t}\n\
         }\n",
        &ParseOptions::default(),
    );
    // The inputs block swallows the outputs block (brace balance), but
    // nothing panics and the recipe still exists.
    assert_eq!(data.summary.recipes, 1);
}

#[test]
fn huge_count_token_does_not_panic() {
    let data = parse_str(
        "craftRecipe Big {\n\tinputs {\n\t\titem 99999999999999999999 [Base.Plank],\n\t}\n}\n",
        &ParseOptions::default(),
    );
    assert_eq!(data.summary.recipes, 1);
}

#[test]
fn deeply_nested_braces() {
    let mut text = String::from("module Base {\n\titem Axe { Weight = 3, }\n");
    for _ in 0..64 {
        text.push_str("\tjunk {\n");
    }
    for _ in 0..64 {
        text.push_str("\t}\n");
    }
    text.push_str("}\n");

    let data = parse_str(&text, &ParseOptions::default());
    assert_eq!(data.summary.items, 1);
}

#[test]
fn mapper_without_name_or_body() {
    let data = parse_str(
        "craftRecipe Odd {\n\titemMapper {\n\t}\n\titemMapper broken {\n",
        &ParseOptions::default(),
    );
    assert_eq!(data.summary.recipes, 1);
    assert!(!data.summary.anomalies.is_empty());
}

#[test]
fn duplicate_everything() {
    let data = parse_str(
        "module Base {\n\
         \titem Axe { Weight = 1, }\n\
         \titem Axe { Weight = 2, }\n\
         }\n\
         module Base {\n\
         \titem Axe { Weight = 3, }\n\
         }\n\
         craftRecipe R { time = 1, }\n\
         craftRecipe R { time = 2, }\n",
        &ParseOptions::default(),
    );
    assert_eq!(data.summary.items, 1);
    assert_eq!(data.summary.recipes, 1);
    assert_eq!(data.item("Base", "Axe").unwrap().property("Weight").unwrap().as_int(), Some(1));
    assert_eq!(data.recipe("R").unwrap().time, Some(1.0));
    assert_eq!(
        data.summary
            .anomalies
            .iter()
            .filter(|a| a.kind == AnomalyKind::DuplicateDefinition)
            .count(),
        3
    );
}

#[test]
fn crlf_line_endings() {
    let data = parse_str(
        "module Base {\r\n\titem Axe {\r\n\t\tWeight = 3,\r\n\t}\r\n}\r\n",
        &ParseOptions::default(),
    );
    assert_eq!(data.summary.items, 1);
    assert_eq!(
        data.item("Base", "Axe").unwrap().property("Weight").unwrap().as_int(),
        Some(3)
    );
}
