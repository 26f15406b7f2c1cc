//! Construction-recipe assembly.
//!
//! Construction recipes carry no `items[]` output; their product
//! identity comes from `entity` declarations elsewhere in the same or
//! sibling files. Resolution is a two-phase pipeline: first every
//! parsed file contributes its entity skin/style declarations to an
//! immutable [`SkinTable`], then a pure pass resolves each recipe's
//! `(skinName, entityStyle)` pair against the frozen table. The split
//! exists because skins and the entities referencing them are not
//! guaranteed to appear in file order.

use crate::note;
use quern_core::block::find_block;
use quern_core::lex::strip_comment_lines;
use quern_core::recipe::{Recipe, ResolvedProduct};
use quern_core::registry::{Anomaly, AnomalyKind, ScriptData};
use quern_core::skin::{DisplayInfo, SkinTable};

/// Phase 1: scan a script text for `entity` blocks and fold their
/// skin/style declarations into the table.
pub fn collect_entities(text: &str, table: &mut SkinTable, anomalies: &mut Vec<Anomaly>) {
    let cleaned = strip_comment_lines(text);
    let mut at = 0;
    while let Some(m) = find_block(&cleaned[at..], "entity") {
        if m.unterminated {
            note(
                anomalies,
                AnomalyKind::UnterminatedBlock,
                format!("entity '{}'", m.name),
            );
        }
        collect_entity_body(m.content, table, anomalies);
        at += m.end;
    }
}

fn collect_entity_body(body: &str, table: &mut SkinTable, anomalies: &mut Vec<Anomaly>) {
    let mut body = body.to_string();
    let mut entity_skins: Vec<String> = Vec::new();

    // skin NAME { style NAME { displayName = …, icon = …, } … }
    while let Some(m) = find_block(&body, "skin") {
        let skin_name = m.name.to_string();
        if skin_name.is_empty() {
            note(
                anomalies,
                AnomalyKind::UnrecognizedLine,
                "unnamed skin block in entity".to_string(),
            );
        } else {
            collect_skin_styles(&skin_name, m.content, table, anomalies);
            entity_skins.push(skin_name);
        }
        let (start, end) = (m.start, m.end);
        body.replace_range(start..end, "");
    }

    // The sprite table supplies a fallback icon: the first concrete
    // value in depth-first (textual) order.
    let mut sprite_icon: Option<String> = None;
    if let Some(m) = find_block(&body, "sprites") {
        sprite_icon = first_table_value(m.content);
        let (start, end) = (m.start, m.end);
        body.replace_range(start..end, "");
    }

    // Leftover entity-level properties; skinName links the entity to
    // the skin its recipes reference.
    for line in body.lines() {
        let line = line.trim();
        if let Some((key, value)) = line.split_once('=') {
            if key.trim().eq_ignore_ascii_case("skinName") {
                let value = value.trim().trim_end_matches(',').trim_end();
                if !value.is_empty() {
                    entity_skins.push(value.to_string());
                }
            }
        }
    }

    if let Some(icon) = sprite_icon {
        for skin in &entity_skins {
            table.insert_fallback_icon(skin, &icon);
        }
    }
}

fn collect_skin_styles(
    skin_name: &str,
    skin_body: &str,
    table: &mut SkinTable,
    anomalies: &mut Vec<Anomaly>,
) {
    let mut body = skin_body.to_string();
    while let Some(m) = find_block(&body, "style") {
        let style_name = m.name.to_string();
        let mut display_name = None;
        let mut icon = None;
        for line in m.content.lines() {
            let Some((key, value)) = line.trim().split_once('=') else { continue };
            let value = value.trim().trim_end_matches(',').trim_end();
            match key.trim().to_ascii_lowercase().as_str() {
                "displayname" => display_name = Some(value.to_string()),
                "icon" => icon = Some(value.to_string()),
                _ => {}
            }
        }
        if style_name.is_empty() || display_name.is_none() {
            note(
                anomalies,
                AnomalyKind::UnrecognizedLine,
                format!("incomplete style block under skin '{skin_name}'"),
            );
        } else if let Some(display_name) = display_name {
            let info = DisplayInfo { display_name, icon };
            if !table.insert_style(skin_name, &style_name, info) {
                note(
                    anomalies,
                    AnomalyKind::DuplicateDefinition,
                    format!("style '{style_name}' under skin '{skin_name}'"),
                );
            }
        }
        let (start, end) = (m.start, m.end);
        body.replace_range(start..end, "");
    }
}

/// The first `key = value` right-hand side in a nested sprite table,
/// scanning top-down (textual order equals depth-first order).
fn first_table_value(body: &str) -> Option<String> {
    for line in body.lines() {
        if let Some((_, value)) = line.split_once('=') {
            let value = value.trim().trim_end_matches(',').trim_end();
            if !value.is_empty() {
                return Some(value.to_string());
            }
        }
    }
    None
}

/// Phase 2: resolve every construction recipe against the frozen table.
pub fn resolve_construction(data: &mut ScriptData) {
    let ScriptData {
        recipes,
        recipe_order,
        skins,
        summary,
        ..
    } = data;

    for name in recipe_order.iter() {
        let Some(recipe) = recipes.get_mut(name) else { continue };
        if !is_construction(recipe) {
            continue;
        }

        if let (Some(skin), Some(style)) = (&recipe.skin_name, &recipe.entity_style) {
            if let Some(info) = skins.style(skin, style) {
                recipe.resolved_output = Some(ResolvedProduct {
                    display_name: info.display_name.clone(),
                    icon: info.icon.clone(),
                });
                continue;
            }
        }

        // No mapping: fall back to the sprite-table icon and the
        // recipe's own name as the display label.
        let icon = recipe
            .skin_name
            .as_deref()
            .and_then(|skin| skins.fallback_icon(skin))
            .map(String::from);
        if icon.is_none() {
            note(
                &mut summary.anomalies,
                AnomalyKind::UnresolvedSkin,
                format!(
                    "construction recipe '{}' has no skin/style mapping (skin {:?}, style {:?})",
                    recipe.name, recipe.skin_name, recipe.entity_style
                ),
            );
        }
        recipe.resolved_output = Some(ResolvedProduct {
            display_name: recipe.name.clone(),
            icon,
        });
    }
}

/// A recipe resolves through the assembler when it says so explicitly
/// or when it names a skin while producing no item outputs.
fn is_construction(recipe: &Recipe) -> bool {
    recipe.construction || (recipe.skin_name.is_some() && recipe.outputs.is_empty())
}
