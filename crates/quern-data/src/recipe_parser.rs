//! Parser for `craftRecipe NAME { … }` blocks.
//!
//! A recipe body is consumed in three passes: `itemMapper` sub-blocks
//! are extracted first (so nothing else ever sees mapper bodies), then
//! the `inputs`/`outputs` blocks go through the per-line classifier,
//! and finally the leftover `key = value` lines become scalar metadata.
//!
//! The classifier is stateful over the line stream: a `-fluid` line
//! attaches to the most recently parsed item entry, and a `+fluid` line
//! clones that entry into the opposite collection. The state is an
//! explicit accumulator, so the same fold parses both blocks and stays
//! reentrant per input slice.

use crate::ParseOptions;
use crate::note;
use quern_core::block::find_block;
use quern_core::lex::{repair_pair_list, split_scalar, strip_comment_lines};
use quern_core::recipe::{
    EnergyUse, FluidSign, FluidUse, ItemRef, ItemSpec, Recipe, RecipeEntry,
};
use quern_core::registry::{Anomaly, AnomalyKind};

/// The recipe blocks parsed from one file.
#[derive(Debug, Default)]
pub struct RecipeParseResult {
    pub recipes: Vec<Recipe>,
    pub anomalies: Vec<Anomaly>,
}

/// Scan a script text for `craftRecipe` blocks and parse each one.
pub fn parse_recipe_text(text: &str, opts: &ParseOptions) -> RecipeParseResult {
    let cleaned = strip_comment_lines(text);
    let mut result = RecipeParseResult::default();
    let mut at = 0;
    while let Some(m) = find_block(&cleaned[at..], "craftRecipe") {
        if m.unterminated {
            note(
                &mut result.anomalies,
                AnomalyKind::UnterminatedBlock,
                format!("craftRecipe '{}'", m.name),
            );
        }
        if m.name.is_empty() {
            note(
                &mut result.anomalies,
                AnomalyKind::UnrecognizedLine,
                "unnamed craftRecipe block".to_string(),
            );
        } else {
            let recipe = parse_recipe_body(m.name, m.content, opts, &mut result.anomalies);
            result.recipes.push(recipe);
        }
        at += m.end;
    }
    result
}

/// Parse one recipe body (text between the outer braces).
pub fn parse_recipe_body(
    name: &str,
    body: &str,
    opts: &ParseOptions,
    anomalies: &mut Vec<Anomaly>,
) -> Recipe {
    let mut recipe = Recipe::new(name);
    let mut body = body.to_string();

    // Pass 1: pull out every itemMapper block.
    while let Some(m) = find_block(&body, "itemMapper") {
        if m.unterminated {
            note(
                anomalies,
                AnomalyKind::UnterminatedBlock,
                format!("itemMapper '{}' in recipe '{name}'", m.name),
            );
        }
        let mapper_name = m.name.to_string();
        let pairs = parse_mapper_pairs(m.content);
        if mapper_name.is_empty() {
            note(
                anomalies,
                AnomalyKind::UnrecognizedLine,
                format!("unnamed itemMapper in recipe '{name}'"),
            );
        } else if recipe.item_mappers.contains_key(&mapper_name) {
            note(
                anomalies,
                AnomalyKind::DuplicateDefinition,
                format!("itemMapper '{mapper_name}' in recipe '{name}'"),
            );
        } else {
            recipe.item_mappers.insert(mapper_name, pairs);
        }
        let (start, end) = (m.start, m.end);
        body.replace_range(start..end, "");
    }

    // Pass 2: the inputs/outputs blocks. `+fluid` lines spill entries
    // into the opposite collection, appended after its own lines.
    let mut input_spill = Vec::new();
    let mut output_spill = Vec::new();
    if let Some(m) = find_block(&body, "inputs") {
        if m.unterminated {
            note(
                anomalies,
                AnomalyKind::UnterminatedBlock,
                format!("inputs block in recipe '{name}'"),
            );
        }
        let (entries, spill) = classify_lines(m.content, name, opts, anomalies);
        recipe.inputs = entries;
        input_spill = spill;
        let (start, end) = (m.start, m.end);
        body.replace_range(start..end, "");
    }
    if let Some(m) = find_block(&body, "outputs") {
        if m.unterminated {
            note(
                anomalies,
                AnomalyKind::UnterminatedBlock,
                format!("outputs block in recipe '{name}'"),
            );
        }
        let (entries, spill) = classify_lines(m.content, name, opts, anomalies);
        recipe.outputs = entries;
        output_spill = spill;
        let (start, end) = (m.start, m.end);
        body.replace_range(start..end, "");
    }
    recipe.outputs.extend(input_spill);
    recipe.inputs.extend(output_spill);

    // Pass 3: leftover scalar properties.
    for line in body.lines() {
        let line = line.trim();
        if line.is_empty() || line == "{" || line == "}" {
            continue;
        }
        match line.split_once('=') {
            Some((key, value)) => apply_recipe_property(&mut recipe, key.trim(), value),
            None => note(
                anomalies,
                AnomalyKind::UnrecognizedLine,
                format!("stray line in recipe '{name}': {line}"),
            ),
        }
    }

    recipe
}

/// Parse the `key = value` lines of a mapper body into ordered pairs.
fn parse_mapper_pairs(body: &str) -> Vec<(String, String)> {
    let mut pairs = Vec::new();
    for line in body.lines() {
        let line = line.trim();
        if let Some((key, value)) = line.split_once('=') {
            let value = value.trim().trim_end_matches(',').trim_end();
            pairs.push((key.trim().to_string(), value.to_string()));
        }
    }
    pairs
}

/// Decode one scalar metadata line onto the recipe. Every pair also
/// lands in the generic property map.
fn apply_recipe_property(recipe: &mut Recipe, key: &str, value: &str) {
    let parsed = split_scalar(value);
    match key.to_ascii_lowercase().as_str() {
        "skillrequired" => recipe.skill_required = decode_pairs(value),
        "xpaward" => recipe.xp_award = decode_pairs(value),
        "autolearnall" => recipe.auto_learn_all = decode_pairs(value),
        "tags" => {
            recipe.tags = parsed.as_list().into_iter().map(String::from).collect();
        }
        "category" => recipe.category = parsed.as_str().map(String::from),
        "time" => recipe.time = parsed.as_float(),
        "construction" => recipe.construction = parsed.as_bool().unwrap_or(false),
        "skinname" => recipe.skin_name = parsed.as_str().map(String::from),
        "entitystyle" => recipe.entity_style = parsed.as_str().map(String::from),
        _ => {}
    }
    recipe.properties.insert(key.to_string(), parsed);
}

/// Decode a `skill:level[;…]` value, repairing the malformed
/// `skill:level:skill:level` form first.
fn decode_pairs(value: &str) -> Vec<(String, String)> {
    split_scalar(&repair_pair_list(value)).as_pairs().to_vec()
}

/// Classify the lines of one `inputs`/`outputs` body.
///
/// Returns the entries for the block itself plus the entries `+fluid`
/// lines spilled toward the opposite collection.
fn classify_lines(
    body: &str,
    recipe_name: &str,
    opts: &ParseOptions,
    anomalies: &mut Vec<Anomaly>,
) -> (Vec<RecipeEntry>, Vec<RecipeEntry>) {
    let mut entries: Vec<RecipeEntry> = Vec::new();
    let mut spill: Vec<RecipeEntry> = Vec::new();
    let mut last_item: Option<usize> = None;
    let wildcard = opts.wildcard();

    for raw in body.lines() {
        let line = raw.trim();
        let line = line.strip_suffix(',').unwrap_or(line).trim_end();
        if line.is_empty() {
            continue;
        }

        if let Some(rest) = token_after(line, "-fluid") {
            match parse_fluid(rest, FluidSign::Consume) {
                Some(fluid) => match last_item {
                    Some(idx) => attach_fluid(&mut entries[idx], fluid, &wildcard),
                    None => entries.push(RecipeEntry::Fluid(fluid)),
                },
                None => note(
                    anomalies,
                    AnomalyKind::UnrecognizedLine,
                    format!("bad fluid line in recipe '{recipe_name}': {line}"),
                ),
            }
        } else if let Some(rest) = token_after(line, "+fluid") {
            match parse_fluid(rest, FluidSign::Produce) {
                Some(fluid) => match last_item {
                    Some(idx) => {
                        let mut cloned = entries[idx].clone();
                        attach_fluid(&mut cloned, fluid, &wildcard);
                        spill.push(cloned);
                    }
                    None => spill.push(RecipeEntry::Fluid(fluid)),
                },
                None => note(
                    anomalies,
                    AnomalyKind::UnrecognizedLine,
                    format!("bad fluid line in recipe '{recipe_name}': {line}"),
                ),
            }
        } else if let Some(rest) = token_after(line, "energy") {
            match parse_energy(rest) {
                Some(energy) => entries.push(RecipeEntry::Energy(energy)),
                None => note(
                    anomalies,
                    AnomalyKind::UnrecognizedLine,
                    format!("bad energy line in recipe '{recipe_name}': {line}"),
                ),
            }
        } else if let Some(rest) = token_after(line, "item") {
            match parse_item_line(rest, opts) {
                Some(spec) => {
                    entries.push(RecipeEntry::Item(spec));
                    last_item = Some(entries.len() - 1);
                }
                None => note(
                    anomalies,
                    AnomalyKind::UnrecognizedLine,
                    format!("bad item line in recipe '{recipe_name}': {line}"),
                ),
            }
        } else {
            note(
                anomalies,
                AnomalyKind::UnrecognizedLine,
                format!("unclassified line in recipe '{recipe_name}': {line}"),
            );
        }
    }

    (entries, spill)
}

/// Attach a fluid modifier to an item entry, converting a lone wildcard
/// id into the "any fluid container" sentinel first.
fn attach_fluid(entry: &mut RecipeEntry, fluid: FluidUse, wildcard: &str) {
    if let RecipeEntry::Item(spec) = entry {
        if spec.items.len() == 1
            && matches!(&spec.items[0], ItemRef::Bare(id) if id.as_str() == wildcard)
        {
            spec.items[0] = ItemRef::AnyFluidContainer;
        }
        spec.fluid_modifier = Some(fluid);
    }
}

/// The rest of the line after `keyword`, when the keyword is a whole
/// leading token.
fn token_after<'a>(line: &'a str, keyword: &str) -> Option<&'a str> {
    let rest = line.strip_prefix(keyword)?;
    if rest.is_empty() {
        return Some("");
    }
    rest.starts_with(char::is_whitespace).then(|| rest.trim_start())
}

/// Parse `<amount> [<fluidId>|[<fluidId>;…]]`.
fn parse_fluid(rest: &str, sign: FluidSign) -> Option<FluidUse> {
    let (amount, tail) = split_first_token(rest);
    let amount: f64 = amount.parse().ok()?;
    let tail = tail.trim();
    let fluids = if let Some(inner) = tail.strip_prefix('[') {
        let inner = inner.split(']').next().unwrap_or(inner);
        split_ids(inner)
    } else if tail.is_empty() {
        Vec::new()
    } else {
        vec![split_first_token(tail).0.to_string()]
    };
    Some(FluidUse { sign, amount, fluids })
}

/// Parse `<amount> <kind> [modifier text…]`.
fn parse_energy(rest: &str) -> Option<EnergyUse> {
    let (amount, tail) = split_first_token(rest);
    let amount: f64 = amount.parse().ok()?;
    let (kind, modifiers) = split_first_token(tail.trim_start());
    if kind.is_empty() {
        return None;
    }
    let modifiers = modifiers.trim();
    Some(EnergyUse {
        amount,
        kind: kind.to_string(),
        modifiers: (!modifiers.is_empty()).then(|| modifiers.to_string()),
    })
}

/// Parse an `item` line: leading count, then any order of `mapper:`,
/// `mode:`, `tags[…]`, `flags[…]`, and bracketed or free-text id lists.
fn parse_item_line(rest: &str, opts: &ParseOptions) -> Option<ItemSpec> {
    let mut spec = ItemSpec::default();
    let mut raw_ids: Vec<String> = Vec::new();
    let mut free = String::new();

    let mut rest = rest.trim();
    let (first, tail) = split_first_token(rest);
    if let Ok(count) = first.parse::<u32>() {
        spec.count = count;
        rest = tail;
    }

    while !rest.is_empty() {
        let r = rest.trim_start();
        if r.is_empty() {
            break;
        }
        if let Some(t) = r.strip_prefix("tags[") {
            let (inner, after) = read_bracket(t);
            spec.tags.extend(split_ids(inner));
            rest = after;
        } else if let Some(t) = r.strip_prefix("flags[") {
            let (inner, after) = read_bracket(t);
            spec.flags.extend(split_ids(inner));
            rest = after;
        } else if let Some(t) = r.strip_prefix("mapper:") {
            let (token, after) = split_first_token(t);
            spec.mapper = Some(token.trim_end_matches(',').to_string());
            rest = after;
        } else if let Some(t) = r.strip_prefix("mode:") {
            let (token, after) = split_first_token(t);
            spec.mode = Some(token.trim_end_matches(',').to_string());
            rest = after;
        } else if let Some(t) = r.strip_prefix('[') {
            let (inner, after) = read_bracket(t);
            raw_ids.extend(split_ids(inner));
            rest = after;
        } else {
            let (token, after) = split_first_token(r);
            free.push_str(token);
            free.push(' ');
            rest = after;
        }
    }

    // Without a bracketed list, the remaining free text is the item list.
    if raw_ids.is_empty() && !free.trim().is_empty() {
        raw_ids = split_ids(free.trim());
    }

    if !raw_ids.is_empty() && raw_ids.iter().all(|id| id.contains(':')) {
        // Every id carries its own count: a numbered list.
        spec.numbered_list = true;
        spec.items = raw_ids
            .iter()
            .map(|id| {
                let (count, ident) = id.split_once(':').unwrap_or(("1", id));
                ItemRef::Counted {
                    count: count.trim().parse().unwrap_or(1),
                    id: opts.qualify(ident.trim()),
                }
            })
            .collect();
    } else {
        spec.items = raw_ids.iter().map(|id| ItemRef::Bare(opts.qualify(id))).collect();
    }

    if spec.items.is_empty() && spec.mapper.is_none() && spec.tags.is_empty() {
        return None;
    }
    Some(spec)
}

/// Split off the first whitespace-delimited token.
fn split_first_token(s: &str) -> (&str, &str) {
    match s.split_once(char::is_whitespace) {
        Some((token, rest)) => (token, rest),
        None => (s, ""),
    }
}

/// The text up to the closing `]`, plus everything after it. Tolerant
/// of a missing close bracket.
fn read_bracket(s: &str) -> (&str, &str) {
    match s.split_once(']') {
        Some((inner, after)) => (inner, after),
        None => (s, ""),
    }
}

/// Split a `;`/`,`-separated id list into trimmed, non-empty segments.
fn split_ids(s: &str) -> Vec<String> {
    s.split([';', ','])
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(String::from)
        .collect()
}
