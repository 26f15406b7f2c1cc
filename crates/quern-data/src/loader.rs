//! Batch driver: reads script files, runs the section parsers, merges
//! per-file results into the cumulative tables, and assembles
//! construction recipes.
//!
//! Files do not share mutable state while parsing, so the `parallel`
//! feature fans the per-file work out over rayon; the merge is always a
//! sequential fold in the caller-supplied file order, which keeps the
//! duplicate-rejection rules deterministic.

use crate::ParseOptions;
use crate::construction::{collect_entities, resolve_construction};
use crate::error::ScriptError;
use crate::module_parser::parse_module_text;
use crate::note;
use crate::recipe_parser::parse_recipe_text;
use quern_core::item::Module;
use quern_core::recipe::Recipe;
use quern_core::registry::{Anomaly, AnomalyKind, ScriptData};
use quern_core::skin::SkinTable;
use std::path::{Path, PathBuf};
use tracing::info;

#[cfg(feature = "parallel")]
use rayon::prelude::*;

// ===========================================================================
// Public entry points
// ===========================================================================

/// The result of a multi-file parse: whatever data could be obtained,
/// plus the whole-file failures that were contained along the way.
#[derive(Debug)]
pub struct BatchOutcome {
    pub data: ScriptData,
    pub failures: Vec<ScriptError>,
}

/// Parse a single script file.
pub fn parse_file(path: &Path, opts: &ParseOptions) -> Result<ScriptData, ScriptError> {
    let text = read_script(path)?;
    let mut data = ScriptData::default();
    merge_file(&mut data, parse_source(&text, opts), Some(path));
    data.summary.files = 1;
    finish(&mut data);
    Ok(data)
}

/// Parse script text directly (no I/O), e.g. for embedded or test input.
pub fn parse_str(text: &str, opts: &ParseOptions) -> ScriptData {
    let mut data = ScriptData::default();
    merge_file(&mut data, parse_source(text, opts), None);
    data.summary.files = 1;
    finish(&mut data);
    data
}

/// Parse a set of script files and merge them into one result.
///
/// A missing or unreadable file fails only itself: its error is
/// collected in [`BatchOutcome::failures`] and the remaining files
/// still parse. Merge order follows `paths` regardless of the
/// `parallel` feature.
pub fn parse_files(paths: &[PathBuf], opts: &ParseOptions) -> BatchOutcome {
    #[cfg(feature = "parallel")]
    let loaded: Vec<Result<FileResult, ScriptError>> = paths
        .par_iter()
        .map(|path| read_script(path).map(|text| parse_source(&text, opts)))
        .collect();

    #[cfg(not(feature = "parallel"))]
    let loaded: Vec<Result<FileResult, ScriptError>> = paths
        .iter()
        .map(|path| read_script(path).map(|text| parse_source(&text, opts)))
        .collect();

    let mut data = ScriptData::default();
    let mut failures = Vec::new();
    for (path, result) in paths.iter().zip(loaded) {
        match result {
            Ok(file) => {
                merge_file(&mut data, file, Some(path));
                data.summary.files += 1;
            }
            Err(err) => {
                tracing::error!(file = %path.display(), "{err}");
                failures.push(err);
            }
        }
    }
    finish(&mut data);
    BatchOutcome { data, failures }
}

// ===========================================================================
// Per-file parsing
// ===========================================================================

/// Everything one file contributed, before merging.
#[derive(Debug, Default)]
struct FileResult {
    modules: Vec<Module>,
    recipes: Vec<Recipe>,
    skins: SkinTable,
    anomalies: Vec<Anomaly>,
}

/// Run all three section scanners over one file body.
fn parse_source(text: &str, opts: &ParseOptions) -> FileResult {
    let mut file = FileResult::default();

    let modules = parse_module_text(text, opts);
    file.modules = modules.modules;
    file.anomalies.extend(modules.anomalies);

    let recipes = parse_recipe_text(text, opts);
    file.recipes = recipes.recipes;
    file.anomalies.extend(recipes.anomalies);

    collect_entities(text, &mut file.skins, &mut file.anomalies);

    file
}

/// Read a script file, tolerating legacy (non-UTF-8) bytes.
fn read_script(path: &Path) -> Result<String, ScriptError> {
    if !path.exists() {
        return Err(ScriptError::MissingFile {
            file: path.to_path_buf(),
        });
    }
    let bytes = std::fs::read(path).map_err(|source| ScriptError::Read {
        file: path.to_path_buf(),
        source,
    })?;
    Ok(String::from_utf8_lossy(&bytes).into_owned())
}

// ===========================================================================
// Merging
// ===========================================================================

/// Fold one file's results into the cumulative tables. Duplicate keys
/// are rejected (first definition wins), never merged.
fn merge_file(data: &mut ScriptData, file: FileResult, path: Option<&Path>) {
    let mut anomalies = file.anomalies;

    for module in file.modules {
        match data.modules.get_mut(&module.name) {
            Some(existing) => {
                let module_name = module.name.clone();
                for name in existing.merge(module) {
                    note(
                        &mut anomalies,
                        AnomalyKind::DuplicateDefinition,
                        format!("item '{name}' in module '{module_name}'"),
                    );
                }
            }
            None => {
                data.modules.insert(module.name.clone(), module);
            }
        }
    }

    for recipe in file.recipes {
        if data.recipes.contains_key(&recipe.name) {
            note(
                &mut anomalies,
                AnomalyKind::DuplicateDefinition,
                format!("recipe '{}'", recipe.name),
            );
            continue;
        }
        data.recipe_order.push(recipe.name.clone());
        data.recipes.insert(recipe.name.clone(), recipe);
    }

    data.skins.merge(file.skins);

    if let Some(path) = path {
        for anomaly in &mut anomalies {
            anomaly.file.get_or_insert_with(|| path.to_path_buf());
        }
    }
    data.summary.anomalies.extend(anomalies);
}

/// Resolve construction recipes and fill in the summary counts.
fn finish(data: &mut ScriptData) {
    resolve_construction(data);
    data.summary.modules = data.modules.len();
    data.summary.items = data.item_count();
    data.summary.recipes = data.recipes.len();
    info!(
        files = data.summary.files,
        modules = data.summary.modules,
        items = data.summary.items,
        recipes = data.summary.recipes,
        anomalies = data.summary.anomalies.len(),
        "script parse complete"
    );
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_str_counts_items_and_recipes() {
        let data = parse_str(
            "module Base {\n\
             \titem Axe { Weight = 3, }\n\
             \titem Knife { Weight = 1, }\n\
             }\n\
             craftRecipe MakeAxe {\n\
             \tinputs {\n\
             \t\titem 1 [Base.AxeHead],\n\
             \t}\n\
             }\n",
            &ParseOptions::default(),
        );
        assert_eq!(data.summary.files, 1);
        assert_eq!(data.summary.modules, 1);
        assert_eq!(data.summary.items, 2);
        assert_eq!(data.summary.recipes, 1);
        assert!(data.item("Base", "Axe").is_some());
        assert!(data.recipe("MakeAxe").is_some());
    }

    #[test]
    fn recipe_inside_module_is_found_once() {
        // Recipes may sit inside module blocks; the module parser skips
        // them and the recipe scanner picks them up.
        let data = parse_str(
            "module Base {\n\
             \titem Axe { Weight = 3, }\n\
             \tcraftRecipe MakeAxe {\n\
             \t\tinputs {\n\
             \t\t\titem 1 [Base.AxeHead],\n\
             \t\t}\n\
             \t}\n\
             }\n",
            &ParseOptions::default(),
        );
        assert_eq!(data.summary.items, 1);
        assert_eq!(data.summary.recipes, 1);
    }

    #[test]
    fn duplicate_recipe_across_merge_keeps_first() {
        let text_a = "craftRecipe MakeAxe {\n\ttime = 10,\n}\n";
        let text_b = "craftRecipe MakeAxe {\n\ttime = 99,\n}\n";
        let mut data = ScriptData::default();
        merge_file(
            &mut data,
            parse_source(text_a, &ParseOptions::default()),
            None,
        );
        merge_file(
            &mut data,
            parse_source(text_b, &ParseOptions::default()),
            None,
        );
        assert_eq!(data.recipes.len(), 1);
        assert_eq!(data.recipe("MakeAxe").unwrap().time, Some(10.0));
        assert!(
            data.summary
                .anomalies
                .iter()
                .any(|a| a.kind == AnomalyKind::DuplicateDefinition)
        );
    }

    #[test]
    fn missing_file_is_an_error() {
        let result = parse_file(
            Path::new("/nonexistent/quern/scripts.txt"),
            &ParseOptions::default(),
        );
        assert!(matches!(result, Err(ScriptError::MissingFile { .. })));
    }
}
