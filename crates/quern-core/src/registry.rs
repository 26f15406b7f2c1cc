//! The cumulative parse result: frozen module/recipe tables, the skin
//! table, and the anomaly-bearing summary.

use crate::item::{Item, Module};
use crate::recipe::Recipe;
use crate::skin::SkinTable;
use serde::Serialize;
use std::collections::{BTreeMap, HashMap};
use std::fmt;
use std::path::PathBuf;

/// Classification of a non-fatal parse deviation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum AnomalyKind {
    /// A block's brace depth never returned to zero.
    UnterminatedBlock,
    /// A repeated item/recipe/mapper name; the first definition was kept.
    DuplicateDefinition,
    /// A line matching no known property or entry pattern.
    UnrecognizedLine,
    /// A construction recipe whose skin/style pair resolved nowhere.
    UnresolvedSkin,
}

impl fmt::Display for AnomalyKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            AnomalyKind::UnterminatedBlock => "unterminated block",
            AnomalyKind::DuplicateDefinition => "duplicate definition",
            AnomalyKind::UnrecognizedLine => "unrecognized line",
            AnomalyKind::UnresolvedSkin => "unresolved skin",
        };
        f.write_str(s)
    }
}

/// A recorded non-fatal deviation from the grammar.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Anomaly {
    pub kind: AnomalyKind,
    /// Source file, when known at record time.
    pub file: Option<PathBuf>,
    pub context: String,
}

impl Anomaly {
    pub fn new(kind: AnomalyKind, context: impl Into<String>) -> Self {
        Self {
            kind,
            file: None,
            context: context.into(),
        }
    }
}

impl fmt::Display for Anomaly {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.file {
            Some(file) => write!(f, "{}: {} ({})", self.kind, self.context, file.display()),
            None => write!(f, "{}: {}", self.kind, self.context),
        }
    }
}

/// Counts and anomalies for one parse invocation.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct ParseSummary {
    pub files: usize,
    pub modules: usize,
    pub items: usize,
    pub recipes: usize,
    pub anomalies: Vec<Anomaly>,
}

/// Everything one parse invocation produced. Read-only once returned;
/// there is no update/delete lifecycle beyond whole-file re-parsing.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct ScriptData {
    pub modules: BTreeMap<String, Module>,
    pub recipes: HashMap<String, Recipe>,
    /// Recipe names in first-encountered order.
    pub recipe_order: Vec<String>,
    pub skins: SkinTable,
    pub summary: ParseSummary,
}

impl ScriptData {
    pub fn module(&self, name: &str) -> Option<&Module> {
        self.modules.get(name)
    }

    pub fn item(&self, module: &str, name: &str) -> Option<&Item> {
        self.modules.get(module)?.get(name)
    }

    pub fn recipe(&self, name: &str) -> Option<&Recipe> {
        self.recipes.get(name)
    }

    /// Recipes in first-encountered order.
    pub fn recipes_in_order(&self) -> impl Iterator<Item = &Recipe> {
        self.recipe_order.iter().filter_map(|name| self.recipes.get(name))
    }

    pub fn item_count(&self) -> usize {
        self.modules.values().map(Module::len).sum()
    }
}
