//! Recipes: parsed `craftRecipe` records with ordered input/output
//! entries, item-mapper tables, and decoded metadata.

use crate::value::PropertyValue;
use serde::Serialize;
use std::collections::BTreeMap;

/// A reference to one item inside an input/output entry.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub enum ItemRef {
    /// A namespace-qualified identifier.
    Bare(String),
    /// A `count:identifier` entry from a numbered list.
    Counted { count: u32, id: String },
    /// The legacy "any fluid container" wildcard, produced when the
    /// wildcard id is the sole listed item and a fluid attaches to it.
    AnyFluidContainer,
}

impl ItemRef {
    /// The identifier, when this reference names a concrete item.
    pub fn id(&self) -> Option<&str> {
        match self {
            ItemRef::Bare(id) => Some(id),
            ItemRef::Counted { id, .. } => Some(id),
            ItemRef::AnyFluidContainer => None,
        }
    }
}

/// Whether a fluid line consumes or produces.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum FluidSign {
    Consume,
    Produce,
}

/// A parsed `-fluid` / `+fluid` line.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FluidUse {
    pub sign: FluidSign,
    pub amount: f64,
    /// Candidate fluid identifiers.
    pub fluids: Vec<String>,
}

/// A parsed `energy` line.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct EnergyUse {
    pub amount: f64,
    pub kind: String,
    /// Free-form trailing modifier text.
    pub modifiers: Option<String>,
}

/// A parsed `item` line: one-or-more item candidates with a shared
/// count, plus mode/mapper/tag/flag annotations.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ItemSpec {
    pub count: u32,
    pub items: Vec<ItemRef>,
    pub mode: Option<String>,
    pub mapper: Option<String>,
    pub tags: Vec<String>,
    pub flags: Vec<String>,
    /// Every listed identifier carried its own `count:` prefix.
    pub numbered_list: bool,
    /// Fluid attached by a following `-fluid` line.
    pub fluid_modifier: Option<FluidUse>,
}

impl Default for ItemSpec {
    fn default() -> Self {
        Self {
            count: 1,
            items: Vec::new(),
            mode: None,
            mapper: None,
            tags: Vec::new(),
            flags: Vec::new(),
            numbered_list: false,
            fluid_modifier: None,
        }
    }
}

/// One classified line of an `inputs` or `outputs` block.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub enum RecipeEntry {
    Item(ItemSpec),
    /// A standalone fluid line with no preceding item entry.
    Fluid(FluidUse),
    Energy(EnergyUse),
}

impl RecipeEntry {
    pub fn as_item(&self) -> Option<&ItemSpec> {
        match self {
            RecipeEntry::Item(spec) => Some(spec),
            _ => None,
        }
    }
}

/// The synthetic single output of a construction recipe, resolved from
/// entity/skin/style metadata.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ResolvedProduct {
    pub display_name: String,
    pub icon: Option<String>,
}

/// A named transformation with ordered inputs/outputs, requirements,
/// and metadata. Entry order is significant for display and for
/// positional mapper resolution.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Recipe {
    pub name: String,
    pub inputs: Vec<RecipeEntry>,
    pub outputs: Vec<RecipeEntry>,
    /// Named substitution tables from `itemMapper` sub-blocks; pure
    /// lookup tables, not items.
    pub item_mappers: BTreeMap<String, Vec<(String, String)>>,
    /// Every scalar `key = value` line of the body, undecoded.
    pub properties: BTreeMap<String, PropertyValue>,
    pub skill_required: Vec<(String, String)>,
    pub xp_award: Vec<(String, String)>,
    pub auto_learn_all: Vec<(String, String)>,
    pub tags: Vec<String>,
    pub category: Option<String>,
    pub time: Option<f64>,
    pub construction: bool,
    pub skin_name: Option<String>,
    pub entity_style: Option<String>,
    /// Populated by the construction assembler for construction recipes.
    pub resolved_output: Option<ResolvedProduct>,
}

impl Recipe {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            inputs: Vec::new(),
            outputs: Vec::new(),
            item_mappers: BTreeMap::new(),
            properties: BTreeMap::new(),
            skill_required: Vec::new(),
            xp_award: Vec::new(),
            auto_learn_all: Vec::new(),
            tags: Vec::new(),
            category: None,
            time: None,
            construction: false,
            skin_name: None,
            entity_style: None,
            resolved_output: None,
        }
    }

    /// Look up a mapper table by name.
    pub fn mapper(&self, name: &str) -> Option<&[(String, String)]> {
        self.item_mappers.get(name).map(Vec::as_slice)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn item_ref_ids() {
        assert_eq!(ItemRef::Bare("Base.Axe".into()).id(), Some("Base.Axe"));
        assert_eq!(
            ItemRef::Counted { count: 2, id: "Base.Plank".into() }.id(),
            Some("Base.Plank")
        );
        assert_eq!(ItemRef::AnyFluidContainer.id(), None);
    }

    #[test]
    fn default_item_spec_has_count_one() {
        let spec = ItemSpec::default();
        assert_eq!(spec.count, 1);
        assert!(!spec.numbered_list);
        assert!(spec.fluid_modifier.is_none());
    }

    #[test]
    fn mapper_lookup() {
        let mut recipe = Recipe::new("MakeAxe");
        recipe
            .item_mappers
            .insert("output".into(), vec![("Base.Axe".into(), "Base.AxeHead".into())]);
        assert!(recipe.mapper("output").is_some());
        assert!(recipe.mapper("missing").is_none());
    }
}
