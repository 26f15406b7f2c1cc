//! Quern core -- data model and lexical foundations for the script parser.
//!
//! This crate holds the types produced by parsing the game's text-based
//! asset-definition language, plus the low-level text utilities every
//! parser layer builds on. It performs no I/O and emits no logs; the
//! parsing pipeline lives in `quern-data`.
//!
//! # Key Types
//!
//! - [`value::PropertyValue`] -- closed sum over the three value shapes
//!   the script grammar encodes (`Scalar`, `;`-split `List`, `:`-paired
//!   `Map`).
//! - [`item::Module`] / [`item::Item`] -- the two-level namespace→item
//!   property tables.
//! - [`recipe::Recipe`] -- a parsed `craftRecipe` with ordered input and
//!   output entries, item-mapper tables, and decoded metadata.
//! - [`skin::SkinTable`] -- the global skin→style display-metadata lookup
//!   used to resolve construction-recipe products.
//! - [`registry::ScriptData`] -- the cumulative, read-only result of one
//!   parse invocation, with its [`registry::ParseSummary`].
//! - [`block::extract_block`] -- the brace-balance primitive all block
//!   parsers share.

pub mod block;
pub mod item;
pub mod lex;
pub mod recipe;
pub mod registry;
pub mod skin;
pub mod value;
