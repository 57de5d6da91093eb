//! Crafting Calculator
//!
//! Expands an item of a recipe catalog into its requirement tree and sums
//! the raw resources needed to craft it.

pub mod calculator;
pub mod catalog;
pub mod config;
pub mod error;
pub mod loader;
pub mod models;
pub mod selection;

pub use calculator::{aggregate, expand, expand_with_limit};
pub use catalog::RecipeCatalog;
pub use error::{CalcError, CalcResult};
pub use models::{RecipeDefinition, TotalsMap, TreeNode};
