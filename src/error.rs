//! Error types for catalog loading and recipe expansion

use std::path::PathBuf;

use thiserror::Error;

/// Errors produced while loading a catalog or expanding a recipe.
#[derive(Debug, Error)]
pub enum CalcError {
    /// Root item has no entry in the catalog
    #[error("Unknown item: {0}")]
    UnknownItem(String),

    /// Requirement graph loops back on itself
    #[error("Cyclic recipe: {}", cycle.join(" -> "))]
    CyclicRecipe {
        /// Item ids along the cycle, first id repeated at the end
        cycle: Vec<String>,
    },

    /// Expansion went deeper than the configured bound
    #[error("Recipe depth exceeded at '{item}' (limit {limit})")]
    DepthExceeded { item: String, limit: usize },

    /// A requirement entry is malformed
    #[error("Invalid recipe '{item}': ingredient '{ingredient}' {reason}")]
    InvalidRecipe {
        item: String,
        ingredient: String,
        reason: String,
    },

    /// Requested quantity must be at least one
    #[error("Quantity must be a positive integer")]
    InvalidQuantity,

    /// Multiplying quantities along a path overflowed u64
    #[error("Quantity overflow while expanding '{item}'")]
    QuantityOverflow { item: String },

    /// Name search pattern does not compile
    #[error("Invalid search pattern: {0}")]
    InvalidSearch(String),

    /// Catalog file could not be read or parsed
    #[error("Failed to load catalog {}: {reason}", path.display())]
    CatalogLoad { path: PathBuf, reason: String },
}

pub type CalcResult<T> = Result<T, CalcError>;
