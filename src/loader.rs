//! Recipe catalog loading
//!
//! Reads the JSON recipe data file (or every `*.json` file below a
//! directory) into a validated [`RecipeCatalog`]. The whole catalog is
//! materialised before anything is returned; any unreadable or malformed
//! file fails the load.

use std::fs;
use std::path::{Path, PathBuf};

use serde::Deserialize;
use serde_json::{Map, Value};
use tracing::{info, warn};
use walkdir::WalkDir;

use crate::catalog::RecipeCatalog;
use crate::error::{CalcError, CalcResult};
use crate::models::{Ingredient, RecipeDefinition};

/// On-disk shape of one recipe entry. Unknown keys are ignored.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct RawRecipe {
    tier: Option<u32>,
    category: Option<String>,
    sub_category: Option<String>,
    icon: Option<String>,
    requires: Option<Map<String, Value>>,
}

fn load_error(path: &Path, reason: impl Into<String>) -> CalcError {
    CalcError::CatalogLoad {
        path: path.to_path_buf(),
        reason: reason.into(),
    }
}

/// Parse one catalog document, keeping the key order of the source
pub fn parse_catalog(text: &str, source: &Path) -> CalcResult<Vec<(String, RecipeDefinition)>> {
    let document: Map<String, Value> =
        serde_json::from_str(text).map_err(|e| load_error(source, e.to_string()))?;

    let mut entries = Vec::with_capacity(document.len());
    for (id, value) in document {
        let raw: RawRecipe = serde_json::from_value(value)
            .map_err(|e| load_error(source, format!("item '{}': {}", id, e)))?;

        if raw.tier == Some(0) {
            return Err(load_error(source, format!("item '{}': tier must be a positive integer", id)));
        }

        let mut requires = Vec::new();
        for (ingredient, amount) in raw.requires.unwrap_or_default() {
            let amount = amount.as_u64().ok_or_else(|| CalcError::InvalidRecipe {
                item: id.clone(),
                ingredient: ingredient.clone(),
                reason: format!("must have a positive integer quantity, got {}", amount),
            })?;
            requires.push(Ingredient {
                id: ingredient,
                amount,
            });
        }

        entries.push((
            id,
            RecipeDefinition {
                tier: raw.tier,
                category: raw.category,
                sub_category: raw.sub_category,
                icon: raw.icon,
                requires,
            },
        ));
    }

    Ok(entries)
}

/// Find all catalog files below a directory, sorted by path
pub fn find_catalog_files(dir: &Path) -> CalcResult<Vec<PathBuf>> {
    let mut files = Vec::new();

    for entry in WalkDir::new(dir).follow_links(true).sort_by_file_name() {
        let entry = entry.map_err(|e| load_error(dir, e.to_string()))?;
        let path = entry.path();
        if entry.file_type().is_file() && path.extension().is_some_and(|ext| ext == "json") {
            files.push(path.to_path_buf());
        }
    }

    Ok(files)
}

/// Load a catalog from a JSON file or a directory of JSON files.
///
/// When several files define the same id, the later file wins.
pub fn load_catalog(path: &Path) -> CalcResult<(RecipeCatalog, LoadStats)> {
    let files = if path.is_dir() {
        let files = find_catalog_files(path)?;
        if files.is_empty() {
            return Err(load_error(path, "no .json catalog files found"));
        }
        files
    } else {
        vec![path.to_path_buf()]
    };

    let mut stats = LoadStats::default();
    let mut entries: Vec<(String, RecipeDefinition)> = Vec::new();

    for file in &files {
        let text = fs::read_to_string(file).map_err(|e| load_error(file, e.to_string()))?;
        let parsed = parse_catalog(&text, file)?;

        for (id, recipe) in parsed {
            if entries.iter().any(|(existing, _)| *existing == id) {
                warn!(item = %id, file = %file.display(), "recipe redefined, replacing earlier entry");
                stats.replaced += 1;
            }
            entries.push((id, recipe));
        }
        stats.files += 1;
    }

    let catalog = RecipeCatalog::new(entries)?;
    stats.recipes = catalog.len();
    stats.craftable = catalog.craftable_count();
    stats.raw = stats.recipes - stats.craftable;

    info!(path = %path.display(), "{}", stats);
    Ok((catalog, stats))
}

#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct LoadStats {
    pub files: usize,
    pub recipes: usize,
    pub craftable: usize,
    pub raw: usize,
    pub replaced: usize,
}

impl std::fmt::Display for LoadStats {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "Loaded {} recipes from {} file(s) ({} craftable, {} raw). Replaced: {}",
            self.recipes, self.files, self.craftable, self.raw, self.replaced
        )
    }
}
