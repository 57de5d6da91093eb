//! Calculator configuration

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};

use crate::calculator::DEFAULT_MAX_DEPTH;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct CalculatorConfig {
    /// Recipe data file, or a directory of `*.json` files
    pub catalog: PathBuf,
    /// Expansion depth bound
    pub max_depth: usize,
}

impl Default for CalculatorConfig {
    fn default() -> Self {
        Self {
            catalog: PathBuf::from("recipes.json"),
            max_depth: DEFAULT_MAX_DEPTH,
        }
    }
}

impl CalculatorConfig {
    pub fn from_file(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read config {}", path.display()))?;
        let config: Self = toml::from_str(&content)
            .with_context(|| format!("Failed to parse config {}", path.display()))?;
        Ok(config)
    }

    /// Load from `path` if given, otherwise use defaults
    pub fn load(path: Option<&Path>) -> Result<Self> {
        match path {
            Some(p) => Self::from_file(p),
            None => Ok(Self::default()),
        }
    }
}
