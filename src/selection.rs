//! Item selection filters
//!
//! Only craftable items are offered for calculation. Filters are plain
//! values passed in by the caller.

use regex::{Regex, RegexBuilder};

use crate::catalog::RecipeCatalog;
use crate::error::{CalcError, CalcResult};
use crate::models::{RecipeDefinition, display_name};

#[derive(Debug, Clone, Default)]
pub struct ItemFilter {
    pub category: Option<String>,
    pub sub_category: Option<String>,
    pub tier: Option<u32>,
    search: Option<Regex>,
}

impl ItemFilter {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_category(mut self, category: impl Into<String>) -> Self {
        self.category = Some(category.into());
        self
    }

    pub fn with_sub_category(mut self, sub_category: impl Into<String>) -> Self {
        self.sub_category = Some(sub_category.into());
        self
    }

    pub fn with_tier(mut self, tier: u32) -> Self {
        self.tier = Some(tier);
        self
    }

    /// Case-insensitive pattern matched against the display name
    pub fn with_search(mut self, pattern: &str) -> CalcResult<Self> {
        let regex = RegexBuilder::new(pattern)
            .case_insensitive(true)
            .build()
            .map_err(|e| CalcError::InvalidSearch(e.to_string()))?;
        self.search = Some(regex);
        Ok(self)
    }

    pub fn matches(&self, id: &str, recipe: &RecipeDefinition) -> bool {
        if recipe.is_raw() {
            return false;
        }

        // Sub-category narrows a category and is ignored without one
        if let Some(category) = &self.category {
            if !eq_ignore_case(recipe.category.as_deref(), category) {
                return false;
            }
            if let Some(sub) = &self.sub_category {
                if !eq_ignore_case(recipe.sub_category.as_deref(), sub) {
                    return false;
                }
            }
        }

        if self.tier.is_some() && recipe.tier != self.tier {
            return false;
        }

        match &self.search {
            Some(regex) => regex.is_match(&display_name(id)),
            None => true,
        }
    }
}

fn eq_ignore_case(value: Option<&str>, wanted: &str) -> bool {
    value.is_some_and(|v| v.to_lowercase() == wanted.to_lowercase())
}

/// Craftable items accepted by the filter, in catalog order
pub fn select<'a>(catalog: &'a RecipeCatalog, filter: &ItemFilter) -> Vec<(&'a str, &'a RecipeDefinition)> {
    catalog
        .iter()
        .filter(|(id, recipe)| filter.matches(id, recipe))
        .collect()
}

/// Distinct categories of craftable items, in first-seen order
pub fn categories(catalog: &RecipeCatalog) -> Vec<String> {
    let mut seen: Vec<String> = Vec::new();
    for (_, recipe) in catalog.iter().filter(|(_, r)| !r.is_raw()) {
        if let Some(category) = &recipe.category {
            if !seen.contains(category) {
                seen.push(category.clone());
            }
        }
    }
    seen
}

/// Distinct sub-categories used within a category
pub fn sub_categories(catalog: &RecipeCatalog, category: &str) -> Vec<String> {
    let mut seen: Vec<String> = Vec::new();
    for (_, recipe) in catalog.iter().filter(|(_, r)| !r.is_raw()) {
        if !eq_ignore_case(recipe.category.as_deref(), category) {
            continue;
        }
        if let Some(sub) = &recipe.sub_category {
            if !seen.contains(sub) {
                seen.push(sub.clone());
            }
        }
    }
    seen
}

/// Distinct tiers of craftable items, ascending
pub fn tiers(catalog: &RecipeCatalog) -> Vec<u32> {
    let mut tiers: Vec<u32> = catalog
        .iter()
        .filter(|(_, r)| !r.is_raw())
        .filter_map(|(_, r)| r.tier)
        .collect();
    tiers.sort_unstable();
    tiers.dedup();
    tiers
}
