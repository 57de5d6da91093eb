//! Read-only recipe catalog

use std::collections::HashMap;

use crate::error::{CalcError, CalcResult};
use crate::models::RecipeDefinition;

/// Immutable mapping from item id to its recipe, in source order.
///
/// Construction validates the whole catalog: every requirement amount is
/// positive and no craftable item depends on itself, directly or through
/// other items. Ingredients without an entry are raw resources.
#[derive(Debug, Clone, Default)]
pub struct RecipeCatalog {
    entries: Vec<(String, RecipeDefinition)>,
    index: HashMap<String, usize>,
}

#[derive(Clone, Copy, PartialEq, Eq)]
enum Visit {
    InProgress,
    Done,
}

impl RecipeCatalog {
    /// Build and validate a catalog. A repeated id replaces the earlier
    /// definition but keeps its original position.
    pub fn new<I>(definitions: I) -> CalcResult<Self>
    where
        I: IntoIterator<Item = (String, RecipeDefinition)>,
    {
        let mut catalog = RecipeCatalog::default();
        for (id, recipe) in definitions {
            match catalog.index.get(&id) {
                Some(&pos) => catalog.entries[pos].1 = recipe,
                None => {
                    catalog.index.insert(id.clone(), catalog.entries.len());
                    catalog.entries.push((id, recipe));
                }
            }
        }

        catalog.check_amounts()?;
        if let Some(cycle) = catalog.find_cycle() {
            return Err(CalcError::CyclicRecipe { cycle });
        }
        Ok(catalog)
    }

    pub fn lookup(&self, id: &str) -> Option<&RecipeDefinition> {
        self.index.get(id).map(|&pos| &self.entries[pos].1)
    }

    /// True iff the item has an entry with at least one requirement
    pub fn is_craftable(&self, id: &str) -> bool {
        self.lookup(id).is_some_and(|r| !r.is_raw())
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// All entries in source order
    pub fn iter(&self) -> impl Iterator<Item = (&str, &RecipeDefinition)> {
        self.entries.iter().map(|(id, r)| (id.as_str(), r))
    }

    pub fn craftable_count(&self) -> usize {
        self.entries.iter().filter(|(_, r)| !r.is_raw()).count()
    }

    /// Items whose recipe lists `id` directly, with the per-craft amount
    pub fn used_by(&self, id: &str) -> Vec<(&str, u64)> {
        self.iter()
            .filter_map(|(item, recipe)| {
                recipe
                    .requires
                    .iter()
                    .find(|i| i.id == id)
                    .map(|i| (item, i.amount))
            })
            .collect()
    }

    fn check_amounts(&self) -> CalcResult<()> {
        for (id, recipe) in &self.entries {
            if let Some(bad) = recipe.requires.iter().find(|i| i.amount == 0) {
                return Err(CalcError::InvalidRecipe {
                    item: id.clone(),
                    ingredient: bad.id.clone(),
                    reason: "has zero quantity".to_string(),
                });
            }
        }
        Ok(())
    }

    /// Depth-first search over craftable items. Returns the first cycle
    /// found, with the starting id repeated at the end.
    fn find_cycle(&self) -> Option<Vec<String>> {
        let mut state: HashMap<&str, Visit> = HashMap::new();
        let mut path: Vec<&str> = Vec::new();

        for (id, _) in &self.entries {
            if let Some(cycle) = self.visit(id, &mut state, &mut path) {
                return Some(cycle);
            }
        }
        None
    }

    fn visit<'a>(
        &'a self,
        id: &'a str,
        state: &mut HashMap<&'a str, Visit>,
        path: &mut Vec<&'a str>,
    ) -> Option<Vec<String>> {
        match state.get(id) {
            Some(Visit::Done) => return None,
            Some(Visit::InProgress) => {
                let start = path.iter().position(|p| *p == id).unwrap_or(0);
                let mut cycle: Vec<String> = path[start..].iter().map(|s| s.to_string()).collect();
                cycle.push(id.to_string());
                return Some(cycle);
            }
            None => {}
        }

        let recipe = self.lookup(id)?;
        state.insert(id, Visit::InProgress);
        path.push(id);

        for ingredient in &recipe.requires {
            if self.is_craftable(&ingredient.id) {
                if let Some(cycle) = self.visit(&ingredient.id, state, path) {
                    return Some(cycle);
                }
            }
        }

        path.pop();
        state.insert(id, Visit::Done);
        None
    }
}
