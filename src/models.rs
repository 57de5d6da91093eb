//! Data models for recipes and requirement trees

use std::collections::BTreeMap;

use serde::Serialize;

/// One required ingredient of a recipe, per single craft
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Ingredient {
    pub id: String,
    pub amount: u64,
}

/// Crafting definition of a single item.
///
/// `requires` keeps the order of the source file. An empty list marks the
/// item as a raw resource.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RecipeDefinition {
    pub tier: Option<u32>,
    pub category: Option<String>,
    pub sub_category: Option<String>,
    pub icon: Option<String>,
    pub requires: Vec<Ingredient>,
}

impl RecipeDefinition {
    /// A raw resource with no metadata
    pub fn raw() -> Self {
        Self::default()
    }

    pub fn with_ingredient(mut self, id: impl Into<String>, amount: u64) -> Self {
        self.requires.push(Ingredient {
            id: id.into(),
            amount,
        });
        self
    }

    pub fn with_tier(mut self, tier: u32) -> Self {
        self.tier = Some(tier);
        self
    }

    pub fn with_category(mut self, category: impl Into<String>) -> Self {
        self.category = Some(category.into());
        self
    }

    pub fn with_sub_category(mut self, sub_category: impl Into<String>) -> Self {
        self.sub_category = Some(sub_category.into());
        self
    }

    pub fn with_icon(mut self, icon: impl Into<String>) -> Self {
        self.icon = Some(icon.into());
        self
    }

    pub fn is_raw(&self) -> bool {
        self.requires.is_empty()
    }

    /// Label shown in tables: "Tier N", or "-" when unclassified
    pub fn tier_label(&self) -> String {
        tier_label(self.tier)
    }
}

/// Tier 0 is not a valid tier and is labelled like a missing one
pub fn tier_label(tier: Option<u32>) -> String {
    match tier {
        Some(t) if t > 0 => format!("Tier {}", t),
        _ => "-".to_string(),
    }
}

/// Human-readable label for an item id
pub fn display_name(id: &str) -> String {
    id.replace('_', " ")
}

/// One position in an expanded requirement tree.
///
/// `quantity` is already multiplied by every ancestor's amount.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TreeNode {
    pub id: String,
    pub display_name: String,
    pub quantity: u64,
    pub children: Vec<TreeNode>,
}

impl TreeNode {
    pub fn leaf(id: &str, quantity: u64) -> Self {
        Self {
            id: id.to_string(),
            display_name: display_name(id),
            quantity,
            children: Vec::new(),
        }
    }

    pub fn is_leaf(&self) -> bool {
        self.children.is_empty()
    }

    /// Total number of nodes in this subtree, including self
    pub fn node_count(&self) -> usize {
        1 + self.children.iter().map(TreeNode::node_count).sum::<usize>()
    }
}

/// Raw ingredient id -> total quantity
pub type TotalsMap = BTreeMap<String, u64>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_display_name_replaces_underscores() {
        assert_eq!(display_name("iron_ingot"), "iron ingot");
        assert_eq!(display_name("wood"), "wood");
        assert_eq!(display_name("a__b"), "a  b");
    }

    #[test]
    fn test_tier_label() {
        assert_eq!(RecipeDefinition::raw().with_tier(4).tier_label(), "Tier 4");
        assert_eq!(RecipeDefinition::raw().tier_label(), "-");
        assert_eq!(RecipeDefinition::raw().with_tier(0).tier_label(), "-");
    }

    #[test]
    fn test_builder_keeps_ingredient_order() {
        let recipe = RecipeDefinition::raw()
            .with_ingredient("plank", 4)
            .with_ingredient("glue", 2);

        assert!(!recipe.is_raw());
        let ids: Vec<_> = recipe.requires.iter().map(|i| i.id.as_str()).collect();
        assert_eq!(ids, vec!["plank", "glue"]);
    }

    #[test]
    fn test_tree_node_json_uses_camel_case() {
        let json = serde_json::to_value(TreeNode::leaf("iron_ore", 3)).unwrap();
        assert_eq!(json["displayName"], "iron ore");
        assert!(json.get("display_name").is_none());
    }

    #[test]
    fn test_node_count() {
        let mut root = TreeNode::leaf("table", 1);
        root.children.push(TreeNode::leaf("wood", 2));
        root.children.push(TreeNode::leaf("nail", 3));
        assert_eq!(root.node_count(), 3);
        assert!(!root.is_leaf());
    }
}
