//! Requirement tree expansion and raw-resource totals

use serde::Serialize;
use tracing::{debug, trace};

use crate::catalog::RecipeCatalog;
use crate::error::{CalcError, CalcResult};
use crate::models::{TotalsMap, TreeNode, display_name, tier_label};

/// Default bound on expansion depth. Validated catalogs are acyclic, so this
/// only trips on unusually deep chains.
pub const DEFAULT_MAX_DEPTH: usize = 32;

/// Expand `item` into its full requirement tree for `quantity` crafts.
///
/// Craftable ingredients are expanded recursively; ingredients that are
/// absent from the catalog or have no requirements become leaves. Either a
/// complete tree is returned or an error, never a truncated tree.
pub fn expand(catalog: &RecipeCatalog, item: &str, quantity: u64) -> CalcResult<TreeNode> {
    expand_with_limit(catalog, item, quantity, DEFAULT_MAX_DEPTH)
}

/// Same as [`expand`] with an explicit depth bound
pub fn expand_with_limit(
    catalog: &RecipeCatalog,
    item: &str,
    quantity: u64,
    max_depth: usize,
) -> CalcResult<TreeNode> {
    if quantity == 0 {
        return Err(CalcError::InvalidQuantity);
    }
    let tree = expand_recursive(catalog, item, quantity, 0, max_depth)?;
    debug!(item, quantity, nodes = tree.node_count(), "expanded requirement tree");
    Ok(tree)
}

fn expand_recursive(
    catalog: &RecipeCatalog,
    item: &str,
    quantity: u64,
    depth: usize,
    max_depth: usize,
) -> CalcResult<TreeNode> {
    if depth > max_depth {
        return Err(CalcError::DepthExceeded {
            item: item.to_string(),
            limit: max_depth,
        });
    }

    let recipe = catalog
        .lookup(item)
        .ok_or_else(|| CalcError::UnknownItem(item.to_string()))?;

    let mut node = TreeNode {
        id: item.to_string(),
        display_name: display_name(item),
        quantity,
        children: Vec::with_capacity(recipe.requires.len()),
    };

    for ingredient in &recipe.requires {
        let needed = ingredient
            .amount
            .checked_mul(quantity)
            .ok_or_else(|| CalcError::QuantityOverflow {
                item: ingredient.id.clone(),
            })?;
        trace!(parent = item, ingredient = %ingredient.id, needed, depth);

        if catalog.is_craftable(&ingredient.id) {
            match expand_recursive(catalog, &ingredient.id, needed, depth + 1, max_depth) {
                Ok(child) => node.children.push(child),
                // Cannot happen once is_craftable holds; skip the branch
                Err(CalcError::UnknownItem(_)) => {}
                Err(e) => return Err(e),
            }
        } else {
            node.children.push(TreeNode::leaf(&ingredient.id, needed));
        }
    }

    Ok(node)
}

/// Sum the quantity of every leaf in the tree, keyed by ingredient id.
///
/// Inner nodes never appear in the result. The same raw ingredient under
/// several branches is added up; a sum past `u64::MAX` is an error.
pub fn aggregate(root: &TreeNode) -> CalcResult<TotalsMap> {
    let mut totals = TotalsMap::new();
    collect_leaves(root, &mut totals)?;
    Ok(totals)
}

fn collect_leaves(node: &TreeNode, totals: &mut TotalsMap) -> CalcResult<()> {
    if node.is_leaf() {
        let total = totals.entry(node.id.clone()).or_default();
        *total = total
            .checked_add(node.quantity)
            .ok_or_else(|| CalcError::QuantityOverflow {
                item: node.id.clone(),
            })?;
    } else {
        for child in &node.children {
            collect_leaves(child, totals)?;
        }
    }
    Ok(())
}

/// Format a requirement tree as an indented list
pub fn format_tree(node: &TreeNode, indent: usize) -> String {
    let mut output = format!("{}{} : {}\n", "  ".repeat(indent), node.display_name, node.quantity);
    for child in &node.children {
        output.push_str(&format_tree(child, indent + 1));
    }
    output
}

/// One row of the raw totals table
#[derive(Debug, Clone, Serialize)]
pub struct TotalLine {
    pub id: String,
    pub name: String,
    pub quantity: u64,
    pub tier: Option<u32>,
    pub icon: Option<String>,
}

/// Summary of a crafting calculation
#[derive(Debug, Clone, Serialize)]
pub struct CraftSummary {
    pub item: String,
    pub quantity: u64,
    pub tree: TreeNode,
    pub totals: Vec<TotalLine>,
}

/// Expand and aggregate in one step, attaching display metadata from the
/// catalog to every raw total
pub fn summarize(
    catalog: &RecipeCatalog,
    item: &str,
    quantity: u64,
    max_depth: usize,
) -> CalcResult<CraftSummary> {
    let tree = expand_with_limit(catalog, item, quantity, max_depth)?;
    let totals = aggregate(&tree)?
        .into_iter()
        .map(|(id, quantity)| {
            let recipe = catalog.lookup(&id);
            TotalLine {
                name: display_name(&id),
                tier: recipe.and_then(|r| r.tier),
                icon: recipe.and_then(|r| r.icon.clone()),
                id,
                quantity,
            }
        })
        .collect();

    Ok(CraftSummary {
        item: item.to_string(),
        quantity,
        tree,
        totals,
    })
}

impl std::fmt::Display for CraftSummary {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        writeln!(f, "=== Raw Resources ===")?;
        writeln!(f, "Target: {}x {}", self.quantity, display_name(&self.item))?;
        writeln!(f)?;

        writeln!(f, "{:<30} {:>10} {:>8}  {}", "Item", "Quantity", "Tier", "Icon")?;
        writeln!(f, "{}", "-".repeat(60))?;
        for line in &self.totals {
            writeln!(
                f,
                "{:<30} {:>10} {:>8}  {}",
                line.name,
                line.quantity,
                tier_label(line.tier),
                line.icon.as_deref().unwrap_or("?")
            )?;
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::RecipeDefinition;

    fn entry(id: &str, recipe: RecipeDefinition) -> (String, RecipeDefinition) {
        (id.to_string(), recipe)
    }

    fn furniture() -> RecipeCatalog {
        RecipeCatalog::new([
            entry("plank", RecipeDefinition::raw().with_ingredient("wood", 2)),
            entry("table", RecipeDefinition::raw().with_ingredient("plank", 4)),
            entry("wood", RecipeDefinition::raw()),
        ])
        .unwrap()
    }

    fn furniture_with_glue() -> RecipeCatalog {
        RecipeCatalog::new([
            entry("plank", RecipeDefinition::raw().with_ingredient("wood", 2)),
            entry("glue", RecipeDefinition::raw().with_ingredient("wood", 1)),
            entry(
                "table",
                RecipeDefinition::raw()
                    .with_ingredient("plank", 4)
                    .with_ingredient("glue", 2),
            ),
            entry("wood", RecipeDefinition::raw().with_tier(1).with_icon("img/wood.png")),
        ])
        .unwrap()
    }

    /// Every node's quantity is the root quantity times all multipliers on its path
    fn assert_multiplicative(catalog: &RecipeCatalog, node: &TreeNode) {
        let Some(recipe) = catalog.lookup(&node.id) else {
            return;
        };
        for child in &node.children {
            let amount = recipe
                .requires
                .iter()
                .find(|i| i.id == child.id)
                .map(|i| i.amount)
                .unwrap();
            assert_eq!(child.quantity, node.quantity * amount, "at {}", child.id);
            assert_multiplicative(catalog, child);
        }
    }

    /// A node is a leaf exactly when its id is not craftable
    fn assert_leaf_iff_raw(catalog: &RecipeCatalog, node: &TreeNode) {
        assert_eq!(node.is_leaf(), !catalog.is_craftable(&node.id), "at {}", node.id);
        for child in &node.children {
            assert_leaf_iff_raw(catalog, child);
        }
    }

    #[test]
    fn test_expand_table() {
        let catalog = furniture();
        let root = expand(&catalog, "table", 3).unwrap();

        assert_eq!(root.id, "table");
        assert_eq!(root.quantity, 3);
        assert_eq!(root.children.len(), 1);

        let plank = &root.children[0];
        assert_eq!(plank.id, "plank");
        assert_eq!(plank.quantity, 12);

        let wood = &plank.children[0];
        assert_eq!(wood.id, "wood");
        assert_eq!(wood.quantity, 24);
        assert!(wood.is_leaf());

        let totals = aggregate(&root).unwrap();
        assert_eq!(totals.len(), 1);
        assert_eq!(totals["wood"], 24);
    }

    #[test]
    fn test_shared_ingredient_is_summed() {
        let catalog = furniture_with_glue();
        let root = expand(&catalog, "table", 1).unwrap();
        let totals = aggregate(&root).unwrap();

        assert_eq!(totals["wood"], 10);
        assert_eq!(totals.len(), 1);
        assert!(!totals.contains_key("plank"));
        assert!(!totals.contains_key("glue"));
    }

    #[test]
    fn test_children_follow_requirement_order() {
        let catalog = furniture_with_glue();
        let root = expand(&catalog, "table", 1).unwrap();
        let ids: Vec<_> = root.children.iter().map(|c| c.id.as_str()).collect();
        assert_eq!(ids, vec!["plank", "glue"]);
    }

    #[test]
    fn test_missing_ingredient_is_raw() {
        let catalog = RecipeCatalog::new([entry(
            "torch",
            RecipeDefinition::raw()
                .with_ingredient("stick", 1)
                .with_ingredient("coal", 2),
        )])
        .unwrap();

        let root = expand(&catalog, "torch", 5).unwrap();
        assert_eq!(root.children.len(), 2);
        assert!(root.children.iter().all(TreeNode::is_leaf));

        let totals = aggregate(&root).unwrap();
        assert_eq!(totals["stick"], 5);
        assert_eq!(totals["coal"], 10);
    }

    #[test]
    fn test_unknown_root() {
        let catalog = furniture();
        match expand(&catalog, "nonexistent_item", 5) {
            Err(CalcError::UnknownItem(id)) => assert_eq!(id, "nonexistent_item"),
            other => panic!("unexpected result: {other:?}"),
        }
    }

    #[test]
    fn test_raw_root_is_single_leaf() {
        let catalog = furniture();
        let root = expand(&catalog, "wood", 7).unwrap();
        assert!(root.is_leaf());
        assert_eq!(aggregate(&root).unwrap()["wood"], 7);
    }

    #[test]
    fn test_zero_quantity_rejected() {
        let catalog = furniture();
        assert!(matches!(expand(&catalog, "table", 0), Err(CalcError::InvalidQuantity)));
    }

    #[test]
    fn test_depth_bound() {
        let catalog = furniture();
        assert!(expand_with_limit(&catalog, "table", 1, 1).is_ok());

        match expand_with_limit(&catalog, "table", 1, 0) {
            Err(CalcError::DepthExceeded { item, limit }) => {
                assert_eq!(item, "plank");
                assert_eq!(limit, 0);
            }
            other => panic!("unexpected result: {other:?}"),
        }
    }

    #[test]
    fn test_overflow_is_reported() {
        let catalog = RecipeCatalog::new([
            entry("a", RecipeDefinition::raw().with_ingredient("b", u64::MAX)),
            entry("b", RecipeDefinition::raw().with_ingredient("ore", 1)),
        ])
        .unwrap();

        assert!(expand(&catalog, "a", 1).is_ok());
        assert!(matches!(
            expand(&catalog, "a", 2),
            Err(CalcError::QuantityOverflow { .. })
        ));
    }

    #[test]
    fn test_total_overflow_is_reported() {
        let catalog = RecipeCatalog::new([
            entry(
                "a",
                RecipeDefinition::raw()
                    .with_ingredient("ore", u64::MAX)
                    .with_ingredient("b", 1),
            ),
            entry("b", RecipeDefinition::raw().with_ingredient("ore", 1)),
        ])
        .unwrap();

        // Every node fits in u64; only the summed ore total does not
        let root = expand(&catalog, "a", 1).unwrap();
        match aggregate(&root) {
            Err(CalcError::QuantityOverflow { item }) => assert_eq!(item, "ore"),
            other => panic!("unexpected result: {other:?}"),
        }
        assert!(matches!(
            summarize(&catalog, "a", 1, DEFAULT_MAX_DEPTH),
            Err(CalcError::QuantityOverflow { .. })
        ));
    }

    #[test]
    fn test_tree_properties_on_diamond() {
        let catalog = RecipeCatalog::new([
            entry(
                "engine",
                RecipeDefinition::raw()
                    .with_ingredient("piston", 4)
                    .with_ingredient("block", 1)
                    .with_ingredient("bolt", 16),
            ),
            entry(
                "piston",
                RecipeDefinition::raw()
                    .with_ingredient("steel", 2)
                    .with_ingredient("bolt", 3),
            ),
            entry("block", RecipeDefinition::raw().with_ingredient("steel", 10)),
            entry(
                "steel",
                RecipeDefinition::raw()
                    .with_ingredient("iron_ore", 3)
                    .with_ingredient("coal", 1),
            ),
            entry("bolt", RecipeDefinition::raw()),
        ])
        .unwrap();

        let root = expand(&catalog, "engine", 2).unwrap();
        assert_multiplicative(&catalog, &root);
        assert_leaf_iff_raw(&catalog, &root);

        // steel: 2 * (4*2 + 10) = 36
        let totals = aggregate(&root).unwrap();
        assert_eq!(totals["iron_ore"], 108);
        assert_eq!(totals["coal"], 36);
        // bolt: 2 * (16 + 4*3) = 56
        assert_eq!(totals["bolt"], 56);
        assert_eq!(totals.len(), 3);
    }

    #[test]
    fn test_aggregate_is_idempotent() {
        let catalog = furniture_with_glue();
        let root = expand(&catalog, "table", 4).unwrap();
        assert_eq!(aggregate(&root).unwrap(), aggregate(&root).unwrap());
    }

    #[test]
    fn test_format_tree() {
        let catalog = furniture();
        let root = expand(&catalog, "table", 1).unwrap();
        assert_eq!(format_tree(&root, 0), "table : 1\n  plank : 4\n    wood : 8\n");
    }

    #[test]
    fn test_summarize_attaches_metadata() {
        let catalog = furniture_with_glue();
        let summary = summarize(&catalog, "table", 2, DEFAULT_MAX_DEPTH).unwrap();

        assert_eq!(summary.totals.len(), 1);
        let wood = &summary.totals[0];
        assert_eq!(wood.quantity, 20);
        assert_eq!(wood.tier, Some(1));
        assert_eq!(wood.icon.as_deref(), Some("img/wood.png"));

        let text = summary.to_string();
        assert!(text.contains("Target: 2x table"));
        assert!(text.contains("Tier 1"));
    }
}
