//! Materialized recipe trees and search results

use serde::{Deserialize, Serialize};
use std::collections::{HashSet, VecDeque};
use std::fmt::Write;

/// One item in a materialized recipe tree
///
/// Each node carries at most one recipe; leaves are base items in any
/// tree returned by a solver.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RecipeNode {
    pub item: String,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub recipe: Option<Box<Recipe>>,
}

/// The two ingredients used to build a [`RecipeNode`]
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Recipe {
    pub first: RecipeNode,
    pub second: RecipeNode,
}

/// `{name, children[]}` shape used on the wire
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct WireNode {
    pub name: String,
    pub children: Vec<WireNode>,
}

impl RecipeNode {
    pub fn leaf(item: impl Into<String>) -> Self {
        Self {
            item: item.into(),
            recipe: None,
        }
    }

    pub fn with_recipe(item: impl Into<String>, first: RecipeNode, second: RecipeNode) -> Self {
        Self {
            item: item.into(),
            recipe: Some(Box::new(Recipe { first, second })),
        }
    }

    pub fn is_leaf(&self) -> bool {
        self.recipe.is_none()
    }

    pub fn ingredients(&self) -> Option<[&RecipeNode; 2]> {
        self.recipe.as_deref().map(|r| [&r.first, &r.second])
    }

    /// Level-order item names joined with `|`
    ///
    /// Two trees with the same signature are treated as the same result.
    pub fn signature(&self) -> String {
        let mut names = Vec::new();
        let mut queue = VecDeque::from([self]);
        while let Some(node) = queue.pop_front() {
            names.push(node.item.as_str());
            if let Some(ingredients) = node.ingredients() {
                queue.extend(ingredients);
            }
        }
        names.join("|")
    }

    /// Number of recipes applied to build the root
    pub fn recipe_count(&self) -> usize {
        match self.ingredients() {
            Some([a, b]) => 1 + a.recipe_count() + b.recipe_count(),
            None => 0,
        }
    }

    /// Number of levels on the longest root-to-leaf path
    pub fn depth(&self) -> usize {
        match self.ingredients() {
            Some([a, b]) => 1 + a.depth().max(b.depth()),
            None => 1,
        }
    }

    pub fn node_count(&self) -> usize {
        1 + self
            .ingredients()
            .map_or(0, |[a, b]| a.node_count() + b.node_count())
    }

    /// Leaf item names, left to right
    pub fn leaves(&self) -> Vec<&str> {
        let mut out = Vec::new();
        self.collect_leaves(&mut out);
        out
    }

    fn collect_leaves<'a>(&'a self, out: &mut Vec<&'a str>) {
        match self.ingredients() {
            Some([a, b]) => {
                a.collect_leaves(out);
                b.collect_leaves(out);
            }
            None => out.push(&self.item),
        }
    }

    /// Every distinct item in the tree
    pub fn items(&self) -> HashSet<&str> {
        let mut items = HashSet::new();
        let mut stack = vec![self];
        while let Some(node) = stack.pop() {
            items.insert(node.item.as_str());
            if let Some(ingredients) = node.ingredients() {
                stack.extend(ingredients);
            }
        }
        items
    }

    /// No item repeats along any root-to-leaf path
    pub fn is_acyclic(&self) -> bool {
        fn walk<'a>(node: &'a RecipeNode, lineage: &mut Vec<&'a str>) -> bool {
            if lineage.contains(&node.item.as_str()) {
                return false;
            }
            lineage.push(&node.item);
            let ok = node
                .ingredients()
                .map_or(true, |[a, b]| walk(a, lineage) && walk(b, lineage));
            lineage.pop();
            ok
        }
        walk(self, &mut Vec::new())
    }

    /// Convert into the `{name, children[]}` wire shape
    pub fn to_wire(&self) -> WireNode {
        WireNode {
            name: self.item.clone(),
            children: self
                .ingredients()
                .map(|[a, b]| vec![a.to_wire(), b.to_wire()])
                .unwrap_or_default(),
        }
    }

    /// Indented text view of the tree
    pub fn render(&self) -> String {
        let mut out = String::new();
        let _ = writeln!(out, "{}", self.item);
        self.render_children("", &mut out);
        out
    }

    fn render_children(&self, prefix: &str, out: &mut String) {
        let Some([a, b]) = self.ingredients() else {
            return;
        };
        let _ = writeln!(out, "{}├── {}", prefix, a.item);
        a.render_children(&format!("{}│   ", prefix), out);
        let _ = writeln!(out, "{}└── {}", prefix, b.item);
        b.render_children(&format!("{}    ", prefix), out);
    }
}

/// A found construction path plus the effort spent finding it
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PathResult {
    pub tree: RecipeNode,
    pub nodes_visited: usize,
    pub signature: String,
}

impl PathResult {
    pub fn new(tree: RecipeNode, nodes_visited: usize) -> Self {
        let signature = tree.signature();
        Self {
            tree,
            nodes_visited,
            signature,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn brick() -> RecipeNode {
        RecipeNode::with_recipe(
            "Brick",
            RecipeNode::with_recipe("Mud", RecipeNode::leaf("Water"), RecipeNode::leaf("Earth")),
            RecipeNode::leaf("Fire"),
        )
    }

    #[test]
    fn test_metrics() {
        let tree = brick();
        assert_eq!(tree.recipe_count(), 2);
        assert_eq!(tree.depth(), 3);
        assert_eq!(tree.node_count(), 5);
        assert_eq!(tree.leaves(), vec!["Water", "Earth", "Fire"]);
        assert!(tree.is_acyclic());
    }

    #[test]
    fn test_signature_is_level_order() {
        assert_eq!(brick().signature(), "Brick|Mud|Fire|Water|Earth");
        assert_eq!(RecipeNode::leaf("Air").signature(), "Air");
    }

    #[test]
    fn test_detects_repeated_lineage() {
        let looped = RecipeNode::with_recipe(
            "A",
            RecipeNode::with_recipe("B", RecipeNode::leaf("A"), RecipeNode::leaf("Fire")),
            RecipeNode::leaf("Fire"),
        );
        assert!(!looped.is_acyclic());
    }

    #[test]
    fn test_wire_shape() {
        let wire = serde_json::to_value(brick().to_wire()).unwrap();
        assert_eq!(wire["name"], "Brick");
        assert_eq!(wire["children"][0]["name"], "Mud");
        assert_eq!(wire["children"][0]["children"][1]["name"], "Earth");
        assert_eq!(wire["children"][1]["children"], serde_json::json!([]));
    }

    #[test]
    fn test_render() {
        let text = brick().render();
        assert_eq!(
            text,
            "Brick\n├── Mud\n│   ├── Water\n│   └── Earth\n└── Fire\n"
        );
    }
}
