//! Shared fixtures for unit tests

use crate::graph::{DerivationGraph, NodeId};
use crate::rules::RuleStore;
use crate::tree::RecipeNode;

/// Two ways to make a Brick, one clearly shorter than the other
pub(crate) fn brick_rules() -> RuleStore {
    RuleStore::new()
        .with_recipe("Brick", "Mud", "Fire")
        .with_recipe("Brick", "Clay", "Stone")
        .with_recipe("Mud", "Water", "Earth")
        .with_recipe("Clay", "Mud", "Sand")
        .with_recipe("Stone", "Lava", "Air")
        .with_recipe("Stone", "Earth", "Pressure")
        .with_recipe("Sand", "Earth", "Fire")
        .with_recipe("Lava", "Earth", "Fire")
        .with_recipe("Pressure", "Air", "Air")
}

/// A and B can only be made from each other
pub(crate) fn cycle_rules() -> RuleStore {
    RuleStore::new()
        .with_recipe("A", "B", "Fire")
        .with_recipe("B", "A", "Water")
}

/// Every base item sits three levels down, under P or Q, on both sides
pub(crate) fn diamond_rules() -> RuleStore {
    RuleStore::new()
        .with_recipe("T", "X", "Y")
        .with_recipe("X", "P", "Q")
        .with_recipe("Y", "P", "Q")
        .with_recipe("P", "Fire", "Water")
        .with_recipe("Q", "Earth", "Air")
}

/// First non-cycle leaf node holding `item`
pub(crate) fn find_leaf(graph: &DerivationGraph, item: &str) -> NodeId {
    graph
        .ids()
        .find(|&id| {
            let node = graph.node(id);
            node.item == item && !node.is_cycle && node.is_leaf()
        })
        .unwrap_or_else(|| panic!("no leaf named {item}"))
}

/// Assert the no-cycle and terminal invariants of a returned tree
pub(crate) fn assert_valid_tree(tree: &RecipeNode, rules: &RuleStore) {
    assert!(tree.is_acyclic(), "item repeats along a path:\n{}", tree.render());
    for leaf in tree.leaves() {
        assert!(rules.is_base(leaf), "non-base leaf {leaf}:\n{}", tree.render());
    }
}

/// Number of nodes on the shortest root-to-leaf branch
pub(crate) fn shortest_branch(tree: &RecipeNode) -> usize {
    match tree.ingredients() {
        Some([a, b]) => 1 + shortest_branch(a).min(shortest_branch(b)),
        None => 1,
    }
}
