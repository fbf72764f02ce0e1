//! Turns a found node chain into a standalone recipe tree
//!
//! The chain (root → … → base leaf) fixes which graph nodes the path runs
//! through. Every node then gets exactly one recipe: chain nodes prefer
//! recipes that stay on the chain, side branches are resolved one rule at a
//! time down to base items. Cycle nodes never reach the output.

use std::collections::HashSet;

use crate::context::CancellationToken;
use crate::graph::{Combination, DerivationGraph, GraphNode, NodeId};
use crate::limits::MAX_TREE_NODES;
use crate::rules::{IngredientPair, RuleStore};
use crate::tree::RecipeNode;

const CHAIN_SCORE: i32 = 10;
const BASE_SCORE: i32 = 5;

/// Output of a materialization pass
#[derive(Debug, Clone)]
pub struct Materialization {
    pub tree: RecipeNode,

    /// Items left without a recipe because every candidate was cyclic
    pub gaps: Vec<String>,
}

impl Materialization {
    pub fn is_complete(&self) -> bool {
        self.gaps.is_empty()
    }

    /// The tree, only if no item was left without a recipe
    pub fn into_complete(self) -> Option<RecipeNode> {
        self.is_complete().then_some(self.tree)
    }
}

/// Bookkeeping for one materialization pass
struct Pass {
    chain: HashSet<NodeId>,
    gaps: Vec<String>,
    emitted: usize,
}

impl Pass {
    fn admit(&mut self, max: usize) -> Option<()> {
        self.emitted += 1;
        (self.emitted <= max).then_some(())
    }
}

/// Clones a node chain into an independent [`RecipeNode`] tree
pub struct Materializer<'a> {
    graph: &'a DerivationGraph,
    rules: &'a RuleStore,
    cancel: CancellationToken,
    pinned_root: Option<usize>,
    max_nodes: usize,
}

impl<'a> Materializer<'a> {
    pub fn new(graph: &'a DerivationGraph, rules: &'a RuleStore) -> Self {
        Self {
            graph,
            rules,
            cancel: CancellationToken::new(),
            pinned_root: None,
            max_nodes: MAX_TREE_NODES,
        }
    }

    pub fn with_cancellation(mut self, token: CancellationToken) -> Self {
        self.cancel = token;
        self
    }

    /// Force the graph root to use its `index`-th combination
    pub fn pin_root_recipe(mut self, index: Option<usize>) -> Self {
        self.pinned_root = index;
        self
    }

    pub fn with_max_nodes(mut self, max_nodes: usize) -> Self {
        self.max_nodes = max_nodes;
        self
    }

    /// Materialize `chain`, reporting any items left without a recipe
    ///
    /// Returns None for an empty chain, on cancellation, or when the tree
    /// would exceed the node budget.
    pub fn materialize(&self, chain: &[NodeId]) -> Option<Materialization> {
        let &start = chain.first()?;
        let mut pass = Pass {
            chain: chain.iter().copied().collect(),
            gaps: Vec::new(),
            emitted: 0,
        };

        let tree = self.expand_node(start, &mut pass, &mut Vec::new());
        if tree.is_none() && pass.emitted > self.max_nodes {
            tracing::warn!(
                "Materializing {} exceeded the budget of {} nodes",
                self.graph.node(start).item,
                self.max_nodes
            );
        }

        let tree = tree?;
        if !pass.gaps.is_empty() {
            tracing::debug!(
                "Materialized {} with {} gaps: {:?}",
                tree.item,
                pass.gaps.len(),
                pass.gaps
            );
        }
        Some(Materialization {
            tree,
            gaps: pass.gaps,
        })
    }

    /// Materialize `chain` and keep the tree only if it is complete
    pub fn materialize_complete(&self, chain: &[NodeId]) -> Option<RecipeNode> {
        self.materialize(chain)
            .and_then(Materialization::into_complete)
    }

    fn expand_node(
        &self,
        id: NodeId,
        pass: &mut Pass,
        lineage: &mut Vec<&'a str>,
    ) -> Option<RecipeNode> {
        pass.admit(self.max_nodes)?;
        if self.cancel.is_cancelled() {
            return None;
        }

        let node: &'a GraphNode = self.graph.node(id);
        if self.rules.is_base(&node.item) {
            return Some(RecipeNode::leaf(&node.item));
        }

        let on_chain = pass.chain.contains(&id);
        let choice = match self.pinned_root {
            Some(index) if id == self.graph.root() => self.usable(node, index),
            _ => self.best_combination(node, on_chain.then_some(&pass.chain)),
        };

        let Some(combo) = choice else {
            if on_chain {
                return Some(self.gap(&node.item, pass));
            }
            // Side branch with nothing usable in the graph: fall back to the rules
            return self.expand_from_rules(&node.item, pass, lineage);
        };

        lineage.push(&node.item);
        let ingredients = self
            .expand_node(combo.first, pass, lineage)
            .and_then(|first| Some((first, self.expand_node(combo.second, pass, lineage)?)));
        lineage.pop();

        let (first, second) = ingredients?;
        Some(RecipeNode::with_recipe(&node.item, first, second))
    }

    /// The pinned combination, if it exists and has no cycle ingredient
    fn usable(&self, node: &GraphNode, index: usize) -> Option<Combination> {
        node.combinations
            .get(index)
            .copied()
            .filter(|combo| !self.has_cycle(combo))
    }

    fn has_cycle(&self, combo: &Combination) -> bool {
        combo
            .ingredients()
            .iter()
            .any(|&id| self.graph.node(id).is_cycle)
    }

    /// Highest-scoring cycle-free combination; ties keep the earliest
    fn best_combination(
        &self,
        node: &GraphNode,
        chain: Option<&HashSet<NodeId>>,
    ) -> Option<Combination> {
        let mut best: Option<(i32, Combination)> = None;

        for combo in &node.combinations {
            if self.has_cycle(combo) {
                continue;
            }
            let score: i32 = combo
                .ingredients()
                .iter()
                .map(|&id| {
                    let mut score = 0;
                    if chain.is_some_and(|c| c.contains(&id)) {
                        score += CHAIN_SCORE;
                    }
                    if self.rules.is_base(&self.graph.node(id).item) {
                        score += BASE_SCORE;
                    }
                    score
                })
                .sum();

            if best.map_or(true, |(top, _)| score > top) {
                best = Some((score, *combo));
            }
        }

        best.map(|(_, combo)| combo)
    }

    fn expand_from_rules(
        &self,
        item: &'a str,
        pass: &mut Pass,
        lineage: &mut Vec<&'a str>,
    ) -> Option<RecipeNode> {
        let Some(pair) = self.best_pair(item, lineage) else {
            return Some(self.gap(item, pass));
        };

        lineage.push(item);
        let ingredients = self
            .rule_node(&pair.first, pass, lineage)
            .and_then(|first| Some((first, self.rule_node(&pair.second, pass, lineage)?)));
        lineage.pop();

        let (first, second) = ingredients?;
        Some(RecipeNode::with_recipe(item, first, second))
    }

    fn rule_node(
        &self,
        item: &'a str,
        pass: &mut Pass,
        lineage: &mut Vec<&'a str>,
    ) -> Option<RecipeNode> {
        pass.admit(self.max_nodes)?;
        if self.cancel.is_cancelled() {
            return None;
        }
        if self.rules.is_base(item) {
            return Some(RecipeNode::leaf(item));
        }
        self.expand_from_rules(item, pass, lineage)
    }

    /// Best rule-store recipe whose ingredients stay off the current lineage
    fn best_pair(&self, item: &str, lineage: &[&str]) -> Option<&'a IngredientPair> {
        let mut best: Option<(i32, &'a IngredientPair)> = None;

        for pair in self.rules.recipes_for(item) {
            let cyclic = pair
                .names()
                .iter()
                .any(|name| *name == item || lineage.contains(name));
            if cyclic {
                continue;
            }
            let score: i32 = pair
                .names()
                .iter()
                .filter(|name| self.rules.is_base(name))
                .map(|_| BASE_SCORE)
                .sum();

            if best.map_or(true, |(top, _)| score > top) {
                best = Some((score, pair));
            }
        }

        best.map(|(_, pair)| pair)
    }

    fn gap(&self, item: &str, pass: &mut Pass) -> RecipeNode {
        tracing::warn!("No valid recipe for {} (all candidates contain cycles)", item);
        pass.gaps.push(item.to_string());
        RecipeNode::leaf(item)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::builder::{build_graph, BuildOptions, GraphBuilder};
    use crate::testing::{assert_valid_tree, brick_rules, cycle_rules, find_leaf};

    #[test]
    fn test_chain_prefers_on_chain_recipe() {
        let rules = brick_rules();
        let graph = build_graph("Brick", &rules).unwrap();
        let fire = find_leaf(&graph, "Fire");

        let tree = Materializer::new(&graph, &rules)
            .materialize_complete(&[graph.root(), fire])
            .unwrap();

        assert_eq!(tree.signature(), "Brick|Mud|Fire|Water|Earth");
        assert_valid_tree(&tree, &rules);
    }

    #[test]
    fn test_pinned_root_recipe() {
        let rules = brick_rules();
        let graph = build_graph("Brick", &rules).unwrap();

        let tree = Materializer::new(&graph, &rules)
            .pin_root_recipe(Some(1))
            .materialize_complete(&[graph.root()])
            .unwrap();

        let [clay, stone] = tree.ingredients().unwrap();
        assert_eq!(clay.item, "Clay");
        assert_eq!(stone.item, "Stone");
        // Lava+Air and Earth+Pressure tie on score; the first listed wins
        assert_eq!(stone.ingredients().unwrap()[0].item, "Lava");
        assert_valid_tree(&tree, &rules);
    }

    #[test]
    fn test_cycle_only_recipe_leaves_gap() {
        let rules = cycle_rules();
        let graph = build_graph("A", &rules).unwrap();
        let fire = find_leaf(&graph, "Fire");

        let result = Materializer::new(&graph, &rules)
            .materialize(&[graph.root(), fire])
            .unwrap();

        assert!(!result.is_complete());
        assert_eq!(result.gaps, vec!["B".to_string()]);
        assert!(result.tree.is_acyclic());
    }

    #[test]
    fn test_truncated_side_branch_uses_rules() {
        let rules = brick_rules();
        let graph = GraphBuilder::new(&rules)
            .with_options(BuildOptions::default().with_max_nodes(6))
            .build("Brick")
            .unwrap();
        let fire = find_leaf(&graph, "Fire");

        let tree = Materializer::new(&graph, &rules)
            .materialize_complete(&[graph.root(), fire])
            .unwrap();

        assert_eq!(tree.signature(), "Brick|Mud|Fire|Water|Earth");
    }

    #[test]
    fn test_budget_and_cancellation() {
        let rules = brick_rules();
        let graph = build_graph("Brick", &rules).unwrap();

        let tiny = Materializer::new(&graph, &rules).with_max_nodes(2);
        assert!(tiny.materialize(&[graph.root()]).is_none());

        let token = CancellationToken::new();
        token.cancel();
        let cancelled = Materializer::new(&graph, &rules).with_cancellation(token);
        assert!(cancelled.materialize(&[graph.root()]).is_none());

        assert!(Materializer::new(&graph, &rules).materialize(&[]).is_none());
    }
}
