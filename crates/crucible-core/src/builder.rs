//! Breadth-first derivation graph construction with cycle truncation

use std::collections::VecDeque;

use crate::graph::{Combination, DerivationGraph, GraphNode, NodeId};
use crate::limits::DEFAULT_MAX_GRAPH_NODES;
use crate::rules::RuleStore;

/// Options controlling how far a graph is expanded
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BuildOptions {
    /// Node budget; once reached, queued nodes stay unexpanded
    pub max_nodes: usize,
}

impl Default for BuildOptions {
    fn default() -> Self {
        Self {
            max_nodes: DEFAULT_MAX_GRAPH_NODES,
        }
    }
}

impl BuildOptions {
    pub fn with_max_nodes(mut self, max_nodes: usize) -> Self {
        self.max_nodes = max_nodes.max(1);
        self
    }
}

/// Expands a target item into a [`DerivationGraph`]
pub struct GraphBuilder<'a> {
    rules: &'a RuleStore,
    options: BuildOptions,
}

impl<'a> GraphBuilder<'a> {
    pub fn new(rules: &'a RuleStore) -> Self {
        Self {
            rules,
            options: BuildOptions::default(),
        }
    }

    pub fn with_options(mut self, options: BuildOptions) -> Self {
        self.options = options;
        self
    }

    /// Build the graph for `target`
    ///
    /// Returns None only for an empty target name. Items without recipes
    /// become unexpandable leaves.
    pub fn build(&self, target: &str) -> Option<DerivationGraph> {
        if target.trim().is_empty() {
            tracing::debug!("Refusing to build a graph for an empty target");
            return None;
        }

        let mut graph = DerivationGraph::with_root(target);
        let mut queue: VecDeque<NodeId> = VecDeque::from([graph.root()]);
        let mut expanded = 0usize;
        let mut skipped = 0usize;

        while let Some(current) = queue.pop_front() {
            let node = graph.node(current);
            if node.is_cycle || self.rules.is_base(&node.item) {
                continue;
            }

            let recipes = self.rules.recipes_for(&node.item);
            if recipes.is_empty() {
                tracing::trace!("No recipes for {}, leaving as dead end", node.item);
                continue;
            }

            if graph.len() + 2 * recipes.len() > self.options.max_nodes {
                skipped += 1;
                graph.mark_truncated();
                continue;
            }

            for pair in recipes {
                let first = self.attach(&mut graph, current, &pair.first, &mut queue);
                let second = self.attach(&mut graph, current, &pair.second, &mut queue);
                graph.add_combination(current, Combination { first, second });
            }
            expanded += 1;
        }

        if graph.is_truncated() {
            tracing::warn!(
                "Graph for {} reached its budget of {} nodes; {} nodes left unexpanded",
                target,
                self.options.max_nodes,
                skipped
            );
        }

        tracing::debug!(
            "Built derivation graph for {}: {} nodes, {} expanded, {} cycles",
            target,
            graph.len(),
            expanded,
            graph.cycle_count()
        );

        Some(graph)
    }

    /// Create the child node for one ingredient slot and queue it if it needs expansion
    fn attach(
        &self,
        graph: &mut DerivationGraph,
        parent: NodeId,
        name: &str,
        queue: &mut VecDeque<NodeId>,
    ) -> NodeId {
        if graph.lineage_contains(parent, name) {
            return graph.push(GraphNode::cycle(name, parent));
        }

        let id = graph.push(GraphNode::new(name, Some(parent)));
        if !self.rules.is_base(name) {
            queue.push_back(id);
        }
        id
    }
}

/// Build a graph with default options
pub fn build_graph(target: &str, rules: &RuleStore) -> Option<DerivationGraph> {
    GraphBuilder::new(rules).build(target)
}
