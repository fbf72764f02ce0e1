//! Derivation graph: one node per item occurrence, stored in an arena

use std::fmt::{self, Write};

use crate::rules::is_base_item;

/// Index of a node inside its [`DerivationGraph`]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct NodeId(pub usize);

impl fmt::Display for NodeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// The two ingredient nodes of one recipe alternative
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Combination {
    pub first: NodeId,
    pub second: NodeId,
}

impl Combination {
    pub fn ingredients(&self) -> [NodeId; 2] {
        [self.first, self.second]
    }
}

/// One occurrence of an item within a derivation context
#[derive(Debug, Clone)]
pub struct GraphNode {
    /// Item name
    pub item: String,

    /// Recipe alternatives, each linking two ingredient nodes
    pub combinations: Vec<Combination>,

    /// Node whose combination this node fills (None for the root)
    pub parent: Option<NodeId>,

    /// Item recurs among its own ancestors; never expanded
    pub is_cycle: bool,
}

impl GraphNode {
    pub fn new(item: impl Into<String>, parent: Option<NodeId>) -> Self {
        Self {
            item: item.into(),
            combinations: Vec::new(),
            parent,
            is_cycle: false,
        }
    }

    pub fn cycle(item: impl Into<String>, parent: NodeId) -> Self {
        Self {
            is_cycle: true,
            ..Self::new(item, Some(parent))
        }
    }

    pub fn is_leaf(&self) -> bool {
        self.combinations.is_empty()
    }
}

/// Bounded acyclic expansion of the combination graph from one target
///
/// Children are owned top-down through combination indices; the parent link
/// is a non-owning back-reference used for ancestry walks and backward search.
/// The graph is immutable once built and can be shared across threads.
#[derive(Debug, Clone)]
pub struct DerivationGraph {
    nodes: Vec<GraphNode>,
    root: NodeId,
    truncated: bool,
}

impl DerivationGraph {
    /// Create a graph holding only the root node
    pub fn with_root(target: impl Into<String>) -> Self {
        Self {
            nodes: vec![GraphNode::new(target, None)],
            root: NodeId(0),
            truncated: false,
        }
    }

    pub fn root(&self) -> NodeId {
        self.root
    }

    pub fn root_node(&self) -> &GraphNode {
        self.node(self.root)
    }

    /// Target item the graph was built for
    pub fn target(&self) -> &str {
        &self.root_node().item
    }

    /// Node by id. Ids are only handed out by this graph, so lookups are infallible.
    pub fn node(&self, id: NodeId) -> &GraphNode {
        &self.nodes[id.0]
    }

    pub fn get(&self, id: NodeId) -> Option<&GraphNode> {
        self.nodes.get(id.0)
    }

    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    /// Whether the build stopped expanding because it hit its node budget
    pub fn is_truncated(&self) -> bool {
        self.truncated
    }

    pub(crate) fn mark_truncated(&mut self) {
        self.truncated = true;
    }

    pub(crate) fn push(&mut self, node: GraphNode) -> NodeId {
        let id = NodeId(self.nodes.len());
        self.nodes.push(node);
        id
    }

    pub(crate) fn add_combination(&mut self, parent: NodeId, combination: Combination) {
        self.nodes[parent.0].combinations.push(combination);
    }

    /// Iterate all node ids in creation (breadth-first) order
    pub fn ids(&self) -> impl Iterator<Item = NodeId> {
        (0..self.nodes.len()).map(NodeId)
    }

    /// Strict ancestors of a node, nearest first
    pub fn ancestors(&self, id: NodeId) -> impl Iterator<Item = NodeId> + '_ {
        std::iter::successors(self.node(id).parent, move |current| {
            self.node(*current).parent
        })
    }

    /// Check if `name` is the item of `id` or of any of its ancestors
    pub fn lineage_contains(&self, id: NodeId, name: &str) -> bool {
        self.node(id).item == name || self.ancestors(id).any(|a| self.node(a).item == name)
    }

    /// Number of edges between the root and `id`
    pub fn depth_of(&self, id: NodeId) -> usize {
        self.ancestors(id).count()
    }

    /// All ingredient nodes of all combinations of `id`, in recipe order
    pub fn children(&self, id: NodeId) -> impl Iterator<Item = NodeId> + '_ {
        self.node(id)
            .combinations
            .iter()
            .flat_map(|c| c.ingredients())
    }

    /// Non-cycle leaves whose item is a base item, in depth-first order
    ///
    /// Cycle subtrees are skipped entirely.
    pub fn base_leaves(&self) -> Vec<NodeId> {
        let mut leaves = Vec::new();
        let mut stack = vec![self.root];

        while let Some(id) = stack.pop() {
            let node = self.node(id);
            if node.is_cycle {
                continue;
            }
            if node.is_leaf() && is_base_item(&node.item) {
                leaves.push(id);
            }
            // Reverse so the first ingredient is visited first
            let children: Vec<NodeId> = self.children(id).collect();
            stack.extend(children.into_iter().rev());
        }

        leaves
    }

    /// Number of cycle-flagged nodes
    pub fn cycle_count(&self) -> usize {
        self.nodes.iter().filter(|n| n.is_cycle).count()
    }

    /// Indented text view of the whole graph, one group per recipe alternative
    pub fn render(&self) -> String {
        let mut out = String::new();
        let _ = writeln!(out, "{}", self.label(self.root));
        self.render_node(self.root, "", &mut out);
        out
    }

    fn label(&self, id: NodeId) -> String {
        let node = self.node(id);
        if node.is_cycle {
            format!("{} (cycle)", node.item)
        } else {
            node.item.clone()
        }
    }

    fn render_node(&self, id: NodeId, prefix: &str, out: &mut String) {
        let combinations = &self.node(id).combinations;
        for (i, combo) in combinations.iter().enumerate() {
            let last = i + 1 == combinations.len();
            let (branch, extension) = if last {
                ("└── ", "    ")
            } else {
                ("├── ", "│   ")
            };
            let _ = writeln!(
                out,
                "{}{}{} + {}",
                prefix,
                branch,
                self.node(combo.first).item,
                self.node(combo.second).item
            );

            let group_prefix = format!("{}{}", prefix, extension);
            for (j, ingredient) in combo.ingredients().into_iter().enumerate() {
                let (branch, extension) = if j == 1 {
                    ("└── ", "    ")
                } else {
                    ("├── ", "│   ")
                };
                let _ = writeln!(out, "{}{}{}", group_prefix, branch, self.label(ingredient));
                self.render_node(ingredient, &format!("{}{}", group_prefix, extension), out);
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn small_graph() -> DerivationGraph {
        // Mud = Water + Earth, second alternative cycles back to Mud
        let mut graph = DerivationGraph::with_root("Mud");
        let root = graph.root();
        let water = graph.push(GraphNode::new("Water", Some(root)));
        let earth = graph.push(GraphNode::new("Earth", Some(root)));
        graph.add_combination(root, Combination { first: water, second: earth });
        let mud = graph.push(GraphNode::cycle("Mud", root));
        let fire = graph.push(GraphNode::new("Fire", Some(root)));
        graph.add_combination(root, Combination { first: mud, second: fire });
        graph
    }

    #[test]
    fn test_ancestry() {
        let graph = small_graph();
        let water = NodeId(1);

        assert_eq!(graph.depth_of(graph.root()), 0);
        assert_eq!(graph.depth_of(water), 1);
        assert_eq!(graph.ancestors(water).collect::<Vec<_>>(), vec![graph.root()]);
        assert!(graph.lineage_contains(water, "Mud"));
        assert!(graph.lineage_contains(water, "Water"));
        assert!(!graph.lineage_contains(water, "Earth"));
    }

    #[test]
    fn test_base_leaves_skip_cycles() {
        let graph = small_graph();
        let names: Vec<&str> = graph
            .base_leaves()
            .into_iter()
            .map(|id| graph.node(id).item.as_str())
            .collect();

        assert_eq!(names, vec!["Water", "Earth", "Fire"]);
        assert_eq!(graph.cycle_count(), 1);
    }

    #[test]
    fn test_render_marks_cycles() {
        let graph = small_graph();
        let text = graph.render();

        assert!(text.starts_with("Mud\n"));
        assert!(text.contains("Water + Earth"));
        assert!(text.contains("Mud (cycle)"));
    }
}
