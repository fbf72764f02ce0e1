//! Single-path solvers over a built derivation graph

use std::collections::{HashMap, HashSet, VecDeque};

use crate::context::SearchContext;
use crate::graph::{Combination, DerivationGraph, NodeId};
use crate::limits::MAX_TREE_NODES;
use crate::tree::{PathResult, RecipeNode};

/// A resolved subtree and the number of recipes it applies
#[derive(Debug, Clone)]
struct Resolved {
    tree: RecipeNode,
    cost: usize,
}

/// Outcome of evaluating one node during the DFS
struct Evaluation {
    resolved: Option<Resolved>,

    /// The outcome depended on which items were on the recursion stack
    stack_sensitive: bool,
}

impl Evaluation {
    fn found(resolved: Resolved) -> Self {
        Self {
            resolved: Some(resolved),
            stack_sensitive: false,
        }
    }

    fn failed(stack_sensitive: bool) -> Self {
        Self {
            resolved: None,
            stack_sensitive,
        }
    }
}

/// Memoized depth-first search state for one invocation
struct DfsState<'a> {
    ctx: SearchContext<'a>,
    seed: Option<usize>,
    memo: HashMap<&'a str, Option<Resolved>>,
    on_stack: HashSet<&'a str>,
    visited: usize,
}

impl<'a> DfsState<'a> {
    fn new(ctx: &SearchContext<'a>, seed: Option<usize>) -> Self {
        Self {
            ctx: ctx.clone(),
            seed,
            memo: HashMap::new(),
            on_stack: HashSet::new(),
            visited: 0,
        }
    }

    fn evaluate(&mut self, id: NodeId) -> Evaluation {
        let graph = self.ctx.graph;
        let node = graph.node(id);
        let item = node.item.as_str();

        if self.ctx.is_cancelled() {
            return Evaluation::failed(true);
        }
        if node.is_cycle || self.on_stack.contains(item) {
            return Evaluation::failed(true);
        }
        if self.ctx.rules.is_base(item) {
            return Evaluation::found(Resolved {
                tree: RecipeNode::leaf(item),
                cost: 0,
            });
        }

        let pinned = match self.seed {
            Some(seed) if id == graph.root() => Some(seed),
            _ => None,
        };

        if pinned.is_none() {
            if let Some(hit) = self.memo.get(item) {
                match hit {
                    None => return Evaluation::failed(false),
                    Some(resolved)
                        if !resolved
                            .tree
                            .items()
                            .iter()
                            .any(|i| self.on_stack.contains(i)) =>
                    {
                        return Evaluation::found(resolved.clone());
                    }
                    // Memoized tree uses an item that is now on the stack
                    Some(_) => {}
                }
            }
        }

        self.visited += 1;
        if node.combinations.is_empty() {
            // An unexpanded node of a truncated graph may be expandable elsewhere
            return Evaluation::failed(graph.is_truncated());
        }

        let combinations: &'a [Combination] = match pinned {
            Some(seed) => node.combinations.get(seed..=seed).unwrap_or(&[]),
            None => &node.combinations,
        };

        self.on_stack.insert(item);
        let mut best: Option<Resolved> = None;
        let mut stack_sensitive = false;

        for combo in combinations {
            let first = self.evaluate(combo.first);
            stack_sensitive |= first.stack_sensitive;
            let Some(first) = first.resolved else {
                continue;
            };

            let second = self.evaluate(combo.second);
            stack_sensitive |= second.stack_sensitive;
            let Some(second) = second.resolved else {
                continue;
            };

            let cost = first.cost + second.cost + 1;
            if 2 * cost + 1 > MAX_TREE_NODES {
                continue;
            }
            if best.as_ref().map_or(true, |b| cost < b.cost) {
                best = Some(Resolved {
                    tree: RecipeNode::with_recipe(item, first.tree, second.tree),
                    cost,
                });
            }
        }
        self.on_stack.remove(item);

        if pinned.is_none() && !stack_sensitive && !self.ctx.is_cancelled() {
            self.memo.insert(item, best.clone());
        }

        Evaluation {
            resolved: best,
            stack_sensitive,
        }
    }
}

/// Single-path search strategies
pub struct SinglePathSolver;

impl SinglePathSolver {
    /// Breadth-first search returning the first base item whose chain materializes
    pub fn bfs_first(ctx: &SearchContext<'_>) -> Option<PathResult> {
        Self::bfs(ctx, None)
    }

    /// Breadth-first search with the root restricted to its `seed`-th recipe
    pub fn bfs_seeded(ctx: &SearchContext<'_>, seed: usize) -> Option<PathResult> {
        Self::bfs(ctx, Some(seed))
    }

    /// Depth-first search for the tree applying the fewest recipes
    pub fn dfs_shortest(ctx: &SearchContext<'_>) -> Option<PathResult> {
        Self::dfs(ctx, None)
    }

    /// Depth-first search with the root restricted to its `seed`-th recipe
    pub fn dfs_seeded(ctx: &SearchContext<'_>, seed: usize) -> Option<PathResult> {
        Self::dfs(ctx, Some(seed))
    }

    /// Chain of node ids from the root down to `end`
    pub fn reconstruct_chain(graph: &DerivationGraph, end: NodeId) -> Vec<NodeId> {
        let mut chain: Vec<NodeId> = graph.ancestors(end).collect();
        chain.reverse();
        chain.push(end);
        chain
    }

    /// Trivial result when the target is itself a base item
    fn trivial(ctx: &SearchContext<'_>) -> Option<PathResult> {
        let root = ctx.graph.root_node();
        ctx.rules
            .is_base(&root.item)
            .then(|| PathResult::new(RecipeNode::leaf(&root.item), 1))
    }

    fn bfs(ctx: &SearchContext<'_>, seed: Option<usize>) -> Option<PathResult> {
        let graph = ctx.graph;
        let root = graph.root();
        let root_node = graph.root_node();

        if root_node.is_cycle {
            return None;
        }
        if let Some(result) = Self::trivial(ctx) {
            return Some(result);
        }
        if seed.is_some_and(|s| s >= root_node.combinations.len()) {
            tracing::debug!("Seed {:?} out of range for {}", seed, root_node.item);
            return None;
        }

        let materializer = ctx.materializer().pin_root_recipe(seed);
        let mut queue: VecDeque<NodeId> = VecDeque::from([root]);
        let mut visited = 0usize;
        let mut attempts = 0usize;

        while let Some(current) = queue.pop_front() {
            if ctx.is_cancelled() {
                return None;
            }
            visited += 1;
            let node = graph.node(current);

            if current != root && ctx.rules.is_base(&node.item) {
                attempts += 1;
                let chain = Self::reconstruct_chain(graph, current);
                if let Some(tree) = materializer.materialize_complete(&chain) {
                    tracing::debug!(
                        "BFS reached {} at depth {} after {} nodes",
                        node.item,
                        chain.len() - 1,
                        visited
                    );
                    return Some(PathResult::new(tree, visited));
                }
                continue;
            }

            let combinations = match seed {
                Some(seed) if current == root => &node.combinations[seed..=seed],
                _ => &node.combinations[..],
            };
            for combo in combinations {
                for child in combo.ingredients() {
                    if !graph.node(child).is_cycle {
                        queue.push_back(child);
                    }
                }
            }
        }

        tracing::debug!(
            "BFS exhausted {} after {} nodes ({} candidate leaves)",
            root_node.item,
            visited,
            attempts
        );
        None
    }

    fn dfs(ctx: &SearchContext<'_>, seed: Option<usize>) -> Option<PathResult> {
        let graph = ctx.graph;
        if graph.root_node().is_cycle {
            return None;
        }
        if let Some(result) = Self::trivial(ctx) {
            return Some(result);
        }

        let mut state = DfsState::new(ctx, seed);
        let evaluation = state.evaluate(graph.root());
        if ctx.is_cancelled() {
            return None;
        }

        match evaluation.resolved {
            Some(resolved) => {
                tracing::debug!(
                    "DFS resolved {} with {} recipes after {} nodes",
                    graph.target(),
                    resolved.cost,
                    state.visited
                );
                Some(PathResult::new(resolved.tree, state.visited))
            }
            None => {
                tracing::debug!("DFS found no path for {}", graph.target());
                None
            }
        }
    }
}
