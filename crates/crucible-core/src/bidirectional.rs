//! Meet-in-the-middle search between the target and its base leaves
//!
//! The forward frontier grows from the root through combinations; the
//! backward frontier grows from base leaves through parent links. Both
//! advance one level per round. The first round in which the frontiers
//! touch decides the result; later rounds are never explored even if
//! they would yield a shallower tree.

use std::collections::{HashMap, HashSet};

use crate::context::SearchContext;
use crate::graph::NodeId;
use crate::tree::{PathResult, RecipeNode};

/// A node reached by both frontiers
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MeetingPoint {
    pub node: NodeId,
    pub forward_depth: usize,
    pub backward_depth: usize,

    /// Base leaf the backward frontier reached this node from
    pub base_leaf: NodeId,
}

impl MeetingPoint {
    pub fn total_depth(&self) -> usize {
        self.forward_depth + self.backward_depth
    }
}

/// Where the two frontiers met and the joined root-to-leaf chain
#[derive(Debug, Clone)]
pub struct Meeting {
    pub point: MeetingPoint,
    pub chain: Vec<NodeId>,
    pub nodes_visited: usize,
    pub rounds: usize,
}

/// One side of the search
struct Frontier {
    level: Vec<NodeId>,
    depth: HashMap<NodeId, usize>,
    /// Node each entry was first reached from
    via: HashMap<NodeId, NodeId>,
    origin: HashMap<NodeId, NodeId>,
}

impl Frontier {
    fn seeded(starts: impl IntoIterator<Item = NodeId>) -> Self {
        let mut frontier = Self {
            level: Vec::new(),
            depth: HashMap::new(),
            via: HashMap::new(),
            origin: HashMap::new(),
        };
        for id in starts {
            if frontier.depth.insert(id, 0).is_none() {
                frontier.origin.insert(id, id);
                frontier.level.push(id);
            }
        }
        frontier
    }

    fn contains(&self, id: NodeId) -> bool {
        self.depth.contains_key(&id)
    }

    fn depth(&self, id: NodeId) -> usize {
        self.depth.get(&id).copied().unwrap_or_default()
    }

    fn is_exhausted(&self) -> bool {
        self.level.is_empty()
    }

    fn len(&self) -> usize {
        self.depth.len()
    }

    /// Expand the current level, returning the newly reached nodes in order
    fn advance<I>(&mut self, mut neighbours: impl FnMut(NodeId) -> I) -> Vec<NodeId>
    where
        I: IntoIterator<Item = NodeId>,
    {
        let current = std::mem::take(&mut self.level);
        let mut reached = Vec::new();

        for from in current {
            let depth = self.depth(from) + 1;
            let origin = self.origin.get(&from).copied().unwrap_or(from);
            for next in neighbours(from) {
                if self.contains(next) {
                    continue;
                }
                self.depth.insert(next, depth);
                self.via.insert(next, from);
                self.origin.insert(next, origin);
                reached.push(next);
            }
        }

        self.level = reached.clone();
        reached
    }
}

/// Bidirectional search over a built derivation graph
pub struct BidirectionalSolver;

impl BidirectionalSolver {
    /// Search from every base leaf of the graph
    pub fn search(ctx: &SearchContext<'_>) -> Option<PathResult> {
        Self::search_from(ctx, &ctx.graph.base_leaves())
    }

    /// Search with the backward frontier seeded from `leaves` only
    pub fn search_from(ctx: &SearchContext<'_>, leaves: &[NodeId]) -> Option<PathResult> {
        let root = ctx.graph.root_node();
        if root.is_cycle {
            return None;
        }
        if ctx.rules.is_base(&root.item) {
            return Some(PathResult::new(RecipeNode::leaf(&root.item), 1));
        }

        let meeting = Self::find_meeting(ctx, leaves)?;
        let tree = ctx.materializer().materialize_complete(&meeting.chain);
        if tree.is_none() {
            tracing::debug!(
                "Discarding meeting point {} for {}: chain does not materialize",
                meeting.point.node,
                root.item
            );
        }
        Some(PathResult::new(tree?, meeting.nodes_visited))
    }

    /// Search from all leaves, then retry each leaf on its own until one succeeds
    pub fn search_with_retry(ctx: &SearchContext<'_>) -> Option<PathResult> {
        let leaves = ctx.graph.base_leaves();
        if let Some(result) = Self::search_from(ctx, &leaves) {
            return Some(result);
        }

        for &leaf in &leaves {
            if ctx.is_cancelled() {
                return None;
            }
            if let Some(result) = Self::search_from(ctx, &[leaf]) {
                return Some(result);
            }
        }

        tracing::debug!(
            "Bidirectional search for {} failed from all {} leaves",
            ctx.graph.target(),
            leaves.len()
        );
        None
    }

    /// Run both frontiers until they meet and join the chain through the best meeting point
    pub fn find_meeting(ctx: &SearchContext<'_>, leaves: &[NodeId]) -> Option<Meeting> {
        let graph = ctx.graph;
        let leaves: Vec<NodeId> = leaves
            .iter()
            .copied()
            .filter(|&id| graph.get(id).is_some_and(|n| !n.is_cycle))
            .collect();
        if leaves.is_empty() {
            tracing::debug!("No base leaves to search back from in {}", graph.target());
            return None;
        }

        let mut forward = Frontier::seeded([graph.root()]);
        let mut backward = Frontier::seeded(leaves);
        let mut rounds = 0usize;

        while !(forward.is_exhausted() && backward.is_exhausted()) {
            if ctx.is_cancelled() {
                return None;
            }
            rounds += 1;

            let reached_forward = forward.advance(|id| {
                graph
                    .children(id)
                    .filter(|&child| !graph.node(child).is_cycle)
                    .collect::<Vec<_>>()
            });
            let reached_backward = backward.advance(|id| graph.node(id).parent);

            let mut seen = HashSet::new();
            let candidates: Vec<MeetingPoint> = reached_forward
                .iter()
                .chain(&reached_backward)
                .copied()
                .filter(|&id| forward.contains(id) && backward.contains(id) && seen.insert(id))
                .map(|id| MeetingPoint {
                    node: id,
                    forward_depth: forward.depth(id),
                    backward_depth: backward.depth(id),
                    base_leaf: backward.origin.get(&id).copied().unwrap_or(id),
                })
                .collect();

            let Some(point) = Self::best_point(&candidates) else {
                continue;
            };

            tracing::debug!(
                "Frontiers met at {} ({}) in round {}: forward {}, backward {}, {} candidates",
                graph.node(point.node).item,
                point.node,
                rounds,
                point.forward_depth,
                point.backward_depth,
                candidates.len()
            );

            return Some(Meeting {
                chain: Self::join(&forward, &backward, point.node),
                point,
                nodes_visited: forward.len() + backward.len(),
                rounds,
            });
        }

        tracing::debug!("Frontiers never met for {}", graph.target());
        None
    }

    /// Same-round tie-break: smaller backward depth, then first recorded
    fn best_point(candidates: &[MeetingPoint]) -> Option<MeetingPoint> {
        candidates.iter().min_by_key(|p| p.backward_depth).copied()
    }

    /// Root → meeting point via forward links, then meeting point → leaf via backward links
    fn join(forward: &Frontier, backward: &Frontier, meeting: NodeId) -> Vec<NodeId> {
        let mut chain = vec![meeting];
        let mut current = meeting;
        while let Some(&previous) = forward.via.get(&current) {
            chain.push(previous);
            current = previous;
        }
        chain.reverse();

        let mut current = meeting;
        while let Some(&next) = backward.via.get(&current) {
            chain.push(next);
            current = next;
        }
        chain
    }
}
