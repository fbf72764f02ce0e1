//! Search engine traits

use std::sync::Arc;

use async_trait::async_trait;
use crucible_core::{Algorithm, PathResult, RuleStore, SearchMode, SearchRequest, WireNode};
use serde::Serialize;

pub use crate::error::{SearchError, SearchResult as Result};

/// Everything a search produced for one request
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SearchOutcome {
    pub target: String,
    pub algorithm: Algorithm,

    /// Mode the search actually ran in
    pub mode: SearchMode,

    /// Paths found; at most one in single mode
    pub paths: Vec<PathResult>,

    /// Size of the derivation graph the paths were searched in
    pub graph_nodes: usize,

    /// The graph hit its node budget
    pub truncated: bool,

    /// A multi-path run stopped at its wall-clock limit
    pub timed_out: bool,
}

impl SearchOutcome {
    pub fn is_empty(&self) -> bool {
        self.paths.is_empty()
    }

    pub fn first(&self) -> Option<&PathResult> {
        self.paths.first()
    }

    /// Nodes visited, one entry per path
    pub fn nodes_visited(&self) -> Vec<usize> {
        self.paths.iter().map(|p| p.nodes_visited).collect()
    }

    /// Trees in the `{name, children[]}` wire shape
    pub fn wire_trees(&self) -> Vec<WireNode> {
        self.paths.iter().map(|p| p.tree.to_wire()).collect()
    }
}

/// Trait for recipe search engines
#[async_trait]
pub trait SearchEngine: Send + Sync {
    /// Run a search request against a rule store
    async fn search(&self, request: &SearchRequest, rules: Arc<RuleStore>) -> Result<SearchOutcome>;
}
