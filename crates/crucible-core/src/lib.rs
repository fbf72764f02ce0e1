//! Crucible Core - Derivation graphs and recipe path search
//!
//! This crate provides the rule store, the bounded derivation graph built
//! from it, and the single-path and bidirectional solvers that turn the
//! graph into cycle-free recipe trees.

pub mod bidirectional;
pub mod builder;
pub mod context;
pub mod graph;
pub mod limits;
pub mod materialize;
pub mod query;
pub mod rules;
pub mod traversal;
pub mod tree;

#[cfg(test)]
pub(crate) mod testing;

pub use bidirectional::{BidirectionalSolver, Meeting, MeetingPoint};
pub use builder::{build_graph, BuildOptions, GraphBuilder};
pub use context::{CancellationToken, SearchContext};
pub use graph::{Combination, DerivationGraph, GraphNode, NodeId};
pub use materialize::{Materialization, Materializer};
pub use query::{Algorithm, SearchMode, SearchRequest};
pub use rules::{is_base_item, IngredientPair, RuleStore, BASE_ITEMS};
pub use traversal::SinglePathSolver;
pub use tree::{PathResult, Recipe, RecipeNode, WireNode};
