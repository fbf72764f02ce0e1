//! Crucible Search - Recipe search engines
//!
//! Provides the multi-path orchestrator (bounded tokio worker pool with
//! signature deduplication) and the [`SearchEngine`] trait that dispatches
//! a request to the right solver.

pub mod engine;
pub mod error;
pub mod orchestrator;
pub mod traits;

pub use engine::{EngineConfig, RecipeSearchEngine};
pub use error::{SearchError, SearchResult};
pub use orchestrator::{MultiPathConfig, MultiPathOutcome, MultiPathSearch, Seed};
pub use traits::{SearchEngine, SearchOutcome};
