//! Default search engine: builds the derivation graph and dispatches algorithm × mode

use std::sync::Arc;

use async_trait::async_trait;
use crucible_core::limits::validate_graph_budget;
use crucible_core::{
    Algorithm, BidirectionalSolver, BuildOptions, DerivationGraph, GraphBuilder, PathResult,
    RuleStore, SearchContext, SearchMode, SearchRequest, SinglePathSolver,
};

use crate::orchestrator::{MultiPathConfig, MultiPathSearch};
use crate::traits::{Result, SearchEngine, SearchError, SearchOutcome};

/// Settings for [`RecipeSearchEngine`]
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct EngineConfig {
    pub build: BuildOptions,
    pub multi_path: MultiPathConfig,
}

/// Search engine over an in-memory rule store
#[derive(Debug, Clone, Default)]
pub struct RecipeSearchEngine {
    config: EngineConfig,
}

impl RecipeSearchEngine {
    pub fn new(config: EngineConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    /// Build the derivation graph for `target` off the async runtime
    pub async fn build_graph(
        &self,
        target: &str,
        rules: Arc<RuleStore>,
    ) -> Result<DerivationGraph> {
        validate_graph_budget(self.config.build.max_nodes)?;
        if !rules.contains(target) {
            return Err(SearchError::UnknownItem(target.to_string()));
        }

        let options = self.config.build;
        let owned = target.to_string();
        tokio::task::spawn_blocking(move || {
            GraphBuilder::new(&rules).with_options(options).build(&owned)
        })
        .await?
        .ok_or_else(|| SearchError::UnknownItem(target.to_string()))
    }

    fn single(graph: &DerivationGraph, rules: &RuleStore, algorithm: Algorithm) -> Option<PathResult> {
        let ctx = SearchContext::new(graph, rules);
        match algorithm {
            Algorithm::Bfs => SinglePathSolver::bfs_first(&ctx),
            Algorithm::Dfs => SinglePathSolver::dfs_shortest(&ctx),
            Algorithm::Bidirectional => BidirectionalSolver::search_with_retry(&ctx),
        }
    }
}

#[async_trait]
impl SearchEngine for RecipeSearchEngine {
    async fn search(&self, request: &SearchRequest, rules: Arc<RuleStore>) -> Result<SearchOutcome> {
        request.validate()?;
        let graph = Arc::new(self.build_graph(&request.target, Arc::clone(&rules)).await?);
        let algorithm = request.algorithm;
        let mode = request.effective_mode();

        tracing::debug!(
            "Searching {} with {} in {} mode over {} graph nodes",
            request.target,
            algorithm,
            mode,
            graph.len()
        );

        let (paths, timed_out) = match mode {
            SearchMode::Single => {
                let (graph, rules) = (Arc::clone(&graph), Arc::clone(&rules));
                let found =
                    tokio::task::spawn_blocking(move || Self::single(&graph, &rules, algorithm))
                        .await?;
                (found.into_iter().collect(), false)
            }
            SearchMode::Multiple => {
                let outcome = MultiPathSearch::new(self.config.multi_path)
                    .find_paths(Arc::clone(&graph), rules, algorithm, request.max_paths())
                    .await?;
                (outcome.paths, outcome.timed_out)
            }
        };

        if paths.is_empty() {
            tracing::info!("No path found for {} using {}", request.target, algorithm);
        }

        Ok(SearchOutcome {
            target: request.target.clone(),
            algorithm,
            mode,
            paths,
            graph_nodes: graph.len(),
            truncated: graph.is_truncated(),
            timed_out,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn rules() -> Arc<RuleStore> {
        Arc::new(
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
                .with_recipe("A", "B", "Fire")
                .with_recipe("B", "A", "Water"),
        )
    }

    #[tokio::test]
    async fn test_single_mode_each_algorithm() {
        let engine = RecipeSearchEngine::default();

        for algorithm in [Algorithm::Bfs, Algorithm::Dfs, Algorithm::Bidirectional] {
            let request = SearchRequest::new("Brick").with_algorithm(algorithm);
            let outcome = engine.search(&request, rules()).await.unwrap();

            assert_eq!(outcome.mode, SearchMode::Single);
            assert_eq!(outcome.paths.len(), 1);
            assert_eq!(outcome.paths[0].signature, "Brick|Mud|Fire|Water|Earth");
            assert_eq!(outcome.wire_trees()[0].name, "Brick");
        }
    }

    #[tokio::test]
    async fn test_multiple_mode() {
        let engine = RecipeSearchEngine::default();
        let request = SearchRequest::new("Brick")
            .with_algorithm(Algorithm::Dfs)
            .multiple(2);

        let outcome = engine.search(&request, rules()).await.unwrap();
        assert_eq!(outcome.mode, SearchMode::Multiple);
        assert_eq!(outcome.paths.len(), 2);
        assert_eq!(outcome.nodes_visited().len(), 2);
    }

    #[tokio::test]
    async fn test_single_path_request_runs_single_mode() {
        let engine = RecipeSearchEngine::default();
        let request = SearchRequest::new("Brick").multiple(1);

        let outcome = engine.search(&request, rules()).await.unwrap();
        assert_eq!(outcome.mode, SearchMode::Single);
        assert_eq!(outcome.paths.len(), 1);
    }

    #[tokio::test]
    async fn test_cycle_is_empty_not_error() {
        let engine = RecipeSearchEngine::default();
        let outcome = engine
            .search(&SearchRequest::new("A").with_algorithm(Algorithm::Dfs), rules())
            .await
            .unwrap();
        assert!(outcome.is_empty());
    }

    #[tokio::test]
    async fn test_unknown_and_invalid_targets() {
        let engine = RecipeSearchEngine::default();

        let err = engine
            .search(&SearchRequest::new("Unobtainium"), rules())
            .await
            .unwrap_err();
        assert!(matches!(err, SearchError::UnknownItem(ref item) if item == "Unobtainium"));

        let err = engine.search(&SearchRequest::new(""), rules()).await.unwrap_err();
        assert!(matches!(err, SearchError::Validation(_)));
    }
}
