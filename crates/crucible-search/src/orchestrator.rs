//! Multi-path search: one task per seed under a bounded worker pool
//!
//! Each seed (a top-level recipe of the target, or a base leaf for the
//! bidirectional solver) gets its own blocking search task. Finished paths
//! flow through a bounded channel to a single collector that keeps the
//! first path seen for every signature. Once enough distinct paths are in,
//! the shared cancellation token tells the remaining tasks to stop.

use std::collections::HashSet;
use std::sync::{Arc, Mutex};
use std::time::Duration;

use crucible_core::limits::{validate_concurrency, DEFAULT_CONCURRENCY};
use crucible_core::{
    Algorithm, BidirectionalSolver, CancellationToken, DerivationGraph, NodeId, PathResult,
    RecipeNode, RuleStore, SearchContext, SinglePathSolver,
};
use tokio::sync::{mpsc, Semaphore};
use tokio::task::JoinSet;

use crate::error::{SearchError, SearchResult};

/// Default capacity of the result channel
pub const DEFAULT_CHANNEL_CAPACITY: usize = 64;

/// Worker pool settings
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MultiPathConfig {
    /// Maximum search tasks running at once
    pub concurrency: usize,

    /// Capacity of the bounded result channel
    pub channel_capacity: usize,

    /// Wall-clock limit; on expiry the paths collected so far are returned
    pub timeout: Option<Duration>,
}

impl Default for MultiPathConfig {
    fn default() -> Self {
        Self {
            concurrency: DEFAULT_CONCURRENCY,
            channel_capacity: DEFAULT_CHANNEL_CAPACITY,
            timeout: None,
        }
    }
}

impl MultiPathConfig {
    pub fn with_concurrency(mut self, concurrency: usize) -> Self {
        self.concurrency = concurrency;
        self
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = Some(timeout);
        self
    }
}

/// Where one search task starts
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Seed {
    /// Index of a top-level recipe alternative of the target
    Recipe(usize),
    /// A base leaf node for the backward frontier
    Leaf(NodeId),
}

impl Seed {
    /// Distinct seeds for `algorithm` over `graph`
    pub fn all(graph: &DerivationGraph, algorithm: Algorithm) -> Vec<Seed> {
        match algorithm {
            Algorithm::Bfs | Algorithm::Dfs => (0..graph.root_node().combinations.len())
                .map(Seed::Recipe)
                .collect(),
            Algorithm::Bidirectional => graph.base_leaves().into_iter().map(Seed::Leaf).collect(),
        }
    }

    /// Run the matching solver from this seed
    pub fn run(self, ctx: &SearchContext<'_>, algorithm: Algorithm) -> Option<PathResult> {
        match (algorithm, self) {
            (Algorithm::Bfs, Seed::Recipe(index)) => SinglePathSolver::bfs_seeded(ctx, index),
            (Algorithm::Dfs, Seed::Recipe(index)) => SinglePathSolver::dfs_seeded(ctx, index),
            (Algorithm::Bidirectional, Seed::Leaf(leaf)) => {
                BidirectionalSolver::search_from(ctx, &[leaf])
            }
            _ => None,
        }
    }
}

/// Paths gathered by one multi-path run
#[derive(Debug, Clone, Default)]
pub struct MultiPathOutcome {
    /// Distinct paths in arrival order
    pub paths: Vec<PathResult>,

    /// Number of seeds searched (or scheduled, when stopped early)
    pub seeds: usize,

    /// Duplicate paths discarded by the collector
    pub duplicates: usize,

    /// The run stopped at its wall-clock limit
    pub timed_out: bool,
}

impl MultiPathOutcome {
    /// Nodes visited for each returned path
    pub fn nodes_visited(&self) -> Vec<usize> {
        self.paths.iter().map(|p| p.nodes_visited).collect()
    }
}

/// Result of offering a path to the collector
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Offer {
    Accepted,
    /// Accepted, and the path budget is now used up
    Filled,
    Duplicate,
    /// The budget was already used up
    Full,
}

#[derive(Default)]
struct CollectorState {
    paths: Vec<PathResult>,
    signatures: HashSet<String>,
    duplicates: usize,
}

/// Deduplicating sink for finished paths
struct PathCollector {
    max_paths: usize,
    state: Mutex<CollectorState>,
}

impl PathCollector {
    fn new(max_paths: usize) -> Self {
        Self {
            max_paths,
            state: Mutex::new(CollectorState::default()),
        }
    }

    fn is_full(&self, found: usize) -> bool {
        self.max_paths > 0 && found >= self.max_paths
    }

    fn offer(&self, path: PathResult) -> SearchResult<Offer> {
        let mut state = self
            .state
            .lock()
            .map_err(|e| SearchError::Internal(format!("Lock error: {}", e)))?;

        if self.is_full(state.paths.len()) {
            return Ok(Offer::Full);
        }
        if !state.signatures.insert(path.signature.clone()) {
            state.duplicates += 1;
            return Ok(Offer::Duplicate);
        }
        state.paths.push(path);

        Ok(if self.is_full(state.paths.len()) {
            Offer::Filled
        } else {
            Offer::Accepted
        })
    }

    fn into_state(self) -> SearchResult<CollectorState> {
        self.state
            .into_inner()
            .map_err(|e| SearchError::Internal(format!("Lock error: {}", e)))
    }
}

/// Runs many seeded searches concurrently and keeps the distinct results
#[derive(Debug, Clone, Default)]
pub struct MultiPathSearch {
    config: MultiPathConfig,
}

impl MultiPathSearch {
    pub fn new(config: MultiPathConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &MultiPathConfig {
        &self.config
    }

    /// Find up to `max_paths` distinct paths (0 means as many as the seeds yield)
    pub async fn find_paths(
        &self,
        graph: Arc<DerivationGraph>,
        rules: Arc<RuleStore>,
        algorithm: Algorithm,
        max_paths: usize,
    ) -> SearchResult<MultiPathOutcome> {
        validate_concurrency(self.config.concurrency)?;

        let root = graph.root_node();
        if root.is_cycle {
            return Ok(MultiPathOutcome::default());
        }
        if rules.is_base(&root.item) {
            let path = PathResult::new(RecipeNode::leaf(&root.item), 1);
            return Ok(MultiPathOutcome {
                paths: vec![path],
                seeds: 1,
                ..Default::default()
            });
        }

        let seeds = Seed::all(&graph, algorithm);
        tracing::debug!(
            "Multi-path {} search for {}: {} seeds, {} workers, max {}",
            algorithm,
            graph.target(),
            seeds.len(),
            self.config.concurrency,
            max_paths
        );

        let cancel = CancellationToken::new();
        let semaphore = Arc::new(Semaphore::new(self.config.concurrency));
        let (tx, mut rx) = mpsc::channel::<PathResult>(self.config.channel_capacity.max(1));
        let mut tasks = JoinSet::new();

        for seed in seeds.iter().copied() {
            let graph = Arc::clone(&graph);
            let rules = Arc::clone(&rules);
            let semaphore = Arc::clone(&semaphore);
            let cancel = cancel.clone();
            let tx = tx.clone();

            tasks.spawn(async move {
                let Ok(_permit) = semaphore.acquire_owned().await else {
                    return;
                };
                if cancel.is_cancelled() {
                    return;
                }

                let token = cancel.clone();
                let found = tokio::task::spawn_blocking(move || {
                    let ctx = SearchContext::new(&graph, &rules).with_cancellation(token);
                    seed.run(&ctx, algorithm)
                })
                .await;

                match found {
                    Ok(Some(path)) if !cancel.is_cancelled() => {
                        // The collector may already have hung up
                        let _ = tx.send(path).await;
                    }
                    Ok(_) => {}
                    Err(e) => tracing::warn!("Search task for seed {:?} failed: {}", seed, e),
                }
            });
        }
        drop(tx);

        let collector = PathCollector::new(max_paths);
        let collect = async {
            while let Some(path) = rx.recv().await {
                match collector.offer(path)? {
                    Offer::Accepted | Offer::Duplicate => {}
                    Offer::Filled | Offer::Full => {
                        cancel.cancel();
                        break;
                    }
                }
            }
            Ok::<(), SearchError>(())
        };

        let timed_out = match self.config.timeout {
            Some(limit) => match tokio::time::timeout(limit, collect).await {
                Ok(result) => {
                    result?;
                    false
                }
                Err(_) => {
                    tracing::warn!(
                        "Multi-path search for {} timed out after {:?}",
                        graph.target(),
                        limit
                    );
                    true
                }
            },
            None => {
                collect.await?;
                false
            }
        };

        cancel.cancel();
        rx.close();
        while let Some(joined) = tasks.join_next().await {
            if let Err(e) = joined {
                tracing::warn!("Search task panicked or was aborted: {}", e);
            }
        }

        let state = collector.into_state()?;
        tracing::info!(
            "Found {} distinct paths for {} ({} duplicates discarded)",
            state.paths.len(),
            graph.target(),
            state.duplicates
        );

        Ok(MultiPathOutcome {
            paths: state.paths,
            seeds: seeds.len(),
            duplicates: state.duplicates,
            timed_out,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crucible_core::build_graph;

    fn brick_rules() -> RuleStore {
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

    fn shared(target: &str, rules: RuleStore) -> (Arc<DerivationGraph>, Arc<RuleStore>) {
        let graph = build_graph(target, &rules).unwrap();
        (Arc::new(graph), Arc::new(rules))
    }

    fn assert_distinct(outcome: &MultiPathOutcome) {
        let signatures: HashSet<&str> =
            outcome.paths.iter().map(|p| p.signature.as_str()).collect();
        assert_eq!(signatures.len(), outcome.paths.len());
    }

    #[tokio::test]
    async fn test_one_path_per_top_level_recipe() {
        let (graph, rules) = shared("Brick", brick_rules());

        for algorithm in [Algorithm::Bfs, Algorithm::Dfs] {
            let outcome = MultiPathSearch::default()
                .find_paths(Arc::clone(&graph), Arc::clone(&rules), algorithm, 2)
                .await
                .unwrap();

            assert_eq!(outcome.paths.len(), 2);
            assert_distinct(&outcome);
            let firsts: HashSet<&str> = outcome
                .paths
                .iter()
                .map(|p| p.tree.ingredients().unwrap()[0].item.as_str())
                .collect();
            assert_eq!(firsts, HashSet::from(["Mud", "Clay"]));
            assert_eq!(outcome.nodes_visited().len(), 2);
        }
    }

    #[tokio::test]
    async fn test_bidirectional_dedups_leaves() {
        let (graph, rules) = shared("Brick", brick_rules());

        let outcome = MultiPathSearch::default()
            .find_paths(graph, rules, Algorithm::Bidirectional, 0)
            .await
            .unwrap();

        assert!(!outcome.paths.is_empty());
        assert!(outcome.duplicates > 0);
        assert_eq!(outcome.paths.len() + outcome.duplicates, outcome.seeds);
        assert_distinct(&outcome);
        for path in &outcome.paths {
            assert!(path.tree.is_acyclic());
        }
    }

    #[tokio::test]
    async fn test_stops_at_max_paths() {
        let (graph, rules) = shared("Brick", brick_rules());

        let outcome = MultiPathSearch::new(MultiPathConfig::default().with_concurrency(1))
            .find_paths(graph, rules, Algorithm::Bfs, 1)
            .await
            .unwrap();

        assert_eq!(outcome.paths.len(), 1);
    }

    #[tokio::test]
    async fn test_cycle_yields_nothing() {
        let rules = RuleStore::new()
            .with_recipe("A", "B", "Fire")
            .with_recipe("B", "A", "Water");
        let (graph, rules) = shared("A", rules);

        for algorithm in [Algorithm::Bfs, Algorithm::Dfs, Algorithm::Bidirectional] {
            let outcome = MultiPathSearch::default()
                .find_paths(Arc::clone(&graph), Arc::clone(&rules), algorithm, 0)
                .await
                .unwrap();
            assert!(outcome.paths.is_empty());
        }
    }

    #[tokio::test]
    async fn test_rejects_empty_pool() {
        let (graph, rules) = shared("Brick", brick_rules());
        let search = MultiPathSearch::new(MultiPathConfig::default().with_concurrency(0));

        let err = search
            .find_paths(graph, rules, Algorithm::Bfs, 2)
            .await
            .unwrap_err();
        assert!(matches!(err, SearchError::Validation(_)));
    }

    #[test]
    fn test_collector_dedup_and_budget() {
        let collector = PathCollector::new(2);
        let leaf = |name: &str| PathResult::new(RecipeNode::leaf(name), 1);

        assert_eq!(collector.offer(leaf("Air")).unwrap(), Offer::Accepted);
        assert_eq!(collector.offer(leaf("Air")).unwrap(), Offer::Duplicate);
        assert_eq!(collector.offer(leaf("Fire")).unwrap(), Offer::Filled);
        assert_eq!(collector.offer(leaf("Water")).unwrap(), Offer::Full);

        let state = collector.into_state().unwrap();
        assert_eq!(state.paths.len(), 2);
        assert_eq!(state.duplicates, 1);
    }
}
