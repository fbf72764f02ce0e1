//! Search command

use std::time::{Duration, Instant};

use clap::Args;
use crucible_core::limits::{validate_concurrency, validate_graph_budget};
use crucible_core::{Algorithm, SearchMode, SearchRequest};
use crucible_search::{EngineConfig, RecipeSearchEngine, SearchEngine};

use crate::output::format_outcome;
use crate::{AppContext, Cli};

#[derive(Args)]
pub struct SearchArgs {
    /// Item to build
    pub target: String,

    /// Algorithm: BFS, DFS, Bidirectional
    #[arg(short, long, default_value = "BFS")]
    pub algorithm: Algorithm,

    /// Search mode: single, multiple
    #[arg(short, long, default_value = "single")]
    pub mode: SearchMode,

    /// Maximum number of paths in multiple mode (0 or less for all)
    #[arg(long, allow_hyphen_values = true)]
    pub max: Option<i64>,

    /// Worker pool size for multiple mode
    #[arg(long)]
    pub concurrency: Option<usize>,

    /// Give up on a multi-path search after this many seconds
    #[arg(long)]
    pub timeout: Option<u64>,

    /// Node budget for the derivation graph
    #[arg(long)]
    pub max_nodes: Option<usize>,
}

impl SearchArgs {
    fn request(&self) -> SearchRequest {
        let mut request = SearchRequest::new(self.target.trim())
            .with_algorithm(self.algorithm)
            .with_mode(self.mode);
        request.max_recipes = self.max;
        request
    }

    /// Apply per-invocation overrides on top of the configured engine
    fn engine_config(&self, base: EngineConfig) -> anyhow::Result<EngineConfig> {
        let mut config = base;
        if let Some(concurrency) = self.concurrency {
            validate_concurrency(concurrency)?;
            config.multi_path = config.multi_path.with_concurrency(concurrency);
        }
        if let Some(secs) = self.timeout {
            config.multi_path = config.multi_path.with_timeout(Duration::from_secs(secs));
        }
        if let Some(nodes) = self.max_nodes {
            validate_graph_budget(nodes)?;
            config.build = config.build.with_max_nodes(nodes);
        }
        Ok(config)
    }
}

pub async fn run(args: &SearchArgs, cli: &Cli, ctx: &AppContext) -> anyhow::Result<()> {
    let request = args.request();
    let engine = RecipeSearchEngine::new(args.engine_config(*ctx.engine.config())?);
    let rules = ctx.rules().await?;

    let started = Instant::now();
    let outcome = engine.search(&request, rules).await?;
    let elapsed = started.elapsed();

    tracing::info!(
        "Search for {} returned {} path(s) in {:?}",
        request.target,
        outcome.paths.len(),
        elapsed
    );

    print!("{}", format_outcome(&outcome, elapsed, cli.output_format())?);
    Ok(())
}
