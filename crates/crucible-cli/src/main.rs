//! Crucible CLI - Command line interface for recipe search

use std::path::PathBuf;
use std::sync::Arc;

use clap::{Parser, Subcommand};
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

mod commands;
mod config;
mod output;
mod server;

use commands::{completions, config as config_cmd, elements, graph, search, serve};
use config::{default_rules_path, Config};
use crucible_core::RuleStore;
use crucible_search::RecipeSearchEngine;
use crucible_storage::{JsonFileStorage, RuleBackend};
use output::OutputFormat;

#[derive(Parser)]
#[command(name = "crucible")]
#[command(author, version, about = "Find how to craft an item from base elements")]
pub struct Cli {
    /// Rule table JSON file
    #[arg(short, long, env = "CRUCIBLE_RULES", global = true)]
    pub rules: Option<PathBuf>,

    /// Output format: tree, json
    #[arg(short, long, default_value = "tree", global = true)]
    pub format: String,

    /// Verbosity level (-v, -vv, -vvv)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    /// Suppress output except errors
    #[arg(short, long, global = true)]
    pub quiet: bool,

    #[command(subcommand)]
    pub command: Commands,
}

impl Cli {
    pub fn output_format(&self) -> OutputFormat {
        OutputFormat::from(self.format.as_str())
    }
}

#[derive(Subcommand)]
pub enum Commands {
    /// Search for a recipe tree
    Search(search::SearchArgs),
    /// Show the derivation graph of an item
    Graph(graph::GraphArgs),
    /// List known elements and their recipes
    Elements(elements::ElementsArgs),
    /// Start the HTTP search server
    Serve(serve::ServeArgs),
    /// Manage configuration
    Config(config_cmd::ConfigArgs),
    /// Generate shell completions
    Completions(completions::CompletionsArgs),
}

/// Application context with rule storage and search engine
pub struct AppContext {
    pub config: Config,
    pub storage: Arc<JsonFileStorage>,
    pub engine: RecipeSearchEngine,
}

impl AppContext {
    pub async fn new(cli: &Cli) -> anyhow::Result<Self> {
        let config = Config::load();
        let rules_path = cli
            .rules
            .clone()
            .or_else(|| config.rules_path.clone())
            .unwrap_or_else(default_rules_path);
        tracing::debug!("Using rule table at: {:?}", rules_path);

        let storage = JsonFileStorage::new(rules_path);
        if !storage.health_check().await? {
            anyhow::bail!(
                "Rule table not found at {}. Pass --rules or run `crucible config set rules_path <file>`.",
                storage.path().display()
            );
        }

        let engine = RecipeSearchEngine::new(config.engine_config());
        Ok(Self {
            config,
            storage: Arc::new(storage),
            engine,
        })
    }

    /// Load the rule table
    pub async fn rules(&self) -> anyhow::Result<Arc<RuleStore>> {
        let rules = self.storage.load_rules().await?;
        tracing::debug!(
            "Loaded {} elements with {} recipes",
            rules.len(),
            rules.recipe_count()
        );
        Ok(Arc::new(rules))
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    // Set up logging based on verbosity
    let filter = match cli.verbose {
        0 if cli.quiet => "error",
        0 => "warn",
        1 => "info",
        2 => "debug",
        _ => "trace",
    };

    tracing_subscriber::registry()
        .with(fmt::layer().with_writer(std::io::stderr))
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| filter.into()))
        .init();

    tracing::debug!("Starting crucible CLI");

    // These never touch the rule table
    match &cli.command {
        Commands::Config(args) => return config_cmd::run(args).await,
        Commands::Completions(args) => return completions::run(args),
        _ => {}
    }

    let ctx = AppContext::new(&cli).await?;

    match &cli.command {
        Commands::Search(args) => search::run(args, &cli, &ctx).await?,
        Commands::Graph(args) => graph::run(args, &cli, &ctx).await?,
        Commands::Elements(args) => elements::run(args, &cli, &ctx).await?,
        Commands::Serve(args) => serve::run(args, &ctx).await?,
        Commands::Config(_) | Commands::Completions(_) => {}
    }

    Ok(())
}
