//! Graph command

use clap::Args;

use crate::output::format_graph;
use crate::{AppContext, Cli};

#[derive(Args)]
pub struct GraphArgs {
    /// Item to expand
    pub target: String,
}

pub async fn run(args: &GraphArgs, cli: &Cli, ctx: &AppContext) -> anyhow::Result<()> {
    let rules = ctx.rules().await?;
    let graph = ctx.engine.build_graph(args.target.trim(), rules).await?;

    if graph.is_truncated() {
        tracing::warn!(
            "Graph for {} stopped at {} nodes",
            graph.target(),
            graph.len()
        );
    }

    print!("{}", format_graph(&graph, cli.output_format())?);
    Ok(())
}
