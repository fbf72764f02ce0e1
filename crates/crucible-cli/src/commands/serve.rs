//! Serve command

use std::sync::Arc;

use anyhow::Context;
use clap::Args;
use tokio::net::TcpListener;

use crate::server::{create_router, ServerState};
use crate::AppContext;

#[derive(Args)]
pub struct ServeArgs {
    /// Address to listen on (defaults to the configured bind address)
    #[arg(short, long)]
    pub bind: Option<String>,
}

pub async fn run(args: &ServeArgs, ctx: &AppContext) -> anyhow::Result<()> {
    let bind = args.bind.as_deref().unwrap_or(&ctx.config.bind);
    let rules = ctx.rules().await?;
    let state = Arc::new(ServerState::new(ctx.engine.clone(), rules));

    let listener = TcpListener::bind(bind)
        .await
        .with_context(|| format!("Failed to bind {}", bind))?;
    tracing::info!("Listening on http://{}", listener.local_addr()?);
    eprintln!("Serving recipe search on http://{}", listener.local_addr()?);

    axum::serve(listener, create_router(state))
        .with_graceful_shutdown(async {
            if tokio::signal::ctrl_c().await.is_ok() {
                tracing::info!("Shutting down");
            }
        })
        .await?;
    Ok(())
}
