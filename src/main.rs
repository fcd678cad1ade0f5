use std::sync::Arc;

use anyhow::Result;
use clap::Parser;
use tracing::{error, info};
use tracing_subscriber::{EnvFilter, FmtSubscriber};

use research_agent::cli::Cli;
use research_agent::connector::api::routes;
use research_agent::Container;

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(cli.log_directive()));
    let subscriber = FmtSubscriber::builder()
        .with_env_filter(filter)
        .with_target(false)
        .finish();
    tracing::subscriber::set_global_default(subscriber)?;

    info!(
        "Starting research agent - Environment: {}, Log level: {}",
        cli.environment,
        cli.log_level()
    );

    // Fail before binding.
    let container = Container::new(cli.container_config()).map_err(|e| {
        error!("Startup failed: {}", e);
        e
    })?;
    info!(
        "Research prompt '{}' ready - Model: {}, Mock LLM: {}",
        container.prompt_name(),
        container.research_chat_use_case().template().model_id(),
        container.mock_llm()
    );

    let listener = tokio::net::TcpListener::bind((cli.host.as_str(), cli.port)).await?;
    info!("Listening on http://{}", listener.local_addr()?);

    axum::serve(listener, routes(Arc::new(container)))
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    info!("Server stopped");
    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        error!("Failed to listen for shutdown signal: {}", e);
    }
}
