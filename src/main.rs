use std::sync::Arc;

use lantern::config::Config;
use lantern::server::{Server, ServerContext};
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .with_target(false)
        .with_level(true)
        .init();

    let cfg = Config::load()?;
    tracing::info!(
        root = %cfg.static_files.root.display(),
        verbose_errors = cfg.server.verbose_errors,
        "Configuration loaded"
    );

    let context = Arc::new(ServerContext::new(cfg));
    let server = Server::bind(context).await?;

    server
        .run(async {
            let _ = tokio::signal::ctrl_c().await;
            tracing::info!("Shutdown signal received");
        })
        .await
}
