mod bootstrap;
mod config;
mod routes;

use std::path::PathBuf;

use anyhow::Context;
use clap::Parser;
use tracing::info;
use tracing_subscriber::EnvFilter;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;

use config::ServerConfig;

#[derive(Parser)]
#[command(name = "taskkeeperd", version, about = "Task tracking service")]
struct Args {
    /// Path to the configuration file
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Listen address, overrides the configuration file
    #[arg(long)]
    listen: Option<String>,

    /// Data directory, overrides the configuration file
    #[arg(long)]
    data_dir: Option<PathBuf>,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .with(tracing_subscriber::fmt::layer())
        .init();

    let args = Args::parse();
    let mut config = ServerConfig::load(args.config.as_deref())?;
    config.apply_overrides(args.listen, args.data_dir);
    if let Some(path) = &args.config {
        info!(config = %path.display(), "loaded configuration");
    }

    let module = bootstrap::prepare(&config)?;
    let app = routes::build_router(&config, &module)?;

    let listener = tokio::net::TcpListener::bind(&config.http.listen)
        .await
        .with_context(|| format!("failed to bind {}", config.http.listen))?;
    info!(listen = %config.http.listen, "taskkeeperd ready");
    axum::serve(listener, app).await?;
    Ok(())
}
