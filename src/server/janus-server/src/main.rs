//! Janus Server - Main entry point.

use clap::Parser;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use janus_server::{build_dev_app, AppConfig};

#[derive(Parser)]
#[command(name = "janus-server")]
#[command(about = "Janus - SSO agent bridge server")]
#[command(version)]
struct Cli {
    /// Server bind address
    #[arg(long, default_value = "0.0.0.0:8300", env = "JANUS_BIND_ADDRESS")]
    bind: String,

    /// Prefix the agent operations are mounted under
    #[arg(long, default_value = "/sso", env = "JANUS_PATH_PREFIX")]
    path_prefix: String,

    /// Enable development mode (mock backend, seeded user directory)
    #[arg(long, env = "JANUS_DEV_MODE")]
    dev: bool,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::registry()
        .with(tracing_subscriber::fmt::layer())
        .with(tracing_subscriber::EnvFilter::from_default_env())
        .init();

    let cli = Cli::parse();

    tracing::info!("Starting Janus server...");
    tracing::info!("Bind address: {}", cli.bind);

    if !cli.dev {
        anyhow::bail!(
            "the real SSO backend client is not bundled with this build; \
             start with --dev to run against the mock backend"
        );
    }
    tracing::warn!("Development mode enabled - DO NOT USE IN PRODUCTION");

    let (app, handle) = build_dev_app(&AppConfig {
        path_prefix: cli.path_prefix,
    });

    let listener = tokio::net::TcpListener::bind(&cli.bind).await?;
    tracing::info!("Janus server listening on {}", listener.local_addr()?);

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    tracing::info!("Shutting down...");
    handle.shutdown();

    Ok(())
}

async fn shutdown_signal() {
    let _ = tokio::signal::ctrl_c().await;
}
