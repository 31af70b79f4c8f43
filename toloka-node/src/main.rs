//! toloka-node: cleanup event coordination service
//!
//! Serves the completion API (points, statistics, achievements) and the
//! community read models from a local SQLite database.

use std::net::SocketAddr;
use std::path::PathBuf;
use std::sync::Arc;

use clap::{Parser, Subcommand};
use tracing::info;

use toloka_node::api::{create_router, AppState};
use toloka_node::config::Config;
use toloka_node::db::achievements;
use toloka_node::open_database;

#[derive(Parser)]
#[command(name = "toloka-node")]
#[command(about = "Cleanup event coordination service")]
struct Cli {
    /// Path to configuration file
    #[arg(short, long, default_value = "toloka-node.toml")]
    config: PathBuf,

    /// Data directory (overrides config file)
    #[arg(short, long, env = "TOLOKA_DATA_DIR")]
    data_dir: Option<PathBuf>,

    /// HTTP port (overrides config file)
    #[arg(long, env = "TOLOKA_HTTP_PORT")]
    port: Option<u16>,

    #[command(subcommand)]
    command: Option<Command>,
}

#[derive(Subcommand)]
enum Command {
    /// Run the HTTP API (default)
    Serve,
    /// Create the schema, seed the catalog, print it and exit
    InitDb,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive("toloka_node=info".parse()?)
                .add_directive("toloka_core=info".parse()?),
        )
        .init();

    let cli = Cli::parse();

    info!("Starting toloka-node");
    info!("Config file: {}", cli.config.display());

    let mut config = Config::load(&cli.config)?;

    if let Some(data_dir) = cli.data_dir {
        config.database.data_dir = data_dir;
    }
    if let Some(port) = cli.port {
        config.server.http_port = port;
    }

    info!("Database: {}", config.database.path().display());

    let db = open_database(&config)?;

    match cli.command.unwrap_or(Command::Serve) {
        Command::InitDb => {
            let catalog = db.with_conn(achievements::list)?;
            for entry in catalog {
                println!(
                    "{:>3}  {} {:<16} {} >= {}",
                    entry.id, entry.icon, entry.name, entry.condition_type, entry.condition_value
                );
            }
            Ok(())
        }
        Command::Serve => {
            let state = Arc::new(AppState::new(db, config.server.leaderboard_limit));
            let app = create_router(state);

            let addr: SocketAddr =
                format!("{}:{}", config.server.bind_addr, config.server.http_port).parse()?;
            info!("API listening on http://{}", addr);

            let listener = tokio::net::TcpListener::bind(addr).await?;
            axum::serve(listener, app)
                .with_graceful_shutdown(shutdown_signal())
                .await?;

            info!("Server shut down");
            Ok(())
        }
    }
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!(error = %e, "Failed to listen for shutdown signal");
        std::future::pending::<()>().await;
    }
    info!("Received Ctrl+C, shutting down");
}
