//! Leaderboard server: top-N score API backed by SQLite or memory
//!
//! Usage:
//!   leaderboard-server serve --port 3000               : Launch the HTTP API
//!   leaderboard-server top                             : Print the current leaderboard
//!   leaderboard-server submit --name Alice --score 50  : Submit a score from the CLI

mod api;
mod config;
mod cors;

use api::{AppState, APP_VERSION};
use clap::{Parser, Subcommand};
use config::{ServerConfig, StorageBackend};
use engine::{LeaderboardStore, ScoreEntry};
use persistence::{BlobStore, MemoryBlobStore};
use std::sync::Arc;
use tracing::{error, info};

#[derive(Parser)]
#[command(name = "leaderboard-server")]
#[command(about = "Ranked top-N leaderboard backend", long_about = None)]
struct Cli {
    /// Enable verbose logging
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Launch the HTTP API
    Serve {
        /// Host to bind to
        #[arg(long, default_value = "0.0.0.0")]
        host: String,
        /// Port to listen on
        #[arg(short, long, default_value_t = 3000)]
        port: u16,
    },
    /// Print the current leaderboard
    Top,
    /// Submit a score without going through HTTP
    Submit {
        /// Player name
        #[arg(long)]
        name: String,
        /// Score (higher is better)
        #[arg(long, allow_negative_numbers = true)]
        score: f64,
    },
}

fn init_logging(verbose: bool) {
    use tracing_subscriber::{fmt, prelude::*, EnvFilter};

    let filter = if verbose {
        EnvFilter::new("debug,engine=debug,persistence=debug,leaderboard_server=debug")
    } else {
        EnvFilter::new("info,engine=info,persistence=info,leaderboard_server=info")
    };

    tracing_subscriber::registry()
        .with(fmt::layer().with_target(false).compact())
        .with(filter)
        .init();
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    init_logging(cli.verbose);
    dotenvy::dotenv().ok();

    let config = ServerConfig::from_env()?;

    match cli.command {
        Commands::Serve { host, port } => {
            cmd_serve(config, &host, port).await?;
        }
        Commands::Top => {
            cmd_top(config).await?;
        }
        Commands::Submit { name, score } => {
            cmd_submit(config, &name, score).await?;
        }
    }

    Ok(())
}

/// Open the configured blob store and wrap it in a `LeaderboardStore`
async fn open_leaderboard(config: &ServerConfig) -> anyhow::Result<LeaderboardStore> {
    let blobs: Arc<dyn BlobStore> = match config.storage {
        StorageBackend::Sqlite => {
            let db = persistence::Database::new(&config.db_path)
                .await
                .map_err(|e| {
                    error!("Failed to initialize database: {}", e);
                    anyhow::anyhow!("Database initialization failed: {}", e)
                })?;
            info!("Database initialized: {}", config.db_path);
            Arc::new(db)
        }
        StorageBackend::Memory => {
            info!("Using in-memory storage, scores are lost on exit");
            Arc::new(MemoryBlobStore::new())
        }
    };

    Ok(LeaderboardStore::new(blobs, config.leaderboard.clone()))
}

// ============================================================================
// Serve command: Axum web server
// ============================================================================

async fn cmd_serve(config: ServerConfig, host: &str, port: u16) -> anyhow::Result<()> {
    info!("Leaderboard server v{} starting...", APP_VERSION);

    let leaderboard = open_leaderboard(&config).await?;
    let state = AppState {
        leaderboard: Arc::new(leaderboard),
        allow_replace: config.allow_replace,
    };
    let app = api::app(state, config.static_dir.clone());

    let addr: std::net::SocketAddr = format!("{}:{}", host, port).parse()?;
    println!("\n=== Leaderboard server v{} ===", APP_VERSION);
    println!("Listening on http://{}", addr);
    println!("\nEndpoints:");
    println!("  GET  /api                     - Current leaderboard");
    println!("  POST /api                     - Submit {{name, score}}");
    println!("  GET  /api/health              - Health check");
    if config.allow_replace {
        println!("  POST /api/update-leaderboard  - Replace the whole leaderboard");
    }
    println!(
        "\n  Key: {} | Top {} | Storage: {}",
        config.leaderboard.key,
        config.leaderboard.capacity,
        match config.storage {
            StorageBackend::Sqlite => config.db_path.as_str(),
            StorageBackend::Memory => "memory",
        }
    );
    println!("\nPress Ctrl+C to stop\n");

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app)
        .with_graceful_shutdown(async {
            tokio::signal::ctrl_c().await.ok();
            info!("Ctrl+C received, shutting down...");
        })
        .await?;

    Ok(())
}

// ============================================================================
// CLI commands
// ============================================================================

async fn cmd_top(config: ServerConfig) -> anyhow::Result<()> {
    let leaderboard = open_leaderboard(&config).await?;
    let board = leaderboard
        .get_top()
        .await
        .map_err(|e| anyhow::anyhow!("Failed to read leaderboard: {}", e))?;

    print_leaderboard(&board);
    Ok(())
}

async fn cmd_submit(config: ServerConfig, name: &str, score: f64) -> anyhow::Result<()> {
    let leaderboard = open_leaderboard(&config).await?;
    let submission = leaderboard
        .submit_entry(name, score)
        .await
        .map_err(|e| anyhow::anyhow!("Failed to submit score: {}", e))?;

    match submission.placement {
        Some(i) => println!("\n{} placed #{} with {}", name, i + 1, score),
        None => println!(
            "\n{} did not make the top {}",
            name,
            submission.board.len()
        ),
    }
    print_leaderboard(&submission.board);
    Ok(())
}

fn print_leaderboard(board: &[ScoreEntry]) {
    if board.is_empty() {
        println!("\nLeaderboard is empty.");
        return;
    }

    println!("\nTop {}:", board.len());
    println!("  {:>3}  {:<24} {:>12}  {}", "#", "Name", "Score", "Submitted");
    println!("  {}", "-".repeat(64));
    for (i, entry) in board.iter().enumerate() {
        println!(
            "  {:>3}  {:<24} {:>12}  {}",
            i + 1,
            entry.name,
            entry.score,
            entry.timestamp.format("%Y-%m-%d %H:%M:%S")
        );
    }
}
