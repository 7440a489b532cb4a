//! Multi-table blackjack server using an async actor model.
//!
//! This server spawns TableActor instances managed by TableManager and
//! serves the HTTP/WebSocket API for live rooms.

use std::sync::Arc;

use anyhow::Error;
use ctrlc::set_handler;
use log::info;
use pico_args::Arguments;

use bj_server::{api, config::ServerConfig, metrics};
use blackjack::{LocalDeckSource, TableManager};

const HELP: &str = "\
Run a multi-table blackjack server

USAGE:
  bj_server [OPTIONS]

OPTIONS:
  --bind       IP:PORT     Server socket bind address  [default: env SERVER_BIND or 127.0.0.1:6969]
  --tables     N           Number of tables to create  [default: 0]

FLAGS:
  -h, --help               Print help information

ENVIRONMENT:
  SERVER_BIND              Server bind address (e.g., 0.0.0.0:8080)
  METRICS_BIND             Prometheus exporter bind address (disabled if unset)
  TABLE_MAX_PLAYERS        Seats per table
  STARTING_CHIPS           Chip stack granted on first join
  DECK_SETS                52-card sets per shoe
  DEALER_PAUSE_MS          Pause before the dealer plays out
  ROUND_RESTART_MS         Delay before a resolved round restarts
  DECK_FETCH_TIMEOUT_MS    Deck source timeout before local fallback
";

struct Args {
    bind: Option<std::net::SocketAddr>,
    num_tables: usize,
}

#[tokio::main]
async fn main() -> Result<(), Error> {
    // Load .env file if it exists
    let _ = dotenvy::dotenv();

    let mut pargs = Arguments::from_env();

    // Help has a higher priority and should be handled separately.
    if pargs.contains(["-h", "--help"]) {
        print!("{HELP}");
        std::process::exit(0);
    }

    let args = Args {
        bind: pargs.opt_value_from_str("--bind")?,
        num_tables: pargs.opt_value_from_str("--tables")?.unwrap_or(0),
    };

    // Catching signals for exit.
    set_handler(|| std::process::exit(0))?;

    env_logger::builder().format_target(false).init();

    let config = ServerConfig::from_env(args.bind)
        .map_err(|e| anyhow::anyhow!("Invalid configuration: {e}"))?;

    info!("Starting multi-table blackjack server at {}", config.bind);

    if let Some(metrics_bind) = config.metrics_bind {
        metrics::init_metrics(metrics_bind).map_err(Error::msg)?;
        info!("Prometheus metrics exposed at http://{metrics_bind}/metrics");
    }

    let table_manager = Arc::new(TableManager::new(
        config.table.clone(),
        Arc::new(LocalDeckSource),
    ));

    // Tables are normally created on first join; pre-creating some is
    // handy for development clients that only list-and-pick.
    for i in 0..args.num_tables {
        let table_id = table_manager.create_table().await;
        info!("Created table {} with ID {table_id}", i + 1);
    }

    let active_count = table_manager.active_table_count().await;
    info!("Server ready with {active_count} active table(s)");

    let api_state = api::AppState { table_manager };
    let app = api::create_router(api_state);

    let listener = tokio::net::TcpListener::bind(config.bind)
        .await
        .map_err(|e| anyhow::anyhow!("Failed to bind to {}: {}", config.bind, e))?;

    info!(
        "Server is running at http://{}. Press Ctrl+C to stop.",
        config.bind
    );

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .map_err(|e| anyhow::anyhow!("Server error: {}", e))?;

    info!("Shutting down server...");

    Ok(())
}

/// Graceful shutdown signal
async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        log::error!("Failed to install CTRL+C signal handler: {e}");
    }
}
