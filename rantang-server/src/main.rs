//! Rantang Order Server
//!
//! Order lifecycle service for a home-catering marketplace: order
//! placement, seller approval with a hosted payment page, payment
//! webhooks, daily deliveries and reviews.

mod api;
mod config;
mod server;
mod shutdown;
mod state;

use clap::Parser;
use config::{ConfigLoader, get_database_url};
use rantang_core::events::order_status_channel;
use rantang_core::gateway::SnapGateway;
use rantang_core::lifecycle::OrderLifecycle;
use rantang_core::store::{MemoryProcessor, MemorySeed, OrderStore};
use server::{build_router, run_server};
use shutdown::spawn_config_reload_handler;
use sqlx::postgres::PgPoolOptions;
use state::AppState;
use std::net::SocketAddr;
use std::path::PathBuf;
use std::sync::Arc;
use tracing_subscriber::{EnvFilter, layer::SubscriberExt, util::SubscriberInitExt};

/// Rantang - catering order lifecycle service
#[derive(Parser, Debug)]
#[command(name = "rantang-server")]
#[command(version, about, long_about = None)]
struct Args {
    /// Path to the configuration file
    #[arg(short, long, default_value = "./rantang-config.toml")]
    config: PathBuf,

    /// Override the listen address (e.g., 0.0.0.0:3000)
    #[arg(short, long)]
    listen: Option<SocketAddr>,

    /// Run database migrations on startup
    #[arg(long, default_value = "false")]
    migrate: bool,

    /// Keep records in process memory instead of Postgres
    #[arg(long, default_value = "false")]
    in_memory: bool,

    /// JSON file with sellers and buyers to preload (requires --in-memory)
    #[arg(long, requires = "in_memory")]
    seed: Option<PathBuf>,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Initialize tracing
    init_tracing();

    // Parse command line arguments
    let args = Args::parse();

    tracing::info!("Starting rantang-server v{}", env!("CARGO_PKG_VERSION"));

    // Load configuration
    let config_loader = Arc::new(ConfigLoader::new(&args.config, args.listen));
    let loaded_config = config_loader.load().map_err(|e| {
        tracing::error!("Failed to load configuration: {}", e);
        e
    })?;

    let listen_addr = loaded_config.server.listen;
    tracing::info!("Configuration loaded from {:?}", args.config);

    // Convert to shared config with separate locks for each section
    let shared_config = loaded_config.into_shared();

    let (store, db_pool) = if args.in_memory {
        (memory_store(args.seed.as_deref()).await?, None)
    } else {
        // Get database URL from environment
        let database_url = get_database_url().map_err(|e| {
            tracing::error!("DATABASE_URL environment variable not set");
            e
        })?;

        // Create database connection pool
        tracing::info!("Connecting to database...");
        let db_pool = PgPoolOptions::new()
            .max_connections(10)
            .connect(&database_url)
            .await
            .map_err(|e| {
                tracing::error!("Failed to connect to database: {}", e);
                e
            })?;
        tracing::info!("Database connection established");

        // Run migrations if requested
        if args.migrate {
            tracing::info!("Running database migrations...");
            sqlx::migrate!("../migrations")
                .run(&db_pool)
                .await
                .map_err(|e| {
                    tracing::error!("Failed to run migrations: {}", e);
                    e
                })?;
            tracing::info!("Migrations completed successfully");
        }

        (OrderStore::postgres(db_pool.clone()), Some(db_pool))
    };

    let gateway = SnapGateway::new(shared_config.gateway.clone());
    let lifecycle = OrderLifecycle::new(store, Arc::new(gateway), order_status_channel());

    // Create application state
    let state = AppState::new(lifecycle, shared_config);

    // Spawn config reload handler (listens for SIGHUP)
    let shutdown_notify = spawn_config_reload_handler(state.clone(), config_loader);

    // Build the router
    let router = build_router(state);

    // Run the server
    tracing::info!("Starting HTTP server on {}", listen_addr);
    let result = run_server(router, listen_addr).await;

    // Signal the config reload handler to stop
    shutdown_notify.notify_one();

    // Close database connections gracefully
    if let Some(db_pool) = db_pool {
        tracing::info!("Closing database connections...");
        db_pool.close().await;
    }
    tracing::info!("Server shutdown complete");

    result.map_err(Into::into)
}

/// Build the in-memory store, preloading sellers and buyers from `seed`.
async fn memory_store(seed: Option<&std::path::Path>) -> anyhow::Result<OrderStore> {
    let seed = match seed {
        Some(path) => {
            let content = std::fs::read_to_string(path)?;
            let seed: MemorySeed = serde_json::from_str(&content)?;
            tracing::info!(
                sellers = seed.sellers.len(),
                buyers = seed.buyers.len(),
                "Loaded seed from {:?}",
                path
            );
            seed
        }
        None => MemorySeed::default(),
    };
    tracing::warn!("Using the in-memory store; records are lost on exit");
    Ok(OrderStore::Memory(MemoryProcessor::from_seed(seed).await))
}

/// Initialize the tracing subscriber with environment-based filtering.
fn init_tracing() {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new("info,sqlx=warn,tower_http=debug"));

    tracing_subscriber::registry()
        .with(filter)
        .with(tracing_subscriber::fmt::layer())
        .init();
}
