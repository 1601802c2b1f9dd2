mod migrations;
mod server;

use anyhow::Result;
use clap::Parser;
use tracing::info;

use ringside_core::{
    bootstrap::{init_database, init_services, init_store, load_config},
    config::StorageBackend,
    logging,
};

use server::RingsideServer;

/// Live judge scoring coordinator
#[derive(Debug, Parser)]
#[command(name = "ringside", version, about)]
struct Args {
    /// Path to a YAML config file
    #[arg(short, long, env = "RINGSIDE_CONFIG_PATH")]
    config: Option<String>,
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();

    // 1. Configuration (validated inside load_config)
    let config = load_config(args.config.as_deref())?;

    // 2. Logging
    logging::init_logging(&config.logging)?;
    info!(
        http_address = %config.http_address(),
        backend = ?config.storage.backend,
        "Ringside server starting..."
    );

    // 3. Storage
    let pool = match config.storage.backend {
        StorageBackend::Postgres => {
            let pool = init_database(&config).await?;
            migrations::run_migrations(&pool).await?;
            Some(pool)
        }
        StorageBackend::Memory => None,
    };
    let store = init_store(&config, pool.clone())?;

    // 4. Services and server
    let services = init_services(store, &config);
    RingsideServer::new(config, services, pool).start().await
}
