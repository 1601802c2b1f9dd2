use anyhow::Result;
use sqlx::PgPool;
use tracing::{error, info};

/// Apply pending migrations from `migrations/`.
///
/// Ringside runs as a single node, so no cross-replica lock is taken.
pub async fn run_migrations(pool: &PgPool) -> Result<()> {
    info!("Running database migrations...");

    sqlx::migrate!("../migrations")
        .run(pool)
        .await
        .map_err(|e| {
            error!(error = %e, "Failed to run migrations");
            anyhow::anyhow!("Migration failed: {e}")
        })?;

    info!("Migrations completed");
    Ok(())
}
