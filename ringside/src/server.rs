//! Server lifecycle: bind, serve, drain on shutdown.

use std::time::Duration;

use sqlx::PgPool;
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;
use tracing::{error, info, warn};

use ringside_core::{bootstrap::Services, Config};

const DRAIN_TIMEOUT: Duration = Duration::from_secs(10);
const DRAIN_POLL_INTERVAL: Duration = Duration::from_millis(250);

pub struct RingsideServer {
    config: Config,
    services: Services,
    pool: Option<PgPool>,
}

impl RingsideServer {
    pub const fn new(config: Config, services: Services, pool: Option<PgPool>) -> Self {
        Self {
            config,
            services,
            pool,
        }
    }

    /// Serve until the HTTP task exits or a shutdown signal arrives
    pub async fn start(self) -> anyhow::Result<()> {
        let shutdown = CancellationToken::new();
        let http_handle = self.start_http_server(shutdown.clone()).await?;

        info!("Ringside server started");

        tokio::select! {
            result = http_handle => {
                if let Err(e) = result {
                    error!(error = %e, "HTTP server task failed");
                }
                error!("HTTP server stopped unexpectedly");
            }
            () = shutdown_signal() => {
                info!("Shutdown signal received, starting graceful shutdown...");
            }
        }

        shutdown.cancel();
        self.shutdown().await;
        Ok(())
    }

    async fn shutdown(&self) {
        let active = self.services.hub.connection_count();
        if active > 0 {
            info!(
                active,
                timeout_secs = DRAIN_TIMEOUT.as_secs(),
                "Waiting for websocket clients to disconnect"
            );
            let deadline = tokio::time::Instant::now() + DRAIN_TIMEOUT;
            loop {
                let remaining = self.services.hub.connection_count();
                if remaining == 0 {
                    info!("All websocket clients disconnected");
                    break;
                }
                if tokio::time::Instant::now() >= deadline {
                    warn!(remaining, "Drain timeout reached, proceeding with shutdown");
                    break;
                }
                tokio::time::sleep(DRAIN_POLL_INTERVAL).await;
            }
        }

        if let Some(pool) = &self.pool {
            info!("Closing database connection pool...");
            pool.close().await;
        }

        info!("Ringside server shut down complete");
    }

    async fn start_http_server(&self, shutdown: CancellationToken) -> anyhow::Result<JoinHandle<()>> {
        let http_address = self.config.http_address();
        let http_addr: std::net::SocketAddr = http_address
            .parse()
            .map_err(|e| anyhow::anyhow!("Invalid HTTP address '{http_address}': {e}"))?;

        let listener = tokio::net::TcpListener::bind(http_addr)
            .await
            .map_err(|e| anyhow::anyhow!("Failed to bind HTTP address {http_addr}: {e}"))?;
        info!(address = %http_addr, "HTTP server listening");

        let router = ringside_api::create_router(self.services.clone(), self.config.websocket.clone());

        let handle = tokio::spawn(async move {
            if let Err(e) = axum::serve(listener, router)
                .with_graceful_shutdown(shutdown.cancelled_owned())
                .await
            {
                error!(error = %e, "HTTP server error");
            }

            info!("HTTP server shut down gracefully");
        });

        Ok(handle)
    }
}

/// Wait for SIGTERM or Ctrl+C
async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            error!(error = %e, "Failed to install Ctrl+C handler");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut signal) => {
                signal.recv().await;
            }
            Err(e) => {
                error!(error = %e, "Failed to install SIGTERM handler");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        () = ctrl_c => { info!("Received Ctrl+C"); }
        () = terminate => { info!("Received SIGTERM"); }
    }
}
