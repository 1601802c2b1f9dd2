use std::sync::Arc;

use sqlx::PgPool;
use tracing::info;

use crate::{
    broadcast::BroadcastHub,
    config::StorageBackend,
    repository::{MemoryStore, PgStore, ScoreboardStore},
    service::{
        AdmissionGate, AdmissionService, JudgeService, MatchService, OpenAdmission,
        PasswordAdmission, ProgressService, ScoreService,
    },
    Config,
};

/// Everything the HTTP and websocket layers call into
#[derive(Clone)]
pub struct Services {
    pub hub: BroadcastHub,
    pub judges: JudgeService,
    pub scores: ScoreService,
    pub progress: ProgressService,
    pub matches: MatchService,
    pub admission: AdmissionService,
}

impl std::fmt::Debug for Services {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Services").field("hub", &self.hub).finish_non_exhaustive()
    }
}

/// Pick the store for the configured backend; `pool` is required for postgres
pub fn init_store(
    config: &Config,
    pool: Option<PgPool>,
) -> anyhow::Result<Arc<dyn ScoreboardStore>> {
    match config.storage.backend {
        StorageBackend::Postgres => {
            let pool = pool
                .ok_or_else(|| anyhow::anyhow!("postgres backend selected but no pool given"))?;
            Ok(Arc::new(PgStore::new(pool)))
        }
        StorageBackend::Memory => {
            info!("Using in-memory store; state is lost on restart");
            Ok(Arc::new(MemoryStore::new()))
        }
    }
}

/// Wire services over one store and one broadcast hub
#[must_use]
pub fn init_services(store: Arc<dyn ScoreboardStore>, config: &Config) -> Services {
    let hub = BroadcastHub::new(config.websocket.channel_capacity);

    let gate: Arc<dyn AdmissionGate> = if config.judges.require_access_password {
        Arc::new(PasswordAdmission::new(Arc::clone(&store)))
    } else {
        Arc::new(OpenAdmission)
    };

    let judges = JudgeService::new(
        Arc::clone(&store),
        hub.clone(),
        gate,
        config.judges.clone(),
    );
    let progress = ProgressService::new(Arc::clone(&store), hub.clone());
    let scores = ScoreService::new(
        Arc::clone(&store),
        hub.clone(),
        config.scoring.clone(),
        progress.transition_lock(),
    );
    let matches = MatchService::new(Arc::clone(&store));
    let admission = AdmissionService::new(store);

    info!(
        require_access_password = config.judges.require_access_password,
        require_provisioned_tokens = config.judges.require_provisioned_tokens,
        enforce_judge_limit = config.judges.enforce_judge_limit,
        "Services initialized"
    );

    Services {
        hub,
        judges,
        scores,
        progress,
        matches,
        admission,
    }
}
