//! Judge presence: registration, reconnection and connection tracking.
//!
//! A judge may be joined over several websocket sessions at once (a phone
//! reconnecting before the old socket times out). Presence is held by the
//! set of sessions that joined it; closing one session only disconnects the
//! judge when no other session still holds it.

use std::{collections::HashSet, sync::Arc};

use dashmap::DashMap;
use tokio::sync::Mutex;
use tracing::{debug, info};

use super::admission::AdmissionGate;
use crate::{
    broadcast::{BroadcastHub, JudgeJoined, StatusEvent},
    config::JudgesConfig,
    models::{DeviceToken, Judge, JudgeId, MatchId, NewJudge, RegisterJudge},
    repository::ScoreboardStore,
    Error, Result,
};

/// Upper bound for one `provision` call
pub const MAX_PROVISION_COUNT: usize = 64;

#[derive(Clone)]
pub struct JudgeService {
    store: Arc<dyn ScoreboardStore>,
    hub: BroadcastHub,
    gate: Arc<dyn AdmissionGate>,
    config: JudgesConfig,
    /// Serializes registrations so the judge limit check and the write
    /// happen as one step
    register_lock: Arc<Mutex<()>>,
    /// Websocket sessions currently holding each judge's presence
    sessions: Arc<DashMap<JudgeId, HashSet<String>>>,
}

impl std::fmt::Debug for JudgeService {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("JudgeService")
            .field("config", &self.config)
            .finish_non_exhaustive()
    }
}

impl JudgeService {
    #[must_use]
    pub fn new(
        store: Arc<dyn ScoreboardStore>,
        hub: BroadcastHub,
        gate: Arc<dyn AdmissionGate>,
        config: JudgesConfig,
    ) -> Self {
        Self {
            store,
            hub,
            gate,
            config,
            register_lock: Arc::new(Mutex::new(())),
            sessions: Arc::new(DashMap::new()),
        }
    }

    /// Register a device, or reconnect it if the token is already known.
    ///
    /// A reconnect re-affiliates the judge with `matchId`, marks it
    /// connected and takes the supplied name when it is non-empty.
    pub async fn register(&self, request: &RegisterJudge) -> Result<Judge> {
        self.register_with_session(request, None).await
    }

    /// Register over a websocket session, which then holds the judge's
    /// presence until [`Self::leave_session`]
    pub async fn join_session(&self, request: &RegisterJudge, session_id: &str) -> Result<Judge> {
        self.register_with_session(request, Some(session_id)).await
    }

    /// Release `session_id`'s hold on the judge. Returns `true` when it was
    /// the last holder and the judge is now disconnected.
    pub async fn leave_session(&self, judge_id: JudgeId, session_id: &str) -> Result<bool> {
        let _guard = self.register_lock.lock().await;
        let remaining = match self.sessions.get_mut(&judge_id) {
            Some(mut holders) => {
                holders.remove(session_id);
                holders.len()
            }
            None => 0,
        };
        if remaining > 0 {
            debug!(judge_id = %judge_id, remaining, "Judge still held by another session");
            return Ok(false);
        }
        self.sessions.remove(&judge_id);
        self.set_connected(judge_id, false).await?;
        Ok(true)
    }

    async fn register_with_session(
        &self,
        request: &RegisterJudge,
        session_id: Option<&str>,
    ) -> Result<Judge> {
        if request.device_token.is_blank() {
            return Err(Error::Validation("deviceToken is required".to_string()));
        }
        if !self.gate.may_register(request).await? {
            return Err(Error::Forbidden("admission refused".to_string()));
        }
        if self.store.get_match(request.match_id).await?.is_none() {
            return Err(Error::NotFound(format!("match {} not found", request.match_id)));
        }

        let _guard = self.register_lock.lock().await;
        let name = request
            .name
            .as_deref()
            .map(str::trim)
            .filter(|n| !n.is_empty());

        let judge = match self.store.judge_by_token(&request.device_token).await? {
            Some(mut existing) => {
                let already_here = existing.is_connected && existing.is_affiliated_with(request.match_id);
                if !already_here {
                    self.check_judge_limit(request.match_id).await?;
                }
                existing.is_connected = true;
                existing.match_id = Some(request.match_id);
                if let Some(name) = name {
                    existing.name = name.to_string();
                }
                let judge = self.store.update_judge(&existing).await?;
                info!(judge_id = %judge.id, match_id = %request.match_id, "Judge reconnected");
                judge
            }
            None => {
                if self.config.require_provisioned_tokens {
                    return Err(Error::NotFound(format!(
                        "device token {} is not provisioned",
                        request.device_token
                    )));
                }
                self.check_judge_limit(request.match_id).await?;
                let judge = self
                    .store
                    .create_judge(&NewJudge {
                        name: name.unwrap_or_default().to_string(),
                        device_token: request.device_token.clone(),
                        is_connected: true,
                        match_id: Some(request.match_id),
                    })
                    .await?;
                info!(judge_id = %judge.id, match_id = %request.match_id, "Judge registered");
                judge
            }
        };

        if let Some(session_id) = session_id {
            self.sessions
                .entry(judge.id)
                .or_default()
                .insert(session_id.to_string());
        }

        self.hub.publish(
            StatusEvent::Joined(JudgeJoined {
                judge_id: judge.device_token.clone(),
                judge_name: judge.name.clone(),
                match_id: request.match_id,
            })
            .into(),
        );

        Ok(judge)
    }

    async fn check_judge_limit(&self, match_id: MatchId) -> Result<()> {
        if !self.config.enforce_judge_limit {
            return Ok(());
        }
        let Some(progress) = self.store.active_progress().await? else {
            return Ok(());
        };
        if progress.match_id != match_id {
            return Ok(());
        }
        let connected = self.store.count_connected(match_id).await?;
        if connected >= i64::from(progress.judge_count) {
            return Err(Error::Forbidden(format!(
                "match {match_id} already has {connected} connected judge(s)"
            )));
        }
        Ok(())
    }

    pub async fn set_connected(&self, judge_id: JudgeId, connected: bool) -> Result<Judge> {
        let mut judge = self
            .store
            .get_judge(judge_id)
            .await?
            .ok_or_else(|| Error::NotFound(format!("judge {judge_id} not found")))?;
        if judge.is_connected == connected {
            return Ok(judge);
        }
        judge.is_connected = connected;
        let judge = self.store.update_judge(&judge).await?;
        debug!(judge_id = %judge_id, connected, "Judge connection changed");
        Ok(judge)
    }

    /// Look up a judge by the token its device presents
    pub async fn resolve(&self, token: &DeviceToken) -> Result<Judge> {
        self.store
            .judge_by_token(token)
            .await?
            .ok_or_else(|| Error::NotFound(format!("judge with device token {token} not found")))
    }

    pub async fn count_connected(&self, match_id: MatchId) -> Result<i64> {
        self.store.count_connected(match_id).await
    }

    pub async fn list_for_match(&self, match_id: MatchId) -> Result<Vec<Judge>> {
        self.store.judges_for_match(match_id).await
    }

    pub async fn list_connected_for_match(&self, match_id: MatchId) -> Result<Vec<Judge>> {
        let mut judges = self.store.judges_for_match(match_id).await?;
        judges.retain(|j| j.is_connected);
        Ok(judges)
    }

    pub async fn list_all(&self) -> Result<Vec<Judge>> {
        self.store.list_judges().await
    }

    /// Create `count` blank, disconnected judges and hand back their tokens
    pub async fn provision(&self, count: usize) -> Result<Vec<DeviceToken>> {
        if count == 0 || count > MAX_PROVISION_COUNT {
            return Err(Error::Validation(format!(
                "count must be between 1 and {MAX_PROVISION_COUNT}"
            )));
        }
        let mut tokens = Vec::with_capacity(count);
        for _ in 0..count {
            let judge = self
                .store
                .create_judge(&NewJudge {
                    name: String::new(),
                    device_token: DeviceToken::generate(),
                    is_connected: false,
                    match_id: None,
                })
                .await?;
            tokens.push(judge.device_token);
        }
        info!(count, "Provisioned judge device tokens");
        Ok(tokens)
    }
}

/// Build one disconnected judge per name, affiliated with `match_id`.
///
/// Every name is checked before anything is returned, so a caller never
/// writes a partial batch.
pub fn named_judges(match_id: MatchId, names: &[String]) -> Result<Vec<NewJudge>> {
    if names.len() > MAX_PROVISION_COUNT {
        return Err(Error::Validation(format!(
            "at most {MAX_PROVISION_COUNT} judges can be provisioned at once"
        )));
    }
    names
        .iter()
        .map(|name| {
            let name = name.trim();
            if name.is_empty() {
                return Err(Error::Validation("judge names cannot be empty".to_string()));
            }
            Ok(NewJudge {
                name: name.to_string(),
                device_token: DeviceToken::generate(),
                is_connected: false,
                match_id: Some(match_id),
            })
        })
        .collect()
}
