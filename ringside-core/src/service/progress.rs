//! The live match pointer and its transitions.
//!
//! All transitions hold the write side of one `RwLock`. Score writers hold
//! the read side for their whole check-then-write, so a lock, end or switch
//! never lands between a submission's state check and its write. Creating or
//! replacing the active row goes through the store's atomic
//! `activate_progress` and `switch_progress`, so no reader ever sees two
//! active rows.

use std::sync::Arc;

use tokio::sync::RwLock;
use tracing::{info, warn};

use crate::{
    broadcast::{BroadcastEvent, BroadcastHub, StatusEvent},
    models::{Match, MatchId, MatchProgress, MatchWithRounds, NewProgress, QrStatus},
    repository::ScoreboardStore,
    Error, Result,
};

#[derive(Clone)]
pub struct ProgressService {
    store: Arc<dyn ScoreboardStore>,
    hub: BroadcastHub,
    transition: Arc<RwLock<()>>,
}

impl std::fmt::Debug for ProgressService {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ProgressService").finish_non_exhaustive()
    }
}

impl ProgressService {
    #[must_use]
    pub fn new(store: Arc<dyn ScoreboardStore>, hub: BroadcastHub) -> Self {
        Self {
            store,
            hub,
            transition: Arc::new(RwLock::new(())),
        }
    }

    /// Shared with score writers, which take the read side
    #[must_use]
    pub fn transition_lock(&self) -> Arc<RwLock<()>> {
        Arc::clone(&self.transition)
    }

    async fn require_active(&self) -> Result<MatchProgress> {
        self.store
            .active_progress()
            .await?
            .ok_or_else(|| Error::InvalidState("no match in progress".to_string()))
    }

    async fn load_match(&self, match_id: MatchId) -> Result<Match> {
        self.store
            .get_match(match_id)
            .await?
            .ok_or_else(|| Error::NotFound(format!("match {match_id} not found")))
    }

    /// Make `match_id` the live match at round 1, ending whatever was live
    pub async fn start(&self, match_id: MatchId, judge_count: i32) -> Result<MatchProgress> {
        if judge_count < 1 {
            return Err(Error::Validation("judgeCount must be at least 1".to_string()));
        }
        let _guard = self.transition.write().await;

        self.load_match(match_id).await?;
        let first = self
            .store
            .round_by_number(match_id, 1)
            .await?
            .ok_or_else(|| Error::InvalidState(format!("match {match_id} has no rounds")))?;

        let progress = self
            .store
            .activate_progress(&NewProgress {
                match_id,
                round_id: first.id,
                judge_count,
            })
            .await?;
        info!(match_id = %match_id, judge_count, "Match started");
        Ok(progress)
    }

    pub async fn current(&self) -> Result<Option<MatchProgress>> {
        self.store.active_progress().await
    }

    pub async fn current_round_number(&self) -> Result<i32> {
        Ok(self.require_active().await?.current_round_number)
    }

    pub async fn judge_count(&self) -> Result<i32> {
        Ok(self.require_active().await?.judge_count)
    }

    pub async fn lock(&self) -> Result<MatchProgress> {
        let _guard = self.transition.write().await;
        let mut progress = self.require_active().await?;
        progress.lock()?;
        let progress = self.store.update_progress(&progress).await?;
        info!(match_id = %progress.match_id, round = progress.current_round_number, "Round locked");
        self.hub.publish(StatusEvent::Locked(progress.clone()).into());
        Ok(progress)
    }

    pub async fn unlock(&self) -> Result<MatchProgress> {
        let _guard = self.transition.write().await;
        let mut progress = self.require_active().await?;
        progress.unlock()?;
        let progress = self.store.update_progress(&progress).await?;
        info!(match_id = %progress.match_id, round = progress.current_round_number, "Round unlocked");
        self.hub.publish(StatusEvent::Unlocked(progress.clone()).into());
        Ok(progress)
    }

    /// Advance to the next round of the live match and reopen input
    pub async fn next_round(&self) -> Result<MatchProgress> {
        let _guard = self.transition.write().await;
        let mut progress = self.require_active().await?;
        let bout = self.load_match(progress.match_id).await?;

        let next_number = progress.current_round_number + 1;
        if next_number > bout.round_count {
            return Err(Error::InvalidState(format!(
                "round number out of range: match {} has {} round(s)",
                bout.id, bout.round_count
            )));
        }
        let next = self
            .store
            .round_by_number(bout.id, next_number)
            .await?
            .ok_or_else(|| {
                Error::InvalidState(format!("match {} has no round {next_number}", bout.id))
            })?;

        progress.advance_round(bout.round_count, next.id)?;
        let progress = self.store.update_progress(&progress).await?;
        info!(match_id = %bout.id, round = progress.current_round_number, "Round advanced");
        self.hub.publish(StatusEvent::RoundChanged(progress.clone()).into());
        Ok(progress)
    }

    pub async fn end_match(&self) -> Result<MatchProgress> {
        let _guard = self.transition.write().await;
        let mut progress = self.require_active().await?;
        progress.end()?;
        let progress = self.store.update_progress(&progress).await?;
        info!(match_id = %progress.match_id, "Match ended");
        self.hub.publish(StatusEvent::MatchEnded(progress.clone()).into());
        Ok(progress)
    }

    /// Hand the card over to the match after `current_match_id`.
    ///
    /// On failure nothing changes. On success the successor is live at
    /// round 1, every connected judge follows it, and its descriptor goes
    /// out on `next-match`.
    pub async fn switch_to_next_match(&self, current_match_id: MatchId) -> Result<MatchProgress> {
        let _guard = self.transition.write().await;

        self.load_match(current_match_id).await?;
        let Some(next) = self.store.next_match_after(current_match_id).await? else {
            warn!(match_id = %current_match_id, "Switch requested after the last match");
            return Err(Error::InvalidState("no more matches".to_string()));
        };
        let rounds = self.store.rounds_for_match(next.id).await?;
        let Some(first) = rounds.iter().find(|r| r.round_number == 1) else {
            return Err(Error::InvalidState(format!("match {} has no rounds", next.id)));
        };

        let carried = match self.store.active_progress().await? {
            Some(active) => Some(active),
            None => self.store.latest_progress().await?,
        };
        let judge_count = carried
            .map(|p| p.judge_count)
            .ok_or_else(|| Error::InvalidState("judge count unknown: no match was started".to_string()))?;

        let progress = self
            .store
            .switch_progress(&NewProgress {
                match_id: next.id,
                round_id: first.id,
                judge_count,
            })
            .await?;

        info!(
            from_match = %current_match_id,
            to_match = %next.id,
            judge_count,
            "Switched to next match"
        );
        self.hub.publish(BroadcastEvent::NextMatch(MatchWithRounds {
            info: next,
            rounds,
        }));
        Ok(progress)
    }

    /// Admission flags of the most recent progress row for the match
    pub async fn qr_status(&self, match_id: MatchId) -> Result<QrStatus> {
        self.store
            .latest_progress_for_match(match_id)
            .await?
            .map(|p| QrStatus::from(&p))
            .ok_or_else(|| Error::NotFound(format!("no progress recorded for match {match_id}")))
    }

    pub async fn mark_qr_generated(&self, match_id: MatchId, password_set: bool) -> Result<QrStatus> {
        self.store
            .set_qr_status(match_id, true, password_set)
            .await?
            .map(|p| QrStatus::from(&p))
            .ok_or_else(|| Error::NotFound(format!("no progress recorded for match {match_id}")))
    }
}
