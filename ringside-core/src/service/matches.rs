use std::sync::Arc;

use tracing::info;

use crate::{
    models::{Match, MatchId, MatchWithRounds, NewMatch, Round},
    repository::ScoreboardStore,
    Error, Result,
};

/// Roster intake and lookups
#[derive(Clone)]
pub struct MatchService {
    store: Arc<dyn ScoreboardStore>,
}

impl std::fmt::Debug for MatchService {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("MatchService").finish()
    }
}

impl MatchService {
    #[must_use]
    pub fn new(store: Arc<dyn ScoreboardStore>) -> Self {
        Self { store }
    }

    pub async fn create_match(&self, new: &NewMatch) -> Result<MatchWithRounds> {
        new.validate()?;
        let created = self.store.create_match(new).await?;
        info!(
            match_id = %created.info.id,
            match_number = created.info.match_number,
            rounds = created.rounds.len(),
            "Match created"
        );
        Ok(created)
    }

    /// Bulk intake; every entry is validated before anything is written
    pub async fn create_matches(&self, entries: &[NewMatch]) -> Result<Vec<MatchWithRounds>> {
        for entry in entries {
            entry.validate()?;
        }
        let mut created = Vec::with_capacity(entries.len());
        for entry in entries {
            created.push(self.store.create_match(entry).await?);
        }
        info!(count = created.len(), "Roster imported");
        Ok(created)
    }

    pub async fn list(&self) -> Result<Vec<Match>> {
        self.store.list_matches().await
    }

    pub async fn rounds_for_match(&self, match_id: MatchId) -> Result<Vec<Round>> {
        self.descriptor(match_id).await.map(|m| m.rounds)
    }

    /// Match fields plus its rounds, as sent on `next-match`
    pub async fn descriptor(&self, match_id: MatchId) -> Result<MatchWithRounds> {
        let info = self
            .store
            .get_match(match_id)
            .await?
            .ok_or_else(|| Error::NotFound(format!("match {match_id} not found")))?;
        let rounds = self.store.rounds_for_match(match_id).await?;
        Ok(MatchWithRounds { info, rounds })
    }
}
