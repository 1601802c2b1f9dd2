//! Process-local store.
//!
//! All tables sit behind one `RwLock`, so every trait method is trivially
//! atomic. Used by the test suites and by `storage.backend = "memory"`.

use std::collections::BTreeMap;

use async_trait::async_trait;
use chrono::Utc;
use parking_lot::RwLock;

use super::ScoreboardStore;
use crate::{
    models::{
        DeviceToken, Judge, JudgeAccess, JudgeId, JudgeScore, Match, MatchId, MatchProgress,
        MatchWithRounds, NewJudge, NewMatch, NewProgress, ProgressId, Round, RoundId, Score,
        Winner,
    },
    Error, Result,
};

#[derive(Default)]
struct Tables {
    next_id: i64,
    matches: BTreeMap<MatchId, Match>,
    rounds: BTreeMap<RoundId, Round>,
    judges: BTreeMap<JudgeId, Judge>,
    scores: BTreeMap<(RoundId, JudgeId), Score>,
    progress: BTreeMap<ProgressId, MatchProgress>,
    access: BTreeMap<String, JudgeAccess>,
}

impl Tables {
    fn next_id(&mut self) -> i64 {
        self.next_id += 1;
        self.next_id
    }

    fn rounds_for(&self, match_id: MatchId) -> Vec<Round> {
        let mut rounds: Vec<Round> = self
            .rounds
            .values()
            .filter(|r| r.match_id == match_id)
            .cloned()
            .collect();
        rounds.sort_by_key(|r| r.round_number);
        rounds
    }

    fn end_active_progress(&mut self) {
        let now = Utc::now();
        for progress in self.progress.values_mut().filter(|p| p.is_active()) {
            progress.is_end_of_match = true;
            progress.is_locked = true;
            progress.updated_at = now;
        }
    }

    fn insert_progress(&mut self, new: &NewProgress) -> MatchProgress {
        let now = Utc::now();
        let progress = MatchProgress {
            id: ProgressId::new(self.next_id()),
            match_id: new.match_id,
            round_id: Some(new.round_id),
            current_round_number: 1,
            is_locked: false,
            is_end_of_match: false,
            judge_count: new.judge_count,
            qr_generated: false,
            password_set: false,
            created_at: now,
            updated_at: now,
        };
        self.progress.insert(progress.id, progress.clone());
        progress
    }

    fn check_new_judge(&self, new: &NewJudge) -> Result<()> {
        if self
            .judges
            .values()
            .any(|j| j.device_token == new.device_token)
        {
            return Err(Error::Validation("Device token already registered".to_string()));
        }
        if let Some(match_id) = new.match_id {
            if !self.matches.contains_key(&match_id) {
                return Err(Error::NotFound("Referenced resource not found".to_string()));
            }
        }
        Ok(())
    }

    fn insert_judge(&mut self, new: &NewJudge) -> Judge {
        let judge = Judge {
            id: JudgeId::new(self.next_id()),
            name: new.name.clone(),
            device_token: new.device_token.clone(),
            is_connected: new.is_connected,
            match_id: new.match_id,
        };
        self.judges.insert(judge.id, judge.clone());
        judge
    }

    fn mark_qr(
        &mut self,
        match_id: MatchId,
        qr_generated: bool,
        password_set: bool,
    ) -> Option<MatchProgress> {
        self.progress
            .values_mut()
            .rev()
            .find(|p| p.match_id == match_id)
            .map(|progress| {
                progress.qr_generated = qr_generated;
                progress.password_set = password_set;
                progress.updated_at = Utc::now();
                progress.clone()
            })
    }

    fn check_progress_refs(&self, new: &NewProgress) -> Result<()> {
        if !self.matches.contains_key(&new.match_id) {
            return Err(Error::NotFound(format!("match {} not found", new.match_id)));
        }
        if !self.rounds.contains_key(&new.round_id) {
            return Err(Error::NotFound(format!("round {} not found", new.round_id)));
        }
        Ok(())
    }
}

/// In-memory `ScoreboardStore`
#[derive(Default)]
pub struct MemoryStore {
    tables: RwLock<Tables>,
}

impl std::fmt::Debug for MemoryStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let tables = self.tables.read();
        f.debug_struct("MemoryStore")
            .field("matches", &tables.matches.len())
            .field("judges", &tables.judges.len())
            .field("scores", &tables.scores.len())
            .finish()
    }
}

impl MemoryStore {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl ScoreboardStore for MemoryStore {
    async fn create_match(&self, new: &NewMatch) -> Result<MatchWithRounds> {
        let mut tables = self.tables.write();
        let info = Match {
            id: MatchId::new(tables.next_id()),
            match_number: new.match_number,
            division: new.division.clone(),
            round_count: new.round_count,
            red_name: new.red_name.clone(),
            blue_name: new.blue_name.clone(),
            red_gym: new.red_gym.clone(),
            blue_gym: new.blue_gym.clone(),
            created_at: Utc::now(),
        };
        tables.matches.insert(info.id, info.clone());

        let mut rounds = Vec::with_capacity(usize::try_from(new.round_count).unwrap_or(0));
        for round_number in 1..=new.round_count {
            let round = Round {
                id: RoundId::new(tables.next_id()),
                match_id: info.id,
                round_number,
                is_finished: false,
                winner: None,
            };
            tables.rounds.insert(round.id, round.clone());
            rounds.push(round);
        }

        Ok(MatchWithRounds { info, rounds })
    }

    async fn get_match(&self, match_id: MatchId) -> Result<Option<Match>> {
        Ok(self.tables.read().matches.get(&match_id).cloned())
    }

    async fn list_matches(&self) -> Result<Vec<Match>> {
        Ok(self.tables.read().matches.values().cloned().collect())
    }

    async fn next_match_after(&self, match_id: MatchId) -> Result<Option<Match>> {
        let tables = self.tables.read();
        Ok(tables
            .matches
            .range((std::ops::Bound::Excluded(match_id), std::ops::Bound::Unbounded))
            .next()
            .map(|(_, m)| m.clone()))
    }

    async fn rounds_for_match(&self, match_id: MatchId) -> Result<Vec<Round>> {
        Ok(self.tables.read().rounds_for(match_id))
    }

    async fn get_round(&self, round_id: RoundId) -> Result<Option<Round>> {
        Ok(self.tables.read().rounds.get(&round_id).cloned())
    }

    async fn round_by_number(&self, match_id: MatchId, round_number: i32) -> Result<Option<Round>> {
        Ok(self
            .tables
            .read()
            .rounds
            .values()
            .find(|r| r.match_id == match_id && r.round_number == round_number)
            .cloned())
    }

    async fn set_round_result(
        &self,
        round_id: RoundId,
        is_finished: bool,
        winner: Option<Winner>,
    ) -> Result<Round> {
        let mut tables = self.tables.write();
        let round = tables
            .rounds
            .get_mut(&round_id)
            .ok_or_else(|| Error::NotFound(format!("round {round_id} not found")))?;
        round.is_finished = is_finished;
        round.winner = winner;
        Ok(round.clone())
    }

    async fn create_judge(&self, new: &NewJudge) -> Result<Judge> {
        let mut tables = self.tables.write();
        tables.check_new_judge(new)?;
        Ok(tables.insert_judge(new))
    }

    async fn get_judge(&self, judge_id: JudgeId) -> Result<Option<Judge>> {
        Ok(self.tables.read().judges.get(&judge_id).cloned())
    }

    async fn judge_by_token(&self, token: &DeviceToken) -> Result<Option<Judge>> {
        Ok(self
            .tables
            .read()
            .judges
            .values()
            .find(|j| &j.device_token == token)
            .cloned())
    }

    async fn update_judge(&self, judge: &Judge) -> Result<Judge> {
        let mut tables = self.tables.write();
        let stored = tables
            .judges
            .get_mut(&judge.id)
            .ok_or_else(|| Error::NotFound(format!("judge {} not found", judge.id)))?;
        stored.name = judge.name.clone();
        stored.is_connected = judge.is_connected;
        stored.match_id = judge.match_id;
        Ok(stored.clone())
    }

    async fn list_judges(&self) -> Result<Vec<Judge>> {
        Ok(self.tables.read().judges.values().cloned().collect())
    }

    async fn judges_for_match(&self, match_id: MatchId) -> Result<Vec<Judge>> {
        Ok(self
            .tables
            .read()
            .judges
            .values()
            .filter(|j| j.is_affiliated_with(match_id))
            .cloned()
            .collect())
    }

    async fn count_connected(&self, match_id: MatchId) -> Result<i64> {
        let count = self
            .tables
            .read()
            .judges
            .values()
            .filter(|j| j.is_connected && j.is_affiliated_with(match_id))
            .count();
        Ok(i64::try_from(count).unwrap_or(i64::MAX))
    }

    async fn upsert_score(
        &self,
        round_id: RoundId,
        judge_id: JudgeId,
        red: i32,
        blue: i32,
    ) -> Result<Score> {
        let mut tables = self.tables.write();
        if !tables.rounds.contains_key(&round_id) || !tables.judges.contains_key(&judge_id) {
            return Err(Error::NotFound("Referenced resource not found".to_string()));
        }
        let now = Utc::now();
        if let Some(score) = tables.scores.get_mut(&(round_id, judge_id)) {
            score.red_score = red;
            score.blue_score = blue;
            score.is_submitted = true;
            score.is_editable = true;
            score.submitted_at = now;
            return Ok(score.clone());
        }
        let score = Score {
            id: tables.next_id(),
            round_id,
            judge_id,
            red_score: red,
            blue_score: blue,
            is_submitted: true,
            is_editable: true,
            submitted_at: now,
        };
        tables.scores.insert((round_id, judge_id), score.clone());
        Ok(score)
    }

    async fn set_score_submitted(
        &self,
        round_id: RoundId,
        judge_id: JudgeId,
        submitted: bool,
    ) -> Result<Option<Score>> {
        let mut tables = self.tables.write();
        Ok(tables.scores.get_mut(&(round_id, judge_id)).map(|score| {
            score.is_submitted = submitted;
            score.clone()
        }))
    }

    async fn scores_for_round(&self, round_id: RoundId) -> Result<Vec<JudgeScore>> {
        let tables = self.tables.read();
        let mut entries: Vec<JudgeScore> = tables
            .scores
            .range((round_id, JudgeId::new(i64::MIN))..=(round_id, JudgeId::new(i64::MAX)))
            .filter_map(|(_, score)| {
                tables.judges.get(&score.judge_id).map(|judge| JudgeScore {
                    score: score.clone(),
                    judge_name: judge.name.clone(),
                    device_token: judge.device_token.clone(),
                })
            })
            .collect();
        entries.sort_by_key(|e| e.score.id);
        Ok(entries)
    }

    async fn active_progress(&self) -> Result<Option<MatchProgress>> {
        Ok(self
            .tables
            .read()
            .progress
            .values()
            .find(|p| p.is_active())
            .cloned())
    }

    async fn latest_progress(&self) -> Result<Option<MatchProgress>> {
        Ok(self.tables.read().progress.values().next_back().cloned())
    }

    async fn latest_progress_for_match(&self, match_id: MatchId) -> Result<Option<MatchProgress>> {
        Ok(self
            .tables
            .read()
            .progress
            .values()
            .rev()
            .find(|p| p.match_id == match_id)
            .cloned())
    }

    async fn activate_progress(&self, new: &NewProgress) -> Result<MatchProgress> {
        let mut tables = self.tables.write();
        tables.check_progress_refs(new)?;
        tables.end_active_progress();
        Ok(tables.insert_progress(new))
    }

    async fn switch_progress(&self, new: &NewProgress) -> Result<MatchProgress> {
        let mut tables = self.tables.write();
        tables.check_progress_refs(new)?;
        tables.end_active_progress();
        for judge in tables.judges.values_mut().filter(|j| j.is_connected) {
            judge.match_id = Some(new.match_id);
        }
        Ok(tables.insert_progress(new))
    }

    async fn update_progress(&self, progress: &MatchProgress) -> Result<MatchProgress> {
        let mut tables = self.tables.write();
        let stored = tables
            .progress
            .get_mut(&progress.id)
            .ok_or_else(|| Error::NotFound(format!("progress {} not found", progress.id)))?;
        stored.round_id = progress.round_id;
        stored.current_round_number = progress.current_round_number;
        stored.is_locked = progress.is_locked;
        stored.is_end_of_match = progress.is_end_of_match;
        stored.updated_at = progress.updated_at;
        Ok(stored.clone())
    }

    async fn set_qr_status(
        &self,
        match_id: MatchId,
        qr_generated: bool,
        password_set: bool,
    ) -> Result<Option<MatchProgress>> {
        Ok(self.tables.write().mark_qr(match_id, qr_generated, password_set))
    }

    async fn provision_access(
        &self,
        access_code: &str,
        password_hash: &str,
        match_id: MatchId,
        judges: &[NewJudge],
    ) -> Result<(JudgeAccess, Vec<Judge>)> {
        let mut tables = self.tables.write();
        if !tables.matches.contains_key(&match_id) {
            return Err(Error::NotFound(format!("match {match_id} not found")));
        }
        if tables.access.contains_key(access_code) {
            return Err(Error::Validation("Access code already exists".to_string()));
        }
        for (i, new) in judges.iter().enumerate() {
            tables.check_new_judge(new)?;
            if judges[..i].iter().any(|j| j.device_token == new.device_token) {
                return Err(Error::Validation("Device token already registered".to_string()));
            }
        }

        let access = JudgeAccess {
            id: tables.next_id(),
            access_code: access_code.to_string(),
            password_hash: password_hash.to_string(),
            created_at: Utc::now(),
        };
        tables.access.insert(access.access_code.clone(), access.clone());
        let created: Vec<Judge> = judges.iter().map(|new| tables.insert_judge(new)).collect();
        tables.mark_qr(match_id, true, true);
        Ok((access, created))
    }

    async fn access_by_code(&self, access_code: &str) -> Result<Option<JudgeAccess>> {
        Ok(self.tables.read().access.get(access_code).cloned())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn new_match(number: i32, rounds: i32) -> NewMatch {
        NewMatch {
            match_number: number,
            division: "open".to_string(),
            round_count: rounds,
            red_name: "Red".to_string(),
            blue_name: "Blue".to_string(),
            red_gym: None,
            blue_gym: None,
        }
    }

    #[tokio::test]
    async fn test_create_match_creates_numbered_rounds() {
        let store = MemoryStore::new();
        let created = store.create_match(&new_match(1, 3)).await.unwrap();

        let numbers: Vec<i32> = created.rounds.iter().map(|r| r.round_number).collect();
        assert_eq!(numbers, vec![1, 2, 3]);
        assert_eq!(store.rounds_for_match(created.info.id).await.unwrap().len(), 3);
    }

    #[tokio::test]
    async fn test_next_match_follows_id_order() {
        let store = MemoryStore::new();
        let first = store.create_match(&new_match(1, 1)).await.unwrap();
        let second = store.create_match(&new_match(2, 1)).await.unwrap();

        let next = store.next_match_after(first.info.id).await.unwrap().unwrap();
        assert_eq!(next.id, second.info.id);
        assert!(store.next_match_after(second.info.id).await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_upsert_overwrites_single_row() {
        let store = MemoryStore::new();
        let m = store.create_match(&new_match(1, 1)).await.unwrap();
        let judge = store
            .create_judge(&NewJudge {
                name: "A".to_string(),
                device_token: DeviceToken::from("a"),
                is_connected: true,
                match_id: Some(m.info.id),
            })
            .await
            .unwrap();
        let round_id = m.rounds[0].id;

        let first = store.upsert_score(round_id, judge.id, 7, 8).await.unwrap();
        let second = store.upsert_score(round_id, judge.id, 9, 9).await.unwrap();

        assert_eq!(first.id, second.id);
        let rows = store.scores_for_round(round_id).await.unwrap();
        assert_eq!(rows.len(), 1);
        assert_eq!(rows[0].score.red_score, 9);
    }

    #[tokio::test]
    async fn test_duplicate_device_token_rejected() {
        let store = MemoryStore::new();
        let new = NewJudge {
            name: String::new(),
            device_token: DeviceToken::from("dup"),
            is_connected: false,
            match_id: None,
        };
        store.create_judge(&new).await.unwrap();
        assert!(matches!(
            store.create_judge(&new).await,
            Err(Error::Validation(_))
        ));
    }

    #[tokio::test]
    async fn test_activate_progress_keeps_single_active_row() {
        let store = MemoryStore::new();
        let a = store.create_match(&new_match(1, 1)).await.unwrap();
        let b = store.create_match(&new_match(2, 1)).await.unwrap();

        store
            .activate_progress(&NewProgress {
                match_id: a.info.id,
                round_id: a.rounds[0].id,
                judge_count: 3,
            })
            .await
            .unwrap();
        let second = store
            .activate_progress(&NewProgress {
                match_id: b.info.id,
                round_id: b.rounds[0].id,
                judge_count: 3,
            })
            .await
            .unwrap();

        let active = store.active_progress().await.unwrap().unwrap();
        assert_eq!(active.id, second.id);
        let ended = store.latest_progress_for_match(a.info.id).await.unwrap().unwrap();
        assert!(ended.is_end_of_match);
    }

    fn named(name: &str, token: &str, match_id: MatchId) -> NewJudge {
        NewJudge {
            name: name.to_string(),
            device_token: DeviceToken::from(token),
            is_connected: false,
            match_id: Some(match_id),
        }
    }

    #[tokio::test]
    async fn test_provision_access_writes_everything_together() {
        let store = MemoryStore::new();
        let card = store.create_match(&new_match(1, 1)).await.unwrap();
        store
            .activate_progress(&NewProgress {
                match_id: card.info.id,
                round_id: card.rounds[0].id,
                judge_count: 2,
            })
            .await
            .unwrap();

        let (access, judges) = store
            .provision_access(
                "CODE",
                "hash",
                card.info.id,
                &[named("Ann", "t1", card.info.id), named("Bo", "t2", card.info.id)],
            )
            .await
            .unwrap();

        assert_eq!(access.access_code, "CODE");
        assert_eq!(judges.len(), 2);
        let progress = store.latest_progress_for_match(card.info.id).await.unwrap().unwrap();
        assert!(progress.qr_generated);
        assert!(progress.password_set);
    }

    #[tokio::test]
    async fn test_provision_access_conflict_leaves_nothing_behind() {
        let store = MemoryStore::new();
        let card = store.create_match(&new_match(1, 1)).await.unwrap();
        store
            .create_judge(&named("Old", "taken", card.info.id))
            .await
            .unwrap();

        let err = store
            .provision_access(
                "CODE",
                "hash",
                card.info.id,
                &[named("Ann", "fresh", card.info.id), named("Bo", "taken", card.info.id)],
            )
            .await
            .unwrap_err();

        assert!(matches!(err, Error::Validation(_)));
        assert!(store.access_by_code("CODE").await.unwrap().is_none());
        assert!(store.judge_by_token(&DeviceToken::from("fresh")).await.unwrap().is_none());
        assert_eq!(store.list_judges().await.unwrap().len(), 1);
    }
}
