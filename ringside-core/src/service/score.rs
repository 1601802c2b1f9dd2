//! Score aggregation and round completion.
//!
//! Every mutation of a round's scores runs under that round's lock: the
//! upsert, the recount and the completion decision form one step, so a
//! quorum is announced exactly once per change. Mutations also hold the read
//! side of the progress transition lock, so the live match cannot be locked,
//! ended or switched between the state check and the write.

use std::{collections::HashSet, sync::Arc};

use tokio::sync::RwLock;
use tracing::{debug, info};

use super::keyed_lock::KeyedLock;
use crate::{
    broadcast::{BroadcastHub, StatusEvent},
    config::ScoringConfig,
    models::{
        CompletedRound, DeviceToken, JudgeId, JudgeScore, JudgeScoreView, MatchId, MatchProgress,
        ModifiedRound, Round, RoundId, RoundOutcome, RoundScoresView, ScoreSubmission,
        SubmittedJudge, WaitingRound, Winner,
    },
    repository::ScoreboardStore,
    Error, Result,
};

#[derive(Clone)]
pub struct ScoreService {
    store: Arc<dyn ScoreboardStore>,
    hub: BroadcastHub,
    config: ScoringConfig,
    round_locks: Arc<KeyedLock<RoundId>>,
    transition: Arc<RwLock<()>>,
}

impl std::fmt::Debug for ScoreService {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ScoreService")
            .field("config", &self.config)
            .finish_non_exhaustive()
    }
}

/// Sum submitted scores and pick the winner
fn totals(submitted: &[&JudgeScore]) -> (i64, i64, Winner) {
    let total_red: i64 = submitted.iter().map(|s| i64::from(s.score.red_score)).sum();
    let total_blue: i64 = submitted.iter().map(|s| i64::from(s.score.blue_score)).sum();
    (total_red, total_blue, Winner::from_totals(total_red, total_blue))
}

fn roster(submitted: &[&JudgeScore]) -> Vec<SubmittedJudge> {
    submitted.iter().map(|s| SubmittedJudge::from(*s)).collect()
}

impl ScoreService {
    #[must_use]
    pub fn new(
        store: Arc<dyn ScoreboardStore>,
        hub: BroadcastHub,
        config: ScoringConfig,
        transition: Arc<RwLock<()>>,
    ) -> Self {
        Self {
            store,
            hub,
            config,
            round_locks: Arc::new(KeyedLock::new()),
            transition,
        }
    }

    fn validate_value(&self, field: &str, value: i32) -> Result<()> {
        if value < self.config.min_score || value > self.config.max_score {
            return Err(Error::Validation(format!(
                "{field} must be between {} and {}",
                self.config.min_score, self.config.max_score
            )));
        }
        Ok(())
    }

    async fn load_round(&self, round_id: RoundId) -> Result<Round> {
        self.store
            .get_round(round_id)
            .await?
            .ok_or_else(|| Error::NotFound(format!("round {round_id} not found")))
    }

    async fn load_judge_id(&self, token: &DeviceToken) -> Result<(JudgeId, String)> {
        let judge = self
            .store
            .judge_by_token(token)
            .await?
            .ok_or_else(|| Error::NotFound(format!("judge with device token {token} not found")))?;
        Ok((judge.id, judge.name))
    }

    /// Active progress owning `round`
    async fn progress_for(&self, round: &Round) -> Result<MatchProgress> {
        self.store
            .active_progress()
            .await?
            .filter(|p| p.match_id == round.match_id)
            .ok_or_else(|| {
                Error::InvalidState(format!("match {} is not in progress", round.match_id))
            })
    }

    /// Active progress owning `round`, failing when input is closed
    async fn open_progress_for(&self, round: &Round) -> Result<MatchProgress> {
        let progress = self.progress_for(round).await?;
        if progress.is_locked {
            return Err(Error::InvalidState(format!(
                "round {} is locked",
                progress.current_round_number
            )));
        }
        Ok(progress)
    }

    fn outcome(
        round: &Round,
        expected: i32,
        rows: &[JudgeScore],
        is_cancellation: bool,
    ) -> RoundOutcome {
        let submitted: Vec<&JudgeScore> = rows.iter().filter(|s| s.score.is_submitted).collect();
        let count = i32::try_from(submitted.len()).unwrap_or(i32::MAX);

        if count >= expected {
            let (total_red, total_blue, winner) = totals(&submitted);
            RoundOutcome::Complete(CompletedRound {
                round_id: round.id,
                round_number: round.round_number,
                total_red,
                total_blue,
                winner,
                submitted_judges: roster(&submitted),
                is_cancellation,
                forced: false,
            })
        } else {
            RoundOutcome::Waiting(WaitingRound {
                round_id: round.id,
                round_number: round.round_number,
                expected_judges: expected,
                submitted_judges: roster(&submitted),
                is_cancellation,
            })
        }
    }

    /// Record a judge's score and report whether the round is now decided
    pub async fn submit(&self, submission: &ScoreSubmission) -> Result<RoundOutcome> {
        self.validate_value("redScore", submission.red)?;
        self.validate_value("blueScore", submission.blue)?;

        let (judge_id, _) = self.load_judge_id(&submission.device_token).await?;
        let round = self.load_round(submission.round_id).await?;

        let _transition = self.transition.read().await;
        let _guard = self.round_locks.lock(&round.id).await;
        let progress = self.open_progress_for(&round).await?;
        let expected = progress.judge_count;

        let rows = self.store.scores_for_round(round.id).await?;
        let previous = rows.iter().find(|s| s.score.judge_id == judge_id);

        if let Some(prev) = previous {
            if prev.score.is_submitted
                && prev.score.red_score == submission.red
                && prev.score.blue_score == submission.blue
            {
                debug!(round_id = %round.id, judge_id = %judge_id, "Identical resubmission ignored");
                return Ok(Self::outcome(&round, expected, &rows, submission.is_cancellation));
            }
        }

        let already_counted = previous.is_some_and(|p| p.score.is_submitted);
        let submitted_count = rows.iter().filter(|s| s.score.is_submitted).count();
        if !already_counted && submitted_count >= usize::try_from(expected).unwrap_or(0) {
            return Err(Error::InvalidState(format!(
                "round {} already has {expected} submitted score(s)",
                round.round_number
            )));
        }

        self.store
            .upsert_score(round.id, judge_id, submission.red, submission.blue)
            .await?;
        let rows = self.store.scores_for_round(round.id).await?;
        let outcome = Self::outcome(&round, expected, &rows, submission.is_cancellation);

        match &outcome {
            RoundOutcome::Complete(complete) => {
                self.store
                    .set_round_result(round.id, true, Some(complete.winner))
                    .await?;
                info!(
                    round_id = %round.id,
                    round_number = round.round_number,
                    total_red = complete.total_red,
                    total_blue = complete.total_blue,
                    winner = complete.winner.as_str(),
                    "Round complete"
                );
            }
            RoundOutcome::Waiting(waiting) => {
                debug!(
                    round_id = %round.id,
                    submitted = waiting.submitted_judges.len(),
                    expected,
                    "Round waiting for scores"
                );
            }
        }

        self.hub.publish(StatusEvent::from(outcome.clone()).into());
        Ok(outcome)
    }

    /// Withdraw a judge's submission so it can be corrected.
    ///
    /// The score row is kept with `submitted = false`. A finished round is
    /// reopened.
    pub async fn revert(&self, round_id: RoundId, token: &DeviceToken) -> Result<ModifiedRound> {
        let (judge_id, judge_name) = self.load_judge_id(token).await?;
        let round = self.load_round(round_id).await?;

        let _transition = self.transition.read().await;
        let _guard = self.round_locks.lock(&round.id).await;
        self.open_progress_for(&round).await?;

        self.store
            .set_score_submitted(round.id, judge_id, false)
            .await?
            .ok_or_else(|| {
                Error::NotFound(format!(
                    "no score from judge {judge_id} for round {round_id}"
                ))
            })?;

        let current = self.load_round(round.id).await?;
        if current.is_finished {
            self.store.set_round_result(round.id, false, None).await?;
            info!(round_id = %round.id, "Finished round reopened by revert");
        }

        let rows = self.store.scores_for_round(round.id).await?;
        let submitted: Vec<&JudgeScore> = rows.iter().filter(|s| s.score.is_submitted).collect();
        let modified = ModifiedRound {
            round_id: round.id,
            round_number: round.round_number,
            judge_name,
            submitted_judges: roster(&submitted),
        };

        self.hub.publish(StatusEvent::Modified(modified.clone()).into());
        Ok(modified)
    }

    /// Decide the round from whatever has been submitted so far.
    ///
    /// The round must belong to the live match. A locked round may still be
    /// forced.
    pub async fn force_complete(&self, round_id: RoundId) -> Result<CompletedRound> {
        let round = self.load_round(round_id).await?;
        let _transition = self.transition.read().await;
        let _guard = self.round_locks.lock(&round.id).await;
        self.progress_for(&round).await?;

        let rows = self.store.scores_for_round(round.id).await?;
        let submitted: Vec<&JudgeScore> = rows.iter().filter(|s| s.score.is_submitted).collect();
        if submitted.is_empty() {
            return Err(Error::InvalidState(format!(
                "round {round_id} has no submitted scores"
            )));
        }

        let (total_red, total_blue, winner) = totals(&submitted);
        self.store.set_round_result(round.id, true, Some(winner)).await?;

        let complete = CompletedRound {
            round_id: round.id,
            round_number: round.round_number,
            total_red,
            total_blue,
            winner,
            submitted_judges: roster(&submitted),
            is_cancellation: false,
            forced: true,
        };
        info!(
            round_id = %round.id,
            submitted = complete.submitted_judges.len(),
            winner = winner.as_str(),
            "Round force-completed"
        );

        self.hub.publish(StatusEvent::Complete(complete.clone()).into());
        Ok(complete)
    }

    pub async fn count_submitted(&self, round_id: RoundId) -> Result<i64> {
        let round = self.load_round(round_id).await?;
        let rows = self.store.scores_for_round(round.id).await?;
        let count = rows.iter().filter(|s| s.score.is_submitted).count();
        Ok(i64::try_from(count).unwrap_or(i64::MAX))
    }

    /// Admin scoreboard: every round of the match with one line per judge
    pub async fn scores_for_match(&self, match_id: MatchId) -> Result<Vec<RoundScoresView>> {
        if self.store.get_match(match_id).await?.is_none() {
            return Err(Error::NotFound(format!("match {match_id} not found")));
        }
        let judges = self.store.judges_for_match(match_id).await?;
        let rounds = self.store.rounds_for_match(match_id).await?;

        let mut views = Vec::with_capacity(rounds.len());
        for round in rounds {
            let rows = self.store.scores_for_round(round.id).await?;

            let mut lines: Vec<JudgeScoreView> = judges
                .iter()
                .map(|judge| {
                    let row = rows.iter().find(|s| s.score.judge_id == judge.id);
                    JudgeScoreView {
                        judge_id: judge.device_token.clone(),
                        judge_name: judge.name.clone(),
                        red: row.map(|s| s.score.red_score),
                        blue: row.map(|s| s.score.blue_score),
                        submitted: row.is_some_and(|s| s.score.is_submitted),
                        is_connected: judge.is_connected,
                    }
                })
                .collect();

            // judges who scored this round but have since moved to another match
            let listed: HashSet<JudgeId> = judges.iter().map(|j| j.id).collect();
            for row in rows.iter().filter(|s| !listed.contains(&s.score.judge_id)) {
                let connected = self
                    .store
                    .get_judge(row.score.judge_id)
                    .await?
                    .is_some_and(|j| j.is_connected);
                lines.push(JudgeScoreView {
                    judge_id: row.device_token.clone(),
                    judge_name: row.judge_name.clone(),
                    red: Some(row.score.red_score),
                    blue: Some(row.score.blue_score),
                    submitted: row.score.is_submitted,
                    is_connected: connected,
                });
            }

            views.push(RoundScoresView {
                round_id: round.id,
                round_number: round.round_number,
                is_finished: round.is_finished,
                winner: round.winner,
                judges: lines,
            });
        }
        Ok(views)
    }
}

#[cfg(test)]
mod tests {
    use std::time::Duration;

    use super::*;
    use crate::{
        broadcast::{BroadcastEvent, EventReceiver, Topic},
        models::{MatchWithRounds, NewJudge, NewMatch, NewProgress},
        repository::MemoryStore,
        service::ProgressService,
    };

    struct Fixture {
        store: Arc<MemoryStore>,
        scores: ScoreService,
        progress: ProgressService,
        bout: MatchWithRounds,
        rx: EventReceiver,
    }

    async fn fixture(judge_count: i32, judges: &[&str]) -> Fixture {
        let store = Arc::new(MemoryStore::new());
        let hub = BroadcastHub::new(64);
        let (_, rx) = hub.subscribe(&[Topic::Messages]);
        let bout = store
            .create_match(&NewMatch {
                match_number: 1,
                division: "open".to_string(),
                round_count: 3,
                red_name: "Red".to_string(),
                blue_name: "Blue".to_string(),
                red_gym: None,
                blue_gym: None,
            })
            .await
            .unwrap();
        store
            .activate_progress(&NewProgress {
                match_id: bout.info.id,
                round_id: bout.rounds[0].id,
                judge_count,
            })
            .await
            .unwrap();
        for token in judges {
            store
                .create_judge(&NewJudge {
                    name: token.to_uppercase(),
                    device_token: DeviceToken::from(*token),
                    is_connected: true,
                    match_id: Some(bout.info.id),
                })
                .await
                .unwrap();
        }
        let progress = ProgressService::new(store.clone(), hub.clone());
        let scores = ScoreService::new(
            store.clone(),
            hub.clone(),
            ScoringConfig::default(),
            progress.transition_lock(),
        );
        Fixture {
            store,
            scores,
            progress,
            bout,
            rx,
        }
    }

    fn submission(round_id: RoundId, token: &str, red: i32, blue: i32) -> ScoreSubmission {
        ScoreSubmission {
            round_id,
            device_token: DeviceToken::from(token),
            red,
            blue,
            is_cancellation: false,
        }
    }

    async fn next_status(rx: &mut EventReceiver) -> StatusEvent {
        match tokio::time::timeout(Duration::from_millis(200), rx.recv()).await {
            Ok(Some(BroadcastEvent::Message(status))) => status,
            other => panic!("expected a status event, got {other:?}"),
        }
    }

    #[tokio::test]
    async fn test_quorum_sequencing() {
        let mut f = fixture(3, &["a", "b", "c"]).await;
        let round = f.bout.rounds[0].id;

        let first = f.scores.submit(&submission(round, "a", 7, 8)).await.unwrap();
        assert!(!first.is_complete());
        let second = f.scores.submit(&submission(round, "b", 9, 7)).await.unwrap();
        match &second {
            RoundOutcome::Waiting(w) => {
                let names: Vec<&str> = w.submitted_judges.iter().map(|j| j.name.as_str()).collect();
                assert_eq!(names, vec!["A", "B"]);
                assert_eq!(w.expected_judges, 3);
            }
            RoundOutcome::Complete(_) => panic!("quorum not yet met"),
        }

        let third = f.scores.submit(&submission(round, "c", 8, 9)).await.unwrap();
        match third {
            RoundOutcome::Complete(c) => {
                assert_eq!(c.total_red, 24);
                assert_eq!(c.total_blue, 24);
                assert_eq!(c.winner, Winner::Draw);
                assert_eq!(c.submitted_judges.len(), 3);
            }
            RoundOutcome::Waiting(_) => panic!("quorum met"),
        }

        assert!(matches!(next_status(&mut f.rx).await, StatusEvent::Waiting(_)));
        assert!(matches!(next_status(&mut f.rx).await, StatusEvent::Waiting(_)));
        assert!(matches!(next_status(&mut f.rx).await, StatusEvent::Complete(_)));

        let stored = f.store.get_round(round).await.unwrap().unwrap();
        assert!(stored.is_finished);
        assert_eq!(stored.winner, Some(Winner::Draw));
    }

    #[tokio::test]
    async fn test_revert_and_resubmit() {
        let mut f = fixture(3, &["a", "b", "c"]).await;
        let round = f.bout.rounds[0].id;
        f.scores.submit(&submission(round, "a", 7, 8)).await.unwrap();
        f.scores.submit(&submission(round, "b", 9, 7)).await.unwrap();
        f.scores.submit(&submission(round, "c", 8, 9)).await.unwrap();
        for _ in 0..3 {
            next_status(&mut f.rx).await;
        }

        let modified = f.scores.revert(round, &DeviceToken::from("a")).await.unwrap();
        assert_eq!(modified.judge_name, "A");
        assert_eq!(modified.submitted_judges.len(), 2);
        assert_eq!(f.scores.count_submitted(round).await.unwrap(), 2);
        assert!(matches!(next_status(&mut f.rx).await, StatusEvent::Modified(_)));

        let reopened = f.store.get_round(round).await.unwrap().unwrap();
        assert!(!reopened.is_finished);
        assert_eq!(reopened.winner, None);

        let outcome = f.scores.submit(&submission(round, "a", 5, 6)).await.unwrap();
        match outcome {
            RoundOutcome::Complete(c) => {
                assert_eq!(c.total_red, 22);
                assert_eq!(c.total_blue, 22);
            }
            RoundOutcome::Waiting(_) => panic!("quorum met again"),
        }
    }

    #[tokio::test]
    async fn test_identical_resubmission_is_not_rebroadcast() {
        let mut f = fixture(3, &["a", "b"]).await;
        let round = f.bout.rounds[0].id;

        let first = f.scores.submit(&submission(round, "a", 7, 8)).await.unwrap();
        let again = f.scores.submit(&submission(round, "a", 7, 8)).await.unwrap();
        assert_eq!(first, again);
        assert_eq!(f.scores.count_submitted(round).await.unwrap(), 1);

        next_status(&mut f.rx).await;
        let extra = tokio::time::timeout(Duration::from_millis(50), f.rx.recv()).await;
        assert!(extra.is_err(), "resubmission must not broadcast");
    }

    #[tokio::test]
    async fn test_overwrite_replaces_contribution() {
        let f = fixture(2, &["a", "b"]).await;
        let round = f.bout.rounds[0].id;
        f.scores.submit(&submission(round, "a", 7, 8)).await.unwrap();
        f.scores.submit(&submission(round, "a", 10, 9)).await.unwrap();
        let outcome = f.scores.submit(&submission(round, "b", 9, 9)).await.unwrap();

        match outcome {
            RoundOutcome::Complete(c) => {
                assert_eq!((c.total_red, c.total_blue), (19, 18));
                assert_eq!(c.winner, Winner::Red);
            }
            RoundOutcome::Waiting(_) => panic!("quorum met"),
        }
    }

    #[tokio::test]
    async fn test_quorum_full_rejects_new_submitter() {
        let f = fixture(1, &["a", "b"]).await;
        let round = f.bout.rounds[0].id;
        f.scores.submit(&submission(round, "a", 7, 8)).await.unwrap();

        let err = f.scores.submit(&submission(round, "b", 9, 9)).await.unwrap_err();
        assert!(matches!(err, Error::InvalidState(_)));
        assert_eq!(f.scores.count_submitted(round).await.unwrap(), 1);
    }

    #[tokio::test]
    async fn test_out_of_range_score_is_validation_error() {
        let f = fixture(3, &["a"]).await;
        let round = f.bout.rounds[0].id;
        assert!(matches!(
            f.scores.submit(&submission(round, "a", 11, 8)).await,
            Err(Error::Validation(_))
        ));
        assert!(matches!(
            f.scores.submit(&submission(round, "a", 7, -1)).await,
            Err(Error::Validation(_))
        ));
    }

    #[tokio::test]
    async fn test_locked_progress_rejects_input() {
        let f = fixture(3, &["a"]).await;
        let round = f.bout.rounds[0].id;
        let mut progress = f.store.active_progress().await.unwrap().unwrap();
        progress.lock().unwrap();
        f.store.update_progress(&progress).await.unwrap();

        let err = f.scores.submit(&submission(round, "a", 7, 8)).await.unwrap_err();
        assert!(matches!(err, Error::InvalidState(_)));
    }

    #[tokio::test]
    async fn test_unknown_references() {
        let f = fixture(3, &["a"]).await;
        let round = f.bout.rounds[0].id;
        assert!(matches!(
            f.scores.submit(&submission(round, "ghost", 7, 8)).await,
            Err(Error::NotFound(_))
        ));
        assert!(matches!(
            f.scores.submit(&submission(RoundId::new(999), "a", 7, 8)).await,
            Err(Error::NotFound(_))
        ));
        assert!(matches!(
            f.scores.revert(round, &DeviceToken::from("a")).await,
            Err(Error::NotFound(_))
        ));
    }

    #[tokio::test]
    async fn test_concurrent_submissions_complete_once() {
        let tokens: Vec<String> = (0..8).map(|i| format!("j{i}")).collect();
        let refs: Vec<&str> = tokens.iter().map(String::as_str).collect();
        let mut f = fixture(8, &refs).await;
        let round = f.bout.rounds[0].id;

        let handles: Vec<_> = tokens
            .iter()
            .map(|token| {
                let scores = f.scores.clone();
                let sub = submission(round, token, 9, 8);
                tokio::spawn(async move { scores.submit(&sub).await })
            })
            .collect();
        let mut completes = 0;
        for handle in handles {
            if handle.await.unwrap().unwrap().is_complete() {
                completes += 1;
            }
        }
        assert_eq!(completes, 1);

        let mut broadcast_completes = 0;
        while let Ok(event) = f.rx.try_recv() {
            if matches!(event, BroadcastEvent::Message(StatusEvent::Complete(_))) {
                broadcast_completes += 1;
            }
        }
        assert_eq!(broadcast_completes, 1);
    }

    #[tokio::test]
    async fn test_force_complete() {
        let mut f = fixture(3, &["a", "b"]).await;
        let round = f.bout.rounds[0].id;
        assert!(matches!(
            f.scores.force_complete(round).await,
            Err(Error::InvalidState(_))
        ));

        f.scores.submit(&submission(round, "a", 10, 9)).await.unwrap();
        next_status(&mut f.rx).await;
        let complete = f.scores.force_complete(round).await.unwrap();
        assert!(complete.forced);
        assert_eq!(complete.winner, Winner::Red);
        assert!(matches!(next_status(&mut f.rx).await, StatusEvent::Complete(_)));
    }

    #[tokio::test]
    async fn test_force_complete_requires_live_match() {
        let f = fixture(3, &["a"]).await;
        let round = f.bout.rounds[0].id;
        f.scores.submit(&submission(round, "a", 10, 9)).await.unwrap();
        f.progress.end_match().await.unwrap();

        let err = f.scores.force_complete(round).await.unwrap_err();
        assert!(matches!(err, Error::InvalidState(_)));
        let stored = f.store.get_round(round).await.unwrap().unwrap();
        assert!(!stored.is_finished);
        assert_eq!(stored.winner, None);
    }

    #[tokio::test]
    async fn test_force_complete_allowed_while_locked() {
        let f = fixture(3, &["a"]).await;
        let round = f.bout.rounds[0].id;
        f.scores.submit(&submission(round, "a", 10, 9)).await.unwrap();
        f.progress.lock().await.unwrap();

        let complete = f.scores.force_complete(round).await.unwrap();
        assert!(complete.forced);
    }

    #[tokio::test]
    async fn test_lock_waits_for_in_flight_submission() {
        let f = fixture(3, &["a"]).await;
        let round = f.bout.rounds[0].id;

        // park the submission after its transition read guard is taken
        let round_guard = f.scores.round_locks.lock(&round).await;
        let scores = f.scores.clone();
        let submit = tokio::spawn(async move { scores.submit(&submission(round, "a", 10, 9)).await });
        tokio::time::sleep(Duration::from_millis(20)).await;

        let progress = f.progress.clone();
        let mut lock = tokio::spawn(async move { progress.lock().await });
        assert!(
            tokio::time::timeout(Duration::from_millis(50), &mut lock).await.is_err(),
            "lock must wait for the submission"
        );

        drop(round_guard);
        let outcome = submit.await.unwrap().unwrap();
        assert!(!outcome.is_complete());
        let locked = lock.await.unwrap().unwrap();
        assert!(locked.is_locked);
        assert_eq!(f.scores.count_submitted(round).await.unwrap(), 1);

        let err = f.scores.submit(&submission(round, "a", 9, 9)).await.unwrap_err();
        assert!(matches!(err, Error::InvalidState(_)));
    }

    #[tokio::test]
    async fn test_scores_for_match_lists_every_judge() {
        let f = fixture(3, &["a", "b"]).await;
        let round = f.bout.rounds[0].id;
        f.scores.submit(&submission(round, "a", 10, 9)).await.unwrap();

        let views = f.scores.scores_for_match(f.bout.info.id).await.unwrap();
        assert_eq!(views.len(), 3);
        let first = &views[0];
        assert_eq!(first.judges.len(), 2);
        let a = first.judges.iter().find(|j| j.judge_name == "A").unwrap();
        assert_eq!((a.red, a.blue, a.submitted), (Some(10), Some(9), true));
        let b = first.judges.iter().find(|j| j.judge_name == "B").unwrap();
        assert_eq!((b.red, b.submitted), (None, false));
    }
}
