//! Persistence seam for the scoring core.
//!
//! Every method is a single atomic step from the caller's point of view.
//! Operations that touch several entities (`create_match`,
//! `activate_progress`, `switch_progress`, `provision_access`) must never be
//! partially visible.

pub mod memory;
pub mod postgres;

use async_trait::async_trait;

use crate::{
    models::{
        DeviceToken, Judge, JudgeAccess, JudgeId, JudgeScore, Match, MatchId, MatchProgress,
        MatchWithRounds, NewJudge, NewMatch, NewProgress, Round, RoundId, Score, Winner,
    },
    Result,
};

pub use memory::MemoryStore;
pub use postgres::PgStore;

#[async_trait]
pub trait ScoreboardStore: Send + Sync {
    // ----- matches & rounds -----

    /// Insert a match and its rounds 1..=`round_count` together
    async fn create_match(&self, new: &NewMatch) -> Result<MatchWithRounds>;

    async fn get_match(&self, match_id: MatchId) -> Result<Option<Match>>;

    /// All matches in running order (ascending id)
    async fn list_matches(&self) -> Result<Vec<Match>>;

    /// First match after `match_id` in running order
    async fn next_match_after(&self, match_id: MatchId) -> Result<Option<Match>>;

    /// Rounds of a match ordered by round number
    async fn rounds_for_match(&self, match_id: MatchId) -> Result<Vec<Round>>;

    async fn get_round(&self, round_id: RoundId) -> Result<Option<Round>>;

    async fn round_by_number(&self, match_id: MatchId, round_number: i32) -> Result<Option<Round>>;

    async fn set_round_result(
        &self,
        round_id: RoundId,
        is_finished: bool,
        winner: Option<Winner>,
    ) -> Result<Round>;

    // ----- judges -----

    async fn create_judge(&self, new: &NewJudge) -> Result<Judge>;

    async fn get_judge(&self, judge_id: JudgeId) -> Result<Option<Judge>>;

    async fn judge_by_token(&self, token: &DeviceToken) -> Result<Option<Judge>>;

    /// Persist name, connection flag and match affiliation
    async fn update_judge(&self, judge: &Judge) -> Result<Judge>;

    /// All judges ordered by id
    async fn list_judges(&self) -> Result<Vec<Judge>>;

    /// Judges affiliated with a match, ordered by id
    async fn judges_for_match(&self, match_id: MatchId) -> Result<Vec<Judge>>;

    async fn count_connected(&self, match_id: MatchId) -> Result<i64>;

    // ----- scores -----

    /// Insert or overwrite the (round, judge) score and mark it submitted
    async fn upsert_score(
        &self,
        round_id: RoundId,
        judge_id: JudgeId,
        red: i32,
        blue: i32,
    ) -> Result<Score>;

    /// Flip the submitted flag, keeping the values; `None` if no row exists
    async fn set_score_submitted(
        &self,
        round_id: RoundId,
        judge_id: JudgeId,
        submitted: bool,
    ) -> Result<Option<Score>>;

    /// Every score row of the round with its judge, in first-submission order
    async fn scores_for_round(&self, round_id: RoundId) -> Result<Vec<JudgeScore>>;

    // ----- match progress -----

    /// The single progress row with `is_end_of_match = false`, if any
    async fn active_progress(&self) -> Result<Option<MatchProgress>>;

    /// Most recently created progress row, ended or not
    async fn latest_progress(&self) -> Result<Option<MatchProgress>>;

    async fn latest_progress_for_match(&self, match_id: MatchId) -> Result<Option<MatchProgress>>;

    /// End every active row and insert `new` as the only active one
    async fn activate_progress(&self, new: &NewProgress) -> Result<MatchProgress>;

    /// `activate_progress` plus re-binding every connected judge to
    /// `new.match_id`, as one unit
    async fn switch_progress(&self, new: &NewProgress) -> Result<MatchProgress>;

    /// Write back lock/round/end fields of a loaded row
    async fn update_progress(&self, progress: &MatchProgress) -> Result<MatchProgress>;

    /// Set admission flags on the latest progress row of the match
    async fn set_qr_status(
        &self,
        match_id: MatchId,
        qr_generated: bool,
        password_set: bool,
    ) -> Result<Option<MatchProgress>>;

    // ----- admission -----

    /// Store a hashed access code, create `judges` and flag the match's
    /// latest progress row as QR-generated with a password, as one unit
    async fn provision_access(
        &self,
        access_code: &str,
        password_hash: &str,
        match_id: MatchId,
        judges: &[NewJudge],
    ) -> Result<(JudgeAccess, Vec<Judge>)>;

    async fn access_by_code(&self, access_code: &str) -> Result<Option<JudgeAccess>>;
}
