use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::id::{DeviceToken, JudgeId, RoundId};
use super::matches::Winner;

/// One judge's score for one round; unique per (round, judge)
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Score {
    pub id: i64,
    pub round_id: RoundId,
    pub judge_id: JudgeId,
    pub red_score: i32,
    pub blue_score: i32,
    pub is_submitted: bool,
    pub is_editable: bool,
    pub submitted_at: DateTime<Utc>,
}

/// Score joined with the submitting judge's identity
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct JudgeScore {
    pub score: Score,
    pub judge_name: String,
    pub device_token: DeviceToken,
}

/// Roster line for a judge whose score currently counts toward the round
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SubmittedJudge {
    pub judge_id: DeviceToken,
    pub name: String,
    pub red: i32,
    pub blue: i32,
}

impl From<&JudgeScore> for SubmittedJudge {
    fn from(entry: &JudgeScore) -> Self {
        Self {
            judge_id: entry.device_token.clone(),
            name: entry.judge_name.clone(),
            red: entry.score.red_score,
            blue: entry.score.blue_score,
        }
    }
}

/// A judge's score submission after boundary validation
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ScoreSubmission {
    pub round_id: RoundId,
    pub device_token: DeviceToken,
    pub red: i32,
    pub blue: i32,
    pub is_cancellation: bool,
}

/// Round still short of quorum
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WaitingRound {
    pub round_id: RoundId,
    pub round_number: i32,
    pub expected_judges: i32,
    pub submitted_judges: Vec<SubmittedJudge>,
    pub is_cancellation: bool,
}

/// Round whose quorum was met (or forced)
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CompletedRound {
    pub round_id: RoundId,
    pub round_number: i32,
    pub total_red: i64,
    pub total_blue: i64,
    pub winner: Winner,
    pub submitted_judges: Vec<SubmittedJudge>,
    pub is_cancellation: bool,
    pub forced: bool,
}

/// Result of a submission
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "status", rename_all = "SCREAMING_SNAKE_CASE")]
pub enum RoundOutcome {
    Waiting(WaitingRound),
    Complete(CompletedRound),
}

impl RoundOutcome {
    #[must_use]
    pub fn submitted_judges(&self) -> &[SubmittedJudge] {
        match self {
            Self::Waiting(w) => &w.submitted_judges,
            Self::Complete(c) => &c.submitted_judges,
        }
    }

    #[must_use]
    pub const fn is_complete(&self) -> bool {
        matches!(self, Self::Complete(_))
    }
}

/// Round after a judge reverted their submission
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ModifiedRound {
    pub round_id: RoundId,
    pub round_number: i32,
    pub judge_name: String,
    pub submitted_judges: Vec<SubmittedJudge>,
}

/// Admin scoreboard line: every judge of the match, submitted or not
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct JudgeScoreView {
    pub judge_id: DeviceToken,
    pub judge_name: String,
    pub red: Option<i32>,
    pub blue: Option<i32>,
    pub submitted: bool,
    pub is_connected: bool,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RoundScoresView {
    pub round_id: RoundId,
    pub round_number: i32,
    pub is_finished: bool,
    pub winner: Option<Winner>,
    pub judges: Vec<JudgeScoreView>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_outcome_is_tagged_by_status() {
        let outcome = RoundOutcome::Waiting(WaitingRound {
            round_id: RoundId::new(1),
            round_number: 1,
            expected_judges: 3,
            submitted_judges: vec![SubmittedJudge {
                judge_id: DeviceToken::from("tok-a"),
                name: "A".to_string(),
                red: 7,
                blue: 8,
            }],
            is_cancellation: false,
        });

        let json = serde_json::to_value(&outcome).unwrap();
        assert_eq!(json["status"], "WAITING");
        assert_eq!(json["roundId"], 1);
        assert_eq!(json["submittedJudges"][0]["judgeId"], "tok-a");
        assert!(!outcome.is_complete());
    }
}
