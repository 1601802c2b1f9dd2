pub mod access;
pub mod id;
pub mod judge;
pub mod matches;
pub mod progress;
pub mod score;

pub use access::JudgeAccess;
pub use id::{DeviceToken, JudgeId, MatchId, ProgressId, RoundId};
pub use judge::{Judge, NewJudge, ProvisionedJudge, RegisterJudge};
pub use matches::{Match, MatchWithRounds, NewMatch, Round, Winner, MAX_ROUND_COUNT};
pub use progress::{MatchProgress, NewProgress, QrStatus};
pub use score::{
    CompletedRound, JudgeScore, JudgeScoreView, ModifiedRound, RoundOutcome, RoundScoresView,
    Score, ScoreSubmission, SubmittedJudge, WaitingRound,
};
