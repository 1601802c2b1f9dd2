use serde::{Deserialize, Serialize};

use crate::models::{
    CompletedRound, DeviceToken, MatchId, MatchProgress, MatchWithRounds, ModifiedRound,
    RoundOutcome, WaitingRound,
};

/// Named fan-out channel
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum Topic {
    Messages,
    Errors,
    NextMatch,
}

impl Topic {
    pub const ALL: [Self; 3] = [Self::Messages, Self::Errors, Self::NextMatch];

    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Messages => "messages",
            Self::Errors => "errors",
            Self::NextMatch => "next-match",
        }
    }

    /// Parse a topic name as used in the `topics` query parameter
    #[must_use]
    pub fn parse(name: &str) -> Option<Self> {
        match name.trim() {
            "messages" => Some(Self::Messages),
            "errors" => Some(Self::Errors),
            "next-match" => Some(Self::NextMatch),
            _ => None,
        }
    }
}

impl std::fmt::Display for Topic {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A judge registered or reconnected
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct JudgeJoined {
    pub judge_id: DeviceToken,
    pub judge_name: String,
    pub match_id: MatchId,
}

/// Payload of the `messages` topic, discriminated by `status`
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "status", rename_all = "SCREAMING_SNAKE_CASE")]
pub enum StatusEvent {
    Joined(JudgeJoined),
    Waiting(WaitingRound),
    Complete(CompletedRound),
    Modified(ModifiedRound),
    Locked(MatchProgress),
    Unlocked(MatchProgress),
    RoundChanged(MatchProgress),
    MatchEnded(MatchProgress),
}

impl StatusEvent {
    #[must_use]
    pub const fn status(&self) -> &'static str {
        match self {
            Self::Joined(_) => "JOINED",
            Self::Waiting(_) => "WAITING",
            Self::Complete(_) => "COMPLETE",
            Self::Modified(_) => "MODIFIED",
            Self::Locked(_) => "LOCKED",
            Self::Unlocked(_) => "UNLOCKED",
            Self::RoundChanged(_) => "ROUND_CHANGED",
            Self::MatchEnded(_) => "MATCH_ENDED",
        }
    }
}

impl From<RoundOutcome> for StatusEvent {
    fn from(outcome: RoundOutcome) -> Self {
        match outcome {
            RoundOutcome::Waiting(waiting) => Self::Waiting(waiting),
            RoundOutcome::Complete(complete) => Self::Complete(complete),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ErrorEvent {
    pub error: String,
}

/// One outbound frame: `{"topic": ..., "payload": ...}`
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "topic", content = "payload")]
pub enum BroadcastEvent {
    #[serde(rename = "messages")]
    Message(StatusEvent),
    #[serde(rename = "next-match")]
    NextMatch(MatchWithRounds),
    #[serde(rename = "errors")]
    Error(ErrorEvent),
}

impl BroadcastEvent {
    #[must_use]
    pub const fn topic(&self) -> Topic {
        match self {
            Self::Message(_) => Topic::Messages,
            Self::NextMatch(_) => Topic::NextMatch,
            Self::Error(_) => Topic::Errors,
        }
    }

    /// Short label for log fields
    #[must_use]
    pub const fn event_type(&self) -> &'static str {
        match self {
            Self::Message(status) => status.status(),
            Self::NextMatch(_) => "NEXT_MATCH",
            Self::Error(_) => "ERROR",
        }
    }

    pub fn error(message: impl Into<String>) -> Self {
        Self::Error(ErrorEvent {
            error: message.into(),
        })
    }

    pub fn to_json(&self) -> crate::Result<String> {
        Ok(serde_json::to_string(self)?)
    }
}

impl From<StatusEvent> for BroadcastEvent {
    fn from(status: StatusEvent) -> Self {
        Self::Message(status)
    }
}
