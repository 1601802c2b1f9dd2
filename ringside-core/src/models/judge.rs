use serde::{Deserialize, Serialize};

use super::id::{DeviceToken, JudgeId, MatchId};

/// A judge's durable identity, keyed by device token
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Judge {
    pub id: JudgeId,
    pub name: String,
    pub device_token: DeviceToken,
    pub is_connected: bool,
    pub match_id: Option<MatchId>,
}

impl Judge {
    #[must_use]
    pub fn is_affiliated_with(&self, match_id: MatchId) -> bool {
        self.match_id == Some(match_id)
    }
}

/// Input for creating a judge row
#[derive(Debug, Clone)]
pub struct NewJudge {
    pub name: String,
    pub device_token: DeviceToken,
    pub is_connected: bool,
    pub match_id: Option<MatchId>,
}

/// Registration request as received from a judge client
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RegisterJudge {
    #[serde(default)]
    pub name: Option<String>,
    pub device_token: DeviceToken,
    pub match_id: MatchId,
    /// Admission credentials, checked by the configured gate
    #[serde(default)]
    pub access_code: Option<String>,
    #[serde(default)]
    pub password: Option<String>,
}

/// Name/token pair handed out as a QR code
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProvisionedJudge {
    pub name: String,
    pub device_token: DeviceToken,
}
