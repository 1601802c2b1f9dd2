//! Inbound websocket messages.
//!
//! Clients send text frames shaped `{"v": 1, "type": "send" | "modify" |
//! "join", ...}`. The raw envelope is decoded leniently, then checked once
//! into a [`ClientCommand`]; nothing past this module sees optional fields.

use ringside_core::{
    models::{DeviceToken, MatchId, RoundId},
    Error, Result,
};
use serde::Deserialize;

pub const PROTOCOL_VERSION: u32 = 1;

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
struct InboundEnvelope {
    v: Option<u32>,
    #[serde(rename = "type")]
    kind: Option<String>,
    judge_id: Option<String>,
    round_id: Option<i64>,
    red_score: Option<i32>,
    blue_score: Option<i32>,
    is_cancellation: Option<bool>,
    judge_name: Option<String>,
    device_id: Option<String>,
    match_id: Option<i64>,
    access_code: Option<String>,
    password: Option<String>,
}

/// A validated client request
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ClientCommand {
    Send {
        judge: DeviceToken,
        round_id: RoundId,
        red: i32,
        blue: i32,
        is_cancellation: bool,
    },
    Modify {
        judge: DeviceToken,
        round_id: RoundId,
    },
    Join {
        judge_name: String,
        device: DeviceToken,
        match_id: MatchId,
        access_code: Option<String>,
        password: Option<String>,
    },
}

impl ClientCommand {
    #[must_use]
    pub const fn kind(&self) -> &'static str {
        match self {
            Self::Send { .. } => "send",
            Self::Modify { .. } => "modify",
            Self::Join { .. } => "join",
        }
    }
}

fn token(value: Option<String>) -> Option<DeviceToken> {
    value
        .map(DeviceToken::from)
        .filter(|t| !t.is_blank())
}

fn missing(kind: &str, fields: &[(&str, bool)]) -> Result<()> {
    let absent: Vec<&str> = fields
        .iter()
        .filter(|(_, present)| !present)
        .map(|(name, _)| *name)
        .collect();
    if absent.is_empty() {
        Ok(())
    } else {
        Err(Error::Validation(format!(
            "{kind} message is missing {}",
            absent.join(", ")
        )))
    }
}

/// Decode and check one text frame
pub fn decode(text: &str) -> Result<ClientCommand> {
    let envelope: InboundEnvelope = serde_json::from_str(text)
        .map_err(|e| Error::Validation(format!("malformed message: {e}")))?;

    let version = envelope.v.unwrap_or(PROTOCOL_VERSION);
    if version != PROTOCOL_VERSION {
        return Err(Error::Validation(format!(
            "unsupported protocol version {version}"
        )));
    }

    let kind = envelope
        .kind
        .ok_or_else(|| Error::Validation("message is missing type".to_string()))?;

    match kind.as_str() {
        "send" => {
            let judge = token(envelope.judge_id);
            missing(
                "send",
                &[
                    ("judgeId", judge.is_some()),
                    ("roundId", envelope.round_id.is_some()),
                    ("redScore", envelope.red_score.is_some()),
                    ("blueScore", envelope.blue_score.is_some()),
                ],
            )?;
            match (judge, envelope.round_id, envelope.red_score, envelope.blue_score) {
                (Some(judge), Some(round_id), Some(red), Some(blue)) => Ok(ClientCommand::Send {
                    judge,
                    round_id: RoundId::new(round_id),
                    red,
                    blue,
                    is_cancellation: envelope.is_cancellation.unwrap_or(false),
                }),
                _ => Err(Error::Validation("send message is incomplete".to_string())),
            }
        }
        "modify" => {
            let judge = token(envelope.judge_id);
            missing(
                "modify",
                &[
                    ("judgeId", judge.is_some()),
                    ("roundId", envelope.round_id.is_some()),
                ],
            )?;
            match (judge, envelope.round_id) {
                (Some(judge), Some(round_id)) => Ok(ClientCommand::Modify {
                    judge,
                    round_id: RoundId::new(round_id),
                }),
                _ => Err(Error::Validation("modify message is incomplete".to_string())),
            }
        }
        "join" => {
            let device = token(envelope.device_id);
            missing(
                "join",
                &[
                    ("judgeName", envelope.judge_name.is_some()),
                    ("deviceId", device.is_some()),
                    ("matchId", envelope.match_id.is_some()),
                ],
            )?;
            match (envelope.judge_name, device, envelope.match_id) {
                (Some(judge_name), Some(device), Some(match_id)) => Ok(ClientCommand::Join {
                    judge_name,
                    device,
                    match_id: MatchId::new(match_id),
                    access_code: envelope.access_code,
                    password: envelope.password,
                }),
                _ => Err(Error::Validation("join message is incomplete".to_string())),
            }
        }
        other => Err(Error::Validation(format!("unknown message type \"{other}\""))),
    }
}
