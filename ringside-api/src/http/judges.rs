use axum::{
    extract::{
        rejection::{JsonRejection, QueryRejection},
        Path, Query, State,
    },
    Json,
};
use ringside_core::{
    models::{DeviceToken, Judge, JudgeId, MatchId, RegisterJudge},
    Error,
};
use serde::Deserialize;

use super::{AppResult, AppState};

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ConnectRequest {
    pub is_connected: bool,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CurrentJudgesQuery {
    pub match_id: Option<MatchId>,
}

#[derive(Debug, Deserialize)]
pub struct GenerateRequest {
    pub count: usize,
}

/// Register a device or reconnect a known one
pub async fn register(
    State(state): State<AppState>,
    payload: Result<Json<RegisterJudge>, JsonRejection>,
) -> AppResult<Json<Judge>> {
    let Json(req) = payload?;
    Ok(Json(state.services.judges.register(&req).await?))
}

pub async fn set_connected(
    State(state): State<AppState>,
    Path(judge_id): Path<JudgeId>,
    payload: Result<Json<ConnectRequest>, JsonRejection>,
) -> AppResult<Json<Judge>> {
    let Json(req) = payload?;
    Ok(Json(
        state
            .services
            .judges
            .set_connected(judge_id, req.is_connected)
            .await?,
    ))
}

pub async fn list_all(State(state): State<AppState>) -> AppResult<Json<Vec<Judge>>> {
    Ok(Json(state.services.judges.list_all().await?))
}

/// Judges of `matchId`, or of the live match when omitted
pub async fn list_current(
    State(state): State<AppState>,
    query: Result<Query<CurrentJudgesQuery>, QueryRejection>,
) -> AppResult<Json<Vec<Judge>>> {
    let Query(query) = query?;
    let match_id = match query.match_id {
        Some(id) => id,
        None => {
            state
                .services
                .progress
                .current()
                .await?
                .ok_or_else(|| Error::InvalidState("no match in progress".to_string()))?
                .match_id
        }
    };
    Ok(Json(state.services.judges.list_for_match(match_id).await?))
}

/// Provision blank device tokens for QR hand-out
pub async fn generate(
    State(state): State<AppState>,
    payload: Result<Json<GenerateRequest>, JsonRejection>,
) -> AppResult<Json<Vec<DeviceToken>>> {
    let Json(req) = payload?;
    Ok(Json(state.services.judges.provision(req.count).await?))
}
