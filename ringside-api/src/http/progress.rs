use axum::{
    extract::{rejection::JsonRejection, Path, State},
    Json,
};
use ringside_core::models::{MatchId, MatchProgress, QrStatus};
use serde::{Deserialize, Serialize};

use super::{AppResult, AppState};

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StartRequest {
    pub match_id: MatchId,
    pub judge_count: i32,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SwitchRequest {
    pub current_match_id: MatchId,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SwitchResponse {
    pub next_match_id: MatchId,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CurrentRoundResponse {
    pub current_round_number: i32,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct JudgeCountResponse {
    pub judge_count: i32,
}

pub async fn start(
    State(state): State<AppState>,
    payload: Result<Json<StartRequest>, JsonRejection>,
) -> AppResult<Json<MatchProgress>> {
    let Json(req) = payload?;
    let progress = state
        .services
        .progress
        .start(req.match_id, req.judge_count)
        .await?;
    Ok(Json(progress))
}

/// The active progress, or `null` between matches
pub async fn get_progress(State(state): State<AppState>) -> AppResult<Json<Option<MatchProgress>>> {
    Ok(Json(state.services.progress.current().await?))
}

pub async fn current_round(State(state): State<AppState>) -> AppResult<Json<CurrentRoundResponse>> {
    let current_round_number = state.services.progress.current_round_number().await?;
    Ok(Json(CurrentRoundResponse {
        current_round_number,
    }))
}

pub async fn judge_count(State(state): State<AppState>) -> AppResult<Json<JudgeCountResponse>> {
    let judge_count = state.services.progress.judge_count().await?;
    Ok(Json(JudgeCountResponse { judge_count }))
}

pub async fn next_round(State(state): State<AppState>) -> AppResult<Json<MatchProgress>> {
    Ok(Json(state.services.progress.next_round().await?))
}

pub async fn end_match(State(state): State<AppState>) -> AppResult<Json<MatchProgress>> {
    Ok(Json(state.services.progress.end_match().await?))
}

pub async fn lock(State(state): State<AppState>) -> AppResult<Json<MatchProgress>> {
    Ok(Json(state.services.progress.lock().await?))
}

pub async fn unlock(State(state): State<AppState>) -> AppResult<Json<MatchProgress>> {
    Ok(Json(state.services.progress.unlock().await?))
}

pub async fn switch_to_next(
    State(state): State<AppState>,
    payload: Result<Json<SwitchRequest>, JsonRejection>,
) -> AppResult<Json<SwitchResponse>> {
    let Json(req) = payload?;
    let progress = state
        .services
        .progress
        .switch_to_next_match(req.current_match_id)
        .await?;
    Ok(Json(SwitchResponse {
        next_match_id: progress.match_id,
    }))
}

pub async fn qr_status(
    State(state): State<AppState>,
    Path(match_id): Path<MatchId>,
) -> AppResult<Json<QrStatus>> {
    Ok(Json(state.services.progress.qr_status(match_id).await?))
}
