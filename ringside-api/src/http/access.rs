use axum::{
    extract::{rejection::JsonRejection, State},
    Json,
};
use ringside_core::{models::MatchId, service::QrBundle};
use serde::Deserialize;

use super::{AppResult, AppState};

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GenerateQrRequest {
    pub match_id: MatchId,
    pub password: String,
    pub judge_names: Vec<String>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct VerifyRequest {
    pub access_code: String,
    pub password: String,
}

pub async fn generate_qr(
    State(state): State<AppState>,
    payload: Result<Json<GenerateQrRequest>, JsonRejection>,
) -> AppResult<Json<QrBundle>> {
    let Json(req) = payload?;
    let bundle = state
        .services
        .admission
        .generate_qr(req.match_id, &req.password, &req.judge_names)
        .await?;
    Ok(Json(bundle))
}

pub async fn verify(
    State(state): State<AppState>,
    payload: Result<Json<VerifyRequest>, JsonRejection>,
) -> AppResult<Json<bool>> {
    let Json(req) = payload?;
    Ok(Json(
        state
            .services
            .admission
            .verify(&req.access_code, &req.password)
            .await?,
    ))
}
