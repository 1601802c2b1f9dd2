use axum::{
    extract::{rejection::QueryRejection, Path, Query, State},
    Json,
};
use ringside_core::models::{CompletedRound, MatchId, RoundId, RoundScoresView};
use serde::{Deserialize, Serialize};

use super::{AppResult, AppState};

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RoundQuery {
    pub round_id: RoundId,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MatchQuery {
    pub match_id: MatchId,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CountResponse {
    pub round_id: RoundId,
    pub count: i64,
}

pub async fn count(
    State(state): State<AppState>,
    query: Result<Query<RoundQuery>, QueryRejection>,
) -> AppResult<Json<CountResponse>> {
    let Query(query) = query?;
    let count = state.services.scores.count_submitted(query.round_id).await?;
    Ok(Json(CountResponse {
        round_id: query.round_id,
        count,
    }))
}

pub async fn by_match(
    State(state): State<AppState>,
    query: Result<Query<MatchQuery>, QueryRejection>,
) -> AppResult<Json<Vec<RoundScoresView>>> {
    let Query(query) = query?;
    Ok(Json(state.services.scores.scores_for_match(query.match_id).await?))
}

/// Admin override for a round stuck short of quorum
pub async fn force_complete(
    State(state): State<AppState>,
    Path(round_id): Path<RoundId>,
) -> AppResult<Json<CompletedRound>> {
    Ok(Json(state.services.scores.force_complete(round_id).await?))
}
