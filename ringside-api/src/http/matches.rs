use axum::{
    extract::{rejection::JsonRejection, Path, State},
    http::StatusCode,
    Json,
};
use ringside_core::models::{Match, MatchId, MatchWithRounds, NewMatch, Round};
use serde::{Deserialize, Serialize};

use super::{AppResult, AppState};

/// Roster intake accepts one match or a whole card
#[derive(Debug, Deserialize)]
#[serde(untagged)]
pub enum RosterRequest {
    Many(Vec<NewMatch>),
    One(NewMatch),
}

#[derive(Debug, Serialize)]
#[serde(untagged)]
pub enum RosterResponse {
    Many(Vec<MatchWithRounds>),
    One(MatchWithRounds),
}

pub async fn create(
    State(state): State<AppState>,
    payload: Result<Json<RosterRequest>, JsonRejection>,
) -> AppResult<(StatusCode, Json<RosterResponse>)> {
    let Json(req) = payload?;
    let created = match req {
        RosterRequest::One(entry) => {
            RosterResponse::One(state.services.matches.create_match(&entry).await?)
        }
        RosterRequest::Many(entries) => {
            RosterResponse::Many(state.services.matches.create_matches(&entries).await?)
        }
    };
    Ok((StatusCode::CREATED, Json(created)))
}

pub async fn list(State(state): State<AppState>) -> AppResult<Json<Vec<Match>>> {
    Ok(Json(state.services.matches.list().await?))
}

pub async fn rounds_for_match(
    State(state): State<AppState>,
    Path(match_id): Path<MatchId>,
) -> AppResult<Json<Vec<Round>>> {
    Ok(Json(state.services.matches.rounds_for_match(match_id).await?))
}
