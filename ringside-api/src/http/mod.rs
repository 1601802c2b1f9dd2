//! HTTP/JSON API and the websocket endpoint.

pub mod access;
pub mod error;
pub mod health;
pub mod judges;
pub mod matches;
pub mod progress;
pub mod scores;
pub mod websocket;

use axum::{
    routing::{get, post, put},
    Router,
};
use ringside_core::{bootstrap::Services, config::WebSocketConfig};
use tower::ServiceBuilder;
use tower_http::{
    cors::{Any, CorsLayer},
    limit::RequestBodyLimitLayer,
    map_response_body::MapResponseBodyLayer,
    trace::TraceLayer,
};

pub use error::{AppError, AppResult};

/// Largest JSON body accepted by the API (roster imports are the biggest)
const MAX_BODY_BYTES: usize = 1024 * 1024;

/// Shared application state
#[derive(Clone)]
pub struct AppState {
    pub services: Services,
    pub websocket: WebSocketConfig,
}

/// Build the router with every route and layer applied
pub fn create_router(services: Services, websocket: WebSocketConfig) -> Router {
    let state = AppState {
        services,
        websocket,
    };

    let api = Router::new()
        // Match progress
        .route("/progress", get(progress::get_progress))
        .route("/progress/start", post(progress::start))
        .route("/progress/current-round", get(progress::current_round))
        .route("/progress/next-round", post(progress::next_round))
        .route("/progress/end", post(progress::end_match))
        .route("/progress/lock", post(progress::lock))
        .route("/progress/unlock", post(progress::unlock))
        .route("/progress/judge-count", get(progress::judge_count))
        .route("/progress/next", post(progress::switch_to_next))
        .route("/progress/{match_id}/qr-generated", get(progress::qr_status))
        // Judges
        .route("/judges", post(judges::register).get(judges::list_all))
        .route("/judges/current", get(judges::list_current))
        .route("/judges/generate", post(judges::generate))
        .route("/judges/{judge_id}/connect", put(judges::set_connected))
        // Roster
        .route("/matches", post(matches::create).get(matches::list))
        .route("/rounds/match/{match_id}", get(matches::rounds_for_match))
        // Scores
        .route("/scores/count", get(scores::count))
        .route("/scores/by-match", get(scores::by_match))
        .route("/scores/{round_id}/force-complete", post(scores::force_complete))
        // Judge admission
        .route("/judge-access/generate-qr", post(access::generate_qr))
        .route("/judge-access/verify", post(access::verify))
        .merge(health::create_health_router());

    Router::new()
        .nest("/api", api)
        .route("/ws", get(websocket::websocket_handler))
        .layer(
            ServiceBuilder::new()
                .layer(TraceLayer::new_for_http())
                .layer(
                    CorsLayer::new()
                        .allow_origin(Any)
                        .allow_methods(Any)
                        .allow_headers(Any),
                )
                .layer(MapResponseBodyLayer::new(axum::body::Body::new))
                .layer(RequestBodyLimitLayer::new(MAX_BODY_BYTES)),
        )
        .with_state(state)
}
