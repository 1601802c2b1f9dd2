//! Websocket endpoint: topic subscription out, judge commands in.
//!
//! Connect to `/ws?topics=messages,errors,next-match` (all topics when the
//! parameter is absent). Every broadcast on a subscribed topic is forwarded
//! as a text frame; inbound text frames are decoded by [`protocol`]. A bad
//! message never closes the socket: user-facing failures are re-published
//! on the `errors` topic and everything else is only logged.

pub mod protocol;

use axum::{
    extract::{
        ws::{Message, WebSocket},
        rejection::QueryRejection,
        Query, State, WebSocketUpgrade,
    },
    response::IntoResponse,
};
use futures::{SinkExt, StreamExt};
use ringside_core::{
    broadcast::{BroadcastEvent, Topic},
    logging::generate_session_id,
    models::{JudgeId, RegisterJudge, ScoreSubmission},
};
use serde::Deserialize;
use tracing::{debug, error, info, warn};

use self::protocol::ClientCommand;
use super::{AppError, AppResult, AppState};

#[derive(Debug, Deserialize)]
pub struct WsQuery {
    /// Comma-separated topic names
    pub topics: Option<String>,
}

fn parse_topics(raw: Option<&str>) -> AppResult<Vec<Topic>> {
    let Some(raw) = raw.filter(|r| !r.trim().is_empty()) else {
        return Ok(Topic::ALL.to_vec());
    };
    raw.split(',')
        .map(|name| {
            Topic::parse(name)
                .ok_or_else(|| AppError::bad_request(format!("unknown topic \"{}\"", name.trim())))
        })
        .collect()
}

pub async fn websocket_handler(
    State(state): State<AppState>,
    query: Result<Query<WsQuery>, QueryRejection>,
    ws: WebSocketUpgrade,
) -> AppResult<impl IntoResponse> {
    let Query(query) = query?;
    let topics = parse_topics(query.topics.as_deref())?;

    Ok(ws
        .max_message_size(state.websocket.max_message_size)
        .on_upgrade(move |socket| handle_socket(socket, state, topics)))
}

async fn handle_socket(socket: WebSocket, state: AppState, topics: Vec<Topic>) {
    let session_id = generate_session_id();
    let (subscription_id, mut events) = state.services.hub.subscribe(&topics);
    info!(session_id = %session_id, ?topics, "WebSocket connection established");

    let (mut sink, mut stream) = socket.split();

    let writer_session = session_id.clone();
    let mut writer = tokio::spawn(async move {
        while let Some(event) = events.recv().await {
            let text = match event.to_json() {
                Ok(text) => text,
                Err(e) => {
                    error!(session_id = %writer_session, error = %e, "Failed to encode event");
                    continue;
                }
            };
            if let Err(e) = sink.send(Message::Text(text.into())).await {
                debug!(session_id = %writer_session, error = %e, "WebSocket send failed");
                break;
            }
        }
    });

    // judges that joined over this socket, released on close
    let mut joined: Vec<JudgeId> = Vec::new();

    loop {
        tokio::select! {
            frame = stream.next() => {
                match frame {
                    Some(Ok(Message::Text(text))) => {
                        handle_text(&state, &session_id, text.as_str(), &mut joined).await;
                    }
                    Some(Ok(Message::Close(_))) | None => break,
                    Some(Ok(_)) => {}
                    Some(Err(e)) => {
                        debug!(session_id = %session_id, error = %e, "WebSocket receive failed");
                        break;
                    }
                }
            }
            _ = &mut writer => break,
        }
    }

    writer.abort();
    state.services.hub.unsubscribe(subscription_id);

    for judge_id in joined {
        match state.services.judges.leave_session(judge_id, &session_id).await {
            Ok(true) => debug!(session_id = %session_id, judge_id = %judge_id, "Judge disconnected"),
            Ok(false) => {}
            Err(e) => warn!(
                session_id = %session_id,
                judge_id = %judge_id,
                error = %e,
                "Failed to mark judge disconnected"
            ),
        }
    }

    info!(session_id = %session_id, "WebSocket connection closed");
}

async fn handle_text(state: &AppState, session_id: &str, text: &str, joined: &mut Vec<JudgeId>) {
    let result = match protocol::decode(text) {
        Ok(command) => {
            debug!(session_id = %session_id, kind = command.kind(), "Inbound command");
            dispatch(state, session_id, command, joined).await
        }
        Err(e) => Err(e),
    };

    if let Err(e) = result {
        if e.is_user_facing() {
            warn!(session_id = %session_id, error = %e, "Rejected inbound message");
            state.services.hub.publish(BroadcastEvent::error(e.to_string()));
        } else {
            error!(session_id = %session_id, error = %e, "Failed to handle inbound message");
        }
    }
}

async fn dispatch(
    state: &AppState,
    session_id: &str,
    command: ClientCommand,
    joined: &mut Vec<JudgeId>,
) -> ringside_core::Result<()> {
    match command {
        ClientCommand::Send {
            judge,
            round_id,
            red,
            blue,
            is_cancellation,
        } => {
            state
                .services
                .scores
                .submit(&ScoreSubmission {
                    round_id,
                    device_token: judge,
                    red,
                    blue,
                    is_cancellation,
                })
                .await?;
        }
        ClientCommand::Modify { judge, round_id } => {
            state.services.scores.revert(round_id, &judge).await?;
        }
        ClientCommand::Join {
            judge_name,
            device,
            match_id,
            access_code,
            password,
        } => {
            let judge = state
                .services
                .judges
                .join_session(
                    &RegisterJudge {
                        name: Some(judge_name),
                        device_token: device,
                        match_id,
                        access_code,
                        password,
                    },
                    session_id,
                )
                .await?;
            if !joined.contains(&judge.id) {
                joined.push(judge.id);
            }
        }
    }
    Ok(())
}
