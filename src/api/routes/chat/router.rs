//! Router for the chat API

use std::sync::{Arc, RwLock};
use std::time::Duration;

use axum::{
    Json, Router,
    extract::{Path, State},
    http::StatusCode,
    response::{IntoResponse, Response, sse::Event, sse::KeepAlive, sse::Sse},
    routing::{get, post},
};
use tokio::sync::mpsc;
use tokio_stream::StreamExt as _;
use tokio_stream::wrappers::UnboundedReceiverStream;

use super::public;
use crate::api::public::{error_response, session_not_found};
use crate::api::state::AppState;
use crate::chat::{ChatEvent, run_turn};

type SharedState = Arc<RwLock<AppState>>;

/// Get the displayable transcript of a session
async fn chat_transcript(State(state): State<SharedState>, Path(id): Path<String>) -> Response {
    let shared_state = state.read().expect("Unable to read share state");
    match shared_state.session(&id) {
        Some(session) => Json(public::ChatTranscriptResponse {
            transcript: session.transcript().history(),
        })
        .into_response(),
        None => session_not_found(&id),
    }
}

/// Add a prompt to the session and stream the response
async fn chat_handler(
    State(state): State<SharedState>,
    Json(payload): Json<public::ChatRequest>,
) -> Response {
    let session_id = payload.session_id;
    if payload.message.trim().is_empty() {
        return error_response(StatusCode::UNPROCESSABLE_ENTITY, "Message can not be empty");
    }

    let (request, provider) = {
        let mut shared_state = state.write().expect("Unable to write share state");
        let provider = Arc::clone(&shared_state.provider);
        let Some(session) = shared_state.session_mut(&session_id) else {
            return session_not_found(&session_id);
        };
        if !session.is_authenticated() {
            return error_response(StatusCode::UNAUTHORIZED, "Log in to start chatting");
        }
        (session.begin_turn(&payload.message), provider)
    };

    let (tx, rx) = mpsc::unbounded_channel::<ChatEvent>();
    let sse_stream = UnboundedReceiverStream::new(rx).map(|event| Event::default().json_data(event));

    // Get the next response
    tokio::spawn(async move {
        match run_turn(provider.as_ref(), &request, &tx).await {
            Ok(content) => {
                match state
                    .write()
                    .expect("Unable to write share state")
                    .session_mut(&session_id)
                {
                    Some(session) => session.complete_turn(&content),
                    None => tracing::warn!(
                        "Session {} was reset before the response finished",
                        session_id
                    ),
                }
                let _ = tx.send(ChatEvent::Done { content });
            }
            Err(e) => {
                tracing::error!("Chat handler error: {}", e);
                let _ = tx.send(ChatEvent::Error {
                    message: e.to_string(),
                });
            }
        }
    });

    Sse::new(sse_stream)
        .keep_alive(
            KeepAlive::default()
                .text("keep-alive")
                .interval(Duration::from_secs(15)),
        )
        .into_response()
}

/// Create the chat router
pub fn router() -> Router<SharedState> {
    Router::new()
        .route("/", post(chat_handler))
        .route("/{id}", get(chat_transcript))
}
