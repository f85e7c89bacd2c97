//! Router for the session API

use std::sync::{Arc, RwLock};

use axum::{
    Json, Router,
    extract::{Path, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::{get, post},
};

use super::public;
use crate::api::public::session_not_found;
use crate::api::state::AppState;

type SharedState = Arc<RwLock<AppState>>;

/// Start a new session
async fn create_session(State(state): State<SharedState>) -> impl IntoResponse {
    let session_id = state
        .write()
        .expect("Unable to write share state")
        .create_session();
    (
        StatusCode::CREATED,
        Json(public::CreateSessionResponse { session_id }),
    )
}

/// Get the auth status of a session
async fn get_session(State(state): State<SharedState>, Path(id): Path<String>) -> Response {
    let shared_state = state.read().expect("Unable to read share state");
    match shared_state.session(&id) {
        Some(session) => Json(public::SessionResponse {
            session_id: session.id.clone(),
            authenticated: session.is_authenticated(),
            username: session.username().map(String::from),
        })
        .into_response(),
        None => session_not_found(&id),
    }
}

/// End a session, dropping its transcript and feedback
async fn delete_session(State(state): State<SharedState>, Path(id): Path<String>) -> Response {
    let removed = state
        .write()
        .expect("Unable to write share state")
        .reset_session(&id);
    if removed {
        tracing::debug!("Reset session {}", id);
        StatusCode::NO_CONTENT.into_response()
    } else {
        session_not_found(&id)
    }
}

/// Create the session router
pub fn router() -> Router<SharedState> {
    Router::new()
        .route("/", post(create_session))
        .route("/{id}", get(get_session).delete(delete_session))
}
