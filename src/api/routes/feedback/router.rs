//! Router for the feedback API

use std::sync::{Arc, RwLock};

use axum::{
    Json, Router,
    extract::{Path, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::{get, post},
};

use super::public;
use crate::api::public::{error_response, session_not_found};
use crate::api::state::AppState;

type SharedState = Arc<RwLock<AppState>>;

/// Leave feedback on the advisor's answers
async fn submit_feedback(
    State(state): State<SharedState>,
    Json(payload): Json<public::FeedbackRequest>,
) -> Response {
    let mut shared_state = state.write().expect("Unable to write share state");
    let Some(session) = shared_state.session_mut(&payload.session_id) else {
        return session_not_found(&payload.session_id);
    };
    if !session.is_authenticated() {
        return error_response(StatusCode::UNAUTHORIZED, "Log in to leave feedback");
    }

    let entry = session.add_feedback(payload.rating, &payload.comment);
    tracing::info!(
        "Feedback from {} rated {}",
        entry.author,
        entry.rating.value()
    );
    (StatusCode::CREATED, Json(entry)).into_response()
}

/// List feedback left during a session
async fn list_feedback(State(state): State<SharedState>, Path(id): Path<String>) -> Response {
    let shared_state = state.read().expect("Unable to read share state");
    match shared_state.session(&id) {
        Some(session) => Json(public::FeedbackListResponse {
            feedback: session.feedback().to_vec(),
        })
        .into_response(),
        None => session_not_found(&id),
    }
}

/// Create the feedback router
pub fn router() -> Router<SharedState> {
    Router::new()
        .route("/", post(submit_feedback))
        .route("/{id}", get(list_feedback))
}
