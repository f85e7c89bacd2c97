//! Router for the auth API

use std::sync::{Arc, RwLock};

use axum::{
    Json, Router,
    extract::State,
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::post,
};

use super::public;
use crate::api::public::{ApiError, error_response, session_not_found};
use crate::api::state::AppState;
use crate::auth::SignupError;

type SharedState = Arc<RwLock<AppState>>;

/// Create a new account
async fn signup(
    State(state): State<SharedState>,
    Json(payload): Json<public::SignupRequest>,
) -> Result<Response, ApiError> {
    let credentials = state
        .read()
        .expect("Unable to read share state")
        .credentials
        .clone();

    match credentials
        .create_user(&payload.identifier, &payload.secret)
        .await
    {
        Ok(()) => Ok((
            StatusCode::CREATED,
            Json(public::SignupResponse {
                identifier: payload.identifier.trim().to_string(),
            }),
        )
            .into_response()),
        Err(e @ SignupError::InvalidIdentifier(_)) => {
            Ok(error_response(StatusCode::UNPROCESSABLE_ENTITY, &e.to_string()))
        }
        Err(e @ SignupError::AlreadyExists(_)) => {
            Ok(error_response(StatusCode::CONFLICT, &e.to_string()))
        }
        Err(SignupError::Storage(e)) => Err(e.into()),
    }
}

/// Check credentials and mark the session as logged in
async fn login(
    State(state): State<SharedState>,
    Json(payload): Json<public::LoginRequest>,
) -> Result<Response, ApiError> {
    let credentials = {
        let shared_state = state.read().expect("Unable to read share state");
        if shared_state.session(&payload.session_id).is_none() {
            return Ok(session_not_found(&payload.session_id));
        }
        shared_state.credentials.clone()
    };

    let verified = credentials
        .verify(&payload.identifier, &payload.secret)
        .await?;
    if !verified {
        tracing::info!("Failed login for {}", payload.identifier);
        return Ok(error_response(
            StatusCode::UNAUTHORIZED,
            "Incorrect identifier or secret",
        ));
    }

    let username = payload.identifier.trim().to_string();
    let mut shared_state = state.write().expect("Unable to write share state");
    // The session may have been reset while the secret was checked
    let Some(session) = shared_state.session_mut(&payload.session_id) else {
        return Ok(session_not_found(&payload.session_id));
    };
    session.login(&username);

    Ok(Json(public::LoginResponse { username }).into_response())
}

/// Log the session out. The conversation is kept.
async fn logout(
    State(state): State<SharedState>,
    Json(payload): Json<public::LogoutRequest>,
) -> Response {
    let mut shared_state = state.write().expect("Unable to write share state");
    match shared_state.session_mut(&payload.session_id) {
        Some(session) => {
            session.logout();
            StatusCode::NO_CONTENT.into_response()
        }
        None => session_not_found(&payload.session_id),
    }
}

/// Create the auth router
pub fn router() -> Router<SharedState> {
    Router::new()
        .route("/signup", post(signup))
        .route("/login", post(login))
        .route("/logout", post(logout))
}
