//! API routes module

pub mod auth;
pub mod chat;
pub mod feedback;
pub mod session;

use std::sync::{Arc, RwLock};

use crate::api::state::AppState;
use axum::Router;

type SharedState = Arc<RwLock<AppState>>;

/// Create the combined API router
pub fn router() -> Router<SharedState> {
    Router::new()
        // Session lifecycle routes
        .nest("/session", session::router())
        // Signup, login and logout routes
        .nest("/auth", auth::router())
        // Chat routes
        .nest("/chat", chat::router())
        // Feedback routes
        .nest("/feedback", feedback::router())
}
