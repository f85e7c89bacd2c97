//! Public types for the session API
use serde::Serialize;

#[derive(Serialize)]
pub struct CreateSessionResponse {
    pub session_id: String,
}

#[derive(Serialize)]
pub struct SessionResponse {
    pub session_id: String,
    pub authenticated: bool,
    pub username: Option<String>,
}
