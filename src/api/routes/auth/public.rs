//! Public types for the auth API
use serde::{Deserialize, Serialize};

#[derive(Deserialize)]
pub struct SignupRequest {
    pub identifier: String,
    pub secret: String,
}

#[derive(Serialize)]
pub struct SignupResponse {
    pub identifier: String,
}

#[derive(Deserialize)]
pub struct LoginRequest {
    pub session_id: String,
    pub identifier: String,
    pub secret: String,
}

#[derive(Serialize)]
pub struct LoginResponse {
    pub username: String,
}

#[derive(Deserialize)]
pub struct LogoutRequest {
    pub session_id: String,
}
