//! Public types for the feedback API
use serde::{Deserialize, Serialize};

use crate::chat::Feedback;

#[derive(Deserialize)]
pub struct FeedbackRequest {
    pub session_id: String,
    /// Clamped to 1 to 5 stars
    pub rating: i64,
    #[serde(default)]
    pub comment: String,
}

#[derive(Serialize)]
pub struct FeedbackListResponse {
    pub feedback: Vec<Feedback>,
}
