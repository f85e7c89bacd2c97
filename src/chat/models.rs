//! The core models for managing a stateful chat with an LLM.
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::openai::{Message, Role};

/// The ordered log of a conversation. The system message is always
/// the first entry and is only ever sent to the completion provider,
/// never displayed.
#[derive(Clone, Debug)]
pub struct Transcript(Vec<Message>);

impl Transcript {
    pub fn new(system_message: &str) -> Self {
        Self(vec![Message::new(Role::System, system_message)])
    }

    pub fn append(&mut self, msg: Message) {
        self.0.push(msg)
    }

    /// Messages to display to the user in the order they were added.
    pub fn history(&self) -> Vec<Message> {
        self.iter()
            .filter(|m| m.role != Role::System)
            .cloned()
            .collect()
    }

    /// The full sequence including the system message.
    pub fn to_completion_request(&self) -> Vec<Message> {
        self.0.clone()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn iter(&self) -> std::slice::Iter<'_, Message> {
        self.0.iter()
    }
}

pub const MIN_RATING: u8 = 1;
pub const MAX_RATING: u8 = 5;

/// A feedback score that is always within 1 to 5 stars. Out of range
/// values are clamped.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "i64", into = "u8")]
pub struct Rating(u8);

impl Rating {
    pub fn new(value: i64) -> Self {
        Self(value.clamp(MIN_RATING as i64, MAX_RATING as i64) as u8)
    }

    pub fn value(&self) -> u8 {
        self.0
    }
}

impl From<i64> for Rating {
    fn from(value: i64) -> Self {
        Self::new(value)
    }
}

impl From<Rating> for u8 {
    fn from(rating: Rating) -> Self {
        rating.0
    }
}

#[derive(Clone, Debug, Serialize)]
pub struct Feedback {
    pub author: String,
    pub rating: Rating,
    pub comment: String,
    pub created_at: DateTime<Utc>,
}
