use chrono::{DateTime, TimeDelta, Utc};
use tokio::sync::mpsc;

use super::models::{Feedback, Rating, Transcript};
use super::relay::{ChatError, ChatEvent, run_turn};
use crate::auth::AuthState;
use crate::openai::{CompletionProvider, Message, Role};

pub const ANONYMOUS_AUTHOR: &str = "anonymous";

/// Everything that belongs to one user's visit: the conversation,
/// whether they logged in and any feedback they left. Nothing here
/// outlives the process.
#[derive(Clone, Debug)]
pub struct Session {
    pub id: String,
    transcript: Transcript,
    auth: AuthState,
    feedback: Vec<Feedback>,
    last_active: DateTime<Utc>,
}

impl Session {
    pub fn new(id: &str, system_message: &str) -> Self {
        Self {
            id: id.to_string(),
            transcript: Transcript::new(system_message),
            auth: AuthState::default(),
            feedback: Vec::new(),
            last_active: Utc::now(),
        }
    }

    /// Mark the session as in use.
    pub fn touch(&mut self) {
        self.last_active = Utc::now();
    }

    pub fn last_active(&self) -> DateTime<Utc> {
        self.last_active
    }

    /// True once the session has gone unused for longer than `max_idle`
    /// as of `now`.
    pub fn is_idle(&self, now: DateTime<Utc>, max_idle: TimeDelta) -> bool {
        now - self.last_active > max_idle
    }

    pub fn transcript(&self) -> &Transcript {
        &self.transcript
    }

    pub fn auth(&self) -> &AuthState {
        &self.auth
    }

    pub fn is_authenticated(&self) -> bool {
        self.auth.is_authenticated()
    }

    pub fn username(&self) -> Option<&str> {
        self.auth.username()
    }

    pub fn login(&mut self, username: &str) {
        tracing::info!("Session {} logged in as {}", self.id, username);
        self.auth.login(username);
    }

    pub fn logout(&mut self) {
        tracing::info!("Session {} logged out", self.id);
        self.auth.logout();
    }

    /// Record feedback authored by the logged in user.
    pub fn add_feedback(&mut self, rating: i64, comment: &str) -> Feedback {
        let entry = Feedback {
            author: self.username().unwrap_or(ANONYMOUS_AUTHOR).to_string(),
            rating: Rating::new(rating),
            comment: comment.to_string(),
            created_at: Utc::now(),
        };
        self.feedback.push(entry.clone());
        entry
    }

    pub fn feedback(&self) -> &[Feedback] {
        &self.feedback
    }

    /// Add the user's prompt to the transcript and return the messages
    /// to send to the completion provider.
    pub fn begin_turn(&mut self, prompt: &str) -> Vec<Message> {
        self.transcript.append(Message::new(Role::User, prompt));
        self.transcript.to_completion_request()
    }

    /// Store the assistant response for a turn that completed.
    pub fn complete_turn(&mut self, content: &str) {
        self.transcript
            .append(Message::new(Role::Assistant, content));
    }

    /// Run a full turn: send the prompt with the conversation so far,
    /// relay the response to `tx` as it streams and store it once it
    /// finishes. A failed turn leaves no assistant message behind.
    pub async fn submit(
        &mut self,
        provider: &dyn CompletionProvider,
        prompt: &str,
        tx: &mpsc::UnboundedSender<ChatEvent>,
    ) -> Result<String, ChatError> {
        let request = self.begin_turn(prompt);
        let content = run_turn(provider, &request, tx).await?;
        self.complete_turn(&content);
        Ok(content)
    }
}
