use std::collections::HashMap;
use std::sync::Arc;

use chrono::{DateTime, TimeDelta, Utc};
use tokio_rusqlite::Connection;
use uuid::Uuid;

use crate::auth::CredentialStore;
use crate::chat::Session;
use crate::core::AppConfig;
use crate::openai::CompletionProvider;

pub struct AppState {
    pub config: AppConfig,
    pub credentials: CredentialStore,
    pub provider: Arc<dyn CompletionProvider>,
    // Live sessions keyed by session ID. Dropped on reset, after
    // sitting idle or on restart.
    pub sessions: HashMap<String, Session>,
}

impl AppState {
    pub fn new(db: Connection, config: AppConfig, provider: Arc<dyn CompletionProvider>) -> Self {
        let credentials = CredentialStore::new(db, config.require_email_identifier);
        Self {
            config,
            credentials,
            provider,
            sessions: HashMap::new(),
        }
    }

    fn max_idle(&self) -> TimeDelta {
        TimeDelta::try_minutes(self.config.session_idle_minutes).unwrap_or(TimeDelta::MAX)
    }

    /// Start a new session seeded with the configured system message
    /// and return its ID. Idle sessions are swept first.
    pub fn create_session(&mut self) -> String {
        self.evict_idle(Utc::now());

        let id = Uuid::new_v4().to_string();
        let session = Session::new(&id, &self.config.system_message);
        self.sessions.insert(id.clone(), session);
        tracing::debug!("Created session {}", id);
        id
    }

    /// Drop a session and everything in it. Returns false if it didn't
    /// exist.
    pub fn reset_session(&mut self, id: &str) -> bool {
        self.sessions.remove(id).is_some()
    }

    /// Drop every session that has been idle too long as of `now` and
    /// return how many were removed.
    pub fn evict_idle(&mut self, now: DateTime<Utc>) -> usize {
        let max_idle = self.max_idle();
        let before = self.sessions.len();
        self.sessions
            .retain(|_, session| !session.is_idle(now, max_idle));
        let evicted = before - self.sessions.len();
        if evicted > 0 {
            tracing::debug!("Evicted {} idle sessions", evicted);
        }
        evicted
    }

    pub fn session(&self, id: &str) -> Option<&Session> {
        self.sessions.get(id)
    }

    /// Get a session for an update. Counts as activity.
    pub fn session_mut(&mut self, id: &str) -> Option<&mut Session> {
        let session = self.sessions.get_mut(id)?;
        session.touch();
        Some(session)
    }
}
