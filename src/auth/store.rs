//! Persistent credential store backed by the `users` table.
use std::sync::LazyLock;

use anyhow::Error;
use argon2::Params;
use regex::Regex;
use tokio::task;
use tokio_rusqlite::{Connection, params};

use super::password::{hash_secret_with, verify_secret};

static EMAIL_PATTERN: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^[^@\s]+@[^@\s]+\.[^@\s]+$").expect("Invalid email regex")
});

pub fn is_email_shaped(identifier: &str) -> bool {
    EMAIL_PATTERN.is_match(identifier)
}

#[derive(Debug, thiserror::Error)]
pub enum SignupError {
    #[error("Invalid identifier {0}: expected an email address")]
    InvalidIdentifier(String),
    #[error("An account already exists for {0}")]
    AlreadyExists(String),
    #[error(transparent)]
    Storage(#[from] Error),
}

#[derive(Clone)]
pub struct CredentialStore {
    db: Connection,
    require_email: bool,
    params: Params,
}

impl CredentialStore {
    pub fn new(db: Connection, require_email: bool) -> Self {
        Self {
            db,
            require_email,
            params: Params::default(),
        }
    }

    /// Override the hashing cost. Only lowers it for tests.
    pub fn with_params(mut self, params: Params) -> Self {
        self.params = params;
        self
    }

    /// Persist a new credential. The secret is hashed before it is
    /// stored.
    pub async fn create_user(&self, identifier: &str, secret: &str) -> Result<(), SignupError> {
        let identifier = identifier.trim().to_string();
        if identifier.is_empty() || (self.require_email && !is_email_shaped(&identifier)) {
            return Err(SignupError::InvalidIdentifier(identifier));
        }

        // Hashing is CPU bound so it runs on the blocking pool instead
        // of stalling other sessions' streams
        let secret = secret.to_string();
        let params = self.params.clone();
        let secret_hash = task::spawn_blocking(move || hash_secret_with(&secret, params))
            .await
            .map_err(Error::from)??;
        let id = identifier.clone();
        // The primary key decides who wins when the same identifier
        // signs up twice
        let inserted = self
            .db
            .call(move |conn| {
                let count = conn.execute(
                    "INSERT OR IGNORE INTO users (identifier, secret_hash) VALUES (?, ?)",
                    params![id, secret_hash],
                )?;
                Ok(count)
            })
            .await
            .map_err(Error::from)?;

        if inserted == 0 {
            tracing::debug!("Signup rejected, {} already exists", identifier);
            return Err(SignupError::AlreadyExists(identifier));
        }

        tracing::info!("Created user {}", identifier);
        Ok(())
    }

    /// Returns true if a credential exists for `identifier` and
    /// `secret` matches it.
    pub async fn verify(&self, identifier: &str, secret: &str) -> Result<bool, Error> {
        let Some(hash) = self.secret_hash(identifier.trim()).await? else {
            return Ok(false);
        };
        let secret = secret.to_string();
        task::spawn_blocking(move || verify_secret(&secret, &hash)).await?
    }

    /// Look up the stored hash for an identifier.
    pub async fn secret_hash(&self, identifier: &str) -> Result<Option<String>, Error> {
        let id = identifier.to_string();
        let hash = self
            .db
            .call(move |conn| {
                let mut stmt = conn.prepare("SELECT secret_hash FROM users WHERE identifier = ?")?;
                let hash: Option<String> = stmt
                    .query_map([id], |row| row.get(0))?
                    .filter_map(Result::ok)
                    .next();
                Ok(hash)
            })
            .await?;
        Ok(hash)
    }

    pub async fn count(&self) -> Result<i64, Error> {
        let count = self
            .db
            .call(|conn| {
                let count: i64 = conn.query_row("SELECT COUNT(*) FROM users", [], |row| row.get(0))?;
                Ok(count)
            })
            .await?;
        Ok(count)
    }
}
