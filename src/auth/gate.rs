/// Whether a session has logged in. Starts `Anonymous`, moves to
/// `Authenticated` after a successful credential check and back on
/// logout. There is no expiry.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub enum AuthState {
    #[default]
    Anonymous,
    Authenticated { username: String },
}

impl AuthState {
    /// Transition to `Authenticated`. Callers must only do this after
    /// the credential store verified the secret.
    pub fn login(&mut self, username: &str) {
        *self = AuthState::Authenticated {
            username: username.to_string(),
        };
    }

    pub fn logout(&mut self) {
        *self = AuthState::Anonymous;
    }

    pub fn is_authenticated(&self) -> bool {
        matches!(self, AuthState::Authenticated { .. })
    }

    pub fn username(&self) -> Option<&str> {
        match self {
            AuthState::Anonymous => None,
            AuthState::Authenticated { username } => Some(username),
        }
    }
}
