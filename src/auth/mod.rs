pub mod gate;
pub mod password;
pub mod store;
pub use gate::AuthState;
pub use store::{CredentialStore, SignupError, is_email_shaped};
