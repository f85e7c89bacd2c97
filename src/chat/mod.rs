pub mod models;
pub mod relay;
pub mod session;
pub use models::{Feedback, Rating, Transcript};
pub use relay::{ChatError, ChatEvent, relay, run_turn};
pub use session::Session;
