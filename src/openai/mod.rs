pub mod core;
pub mod provider;
pub use core::*;
pub use provider::*;
