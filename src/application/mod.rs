//! Application layer - use cases and port interfaces

pub mod ports;
pub mod session;

pub use session::{SessionController, SessionError, SessionPaths};
