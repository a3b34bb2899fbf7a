//! Domain layer - Core business logic
//!
//! Contains the session state machine, capture format, and domain errors.
//! This layer has no dependencies on external systems.

pub mod config;
pub mod error;
pub mod format;
pub mod session;

// Re-export common types
pub use config::AppConfig;
pub use error::ConfigError;
pub use format::{CaptureFormat, WAV_HEADER_LEN};
pub use session::{InvalidStateTransition, Session, SessionState};
