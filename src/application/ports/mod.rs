//! Port interfaces (traits) for external systems
//!
//! These traits define the boundaries between the application
//! and infrastructure layers.

pub mod capture;
pub mod config;
pub mod player;

// Re-export common types
pub use capture::{CaptureEngine, CaptureError};
pub use config::ConfigStore;
pub use player::{PlaybackCompletion, PlaybackError, Player};
