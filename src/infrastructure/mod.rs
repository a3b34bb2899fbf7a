//! Infrastructure layer - Adapter implementations
//!
//! Contains concrete implementations of the port interfaces,
//! integrating with the audio devices and the filesystem.

pub mod capture;
pub mod config;
pub mod playback;

// Re-export adapters
pub use capture::CpalCapture;
pub use config::XdgConfigStore;
pub use playback::RodioPlayer;
