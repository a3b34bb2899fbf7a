//! Playrec - synchronized playback and microphone capture
//!
//! Plays a reference audio file while recording the microphone to a WAV file
//! for the duration of playback, then patches the WAV header with the final
//! data length.
//!
//! # Architecture
//!
//! The crate follows hexagonal (ports & adapters) architecture:
//!
//! - **Domain**: Session state machine, capture format, and WAV header layout
//! - **Application**: The session controller use case and port interfaces (traits)
//! - **Infrastructure**: Adapter implementations (rodio playback, cpal capture, config)
//! - **CLI**: Command-line interface, argument parsing, and signal handling

pub mod application;
pub mod cli;
pub mod domain;
pub mod infrastructure;
