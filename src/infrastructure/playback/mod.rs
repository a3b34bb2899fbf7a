//! Playback infrastructure module

mod rodio;

pub use rodio::RodioPlayer;
