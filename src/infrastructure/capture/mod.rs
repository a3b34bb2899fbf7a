//! Capture infrastructure module
//!
//! Streams microphone input to a WAV file using cpal and repairs the header
//! size fields once recording ends.

mod cpal;
mod wav;

pub use cpal::CpalCapture;
pub use wav::patch_length;
