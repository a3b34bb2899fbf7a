//! Capture format value object and canonical WAV header layout

/// Length of the canonical WAV header in bytes.
pub const WAV_HEADER_LEN: usize = 44;

/// PCM capture format.
///
/// The on-disk artifact is a canonical 44-byte WAV header followed by raw
/// little-endian PCM samples in this format.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CaptureFormat {
    /// Sample rate in Hz
    pub sample_rate: u32,
    /// Number of channels (1 = mono)
    pub channels: u16,
    /// Bits per sample
    pub bits_per_sample: u16,
}

impl Default for CaptureFormat {
    fn default() -> Self {
        Self {
            sample_rate: 16_000,
            channels: 1,
            bits_per_sample: 16,
        }
    }
}

impl CaptureFormat {
    /// Create a mono 16-bit format at the given sample rate
    pub fn mono_16bit(sample_rate: u32) -> Self {
        Self {
            sample_rate,
            ..Self::default()
        }
    }

    /// Bytes per sample frame (channels x bits / 8)
    pub fn block_align(&self) -> u16 {
        self.channels * (self.bits_per_sample / 8)
    }

    /// Bytes per second of audio
    pub fn byte_rate(&self) -> u32 {
        self.sample_rate * u32::from(self.block_align())
    }

    /// Build the canonical 44-byte WAV header for this format.
    ///
    /// The two size fields (RIFF chunk size at offset 4, data chunk size at
    /// offset 40) are written as zero placeholders; they are corrected once
    /// recording finishes and the true data length is known.
    pub fn header(&self) -> [u8; WAV_HEADER_LEN] {
        let mut header = [0u8; WAV_HEADER_LEN];

        header[0..4].copy_from_slice(b"RIFF");
        // bytes 4..8: total size - 8, patched after recording
        header[8..12].copy_from_slice(b"WAVE");

        header[12..16].copy_from_slice(b"fmt ");
        header[16..20].copy_from_slice(&16u32.to_le_bytes()); // fmt chunk size
        header[20..22].copy_from_slice(&1u16.to_le_bytes()); // PCM format tag
        header[22..24].copy_from_slice(&self.channels.to_le_bytes());
        header[24..28].copy_from_slice(&self.sample_rate.to_le_bytes());
        header[28..32].copy_from_slice(&self.byte_rate().to_le_bytes());
        header[32..34].copy_from_slice(&self.block_align().to_le_bytes());
        header[34..36].copy_from_slice(&self.bits_per_sample.to_le_bytes());

        header[36..40].copy_from_slice(b"data");
        // bytes 40..44: data size, patched after recording

        header
    }
}
