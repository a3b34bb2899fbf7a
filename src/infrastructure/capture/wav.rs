//! In-place WAV header length patch
//!
//! The capture thread writes a header with zero size fields because the data
//! length is unknown until recording ends. Once the file is closed, the two
//! size fields are repaired with positional writes; the rest of the file is
//! never rewritten.

use std::fs::OpenOptions;
use std::io::{self, Seek, SeekFrom, Write};
use std::path::Path;

use crate::domain::format::WAV_HEADER_LEN;

/// Rewrite the RIFF chunk size (offset 4) and data chunk size (offset 40)
/// from the file's actual length. No other bytes are touched.
///
/// Fails if the file cannot be opened or is shorter than the 44-byte header.
pub fn patch_length(path: &Path) -> io::Result<()> {
    let mut file = OpenOptions::new().read(true).write(true).open(path)?;
    let size = file.metadata()?.len();

    if size < WAV_HEADER_LEN as u64 {
        return Err(io::Error::new(
            io::ErrorKind::InvalidData,
            format!(
                "{}: {} bytes is shorter than a WAV header",
                path.display(),
                size
            ),
        ));
    }

    // WAV sizes are 32-bit; clamp rather than wrap for oversized files
    let data_bytes = u32::try_from(size - WAV_HEADER_LEN as u64).unwrap_or(u32::MAX - 36);

    file.seek(SeekFrom::Start(4))?;
    file.write_all(&(data_bytes + 36).to_le_bytes())?;
    file.seek(SeekFrom::Start(40))?;
    file.write_all(&data_bytes.to_le_bytes())?;

    Ok(())
}
