//! Microphone capture adapter using cpal
//!
//! One dedicated capture thread owns the input stream for the whole
//! recording lifetime: cpal's callback feeds sample chunks into a channel,
//! the thread drains it and appends PCM16 LE bytes to the output file. The
//! stream is kept on that thread because `cpal::Stream` is not `Send`.
//!
//! Stopping is cooperative: `end()` clears the recording flag, the loop
//! exits within one receive timeout, the stream and the writer are dropped,
//! and only then is the header patch handed to an independent thread.

use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::mpsc::{self, Receiver, RecvTimeoutError, Sender};
use std::sync::{Arc, Mutex as StdMutex};
use std::thread::JoinHandle;
use std::time::Duration;

use async_trait::async_trait;
use cpal::traits::{DeviceTrait, HostTrait, StreamTrait};
use cpal::{SampleFormat, SampleRate, StreamConfig};
use log::{debug, error, info, warn};

use crate::application::ports::{CaptureEngine, CaptureError};
use crate::domain::format::CaptureFormat;

use super::wav;

/// How long the capture loop blocks on the sample channel before re-checking
/// the recording flag. Bounds the cancellation latency.
const RECV_TIMEOUT: Duration = Duration::from_millis(100);

/// Microphone capture engine backed by cpal
pub struct CpalCapture {
    format: CaptureFormat,
    is_recording: Arc<AtomicBool>,
    /// Set by the worker once the output file exists on disk; gates the
    /// header patch so a session that never created a file skips it
    file_started: Arc<AtomicBool>,
    target: StdMutex<Option<PathBuf>>,
    worker: StdMutex<Option<JoinHandle<()>>>,
    finalizer: StdMutex<Option<JoinHandle<()>>>,
}

impl CpalCapture {
    /// Create a capture engine for the given format
    pub fn new(format: CaptureFormat) -> Self {
        Self {
            format,
            is_recording: Arc::new(AtomicBool::new(false)),
            file_started: Arc::new(AtomicBool::new(false)),
            target: StdMutex::new(None),
            worker: StdMutex::new(None),
            finalizer: StdMutex::new(None),
        }
    }

    /// Wait for a scheduled header patch to finish.
    ///
    /// The patch runs detached from `end()` so session teardown returns
    /// promptly; call this before process exit so the patch is not cut off.
    pub async fn finish(&self) {
        let handle = self.finalizer.lock().unwrap().take();
        if let Some(handle) = handle {
            let _ = tokio::task::spawn_blocking(move || handle.join()).await;
        }
    }

    fn get_input_device() -> Result<cpal::Device, CaptureError> {
        let host = cpal::default_host();
        host.default_input_device()
            .ok_or(CaptureError::NoInputDevice)
    }

    /// Pick a device config that supplies the requested sample rate.
    ///
    /// No resampling is done, so a device that cannot produce the requested
    /// rate is treated as unavailable. Mono is preferred; a multi-channel
    /// stream is downmixed by averaging, which is channel selection, not DSP.
    fn get_input_config(
        device: &cpal::Device,
        format: &CaptureFormat,
    ) -> Result<(StreamConfig, SampleFormat), CaptureError> {
        let supported_configs = device
            .supported_input_configs()
            .map_err(|e| CaptureError::StartFailed(format!("Failed to get configs: {}", e)))?;

        let mut best_config: Option<cpal::SupportedStreamConfigRange> = None;

        for config in supported_configs {
            if config.sample_format() != SampleFormat::I16
                && config.sample_format() != SampleFormat::F32
            {
                continue;
            }
            if config.min_sample_rate().0 > format.sample_rate
                || config.max_sample_rate().0 < format.sample_rate
            {
                continue;
            }

            let is_better = match &best_config {
                None => true,
                Some(current) => config.channels() < current.channels(),
            };
            if is_better {
                best_config = Some(config);
            }
        }

        let config_range = best_config.ok_or_else(|| {
            CaptureError::UnsupportedFormat(format!(
                "no input config supports {} Hz",
                format.sample_rate
            ))
        })?;

        let sample_format = config_range.sample_format();
        let config = StreamConfig {
            channels: config_range.channels(),
            sample_rate: SampleRate(format.sample_rate),
            buffer_size: cpal::BufferSize::Default,
        };

        Ok((config, sample_format))
    }

    /// Average interleaved frames down to a single channel
    fn downmix_mono(samples: &[i16], channels: u16) -> Vec<i16> {
        if channels == 1 {
            return samples.to_vec();
        }

        samples
            .chunks(channels as usize)
            .map(|frame| {
                let sum: i32 = frame.iter().map(|&s| i32::from(s)).sum();
                (sum / i32::from(channels)) as i16
            })
            .collect()
    }

    /// Open the input stream and start it. The returned receiver yields mono
    /// sample chunks for as long as the recording flag stays set.
    fn open_input(
        format: &CaptureFormat,
        recording: &Arc<AtomicBool>,
    ) -> Result<(cpal::Stream, Receiver<Vec<i16>>), CaptureError> {
        let device = Self::get_input_device()?;
        let (config, sample_format) = Self::get_input_config(&device, format)?;
        let channels = config.channels;
        debug!(
            "input device config: {} Hz, {} channel(s), {:?}",
            config.sample_rate.0, channels, sample_format
        );

        let (tx, rx): (Sender<Vec<i16>>, Receiver<Vec<i16>>) = mpsc::channel();
        let flag = Arc::clone(recording);

        let stream = match sample_format {
            SampleFormat::I16 => device
                .build_input_stream(
                    &config,
                    move |data: &[i16], _: &cpal::InputCallbackInfo| {
                        if flag.load(Ordering::SeqCst) {
                            let _ = tx.send(Self::downmix_mono(data, channels));
                        }
                    },
                    |err| error!("input stream error: {}", err),
                    None,
                )
                .map_err(|e| CaptureError::StartFailed(e.to_string()))?,

            SampleFormat::F32 => device
                .build_input_stream(
                    &config,
                    move |data: &[f32], _: &cpal::InputCallbackInfo| {
                        if flag.load(Ordering::SeqCst) {
                            let i16_data: Vec<i16> =
                                data.iter().map(|&s| (s * 32767.0) as i16).collect();
                            let _ = tx.send(Self::downmix_mono(&i16_data, channels));
                        }
                    },
                    |err| error!("input stream error: {}", err),
                    None,
                )
                .map_err(|e| CaptureError::StartFailed(e.to_string()))?,

            _ => {
                return Err(CaptureError::UnsupportedFormat(
                    "unsupported sample format".into(),
                ))
            }
        };

        stream
            .play()
            .map_err(|e| CaptureError::StartFailed(e.to_string()))?;

        Ok((stream, rx))
    }
}

/// Body of the capture thread.
///
/// If the microphone cannot be opened, the recording flag is cleared and no
/// file is created or truncated; the session proceeds with nothing captured.
fn capture_worker(
    format: CaptureFormat,
    path: PathBuf,
    recording: Arc<AtomicBool>,
    file_started: Arc<AtomicBool>,
) {
    let (stream, samples) = match CpalCapture::open_input(&format, &recording) {
        Ok(opened) => opened,
        Err(e) => {
            warn!("microphone unavailable, session proceeds unrecorded: {}", e);
            recording.store(false, Ordering::SeqCst);
            return;
        }
    };

    let file = match File::create(&path) {
        Ok(file) => file,
        Err(e) => {
            error!("cannot create {}: {}", path.display(), e);
            recording.store(false, Ordering::SeqCst);
            drop(stream);
            return;
        }
    };
    // From here on there is a file on disk worth a header patch, even if
    // the loop below aborts on a write error
    file_started.store(true, Ordering::SeqCst);
    let mut out = BufWriter::new(file);

    // Placeholder header first; the size fields are patched after close
    if let Err(e) = out.write_all(&format.header()) {
        error!("cannot write WAV header to {}: {}", path.display(), e);
        recording.store(false, Ordering::SeqCst);
        drop(stream);
        return;
    }

    info!("recording to {}", path.display());

    while recording.load(Ordering::SeqCst) {
        match samples.recv_timeout(RECV_TIMEOUT) {
            Ok(chunk) => {
                if let Err(e) = write_chunk(&mut out, &chunk) {
                    // Abort immediately; partial data is flushed below
                    error!("write failed, aborting capture: {}", e);
                    recording.store(false, Ordering::SeqCst);
                    break;
                }
            }
            Err(RecvTimeoutError::Timeout) => continue,
            Err(RecvTimeoutError::Disconnected) => break,
        }
    }

    // Release the microphone before the final flush
    drop(stream);

    // Drain what the callback pushed before the stream stopped
    while let Ok(chunk) = samples.try_recv() {
        if write_chunk(&mut out, &chunk).is_err() {
            break;
        }
    }

    // A failed flush must not crash the session; the finalize step will
    // still patch whatever made it to disk
    if let Err(e) = out.flush() {
        warn!("flush failed on {}: {}", path.display(), e);
    }
}

fn write_chunk(out: &mut BufWriter<File>, chunk: &[i16]) -> std::io::Result<()> {
    let mut bytes = Vec::with_capacity(chunk.len() * 2);
    for sample in chunk {
        bytes.extend_from_slice(&sample.to_le_bytes());
    }
    out.write_all(&bytes)
}

#[async_trait]
impl CaptureEngine for CpalCapture {
    async fn begin(&self, path: &Path) {
        if self.is_recording.swap(true, Ordering::SeqCst) {
            debug!("capture already running");
            return;
        }

        let format = self.format;
        let target = path.to_path_buf();
        let recording = Arc::clone(&self.is_recording);
        let file_started = Arc::clone(&self.file_started);
        file_started.store(false, Ordering::SeqCst);

        *self.target.lock().unwrap() = Some(target.clone());
        let handle =
            std::thread::spawn(move || capture_worker(format, target, recording, file_started));
        *self.worker.lock().unwrap() = Some(handle);
    }

    async fn end(&self) {
        let was_recording = self.is_recording.swap(false, Ordering::SeqCst);
        // A worker that aborted on a write error has already cleared the
        // flag itself; its partial file still needs its header patched, so
        // teardown keys off the stored handle, not the flag alone. Taking
        // the handle also keeps a racing second end() a no-op.
        let worker = self.worker.lock().unwrap().take();
        if !was_recording && worker.is_none() {
            debug!("capture already stopped");
            return;
        }

        // Wait for the capture thread to release the microphone and close
        // the writer; the header patch must not overlap the write loop
        if let Some(handle) = worker {
            let joined = tokio::task::spawn_blocking(move || handle.join()).await;
            if !matches!(joined, Ok(Ok(()))) {
                warn!("capture thread did not exit cleanly");
            }
        }

        // Finalize on its own thread so the caller returns without waiting
        // on file I/O. Skipped when the worker never created a file (the
        // mic-unavailable path); a patch failure leaves the placeholder
        // sizes in place
        let target = self.target.lock().unwrap().take();
        if let Some(path) = target {
            if self.file_started.swap(false, Ordering::SeqCst) {
                let handle = std::thread::spawn(move || match wav::patch_length(&path) {
                    Ok(()) => debug!("patched WAV header of {}", path.display()),
                    Err(e) => error!("header patch failed, sizes left zero: {}", e),
                });
                *self.finalizer.lock().unwrap() = Some(handle);
            }
        }
    }

    fn is_recording(&self) -> bool {
        self.is_recording.load(Ordering::SeqCst)
    }
}
