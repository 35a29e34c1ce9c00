use std::sync::{Arc, Mutex};

use crate::capture::format::{
    FORMAT_PREFERENCE, FormatSupport, RecorderFormat, StaticSupport, WEBM_DEFAULT,
};
use crate::foundation::core::Fps;
use crate::foundation::error::{ScrollError, ScrollResult};
use crate::media::decode::MIX_SAMPLE_RATE;
use crate::render::surface::FrameRGBA;

/// Target video bitrate in bits per second.
pub const VIDEO_BITS_PER_SECOND: u32 = 12_000_000;
/// Target audio bitrate in bits per second.
pub const AUDIO_BITS_PER_SECOND: u32 = 320_000;

/// Lifecycle of a recorder.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum RecorderState {
    /// Constructed, not started.
    Inactive,
    /// Accepting video frames and audio samples.
    Recording,
    /// Stopped; chunks have been handed out.
    Stopped,
}

/// Stream parameters shared by every recorder.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct RecorderSettings {
    /// Frame width in pixels.
    pub width: u32,
    /// Frame height in pixels.
    pub height: u32,
    /// Capture frame rate.
    pub fps: Fps,
    /// Interleaved stereo sample rate of pushed audio.
    pub sample_rate: u32,
    /// Target video bitrate.
    pub video_bits_per_second: u32,
    /// Target audio bitrate.
    pub audio_bits_per_second: u32,
}

impl RecorderSettings {
    /// Settings at the default bitrates and mixing sample rate.
    pub fn new(width: u32, height: u32, fps: Fps) -> Self {
        Self {
            width,
            height,
            fps,
            sample_rate: MIX_SAMPLE_RATE,
            video_bits_per_second: VIDEO_BITS_PER_SECOND,
            audio_bits_per_second: AUDIO_BITS_PER_SECOND,
        }
    }
}

/// Encodes a composited stream into a container, emitting data chunks in order.
pub trait Recorder: Send {
    /// Format being produced.
    fn format(&self) -> RecorderFormat;

    /// Current lifecycle state.
    fn state(&self) -> RecorderState;

    /// Begin recording.
    fn start(&mut self) -> ScrollResult<()>;

    /// Append one video frame.
    fn push_video(&mut self, frame: &FrameRGBA) -> ScrollResult<()>;

    /// Append interleaved stereo samples.
    fn push_audio(&mut self, interleaved: &[f32]) -> ScrollResult<()>;

    /// Stop and return every emitted chunk in emission order.
    ///
    /// Stopping an inactive or already stopped recorder returns no chunks.
    fn stop(&mut self) -> ScrollResult<Vec<Vec<u8>>>;
}

/// Probes format support and constructs recorders.
pub trait RecorderFactory {
    /// Format support of the underlying encoder.
    fn support(&self) -> &dyn FormatSupport;

    /// Construct a recorder for `format`.
    fn create(
        &self,
        format: RecorderFormat,
        settings: &RecorderSettings,
    ) -> ScrollResult<Box<dyn Recorder>>;
}

/// Construct the most preferred recorder the factory can build.
///
/// Supported formats are tried in preference order; the minimal default is tried last even when
/// the factory does not claim to support it.
pub fn create_preferred(
    factory: &dyn RecorderFactory,
    settings: &RecorderSettings,
) -> ScrollResult<Box<dyn Recorder>> {
    let mut candidates: Vec<RecorderFormat> = FORMAT_PREFERENCE
        .iter()
        .copied()
        .filter(|f| factory.support().is_supported(f))
        .collect();
    if !candidates.contains(&WEBM_DEFAULT) {
        candidates.push(WEBM_DEFAULT);
    }

    let mut last_err = None;
    for format in candidates {
        match factory.create(format, settings) {
            Ok(recorder) => {
                tracing::debug!(mime = format.mime, "recorder constructed");
                return Ok(recorder);
            }
            Err(e) => {
                tracing::debug!(mime = format.mime, error = %e, "recorder construction failed");
                last_err = Some(e);
            }
        }
    }
    let detail = last_err.map(|e| e.to_string()).unwrap_or_default();
    Err(ScrollError::export(format!(
        "no supported recording format is available on this system ({detail})"
    )))
}

/// Counters observed by tests and status displays of an [`InMemoryRecorder`].
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct RecorderStats {
    /// Recorders constructed.
    pub created: u32,
    /// `start` calls.
    pub starts: u32,
    /// `stop` calls that ended a recording.
    pub stops: u32,
    /// Video frames accepted.
    pub video_frames: u64,
    /// Interleaved audio samples accepted.
    pub audio_samples: u64,
    /// Whether a recorder is currently recording.
    pub recording: bool,
}

/// Recorder that keeps a compact description of the stream in memory.
///
/// Each video frame becomes one chunk holding its index; each audio push becomes one chunk holding
/// its sample count. Frame pixels are not retained.
#[derive(Debug)]
pub struct InMemoryRecorder {
    format: RecorderFormat,
    settings: RecorderSettings,
    state: RecorderState,
    chunks: Vec<Vec<u8>>,
    stats: Arc<Mutex<RecorderStats>>,
}

impl InMemoryRecorder {
    fn with_stats(
        format: RecorderFormat,
        settings: RecorderSettings,
        stats: Arc<Mutex<RecorderStats>>,
    ) -> Self {
        Self {
            format,
            settings,
            state: RecorderState::Inactive,
            chunks: Vec::new(),
            stats,
        }
    }

    /// Standalone recorder with private stats.
    pub fn new(format: RecorderFormat, settings: RecorderSettings) -> Self {
        Self::with_stats(format, settings, Arc::default())
    }

    fn update(&self, f: impl FnOnce(&mut RecorderStats)) {
        if let Ok(mut stats) = self.stats.lock() {
            f(&mut stats);
        }
    }

    fn ensure_recording(&self) -> ScrollResult<()> {
        if self.state != RecorderState::Recording {
            return Err(ScrollError::export("recorder is not recording"));
        }
        Ok(())
    }
}

impl Recorder for InMemoryRecorder {
    fn format(&self) -> RecorderFormat {
        self.format
    }

    fn state(&self) -> RecorderState {
        self.state
    }

    fn start(&mut self) -> ScrollResult<()> {
        if self.state != RecorderState::Inactive {
            return Err(ScrollError::export("recorder was already started"));
        }
        self.state = RecorderState::Recording;
        let mut header = b"SVREC".to_vec();
        header.extend_from_slice(&self.settings.width.to_le_bytes());
        header.extend_from_slice(&self.settings.height.to_le_bytes());
        self.chunks.push(header);
        self.update(|s| {
            s.starts += 1;
            s.recording = true;
        });
        Ok(())
    }

    fn push_video(&mut self, frame: &FrameRGBA) -> ScrollResult<()> {
        self.ensure_recording()?;
        if frame.width != self.settings.width || frame.height != self.settings.height {
            return Err(ScrollError::validation(format!(
                "frame size mismatch: got {}x{}, expected {}x{}",
                frame.width, frame.height, self.settings.width, self.settings.height
            )));
        }
        let mut index = 0;
        self.update(|s| {
            index = s.video_frames;
            s.video_frames += 1;
        });
        let mut chunk = vec![b'V'];
        chunk.extend_from_slice(&index.to_le_bytes());
        self.chunks.push(chunk);
        Ok(())
    }

    fn push_audio(&mut self, interleaved: &[f32]) -> ScrollResult<()> {
        self.ensure_recording()?;
        let n = interleaved.len() as u64;
        self.update(|s| s.audio_samples += n);
        let mut chunk = vec![b'A'];
        chunk.extend_from_slice(&n.to_le_bytes());
        self.chunks.push(chunk);
        Ok(())
    }

    fn stop(&mut self) -> ScrollResult<Vec<Vec<u8>>> {
        if self.state != RecorderState::Recording {
            self.state = RecorderState::Stopped;
            return Ok(Vec::new());
        }
        self.state = RecorderState::Stopped;
        self.update(|s| {
            s.stops += 1;
            s.recording = false;
        });
        Ok(std::mem::take(&mut self.chunks))
    }
}

/// Factory producing [`InMemoryRecorder`]s that share one stats block; clones share it too.
#[derive(Clone, Debug)]
pub struct InMemoryRecorderFactory {
    support: StaticSupport,
    fail: bool,
    stats: Arc<Mutex<RecorderStats>>,
}

impl InMemoryRecorderFactory {
    /// Factory supporting every known format.
    pub fn new() -> Self {
        Self::with_support(StaticSupport::all())
    }

    /// Factory with an explicit support set.
    pub fn with_support(support: StaticSupport) -> Self {
        Self {
            support,
            fail: false,
            stats: Arc::default(),
        }
    }

    /// Factory whose every construction attempt fails.
    pub fn failing() -> Self {
        Self {
            support: StaticSupport::none(),
            fail: true,
            stats: Arc::default(),
        }
    }

    /// Snapshot of the shared counters.
    pub fn stats(&self) -> RecorderStats {
        self.stats.lock().map(|s| s.clone()).unwrap_or_default()
    }
}

impl Default for InMemoryRecorderFactory {
    fn default() -> Self {
        Self::new()
    }
}

impl RecorderFactory for InMemoryRecorderFactory {
    fn support(&self) -> &dyn FormatSupport {
        &self.support
    }

    fn create(
        &self,
        format: RecorderFormat,
        settings: &RecorderSettings,
    ) -> ScrollResult<Box<dyn Recorder>> {
        if self.fail {
            return Err(ScrollError::export(format!("cannot record {}", format.mime)));
        }
        if let Ok(mut stats) = self.stats.lock() {
            stats.created += 1;
        }
        Ok(Box::new(InMemoryRecorder::with_stats(
            format,
            *settings,
            Arc::clone(&self.stats),
        )))
    }
}

#[cfg(test)]
#[path = "../../tests/unit/capture/recorder.rs"]
mod tests;
