use std::path::Path;
use std::sync::Arc;

use crate::assets::loader::AssetLoader;
use crate::foundation::clock::SharedClock;
use crate::foundation::error::{ScrollError, ScrollResult};
use crate::media::decode::{AudioPcm, MIX_SAMPLE_RATE, decode_audio_f32_stereo};
use crate::media::element::{MediaElement, MediaFactory, MediaStatus};

/// Decoded audio played back against a shared [`Clock`](crate::Clock).
///
/// The playback position is `anchor + (now - anchor_clock)` while playing. A separate render
/// cursor tracks how far [`MediaElement::read_pcm`] has consumed samples; it is resynchronized on
/// play and seek.
pub struct PcmTrack {
    pcm: Arc<AudioPcm>,
    duration: f64,
    status: MediaStatus,
    clock: SharedClock,
    playing: bool,
    looping: bool,
    anchor_pos: f64,
    anchor_clock: f64,
    cursor: f64,
}

impl std::fmt::Debug for PcmTrack {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PcmTrack")
            .field("status", &self.status)
            .field("playing", &self.playing)
            .field("looping", &self.looping)
            .field("position", &self.current_time())
            .finish()
    }
}

impl PcmTrack {
    fn with_status(
        pcm: Arc<AudioPcm>,
        duration: f64,
        status: MediaStatus,
        clock: SharedClock,
    ) -> Self {
        Self {
            pcm,
            duration,
            status,
            clock,
            playing: false,
            looping: false,
            anchor_pos: 0.0,
            anchor_clock: 0.0,
            cursor: 0.0,
        }
    }

    /// Ready track over decoded samples.
    pub fn from_pcm(pcm: AudioPcm, clock: SharedClock) -> Self {
        let duration = pcm.duration_secs();
        Self::with_status(Arc::new(pcm), duration, MediaStatus::Ready { duration }, clock)
    }

    /// Ready track of silence with a fixed duration.
    pub fn silent(duration: f64, clock: SharedClock) -> Self {
        let duration = if duration.is_finite() { duration.max(0.0) } else { 0.0 };
        Self::with_status(
            Arc::new(AudioPcm {
                sample_rate: MIX_SAMPLE_RATE,
                channels: 2,
                interleaved_f32: Vec::new(),
            }),
            duration,
            MediaStatus::Ready { duration },
            clock,
        )
    }

    /// Track in the error state; it never plays.
    pub fn failed(reason: impl Into<String>, clock: SharedClock) -> Self {
        Self::with_status(
            Arc::new(AudioPcm::default()),
            0.0,
            MediaStatus::Error(reason.into()),
            clock,
        )
    }

    /// Decode `path`; a decode failure yields a track in the error state.
    pub fn load(path: &Path, clock: SharedClock) -> Self {
        match decode_audio_f32_stereo(path, MIX_SAMPLE_RATE) {
            Ok(pcm) => {
                tracing::debug!(
                    path = %path.display(),
                    duration = pcm.duration_secs(),
                    "audio decoded"
                );
                Self::from_pcm(pcm, clock)
            }
            Err(err) => {
                tracing::warn!(path = %path.display(), error = %err, "audio failed to load");
                Self::failed(err.to_string(), clock)
            }
        }
    }

    fn raw_position(&self) -> f64 {
        if self.playing {
            self.anchor_pos + (self.clock.now() - self.anchor_clock).max(0.0)
        } else {
            self.anchor_pos
        }
    }

    fn fold(&self, t: f64) -> f64 {
        if self.looping && self.duration > 0.0 {
            crate::foundation::math::wrap_f64(t, self.duration)
        } else {
            t.clamp(0.0, self.duration)
        }
    }

    fn reanchor(&mut self, pos: f64) {
        self.anchor_pos = pos;
        self.anchor_clock = self.clock.now();
        self.cursor = pos;
    }
}

impl MediaElement for PcmTrack {
    fn status(&self) -> MediaStatus {
        self.status.clone()
    }

    fn play(&mut self) -> ScrollResult<()> {
        match &self.status {
            MediaStatus::Ready { .. } => {}
            MediaStatus::Error(reason) => {
                return Err(ScrollError::playback(format!("cannot play errored media: {reason}")));
            }
            MediaStatus::Empty | MediaStatus::Loading => {
                return Err(ScrollError::playback("media is not ready"));
            }
        }
        if self.playing && !self.ended() {
            return Ok(());
        }
        let pos = if self.ended() { 0.0 } else { self.current_time() };
        self.reanchor(pos);
        self.playing = true;
        Ok(())
    }

    fn pause(&mut self) {
        if self.playing {
            let pos = self.current_time();
            self.anchor_pos = pos;
            self.playing = false;
        }
    }

    fn seek(&mut self, t: f64) {
        let t = if t.is_finite() { t } else { 0.0 };
        let pos = self.fold(t.max(0.0));
        self.reanchor(pos);
    }

    fn current_time(&self) -> f64 {
        self.fold(self.raw_position())
    }

    fn ended(&self) -> bool {
        !self.looping && self.status.is_ready() && self.raw_position() >= self.duration
    }

    fn is_paused(&self) -> bool {
        !self.playing || self.ended()
    }

    fn set_looping(&mut self, looping: bool) {
        if looping != self.looping {
            let pos = self.current_time();
            self.looping = looping;
            self.anchor_pos = pos;
            self.anchor_clock = self.clock.now();
        }
    }

    fn read_pcm(&mut self, out: &mut [f32], frames: usize, sample_rate: u32) {
        let n = (frames * 2).min(out.len());
        out[..n].fill(0.0);
        if sample_rate == 0 || self.is_paused() || self.pcm.sample_rate == 0 {
            return;
        }

        let step = 1.0 / f64::from(sample_rate);
        let src_rate = f64::from(self.pcm.sample_rate);
        let mut t = self.cursor;
        for frame in out[..n].chunks_exact_mut(2) {
            if self.looping && self.duration > 0.0 {
                t = crate::foundation::math::wrap_f64(t, self.duration);
            } else if t >= self.duration {
                break;
            }
            let (l, r) = self.pcm.stereo_at((t * src_rate) as usize);
            frame[0] = l;
            frame[1] = r;
            t += step;
        }
        self.cursor += frames as f64 * step;
        if self.looping && self.duration > 0.0 {
            self.cursor = crate::foundation::math::wrap_f64(self.cursor, self.duration);
        }
    }
}

/// Opens [`PcmTrack`]s from references resolved by an [`AssetLoader`].
#[derive(Clone)]
pub struct FileMediaFactory {
    loader: AssetLoader,
    clock: SharedClock,
}

impl FileMediaFactory {
    /// Resolve references against `loader`; tracks play against `clock`.
    pub fn new(loader: AssetLoader, clock: SharedClock) -> Self {
        Self { loader, clock }
    }
}

impl MediaFactory for FileMediaFactory {
    fn open(&self, reference: &str) -> Box<dyn MediaElement> {
        match self.loader.resolve(reference) {
            Ok(path) => Box::new(PcmTrack::load(&path, self.clock.clone())),
            Err(err) => {
                tracing::warn!(reference, error = %err, "audio reference unusable");
                Box::new(PcmTrack::failed(err.to_string(), self.clock.clone()))
            }
        }
    }
}

#[cfg(test)]
#[path = "../../tests/unit/media/pcm.rs"]
mod tests;
