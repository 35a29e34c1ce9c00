use std::path::Path;

use crate::foundation::error::{ScrollError, ScrollResult};

/// Sample rate used for decoding, mixing and capture.
pub const MIX_SAMPLE_RATE: u32 = 48_000;

/// Decoded interleaved PCM.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct AudioPcm {
    /// Samples per second per channel.
    pub sample_rate: u32,
    /// Interleaved channel count (1 or 2).
    pub channels: u16,
    /// Interleaved samples.
    pub interleaved_f32: Vec<f32>,
}

impl AudioPcm {
    /// Number of sample frames.
    pub fn frames(&self) -> usize {
        if self.channels == 0 {
            0
        } else {
            self.interleaved_f32.len() / usize::from(self.channels)
        }
    }

    /// Duration in seconds.
    pub fn duration_secs(&self) -> f64 {
        if self.sample_rate == 0 {
            0.0
        } else {
            self.frames() as f64 / f64::from(self.sample_rate)
        }
    }

    /// Stereo sample pair at frame `idx`; mono is duplicated, out of range is silence.
    pub fn stereo_at(&self, idx: usize) -> (f32, f32) {
        match self.channels {
            1 => {
                let s = self.interleaved_f32.get(idx).copied().unwrap_or(0.0);
                (s, s)
            }
            0 => (0.0, 0.0),
            ch => {
                let base = idx * usize::from(ch);
                let l = self.interleaved_f32.get(base).copied().unwrap_or(0.0);
                let r = self.interleaved_f32.get(base + 1).copied().unwrap_or(0.0);
                (l, r)
            }
        }
    }
}

/// Decode any audio file `ffmpeg` understands into stereo f32 PCM at `sample_rate`.
#[cfg(feature = "media-ffmpeg")]
#[tracing::instrument(level = "debug")]
pub fn decode_audio_f32_stereo(path: &Path, sample_rate: u32) -> ScrollResult<AudioPcm> {
    let out = std::process::Command::new("ffmpeg")
        .args(["-v", "error", "-i"])
        .arg(path)
        .args([
            "-vn",
            "-f",
            "f32le",
            "-acodec",
            "pcm_f32le",
            "-ac",
            "2",
            "-ar",
            &sample_rate.to_string(),
            "pipe:1",
        ])
        .output()
        .map_err(|e| ScrollError::playback(format!("failed to run ffmpeg for audio decode: {e}")))?;

    if !out.status.success() {
        return Err(ScrollError::playback(format!(
            "ffmpeg audio decode failed for '{}': {}",
            path.display(),
            String::from_utf8_lossy(&out.stderr).trim()
        )));
    }

    if !out.stdout.len().is_multiple_of(4) {
        return Err(ScrollError::playback(
            "decoded audio byte length is not aligned to f32 samples",
        ));
    }
    let mut pcm = Vec::<f32>::with_capacity(out.stdout.len() / 4);
    for chunk in out.stdout.chunks_exact(4) {
        pcm.push(f32::from_le_bytes([chunk[0], chunk[1], chunk[2], chunk[3]]));
    }
    if pcm.is_empty() {
        return Err(ScrollError::playback(format!(
            "'{}' contains no audio",
            path.display()
        )));
    }

    Ok(AudioPcm {
        sample_rate,
        channels: 2,
        interleaved_f32: pcm,
    })
}

/// Stand-in when the crate is built without `media-ffmpeg`: every track fails with a playback
/// error, so the timeline falls back to the wall clock.
#[cfg(not(feature = "media-ffmpeg"))]
pub fn decode_audio_f32_stereo(_path: &Path, _sample_rate: u32) -> ScrollResult<AudioPcm> {
    Err(ScrollError::playback(
        "audio tracks require the 'media-ffmpeg' feature",
    ))
}
