use std::collections::HashSet;

use crate::foundation::error::{ScrollError, ScrollResult};

/// Output container family.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Container {
    /// ISO base media (`.mp4`).
    Mp4,
    /// Matroska/WebM (`.webm`).
    WebM,
}

impl Container {
    /// File extension without the dot.
    pub fn extension(self) -> &'static str {
        match self {
            Self::Mp4 => "mp4",
            Self::WebM => "webm",
        }
    }
}

/// One container + codec combination a recorder can produce.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct RecorderFormat {
    /// MIME type with codec parameters.
    pub mime: &'static str,
    /// Container family.
    pub container: Container,
    /// `ffmpeg` video encoder name.
    pub video_encoder: &'static str,
    /// `ffmpeg` audio encoder name.
    pub audio_encoder: &'static str,
}

impl RecorderFormat {
    /// File extension of the container.
    pub fn extension(&self) -> &'static str {
        self.container.extension()
    }
}

/// H.264 + AAC in MP4: the broadly compatible first choice.
pub const MP4_H264_AAC: RecorderFormat = RecorderFormat {
    mime: "video/mp4;codecs=avc1.42E01E,mp4a.40.2",
    container: Container::Mp4,
    video_encoder: "libx264",
    audio_encoder: "aac",
};

/// Plain MP4 with the encoder defaults.
pub const MP4_DEFAULT: RecorderFormat = RecorderFormat {
    mime: "video/mp4",
    container: Container::Mp4,
    video_encoder: "mpeg4",
    audio_encoder: "aac",
};

/// VP9 + Opus in WebM: the high-quality alternative.
pub const WEBM_VP9_OPUS: RecorderFormat = RecorderFormat {
    mime: "video/webm;codecs=vp9,opus",
    container: Container::WebM,
    video_encoder: "libvpx-vp9",
    audio_encoder: "libopus",
};

/// Minimal WebM default, selected when nothing else is supported.
pub const WEBM_DEFAULT: RecorderFormat = RecorderFormat {
    mime: "video/webm",
    container: Container::WebM,
    video_encoder: "libvpx",
    audio_encoder: "libvorbis",
};

/// Formats in descending preference.
pub const FORMAT_PREFERENCE: [RecorderFormat; 4] =
    [MP4_H264_AAC, MP4_DEFAULT, WEBM_VP9_OPUS, WEBM_DEFAULT];

/// Answers whether a recorder format can be produced.
pub trait FormatSupport {
    /// Return `true` when `format` is supported.
    fn is_supported(&self, format: &RecorderFormat) -> bool;
}

/// Pick the first supported format; the minimal default is the fallback.
pub fn select_format(support: &dyn FormatSupport) -> RecorderFormat {
    let chosen = FORMAT_PREFERENCE
        .iter()
        .copied()
        .find(|f| support.is_supported(f))
        .unwrap_or(WEBM_DEFAULT);
    tracing::debug!(mime = chosen.mime, "recorder format selected");
    chosen
}

/// Fixed answer set, keyed by MIME type.
#[derive(Clone, Debug, Default)]
pub struct StaticSupport {
    mimes: HashSet<&'static str>,
}

impl StaticSupport {
    /// Support exactly the listed formats.
    pub fn new(formats: &[RecorderFormat]) -> Self {
        Self {
            mimes: formats.iter().map(|f| f.mime).collect(),
        }
    }

    /// Support every known format.
    pub fn all() -> Self {
        Self::new(&FORMAT_PREFERENCE)
    }

    /// Support nothing.
    pub fn none() -> Self {
        Self::default()
    }
}

impl FormatSupport for StaticSupport {
    fn is_supported(&self, format: &RecorderFormat) -> bool {
        self.mimes.contains(format.mime)
    }
}

/// Encoders reported by the system `ffmpeg`.
#[derive(Clone, Debug, Default)]
pub struct FfmpegCapabilities {
    encoders: HashSet<String>,
}

impl FfmpegCapabilities {
    /// Parse the listing printed by `ffmpeg -encoders`.
    pub fn parse(listing: &str) -> Self {
        let mut encoders = HashSet::new();
        let mut in_table = false;
        for line in listing.lines() {
            let trimmed = line.trim();
            if trimmed.starts_with("------") {
                in_table = true;
                continue;
            }
            if !in_table {
                continue;
            }
            let mut parts = trimmed.split_whitespace();
            let (Some(flags), Some(name)) = (parts.next(), parts.next()) else {
                continue;
            };
            if flags.len() == 6 && flags.starts_with(['V', 'A', 'S']) {
                encoders.insert(name.to_owned());
            }
        }
        Self { encoders }
    }

    /// Run `ffmpeg -encoders` and parse the result.
    pub fn probe() -> ScrollResult<Self> {
        let out = std::process::Command::new("ffmpeg")
            .args(["-hide_banner", "-encoders"])
            .output()
            .map_err(|e| ScrollError::export(format!("failed to run ffmpeg -encoders: {e}")))?;
        if !out.status.success() {
            return Err(ScrollError::export(format!(
                "ffmpeg -encoders exited with status {}",
                out.status
            )));
        }
        Ok(Self::parse(&String::from_utf8_lossy(&out.stdout)))
    }

    /// Return `true` when the named encoder is available.
    pub fn has_encoder(&self, name: &str) -> bool {
        self.encoders.contains(name)
    }
}

impl FormatSupport for FfmpegCapabilities {
    fn is_supported(&self, format: &RecorderFormat) -> bool {
        self.has_encoder(format.video_encoder) && self.has_encoder(format.audio_encoder)
    }
}

#[cfg(test)]
#[path = "../../tests/unit/capture/format.rs"]
mod tests;
