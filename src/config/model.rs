use crate::foundation::core::{Canvas, Fps, Rgba8};
use crate::foundation::error::{ScrollError, ScrollResult};
use crate::layout::measure::FontSpec;
use serde::{Deserialize, Serialize};
use std::fs::File;
use std::io::BufReader;
use std::path::Path;

/// Target aspect ratio; each maps to fixed pixel dimensions.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum AspectRatio {
    /// Landscape 1920x1080.
    #[default]
    #[serde(rename = "16:9")]
    Landscape,
    /// Portrait 1080x1920.
    #[serde(rename = "9:16")]
    Portrait,
    /// Square 1080x1080.
    #[serde(rename = "1:1")]
    Square,
    /// Feed portrait 1080x1350.
    #[serde(rename = "4:5")]
    FourFive,
}

impl AspectRatio {
    /// Fixed canvas size for this ratio.
    pub fn canvas(self) -> Canvas {
        let (width, height) = match self {
            Self::Landscape => (1920, 1080),
            Self::Portrait => (1080, 1920),
            Self::Square => (1080, 1080),
            Self::FourFive => (1080, 1350),
        };
        Canvas { width, height }
    }
}

/// Resolution label. Carried as metadata; canvas size comes from [`AspectRatio`].
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Resolution {
    /// 720p.
    #[serde(rename = "720p")]
    Hd720,
    /// 1080p.
    #[default]
    #[serde(rename = "1080p")]
    Hd1080,
    /// 4k.
    #[serde(rename = "4k")]
    Uhd4k,
}

/// Horizontal alignment of the scrolling text.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TextAlign {
    /// Start at the left padding.
    #[default]
    Left,
    /// Centered on the canvas.
    Center,
    /// End at the right padding.
    Right,
}

/// Stacking of an overlay relative to the main text.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LayerOrder {
    /// Drawn before the scrolling text.
    #[default]
    Back,
    /// Drawn after the scrolling text.
    Front,
}

/// Complete, flat configuration snapshot.
///
/// Snapshots are immutable once shared: every edit builds a new value (see [`VideoConfig::edit`]),
/// so a compositor pass and a layout pass never observe a half-applied change.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct VideoConfig {
    /// Script text; `*` emphasis markers are stripped before layout.
    pub script: String,
    /// Body font size in px.
    pub font_size: f64,
    /// Line pitch as a multiple of the font size.
    pub line_height: f64,
    /// Body text color.
    pub text_color: Rgba8,
    /// CSS-like family list; the first entry is used.
    pub font_family: String,
    /// Bold body text.
    pub is_bold: bool,
    /// Horizontal alignment of each line.
    pub text_align: TextAlign,
    /// Manual scroll speed in px/s.
    pub scroll_speed: f64,
    /// Fit the scroll speed to the voice track duration.
    pub auto_scroll_speed: bool,
    /// Target duration hint in seconds (informational).
    pub duration: f64,

    /// Solid background fill.
    pub background_color: Rgba8,
    /// Optional background image reference, drawn with cover scaling.
    pub background_image: Option<String>,

    /// Resolution label (metadata only).
    pub resolution: Resolution,
    /// Canvas aspect ratio; fixes the pixel size.
    pub aspect_ratio: AspectRatio,
    /// Capture frame rate.
    pub fps: u32,
    /// Silence local playback while exporting. Never affects the recorded signal.
    pub mute_on_export: bool,

    /// Voice track reference.
    pub audio_url: Option<String>,
    /// Display name of the voice track.
    pub audio_name: Option<String>,
    /// Background music reference; loops.
    pub bg_music_url: Option<String>,
    /// Display name of the music track.
    pub bg_music_name: Option<String>,
    /// Music volume in `0..=1`, heard and recorded alike.
    pub bg_music_volume: f64,

    /// Bottom ticker text; empty hides the ticker.
    pub ticker_text: String,
    /// Ticker text and border color.
    pub ticker_color: Rgba8,
    /// Ticker bar color.
    pub ticker_bg_color: Rgba8,
    /// Ticker font size in px.
    pub ticker_font_size: f64,
    /// Horizontal marquee speed in px/s.
    pub ticker_speed: f64,

    /// Image watermark reference.
    pub watermark_url: Option<String>,
    /// Image watermark opacity.
    pub watermark_opacity: f64,
    /// Image watermark scale factor.
    pub watermark_scale: f64,
    /// Image watermark left edge.
    pub watermark_x: f64,
    /// Image watermark top edge.
    pub watermark_y: f64,
    /// Image watermark stacking.
    pub watermark_layer: LayerOrder,

    /// Text watermark; empty hides it.
    pub watermark_text: String,
    /// Text watermark font size in px.
    pub watermark_text_font_size: f64,
    /// Text watermark color.
    pub watermark_text_color: Rgba8,
    /// Text watermark opacity.
    pub watermark_text_opacity: f64,
    /// Text watermark left edge.
    pub watermark_text_x: f64,
    /// Text watermark top edge.
    pub watermark_text_y: f64,
    /// Text watermark stacking.
    pub watermark_text_layer: LayerOrder,

    /// Logo reference; always drawn above every other overlay.
    pub logo_url: Option<String>,
    /// Logo opacity.
    pub logo_opacity: f64,
    /// Logo scale factor.
    pub logo_scale: f64,
    /// Logo left edge.
    pub logo_x: f64,
    /// Logo top edge.
    pub logo_y: f64,
}

impl Default for VideoConfig {
    fn default() -> Self {
        Self {
            script: String::new(),
            font_size: 48.0,
            line_height: 1.5,
            text_color: Rgba8::rgb(255, 255, 255),
            font_family: "'Inter', sans-serif".to_owned(),
            is_bold: true,
            text_align: TextAlign::Left,
            scroll_speed: 50.0,
            auto_scroll_speed: false,
            duration: 60.0,
            background_color: Rgba8::rgb(0, 0, 0),
            background_image: None,
            resolution: Resolution::Hd1080,
            aspect_ratio: AspectRatio::Landscape,
            fps: 30,
            mute_on_export: false,
            audio_url: None,
            audio_name: None,
            bg_music_url: None,
            bg_music_name: None,
            bg_music_volume: 0.5,
            ticker_text: String::new(),
            ticker_color: Rgba8::rgb(255, 255, 255),
            ticker_bg_color: Rgba8::rgb(0x0f, 0x17, 0x2a),
            ticker_font_size: 40.0,
            ticker_speed: 200.0,
            watermark_url: None,
            watermark_opacity: 0.3,
            watermark_scale: 1.0,
            watermark_x: 400.0,
            watermark_y: 300.0,
            watermark_layer: LayerOrder::Back,
            watermark_text: String::new(),
            watermark_text_font_size: 60.0,
            watermark_text_color: Rgba8::rgb(255, 255, 255),
            watermark_text_opacity: 0.5,
            watermark_text_x: 960.0,
            watermark_text_y: 540.0,
            watermark_text_layer: LayerOrder::Front,
            logo_url: None,
            logo_opacity: 1.0,
            logo_scale: 0.2,
            logo_x: 50.0,
            logo_y: 50.0,
        }
    }
}

/// Which parts of a snapshot changed between two revisions.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct ConfigChanges {
    /// Voice reference changed.
    pub voice_source: bool,
    /// Music reference changed.
    pub music_source: bool,
    /// Music volume changed.
    pub music_volume: bool,
    /// Background image reference changed.
    pub background_image: bool,
    /// Image watermark reference changed.
    pub watermark_image: bool,
    /// Logo reference changed.
    pub logo_image: bool,
}

impl VideoConfig {
    /// Parse a configuration from a JSON reader. Missing fields take their defaults.
    pub fn from_reader<R: std::io::Read>(r: R) -> ScrollResult<Self> {
        serde_json::from_reader(r)
            .map_err(|e| ScrollError::serde(format!("parse config JSON: {e}")))
    }

    /// Parse a configuration from a JSON string.
    pub fn from_json_str(s: &str) -> ScrollResult<Self> {
        serde_json::from_str(s).map_err(|e| ScrollError::serde(format!("parse config JSON: {e}")))
    }

    /// Parse a configuration from a JSON file on disk.
    pub fn from_path(path: impl AsRef<Path>) -> ScrollResult<Self> {
        let path = path.as_ref();
        let f = File::open(path).map_err(|e| {
            ScrollError::validation(format!("open config JSON '{}': {e}", path.display()))
        })?;
        Self::from_reader(BufReader::new(f))
    }

    /// Serialize to pretty JSON.
    pub fn to_json_pretty(&self) -> ScrollResult<String> {
        serde_json::to_string_pretty(self)
            .map_err(|e| ScrollError::serde(format!("serialize config JSON: {e}")))
    }

    /// Build a new snapshot from this one with `f` applied.
    pub fn edit(&self, f: impl FnOnce(&mut Self)) -> Self {
        let mut next = self.clone();
        f(&mut next);
        next
    }

    /// Check numeric ranges.
    pub fn validate(&self) -> ScrollResult<()> {
        fn positive(name: &str, v: f64) -> ScrollResult<()> {
            if !v.is_finite() || v <= 0.0 {
                return Err(ScrollError::validation(format!(
                    "{name} must be finite and > 0 (got {v})"
                )));
            }
            Ok(())
        }
        fn unit(name: &str, v: f64) -> ScrollResult<()> {
            if !v.is_finite() || !(0.0..=1.0).contains(&v) {
                return Err(ScrollError::validation(format!(
                    "{name} must be within 0..=1 (got {v})"
                )));
            }
            Ok(())
        }
        fn finite(name: &str, v: f64) -> ScrollResult<()> {
            if !v.is_finite() {
                return Err(ScrollError::validation(format!("{name} must be finite")));
            }
            Ok(())
        }

        positive("fontSize", self.font_size)?;
        positive("lineHeight", self.line_height)?;
        positive("tickerFontSize", self.ticker_font_size)?;
        positive("watermarkTextFontSize", self.watermark_text_font_size)?;
        positive("watermarkScale", self.watermark_scale)?;
        positive("logoScale", self.logo_scale)?;
        if self.fps == 0 {
            return Err(ScrollError::validation("fps must be > 0"));
        }
        if !self.scroll_speed.is_finite() || self.scroll_speed < 0.0 {
            return Err(ScrollError::validation("scrollSpeed must be finite and >= 0"));
        }
        finite("tickerSpeed", self.ticker_speed)?;
        unit("bgMusicVolume", self.bg_music_volume)?;
        unit("watermarkOpacity", self.watermark_opacity)?;
        unit("watermarkTextOpacity", self.watermark_text_opacity)?;
        unit("logoOpacity", self.logo_opacity)?;
        for (name, v) in [
            ("watermarkX", self.watermark_x),
            ("watermarkY", self.watermark_y),
            ("watermarkTextX", self.watermark_text_x),
            ("watermarkTextY", self.watermark_text_y),
            ("logoX", self.logo_x),
            ("logoY", self.logo_y),
        ] {
            finite(name, v)?;
        }
        Ok(())
    }

    /// Canvas size derived from the aspect ratio.
    pub fn canvas(&self) -> Canvas {
        self.aspect_ratio.canvas()
    }

    /// Output frame rate.
    pub fn frame_rate(&self) -> ScrollResult<Fps> {
        Fps::new(self.fps, 1)
    }

    /// Line pitch of the scrolling text in pixels.
    pub fn line_height_px(&self) -> f64 {
        self.font_size * self.line_height
    }

    /// Font used by the scrolling text.
    pub fn body_font(&self) -> FontSpec {
        FontSpec::from_css(&self.font_family, self.font_size, self.is_bold)
    }

    /// Font used by the text watermark.
    pub fn watermark_font(&self) -> FontSpec {
        FontSpec::from_css("'Inter', sans-serif", self.watermark_text_font_size, true)
    }

    /// Font used by the bottom ticker.
    pub fn ticker_font(&self) -> FontSpec {
        FontSpec::from_css("'Hind Siliguri', sans-serif", self.ticker_font_size, true)
    }

    /// Diff two snapshots for the fields that drive asset and audio reloads.
    pub fn changes_from(&self, prev: &VideoConfig) -> ConfigChanges {
        ConfigChanges {
            voice_source: self.audio_url != prev.audio_url,
            music_source: self.bg_music_url != prev.bg_music_url,
            music_volume: self.bg_music_volume != prev.bg_music_volume,
            background_image: self.background_image != prev.background_image,
            watermark_image: self.watermark_url != prev.watermark_url,
            logo_image: self.logo_url != prev.logo_url,
        }
    }

    /// Voice track reference; an empty string counts as absent.
    pub(crate) fn voice_reference(&self) -> Option<&str> {
        self.audio_url.as_deref().filter(|s| !s.is_empty())
    }

    pub(crate) fn music_reference(&self) -> Option<&str> {
        self.bg_music_url.as_deref().filter(|s| !s.is_empty())
    }
}

#[cfg(test)]
#[path = "../../tests/unit/config/model.rs"]
mod tests;
