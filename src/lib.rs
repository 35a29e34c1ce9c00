//! Scrollvision renders scrolling-text "teleprompter" videos.
//!
//! A flat [`VideoConfig`] snapshot describes the script, typography, canvas, background, overlay
//! marks, logo, bottom ticker and audio tracks. The crate turns it into frames and, optionally, an
//! encoded video:
//!
//! - [`layout_script`] wraps the script into measured [`LineGeometry`]
//! - [`render_frame`] composites one frame for a time value onto any [`Surface`]
//! - [`TimelineController`] owns the single current time, driven by the voice track or the clock
//! - [`AudioSession`] routes voice and music to a monitor path and a capture path
//! - [`ExportPipeline`] records the composited stream and delivers an [`ExportArtifact`]
//!
//! [`Player`] wires all of it together behind transport, export and drag operations and a single
//! [`Player::tick`] transition function.
#![forbid(unsafe_code)]
#![warn(missing_docs)]

mod assets;
mod audio;
mod capture;
mod config;
mod foundation;
mod layout;
mod media;
mod player;
mod render;
mod timeline;

pub use crate::foundation::clock::{Clock, ManualClock, SharedClock, SystemClock};
pub use crate::foundation::core::{Canvas, Fps, Point, Rect, Rgba8, Rgba8Premul, Vec2};
pub use crate::foundation::error::{ScrollError, ScrollResult};

pub use crate::config::color::{format_color, parse_color};
pub use crate::config::model::{
    AspectRatio, ConfigChanges, LayerOrder, Resolution, TextAlign, VideoConfig,
};

pub use crate::layout::cache::LayoutCache;
pub use crate::layout::measure::{FixedAdvanceMeasurer, FontMeasurer, FontSpec, TextMeasurer};
pub use crate::layout::wrap::{
    EMPHASIS_MARKER, Line, LineGeometry, Segment, layout_script, split_runs, strip_emphasis,
};

pub use crate::assets::decode::{PreparedImage, decode_image};
pub use crate::assets::fonts::{FontBook, ShapedText};
pub use crate::assets::loader::{AssetLoader, LoadedAssets};

pub use crate::media::decode::{AudioPcm, MIX_SAMPLE_RATE, decode_audio_f32_stereo};
pub use crate::media::element::{MediaElement, MediaFactory, MediaStatus};
pub use crate::media::pcm::{FileMediaFactory, PcmTrack};

pub use crate::timeline::controller::{Mode, TickOutcome, TimelineController};
pub use crate::timeline::speed::{
    FALLBACK_SPEED_DIVISOR, MIN_AUTO_SCROLL_SPEED, ScrollMetrics, effective_scroll_speed,
    max_duration,
};

pub use crate::audio::gain::GainParam;
pub use crate::audio::graph::{
    AudioSession, BufferMonitor, ContextState, MONITOR_RAMP_SECS, MonitorSink, NullMonitor,
    RenderSources, SourceRole, VOICE_MONITOR_LEVEL,
};

pub use crate::render::compositor::{
    FrameInputs, TICKER_BORDER, TICKER_GAP, TICKER_PADDING, cover_rect, line_start_x, line_top,
    line_visible, render_frame, ticker_positions,
};
pub use crate::render::cpu::CpuSurface;
pub use crate::render::recording::{DrawCommand, RecordingSurface};
pub use crate::render::surface::{FrameRGBA, Shadow, Surface, TextBaseline};

pub use crate::capture::artifact::{
    ARTIFACT_PREFIX, DirectoryDownloads, DownloadSink, ExportArtifact, MemoryDownloads,
    artifact_file_name,
};
pub use crate::capture::ffmpeg::{FfmpegRecorder, FfmpegRecorderFactory, is_ffmpeg_on_path};
pub use crate::capture::format::{
    Container, FORMAT_PREFERENCE, FfmpegCapabilities, FormatSupport, MP4_DEFAULT, MP4_H264_AAC,
    RecorderFormat, StaticSupport, WEBM_DEFAULT, WEBM_VP9_OPUS, select_format,
};
pub use crate::capture::pipeline::{
    Completion, ExportPhase, ExportPipeline, ExportStep, NO_VOICE_TIMEOUT_MARGIN_SECS,
    SETTLE_DELAY_SECS, WARM_UP_SECS,
};
pub use crate::capture::recorder::{
    AUDIO_BITS_PER_SECOND, InMemoryRecorder, InMemoryRecorderFactory, Recorder, RecorderFactory,
    RecorderSettings, RecorderState, RecorderStats, VIDEO_BITS_PER_SECOND, create_preferred,
};

pub use crate::player::drag::{Drag, DragTarget, hit_test};
pub use crate::player::player::{Player, PlayerParts, TickReport};
