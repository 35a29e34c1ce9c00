use std::sync::Arc;

use crate::assets::loader::{AssetLoader, LoadedAssets};
use crate::audio::graph::{AudioSession, MonitorSink, RenderSources, SourceRole};
use crate::capture::artifact::DownloadSink;
use crate::capture::pipeline::{Completion, ExportPipeline, ExportStep};
use crate::capture::recorder::{RecorderFactory, RecorderSettings};
use crate::config::model::VideoConfig;
use crate::foundation::clock::SharedClock;
use crate::foundation::core::Point;
use crate::foundation::error::{ScrollError, ScrollResult};
use crate::layout::cache::LayoutCache;
use crate::layout::measure::TextMeasurer;
use crate::layout::wrap::LineGeometry;
use crate::media::element::{MediaElement, MediaFactory, MediaStatus};
use crate::player::drag::{Drag, hit_test};
use crate::render::compositor::{FrameInputs, render_frame};
use crate::render::surface::{FrameRGBA, Surface};
use crate::timeline::controller::{Mode, TimelineController};
use crate::timeline::speed::ScrollMetrics;

/// Collaborators a [`Player`] is built from.
pub struct PlayerParts {
    /// Time source for transport, media and audio ramps.
    pub clock: SharedClock,
    /// Drawing target; resized to the configured canvas.
    pub surface: Box<dyn Surface>,
    /// Resolves image references.
    pub assets: AssetLoader,
    /// Opens voice and music references.
    pub media: Box<dyn MediaFactory>,
    /// Local playback output.
    pub monitor: Box<dyn MonitorSink>,
    /// Recorder construction for exports.
    pub recorders: Box<dyn RecorderFactory>,
    /// Destination of finished exports.
    pub downloads: Box<dyn DownloadSink>,
}

/// What one [`Player::tick`] did.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct TickReport {
    /// Time the frame was drawn for.
    pub time: f64,
    /// File name of an export delivered during this tick.
    pub finished_export: Option<String>,
    /// Message of an export that failed during this tick.
    pub failed_export: Option<String>,
}

/// Single owner of the configuration snapshot, layout, timeline, media, audio session, loaded
/// assets, export pipeline and drag state.
///
/// Every state change goes through an operation on this type; the scheduling loop calls
/// [`Player::tick`] for each animation frame.
pub struct Player {
    clock: SharedClock,
    config: Arc<VideoConfig>,
    surface: Box<dyn Surface>,
    loader: AssetLoader,
    media: Box<dyn MediaFactory>,
    layout: LayoutCache,
    font_generation: u64,
    metrics: ScrollMetrics,
    timeline: TimelineController,
    voice: Option<Box<dyn MediaElement>>,
    music: Option<Box<dyn MediaElement>>,
    audio: AudioSession,
    assets: LoadedAssets,
    export: ExportPipeline,
    drag: Option<Drag>,
    mixed_until: Option<f64>,
}

impl std::fmt::Debug for Player {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Player")
            .field("mode", &self.mode())
            .field("time", &self.timeline.current_time())
            .field("metrics", &self.metrics)
            .field("export", &self.export)
            .field("drag", &self.drag)
            .finish()
    }
}

impl Player {
    /// Validate `config`, load its assets and tracks, wire the audio graph and draw frame zero.
    pub fn new(config: VideoConfig, parts: PlayerParts) -> ScrollResult<Self> {
        config.validate()?;
        let PlayerParts {
            clock,
            mut surface,
            assets: loader,
            media,
            monitor,
            recorders,
            downloads,
        } = parts;

        let canvas = config.canvas();
        surface.resize(canvas.width, canvas.height)?;
        let assets = LoadedAssets::load_all(&config, &loader);
        let audio = AudioSession::new(clock.clone(), monitor);

        let mut player = Self {
            clock,
            config: Arc::new(config),
            surface,
            loader,
            media,
            layout: LayoutCache::new(),
            font_generation: 0,
            metrics: ScrollMetrics {
                text_height: 0.0,
                canvas_height: canvas.h(),
                speed: 0.0,
                max_duration: 0.0,
            },
            timeline: TimelineController::new(),
            voice: None,
            music: None,
            audio,
            assets,
            export: ExportPipeline::new(recorders, downloads),
            drag: None,
            mixed_until: None,
        };
        player.reload_voice();
        player.reload_music();
        player.redraw();
        Ok(player)
    }

    // ---- status ------------------------------------------------------------------------------

    /// Current configuration snapshot.
    pub fn config(&self) -> &Arc<VideoConfig> {
        &self.config
    }

    /// Transport mode; an export in any phase reports [`Mode::Exporting`].
    pub fn mode(&self) -> Mode {
        if self.export.is_active() {
            Mode::Exporting
        } else {
            self.timeline.mode()
        }
    }

    /// Current time in seconds.
    pub fn current_time(&self) -> f64 {
        self.timeline.current_time()
    }

    /// Length of the video in seconds.
    pub fn max_duration(&self) -> f64 {
        self.metrics.max_duration
    }

    /// Effective vertical scroll speed in px/s.
    pub fn effective_scroll_speed(&self) -> f64 {
        self.metrics.speed
    }

    /// Derived scroll parameters from the last drawn frame.
    pub fn metrics(&self) -> ScrollMetrics {
        self.metrics
    }

    /// Status of the voice track ([`MediaStatus::Empty`] without one).
    pub fn voice_status(&self) -> MediaStatus {
        self.voice.as_ref().map_or(MediaStatus::Empty, |v| v.status())
    }

    /// Export progress in `0..=1` while an export is active.
    pub fn export_progress(&self) -> Option<f64> {
        if !self.export.is_active() {
            return None;
        }
        let max = self.metrics.max_duration;
        if max <= 0.0 || !max.is_finite() {
            return Some(0.0);
        }
        Some((self.timeline.current_time() / max).min(1.0))
    }

    /// User-facing message of the last failed export.
    pub fn last_export_error(&self) -> Option<&str> {
        self.export.last_error()
    }

    /// Active drag, if any.
    pub fn drag(&self) -> Option<Drag> {
        self.drag
    }

    /// Audio session (gain and context state).
    pub fn audio(&self) -> &AudioSession {
        &self.audio
    }

    /// Decoded image layers.
    pub fn assets(&self) -> &LoadedAssets {
        &self.assets
    }

    /// Drawing surface.
    pub fn surface(&self) -> &dyn Surface {
        self.surface.as_ref()
    }

    /// Mutable drawing surface, e.g. to register fonts on a CPU surface.
    pub fn surface_mut(&mut self) -> &mut dyn Surface {
        self.surface.as_mut()
    }

    /// Wrapped lines of the current script.
    pub fn lines(&mut self) -> Arc<LineGeometry> {
        let c = Arc::clone(&self.config);
        let epoch = self.font_generation + self.surface.font_epoch();
        let measurer: &mut dyn TextMeasurer = self.surface.as_mut();
        self.layout
            .get_or_layout(&c.script, &c.body_font(), c.canvas().wrap_width(), epoch, measurer)
    }

    /// Resolve pending draws and return the last drawn frame.
    pub fn read_frame(&mut self) -> ScrollResult<FrameRGBA> {
        self.surface.read_frame()
    }

    // ---- configuration -----------------------------------------------------------------------

    /// Replace the configuration snapshot, reloading only what changed.
    ///
    /// Changing a track reference during an export cancels the export.
    pub fn set_config(&mut self, next: VideoConfig) -> ScrollResult<()> {
        next.validate()?;
        let prev = Arc::clone(&self.config);
        let changes = next.changes_from(&prev);

        if self.export.is_active() && (changes.voice_source || changes.music_source) {
            tracing::warn!("track changed during export; cancelling");
            self.cancel_export();
        }
        if next.canvas() != prev.canvas() {
            let canvas = next.canvas();
            self.surface.resize(canvas.width, canvas.height)?;
        }
        self.config = Arc::new(next);

        self.assets.apply_changes(&changes, &self.config, &self.loader);
        if changes.voice_source {
            if self.timeline.mode() == Mode::Playing {
                self.pause();
            }
            self.reload_voice();
        }
        if changes.music_source {
            self.reload_music();
        }
        if changes.music_volume {
            self.audio.set_gain(SourceRole::Music, self.config.bg_music_volume);
        }
        if self.export.is_active() && self.config.mute_on_export != prev.mute_on_export {
            self.audio.set_monitor_muted(self.config.mute_on_export);
        }
        self.redraw();
        Ok(())
    }

    /// Font metrics changed (fonts finished loading): recompute the layout and redraw.
    pub fn on_fonts_ready(&mut self) {
        self.font_generation += 1;
        tracing::debug!(generation = self.font_generation, "fonts ready");
        self.redraw();
    }

    fn reload_voice(&mut self) {
        if let Some(old) = self.voice.as_mut() {
            old.pause();
        }
        self.voice = match self.config.voice_reference() {
            Some(reference) => {
                let element = self.media.open(reference);
                if let MediaStatus::Error(reason) = element.status() {
                    tracing::warn!(
                        reason = %reason,
                        "voice track unavailable; timeline uses wall clock"
                    );
                }
                self.audio.connect_source(SourceRole::Voice);
                Some(element)
            }
            None => None,
        };
    }

    fn reload_music(&mut self) {
        if let Some(old) = self.music.as_mut() {
            old.pause();
        }
        self.music = match self.config.music_reference() {
            Some(reference) => {
                let mut element = self.media.open(reference);
                element.set_looping(true);
                self.audio.connect_source(SourceRole::Music);
                self.audio.set_gain(SourceRole::Music, self.config.bg_music_volume);
                if self.timeline.mode() == Mode::Playing {
                    seek_music(element.as_mut(), self.timeline.current_time());
                    if let Err(e) = element.play() {
                        tracing::warn!(error = %e, "music playback rejected");
                    }
                }
                Some(element)
            }
            None => None,
        };
    }

    // ---- transport ---------------------------------------------------------------------------

    /// Start preview playback. Returns `false` when playback is not possible right now.
    pub fn play(&mut self) -> bool {
        if self.export.is_active() || self.timeline.mode() == Mode::Playing {
            return false;
        }
        if !TimelineController::can_play(self.voice.as_deref()) {
            tracing::debug!(status = ?self.voice_status(), "play refused: voice track not ready");
            return false;
        }
        self.audio.resume();
        if let Some(voice) = self.voice.as_mut()
            && let Err(e) = voice.play()
        {
            tracing::warn!(error = %e, "voice playback rejected");
            voice.pause();
            return false;
        }
        let now = self.clock.now();
        if let Some(music) = self.music.as_mut() {
            seek_music(music.as_mut(), self.timeline.current_time());
            if let Err(e) = music.play() {
                tracing::warn!(error = %e, "music playback rejected");
            }
        }
        let started = self.timeline.start_playing(now, self.voice.as_deref());
        if started {
            self.mixed_until = Some(now);
        }
        started
    }

    /// Pause preview playback at the current time.
    pub fn pause(&mut self) {
        if self.export.is_active() {
            return;
        }
        self.timeline.stop();
        self.pause_tracks();
        self.mixed_until = None;
        self.redraw();
    }

    /// Play when paused, pause when playing.
    pub fn toggle_play(&mut self) -> bool {
        if self.timeline.mode() == Mode::Playing {
            self.pause();
            false
        } else {
            self.play()
        }
    }

    /// Stop and rewind everything to zero.
    pub fn reset(&mut self) {
        if self.export.is_active() {
            return;
        }
        self.timeline.stop();
        self.rewind_transient();
        self.redraw();
    }

    /// Jump to `t` seconds (clamped to `0..=max_duration`), re-seeking both tracks.
    ///
    /// Music is seeked modulo its own duration so its loop stays in phase.
    pub fn scrub(&mut self, t: f64) {
        if self.export.is_active() {
            return;
        }
        let t = if t.is_finite() { t.clamp(0.0, self.metrics.max_duration.max(0.0)) } else { 0.0 };
        self.timeline.seek(t);
        if let Some(voice) = self.voice.as_mut() {
            voice.seek(t);
        }
        if let Some(music) = self.music.as_mut() {
            seek_music(music.as_mut(), t);
        }
        self.redraw();
    }

    fn pause_tracks(&mut self) {
        for track in [self.voice.as_mut(), self.music.as_mut()].into_iter().flatten() {
            track.pause();
        }
    }

    fn rewind_transient(&mut self) {
        self.timeline.seek(0.0);
        for track in [self.voice.as_mut(), self.music.as_mut()].into_iter().flatten() {
            track.pause();
            track.seek(0.0);
        }
        self.mixed_until = None;
    }

    // ---- export ------------------------------------------------------------------------------

    /// Begin an export: rewind, pause both tracks and start the settle delay.
    pub fn start_export(&mut self) -> ScrollResult<()> {
        if self.export.is_active() {
            return Err(ScrollError::export("an export is already in progress"));
        }
        self.audio.resume();
        self.timeline.stop();
        self.rewind_transient();
        let now = self.clock.now();
        self.export.begin(now)?;
        if self.config.mute_on_export {
            self.audio.set_monitor_muted(true);
        }
        self.redraw();
        Ok(())
    }

    /// Stop the export immediately: the recorder is stopped and both tracks paused before return.
    pub fn cancel_export(&mut self) {
        if !self.export.is_active() {
            return;
        }
        self.export.cancel();
        self.end_export();
    }

    fn end_export(&mut self) {
        self.timeline.stop();
        self.rewind_transient();
        if self.audio.is_monitor_muted() {
            self.audio.set_monitor_muted(false);
        }
        self.redraw();
    }

    fn fail_export(&mut self, err: &ScrollError) -> String {
        tracing::error!(error = %err, "export failed");
        let message = self.export.abort(err);
        self.end_export();
        message
    }

    fn start_export_playback(&mut self, now: f64) -> ScrollResult<()> {
        if let Some(voice) = self.voice.as_mut().filter(|v| !v.status().is_error()) {
            voice.play().map_err(|e| {
                voice.pause();
                ScrollError::export(format!("voice playback could not start: {e}"))
            })?;
        }
        if let Some(music) = self.music.as_mut()
            && let Err(e) = music.play()
        {
            tracing::warn!(error = %e, "music playback rejected during export");
        }
        self.timeline.begin_export(now);
        self.mixed_until = Some(now);
        Ok(())
    }

    fn start_export_recording(&mut self, now: f64) -> ScrollResult<()> {
        let fps = self.config.frame_rate()?;
        let settings = RecorderSettings::new(self.surface.width(), self.surface.height(), fps);
        let voice_usable = self.voice.as_ref().is_some_and(|v| !v.status().is_error());
        let completion = Completion::for_export(voice_usable, self.metrics.max_duration);
        self.export.start_recording(now, &settings, completion)
    }

    // ---- scheduling --------------------------------------------------------------------------

    /// Run one animation tick at the clock's current time.
    ///
    /// Time is advanced exactly once, then exactly one frame is drawn for it. Export phases,
    /// frame capture, audio capture and export completion are handled in the same tick.
    pub fn tick(&mut self) -> TickReport {
        let now = self.clock.now();
        let mut report = TickReport::default();

        match self.export.poll(now) {
            ExportStep::StartPlayback => {
                if let Err(e) = self.start_export_playback(now) {
                    report.failed_export = Some(self.fail_export(&e));
                }
            }
            ExportStep::StartRecording => {
                if let Err(e) = self.start_export_recording(now) {
                    report.failed_export = Some(self.fail_export(&e));
                }
            }
            ExportStep::Wait => {}
        }

        let outcome = self.timeline.tick(now, self.voice.as_deref());
        if outcome.voice_ended && self.timeline.mode() == Mode::Idle && !self.export.is_active() {
            if let Some(music) = self.music.as_mut() {
                music.pause();
            }
            self.mixed_until = None;
        }
        report.time = outcome.time;
        self.redraw();

        let captured = self.mix_audio(now).and_then(|block| {
            self.export.push_audio(&block)?;
            let fps = f64::from(self.config.fps);
            self.export.capture_frames(now, self.surface.as_mut(), fps)
        });
        if let Err(e) = captured {
            report.failed_export = Some(self.fail_export(&e));
            return report;
        }

        if self.export.should_finish(now, outcome.voice_ended) {
            self.pause_tracks();
            match self.export.finish() {
                Ok(name) => report.finished_export = name,
                Err(e) => report.failed_export = Some(self.fail_export(&e)),
            }
            self.end_export();
        }
        report
    }

    fn mix_audio(&mut self, now: f64) -> ScrollResult<Vec<f32>> {
        let Some(from) = self.mixed_until else {
            return Ok(Vec::new());
        };
        let rate = f64::from(self.audio.sample_rate());
        let frames = ((now - from).max(0.0) * rate).round() as usize;
        if frames == 0 {
            return Ok(Vec::new());
        }
        self.mixed_until = Some(from + frames as f64 / rate);
        let sources = RenderSources {
            voice: self.voice.as_mut().map(|v| v.as_mut() as &mut dyn MediaElement),
            music: self.music.as_mut().map(|m| m.as_mut() as &mut dyn MediaElement),
        };
        Ok(self.audio.render(frames, sources))
    }

    fn redraw(&mut self) {
        let lines = self.lines();
        let config = Arc::clone(&self.config);
        let voice_duration = self
            .voice
            .as_ref()
            .filter(|v| !v.status().is_error())
            .and_then(|v| v.duration());
        self.metrics = ScrollMetrics::compute(&config, lines.len(), voice_duration);
        let inputs = FrameInputs {
            config: &config,
            lines: &lines,
            assets: &self.assets,
            scroll_speed: self.metrics.speed,
        };
        render_frame(self.surface.as_mut(), self.timeline.current_time(), &inputs);
    }

    // ---- pointer -----------------------------------------------------------------------------

    /// Start dragging the overlay under `p`, if any. Returns `true` on a hit.
    pub fn pointer_down(&mut self, p: Point) -> bool {
        let config = Arc::clone(&self.config);
        let measurer: &mut dyn TextMeasurer = self.surface.as_mut();
        self.drag = hit_test(&config, &self.assets, p, measurer);
        self.drag.is_some()
    }

    /// Move the dragged overlay to follow `p`. Returns `true` when a new snapshot was applied.
    pub fn pointer_move(&mut self, p: Point) -> ScrollResult<bool> {
        let Some(drag) = self.drag else {
            return Ok(false);
        };
        let next = drag.moved_to(&self.config, p);
        self.set_config(next)?;
        Ok(true)
    }

    /// End any drag.
    pub fn pointer_up(&mut self) {
        self.drag = None;
    }
}

fn seek_music(music: &mut dyn MediaElement, t: f64) {
    match music.duration() {
        Some(d) if d > 0.0 && d.is_finite() => music.seek(t.rem_euclid(d)),
        _ => music.seek(0.0),
    }
}

#[cfg(test)]
#[path = "../../tests/unit/player/player.rs"]
mod tests;
