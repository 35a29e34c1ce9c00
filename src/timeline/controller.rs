use crate::media::element::MediaElement;

/// Transport mode of the timeline.
///
/// "Paused" is [`Mode::Idle`] with a non-zero current time.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum Mode {
    /// Not advancing.
    #[default]
    Idle,
    /// Live preview playback.
    Playing,
    /// Export capture in progress.
    Exporting,
}

/// Result of one [`TimelineController::tick`].
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct TickOutcome {
    /// Time value every consumer of this tick must use.
    pub time: f64,
    /// The driving voice track reported its natural end during this tick.
    pub voice_ended: bool,
}

/// Owner of the single authoritative "current time".
///
/// While a ready voice track is attached its playback position is the time. Otherwise time
/// advances by the wall-clock delta between ticks.
#[derive(Clone, Debug, Default)]
pub struct TimelineController {
    mode: Mode,
    current_time: f64,
    last_tick: Option<f64>,
}

impl TimelineController {
    /// Idle timeline at zero.
    pub fn new() -> Self {
        Self::default()
    }

    /// Current transport mode.
    pub fn mode(&self) -> Mode {
        self.mode
    }

    /// Current time in seconds.
    pub fn current_time(&self) -> f64 {
        self.current_time
    }

    /// Return `true` while ticks advance time.
    pub fn is_running(&self) -> bool {
        self.mode != Mode::Idle
    }

    /// Playback gate: without a voice track playback is always allowed, with one it must be ready
    /// and error-free.
    pub fn can_play(voice: Option<&dyn MediaElement>) -> bool {
        voice.is_none_or(|v| v.status().is_ready())
    }

    /// Enter [`Mode::Playing`]. Returns `false` when the gate is closed or an export runs.
    pub fn start_playing(&mut self, now: f64, voice: Option<&dyn MediaElement>) -> bool {
        if self.mode == Mode::Exporting || !Self::can_play(voice) {
            return false;
        }
        self.mode = Mode::Playing;
        self.last_tick = Some(now);
        tracing::debug!(time = self.current_time, "timeline playing");
        true
    }

    /// Return to [`Mode::Idle`], keeping the current time.
    pub fn stop(&mut self) {
        if self.mode != Mode::Idle {
            tracing::debug!(time = self.current_time, from = ?self.mode, "timeline idle");
        }
        self.mode = Mode::Idle;
        self.last_tick = None;
    }

    /// Reset to zero and enter [`Mode::Exporting`].
    pub fn begin_export(&mut self, now: f64) {
        self.current_time = 0.0;
        self.mode = Mode::Exporting;
        self.last_tick = Some(now);
        tracing::debug!("timeline exporting");
    }

    /// Jump to `t` seconds (negative and non-finite values become zero).
    pub fn seek(&mut self, t: f64) {
        self.current_time = if t.is_finite() { t.max(0.0) } else { 0.0 };
    }

    /// Advance the clock exactly once for this tick.
    ///
    /// Idle timelines return the current time unchanged. A voice track that is ready drives the
    /// time; otherwise the wall-clock delta since the previous tick is accumulated. Natural end of
    /// the voice track stops preview playback but leaves exports running.
    pub fn tick(&mut self, now: f64, voice: Option<&dyn MediaElement>) -> TickOutcome {
        if self.mode == Mode::Idle {
            return TickOutcome {
                time: self.current_time,
                voice_ended: false,
            };
        }

        let driver = voice.filter(|v| v.status().is_ready());
        let mut voice_ended = false;
        match driver {
            Some(v) => {
                self.current_time = v.current_time().max(0.0);
                voice_ended = v.ended();
            }
            None => {
                let dt = self.last_tick.map_or(0.0, |prev| (now - prev).max(0.0));
                self.current_time += dt;
            }
        }
        self.last_tick = Some(now);

        if voice_ended && self.mode == Mode::Playing {
            self.stop();
        }
        TickOutcome {
            time: self.current_time,
            voice_ended,
        }
    }
}

#[cfg(test)]
#[path = "../../tests/unit/timeline/controller.rs"]
mod tests;
