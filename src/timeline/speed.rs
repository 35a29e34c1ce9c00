use crate::config::model::VideoConfig;

/// Lower bound for the audio-fitted scroll speed, in px/s.
pub const MIN_AUTO_SCROLL_SPEED: f64 = 10.0;

/// Divisor used for the visual duration when the effective speed is not positive.
pub const FALLBACK_SPEED_DIVISOR: f64 = 50.0;

/// Voice durations shorter than this are treated as degenerate when fitting the scroll speed.
pub const MIN_FIT_DURATION_SECS: f64 = 1e-3;

/// Derived scroll parameters for one configuration, layout and voice state.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct ScrollMetrics {
    /// Height of the laid-out text block.
    pub text_height: f64,
    /// Canvas height.
    pub canvas_height: f64,
    /// Effective vertical speed in px/s.
    pub speed: f64,
    /// Length of the video in seconds.
    pub max_duration: f64,
}

impl ScrollMetrics {
    /// Compute the metrics for `line_count` laid-out lines.
    ///
    /// `voice_duration` is the duration of a loaded, error-free voice track, if any.
    pub fn compute(config: &VideoConfig, line_count: usize, voice_duration: Option<f64>) -> Self {
        let text_height = line_count as f64 * config.line_height_px();
        let canvas_height = config.canvas().h();
        let speed = effective_scroll_speed(
            config.auto_scroll_speed,
            config.scroll_speed,
            text_height,
            canvas_height,
            voice_duration,
        );
        Self {
            text_height,
            canvas_height,
            speed,
            max_duration: max_duration(voice_duration, text_height, canvas_height, speed),
        }
    }

    /// Total vertical travel: the text block plus one canvas height.
    pub fn scroll_distance(&self) -> f64 {
        self.text_height + self.canvas_height
    }
}

/// Effective scroll speed in px/s.
///
/// Manual mode, or auto mode without a voice track, uses `manual_speed`. Auto mode with a voice
/// track fits the whole traversal to the voice duration, never going below
/// [`MIN_AUTO_SCROLL_SPEED`]; degenerate durations and non-finite quotients yield the floor.
pub fn effective_scroll_speed(
    auto: bool,
    manual_speed: f64,
    text_height: f64,
    canvas_height: f64,
    voice_duration: Option<f64>,
) -> f64 {
    if !auto {
        return manual_speed;
    }
    let Some(duration) = voice_duration else {
        return manual_speed;
    };
    if !duration.is_finite() || duration < MIN_FIT_DURATION_SECS {
        return MIN_AUTO_SCROLL_SPEED;
    }
    let fitted = (text_height + canvas_height) / duration;
    if fitted.is_finite() {
        fitted.max(MIN_AUTO_SCROLL_SPEED)
    } else {
        MIN_AUTO_SCROLL_SPEED
    }
}

/// Length of the video: the voice duration when known, else the time the text takes to scroll
/// fully past the top edge.
pub fn max_duration(
    voice_duration: Option<f64>,
    text_height: f64,
    canvas_height: f64,
    speed: f64,
) -> f64 {
    if let Some(d) = voice_duration
        && d.is_finite()
        && d > 0.0
    {
        return d;
    }
    let divisor = if speed.is_finite() && speed > 0.0 {
        speed
    } else {
        FALLBACK_SPEED_DIVISOR
    };
    (text_height + canvas_height) / divisor
}

#[cfg(test)]
#[path = "../../tests/unit/timeline/speed.rs"]
mod tests;
