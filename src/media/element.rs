use crate::foundation::error::ScrollResult;

/// Load/playability state of a media element.
#[derive(Clone, Debug, PartialEq)]
pub enum MediaStatus {
    /// No source attached.
    Empty,
    /// Source attached, metadata not yet available.
    Loading,
    /// Metadata loaded; playback possible.
    Ready {
        /// Duration in seconds.
        duration: f64,
    },
    /// Loading or playback failed.
    Error(String),
}

impl MediaStatus {
    /// Return `true` when playable.
    pub fn is_ready(&self) -> bool {
        matches!(self, Self::Ready { .. })
    }

    /// Return `true` for the error state.
    pub fn is_error(&self) -> bool {
        matches!(self, Self::Error(_))
    }

    /// Known duration in seconds, if ready.
    pub fn duration(&self) -> Option<f64> {
        match self {
            Self::Ready { duration } => Some(*duration),
            _ => None,
        }
    }
}

/// A playable audio source with its own playback clock.
///
/// Implementations own their playback position; the timeline reads it instead of accumulating
/// wall-clock time whenever the element is the active voice track.
pub trait MediaElement: Send {
    /// Current load state.
    fn status(&self) -> MediaStatus;

    /// Start or resume playback. Rejections leave the element paused.
    fn play(&mut self) -> ScrollResult<()>;

    /// Pause at the current position.
    fn pause(&mut self);

    /// Move the playback position to `t` seconds (clamped to the media range).
    fn seek(&mut self, t: f64);

    /// Playback position in seconds.
    fn current_time(&self) -> f64;

    /// Return `true` once a non-looping element reached its end.
    fn ended(&self) -> bool;

    /// Return `true` while not playing.
    fn is_paused(&self) -> bool;

    /// Enable or disable looping at the end.
    fn set_looping(&mut self, looping: bool);

    /// Write `frames` interleaved stereo frames at `sample_rate` into `out`, starting at the render
    /// cursor, and advance the cursor. Paused or ended elements write silence.
    fn read_pcm(&mut self, out: &mut [f32], frames: usize, sample_rate: u32);

    /// Known duration in seconds.
    fn duration(&self) -> Option<f64> {
        self.status().duration()
    }
}

/// Opens media elements for configuration references.
pub trait MediaFactory {
    /// Open `reference`. Failures produce an element in the error state, never a panic.
    fn open(&self, reference: &str) -> Box<dyn MediaElement>;
}

impl<F> MediaFactory for F
where
    F: Fn(&str) -> Box<dyn MediaElement>,
{
    fn open(&self, reference: &str) -> Box<dyn MediaElement> {
        self(reference)
    }
}
