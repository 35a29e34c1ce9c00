use crate::capture::artifact::{DownloadSink, ExportArtifact};
use crate::capture::recorder::{Recorder, RecorderFactory, RecorderSettings, create_preferred};
use crate::foundation::error::{ScrollError, ScrollResult};
use crate::render::surface::Surface;

/// Delay between rewinding the tracks and starting their playback.
pub const SETTLE_DELAY_SECS: f64 = 0.3;
/// Delay between starting playback and starting the recorder.
pub const WARM_UP_SECS: f64 = 0.3;
/// Margin added to the maximum duration when no voice track gates completion.
pub const NO_VOICE_TIMEOUT_MARGIN_SECS: f64 = 1.0;

/// How a running recording decides it is complete.
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum Completion {
    /// Stop when the voice track reports its natural end.
    VoiceEnd,
    /// Stop this many seconds after recording started.
    Timeout(f64),
}

impl Completion {
    /// Voice-gated when a usable voice track exists, else `max_duration` plus the margin.
    pub fn for_export(voice_usable: bool, max_duration: f64) -> Self {
        if voice_usable {
            Self::VoiceEnd
        } else {
            Self::Timeout(max_duration + NO_VOICE_TIMEOUT_MARGIN_SECS)
        }
    }
}

/// Where an export currently is.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub enum ExportPhase {
    /// No export.
    #[default]
    Idle,
    /// Tracks rewound and paused; playback starts at `until`.
    Settling {
        /// Clock time the settle delay ends.
        until: f64,
    },
    /// Playback running; the recorder starts at `until`.
    WarmingUp {
        /// Clock time the warm-up ends.
        until: f64,
    },
    /// Recorder running.
    Recording {
        /// Clock time the recorder started.
        started_at: f64,
        /// Completion rule fixed at start.
        completion: Completion,
        /// Video frames pushed so far.
        frames_pushed: u64,
    },
}

/// What the owner has to do after [`ExportPipeline::poll`].
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ExportStep {
    /// Nothing changed.
    Wait,
    /// The settle delay elapsed: start both tracks and the exporting timeline.
    StartPlayback,
    /// The warm-up elapsed: call [`ExportPipeline::start_recording`].
    StartRecording,
}

/// Capture/export state machine layered over the exporting timeline.
///
/// The pipeline owns the recorder and the download sink; the owner drives it with clock times and
/// hands it the surface and the capture mix of each tick.
pub struct ExportPipeline {
    factory: Box<dyn RecorderFactory>,
    downloads: Box<dyn DownloadSink>,
    phase: ExportPhase,
    recorder: Option<Box<dyn Recorder>>,
    last_error: Option<String>,
    delivered: u32,
}

impl std::fmt::Debug for ExportPipeline {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ExportPipeline")
            .field("phase", &self.phase)
            .field("recording", &self.recorder.is_some())
            .field("last_error", &self.last_error)
            .field("delivered", &self.delivered)
            .finish()
    }
}

impl ExportPipeline {
    /// Pipeline recording through `factory` and delivering to `downloads`.
    pub fn new(factory: Box<dyn RecorderFactory>, downloads: Box<dyn DownloadSink>) -> Self {
        Self {
            factory,
            downloads,
            phase: ExportPhase::Idle,
            recorder: None,
            last_error: None,
            delivered: 0,
        }
    }

    /// Current phase.
    pub fn phase(&self) -> ExportPhase {
        self.phase
    }

    /// Return `true` unless idle.
    pub fn is_active(&self) -> bool {
        self.phase != ExportPhase::Idle
    }

    /// Return `true` while the recorder runs.
    pub fn is_recording(&self) -> bool {
        matches!(self.phase, ExportPhase::Recording { .. })
    }

    /// User-facing message of the last failed attempt.
    pub fn last_error(&self) -> Option<&str> {
        self.last_error.as_deref()
    }

    /// Artifacts delivered by this pipeline.
    pub fn delivered(&self) -> u32 {
        self.delivered
    }

    /// Start the settle delay. Fails when an export is already active.
    pub fn begin(&mut self, now: f64) -> ScrollResult<()> {
        if self.is_active() {
            return Err(ScrollError::export("an export is already in progress"));
        }
        self.last_error = None;
        self.phase = ExportPhase::Settling {
            until: now + SETTLE_DELAY_SECS,
        };
        tracing::info!("export started");
        tracing::debug!(phase = ?self.phase, "export phase");
        Ok(())
    }

    /// Advance the delay phases.
    pub fn poll(&mut self, now: f64) -> ExportStep {
        match self.phase {
            ExportPhase::Settling { until } if now >= until => {
                self.phase = ExportPhase::WarmingUp {
                    until: now + WARM_UP_SECS,
                };
                tracing::debug!(phase = ?self.phase, "export phase");
                ExportStep::StartPlayback
            }
            ExportPhase::WarmingUp { until } if now >= until => ExportStep::StartRecording,
            _ => ExportStep::Wait,
        }
    }

    /// Construct and start the most preferred recorder.
    ///
    /// On failure the pipeline returns to idle with a user-facing message and nothing keeps
    /// recording.
    pub fn start_recording(
        &mut self,
        now: f64,
        settings: &RecorderSettings,
        completion: Completion,
    ) -> ScrollResult<()> {
        let started = create_preferred(self.factory.as_ref(), settings).and_then(|mut recorder| {
            recorder.start()?;
            Ok(recorder)
        });
        match started {
            Ok(recorder) => {
                tracing::info!(mime = recorder.format().mime, ?completion, "recording");
                self.recorder = Some(recorder);
                self.phase = ExportPhase::Recording {
                    started_at: now,
                    completion,
                    frames_pushed: 0,
                };
                Ok(())
            }
            Err(e) => {
                tracing::error!(error = %e, "recorder could not be started");
                self.last_error = Some(format!("Recording failed: {e}"));
                self.phase = ExportPhase::Idle;
                self.recorder = None;
                Err(e)
            }
        }
    }

    /// Push one copy of the surface for every frame slot that elapsed since recording started.
    ///
    /// Returns the number of frames pushed.
    pub fn capture_frames(
        &mut self,
        now: f64,
        surface: &mut dyn Surface,
        fps: f64,
    ) -> ScrollResult<u64> {
        let ExportPhase::Recording {
            started_at,
            completion,
            frames_pushed,
        } = self.phase
        else {
            return Ok(0);
        };
        let Some(recorder) = self.recorder.as_mut() else {
            return Ok(0);
        };
        let elapsed = (now - started_at).max(0.0);
        let due = (elapsed * fps).floor() as u64 + 1;
        if due <= frames_pushed {
            return Ok(0);
        }
        let frame = surface.read_frame()?;
        for _ in frames_pushed..due {
            recorder.push_video(&frame)?;
        }
        self.phase = ExportPhase::Recording {
            started_at,
            completion,
            frames_pushed: due,
        };
        Ok(due - frames_pushed)
    }

    /// Forward the capture mix of this tick.
    pub fn push_audio(&mut self, interleaved: &[f32]) -> ScrollResult<()> {
        if !self.is_recording() || interleaved.is_empty() {
            return Ok(());
        }
        match self.recorder.as_mut() {
            Some(recorder) => recorder.push_audio(interleaved),
            None => Ok(()),
        }
    }

    /// Return `true` when the running recording reached its completion rule.
    pub fn should_finish(&self, now: f64, voice_ended: bool) -> bool {
        match self.phase {
            ExportPhase::Recording {
                completion: Completion::VoiceEnd,
                ..
            } => voice_ended,
            ExportPhase::Recording {
                started_at,
                completion: Completion::Timeout(secs),
                ..
            } => now - started_at >= secs,
            _ => false,
        }
    }

    /// Stop the recorder, deliver the artifact and return to idle.
    ///
    /// Returns the delivered file name, or `None` when nothing was recording.
    pub fn finish(&mut self) -> ScrollResult<Option<String>> {
        let recorder = self.recorder.take();
        self.phase = ExportPhase::Idle;
        let Some(mut recorder) = recorder else {
            return Ok(None);
        };
        let format = recorder.format();
        let chunks = recorder.stop().inspect_err(|e| {
            self.last_error = Some(format!("Recording failed: {e}"));
        })?;
        let artifact = ExportArtifact::from_chunks(format, chunks, chrono::Utc::now());
        let name = artifact.file_name.clone();
        self.downloads.deliver(artifact)?;
        self.delivered += 1;
        tracing::info!(name = %name, "export finished");
        Ok(Some(name))
    }

    /// Cancel after a failure, keeping a user-facing message for it.
    ///
    /// A message recorded by the failing step itself is kept as is.
    pub fn abort(&mut self, err: &ScrollError) -> String {
        self.cancel();
        self.last_error
            .get_or_insert_with(|| format!("Recording failed: {err}"))
            .clone()
    }

    /// Stop synchronously, discarding anything recorded.
    pub fn cancel(&mut self) {
        if let Some(mut recorder) = self.recorder.take()
            && let Err(e) = recorder.stop()
        {
            tracing::warn!(error = %e, "recorder stop failed during cancel");
        }
        if self.phase != ExportPhase::Idle {
            tracing::info!("export cancelled");
        }
        self.phase = ExportPhase::Idle;
    }
}

#[cfg(test)]
#[path = "../../tests/unit/capture/pipeline.rs"]
mod tests;
