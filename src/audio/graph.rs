use std::sync::{Arc, Mutex};

use crate::audio::gain::GainParam;
use crate::foundation::clock::SharedClock;
use crate::media::decode::MIX_SAMPLE_RATE;
use crate::media::element::MediaElement;

/// Ramp time constant for monitor mute/unmute, in seconds.
pub const MONITOR_RAMP_SECS: f64 = 0.1;

/// Resting monitor gain of the voice track (leaves headroom for the music bed).
pub const VOICE_MONITOR_LEVEL: f64 = 0.95;

/// Audio source slot in the graph.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum SourceRole {
    /// Narration track; drives the timeline.
    Voice,
    /// Background music bed; loops and has an adjustable volume.
    Music,
}

/// Run state of the audio context.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ContextState {
    /// Created but not processing.
    Suspended,
    /// Processing audio.
    Running,
}

/// Receives the monitor (speaker) mix.
pub trait MonitorSink: Send {
    /// Consume one block of interleaved stereo samples.
    fn write(&mut self, interleaved: &[f32], sample_rate: u32);
}

/// Discards the monitor mix.
#[derive(Clone, Copy, Debug, Default)]
pub struct NullMonitor;

impl MonitorSink for NullMonitor {
    fn write(&mut self, _interleaved: &[f32], _sample_rate: u32) {}
}

/// Accumulates the monitor mix in a shared buffer.
#[derive(Clone, Debug, Default)]
pub struct BufferMonitor {
    samples: Arc<Mutex<Vec<f32>>>,
}

impl BufferMonitor {
    /// Create an empty buffer monitor.
    pub fn new() -> Self {
        Self::default()
    }

    /// Copy of everything written so far.
    pub fn samples(&self) -> Vec<f32> {
        self.samples.lock().map(|s| s.clone()).unwrap_or_default()
    }
}

impl MonitorSink for BufferMonitor {
    fn write(&mut self, interleaved: &[f32], _sample_rate: u32) {
        if let Ok(mut s) = self.samples.lock() {
            s.extend_from_slice(interleaved);
        }
    }
}

#[derive(Debug)]
struct SourceNode {
    volume: f64,
    headroom: f64,
    monitor: GainParam,
    capture: GainParam,
}

impl SourceNode {
    fn rest_monitor_level(&self) -> f64 {
        self.volume * self.headroom
    }
}

/// Media elements available to one render pass.
#[derive(Default)]
pub struct RenderSources<'a> {
    /// Voice element, if loaded.
    pub voice: Option<&'a mut dyn MediaElement>,
    /// Music element, if loaded.
    pub music: Option<&'a mut dyn MediaElement>,
}

/// Owned audio session: one lazily created context, per-role source nodes with a monitor gain and
/// a capture gain, a monitor sink and a capture destination.
///
/// Topology is write-once: a role is connected at most once per session and only gain values and
/// the context run state change afterwards. [`AudioSession::teardown`] drops everything.
pub struct AudioSession {
    clock: SharedClock,
    sample_rate: u32,
    context: Option<ContextState>,
    voice: Option<SourceNode>,
    music: Option<SourceNode>,
    monitor_muted: bool,
    music_volume: f64,
    monitor: Box<dyn MonitorSink>,
    scratch: Vec<f32>,
}

impl std::fmt::Debug for AudioSession {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AudioSession")
            .field("context", &self.context)
            .field("voice", &self.voice.is_some())
            .field("music", &self.music.is_some())
            .field("monitor_muted", &self.monitor_muted)
            .finish()
    }
}

impl AudioSession {
    /// Create a session; the context itself is created on first use.
    pub fn new(clock: SharedClock, monitor: Box<dyn MonitorSink>) -> Self {
        Self {
            clock,
            sample_rate: MIX_SAMPLE_RATE,
            context: None,
            voice: None,
            music: None,
            monitor_muted: false,
            music_volume: 1.0,
            monitor,
            scratch: Vec::new(),
        }
    }

    /// Mixing sample rate.
    pub fn sample_rate(&self) -> u32 {
        self.sample_rate
    }

    /// Context state, `None` before first use or after teardown.
    pub fn context_state(&self) -> Option<ContextState> {
        self.context
    }

    fn ensure_context(&mut self) {
        if self.context.is_none() {
            tracing::debug!(sample_rate = self.sample_rate, "audio context created");
            self.context = Some(ContextState::Suspended);
        }
    }

    /// Create the context if needed and start processing.
    pub fn resume(&mut self) {
        self.ensure_context();
        if self.context != Some(ContextState::Running) {
            tracing::debug!("audio context resumed");
            self.context = Some(ContextState::Running);
        }
    }

    /// Stop processing without tearing down the graph.
    pub fn suspend(&mut self) {
        if self.context == Some(ContextState::Running) {
            self.context = Some(ContextState::Suspended);
        }
    }

    /// Return `true` when `role` has a source node.
    pub fn is_connected(&self, role: SourceRole) -> bool {
        self.node(role).is_some()
    }

    fn node(&self, role: SourceRole) -> Option<&SourceNode> {
        match role {
            SourceRole::Voice => self.voice.as_ref(),
            SourceRole::Music => self.music.as_ref(),
        }
    }

    fn node_mut(&mut self, role: SourceRole) -> Option<&mut SourceNode> {
        match role {
            SourceRole::Voice => self.voice.as_mut(),
            SourceRole::Music => self.music.as_mut(),
        }
    }

    /// Wire a source node for `role` to both the monitor and capture paths.
    ///
    /// Returns `false` if the role was already connected; existing nodes are never rebuilt.
    pub fn connect_source(&mut self, role: SourceRole) -> bool {
        self.ensure_context();
        if self.is_connected(role) {
            return false;
        }
        let (volume, headroom) = match role {
            SourceRole::Voice => (1.0, VOICE_MONITOR_LEVEL),
            SourceRole::Music => (self.music_volume, 1.0),
        };
        let rest = volume * headroom;
        let node = SourceNode {
            volume,
            headroom,
            monitor: GainParam::new(if self.monitor_muted { 0.0 } else { rest }),
            capture: GainParam::new(volume),
        };
        match role {
            SourceRole::Voice => self.voice = Some(node),
            SourceRole::Music => self.music = Some(node),
        }
        tracing::debug!(?role, volume, "audio source connected");
        true
    }

    /// Set the volume of `role`, applied identically to its monitor and capture paths.
    ///
    /// A muted monitor stays muted; the new level is used once it is unmuted.
    pub fn set_gain(&mut self, role: SourceRole, value: f64) {
        let value = if value.is_finite() { value.clamp(0.0, 1.0) } else { 0.0 };
        if role == SourceRole::Music {
            self.music_volume = value;
        }
        let muted = self.monitor_muted;
        if let Some(node) = self.node_mut(role) {
            node.volume = value;
            node.capture.set_value(value);
            if !muted {
                let rest = node.rest_monitor_level();
                node.monitor.set_value(rest);
            }
        }
    }

    /// Mute or unmute the monitor paths with a smooth ramp. Capture paths are unaffected.
    pub fn set_monitor_muted(&mut self, muted: bool) {
        self.monitor_muted = muted;
        let now = self.clock.now();
        for node in [self.voice.as_mut(), self.music.as_mut()].into_iter().flatten() {
            let target = if muted { 0.0 } else { node.rest_monitor_level() };
            node.monitor.set_target_at_time(target, now, MONITOR_RAMP_SECS);
        }
        tracing::debug!(muted, "monitor mute changed");
    }

    /// Return `true` while the monitor paths are muted.
    pub fn is_monitor_muted(&self) -> bool {
        self.monitor_muted
    }

    /// Current monitor gain of `role`.
    pub fn monitor_gain(&self, role: SourceRole) -> Option<f64> {
        let now = self.clock.now();
        self.node(role).map(|n| n.monitor.value_at(now))
    }

    /// Current capture gain of `role`.
    pub fn capture_gain(&self, role: SourceRole) -> Option<f64> {
        let now = self.clock.now();
        self.node(role).map(|n| n.capture.value_at(now))
    }

    /// Pull `frames` stereo frames from every connected source.
    ///
    /// The monitor mix goes to the monitor sink; the capture mix is returned as interleaved
    /// stereo. A context that is not running produces silence and pulls nothing.
    pub fn render(&mut self, frames: usize, sources: RenderSources<'_>) -> Vec<f32> {
        let mut capture = vec![0.0f32; frames * 2];
        if frames == 0 || self.context != Some(ContextState::Running) {
            return capture;
        }
        let mut monitor = vec![0.0f32; frames * 2];
        let t0 = self.clock.now();
        let dt = 1.0 / f64::from(self.sample_rate);

        let RenderSources { voice, music } = sources;
        for (node, element) in [(self.voice.as_ref(), voice), (self.music.as_ref(), music)] {
            let (Some(node), Some(element)) = (node, element) else {
                continue;
            };
            self.scratch.resize(frames * 2, 0.0);
            element.read_pcm(&mut self.scratch, frames, self.sample_rate);
            for (i, (pair, (cap, mon))) in self
                .scratch
                .chunks_exact(2)
                .zip(capture.chunks_exact_mut(2).zip(monitor.chunks_exact_mut(2)))
                .enumerate()
            {
                let t = t0 + i as f64 * dt;
                let mg = node.monitor.value_at(t) as f32;
                let cg = node.capture.value_at(t) as f32;
                for c in 0..2 {
                    cap[c] += pair[c] * cg;
                    mon[c] += pair[c] * mg;
                }
            }
        }

        self.monitor.write(&monitor, self.sample_rate);
        capture
    }

    /// Disconnect every node and close the context.
    pub fn teardown(&mut self) {
        self.voice = None;
        self.music = None;
        self.context = None;
        self.monitor_muted = false;
        tracing::debug!("audio session torn down");
    }
}

#[cfg(test)]
#[path = "../../tests/unit/audio/graph.rs"]
mod tests;
