use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::Instant;

/// Monotonic time source in seconds.
///
/// Media elements, the audio context and the scheduling loop all read the same clock so that
/// "now" means the same thing to every participant of a tick.
pub trait Clock: Send + Sync {
    /// Seconds since an arbitrary, fixed origin.
    fn now(&self) -> f64;
}

/// Shared clock handle.
pub type SharedClock = Arc<dyn Clock>;

/// Wall-clock backed by [`Instant`].
#[derive(Debug, Clone, Copy)]
pub struct SystemClock {
    origin: Instant,
}

impl SystemClock {
    /// Start a clock whose origin is the moment of construction.
    pub fn new() -> Self {
        Self {
            origin: Instant::now(),
        }
    }
}

impl Default for SystemClock {
    fn default() -> Self {
        Self::new()
    }
}

impl Clock for SystemClock {
    fn now(&self) -> f64 {
        self.origin.elapsed().as_secs_f64()
    }
}

/// Explicitly driven clock for tests and offline drivers.
#[derive(Debug, Default)]
pub struct ManualClock {
    bits: AtomicU64,
}

impl ManualClock {
    /// Create a clock reading `start` seconds.
    pub fn new(start: f64) -> Self {
        Self {
            bits: AtomicU64::new(start.to_bits()),
        }
    }

    /// Create a shared clock handle plus a typed handle for driving it.
    pub fn shared(start: f64) -> (Arc<Self>, SharedClock) {
        let c = Arc::new(Self::new(start));
        let dynamic: SharedClock = c.clone();
        (c, dynamic)
    }

    /// Set the absolute time. Going backwards is ignored.
    pub fn set(&self, t: f64) {
        if t.is_finite() && t >= self.now() {
            self.bits.store(t.to_bits(), Ordering::SeqCst);
        }
    }

    /// Advance by `dt` seconds.
    pub fn advance(&self, dt: f64) {
        self.set(self.now() + dt.max(0.0));
    }
}

impl Clock for ManualClock {
    fn now(&self) -> f64 {
        f64::from_bits(self.bits.load(Ordering::SeqCst))
    }
}
