/// A gain value that can jump or approach a target exponentially.
///
/// After `set_target_at_time(target, start, tau)` the value follows
/// `target + (v0 - target) * exp(-(t - start) / tau)` where `v0` is the value at `start`.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct GainParam {
    base: f64,
    ramp: Option<Ramp>,
}

#[derive(Clone, Copy, Debug, PartialEq)]
struct Ramp {
    target: f64,
    start: f64,
    time_constant: f64,
}

impl GainParam {
    /// Constant gain.
    pub fn new(value: f64) -> Self {
        Self {
            base: value,
            ramp: None,
        }
    }

    /// Jump to `value` immediately, cancelling any ramp.
    pub fn set_value(&mut self, value: f64) {
        self.base = value;
        self.ramp = None;
    }

    /// Approach `target` starting at `start` with time constant `time_constant` seconds.
    pub fn set_target_at_time(&mut self, target: f64, start: f64, time_constant: f64) {
        self.base = self.value_at(start);
        self.ramp = Some(Ramp {
            target,
            start,
            time_constant,
        });
    }

    /// Gain at time `t`.
    pub fn value_at(&self, t: f64) -> f64 {
        let Some(r) = self.ramp else {
            return self.base;
        };
        if t < r.start {
            return self.base;
        }
        if r.time_constant <= 0.0 || !r.time_constant.is_finite() {
            return r.target;
        }
        r.target + (self.base - r.target) * (-(t - r.start) / r.time_constant).exp()
    }

    /// Final value the parameter settles at.
    pub fn settled_value(&self) -> f64 {
        self.ramp.map_or(self.base, |r| r.target)
    }
}

impl Default for GainParam {
    fn default() -> Self {
        Self::new(1.0)
    }
}
