//! Single smoothed channels.

/// Default roll deadband in degrees below which heading does not drift.
pub const DEFAULT_TURN_DEADBAND_DEG: f64 = 2.0;

/// Default heading change per tick per degree of roll.
pub const DEFAULT_TURN_GAIN: f64 = 0.05;

/// One exponentially smoothed value.
#[derive(Debug, Clone, PartialEq)]
pub struct SmoothedChannel {
    value: f64,
    target: f64,
    alpha: f64,
}

impl SmoothedChannel {
    /// Create a channel resting at `initial`.
    pub fn new(initial: f64, alpha: f64) -> Self {
        Self {
            value: initial,
            target: initial,
            alpha,
        }
    }

    /// Step once towards `target`, or towards the previous target when
    /// `None`.
    pub fn step(&mut self, target: Option<f64>) -> f64 {
        if let Some(target) = target {
            self.target = target;
        }
        self.value += (self.target - self.value) * self.alpha;
        self.value
    }

    pub fn value(&self) -> f64 {
        self.value
    }

    pub fn target(&self) -> f64 {
        self.target
    }

    /// Put both value and target at `value`.
    pub fn reset(&mut self, value: f64) {
        self.value = value;
        self.target = value;
    }
}

/// Derives heading from bank angle when no heading is reported.
///
/// A banked aircraft turns: every tick with `|roll| > deadband_deg` moves the
/// heading by `roll * gain` degrees. The result always wraps into `[0, 360)`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct HeadingIntegrator {
    pub deadband_deg: f64,
    pub gain: f64,
}

impl Default for HeadingIntegrator {
    fn default() -> Self {
        Self {
            deadband_deg: DEFAULT_TURN_DEADBAND_DEG,
            gain: DEFAULT_TURN_GAIN,
        }
    }
}

impl HeadingIntegrator {
    /// Next heading given the current heading and roll.
    pub fn integrate(&self, heading: f64, roll: f64) -> f64 {
        let next = if roll.abs() > self.deadband_deg {
            heading + roll * self.gain
        } else {
            heading
        };
        wrap_degrees(next)
    }
}

/// Wrap an angle into `[0, 360)`.
pub fn wrap_degrees(angle: f64) -> f64 {
    let wrapped = angle.rem_euclid(360.0);
    // rem_euclid rounds tiny negative inputs up to exactly 360.
    if wrapped >= 360.0 {
        0.0
    } else {
        wrapped
    }
}
