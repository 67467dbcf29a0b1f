//! Dial-to-speed mapping.
//!
//! The dial reading is shaped by an exponential curve so the slow end of the dial gets
//! most of the travel, then scaled into a tick threshold between the fastest and slowest
//! step times.

/// Fastest step time in ticks (about 0.17 s).
pub const FASTEST_CLOCKS: u16 = 10;

/// Slowest step time in ticks (about 5 s).
pub const SLOWEST_CLOCKS: u16 = 300;

/// Curve constants for `speed = a * e^(b * (1 - p)) + c`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SpeedCalibration {
    pub a: f32,
    pub b: f32,
    pub c: f32,
    pub fastest: u16,
    pub slowest: u16,
}

impl SpeedCalibration {
    /// Constants matched to the stock speed potentiometer.
    pub const DEFAULT: Self = Self {
        a: 0.0207,
        b: 3.9,
        c: -0.0207,
        fastest: FASTEST_CLOCKS,
        slowest: SLOWEST_CLOCKS,
    };

    /// Maps a dial reading to the normalized curve value.
    ///
    /// Out-of-range readings are clamped to `0.0..=1.0` first. Full dial (1.0) gives 0.0,
    /// zero dial gives roughly 1.0.
    pub fn curve(&self, dial: f32) -> f32 {
        let p = if dial.is_nan() { 0.0 } else { dial.clamp(0.0, 1.0) };
        self.a * libm::expf(self.b * (1.0 - p)) + self.c
    }

    /// Maps a dial reading to a tick threshold in `fastest..=slowest`.
    pub fn clocks(&self, dial: f32) -> u16 {
        let slope = (self.slowest - self.fastest) as f32;
        let clocks = slope * self.curve(dial) + self.fastest as f32;
        let clocks = clocks.clamp(self.fastest as f32, self.slowest as f32);

        clocks as u16
    }
}

impl Default for SpeedCalibration {
    fn default() -> Self {
        Self::DEFAULT
    }
}

/// Remembers the last accepted dial reading and reports large moves.
///
/// The dimmer master restarts the current step's timing only when the dial has really
/// moved, not on sampling noise.
#[derive(Debug, Clone, Copy)]
pub struct DialTracker {
    accepted: f32,
    hysteresis: f32,
}

impl DialTracker {
    /// Creates a tracker seeded with the boot-time reading.
    pub fn new(initial: f32, hysteresis: f32) -> Self {
        Self {
            accepted: initial,
            hysteresis,
        }
    }

    /// Feeds a new reading. Returns true and accepts it if it moved by more than the
    /// hysteresis since the last accepted reading.
    pub fn update(&mut self, reading: f32) -> bool {
        if libm::fabsf(self.accepted - reading) > self.hysteresis {
            self.accepted = reading;
            true
        } else {
            false
        }
    }

    /// The last accepted reading.
    pub fn accepted(&self) -> f32 {
        self.accepted
    }
}
