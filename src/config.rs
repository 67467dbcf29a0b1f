//! Boot-time selection and build-time configuration.

use crate::engine::EngineConfig;
use crate::scheduler::Interpolation;
use crate::speed::SpeedCalibration;
use crate::types::{Mode, Role};

/// Selector values at or above this run dimmer mode; below are chase pattern ids.
pub const DIM_MODE_THRESHOLD: u8 = 240;

/// Dimmer ids at or above this come from the external loader instead of the compiled-in
/// tables.
pub const EXTERNAL_DIM_THRESHOLD: u8 = 248;

/// Dial movement that restarts a dimmer step's timing.
pub const DEFAULT_DIAL_HYSTERESIS: f32 = 0.1;

/// The switch bank, sampled once at boot.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct BootSwitches {
    /// Mode-select ordinal.
    pub selector: u8,

    /// Master/slave role bit.
    pub master: bool,

    /// Whether local sequence storage is present.
    pub storage_present: bool,
}

/// What the unit runs, decoded from [`BootSwitches`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct Selection {
    pub mode: Mode,
    pub role: Role,
    /// Chase pattern id or dimmer sequence id.
    pub sequence_id: u8,
    pub storage_present: bool,
}

impl BootSwitches {
    /// Decodes the switches.
    pub fn selection(&self) -> Selection {
        let mode = if self.selector < DIM_MODE_THRESHOLD {
            Mode::Chase
        } else {
            Mode::Dimmer
        };
        let role = if self.master { Role::Master } else { Role::Slave };

        Selection {
            mode,
            role,
            sequence_id: self.selector,
            storage_present: self.storage_present,
        }
    }
}

/// Build-time tuning for a board.
///
/// Start from [`Config::DEFAULT`] and override what differs:
///
/// ```
/// use ac_chaser::{Config, EngineConfig, Interpolation};
///
/// let config = Config::DEFAULT
///     .engine(EngineConfig::DEFAULT.with_keepout(118..124))
///     .interpolation(Interpolation::SteppedSnapshot);
/// assert!(config.engine.keepout.is_some());
/// ```
#[derive(Debug, Clone, PartialEq)]
pub struct Config {
    pub speed: SpeedCalibration,
    pub engine: EngineConfig,
    pub interpolation: Interpolation,
    pub dial_hysteresis: f32,
    /// Dimmer speed multiplier used before the first dial reading.
    pub initial_dimmer_speed: u16,
}

impl Config {
    pub const DEFAULT: Self = Self {
        speed: SpeedCalibration::DEFAULT,
        engine: EngineConfig::DEFAULT,
        interpolation: Interpolation::Linear,
        dial_hysteresis: DEFAULT_DIAL_HYSTERESIS,
        initial_dimmer_speed: 1,
    };

    /// Sets the speed curve.
    pub fn speed(mut self, speed: SpeedCalibration) -> Self {
        self.speed = speed;
        self
    }

    /// Sets the slice policy.
    pub fn engine(mut self, engine: EngineConfig) -> Self {
        self.engine = engine;
        self
    }

    /// Sets the dimmer interpolation policy.
    pub fn interpolation(mut self, interpolation: Interpolation) -> Self {
        self.interpolation = interpolation;
        self
    }

    /// Sets the dial hysteresis.
    pub fn dial_hysteresis(mut self, hysteresis: f32) -> Self {
        self.dial_hysteresis = hysteresis;
        self
    }

    /// Sets the dimmer speed used before the first dial reading.
    pub fn initial_dimmer_speed(mut self, speed: u16) -> Self {
        self.initial_dimmer_speed = speed;
        self
    }
}

impl Default for Config {
    fn default() -> Self {
        Self::DEFAULT
    }
}
