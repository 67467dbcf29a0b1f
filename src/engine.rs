//! Phase-cut dimming engine.
//!
//! Runs from the slice timer between zero crossings. Each channel gets a countdown of
//! `255 - brightness` slices; when it reaches zero the channel's triac gate is fired and
//! left alone until the next arming. Once the slice budget is used up the engine idles all
//! outputs, disarms itself and tells the caller to re-arm zero-cross detection.

use core::ops::Range;

use crate::CHANNEL_COUNT;
use crate::hal::ChannelOutputs;

/// Hard ceiling on slices per arming.
pub const MAX_SLICES: u8 = 250;

/// Default slice budget, leaving a margin before the next expected crossing.
pub const DEFAULT_SLICE_BUDGET: u8 = 240;

/// Nominal slice period in microseconds.
pub const SLICE_PERIOD_US: u32 = 65;

/// Slice timing policy.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EngineConfig {
    /// Slices per arming before the engine gives control back to zero-cross detection.
    /// Values above [`MAX_SLICES`] are capped.
    pub slice_budget: u8,

    /// Slice indices around the opposite zero crossing during which countdown is
    /// suspended. At the end of the window the armed delays are restored so the second
    /// half-cycle is cut the same way as the first.
    pub keepout: Option<Range<u8>>,
}

impl EngineConfig {
    pub const DEFAULT: Self = Self {
        slice_budget: DEFAULT_SLICE_BUDGET,
        keepout: None,
    };

    /// Returns the config with a keep-out window.
    pub fn with_keepout(mut self, window: Range<u8>) -> Self {
        self.keepout = Some(window);
        self
    }

    /// Returns the config with a different slice budget.
    pub fn with_slice_budget(mut self, budget: u8) -> Self {
        self.slice_budget = budget;
        self
    }

    fn budget(&self) -> u8 {
        self.slice_budget.min(MAX_SLICES)
    }
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self::DEFAULT
    }
}

/// What the slice handler should do after a slice.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum SliceOutcome {
    /// Keep the slice timer running.
    Continue,

    /// Budget used up. Stop the slice timer and re-arm zero-cross detection.
    Exhausted,

    /// The engine is not armed; the slice timer should not be running.
    Idle,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Arming {
    Disarmed,
    /// Counts slices only, outputs untouched.
    Guard,
    /// Counts slices and cuts channels.
    Dimming,
}

/// The slice-driven countdown state for one half-cycle.
#[derive(Debug, Clone)]
pub struct DimmingEngine {
    config: EngineConfig,
    arming: Arming,
    slice: u8,
    remaining: [u8; CHANNEL_COUNT],
    snapshot: [u8; CHANNEL_COUNT],
    fired: u8,
}

impl DimmingEngine {
    /// Creates a disarmed engine.
    pub fn new(config: EngineConfig) -> Self {
        Self {
            config,
            arming: Arming::Disarmed,
            slice: 0,
            remaining: [0; CHANNEL_COUNT],
            snapshot: [0; CHANNEL_COUNT],
            fired: 0,
        }
    }

    /// Arms the engine with per-channel delays for the coming half-cycle.
    ///
    /// Called from the zero-cross handler; the caller starts the slice timer afterwards.
    pub fn arm(&mut self, delays: [u8; CHANNEL_COUNT]) {
        self.remaining = delays;
        self.snapshot = delays;
        self.fired = 0;
        self.slice = 0;
        self.arming = Arming::Dimming;
    }

    /// Arms the engine to blank the rest of the half-cycle without touching any output.
    ///
    /// Used in chase mode so a spurious second edge can't count as a tick.
    pub fn arm_guard(&mut self) {
        self.fired = 0;
        self.slice = 0;
        self.arming = Arming::Guard;
    }

    /// Runs one slice.
    pub fn on_slice<O: ChannelOutputs>(&mut self, outputs: &mut O) -> SliceOutcome {
        match self.arming {
            Arming::Disarmed => return SliceOutcome::Idle,
            Arming::Guard => {
                if self.slice > self.config.budget() {
                    self.disarm();
                    return SliceOutcome::Exhausted;
                }
                self.slice += 1;
                return SliceOutcome::Continue;
            }
            Arming::Dimming => {}
        }

        if self.slice > self.config.budget() {
            outputs.set_all(0);
            self.disarm();
            trace!("dimming: slice budget used up");
            return SliceOutcome::Exhausted;
        }

        let slice = self.slice;
        self.slice += 1;

        if let Some(window) = &self.config.keepout {
            if window.contains(&slice) {
                return SliceOutcome::Continue;
            }
            if slice == window.end {
                self.restore_snapshot(outputs);
            }
        }

        for channel in 0..CHANNEL_COUNT {
            let mask = 1u8 << channel;
            if self.remaining[channel] != 0 {
                self.remaining[channel] -= 1;
            } else if self.fired & mask == 0 {
                self.fired |= mask;
                outputs.set_channel_output(channel, true);
            }
        }

        SliceOutcome::Continue
    }

    fn restore_snapshot<O: ChannelOutputs>(&mut self, outputs: &mut O) {
        self.remaining = self.snapshot;
        self.fired = 0;
        outputs.set_all(0);
    }

    fn disarm(&mut self) {
        self.slice = 0;
        self.arming = Arming::Disarmed;
    }

    /// Whether a half-cycle is in progress.
    pub fn is_armed(&self) -> bool {
        self.arming != Arming::Disarmed
    }

    /// Remaining countdown per channel.
    pub fn remaining(&self) -> [u8; CHANNEL_COUNT] {
        self.remaining
    }

    /// Bit mask of channels whose gate has fired since the last arming.
    pub fn fired(&self) -> u8 {
        self.fired
    }

    /// Slices elapsed since the last arming.
    pub fn slice(&self) -> u8 {
        self.slice
    }

    /// Returns the engine configuration.
    pub fn config(&self) -> &EngineConfig {
        &self.config
    }
}
