//! Core types shared by the scheduler, the sequence store and the sync protocol.

use crate::CHANNEL_COUNT;

/// Which output engine drives the channels. Chosen once at boot.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Mode {
    /// On/off patterns stepped at the dial-selected speed.
    Chase,

    /// Phase-cut brightness ramps from a `DimSequence`.
    Dimmer,
}

/// Whether this unit times steps itself or follows a master over the sync line.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Role {
    /// Counts zero crossings and publishes step events.
    Master,

    /// Replays step events received from the master.
    Slave,
}

/// How the scheduler classified a step boundary.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum StepTransition {
    /// Wrapped back to step 0.
    Restart,

    /// Advanced to the next step.
    Step,
}

/// A state transition as carried on the sync line.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum SyncEvent {
    /// Go back to step 0.
    Restart,

    /// Advance one step.
    Step,

    /// New speed parameter (chase clocks per step, or dimmer tick multiplier).
    SetSpeed(u16),
}

impl From<StepTransition> for SyncEvent {
    fn from(transition: StepTransition) -> Self {
        match transition {
            StepTransition::Restart => SyncEvent::Restart,
            StepTransition::Step => SyncEvent::Step,
        }
    }
}

/// Start and stop brightness of one channel across a dim step.
///
/// 0 is off, 255 is full on.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct ChannelRamp {
    pub start: u8,
    pub stop: u8,
}

impl ChannelRamp {
    /// Creates a ramp from `start` to `stop`.
    #[inline]
    pub const fn new(start: u8, stop: u8) -> Self {
        Self { start, stop }
    }

    /// A ramp that holds one brightness for the whole step.
    #[inline]
    pub const fn hold(level: u8) -> Self {
        Self {
            start: level,
            stop: level,
        }
    }

    /// Brightness after `elapsed` of `total` ticks.
    ///
    /// `start + (stop - start) * elapsed / total` in signed integer math, truncating toward
    /// zero. `elapsed` is clamped to `total`, so the result never overshoots `stop`. A zero
    /// `total` yields `start`.
    pub fn brightness_at(&self, elapsed: u32, total: u32) -> u8 {
        if total == 0 {
            return self.start;
        }

        let elapsed = elapsed.min(total) as i64;
        let start = self.start as i64;
        let delta = self.stop as i64 - start;

        (start + delta * elapsed / total as i64) as u8
    }
}

/// One step of a dimmer sequence.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct DimStep {
    /// Step length in ticks (zero crossings), before speed scaling. Never zero.
    pub duration_ticks: u8,

    /// Per-channel brightness ramps.
    pub channels: [ChannelRamp; CHANNEL_COUNT],
}

impl DimStep {
    /// Creates a dim step.
    #[inline]
    pub const fn new(duration_ticks: u8, channels: [ChannelRamp; CHANNEL_COUNT]) -> Self {
        Self {
            duration_ticks,
            channels,
        }
    }

    /// A step where every channel ramps from `start` to `stop`.
    #[inline]
    pub const fn uniform(duration_ticks: u8, start: u8, stop: u8) -> Self {
        Self {
            duration_ticks,
            channels: [ChannelRamp::new(start, stop); CHANNEL_COUNT],
        }
    }
}

/// Errors raised while selecting or loading sequences.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Error {
    /// No backing sequence source is reachable.
    ConfigurationAbsent,

    /// A sequence header asked for more steps than the table can hold.
    AllocationFailure { requested: u16, capacity: usize },

    /// The selector names no known sequence.
    UnknownSequenceId(u8),

    /// A sequence with no steps.
    EmptySequence,

    /// The source ended before all announced steps arrived.
    TruncatedSequence { expected: u16, received: u16 },

    /// A dim step with a zero duration.
    ZeroDuration,

    /// Sequence capacity exceeded while building.
    CapacityExceeded,
}

impl Error {
    /// Whether the only safe recovery is a full restart.
    ///
    /// `AllocationFailure` is only fatal when no previous sequence survives the failed load,
    /// which the caller decides.
    pub fn is_fatal(&self) -> bool {
        matches!(
            self,
            Error::ConfigurationAbsent
                | Error::EmptySequence
                | Error::TruncatedSequence { .. }
                | Error::UnknownSequenceId(_)
        )
    }
}

impl core::fmt::Display for Error {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        match self {
            Error::ConfigurationAbsent => {
                write!(f, "no sequence source available")
            }
            Error::AllocationFailure {
                requested,
                capacity,
            } => {
                write!(
                    f,
                    "sequence of {} steps does not fit table capacity of {}",
                    requested, capacity
                )
            }
            Error::UnknownSequenceId(id) => {
                write!(f, "unknown sequence id {}", id)
            }
            Error::EmptySequence => {
                write!(f, "sequence must have at least one step")
            }
            Error::TruncatedSequence { expected, received } => {
                write!(
                    f,
                    "sequence ended after {} of {} steps",
                    received, expected
                )
            }
            Error::ZeroDuration => {
                write!(f, "dim step duration must be at least one tick")
            }
            Error::CapacityExceeded => {
                write!(f, "sequence capacity exceeded")
            }
        }
    }
}

#[cfg(feature = "std")]
impl std::error::Error for Error {}

/// A text line that failed to parse. Always handled where it is detected.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct MalformedLine;

impl core::fmt::Display for MalformedLine {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        write!(f, "malformed line")
    }
}

#[cfg(feature = "std")]
impl std::error::Error for MalformedLine {}
