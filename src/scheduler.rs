//! Zero-cross scheduler: the tick/step state machine.
//!
//! Every accepted zero crossing is one tick. A master counts ticks against the step
//! threshold and publishes each step boundary as a [`SyncEvent`]; a slave never counts
//! thresholds and only moves when the master tells it to, so units sharing an AC line
//! can't drift apart.

use crate::CHANNEL_COUNT;
use crate::sequence::{ChaseSequence, DimSequence};
use crate::shared::SharedState;
use crate::types::{DimStep, Mode, Role, StepTransition, SyncEvent};

/// How dimmer brightness is evaluated within a step.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Interpolation {
    /// Recompute every zero cross from the elapsed ticks: a smooth ramp.
    #[default]
    Linear,

    /// Use the step's start values for the whole step.
    SteppedSnapshot,
}

/// What the scheduler runs.
#[derive(Debug, Clone, Copy)]
pub enum Program<'s, const N: usize> {
    Chase(ChaseSequence),
    Dimmer(&'s DimSequence<N>),
}

impl<const N: usize> Program<'_, N> {
    /// The engine this program needs.
    pub fn mode(&self) -> Mode {
        match self {
            Program::Chase(_) => Mode::Chase,
            Program::Dimmer(_) => Mode::Dimmer,
        }
    }

    /// Number of steps.
    pub fn len(&self) -> usize {
        match self {
            Program::Chase(seq) => seq.len(),
            Program::Dimmer(seq) => seq.len(),
        }
    }

    /// Always false; both sequence kinds reject empty step lists.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// The live control state.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct RunState {
    pub mode: Mode,
    pub role: Role,
    /// Index into the active sequence, always below its length.
    pub current_step: usize,
    /// Ticks elapsed within the current step.
    pub tick_count: u32,
    /// Chase: ticks per step. Dimmer: multiplier applied to each step's duration.
    pub speed_param: u16,
    /// Cut-off delay per channel for the current half-cycle, `255 - brightness`.
    pub per_channel_delay: [u8; CHANNEL_COUNT],
}

/// Output work for the zero-cross handler.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum ZeroCrossAction {
    /// Drive this on/off pattern.
    Chase { pattern: u8 },

    /// Arm the dimming engine with these delays.
    Dim { delays: [u8; CHANNEL_COUNT] },
}

/// Result of one zero crossing.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct ZeroCrossOutcome {
    pub action: ZeroCrossAction,
    /// The step boundary crossed on this tick, if any.
    pub transition: Option<StepTransition>,
}

/// Steps through a chase or dimmer sequence, one tick per zero crossing.
///
/// # Type Parameters
/// * `'s` - Lifetime of the borrowed dimmer sequence
/// * `N` - Maximum number of dimmer steps
pub struct ZeroCrossScheduler<'s, const N: usize> {
    state: RunState,
    program: Program<'s, N>,
    interpolation: Interpolation,
    step_ticks: u32,
}

impl<'s, const N: usize> ZeroCrossScheduler<'s, N> {
    /// Creates a scheduler at step 0.
    ///
    /// `speed` is the initial speed parameter; a zero speed is treated as 1.
    pub fn new(role: Role, program: Program<'s, N>, speed: u16, interpolation: Interpolation) -> Self {
        let speed = speed.max(1);
        let mut scheduler = Self {
            state: RunState {
                mode: program.mode(),
                role,
                current_step: 0,
                tick_count: 0,
                speed_param: speed,
                per_channel_delay: [u8::MAX; CHANNEL_COUNT],
            },
            program,
            interpolation,
            step_ticks: 0,
        };
        scheduler.begin_step(speed);
        scheduler.refresh_delays();
        scheduler
    }

    /// Handles one zero crossing.
    ///
    /// Called from the zero-cross handler; does not block.
    pub fn on_zero_cross(&mut self, shared: &SharedState) -> ZeroCrossOutcome {
        let transition = match (self.state.role, self.state.mode) {
            (Role::Master, Mode::Chase) => self.master_chase_tick(shared),
            (Role::Master, Mode::Dimmer) => self.master_dimmer_tick(shared),
            (Role::Slave, _) => self.slave_tick(shared),
        };

        if let Some(transition) = transition {
            trace!("step {} ({})", self.state.current_step, transition);
        }

        ZeroCrossOutcome {
            action: self.action(),
            transition,
        }
    }

    fn master_chase_tick(&mut self, shared: &SharedState) -> Option<StepTransition> {
        self.state.speed_param = shared.speed().max(1);
        self.state.tick_count += 1;

        if self.state.tick_count < self.state.speed_param as u32 {
            return None;
        }

        self.state.tick_count = 0;
        let transition = self.advance();
        shared.post_outbound(transition.into());
        Some(transition)
    }

    fn master_dimmer_tick(&mut self, shared: &SharedState) -> Option<StepTransition> {
        if shared.take_resync() {
            self.begin_step(shared.speed());
        }

        self.state.tick_count += 1;

        let transition = if self.state.tick_count >= self.step_ticks {
            let transition = self.advance();
            self.begin_step(shared.speed());
            shared.post_outbound(transition.into());
            Some(transition)
        } else {
            None
        };

        self.refresh_delays();
        transition
    }

    fn slave_tick(&mut self, shared: &SharedState) -> Option<StepTransition> {
        let mut transition = None;
        while let Some(event) = shared.take_inbound() {
            if let Some(applied) = self.apply(event) {
                transition = Some(applied);
            }
        }

        if self.state.mode == Mode::Dimmer {
            if transition.is_some() {
                self.begin_step(shared.speed());
            } else if self.state.tick_count < self.step_ticks {
                self.state.tick_count += 1;
            }
            self.refresh_delays();
        }

        transition
    }

    /// Applies a received sync event. Returns the transition it caused, if any.
    pub fn apply(&mut self, event: SyncEvent) -> Option<StepTransition> {
        match event {
            SyncEvent::Restart => {
                self.state.current_step = 0;
                Some(StepTransition::Restart)
            }
            SyncEvent::Step => {
                let next = self.state.current_step + 1;
                if next >= self.program.len() {
                    self.state.current_step = 0;
                    Some(StepTransition::Restart)
                } else {
                    self.state.current_step = next;
                    Some(StepTransition::Step)
                }
            }
            SyncEvent::SetSpeed(speed) => {
                self.state.speed_param = speed.max(1);
                None
            }
        }
    }

    fn advance(&mut self) -> StepTransition {
        let next = self.state.current_step + 1;
        if next >= self.program.len() {
            self.state.current_step = 0;
            StepTransition::Restart
        } else {
            self.state.current_step = next;
            StepTransition::Step
        }
    }

    /// Resets the tick count and recomputes the current step's length.
    fn begin_step(&mut self, speed: u16) {
        self.state.tick_count = 0;
        if let Program::Dimmer(seq) = self.program {
            self.state.speed_param = speed.max(1);
            let step = seq.step_or_first(self.state.current_step);
            self.step_ticks = step.duration_ticks as u32 * self.state.speed_param as u32;
        }
    }

    fn refresh_delays(&mut self) {
        if let Program::Dimmer(seq) = self.program {
            let step = seq.step_or_first(self.state.current_step);
            self.state.per_channel_delay =
                step_delays(step, self.state.tick_count, self.step_ticks, self.interpolation);
        }
    }

    fn action(&self) -> ZeroCrossAction {
        match self.program {
            Program::Chase(seq) => ZeroCrossAction::Chase {
                pattern: seq.pattern(self.state.current_step),
            },
            Program::Dimmer(_) => ZeroCrossAction::Dim {
                delays: self.state.per_channel_delay,
            },
        }
    }

    /// Returns the live run state.
    pub fn run_state(&self) -> &RunState {
        &self.state
    }

    /// Total ticks of the current dimmer step after speed scaling. Zero in chase mode.
    pub fn step_ticks(&self) -> u32 {
        self.step_ticks
    }

    /// The output for the current step, without advancing.
    pub fn current_action(&self) -> ZeroCrossAction {
        self.action()
    }

    /// Returns the running program.
    pub fn program(&self) -> &Program<'s, N> {
        &self.program
    }
}

/// Cut-off delays for every channel of `step` after `elapsed` of `total` ticks.
pub fn step_delays(
    step: &DimStep,
    elapsed: u32,
    total: u32,
    interpolation: Interpolation,
) -> [u8; CHANNEL_COUNT] {
    let mut delays = [0u8; CHANNEL_COUNT];
    for (delay, ramp) in delays.iter_mut().zip(step.channels.iter()) {
        let brightness = match interpolation {
            Interpolation::Linear => ramp.brightness_at(elapsed, total),
            Interpolation::SteppedSnapshot => ramp.start,
        };
        *delay = u8::MAX - brightness;
    }
    delays
}
