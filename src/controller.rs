//! Interrupt-side glue between the scheduler, the dimming engine and the hardware.
//!
//! Provides [`Controller`], which owns the channel outputs, the zero-cross detector and the
//! slice timer, and is driven from the two interrupt handlers. A board typically keeps it
//! in a `critical_section::Mutex<RefCell<Option<Controller<..>>>>` static and calls
//! [`Controller::on_zero_cross`] and [`Controller::on_slice`] from the handlers:
//!
//! ```ignore
//! static SHARED: SharedState = SharedState::new(FASTEST_CLOCKS);
//! static CONTROLLER: Mutex<RefCell<Option<Controller<'static, Bus, Zcd, Ticker, 64>>>> =
//!     Mutex::new(RefCell::new(None));
//!
//! #[interrupt]
//! fn EINT0() {
//!     critical_section::with(|cs| {
//!         if let Some(controller) = CONTROLLER.borrow_ref_mut(cs).as_mut() {
//!             controller.on_zero_cross(&SHARED);
//!         }
//!     });
//! }
//! ```

use crate::engine::{DimmingEngine, EngineConfig, SliceOutcome};
use crate::hal::{ChannelOutputs, SliceTimer, ZeroCrossDetector};
use crate::scheduler::{RunState, ZeroCrossAction, ZeroCrossOutcome, ZeroCrossScheduler};
use crate::shared::SharedState;

/// Lifecycle of a controller.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum ControllerState {
    /// Outputs idle, zero-cross detection not armed yet.
    Idle,
    /// Waiting for the next zero crossing.
    AwaitingZeroCross,
    /// Slice timer running for the current half-cycle.
    InHalfCycle,
}

/// Drives the eight channels from zero-cross and slice interrupts.
///
/// # Type Parameters
/// * `'s` - Lifetime of the borrowed dimmer sequence
/// * `O` - Channel output implementation
/// * `Z` - Zero-cross detector implementation
/// * `T` - Slice timer implementation
/// * `N` - Maximum number of dimmer steps
pub struct Controller<'s, O, Z, T, const N: usize>
where
    O: ChannelOutputs,
    Z: ZeroCrossDetector,
    T: SliceTimer,
{
    scheduler: ZeroCrossScheduler<'s, N>,
    engine: DimmingEngine,
    outputs: O,
    zero_cross: Z,
    slice_timer: T,
    state: ControllerState,
    pattern: Option<u8>,
}

impl<'s, O, Z, T, const N: usize> Controller<'s, O, Z, T, N>
where
    O: ChannelOutputs,
    Z: ZeroCrossDetector,
    T: SliceTimer,
{
    /// Creates an idle controller with all channels off.
    pub fn new(
        scheduler: ZeroCrossScheduler<'s, N>,
        engine: EngineConfig,
        mut outputs: O,
        mut zero_cross: Z,
        mut slice_timer: T,
    ) -> Self {
        outputs.set_all(0);
        zero_cross.disarm();
        slice_timer.stop();

        Self {
            scheduler,
            engine: DimmingEngine::new(engine),
            outputs,
            zero_cross,
            slice_timer,
            state: ControllerState::Idle,
            pattern: None,
        }
    }

    /// Shows step 0 and arms zero-cross detection.
    pub fn start(&mut self) {
        if let ZeroCrossAction::Chase { pattern } = self.scheduler.current_action() {
            self.show_pattern(pattern);
        }
        self.state = ControllerState::AwaitingZeroCross;
        self.zero_cross.arm();
        info!("controller: started ({})", self.scheduler.run_state().mode);
    }

    /// Zero-cross interrupt handler body.
    ///
    /// Disarms edge detection until the slice handler has finished the half-cycle, so a
    /// spurious second edge can't count as a tick.
    pub fn on_zero_cross(&mut self, shared: &SharedState) -> ZeroCrossOutcome {
        self.zero_cross.disarm();

        let outcome = self.scheduler.on_zero_cross(shared);
        match outcome.action {
            ZeroCrossAction::Chase { pattern } => {
                self.show_pattern(pattern);
                self.engine.arm_guard();
            }
            ZeroCrossAction::Dim { delays } => {
                self.engine.arm(delays);
            }
        }

        self.state = ControllerState::InHalfCycle;
        self.slice_timer.start();
        outcome
    }

    /// Slice interrupt handler body.
    pub fn on_slice(&mut self) -> SliceOutcome {
        let outcome = self.engine.on_slice(&mut self.outputs);
        match outcome {
            SliceOutcome::Continue => {}
            SliceOutcome::Exhausted => {
                self.slice_timer.stop();
                self.state = ControllerState::AwaitingZeroCross;
                self.zero_cross.arm();
            }
            SliceOutcome::Idle => {
                self.slice_timer.stop();
            }
        }
        outcome
    }

    fn show_pattern(&mut self, pattern: u8) {
        if self.pattern != Some(pattern) {
            self.outputs.set_all(pattern);
            self.pattern = Some(pattern);
        }
    }

    /// Returns the controller state.
    pub fn state(&self) -> ControllerState {
        self.state
    }

    /// Returns the live run state.
    pub fn run_state(&self) -> &RunState {
        self.scheduler.run_state()
    }

    /// Returns the scheduler.
    pub fn scheduler(&self) -> &ZeroCrossScheduler<'s, N> {
        &self.scheduler
    }

    /// Returns the dimming engine.
    pub fn engine(&self) -> &DimmingEngine {
        &self.engine
    }

    /// Returns the channel outputs.
    pub fn outputs(&self) -> &O {
        &self.outputs
    }

    /// Returns the zero-cross detector.
    pub fn zero_cross(&self) -> &Z {
        &self.zero_cross
    }

    /// Returns the slice timer.
    pub fn slice_timer(&self) -> &T {
        &self.slice_timer
    }
}
