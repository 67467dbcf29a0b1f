//! Main-loop work for each role.
//!
//! Everything here may block on the serial line or the ADC and runs at the lowest
//! priority. It talks to the interrupt handlers only through [`SharedState`].

use crate::hal::{Dial, SerialRead, SerialWrite};
use crate::protocol::{Inbound, MasterEndpoint, SlaveEndpoint};
use crate::shared::SharedState;
use crate::speed::{DialTracker, SpeedCalibration};
use crate::types::{Mode, StepTransition, SyncEvent};

/// Master main loop: publishes step events and keeps the speed parameter up to date.
pub struct MasterRunner<'a, W: SerialWrite, D: Dial> {
    endpoint: MasterEndpoint<W>,
    dial: D,
    calibration: SpeedCalibration,
    tracker: DialTracker,
    mode: Mode,
    shared: &'a SharedState,
}

impl<'a, W: SerialWrite, D: Dial> MasterRunner<'a, W, D> {
    /// Creates the runner and seeds the shared speed from the current dial position.
    pub fn new(
        endpoint: MasterEndpoint<W>,
        mut dial: D,
        calibration: SpeedCalibration,
        hysteresis: f32,
        mode: Mode,
        shared: &'a SharedState,
    ) -> Self {
        let reading = dial.read_dial();
        shared.set_speed(calibration.clocks(reading));

        Self {
            endpoint,
            dial,
            calibration,
            tracker: DialTracker::new(reading, hysteresis),
            mode,
            shared,
        }
    }

    /// One main-loop iteration. Returns the number of step events published.
    ///
    /// Chase: the dial is sampled once per step boundary, so a step already in progress
    /// keeps its length. Dimmer: the dial is sampled every iteration, and a large move
    /// restarts the current step's timing at the next zero cross.
    pub fn poll(&mut self) -> usize {
        if self.mode == Mode::Dimmer {
            let reading = self.dial.read_dial();
            self.shared.set_speed(self.calibration.clocks(reading));
            if self.tracker.update(reading) {
                debug!("master: dial moved, restarting step timing");
                self.shared.request_resync();
            }
        }

        let mut published = 0;
        while let Some(event) = self.shared.take_outbound() {
            let transition = match event {
                SyncEvent::Restart => StepTransition::Restart,
                SyncEvent::Step => StepTransition::Step,
                SyncEvent::SetSpeed(speed) => {
                    self.endpoint.emit(SyncEvent::SetSpeed(speed));
                    continue;
                }
            };

            if self.mode == Mode::Chase {
                let clocks = self.calibration.clocks(self.dial.read_dial());
                self.shared.set_speed(clocks);
            }

            self.endpoint.publish(transition, Some(self.shared.speed()));
            published += 1;
        }
        published
    }

    /// Runs forever.
    pub fn run(mut self) -> ! {
        loop {
            self.poll();
        }
    }

    /// Returns the protocol endpoint.
    pub fn endpoint(&self) -> &MasterEndpoint<W> {
        &self.endpoint
    }
}

/// Slave main loop: applies lines received from the master.
pub struct SlaveRunner<'a, R: SerialRead> {
    endpoint: SlaveEndpoint<R>,
    shared: &'a SharedState,
}

impl<'a, R: SerialRead> SlaveRunner<'a, R> {
    /// Creates the runner.
    pub fn new(endpoint: SlaveEndpoint<R>, shared: &'a SharedState) -> Self {
        Self { endpoint, shared }
    }

    /// Blocks for one line and applies it.
    pub fn poll(&mut self) -> Inbound {
        self.endpoint.poll(self.shared)
    }

    /// Runs forever.
    pub fn run(mut self) -> ! {
        loop {
            self.poll();
        }
    }
}
