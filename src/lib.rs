#![cfg_attr(not(feature = "std"), no_std)]
#![doc = include_str!("../README.md")]

//! # Core Concepts
//!
//! - **`ZeroCrossScheduler`**: The tick/step state machine, one tick per AC zero crossing
//! - **`DimmingEngine`**: Slice-driven phase-cut countdown within one half-cycle
//! - **`Controller`**: Glue between the two interrupt handlers and the hardware
//! - **`SequenceStore`**: Compiled-in chase patterns and the loaded dimmer sequence
//! - **`SpeedCalibration`**: Maps the speed dial onto a tick threshold
//! - **`MasterEndpoint`** / **`SlaveEndpoint`**: The `R`/`Z`/`C` sync line between units
//! - **`SharedState`**: Everything the handlers and the main loop exchange
//!
//! The master counts zero crossings and publishes every step boundary. Slaves sit on the
//! same AC line and replay those events instead of timing steps themselves, so their
//! outputs stay phase-aligned with the master's.
//!
//! Implement the traits in [`hal`] for your board; the core never touches registers.

#[macro_use]
mod fmt;

pub mod boot;
pub mod config;
pub mod controller;
pub mod engine;
pub mod hal;
pub mod patterns;
pub mod protocol;
pub mod record;
pub mod runner;
pub mod scheduler;
pub mod sequence;
pub mod shared;
pub mod speed;
pub mod store;
pub mod types;

pub use boot::{master_program, run_or_reset, slave_program};
pub use config::{BootSwitches, Config, DIM_MODE_THRESHOLD, EXTERNAL_DIM_THRESHOLD, Selection};
pub use controller::{Controller, ControllerState};
pub use engine::{DimmingEngine, EngineConfig, SliceOutcome};
pub use hal::{
    ChannelOutputs, Dial, LineSink, LineSource, SerialRead, SerialWrite, SliceTimer,
    SystemReset, ZeroCrossDetector,
};
pub use protocol::{Inbound, MasterEndpoint, SlaveEndpoint};
pub use record::{Record, RecordAssembler, RecordLoader};
pub use runner::{MasterRunner, SlaveRunner};
pub use scheduler::{Interpolation, Program, RunState, ZeroCrossAction, ZeroCrossScheduler};
pub use sequence::{ChaseSequence, DimSequence, DimSequenceBuilder};
pub use shared::SharedState;
pub use speed::{DialTracker, FASTEST_CLOCKS, SLOWEST_CLOCKS, SpeedCalibration};
pub use store::{DimLoader, SequenceStore};
pub use types::{ChannelRamp, DimStep, Error, MalformedLine, Mode, Role, StepTransition, SyncEvent};

/// Number of switched channels.
pub const CHANNEL_COUNT: usize = 8;
