//! Compiled-in chase patterns and dimmer tables.
//!
//! Chase ids index [`CHASE_PATTERNS`]. Dimmer ids from [`DIM_MODE_THRESHOLD`] up to
//! [`EXTERNAL_DIM_THRESHOLD`] index [`BUILTIN_DIM_TABLES`]; anything above comes from storage.
//!
//! [`DIM_MODE_THRESHOLD`]: crate::config::DIM_MODE_THRESHOLD
//! [`EXTERNAL_DIM_THRESHOLD`]: crate::config::EXTERNAL_DIM_THRESHOLD

use crate::types::{ChannelRamp, DimStep};

const ALTERNATE: [u8; 2] = [0b1010_1010, 0b0101_0101];

const RUN_UP: [u8; 8] = [
    0b0000_0001,
    0b0000_0010,
    0b0000_0100,
    0b0000_1000,
    0b0001_0000,
    0b0010_0000,
    0b0100_0000,
    0b1000_0000,
];

const PING_PONG: [u8; 14] = [
    0b0000_0001,
    0b0000_0010,
    0b0000_0100,
    0b0000_1000,
    0b0001_0000,
    0b0010_0000,
    0b0100_0000,
    0b1000_0000,
    0b0100_0000,
    0b0010_0000,
    0b0001_0000,
    0b0000_1000,
    0b0000_0100,
    0b0000_0010,
];

const FILL: [u8; 16] = [
    0b0000_0001,
    0b0000_0011,
    0b0000_0111,
    0b0000_1111,
    0b0001_1111,
    0b0011_1111,
    0b0111_1111,
    0b1111_1111,
    0b1111_1110,
    0b1111_1100,
    0b1111_1000,
    0b1111_0000,
    0b1110_0000,
    0b1100_0000,
    0b1000_0000,
    0b0000_0000,
];

// Dark spot travelling over lit channels
const HOLE: [u8; 8] = [
    0b1111_1110,
    0b1111_1101,
    0b1111_1011,
    0b1111_0111,
    0b1110_1111,
    0b1101_1111,
    0b1011_1111,
    0b0111_1111,
];

const CENTER_OUT: [u8; 5] = [
    0b0001_1000,
    0b0011_1100,
    0b0111_1110,
    0b1111_1111,
    0b0000_0000,
];

const PAIRS: [u8; 4] = [0b0000_0011, 0b0000_1100, 0b0011_0000, 0b1100_0000];

const FLASH: [u8; 2] = [0b1111_1111, 0b0000_0000];

/// Chase patterns selectable by id.
pub static CHASE_PATTERNS: [&[u8]; 8] = [
    &ALTERNATE,
    &RUN_UP,
    &PING_PONG,
    &FILL,
    &HOLE,
    &CENTER_OUT,
    &PAIRS,
    &FLASH,
];

const FADE_ALL: [DimStep; 2] = [DimStep::uniform(60, 0, 255), DimStep::uniform(60, 255, 0)];

const CROSSFADE: [DimStep; 2] = [
    DimStep::new(
        90,
        [
            ChannelRamp::new(0, 255),
            ChannelRamp::new(255, 0),
            ChannelRamp::new(0, 255),
            ChannelRamp::new(255, 0),
            ChannelRamp::new(0, 255),
            ChannelRamp::new(255, 0),
            ChannelRamp::new(0, 255),
            ChannelRamp::new(255, 0),
        ],
    ),
    DimStep::new(
        90,
        [
            ChannelRamp::new(255, 0),
            ChannelRamp::new(0, 255),
            ChannelRamp::new(255, 0),
            ChannelRamp::new(0, 255),
            ChannelRamp::new(255, 0),
            ChannelRamp::new(0, 255),
            ChannelRamp::new(255, 0),
            ChannelRamp::new(0, 255),
        ],
    ),
];

const GLOW: [DimStep; 3] = [
    DimStep::uniform(120, 64, 192),
    DimStep::uniform(30, 192, 192),
    DimStep::uniform(120, 192, 64),
];

/// Dimmer tables selectable by `id - DIM_MODE_THRESHOLD`.
pub static BUILTIN_DIM_TABLES: [&[DimStep]; 3] = [&FADE_ALL, &CROSSFADE, &GLOW];
