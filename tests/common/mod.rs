//! Shared test infrastructure for ac-chaser integration tests

#![allow(dead_code)] // Items used across multiple test files; Rust analyzes per-file

use std::cell::Cell;
use std::collections::VecDeque;

use ac_chaser::hal::LINE_CAPACITY;
use ac_chaser::{
    ChannelOutputs, Dial, Error, LineSink, LineSource, SerialRead, SerialWrite, SliceTimer,
    SystemReset, ZeroCrossDetector,
};

// ============================================================================
// Mock Channel Outputs
// ============================================================================

/// Records channel writes. `levels` is the logical state, bit set = channel on.
#[derive(Default)]
pub struct MockBus {
    pub levels: u8,
    pub writes: Vec<(usize, bool)>,
}

impl MockBus {
    pub fn new() -> Self {
        Self::default()
    }

    /// Pin levels on an active-low board, as seen on the output port.
    pub fn line_levels(&self) -> u8 {
        !self.levels
    }

    pub fn writes_to(&self, channel: usize) -> usize {
        self.writes.iter().filter(|(c, _)| *c == channel).count()
    }
}

impl ChannelOutputs for MockBus {
    fn set_channel_output(&mut self, index: usize, on: bool) {
        assert!(index < 8, "channel index {} out of range", index);
        self.writes.push((index, on));
        if on {
            self.levels |= 1 << index;
        } else {
            self.levels &= !(1 << index);
        }
    }
}

// ============================================================================
// Mock Interrupt Sources
// ============================================================================

#[derive(Default)]
pub struct MockZeroCross {
    pub armed: bool,
    pub arms: usize,
    pub disarms: usize,
}

impl ZeroCrossDetector for MockZeroCross {
    fn arm(&mut self) {
        self.armed = true;
        self.arms += 1;
    }

    fn disarm(&mut self) {
        self.armed = false;
        self.disarms += 1;
    }
}

#[derive(Default)]
pub struct MockSliceTimer {
    pub running: bool,
    pub starts: usize,
}

impl SliceTimer for MockSliceTimer {
    fn start(&mut self) {
        self.running = true;
        self.starts += 1;
    }

    fn stop(&mut self) {
        self.running = false;
    }
}

// ============================================================================
// Mock Dial
// ============================================================================

/// Dial whose reading the test can change while the runner owns it
pub struct MockDial<'a>(pub &'a Cell<f32>);

impl Dial for MockDial<'_> {
    fn read_dial(&mut self) -> f32 {
        self.0.get()
    }
}

// ============================================================================
// Mock Serial Line
// ============================================================================

#[derive(Default)]
pub struct MockTx {
    pub bytes: Vec<u8>,
}

impl MockTx {
    pub fn new() -> Self {
        Self::default()
    }

    /// Everything written so far, split into lines.
    pub fn lines(&self) -> Vec<String> {
        String::from_utf8(self.bytes.clone())
            .unwrap()
            .lines()
            .map(String::from)
            .collect()
    }
}

impl SerialWrite for MockTx {
    fn write_bytes(&mut self, bytes: &[u8]) {
        self.bytes.extend_from_slice(bytes);
    }
}

/// Serial receiver fed from a fixed byte stream. Panics when the stream runs dry,
/// since a real read would block forever.
pub struct MockRx {
    pub data: VecDeque<u8>,
}

impl MockRx {
    pub fn new(text: &str) -> Self {
        Self {
            data: text.bytes().collect(),
        }
    }

    pub fn from_bytes(bytes: &[u8]) -> Self {
        Self {
            data: bytes.iter().copied().collect(),
        }
    }
}

impl SerialRead for MockRx {
    fn read_byte(&mut self) -> u8 {
        self.data.pop_front().expect("serial input exhausted")
    }
}

// ============================================================================
// Mock Storage
// ============================================================================

/// A sequence file. `present == false` behaves like a missing card.
pub struct MockFile {
    pub lines: Vec<String>,
    pub present: bool,
    pub position: usize,
}

impl MockFile {
    pub fn new(text: &str) -> Self {
        Self {
            lines: text.lines().map(String::from).collect(),
            present: true,
            position: 0,
        }
    }

    pub fn missing() -> Self {
        Self {
            lines: Vec::new(),
            present: false,
            position: 0,
        }
    }
}

impl LineSource for MockFile {
    fn open(&mut self) -> Result<(), Error> {
        if !self.present {
            return Err(Error::ConfigurationAbsent);
        }
        self.position = 0;
        Ok(())
    }

    fn read_line(&mut self, buf: &mut heapless::String<LINE_CAPACITY>) -> Result<bool, Error> {
        let Some(line) = self.lines.get(self.position) else {
            return Ok(false);
        };
        self.position += 1;
        buf.clear();
        for c in line.chars().take(LINE_CAPACITY) {
            let _ = buf.push(c);
        }
        Ok(true)
    }
}

/// Collects relayed lines
#[derive(Default)]
pub struct RecordingSink {
    pub lines: Vec<String>,
}

impl LineSink for RecordingSink {
    fn write_line(&mut self, line: &str) {
        self.lines.push(String::from(line));
    }
}

// ============================================================================
// Mock Reset
// ============================================================================

pub struct PanickingReset;

impl SystemReset for PanickingReset {
    fn reset(&mut self) -> ! {
        panic!("system reset");
    }
}

// ============================================================================
// Test Helper Functions
// ============================================================================

/// Gives a test-built pattern list the `'static` lifetime chase sequences need
pub fn leak_patterns(patterns: &[u8]) -> &'static [u8] {
    Box::leak(patterns.to_vec().into_boxed_slice())
}
