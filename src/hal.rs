//! Hardware abstraction traits.
//!
//! Implement these for your board's GPIO, timers, ADC and UART. The core never touches
//! registers directly.

use crate::CHANNEL_COUNT;

/// The eight switched channel outputs.
///
/// `on` means the channel's load conducts: for a triac output, the gate has been fired.
/// Implementations map this to the board's pin polarity (the stock boards drive the gates
/// active-low).
pub trait ChannelOutputs {
    /// Sets one channel. `index` is `0..8`.
    fn set_channel_output(&mut self, index: usize, on: bool);

    /// Sets all channels from a bit pattern, bit `c` = channel `c`.
    ///
    /// Override this when the board can write all channels in one bus access.
    fn set_all(&mut self, pattern: u8) {
        for channel in 0..CHANNEL_COUNT {
            self.set_channel_output(channel, pattern & (1 << channel) != 0);
        }
    }
}

/// The AC zero-cross edge interrupt.
///
/// Some detectors produce a spurious second edge right after the wanted one, so the
/// zero-cross handler disarms detection on entry and it stays disarmed until the slice
/// handler reports the half-cycle finished.
pub trait ZeroCrossDetector {
    /// Enables the edge interrupt.
    fn arm(&mut self);

    /// Disables the edge interrupt.
    fn disarm(&mut self);
}

/// The fixed-period slice timer interrupt.
pub trait SliceTimer {
    /// Starts periodic slice interrupts.
    fn start(&mut self);

    /// Stops slice interrupts.
    fn stop(&mut self);
}

/// The speed potentiometer.
pub trait Dial {
    /// Returns the dial position scaled to `0.0..=1.0`.
    fn read_dial(&mut self) -> f32;
}

/// Transmit side of the sync line.
pub trait SerialWrite {
    /// Writes bytes, blocking until they are queued. Only called from the main loop.
    fn write_bytes(&mut self, bytes: &[u8]);
}

/// Receive side of the sync line.
pub trait SerialRead {
    /// Blocks until a byte arrives. Only called from the main loop.
    fn read_byte(&mut self) -> u8;
}

/// A source of text lines, such as a sequence file on removable storage.
pub trait LineSource {
    /// Opens the source and positions it at the first line.
    ///
    /// # Errors
    /// * `ConfigurationAbsent` - the source is missing or can't be opened
    fn open(&mut self) -> Result<(), crate::Error>;

    /// Reads the next line into `buf` without its terminator.
    ///
    /// Returns `Ok(false)` at end of input. Lines longer than `buf` are truncated.
    fn read_line(&mut self, buf: &mut heapless::String<LINE_CAPACITY>) -> Result<bool, crate::Error>;
}

/// A sink for relayed text lines.
pub trait LineSink {
    /// Writes one line; the sink adds the terminator.
    fn write_line(&mut self, line: &str);
}

/// Discards every line.
impl LineSink for () {
    fn write_line(&mut self, _line: &str) {}
}

impl<T: LineSink + ?Sized> LineSink for &mut T {
    fn write_line(&mut self, line: &str) {
        (**self).write_line(line);
    }
}

/// Full system restart, used for fatal configuration errors.
pub trait SystemReset {
    /// Resets the microcontroller. Never returns.
    fn reset(&mut self) -> !;
}

/// Longest line kept by line readers; the rest of a longer line is dropped.
pub const LINE_CAPACITY: usize = 98;
