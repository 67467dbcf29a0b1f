//! Master/slave sync line protocol.
//!
//! Line oriented, no acknowledgement, no checksum:
//!
//! | line      | meaning                              |
//! |-----------|--------------------------------------|
//! | `R`       | restart at step 0                    |
//! | `Z`       | advance one step                     |
//! | `C <int>` | new speed parameter                  |
//! | `Q`/`S`   | dimmer sequence records, see [`record`](crate::record) |
//!
//! Only the first byte of a line is significant for `R` and `Z`.

use core::fmt::Write;
use heapless::String;

use crate::hal::{LINE_CAPACITY, LineSink, SerialRead, SerialWrite};
use crate::record::{Assembly, RecordAssembler};
use crate::sequence::DimSequence;
use crate::shared::SharedState;
use crate::types::{Error, MalformedLine, StepTransition, SyncEvent};

/// Parses a sync line.
///
/// Returns `Ok(None)` for lines that aren't sync traffic, such as record lines.
///
/// # Errors
/// `MalformedLine` for a `C` line without a valid integer.
pub fn parse_sync_line(line: &str) -> Result<Option<SyncEvent>, MalformedLine> {
    match line.as_bytes().first() {
        Some(b'R') => Ok(Some(SyncEvent::Restart)),
        Some(b'Z') => Ok(Some(SyncEvent::Step)),
        Some(b'C') => {
            let value = line[1..].trim().parse().map_err(|_| MalformedLine)?;
            Ok(Some(SyncEvent::SetSpeed(value)))
        }
        _ => Ok(None),
    }
}

/// Writes an event as a sync line, without terminator.
pub fn write_event<W: Write>(out: &mut W, event: SyncEvent) -> core::fmt::Result {
    match event {
        SyncEvent::Restart => out.write_str("R"),
        SyncEvent::Step => out.write_str("Z"),
        SyncEvent::SetSpeed(speed) => write!(out, "C {}", speed),
    }
}

/// The master's transmit side.
pub struct MasterEndpoint<W: SerialWrite> {
    tx: W,
    published_speed: Option<u16>,
}

impl<W: SerialWrite> MasterEndpoint<W> {
    /// Wraps a serial transmitter.
    pub fn new(tx: W) -> Self {
        Self {
            tx,
            published_speed: None,
        }
    }

    /// Sends one event line.
    pub fn emit(&mut self, event: SyncEvent) {
        let mut line: String<16> = String::new();
        // "C 65535" is the longest event line.
        let _ = write_event(&mut line, event);
        self.write_line(&line);

        if let SyncEvent::SetSpeed(speed) = event {
            self.published_speed = Some(speed);
        }
    }

    /// Sends a step transition, followed by a `C` line if `speed` differs from the last
    /// published speed.
    pub fn publish(&mut self, transition: StepTransition, speed: Option<u16>) {
        self.emit(transition.into());

        if let Some(speed) = speed {
            if self.published_speed != Some(speed) {
                self.emit(SyncEvent::SetSpeed(speed));
            }
        }
    }

    /// The last speed sent with a `C` line.
    pub fn published_speed(&self) -> Option<u16> {
        self.published_speed
    }

    /// Returns the transmitter.
    pub fn tx(&self) -> &W {
        &self.tx
    }

    /// Returns the transmitter mutably.
    pub fn tx_mut(&mut self) -> &mut W {
        &mut self.tx
    }
}

impl<W: SerialWrite> LineSink for MasterEndpoint<W> {
    fn write_line(&mut self, line: &str) {
        self.tx.write_bytes(line.as_bytes());
        self.tx.write_bytes(b"\n");
    }
}

/// What a slave did with one received line.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Inbound {
    /// A sync event, applied.
    Event(SyncEvent),

    /// Not sync traffic.
    Ignored,

    /// Malformed, or the event queue was full.
    Discarded,
}

/// The slave's receive side.
pub struct SlaveEndpoint<R: SerialRead> {
    rx: R,
    line: String<LINE_CAPACITY>,
}

impl<R: SerialRead> SlaveEndpoint<R> {
    /// Wraps a serial receiver.
    pub fn new(rx: R) -> Self {
        Self {
            rx,
            line: String::new(),
        }
    }

    /// Blocks until a full line has arrived and returns it without terminator.
    ///
    /// Carriage returns are dropped. Anything past [`LINE_CAPACITY`] bytes is discarded,
    /// as are non-ASCII bytes.
    pub fn read_line(&mut self) -> &str {
        self.line.clear();
        loop {
            let byte = self.rx.read_byte();
            match byte {
                b'\n' => break,
                b'\r' => {}
                byte if byte.is_ascii() => {
                    let _ = self.line.push(byte as char);
                }
                _ => {}
            }
        }
        &self.line
    }

    /// Reads and applies one line.
    ///
    /// `R` and `Z` are queued for the zero-cross handler; `C` replaces the shared speed.
    /// Malformed lines are dropped and reading carries on with the next call.
    pub fn poll(&mut self, shared: &SharedState) -> Inbound {
        let line = self.read_line();

        match parse_sync_line(line) {
            Ok(Some(SyncEvent::SetSpeed(speed))) => {
                shared.set_speed(speed);
                Inbound::Event(SyncEvent::SetSpeed(speed))
            }
            Ok(Some(event)) => {
                if shared.post_inbound(event) {
                    Inbound::Event(event)
                } else {
                    warn!("sync: event queue full, dropping {}", event);
                    Inbound::Discarded
                }
            }
            Ok(None) => Inbound::Ignored,
            Err(MalformedLine) => {
                warn!("sync: discarding malformed line");
                Inbound::Discarded
            }
        }
    }

    /// Blocks until the master has published the full record block for `id`.
    ///
    /// Sync traffic and blocks for other ids are skipped.
    ///
    /// # Errors
    /// * `AllocationFailure` - the block doesn't fit `N` steps
    /// * `EmptySequence` - the block announces no steps
    pub fn receive_dim_sequence<const N: usize>(&mut self, id: u8) -> Result<DimSequence<N>, Error> {
        let mut assembler = RecordAssembler::<N>::new(id);

        loop {
            let line = self.read_line();
            if assembler.feed(line)? == Assembly::Complete {
                break;
            }
        }

        let sequence = assembler.finish()?;
        info!("sync: received sequence {} ({} steps)", id, sequence.len());
        Ok(sequence)
    }

    /// Returns the receiver.
    pub fn rx_mut(&mut self) -> &mut R {
        &mut self.rx
    }
}
