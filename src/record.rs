//! Text records describing dimmer sequences.
//!
//! The same line format is read from storage and relayed over the sync line to slaves:
//!
//! ```text
//! Q <sequence_id> <step_count>
//! S <duration_ticks> <ch0_start> <ch0_stop> ... <ch7_start> <ch7_stop>
//! ```
//!
//! One `Q` header starts a block; each `S` line is one step. A storage file may hold many
//! blocks; a reader keeps only the block for the id it was asked for.

use core::fmt::Write;
use heapless::{String, Vec};

use crate::CHANNEL_COUNT;
use crate::hal::{LINE_CAPACITY, LineSink, LineSource};
use crate::sequence::DimSequence;
use crate::store::DimLoader;
use crate::types::{ChannelRamp, DimStep, Error, MalformedLine};

/// Integers on an `S` line: duration plus a start/stop pair per channel.
pub const STEP_FIELDS: usize = 1 + 2 * CHANNEL_COUNT;

/// A parsed record line.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Record {
    /// Start of a sequence block.
    Header { sequence_id: u8, step_count: u16 },

    /// One step of the current block.
    Step(DimStep),
}

/// Parses one line.
///
/// Returns `Ok(None)` for lines that are not records at all (blank lines, sync traffic).
/// Step values above 255 keep only their low byte. Extra trailing fields are ignored.
///
/// # Errors
/// `MalformedLine` if a `Q` or `S` line has missing or non-numeric fields, an out-of-range
/// header, or a zero step duration.
pub fn parse_line(line: &str) -> Result<Option<Record>, MalformedLine> {
    let mut fields = line.split_whitespace();

    match fields.next() {
        Some("Q") => {
            let sequence_id = next_u32(&mut fields)?;
            let step_count = next_u32(&mut fields)?;
            let sequence_id = u8::try_from(sequence_id).map_err(|_| MalformedLine)?;
            let step_count = u16::try_from(step_count).map_err(|_| MalformedLine)?;
            Ok(Some(Record::Header {
                sequence_id,
                step_count,
            }))
        }
        Some("S") => {
            let mut values = [0u8; STEP_FIELDS];
            for value in values.iter_mut() {
                *value = (next_u32(&mut fields)? & 0xFF) as u8;
            }
            if values[0] == 0 {
                return Err(MalformedLine);
            }

            let mut channels = [ChannelRamp::default(); CHANNEL_COUNT];
            for (channel, pair) in channels.iter_mut().zip(values[1..].chunks_exact(2)) {
                *channel = ChannelRamp::new(pair[0], pair[1]);
            }
            Ok(Some(Record::Step(DimStep::new(values[0], channels))))
        }
        _ => Ok(None),
    }
}

fn next_u32<'a>(fields: &mut impl Iterator<Item = &'a str>) -> Result<u32, MalformedLine> {
    fields
        .next()
        .ok_or(MalformedLine)?
        .parse()
        .map_err(|_| MalformedLine)
}

/// Writes a `Q` header line, without terminator.
pub fn write_header<W: Write>(out: &mut W, sequence_id: u8, step_count: u16) -> core::fmt::Result {
    write!(out, "Q {} {}", sequence_id, step_count)
}

/// Writes an `S` step line, without terminator.
pub fn write_step<W: Write>(out: &mut W, step: &DimStep) -> core::fmt::Result {
    write!(out, "S {}", step.duration_ticks)?;
    for ramp in &step.channels {
        write!(out, " {} {}", ramp.start, ramp.stop)?;
    }
    Ok(())
}

/// Writes a whole sequence as a record block, one line per call to `sink`.
pub fn publish_sequence<K: LineSink, const N: usize>(
    sink: &mut K,
    sequence_id: u8,
    sequence: &DimSequence<N>,
) {
    let mut line: String<LINE_CAPACITY> = String::new();

    // A record line is at most 69 bytes, well inside the buffer.
    let _ = write_header(&mut line, sequence_id, sequence.len() as u16);
    sink.write_line(&line);

    for step in sequence.steps() {
        line.clear();
        let _ = write_step(&mut line, step);
        sink.write_line(&line);
    }
}

/// Progress of a [`RecordAssembler`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Assembly {
    /// The target block hasn't started or isn't complete yet.
    Pending,

    /// All announced steps of the target block have arrived.
    Complete,
}

/// Collects the record block for one sequence id from a stream of lines.
///
/// Malformed lines are skipped. Lines belonging to other ids are ignored. The sequence is
/// only handed out once every announced step has arrived.
pub struct RecordAssembler<const N: usize> {
    target: u8,
    current_id: Option<u8>,
    expected: Option<u16>,
    steps: Vec<DimStep, N>,
    skipped: u16,
}

impl<const N: usize> RecordAssembler<N> {
    /// Creates an assembler for `target`.
    pub fn new(target: u8) -> Self {
        Self {
            target,
            current_id: None,
            expected: None,
            steps: Vec::new(),
            skipped: 0,
        }
    }

    /// Feeds one line.
    ///
    /// # Errors
    /// * `AllocationFailure` - the target header announces more than `N` steps
    /// * `EmptySequence` - the target header announces zero steps
    pub fn feed(&mut self, line: &str) -> Result<Assembly, Error> {
        if self.is_complete() {
            return Ok(Assembly::Complete);
        }

        let record = match parse_line(line) {
            Ok(Some(record)) => record,
            Ok(None) => return Ok(Assembly::Pending),
            Err(MalformedLine) => {
                self.skipped = self.skipped.saturating_add(1);
                warn!("records: skipping malformed line");
                return Ok(Assembly::Pending);
            }
        };

        match record {
            Record::Header {
                sequence_id,
                step_count,
            } => {
                self.current_id = Some(sequence_id);
                if sequence_id != self.target {
                    return Ok(Assembly::Pending);
                }
                if step_count == 0 {
                    return Err(Error::EmptySequence);
                }
                if step_count as usize > N {
                    return Err(Error::AllocationFailure {
                        requested: step_count,
                        capacity: N,
                    });
                }
                debug!("records: sequence {} has {} steps", sequence_id, step_count);
                self.steps.clear();
                self.expected = Some(step_count);
            }
            Record::Step(step) => {
                if self.current_id == Some(self.target) && self.expected.is_some() {
                    // Capacity was checked against the header.
                    let _ = self.steps.push(step);
                }
            }
        }

        Ok(if self.is_complete() {
            Assembly::Complete
        } else {
            Assembly::Pending
        })
    }

    fn is_complete(&self) -> bool {
        self.expected
            .is_some_and(|expected| self.steps.len() >= expected as usize)
    }

    /// Number of malformed lines skipped so far.
    pub fn skipped(&self) -> u16 {
        self.skipped
    }

    /// Hands out the assembled sequence.
    ///
    /// # Errors
    /// * `UnknownSequenceId` - no header for the target was seen
    /// * `TruncatedSequence` - the input ended before all announced steps arrived
    pub fn finish(self) -> Result<DimSequence<N>, Error> {
        let Some(expected) = self.expected else {
            return Err(Error::UnknownSequenceId(self.target));
        };

        if self.steps.len() < expected as usize {
            return Err(Error::TruncatedSequence {
                expected,
                received: self.steps.len() as u16,
            });
        }

        DimSequence::from_steps(&self.steps)
    }
}

/// Loads dimmer sequences from a line source such as a file on removable storage.
///
/// Every line read is relayed verbatim to `relay`, so slaves without storage see the
/// whole file, including blocks for other ids.
pub struct RecordLoader<S: LineSource, K: LineSink> {
    source: S,
    relay: K,
}

impl<S: LineSource, K: LineSink> RecordLoader<S, K> {
    /// Creates a loader reading `source` and relaying to `relay`.
    pub fn new(source: S, relay: K) -> Self {
        Self { source, relay }
    }

    /// Splits the loader back into its parts.
    pub fn into_parts(self) -> (S, K) {
        (self.source, self.relay)
    }
}

impl<S: LineSource, K: LineSink, const N: usize> DimLoader<N> for RecordLoader<S, K> {
    fn load_dim_sequence(&mut self, id: u8) -> Result<DimSequence<N>, Error> {
        self.source.open()?;

        let mut assembler = RecordAssembler::<N>::new(id);
        let mut line: String<LINE_CAPACITY> = String::new();

        loop {
            line.clear();
            if !self.source.read_line(&mut line)? {
                break;
            }
            self.relay.write_line(&line);
            assembler.feed(&line)?;
        }

        let sequence = assembler.finish()?;
        info!("records: loaded sequence {} ({} steps)", id, sequence.len());
        Ok(sequence)
    }
}
