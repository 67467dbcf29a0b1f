use crate::CHANNEL_COUNT;
use crate::types::{ChannelRamp, DimStep, Error};
use heapless::Vec;

/// A compiled-in chase pattern list.
///
/// Bit `c` of each entry switches channel `c` on. The patterns live in flash for the whole
/// program; the sequence only borrows them.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ChaseSequence {
    patterns: &'static [u8],
}

impl ChaseSequence {
    /// Wraps a pattern list.
    ///
    /// # Errors
    /// * `EmptySequence` - `patterns` is empty
    pub const fn new(patterns: &'static [u8]) -> Result<Self, Error> {
        if patterns.is_empty() {
            return Err(Error::EmptySequence);
        }
        Ok(Self { patterns })
    }

    /// Returns the number of steps.
    #[inline]
    pub fn len(&self) -> usize {
        self.patterns.len()
    }

    /// Always false; empty chase sequences cannot be constructed.
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.patterns.is_empty()
    }

    /// Returns the pattern for `step`, wrapping out-of-range indices to step 0.
    #[inline]
    pub fn pattern(&self, step: usize) -> u8 {
        self.patterns.get(step).copied().unwrap_or(self.patterns[0])
    }

    /// Returns all patterns.
    pub fn patterns(&self) -> &'static [u8] {
        self.patterns
    }
}

/// A dimmer sequence with up to `N` steps.
///
/// Each step holds a duration in ticks and a brightness ramp per channel. Sequences are
/// validated on construction and never mutated afterwards; loading a new one replaces the
/// whole value.
///
/// # Type Parameters
/// * `N` - Maximum number of steps this sequence can hold
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DimSequence<const N: usize> {
    steps: Vec<DimStep, N>,
}

impl<const N: usize> DimSequence<N> {
    /// Creates a new sequence builder.
    pub fn builder() -> DimSequenceBuilder<N> {
        DimSequenceBuilder::new()
    }

    /// Copies a compiled-in step table into a sequence.
    ///
    /// # Errors
    /// * `EmptySequence` - `steps` is empty
    /// * `ZeroDuration` - a step has a zero duration
    /// * `CapacityExceeded` - `steps` is longer than `N`
    pub fn from_steps(steps: &[DimStep]) -> Result<Self, Error> {
        let mut builder = DimSequenceBuilder::new();
        for step in steps {
            builder = builder.push(*step)?;
        }
        builder.build()
    }

    /// Returns the number of steps.
    #[inline]
    pub fn len(&self) -> usize {
        self.steps.len()
    }

    /// Always false; empty sequences cannot be built.
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.steps.is_empty()
    }

    /// Returns the step at `index`.
    pub fn get_step(&self, index: usize) -> Option<&DimStep> {
        self.steps.get(index)
    }

    /// Returns all steps in order.
    pub fn steps(&self) -> &[DimStep] {
        &self.steps
    }

    /// Returns the step at `index`, falling back to step 0 for an out-of-range index.
    #[inline]
    pub(crate) fn step_or_first(&self, index: usize) -> &DimStep {
        self.steps.get(index).unwrap_or(&self.steps[0])
    }
}

/// Builder for validated dimmer sequences.
#[derive(Debug)]
pub struct DimSequenceBuilder<const N: usize> {
    steps: Vec<DimStep, N>,
}

impl<const N: usize> DimSequenceBuilder<N> {
    /// Creates a new empty builder.
    pub fn new() -> Self {
        Self { steps: Vec::new() }
    }

    /// Adds a step built from a duration and per-channel ramps.
    ///
    /// # Errors
    /// * `CapacityExceeded` - the sequence already holds `N` steps
    pub fn step(
        self,
        duration_ticks: u8,
        channels: [ChannelRamp; CHANNEL_COUNT],
    ) -> Result<Self, Error> {
        self.push(DimStep::new(duration_ticks, channels))
    }

    /// Adds a prepared step.
    ///
    /// # Errors
    /// * `CapacityExceeded` - the sequence already holds `N` steps
    pub fn push(mut self, step: DimStep) -> Result<Self, Error> {
        self.steps
            .push(step)
            .map_err(|_| Error::CapacityExceeded)?;
        Ok(self)
    }

    /// Number of steps added so far.
    pub fn len(&self) -> usize {
        self.steps.len()
    }

    /// Whether no steps have been added.
    pub fn is_empty(&self) -> bool {
        self.steps.is_empty()
    }

    /// Builds and validates the sequence.
    ///
    /// # Errors
    /// * `EmptySequence` - No steps were added
    /// * `ZeroDuration` - A step has a zero duration
    pub fn build(self) -> Result<DimSequence<N>, Error> {
        if self.steps.is_empty() {
            return Err(Error::EmptySequence);
        }

        if self.steps.iter().any(|step| step.duration_ticks == 0) {
            return Err(Error::ZeroDuration);
        }

        Ok(DimSequence { steps: self.steps })
    }
}

impl<const N: usize> Default for DimSequenceBuilder<N> {
    fn default() -> Self {
        Self::new()
    }
}
