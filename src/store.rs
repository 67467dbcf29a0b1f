//! Sequence store: compiled-in chase patterns and the single dimmer sequence slot.

use crate::config::{DIM_MODE_THRESHOLD, EXTERNAL_DIM_THRESHOLD};
use crate::patterns::{BUILTIN_DIM_TABLES, CHASE_PATTERNS};
use crate::sequence::{ChaseSequence, DimSequence};
use crate::types::{DimStep, Error};

/// Something that can produce a dimmer sequence by id, typically from removable storage.
pub trait DimLoader<const N: usize> {
    /// Loads the sequence with `id`.
    ///
    /// # Errors
    /// * `ConfigurationAbsent` - the backing source is missing or can't be opened
    /// * `AllocationFailure` - the sequence doesn't fit `N` steps
    /// * `UnknownSequenceId` - the source holds no sequence with this id
    fn load_dim_sequence(&mut self, id: u8) -> Result<DimSequence<N>, Error>;
}

/// A loader for boards without removable storage.
impl<const N: usize> DimLoader<N> for () {
    fn load_dim_sequence(&mut self, _id: u8) -> Result<DimSequence<N>, Error> {
        Err(Error::ConfigurationAbsent)
    }
}

/// Holds the chase pattern table and the loaded dimmer sequence.
///
/// # Type Parameters
/// * `N` - Maximum number of dimmer steps
pub struct SequenceStore<const N: usize> {
    chase: &'static [&'static [u8]],
    dim_tables: &'static [&'static [DimStep]],
    dim: Option<DimSequence<N>>,
}

impl<const N: usize> SequenceStore<N> {
    /// Creates a store over the compiled-in tables.
    pub fn new() -> Self {
        Self::with_tables(&CHASE_PATTERNS, &BUILTIN_DIM_TABLES)
    }

    /// Creates a store over custom tables.
    pub fn with_tables(
        chase: &'static [&'static [u8]],
        dim_tables: &'static [&'static [DimStep]],
    ) -> Self {
        Self {
            chase,
            dim_tables,
            dim: None,
        }
    }

    /// Selects a compiled-in chase sequence.
    ///
    /// # Errors
    /// * `UnknownSequenceId` - no pattern with this id
    /// * `EmptySequence` - the pattern table entry is empty
    pub fn select_chase(&self, id: u8) -> Result<ChaseSequence, Error> {
        let patterns = self
            .chase
            .get(id as usize)
            .copied()
            .ok_or(Error::UnknownSequenceId(id))?;
        ChaseSequence::new(patterns)
    }

    /// Loads a dimmer sequence into the slot and returns it.
    ///
    /// Ids from `DIM_MODE_THRESHOLD` below `EXTERNAL_DIM_THRESHOLD` come from the compiled-in
    /// tables, higher ids from `loader`. The new sequence is fully built before it replaces
    /// the previous one; if loading fails the previous sequence stays in the slot.
    ///
    /// # Errors
    /// * `UnknownSequenceId` - `id` is a chase id or names no compiled-in table
    /// * anything `loader` reports
    pub fn load_dim_sequence<L: DimLoader<N>>(
        &mut self,
        id: u8,
        loader: &mut L,
    ) -> Result<&DimSequence<N>, Error> {
        let sequence = match id {
            id if id < DIM_MODE_THRESHOLD => return Err(Error::UnknownSequenceId(id)),
            id if id < EXTERNAL_DIM_THRESHOLD => {
                let table = self
                    .dim_tables
                    .get((id - DIM_MODE_THRESHOLD) as usize)
                    .ok_or(Error::UnknownSequenceId(id))?;
                DimSequence::from_steps(table)?
            }
            id => loader.load_dim_sequence(id)?,
        };

        info!("store: dimmer sequence {} loaded ({} steps)", id, sequence.len());
        Ok(self.dim.insert(sequence))
    }

    /// Installs a sequence received from elsewhere, such as the sync line.
    pub fn install_dim_sequence(&mut self, sequence: DimSequence<N>) -> &DimSequence<N> {
        self.dim.insert(sequence)
    }

    /// The loaded dimmer sequence, if any.
    pub fn dim_sequence(&self) -> Option<&DimSequence<N>> {
        self.dim.as_ref()
    }
}

impl<const N: usize> Default for SequenceStore<N> {
    fn default() -> Self {
        Self::new()
    }
}
