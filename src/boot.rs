//! Start-up: picking the program for the selected mode and role.
//!
//! All loading happens here, before the interrupt handlers are enabled. Errors from this
//! stage are configuration errors; [`run_or_reset`] turns the fatal ones into a full
//! restart.

use crate::config::{EXTERNAL_DIM_THRESHOLD, Selection};
use crate::hal::{SerialRead, SystemReset};
use crate::protocol::SlaveEndpoint;
use crate::scheduler::Program;
use crate::store::{DimLoader, SequenceStore};
use crate::types::{Error, Mode};

/// Loads the program for a master.
///
/// Dimmer ids above the compiled-in range need local storage; without it this fails with
/// `ConfigurationAbsent`. The loader is expected to relay what it reads to the slaves.
///
/// # Errors
/// * `UnknownSequenceId` - no chase pattern or dimmer table with this id
/// * anything the loader reports
pub fn master_program<'s, L, const N: usize>(
    selection: &Selection,
    store: &'s mut SequenceStore<N>,
    loader: &mut L,
) -> Result<Program<'s, N>, Error>
where
    L: DimLoader<N>,
{
    match selection.mode {
        Mode::Chase => Ok(Program::Chase(store.select_chase(selection.sequence_id)?)),
        Mode::Dimmer => {
            if selection.sequence_id >= EXTERNAL_DIM_THRESHOLD && !selection.storage_present {
                return Err(Error::ConfigurationAbsent);
            }
            Ok(Program::Dimmer(store.load_dim_sequence(selection.sequence_id, loader)?))
        }
    }
}

/// Loads the program for a slave.
///
/// Dimmer ids above the compiled-in range are received from the master's record relay;
/// this blocks until the whole block has arrived.
///
/// # Errors
/// * `UnknownSequenceId` - no chase pattern or dimmer table with this id
/// * `AllocationFailure` - the relayed sequence doesn't fit `N` steps
pub fn slave_program<'s, R: SerialRead, const N: usize>(
    selection: &Selection,
    store: &'s mut SequenceStore<N>,
    link: &mut SlaveEndpoint<R>,
) -> Result<Program<'s, N>, Error> {
    match selection.mode {
        Mode::Chase => Ok(Program::Chase(store.select_chase(selection.sequence_id)?)),
        Mode::Dimmer if selection.sequence_id < EXTERNAL_DIM_THRESHOLD => Ok(Program::Dimmer(
            store.load_dim_sequence(selection.sequence_id, &mut ())?,
        )),
        Mode::Dimmer => {
            let sequence = link.receive_dim_sequence(selection.sequence_id)?;
            Ok(Program::Dimmer(store.install_dim_sequence(sequence)))
        }
    }
}

/// Unwraps a start-up result, resetting the system on any error.
///
/// There is no retry limit and no back-off; a reset is the only recovery.
pub fn run_or_reset<T, S: SystemReset>(result: Result<T, Error>, reset: &mut S) -> T {
    match result {
        Ok(value) => value,
        Err(err) => {
            error!("boot: {}, restarting", err);
            reset.reset()
        }
    }
}
