//! Replay orchestrator — rebuild world state from the journal.
//!
//! Two independent paths to the same state:
//!   - `rebuild_state` applies the journaled write sets as recorded
//!   - `reexecute` runs the journaled invocations through the registry again
//!
//! Both return `(state, digest)`. On a healthy ledger the digests match.

use asset_registry::hashing::state_digest;
use asset_registry::MemoryWorldState;

use crate::error::{Result, RuntimeError};
use crate::invocation::{Invocation, Outcome};
use crate::proto_types::ProtoCommit;
use crate::tx_state::{TxState, WriteSet};

/// Apply journaled write sets, in order, to an empty state.
pub fn rebuild_state(commits: &[ProtoCommit]) -> Result<(MemoryWorldState, String)> {
    rebuild_from(MemoryWorldState::new(), commits)
}

/// Apply journaled write sets on top of `base`.
pub fn rebuild_from(
    mut base: MemoryWorldState,
    commits: &[ProtoCommit],
) -> Result<(MemoryWorldState, String)> {
    for commit in commits {
        WriteSet::from_proto(&commit.writes)?.apply_to(&mut base);
    }
    let digest = state_digest(&base)?;
    Ok((base, digest))
}

/// Run one invocation against `state` with all-or-nothing semantics.
///
/// Returns the outcome and the write set that was applied. On error
/// `state` is unchanged.
pub fn execute(
    state: &mut MemoryWorldState,
    invocation: &Invocation,
) -> Result<(Outcome, WriteSet)> {
    let mut tx = TxState::new(state);
    let outcome = invocation.apply(&mut tx)?;
    let write_set = tx.into_write_set();
    write_set.apply_to(state);
    Ok((outcome, write_set))
}

/// Re-run the journaled invocations on a fresh state.
///
/// Every journaled invocation succeeded once; a failure here means the
/// registry is no longer deterministic over this journal.
pub fn reexecute(commits: &[ProtoCommit]) -> Result<(MemoryWorldState, String)> {
    let mut state = MemoryWorldState::new();
    for commit in commits {
        let invocation = Invocation::from_json(&commit.invocation).map_err(|e| {
            RuntimeError::Journal(format!("commit {}: bad invocation: {}", commit.sequence, e))
        })?;
        execute(&mut state, &invocation)?;
    }
    let digest = state_digest(&state)?;
    Ok((state, digest))
}

/// Run invocations in order on a fresh state, discarding failed ones.
pub fn run_invocations(invocations: &[Invocation]) -> Result<(MemoryWorldState, String)> {
    let mut state = MemoryWorldState::new();
    for invocation in invocations {
        match execute(&mut state, invocation) {
            Ok(_) => {}
            Err(RuntimeError::Registry(err)) => {
                tracing::debug!(function = invocation.function_name(), error = %err, "invocation rejected");
            }
            Err(other) => return Err(other),
        }
    }
    let digest = state_digest(&state)?;
    Ok((state, digest))
}
