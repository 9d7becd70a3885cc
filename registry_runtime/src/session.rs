//! Ledger session — one ledger directory, persist-before-publish commits.
//!
//! Directory structure:
//!   <data_dir>/<ledger_id>/journal.log
//!   <data_dir>/<ledger_id>/snapshots/
//!
//! Invocation order:
//!   1. run the registry operation on a `TxState` overlay
//!   2. on error, drop the overlay; committed state is untouched
//!   3. if the write set is non-empty, append it to the journal
//!   4. only then apply it to committed state
//!   5. snapshot if the interval is reached
//!
//! Read-only invocations produce no journal frame.

use std::path::{Path, PathBuf};

use asset_registry::hashing::state_digest;
use asset_registry::MemoryWorldState;

use crate::config::RuntimeConfig;
use crate::error::{Result, RuntimeError};
use crate::invocation::{Invocation, Outcome};
use crate::journal::Journal;
use crate::proto_types::{ProtoCommit, ProtoWrite};
use crate::replay;
use crate::snapshot;
use crate::tx_state::TxState;

/// An isolated ledger with its own journal, snapshots and committed state.
pub struct Session {
    ledger_id: String,
    ledger_dir: PathBuf,
    state: MemoryWorldState,
    journal: Journal,
    snapshot_interval: u64,
    current_sequence: u64,
    restored_from: Option<u64>,
}

impl Session {
    /// Open (or create) the ledger described by `config` and rebuild its
    /// committed state.
    ///
    /// Snapshots are tried newest first. One is used if it is not ahead of
    /// the journal, its hash verifies, and replaying the journal tail on top
    /// of it reaches the digest recorded by the last commit. Without such a
    /// snapshot the whole journal is replayed, and that result must match
    /// the last commit's digest.
    pub fn open(config: &RuntimeConfig) -> Result<Self> {
        config.validate()?;
        let ledger_dir = config.ledger_dir();
        let journal = Journal::open(&ledger_dir.join("journal.log"), config.fsync)?;
        let commits = journal.load_all()?;
        let last_seq = journal.last_sequence();

        let restored = restore_from_snapshots(&ledger_dir.join("snapshots"), &commits);
        let restored_from = restored.as_ref().map(|(seq, _, _)| *seq);
        let (state, digest) = match restored {
            Some((_, state, digest)) => (state, digest),
            None => replay::rebuild_state(&commits)?,
        };

        if let Some(last) = commits.last() {
            if last.state_digest != digest {
                return Err(RuntimeError::Journal(format!(
                    "rebuilt state digest {} does not match commit {} digest {}",
                    digest, last.sequence, last.state_digest
                )));
            }
        }

        tracing::info!(
            ledger = %config.ledger_id,
            sequence = last_seq,
            entries = state.len(),
            "ledger opened"
        );

        Ok(Self {
            ledger_id: config.ledger_id.clone(),
            ledger_dir,
            state,
            journal,
            snapshot_interval: config.snapshot_interval,
            current_sequence: last_seq,
            restored_from,
        })
    }

    /// Execute one invocation; commit its writes if it succeeds.
    pub fn invoke(&mut self, invocation: &Invocation) -> Result<Outcome> {
        let mut tx = TxState::new(&self.state);
        let outcome = invocation.apply(&mut tx)?;
        let write_set = tx.into_write_set();
        if write_set.is_empty() {
            return Ok(outcome);
        }

        let mut next_state = self.state.clone();
        write_set.apply_to(&mut next_state);
        let sequence = self.current_sequence + 1;
        let writes: Vec<ProtoWrite> = write_set.to_proto();
        let commit = ProtoCommit {
            sequence,
            invocation: invocation
                .to_json()
                .map_err(|e| RuntimeError::Journal(e.to_string()))?,
            writes,
            state_digest: state_digest(&next_state)?,
        };

        self.journal.append_commit(&commit)?;
        self.state = next_state;
        self.current_sequence = sequence;
        tracing::info!(
            ledger = %self.ledger_id,
            sequence,
            function = invocation.function_name(),
            writes = write_set.len(),
            "write set committed"
        );

        if self.snapshot_interval > 0 && sequence % self.snapshot_interval == 0 {
            snapshot::save_snapshot(&self.snapshots_dir(), sequence, &self.state)?;
        }

        Ok(outcome)
    }

    /// Full replay from the journal; committed state is replaced by the
    /// rebuilt one.
    pub fn replay_full(&mut self) -> Result<(MemoryWorldState, String)> {
        let commits = self.journal.load_all()?;
        let (state, digest) = replay::rebuild_state(&commits)?;
        self.state = state.clone();
        Ok((state, digest))
    }

    /// All journaled commits.
    pub fn commits(&self) -> Result<Vec<ProtoCommit>> {
        Ok(self.journal.load_all()?)
    }

    /// Committed world state.
    pub fn state(&self) -> &MemoryWorldState {
        &self.state
    }

    pub fn current_digest(&self) -> Result<String> {
        Ok(state_digest(&self.state)?)
    }

    /// Sequence of the snapshot the state was rebuilt from at open, if any.
    pub fn restored_from(&self) -> Option<u64> {
        self.restored_from
    }

    pub fn current_sequence(&self) -> u64 {
        self.current_sequence
    }

    pub fn ledger_id(&self) -> &str {
        &self.ledger_id
    }

    pub fn snapshots_dir(&self) -> PathBuf {
        self.ledger_dir.join("snapshots")
    }
}

/// Newest snapshot that verifies and, with the journal tail replayed on
/// top, agrees with the last commit. Returns its sequence, state and digest.
fn restore_from_snapshots(
    dir: &Path,
    commits: &[ProtoCommit],
) -> Option<(u64, MemoryWorldState, String)> {
    let sequences = match snapshot::snapshot_sequences(dir) {
        Ok(sequences) => sequences,
        Err(err) => {
            tracing::warn!(error = %err, "unreadable snapshot directory, replaying full journal");
            return None;
        }
    };
    let expected = commits.last().map(|c| c.state_digest.as_str());

    for seq in sequences.into_iter().rev() {
        if seq > commits.len() as u64 {
            tracing::warn!(sequence = seq, "snapshot ahead of journal, skipped");
            continue;
        }
        let snap = match snapshot::load_snapshot(dir, seq) {
            Ok(Some(snap)) if snapshot::verify_snapshot_hash(&snap) => snap,
            Ok(_) => {
                tracing::warn!(sequence = seq, "snapshot hash mismatch, skipped");
                continue;
            }
            Err(err) => {
                tracing::warn!(sequence = seq, error = %err, "unreadable snapshot, skipped");
                continue;
            }
        };
        match replay::rebuild_from(snapshot::restore_state(&snap), &commits[seq as usize..]) {
            Ok((state, digest)) if expected.map_or(true, |e| e == digest) => {
                tracing::info!(sequence = seq, "restored from snapshot");
                return Some((seq, state, digest));
            }
            Ok((_, digest)) => {
                tracing::warn!(sequence = seq, digest = %digest, "snapshot disagrees with journal, skipped");
            }
            Err(err) => {
                tracing::warn!(sequence = seq, error = %err, "journal tail does not apply to snapshot, skipped");
            }
        }
    }
    None
}
