//! Snapshot layer — deterministic world-state snapshots.
//!
//! A snapshot holds every committed entry plus the state digest at one
//! journal sequence. No timestamps in snapshot content (determinism).
//!
//! If a snapshot's hash doesn't match its entries, callers fall back to a
//! full journal replay.

use std::fs::{self, File};
use std::io::Write;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use asset_registry::hashing::state_digest;
use asset_registry::MemoryWorldState;

use crate::error::{Result, RuntimeError};

/// Snapshot on-disk format.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct Snapshot {
    /// Journal sequence this snapshot reflects.
    pub sequence: u64,
    /// Entries in key order. Values are the stored UTF-8 bytes.
    pub entries: Vec<SnapshotEntry>,
    /// World-state digest of `entries`.
    pub hash: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct SnapshotEntry {
    pub key: String,
    pub value: String,
}

fn snapshot_path(dir: &Path, sequence: u64) -> PathBuf {
    dir.join(format!("snapshot_{:06}.json", sequence))
}

/// Build a snapshot of `state` at `sequence`.
///
/// Fails if a stored value is not UTF-8; registry values always are.
pub fn take_snapshot(sequence: u64, state: &MemoryWorldState) -> Result<Snapshot> {
    let entries = state
        .entries()
        .iter()
        .map(|(key, value)| {
            String::from_utf8(value.clone())
                .map(|value| SnapshotEntry {
                    key: key.clone(),
                    value,
                })
                .map_err(|_| RuntimeError::Snapshot(format!("value under {:?} is not UTF-8", key)))
        })
        .collect::<Result<Vec<_>>>()?;

    Ok(Snapshot {
        sequence,
        entries,
        hash: state_digest(state)?,
    })
}

/// Save a deterministic snapshot of `state` into `dir`.
pub fn save_snapshot(dir: &Path, sequence: u64, state: &MemoryWorldState) -> Result<PathBuf> {
    fs::create_dir_all(dir)?;

    let snap = take_snapshot(sequence, state)?;
    let content =
        serde_json::to_string(&snap).map_err(|e| RuntimeError::Snapshot(e.to_string()))?;

    let path = snapshot_path(dir, sequence);
    let mut file = File::create(&path)?;
    file.write_all(content.as_bytes())?;
    file.sync_all()?;

    tracing::info!(sequence, path = %path.display(), "snapshot saved");
    Ok(path)
}

/// Load the snapshot at `sequence`, or `None` if there is none.
pub fn load_snapshot(dir: &Path, sequence: u64) -> Result<Option<Snapshot>> {
    let path = snapshot_path(dir, sequence);
    if !path.exists() {
        return Ok(None);
    }

    let content = fs::read_to_string(&path)?;
    let snap: Snapshot = serde_json::from_str(&content)
        .map_err(|e| RuntimeError::Snapshot(format!("Bad snapshot {}: {}", path.display(), e)))?;
    Ok(Some(snap))
}

/// Load the snapshot with the highest sequence in `dir`.
pub fn load_latest_snapshot(dir: &Path) -> Result<Option<Snapshot>> {
    match latest_sequence(dir)? {
        Some(seq) => load_snapshot(dir, seq),
        None => Ok(None),
    }
}

/// Highest snapshot sequence present in `dir`.
pub fn latest_sequence(dir: &Path) -> Result<Option<u64>> {
    Ok(snapshot_sequences(dir)?.last().copied())
}

/// Every snapshot sequence present in `dir`, ascending.
pub fn snapshot_sequences(dir: &Path) -> Result<Vec<u64>> {
    if !dir.exists() {
        return Ok(Vec::new());
    }

    let mut sequences = Vec::new();
    for entry in fs::read_dir(dir)? {
        let name = entry?.file_name();
        let seq = name
            .to_str()
            .and_then(|s| s.strip_prefix("snapshot_"))
            .and_then(|s| s.strip_suffix(".json"))
            .and_then(|s| s.parse::<u64>().ok());
        if let Some(seq) = seq {
            sequences.push(seq);
        }
    }
    sequences.sort_unstable();
    Ok(sequences)
}

/// Materialize the snapshot's entries as a world state.
pub fn restore_state(snap: &Snapshot) -> MemoryWorldState {
    let mut state = MemoryWorldState::new();
    for entry in &snap.entries {
        state.apply_write(&entry.key, Some(entry.value.as_bytes()));
    }
    state
}

/// True if the snapshot's hash matches the digest of its entries.
pub fn verify_snapshot_hash(snap: &Snapshot) -> bool {
    match state_digest(&restore_state(snap)) {
        Ok(digest) => digest == snap.hash,
        Err(_) => false,
    }
}
