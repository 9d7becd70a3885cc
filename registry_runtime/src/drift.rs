//! Drift detection — determinism verification and state comparison.

use std::collections::BTreeSet;

use asset_registry::MemoryWorldState;

use crate::error::{Result, RuntimeError};
use crate::invocation::Invocation;
use crate::proto_types::ProtoCommit;
use crate::replay;

/// Execute the same invocations twice on fresh states and require
/// identical digests. Returns the agreed digest.
pub fn verify_determinism(invocations: &[Invocation]) -> Result<String> {
    let (_, first) = replay::run_invocations(invocations)?;
    let (_, second) = replay::run_invocations(invocations)?;
    if first != second {
        return Err(RuntimeError::Determinism { first, second });
    }
    Ok(first)
}

/// Check a journal three ways: recorded write sets, re-executed
/// invocations, and the digest stored with the last commit must agree.
pub fn verify_journal(commits: &[ProtoCommit]) -> Result<String> {
    let (_, recorded) = replay::rebuild_state(commits)?;
    let (_, reexecuted) = replay::reexecute(commits)?;
    if recorded != reexecuted {
        return Err(RuntimeError::Determinism {
            first: recorded,
            second: reexecuted,
        });
    }
    if let Some(last) = commits.last() {
        if last.state_digest != recorded {
            return Err(RuntimeError::Determinism {
                first: last.state_digest.clone(),
                second: recorded,
            });
        }
    }
    Ok(recorded)
}

/// Key-level comparison of two world states.
pub fn compare_states(state_a: &MemoryWorldState, state_b: &MemoryWorldState) -> DriftReport {
    let keys_a: BTreeSet<&str> = state_a.entries().keys().map(|s| s.as_str()).collect();
    let keys_b: BTreeSet<&str> = state_b.entries().keys().map(|s| s.as_str()).collect();

    let added_keys: Vec<String> = keys_b.difference(&keys_a).map(|s| s.to_string()).collect();
    let removed_keys: Vec<String> = keys_a.difference(&keys_b).map(|s| s.to_string()).collect();
    let changed_keys: Vec<String> = keys_a
        .intersection(&keys_b)
        .filter(|k| state_a.entries()[**k] != state_b.entries()[**k])
        .map(|s| s.to_string())
        .collect();

    DriftReport {
        entry_count_a: state_a.len() as i64,
        entry_count_b: state_b.len() as i64,
        entry_count_delta: state_b.len() as i64 - state_a.len() as i64,
        added_keys,
        removed_keys,
        changed_keys,
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DriftReport {
    pub entry_count_a: i64,
    pub entry_count_b: i64,
    pub entry_count_delta: i64,
    pub added_keys: Vec<String>,
    pub removed_keys: Vec<String>,
    pub changed_keys: Vec<String>,
}

impl DriftReport {
    /// No key added, removed or changed.
    pub fn is_clean(&self) -> bool {
        self.added_keys.is_empty() && self.removed_keys.is_empty() && self.changed_keys.is_empty()
    }
}
