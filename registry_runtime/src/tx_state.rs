//! Per-invocation transaction overlay.
//!
//! `TxState` buffers every put and delete of one invocation on top of the
//! committed world state. Reads see the invocation's own writes. Nothing
//! reaches committed state until the caller takes the `WriteSet` and
//! applies it, so a failed invocation leaves no trace.

use std::collections::BTreeMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

use asset_registry::memory::SnapshotScan;
use asset_registry::world_state::key_in_range;
use asset_registry::{KeyValue, MemoryWorldState, StateScan, StoreError, WorldState};

use crate::error::{Result, RuntimeError};
use crate::proto_types::ProtoWrite;

pub struct TxState<'a> {
    committed: &'a MemoryWorldState,
    writes: BTreeMap<String, Option<Vec<u8>>>,
    open_scans: Arc<AtomicUsize>,
}

impl<'a> TxState<'a> {
    pub fn new(committed: &'a MemoryWorldState) -> Self {
        Self {
            committed,
            writes: BTreeMap::new(),
            open_scans: Arc::default(),
        }
    }

    pub fn open_scans(&self) -> usize {
        self.open_scans.load(Ordering::SeqCst)
    }

    pub fn into_write_set(self) -> WriteSet {
        WriteSet {
            writes: self.writes,
        }
    }
}

impl WorldState for TxState<'_> {
    fn get_state(&self, key: &str) -> std::result::Result<Option<Vec<u8>>, StoreError> {
        match self.writes.get(key) {
            Some(pending) => Ok(pending.clone()),
            None => self.committed.get_state(key),
        }
    }

    fn put_state(&mut self, key: &str, value: &[u8]) -> std::result::Result<(), StoreError> {
        self.writes.insert(key.to_string(), Some(value.to_vec()));
        Ok(())
    }

    fn del_state(&mut self, key: &str) -> std::result::Result<(), StoreError> {
        self.writes.insert(key.to_string(), None);
        Ok(())
    }

    fn state_by_range<'s>(
        &'s self,
        start_key: &str,
        end_key: &str,
    ) -> std::result::Result<Box<dyn StateScan + 's>, StoreError> {
        let mut merged: BTreeMap<String, Vec<u8>> = self
            .committed
            .range_entries(start_key, end_key)
            .into_iter()
            .map(|kv| (kv.key, kv.value))
            .collect();
        for (key, pending) in &self.writes {
            if !key_in_range(key, start_key, end_key) {
                continue;
            }
            match pending {
                Some(value) => {
                    merged.insert(key.clone(), value.clone());
                }
                None => {
                    merged.remove(key);
                }
            }
        }
        let items = merged
            .into_iter()
            .map(|(key, value)| KeyValue { key, value })
            .collect();
        Ok(Box::new(SnapshotScan::new(items, Arc::clone(&self.open_scans))))
    }
}

/// Key-ordered writes of one invocation. `None` is a delete.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct WriteSet {
    writes: BTreeMap<String, Option<Vec<u8>>>,
}

impl WriteSet {
    pub fn is_empty(&self) -> bool {
        self.writes.is_empty()
    }

    pub fn len(&self) -> usize {
        self.writes.len()
    }

    pub fn apply_to(&self, state: &mut MemoryWorldState) {
        for (key, value) in &self.writes {
            state.apply_write(key, value.as_deref());
        }
    }

    pub fn to_proto(&self) -> Vec<ProtoWrite> {
        self.writes
            .iter()
            .map(|(key, value)| ProtoWrite {
                key: key.clone(),
                value: value.clone().unwrap_or_default(),
                is_delete: value.is_none(),
            })
            .collect()
    }

    /// Rebuild from journal records. Keys must be strictly increasing.
    pub fn from_proto(writes: &[ProtoWrite]) -> Result<Self> {
        let mut out = BTreeMap::new();
        let mut last: Option<&str> = None;
        for w in writes {
            if last.is_some_and(|prev| prev >= w.key.as_str()) {
                return Err(RuntimeError::Journal(format!(
                    "write set keys out of order at {:?}",
                    w.key
                )));
            }
            last = Some(w.key.as_str());
            let value = if w.is_delete {
                None
            } else {
                Some(w.value.clone())
            };
            out.insert(w.key.clone(), value);
        }
        Ok(Self { writes: out })
    }
}
