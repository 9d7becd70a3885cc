//! In-memory world state.
//!
//! Ordered map keyed by UTF-8 byte order, the same order a replicated
//! store yields from a range scan. Scans iterate a point-in-time copy of
//! the matching entries. Open cursors are counted so callers can check
//! that every scan was released.

use std::collections::BTreeMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

use crate::domain::KeyValue;
use crate::error::StoreError;
use crate::world_state::{key_in_range, StateScan, WorldState};

#[derive(Debug, Default)]
pub struct MemoryWorldState {
    entries: BTreeMap<String, Vec<u8>>,
    open_scans: Arc<AtomicUsize>,
}

impl Clone for MemoryWorldState {
    /// Copies the entries only; the clone starts with no open scans.
    fn clone(&self) -> Self {
        Self {
            entries: self.entries.clone(),
            open_scans: Arc::default(),
        }
    }
}

impl MemoryWorldState {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of scans handed out and not yet closed.
    pub fn open_scans(&self) -> usize {
        self.open_scans.load(Ordering::SeqCst)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Committed entries in key order.
    pub fn entries(&self) -> &BTreeMap<String, Vec<u8>> {
        &self.entries
    }

    /// Entries inside `[start_key, end_key)`, empty bounds open.
    pub fn range_entries(&self, start_key: &str, end_key: &str) -> Vec<KeyValue> {
        self.entries
            .iter()
            .filter(|(k, _)| key_in_range(k, start_key, end_key))
            .map(|(k, v)| KeyValue::new(k.clone(), v.clone()))
            .collect()
    }

    /// Apply one write directly; `None` deletes.
    pub fn apply_write(&mut self, key: &str, value: Option<&[u8]>) {
        match value {
            Some(v) => {
                self.entries.insert(key.to_string(), v.to_vec());
            }
            None => {
                self.entries.remove(key);
            }
        }
    }
}

impl WorldState for MemoryWorldState {
    fn get_state(&self, key: &str) -> Result<Option<Vec<u8>>, StoreError> {
        Ok(self.entries.get(key).cloned())
    }

    fn put_state(&mut self, key: &str, value: &[u8]) -> Result<(), StoreError> {
        self.apply_write(key, Some(value));
        Ok(())
    }

    fn del_state(&mut self, key: &str) -> Result<(), StoreError> {
        self.apply_write(key, None);
        Ok(())
    }

    fn state_by_range<'a>(
        &'a self,
        start_key: &str,
        end_key: &str,
    ) -> Result<Box<dyn StateScan + 'a>, StoreError> {
        Ok(Box::new(SnapshotScan::new(
            self.range_entries(start_key, end_key),
            Arc::clone(&self.open_scans),
        )))
    }
}

/// Cursor over a materialized entry list.
///
/// Counted in `open` until `close` is called.
pub struct SnapshotScan {
    items: std::vec::IntoIter<KeyValue>,
    open: Arc<AtomicUsize>,
    closed: bool,
}

impl SnapshotScan {
    pub fn new(items: Vec<KeyValue>, open: Arc<AtomicUsize>) -> Self {
        open.fetch_add(1, Ordering::SeqCst);
        Self {
            items: items.into_iter(),
            open,
            closed: false,
        }
    }

    fn release(&mut self) {
        if !self.closed {
            self.closed = true;
            self.open.fetch_sub(1, Ordering::SeqCst);
        }
    }
}

impl StateScan for SnapshotScan {
    fn next_entry(&mut self) -> Option<Result<KeyValue, StoreError>> {
        if self.closed {
            return Some(Err(StoreError::Io("scan already closed".to_string())));
        }
        self.items.next().map(Ok)
    }

    fn close(&mut self) -> Result<(), StoreError> {
        self.release();
        Ok(())
    }
}
