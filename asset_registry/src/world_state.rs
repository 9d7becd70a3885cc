//! World-state gateway contract.
//!
//! The registry never owns storage. Every operation borrows a gateway for
//! the length of one invocation and talks to it through [`WorldState`].
//!
//! Range scans hand out a [`StateScan`] cursor that must be closed. The
//! registry wraps every cursor in a [`ScanGuard`], which closes it on drop,
//! so no exit path can leak it.

use crate::domain::KeyValue;
use crate::error::StoreError;

/// Key-value store the registry reads and writes.
pub trait WorldState {
    /// Value stored under `key`, or `None` if absent.
    fn get_state(&self, key: &str) -> Result<Option<Vec<u8>>, StoreError>;

    fn put_state(&mut self, key: &str, value: &[u8]) -> Result<(), StoreError>;

    fn del_state(&mut self, key: &str) -> Result<(), StoreError>;

    /// Ordered scan over `[start_key, end_key)`. An empty bound is open.
    fn state_by_range<'a>(
        &'a self,
        start_key: &str,
        end_key: &str,
    ) -> Result<Box<dyn StateScan + 'a>, StoreError>;
}

/// Lazy, finite, non-restartable cursor over stored entries.
pub trait StateScan {
    /// Next entry in key order; `None` once exhausted.
    fn next_entry(&mut self) -> Option<Result<KeyValue, StoreError>>;

    /// Release the underlying cursor. Called exactly once by [`ScanGuard`].
    fn close(&mut self) -> Result<(), StoreError>;
}

/// Owning guard for an open scan. Closes the cursor when dropped.
pub struct ScanGuard<'a> {
    scan: Box<dyn StateScan + 'a>,
    closed: bool,
}

impl<'a> ScanGuard<'a> {
    pub fn new(scan: Box<dyn StateScan + 'a>) -> Self {
        Self {
            scan,
            closed: false,
        }
    }

    /// Close now and surface the close error.
    pub fn close(mut self) -> Result<(), StoreError> {
        self.closed = true;
        self.scan.close()
    }
}

impl Iterator for ScanGuard<'_> {
    type Item = Result<KeyValue, StoreError>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.closed {
            return None;
        }
        self.scan.next_entry()
    }
}

impl Drop for ScanGuard<'_> {
    fn drop(&mut self) {
        if self.closed {
            return;
        }
        self.closed = true;
        if let Err(err) = self.scan.close() {
            tracing::warn!(error = %err, "range scan failed to close");
        }
    }
}

/// True when `key` falls inside `[start_key, end_key)` with empty bounds open.
pub fn key_in_range(key: &str, start_key: &str, end_key: &str) -> bool {
    (start_key.is_empty() || key >= start_key) && (end_key.is_empty() || key < end_key)
}
