/// Asset Registry — World-State Digest
///
/// SHA-256 over the full key range, in scan order. Replicas holding the
/// same state produce the same digest; this is the value they compare.
///
/// Framing per entry (no separators, no whitespace):
///   [u32 LE key length][key bytes][u32 LE value length][value bytes]

use sha2::{Digest, Sha256};

use crate::error::StoreError;
use crate::world_state::{ScanGuard, WorldState};

/// Lowercase hex SHA-256 of every entry in `state`.
pub fn state_digest<W: WorldState + ?Sized>(state: &W) -> Result<String, StoreError> {
    let mut hasher = Sha256::new();
    let mut scan = ScanGuard::new(state.state_by_range("", "")?);
    for entry in &mut scan {
        let kv = entry?;
        hasher.update(frame_len(kv.key.len())?);
        hasher.update(kv.key.as_bytes());
        hasher.update(frame_len(kv.value.len())?);
        hasher.update(&kv.value);
    }
    scan.close()?;
    Ok(to_hex(&hasher.finalize()))
}

/// Lowercase hex of arbitrary bytes.
pub fn to_hex(bytes: &[u8]) -> String {
    bytes.iter().map(|b| format!("{:02x}", b)).collect()
}

fn frame_len(len: usize) -> Result<[u8; 4], StoreError> {
    u32::try_from(len)
        .map(u32::to_le_bytes)
        .map_err(|_| StoreError::Io(format!("entry of {} bytes exceeds frame limit", len)))
}
