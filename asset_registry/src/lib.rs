#![forbid(unsafe_code)]

//! Asset Registry — deterministic core.
//!
//! Canonical asset encoding plus the registry operations, written against
//! an injected world-state gateway. Identical prior state and identical
//! arguments give byte-identical writes on every node.

pub mod codec;
pub mod domain;
pub mod error;
pub mod hashing;
pub mod memory;
pub mod registry;
pub mod seed;
pub mod world_state;

pub use domain::{Asset, KeyValue};
pub use error::{CodecError, RegistryError, Result, StoreError};
pub use memory::MemoryWorldState;
pub use registry::AssetRegistry;
pub use world_state::{ScanGuard, StateScan, WorldState};
