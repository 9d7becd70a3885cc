#![forbid(unsafe_code)]

//! Asset Registry — Runtime
//!
//! Wraps the deterministic registry core with per-invocation write sets,
//! a commit journal, snapshots, replay and drift detection.
//!
//! No registry logic lives here. Every operation is delegated to
//! `asset_registry::AssetRegistry`.

pub mod config;
pub mod drift;
pub mod error;
pub mod invocation;
pub mod journal;
pub mod proto_types;
pub mod replay;
pub mod session;
pub mod snapshot;
pub mod tx_state;

pub use config::RuntimeConfig;
pub use error::RuntimeError;
pub use invocation::{Invocation, Outcome};
pub use session::Session;
