//! Runtime error type.

use asset_registry::{RegistryError, StoreError};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum RuntimeError {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error(transparent)]
    Registry(#[from] RegistryError),

    #[error("world state error: {0}")]
    Store(#[from] StoreError),

    #[error("journal error: {0}")]
    Journal(String),

    #[error("snapshot error: {0}")]
    Snapshot(String),

    #[error("config error: {0}")]
    Config(String),

    #[error("determinism failure: run 1 = {first}, run 2 = {second}")]
    Determinism { first: String, second: String },
}

impl RuntimeError {
    /// The registry error behind this failure, if any.
    pub fn registry(&self) -> Option<&RegistryError> {
        match self {
            RuntimeError::Registry(err) => Some(err),
            _ => None,
        }
    }
}

pub type Result<T> = std::result::Result<T, RuntimeError>;
