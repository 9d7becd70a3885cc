//! Error types for the registry core.

use thiserror::Error;

/// Failure reported by a world-state gateway.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum StoreError {
    #[error("world state I/O failure: {0}")]
    Io(String),
}

/// Canonical codec failures.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CodecError {
    #[error("encode failed: {0}")]
    Encode(String),

    /// Bytes are not a JSON object of asset fields (bad JSON or a
    /// mistyped field).
    #[error("malformed asset data: {0}")]
    Malformed(String),
}

/// Errors returned by registry operations.
///
/// Store and codec failures keep the operation name and key they happened
/// under; the kind is never changed on the way out.
#[derive(Debug, Error)]
pub enum RegistryError {
    #[error("the asset {0} does not exist")]
    NotFound(String),

    #[error("the asset {0} already exists")]
    AlreadyExists(String),

    #[error("{op}: world state access failed for key {key:?}: {source}")]
    StoreIo {
        op: &'static str,
        key: String,
        #[source]
        source: StoreError,
    },

    #[error("{op}: bad asset data under key {key:?}: {source}")]
    MalformedData {
        op: &'static str,
        key: String,
        #[source]
        source: CodecError,
    },
}

impl RegistryError {
    pub(crate) fn store(op: &'static str, key: &str, source: StoreError) -> Self {
        RegistryError::StoreIo {
            op,
            key: key.to_string(),
            source,
        }
    }

    pub(crate) fn codec(op: &'static str, key: &str, source: CodecError) -> Self {
        RegistryError::MalformedData {
            op,
            key: key.to_string(),
            source,
        }
    }

    pub fn is_not_found(&self) -> bool {
        matches!(self, RegistryError::NotFound(_))
    }

    pub fn is_already_exists(&self) -> bool {
        matches!(self, RegistryError::AlreadyExists(_))
    }
}

/// Result type alias for registry operations.
pub type Result<T> = std::result::Result<T, RegistryError>;
