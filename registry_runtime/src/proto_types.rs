//! Hand-written protobuf types for the commit journal.
//!
//! Uses prost derive macros for encode/decode without prost-build.
//! Field numbers are the on-disk schema; never renumber.

use prost::Message;

// ── Commit ─────────────────────────────────────────────────────

/// One committed invocation: its write set and the resulting digest.
#[derive(Clone, PartialEq, Message)]
pub struct ProtoCommit {
    #[prost(uint64, tag = "1")]
    pub sequence: u64,
    /// JSON of the recorded `Invocation`.
    #[prost(string, tag = "2")]
    pub invocation: String,
    #[prost(message, repeated, tag = "3")]
    pub writes: Vec<ProtoWrite>,
    /// World-state digest after applying `writes`.
    #[prost(string, tag = "4")]
    pub state_digest: String,
}

// ── Write ──────────────────────────────────────────────────────

#[derive(Clone, PartialEq, Message)]
pub struct ProtoWrite {
    #[prost(string, tag = "1")]
    pub key: String,
    #[prost(bytes = "vec", tag = "2")]
    pub value: Vec<u8>,
    #[prost(bool, tag = "3")]
    pub is_delete: bool,
}
