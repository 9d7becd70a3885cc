/// Asset Registry — Core Domain Types
///
/// Pure data. No store access, no encoding rules.
/// All numeric values: i64.

use serde::Deserialize;

/// A dealer asset, the only entity kept in world state.
///
/// `dealer_id` doubles as the world-state key. Field wire names are the
/// upper-case names used by every other implementation of the ledger.
/// Decoding ignores unknown fields and zero-fills missing ones, so records
/// written by other implementations (extra `docType`, absent `REMARKS`) read.
#[derive(Debug, Clone, PartialEq, Eq, Default, Deserialize)]
#[serde(default)]
pub struct Asset {
    #[serde(rename = "DEALERID")]
    pub dealer_id: String,
    #[serde(rename = "MSISDN")]
    pub msisdn: String,
    /// Only seeded assets carry a non-zero PIN; create/update store 0.
    #[serde(rename = "MPIN")]
    pub mpin: i64,
    #[serde(rename = "BALANCE")]
    pub balance: i64,
    #[serde(rename = "STATUS")]
    pub status: String,
    /// Current owning dealer. The only field `transfer_asset` touches.
    #[serde(rename = "DEALER")]
    pub dealer: String,
    #[serde(rename = "TRANSAMOUNT")]
    pub trans_amount: i64,
    #[serde(rename = "TRANSTYPE")]
    pub trans_type: String,
    #[serde(rename = "REMARKS")]
    pub remarks: String,
}

/// One stored world-state entry as yielded by a range scan.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct KeyValue {
    pub key: String,
    pub value: Vec<u8>,
}

impl KeyValue {
    pub fn new(key: impl Into<String>, value: impl Into<Vec<u8>>) -> Self {
        Self {
            key: key.into(),
            value: value.into(),
        }
    }
}
