/// Asset Registry — Canonical Codec
///
/// Deterministic Asset <-> bytes.
/// Produces byte-identical output on every node for equal assets.
///
/// Rules:
///   - UTF-8 JSON, no whitespace, integers only
///   - Keys are the upper-case wire names in alphabetical order:
///     BALANCE, DEALER, DEALERID, MPIN, MSISDN, REMARKS, STATUS,
///     TRANSAMOUNT, TRANSTYPE
///   - Decoding is lenient on shape: unknown fields are ignored, missing
///     fields take zero values. Invalid JSON or a mistyped field is Malformed

use serde_json::{Map, Value};

use crate::domain::Asset;
use crate::error::CodecError;

/// Wire field names in encoding order. Must stay sorted.
pub const FIELD_ORDER: [&str; 9] = [
    "BALANCE",
    "DEALER",
    "DEALERID",
    "MPIN",
    "MSISDN",
    "REMARKS",
    "STATUS",
    "TRANSAMOUNT",
    "TRANSTYPE",
];

/// Canonical serialization of an Asset to UTF-8 JSON bytes.
pub fn encode_asset(asset: &Asset) -> Result<Vec<u8>, CodecError> {
    let value = build_canonical_value(asset);
    serde_json::to_vec(&value).map_err(|e| CodecError::Encode(e.to_string()))
}

/// Decode canonical bytes back into an Asset.
///
/// Key order in the input is not checked. Unknown keys are skipped and
/// absent keys decode as `0` or `""`.
pub fn decode_asset(bytes: &[u8]) -> Result<Asset, CodecError> {
    serde_json::from_slice::<Asset>(bytes).map_err(|e| CodecError::Malformed(e.to_string()))
}

/// Build the canonical serde_json::Value in strict field order.
///
/// serde_json::Map preserves insertion order (`preserve_order`), so the
/// insertion sequence below is the byte order on the wire. It matches
/// `FIELD_ORDER`.
fn build_canonical_value(asset: &Asset) -> Value {
    let mut root = Map::new();
    root.insert("BALANCE".to_string(), Value::Number(asset.balance.into()));
    root.insert("DEALER".to_string(), Value::String(asset.dealer.clone()));
    root.insert(
        "DEALERID".to_string(),
        Value::String(asset.dealer_id.clone()),
    );
    root.insert("MPIN".to_string(), Value::Number(asset.mpin.into()));
    root.insert("MSISDN".to_string(), Value::String(asset.msisdn.clone()));
    root.insert("REMARKS".to_string(), Value::String(asset.remarks.clone()));
    root.insert("STATUS".to_string(), Value::String(asset.status.clone()));
    root.insert(
        "TRANSAMOUNT".to_string(),
        Value::Number(asset.trans_amount.into()),
    );
    root.insert(
        "TRANSTYPE".to_string(),
        Value::String(asset.trans_type.clone()),
    );
    Value::Object(root)
}
