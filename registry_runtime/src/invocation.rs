//! Recorded registry invocations.
//!
//! An `Invocation` is one registry call with its primitive arguments, in
//! the form it is journaled and replayed. `apply` dispatches it to the
//! matching `AssetRegistry` operation and wraps the result in an `Outcome`.

use serde::{Deserialize, Serialize};

use asset_registry::{Asset, AssetRegistry, WorldState};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "function", content = "args", deny_unknown_fields)]
pub enum Invocation {
    InitLedger,
    AssetExists {
        id: String,
    },
    CreateAsset {
        id: String,
        msisdn: String,
        mpin: i64,
        balance: i64,
        status: String,
        dealer: String,
        trans_amount: i64,
        trans_type: String,
        remarks: String,
    },
    ReadAsset {
        id: String,
    },
    UpdateAsset {
        id: String,
        msisdn: String,
        mpin: i64,
        balance: i64,
        status: String,
        dealer: String,
        trans_amount: i64,
        trans_type: String,
        remarks: String,
    },
    DeleteAsset {
        id: String,
    },
    TransferAsset {
        id: String,
        new_dealer: String,
    },
    GetAllAssets,
}

/// Value returned by a successful invocation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Outcome {
    Unit,
    Exists(bool),
    Asset(Asset),
    Assets(Vec<Asset>),
    /// Dealer that held the asset before a transfer.
    PreviousDealer(String),
}

impl Invocation {
    /// Function name as the invocation layer spells it.
    pub fn function_name(&self) -> &'static str {
        match self {
            Invocation::InitLedger => "InitLedger",
            Invocation::AssetExists { .. } => "AssetExists",
            Invocation::CreateAsset { .. } => "CreateAsset",
            Invocation::ReadAsset { .. } => "ReadAsset",
            Invocation::UpdateAsset { .. } => "UpdateAsset",
            Invocation::DeleteAsset { .. } => "DeleteAsset",
            Invocation::TransferAsset { .. } => "TransferAsset",
            Invocation::GetAllAssets => "GetAllAssets",
        }
    }

    /// Run against `state`. Writes land in `state` as the registry issues them.
    pub fn apply<W: WorldState + ?Sized>(
        &self,
        state: &mut W,
    ) -> asset_registry::Result<Outcome> {
        let mut registry = AssetRegistry::new(state);
        match self {
            Invocation::InitLedger => registry.init_ledger().map(|_| Outcome::Unit),
            Invocation::AssetExists { id } => registry.asset_exists(id).map(Outcome::Exists),
            Invocation::CreateAsset {
                id,
                msisdn,
                mpin,
                balance,
                status,
                dealer,
                trans_amount,
                trans_type,
                remarks,
            } => registry
                .create_asset(
                    id,
                    msisdn,
                    *mpin,
                    *balance,
                    status,
                    dealer,
                    *trans_amount,
                    trans_type,
                    remarks,
                )
                .map(|_| Outcome::Unit),
            Invocation::ReadAsset { id } => registry.read_asset(id).map(Outcome::Asset),
            Invocation::UpdateAsset {
                id,
                msisdn,
                mpin,
                balance,
                status,
                dealer,
                trans_amount,
                trans_type,
                remarks,
            } => registry
                .update_asset(
                    id,
                    msisdn,
                    *mpin,
                    *balance,
                    status,
                    dealer,
                    *trans_amount,
                    trans_type,
                    remarks,
                )
                .map(|_| Outcome::Unit),
            Invocation::DeleteAsset { id } => registry.delete_asset(id).map(|_| Outcome::Unit),
            Invocation::TransferAsset { id, new_dealer } => registry
                .transfer_asset(id, new_dealer)
                .map(Outcome::PreviousDealer),
            Invocation::GetAllAssets => registry.get_all_assets().map(Outcome::Assets),
        }
    }

    pub fn to_json(&self) -> serde_json::Result<String> {
        serde_json::to_string(self)
    }

    pub fn from_json(json: &str) -> serde_json::Result<Self> {
        serde_json::from_str(json)
    }
}
