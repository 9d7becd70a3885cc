/// Asset Registry — Operations
///
/// ALL world-state mutation lives here.
/// Every operation is a pure function of (world state, arguments):
/// no clocks, no randomness, no local locking, no retries.
///
/// The registry borrows its gateway for one invocation only. Concurrent
/// writers to the same key are resolved by the hosting store, not here.

use crate::codec::{decode_asset, encode_asset};
use crate::domain::Asset;
use crate::error::{RegistryError, Result};
use crate::seed::seed_assets;
use crate::world_state::{ScanGuard, WorldState};

/// Registry operations bound to one borrowed world-state handle.
pub struct AssetRegistry<'a, W: WorldState + ?Sized> {
    state: &'a mut W,
}

impl<'a, W: WorldState + ?Sized> AssetRegistry<'a, W> {
    pub fn new(state: &'a mut W) -> Self {
        Self { state }
    }

    /// Seed the five demonstration assets, overwriting any existing value.
    ///
    /// Stops at the first failure. Puts already issued are not undone.
    pub fn init_ledger(&mut self) -> Result<()> {
        for asset in seed_assets() {
            self.put_asset("init_ledger", &asset)?;
        }
        tracing::debug!("seeded demonstration assets");
        Ok(())
    }

    /// True when a non-empty value is stored under `id`.
    pub fn asset_exists(&self, id: &str) -> Result<bool> {
        let raw = self
            .state
            .get_state(id)
            .map_err(|e| RegistryError::store("asset_exists", id, e))?;
        Ok(raw.is_some_and(|v| !v.is_empty()))
    }

    /// Issue a new asset.
    ///
    /// `mpin` is accepted but not stored: the persisted PIN is 0.
    #[allow(clippy::too_many_arguments)]
    pub fn create_asset(
        &mut self,
        id: &str,
        msisdn: &str,
        mpin: i64,
        balance: i64,
        status: &str,
        dealer: &str,
        trans_amount: i64,
        trans_type: &str,
        remarks: &str,
    ) -> Result<()> {
        if self.asset_exists(id)? {
            return Err(RegistryError::AlreadyExists(id.to_string()));
        }
        let asset = build_asset(
            id,
            msisdn,
            mpin,
            balance,
            status,
            dealer,
            trans_amount,
            trans_type,
            remarks,
        );
        self.put_asset("create_asset", &asset)?;
        tracing::debug!(key = id, "asset created");
        Ok(())
    }

    pub fn read_asset(&self, id: &str) -> Result<Asset> {
        let raw = self
            .state
            .get_state(id)
            .map_err(|e| RegistryError::store("read_asset", id, e))?;
        match raw {
            Some(bytes) if !bytes.is_empty() => {
                decode_asset(&bytes).map_err(|e| RegistryError::codec("read_asset", id, e))
            }
            _ => Err(RegistryError::NotFound(id.to_string())),
        }
    }

    /// Overwrite an existing asset with the given values. Nothing from the
    /// stored asset is kept; `mpin` is dropped as in `create_asset`.
    #[allow(clippy::too_many_arguments)]
    pub fn update_asset(
        &mut self,
        id: &str,
        msisdn: &str,
        mpin: i64,
        balance: i64,
        status: &str,
        dealer: &str,
        trans_amount: i64,
        trans_type: &str,
        remarks: &str,
    ) -> Result<()> {
        if !self.asset_exists(id)? {
            return Err(RegistryError::NotFound(id.to_string()));
        }
        let asset = build_asset(
            id,
            msisdn,
            mpin,
            balance,
            status,
            dealer,
            trans_amount,
            trans_type,
            remarks,
        );
        self.put_asset("update_asset", &asset)?;
        tracing::debug!(key = id, "asset updated");
        Ok(())
    }

    pub fn delete_asset(&mut self, id: &str) -> Result<()> {
        if !self.asset_exists(id)? {
            return Err(RegistryError::NotFound(id.to_string()));
        }
        self.state
            .del_state(id)
            .map_err(|e| RegistryError::store("delete_asset", id, e))?;
        tracing::debug!(key = id, "asset deleted");
        Ok(())
    }

    /// Hand the asset to `new_dealer` and return the previous dealer.
    ///
    /// Plain read-modify-write. Interleaving with other writers is detected
    /// by the store's read/write-set versioning at commit time.
    pub fn transfer_asset(&mut self, id: &str, new_dealer: &str) -> Result<String> {
        let mut asset = self.read_asset(id)?;
        let old_dealer = std::mem::replace(&mut asset.dealer, new_dealer.to_string());
        self.put_asset("transfer_asset", &asset)?;
        tracing::debug!(key = id, from = %old_dealer, to = new_dealer, "asset transferred");
        Ok(old_dealer)
    }

    /// Every stored asset, in store key order.
    ///
    /// One undecodable entry fails the whole call. The scan is closed by
    /// its guard on every return path.
    pub fn get_all_assets(&self) -> Result<Vec<Asset>> {
        let scan = self
            .state
            .state_by_range("", "")
            .map_err(|e| RegistryError::store("get_all_assets", "", e))?;
        let mut scan = ScanGuard::new(scan);

        let mut assets = Vec::new();
        for entry in &mut scan {
            let kv = entry.map_err(|e| RegistryError::store("get_all_assets", "", e))?;
            let asset = decode_asset(&kv.value)
                .map_err(|e| RegistryError::codec("get_all_assets", &kv.key, e))?;
            assets.push(asset);
        }
        scan.close()
            .map_err(|e| RegistryError::store("get_all_assets", "", e))?;
        Ok(assets)
    }

    fn put_asset(&mut self, op: &'static str, asset: &Asset) -> Result<()> {
        let key = asset.dealer_id.as_str();
        let bytes = encode_asset(asset).map_err(|e| RegistryError::codec(op, key, e))?;
        self.state
            .put_state(key, &bytes)
            .map_err(|e| RegistryError::store(op, key, e))
    }
}

#[allow(clippy::too_many_arguments)]
fn build_asset(
    id: &str,
    msisdn: &str,
    _mpin: i64,
    balance: i64,
    status: &str,
    dealer: &str,
    trans_amount: i64,
    trans_type: &str,
    remarks: &str,
) -> Asset {
    Asset {
        dealer_id: id.to_string(),
        msisdn: msisdn.to_string(),
        mpin: 0,
        balance,
        status: status.to_string(),
        dealer: dealer.to_string(),
        trans_amount,
        trans_type: trans_type.to_string(),
        remarks: remarks.to_string(),
    }
}
