//! Integration tests for the registry operations.
//!
//! `FaultyState` wraps the in-memory store and fails chosen gateway calls,
//! so error kinds and scan release can be checked on every exit path.

use asset_registry::error::{CodecError, StoreError};
use asset_registry::{
    AssetRegistry, KeyValue, MemoryWorldState, RegistryError, StateScan, WorldState,
};

#[derive(Default)]
struct Faults {
    get: bool,
    /// Fail the put with this zero-based index.
    put_at: Option<usize>,
    del: bool,
    scan_open: bool,
    /// Fail the scan advance at this zero-based position.
    scan_at: Option<usize>,
    /// Fail the scan close, after releasing the inner cursor.
    scan_close: bool,
}

struct FaultyState {
    inner: MemoryWorldState,
    faults: Faults,
    puts: usize,
}

impl FaultyState {
    fn new(inner: MemoryWorldState, faults: Faults) -> Self {
        Self {
            inner,
            faults,
            puts: 0,
        }
    }
}

fn io(what: &str) -> StoreError {
    StoreError::Io(format!("injected {} failure", what))
}

impl WorldState for FaultyState {
    fn get_state(&self, key: &str) -> Result<Option<Vec<u8>>, StoreError> {
        if self.faults.get {
            return Err(io("get"));
        }
        self.inner.get_state(key)
    }

    fn put_state(&mut self, key: &str, value: &[u8]) -> Result<(), StoreError> {
        let index = self.puts;
        self.puts += 1;
        if self.faults.put_at == Some(index) {
            return Err(io("put"));
        }
        self.inner.put_state(key, value)
    }

    fn del_state(&mut self, key: &str) -> Result<(), StoreError> {
        if self.faults.del {
            return Err(io("delete"));
        }
        self.inner.del_state(key)
    }

    fn state_by_range<'a>(
        &'a self,
        start_key: &str,
        end_key: &str,
    ) -> Result<Box<dyn StateScan + 'a>, StoreError> {
        if self.faults.scan_open {
            return Err(io("scan open"));
        }
        Ok(Box::new(FaultyScan {
            inner: self.inner.state_by_range(start_key, end_key)?,
            fail_at: self.faults.scan_at,
            fail_close: self.faults.scan_close,
            position: 0,
        }))
    }
}

struct FaultyScan<'a> {
    inner: Box<dyn StateScan + 'a>,
    fail_at: Option<usize>,
    fail_close: bool,
    position: usize,
}

impl StateScan for FaultyScan<'_> {
    fn next_entry(&mut self) -> Option<Result<KeyValue, StoreError>> {
        let position = self.position;
        self.position += 1;
        if self.fail_at == Some(position) {
            return Some(Err(io("scan advance")));
        }
        self.inner.next_entry()
    }

    fn close(&mut self) -> Result<(), StoreError> {
        self.inner.close()?;
        if self.fail_close {
            return Err(io("scan close"));
        }
        Ok(())
    }
}

fn seeded() -> MemoryWorldState {
    let mut ws = MemoryWorldState::new();
    AssetRegistry::new(&mut ws).init_ledger().unwrap();
    ws
}

fn create(
    ws: &mut MemoryWorldState,
    id: &str,
    balance: i64,
    dealer: &str,
) -> asset_registry::Result<()> {
    AssetRegistry::new(ws).create_asset(
        id,
        "+911234567890",
        1,
        balance,
        "ACTIVE",
        dealer,
        10,
        "TO",
        "note",
    )
}

// ─────────────────────────────────────────────────────────────
// Behaviour
// ─────────────────────────────────────────────────────────────

#[test]
fn create_read_update_scenario() {
    let mut ws = MemoryWorldState::new();
    create(&mut ws, "D100", 500, "DEALER7").unwrap();

    let asset = AssetRegistry::new(&mut ws).read_asset("D100").unwrap();
    assert_eq!(asset.dealer, "DEALER7");
    assert_eq!(asset.balance, 500);

    AssetRegistry::new(&mut ws)
        .update_asset(
            "D100",
            "+911234567890",
            1,
            600,
            "ACTIVE",
            "DEALER7",
            10,
            "TO",
            "note",
        )
        .unwrap();
    let asset = AssetRegistry::new(&mut ws).read_asset("D100").unwrap();
    assert_eq!(asset.balance, 600);
    assert_eq!(asset.mpin, 0);
}

#[test]
fn update_is_full_overwrite() {
    let mut ws = seeded();
    AssetRegistry::new(&mut ws)
        .update_asset("DEALER_1", "", 77, 5, "SUSPENDED", "DEALER2", 0, "", "")
        .unwrap();
    let asset = AssetRegistry::new(&mut ws).read_asset("DEALER_1").unwrap();
    assert_eq!(asset.msisdn, "");
    assert_eq!(asset.mpin, 0, "seeded pin is not carried over");
    assert_eq!(asset.remarks, "");
    assert_eq!(asset.status, "SUSPENDED");
}

#[test]
fn missing_guards_return_not_found() {
    let mut ws = MemoryWorldState::new();
    let mut reg = AssetRegistry::new(&mut ws);
    assert!(matches!(reg.read_asset("X"), Err(RegistryError::NotFound(id)) if id == "X"));
    assert!(reg
        .update_asset("X", "", 0, 0, "", "", 0, "", "")
        .unwrap_err()
        .is_not_found());
    assert!(reg.delete_asset("X").unwrap_err().is_not_found());
    assert!(!reg.asset_exists("X").unwrap());
}

#[test]
fn second_create_is_already_exists() {
    let mut ws = MemoryWorldState::new();
    create(&mut ws, "D1", 1, "A").unwrap();
    match create(&mut ws, "D1", 2, "B") {
        Err(RegistryError::AlreadyExists(id)) => assert_eq!(id, "D1"),
        other => panic!("Expected AlreadyExists, got: {:?}", other),
    }
    let asset = AssetRegistry::new(&mut ws).read_asset("D1").unwrap();
    assert_eq!(asset.balance, 1, "failed create must not overwrite");
}

#[test]
fn delete_then_read_is_not_found() {
    let mut ws = seeded();
    AssetRegistry::new(&mut ws).delete_asset("DEALER_3").unwrap();
    let reg = AssetRegistry::new(&mut ws);
    assert!(reg.read_asset("DEALER_3").unwrap_err().is_not_found());
    assert!(!reg.asset_exists("DEALER_3").unwrap());
    assert_eq!(reg.get_all_assets().unwrap().len(), 4);
}

#[test]
fn transfer_returns_previous_dealer() {
    let mut ws = MemoryWorldState::new();
    create(&mut ws, "D1", 1, "DEALER1").unwrap();
    let old = AssetRegistry::new(&mut ws)
        .transfer_asset("D1", "DEALER9")
        .unwrap();
    assert_eq!(old, "DEALER1");
    let asset = AssetRegistry::new(&mut ws).read_asset("D1").unwrap();
    assert_eq!(asset.dealer, "DEALER9");
}

#[test]
fn init_then_list_returns_seed() {
    let mut ws = seeded();
    let assets = AssetRegistry::new(&mut ws).get_all_assets().unwrap();
    let ids: Vec<&str> = assets.iter().map(|a| a.dealer_id.as_str()).collect();
    assert_eq!(
        ids,
        vec!["DEALER_1", "DEALER_2", "DEALER_3", "DEALER_4", "DEALER_5"]
    );
    assert!(assets.iter().all(|a| a.balance == 1000 && a.status == "ACTIVE"));
    assert_eq!(ws.open_scans(), 0);
}

#[test]
fn list_follows_key_order_not_insertion_order() {
    let mut ws = MemoryWorldState::new();
    create(&mut ws, "C", 0, "x").unwrap();
    create(&mut ws, "A", 0, "x").unwrap();
    create(&mut ws, "B", 0, "x").unwrap();
    let ids: Vec<String> = AssetRegistry::new(&mut ws)
        .get_all_assets()
        .unwrap()
        .into_iter()
        .map(|a| a.dealer_id)
        .collect();
    assert_eq!(ids, vec!["A", "B", "C"]);
}

#[test]
fn list_on_empty_store_is_empty() {
    let mut ws = MemoryWorldState::new();
    assert!(AssetRegistry::new(&mut ws).get_all_assets().unwrap().is_empty());
}

#[test]
fn records_from_other_implementations_read_and_list() {
    let mut ws = seeded();
    let record = concat!(
        r#"{"BALANCE":1000,"DEALER":"DEALER2","DEALERID":"DEALER_2","MPIN":1001,"#,
        r#""MSISDN":"+91000000002","STATUS":"ACTIVE","TRANSAMOUNT":10,"#,
        r#""TRANSTYPE":"TO","docType":"asset"}"#
    );
    ws.put_state("DEALER_2", record.as_bytes()).unwrap();

    let mut reg = AssetRegistry::new(&mut ws);
    let asset = reg.read_asset("DEALER_2").unwrap();
    assert_eq!(asset.dealer, "DEALER2");
    assert_eq!(asset.remarks, "");
    assert_eq!(reg.get_all_assets().unwrap().len(), 5);

    assert_eq!(reg.transfer_asset("DEALER_2", "DEALER9").unwrap(), "DEALER2");
    assert_eq!(reg.read_asset("DEALER_2").unwrap().mpin, 1001);
    assert_eq!(ws.open_scans(), 0);
}

// ─────────────────────────────────────────────────────────────
// Failure propagation and scan release
// ─────────────────────────────────────────────────────────────

#[test]
fn list_aborts_on_corrupt_entry_and_releases_scan() {
    let mut ws = seeded();
    ws.put_state("DEALER_3", b"not json").unwrap();
    let result = AssetRegistry::new(&mut ws).get_all_assets();
    match result {
        Err(RegistryError::MalformedData { op, key, source }) => {
            assert_eq!(op, "get_all_assets");
            assert_eq!(key, "DEALER_3");
            assert!(matches!(source, CodecError::Malformed(_)));
        }
        other => panic!("Expected MalformedData, got: {:?}", other),
    }
    assert_eq!(ws.open_scans(), 0);
}

#[test]
fn list_aborts_on_scan_advance_failure_and_releases_scan() {
    let mut state = FaultyState::new(
        seeded(),
        Faults {
            scan_at: Some(2),
            ..Faults::default()
        },
    );
    let result = AssetRegistry::new(&mut state).get_all_assets();
    assert!(matches!(result, Err(RegistryError::StoreIo { op: "get_all_assets", .. })));
    assert_eq!(state.inner.open_scans(), 0);
}

#[test]
fn list_surfaces_close_failure_after_full_scan() {
    let mut state = FaultyState::new(
        seeded(),
        Faults {
            scan_close: true,
            ..Faults::default()
        },
    );
    match AssetRegistry::new(&mut state).get_all_assets() {
        Err(RegistryError::StoreIo { op, source, .. }) => {
            assert_eq!(op, "get_all_assets");
            assert_eq!(source, StoreError::Io("injected scan close failure".to_string()));
        }
        other => panic!("Expected StoreIo, got: {:?}", other),
    }
    assert_eq!(state.inner.open_scans(), 0);
}

#[test]
fn advance_failure_wins_over_close_failure() {
    let mut state = FaultyState::new(
        seeded(),
        Faults {
            scan_at: Some(1),
            scan_close: true,
            ..Faults::default()
        },
    );
    match AssetRegistry::new(&mut state).get_all_assets() {
        Err(RegistryError::StoreIo { source, .. }) => {
            assert_eq!(source, StoreError::Io("injected scan advance failure".to_string()));
        }
        other => panic!("Expected StoreIo, got: {:?}", other),
    }
    assert_eq!(state.inner.open_scans(), 0);
}

#[test]
fn list_surfaces_scan_open_failure() {
    let mut state = FaultyState::new(
        seeded(),
        Faults {
            scan_open: true,
            ..Faults::default()
        },
    );
    let result = AssetRegistry::new(&mut state).get_all_assets();
    assert!(matches!(result, Err(RegistryError::StoreIo { .. })));
}

#[test]
fn exists_surfaces_read_failure() {
    let mut state = FaultyState::new(
        MemoryWorldState::new(),
        Faults {
            get: true,
            ..Faults::default()
        },
    );
    match AssetRegistry::new(&mut state).asset_exists("K") {
        Err(RegistryError::StoreIo { op, key, source }) => {
            assert_eq!(op, "asset_exists");
            assert_eq!(key, "K");
            assert_eq!(source, StoreError::Io("injected get failure".to_string()));
        }
        other => panic!("Expected StoreIo, got: {:?}", other),
    }
}

#[test]
fn init_ledger_fails_fast_without_rollback() {
    let mut state = FaultyState::new(
        MemoryWorldState::new(),
        Faults {
            put_at: Some(2),
            ..Faults::default()
        },
    );
    let err = AssetRegistry::new(&mut state).init_ledger().unwrap_err();
    assert!(matches!(
        err,
        RegistryError::StoreIo { op: "init_ledger", ref key, .. } if key == "DEALER_3"
    ));
    let keys: Vec<&String> = state.inner.entries().keys().collect();
    assert_eq!(keys, vec!["DEALER_1", "DEALER_2"]);
}

#[test]
fn transfer_put_failure_leaves_asset_unchanged() {
    let mut state = FaultyState::new(
        seeded(),
        Faults {
            put_at: Some(0),
            ..Faults::default()
        },
    );
    let err = AssetRegistry::new(&mut state)
        .transfer_asset("DEALER_1", "DEALER9")
        .unwrap_err();
    assert!(matches!(err, RegistryError::StoreIo { op: "transfer_asset", .. }));
    let asset = AssetRegistry::new(&mut state.inner)
        .read_asset("DEALER_1")
        .unwrap();
    assert_eq!(asset.dealer, "DEALER1");
}

#[test]
fn delete_surfaces_store_failure() {
    let mut state = FaultyState::new(
        seeded(),
        Faults {
            del: true,
            ..Faults::default()
        },
    );
    let err = AssetRegistry::new(&mut state)
        .delete_asset("DEALER_1")
        .unwrap_err();
    assert!(matches!(err, RegistryError::StoreIo { op: "delete_asset", .. }));
    assert_eq!(state.inner.len(), 5);
}
