/// Asset Registry — Demonstration Seed
///
/// The five fixed assets written by `init_ledger`. Values are part of the
/// replicated state and must not change.

use crate::domain::Asset;

const SEED_MSISDNS: [&str; 5] = [
    "+910000000001",
    "+91000000002",
    "+910000000003",
    "+910000000004",
    "+910000000005",
];

const SEED_MPINS: [i64; 5] = [1000, 1001, 1003, 1004, 1005];

pub const SEED_BALANCE: i64 = 1000;
pub const SEED_STATUS: &str = "ACTIVE";

/// The seed assets in `DEALER_1..DEALER_5` order.
pub fn seed_assets() -> Vec<Asset> {
    (0..SEED_MPINS.len())
        .map(|i| {
            let n = i + 1;
            Asset {
                dealer_id: format!("DEALER_{}", n),
                msisdn: SEED_MSISDNS[i].to_string(),
                mpin: SEED_MPINS[i],
                balance: SEED_BALANCE,
                status: SEED_STATUS.to_string(),
                dealer: format!("DEALER{}", n),
                trans_amount: 10,
                trans_type: "TO".to_string(),
                remarks: "ADD REMARKS HERE".to_string(),
            }
        })
        .collect()
}
