//! Dashboard aggregates over the transaction list.

use crate::{
    model::{CompanyWallet, DriverTier, PaymentMethod, RideTransaction, TransactionStatus},
    money::round_cents,
    types::Money,
};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

pub const RECENT_TRANSACTION_LIMIT: usize = 10;

#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct Breakdown {
    pub count: u64,
    pub total: Money,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CommissionStats {
    pub total_rides:                  u64,
    pub total_revenue:                Money,
    pub average_commission:           Money,
    pub commission_by_tier:           BTreeMap<DriverTier, Breakdown>,
    pub commission_by_payment_method: BTreeMap<PaymentMethod, Breakdown>,
    /// Most recent first, any status. This is a monitoring view,
    /// not a financial statement.
    pub recent_transactions:          Vec<RideTransaction>,
    pub pending_commission:           Money,
    pub bank_account_linked:          bool,
}

/// Aggregate completed transactions for the company dashboard.
pub fn get_commission_stats(
    transactions: &[RideTransaction],
    wallet: &CompanyWallet,
) -> CommissionStats {
    let mut by_tier: BTreeMap<DriverTier, Breakdown> =
        DriverTier::ALL.iter().map(|t| (*t, Breakdown::default())).collect();
    let mut by_method: BTreeMap<PaymentMethod, Breakdown> =
        PaymentMethod::ALL.iter().map(|m| (*m, Breakdown::default())).collect();

    let mut total_rides = 0u64;
    let mut total_revenue = 0.0;

    for txn in transactions.iter().filter(|t| t.status == TransactionStatus::Completed) {
        total_rides += 1;
        total_revenue += txn.commission_amount;

        let method = by_method.entry(txn.payment_method).or_default();
        method.count += 1;
        method.total += txn.commission_amount;

        // Older records carry no tier snapshot and are left out of the tier split.
        if let Some(tier) = txn.driver_tier {
            let entry = by_tier.entry(tier).or_default();
            entry.count += 1;
            entry.total += txn.commission_amount;
        }
    }

    for b in by_tier.values_mut().chain(by_method.values_mut()) {
        b.total = round_cents(b.total);
    }

    let average_commission = if total_rides > 0 {
        round_cents(total_revenue / total_rides as f64)
    } else {
        0.0
    };

    let mut recent = transactions.to_vec();
    recent.sort_by(|a, b| b.timestamp.cmp(&a.timestamp));
    recent.truncate(RECENT_TRANSACTION_LIMIT);

    CommissionStats {
        total_rides,
        total_revenue: round_cents(total_revenue),
        average_commission,
        commission_by_tier: by_tier,
        commission_by_payment_method: by_method,
        recent_transactions: recent,
        pending_commission: wallet.pending_commission,
        bank_account_linked: wallet.bank_account_linked,
    }
}
