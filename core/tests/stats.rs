//! Commission stats tests.

use mufambi_ledger::{
    model::{CompanyWallet, DriverTier, PaymentMethod, RideTransaction, TransactionStatus},
    stats::{get_commission_stats, RECENT_TRANSACTION_LIMIT},
};

fn txn(n: i64, commission: f64, tier: Option<DriverTier>, method: PaymentMethod, status: TransactionStatus) -> RideTransaction {
    RideTransaction {
        id:                format!("txn-{n}"),
        ride_id:           format!("ride-{n}"),
        driver_id:         "drv-0001".into(),
        driver_name:       "Simba Gumbo".into(),
        passenger_id:      "pax-00001".into(),
        passenger_name:    "Vimbai Nyathi".into(),
        driver_tier:       tier,
        fare_amount:       commission * 10.0,
        commission_rate:   10.0,
        commission_amount: commission,
        driver_earnings:   commission * 9.0,
        payment_method:    method,
        processing_fee:    0.0,
        timestamp:         1_000 + n,
        status,
    }
}

#[test]
fn empty_list_has_zero_average() {
    let stats = get_commission_stats(&[], &CompanyWallet::empty(0));
    assert_eq!(stats.total_rides, 0);
    assert_eq!(stats.total_revenue, 0.0);
    assert_eq!(stats.average_commission, 0.0);
    assert!(stats.recent_transactions.is_empty());
    // Every tier and method is present, zeroed.
    assert_eq!(stats.commission_by_tier.len(), 4);
    assert_eq!(stats.commission_by_payment_method.len(), 4);
}

#[test]
fn only_completed_transactions_count() {
    use TransactionStatus::*;
    let txns = vec![
        txn(1, 2.0, Some(DriverTier::Gold), PaymentMethod::Card, Completed),
        txn(2, 4.0, Some(DriverTier::Gold), PaymentMethod::Cash, Completed),
        txn(3, 3.0, Some(DriverTier::Elite), PaymentMethod::Card, Completed),
        txn(4, 100.0, Some(DriverTier::Bronze), PaymentMethod::Card, Pending),
        txn(5, 100.0, Some(DriverTier::Bronze), PaymentMethod::Paypal, Refunded),
        txn(6, 100.0, Some(DriverTier::Silver), PaymentMethod::Ecocash, Disputed),
    ];
    let stats = get_commission_stats(&txns, &CompanyWallet::empty(0));

    assert_eq!(stats.total_rides, 3);
    assert_eq!(stats.total_revenue, 9.0);
    assert_eq!(stats.average_commission, 3.0);

    let card = stats.commission_by_payment_method[&PaymentMethod::Card];
    assert_eq!((card.count, card.total), (2, 5.0));
    let cash = stats.commission_by_payment_method[&PaymentMethod::Cash];
    assert_eq!((cash.count, cash.total), (1, 4.0));
    assert_eq!(stats.commission_by_payment_method[&PaymentMethod::Paypal].count, 0);

    let gold = stats.commission_by_tier[&DriverTier::Gold];
    assert_eq!((gold.count, gold.total), (2, 6.0));
    assert_eq!(stats.commission_by_tier[&DriverTier::Bronze].count, 0);
}

#[test]
fn average_is_rounded_to_cents() {
    use TransactionStatus::Completed;
    let txns = vec![
        txn(1, 1.0, None, PaymentMethod::Cash, Completed),
        txn(2, 1.0, None, PaymentMethod::Cash, Completed),
        txn(3, 2.0, None, PaymentMethod::Cash, Completed),
    ];
    let stats = get_commission_stats(&txns, &CompanyWallet::empty(0));
    assert_eq!(stats.average_commission, 1.33);
}

#[test]
fn untiered_records_skip_tier_breakdown() {
    let txns = vec![txn(1, 5.0, None, PaymentMethod::Card, TransactionStatus::Completed)];
    let stats = get_commission_stats(&txns, &CompanyWallet::empty(0));
    assert_eq!(stats.total_rides, 1);
    assert!(stats.commission_by_tier.values().all(|b| b.count == 0));
    assert_eq!(stats.commission_by_payment_method[&PaymentMethod::Card].count, 1);
}

/// Recent list is newest first, capped at 10, and mixes statuses.
#[test]
fn recent_transactions_newest_first_any_status() {
    let txns: Vec<RideTransaction> = (0..15)
        .map(|n| {
            let status = if n % 2 == 0 { TransactionStatus::Pending } else { TransactionStatus::Completed };
            txn(n, 1.0, None, PaymentMethod::Cash, status)
        })
        .collect();
    let stats = get_commission_stats(&txns, &CompanyWallet::empty(0));

    assert_eq!(stats.recent_transactions.len(), RECENT_TRANSACTION_LIMIT);
    let ids: Vec<&str> = stats.recent_transactions.iter().map(|t| t.id.as_str()).collect();
    assert_eq!(ids[0], "txn-14");
    assert_eq!(ids[9], "txn-5");
    assert!(stats.recent_transactions.iter().any(|t| t.status == TransactionStatus::Pending));
    assert!(stats.recent_transactions.windows(2).all(|w| w[0].timestamp >= w[1].timestamp));
}

#[test]
fn wallet_context_is_carried() {
    let mut wallet = CompanyWallet::empty(0);
    wallet.pending_commission = 12.5;
    wallet.bank_account_linked = true;
    let stats = get_commission_stats(&[], &wallet);
    assert_eq!(stats.pending_commission, 12.5);
    assert!(stats.bank_account_linked);
}
