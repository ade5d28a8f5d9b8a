//! Commission and processing-fee calculation.
//!
//! Every function here is pure: no I/O, no clock reads, no logging.
//! Anomalies come back as typed errors and the caller decides whether
//! to fall back (see `ledger::CommissionLedger`).

use crate::{
    config::{CommissionConfig, FALLBACK_COMMISSION_RATE},
    error::{LedgerError, LedgerResult},
    model::{CommissionSplit, DriverTier, PaymentMethod, RideCharge, RideTransaction, TransactionStatus},
    money::round_cents,
    types::{Money, Percent, Timestamp},
};
use uuid::Uuid;

/// Split a fare using the rate configured for `tier`.
///
/// Fails with `UnknownTierFallback` when the tier has no rate; the error
/// carries the fallback rate so callers can use `split_at_rate` with it.
pub fn calculate_commission(
    fare_amount: Money,
    tier: DriverTier,
    config: &CommissionConfig,
) -> LedgerResult<CommissionSplit> {
    check_fare(fare_amount)?;
    let rate = config
        .rate_for(tier)
        .ok_or(LedgerError::UnknownTierFallback {
            tier,
            fallback_rate: FALLBACK_COMMISSION_RATE,
        })?;
    split_at_rate(fare_amount, rate.percentage, config)
}

/// Split a fare at an explicit percentage.
///
/// The minimum commission is a floor, not a cap: small fares can pay more
/// than the nominal rate. The split is taken on the fare rounded to cents,
/// the same value the transaction stores, so a fare that rounds to zero
/// carries no commission at all.
pub fn split_at_rate(
    fare_amount: Money,
    rate: Percent,
    config: &CommissionConfig,
) -> LedgerResult<CommissionSplit> {
    check_fare(fare_amount)?;
    let fare_amount = round_cents(fare_amount);

    let mut commission = fare_amount * rate / 100.0;
    if fare_amount > 0.0 && commission < config.minimum_commission {
        commission = config.minimum_commission;
    }
    if config.cap_commission_at_fare && commission > fare_amount {
        commission = fare_amount;
    }

    let commission_amount = round_cents(commission);
    Ok(CommissionSplit {
        commission_rate: rate,
        commission_amount,
        driver_earnings: round_cents(fare_amount - commission_amount),
    })
}

/// Processing fee charged by the payment rail, rounded to cents.
pub fn calculate_processing_fee(
    amount: Money,
    method: PaymentMethod,
    config: &CommissionConfig,
) -> LedgerResult<Money> {
    let pct = config
        .fee_percentage_for(method)
        .ok_or(LedgerError::UnknownPaymentMethod { method })?;
    Ok(round_cents(amount * pct / 100.0))
}

/// Build a pending transaction from already-computed parts.
/// The id is a v4 UUID, unique regardless of how fast calls arrive.
pub fn build_transaction(
    charge: &RideCharge,
    split: CommissionSplit,
    processing_fee: Money,
    now: Timestamp,
) -> RideTransaction {
    RideTransaction {
        id:                format!("txn-{}", Uuid::new_v4()),
        ride_id:           charge.ride_id.clone(),
        driver_id:         charge.driver_id.clone(),
        driver_name:       charge.driver_name.clone(),
        passenger_id:      charge.passenger_id.clone(),
        passenger_name:    charge.passenger_name.clone(),
        driver_tier:       Some(charge.driver_tier),
        fare_amount:       round_cents(charge.fare_amount),
        commission_rate:   split.commission_rate,
        commission_amount: split.commission_amount,
        driver_earnings:   split.driver_earnings,
        payment_method:    charge.payment_method,
        processing_fee,
        timestamp:         now,
        status:            TransactionStatus::Pending,
    }
}

/// Compose commission and processing fee into a pending transaction.
/// Strict: any anomaly is returned as an error.
pub fn create_ride_transaction(
    charge: &RideCharge,
    config: &CommissionConfig,
    now: Timestamp,
) -> LedgerResult<RideTransaction> {
    let split = calculate_commission(charge.fare_amount, charge.driver_tier, config)?;
    let fee = calculate_processing_fee(charge.fare_amount, charge.payment_method, config)?;
    Ok(build_transaction(charge, split, fee, now))
}

fn check_fare(fare_amount: Money) -> LedgerResult<()> {
    if !fare_amount.is_finite() || fare_amount < 0.0 {
        return Err(LedgerError::NegativeFareRejected { fare: fare_amount });
    }
    Ok(())
}
