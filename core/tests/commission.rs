//! Commission split and processing-fee tests.

use mufambi_ledger::{
    commission::{calculate_commission, calculate_processing_fee, create_ride_transaction, split_at_rate},
    config::{CommissionConfig, FALLBACK_COMMISSION_RATE},
    error::LedgerError,
    model::{DriverTier, PaymentMethod, RideCharge, TransactionStatus},
};

fn charge(ride_id: &str, fare: f64, tier: DriverTier, method: PaymentMethod) -> RideCharge {
    RideCharge {
        ride_id:        ride_id.into(),
        driver_id:      "drv-0001".into(),
        driver_name:    "Tendai Moyo".into(),
        passenger_id:   "pax-00001".into(),
        passenger_name: "Rudo Ncube".into(),
        fare_amount:    fare,
        driver_tier:    tier,
        payment_method: method,
    }
}

#[test]
fn elite_rate_on_100() {
    let split = calculate_commission(100.0, DriverTier::Elite, &CommissionConfig::default()).unwrap();
    assert_eq!(split.commission_rate, 8.0);
    assert_eq!(split.commission_amount, 8.00);
    assert_eq!(split.driver_earnings, 92.00);
}

#[test]
fn bronze_rate_on_100() {
    let split = calculate_commission(100.0, DriverTier::Bronze, &CommissionConfig::default()).unwrap();
    assert_eq!(split.commission_rate, 15.0);
    assert_eq!(split.commission_amount, 15.00);
    assert_eq!(split.driver_earnings, 85.00);
}

/// Raw commission on a $1 Elite fare is 0.08; the floor lifts it to 0.50.
#[test]
fn minimum_commission_floor_applies() {
    let split = calculate_commission(1.0, DriverTier::Elite, &CommissionConfig::default()).unwrap();
    assert_eq!(split.commission_rate, 8.0);
    assert_eq!(split.commission_amount, 0.50);
    assert_eq!(split.driver_earnings, 0.50);
}

/// Earnings + commission always reconstruct the fare to within a cent,
/// and the floor holds whenever the raw commission is below it.
#[test]
fn split_conserves_fare_and_respects_floor() {
    let config = CommissionConfig::default();
    let fares = [0.01, 0.3, 1.0, 3.33, 4.99, 6.25, 7.77, 12.345, 19.99, 58.1, 250.0, 1234.56];

    for tier in DriverTier::ALL {
        let rate = config.rate_for(tier).unwrap().percentage;
        for fare in fares {
            let split = calculate_commission(fare, tier, &config).unwrap();
            let diff = (split.commission_amount + split.driver_earnings - fare).abs();
            assert!(
                diff <= 0.01 + 1e-9,
                "{tier:?} fare {fare}: {} + {} != {fare}",
                split.commission_amount,
                split.driver_earnings
            );
            if fare * rate / 100.0 < config.minimum_commission {
                assert!(
                    split.commission_amount >= config.minimum_commission,
                    "{tier:?} fare {fare}: commission {} below floor",
                    split.commission_amount
                );
            }
        }
    }
}

#[test]
fn zero_fare_carries_no_commission() {
    let split = calculate_commission(0.0, DriverTier::Bronze, &CommissionConfig::default()).unwrap();
    assert_eq!(split.commission_amount, 0.0);
    assert_eq!(split.driver_earnings, 0.0);
}

/// A fare that rounds to zero cents is charged as a zero fare, so the
/// floor never applies to it.
#[test]
fn sub_cent_fare_is_split_as_zero() {
    let config = CommissionConfig::default();
    for fare in [0.001, 0.004, 0.0049] {
        let split = calculate_commission(fare, DriverTier::Elite, &config).unwrap();
        assert_eq!(split.commission_amount, 0.0, "fare {fare}");
        assert_eq!(split.driver_earnings, 0.0, "fare {fare}");
    }
    // Half a cent rounds up and pays the floor like any other fare.
    let split = calculate_commission(0.005, DriverTier::Elite, &config).unwrap();
    assert_eq!(split.commission_amount, 0.50);
}

/// Under the default policy the floor is unconditional, so a fare below
/// the minimum leaves the driver negative.
#[test]
fn floor_above_fare_goes_negative_by_default() {
    let split = calculate_commission(0.30, DriverTier::Gold, &CommissionConfig::default()).unwrap();
    assert_eq!(split.commission_amount, 0.50);
    assert_eq!(split.driver_earnings, -0.20);
}

#[test]
fn cap_at_fare_keeps_earnings_non_negative() {
    let config = CommissionConfig {
        cap_commission_at_fare: true,
        ..CommissionConfig::default()
    };
    let split = calculate_commission(0.30, DriverTier::Gold, &config).unwrap();
    assert_eq!(split.commission_amount, 0.30);
    assert_eq!(split.driver_earnings, 0.0);

    // Fares above the floor are unaffected by the cap.
    let split = calculate_commission(100.0, DriverTier::Gold, &config).unwrap();
    assert_eq!(split.commission_amount, 10.0);
}

#[test]
fn negative_and_non_finite_fares_are_rejected() {
    let config = CommissionConfig::default();
    for fare in [-0.01, -100.0, f64::NAN, f64::INFINITY] {
        let err = calculate_commission(fare, DriverTier::Silver, &config).unwrap_err();
        assert!(
            matches!(err, LedgerError::NegativeFareRejected { .. }),
            "fare {fare}: unexpected {err:?}"
        );
    }
}

#[test]
fn unknown_tier_reports_fallback_rate() {
    let mut config = CommissionConfig::default();
    config.commission_rates.retain(|r| r.driver_tier != DriverTier::Gold);

    match calculate_commission(50.0, DriverTier::Gold, &config) {
        Err(LedgerError::UnknownTierFallback { tier, fallback_rate }) => {
            assert_eq!(tier, DriverTier::Gold);
            assert_eq!(fallback_rate, FALLBACK_COMMISSION_RATE);
            let split = split_at_rate(50.0, fallback_rate, &config).unwrap();
            assert_eq!(split.commission_amount, 6.0);
            assert_eq!(split.driver_earnings, 44.0);
        }
        other => panic!("expected UnknownTierFallback, got {other:?}"),
    }
}

#[test]
fn processing_fee_per_method() {
    let config = CommissionConfig::default();
    assert_eq!(calculate_processing_fee(100.0, PaymentMethod::Cash, &config).unwrap(), 0.0);
    assert_eq!(calculate_processing_fee(100.0, PaymentMethod::Card, &config).unwrap(), 2.90);
    assert_eq!(calculate_processing_fee(100.0, PaymentMethod::Paypal, &config).unwrap(), 3.50);
    assert_eq!(calculate_processing_fee(20.0, PaymentMethod::Ecocash, &config).unwrap(), 0.30);
    // 2.9% of 12.34 = 0.35786
    assert_eq!(calculate_processing_fee(12.34, PaymentMethod::Card, &config).unwrap(), 0.36);
}

#[test]
fn unknown_payment_method_is_reported() {
    let mut config = CommissionConfig::default();
    config.processing_fees.remove(&PaymentMethod::Paypal);
    let err = calculate_processing_fee(10.0, PaymentMethod::Paypal, &config).unwrap_err();
    assert!(matches!(err, LedgerError::UnknownPaymentMethod { method: PaymentMethod::Paypal }));
}

#[test]
fn created_transaction_is_pending_with_all_parts() {
    let config = CommissionConfig::default();
    let txn = create_ride_transaction(
        &charge("ride-1", 40.0, DriverTier::Silver, PaymentMethod::Card),
        &config,
        1_700_000_000_000,
    )
    .unwrap();

    assert!(txn.id.starts_with("txn-"));
    assert_eq!(txn.ride_id, "ride-1");
    assert_eq!(txn.status, TransactionStatus::Pending);
    assert_eq!(txn.driver_tier, Some(DriverTier::Silver));
    assert_eq!(txn.commission_rate, 12.0);
    assert_eq!(txn.commission_amount, 4.80);
    assert_eq!(txn.driver_earnings, 35.20);
    assert_eq!(txn.processing_fee, 1.16);
    assert_eq!(txn.timestamp, 1_700_000_000_000);
}

/// Rapid back-to-back calls at the same instant still get distinct ids.
#[test]
fn transaction_ids_are_unique_at_same_timestamp() {
    let config = CommissionConfig::default();
    let c = charge("ride-x", 10.0, DriverTier::Bronze, PaymentMethod::Cash);
    let ids: std::collections::HashSet<String> = (0..500)
        .map(|_| create_ride_transaction(&c, &config, 42).unwrap().id)
        .collect();
    assert_eq!(ids.len(), 500);
}
