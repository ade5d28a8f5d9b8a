//! Seeded ride-completion feed.
//!
//! Stands in for the dashboard payment flow: produces a reproducible
//! stream of paid rides plus what happens to each one afterwards, and
//! replays it through a `CommissionLedger`.

use crate::{
    error::LedgerResult,
    ledger::CommissionLedger,
    model::{DriverTier, PaymentMethod, RideCharge},
    money::round_cents,
    rng::{FeedStream, StreamRng},
};
use serde::{Deserialize, Serialize};

/// What happens to a ride's transaction after it is recorded.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RideOutcome {
    Complete,
    /// Completed, then refunded.
    Refund,
    /// Disputed while still pending.
    Dispute,
    LeavePending,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SimulatedRide {
    pub charge:  RideCharge,
    pub outcome: RideOutcome,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FeedConfig {
    pub rides:          u64,
    pub complete_ratio: f64,
    pub refund_ratio:   f64,
    pub dispute_ratio:  f64,
    /// Fares follow a Pareto tail starting at this amount.
    pub fare_min:       f64,
    pub fare_alpha:     f64,
    pub fare_cap:       f64,
    /// Relative weights in `DriverTier::ALL` order.
    pub tier_weights:   [f64; 4],
    /// Relative weights in `PaymentMethod::ALL` order.
    pub method_weights: [f64; 4],
    pub drivers:        u64,
    pub passengers:     u64,
}

impl Default for FeedConfig {
    fn default() -> Self {
        Self {
            rides:          100,
            complete_ratio: 0.85,
            refund_ratio:   0.04,
            dispute_ratio:  0.02,
            fare_min:       2.5,
            fare_alpha:     2.2,
            fare_cap:       120.0,
            tier_weights:   [0.40, 0.30, 0.20, 0.10],
            method_weights: [0.35, 0.30, 0.10, 0.25],
            drivers:        25,
            passengers:     200,
        }
    }
}

/// Deterministic ride generator. Same seed, same config → same rides.
pub struct RideFeed {
    config:  FeedConfig,
    fare:    StreamRng,
    tier:    StreamRng,
    method:  StreamRng,
    names:   StreamRng,
    outcome: StreamRng,
    issued:  u64,
}

impl RideFeed {
    pub fn new(seed: u64, config: FeedConfig) -> Self {
        Self {
            config,
            fare:    FeedStream::Fare.rng(seed),
            tier:    FeedStream::Tier.rng(seed),
            method:  FeedStream::PaymentMethod.rng(seed),
            names:   FeedStream::Names.rng(seed),
            outcome: FeedStream::Outcome.rng(seed),
            issued:  0,
        }
    }

    pub fn next_ride(&mut self) -> SimulatedRide {
        self.issued += 1;
        let ride_no = self.issued;

        let fare = round_cents(
            self.fare
                .pareto(self.config.fare_min, self.config.fare_alpha)
                .min(self.config.fare_cap),
        );
        let tier = DriverTier::ALL[self.tier.weighted_index(&self.config.tier_weights)];
        let method =
            PaymentMethod::ALL[self.method.weighted_index(&self.config.method_weights)];

        let driver_no = self.names.next_u64_below(self.config.drivers.max(1));
        let passenger_no = self.names.next_u64_below(self.config.passengers.max(1));

        let charge = RideCharge {
            ride_id:        format!("ride-{ride_no:06}"),
            driver_id:      format!("drv-{driver_no:04}"),
            driver_name:    NameGenerator::name_for(driver_no),
            passenger_id:   format!("pax-{passenger_no:05}"),
            passenger_name: NameGenerator::name_for(passenger_no.wrapping_mul(7919)),
            fare_amount:    fare,
            driver_tier:    tier,
            payment_method: method,
        };

        SimulatedRide {
            charge,
            outcome: self.roll_outcome(),
        }
    }

    fn roll_outcome(&mut self) -> RideOutcome {
        let c = &self.config;
        let leftover = (1.0 - c.complete_ratio - c.refund_ratio - c.dispute_ratio).max(0.0);
        match self.outcome.weighted_index(&[
            c.complete_ratio,
            c.refund_ratio,
            c.dispute_ratio,
            leftover,
        ]) {
            0 => RideOutcome::Complete,
            1 => RideOutcome::Refund,
            2 => RideOutcome::Dispute,
            _ => RideOutcome::LeavePending,
        }
    }

    /// The full configured batch.
    pub fn take_batch(&mut self) -> Vec<SimulatedRide> {
        (0..self.config.rides).map(|_| self.next_ride()).collect()
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ReplaySummary {
    pub recorded:  u64,
    pub completed: u64,
    pub refunded:  u64,
    pub disputed:  u64,
    pub pending:   u64,
}

/// Push every ride through the ledger and apply its outcome.
pub fn replay(ledger: &mut CommissionLedger, rides: &[SimulatedRide]) -> LedgerResult<ReplaySummary> {
    let mut summary = ReplaySummary::default();
    for ride in rides {
        let txn = ledger.record_ride(&ride.charge)?;
        summary.recorded += 1;
        match ride.outcome {
            RideOutcome::Complete => {
                ledger.complete(&txn.id)?;
                summary.completed += 1;
            }
            RideOutcome::Refund => {
                ledger.complete(&txn.id)?;
                ledger.refund(&txn.id)?;
                summary.refunded += 1;
            }
            RideOutcome::Dispute => {
                ledger.dispute(&txn.id)?;
                summary.disputed += 1;
            }
            RideOutcome::LeavePending => summary.pending += 1,
        }
    }
    Ok(summary)
}

/// Deterministic names for simulated drivers and passengers.
/// The same number always maps to the same name.
pub struct NameGenerator;

impl NameGenerator {
    pub fn name_for(n: u64) -> String {
        let first = Self::first_names();
        let last = Self::last_names();
        let f = (n % first.len() as u64) as usize;
        let l = ((n / first.len() as u64) % last.len() as u64) as usize;
        format!("{} {}", first[f], last[l])
    }

    fn first_names() -> &'static [&'static str] {
        &[
            "Tendai", "Rudo", "Tatenda", "Chipo", "Farai", "Nyasha", "Kudzai", "Tafadzwa",
            "Rumbidzai", "Tinashe", "Takudzwa", "Vimbai", "Blessing", "Tsitsi", "Simba",
            "Ruvimbo", "Tapiwa", "Chiedza", "Munashe", "Anesu",
        ]
    }

    fn last_names() -> &'static [&'static str] {
        &[
            "Moyo", "Ncube", "Sibanda", "Dube", "Ndlovu", "Mpofu", "Chikwanha", "Mutasa",
            "Mapfumo", "Chinotimba", "Gumbo", "Marufu", "Zvobgo", "Mhlanga", "Nyathi",
        ]
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn names_are_stable_and_two_part() {
        assert_eq!(NameGenerator::name_for(0), "Tendai Moyo");
        assert_eq!(NameGenerator::name_for(21), "Rudo Ncube");
        for n in 0..500 {
            let name = NameGenerator::name_for(n);
            assert_eq!(name.split_whitespace().count(), 2, "{name}");
        }
    }

    #[test]
    fn fares_stay_within_bounds() {
        let config = FeedConfig::default();
        let (min, cap) = (config.fare_min, config.fare_cap);
        let mut feed = RideFeed::new(3, config);
        for ride in feed.take_batch() {
            assert!(ride.charge.fare_amount >= min && ride.charge.fare_amount <= cap);
        }
    }

    #[test]
    fn ride_ids_are_sequential() {
        let mut feed = RideFeed::new(3, FeedConfig { rides: 3, ..FeedConfig::default() });
        let ids: Vec<String> = feed.take_batch().into_iter().map(|r| r.charge.ride_id).collect();
        assert_eq!(ids, vec!["ride-000001", "ride-000002", "ride-000003"]);
    }
}
