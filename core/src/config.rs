//! Commercial terms: commission rate per tier, processing fee per
//! payment method, and the minimum commission per ride.
//!
//! A config is immutable reference data. Swapping terms means building a
//! new `CommissionConfig` and handing it to a new ledger.

use crate::{
    error::{LedgerError, LedgerResult},
    model::{DriverTier, PaymentMethod},
    types::{Money, Percent},
};
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, HashSet};

/// Rate used when a tier has no entry in the table.
pub const FALLBACK_COMMISSION_RATE: Percent = 12.0;

pub const STANDARD_RATE_DESCRIPTION: &str = "Standard commission rate";

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CommissionRate {
    pub driver_tier: DriverTier,
    pub percentage:  Percent,
    pub description: String,
}

pub type ProcessingFeeTable = BTreeMap<PaymentMethod, Percent>;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CommissionConfig {
    pub commission_rates:   Vec<CommissionRate>,
    pub processing_fees:    ProcessingFeeTable,
    pub minimum_commission: Money,
    /// When set, the minimum-commission floor never takes more than the
    /// fare itself, so driver earnings stay >= 0.
    #[serde(default)]
    pub cap_commission_at_fare: bool,
}

impl Default for CommissionConfig {
    fn default() -> Self {
        Self {
            commission_rates: vec![
                CommissionRate {
                    driver_tier: DriverTier::Elite,
                    percentage:  8.0,
                    description: "Elite drivers get premium rates - only 8% commission".into(),
                },
                CommissionRate {
                    driver_tier: DriverTier::Gold,
                    percentage:  10.0,
                    description: "Gold drivers enjoy 10% commission rate".into(),
                },
                CommissionRate {
                    driver_tier: DriverTier::Silver,
                    percentage:  12.0,
                    description: "Silver drivers have 12% commission rate".into(),
                },
                CommissionRate {
                    driver_tier: DriverTier::Bronze,
                    percentage:  15.0,
                    description: "Bronze drivers start at 15% - still beats major competitors!".into(),
                },
            ],
            processing_fees: BTreeMap::from([
                (PaymentMethod::Cash, 0.0),
                (PaymentMethod::Card, 2.9),
                (PaymentMethod::Paypal, 3.5),
                (PaymentMethod::Ecocash, 1.5),
            ]),
            minimum_commission: 0.50,
            cap_commission_at_fare: false,
        }
    }
}

impl CommissionConfig {
    /// Load from a JSON file.
    /// In tests, use CommissionConfig::default().
    pub fn load(path: &str) -> anyhow::Result<Self> {
        let content = std::fs::read_to_string(path)
            .map_err(|e| anyhow::anyhow!("Cannot read {path}: {e}"))?;
        let config: CommissionConfig = serde_json::from_str(&content)
            .map_err(|e| anyhow::anyhow!("Cannot parse {path}: {e}"))?;
        config.validate()?;
        Ok(config)
    }

    pub fn rate_for(&self, tier: DriverTier) -> Option<&CommissionRate> {
        self.commission_rates.iter().find(|r| r.driver_tier == tier)
    }

    pub fn fee_percentage_for(&self, method: PaymentMethod) -> Option<Percent> {
        self.processing_fees.get(&method).copied()
    }

    /// Human-readable description of a tier's rate, for the dashboards.
    pub fn description_for(&self, tier: DriverTier) -> &str {
        self.rate_for(tier)
            .map(|r| r.description.as_str())
            .unwrap_or(STANDARD_RATE_DESCRIPTION)
    }

    /// Tiers with no rate entry. Rides for these tiers are charged the
    /// fallback rate.
    pub fn missing_tiers(&self) -> Vec<DriverTier> {
        DriverTier::ALL
            .into_iter()
            .filter(|t| self.rate_for(*t).is_none())
            .collect()
    }

    /// At most one rate per tier, percentages within [0, 100],
    /// and a non-negative minimum commission.
    ///
    /// A missing tier is not an error here; see `missing_tiers`.
    pub fn validate(&self) -> LedgerResult<()> {
        let mut seen = HashSet::new();
        for rate in &self.commission_rates {
            if !seen.insert(rate.driver_tier) {
                return Err(invalid(format!(
                    "duplicate rate for tier {}",
                    rate.driver_tier.as_str()
                )));
            }
            if !is_percentage(rate.percentage) {
                return Err(invalid(format!(
                    "rate for tier {} is {}, expected 0-100",
                    rate.driver_tier.as_str(),
                    rate.percentage
                )));
            }
        }
        for (method, pct) in &self.processing_fees {
            if !is_percentage(*pct) {
                return Err(invalid(format!(
                    "processing fee for {} is {pct}, expected 0-100",
                    method.as_str()
                )));
            }
        }

        if !self.minimum_commission.is_finite() || self.minimum_commission < 0.0 {
            return Err(invalid(format!(
                "minimum commission {} must be >= 0",
                self.minimum_commission
            )));
        }
        Ok(())
    }
}

fn is_percentage(p: Percent) -> bool {
    p.is_finite() && (0.0..=100.0).contains(&p)
}

fn invalid(reason: String) -> LedgerError {
    LedgerError::InvalidConfig { reason }
}
