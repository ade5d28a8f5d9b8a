//! Ledger records: tiers, payment methods, transactions and the company wallet.
//!
//! Field names serialize in camelCase so persisted payloads match the
//! JSON documents the dashboards already read.

use crate::types::{EntityId, Money, Percent, Timestamp};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum DriverTier {
    Bronze,
    Silver,
    Gold,
    Elite,
}

impl DriverTier {
    pub const ALL: [DriverTier; 4] = [
        DriverTier::Bronze,
        DriverTier::Silver,
        DriverTier::Gold,
        DriverTier::Elite,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Bronze => "Bronze",
            Self::Silver => "Silver",
            Self::Gold   => "Gold",
            Self::Elite  => "Elite",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|t| t.as_str() == s)
    }
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[serde(rename_all = "UPPERCASE")]
pub enum PaymentMethod {
    Cash,
    Card,
    Paypal,
    Ecocash,
}

impl PaymentMethod {
    pub const ALL: [PaymentMethod; 4] = [
        PaymentMethod::Cash,
        PaymentMethod::Card,
        PaymentMethod::Paypal,
        PaymentMethod::Ecocash,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Cash    => "CASH",
            Self::Card    => "CARD",
            Self::Paypal  => "PAYPAL",
            Self::Ecocash => "ECOCASH",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|m| m.as_str() == s)
    }
}

/// Lifecycle: pending → completed | refunded | disputed,
/// completed → refunded | disputed. Refunded and disputed are terminal.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "lowercase")]
pub enum TransactionStatus {
    Pending,
    Completed,
    Refunded,
    Disputed,
}

impl TransactionStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Pending   => "pending",
            Self::Completed => "completed",
            Self::Refunded  => "refunded",
            Self::Disputed  => "disputed",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "pending"   => Some(Self::Pending),
            "completed" => Some(Self::Completed),
            "refunded"  => Some(Self::Refunded),
            "disputed"  => Some(Self::Disputed),
            _ => None,
        }
    }
}

/// Result of splitting one fare between the platform and the driver.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CommissionSplit {
    pub commission_rate:   Percent,
    pub commission_amount: Money,
    pub driver_earnings:   Money,
}

/// Everything the ride-completion flow knows about a ride at payment time.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RideCharge {
    pub ride_id:        EntityId,
    pub driver_id:      EntityId,
    pub driver_name:    String,
    pub passenger_id:   EntityId,
    pub passenger_name: String,
    pub fare_amount:    Money,
    pub driver_tier:    DriverTier,
    pub payment_method: PaymentMethod,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RideTransaction {
    pub id:                EntityId,
    pub ride_id:           EntityId,
    pub driver_id:         EntityId,
    pub driver_name:       String,
    pub passenger_id:      EntityId,
    pub passenger_name:    String,
    /// Tier at calculation time. Absent on records written before tiers
    /// were snapshotted.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub driver_tier:       Option<DriverTier>,
    pub fare_amount:       Money,
    pub commission_rate:   Percent,
    pub commission_amount: Money,
    pub driver_earnings:   Money,
    pub payment_method:    PaymentMethod,
    pub processing_fee:    Money,
    pub timestamp:         Timestamp,
    pub status:            TransactionStatus,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BankAccountDetails {
    pub account_name:   String,
    pub account_number: String,
    pub bank_name:      String,
    pub routing_number: String,
}

impl BankAccountDetails {
    /// Account number reduced to its last four digits for display.
    pub fn masked_account_number(&self) -> String {
        let digits: Vec<char> = self.account_number.chars().collect();
        let tail: String = digits[digits.len().saturating_sub(4)..].iter().collect();
        format!("••••{tail}")
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CompanyWallet {
    pub total_revenue:        Money,
    pub completed_commission: Money,
    pub pending_commission:   Money,
    pub total_transactions:   u64,
    pub bank_account_linked:  bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub bank_account_details: Option<BankAccountDetails>,
    pub last_updated:         Timestamp,
}

impl CompanyWallet {
    pub fn empty(now: Timestamp) -> Self {
        Self {
            total_revenue:        0.0,
            completed_commission: 0.0,
            pending_commission:   0.0,
            total_transactions:   0,
            bank_account_linked:  false,
            bank_account_details: None,
            last_updated:         now,
        }
    }
}
