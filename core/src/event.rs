//! Ledger events: the audit trail of every wallet change.
//!
//! RULE: every state change made by `CommissionLedger` emits exactly one
//! event. Fallbacks emit `AnomalyDetected` in addition.

use crate::{
    model::{DriverTier, PaymentMethod, TransactionStatus},
    types::{EntityId, Money, Timestamp},
};
use serde::{Deserialize, Serialize};

/// Variants are appended, never removed or reordered.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum LedgerEvent {
    TransactionRecorded {
        at: Timestamp,
        transaction_id: EntityId,
        ride_id: EntityId,
        driver_tier: DriverTier,
        payment_method: PaymentMethod,
        fare_amount: Money,
        commission_amount: Money,
    },
    TransactionCompleted {
        at: Timestamp,
        transaction_id: EntityId,
        commission_amount: Money,
    },
    TransactionReversed {
        at: Timestamp,
        transaction_id: EntityId,
        from: TransactionStatus,
        to: TransactionStatus,
        commission_amount: Money,
    },
    BankAccountLinked {
        at: Timestamp,
        bank_name: String,
        masked_account_number: String,
    },
    AnomalyDetected {
        at: Timestamp,
        kind: AnomalyKind,
        detail: String,
    },
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum AnomalyKind {
    UnknownTierFallback,
    UnknownPaymentMethod,
    FloorExceedsFare,
}

impl LedgerEvent {
    pub fn event_type(&self) -> &'static str {
        match self {
            Self::TransactionRecorded { .. }  => "transaction_recorded",
            Self::TransactionCompleted { .. } => "transaction_completed",
            Self::TransactionReversed { .. }  => "transaction_reversed",
            Self::BankAccountLinked { .. }    => "bank_account_linked",
            Self::AnomalyDetected { .. }      => "anomaly_detected",
        }
    }

    pub fn at(&self) -> Timestamp {
        match self {
            Self::TransactionRecorded { at, .. }
            | Self::TransactionCompleted { at, .. }
            | Self::TransactionReversed { at, .. }
            | Self::BankAccountLinked { at, .. }
            | Self::AnomalyDetected { at, .. } => *at,
        }
    }
}

/// The event log entry as persisted to SQLite.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EventLogEntry {
    pub id: Option<i64>,
    pub at: Timestamp,
    pub event_type: String,
    pub payload: String, // JSON-serialized LedgerEvent
}

impl EventLogEntry {
    pub fn from_event(event: &LedgerEvent) -> serde_json::Result<Self> {
        Ok(Self {
            id: None,
            at: event.at(),
            event_type: event.event_type().to_string(),
            payload: serde_json::to_string(event)?,
        })
    }
}
