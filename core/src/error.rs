use crate::{
    model::{DriverTier, PaymentMethod, TransactionStatus},
    types::{Money, Percent},
};
use thiserror::Error;

#[derive(Error, Debug)]
pub enum LedgerError {
    #[error("Fare must be a finite amount >= 0, got {fare}")]
    NegativeFareRejected { fare: Money },

    #[error("No commission rate configured for tier {tier:?}; fallback rate is {fallback_rate}%")]
    UnknownTierFallback { tier: DriverTier, fallback_rate: Percent },

    #[error("No processing fee configured for payment method {method:?}")]
    UnknownPaymentMethod { method: PaymentMethod },

    #[error("Transaction '{id}' is already {status:?} and cannot be reversed again")]
    NonMonotonicRefund { id: String, status: TransactionStatus },

    #[error("Transaction '{id}' cannot move from {from:?} to {to:?}")]
    InvalidTransition {
        id:   String,
        from: TransactionStatus,
        to:   TransactionStatus,
    },

    #[error("Transaction '{id}' not found")]
    UnknownTransaction { id: String },

    #[error("Ride '{ride_id}' already has a transaction")]
    DuplicateRide { ride_id: String },

    #[error("Invalid commission config: {reason}")]
    InvalidConfig { reason: String },

    #[error("Invalid bank account: {reason}")]
    InvalidBankAccount { reason: String },

    #[error(transparent)]
    Persistence(#[from] PersistenceError),
}

pub type LedgerResult<T> = Result<T, LedgerError>;

/// Storage failures. Kept separate from `LedgerError` so callers can
/// warn that financial history may not have been saved.
#[derive(Error, Debug)]
pub enum PersistenceError {
    #[error("Database error: {0}")]
    Database(#[from] rusqlite::Error),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

pub type PersistenceResult<T> = Result<T, PersistenceError>;
