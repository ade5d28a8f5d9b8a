//! Commission and transaction ledger for the Mufambi ride-hailing platform.
//!
//! The calculation core (`commission`, `wallet`, `stats`) is pure.
//! `ledger::CommissionLedger` is the single writer that applies it to a
//! wallet snapshot; `store` makes snapshots durable.

pub mod clock;
pub mod commission;
pub mod config;
pub mod error;
pub mod event;
pub mod export;
pub mod ledger;
pub mod model;
pub mod money;
pub mod ride_feed;
pub mod rng;
pub mod stats;
pub mod store;
pub mod types;
pub mod wallet;
