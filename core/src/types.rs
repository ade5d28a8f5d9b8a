//! Shared primitive types used across the entire ledger.

/// A money amount in the ledger currency. Always rounded to cents
/// by `money::round_cents` before it is stored on a record.
pub type Money = f64;

/// A percentage in the closed range [0, 100].
pub type Percent = f64;

/// Unix epoch milliseconds, matching the persisted JSON payloads.
pub type Timestamp = i64;

/// A stable, unique identifier for any ledger entity.
pub type EntityId = String;
