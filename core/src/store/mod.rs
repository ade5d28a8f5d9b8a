//! Persistence boundary.
//!
//! RULE: only the store modules talk to storage.
//! Ledger functions never perform I/O; callers hand snapshots to a
//! `FinancialRepository` to make them durable.

use crate::{
    error::PersistenceResult,
    event::{EventLogEntry, LedgerEvent},
    model::{CompanyWallet, RideTransaction},
};
use rusqlite::{params, Connection};

mod json_file;
mod transaction;
mod wallet;

pub use json_file::JsonFileStore;

/// Durable home for the wallet and the transaction list.
///
/// `save` writes both as one unit: after a crash a reader sees either
/// the previous pair or the new pair, never a mix.
pub trait FinancialRepository {
    fn save(
        &mut self,
        wallet: &CompanyWallet,
        transactions: &[RideTransaction],
    ) -> PersistenceResult<()>;

    /// `None` wallet means nothing has been saved yet.
    fn load(&self) -> PersistenceResult<(Option<CompanyWallet>, Vec<RideTransaction>)>;
}

/// SQLite-backed repository.
pub struct LedgerStore {
    conn: Connection,
    path: Option<String>, // None for :memory:, Some(path) for file
}

impl LedgerStore {
    pub fn open(path: &str) -> PersistenceResult<Self> {
        let conn = Connection::open(path)?;
        // WAL mode only matters for real files; :memory: ignores it.
        let _ = conn.execute_batch("PRAGMA journal_mode=WAL;");
        Ok(Self {
            conn,
            path: Some(path.to_string()),
        })
    }

    /// Open an in-memory database (used in tests).
    pub fn in_memory() -> PersistenceResult<Self> {
        let conn = Connection::open_in_memory()?;
        Ok(Self { conn, path: None })
    }

    /// Apply all schema migrations in order.
    pub fn migrate(&self) -> PersistenceResult<()> {
        self.conn
            .execute_batch(include_str!("../../../migrations/001_ledger.sql"))?;
        Ok(())
    }

    // ── Event log ──────────────────────────────────────────────

    pub fn append_events(&mut self, events: &[LedgerEvent]) -> PersistenceResult<()> {
        let tx = self.conn.transaction()?;
        insert_events(&tx, events)?;
        tx.commit()?;
        Ok(())
    }

    /// Wallet, transactions and the events that produced them, committed
    /// together. On error nothing is written.
    pub fn save_with_events(
        &mut self,
        wallet: &CompanyWallet,
        transactions: &[RideTransaction],
        events: &[LedgerEvent],
    ) -> PersistenceResult<()> {
        let tx = self.conn.transaction()?;
        wallet::write_wallet(&tx, wallet)?;
        transaction::replace_transactions(&tx, transactions)?;
        insert_events(&tx, events)?;
        tx.commit()?;
        log::info!(
            "saved wallet, {} transaction(s) and {} event(s) to {}",
            transactions.len(),
            events.len(),
            self.path.as_deref().unwrap_or(":memory:")
        );
        Ok(())
    }

    pub fn event_log(&self) -> PersistenceResult<Vec<EventLogEntry>> {
        let mut stmt = self.conn.prepare(
            "SELECT id, at, event_type, payload FROM event_log ORDER BY id ASC",
        )?;
        let entries = stmt
            .query_map([], |row| {
                Ok(EventLogEntry {
                    id:         Some(row.get(0)?),
                    at:         row.get(1)?,
                    event_type: row.get(2)?,
                    payload:    row.get(3)?,
                })
            })?
            .collect::<Result<Vec<_>, _>>()?;
        Ok(entries)
    }

    pub fn transaction_count(&self, status: Option<&str>) -> PersistenceResult<i64> {
        let count = match status {
            Some(s) => self.conn.query_row(
                "SELECT COUNT(*) FROM ride_transaction WHERE status = ?1",
                params![s],
                |row| row.get(0),
            )?,
            None => self
                .conn
                .query_row("SELECT COUNT(*) FROM ride_transaction", [], |row| row.get(0))?,
        };
        Ok(count)
    }
}

impl FinancialRepository for LedgerStore {
    fn save(
        &mut self,
        wallet: &CompanyWallet,
        transactions: &[RideTransaction],
    ) -> PersistenceResult<()> {
        let tx = self.conn.transaction()?;
        wallet::write_wallet(&tx, wallet)?;
        transaction::replace_transactions(&tx, transactions)?;
        tx.commit()?;
        log::info!(
            "saved wallet and {} transaction(s) to {}",
            transactions.len(),
            self.path.as_deref().unwrap_or(":memory:")
        );
        Ok(())
    }

    fn load(&self) -> PersistenceResult<(Option<CompanyWallet>, Vec<RideTransaction>)> {
        let wallet = wallet::read_wallet(&self.conn)?;
        let transactions = transaction::read_transactions(&self.conn)?;
        Ok((wallet, transactions))
    }
}

fn insert_events(conn: &Connection, events: &[LedgerEvent]) -> PersistenceResult<()> {
    for event in events {
        let entry = EventLogEntry::from_event(event)?;
        conn.execute(
            "INSERT INTO event_log (at, event_type, payload) VALUES (?1, ?2, ?3)",
            params![entry.at, entry.event_type, entry.payload],
        )?;
    }
    Ok(())
}

/// Map a bad enum string in a row to a conversion error on that column.
fn bad_column(idx: usize, value: &str) -> rusqlite::Error {
    rusqlite::Error::FromSqlConversionFailure(
        idx,
        rusqlite::types::Type::Text,
        Box::new(std::io::Error::new(
            std::io::ErrorKind::InvalidData,
            format!("unexpected value '{value}'"),
        )),
    )
}
