use super::bad_column;
use crate::{
    error::PersistenceResult,
    model::{DriverTier, PaymentMethod, RideTransaction, TransactionStatus},
};
use rusqlite::{params, Connection};

/// Replace the stored list with `transactions`, keeping their order.
/// Runs inside the caller's DB transaction.
pub(super) fn replace_transactions(
    conn: &Connection,
    transactions: &[RideTransaction],
) -> PersistenceResult<()> {
    conn.execute("DELETE FROM ride_transaction", [])?;
    let mut stmt = conn.prepare(
        "INSERT INTO ride_transaction (
             id, ride_id, driver_id, driver_name, passenger_id, passenger_name,
             driver_tier, fare_amount, commission_rate, commission_amount,
             driver_earnings, payment_method, processing_fee, timestamp, status)
         VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11, ?12, ?13, ?14, ?15)",
    )?;
    for t in transactions {
        stmt.execute(params![
            t.id,
            t.ride_id,
            t.driver_id,
            t.driver_name,
            t.passenger_id,
            t.passenger_name,
            t.driver_tier.map(|tier| tier.as_str()),
            t.fare_amount,
            t.commission_rate,
            t.commission_amount,
            t.driver_earnings,
            t.payment_method.as_str(),
            t.processing_fee,
            t.timestamp,
            t.status.as_str(),
        ])?;
    }
    Ok(())
}

pub(super) fn read_transactions(conn: &Connection) -> PersistenceResult<Vec<RideTransaction>> {
    let mut stmt = conn.prepare(
        "SELECT id, ride_id, driver_id, driver_name, passenger_id, passenger_name,
                driver_tier, fare_amount, commission_rate, commission_amount,
                driver_earnings, payment_method, processing_fee, timestamp, status
         FROM ride_transaction ORDER BY seq ASC",
    )?;
    let rows = stmt.query_map([], |row| {
        let driver_tier = match row.get::<_, Option<String>>(6)? {
            Some(s) => Some(DriverTier::parse(&s).ok_or_else(|| bad_column(6, &s))?),
            None => None,
        };
        let method: String = row.get(11)?;
        let status: String = row.get(14)?;
        Ok(RideTransaction {
            id:                row.get(0)?,
            ride_id:           row.get(1)?,
            driver_id:         row.get(2)?,
            driver_name:       row.get(3)?,
            passenger_id:      row.get(4)?,
            passenger_name:    row.get(5)?,
            driver_tier,
            fare_amount:       row.get(7)?,
            commission_rate:   row.get(8)?,
            commission_amount: row.get(9)?,
            driver_earnings:   row.get(10)?,
            payment_method:    PaymentMethod::parse(&method)
                .ok_or_else(|| bad_column(11, &method))?,
            processing_fee:    row.get(12)?,
            timestamp:         row.get(13)?,
            status:            TransactionStatus::parse(&status)
                .ok_or_else(|| bad_column(14, &status))?,
        })
    })?;
    rows.collect::<Result<Vec<_>, _>>().map_err(Into::into)
}
