//! CSV export of the transaction list, as offered on the company dashboard.

use crate::{model::RideTransaction, types::Timestamp};
use chrono::{TimeZone, Utc};

const HEADER: [&str; 10] = [
    "Transaction ID",
    "Date",
    "Driver",
    "Passenger",
    "Fare",
    "Commission Rate",
    "Commission",
    "Driver Earnings",
    "Payment Method",
    "Status",
];

/// One header row plus one row per transaction, `\n`-separated.
pub fn transactions_csv(transactions: &[RideTransaction]) -> String {
    let mut lines = Vec::with_capacity(transactions.len() + 1);
    lines.push(HEADER.join(","));

    for t in transactions {
        let row = [
            escape(&t.id),
            render_date(t.timestamp),
            escape(&t.driver_name),
            escape(&t.passenger_name),
            format!("{:.2}", t.fare_amount),
            format!("{}%", t.commission_rate),
            format!("{:.2}", t.commission_amount),
            format!("{:.2}", t.driver_earnings),
            t.payment_method.as_str().to_string(),
            t.status.as_str().to_string(),
        ];
        lines.push(row.join(","));
    }
    lines.join("\n")
}

fn render_date(ts: Timestamp) -> String {
    Utc.timestamp_millis_opt(ts)
        .single()
        .map(|d| d.format("%Y-%m-%d").to_string())
        .unwrap_or_default()
}

fn escape(field: &str) -> String {
    if field.contains([',', '"', '\n', '\r']) {
        format!("\"{}\"", field.replace('"', "\"\""))
    } else {
        field.to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{DriverTier, PaymentMethod, TransactionStatus};

    fn txn(driver_name: &str) -> RideTransaction {
        RideTransaction {
            id:                "txn-1".into(),
            ride_id:           "ride-1".into(),
            driver_id:         "drv-1".into(),
            driver_name:       driver_name.into(),
            passenger_id:      "pax-1".into(),
            passenger_name:    "Rudo Moyo".into(),
            driver_tier:       Some(DriverTier::Gold),
            fare_amount:       20.0,
            commission_rate:   10.0,
            commission_amount: 2.0,
            driver_earnings:   18.0,
            payment_method:    PaymentMethod::Ecocash,
            processing_fee:    0.3,
            timestamp:         1_700_000_000_000,
            status:            TransactionStatus::Completed,
        }
    }

    #[test]
    fn writes_header_and_rows() {
        let csv = transactions_csv(&[txn("Tendai Ncube")]);
        let lines: Vec<&str> = csv.lines().collect();
        assert_eq!(lines.len(), 2);
        assert!(lines[0].starts_with("Transaction ID,Date,"));
        assert_eq!(
            lines[1],
            "txn-1,2023-11-14,Tendai Ncube,Rudo Moyo,20.00,10%,2.00,18.00,ECOCASH,completed"
        );
    }

    #[test]
    fn quotes_fields_with_commas_and_quotes() {
        let csv = transactions_csv(&[txn("Ncube, \"TJ\" Tendai")]);
        assert!(csv.contains("\"Ncube, \"\"TJ\"\" Tendai\""), "{csv}");
    }

    #[test]
    fn quotes_fields_with_carriage_returns() {
        let csv = transactions_csv(&[txn("Tendai\rNcube")]);
        assert!(csv.contains(",\"Tendai\rNcube\","), "{csv:?}");
    }

    #[test]
    fn empty_list_is_header_only() {
        assert_eq!(transactions_csv(&[]).lines().count(), 1);
    }
}
