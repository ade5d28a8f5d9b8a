//! Cent rounding and display formatting.
//!
//! RULE: every money value written to a ledger record goes through
//! `round_cents`. Using one rounding mode everywhere keeps re-derived
//! totals from drifting by a cent.

use crate::types::Money;

/// Round to 2 decimal places, half away from zero.
pub fn round_cents(amount: Money) -> Money {
    let rounded = (amount * 100.0).round() / 100.0;
    // Normalise -0.0 so it never renders as "-$0.00".
    if rounded == 0.0 {
        0.0
    } else {
        rounded
    }
}

/// Format an amount for display, en-US style: "$1,234.56".
///
/// USD, EUR and GBP get their symbol; any other ISO code is printed as
/// a prefix ("ZAR 1,234.56").
pub fn format_currency(amount: Money, currency: &str) -> String {
    let rounded = round_cents(amount);
    let sign = if rounded < 0.0 { "-" } else { "" };
    let cents = (rounded.abs() * 100.0).round() as u64;
    let body = format!("{}.{:02}", group_thousands(cents / 100), cents % 100);

    match currency.to_ascii_uppercase().as_str() {
        "USD" => format!("{sign}${body}"),
        "EUR" => format!("{sign}€{body}"),
        "GBP" => format!("{sign}£{body}"),
        other => format!("{sign}{other} {body}"),
    }
}

fn group_thousands(whole: u64) -> String {
    let digits = whole.to_string();
    let mut out = String::with_capacity(digits.len() + digits.len() / 3);
    for (i, ch) in digits.chars().enumerate() {
        if i > 0 && (digits.len() - i) % 3 == 0 {
            out.push(',');
        }
        out.push(ch);
    }
    out
}
