//! Company wallet transitions.
//!
//! RULE: the wallet is only ever changed through these functions.
//! Each takes a snapshot and returns a new one; nothing is mutated in place.
//! Deductions clamp at zero instead of failing, so a double refund or a
//! refund with no prior completion can never push a bucket negative.

use crate::{
    error::{LedgerError, LedgerResult},
    model::{BankAccountDetails, CompanyWallet, RideTransaction, TransactionStatus},
    money::round_cents,
    types::{Money, Timestamp},
};

/// Apply a transaction to the wallet according to its current status.
///
/// `total_transactions` grows by one on every call, whatever the status.
/// Callers that want one count per ride apply each transaction once
/// (the `CommissionLedger` facade does).
pub fn update_company_wallet(
    wallet: &CompanyWallet,
    txn: &RideTransaction,
    now: Timestamp,
) -> CompanyWallet {
    let mut next = wallet.clone();
    next.total_transactions += 1;

    let amount = txn.commission_amount;
    match txn.status {
        TransactionStatus::Completed => {
            next.total_revenue = round_cents(next.total_revenue + amount);
            next.completed_commission = round_cents(next.completed_commission + amount);
        }
        TransactionStatus::Pending => {
            next.pending_commission = round_cents(next.pending_commission + amount);
        }
        TransactionStatus::Refunded | TransactionStatus::Disputed => {
            next.total_revenue = clamped_sub(next.total_revenue, amount);
            next.completed_commission = clamped_sub(next.completed_commission, amount);
        }
    }

    next.last_updated = now;
    next
}

/// pending → completed. Moves the commission from the pending bucket
/// into completed commission and revenue.
pub fn complete_transaction(
    wallet: &CompanyWallet,
    txn: &RideTransaction,
    now: Timestamp,
) -> LedgerResult<(CompanyWallet, RideTransaction)> {
    if txn.status != TransactionStatus::Pending {
        return Err(LedgerError::InvalidTransition {
            id:   txn.id.clone(),
            from: txn.status,
            to:   TransactionStatus::Completed,
        });
    }

    let amount = txn.commission_amount;
    let mut next = wallet.clone();
    next.pending_commission = clamped_sub(next.pending_commission, amount);
    next.completed_commission = round_cents(next.completed_commission + amount);
    next.total_revenue = round_cents(next.total_revenue + amount);
    next.last_updated = now;

    let mut completed = txn.clone();
    completed.status = TransactionStatus::Completed;
    Ok((next, completed))
}

/// pending | completed → refunded.
pub fn refund_transaction(
    wallet: &CompanyWallet,
    txn: &RideTransaction,
    now: Timestamp,
) -> LedgerResult<(CompanyWallet, RideTransaction)> {
    reverse(wallet, txn, TransactionStatus::Refunded, now)
}

/// pending | completed → disputed. The commission is held back from the
/// wallet exactly as a refund would be.
pub fn dispute_transaction(
    wallet: &CompanyWallet,
    txn: &RideTransaction,
    now: Timestamp,
) -> LedgerResult<(CompanyWallet, RideTransaction)> {
    reverse(wallet, txn, TransactionStatus::Disputed, now)
}

fn reverse(
    wallet: &CompanyWallet,
    txn: &RideTransaction,
    to: TransactionStatus,
    now: Timestamp,
) -> LedgerResult<(CompanyWallet, RideTransaction)> {
    let amount = txn.commission_amount;
    let mut next = wallet.clone();

    match txn.status {
        TransactionStatus::Pending => {
            next.pending_commission = clamped_sub(next.pending_commission, amount);
        }
        TransactionStatus::Completed => {
            next.total_revenue = clamped_sub(next.total_revenue, amount);
            next.completed_commission = clamped_sub(next.completed_commission, amount);
        }
        TransactionStatus::Refunded | TransactionStatus::Disputed => {
            return Err(LedgerError::NonMonotonicRefund {
                id:     txn.id.clone(),
                status: txn.status,
            });
        }
    }
    next.last_updated = now;

    let mut reversed = txn.clone();
    reversed.status = to;
    Ok((next, reversed))
}

/// Attach the company's payout account. Name, bank and a numeric
/// account number are required; the routing number is free-form.
pub fn link_bank_account(
    wallet: &CompanyWallet,
    details: BankAccountDetails,
    now: Timestamp,
) -> LedgerResult<CompanyWallet> {
    let details = BankAccountDetails {
        account_name:   details.account_name.trim().to_string(),
        account_number: details.account_number.trim().to_string(),
        bank_name:      details.bank_name.trim().to_string(),
        routing_number: details.routing_number.trim().to_string(),
    };

    if details.account_name.is_empty() {
        return Err(bad_account("account name is required"));
    }
    if details.bank_name.is_empty() {
        return Err(bad_account("bank name is required"));
    }
    if details.account_number.is_empty()
        || !details.account_number.chars().all(|c| c.is_ascii_digit())
    {
        return Err(bad_account("account number must be digits only"));
    }

    let mut next = wallet.clone();
    next.bank_account_linked = true;
    next.bank_account_details = Some(details);
    next.last_updated = now;
    Ok(next)
}

fn clamped_sub(balance: Money, amount: Money) -> Money {
    round_cents((balance - amount).max(0.0))
}

fn bad_account(reason: &str) -> LedgerError {
    LedgerError::InvalidBankAccount { reason: reason.into() }
}
