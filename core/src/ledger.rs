//! The commission ledger: single writer over the wallet and transactions.
//!
//! RULES:
//!   - All wallet changes go through the pure functions in `wallet`.
//!   - Each transaction id is applied to the wallet once, so
//!     `total_transactions` counts unique transactions.
//!   - Bad commercial data never aborts a ride: an unknown tier falls back
//!     to the default rate, an unknown payment method to a zero fee.
//!     Both are logged at warn and recorded as `AnomalyDetected`.
//!   - Persistence failures are always returned to the caller.

use crate::{
    clock::LedgerClock,
    commission::{build_transaction, calculate_commission, calculate_processing_fee, split_at_rate},
    config::CommissionConfig,
    error::{LedgerError, LedgerResult},
    event::{AnomalyKind, LedgerEvent},
    model::{BankAccountDetails, CompanyWallet, RideCharge, RideTransaction, TransactionStatus},
    stats::{get_commission_stats, CommissionStats},
    store::{FinancialRepository, LedgerStore},
    types::{EntityId, Timestamp},
    wallet,
};
use log::{debug, warn};
use std::collections::{HashMap, HashSet};

pub struct CommissionLedger {
    config:       CommissionConfig,
    wallet:       CompanyWallet,
    transactions: Vec<RideTransaction>,
    by_id:        HashMap<EntityId, usize>,
    ride_ids:     HashSet<EntityId>,
    clock:        Box<dyn LedgerClock>,
    events:       Vec<LedgerEvent>,
}

impl CommissionLedger {
    /// A fresh ledger with an empty wallet.
    pub fn new(config: CommissionConfig, clock: Box<dyn LedgerClock>) -> LedgerResult<Self> {
        Self::restore(config, clock, None, Vec::new())
    }

    /// Resume from persisted state. A missing wallet starts empty.
    pub fn restore(
        config: CommissionConfig,
        clock: Box<dyn LedgerClock>,
        wallet: Option<CompanyWallet>,
        transactions: Vec<RideTransaction>,
    ) -> LedgerResult<Self> {
        config.validate()?;
        for tier in config.missing_tiers() {
            warn!(
                "commission config has no rate for tier {}; rides will use the fallback rate",
                tier.as_str()
            );
        }
        let wallet = wallet.unwrap_or_else(|| CompanyWallet::empty(clock.now()));

        let mut by_id = HashMap::with_capacity(transactions.len());
        let mut ride_ids = HashSet::with_capacity(transactions.len());
        for (idx, txn) in transactions.iter().enumerate() {
            if by_id.insert(txn.id.clone(), idx).is_some() {
                warn!("transaction id '{}' appears more than once in stored history", txn.id);
            }
            ride_ids.insert(txn.ride_id.clone());
        }

        Ok(Self {
            config,
            wallet,
            transactions,
            by_id,
            ride_ids,
            clock,
            events: Vec::new(),
        })
    }

    /// Load wallet and transactions from `repo` and resume.
    pub fn load_from(
        config: CommissionConfig,
        clock: Box<dyn LedgerClock>,
        repo: &dyn FinancialRepository,
    ) -> LedgerResult<Self> {
        let (wallet, transactions) = repo.load()?;
        Self::restore(config, clock, wallet, transactions)
    }

    /// Persist the current wallet and transaction list in one save.
    pub fn save_to(&self, repo: &mut dyn FinancialRepository) -> LedgerResult<()> {
        repo.save(&self.wallet, &self.transactions)?;
        Ok(())
    }

    /// Persist wallet, transactions and buffered events to `store` in one
    /// commit. Events are drained only after the commit succeeds, so a
    /// failed save can simply be retried. Returns the number of events written.
    pub fn checkpoint(&mut self, store: &mut LedgerStore) -> LedgerResult<usize> {
        store.save_with_events(&self.wallet, &self.transactions, &self.events)?;
        let written = self.events.len();
        self.events.clear();
        Ok(written)
    }

    // ── Accessors ──────────────────────────────────────────────

    pub fn config(&self) -> &CommissionConfig {
        &self.config
    }

    pub fn wallet(&self) -> &CompanyWallet {
        &self.wallet
    }

    pub fn transactions(&self) -> &[RideTransaction] {
        &self.transactions
    }

    pub fn transaction(&self, id: &str) -> Option<&RideTransaction> {
        self.by_id.get(id).map(|&idx| &self.transactions[idx])
    }

    pub fn events(&self) -> &[LedgerEvent] {
        &self.events
    }

    /// Hand over buffered events, e.g. to append them to a store's log.
    pub fn take_events(&mut self) -> Vec<LedgerEvent> {
        std::mem::take(&mut self.events)
    }

    pub fn stats(&self) -> CommissionStats {
        get_commission_stats(&self.transactions, &self.wallet)
    }

    // ── Operations ─────────────────────────────────────────────

    /// Create a pending transaction for a paid ride and add its
    /// commission to the pending bucket.
    pub fn record_ride(&mut self, charge: &RideCharge) -> LedgerResult<RideTransaction> {
        if self.ride_ids.contains(&charge.ride_id) {
            return Err(LedgerError::DuplicateRide {
                ride_id: charge.ride_id.clone(),
            });
        }
        let now = self.clock.now();

        let split = match calculate_commission(charge.fare_amount, charge.driver_tier, &self.config) {
            Ok(split) => split,
            Err(LedgerError::UnknownTierFallback { tier, fallback_rate }) => {
                self.anomaly(
                    now,
                    AnomalyKind::UnknownTierFallback,
                    format!(
                        "ride {}: no rate for tier {}, used {fallback_rate}%",
                        charge.ride_id,
                        tier.as_str()
                    ),
                );
                split_at_rate(charge.fare_amount, fallback_rate, &self.config)?
            }
            Err(e) => return Err(e),
        };

        if split.driver_earnings < 0.0 {
            self.anomaly(
                now,
                AnomalyKind::FloorExceedsFare,
                format!(
                    "ride {}: minimum commission {:.2} exceeds fare {:.2}",
                    charge.ride_id, split.commission_amount, charge.fare_amount
                ),
            );
        }

        let fee = match calculate_processing_fee(charge.fare_amount, charge.payment_method, &self.config) {
            Ok(fee) => fee,
            Err(LedgerError::UnknownPaymentMethod { method }) => {
                self.anomaly(
                    now,
                    AnomalyKind::UnknownPaymentMethod,
                    format!(
                        "ride {}: no processing fee for {}, charged 0",
                        charge.ride_id,
                        method.as_str()
                    ),
                );
                0.0
            }
            Err(e) => return Err(e),
        };

        let txn = build_transaction(charge, split, fee, now);
        self.wallet = wallet::update_company_wallet(&self.wallet, &txn, now);

        debug!(
            "recorded {} for ride {}: fare {:.2}, commission {:.2} at {}%",
            txn.id, txn.ride_id, txn.fare_amount, txn.commission_amount, txn.commission_rate
        );
        self.events.push(LedgerEvent::TransactionRecorded {
            at:                now,
            transaction_id:    txn.id.clone(),
            ride_id:           txn.ride_id.clone(),
            driver_tier:       charge.driver_tier,
            payment_method:    txn.payment_method,
            fare_amount:       txn.fare_amount,
            commission_amount: txn.commission_amount,
        });

        self.ride_ids.insert(txn.ride_id.clone());
        self.by_id.insert(txn.id.clone(), self.transactions.len());
        self.transactions.push(txn.clone());
        Ok(txn)
    }

    /// pending → completed.
    pub fn complete(&mut self, id: &str) -> LedgerResult<RideTransaction> {
        let idx = self.index_of(id)?;
        let now = self.clock.now();
        let (next_wallet, txn) =
            wallet::complete_transaction(&self.wallet, &self.transactions[idx], now)?;

        debug!("completed {}: +{:.2} revenue", txn.id, txn.commission_amount);
        self.events.push(LedgerEvent::TransactionCompleted {
            at:                now,
            transaction_id:    txn.id.clone(),
            commission_amount: txn.commission_amount,
        });
        self.commit(idx, next_wallet, txn)
    }

    /// pending | completed → refunded.
    pub fn refund(&mut self, id: &str) -> LedgerResult<RideTransaction> {
        self.reverse(id, TransactionStatus::Refunded)
    }

    /// pending | completed → disputed.
    pub fn dispute(&mut self, id: &str) -> LedgerResult<RideTransaction> {
        self.reverse(id, TransactionStatus::Disputed)
    }

    pub fn link_bank_account(&mut self, details: BankAccountDetails) -> LedgerResult<()> {
        let now = self.clock.now();
        let next = wallet::link_bank_account(&self.wallet, details, now)?;
        if let Some(bank) = &next.bank_account_details {
            debug!("linked payout account at {}", bank.bank_name);
            self.events.push(LedgerEvent::BankAccountLinked {
                at:                    now,
                bank_name:             bank.bank_name.clone(),
                masked_account_number: bank.masked_account_number(),
            });
        }
        self.wallet = next;
        Ok(())
    }

    // ── Internals ──────────────────────────────────────────────

    fn reverse(&mut self, id: &str, to: TransactionStatus) -> LedgerResult<RideTransaction> {
        let idx = self.index_of(id)?;
        let now = self.clock.now();
        let current = &self.transactions[idx];
        let from = current.status;
        let (next_wallet, txn) = match to {
            TransactionStatus::Disputed => wallet::dispute_transaction(&self.wallet, current, now)?,
            _ => wallet::refund_transaction(&self.wallet, current, now)?,
        };

        debug!(
            "{} {} → {}: -{:.2}",
            txn.id,
            from.as_str(),
            to.as_str(),
            txn.commission_amount
        );
        self.events.push(LedgerEvent::TransactionReversed {
            at: now,
            transaction_id: txn.id.clone(),
            from,
            to,
            commission_amount: txn.commission_amount,
        });
        self.commit(idx, next_wallet, txn)
    }

    fn commit(
        &mut self,
        idx: usize,
        next_wallet: CompanyWallet,
        txn: RideTransaction,
    ) -> LedgerResult<RideTransaction> {
        self.wallet = next_wallet;
        self.transactions[idx] = txn.clone();
        Ok(txn)
    }

    fn index_of(&self, id: &str) -> LedgerResult<usize> {
        self.by_id
            .get(id)
            .copied()
            .ok_or_else(|| LedgerError::UnknownTransaction { id: id.to_string() })
    }

    fn anomaly(&mut self, at: Timestamp, kind: AnomalyKind, detail: String) {
        warn!("ledger anomaly ({kind:?}): {detail}");
        self.events.push(LedgerEvent::AnomalyDetected { at, kind, detail });
    }
}
