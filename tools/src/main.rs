//! ledger-runner: headless driver for the Mufambi commission ledger.
//!
//! Usage:
//!   ledger-runner --seed 12345 --rides 500 --db ledger.db
//!   ledger-runner --db ledger.db --json ledger.json --export-csv txns.csv
//!   ledger-runner --db ledger.db --ipc-mode

use anyhow::Result;
use mufambi_ledger::{
    clock::SystemClock,
    config::CommissionConfig,
    error::LedgerResult,
    export::transactions_csv,
    ledger::CommissionLedger,
    model::{BankAccountDetails, RideCharge},
    money::format_currency,
    ride_feed::{replay, FeedConfig, ReplaySummary, RideFeed},
    stats::CommissionStats,
    store::{JsonFileStore, LedgerStore},
};
use std::env;
use std::io::{self, BufRead, Write};

/// One JSON object per stdin line in IPC mode.
#[derive(serde::Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
enum IpcCommand {
    GetState,
    RecordRide { charge: RideCharge },
    Complete { id: String },
    Refund { id: String },
    Dispute { id: String },
    LinkBankAccount { details: BankAccountDetails },
    Save,
    Quit,
}

#[derive(serde::Serialize)]
#[serde(rename_all = "camelCase")]
struct UiState<'a> {
    total_revenue:        f64,
    completed_commission: f64,
    pending_commission:   f64,
    total_transactions:   u64,
    bank_account_linked:  bool,
    stats:                &'a CommissionStats,
}

#[derive(serde::Serialize)]
#[serde(rename_all = "camelCase")]
struct RunSummary {
    seed:       u64,
    started_at: String,
    replay:     ReplaySummary,
    stats:      CommissionStats,
}

fn main() -> Result<()> {
    env_logger::init();

    let args: Vec<String> = env::args().collect();
    let seed = parse_arg(&args, "--seed", 42u64);
    let rides = parse_arg(&args, "--rides", 100u64);
    let ipc_mode = has_flag(&args, "--ipc-mode");
    let summary_json = has_flag(&args, "--summary-json");
    let db = str_arg(&args, "--db").unwrap_or(":memory:");
    let json_path = str_arg(&args, "--json");
    let csv_path = str_arg(&args, "--export-csv");
    let currency = str_arg(&args, "--currency").unwrap_or("USD");

    let config = match str_arg(&args, "--config") {
        Some(path) => CommissionConfig::load(path)?,
        None => CommissionConfig::default(),
    };

    let defaults = FeedConfig::default();
    let feed_config = FeedConfig {
        rides,
        complete_ratio: parse_arg(&args, "--complete-ratio", defaults.complete_ratio),
        refund_ratio: parse_arg(&args, "--refund-ratio", defaults.refund_ratio),
        dispute_ratio: parse_arg(&args, "--dispute-ratio", defaults.dispute_ratio),
        ..defaults
    };

    if !ipc_mode && !summary_json {
        println!("Mufambi ledger-runner");
        println!("  seed:      {seed}");
        println!("  rides:     {rides}");
        println!("  db:        {db}");
        println!();
    }

    let mut store = if db == ":memory:" {
        LedgerStore::in_memory()?
    } else {
        LedgerStore::open(db)?
    };
    store.migrate()?;

    let mut ledger = CommissionLedger::load_from(config, Box::new(SystemClock), &store)?;
    if !ledger.transactions().is_empty() {
        log::info!("resumed {} stored transaction(s)", ledger.transactions().len());
    }

    if ipc_mode {
        let stdin = io::stdin();
        return run_ipc_loop(&mut ledger, &mut store, stdin.lock(), io::stdout());
    }

    let started_at = chrono::Utc::now().to_rfc3339();
    let batch = RideFeed::new(seed, feed_config).take_batch();
    let summary = replay(&mut ledger, &batch)?;

    persist(&mut ledger, &mut store)?;
    if let Some(path) = json_path {
        ledger.save_to(&mut JsonFileStore::new(path))?;
    }
    if let Some(path) = csv_path {
        std::fs::write(path, transactions_csv(ledger.transactions()))?;
    }

    if summary_json {
        let run = RunSummary {
            seed,
            started_at,
            replay: summary,
            stats: ledger.stats(),
        };
        println!("{}", serde_json::to_string_pretty(&run)?);
    } else {
        print_summary(&ledger, &summary, currency);
    }
    Ok(())
}

fn persist(ledger: &mut CommissionLedger, store: &mut LedgerStore) -> Result<()> {
    let written = ledger.checkpoint(store)?;
    log::debug!("checkpoint wrote {written} event(s)");
    Ok(())
}

fn run_ipc_loop<R: BufRead, W: Write>(
    ledger: &mut CommissionLedger,
    store: &mut LedgerStore,
    mut input: R,
    mut output: W,
) -> Result<()> {
    let mut buffer = String::new();

    loop {
        buffer.clear();
        let bytes_read = input.read_line(&mut buffer)?;
        if bytes_read == 0 {
            break; // EOF
        }

        let cmd: IpcCommand = match serde_json::from_str(&buffer) {
            Ok(c) => c,
            Err(e) => {
                write_error(&mut output, &e.to_string())?;
                continue;
            }
        };
        if let IpcCommand::Quit = cmd {
            break;
        }

        match apply_command(ledger, store, cmd) {
            Ok(()) => {
                let stats = ledger.stats();
                writeln!(output, "{}", serde_json::to_string(&ui_state(ledger, &stats))?)?;
            }
            Err(e) => {
                log::warn!("ipc command failed: {e}");
                write_error(&mut output, &e.to_string())?;
            }
        }
        output.flush()?;
    }

    // Anything not yet saved is flushed on exit.
    persist(ledger, store)
}

/// Apply one command. Failures, including a failed save, are returned
/// for the loop to report; the in-memory ledger is left as it was.
fn apply_command(
    ledger: &mut CommissionLedger,
    store: &mut LedgerStore,
    cmd: IpcCommand,
) -> LedgerResult<()> {
    match cmd {
        IpcCommand::GetState | IpcCommand::Quit => Ok(()),
        IpcCommand::RecordRide { charge } => ledger.record_ride(&charge).map(|_| ()),
        IpcCommand::Complete { id } => ledger.complete(&id).map(|_| ()),
        IpcCommand::Refund { id } => ledger.refund(&id).map(|_| ()),
        IpcCommand::Dispute { id } => ledger.dispute(&id).map(|_| ()),
        IpcCommand::LinkBankAccount { details } => ledger.link_bank_account(details),
        IpcCommand::Save => ledger.checkpoint(store).map(|_| ()),
    }
}

fn ui_state<'a>(ledger: &CommissionLedger, stats: &'a CommissionStats) -> UiState<'a> {
    let wallet = ledger.wallet();
    UiState {
        total_revenue:        wallet.total_revenue,
        completed_commission: wallet.completed_commission,
        pending_commission:   wallet.pending_commission,
        total_transactions:   wallet.total_transactions,
        bank_account_linked:  wallet.bank_account_linked,
        stats,
    }
}

fn write_error<W: Write>(output: &mut W, message: &str) -> Result<()> {
    let err_json = serde_json::json!({ "error": message });
    writeln!(output, "{}", err_json)?;
    output.flush()?;
    Ok(())
}

fn print_summary(ledger: &CommissionLedger, replay: &ReplaySummary, currency: &str) {
    let wallet = ledger.wallet();
    let stats = ledger.stats();
    let money = |v: f64| format_currency(v, currency);

    println!("=== RUN SUMMARY ===");
    println!("  recorded:       {}", replay.recorded);
    println!("  completed:      {}", replay.completed);
    println!("  refunded:       {}", replay.refunded);
    println!("  disputed:       {}", replay.disputed);
    println!("  still pending:  {}", replay.pending);

    println!();
    println!("=== COMPANY WALLET ===");
    println!("  total revenue:        {}", money(wallet.total_revenue));
    println!("  completed commission: {}", money(wallet.completed_commission));
    println!("  pending commission:   {}", money(wallet.pending_commission));
    println!("  transactions:         {}", wallet.total_transactions);
    match &wallet.bank_account_details {
        Some(bank) if wallet.bank_account_linked => {
            println!("  payout account:       {} {}", bank.bank_name, bank.masked_account_number());
        }
        _ => println!("  payout account:       (not linked)"),
    }

    println!();
    println!("=== COMMISSION STATS ===");
    println!("  completed rides:    {}", stats.total_rides);
    println!("  commission revenue: {}", money(stats.total_revenue));
    println!("  average commission: {}", money(stats.average_commission));
    for (tier, b) in &stats.commission_by_tier {
        println!(
            "  {:<8} {:>5} rides  {:>12}   ({})",
            tier.as_str(),
            b.count,
            money(b.total),
            ledger.config().description_for(*tier)
        );
    }
    for (method, b) in &stats.commission_by_payment_method {
        println!("  {:<8} {:>5} rides  {:>12}", method.as_str(), b.count, money(b.total));
    }
}

fn parse_arg<T: std::str::FromStr + Copy>(args: &[String], flag: &str, default: T) -> T {
    args.windows(2)
        .find(|w| w[0] == flag)
        .and_then(|w| w[1].parse().ok())
        .unwrap_or(default)
}

fn str_arg<'a>(args: &'a [String], flag: &str) -> Option<&'a str> {
    args.windows(2)
        .find(|w| w[0] == flag)
        .map(|w| w[1].as_str())
}

fn has_flag(args: &[String], flag: &str) -> bool {
    args.iter().any(|a| a == flag)
}

#[cfg(test)]
mod tests {
    use super::*;
    use mufambi_ledger::clock::ManualClock;

    const RECORD_RIDE: &str = r#"{"type":"record_ride","charge":{"rideId":"ride-1","driverId":"drv-1","driverName":"Tendai Moyo","passengerId":"pax-1","passengerName":"Chipo Dube","fareAmount":20.0,"driverTier":"Gold","paymentMethod":"CASH"}}"#;

    fn ledger() -> CommissionLedger {
        CommissionLedger::new(CommissionConfig::default(), Box::new(ManualClock::new(0, 1))).unwrap()
    }

    fn run(store: &mut LedgerStore, ledger: &mut CommissionLedger, lines: &[&str]) -> (Result<()>, Vec<String>) {
        let input = lines.join("\n");
        let mut output = Vec::new();
        let result = run_ipc_loop(ledger, store, input.as_bytes(), &mut output);
        let replies = String::from_utf8(output)
            .unwrap()
            .lines()
            .map(str::to_string)
            .collect();
        (result, replies)
    }

    #[test]
    fn failed_save_is_reported_and_loop_keeps_serving() {
        // No migration: every write to this store fails.
        let mut store = LedgerStore::in_memory().unwrap();
        let mut ledger = ledger();

        let (_, replies) = run(
            &mut store,
            &mut ledger,
            &[RECORD_RIDE, r#"{"type":"save"}"#, r#"{"type":"get_state"}"#, r#"{"type":"quit"}"#],
        );

        assert_eq!(replies.len(), 3, "{replies:?}");
        assert!(replies[0].contains("\"pendingCommission\":2.0"), "{}", replies[0]);
        assert!(replies[1].starts_with("{\"error\":"), "{}", replies[1]);
        assert!(replies[2].contains("\"totalTransactions\":1"), "{}", replies[2]);
        // Nothing was drained by the failed saves.
        assert_eq!(ledger.transactions().len(), 1);
        assert!(!ledger.events().is_empty());
    }

    #[test]
    fn save_commits_state_and_events() {
        let mut store = LedgerStore::in_memory().unwrap();
        store.migrate().unwrap();
        let mut ledger = ledger();

        let (result, replies) = run(&mut store, &mut ledger, &[RECORD_RIDE, r#"{"type":"save"}"#]);

        result.unwrap();
        assert_eq!(replies.len(), 2);
        assert!(ledger.events().is_empty());
        assert_eq!(store.transaction_count(None).unwrap(), 1);
        assert_eq!(store.event_log().unwrap().len(), 1);
    }
}
