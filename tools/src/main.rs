//! desk-runner: headless driver for the AML desk.
//!
//! Usage:
//!   desk-runner --seed 12345 --data-dir ./data
//!   desk-runner --seed 12345 --db progress.db --profile analyst --ipc-mode
//!
//! In IPC mode every stdin line is one JSON DeskCommand, e.g.
//!   {"cmd":"add_transaction","transaction":{"amount":9999,"sender":"Cash Corp","recipient":"Bob"}}
//! and every reply is one JSON line on stdout.

use aml_desk_core::{
    clock::SystemClock,
    command::DeskCommand,
    config::DeskConfig,
    desk::Desk,
    store::DeskStore,
    transaction_store::TransactionDraft,
};
use anyhow::Result;
use std::env;
use std::io::{self, BufRead, Write};
use std::sync::Arc;

const DEFAULT_PROFILE: &str = "user-storage";

fn main() -> Result<()> {
    env_logger::init();

    let args: Vec<String> = env::args().collect();
    let seed = parse_arg(&args, "--seed", chrono::Utc::now().timestamp_millis() as u64);
    let ipc_mode = args.iter().any(|a| a == "--ipc-mode");
    let db = string_arg(&args, "--db");
    let data_dir = string_arg(&args, "--data-dir").unwrap_or("./data");
    let profile = string_arg(&args, "--profile").unwrap_or(DEFAULT_PROFILE);

    let config = match DeskConfig::load(data_dir) {
        Ok(config) => config,
        Err(e) => {
            log::warn!("{e}; using built-in defaults");
            DeskConfig::default()
        }
    };

    if !ipc_mode {
        println!("AML Desk: desk-runner");
        println!("  seed:      {seed}");
        println!("  db:        {}", db.unwrap_or("(progress not persisted)"));
        println!("  data_dir:  {data_dir}");
        println!("  profile:   {profile}");
        println!();
    }

    let mut desk = Desk::new(config, seed, Arc::new(SystemClock));
    if let Some(path) = db {
        desk = desk.with_progress_store(DeskStore::open(path)?, profile)?;
    }

    if ipc_mode {
        run_ipc_loop(&mut desk)
    } else {
        run_demo(&mut desk)
    }
}

fn run_ipc_loop(desk: &mut Desk) -> Result<()> {
    let stdin = io::stdin();
    let mut stdout = io::stdout();
    let mut handle = stdin.lock();
    let mut buffer = String::new();

    desk.mount()?;

    loop {
        buffer.clear();
        let bytes_read = handle.read_line(&mut buffer)?;
        if bytes_read == 0 {
            break; // EOF
        }
        if buffer.trim().is_empty() {
            continue;
        }
        if buffer.trim() == "quit" {
            break;
        }

        let reply = respond(desk, &buffer);
        writeln!(stdout, "{reply}")?;
        stdout.flush()?;
    }

    desk.unmount();
    Ok(())
}

/// One IPC request line in, one JSON reply out. Failures become
/// `{"error": ...}` replies and never end the loop.
fn respond(desk: &mut Desk, line: &str) -> serde_json::Value {
    // Periodic sync piggybacks on incoming commands.
    if let Err(e) = desk.poll() {
        log::error!("Periodic sync failed: {e}");
        return serde_json::json!({ "error": e.to_string() });
    }

    let command = match serde_json::from_str::<DeskCommand>(line) {
        Ok(command) => command,
        Err(e) => {
            log::warn!("Unparseable command: {}", line.trim());
            return serde_json::json!({ "error": e.to_string() });
        }
    };
    match desk.execute(command).and_then(|reply| Ok(serde_json::to_value(&reply)?)) {
        Ok(reply) => reply,
        Err(e) => serde_json::json!({ "error": e.to_string() }),
    }
}

fn run_demo(desk: &mut Desk) -> Result<()> {
    let samples = [
        (4_200.0, "Acme Payroll", "Jane Doe", None),
        (9_999.0, "Cash Express LLC", "Unknown Beneficiary", Some("Split deposit")),
        (75_000.0, "Offshore Holdings Ltd", "Shell Trading Co", Some("Consulting fees")),
        (25_000.0, "Foreign Exchange Partners", "Northwind Imports", None),
        (4_999.0, "Anonymous Donor", "Charity Fund", None),
        (12_500.0, "Globex Corp", "Initech", Some("Invoice 2231")),
    ];

    for (amount, sender, recipient, description) in samples {
        let tx = desk.add_transaction(TransactionDraft {
            amount,
            sender: sender.to_string(),
            recipient: recipient.to_string(),
            description: description.map(str::to_string),
        })?;
        println!(
            "  {:<16} {:>10.2}  {:<26} -> {:<22} score {:>3}  {}",
            tx.id, tx.amount, tx.sender, tx.recipient, tx.risk_score, tx.status
        );
    }

    let derived = desk.mount()?;
    desk.unmount();

    println!();
    println!("=== DERIVED CASES ===");
    if derived.is_empty() {
        println!("  (none)");
    }
    for case in &derived {
        println!(
            "  {} [{} / {}] {}% {}",
            case.id, case.risk_level, case.status, case.ml_confidence, case.title
        );
    }

    let summary = desk.summary();
    println!();
    println!("=== DESK SUMMARY ===");
    println!("  transactions:   {}", summary.total_transactions);
    println!("  flagged:        {}", summary.flagged_transactions);
    println!(
        "  risk bands:     high {} / medium {} / low {}",
        summary.risk_bands.high, summary.risk_bands.medium, summary.risk_bands.low
    );
    println!("  mean score:     {:.1}", summary.mean_risk_score);
    println!("  cases:          {}", summary.total_cases);
    println!("  open cases:     {}", summary.open_cases);
    println!("  progress:       {}", serde_json::to_string(desk.progress())?);
    Ok(())
}

fn parse_arg<T: std::str::FromStr + Copy>(args: &[String], flag: &str, default: T) -> T {
    args.windows(2)
        .find(|w| w[0] == flag)
        .and_then(|w| w[1].parse().ok())
        .unwrap_or(default)
}

fn string_arg<'a>(args: &'a [String], flag: &str) -> Option<&'a str> {
    args.windows(2)
        .find(|w| w[0] == flag)
        .map(|w| w[1].as_str())
}
