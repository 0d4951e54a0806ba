//! Parking Tariff CLI
//!
//! Quotes a stay against a tariff record read from JSON.
//!
//! ```sh
//! # Flat / tiered / scheduled quote; exit defaults to now
//! tarifa quote --tariff tarifa.json --entry 2024-06-03T08:00:00Z --exit 2024-06-03T10:30:00Z
//!
//! # Epoch milliseconds work too, and `-` reads the record from stdin
//! cat tarifa.json | tarifa quote --tariff - --entry 1717401600000 --json
//!
//! # Check that a record decodes
//! tarifa check --tariff tarifa.json
//!
//! # Split an amount between cash and the card terminal
//! tarifa settle --amount 50 --cash 20 --terminal
//! ```

use std::io::Read;
use std::path::{Path, PathBuf};
use std::process::ExitCode;

use chrono::{DateTime, Utc};
use clap::{Parser, Subcommand};
use rust_decimal::Decimal;
use tracing::{error, info};

use parking_tariff::config::AppConfig;
use parking_tariff::{init_tracing, PaymentSelection, Settlement, TariffEngine, TariffRecord};

/// Parking fee calculator for flat, tiered and scheduled tariffs.
#[derive(Parser, Debug)]
#[command(name = "tarifa", version, about)]
struct Cli {
    /// Path to the configuration file (TOML).
    #[arg(short, long, env = "TARIFA_CONFIG", global = true)]
    config: Option<PathBuf>,

    /// Override the log level (trace, debug, info, warn, error).
    #[arg(short, long, global = true)]
    log_level: Option<String>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Compute the amount owed for a stay.
    Quote {
        /// Tariff record as JSON (`-` for stdin).
        #[arg(short, long)]
        tariff: PathBuf,
        /// Entry instant: RFC 3339 or epoch milliseconds.
        #[arg(long, value_parser = parse_instant)]
        entry: DateTime<Utc>,
        /// Exit instant; omitted means the vehicle is still parked.
        #[arg(long, value_parser = parse_instant)]
        exit: Option<DateTime<Utc>>,
        /// Print the full breakdown as JSON.
        #[arg(long)]
        json: bool,
    },
    /// Decode a tariff record and report why it is not billable.
    Check {
        #[arg(short, long)]
        tariff: PathBuf,
    },
    /// Split an amount across cash and the card terminal.
    Settle {
        #[arg(long)]
        amount: Decimal,
        /// Cash handed over.
        #[arg(long)]
        cash: Option<Decimal>,
        /// Charge the remainder on the card terminal.
        #[arg(long)]
        terminal: bool,
    },
}

fn parse_instant(s: &str) -> Result<DateTime<Utc>, String> {
    if let Ok(ms) = s.parse::<i64>() {
        return DateTime::from_timestamp_millis(ms)
            .ok_or_else(|| format!("timestamp out of range: {ms}"));
    }
    DateTime::parse_from_rfc3339(s)
        .map(|dt| dt.with_timezone(&Utc))
        .map_err(|e| format!("expected RFC 3339 or epoch millis: {e}"))
}

fn read_record(path: &Path) -> Result<TariffRecord, Box<dyn std::error::Error>> {
    let mut content = String::new();
    if path == Path::new("-") {
        std::io::stdin().read_to_string(&mut content)?;
    } else {
        content = std::fs::read_to_string(path)?;
    }
    Ok(serde_json::from_str(&content)?)
}

fn main() -> ExitCode {
    let cli = Cli::parse();

    // ── Load configuration ─────────────────────────────────────
    let config_path = cli
        .config
        .clone()
        .unwrap_or_else(parking_tariff::default_config_path);
    let (mut config, load_error) = match AppConfig::load(&config_path) {
        Ok(cfg) => (cfg, None),
        Err(e) => (AppConfig::default(), Some(e)),
    };
    if let Some(level) = &cli.log_level {
        config.logging.level = level.clone();
    }
    init_tracing(&config);
    match load_error {
        None => info!("Configuration loaded from {}", config_path.display()),
        Some(e) => error!(
            "Failed to load config from {}: {}. Using defaults.",
            config_path.display(),
            e
        ),
    }

    match run(cli.command, &config) {
        Ok(code) => code,
        Err(e) => {
            error!("{e}");
            eprintln!("error: {e}");
            ExitCode::FAILURE
        }
    }
}

fn run(command: Command, config: &AppConfig) -> Result<ExitCode, Box<dyn std::error::Error>> {
    let engine = TariffEngine::from_config(config);

    match command {
        Command::Quote {
            tariff,
            entry,
            exit,
            json,
        } => {
            let record = read_record(&tariff)?;
            let exit = exit.unwrap_or_else(Utc::now);
            match engine.breakdown(entry, exit, &record) {
                Some(breakdown) if json => {
                    println!("{}", serde_json::to_string_pretty(&breakdown)?)
                }
                Some(breakdown) => println!("{}", breakdown.total),
                None if json => println!(r#"{{"total": "0"}}"#),
                None => println!("0"),
            }
            Ok(ExitCode::SUCCESS)
        }
        Command::Check { tariff } => {
            let record = read_record(&tariff)?;
            match engine.decode(&record) {
                Ok(decoded) => {
                    println!("ok: {} tariff", decoded.kind());
                    Ok(ExitCode::SUCCESS)
                }
                Err(e) => {
                    println!("not billable: {e}");
                    Ok(ExitCode::from(2))
                }
            }
        }
        Command::Settle {
            amount,
            cash,
            terminal,
        } => {
            let selection = PaymentSelection {
                cash: cash.is_some(),
                cash_received: cash,
                terminal,
            };
            let settlement = Settlement::split(amount, &selection)?;
            println!("{}", serde_json::to_string_pretty(&settlement)?);
            Ok(ExitCode::SUCCESS)
        }
    }
}
