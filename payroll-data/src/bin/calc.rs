use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use rust_decimal::Decimal;
use tracing::{debug, info};
use tracing_subscriber::EnvFilter;

use payroll_core::{ContractType, RuleKey, gross_from_net, net_from_gross, resolve_tax_year_config};
use payroll_data::RateTableLoader;

// ─── CLI definition ──────────────────────────────────────────────────────────

/// Italian payroll calculator.
///
/// Loads `brackets.csv` and `contributions.csv` from the data directory,
/// plus `deductions.csv` and `bonus.csv` when present. Resolves the rules
/// for the requested year, contract and location, then computes either net
/// from gross or gross from net.
#[derive(Debug, Parser)]
#[command(name = "payroll-calc")]
#[command(version, about, long_about = None)]
struct Cli {
    /// Directory holding the rate-table CSV files.
    #[arg(long, default_value = "data")]
    data_dir: PathBuf,

    /// Tax year.
    #[arg(long, default_value = "2025")]
    year: i32,

    /// Contract type code, e.g. PROFESSIONAL or APPRENTICESHIP.
    #[arg(long, default_value = "PROFESSIONAL", value_parser = parse_contract)]
    contract: ContractType,

    /// Region code; omitted means the DEFAULT regional rate.
    #[arg(long)]
    region: Option<String>,

    /// Municipality code; omitted means the DEFAULT municipal rate.
    #[arg(long)]
    municipality: Option<String>,

    #[command(subcommand)]
    direction: Direction,
}

#[derive(Debug, Subcommand)]
enum Direction {
    /// Compute net salary from a gross amount.
    Gross {
        #[arg(value_parser = parse_amount)]
        amount: Decimal,
    },
    /// Compute the gross salary that yields a net amount.
    Net {
        #[arg(value_parser = parse_amount)]
        amount: Decimal,
    },
}

fn parse_contract(s: &str) -> Result<ContractType, String> {
    ContractType::parse(s).ok_or_else(|| {
        let known: Vec<_> = ContractType::all().iter().map(|c| c.as_str()).collect();
        format!("unknown contract type '{s}'; expected one of {}", known.join(", "))
    })
}

/// Accepts `1234.56` as well as the Italian `1.234,56` and `30.000`.
///
/// Without a comma, dots are thousands separators when every group after
/// the first has exactly three digits: `30.000` is thirty thousand while
/// `30.5` and `0.125` stay decimals.
fn parse_amount(s: &str) -> Result<Decimal, String> {
    let s = s.trim();
    let normalized = match s.rfind(',') {
        Some(comma) if s[comma..].contains('.') => {
            return Err(format!("invalid amount '{s}': '.' after the decimal comma"));
        }
        Some(_) => s.replace('.', "").replace(',', "."),
        None if is_dot_grouped(s) => s.replace('.', ""),
        None => s.to_string(),
    };
    normalized
        .parse::<Decimal>()
        .map_err(|err| format!("invalid amount '{s}': {err}"))
}

/// `1.234`, `30.000`, `1.234.567`: digits grouped by dots in threes.
fn is_dot_grouped(s: &str) -> bool {
    let digits = s.strip_prefix('-').unwrap_or(s);
    let mut groups = digits.split('.');
    let Some(first) = groups.next() else {
        return false;
    };
    let rest: Vec<&str> = groups.collect();
    let all_digits = |group: &str| group.bytes().all(|b| b.is_ascii_digit());

    !rest.is_empty()
        && (1..=3).contains(&first.len())
        && first != "0"
        && all_digits(first)
        && rest.iter().all(|group| group.len() == 3 && all_digits(group))
}

// ─── tracing ─────────────────────────────────────────────────────────────────

/// Initialise the tracing subscriber.
///
/// * Honours `RUST_LOG` when set.
/// * Falls back to `info` so normal runs are quiet.
/// * Strips timestamps and target names to keep CLI output clean.
fn init_tracing() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::from("info"));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .without_time()
        .with_target(false)
        .init();
}

// ─── entry point ─────────────────────────────────────────────────────────────

#[tokio::main]
async fn main() -> Result<()> {
    init_tracing();

    let cli = Cli::parse();

    debug!("loading rate tables from {}", cli.data_dir.display());
    let store = RateTableLoader::load_dir(&cli.data_dir)
        .with_context(|| format!("Failed to load rate tables from: {}", cli.data_dir.display()))?;

    let mut key = RuleKey::new(cli.year, cli.contract);
    if let Some(region) = &cli.region {
        key = key.in_region(region);
    }
    if let Some(municipality) = &cli.municipality {
        key = key.in_municipality(municipality);
    }

    let config = resolve_tax_year_config(&store, &key)
        .await
        .with_context(|| format!("Failed to resolve configuration for {key}"))?;

    let result = match cli.direction {
        Direction::Gross { amount } => {
            info!(gross = %amount, "Calculating net salary");
            net_from_gross(amount, &config)
        }
        Direction::Net { amount } => {
            info!(net = %amount, "Calculating gross salary");
            gross_from_net(amount, &config)
                .with_context(|| format!("No gross salary yields net {amount}"))?
        }
    };

    info!("{key}\n{result}");

    Ok(())
}
