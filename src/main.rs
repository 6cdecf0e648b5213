//! Ledger Engine CLI
//!
//! Runs engine operations against a JSON ledger file

use anyhow::{Context, Result};
use chrono::NaiveDate;
use clap::{Parser, Subcommand};
use ledger_engine::payments::migrate_legacy_data;
use ledger_engine::{
    build_amortization_schedule, compute_balance, estimate_rate_from_payments, forward_payment,
    revolving_minimum_payment, toggle_bill_payment, Clock, EngineConfig, FixedClock, ForecastEngine, JsonFileStore,
    Ledger, LedgerStore, MonthKey, SystemClock,
};
use log::{info, warn};
use serde::Serialize;
use std::path::PathBuf;

#[derive(Debug, Parser)]
#[command(name = "ledger-engine")]
#[command(about = "Loan, bill, and cash-flow calculations over a JSON ledger", long_about = None)]
struct Cli {
    /// Ledger JSON file
    #[arg(long, short = 'l', default_value = "ledger.json")]
    ledger: PathBuf,

    /// Engine configuration JSON; missing keys keep their defaults
    #[arg(long, short = 'c')]
    config: Option<PathBuf>,

    /// Evaluate as of this date (YYYY-MM-DD) instead of today
    #[arg(long)]
    today: Option<NaiveDate>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// Monthly payment and total payback of an installment loan
    Payment {
        #[arg(long)]
        principal: f64,
        /// Reference rate, yearly %
        #[arg(long)]
        reference_rate: f64,
        /// Personal margin, yearly %
        #[arg(long, default_value_t = 0.0)]
        margin: f64,
        #[arg(long, default_value_t = 0.0)]
        fee: f64,
        #[arg(long)]
        term: u32,
    },

    /// Payoff of a revolving balance at the minimum payment
    Revolving {
        #[arg(long)]
        balance: f64,
        /// Yearly %
        #[arg(long)]
        rate: f64,
        #[arg(long, default_value_t = 0.0)]
        fee: f64,
        #[arg(long)]
        minimum_percent: f64,
    },

    /// Rate implied by an observed monthly payment
    EstimateRate {
        #[arg(long)]
        principal: f64,
        #[arg(long)]
        payment: f64,
        #[arg(long, default_value_t = 0.0)]
        fee: f64,
        #[arg(long)]
        term: u32,
    },

    /// Month-by-month amortization table
    Schedule {
        #[arg(long)]
        principal: f64,
        /// Yearly %
        #[arg(long)]
        rate: f64,
        #[arg(long, default_value_t = 0.0)]
        fee: f64,
        #[arg(long)]
        term: u32,
        /// Print JSON rows instead of a table
        #[arg(long)]
        json: bool,
    },

    /// Reconciled balance of the ledger
    Balance,

    /// Expense forecast for the coming months
    Forecast {
        #[arg(long, default_value_t = 6)]
        months: u32,
    },

    /// Spending patterns per category
    Patterns,

    /// Projected balance month by month
    Cashflow {
        #[arg(long, default_value_t = 12)]
        months: u32,
    },

    /// Financial health score
    Health,

    /// Rewrite legacy paid flags into month-keyed history
    Migrate,

    /// Mark a bill paid (or unpaid) for a month
    Toggle {
        #[arg(long)]
        bill: String,
        /// YYYY-MM, defaults to the current month
        #[arg(long)]
        month: Option<MonthKey>,
        #[arg(long)]
        unpaid: bool,
    },
}

fn main() {
    env_logger::init();

    if let Err(err) = run() {
        eprintln!("error: {err:#}");
        std::process::exit(1);
    }
}

fn run() -> Result<()> {
    let cli = Cli::parse();

    let config = match &cli.config {
        Some(path) => EngineConfig::from_json_path(path)
            .with_context(|| format!("failed to read config {}", path.display()))?,
        None => EngineConfig::default(),
    };
    let clock: Box<dyn Clock> = match cli.today {
        Some(date) => Box::new(FixedClock::new(date)),
        None => Box::new(SystemClock),
    };
    let store = JsonFileStore::new(&cli.ledger);

    match cli.command {
        Command::Payment {
            principal,
            reference_rate,
            margin,
            fee,
            term,
        } => print_json(&forward_payment(principal, reference_rate, margin, fee, term)?),

        Command::Revolving {
            balance,
            rate,
            fee,
            minimum_percent,
        } => print_json(&revolving_minimum_payment(
            balance,
            rate,
            fee,
            minimum_percent,
            &config.amortization,
        )?),

        Command::EstimateRate {
            principal,
            payment,
            fee,
            term,
        } => print_json(&estimate_rate_from_payments(
            principal,
            payment,
            fee,
            term,
            &config.amortization,
        )?),

        Command::Schedule {
            principal,
            rate,
            fee,
            term,
            json,
        } => {
            let schedule = build_amortization_schedule(principal, rate, fee, term)?;
            if json {
                return print_json(&schedule.iter().collect::<Vec<_>>());
            }

            println!(
                "{:>5} {:>12} {:>12} {:>8} {:>12} {:>14}",
                "Month", "Principal", "Interest", "Fee", "Payment", "Remaining"
            );
            println!("{}", "-".repeat(68));
            for row in &schedule {
                println!(
                    "{:>5} {:>12.2} {:>12.2} {:>8.2} {:>12.2} {:>14.2}",
                    row.month,
                    row.principal_portion,
                    row.interest_portion,
                    row.fee,
                    row.total_payment,
                    row.remaining_balance,
                );
            }

            let summary = schedule.summary();
            println!("\nSummary:");
            println!("  Months: {}", summary.months);
            println!("  Total Principal: {:.2}", summary.total_principal);
            println!("  Total Interest: {:.2}", summary.total_interest);
            println!("  Total Fees: {:.2}", summary.total_fees);
            println!("  Total Paid: {:.2}", summary.total_paid);
            Ok(())
        }

        Command::Balance => {
            let ledger = load_ledger(&store)?;
            let balance = compute_balance(&ledger);
            print_json(&serde_json::json!({
                "balance": balance,
                "baseBalance": ledger.balance,
                "totalDebt": ledger.total_debt(),
            }))
        }

        Command::Forecast { months } => {
            let ledger = load_ledger(&store)?;
            let engine = ForecastEngine::new(config.forecast.clone(), clock.as_ref());
            print_json(&engine.forecast_expenses(&ledger.transactions, months))
        }

        Command::Patterns => {
            let ledger = load_ledger(&store)?;
            let engine = ForecastEngine::new(config.forecast.clone(), clock.as_ref());
            print_json(&engine.analyze_spending_patterns(&ledger.transactions))
        }

        Command::Cashflow { months } => {
            let ledger = load_ledger(&store)?;
            let engine = ForecastEngine::new(config.forecast.clone(), clock.as_ref());
            print_json(&engine.project_cash_flow(&ledger, months))
        }

        Command::Health => {
            let ledger = load_ledger(&store)?;
            let engine = ForecastEngine::new(config.forecast.clone(), clock.as_ref());
            print_json(&engine.financial_health_score(&ledger))
        }

        Command::Migrate => {
            let mut ledger = load_ledger(&store)?;
            let migrated = migrate_legacy_data(&mut ledger, clock.as_ref());
            store.save(&ledger)?;
            info!("migrated {} bill(s) in {}", migrated, cli.ledger.display());
            print_json(&serde_json::json!({ "migrated": migrated }))
        }

        Command::Toggle { bill, month, unpaid } => {
            let mut ledger = load_ledger(&store)?;
            let month = month.unwrap_or_else(|| clock.current_month());
            let toggle = toggle_bill_payment(&mut ledger, &bill, month, !unpaid, clock.as_ref())?;
            if toggle.changed {
                store.save(&ledger)?;
            }
            print_json(&toggle)
        }
    }
}

fn load_ledger(store: &JsonFileStore) -> Result<Ledger> {
    let ledger = store
        .load()
        .with_context(|| format!("failed to load ledger {}", store.path().display()))?;
    Ok(ledger.unwrap_or_else(|| {
        warn!("{} not found, starting from an empty ledger", store.path().display());
        Ledger::default()
    }))
}

fn print_json<T: Serialize + ?Sized>(value: &T) -> Result<()> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}
