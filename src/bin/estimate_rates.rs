//! Estimate implied rates for a batch of loans from a CSV file
//!
//! Input columns: name, principal, monthly_payment, fee, term_months
//! Output adds the estimated yearly rate, its reference/margin split, and convergence

use anyhow::{Context, Result};
use clap::Parser;
use ledger_engine::{estimate_rate_from_payments, EngineConfig};
use log::warn;
use rayon::prelude::*;
use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use std::time::Instant;

#[derive(Debug, Parser)]
#[command(name = "estimate-rates")]
#[command(about = "Batch implied-rate estimation from observed loan payments", long_about = None)]
struct Args {
    /// Loan terms CSV
    input: PathBuf,

    #[arg(long, short = 'o', default_value = "rate_estimates.csv")]
    output: PathBuf,

    /// Engine configuration JSON
    #[arg(long, short = 'c')]
    config: Option<PathBuf>,
}

#[derive(Debug, Deserialize)]
struct LoanTerms {
    name: String,
    principal: f64,
    monthly_payment: f64,
    #[serde(default)]
    fee: f64,
    term_months: u32,
}

#[derive(Debug, Serialize)]
struct EstimateRow {
    name: String,
    principal: f64,
    monthly_payment: f64,
    fee: f64,
    term_months: u32,
    yearly_rate: Option<f64>,
    reference_rate: Option<f64>,
    margin: Option<f64>,
    iterations: Option<u32>,
    converged: bool,
    error: Option<String>,
}

fn main() {
    env_logger::init();

    if let Err(err) = run() {
        eprintln!("error: {err:#}");
        std::process::exit(1);
    }
}

fn run() -> Result<()> {
    let args = Args::parse();
    let config = match &args.config {
        Some(path) => EngineConfig::from_json_path(path)?,
        None => EngineConfig::default(),
    };

    let start = Instant::now();
    let mut reader = csv::Reader::from_path(&args.input)
        .with_context(|| format!("failed to open {}", args.input.display()))?;
    let loans = reader
        .deserialize::<LoanTerms>()
        .collect::<std::result::Result<Vec<_>, _>>()
        .context("malformed loan terms row")?;
    println!("Loaded {} loans in {:?}", loans.len(), start.elapsed());

    let solve_start = Instant::now();
    let rows: Vec<EstimateRow> = loans
        .par_iter()
        .map(|loan| {
            let estimate = estimate_rate_from_payments(
                loan.principal,
                loan.monthly_payment,
                loan.fee,
                loan.term_months,
                &config.amortization,
            );
            let mut row = EstimateRow {
                name: loan.name.clone(),
                principal: loan.principal,
                monthly_payment: loan.monthly_payment,
                fee: loan.fee,
                term_months: loan.term_months,
                yearly_rate: None,
                reference_rate: None,
                margin: None,
                iterations: None,
                converged: false,
                error: None,
            };
            match estimate {
                Ok(est) => {
                    row.yearly_rate = Some(est.yearly_rate);
                    row.reference_rate = Some(est.reference_rate_estimate);
                    row.margin = Some(est.margin_estimate);
                    row.iterations = Some(est.iterations);
                    row.converged = est.converged;
                }
                Err(err) => {
                    warn!("{}: {}", loan.name, err);
                    row.error = Some(err.to_string());
                }
            }
            row
        })
        .collect();
    println!("Estimated {} rates in {:?}", rows.len(), solve_start.elapsed());

    let mut writer = csv::Writer::from_path(&args.output)
        .with_context(|| format!("failed to create {}", args.output.display()))?;
    for row in &rows {
        writer.serialize(row)?;
    }
    writer.flush()?;

    let failed = rows.iter().filter(|r| r.error.is_some()).count();
    let unconverged = rows.iter().filter(|r| r.error.is_none() && !r.converged).count();
    println!("Output written to {}", args.output.display());
    if failed + unconverged > 0 {
        println!("  {} rejected, {} did not converge", failed, unconverged);
    }
    Ok(())
}
