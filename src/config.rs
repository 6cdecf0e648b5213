//! Engine configuration
//!
//! Every business constant used by the calculators lives here so that callers can
//! tune it per deployment. Defaults reproduce the behaviour users see today.

use serde::{Deserialize, Serialize};
use std::fs::File;
use std::io::BufReader;
use std::path::Path;

use crate::error::Result;

/// Default reference rate (yearly %) assumed when splitting an estimated rate
pub const DEFAULT_REFERENCE_RATE: f64 = 3.75;

/// Default minimum payment floor for revolving credit (currency units)
pub const DEFAULT_MINIMUM_PAYMENT_FLOOR: f64 = 50.0;

/// Top-level configuration for all engine components
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct EngineConfig {
    pub amortization: AmortizationConfig,
    pub forecast: ForecastConfig,
}

impl EngineConfig {
    /// Load configuration from a JSON file; missing keys keep their defaults
    pub fn from_json_path<P: AsRef<Path>>(path: P) -> Result<Self> {
        let file = File::open(path)?;
        let config = serde_json::from_reader(BufReader::new(file))?;
        Ok(config)
    }
}

/// Constants used by the amortization calculator
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct AmortizationConfig {
    /// Reference rate (yearly %) subtracted from an estimated rate to get the margin
    pub reference_rate_baseline: f64,

    /// Lowest minimum payment a revolving credit can require
    pub minimum_payment_floor: f64,

    /// Balance at or below which a revolving credit counts as paid off
    pub paid_off_threshold: f64,

    /// Hard cap on simulated months for revolving payoff (600 = 50 years)
    pub max_simulation_months: u32,

    /// Starting monthly rate for the Newton-Raphson rate solver (~6%/yr)
    pub solver_initial_guess: f64,

    /// Convergence tolerance on successive monthly-rate iterates
    pub solver_tolerance: f64,

    /// Hard cap on Newton-Raphson iterations
    pub solver_max_iterations: u32,
}

impl Default for AmortizationConfig {
    fn default() -> Self {
        Self {
            reference_rate_baseline: DEFAULT_REFERENCE_RATE,
            minimum_payment_floor: DEFAULT_MINIMUM_PAYMENT_FLOOR,
            paid_off_threshold: 1.0,
            max_simulation_months: 600,
            solver_initial_guess: 0.005,
            solver_tolerance: 1e-4,
            solver_max_iterations: 100,
        }
    }
}

/// Constants used by the forecast engine
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct ForecastConfig {
    /// Number of trailing months averaged by the moving average
    pub moving_average_window: usize,

    /// Weight of the linear trend in a blended prediction; the moving average gets the rest
    pub trend_weight: f64,

    /// Multiplier applied to the standard deviation for the confidence band (95% normal)
    pub confidence_z: f64,

    /// Relative slope (slope / average) above which a category counts as trending.
    /// A tunable heuristic, not a statistical test.
    pub trend_threshold: f64,

    /// Calendar months of history considered by spending pattern analysis
    pub pattern_lookback_months: u32,

    /// Minimum populated months a category needs before it is reported
    pub min_pattern_months: usize,

    /// Number of most recent income transactions averaged into monthly income
    pub income_sample_size: usize,

    /// Months of income the savings score treats as a full buffer
    pub savings_buffer_months: f64,
}

impl Default for ForecastConfig {
    fn default() -> Self {
        Self {
            moving_average_window: 3,
            trend_weight: 0.7,
            confidence_z: 1.96,
            trend_threshold: 0.1,
            pattern_lookback_months: 12,
            min_pattern_months: 3,
            income_sample_size: 12,
            savings_buffer_months: 3.0,
        }
    }
}
