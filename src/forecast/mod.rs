//! Forecast engine
//!
//! Turns transaction history into forward-looking figures:
//! - monthly expense forecasts with a normal-approximation confidence band
//! - per-category spending patterns over the trailing year
//! - cash-flow projections from the reconciled balance
//! - a composite financial health score
//!
//! Insufficient history is never an error; the affected result is simply empty.

mod cashflow;
mod expenses;
mod health;
mod patterns;
mod stats;

pub use cashflow::{CashFlowPoint, MonthlyBaseline};
pub use expenses::ExpenseForecast;
pub use health::{HealthScore, HealthSignals};
pub use patterns::{SpendingPattern, TrendDirection};
pub use stats::{linear_trend, mean, moving_average, std_dev, Trend};

use std::collections::BTreeMap;

use crate::clock::Clock;
use crate::config::ForecastConfig;
use crate::ledger::{MonthKey, Transaction};

/// Forecasting over ledger history, anchored at the injected clock's current month
pub struct ForecastEngine<'a> {
    config: ForecastConfig,
    clock: &'a dyn Clock,
}

impl<'a> ForecastEngine<'a> {
    pub fn new(config: ForecastConfig, clock: &'a dyn Clock) -> Self {
        Self { config, clock }
    }

    pub fn config(&self) -> &ForecastConfig {
        &self.config
    }

    /// Blend of trend extrapolation at `x` and the trailing moving average, floored at 0
    fn blended_prediction(&self, series: &[f64], trend: &Trend, x: f64) -> f64 {
        let weight = self.config.trend_weight;
        let average = moving_average(series, self.config.moving_average_window);
        (weight * trend.predict(x) + (1.0 - weight) * average).max(0.0)
    }

    /// First month of the trailing lookback window (the current month is the last)
    fn lookback_start(&self) -> MonthKey {
        let span = self.config.pattern_lookback_months.max(1) as i32;
        self.clock.current_month().add_months(-(span - 1))
    }
}

/// Sum transaction magnitudes per calendar month, in chronological order
fn monthly_totals<'t>(transactions: impl Iterator<Item = &'t Transaction>) -> BTreeMap<MonthKey, f64> {
    let mut totals = BTreeMap::new();
    for tx in transactions {
        *totals.entry(tx.month()).or_insert(0.0) += tx.magnitude();
    }
    totals
}
