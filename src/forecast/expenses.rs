//! Monthly expense forecast

use chrono::NaiveDate;
use log::debug;
use serde::{Deserialize, Serialize};

use super::stats::{linear_trend, std_dev};
use super::{monthly_totals, ForecastEngine};
use crate::ledger::{MonthKey, Transaction};

/// Predicted total expenses for one future month
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ExpenseForecast {
    pub month: MonthKey,
    /// First day of `month`
    pub date: NaiveDate,
    pub predicted: f64,
    pub confidence_lower: f64,
    pub confidence_upper: f64,
}

impl ForecastEngine<'_> {
    /// Forecast total expenses for the `months_ahead` months after the current one
    ///
    /// Needs at least two months with expenses; otherwise returns an empty forecast.
    /// The history is a dense calendar series from the first expense month through
    /// the later of the last expense month and last month, with quiet months as 0,
    /// so trend indices line up with the forecast month labels. Each prediction
    /// blends the trend line with the moving average, and the band is
    /// `predicted ± z·σ` of the monthly totals, with the lower bound floored at 0.
    pub fn forecast_expenses(&self, transactions: &[Transaction], months_ahead: u32) -> Vec<ExpenseForecast> {
        let totals = monthly_totals(transactions.iter().filter(|tx| tx.is_expense()));
        if totals.len() < 2 {
            debug!("expense forecast skipped: {} month(s) of history", totals.len());
            return Vec::new();
        }

        let anchor = self.clock.current_month();
        let (first, last) = match (totals.keys().next(), totals.keys().next_back()) {
            (Some(&first), Some(&last)) => (first, last),
            _ => return Vec::new(),
        };
        let end = last.max(anchor.add_months(-1));

        let series: Vec<f64> = (0..=first.months_until(end))
            .map(|i| totals.get(&first.add_months(i)).copied().unwrap_or(0.0))
            .collect();
        let trend = linear_trend(&series);
        let band = self.config.confidence_z * std_dev(&series);
        debug!(
            "expense forecast over {} month(s) from {} ({} with spending)",
            series.len(),
            first,
            totals.len()
        );

        (1..=months_ahead)
            .map(|i| {
                let month = anchor.add_months(i as i32);
                let predicted = self.blended_prediction(&series, &trend, first.months_until(month) as f64);
                ExpenseForecast {
                    month,
                    date: month.first_day(),
                    predicted,
                    confidence_lower: (predicted - band).max(0.0),
                    confidence_upper: predicted + band,
                }
            })
            .collect()
    }
}
