//! Per-category spending patterns over the trailing year

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

use super::stats::{linear_trend, mean, std_dev};
use super::ForecastEngine;
use crate::ledger::{MonthKey, Transaction};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TrendDirection {
    Increasing,
    Decreasing,
    Stable,
}

/// Spending behaviour of one category
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SpendingPattern {
    pub category: String,
    /// Mean spend over the months the category was used
    pub monthly_average: f64,
    pub trend: TrendDirection,
    /// Fitted monthly change in spend
    pub slope: f64,
    /// Coefficient of variation (σ / mean)
    pub volatility: f64,
    pub next_month_prediction: f64,
    /// Months in the window with any spend in this category
    pub months_observed: usize,
}

impl ForecastEngine<'_> {
    /// Spending patterns per expense category, highest average first
    ///
    /// Only expenses dated inside the lookback window ending with the current month
    /// count. Categories used in fewer than `min_pattern_months` months are skipped.
    pub fn analyze_spending_patterns(&self, transactions: &[Transaction]) -> Vec<SpendingPattern> {
        let start = self.lookback_start();
        let end = self.clock.current_month();

        let mut by_category: BTreeMap<&str, BTreeMap<MonthKey, f64>> = BTreeMap::new();
        for tx in transactions.iter().filter(|tx| tx.is_expense()) {
            let month = tx.month();
            if month < start || month > end {
                continue;
            }
            *by_category
                .entry(tx.category.as_str())
                .or_default()
                .entry(month)
                .or_insert(0.0) += tx.magnitude();
        }

        let mut patterns: Vec<SpendingPattern> = by_category
            .into_iter()
            .filter(|(_, months)| months.len() >= self.config.min_pattern_months)
            .map(|(category, months)| {
                let series: Vec<f64> = months.values().copied().collect();
                self.pattern_for(category, &series)
            })
            .collect();

        patterns.sort_by(|a, b| b.monthly_average.total_cmp(&a.monthly_average));
        patterns
    }

    fn pattern_for(&self, category: &str, series: &[f64]) -> SpendingPattern {
        let average = mean(series);
        let trend = linear_trend(series);

        let direction = if trend.slope.abs() > self.config.trend_threshold * average {
            if trend.slope > 0.0 {
                TrendDirection::Increasing
            } else {
                TrendDirection::Decreasing
            }
        } else {
            TrendDirection::Stable
        };

        SpendingPattern {
            category: category.to_string(),
            monthly_average: average,
            trend: direction,
            slope: trend.slope,
            volatility: if average > 0.0 { std_dev(series) / average } else { 0.0 },
            next_month_prediction: self.blended_prediction(series, &trend, series.len() as f64),
            months_observed: series.len(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::clock::FixedClock;
    use crate::config::ForecastConfig;
    use chrono::NaiveDate;

    fn expense(y: i32, m: u32, amount: f64, category: &str) -> Transaction {
        Transaction::expense("spend", amount, NaiveDate::from_ymd_opt(y, m, 5).unwrap(), category)
    }

    #[test]
    fn test_trend_classification_and_ordering() {
        let clock = FixedClock::ymd(2024, 6, 20).unwrap();
        let engine = ForecastEngine::new(ForecastConfig::default(), &clock);
        let mut txs = Vec::new();
        for m in 1..=6 {
            txs.push(expense(2024, m, 100.0 + 50.0 * m as f64, "dining"));
            txs.push(expense(2024, m, 900.0 - 120.0 * m as f64, "travel"));
            txs.push(expense(2024, m, 400.0 + if m % 2 == 0 { 5.0 } else { -5.0 }, "groceries"));
        }

        let patterns = engine.analyze_spending_patterns(&txs);
        assert_eq!(patterns.len(), 3);

        let find = |name: &str| patterns.iter().find(|p| p.category == name).unwrap();
        assert_eq!(find("dining").trend, TrendDirection::Increasing);
        assert_eq!(find("travel").trend, TrendDirection::Decreasing);
        assert_eq!(find("groceries").trend, TrendDirection::Stable);

        for pair in patterns.windows(2) {
            assert!(pair[0].monthly_average >= pair[1].monthly_average);
        }
        assert_eq!(patterns[0].category, "travel");
    }

    #[test]
    fn test_sparse_categories_are_skipped() {
        let clock = FixedClock::ymd(2024, 6, 20).unwrap();
        let engine = ForecastEngine::new(ForecastConfig::default(), &clock);
        let txs = vec![
            expense(2024, 1, 80.0, "gifts"),
            expense(2024, 4, 120.0, "gifts"),
            expense(2024, 4, 30.0, "gifts"),
        ];
        assert!(engine.analyze_spending_patterns(&txs).is_empty());
    }

    #[test]
    fn test_only_trailing_year_counts() {
        let clock = FixedClock::ymd(2024, 6, 20).unwrap();
        let engine = ForecastEngine::new(ForecastConfig::default(), &clock);
        let txs = vec![
            // Outside the window: June 2023 and a future-dated entry
            expense(2023, 6, 10_000.0, "rent"),
            expense(2024, 7, 10_000.0, "rent"),
            expense(2023, 7, 1_000.0, "rent"),
            expense(2024, 1, 1_000.0, "rent"),
            expense(2024, 6, 1_000.0, "rent"),
        ];

        let patterns = engine.analyze_spending_patterns(&txs);
        assert_eq!(patterns.len(), 1);
        assert_eq!(patterns[0].months_observed, 3);
        assert!((patterns[0].monthly_average - 1_000.0).abs() < 1e-9);
        assert_eq!(patterns[0].volatility, 0.0);
        assert!((patterns[0].next_month_prediction - 1_000.0).abs() < 1e-9);
    }

    #[test]
    fn test_volatility_is_relative() {
        let clock = FixedClock::ymd(2024, 3, 1).unwrap();
        let engine = ForecastEngine::new(ForecastConfig::default(), &clock);
        let txs = vec![
            expense(2024, 1, 50.0, "fun"),
            expense(2024, 2, 150.0, "fun"),
            expense(2024, 3, 100.0, "fun"),
        ];
        let pattern = &engine.analyze_spending_patterns(&txs)[0];
        let expected = std_dev(&[50.0, 150.0, 100.0]) / 100.0;
        assert!((pattern.volatility - expected).abs() < 1e-12);
    }
}
