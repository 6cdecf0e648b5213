//! Composite financial health score

use serde::{Deserialize, Serialize};

use super::ForecastEngine;
use crate::balance::compute_balance;
use crate::ledger::Ledger;

/// Inputs the health score is computed from
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct HealthSignals {
    pub balance: f64,
    pub monthly_income: f64,
    pub monthly_expenses: f64,
    pub total_debt: f64,
}

/// Scores in `[0, 100]` with fixed-threshold commentary
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct HealthScore {
    pub overall: f64,
    pub savings: f64,
    pub debt: f64,
    pub spending: f64,
    pub trends: Vec<String>,
    pub recommendations: Vec<String>,
}

impl HealthScore {
    /// Score a set of signals. Without income, every income-relative score is 0;
    /// a debt-free ledger still scores 100 on debt.
    pub fn from_signals(signals: &HealthSignals, savings_buffer_months: f64) -> Self {
        let income = signals.monthly_income;

        let savings = if income > 0.0 {
            clamp_score(signals.balance / (income * savings_buffer_months) * 100.0)
        } else {
            0.0
        };

        let debt = if signals.total_debt <= 0.0 {
            100.0
        } else if income > 0.0 {
            clamp_score(100.0 - signals.total_debt / (income * 12.0) * 50.0)
        } else {
            0.0
        };

        let spending = if income > 0.0 {
            clamp_score(100.0 - signals.monthly_expenses / income * 100.0)
        } else {
            0.0
        };

        let overall = (savings + debt + spending) / 3.0;
        let (trends, recommendations) = commentary(overall, savings, debt, spending);

        Self {
            overall,
            savings,
            debt,
            spending,
            trends,
            recommendations,
        }
    }
}

fn clamp_score(value: f64) -> f64 {
    value.clamp(0.0, 100.0)
}

fn commentary(overall: f64, savings: f64, debt: f64, spending: f64) -> (Vec<String>, Vec<String>) {
    let mut trends = Vec::new();
    let mut recommendations = Vec::new();

    if overall >= 80.0 {
        trends.push("Excellent financial health".to_string());
    } else if overall >= 60.0 {
        trends.push("Good financial health".to_string());
    } else {
        trends.push("Financial health needs attention".to_string());
    }

    if savings < 50.0 {
        recommendations.push("Build an emergency fund covering three months of income".to_string());
    }
    if debt < 70.0 {
        recommendations.push("Prioritize paying down outstanding debt".to_string());
    }
    if spending < 60.0 {
        recommendations.push("Reduce monthly spending relative to income".to_string());
    }

    (trends, recommendations)
}

impl ForecastEngine<'_> {
    /// Signals for the health score, taken from the same baseline as the cash-flow projection
    pub fn health_signals(&self, ledger: &Ledger) -> HealthSignals {
        let baseline = self.monthly_baseline(ledger);
        HealthSignals {
            balance: compute_balance(ledger),
            monthly_income: baseline.income,
            monthly_expenses: baseline.expenses(),
            total_debt: ledger.total_debt(),
        }
    }

    pub fn financial_health_score(&self, ledger: &Ledger) -> HealthScore {
        HealthScore::from_signals(&self.health_signals(ledger), self.config.savings_buffer_months)
    }
}
