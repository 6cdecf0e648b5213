//! Minimum-payment payoff simulation for revolving credit

use log::warn;
use serde::{Deserialize, Serialize};

use super::annuity::monthly_rate;
use crate::config::AmortizationConfig;
use crate::error::{ensure_non_negative, Result};

/// How a minimum-payment simulation ended
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum PayoffStatus {
    /// Balance reached the paid-off threshold
    PaidOff,
    /// The minimum payment does not cover the monthly interest; the balance never falls
    NonAmortizing,
    /// Still owing after the simulation cap
    IterationCap,
}

/// Outcome of paying only the minimum every month
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RevolvingPayoff {
    /// Minimum payment plus the management fee
    pub monthly_minimum: f64,

    /// Total paid over the simulated months, fees included
    pub total_with_interest: f64,

    /// Months simulated
    pub estimated_months: u32,

    pub status: PayoffStatus,
}

impl RevolvingPayoff {
    /// Only a paid-off result has meaningful totals; anything else must be surfaced
    pub fn is_amortizing(&self) -> bool {
        self.status == PayoffStatus::PaidOff
    }
}

/// Simulate paying only the minimum on a revolving balance
///
/// The minimum is fixed at the start as `max(balance * minimum_percent / 100, floor)`.
/// Each month accrues interest on the remaining balance, then applies the minimum;
/// the final month pays only what is still owed. Terminates when the balance falls
/// to the paid-off threshold, when the minimum no longer covers the interest, or at
/// the configured month cap.
pub fn revolving_minimum_payment(
    current_balance: f64,
    yearly_rate: f64,
    fee: f64,
    minimum_percent: f64,
    config: &AmortizationConfig,
) -> Result<RevolvingPayoff> {
    ensure_non_negative("current balance", current_balance)?;
    ensure_non_negative("yearly rate", yearly_rate)?;
    ensure_non_negative("fee", fee)?;
    ensure_non_negative("minimum percent", minimum_percent)?;

    let minimum_payment = (current_balance * minimum_percent / 100.0).max(config.minimum_payment_floor);
    let monthly_minimum = minimum_payment + fee;
    let rate = monthly_rate(yearly_rate);

    let mut balance = current_balance;
    let mut total_with_interest = 0.0;
    let mut estimated_months = 0;

    let status = loop {
        if balance <= config.paid_off_threshold {
            break PayoffStatus::PaidOff;
        }
        if estimated_months >= config.max_simulation_months {
            break PayoffStatus::IterationCap;
        }

        let interest = balance * rate;
        if minimum_payment - interest <= 0.0 {
            break PayoffStatus::NonAmortizing;
        }

        let applied = minimum_payment.min(balance + interest);
        balance = balance + interest - applied;
        total_with_interest += applied + fee;
        estimated_months += 1;
    };

    if status != PayoffStatus::PaidOff {
        warn!(
            "revolving balance {:.2} at {}% is not repaid by a {:.2} minimum ({:?} after {} months)",
            current_balance, yearly_rate, minimum_payment, status, estimated_months
        );
    }

    Ok(RevolvingPayoff {
        monthly_minimum,
        total_with_interest,
        estimated_months,
        status,
    })
}
