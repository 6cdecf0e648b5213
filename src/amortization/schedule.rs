//! Month-by-month amortization schedule

use serde::{Deserialize, Serialize};
use std::iter::FusedIterator;

use super::annuity::{ensure_term, level_payment, monthly_rate};
use crate::error::{ensure_non_negative, ensure_positive, Result};

/// One month of an amortization schedule, rounded to cents
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ScheduleRow {
    /// 1-indexed payment number
    pub month: u32,
    pub principal_portion: f64,
    pub interest_portion: f64,
    pub fee: f64,
    pub total_payment: f64,
    pub remaining_balance: f64,
}

/// Totals over a full schedule
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ScheduleSummary {
    pub months: u32,
    pub total_principal: f64,
    pub total_interest: f64,
    pub total_fees: f64,
    pub total_paid: f64,
}

/// A restartable schedule; rows are computed lazily by [`AmortizationSchedule::iter`]
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct AmortizationSchedule {
    principal: f64,
    monthly_rate: f64,
    fee: f64,
    term_months: u32,
    level_payment: f64,
}

/// Build the schedule for a level-payment loan
///
/// Each row is rounded to cents on its own; cumulative rounding drift is not
/// corrected, except that the final row always closes at a zero balance.
pub fn build_amortization_schedule(
    principal: f64,
    yearly_rate: f64,
    fee: f64,
    term_months: u32,
) -> Result<AmortizationSchedule> {
    ensure_positive("principal", principal)?;
    ensure_non_negative("yearly rate", yearly_rate)?;
    ensure_non_negative("fee", fee)?;
    ensure_term(term_months)?;

    let rate = monthly_rate(yearly_rate);
    Ok(AmortizationSchedule {
        principal,
        monthly_rate: rate,
        fee,
        term_months,
        level_payment: level_payment(principal, rate, term_months),
    })
}

impl AmortizationSchedule {
    pub fn iter(&self) -> ScheduleIter {
        ScheduleIter {
            schedule: *self,
            month: 0,
            balance: round_cents(self.principal),
        }
    }

    pub fn term_months(&self) -> u32 {
        self.term_months
    }

    /// Level payment excluding the fee
    pub fn level_payment(&self) -> f64 {
        self.level_payment
    }

    pub fn summary(&self) -> ScheduleSummary {
        self.iter().fold(ScheduleSummary::default(), |mut acc, row| {
            acc.months += 1;
            acc.total_principal += row.principal_portion;
            acc.total_interest += row.interest_portion;
            acc.total_fees += row.fee;
            acc.total_paid += row.total_payment;
            acc
        })
    }
}

impl<'a> IntoIterator for &'a AmortizationSchedule {
    type Item = ScheduleRow;
    type IntoIter = ScheduleIter;

    fn into_iter(self) -> ScheduleIter {
        self.iter()
    }
}

/// Iterator over the rows of an [`AmortizationSchedule`]
#[derive(Debug, Clone)]
pub struct ScheduleIter {
    schedule: AmortizationSchedule,
    month: u32,
    balance: f64,
}

impl Iterator for ScheduleIter {
    type Item = ScheduleRow;

    fn next(&mut self) -> Option<ScheduleRow> {
        if self.month >= self.schedule.term_months {
            return None;
        }
        self.month += 1;

        let interest = round_cents(self.balance * self.schedule.monthly_rate);
        let principal = round_cents(self.schedule.level_payment - interest);
        let remaining = if self.month == self.schedule.term_months {
            0.0
        } else {
            round_cents(self.balance - principal).max(0.0)
        };
        self.balance = remaining;

        Some(ScheduleRow {
            month: self.month,
            principal_portion: principal,
            interest_portion: interest,
            fee: self.schedule.fee,
            total_payment: round_cents(principal + interest + self.schedule.fee),
            remaining_balance: remaining,
        })
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        let left = (self.schedule.term_months - self.month) as usize;
        (left, Some(left))
    }
}

impl ExactSizeIterator for ScheduleIter {}

impl FusedIterator for ScheduleIter {}

fn round_cents(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}
