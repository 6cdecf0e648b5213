//! Cash-flow projection from the reconciled balance

use chrono::NaiveDate;
use log::debug;
use serde::{Deserialize, Serialize};

use super::stats::mean;
use super::{monthly_totals, ForecastEngine};
use crate::balance::{compute_balance, is_bill_originated};
use crate::ledger::{Ledger, MonthKey};

/// Typical month derived from the ledger
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MonthlyBaseline {
    /// Mean of the most recent income transactions
    pub income: f64,
    /// Recurring bills that are not a loan's payment bill
    pub recurring_bills: f64,
    /// Monthly payments of loans that still owe money
    pub loan_payments: f64,
    /// Average monthly spend not originated by a bill
    pub discretionary: f64,
}

impl MonthlyBaseline {
    pub fn expenses(&self) -> f64 {
        self.recurring_bills + self.loan_payments + self.discretionary
    }

    pub fn net_flow(&self) -> f64 {
        self.income - self.expenses()
    }
}

/// One projected month
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CashFlowPoint {
    pub month: MonthKey,
    pub date: NaiveDate,
    /// Running balance at the end of the month
    pub balance: f64,
    pub income: f64,
    pub expenses: f64,
    pub net_flow: f64,
}

impl ForecastEngine<'_> {
    /// Income, obligations, and discretionary spend of a typical month
    pub fn monthly_baseline(&self, ledger: &Ledger) -> MonthlyBaseline {
        // A loan's payment bill is counted through the loan, not twice
        let recurring_bills = ledger
            .bills
            .iter()
            .filter(|bill| ledger.loan_for_bill(bill).is_none())
            .map(|bill| bill.amount)
            .sum();

        let loan_payments = ledger
            .loans
            .iter()
            .filter(|loan| loan.is_active())
            .map(|loan| loan.monthly_payment)
            .sum();

        let start = self.lookback_start();
        let end = self.clock.current_month();
        let discretionary_totals = monthly_totals(ledger.transactions.iter().filter(|tx| {
            let month = tx.month();
            tx.is_expense() && month >= start && month <= end && !is_bill_originated(tx, &ledger.bills)
        }));
        let discretionary = mean(&discretionary_totals.values().copied().collect::<Vec<_>>());

        let mut incomes: Vec<_> = ledger.transactions.iter().filter(|tx| tx.is_income()).collect();
        incomes.sort_by(|a, b| b.date.cmp(&a.date));
        let recent: Vec<f64> = incomes
            .iter()
            .take(self.config.income_sample_size)
            .map(|tx| tx.magnitude())
            .collect();

        MonthlyBaseline {
            income: mean(&recent),
            recurring_bills,
            loan_payments,
            discretionary,
        }
    }

    /// Project the balance forward month by month
    ///
    /// Starts from [`compute_balance`] and adds the baseline net flow each month.
    /// Loan balances are not amortized inside the projection.
    pub fn project_cash_flow(&self, ledger: &Ledger, months_ahead: u32) -> Vec<CashFlowPoint> {
        let baseline = self.monthly_baseline(ledger);
        let anchor = self.clock.current_month();
        let income = baseline.income;
        let expenses = baseline.expenses();
        let net_flow = income - expenses;

        let mut balance = compute_balance(ledger);
        debug!("cash flow projection from {:.2}, net {:.2}/month", balance, net_flow);

        (1..=months_ahead)
            .map(|i| {
                balance += net_flow;
                let month = anchor.add_months(i as i32);
                CashFlowPoint {
                    month,
                    date: month.first_day(),
                    balance,
                    income,
                    expenses,
                    net_flow,
                }
            })
            .collect()
    }
}
