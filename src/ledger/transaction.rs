//! Ledger transactions

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use super::month::MonthKey;
use super::serde_util::flexible_date;

/// Direction of a money movement
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TransactionType {
    Income,
    Expense,
}

/// An immutable ledger entry. `amount` is signed: positive in, negative out.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Transaction {
    #[serde(default)]
    pub id: String,

    pub name: String,

    pub amount: f64,

    #[serde(with = "flexible_date")]
    pub date: NaiveDate,

    #[serde(rename = "type")]
    pub kind: TransactionType,

    #[serde(default)]
    pub category: String,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub loan_id: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub principal_amount: Option<f64>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub interest_amount: Option<f64>,

    /// Bill whose payment this transaction records
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub originating_bill_id: Option<String>,
}

impl Transaction {
    /// Outflow of `magnitude` (stored negative)
    pub fn expense(name: impl Into<String>, magnitude: f64, date: NaiveDate, category: impl Into<String>) -> Self {
        Self::new(name, -magnitude.abs(), date, TransactionType::Expense, category)
    }

    /// Inflow of `magnitude` (stored positive)
    pub fn income(name: impl Into<String>, magnitude: f64, date: NaiveDate, category: impl Into<String>) -> Self {
        Self::new(name, magnitude.abs(), date, TransactionType::Income, category)
    }

    fn new(
        name: impl Into<String>,
        amount: f64,
        date: NaiveDate,
        kind: TransactionType,
        category: impl Into<String>,
    ) -> Self {
        Self {
            id: String::new(),
            name: name.into(),
            amount,
            date,
            kind,
            category: category.into(),
            loan_id: None,
            principal_amount: None,
            interest_amount: None,
            originating_bill_id: None,
        }
    }

    pub fn from_bill(mut self, bill_id: impl Into<String>) -> Self {
        self.originating_bill_id = Some(bill_id.into());
        self
    }

    pub fn is_expense(&self) -> bool {
        self.kind == TransactionType::Expense
    }

    pub fn is_income(&self) -> bool {
        self.kind == TransactionType::Income
    }

    pub fn magnitude(&self) -> f64 {
        self.amount.abs()
    }

    pub fn month(&self) -> MonthKey {
        MonthKey::from_date(self.date)
    }
}
