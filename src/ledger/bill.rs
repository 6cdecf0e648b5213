//! Recurring bill records and their month-keyed payment history

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

use super::month::MonthKey;
use super::serde_util::{due_day, flexible_date};

/// Category assigned to bills generated for a loan's monthly payment
pub const LOAN_BILL_CATEGORY: &str = "loan";

/// Payment status of one bill for one month
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PaymentRecord {
    pub paid: bool,

    #[serde(default, with = "flexible_date::option", skip_serializing_if = "Option::is_none")]
    pub paid_date: Option<NaiveDate>,

    /// Loan principal reduced by this payment, restored when the payment is reversed
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub principal_applied: Option<f64>,
}

/// A scheduled recurring obligation
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Bill {
    #[serde(default)]
    pub id: String,

    pub name: String,

    pub amount: f64,

    #[serde(with = "due_day")]
    pub due_day: u8,

    #[serde(default, alias = "type")]
    pub category: String,

    /// Legacy current-month flag; derived from `payment_history` after every write
    #[serde(default)]
    pub paid: bool,

    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub payment_history: BTreeMap<MonthKey, PaymentRecord>,

    /// Loan this bill pays, when it was generated for one
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub loan_id: Option<String>,
}

impl Bill {
    pub fn new(name: impl Into<String>, amount: f64, due_day: u8, category: impl Into<String>) -> Self {
        Self {
            id: String::new(),
            name: name.into(),
            amount,
            due_day,
            category: category.into(),
            paid: false,
            payment_history: BTreeMap::new(),
            loan_id: None,
        }
    }

    pub fn history_entry(&self, month: MonthKey) -> Option<&PaymentRecord> {
        self.payment_history.get(&month)
    }

    /// Whether this bill is the payment vehicle of a loan with this id and name
    pub fn pays_loan(&self, loan_id: &str, loan_name: &str) -> bool {
        match &self.loan_id {
            Some(id) => id == loan_id,
            None => self.name == loan_name,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_history_serializes_with_month_keys() {
        let mut bill = Bill::new("Rent", 800.0, 1, "housing");
        bill.payment_history.insert(
            MonthKey::new(2024, 1).unwrap(),
            PaymentRecord {
                paid: true,
                paid_date: NaiveDate::from_ymd_opt(2024, 1, 3),
                principal_applied: None,
            },
        );

        let json = serde_json::to_value(&bill).unwrap();
        assert_eq!(json["paymentHistory"]["2024-01"]["paid"], true);
        assert_eq!(json["paymentHistory"]["2024-01"]["paidDate"], "2024-01-03");
        assert_eq!(json["dueDay"], "1");

        let back: Bill = serde_json::from_value(json).unwrap();
        assert_eq!(back, bill);
    }

    #[test]
    fn test_legacy_shape_without_history() {
        let bill: Bill = serde_json::from_str(
            r#"{"id": "b1", "name": "Internet", "amount": 40, "dueDay": "12", "type": "utility", "paid": true}"#,
        )
        .unwrap();
        assert!(bill.paid);
        assert!(bill.payment_history.is_empty());
        assert_eq!(bill.category, "utility");
    }

    #[test]
    fn test_pays_loan_prefers_explicit_link() {
        let mut bill = Bill::new("Car", 300.0, 10, LOAN_BILL_CATEGORY);
        assert!(bill.pays_loan("l1", "Car"));
        bill.loan_id = Some("l2".to_string());
        assert!(!bill.pays_loan("l1", "Car"));
        assert!(bill.pays_loan("l2", "Renamed car"));
    }
}
