//! Ledger data model: loans, recurring bills, and transactions
//!
//! The [`Ledger`] is the aggregate every engine operation receives. It is a plain
//! value; the engine never caches it between calls.

mod bill;
mod loan;
mod month;
pub(crate) mod serde_util;
mod transaction;

pub use bill::{Bill, PaymentRecord, LOAN_BILL_CATEGORY};
pub use loan::{Loan, RemainingTerm};
pub use month::MonthKey;
pub use transaction::{Transaction, TransactionType};

use log::info;
use serde::{Deserialize, Serialize};

use crate::clock::IdGenerator;
use crate::error::{EngineError, Result};

/// Aggregate root owned by the persistence layer
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Ledger {
    /// Base balance: ad-hoc movements plus bill payment toggles since account creation
    #[serde(default)]
    pub balance: f64,

    #[serde(default)]
    pub loans: Vec<Loan>,

    #[serde(default)]
    pub bills: Vec<Bill>,

    #[serde(default)]
    pub transactions: Vec<Transaction>,
}

impl Ledger {
    pub fn with_balance(balance: f64) -> Self {
        Self {
            balance,
            ..Default::default()
        }
    }

    pub fn bill(&self, id: &str) -> Option<&Bill> {
        self.bills.iter().find(|b| b.id == id)
    }

    pub fn bill_mut(&mut self, id: &str) -> Option<&mut Bill> {
        self.bills.iter_mut().find(|b| b.id == id)
    }

    pub fn loan(&self, id: &str) -> Option<&Loan> {
        self.loans.iter().find(|l| l.id == id)
    }

    pub fn loan_mut(&mut self, id: &str) -> Option<&mut Loan> {
        self.loans.iter_mut().find(|l| l.id == id)
    }

    /// Loan paid through `bill`, by explicit link or, for older data, by name
    pub fn loan_for_bill(&self, bill: &Bill) -> Option<&Loan> {
        self.loans.iter().find(|loan| bill.pays_loan(&loan.id, &loan.name))
    }

    /// Bill that carries `loan`'s monthly payment
    pub fn payment_vehicle(&self, loan: &Loan) -> Option<&Bill> {
        self.bills.iter().find(|bill| bill.pays_loan(&loan.id, &loan.name))
    }

    /// Sum of outstanding loan and credit balances
    pub fn total_debt(&self) -> f64 {
        self.loans.iter().map(|l| l.current_amount.max(0.0)).sum()
    }

    /// Add a bill, assigning an id when it has none. Returns the bill id.
    pub fn add_bill(&mut self, mut bill: Bill, ids: &dyn IdGenerator) -> String {
        if bill.id.is_empty() {
            bill.id = ids.next_id();
        }
        let id = bill.id.clone();
        self.bills.push(bill);
        id
    }

    /// Append a transaction, assigning an id when it has none. Returns the id.
    pub fn add_transaction(&mut self, mut transaction: Transaction, ids: &dyn IdGenerator) -> String {
        if transaction.id.is_empty() {
            transaction.id = ids.next_id();
        }
        let id = transaction.id.clone();
        self.transactions.push(transaction);
        id
    }

    /// Add a loan together with the recurring bill that pays it.
    /// Returns `(loan_id, bill_id)`.
    pub fn add_loan(&mut self, mut loan: Loan, ids: &dyn IdGenerator) -> Result<(String, String)> {
        if loan.current_amount < 0.0 {
            return Err(EngineError::InvalidInput(format!(
                "loan {:?} has a negative balance {}",
                loan.name, loan.current_amount
            )));
        }
        if !loan.is_revolving() && loan.current_amount > loan.total_amount {
            return Err(EngineError::InvalidInput(format!(
                "loan {:?} owes {} on a principal of {}",
                loan.name, loan.current_amount, loan.total_amount
            )));
        }
        if loan.id.is_empty() {
            loan.id = ids.next_id();
        }

        let mut bill = Bill::new(loan.name.clone(), loan.monthly_payment, loan.due_day, LOAN_BILL_CATEGORY);
        bill.loan_id = Some(loan.id.clone());
        let loan_id = loan.id.clone();
        let bill_id = self.add_bill(bill, ids);

        info!("added loan {} ({}) with payment bill {}", loan_id, loan.name, bill_id);
        self.loans.push(loan);
        Ok((loan_id, bill_id))
    }

    /// Remove a loan and its payment bill
    pub fn remove_loan(&mut self, id: &str) -> Result<Loan> {
        let index = self
            .loans
            .iter()
            .position(|l| l.id == id)
            .ok_or_else(|| EngineError::UnknownLoan(id.to_string()))?;
        let loan = self.loans.remove(index);
        self.bills.retain(|bill| !bill.pays_loan(&loan.id, &loan.name));
        info!("removed loan {} ({}) and its payment bill", loan.id, loan.name);
        Ok(loan)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::clock::SequentialIds;

    #[test]
    fn test_add_loan_creates_paired_bill() {
        let ids = SequentialIds::new("id");
        let mut ledger = Ledger::with_balance(1_000.0);
        let loan = Loan::installment("Car", 12_000.0, 524.94, 4.25, 24, 15);

        let (loan_id, bill_id) = ledger.add_loan(loan, &ids).unwrap();
        assert_eq!(loan_id, "id-1");
        assert_eq!(bill_id, "id-2");

        let bill = ledger.bill(&bill_id).unwrap();
        assert_eq!(bill.name, "Car");
        assert_eq!(bill.amount, 524.94);
        assert_eq!(bill.due_day, 15);
        assert_eq!(bill.category, LOAN_BILL_CATEGORY);
        assert_eq!(bill.loan_id.as_deref(), Some("id-1"));

        let loan = ledger.loan(&loan_id).unwrap();
        assert_eq!(ledger.payment_vehicle(loan).map(|b| b.id.as_str()), Some("id-2"));
        assert_eq!(ledger.loan_for_bill(bill).map(|l| l.id.as_str()), Some("id-1"));
    }

    #[test]
    fn test_add_loan_rejects_overdrawn_installment() {
        let ids = SequentialIds::new("id");
        let mut ledger = Ledger::default();
        let mut loan = Loan::installment("Car", 1_000.0, 100.0, 5.0, 12, 1);
        loan.current_amount = 1_500.0;
        assert!(ledger.add_loan(loan, &ids).is_err());
        assert!(ledger.bills.is_empty());
    }

    #[test]
    fn test_remove_loan_removes_bill() {
        let ids = SequentialIds::new("id");
        let mut ledger = Ledger::default();
        ledger.add_bill(Bill::new("Rent", 800.0, 1, "housing"), &ids);
        let (loan_id, _) = ledger
            .add_loan(Loan::installment("Car", 5_000.0, 220.0, 6.0, 24, 1), &ids)
            .unwrap();

        let removed = ledger.remove_loan(&loan_id).unwrap();
        assert_eq!(removed.name, "Car");
        assert!(ledger.loans.is_empty());
        assert_eq!(ledger.bills.len(), 1);
        assert_eq!(ledger.bills[0].name, "Rent");

        assert!(matches!(ledger.remove_loan(&loan_id), Err(EngineError::UnknownLoan(_))));
    }

    #[test]
    fn test_total_debt() {
        let ids = SequentialIds::new("id");
        let mut ledger = Ledger::default();
        ledger.add_loan(Loan::installment("A", 1_000.0, 100.0, 5.0, 12, 1), &ids).unwrap();
        ledger
            .add_loan(Loan::revolving("Card", 5_000.0, 2_000.0, 60.0, 18.0, 3.0, 5), &ids)
            .unwrap();
        assert!((ledger.total_debt() - 3_000.0).abs() < 1e-9);
    }

    #[test]
    fn test_ledger_json_defaults() {
        let ledger: Ledger = serde_json::from_str(r#"{"balance": 250.5}"#).unwrap();
        assert_eq!(ledger.balance, 250.5);
        assert!(ledger.loans.is_empty() && ledger.bills.is_empty() && ledger.transactions.is_empty());
    }
}
