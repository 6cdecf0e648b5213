//! Loan and revolving credit records

use chrono::NaiveDate;
use serde::{Deserialize, Deserializer, Serialize, Serializer};

use super::serde_util::{due_day, flexible_date};

/// Remaining term of an obligation
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RemainingTerm {
    /// Installment loan with this many monthly payments left
    Months(u32),
    /// Revolving credit, no fixed term
    Revolving,
}

impl RemainingTerm {
    pub fn months(&self) -> Option<u32> {
        match self {
            RemainingTerm::Months(n) => Some(*n),
            RemainingTerm::Revolving => None,
        }
    }
}

const REVOLVING_LABEL: &str = "revolving";

impl Serialize for RemainingTerm {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match self {
            RemainingTerm::Months(n) => serializer.serialize_u32(*n),
            RemainingTerm::Revolving => serializer.serialize_str(REVOLVING_LABEL),
        }
    }
}

impl<'de> Deserialize<'de> for RemainingTerm {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        #[derive(Deserialize)]
        #[serde(untagged)]
        enum Raw {
            Months(u32),
            Text(String),
        }

        match Raw::deserialize(deserializer)? {
            Raw::Months(n) => Ok(RemainingTerm::Months(n)),
            Raw::Text(s) if s.eq_ignore_ascii_case(REVOLVING_LABEL) => Ok(RemainingTerm::Revolving),
            Raw::Text(s) => s
                .trim()
                .parse()
                .map(RemainingTerm::Months)
                .map_err(|_| serde::de::Error::custom(format!("unknown remaining term: {:?}", s))),
        }
    }
}

/// One open obligation: an installment loan or a revolving credit line
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Loan {
    /// Unique identifier (assigned by `Ledger::add_loan` when empty)
    #[serde(default)]
    pub id: String,

    /// Display name; the paired bill carries the same name
    pub name: String,

    /// Original principal, or credit limit for revolving credit
    pub total_amount: f64,

    /// Outstanding balance (never negative)
    pub current_amount: f64,

    /// Agreed monthly payment, including the management fee
    pub monthly_payment: f64,

    /// Nominal yearly rate in percent
    #[serde(default, rename = "yearlyRate")]
    pub nominal_rate: f64,

    /// Floating reference component of the yearly rate (percent)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub reference_rate: Option<f64>,

    /// Fixed spread over the reference rate (percent)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub personal_margin: Option<f64>,

    /// Flat fee charged every period
    #[serde(default)]
    pub management_fee: f64,

    /// Minimum payment as a percentage of balance (revolving credit only)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub minimum_percent: Option<f64>,

    pub remaining_term: RemainingTerm,

    #[serde(with = "due_day")]
    pub due_day: u8,

    #[serde(default, with = "flexible_date::option", skip_serializing_if = "Option::is_none")]
    pub last_payment_date: Option<NaiveDate>,
}

impl Loan {
    /// New installment loan with nothing repaid yet
    pub fn installment(
        name: impl Into<String>,
        principal: f64,
        monthly_payment: f64,
        yearly_rate: f64,
        term_months: u32,
        due_day: u8,
    ) -> Self {
        Self {
            id: String::new(),
            name: name.into(),
            total_amount: principal,
            current_amount: principal,
            monthly_payment,
            nominal_rate: yearly_rate,
            reference_rate: None,
            personal_margin: None,
            management_fee: 0.0,
            minimum_percent: None,
            remaining_term: RemainingTerm::Months(term_months),
            due_day,
            last_payment_date: None,
        }
    }

    /// New revolving credit line
    pub fn revolving(
        name: impl Into<String>,
        limit: f64,
        balance: f64,
        monthly_payment: f64,
        yearly_rate: f64,
        minimum_percent: f64,
        due_day: u8,
    ) -> Self {
        Self {
            id: String::new(),
            name: name.into(),
            total_amount: limit,
            current_amount: balance,
            monthly_payment,
            nominal_rate: yearly_rate,
            reference_rate: None,
            personal_margin: None,
            management_fee: 0.0,
            minimum_percent: Some(minimum_percent),
            remaining_term: RemainingTerm::Revolving,
            due_day,
            last_payment_date: None,
        }
    }

    /// Split the yearly rate into a reference rate and a personal margin
    pub fn with_rate_components(mut self, reference_rate: f64, margin: f64) -> Self {
        self.reference_rate = Some(reference_rate);
        self.personal_margin = Some(margin);
        self.nominal_rate = reference_rate + margin;
        self
    }

    pub fn with_fee(mut self, fee: f64) -> Self {
        self.management_fee = fee;
        self
    }

    /// Effective yearly rate in percent: reference + margin when both are known
    pub fn effective_rate(&self) -> f64 {
        match (self.reference_rate, self.personal_margin) {
            (Some(reference), Some(margin)) => reference + margin,
            _ => self.nominal_rate,
        }
    }

    /// Effective monthly rate as a decimal
    pub fn monthly_rate(&self) -> f64 {
        self.effective_rate() / 12.0 / 100.0
    }

    pub fn is_revolving(&self) -> bool {
        self.remaining_term == RemainingTerm::Revolving
    }

    /// Still owes money
    pub fn is_active(&self) -> bool {
        self.current_amount > 0.0
    }

    /// Part of one monthly payment that reduces principal at the current balance
    pub fn principal_portion(&self, payment: f64) -> f64 {
        let interest = self.current_amount * self.monthly_rate();
        (payment - self.management_fee - interest).max(0.0).min(self.current_amount)
    }
}
