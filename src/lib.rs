//! Ledger Engine - loan amortization, bill payment tracking, and cash-flow forecasting
//!
//! This library provides:
//! - Annuity payments, implied-rate estimation, and revolving-credit minimums
//! - Month-scoped bill payment history with legacy flag migration
//! - Balance reconciliation that never double counts bill payments
//! - Expense forecasts, spending patterns, cash-flow projection, and a health score
//!
//! Every operation takes the ledger snapshot as an argument; nothing is cached
//! between calls. Time and id generation come in through [`Clock`] and
//! [`IdGenerator`] so results are reproducible.

pub mod amortization;
pub mod balance;
pub mod clock;
pub mod config;
pub mod error;
pub mod forecast;
pub mod ledger;
pub mod payments;
pub mod store;

// Re-export commonly used types
pub use amortization::{
    build_amortization_schedule, estimate_rate_from_payments, forward_payment, revolving_minimum_payment,
    AmortizationSchedule, ForwardPayment, RateEstimate, RevolvingPayoff,
};
pub use balance::{can_afford, compute_balance, is_bill_originated, toggle_bill_payment, PaymentToggle};
pub use clock::{Clock, FixedClock, IdGenerator, SequentialIds, SystemClock, UuidIds};
pub use config::{AmortizationConfig, EngineConfig, ForecastConfig};
pub use error::{EngineError, Result};
pub use forecast::ForecastEngine;
pub use ledger::{Bill, Ledger, Loan, MonthKey, PaymentRecord, RemainingTerm, Transaction, TransactionType};
pub use store::{JsonFileStore, LedgerStore, MemoryStore};
