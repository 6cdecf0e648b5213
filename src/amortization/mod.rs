//! Amortization calculator
//!
//! Pure functions over loan terms:
//! - forward payment for installment loans (annuity formula)
//! - reverse rate estimation from an observed payment (Newton-Raphson)
//! - minimum-payment payoff simulation for revolving credit
//! - per-month amortization schedules
//!
//! Rates are yearly percentages at the API boundary (4.25 means 4.25%/yr).
//! Invalid input is rejected with [`EngineError::InvalidInput`](crate::EngineError).

mod annuity;
mod revolving;
mod schedule;

pub use annuity::{estimate_rate_from_payments, forward_payment, monthly_rate, ForwardPayment, RateEstimate};
pub use revolving::{revolving_minimum_payment, PayoffStatus, RevolvingPayoff};
pub use schedule::{build_amortization_schedule, AmortizationSchedule, ScheduleIter, ScheduleRow, ScheduleSummary};
