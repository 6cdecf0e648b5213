//! Level-payment annuity math: forward payment and reverse rate estimation

use log::{debug, warn};
use serde::{Deserialize, Serialize};

use crate::config::AmortizationConfig;
use crate::error::{ensure_finite, ensure_non_negative, ensure_positive, EngineError, Result};

/// Below this monthly rate the closed-form annuity derivative loses precision,
/// so a Taylor expansion around zero is used instead
const SERIES_RATE_THRESHOLD: f64 = 1e-6;

/// Result of a forward payment calculation
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ForwardPayment {
    /// Level monthly payment including the management fee
    pub monthly_payment: f64,

    /// Sum of all monthly payments over the term
    pub total_payback: f64,

    /// Yearly rate in percent (reference + margin)
    pub yearly_rate: f64,
}

/// Implied rate recovered from an observed payment
///
/// This is an estimate. When the solver hits its iteration cap the best iterate is
/// returned with `converged == false`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RateEstimate {
    /// Yearly rate in percent
    pub yearly_rate: f64,

    /// Assumed reference rate (the configured baseline)
    pub reference_rate_estimate: f64,

    /// Yearly rate above the reference rate, floored at zero
    pub margin_estimate: f64,

    /// Solved monthly rate as a decimal
    pub monthly_rate: f64,

    /// Newton-Raphson iterations performed
    pub iterations: u32,

    pub converged: bool,
}

/// Monthly decimal rate from a yearly percentage
pub fn monthly_rate(yearly_rate_pct: f64) -> f64 {
    yearly_rate_pct / 12.0 / 100.0
}

/// Level payment (excluding fees) that amortizes `principal` over `n` months
pub(crate) fn level_payment(principal: f64, monthly_rate: f64, n: u32) -> f64 {
    if monthly_rate == 0.0 {
        return principal / n as f64;
    }
    // (1+r)^n - 1, computed without cancellation for small r
    let growth = (n as f64 * monthly_rate.ln_1p()).exp_m1();
    principal * monthly_rate * (1.0 + growth) / growth
}

/// Monthly payment, total payback, and yearly rate for an installment loan
///
/// A zero yearly rate amortizes linearly (`principal / term + fee`).
///
/// # Arguments
/// * `principal` - Amount borrowed, must be positive
/// * `reference_rate` - Yearly reference rate in percent (e.g. 3.75)
/// * `margin` - Yearly margin over the reference rate in percent
/// * `fee` - Flat monthly management fee added to every payment
/// * `term_months` - Number of monthly payments, at least 1
///
/// # Returns
/// * `ForwardPayment` - Fee-inclusive monthly payment, total payback over the term,
///   and the yearly rate (`reference_rate + margin`)
/// * `InvalidInput` if any argument is out of range or the combined rate is negative
pub fn forward_payment(
    principal: f64,
    reference_rate: f64,
    margin: f64,
    fee: f64,
    term_months: u32,
) -> Result<ForwardPayment> {
    ensure_positive("principal", principal)?;
    ensure_finite("reference rate", reference_rate)?;
    ensure_finite("margin", margin)?;
    ensure_non_negative("fee", fee)?;
    ensure_term(term_months)?;

    let yearly_rate = reference_rate + margin;
    if yearly_rate < 0.0 {
        return Err(EngineError::InvalidInput(format!(
            "yearly rate must not be negative, got {}",
            yearly_rate
        )));
    }

    let monthly_payment = level_payment(principal, monthly_rate(yearly_rate), term_months) + fee;

    Ok(ForwardPayment {
        monthly_payment,
        total_payback: monthly_payment * term_months as f64,
        yearly_rate,
    })
}

/// Present value of `n` level payments and its derivative with respect to the rate
///
/// # Returns
/// * `(pv, dpv/dr)` - both finite for any `rate >= 0`
fn present_value_and_derivative(payment: f64, rate: f64, n: u32) -> (f64, f64) {
    let n_f = n as f64;

    if rate < SERIES_RATE_THRESHOLD {
        // PV(r) ~ A [n - r n(n+1)/2 + r^2 n(n+1)(n+2)/6]
        let a1 = n_f * (n_f + 1.0) / 2.0;
        let a2 = n_f * (n_f + 1.0) * (n_f + 2.0) / 6.0;
        let pv = payment * (n_f - rate * a1 + rate * rate * a2);
        let dpv = payment * (-a1 + 2.0 * rate * a2);
        return (pv, dpv);
    }

    let log_growth = rate.ln_1p();
    // 1 - (1+r)^-n
    let discounted = -(-n_f * log_growth).exp_m1();
    let pv = payment * discounted / rate;
    let dpv = payment * (n_f * (-(n_f + 1.0) * log_growth).exp() / rate - discounted / (rate * rate));
    (pv, dpv)
}

/// Solve for the rate implied by an observed monthly payment
///
/// Newton-Raphson on `PV(r) - principal` with an analytic derivative, starting
/// from `config.solver_initial_guess`, clamping each iterate at zero. Stops when
/// successive iterates differ by less than `config.solver_tolerance` or after
/// `config.solver_max_iterations`, returning the last iterate either way.
///
/// # Arguments
/// * `principal` - Amount borrowed, must be positive
/// * `observed_monthly_payment` - Payment actually charged, fee included
/// * `fee` - Flat monthly fee, subtracted before solving
/// * `term_months` - Number of monthly payments, at least 1
/// * `config` - Solver guess, tolerance, iteration cap and the reference rate baseline
///
/// # Returns
/// * `RateEstimate` - Yearly rate in percent, the margin over the configured
///   reference rate, and whether the solver converged
/// * `InvalidInput` if the payment does not exceed the fee or any argument is out of range
pub fn estimate_rate_from_payments(
    principal: f64,
    observed_monthly_payment: f64,
    fee: f64,
    term_months: u32,
    config: &AmortizationConfig,
) -> Result<RateEstimate> {
    ensure_positive("principal", principal)?;
    ensure_positive("observed monthly payment", observed_monthly_payment)?;
    ensure_non_negative("fee", fee)?;
    ensure_term(term_months)?;

    let net_payment = observed_monthly_payment - fee; // Level annuity part only
    if net_payment <= 0.0 {
        return Err(EngineError::InvalidInput(format!(
            "monthly payment {} does not exceed the fee {}",
            observed_monthly_payment, fee
        )));
    }

    let mut rate = config.solver_initial_guess.max(0.0); // Monthly decimal rate
    let mut iterations = 0;
    let mut converged = false;

    while iterations < config.solver_max_iterations {
        iterations += 1;

        let (pv, dpv) = present_value_and_derivative(net_payment, rate, term_months);
        if dpv.abs() < 1e-20 {
            break; // Flat present value, no usable Newton step
        }

        // Negative rates are not meaningful for a loan
        let next = (rate - (pv - principal) / dpv).max(0.0);
        if !next.is_finite() {
            break;
        }

        let delta = (next - rate).abs();
        debug!("rate solver iteration {}: r={:.10} delta={:.3e}", iterations, next, delta);
        rate = next;

        if delta < config.solver_tolerance {
            converged = true;
            break;
        }
    }

    if !converged {
        warn!(
            "rate estimate did not converge after {} iterations (principal {}, payment {}, term {})",
            iterations, principal, observed_monthly_payment, term_months
        );
    }

    // Convert monthly decimal rate to yearly percent
    let yearly_rate = rate * 12.0 * 100.0;
    let reference = config.reference_rate_baseline;

    Ok(RateEstimate {
        yearly_rate,
        reference_rate_estimate: reference,
        margin_estimate: (yearly_rate - reference).max(0.0),
        monthly_rate: rate,
        iterations,
        converged,
    })
}

pub(crate) fn ensure_term(term_months: u32) -> Result<()> {
    if term_months == 0 {
        return Err(EngineError::InvalidInput("term must be at least one month".to_string()));
    }
    Ok(())
}
