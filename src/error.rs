//! Error types shared by every engine component

use thiserror::Error;

/// Errors raised by the engine and its persistence boundary
#[derive(Debug, Error)]
pub enum EngineError {
    /// Caller supplied a value outside the operation's domain
    #[error("invalid input: {0}")]
    InvalidInput(String),

    #[error("bill not found: {0}")]
    UnknownBill(String),

    #[error("loan not found: {0}")]
    UnknownLoan(String),

    /// Marking a bill paid would spend more than the reconciled balance
    #[error("insufficient funds: available {available:.2}, required {required:.2}")]
    InsufficientFunds { available: f64, required: f64 },

    #[error(transparent)]
    Io(#[from] std::io::Error),

    #[error(transparent)]
    Json(#[from] serde_json::Error),

    #[error(transparent)]
    Csv(#[from] csv::Error),
}

pub type Result<T> = std::result::Result<T, EngineError>;

/// Reject values that are NaN or infinite
pub(crate) fn ensure_finite(name: &str, value: f64) -> Result<()> {
    if value.is_finite() {
        Ok(())
    } else {
        Err(EngineError::InvalidInput(format!("{} must be a finite number, got {}", name, value)))
    }
}

/// Reject values that are negative (zero is allowed)
pub(crate) fn ensure_non_negative(name: &str, value: f64) -> Result<()> {
    ensure_finite(name, value)?;
    if value < 0.0 {
        return Err(EngineError::InvalidInput(format!("{} must not be negative, got {}", name, value)));
    }
    Ok(())
}

/// Reject values that are zero or negative
pub(crate) fn ensure_positive(name: &str, value: f64) -> Result<()> {
    ensure_finite(name, value)?;
    if value <= 0.0 {
        return Err(EngineError::InvalidInput(format!("{} must be positive, got {}", name, value)));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_validation_helpers() {
        assert!(ensure_positive("principal", 1.0).is_ok());
        assert!(ensure_positive("principal", 0.0).is_err());
        assert!(ensure_non_negative("fee", 0.0).is_ok());
        assert!(ensure_non_negative("fee", -0.01).is_err());
        assert!(ensure_finite("rate", f64::NAN).is_err());
    }

    #[test]
    fn test_insufficient_funds_message() {
        let err = EngineError::InsufficientFunds { available: 100.0, required: 800.0 };
        assert_eq!(err.to_string(), "insufficient funds: available 100.00, required 800.00");
    }
}
