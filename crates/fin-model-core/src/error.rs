use rust_decimal::Decimal;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum FinModelError {
    #[error("Configuration error: {field} — {reason}")]
    Configuration { field: String, reason: String },

    #[error("Calculation error in {stage}: {reason}")]
    Calculation { stage: String, reason: String },

    #[error("Convergence failure: {function} did not converge after {iterations} iterations (delta: {last_delta})")]
    ConvergenceFailure {
        function: String,
        iterations: u32,
        last_delta: Decimal,
    },

    #[error("Balance sheet out of balance in {period}: assets differ from liabilities plus equity by {difference}")]
    InvariantViolation { period: String, difference: Decimal },

    #[error("Division by zero in {context}")]
    DivisionByZero { context: String },
}
