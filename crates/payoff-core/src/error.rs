use rust_decimal::Decimal;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum PayoffError {
    #[error("Invalid input: {field}: {reason}")]
    InvalidInput { field: String, reason: String },

    #[error("Payment too low to cover interest: payment {payment} does not exceed first-month interest {interest}")]
    PaymentTooLow { payment: Decimal, interest: Decimal },

    #[error("Balance not paid off within the {max_months}-month safety cap")]
    NonConvergent { max_months: u32 },

    #[error("Computation failed: {0}")]
    ComputationFailed(String),

    #[error("Date error: {0}")]
    DateError(String),

    #[error("Serialization error: {0}")]
    SerializationError(String),
}

impl From<serde_json::Error> for PayoffError {
    fn from(e: serde_json::Error) -> Self {
        PayoffError::SerializationError(e.to_string())
    }
}
