use chrono::{Months, NaiveDate};
use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use serde::{Deserialize, Serialize};

use crate::error::PayoffError;
use crate::PayoffResult;

/// Monetary values, always Decimal.
pub type Money = Decimal;

/// Periodic rates expressed as decimals (0.015 = 1.5% per month).
pub type Rate = Decimal;

/// Rates quoted as percentages (18 = 18% APR), the way borrowers see them.
pub type Percent = Decimal;

/// Hard cap on simulated months (50 years).
pub const MAX_MONTHS: u32 = 600;

/// Balances at or below this amount after a payment are treated as paid off.
pub const BALANCE_EPSILON: Decimal = dec!(0.000001);

/// Standard computation output envelope
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ComputationOutput<T: Serialize> {
    pub result: T,
    pub methodology: String,
    pub assumptions: serde_json::Value,
    pub warnings: Vec<String>,
    pub metadata: ComputationMetadata,
}

/// Metadata for every computation
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ComputationMetadata {
    pub version: String,
    pub computation_time_us: u64,
    pub precision: String,
}

/// Helper to wrap computation results with metadata
pub fn with_metadata<T: Serialize>(
    methodology: &str,
    assumptions: &impl Serialize,
    warnings: Vec<String>,
    elapsed_us: u64,
    result: T,
) -> ComputationOutput<T> {
    for warning in &warnings {
        tracing::warn!(methodology, "{warning}");
    }
    ComputationOutput {
        result,
        methodology: methodology.to_string(),
        assumptions: serde_json::to_value(assumptions).unwrap_or_default(),
        warnings,
        metadata: ComputationMetadata {
            version: env!("CARGO_PKG_VERSION").to_string(),
            computation_time_us: elapsed_us,
            precision: "rust_decimal_128bit".to_string(),
        },
    }
}

/// Resolve a caller-supplied month cap against [`MAX_MONTHS`].
pub fn resolve_max_months(requested: Option<u32>) -> PayoffResult<u32> {
    match requested {
        None => Ok(MAX_MONTHS),
        Some(0) => Err(PayoffError::InvalidInput {
            field: "max_months".into(),
            reason: "max_months must be at least 1".into(),
        }),
        Some(m) if m > MAX_MONTHS => Err(PayoffError::InvalidInput {
            field: "max_months".into(),
            reason: format!("max_months may not exceed {MAX_MONTHS}"),
        }),
        Some(m) => Ok(m),
    }
}

/// Calendar date of the payment made in `month` (1-based).
///
/// `start` is the date of the first payment, so month 1 falls on `start`
/// itself and every later month is one calendar month further out. Day
/// overflow clamps to the end of the month (Jan 31 → Feb 28).
pub fn payment_date(start: Option<NaiveDate>, month: u32) -> PayoffResult<Option<NaiveDate>> {
    let Some(start) = start else {
        return Ok(None);
    };
    let offset = month.saturating_sub(1);
    start
        .checked_add_months(Months::new(offset))
        .map(Some)
        .ok_or_else(|| {
            PayoffError::DateError(format!("{start} + {offset} months is out of range"))
        })
}
