use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::error::PayoffError;
use crate::time_value::{accrue_interest, checked_sum, settle_payment};
use crate::types::{payment_date, Money, Rate};
use crate::PayoffResult;

/// A single month in a single-balance amortization schedule
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AmortizationPeriod {
    pub month: u32,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub date: Option<NaiveDate>,
    pub opening_balance: Money,
    pub interest: Money,
    pub payment: Money,
    /// `payment - interest`; negative when the payment does not cover interest.
    pub principal_paid: Money,
    pub closing_balance: Money,
}

/// Roll a single balance forward month by month with a constant payment.
///
/// Each month interest accrues on the opening balance and is capitalised,
/// then the payment is applied (clamped so the balance never goes negative).
/// Fails with [`PayoffError::NonConvergent`] if the balance is still
/// outstanding after `max_months`.
pub fn amortize(
    principal: Money,
    monthly_rate: Rate,
    payment: Money,
    start_date: Option<NaiveDate>,
    max_months: u32,
) -> PayoffResult<Vec<AmortizationPeriod>> {
    let mut periods = Vec::new();
    let mut balance = principal;
    let mut month = 0u32;

    while balance > Decimal::ZERO {
        if month >= max_months {
            return Err(PayoffError::NonConvergent { max_months });
        }
        month += 1;

        let opening = balance;
        let interest = accrue_interest(opening, monthly_rate)?;
        balance = checked_sum(balance, interest, "balance with interest")?;

        let applied = settle_payment(balance, payment);
        balance -= applied;

        tracing::trace!(month, %opening, %interest, %applied, closing = %balance, "amortization period");

        periods.push(AmortizationPeriod {
            month,
            date: payment_date(start_date, month)?,
            opening_balance: opening,
            interest,
            payment: applied,
            principal_paid: applied - interest,
            closing_balance: balance,
        });
    }

    Ok(periods)
}

/// Total interest and total paid across a schedule.
pub fn schedule_totals(periods: &[AmortizationPeriod]) -> PayoffResult<(Money, Money)> {
    periods.iter().try_fold(
        (Decimal::ZERO, Decimal::ZERO),
        |(interest, paid), p| {
            Ok((
                checked_sum(interest, p.interest, "total interest")?,
                checked_sum(paid, p.payment, "total paid")?,
            ))
        },
    )
}
