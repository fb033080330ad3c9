use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::time::Instant;

use crate::amortization::schedule::{amortize, schedule_totals, AmortizationPeriod};
use crate::error::PayoffError;
use crate::time_value::{annuity_payment, monthly_rate};
use crate::types::*;
use crate::PayoffResult;

/// Input for solving the level payment that clears a balance by a target date
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RequiredPaymentInput {
    pub principal: Money,
    /// Annual rate in percent (18 = 18% APR)
    pub annual_rate: Percent,
    pub target_months: u32,
    /// Date of the first payment
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub start_date: Option<NaiveDate>,
}

/// Output of the target-date solver
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RequiredPaymentOutput {
    pub monthly_rate: Rate,
    pub required_payment: Money,
    pub total_months: u32,
    pub total_interest: Money,
    pub total_paid: Money,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub payoff_date: Option<NaiveDate>,
    pub schedule: Vec<AmortizationPeriod>,
}

/// Solve the constant monthly payment that retires a balance in exactly
/// `target_months`, then generate the month-by-month schedule with it.
pub fn solve_required_payment(
    input: &RequiredPaymentInput,
) -> PayoffResult<ComputationOutput<RequiredPaymentOutput>> {
    let start = Instant::now();
    let warnings: Vec<String> = Vec::new();

    validate_required_payment_input(input)?;

    let rate = monthly_rate(input.annual_rate);
    let required_payment = annuity_payment(input.principal, rate, input.target_months)?;

    let schedule = amortize(
        input.principal,
        rate,
        required_payment,
        input.start_date,
        MAX_MONTHS,
    )?;
    let (total_interest, total_paid) = schedule_totals(&schedule)?;

    tracing::debug!(
        target_months = input.target_months,
        %required_payment,
        %total_interest,
        "target-date payment solved"
    );

    let output = RequiredPaymentOutput {
        monthly_rate: rate,
        required_payment,
        total_months: schedule.len() as u32,
        total_interest,
        total_paid,
        payoff_date: schedule.last().and_then(|p| p.date),
        schedule,
    };

    let elapsed = start.elapsed().as_micros() as u64;
    Ok(with_metadata(
        "Target-Date Amortization (annuity payment)",
        &serde_json::json!({
            "principal": input.principal.to_string(),
            "annual_rate_pct": input.annual_rate.to_string(),
            "target_months": input.target_months,
        }),
        warnings,
        elapsed,
        output,
    ))
}

fn validate_required_payment_input(input: &RequiredPaymentInput) -> PayoffResult<()> {
    if input.principal <= Decimal::ZERO {
        return Err(PayoffError::InvalidInput {
            field: "principal".into(),
            reason: "Principal must be positive".into(),
        });
    }
    if input.annual_rate < Decimal::ZERO {
        return Err(PayoffError::InvalidInput {
            field: "annual_rate".into(),
            reason: "Annual rate cannot be negative".into(),
        });
    }
    if input.target_months == 0 || input.target_months > MAX_MONTHS {
        return Err(PayoffError::InvalidInput {
            field: "target_months".into(),
            reason: format!("Target months must be between 1 and {MAX_MONTHS}"),
        });
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    fn student_loan() -> RequiredPaymentInput {
        RequiredPaymentInput {
            principal: dec!(30000),
            annual_rate: dec!(6),
            target_months: 120,
            start_date: None,
        }
    }

    #[test]
    fn test_standard_ten_year_plan() {
        let result = solve_required_payment(&student_loan()).unwrap().result;
        // 30k at 6% over 10 years ≈ 333.06/month
        assert!((result.required_payment - dec!(333.06)).abs() < dec!(0.01));
        assert_eq!(result.total_months, 120);
        assert_eq!(result.schedule.last().unwrap().closing_balance, Decimal::ZERO);
    }

    #[test]
    fn test_zero_rate_straight_line() {
        let mut input = student_loan();
        input.annual_rate = Decimal::ZERO;
        let result = solve_required_payment(&input).unwrap().result;
        assert_eq!(result.required_payment, dec!(250));
        assert_eq!(result.total_months, 120);
        assert_eq!(result.total_interest, Decimal::ZERO);
    }

    #[test]
    fn test_single_month_target() {
        let mut input = student_loan();
        input.target_months = 1;
        let result = solve_required_payment(&input).unwrap().result;
        // One payment of principal plus one month of interest
        assert_eq!(result.required_payment, dec!(30150));
        assert_eq!(result.total_months, 1);
    }

    #[test]
    fn test_target_months_out_of_range() {
        let mut input = student_loan();
        input.target_months = 0;
        assert!(solve_required_payment(&input).is_err());
        input.target_months = MAX_MONTHS + 1;
        assert!(solve_required_payment(&input).is_err());
    }

    #[test]
    fn test_overflowing_rate_fails_cleanly() {
        let mut input = student_loan();
        input.annual_rate = dec!(100000);
        input.target_months = 600;
        let err = solve_required_payment(&input).unwrap_err();
        assert!(matches!(err, PayoffError::ComputationFailed(_)));
    }
}
