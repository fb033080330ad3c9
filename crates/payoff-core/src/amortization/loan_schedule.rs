use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::time::Instant;

use crate::amortization::schedule::{amortize, schedule_totals, AmortizationPeriod};
use crate::error::PayoffError;
use crate::time_value::{annuity_payment, checked_sum, monthly_rate};
use crate::types::*;
use crate::PayoffResult;

/// Input for a term loan (mortgage, auto, student) with optional overpayment
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoanScheduleInput {
    pub principal: Money,
    /// Annual rate in percent (6.5 = 6.5% APR)
    pub annual_rate: Percent,
    pub term_months: u32,
    /// Recurring amount paid on top of the scheduled payment every month
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub extra_payment: Option<Money>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub start_date: Option<NaiveDate>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoanScheduleOutput {
    pub scheduled_payment: Money,
    pub monthly_payment: Money,
    pub total_months: u32,
    pub total_interest: Money,
    pub total_paid: Money,
    pub baseline_months: u32,
    pub baseline_interest: Money,
    pub months_saved: u32,
    pub interest_saved: Money,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub payoff_date: Option<NaiveDate>,
    pub schedule: Vec<AmortizationPeriod>,
}

/// Build the amortization schedule for a term loan, applying any recurring
/// extra payment and measuring the savings against the contractual schedule.
pub fn build_loan_schedule(
    input: &LoanScheduleInput,
) -> PayoffResult<ComputationOutput<LoanScheduleOutput>> {
    let start = Instant::now();
    let mut warnings: Vec<String> = Vec::new();

    validate_loan_input(input)?;

    let rate = monthly_rate(input.annual_rate);
    let scheduled_payment = annuity_payment(input.principal, rate, input.term_months)?;
    let extra = input.extra_payment.unwrap_or(Decimal::ZERO);
    let monthly_payment = checked_sum(scheduled_payment, extra, "scheduled payment plus extra")?;

    let baseline = amortize(input.principal, rate, scheduled_payment, None, MAX_MONTHS)?;
    let (baseline_interest, _) = schedule_totals(&baseline)?;

    let schedule = amortize(
        input.principal,
        rate,
        monthly_payment,
        input.start_date,
        MAX_MONTHS,
    )?;
    let (total_interest, total_paid) = schedule_totals(&schedule)?;

    if extra >= input.principal {
        warnings.push("Extra payment alone exceeds the principal; loan clears in the first month".into());
    }

    let total_months = schedule.len() as u32;
    let baseline_months = baseline.len() as u32;

    tracing::debug!(
        total_months,
        baseline_months,
        %total_interest,
        "loan schedule built"
    );

    let output = LoanScheduleOutput {
        scheduled_payment,
        monthly_payment,
        total_months,
        total_interest,
        total_paid,
        baseline_months,
        baseline_interest,
        months_saved: baseline_months.saturating_sub(total_months),
        interest_saved: baseline_interest - total_interest,
        payoff_date: schedule.last().and_then(|p| p.date),
        schedule,
    };

    let elapsed = start.elapsed().as_micros() as u64;
    Ok(with_metadata(
        "Term Loan Amortization with Overpayment",
        &serde_json::json!({
            "principal": input.principal.to_string(),
            "annual_rate_pct": input.annual_rate.to_string(),
            "term_months": input.term_months,
            "extra_payment": extra.to_string(),
        }),
        warnings,
        elapsed,
        output,
    ))
}

fn validate_loan_input(input: &LoanScheduleInput) -> PayoffResult<()> {
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
    if input.term_months == 0 || input.term_months > MAX_MONTHS {
        return Err(PayoffError::InvalidInput {
            field: "term_months".into(),
            reason: format!("Term must be between 1 and {MAX_MONTHS} months"),
        });
    }
    if let Some(extra) = input.extra_payment {
        if extra < Decimal::ZERO {
            return Err(PayoffError::InvalidInput {
                field: "extra_payment".into(),
                reason: "Extra payment cannot be negative".into(),
            });
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    fn mortgage() -> LoanScheduleInput {
        LoanScheduleInput {
            principal: dec!(300000),
            annual_rate: dec!(6),
            term_months: 360,
            extra_payment: None,
            start_date: None,
        }
    }

    #[test]
    fn test_thirty_year_mortgage_payment() {
        let result = build_loan_schedule(&mortgage()).unwrap().result;
        // 300k at 6% over 30 years ≈ 1798.65/month
        assert!((result.scheduled_payment - dec!(1798.65)).abs() < dec!(0.01));
        assert_eq!(result.total_months, 360);
        assert_eq!(result.months_saved, 0);
        assert_eq!(result.interest_saved, Decimal::ZERO);
    }

    #[test]
    fn test_extra_payment_shortens_loan() {
        let mut input = mortgage();
        input.extra_payment = Some(dec!(200));
        let result = build_loan_schedule(&input).unwrap().result;
        assert_eq!(result.monthly_payment, result.scheduled_payment + dec!(200));
        assert!(result.total_months < 360);
        assert!(result.months_saved > 0);
        assert!(result.interest_saved > Decimal::ZERO);
        assert_eq!(result.baseline_months, 360);
    }

    #[test]
    fn test_negative_extra_rejected() {
        let mut input = mortgage();
        input.extra_payment = Some(dec!(-1));
        assert!(build_loan_schedule(&input).is_err());
    }

    #[test]
    fn test_extra_payment_overflow_is_computation_failed() {
        let mut input = mortgage();
        input.extra_payment = Some(Decimal::MAX);
        assert!(matches!(
            build_loan_schedule(&input).unwrap_err(),
            PayoffError::ComputationFailed(_)
        ));
    }
}

