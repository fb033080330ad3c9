use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::time::Instant;

use crate::amortization::schedule::{amortize, schedule_totals, AmortizationPeriod};
use crate::error::PayoffError;
use crate::time_value::{accrue_interest, monthly_rate, periods_to_payoff};
use crate::types::*;
use crate::PayoffResult;

/// Input for solving months-to-payoff under a fixed monthly payment
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PayoffTimeInput {
    pub principal: Money,
    /// Annual rate in percent (18 = 18% APR)
    pub annual_rate: Percent,
    pub monthly_payment: Money,
    /// Date of the first payment
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub start_date: Option<NaiveDate>,
}

/// Output of the fixed-payment solver
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PayoffTimeOutput {
    pub monthly_rate: Rate,
    /// Closed-form (fractional) months to payoff
    pub exact_months: Decimal,
    /// Months in the simulated schedule, including the final partial payment
    pub total_months: u32,
    pub total_interest: Money,
    pub total_paid: Money,
    pub final_payment: Money,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub payoff_date: Option<NaiveDate>,
    pub schedule: Vec<AmortizationPeriod>,
}

/// Solve how long a fixed monthly payment takes to retire a single balance.
pub fn solve_payoff_time(
    input: &PayoffTimeInput,
) -> PayoffResult<ComputationOutput<PayoffTimeOutput>> {
    let start = Instant::now();
    let mut warnings: Vec<String> = Vec::new();

    validate_payoff_time_input(input)?;

    let rate = monthly_rate(input.annual_rate);
    let first_interest = accrue_interest(input.principal, rate)?;
    if input.monthly_payment <= first_interest {
        return Err(PayoffError::PaymentTooLow {
            payment: input.monthly_payment,
            interest: first_interest,
        });
    }

    let exact_months = periods_to_payoff(input.principal, rate, input.monthly_payment)?;
    if exact_months > Decimal::from(MAX_MONTHS) {
        return Err(PayoffError::NonConvergent {
            max_months: MAX_MONTHS,
        });
    }

    let schedule = amortize(
        input.principal,
        rate,
        input.monthly_payment,
        input.start_date,
        MAX_MONTHS,
    )?;
    let (total_interest, total_paid) = schedule_totals(&schedule)?;
    let last = schedule.last();
    let final_payment = last.map(|p| p.payment).unwrap_or(Decimal::ZERO);
    let payoff_date = last.and_then(|p| p.date);

    if input.monthly_payment - first_interest < first_interest {
        warnings.push(format!(
            "Over half of the first payment ({}) goes to interest ({})",
            input.monthly_payment,
            first_interest.round_dp(2)
        ));
    }

    tracing::debug!(
        total_months = schedule.len(),
        %exact_months,
        %total_interest,
        "fixed-payment payoff solved"
    );

    let output = PayoffTimeOutput {
        monthly_rate: rate,
        exact_months,
        total_months: schedule.len() as u32,
        total_interest,
        total_paid,
        final_payment,
        payoff_date,
        schedule,
    };

    let elapsed = start.elapsed().as_micros() as u64;
    Ok(with_metadata(
        "Fixed-Payment Amortization (closed-form payoff time)",
        &serde_json::json!({
            "principal": input.principal.to_string(),
            "annual_rate_pct": input.annual_rate.to_string(),
            "monthly_payment": input.monthly_payment.to_string(),
        }),
        warnings,
        elapsed,
        output,
    ))
}

fn validate_payoff_time_input(input: &PayoffTimeInput) -> PayoffResult<()> {
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
    if input.monthly_payment <= Decimal::ZERO {
        return Err(PayoffError::InvalidInput {
            field: "monthly_payment".into(),
            reason: "Monthly payment must be positive".into(),
        });
    }
    Ok(())
}
