use chrono::NaiveDate;
use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use serde::{Deserialize, Serialize};
use std::time::Instant;

use crate::error::PayoffError;
use crate::time_value::checked_sum;
use crate::types::*;
use crate::PayoffResult;

// ---------------------------------------------------------------------------
// Types
// ---------------------------------------------------------------------------

/// Input parameters for a cash runway projection.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RunwayInput {
    pub starting_cash: Money,
    pub monthly_revenue: Money,
    pub monthly_expenses: Money,
    /// Monthly revenue growth in percent (5 = +5% per month)
    #[serde(default)]
    pub revenue_growth_rate: Percent,
    /// Monthly expense growth in percent
    #[serde(default)]
    pub expense_growth_rate: Percent,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub start_date: Option<NaiveDate>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub max_months: Option<u32>,
}

/// Why the projection stopped.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum RunwayOutcome {
    /// Cash reached zero at the end of `month`
    CashExhausted { month: u32 },
    /// Revenue covered expenses from `month` onwards
    Profitable { month: u32 },
    /// Neither happened before the month cap
    Horizon,
}

/// A single projected month.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RunwayMonth {
    pub month: u32,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub date: Option<NaiveDate>,
    pub revenue: Money,
    pub expenses: Money,
    pub net_burn: Money,
    pub cash: Money,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RunwayOutput {
    pub outcome: RunwayOutcome,
    /// Month in which cash runs out, if it does
    pub runway_months: Option<u32>,
    /// First month revenue covers expenses, if it does
    pub breakeven_month: Option<u32>,
    pub months_simulated: u32,
    pub total_burn: Money,
    pub ending_cash: Money,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub cash_out_date: Option<NaiveDate>,
    pub schedule: Vec<RunwayMonth>,
}

// ---------------------------------------------------------------------------
// Core function
// ---------------------------------------------------------------------------

/// Project cash month by month with compounding revenue and expense growth
/// until cash is exhausted, the business turns profitable, or the cap hits.
pub fn project_runway(input: &RunwayInput) -> PayoffResult<ComputationOutput<RunwayOutput>> {
    let start = Instant::now();
    let mut warnings: Vec<String> = Vec::new();

    validate_runway_input(input)?;
    let max_months = resolve_max_months(input.max_months)?;

    let revenue_factor = Decimal::ONE + input.revenue_growth_rate / dec!(100);
    let expense_factor = Decimal::ONE + input.expense_growth_rate / dec!(100);

    let mut cash = input.starting_cash;
    let mut revenue = input.monthly_revenue;
    let mut expenses = input.monthly_expenses;
    let mut total_burn = Decimal::ZERO;
    let mut schedule: Vec<RunwayMonth> = Vec::new();
    let mut outcome = RunwayOutcome::Horizon;

    for month in 1..=max_months {
        if revenue >= expenses {
            outcome = RunwayOutcome::Profitable { month };
            break;
        }

        let net = revenue - expenses;
        cash += net;
        total_burn = checked_sum(total_burn, -net, "total burn")?;
        schedule.push(RunwayMonth {
            month,
            date: payment_date(input.start_date, month)?,
            revenue,
            expenses,
            net_burn: -net,
            cash,
        });

        if cash <= Decimal::ZERO {
            outcome = RunwayOutcome::CashExhausted { month };
            break;
        }

        revenue = revenue.checked_mul(revenue_factor).ok_or_else(|| {
            PayoffError::ComputationFailed(format!("revenue overflowed in month {month}"))
        })?;
        expenses = expenses.checked_mul(expense_factor).ok_or_else(|| {
            PayoffError::ComputationFailed(format!("expenses overflowed in month {month}"))
        })?;
    }

    let (runway_months, breakeven_month) = match outcome {
        RunwayOutcome::CashExhausted { month } => (Some(month), None),
        RunwayOutcome::Profitable { month } => (None, Some(month)),
        RunwayOutcome::Horizon => {
            warnings.push(format!(
                "Projection stopped at the {max_months}-month cap without running out of cash or breaking even"
            ));
            (None, None)
        }
    };

    let cash_out_date = match runway_months {
        Some(m) => payment_date(input.start_date, m)?,
        None => None,
    };

    tracing::debug!(?outcome, months = schedule.len(), %cash, "runway projected");

    let output = RunwayOutput {
        outcome,
        runway_months,
        breakeven_month,
        months_simulated: schedule.len() as u32,
        total_burn,
        ending_cash: cash,
        cash_out_date,
        schedule,
    };

    let elapsed = start.elapsed().as_micros() as u64;
    Ok(with_metadata(
        "Cash Runway Projection (monthly compounding growth)",
        &serde_json::json!({
            "starting_cash": input.starting_cash.to_string(),
            "monthly_revenue": input.monthly_revenue.to_string(),
            "monthly_expenses": input.monthly_expenses.to_string(),
            "revenue_growth_pct": input.revenue_growth_rate.to_string(),
            "expense_growth_pct": input.expense_growth_rate.to_string(),
            "max_months": max_months,
        }),
        warnings,
        elapsed,
        output,
    ))
}

fn validate_runway_input(input: &RunwayInput) -> PayoffResult<()> {
    if input.starting_cash < Decimal::ZERO {
        return Err(PayoffError::InvalidInput {
            field: "starting_cash".into(),
            reason: "Starting cash cannot be negative".into(),
        });
    }
    if input.monthly_revenue < Decimal::ZERO {
        return Err(PayoffError::InvalidInput {
            field: "monthly_revenue".into(),
            reason: "Revenue cannot be negative".into(),
        });
    }
    if input.monthly_expenses < Decimal::ZERO {
        return Err(PayoffError::InvalidInput {
            field: "monthly_expenses".into(),
            reason: "Expenses cannot be negative".into(),
        });
    }
    if input.revenue_growth_rate <= dec!(-100) {
        return Err(PayoffError::InvalidInput {
            field: "revenue_growth_rate".into(),
            reason: "Growth rate must be greater than -100%".into(),
        });
    }
    if input.expense_growth_rate <= dec!(-100) {
        return Err(PayoffError::InvalidInput {
            field: "expense_growth_rate".into(),
            reason: "Growth rate must be greater than -100%".into(),
        });
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn flat_burn() -> RunwayInput {
        RunwayInput {
            starting_cash: dec!(1200),
            monthly_revenue: dec!(400),
            monthly_expenses: dec!(500),
            revenue_growth_rate: Decimal::ZERO,
            expense_growth_rate: Decimal::ZERO,
            start_date: None,
            max_months: None,
        }
    }

    #[test]
    fn test_flat_burn_exhausts_in_twelve_months() {
        let out = project_runway(&flat_burn()).unwrap().result;
        assert_eq!(out.outcome, RunwayOutcome::CashExhausted { month: 12 });
        assert_eq!(out.runway_months, Some(12));
        assert_eq!(out.breakeven_month, None);
        assert_eq!(out.ending_cash, Decimal::ZERO);
        assert_eq!(out.total_burn, dec!(1200));
        assert_eq!(out.schedule.len(), 12);
        assert_eq!(out.schedule[0].net_burn, dec!(100));
        assert_eq!(out.schedule[0].cash, dec!(1100));
    }

    #[test]
    fn test_already_profitable() {
        let mut input = flat_burn();
        input.monthly_revenue = dec!(600);
        let out = project_runway(&input).unwrap().result;
        assert_eq!(out.outcome, RunwayOutcome::Profitable { month: 1 });
        assert!(out.schedule.is_empty());
        assert_eq!(out.ending_cash, dec!(1200));
    }

    #[test]
    fn test_revenue_growth_reaches_breakeven() {
        let input = RunwayInput {
            starting_cash: dec!(100000),
            monthly_revenue: dec!(10000),
            monthly_expenses: dec!(20000),
            revenue_growth_rate: dec!(10),
            expense_growth_rate: Decimal::ZERO,
            start_date: None,
            max_months: None,
        };
        let out = project_runway(&input).unwrap().result;
        // 10000 * 1.1^7 ≈ 19487, 1.1^8 ≈ 21436 → profitable in month 9
        assert_eq!(out.outcome, RunwayOutcome::Profitable { month: 9 });
        assert_eq!(out.breakeven_month, Some(9));
        assert_eq!(out.months_simulated, 8);
        assert!(out.ending_cash > Decimal::ZERO);
    }

    #[test]
    fn test_horizon_when_cap_reached() {
        let mut input = flat_burn();
        input.starting_cash = dec!(1000000);
        input.max_months = Some(24);
        let out = project_runway(&input).unwrap();
        assert_eq!(out.result.outcome, RunwayOutcome::Horizon);
        assert_eq!(out.result.months_simulated, 24);
        assert_eq!(out.warnings.len(), 1);
    }

    #[test]
    fn test_cash_out_date() {
        let mut input = flat_burn();
        input.start_date = NaiveDate::from_ymd_opt(2025, 1, 1);
        let out = project_runway(&input).unwrap().result;
        assert_eq!(out.cash_out_date, NaiveDate::from_ymd_opt(2025, 12, 1));
    }

    #[test]
    fn test_invalid_growth_rate() {
        let mut input = flat_burn();
        input.expense_growth_rate = dec!(-100);
        assert!(project_runway(&input).is_err());
    }
}
