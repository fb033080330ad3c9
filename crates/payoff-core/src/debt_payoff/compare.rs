use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::time::Instant;

use crate::debt_payoff::engine::{run_payoff, DebtPayoffInput, DebtPayoffOutput};
use crate::debt_payoff::strategy::PayoffStrategy;
use crate::types::*;
use crate::PayoffResult;

/// Headline figures for one strategy.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StrategySummary {
    pub strategy: PayoffStrategy,
    pub total_months: u32,
    pub total_interest_paid: Money,
    pub total_paid: Money,
    pub payoff_order: Vec<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub payoff_date: Option<NaiveDate>,
}

impl From<&DebtPayoffOutput> for StrategySummary {
    fn from(out: &DebtPayoffOutput) -> Self {
        StrategySummary {
            strategy: out.strategy,
            total_months: out.total_months,
            total_interest_paid: out.total_interest_paid,
            total_paid: out.total_paid,
            payoff_order: out.payoff_order.clone(),
            payoff_date: out.payoff_date,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StrategyComparisonOutput {
    pub avalanche: StrategySummary,
    pub snowball: StrategySummary,
    /// Snowball interest minus avalanche interest
    pub interest_difference: Money,
    /// Snowball months minus avalanche months
    pub months_difference: i64,
    pub recommended: PayoffStrategy,
}

/// Run avalanche and snowball over the same balances and budget.
///
/// The strategy on `input` is ignored.
pub fn compare_strategies(
    input: &DebtPayoffInput,
) -> PayoffResult<ComputationOutput<StrategyComparisonOutput>> {
    let start = Instant::now();
    let mut warnings: Vec<String> = Vec::new();

    let avalanche_input = DebtPayoffInput {
        strategy: PayoffStrategy::Avalanche,
        ..input.clone()
    };
    let snowball_input = DebtPayoffInput {
        strategy: PayoffStrategy::Snowball,
        ..input.clone()
    };

    let avalanche = run_payoff(&avalanche_input, &mut warnings)?;
    // Validation warnings are identical for both runs
    let snowball = run_payoff(&snowball_input, &mut Vec::new())?;

    let interest_difference = snowball.total_interest_paid - avalanche.total_interest_paid;
    let months_difference = i64::from(snowball.total_months) - i64::from(avalanche.total_months);
    let recommended = if snowball.total_interest_paid < avalanche.total_interest_paid {
        PayoffStrategy::Snowball
    } else {
        PayoffStrategy::Avalanche
    };

    let output = StrategyComparisonOutput {
        avalanche: StrategySummary::from(&avalanche),
        snowball: StrategySummary::from(&snowball),
        interest_difference,
        months_difference,
        recommended,
    };

    let elapsed = start.elapsed().as_micros() as u64;
    Ok(with_metadata(
        "Debt Payoff Strategy Comparison (avalanche vs snowball)",
        &serde_json::json!({
            "balances": input.balances.len(),
            "budget": input.budget,
        }),
        warnings,
        elapsed,
        output,
    ))
}
