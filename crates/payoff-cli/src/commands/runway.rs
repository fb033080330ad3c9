use chrono::NaiveDate;
use clap::Args;
use rust_decimal::Decimal;
use serde_json::Value;

use payoff_core::runway::projection::{self, RunwayInput};

use super::load_input;

/// Arguments for a cash runway projection
#[derive(Args)]
pub struct RunwayArgs {
    /// Path to JSON or YAML input file (overrides individual flags)
    #[arg(long)]
    pub input: Option<String>,

    /// Cash on hand today
    #[arg(long)]
    pub cash: Option<Decimal>,

    /// Current monthly revenue
    #[arg(long, default_value = "0")]
    pub revenue: Decimal,

    /// Current monthly expenses
    #[arg(long)]
    pub expenses: Option<Decimal>,

    /// Monthly revenue growth in percent
    #[arg(long, default_value = "0", allow_hyphen_values = true)]
    pub revenue_growth: Decimal,

    /// Monthly expense growth in percent
    #[arg(long, default_value = "0", allow_hyphen_values = true)]
    pub expense_growth: Decimal,

    /// First projected month (YYYY-MM-DD)
    #[arg(long)]
    pub start_date: Option<NaiveDate>,

    /// Stop projecting after this many months (at most 600)
    #[arg(long)]
    pub max_months: Option<u32>,
}

pub fn run_runway(args: RunwayArgs) -> Result<Value, Box<dyn std::error::Error>> {
    let runway_input: RunwayInput = match load_input(args.input.as_deref())? {
        Some(input) => input,
        None => RunwayInput {
            starting_cash: args.cash.ok_or("--cash is required (or provide --input)")?,
            monthly_revenue: args.revenue,
            monthly_expenses: args
                .expenses
                .ok_or("--expenses is required (or provide --input)")?,
            revenue_growth_rate: args.revenue_growth,
            expense_growth_rate: args.expense_growth,
            start_date: args.start_date,
            max_months: args.max_months,
        },
    };

    let result = projection::project_runway(&runway_input)?;
    Ok(serde_json::to_value(result)?)
}
