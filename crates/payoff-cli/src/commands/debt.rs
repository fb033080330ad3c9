use chrono::NaiveDate;
use clap::{Args, ValueEnum};
use rust_decimal::Decimal;
use serde_json::Value;

use payoff_core::debt_payoff::compare;
use payoff_core::debt_payoff::engine::{self, BalanceInput, DebtPayoffInput};
use payoff_core::debt_payoff::strategy::{Budget, PayoffStrategy};

use super::load_input;

#[derive(Debug, Clone, Copy, ValueEnum)]
pub enum StrategyArg {
    /// Highest interest rate first
    Avalanche,
    /// Smallest balance first
    Snowball,
}

impl From<StrategyArg> for PayoffStrategy {
    fn from(arg: StrategyArg) -> Self {
        match arg {
            StrategyArg::Avalanche => PayoffStrategy::Avalanche,
            StrategyArg::Snowball => PayoffStrategy::Snowball,
        }
    }
}

/// Balances and budget shared by `payoff` and `compare`
#[derive(Args)]
pub struct DebtSetArgs {
    /// Path to JSON or YAML input file (overrides individual flags)
    #[arg(long)]
    pub input: Option<String>,

    /// A debt as NAME:PRINCIPAL:APR:MINIMUM (repeatable)
    #[arg(long = "debt", value_parser = parse_debt)]
    pub debts: Vec<BalanceInput>,

    /// Total paid across all debts each month
    #[arg(long, conflicts_with = "extra")]
    pub budget: Option<Decimal>,

    /// Amount paid on top of the minimums each month
    #[arg(long)]
    pub extra: Option<Decimal>,

    /// Date of the first payment (YYYY-MM-DD)
    #[arg(long)]
    pub start_date: Option<NaiveDate>,

    /// Give up after this many months (at most 600)
    #[arg(long)]
    pub max_months: Option<u32>,
}

/// Arguments for a single-strategy payoff simulation
#[derive(Args)]
pub struct PayoffArgs {
    #[command(flatten)]
    pub debts: DebtSetArgs,

    /// Ordering policy for the money left after minimums
    #[arg(long, value_enum)]
    pub strategy: Option<StrategyArg>,
}

/// Arguments for the avalanche vs snowball comparison
#[derive(Args)]
pub struct CompareArgs {
    #[command(flatten)]
    pub debts: DebtSetArgs,
}

pub fn run_payoff(args: PayoffArgs) -> Result<Value, Box<dyn std::error::Error>> {
    let mut payoff_input = build_input(args.debts)?;
    if let Some(strategy) = args.strategy {
        payoff_input.strategy = strategy.into();
    }

    let result = engine::simulate_payoff(&payoff_input)?;
    Ok(serde_json::to_value(result)?)
}

pub fn run_compare(args: CompareArgs) -> Result<Value, Box<dyn std::error::Error>> {
    let payoff_input = build_input(args.debts)?;
    let result = compare::compare_strategies(&payoff_input)?;
    Ok(serde_json::to_value(result)?)
}

fn build_input(args: DebtSetArgs) -> Result<DebtPayoffInput, Box<dyn std::error::Error>> {
    if let Some(input) = load_input(args.input.as_deref())? {
        return Ok(input);
    }

    if args.debts.is_empty() {
        return Err("at least one --debt is required (or provide --input)".into());
    }
    let budget = match (args.budget, args.extra) {
        (Some(total), _) => Budget::MonthlyBudget(total),
        (None, Some(extra)) => Budget::ExtraPayment(extra),
        (None, None) => return Err("--budget or --extra is required (or provide --input)".into()),
    };

    Ok(DebtPayoffInput {
        balances: args.debts,
        strategy: PayoffStrategy::default(),
        budget,
        start_date: args.start_date,
        max_months: args.max_months,
    })
}

/// Parse `NAME:PRINCIPAL:APR:MINIMUM`. The name may itself contain colons.
fn parse_debt(raw: &str) -> Result<BalanceInput, String> {
    let mut parts = raw.rsplitn(4, ':');
    let (Some(minimum), Some(rate), Some(principal), Some(name)) =
        (parts.next(), parts.next(), parts.next(), parts.next())
    else {
        return Err(format!("expected NAME:PRINCIPAL:APR:MINIMUM, got '{raw}'"));
    };

    let number = |label: &str, value: &str| {
        value
            .trim()
            .parse::<Decimal>()
            .map_err(|e| format!("invalid {label} '{value}': {e}"))
    };

    Ok(BalanceInput {
        id: None,
        name: name.trim().to_string(),
        principal: number("principal", principal)?,
        annual_rate: number("APR", rate)?,
        minimum_payment: number("minimum", minimum)?,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    #[test]
    fn test_parse_debt() {
        let debt = parse_debt("Visa:5000:18.9:100").unwrap();
        assert_eq!(debt.name, "Visa");
        assert_eq!(debt.principal, dec!(5000));
        assert_eq!(debt.annual_rate, dec!(18.9));
        assert_eq!(debt.minimum_payment, dec!(100));
        assert!(debt.id.is_none());
    }

    #[test]
    fn test_parse_debt_name_with_colon() {
        let debt = parse_debt("Loan: car:12000:6:250").unwrap();
        assert_eq!(debt.name, "Loan: car");
        assert_eq!(debt.principal, dec!(12000));
    }

    #[test]
    fn test_parse_debt_rejects_malformed() {
        assert!(parse_debt("Visa:5000:18").is_err());
        assert!(parse_debt("Visa:lots:18:100").is_err());
    }
}
