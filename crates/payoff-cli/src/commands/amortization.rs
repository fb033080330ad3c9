use chrono::NaiveDate;
use clap::Args;
use rust_decimal::Decimal;
use serde_json::Value;

use payoff_core::amortization::loan_schedule::{self, LoanScheduleInput};
use payoff_core::amortization::payoff_time::{self, PayoffTimeInput};
use payoff_core::amortization::required_payment::{self, RequiredPaymentInput};

use super::load_input;

/// Arguments for the fixed-payment payoff solver
#[derive(Args)]
pub struct AmortizeArgs {
    /// Path to JSON or YAML input file (overrides individual flags)
    #[arg(long)]
    pub input: Option<String>,

    /// Outstanding balance
    #[arg(long)]
    pub principal: Option<Decimal>,

    /// Annual interest rate in percent (e.g. 18 for 18% APR)
    #[arg(long)]
    pub annual_rate: Option<Decimal>,

    /// Fixed monthly payment
    #[arg(long)]
    pub payment: Option<Decimal>,

    /// Date of the first payment (YYYY-MM-DD)
    #[arg(long)]
    pub start_date: Option<NaiveDate>,
}

pub fn run_amortize(args: AmortizeArgs) -> Result<Value, Box<dyn std::error::Error>> {
    let payoff_input: PayoffTimeInput = match load_input(args.input.as_deref())? {
        Some(input) => input,
        None => PayoffTimeInput {
            principal: args
                .principal
                .ok_or("--principal is required (or provide --input)")?,
            annual_rate: args
                .annual_rate
                .ok_or("--annual-rate is required (or provide --input)")?,
            monthly_payment: args
                .payment
                .ok_or("--payment is required (or provide --input)")?,
            start_date: args.start_date,
        },
    };

    let result = payoff_time::solve_payoff_time(&payoff_input)?;
    Ok(serde_json::to_value(result)?)
}

/// Arguments for the target-date payment solver
#[derive(Args)]
pub struct TargetPaymentArgs {
    /// Path to JSON or YAML input file (overrides individual flags)
    #[arg(long)]
    pub input: Option<String>,

    /// Outstanding balance
    #[arg(long)]
    pub principal: Option<Decimal>,

    /// Annual interest rate in percent
    #[arg(long)]
    pub annual_rate: Option<Decimal>,

    /// Number of monthly payments to clear the balance in
    #[arg(long)]
    pub months: Option<u32>,

    /// Date of the first payment (YYYY-MM-DD)
    #[arg(long)]
    pub start_date: Option<NaiveDate>,
}

pub fn run_target_payment(args: TargetPaymentArgs) -> Result<Value, Box<dyn std::error::Error>> {
    let target_input: RequiredPaymentInput = match load_input(args.input.as_deref())? {
        Some(input) => input,
        None => RequiredPaymentInput {
            principal: args
                .principal
                .ok_or("--principal is required (or provide --input)")?,
            annual_rate: args
                .annual_rate
                .ok_or("--annual-rate is required (or provide --input)")?,
            target_months: args
                .months
                .ok_or("--months is required (or provide --input)")?,
            start_date: args.start_date,
        },
    };

    let result = required_payment::solve_required_payment(&target_input)?;
    Ok(serde_json::to_value(result)?)
}

/// Arguments for a term loan schedule
#[derive(Args)]
pub struct LoanArgs {
    /// Path to JSON or YAML input file (overrides individual flags)
    #[arg(long)]
    pub input: Option<String>,

    /// Amount borrowed
    #[arg(long)]
    pub principal: Option<Decimal>,

    /// Annual interest rate in percent
    #[arg(long)]
    pub annual_rate: Option<Decimal>,

    /// Contractual term in months
    #[arg(long)]
    pub term_months: Option<u32>,

    /// Recurring overpayment added to every scheduled payment
    #[arg(long)]
    pub extra: Option<Decimal>,

    /// Date of the first payment (YYYY-MM-DD)
    #[arg(long)]
    pub start_date: Option<NaiveDate>,
}

pub fn run_loan(args: LoanArgs) -> Result<Value, Box<dyn std::error::Error>> {
    let loan_input: LoanScheduleInput = match load_input(args.input.as_deref())? {
        Some(input) => input,
        None => LoanScheduleInput {
            principal: args
                .principal
                .ok_or("--principal is required (or provide --input)")?,
            annual_rate: args
                .annual_rate
                .ok_or("--annual-rate is required (or provide --input)")?,
            term_months: args
                .term_months
                .ok_or("--term-months is required (or provide --input)")?,
            extra_payment: args.extra,
            start_date: args.start_date,
        },
    };

    let result = loan_schedule::build_loan_schedule(&loan_input)?;
    Ok(serde_json::to_value(result)?)
}
