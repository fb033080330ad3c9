mod commands;
mod input;
mod output;

use clap::{Parser, Subcommand, ValueEnum};
use colored::Colorize;
use std::process;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use commands::amortization::{AmortizeArgs, LoanArgs, TargetPaymentArgs};
use commands::debt::{CompareArgs, PayoffArgs};
use commands::runway::RunwayArgs;

/// Amortization, debt payoff and cash runway simulation
#[derive(Parser)]
#[command(
    name = "payoff",
    version,
    about = "Amortization, debt payoff and cash runway simulation",
    long_about = "A CLI for month-by-month balance simulation with decimal precision. \
                  Solves payoff time and target-date payments for a single balance, \
                  builds term loan schedules, runs avalanche and snowball plans across \
                  several debts, and projects cash runway."
)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Output format
    #[arg(long, default_value = "json", global = true)]
    output: OutputFormat,

    /// Log simulation progress to stderr
    #[arg(long, short, global = true)]
    verbose: bool,
}

#[derive(Subcommand)]
enum Commands {
    /// Months to clear a balance with a fixed monthly payment
    Amortize(AmortizeArgs),
    /// Monthly payment that clears a balance in a given number of months
    TargetPayment(TargetPaymentArgs),
    /// Term loan schedule with optional overpayment
    Loan(LoanArgs),
    /// Pay down several debts with the avalanche or snowball strategy
    Payoff(PayoffArgs),
    /// Compare avalanche and snowball on the same debts
    Compare(CompareArgs),
    /// Project how long cash lasts at the current burn
    Runway(RunwayArgs),
    /// Print version information
    Version,
}

#[derive(Debug, Clone, ValueEnum)]
pub enum OutputFormat {
    Json,
    Table,
    Csv,
    Minimal,
}

fn init_tracing(verbose: bool) {
    let default_filter = if verbose {
        format!("warn,payoff_core=debug,{}=debug", env!("CARGO_CRATE_NAME"))
    } else {
        "warn".to_string()
    };
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(default_filter)),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();
}

fn main() {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    let result: Result<serde_json::Value, Box<dyn std::error::Error>> = match cli.command {
        Commands::Amortize(args) => commands::amortization::run_amortize(args),
        Commands::TargetPayment(args) => commands::amortization::run_target_payment(args),
        Commands::Loan(args) => commands::amortization::run_loan(args),
        Commands::Payoff(args) => commands::debt::run_payoff(args),
        Commands::Compare(args) => commands::debt::run_compare(args),
        Commands::Runway(args) => commands::runway::run_runway(args),
        Commands::Version => {
            println!("payoff {}", env!("CARGO_PKG_VERSION"));
            return;
        }
    };

    match result {
        Ok(value) => {
            output::format_output(&cli.output, &value);
            process::exit(0);
        }
        Err(e) => {
            tracing::debug!(error = %e, "command failed");
            eprintln!("{}: {}", "error".red().bold(), e);
            process::exit(1);
        }
    }
}
