use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::time::Instant;

use crate::debt_payoff::strategy::{allocate_extra, Budget, PayoffStrategy};
use crate::error::PayoffError;
use crate::time_value::{accrue_interest, checked_sum, monthly_rate, settle_payment};
use crate::types::*;
use crate::PayoffResult;

// ---------------------------------------------------------------------------
// Types
// ---------------------------------------------------------------------------

/// A single debt entering the simulation.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BalanceInput {
    /// Stable identifier; defaults to `debt-<n>` by 1-based position.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    /// Display name only. Not required to be unique.
    pub name: String,
    pub principal: Money,
    /// Annual rate in percent (18 = 18% APR)
    pub annual_rate: Percent,
    pub minimum_payment: Money,
}

/// Input parameters for a multi-balance payoff simulation.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DebtPayoffInput {
    pub balances: Vec<BalanceInput>,
    #[serde(default)]
    pub strategy: PayoffStrategy,
    pub budget: Budget,
    /// Date of the first payment
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub start_date: Option<NaiveDate>,
    /// Lower safety cap on simulated months (at most 600)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub max_months: Option<u32>,
}

/// One balance's activity within a simulated month.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BalanceMonth {
    pub balance_id: String,
    pub name: String,
    pub interest: Money,
    pub payment: Money,
    /// `payment - interest`; negative when the payment does not cover interest.
    pub principal_paid: Money,
    pub remaining: Money,
}

/// One row of the payoff schedule.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScheduleEntry {
    pub month: u32,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub date: Option<NaiveDate>,
    pub balances: Vec<BalanceMonth>,
    pub total_payment: Money,
    pub total_interest: Money,
    pub total_remaining: Money,
}

/// Lifetime figures for one balance.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BalanceSummary {
    pub balance_id: String,
    pub name: String,
    pub starting_principal: Money,
    pub annual_rate: Percent,
    pub interest_paid: Money,
    pub total_paid: Money,
    /// Month the balance reached zero (0 if it started at zero)
    pub payoff_month: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub payoff_date: Option<NaiveDate>,
}

/// Top-level output from `simulate_payoff`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DebtPayoffOutput {
    pub strategy: PayoffStrategy,
    pub total_months: u32,
    pub total_interest_paid: Money,
    pub total_paid: Money,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub payoff_date: Option<NaiveDate>,
    /// Balance ids in the order they were cleared
    pub payoff_order: Vec<String>,
    pub balances: Vec<BalanceSummary>,
    pub schedule: Vec<ScheduleEntry>,
}

/// A balance as it evolves through the simulation.
#[derive(Debug, Clone)]
struct Balance {
    id: String,
    name: String,
    starting_principal: Money,
    principal: Money,
    annual_rate: Percent,
    monthly_rate: Rate,
    minimum_payment: Money,
    interest_paid: Money,
    total_paid: Money,
    payoff_month: Option<u32>,
}

/// Everything carried from one simulated month into the next.
#[derive(Debug)]
struct SimulationState {
    balances: Vec<Balance>,
    month: u32,
    total_interest_paid: Money,
    /// Pool on top of minimums under `Budget::ExtraPayment`, grown by
    /// every minimum released when a debt clears.
    extra_budget: Money,
}

impl SimulationState {
    fn new(input: &DebtPayoffInput, ids: Vec<String>) -> PayoffResult<Self> {
        let balances: Vec<Balance> = input
            .balances
            .iter()
            .zip(ids)
            .map(|(b, id)| Balance {
                id,
                name: b.name.clone(),
                starting_principal: b.principal,
                principal: b.principal,
                annual_rate: b.annual_rate,
                monthly_rate: monthly_rate(b.annual_rate),
                minimum_payment: b.minimum_payment,
                interest_paid: Decimal::ZERO,
                total_paid: Decimal::ZERO,
                payoff_month: (b.principal <= Decimal::ZERO).then_some(0),
            })
            .collect();

        // Balances that start at zero have already freed their minimum
        let extra_budget = match input.budget {
            Budget::MonthlyBudget(_) => Decimal::ZERO,
            Budget::ExtraPayment(extra) => balances
                .iter()
                .filter(|b| b.payoff_month.is_some())
                .try_fold(extra, |pool, b| {
                    checked_sum(pool, b.minimum_payment, "extra payment pool")
                })?,
        };

        Ok(Self {
            balances,
            month: 0,
            total_interest_paid: Decimal::ZERO,
            extra_budget,
        })
    }

    fn has_outstanding(&self) -> bool {
        self.balances.iter().any(|b| b.principal > Decimal::ZERO)
    }

    /// Advance one month: accrue interest, pay minimums, allocate the extra
    /// pool along `order`, then retire cleared balances.
    fn step(
        &mut self,
        budget: Budget,
        order: &[usize],
        start_date: Option<NaiveDate>,
    ) -> PayoffResult<ScheduleEntry> {
        self.month += 1;
        let month = self.month;
        let n = self.balances.len();
        let mut interest = vec![Decimal::ZERO; n];
        let mut paid = vec![Decimal::ZERO; n];

        // Interest capitalises before any payment is applied
        for (i, b) in self.balances.iter_mut().enumerate() {
            if b.principal > Decimal::ZERO {
                interest[i] = accrue_interest(b.principal, b.monthly_rate)?;
                b.principal = checked_sum(b.principal, interest[i], "balance with interest")?;
            }
        }

        let mut minimums_paid = Decimal::ZERO;
        for (i, b) in self.balances.iter_mut().enumerate() {
            let applied = settle_payment(b.principal, b.minimum_payment);
            b.principal -= applied;
            paid[i] += applied;
            minimums_paid = checked_sum(minimums_paid, applied, "minimums paid")?;
        }

        let available = match budget {
            Budget::MonthlyBudget(total) => (total - minimums_paid).max(Decimal::ZERO),
            Budget::ExtraPayment(_) => self.extra_budget,
        };
        let outstanding: Vec<Money> = self.balances.iter().map(|b| b.principal).collect();
        for (i, amount) in allocate_extra(order, &outstanding, available) {
            self.balances[i].principal -= amount;
            paid[i] += amount;
        }

        let mut rows = Vec::with_capacity(n);
        let mut month_interest = Decimal::ZERO;
        let mut month_payment = Decimal::ZERO;
        let mut month_remaining = Decimal::ZERO;
        for (i, b) in self.balances.iter_mut().enumerate() {
            b.interest_paid = checked_sum(b.interest_paid, interest[i], "interest paid")?;
            b.total_paid = checked_sum(b.total_paid, paid[i], "total paid")?;
            if b.payoff_month.is_none() && b.principal <= Decimal::ZERO {
                b.payoff_month = Some(month);
                self.extra_budget =
                    checked_sum(self.extra_budget, b.minimum_payment, "extra payment pool")?;
                tracing::debug!(month, balance = %b.id, "balance cleared");
            }

            month_interest = checked_sum(month_interest, interest[i], "monthly interest")?;
            month_payment = checked_sum(month_payment, paid[i], "monthly payment")?;
            month_remaining = checked_sum(month_remaining, b.principal, "remaining balance")?;
            rows.push(BalanceMonth {
                balance_id: b.id.clone(),
                name: b.name.clone(),
                interest: interest[i],
                payment: paid[i],
                principal_paid: paid[i] - interest[i],
                remaining: b.principal,
            });
        }
        self.total_interest_paid =
            checked_sum(self.total_interest_paid, month_interest, "total interest")?;

        tracing::trace!(
            month,
            payment = %month_payment,
            interest = %month_interest,
            remaining = %month_remaining,
            "payoff month simulated"
        );

        Ok(ScheduleEntry {
            month,
            date: payment_date(start_date, month)?,
            balances: rows,
            total_payment: month_payment,
            total_interest: month_interest,
            total_remaining: month_remaining,
        })
    }
}

// ---------------------------------------------------------------------------
// Core function
// ---------------------------------------------------------------------------

/// Simulate paying down several balances month by month under the chosen
/// strategy until every balance reaches zero.
pub fn simulate_payoff(
    input: &DebtPayoffInput,
) -> PayoffResult<ComputationOutput<DebtPayoffOutput>> {
    let start = Instant::now();
    let mut warnings: Vec<String> = Vec::new();

    let output = run_payoff(input, &mut warnings)?;

    let elapsed = start.elapsed().as_micros() as u64;
    Ok(with_metadata(
        &format!("Multi-Balance Debt Payoff ({})", input.strategy.label()),
        &serde_json::json!({
            "balances": input.balances.len(),
            "strategy": input.strategy.label(),
            "budget": input.budget,
            "max_months": resolve_max_months(input.max_months)?,
        }),
        warnings,
        elapsed,
        output,
    ))
}

/// Validate and run one strategy, without the output envelope.
pub(crate) fn run_payoff(
    input: &DebtPayoffInput,
    warnings: &mut Vec<String>,
) -> PayoffResult<DebtPayoffOutput> {
    let ids = validate_payoff_input(input, warnings)?;
    let max_months = resolve_max_months(input.max_months)?;
    let order = input.strategy.priority_order(&input.balances);

    tracing::debug!(
        strategy = input.strategy.label(),
        balances = input.balances.len(),
        max_months,
        "starting payoff simulation"
    );

    let mut state = SimulationState::new(input, ids)?;
    let mut schedule = Vec::new();
    while state.has_outstanding() {
        if state.month >= max_months {
            return Err(PayoffError::NonConvergent { max_months });
        }
        schedule.push(state.step(input.budget, &order, input.start_date)?);
    }

    let total_months = state.month;
    let total_paid = state
        .balances
        .iter()
        .try_fold(Decimal::ZERO, |sum, b| checked_sum(sum, b.total_paid, "total paid"))?;

    let mut cleared: Vec<(u32, usize, &Balance)> = order
        .iter()
        .enumerate()
        .filter_map(|(rank, &i)| {
            let b = &state.balances[i];
            b.payoff_month.map(|m| (m, rank, b))
        })
        .collect();
    cleared.sort_by_key(|&(month, rank, _)| (month, rank));
    let payoff_order = cleared.iter().map(|(_, _, b)| b.id.clone()).collect();

    let balances = state
        .balances
        .iter()
        .map(|b| -> PayoffResult<BalanceSummary> {
            let payoff_date = match b.payoff_month {
                Some(m) if m > 0 => payment_date(input.start_date, m)?,
                _ => None,
            };
            Ok(BalanceSummary {
                balance_id: b.id.clone(),
                name: b.name.clone(),
                starting_principal: b.starting_principal,
                annual_rate: b.annual_rate,
                interest_paid: b.interest_paid,
                total_paid: b.total_paid,
                payoff_month: b.payoff_month,
                payoff_date,
            })
        })
        .collect::<PayoffResult<Vec<_>>>()?;

    tracing::debug!(
        strategy = input.strategy.label(),
        total_months,
        total_interest = %state.total_interest_paid,
        "payoff simulation finished"
    );

    Ok(DebtPayoffOutput {
        strategy: input.strategy,
        total_months,
        total_interest_paid: state.total_interest_paid,
        total_paid,
        payoff_date: schedule.last().and_then(|e| e.date),
        payoff_order,
        balances,
        schedule,
    })
}

// ---------------------------------------------------------------------------
// Validation
// ---------------------------------------------------------------------------

/// Range-check every input and resolve balance ids. Nothing is simulated if
/// this fails.
fn validate_payoff_input(
    input: &DebtPayoffInput,
    warnings: &mut Vec<String>,
) -> PayoffResult<Vec<String>> {
    if input.balances.is_empty() {
        return Err(PayoffError::InvalidInput {
            field: "balances".into(),
            reason: "At least one balance is required".into(),
        });
    }

    let mut ids = Vec::with_capacity(input.balances.len());
    let mut seen = HashSet::new();
    for (i, b) in input.balances.iter().enumerate() {
        let field = |name: &str| format!("balances[{i}].{name}");
        if b.principal < Decimal::ZERO {
            return Err(PayoffError::InvalidInput {
                field: field("principal"),
                reason: "Principal cannot be negative".into(),
            });
        }
        if b.annual_rate < Decimal::ZERO {
            return Err(PayoffError::InvalidInput {
                field: field("annual_rate"),
                reason: "Annual rate cannot be negative".into(),
            });
        }
        if b.minimum_payment < Decimal::ZERO {
            return Err(PayoffError::InvalidInput {
                field: field("minimum_payment"),
                reason: "Minimum payment cannot be negative".into(),
            });
        }
        if b.principal > Decimal::ZERO && b.minimum_payment.is_zero() {
            return Err(PayoffError::InvalidInput {
                field: field("minimum_payment"),
                reason: "Minimum payment must be positive on an outstanding balance".into(),
            });
        }

        let id = b.id.clone().unwrap_or_else(|| format!("debt-{}", i + 1));
        if !seen.insert(id.clone()) {
            return Err(PayoffError::InvalidInput {
                field: field("id"),
                reason: format!("Duplicate balance id '{id}'"),
            });
        }
        ids.push(id);

        let first_interest = accrue_interest(b.principal, monthly_rate(b.annual_rate))?;
        if b.principal > Decimal::ZERO && b.minimum_payment <= first_interest {
            warnings.push(format!(
                "Minimum payment on '{}' ({}) does not cover its monthly interest ({})",
                b.name,
                b.minimum_payment,
                first_interest.round_dp(2)
            ));
        }
    }

    let outstanding: Vec<&BalanceInput> = input
        .balances
        .iter()
        .filter(|b| b.principal > Decimal::ZERO)
        .collect();
    let minimums = outstanding.iter().try_fold(Decimal::ZERO, |sum, b| {
        checked_sum(sum, b.minimum_payment, "sum of minimum payments")
    })?;

    let outlay = match input.budget {
        Budget::MonthlyBudget(total) => {
            if total < minimums {
                return Err(PayoffError::InvalidInput {
                    field: "budget".into(),
                    reason: format!(
                        "Monthly budget {total} is below the sum of minimum payments {minimums}"
                    ),
                });
            }
            total
        }
        Budget::ExtraPayment(extra) => {
            if extra < Decimal::ZERO {
                return Err(PayoffError::InvalidInput {
                    field: "budget".into(),
                    reason: "Extra payment cannot be negative".into(),
                });
            }
            checked_sum(minimums, extra, "minimums plus extra payment")?
        }
    };

    if outstanding.is_empty() {
        warnings.push("No outstanding balances; nothing to simulate".into());
        return Ok(ids);
    }

    let first_interest = outstanding.iter().try_fold(Decimal::ZERO, |sum, b| {
        let interest = accrue_interest(b.principal, monthly_rate(b.annual_rate))?;
        checked_sum(sum, interest, "first-month interest")
    })?;
    if outlay <= first_interest {
        return Err(PayoffError::PaymentTooLow {
            payment: outlay,
            interest: first_interest,
        });
    }

    Ok(ids)
}
