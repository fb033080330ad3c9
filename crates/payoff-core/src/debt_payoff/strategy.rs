use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::debt_payoff::engine::BalanceInput;
use crate::time_value::settle_payment;
use crate::types::Money;

/// Policy for directing money left over after minimum payments
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum PayoffStrategy {
    /// Highest annual rate first
    #[default]
    Avalanche,
    /// Smallest starting balance first
    Snowball,
}

impl PayoffStrategy {
    pub fn label(self) -> &'static str {
        match self {
            PayoffStrategy::Avalanche => "avalanche",
            PayoffStrategy::Snowball => "snowball",
        }
    }

    /// Indices into `balances` in the order the extra budget is applied.
    ///
    /// The order is fixed once from the starting inputs and is not re-sorted
    /// as balances shrink. Ties keep input order.
    pub fn priority_order(self, balances: &[BalanceInput]) -> Vec<usize> {
        let mut order: Vec<usize> = (0..balances.len()).collect();
        match self {
            PayoffStrategy::Avalanche => {
                order.sort_by(|&a, &b| balances[b].annual_rate.cmp(&balances[a].annual_rate))
            }
            PayoffStrategy::Snowball => order.sort_by_key(|&i| balances[i].principal),
        }
        order
    }
}

/// How much is available each month on top of the minimums
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub enum Budget {
    /// Total paid across all debts each month; whatever the minimums leave
    /// over becomes the extra pool.
    MonthlyBudget(Money),
    /// Fixed amount on top of the minimums. Minimums released by cleared
    /// debts are added to it for every later month.
    ExtraPayment(Money),
}

/// Greedy single pass over `order`: the whole of `available` goes to the
/// first balance still outstanding and only spills to the next once that
/// balance is cleared.
///
/// Returns `(index, amount)` pairs for the balances that received money.
pub fn allocate_extra(order: &[usize], outstanding: &[Money], available: Money) -> Vec<(usize, Money)> {
    let mut remaining = available;
    let mut assignments = Vec::new();

    for &idx in order {
        if remaining <= Decimal::ZERO {
            break;
        }
        let balance = outstanding[idx];
        if balance <= Decimal::ZERO {
            continue;
        }
        let applied = settle_payment(balance, remaining);
        assignments.push((idx, applied));
        remaining -= applied;
    }

    assignments
}
