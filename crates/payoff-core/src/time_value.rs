use rust_decimal::Decimal;
use rust_decimal_macros::dec;

use crate::error::PayoffError;
use crate::types::{Money, Percent, Rate, BALANCE_EPSILON};
use crate::PayoffResult;

const LN_2: Decimal = dec!(0.6931471805599453094172321215);
const SERIES_TOLERANCE: Decimal = dec!(0.00000000000000000001);
const MAX_SERIES_TERMS: u32 = 60;

/// Monthly rate from an annual percentage: `annual / 100 / 12`.
pub fn monthly_rate(annual_rate: Percent) -> Rate {
    annual_rate / dec!(100) / dec!(12)
}

/// One period of interest on `balance` at `rate`.
pub fn accrue_interest(balance: Money, rate: Rate) -> PayoffResult<Money> {
    balance.checked_mul(rate).ok_or_else(|| {
        PayoffError::ComputationFailed(format!("interest on {balance} at {rate} overflows"))
    })
}

/// `a + b`, with `what` naming the quantity if the sum overflows.
pub fn checked_sum(a: Money, b: Money, what: &str) -> PayoffResult<Money> {
    a.checked_add(b)
        .ok_or_else(|| PayoffError::ComputationFailed(format!("{what} overflows")))
}

/// Compute (1 + r)^n via iterative multiplication (avoids Decimal::powd drift).
pub fn compound(rate: Rate, n: u32) -> PayoffResult<Decimal> {
    let factor = Decimal::ONE + rate;
    let mut result = Decimal::ONE;
    for _ in 0..n {
        result = result.checked_mul(factor).ok_or_else(|| {
            PayoffError::ComputationFailed(format!("(1 + {rate})^{n} overflows"))
        })?;
    }
    Ok(result)
}

/// Level payment that retires `principal` in exactly `n` periods.
///
/// `payment = P * r * (1+r)^n / ((1+r)^n - 1)`, falling back to the
/// straight-line `P / n` when the rate is zero.
pub fn annuity_payment(principal: Money, rate: Rate, n: u32) -> PayoffResult<Money> {
    if n == 0 {
        return Err(PayoffError::InvalidInput {
            field: "target_months".into(),
            reason: "Number of periods must be > 0".into(),
        });
    }

    if rate.is_zero() {
        return Ok(principal / Decimal::from(n));
    }

    let factor = compound(rate, n)?;
    let denominator = factor - Decimal::ONE;
    if denominator <= Decimal::ZERO {
        return Err(PayoffError::ComputationFailed(
            "annuity factor is not positive".into(),
        ));
    }

    principal
        .checked_mul(rate)
        .and_then(|v| v.checked_mul(factor))
        .and_then(|v| v.checked_div(denominator))
        .ok_or_else(|| PayoffError::ComputationFailed("annuity payment overflows".into()))
}

/// Fractional number of periods needed to retire `principal` with a level
/// `payment`: `n = -ln(1 - P*r/pmt) / ln(1 + r)`.
pub fn periods_to_payoff(principal: Money, rate: Rate, payment: Money) -> PayoffResult<Decimal> {
    if payment <= Decimal::ZERO {
        return Err(PayoffError::InvalidInput {
            field: "monthly_payment".into(),
            reason: "Payment must be positive".into(),
        });
    }

    if rate.is_zero() {
        return Ok(principal / payment);
    }

    let first_interest = accrue_interest(principal, rate)?;
    if payment <= first_interest {
        return Err(PayoffError::PaymentTooLow {
            payment,
            interest: first_interest,
        });
    }

    let numerator = ln(Decimal::ONE - first_interest / payment)?;
    let denominator = ln(Decimal::ONE + rate)?;
    if denominator.is_zero() {
        return Err(PayoffError::ComputationFailed(
            "ln(1 + r) evaluated to zero".into(),
        ));
    }

    Ok(-numerator / denominator)
}

/// Amount actually applied against a balance that currently stands at
/// `balance` (interest already accrued) when `payment` is offered.
///
/// Never more than the balance. Residual dust at or below
/// [`BALANCE_EPSILON`] is swept into the payment.
pub fn settle_payment(balance: Money, payment: Money) -> Money {
    if balance <= Decimal::ZERO || payment <= Decimal::ZERO {
        return Decimal::ZERO;
    }
    let applied = payment.min(balance);
    if balance - applied <= BALANCE_EPSILON {
        balance
    } else {
        applied
    }
}

/// Natural log by binary range reduction onto [0.5, 2] followed by the
/// series ln(x) = 2 * atanh((x - 1) / (x + 1)).
pub fn ln(x: Decimal) -> PayoffResult<Decimal> {
    if x <= Decimal::ZERO {
        return Err(PayoffError::ComputationFailed(format!(
            "ln undefined for {x}"
        )));
    }

    let two = dec!(2);
    let mut v = x;
    let mut k: i64 = 0;
    while v > two {
        v /= two;
        k += 1;
    }
    while v < dec!(0.5) {
        v *= two;
        k -= 1;
    }

    Ok(Decimal::from(k) * LN_2 + two_atanh((v - Decimal::ONE) / (v + Decimal::ONE)))
}

/// 2*atanh(y) = 2*(y + y^3/3 + y^5/5 + ...) for |y| < 1.
fn two_atanh(y: Decimal) -> Decimal {
    let y2 = y * y;
    let mut term = y;
    let mut sum = y;
    for k in 1..=MAX_SERIES_TERMS {
        term *= y2;
        let contribution = term / Decimal::from(2 * k + 1);
        sum += contribution;
        if contribution.abs() < SERIES_TOLERANCE {
            break;
        }
    }
    sum * dec!(2)
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    #[test]
    fn test_monthly_rate() {
        assert_eq!(monthly_rate(dec!(18)), dec!(0.015));
        assert_eq!(monthly_rate(dec!(24)), dec!(0.02));
        assert_eq!(monthly_rate(Decimal::ZERO), Decimal::ZERO);
    }

    #[test]
    fn test_compound() {
        assert_eq!(compound(dec!(0.1), 2).unwrap(), dec!(1.21));
        assert_eq!(compound(dec!(0.5), 0).unwrap(), Decimal::ONE);
    }

    #[test]
    fn test_compound_overflow_is_error() {
        assert!(compound(dec!(9), 100).is_err());
    }

    #[test]
    fn test_accrue_interest() {
        assert_eq!(accrue_interest(dec!(5000), dec!(0.015)).unwrap(), dec!(75));
        assert!(matches!(
            accrue_interest(Decimal::MAX, dec!(2)),
            Err(PayoffError::ComputationFailed(_))
        ));
    }

    #[test]
    fn test_checked_sum_overflow_names_quantity() {
        assert_eq!(checked_sum(dec!(1), dec!(2), "x").unwrap(), dec!(3));
        let err = checked_sum(Decimal::MAX, Decimal::ONE, "extra payment pool").unwrap_err();
        assert!(err.to_string().contains("extra payment pool"));
    }

    #[test]
    fn test_ln_known_values() {
        assert!(ln(Decimal::ONE).unwrap().abs() < dec!(0.0000000001));
        assert!((ln(dec!(2)).unwrap() - LN_2).abs() < dec!(0.0000000001));
        assert!((ln(dec!(10)).unwrap() - dec!(2.302585092994046)).abs() < dec!(0.0000000001));
        assert!((ln(dec!(0.01)).unwrap() - dec!(-4.605170185988091)).abs() < dec!(0.0000000001));
        assert!(ln(Decimal::ZERO).is_err());
    }

    #[test]
    fn test_annuity_payment_basic() {
        // 10,000 over 12 months at 1% per month ≈ 888.49
        let pmt = annuity_payment(dec!(10000), dec!(0.01), 12).unwrap();
        assert!((pmt - dec!(888.49)).abs() < dec!(0.01));
    }

    #[test]
    fn test_annuity_payment_zero_rate_is_straight_line() {
        assert_eq!(annuity_payment(dec!(1200), Decimal::ZERO, 12).unwrap(), dec!(100));
    }

    #[test]
    fn test_periods_to_payoff_inverts_annuity() {
        let pmt = annuity_payment(dec!(5000), dec!(0.015), 36).unwrap();
        let n = periods_to_payoff(dec!(5000), dec!(0.015), pmt).unwrap();
        assert!((n - dec!(36)).abs() < dec!(0.000001), "got {n}");
    }

    #[test]
    fn test_periods_to_payoff_rejects_low_payment() {
        let err = periods_to_payoff(dec!(5000), dec!(0.015), dec!(50)).unwrap_err();
        assert!(matches!(err, PayoffError::PaymentTooLow { .. }));
        let err = periods_to_payoff(dec!(5000), dec!(0.015), dec!(75)).unwrap_err();
        assert!(matches!(err, PayoffError::PaymentTooLow { .. }));
    }

    #[test]
    fn test_settle_payment() {
        assert_eq!(settle_payment(dec!(500), dec!(100)), dec!(100));
        assert_eq!(settle_payment(dec!(40), dec!(100)), dec!(40));
        assert_eq!(settle_payment(dec!(100.0000005), dec!(100)), dec!(100.0000005));
        assert_eq!(settle_payment(Decimal::ZERO, dec!(100)), Decimal::ZERO);
    }
}
