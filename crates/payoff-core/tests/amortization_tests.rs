use chrono::NaiveDate;
use payoff_core::amortization::{loan_schedule, payoff_time, required_payment, schedule};
use payoff_core::PayoffError;
use pretty_assertions::assert_eq;
use proptest::prelude::*;
use rust_decimal::Decimal;
use rust_decimal_macros::dec;

const IDENTITY_TOLERANCE: Decimal = dec!(0.0000000001);

fn assert_schedule_consistent(periods: &[schedule::AmortizationPeriod]) {
    let mut previous_closing: Option<Decimal> = None;
    for (i, p) in periods.iter().enumerate() {
        assert_eq!(p.month, i as u32 + 1);
        assert!(p.closing_balance >= Decimal::ZERO, "negative balance in month {}", p.month);
        let drift = (p.opening_balance + p.interest - p.payment - p.closing_balance).abs();
        assert!(drift < IDENTITY_TOLERANCE, "month {} breaks balance identity", p.month);
        assert_eq!(p.principal_paid, p.payment - p.interest);
        if let Some(prev) = previous_closing {
            assert_eq!(p.opening_balance, prev);
        }
        previous_closing = Some(p.closing_balance);
    }
}

// ===========================================================================
// Fixed-payment solver
// ===========================================================================

fn credit_card(payment: Decimal) -> payoff_time::PayoffTimeInput {
    payoff_time::PayoffTimeInput {
        principal: dec!(5000),
        annual_rate: dec!(18),
        monthly_payment: payment,
        start_date: None,
    }
}

#[test]
fn test_credit_card_at_one_hundred_a_month() {
    let out = payoff_time::solve_payoff_time(&credit_card(dec!(100))).unwrap();
    let r = &out.result;

    // First month: 5000 * 1.5% = 75 interest, 25 to principal
    let first = &r.schedule[0];
    assert_eq!(first.interest, dec!(75));
    assert_eq!(first.principal_paid, dec!(25));
    assert_eq!(first.closing_balance, dec!(4975));

    assert_eq!(r.total_months, 94);
    assert!((r.exact_months - dec!(93.11)).abs() < dec!(0.01));
    assert!((r.total_paid - r.total_interest - dec!(5000)).abs() < IDENTITY_TOLERANCE);
    // Roughly 4311 in interest over the life of the balance
    assert!((r.total_interest - dec!(4311)).abs() < dec!(5));
    assert_schedule_consistent(&r.schedule);
}

#[test]
fn test_credit_card_minimum_below_interest() {
    let err = payoff_time::solve_payoff_time(&credit_card(dec!(50))).unwrap_err();
    match err {
        PayoffError::PaymentTooLow { payment, interest } => {
            assert_eq!(payment, dec!(50));
            assert_eq!(interest, dec!(75));
        }
        other => panic!("expected PaymentTooLow, got {other:?}"),
    }
}

#[test]
fn test_larger_payment_pays_less_interest() {
    let slow = payoff_time::solve_payoff_time(&credit_card(dec!(100))).unwrap().result;
    let fast = payoff_time::solve_payoff_time(&credit_card(dec!(250))).unwrap().result;
    assert!(fast.total_months < slow.total_months);
    assert!(fast.total_interest < slow.total_interest);
}

#[test]
fn test_dated_schedule_runs_monthly() {
    let mut input = credit_card(dec!(1000));
    input.start_date = NaiveDate::from_ymd_opt(2025, 1, 31);
    let r = payoff_time::solve_payoff_time(&input).unwrap().result;
    assert_eq!(r.schedule[0].date, NaiveDate::from_ymd_opt(2025, 1, 31));
    // Month-end clamps to the last day of shorter months
    assert_eq!(r.schedule[1].date, NaiveDate::from_ymd_opt(2025, 2, 28));
    assert_eq!(r.payoff_date, r.schedule.last().and_then(|p| p.date));
}

#[test]
fn test_overflowing_interest_fails_cleanly() {
    let input = payoff_time::PayoffTimeInput {
        principal: dec!(1000000),
        annual_rate: Decimal::from_i128_with_scale(10i128.pow(27), 0),
        monthly_payment: dec!(100),
        start_date: None,
    };
    let err = payoff_time::solve_payoff_time(&input).unwrap_err();
    assert!(matches!(err, PayoffError::ComputationFailed(_)));
}

// ===========================================================================
// Target-date solver
// ===========================================================================

#[test]
fn test_target_date_payment_for_car_loan() {
    let input = required_payment::RequiredPaymentInput {
        principal: dec!(30000),
        annual_rate: dec!(6),
        target_months: 120,
        start_date: None,
    };
    let r = required_payment::solve_required_payment(&input).unwrap().result;
    assert!((r.required_payment - dec!(333.06)).abs() < dec!(0.01));
    assert_eq!(r.total_months, 120);
    assert_eq!(r.schedule.last().unwrap().closing_balance, Decimal::ZERO);
    assert_schedule_consistent(&r.schedule);
}

#[test]
fn test_target_date_zero_rate_is_straight_line() {
    let input = required_payment::RequiredPaymentInput {
        principal: dec!(1200),
        annual_rate: Decimal::ZERO,
        target_months: 12,
        start_date: None,
    };
    let r = required_payment::solve_required_payment(&input).unwrap().result;
    assert_eq!(r.required_payment, dec!(100));
    assert_eq!(r.total_interest, Decimal::ZERO);
}

#[test]
fn test_target_date_rejects_zero_months() {
    let input = required_payment::RequiredPaymentInput {
        principal: dec!(1200),
        annual_rate: dec!(5),
        target_months: 0,
        start_date: None,
    };
    assert!(matches!(
        required_payment::solve_required_payment(&input).unwrap_err(),
        PayoffError::InvalidInput { .. }
    ));
}

// ===========================================================================
// Term loans
// ===========================================================================

#[test]
fn test_mortgage_overpayment_savings_add_up() {
    let input = loan_schedule::LoanScheduleInput {
        principal: dec!(250000),
        annual_rate: dec!(5.5),
        term_months: 300,
        extra_payment: Some(dec!(300)),
        start_date: None,
    };
    let r = loan_schedule::build_loan_schedule(&input).unwrap().result;
    assert_eq!(r.baseline_months, 300);
    assert_eq!(r.months_saved, r.baseline_months - r.total_months);
    assert_eq!(r.interest_saved, r.baseline_interest - r.total_interest);
    assert!(r.interest_saved > dec!(10000));
    assert_schedule_consistent(&r.schedule);
}

// ===========================================================================
// Properties
// ===========================================================================

proptest! {
    #![proptest_config(proptest::test_runner::Config::with_cases(32))]

    #[test]
    fn prop_target_payment_round_trips_to_target_months(
        principal in 500u32..200_000,
        rate_bp in 0u32..3000,
        months in 1u32..361
    ) {
        let principal = Decimal::from(principal);
        let annual_rate = Decimal::new(i64::from(rate_bp), 2);

        let target = required_payment::solve_required_payment(&required_payment::RequiredPaymentInput {
            principal,
            annual_rate,
            target_months: months,
            start_date: None,
        })
        .unwrap()
        .result;
        prop_assert_eq!(target.total_months, months);

        let solved = payoff_time::solve_payoff_time(&payoff_time::PayoffTimeInput {
            principal,
            annual_rate,
            monthly_payment: target.required_payment,
            start_date: None,
        })
        .unwrap()
        .result;
        prop_assert_eq!(solved.total_months, months);
        prop_assert!((solved.exact_months - Decimal::from(months)).abs() < dec!(0.0001));
    }

    #[test]
    fn prop_schedule_never_goes_negative(
        principal in 100u32..50_000,
        rate_bp in 0u32..3600,
        headroom in 1u32..2000
    ) {
        let principal = Decimal::from(principal);
        let annual_rate = Decimal::new(i64::from(rate_bp), 2);
        let interest = principal * annual_rate / dec!(1200);
        // Keep the payment comfortably above interest so the cap is never hit
        let payment = interest * dec!(2) + principal / dec!(300) + Decimal::from(headroom);

        let r = payoff_time::solve_payoff_time(&payoff_time::PayoffTimeInput {
            principal,
            annual_rate,
            monthly_payment: payment,
            start_date: None,
        })
        .unwrap()
        .result;

        prop_assert!(r.total_months <= 600);
        prop_assert_eq!(r.schedule.last().unwrap().closing_balance, Decimal::ZERO);
        for p in &r.schedule {
            prop_assert!(p.closing_balance >= Decimal::ZERO);
            prop_assert!(p.payment <= payment);
        }
        prop_assert!((r.total_paid - r.total_interest - principal).abs() < IDENTITY_TOLERANCE);
    }
}
