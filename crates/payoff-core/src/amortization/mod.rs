pub mod loan_schedule;
pub mod payoff_time;
pub mod required_payment;
pub mod schedule;
