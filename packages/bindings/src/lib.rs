use napi::Result as NapiResult;
use napi_derive::napi;
use serde::de::DeserializeOwned;
use serde::Serialize;

use payoff_core::{ComputationOutput, PayoffResult};

/// Convert any Display error into a napi::Error.
fn to_napi_error(e: impl std::fmt::Display) -> napi::Error {
    napi::Error::from_reason(e.to_string())
}

/// Deserialize `input_json`, run `compute` and serialize the envelope.
fn run_json<I, O>(
    input_json: &str,
    compute: impl FnOnce(&I) -> PayoffResult<ComputationOutput<O>>,
) -> NapiResult<String>
where
    I: DeserializeOwned,
    O: Serialize,
{
    let input: I = serde_json::from_str(input_json).map_err(to_napi_error)?;
    let output = compute(&input).map_err(to_napi_error)?;
    serde_json::to_string(&output).map_err(to_napi_error)
}

// ---------------------------------------------------------------------------
// Single balance
// ---------------------------------------------------------------------------

#[napi]
pub fn solve_payoff_time(input_json: String) -> NapiResult<String> {
    run_json(&input_json, payoff_core::amortization::payoff_time::solve_payoff_time)
}

#[napi]
pub fn solve_required_payment(input_json: String) -> NapiResult<String> {
    run_json(
        &input_json,
        payoff_core::amortization::required_payment::solve_required_payment,
    )
}

#[napi]
pub fn build_loan_schedule(input_json: String) -> NapiResult<String> {
    run_json(
        &input_json,
        payoff_core::amortization::loan_schedule::build_loan_schedule,
    )
}

// ---------------------------------------------------------------------------
// Multiple balances
// ---------------------------------------------------------------------------

#[napi]
pub fn simulate_payoff(input_json: String) -> NapiResult<String> {
    run_json(&input_json, payoff_core::debt_payoff::engine::simulate_payoff)
}

#[napi]
pub fn compare_strategies(input_json: String) -> NapiResult<String> {
    run_json(&input_json, payoff_core::debt_payoff::compare::compare_strategies)
}

// ---------------------------------------------------------------------------
// Runway
// ---------------------------------------------------------------------------

#[napi]
pub fn project_runway(input_json: String) -> NapiResult<String> {
    run_json(&input_json, payoff_core::runway::projection::project_runway)
}
