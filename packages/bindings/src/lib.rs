use chrono::{Local, NaiveDate};
use napi::Result as NapiResult;
use napi_derive::napi;

use tariff_core::bill::BillingInput;
use tariff_core::tariff::TariffSchedule;

/// Convert any Display error into a napi::Error.
fn to_napi_error(e: impl std::fmt::Display) -> napi::Error {
    napi::Error::from_reason(e.to_string())
}

/// Parse an optional `YYYY-MM-DD` assessment date, defaulting to the local date.
fn parse_today(today: Option<String>) -> NapiResult<NaiveDate> {
    match today {
        Some(s) => s.parse::<NaiveDate>().map_err(to_napi_error),
        None => Ok(Local::now().date_naive()),
    }
}

// ---------------------------------------------------------------------------
// Bills
// ---------------------------------------------------------------------------

#[napi]
pub fn compute_bill(input_json: String, today: Option<String>) -> NapiResult<String> {
    let input: BillingInput = serde_json::from_str(&input_json).map_err(to_napi_error)?;
    let today = parse_today(today)?;
    let output = tariff_core::bill::compute_bill(&input, today).map_err(to_napi_error)?;
    serde_json::to_string(&output).map_err(to_napi_error)
}

#[napi]
pub fn compute_bill_with_tariff(
    input_json: String,
    tariff_json: String,
    today: Option<String>,
) -> NapiResult<String> {
    let input: BillingInput = serde_json::from_str(&input_json).map_err(to_napi_error)?;
    let schedule: TariffSchedule = serde_json::from_str(&tariff_json).map_err(to_napi_error)?;
    let today = parse_today(today)?;
    let output = tariff_core::bill::compute_bill_with_schedule(&input, &schedule, today)
        .map_err(to_napi_error)?;
    serde_json::to_string(&output).map_err(to_napi_error)
}

// ---------------------------------------------------------------------------
// Tariff and calendar
// ---------------------------------------------------------------------------

#[napi]
pub fn default_tariff() -> NapiResult<String> {
    serde_json::to_string(&TariffSchedule::default()).map_err(to_napi_error)
}

#[napi]
pub fn add_working_days(start: String, days: u32) -> NapiResult<String> {
    let start: NaiveDate = start.parse().map_err(to_napi_error)?;
    let date = tariff_core::calendar::add_working_days(start, days).map_err(to_napi_error)?;
    Ok(date.to_string())
}
