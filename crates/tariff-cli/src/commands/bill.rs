use chrono::{Local, NaiveDate};
use clap::Args;
use rust_decimal::Decimal;
use serde_json::Value;

use tariff_core::bill::{self, BillingInput};

use crate::commands::tariff::load_schedule;
use crate::input;

/// Arguments for computing a bill
#[derive(Args)]
pub struct BillArgs {
    /// Path to JSON input file (overrides individual flags)
    #[arg(long)]
    pub input: Option<String>,

    /// Units consumed in the billing period
    #[arg(long, alias = "units")]
    pub units_consumed: Option<Decimal>,

    /// Number of days billed
    #[arg(long, alias = "days")]
    pub bill_days: Option<u32>,

    /// Contracted load in kW
    #[arg(long, alias = "load")]
    pub load_kw: Option<Decimal>,

    /// Payment due date (YYYY-MM-DD)
    #[arg(long)]
    pub due_date: Option<NaiveDate>,

    /// Bill date (YYYY-MM-DD), shown on the bill only
    #[arg(long)]
    pub bill_date: Option<NaiveDate>,

    /// Date the surcharge is assessed on (defaults to today's local date)
    #[arg(long)]
    pub today: Option<NaiveDate>,

    /// Path to a JSON or YAML tariff schedule
    #[arg(long)]
    pub tariff: Option<String>,
}

/// The local calendar date, used when the caller does not pin one.
pub fn resolve_today(today: Option<NaiveDate>) -> NaiveDate {
    today.unwrap_or_else(|| Local::now().date_naive())
}

pub fn run_bill(args: BillArgs) -> Result<Value, Box<dyn std::error::Error>> {
    let billing_input: BillingInput = if let Some(ref path) = args.input {
        input::file::read_json(path)?
    } else if let Some(data) = input::stdin::read_stdin()? {
        data
    } else {
        BillingInput {
            units_consumed: args.units_consumed
                .ok_or("--units-consumed is required (or provide --input)")?,
            bill_days: args.bill_days
                .ok_or("--bill-days is required (or provide --input)")?,
            load_kw: args.load_kw
                .ok_or("--load-kw is required (or provide --input)")?,
            due_date: args.due_date
                .ok_or("--due-date is required (or provide --input)")?,
            bill_date: args.bill_date,
        }
    };

    let schedule = load_schedule(args.tariff.as_deref())?;
    let today = resolve_today(args.today);
    tracing::debug!(%today, "assessing bill");

    let result = bill::compute_bill_with_schedule(&billing_input, &schedule, today)?;
    Ok(serde_json::to_value(result)?)
}
