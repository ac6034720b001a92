use chrono::{Datelike, NaiveDate};
use clap::Args;
use serde_json::{json, Value};

use tariff_core::calendar::add_working_days;

/// Arguments for working-day arithmetic
#[derive(Args)]
pub struct WorkingDaysArgs {
    /// Start date (YYYY-MM-DD)
    #[arg(long)]
    pub start: NaiveDate,

    /// Working days to add
    #[arg(long, default_value_t = 10)]
    pub days: u32,
}

pub fn run_working_days(args: WorkingDaysArgs) -> Result<Value, Box<dyn std::error::Error>> {
    let date = add_working_days(args.start, args.days)?;
    Ok(json!({
        "date": date,
        "weekday": date.weekday().to_string(),
        "start": args.start,
        "working_days": args.days,
        "calendar_days": (date - args.start).num_days(),
    }))
}
