use chrono::NaiveDate;
use clap::Args;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use serde_json::Value;

use tariff_core::bill::{self, BillingInput};
use tariff_core::tariff::TariffCategory;

use crate::commands::bill::resolve_today;
use crate::commands::tariff::load_schedule;

const MAX_SWEEP_ROWS: usize = 10_000;

/// Arguments for a units sweep
#[derive(Args)]
pub struct SweepArgs {
    /// Units range in format min:max:step (e.g. "0:600:50")
    #[arg(long)]
    pub units: String,

    /// Number of days billed
    #[arg(long, alias = "days", default_value_t = 30)]
    pub bill_days: u32,

    /// Contracted load in kW
    #[arg(long, alias = "load")]
    pub load_kw: Decimal,

    /// Payment due date (defaults to the assessment date, i.e. no surcharge)
    #[arg(long)]
    pub due_date: Option<NaiveDate>,

    /// Date the surcharge is assessed on (defaults to today's local date)
    #[arg(long)]
    pub today: Option<NaiveDate>,

    /// Path to a JSON or YAML tariff schedule
    #[arg(long)]
    pub tariff: Option<String>,
}

#[derive(Debug, Clone)]
struct UnitsRange {
    min: Decimal,
    max: Decimal,
    step: Decimal,
}

#[derive(Debug, Serialize, Deserialize)]
struct SweepOutput {
    bill_days: u32,
    load_kw: Decimal,
    assessed_on: NaiveDate,
    due_date: NaiveDate,
    results: Vec<SweepRow>,
}

#[derive(Debug, Serialize, Deserialize)]
struct SweepRow {
    units_consumed: Decimal,
    category: TariffCategory,
    energy: Decimal,
    fixed: Decimal,
    fsa: Decimal,
    surcharge: Decimal,
    total: Decimal,
}

fn parse_units_range(text: &str) -> Result<UnitsRange, Box<dyn std::error::Error>> {
    let parts: Vec<&str> = text.split(':').collect();
    if parts.len() != 3 {
        return Err(format!("Units range must be min:max:step, got '{}'", text).into());
    }
    let range = UnitsRange {
        min: parts[0].trim().parse()?,
        max: parts[1].trim().parse()?,
        step: parts[2].trim().parse()?,
    };
    if range.step <= Decimal::ZERO {
        return Err(format!("Units range step must be positive, got {}", range.step).into());
    }
    if range.min > range.max {
        return Err(format!("Units range min {} exceeds max {}", range.min, range.max).into());
    }
    Ok(range)
}

fn generate_range(range: &UnitsRange) -> Result<Vec<Decimal>, Box<dyn std::error::Error>> {
    let mut values = Vec::new();
    let mut current = range.min;
    while current <= range.max {
        if values.len() == MAX_SWEEP_ROWS {
            return Err(format!("Units range yields more than {MAX_SWEEP_ROWS} rows").into());
        }
        values.push(current);
        current += range.step;
    }
    Ok(values)
}

pub fn run_sweep(args: SweepArgs) -> Result<Value, Box<dyn std::error::Error>> {
    let range = parse_units_range(&args.units)?;
    let schedule = load_schedule(args.tariff.as_deref())?;
    let today = resolve_today(args.today);
    let due_date = args.due_date.unwrap_or(today);

    let mut results = Vec::new();
    for units in generate_range(&range)? {
        let billing_input = BillingInput {
            units_consumed: units,
            bill_days: args.bill_days,
            load_kw: args.load_kw,
            due_date,
            bill_date: None,
        };
        let bill = bill::compute_bill_with_schedule(&billing_input, &schedule, today)?.result;
        results.push(SweepRow {
            units_consumed: units,
            category: bill.category,
            energy: bill.charges.energy,
            fixed: bill.charges.fixed,
            fsa: bill.charges.fsa,
            surcharge: bill.charges.surcharge,
            total: bill.charges.total,
        });
    }

    let output = SweepOutput {
        bill_days: args.bill_days,
        load_kw: args.load_kw,
        assessed_on: today,
        due_date,
        results,
    };

    Ok(serde_json::to_value(output)?)
}
