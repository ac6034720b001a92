use chrono::NaiveDate;
use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use serde::{Deserialize, Serialize};
use std::time::Instant;

use crate::charges::{aggregate, ChargeSubtotals};
use crate::surcharge::{calculate_surcharge, SurchargeAssessment, SurchargeState};
use crate::tariff::category::is_usage_reclassified;
use crate::tariff::{allocate, classify, monthly_units, SlabLine, TariffCategory, TariffSchedule};
use crate::{types::*, TariffError, TariffResult};

/// Largest accepted `units_consumed`. Keeps every product the engine forms
/// inside `Decimal`'s range for any schedule that passes validation.
pub const MAX_UNITS_CONSUMED: Units = dec!(1000000000000);

/// Largest accepted contracted load in kW.
pub const MAX_LOAD_KW: Kilowatts = dec!(1000000);

// ---------------------------------------------------------------------------
// Input / Output types
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BillingInput {
    pub units_consumed: Units,
    pub bill_days: u32,
    pub load_kw: Kilowatts,
    pub due_date: NaiveDate,
    /// Carried through for display; not used in any calculation.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub bill_date: Option<NaiveDate>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChargeBreakdown {
    pub energy: Money,
    pub fixed: Money,
    pub fsa: Money,
    pub electricity_duty: Money,
    pub municipal_tax: Money,
    pub surcharge: Money,
    pub surcharge_rate: Rate,
    pub total: Money,
}

/// One printable row of the bill.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LineItem {
    pub component: String,
    pub base: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub rate: Option<Rate>,
    pub amount: Money,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ElectricityBill {
    pub category: TariffCategory,
    pub category_label: String,
    pub units_consumed: Units,
    pub monthly_units: Units,
    pub bill_days: u32,
    pub load_kw: Kilowatts,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub bill_date: Option<NaiveDate>,
    pub due_date: NaiveDate,
    pub slabs: Vec<SlabLine>,
    pub charges: ChargeBreakdown,
    pub surcharge: SurchargeAssessment,
    pub line_items: Vec<LineItem>,
    pub currency_symbol: String,
}

// ---------------------------------------------------------------------------
// Public API
// ---------------------------------------------------------------------------

/// Compute an itemized bill against the current rate table.
///
/// `today` decides the surcharge tier; pass the payment or assessment date.
pub fn compute_bill(
    input: &BillingInput,
    today: NaiveDate,
) -> TariffResult<ComputationOutput<ElectricityBill>> {
    compute_bill_with_schedule(input, &TariffSchedule::default(), today)
}

/// Compute an itemized bill against a caller-supplied schedule.
pub fn compute_bill_with_schedule(
    input: &BillingInput,
    schedule: &TariffSchedule,
    today: NaiveDate,
) -> TariffResult<ComputationOutput<ElectricityBill>> {
    let start = Instant::now();
    let mut warnings: Vec<String> = Vec::new();

    // -- Validation ----------------------------------------------------------
    validate_input(input)?;
    schedule.validate()?;

    // -- Classification and slabs --------------------------------------------
    let monthly = monthly_units(input.units_consumed, input.bill_days);
    let category = classify(input.load_kw, input.units_consumed, input.bill_days, schedule);
    if is_usage_reclassified(category, input.load_kw, schedule) {
        warnings.push(format!(
            "Load of {} kW qualifies for {} but normalised usage of {} units/month exceeds {}; \
             billed as {}.",
            input.load_kw,
            TariffCategory::Category1,
            monthly.round_dp(2),
            schedule.category1_max_monthly_units,
            category
        ));
    }

    let allocation = allocate(category, input.units_consumed, input.bill_days, schedule);

    // -- Charges -------------------------------------------------------------
    let subtotals = aggregate(
        category,
        &allocation,
        input.load_kw,
        input.bill_days,
        input.units_consumed,
        monthly,
        schedule,
    );
    if subtotals.fixed_charge_waived {
        warnings.push(format!(
            "Fixed charge withheld by the {:?} policy.",
            schedule.fixed_charge_policy
        ));
    }

    let surcharge = calculate_surcharge(
        subtotals.surchargeable_base(),
        input.due_date,
        today,
        schedule,
    )?;
    if surcharge.state != SurchargeState::NoSurcharge {
        warnings.push(format!(
            "Assessed on {} after due date {}: {} surcharge at {}%.",
            today,
            input.due_date,
            surcharge.state,
            percent(surcharge.rate)
        ));
    }
    if let Some(bill_date) = input.bill_date {
        if bill_date > input.due_date {
            warnings.push(format!(
                "bill_date {bill_date} is after due_date {}.",
                input.due_date
            ));
        }
    }

    let charges = breakdown(&subtotals, &surcharge);
    let line_items = build_line_items(
        input,
        category,
        &allocation.lines,
        &subtotals,
        &surcharge,
        schedule,
    );

    let output = ElectricityBill {
        category,
        category_label: schedule.category(category).label.clone(),
        units_consumed: input.units_consumed,
        monthly_units: monthly.round_dp(2),
        bill_days: input.bill_days,
        load_kw: input.load_kw,
        bill_date: input.bill_date,
        due_date: input.due_date,
        slabs: allocation.lines,
        charges,
        surcharge,
        line_items,
        currency_symbol: schedule.currency_symbol.clone(),
    };

    let elapsed = start.elapsed().as_micros() as u64;
    let assumptions = serde_json::json!({
        "monthly_normalisation": "units * 30 / bill_days (classification and FSA only)",
        "band_proration": "monthly band size * bill_days / 30",
        "fixed_charge_policy": schedule.fixed_charge_policy,
        "fsa": format!("{} per unit above {} units/month", schedule.fsa_rate, schedule.fsa_monthly_threshold),
        "electricity_duty_rate": schedule.electricity_duty_rate,
        "municipal_tax_rate": schedule.municipal_tax_rate,
        "grace_working_days": schedule.grace_working_days,
        "rounding": "2 dp, half away from zero, applied per component",
    });

    Ok(with_metadata(
        "Domestic slab tariff with prorated fixed charge, FSA, ED, M-Tax and late-payment surcharge",
        &assumptions,
        warnings,
        elapsed,
        output,
    ))
}

// ---------------------------------------------------------------------------
// Internal helpers
// ---------------------------------------------------------------------------

fn validate_input(input: &BillingInput) -> TariffResult<()> {
    if input.bill_days == 0 {
        return Err(TariffError::InvalidInput {
            field: "bill_days".into(),
            reason: "Billing days must be at least 1.".into(),
        });
    }
    if input.units_consumed < Decimal::ZERO {
        return Err(TariffError::InvalidInput {
            field: "units_consumed".into(),
            reason: "Units consumed cannot be negative.".into(),
        });
    }
    if input.units_consumed > MAX_UNITS_CONSUMED {
        return Err(TariffError::InvalidInput {
            field: "units_consumed".into(),
            reason: format!("Units consumed cannot exceed {MAX_UNITS_CONSUMED}."),
        });
    }
    if input.load_kw <= Decimal::ZERO {
        return Err(TariffError::InvalidInput {
            field: "load_kw".into(),
            reason: "Contracted load must be positive.".into(),
        });
    }
    if input.load_kw > MAX_LOAD_KW {
        return Err(TariffError::InvalidInput {
            field: "load_kw".into(),
            reason: format!("Contracted load cannot exceed {MAX_LOAD_KW} kW."),
        });
    }
    Ok(())
}

fn breakdown(subtotals: &ChargeSubtotals, surcharge: &SurchargeAssessment) -> ChargeBreakdown {
    let total = subtotals.energy
        + subtotals.fixed
        + subtotals.municipal_tax
        + subtotals.fsa
        + surcharge.amount
        + subtotals.electricity_duty;

    ChargeBreakdown {
        energy: subtotals.energy,
        fixed: subtotals.fixed,
        fsa: subtotals.fsa,
        electricity_duty: subtotals.electricity_duty,
        municipal_tax: subtotals.municipal_tax,
        surcharge: surcharge.amount,
        surcharge_rate: surcharge.rate,
        total,
    }
}

fn build_line_items(
    input: &BillingInput,
    category: TariffCategory,
    slabs: &[SlabLine],
    subtotals: &ChargeSubtotals,
    surcharge: &SurchargeAssessment,
    schedule: &TariffSchedule,
) -> Vec<LineItem> {
    let symbol = &schedule.currency_symbol;
    let mut items: Vec<LineItem> = slabs
        .iter()
        .map(|slab| LineItem {
            component: format!("Energy (Slab {})", slab.band),
            base: format!("{:.2} × {symbol}{:.2}", slab.units, slab.rate),
            rate: Some(slab.rate),
            amount: slab.amount,
        })
        .collect();

    // Slab rows are rounded one by one while energy is rounded once; a cent of
    // drift between them gets its own row so the rows add up to the total.
    let slab_sum: Money = slabs.iter().map(|slab| slab.amount).sum();
    let drift = subtotals.energy - slab_sum;
    if !drift.is_zero() {
        items.push(LineItem {
            component: "Energy (Rounding)".into(),
            base: format!("{symbol}{:.2} - {symbol}{:.2}", subtotals.energy, slab_sum),
            rate: None,
            amount: drift,
        });
    }

    let fixed_base = match schedule.category(category).fixed_charge_per_kw {
        Some(per_kw) => format!(
            "{} KW × {symbol}{}/KW (pro-rata, {} days)",
            input.load_kw, per_kw, input.bill_days
        ),
        None => "Not applicable".to_string(),
    };

    items.push(LineItem {
        component: "Fixed Charges".into(),
        base: fixed_base,
        rate: None,
        amount: subtotals.fixed,
    });
    items.push(LineItem {
        component: "FSA".into(),
        base: format!(
            "{:.2} × {symbol}{} (if > {} units/month)",
            input.units_consumed, schedule.fsa_rate, schedule.fsa_monthly_threshold
        ),
        rate: Some(schedule.fsa_rate),
        amount: subtotals.fsa,
    });
    items.push(LineItem {
        component: "Electricity Duty (ED)".into(),
        base: format!(
            "{:.2} × {symbol}{}",
            input.units_consumed, schedule.electricity_duty_rate
        ),
        rate: Some(schedule.electricity_duty_rate),
        amount: subtotals.electricity_duty,
    });
    items.push(LineItem {
        component: "Municipal Tax (M-Tax)".into(),
        base: format!(
            "(Energy + Fixed + FSA) × {}%",
            percent(schedule.municipal_tax_rate)
        ),
        rate: Some(schedule.municipal_tax_rate),
        amount: subtotals.municipal_tax,
    });
    items.push(LineItem {
        component: "Surcharge".into(),
        base: format!(
            "({:.2} + {:.2} + {:.2}) × {}%",
            subtotals.energy,
            subtotals.fixed,
            subtotals.fsa,
            percent(surcharge.rate)
        ),
        rate: Some(surcharge.rate),
        amount: surcharge.amount,
    });

    items
}

fn percent(rate: Rate) -> Decimal {
    (rate * dec!(100)).normalize()
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
