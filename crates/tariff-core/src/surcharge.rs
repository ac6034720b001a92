use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::calendar::add_working_days;
use crate::tariff::TariffSchedule;
use crate::types::*;
use crate::TariffResult;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum SurchargeState {
    NoSurcharge,
    GracePeriod,
    LatePayment,
}

impl SurchargeState {
    pub fn rate(&self, schedule: &TariffSchedule) -> Rate {
        match self {
            Self::NoSurcharge => Decimal::ZERO,
            Self::GracePeriod => schedule.grace_surcharge_rate,
            Self::LatePayment => schedule.late_surcharge_rate,
        }
    }

    pub fn note(&self) -> &'static str {
        match self {
            Self::NoSurcharge => "No surcharge (paid before due date)",
            Self::GracePeriod => "Grace period active",
            Self::LatePayment => "Late payment surcharge applied",
        }
    }
}

impl std::fmt::Display for SurchargeState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::NoSurcharge => write!(f, "No Surcharge"),
            Self::GracePeriod => write!(f, "Grace Period"),
            Self::LatePayment => write!(f, "Late Payment"),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SurchargeAssessment {
    pub state: SurchargeState,
    pub rate: Rate,
    pub assessed_on: NaiveDate,
    pub due_date: NaiveDate,
    pub grace_end_date: NaiveDate,
    /// Energy + fixed + FSA the rate was applied to.
    pub base: Money,
    pub amount: Money,
    pub note: String,
}

/// Last day of the grace window: the due date plus the schedule's working days.
pub fn grace_end_date(due_date: NaiveDate, schedule: &TariffSchedule) -> TariffResult<NaiveDate> {
    add_working_days(due_date, schedule.grace_working_days)
}

/// Place `today` relative to the due date and grace window. Both bounds are
/// inclusive: paying on the due date is on time, paying on the grace end date
/// still gets the grace rate.
pub fn assess_state(today: NaiveDate, due_date: NaiveDate, grace_end: NaiveDate) -> SurchargeState {
    if today <= due_date {
        SurchargeState::NoSurcharge
    } else if today <= grace_end {
        SurchargeState::GracePeriod
    } else {
        SurchargeState::LatePayment
    }
}

/// Work out the late-payment surcharge on `base` as of `today`.
///
/// `today` is supplied by the caller; the same bill assessed on different days
/// legitimately yields different surcharges.
pub fn calculate_surcharge(
    base: Money,
    due_date: NaiveDate,
    today: NaiveDate,
    schedule: &TariffSchedule,
) -> TariffResult<SurchargeAssessment> {
    let grace_end = grace_end_date(due_date, schedule)?;
    let state = assess_state(today, due_date, grace_end);
    let rate = state.rate(schedule);
    let amount = round_money(base * rate);

    tracing::debug!(%today, %due_date, %grace_end, %state, %rate, "assessed surcharge");

    Ok(SurchargeAssessment {
        state,
        rate,
        assessed_on: today,
        due_date,
        grace_end_date: grace_end,
        base,
        amount,
        note: state.note().to_string(),
    })
}
