use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use super::category::{TariffCategory, DAYS_PER_MONTH};
use super::schedule::TariffSchedule;
use crate::types::*;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SlabLine {
    /// 1-based band number within the category.
    pub band: usize,
    /// Band capacity prorated to the billing period; `None` for the final band.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub capacity: Option<Units>,
    pub units: Units,
    pub rate: Rate,
    /// `units * rate`, rounded for display.
    pub amount: Money,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SlabAllocation {
    pub category: TariffCategory,
    pub lines: Vec<SlabLine>,
}

impl SlabAllocation {
    pub fn total_units(&self) -> Units {
        self.lines.iter().map(|l| l.units).sum()
    }

    /// Unrounded energy charge across all bands.
    pub fn energy_total(&self) -> Money {
        self.lines.iter().map(|l| l.units * l.rate).sum()
    }

    /// Whether the 1-based `band` or any band after it received units.
    pub fn is_occupied_from(&self, band: usize) -> bool {
        self.lines
            .iter()
            .filter(|l| l.band >= band)
            .any(|l| l.units > Decimal::ZERO)
    }
}

/// Decimal places kept on prorated band capacities. Keeps the running
/// remainder exact so allocated units always add back to the input.
const CAPACITY_DP: u32 = 6;

/// Band capacity for the billing period: the monthly size scaled by days / 30.
pub fn band_capacity(monthly_units: Units, bill_days: u32) -> Units {
    (monthly_units * Decimal::from(bill_days) / DAYS_PER_MONTH).round_dp(CAPACITY_DP)
}

/// Spread `units_consumed` over the category's bands, lowest band first.
///
/// Each band takes as much as its prorated capacity allows before the next is
/// considered. The last band takes whatever is left, so the allocated units
/// always sum to `units_consumed`.
pub fn allocate(
    category: TariffCategory,
    units_consumed: Units,
    bill_days: u32,
    schedule: &TariffSchedule,
) -> SlabAllocation {
    let bands = &schedule.category(category).bands;
    let last = bands.len().saturating_sub(1);
    let mut remaining = units_consumed;
    let mut lines = Vec::with_capacity(bands.len());

    for (i, band) in bands.iter().enumerate() {
        let capacity = match band.monthly_units {
            Some(size) if i < last => Some(band_capacity(size, bill_days)),
            _ => None,
        };

        let units = match capacity {
            Some(cap) => remaining.min(cap),
            None => remaining,
        };
        remaining -= units;

        lines.push(SlabLine {
            band: i + 1,
            capacity,
            units,
            rate: band.rate,
            amount: round_money(units * band.rate),
        });
    }

    tracing::debug!(
        %category,
        bands = lines.len(),
        %units_consumed,
        "allocated units to slabs"
    );

    SlabAllocation { category, lines }
}
