use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use serde::{Deserialize, Serialize};

use super::schedule::TariffSchedule;
use crate::types::*;

/// Days in the notional month that band sizes and fixed charges are quoted for.
pub const DAYS_PER_MONTH: Decimal = dec!(30);

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum TariffCategory {
    Category1,
    Category2,
    Category3,
}

impl TariffCategory {
    pub const ALL: [TariffCategory; 3] = [
        TariffCategory::Category1,
        TariffCategory::Category2,
        TariffCategory::Category3,
    ];
}

impl std::fmt::Display for TariffCategory {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Category1 => write!(f, "Category 1"),
            Self::Category2 => write!(f, "Category 2"),
            Self::Category3 => write!(f, "Category 3"),
        }
    }
}

/// Consumption scaled to a 30-day month.
///
/// Used for category thresholds and the FSA test only; slab allocation works
/// on the raw period length. Callers must have rejected `bill_days == 0`.
pub fn monthly_units(units_consumed: Units, bill_days: u32) -> Units {
    units_consumed * DAYS_PER_MONTH / Decimal::from(bill_days)
}

/// Pick the regulatory category for a connection.
///
/// A low-load connection whose normalised usage exceeds the Category 1 cap
/// falls through to the Category 2 load test and is billed at Category 2
/// rates.
pub fn classify(
    load_kw: Kilowatts,
    units_consumed: Units,
    bill_days: u32,
    schedule: &TariffSchedule,
) -> TariffCategory {
    let monthly = monthly_units(units_consumed, bill_days);

    let category = if load_kw <= schedule.category1_max_load_kw
        && monthly <= schedule.category1_max_monthly_units
    {
        TariffCategory::Category1
    } else if load_kw <= schedule.category2_max_load_kw {
        TariffCategory::Category2
    } else {
        TariffCategory::Category3
    };

    tracing::debug!(%load_kw, %monthly, %category, "classified connection");
    category
}

/// True when the load alone would qualify for Category 1 but usage pushed the
/// connection into Category 2.
pub fn is_usage_reclassified(
    category: TariffCategory,
    load_kw: Kilowatts,
    schedule: &TariffSchedule,
) -> bool {
    category == TariffCategory::Category2 && load_kw <= schedule.category1_max_load_kw
}

#[cfg(test)]
mod tests {
    use super::*;

    fn classify_default(load: Decimal, units: Decimal, days: u32) -> TariffCategory {
        classify(load, units, days, &TariffSchedule::default())
    }

    #[test]
    fn test_monthly_units_normalises_period() {
        assert_eq!(monthly_units(dec!(50), 15), dec!(100));
        assert_eq!(monthly_units(dec!(250), 30), dec!(250));
    }

    #[test]
    fn test_category1_boundary_inclusive() {
        assert_eq!(
            classify_default(dec!(2.0), dec!(100), 30),
            TariffCategory::Category1
        );
    }

    #[test]
    fn test_usage_above_cap_reclassifies_to_category2() {
        let category = classify_default(dec!(2.0), dec!(100.01), 30);
        assert_eq!(category, TariffCategory::Category2);
        assert!(is_usage_reclassified(
            category,
            dec!(2.0),
            &TariffSchedule::default()
        ));
    }

    #[test]
    fn test_short_period_uses_normalised_usage() {
        // 60 units over 15 days is 120 units/month
        assert_eq!(
            classify_default(dec!(1.5), dec!(60), 15),
            TariffCategory::Category2
        );
    }

    #[test]
    fn test_load_boundaries() {
        assert_eq!(
            classify_default(dec!(5), dec!(1000), 30),
            TariffCategory::Category2
        );
        assert_eq!(
            classify_default(dec!(5.01), dec!(10), 30),
            TariffCategory::Category3
        );
        assert!(!is_usage_reclassified(
            TariffCategory::Category2,
            dec!(4),
            &TariffSchedule::default()
        ));
    }
}
