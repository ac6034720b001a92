use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::tariff::category::DAYS_PER_MONTH;
use crate::tariff::{FixedChargePolicy, SlabAllocation, TariffCategory, TariffSchedule};
use crate::types::*;

/// Everything on the bill except the surcharge, each figure already rounded
/// to two places.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChargeSubtotals {
    pub energy: Money,
    pub fixed: Money,
    pub fsa: Money,
    pub electricity_duty: Money,
    pub municipal_tax: Money,
    /// The category carries a fixed charge but the schedule's policy withheld it.
    pub fixed_charge_waived: bool,
}

impl ChargeSubtotals {
    /// Energy + fixed + FSA: the base for municipal tax and surcharge.
    pub fn surchargeable_base(&self) -> Money {
        self.energy + self.fixed + self.fsa
    }
}

/// Whether the schedule's gating rule lets the fixed charge through.
pub fn fixed_charge_applies(
    policy: &FixedChargePolicy,
    allocation: &SlabAllocation,
    units_consumed: Units,
) -> bool {
    match policy {
        FixedChargePolicy::Always => true,
        FixedChargePolicy::AboveUnits { units } => units_consumed > *units,
        FixedChargePolicy::WhenBandOccupied { band } => allocation.is_occupied_from(*band),
    }
}

/// Per-kW monthly charge prorated to the period. Zero for categories without
/// one.
pub fn prorated_fixed_charge(
    category: TariffCategory,
    load_kw: Kilowatts,
    bill_days: u32,
    schedule: &TariffSchedule,
) -> Money {
    match schedule.category(category).fixed_charge_per_kw {
        Some(rate_per_kw) => {
            round_money(load_kw * rate_per_kw * Decimal::from(bill_days) / DAYS_PER_MONTH)
        }
        None => Decimal::ZERO,
    }
}

/// Combine slab energy with fixed charge, FSA, duty and municipal tax.
///
/// Municipal tax is taken on the rounded energy, fixed and FSA figures so the
/// printed components add up to the printed total.
pub fn aggregate(
    category: TariffCategory,
    allocation: &SlabAllocation,
    load_kw: Kilowatts,
    bill_days: u32,
    units_consumed: Units,
    monthly_units: Units,
    schedule: &TariffSchedule,
) -> ChargeSubtotals {
    let energy = round_money(allocation.energy_total());

    let prorated = prorated_fixed_charge(category, load_kw, bill_days, schedule);
    let applies = fixed_charge_applies(&schedule.fixed_charge_policy, allocation, units_consumed);
    let fixed = if applies { prorated } else { Decimal::ZERO };

    let fsa = if monthly_units > schedule.fsa_monthly_threshold {
        round_money(units_consumed * schedule.fsa_rate)
    } else {
        Decimal::ZERO
    };

    let electricity_duty = round_money(units_consumed * schedule.electricity_duty_rate);
    let municipal_tax = round_money((energy + fixed + fsa) * schedule.municipal_tax_rate);

    ChargeSubtotals {
        energy,
        fixed,
        fsa,
        electricity_duty,
        municipal_tax,
        fixed_charge_waived: !applies && !prorated.is_zero(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tariff::{allocate, monthly_units};
    use rust_decimal_macros::dec;

    fn subtotals(
        category: TariffCategory,
        units: Decimal,
        days: u32,
        load: Decimal,
        schedule: &TariffSchedule,
    ) -> ChargeSubtotals {
        let allocation = allocate(category, units, days, schedule);
        let monthly = monthly_units(units, days);
        aggregate(category, &allocation, load, days, units, monthly, schedule)
    }

    #[test]
    fn test_category2_reference_bill() {
        let s = subtotals(
            TariffCategory::Category2,
            dec!(250),
            30,
            dec!(4),
            &TariffSchedule::default(),
        );
        assert_eq!(s.energy, dec!(967.50));
        assert_eq!(s.fixed, dec!(200.00));
        assert_eq!(s.fsa, dec!(117.50));
        assert_eq!(s.electricity_duty, dec!(25.00));
        // (967.50 + 200.00 + 117.50) * 0.02 = 25.70
        assert_eq!(s.municipal_tax, dec!(25.70));
        assert_eq!(s.surchargeable_base(), dec!(1285.00));
        assert!(!s.fixed_charge_waived);
    }

    #[test]
    fn test_category1_has_no_fixed_charge() {
        let s = subtotals(
            TariffCategory::Category1,
            dec!(80),
            30,
            dec!(1.5),
            &TariffSchedule::default(),
        );
        assert_eq!(s.fixed, Decimal::ZERO);
        assert!(!s.fixed_charge_waived);
        // 50 * 2.20 + 30 * 2.70 = 110 + 81
        assert_eq!(s.energy, dec!(191.00));
    }

    #[test]
    fn test_category3_fixed_charge_prorated() {
        // 8 kW * 75 / 30 * 20 days = 400
        let s = subtotals(
            TariffCategory::Category3,
            dec!(300),
            20,
            dec!(8),
            &TariffSchedule::default(),
        );
        assert_eq!(s.fixed, dec!(400.00));
    }

    #[test]
    fn test_fsa_threshold_is_strict() {
        let schedule = TariffSchedule::default();
        let at = subtotals(TariffCategory::Category2, dec!(200), 30, dec!(3), &schedule);
        assert_eq!(at.fsa, Decimal::ZERO);

        let above = subtotals(TariffCategory::Category2, dec!(200.01), 30, dec!(3), &schedule);
        assert!(above.fsa > Decimal::ZERO);
        // 200.01 * 0.47 = 94.0047
        assert_eq!(above.fsa, dec!(94.00));
    }

    #[test]
    fn test_electricity_duty_rounds() {
        let s = subtotals(
            TariffCategory::Category2,
            dec!(123.45),
            30,
            dec!(3),
            &TariffSchedule::default(),
        );
        // 12.345 rounds half away from zero
        assert_eq!(s.electricity_duty, dec!(12.35));
    }

    #[test]
    fn test_above_units_policy_waives_fixed_charge() {
        let schedule = TariffSchedule {
            fixed_charge_policy: FixedChargePolicy::AboveUnits { units: dec!(300) },
            ..TariffSchedule::default()
        };
        let below = subtotals(TariffCategory::Category2, dec!(250), 30, dec!(4), &schedule);
        assert_eq!(below.fixed, Decimal::ZERO);
        assert!(below.fixed_charge_waived);
        // M-Tax base shrinks with the waived charge: (967.50 + 117.50) * 0.02
        assert_eq!(below.municipal_tax, dec!(21.70));

        let above = subtotals(TariffCategory::Category2, dec!(301), 30, dec!(4), &schedule);
        assert_eq!(above.fixed, dec!(200.00));
    }

    #[test]
    fn test_band_occupied_policy() {
        let schedule = TariffSchedule {
            fixed_charge_policy: FixedChargePolicy::WhenBandOccupied { band: 3 },
            ..TariffSchedule::default()
        };
        let two_bands = subtotals(TariffCategory::Category2, dec!(300), 30, dec!(4), &schedule);
        assert_eq!(two_bands.fixed, Decimal::ZERO);

        let third_band = subtotals(TariffCategory::Category2, dec!(310), 30, dec!(4), &schedule);
        assert_eq!(third_band.fixed, dec!(200.00));
    }
}
