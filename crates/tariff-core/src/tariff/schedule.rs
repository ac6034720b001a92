use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use serde::{Deserialize, Serialize};

use super::category::TariffCategory;
use crate::{types::*, TariffError, TariffResult};

/// Ceiling on any per-unit, per-kW or percentage rate in a schedule.
pub const MAX_RATE: Rate = dec!(1000000);

/// Ceiling on a band's monthly size.
pub const MAX_BAND_UNITS: Units = dec!(1000000000000);

// ---------------------------------------------------------------------------
// Schedule types
// ---------------------------------------------------------------------------

/// One progressive band. `monthly_units` is the band size for a 30-day month;
/// `None` marks the uncapped final band.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Band {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub monthly_units: Option<Units>,
    pub rate: Rate,
}

impl Band {
    pub fn capped(monthly_units: Units, rate: Rate) -> Self {
        Self {
            monthly_units: Some(monthly_units),
            rate,
        }
    }

    pub fn uncapped(rate: Rate) -> Self {
        Self {
            monthly_units: None,
            rate,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CategoryTariff {
    pub label: String,
    pub bands: Vec<Band>,
    /// Monthly fixed charge per contracted kW. `None` means no fixed charge.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub fixed_charge_per_kw: Option<Money>,
}

/// When a category's per-kW fixed charge is actually levied.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(tag = "rule", rename_all = "snake_case")]
pub enum FixedChargePolicy {
    /// Charge on every bill.
    #[default]
    Always,
    /// Charge only when units consumed in the period exceed `units`.
    AboveUnits { units: Units },
    /// Charge only when the 1-based `band` (or any later band) received units.
    WhenBandOccupied { band: usize },
}

/// The full regulatory rate table plus the knobs that vary between filings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TariffSchedule {
    pub category1: CategoryTariff,
    pub category2: CategoryTariff,
    pub category3: CategoryTariff,
    pub category1_max_load_kw: Kilowatts,
    pub category1_max_monthly_units: Units,
    pub category2_max_load_kw: Kilowatts,
    /// Per-unit fuel surcharge adjustment.
    pub fsa_rate: Rate,
    /// FSA applies only when normalised monthly units exceed this.
    pub fsa_monthly_threshold: Units,
    /// Electricity duty per unit consumed.
    pub electricity_duty_rate: Rate,
    /// Municipal tax on energy + fixed + FSA.
    pub municipal_tax_rate: Rate,
    pub grace_surcharge_rate: Rate,
    pub late_surcharge_rate: Rate,
    /// Working days after the due date that attract the grace rate.
    /// Zero removes the grace tier entirely.
    pub grace_working_days: u32,
    pub fixed_charge_policy: FixedChargePolicy,
    pub currency_symbol: String,
}

impl Default for TariffSchedule {
    fn default() -> Self {
        Self {
            category1: CategoryTariff {
                label: "Category 1 (Upto 2 KW & 100 Units)".to_string(),
                bands: vec![
                    Band::capped(dec!(50), dec!(2.20)),
                    Band::capped(dec!(50), dec!(2.70)),
                    Band::uncapped(dec!(0.00)),
                ],
                fixed_charge_per_kw: None,
            },
            category2: CategoryTariff {
                label: "Category 2 (Upto 5 KW)".to_string(),
                bands: vec![
                    Band::capped(dec!(150), dec!(2.95)),
                    Band::capped(dec!(150), dec!(5.25)),
                    Band::capped(dec!(200), dec!(6.45)),
                    Band::uncapped(dec!(7.10)),
                ],
                fixed_charge_per_kw: Some(dec!(50)),
            },
            category3: CategoryTariff {
                label: "Category 3 (Above 5 KW)".to_string(),
                bands: vec![
                    Band::capped(dec!(500), dec!(6.50)),
                    Band::capped(dec!(500), dec!(7.15)),
                    Band::uncapped(dec!(7.50)),
                ],
                fixed_charge_per_kw: Some(dec!(75)),
            },
            category1_max_load_kw: dec!(2),
            category1_max_monthly_units: dec!(100),
            category2_max_load_kw: dec!(5),
            fsa_rate: dec!(0.47),
            fsa_monthly_threshold: dec!(200),
            electricity_duty_rate: dec!(0.10),
            municipal_tax_rate: dec!(0.02),
            grace_surcharge_rate: dec!(0.015),
            late_surcharge_rate: dec!(0.03),
            grace_working_days: 10,
            fixed_charge_policy: FixedChargePolicy::Always,
            currency_symbol: "₹".to_string(),
        }
    }
}

impl TariffSchedule {
    pub fn category(&self, category: TariffCategory) -> &CategoryTariff {
        match category {
            TariffCategory::Category1 => &self.category1,
            TariffCategory::Category2 => &self.category2,
            TariffCategory::Category3 => &self.category3,
        }
    }

    /// Reject schedules the allocator and aggregator cannot bill against.
    pub fn validate(&self) -> TariffResult<()> {
        for category in TariffCategory::ALL {
            validate_category(category, self.category(category))?;
        }

        if self.category1_max_load_kw > self.category2_max_load_kw {
            return Err(TariffError::InvalidSchedule(
                "category1_max_load_kw must not exceed category2_max_load_kw".into(),
            ));
        }

        let rates = [
            ("fsa_rate", self.fsa_rate),
            ("electricity_duty_rate", self.electricity_duty_rate),
            ("municipal_tax_rate", self.municipal_tax_rate),
            ("grace_surcharge_rate", self.grace_surcharge_rate),
            ("late_surcharge_rate", self.late_surcharge_rate),
        ];
        for (name, rate) in rates {
            if rate < Decimal::ZERO || rate > MAX_RATE {
                return Err(TariffError::InvalidSchedule(format!(
                    "{name} must be between 0 and {MAX_RATE}, got {rate}"
                )));
            }
        }

        let thresholds = [
            ("category1_max_load_kw", self.category1_max_load_kw),
            ("category1_max_monthly_units", self.category1_max_monthly_units),
            ("fsa_monthly_threshold", self.fsa_monthly_threshold),
        ];
        for (name, value) in thresholds {
            if value < Decimal::ZERO {
                return Err(TariffError::InvalidSchedule(format!(
                    "{name} must be non-negative, got {value}"
                )));
            }
        }

        let most_bands = TariffCategory::ALL
            .iter()
            .map(|c| self.category(*c).bands.len())
            .max()
            .unwrap_or(0);

        match &self.fixed_charge_policy {
            FixedChargePolicy::WhenBandOccupied { band } if *band == 0 => {
                Err(TariffError::InvalidSchedule(
                    "fixed_charge_policy band numbers start at 1".into(),
                ))
            }
            FixedChargePolicy::WhenBandOccupied { band } if *band > most_bands => {
                Err(TariffError::InvalidSchedule(format!(
                    "fixed_charge_policy band {band} exceeds the largest band count ({most_bands})"
                )))
            }
            FixedChargePolicy::AboveUnits { units } if *units < Decimal::ZERO => Err(
                TariffError::InvalidSchedule("fixed_charge_policy units must be non-negative".into()),
            ),
            _ => Ok(()),
        }
    }
}

fn validate_category(category: TariffCategory, tariff: &CategoryTariff) -> TariffResult<()> {
    let Some((last, leading)) = tariff.bands.split_last() else {
        return Err(TariffError::InvalidSchedule(format!(
            "{category} has no bands"
        )));
    };

    if last.monthly_units.is_some() {
        return Err(TariffError::InvalidSchedule(format!(
            "{category}: the final band must be uncapped"
        )));
    }

    for (i, band) in leading.iter().enumerate() {
        match band.monthly_units {
            Some(size) if size > MAX_BAND_UNITS => {
                return Err(TariffError::InvalidSchedule(format!(
                    "{category}: band {} size must not exceed {MAX_BAND_UNITS}, got {size}",
                    i + 1
                )))
            }
            Some(size) if size > Decimal::ZERO => {}
            Some(size) => {
                return Err(TariffError::InvalidSchedule(format!(
                    "{category}: band {} size must be positive, got {size}",
                    i + 1
                )))
            }
            None => {
                return Err(TariffError::InvalidSchedule(format!(
                    "{category}: only the final band may be uncapped (band {})",
                    i + 1
                )))
            }
        }
    }

    if let Some(band) = tariff.bands.iter().find(|b| b.rate < Decimal::ZERO) {
        return Err(TariffError::InvalidSchedule(format!(
            "{category}: negative band rate {}",
            band.rate
        )));
    }
    if let Some(band) = tariff.bands.iter().find(|b| b.rate > MAX_RATE) {
        return Err(TariffError::InvalidSchedule(format!(
            "{category}: band rate {} exceeds {MAX_RATE}",
            band.rate
        )));
    }

    match tariff.fixed_charge_per_kw {
        Some(rate) if rate < Decimal::ZERO => Err(TariffError::InvalidSchedule(format!(
            "{category}: fixed_charge_per_kw must be non-negative"
        ))),
        Some(rate) if rate > MAX_RATE => Err(TariffError::InvalidSchedule(format!(
            "{category}: fixed_charge_per_kw must not exceed {MAX_RATE}, got {rate}"
        ))),
        _ => Ok(()),
    }?;

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_schedule_is_valid() {
        assert!(TariffSchedule::default().validate().is_ok());
    }

    #[test]
    fn test_default_band_counts() {
        let schedule = TariffSchedule::default();
        assert_eq!(schedule.category1.bands.len(), 3);
        assert_eq!(schedule.category2.bands.len(), 4);
        assert_eq!(schedule.category3.bands.len(), 3);
    }

    #[test]
    fn test_capped_final_band_rejected() {
        let mut schedule = TariffSchedule::default();
        schedule.category3.bands = vec![Band::capped(dec!(500), dec!(6.50))];
        let err = schedule.validate().unwrap_err();
        assert!(matches!(err, TariffError::InvalidSchedule(_)));
    }

    #[test]
    fn test_empty_bands_rejected() {
        let mut schedule = TariffSchedule::default();
        schedule.category2.bands.clear();
        assert!(schedule.validate().is_err());
    }

    #[test]
    fn test_uncapped_middle_band_rejected() {
        let mut schedule = TariffSchedule::default();
        schedule.category1.bands[1].monthly_units = None;
        assert!(schedule.validate().is_err());
    }

    #[test]
    fn test_negative_rate_rejected() {
        let mut schedule = TariffSchedule::default();
        schedule.municipal_tax_rate = dec!(-0.02);
        assert!(schedule.validate().is_err());
    }

    #[test]
    fn test_band_zero_policy_rejected() {
        let schedule = TariffSchedule {
            fixed_charge_policy: FixedChargePolicy::WhenBandOccupied { band: 0 },
            ..TariffSchedule::default()
        };
        assert!(schedule.validate().is_err());
    }

    #[test]
    fn test_band_policy_beyond_every_category_rejected() {
        let fourth = TariffSchedule {
            fixed_charge_policy: FixedChargePolicy::WhenBandOccupied { band: 4 },
            ..TariffSchedule::default()
        };
        assert!(fourth.validate().is_ok());

        let fifth = TariffSchedule {
            fixed_charge_policy: FixedChargePolicy::WhenBandOccupied { band: 5 },
            ..TariffSchedule::default()
        };
        match fifth.validate() {
            Err(TariffError::InvalidSchedule(msg)) => assert!(msg.contains("band 5")),
            other => panic!("expected InvalidSchedule, got {other:?}"),
        }
    }

    #[test]
    fn test_oversized_rates_rejected() {
        let mut schedule = TariffSchedule::default();
        schedule.late_surcharge_rate = Decimal::MAX;
        assert!(schedule.validate().is_err());

        let mut schedule = TariffSchedule::default();
        schedule.category2.bands[3].rate = Decimal::MAX;
        assert!(schedule.validate().is_err());

        let mut schedule = TariffSchedule::default();
        schedule.category3.fixed_charge_per_kw = Some(Decimal::MAX);
        assert!(schedule.validate().is_err());

        let mut schedule = TariffSchedule::default();
        schedule.category1.bands[0].monthly_units = Some(Decimal::MAX);
        assert!(schedule.validate().is_err());
    }

    #[test]
    fn test_partial_override_keeps_defaults() {
        let schedule: TariffSchedule =
            serde_json::from_str(r#"{"grace_working_days": 0}"#).unwrap();
        assert_eq!(schedule.grace_working_days, 0);
        assert_eq!(schedule.fsa_rate, dec!(0.47));
        assert_eq!(schedule.category2.fixed_charge_per_kw, Some(dec!(50)));
    }

    #[test]
    fn test_policy_deserializes_from_tagged_json() {
        let schedule: TariffSchedule = serde_json::from_str(
            r#"{"fixed_charge_policy": {"rule": "above_units", "units": "300"}}"#,
        )
        .unwrap();
        assert_eq!(
            schedule.fixed_charge_policy,
            FixedChargePolicy::AboveUnits { units: dec!(300) }
        );
    }
}
