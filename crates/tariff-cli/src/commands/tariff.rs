use clap::Args;
use serde_json::Value;

use tariff_core::tariff::TariffSchedule;

use crate::input;

/// Arguments for showing the active tariff schedule
#[derive(Args)]
pub struct TariffArgs {
    /// Path to a JSON or YAML tariff schedule (defaults to the current rate table)
    #[arg(long)]
    pub tariff: Option<String>,
}

/// Load the schedule from `path`, or fall back to the built-in rate table.
/// Missing fields in the file keep their default values.
pub fn load_schedule(path: Option<&str>) -> Result<TariffSchedule, Box<dyn std::error::Error>> {
    let schedule = match path {
        Some(path) => input::file::read_config::<TariffSchedule>(path)?,
        None => TariffSchedule::default(),
    };
    schedule.validate()?;
    Ok(schedule)
}

pub fn run_tariff(args: TariffArgs) -> Result<Value, Box<dyn std::error::Error>> {
    let schedule = load_schedule(args.tariff.as_deref())?;
    Ok(serde_json::to_value(schedule)?)
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;
    use std::fs;
    use tariff_core::tariff::FixedChargePolicy;
    use tariff_core::TariffError;

    fn write_schedule(dir: &tempfile::TempDir, name: &str, contents: &str) -> String {
        let path = dir.path().join(name);
        fs::write(&path, contents).unwrap();
        path.to_str().unwrap().to_string()
    }

    #[test]
    fn test_no_path_uses_builtin_schedule() {
        assert_eq!(load_schedule(None).unwrap(), TariffSchedule::default());
    }

    #[test]
    fn test_yaml_override_keeps_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let path = write_schedule(
            &dir,
            "tariff.yaml",
            "grace_working_days: 5\nfixed_charge_policy:\n  rule: above_units\n  units: \"300\"\n",
        );

        let schedule = load_schedule(Some(&path)).unwrap();
        assert_eq!(schedule.grace_working_days, 5);
        assert_eq!(
            schedule.fixed_charge_policy,
            FixedChargePolicy::AboveUnits { units: dec!(300) }
        );
        assert_eq!(schedule.fsa_rate, dec!(0.47));
        assert_eq!(schedule.category2.bands.len(), 4);
    }

    #[test]
    fn test_yml_extension_is_yaml() {
        let dir = tempfile::tempdir().unwrap();
        let path = write_schedule(&dir, "tariff.YML", "currency_symbol: Rs\n");
        assert_eq!(load_schedule(Some(&path)).unwrap().currency_symbol, "Rs");
    }

    #[test]
    fn test_json_override_keeps_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let path = write_schedule(&dir, "tariff.json", r#"{"late_surcharge_rate": "0.05"}"#);

        let schedule = load_schedule(Some(&path)).unwrap();
        assert_eq!(schedule.late_surcharge_rate, dec!(0.05));
        assert_eq!(schedule.grace_surcharge_rate, dec!(0.015));
        assert_eq!(schedule.grace_working_days, 10);
    }

    #[test]
    fn test_json_file_is_not_parsed_as_yaml() {
        // valid YAML, but a .json path is always parsed as JSON
        let dir = tempfile::tempdir().unwrap();
        let path = write_schedule(&dir, "tariff.json", "grace_working_days: 5\n");
        assert!(load_schedule(Some(&path)).is_err());
    }

    #[test]
    fn test_invalid_loaded_schedule_rejected() {
        let dir = tempfile::tempdir().unwrap();
        let path = write_schedule(
            &dir,
            "tariff.yaml",
            "category3:\n  label: Category 3\n  bands:\n    - monthly_units: \"500\"\n      rate: \"6.50\"\n",
        );

        let err = load_schedule(Some(&path)).unwrap_err();
        assert!(matches!(
            err.downcast_ref::<TariffError>(),
            Some(TariffError::InvalidSchedule(_))
        ));
    }

    #[test]
    fn test_missing_file_reported() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("absent.yaml");
        let err = load_schedule(path.to_str()).unwrap_err();
        assert!(err.to_string().contains("File not found"));
    }
}
