use chrono::{Datelike, NaiveDate, Weekday};

use crate::error::TariffError;
use crate::TariffResult;

/// Monday through Friday.
pub fn is_working_day(date: NaiveDate) -> bool {
    !matches!(date.weekday(), Weekday::Sat | Weekday::Sun)
}

/// Advance `start` by `days` working days, skipping Saturdays and Sundays.
///
/// The walk moves one calendar day at a time and only counts the days that
/// land on a weekday, so the returned date is always a weekday unless
/// `days == 0`, in which case `start` comes back unchanged (even if it is a
/// weekend).
pub fn add_working_days(start: NaiveDate, days: u32) -> TariffResult<NaiveDate> {
    let mut current = start;
    let mut counted = 0;

    while counted < days {
        current = current.succ_opt().ok_or_else(|| {
            TariffError::DateError(format!(
                "cannot add {days} working days to {start}: calendar overflow"
            ))
        })?;
        if is_working_day(current) {
            counted += 1;
        }
    }

    Ok(current)
}
