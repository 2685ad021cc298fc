//! Pure calendar math for recurrence expansion and the annual rollover.
//!
//! Everything here operates on plain dates so the year-bounded expansion
//! and the weekday-aligned rollover can be pinned by unit tests without
//! touching storage.

use chrono::{Datelike, Duration, NaiveDate, Weekday};

use crate::errors::LedgerError;

use super::transaction::{RepeatRule, RepeatUnit};

/// Dates of the additional occurrences generated from a base dated `start`.
///
/// Produces `start + every, start + 2*every, ...` in the rule's unit and
/// stops before the first date whose calendar year exceeds `start`'s, so a
/// single expansion never spans a year boundary. The result may be empty.
pub fn series_dates(start: NaiveDate, rule: &RepeatRule) -> Vec<NaiveDate> {
    let mut dates = Vec::new();
    if rule.every == 0 {
        return dates;
    }
    let mut steps = rule.every;
    loop {
        let candidate = advance(start, rule.unit, steps);
        if candidate.year() != start.year() {
            break;
        }
        dates.push(candidate);
        steps += rule.every;
    }
    dates
}

/// Moves `from` forward by `steps` of the given unit, clamping the day of
/// month to the target month's length.
pub fn advance(from: NaiveDate, unit: RepeatUnit, steps: u32) -> NaiveDate {
    match unit {
        RepeatUnit::Week => from + Duration::weeks(steps as i64),
        RepeatUnit::Month => shift_month(from, steps as i32),
        RepeatUnit::Year => shift_year(from, steps as i32),
    }
}

/// First occurrence date in `year` for a group whose last known occurrence
/// is `representative`, preserving the representative's weekday alignment.
///
/// - weekly: the representative's weekday in week `every` of the year;
/// - monthly: month `every`, on the day-of-month the weekday falls in the
///   year's first week;
/// - yearly: the representative's month, first matching weekday.
pub fn rollover_start(
    representative: NaiveDate,
    rule: &RepeatRule,
    year: i32,
) -> Result<NaiveDate, LedgerError> {
    let weekday = representative.weekday();
    match rule.unit {
        RepeatUnit::Week => {
            let day = first_weekday_day(year, 1, weekday);
            let first = NaiveDate::from_ymd_opt(year, 1, day).unwrap();
            Ok(first + Duration::weeks(rule.every.saturating_sub(1) as i64))
        }
        RepeatUnit::Month => {
            if !(1..=12).contains(&rule.every) {
                return Err(LedgerError::Validation(format!(
                    "monthly interval {} does not name a calendar month",
                    rule.every
                )));
            }
            let day = first_weekday_day(year, 1, weekday);
            Ok(NaiveDate::from_ymd_opt(year, rule.every, day).unwrap())
        }
        RepeatUnit::Year => {
            let month = representative.month();
            let day = first_weekday_day(year, month, weekday);
            Ok(NaiveDate::from_ymd_opt(year, month, day).unwrap())
        }
    }
}

/// Day of month of the first `weekday` in the given month.
fn first_weekday_day(year: i32, month: u32, weekday: Weekday) -> u32 {
    let first = NaiveDate::from_ymd_opt(year, month, 1).unwrap();
    let offset = (weekday.num_days_from_monday() + 7 - first.weekday().num_days_from_monday()) % 7;
    1 + offset
}

fn shift_month(date: NaiveDate, months: i32) -> NaiveDate {
    let mut year = date.year();
    let mut month = date.month() as i32 + months;
    let mut day = date.day();
    while month > 12 {
        month -= 12;
        year += 1;
    }
    while month < 1 {
        month += 12;
        year -= 1;
    }
    day = day.min(days_in_month(year, month as u32));
    NaiveDate::from_ymd_opt(year, month as u32, day).unwrap()
}

fn shift_year(date: NaiveDate, years: i32) -> NaiveDate {
    let year = date.year() + years;
    let mut day = date.day();
    let month = date.month();
    day = day.min(days_in_month(year, month));
    NaiveDate::from_ymd_opt(year, month, day).unwrap()
}

fn days_in_month(year: i32, month: u32) -> u32 {
    let next_month = if month == 12 { 1 } else { month + 1 };
    let next_year = if month == 12 { year + 1 } else { year };
    let first_next = NaiveDate::from_ymd_opt(next_year, next_month, 1).unwrap();
    (first_next - Duration::days(1)).day()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn date(year: i32, month: u32, day: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(year, month, day).unwrap()
    }

    #[test]
    fn monthly_series_fills_remainder_of_year() {
        let rule = RepeatRule::new(RepeatUnit::Month, 1);
        let dates = series_dates(date(2024, 1, 10), &rule);
        assert_eq!(dates.len(), 11);
        assert_eq!(dates.first().copied(), Some(date(2024, 2, 10)));
        assert_eq!(dates.last().copied(), Some(date(2024, 12, 10)));
    }

    #[test]
    fn series_is_strictly_increasing_and_same_year() {
        let rule = RepeatRule::new(RepeatUnit::Week, 3);
        let start = date(2024, 2, 29);
        let dates = series_dates(start, &rule);
        assert!(!dates.is_empty());
        let mut previous = start;
        for produced in &dates {
            assert!(*produced > previous);
            assert_eq!(produced.year(), 2024);
            previous = *produced;
        }
        let next_step = advance(previous, rule.unit, rule.every);
        assert_eq!(next_step.year(), 2025);
    }

    #[test]
    fn series_may_be_empty_when_first_step_leaves_the_year() {
        let rule = RepeatRule::new(RepeatUnit::Month, 1);
        assert!(series_dates(date(2024, 12, 20), &rule).is_empty());

        let yearly = RepeatRule::new(RepeatUnit::Year, 1);
        assert!(series_dates(date(2024, 6, 1), &yearly).is_empty());
    }

    #[test]
    fn month_steps_clamp_to_short_months() {
        let rule = RepeatRule::new(RepeatUnit::Month, 1);
        let dates = series_dates(date(2024, 1, 31), &rule);
        assert_eq!(dates[0], date(2024, 2, 29));
        // Steps are multiples from the base, so the 31st survives long months.
        assert_eq!(dates[1], date(2024, 3, 31));
        assert_eq!(dates[2], date(2024, 4, 30));
    }

    #[test]
    fn zero_interval_produces_nothing() {
        let rule = RepeatRule::new(RepeatUnit::Week, 0);
        assert!(series_dates(date(2024, 1, 1), &rule).is_empty());
    }

    #[test]
    fn weekly_rollover_lands_in_requested_week() {
        // 2024-03-15 is a Friday; the first Friday of 2025 is Jan 3.
        let rule = RepeatRule::new(RepeatUnit::Week, 2);
        let start = rollover_start(date(2024, 3, 15), &rule, 2025).unwrap();
        assert_eq!(start, date(2025, 1, 10));
        assert_eq!(start.weekday(), Weekday::Fri);
    }

    #[test]
    fn weekly_rollover_every_one_is_first_matching_weekday() {
        // 2025-01-01 is a Wednesday; same-weekday groups start on Jan 1.
        let rule = RepeatRule::new(RepeatUnit::Week, 1);
        let start = rollover_start(date(2024, 7, 3), &rule, 2025).unwrap();
        assert_eq!(start, date(2025, 1, 1));
    }

    #[test]
    fn monthly_rollover_uses_interval_as_month() {
        // Representative on a Monday; first Monday of 2025 is Jan 6.
        let rule = RepeatRule::new(RepeatUnit::Month, 4);
        let start = rollover_start(date(2024, 9, 2), &rule, 2025).unwrap();
        assert_eq!(start, date(2025, 4, 6));
    }

    #[test]
    fn monthly_rollover_rejects_out_of_range_interval() {
        let rule = RepeatRule::new(RepeatUnit::Month, 13);
        let err = rollover_start(date(2024, 9, 2), &rule, 2025).unwrap_err();
        assert!(matches!(err, LedgerError::Validation(_)));
    }

    #[test]
    fn yearly_rollover_keeps_month_and_weekday() {
        // 2024-05-14 is a Tuesday; the first Tuesday of May 2025 is May 6.
        let rule = RepeatRule::new(RepeatUnit::Year, 1);
        let start = rollover_start(date(2024, 5, 14), &rule, 2025).unwrap();
        assert_eq!(start, date(2025, 5, 6));
        assert_eq!(start.weekday(), Weekday::Tue);
    }
}
