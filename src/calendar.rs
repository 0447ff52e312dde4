use chrono::{Datelike, Days, NaiveDate, Weekday};
use serde::{Deserialize, Serialize};
use std::collections::HashSet;

/// Working-day calendar for one release: Saturday and Sunday are never
/// worked, and every date in `holidays` is skipped regardless of weekday.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct WorkCalendar {
    holidays: HashSet<NaiveDate>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct WorkCalendarConfig {
    holidays: Vec<NaiveDate>,
}

impl WorkCalendar {
    pub fn new<I>(holidays: I) -> Self
    where
        I: IntoIterator<Item = NaiveDate>,
    {
        Self {
            holidays: holidays.into_iter().collect(),
        }
    }

    pub fn from_config(config: &WorkCalendarConfig) -> Self {
        Self::new(config.holidays.iter().copied())
    }

    pub fn to_config(&self) -> WorkCalendarConfig {
        WorkCalendarConfig::from(self)
    }

    /// Add a single holiday
    pub fn add_holiday(&mut self, date: NaiveDate) {
        self.holidays.insert(date);
    }

    /// Add multiple holidays at once
    pub fn add_holidays(&mut self, dates: &[NaiveDate]) {
        self.holidays.extend(dates);
    }

    pub fn is_holiday(&self, date: NaiveDate) -> bool {
        self.holidays.contains(&date)
    }

    pub fn is_weekend(date: NaiveDate) -> bool {
        matches!(date.weekday(), Weekday::Sat | Weekday::Sun)
    }

    pub fn is_working_day(&self, date: NaiveDate) -> bool {
        !Self::is_weekend(date) && !self.is_holiday(date)
    }

    /// Returns `date` itself when it is a working day, otherwise the first
    /// working day after it. `None` once the search leaves chrono's date range.
    pub fn next_working_day(&self, date: NaiveDate) -> Option<NaiveDate> {
        let mut current = date;
        while !self.is_working_day(current) {
            current = current.succ_opt()?;
        }
        Some(current)
    }

    /// Advance by exactly `days` working days. Zero returns `from` unchanged,
    /// even when `from` is not itself a working day. `None` when the result
    /// would fall past the last representable date.
    pub fn add_working_days(&self, from: NaiveDate, days: u32) -> Option<NaiveDate> {
        // Every working day is at least one calendar day.
        from.checked_add_days(Days::new(u64::from(days)))?;

        let mut current = from;
        let mut count = 0;
        while count < days {
            current = current.succ_opt()?;
            if self.is_working_day(current) {
                count += 1;
            }
        }
        Some(current)
    }

    /// All working days in `[start, end]`, ascending.
    pub fn working_days_in_range(&self, start: NaiveDate, end: NaiveDate) -> Vec<NaiveDate> {
        start
            .iter_days()
            .take_while(|date| *date <= end)
            .filter(|date| self.is_working_day(*date))
            .collect()
    }

    pub fn count_working_days(&self, start: NaiveDate, end: NaiveDate) -> i64 {
        start
            .iter_days()
            .take_while(|date| *date <= end)
            .filter(|date| self.is_working_day(*date))
            .count() as i64
    }
}

impl WorkCalendarConfig {
    pub fn new<I>(holidays: I) -> Self
    where
        I: IntoIterator<Item = NaiveDate>,
    {
        let mut holidays: Vec<NaiveDate> = holidays.into_iter().collect();
        holidays.sort();
        holidays.dedup();
        Self { holidays }
    }

    pub fn holidays(&self) -> &[NaiveDate] {
        &self.holidays
    }
}

impl From<&WorkCalendar> for WorkCalendarConfig {
    fn from(calendar: &WorkCalendar) -> Self {
        WorkCalendarConfig::new(calendar.holidays.iter().copied())
    }
}
