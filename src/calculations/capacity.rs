use crate::calendar::WorkCalendar;
use crate::employee::Employee;
use chrono::NaiveDate;

pub(crate) const HOURS_EPSILON: f64 = 1e-6;

#[derive(Debug, Clone, PartialEq)]
pub struct CapacityDay {
    pub date: NaiveDate,
    pub hours_available: f64,
    pub hours_allocated: f64,
}

impl CapacityDay {
    pub fn hours_free(&self) -> f64 {
        (self.hours_available - self.hours_allocated).max(0.0)
    }
}

/// Outcome of drawing hours from a ledger.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Allocation {
    pub first_day: Option<NaiveDate>,
    pub last_day: Option<NaiveDate>,
    /// Hours that could not be placed before the horizon ran out.
    pub unplaced_hours: f64,
}

impl Allocation {
    pub fn is_complete(&self) -> bool {
        self.unplaced_hours <= HOURS_EPSILON
    }
}

/// One employee's working days across the planning horizon, with the hours
/// each day offers and the hours already handed out in this pass.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct CapacityLedger {
    days: Vec<CapacityDay>,
}

impl CapacityLedger {
    /// Materializes every working day in `[start, horizon_end]`. Days no
    /// capacity period covers are kept with zero hours.
    pub fn build(
        employee: &Employee,
        start: NaiveDate,
        horizon_end: NaiveDate,
        calendar: &WorkCalendar,
    ) -> Self {
        let days = calendar
            .working_days_in_range(start, horizon_end)
            .into_iter()
            .map(|date| CapacityDay {
                date,
                hours_available: employee.hours_on(date),
                hours_allocated: 0.0,
            })
            .collect();
        Self { days }
    }

    pub fn days(&self) -> &[CapacityDay] {
        &self.days
    }

    pub fn is_empty(&self) -> bool {
        self.days.is_empty()
    }

    /// Index of the first ledger day on or after `date`.
    pub fn first_index_at_or_after(&self, date: NaiveDate) -> Option<usize> {
        let idx = self.days.partition_point(|day| day.date < date);
        (idx < self.days.len()).then_some(idx)
    }

    /// Greedily consumes `hours` starting at day `from`. Hours taken stay
    /// taken even when the request cannot be satisfied in full.
    pub fn allocate(&mut self, from: usize, hours: f64) -> Allocation {
        let mut remaining = hours;
        let mut first_day = None;
        let mut last_day = None;

        for day in self.days.iter_mut().skip(from) {
            if remaining <= HOURS_EPSILON {
                break;
            }
            let free = day.hours_free();
            if free <= HOURS_EPSILON {
                continue;
            }
            let take = remaining.min(free);
            day.hours_allocated += take;
            remaining -= take;
            first_day.get_or_insert(day.date);
            last_day = Some(day.date);
        }

        Allocation {
            first_day,
            last_day,
            unplaced_hours: remaining.max(0.0),
        }
    }

    pub fn total_available(&self) -> f64 {
        self.days.iter().map(|day| day.hours_available).sum()
    }

    pub fn total_allocated(&self) -> f64 {
        self.days.iter().map(|day| day.hours_allocated).sum()
    }
}
