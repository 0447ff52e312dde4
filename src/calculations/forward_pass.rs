use crate::calculations::capacity::{CapacityLedger, HOURS_EPSILON};
use crate::calendar::WorkCalendar;
use crate::config::EngineConfig;
use crate::graph::dependency_graph::DependencyGraph;
use crate::release::Release;
use crate::schedule::{DateSpan, UnscheduledReason};
use crate::task::Task;
use chrono::{Months, NaiveDate};
use std::collections::{HashMap, HashSet};

pub type Resolution = Result<DateSpan, UnscheduledReason>;

pub struct ForwardPassOutput {
    /// One entry per input task, indexed like `Release::tasks`.
    pub resolutions: Vec<Resolution>,
    pub ledgers: HashMap<String, CapacityLedger>,
}

/// Walks the tasks of one release in dependency-then-priority order and
/// gives each a date span or a reason it cannot be placed. Capacity is
/// handed out first come, first served.
pub struct ForwardPass<'a> {
    tasks: &'a [Task],
    calendar: WorkCalendar,
    config: EngineConfig,
    release_start: NaiveDate,
    dag: DependencyGraph,
    ledgers: HashMap<String, CapacityLedger>,
    resolved: Vec<Option<Resolution>>,
    visiting: HashSet<usize>,
}

impl<'a> ForwardPass<'a> {
    pub fn new(release: &'a Release, config: &EngineConfig) -> Self {
        let calendar = release.calendar();
        let release_start = release.start_date;
        let config = config.clone().sanitized();
        let horizon_end = match release_start.checked_add_months(Months::new(config.horizon_months)) {
            Some(end) => end,
            None => {
                tracing::warn!(
                    release = %release.id,
                    start = %release_start,
                    months = config.horizon_months,
                    "capacity horizon exceeds the date range, limiting it to the start date"
                );
                release_start
            }
        };

        let mut ledgers = HashMap::with_capacity(release.employees.len());
        for employee in &release.employees {
            ledgers.entry(employee.id.clone()).or_insert_with(|| {
                CapacityLedger::build(employee, release_start, horizon_end, &calendar)
            });
        }

        Self {
            tasks: &release.tasks,
            calendar,
            config,
            release_start,
            dag: DependencyGraph::build(&release.tasks),
            ledgers,
            resolved: vec![None; release.tasks.len()],
            visiting: HashSet::new(),
        }
    }

    pub fn execute(mut self) -> ForwardPassOutput {
        for position in self.dag.processing_order() {
            self.resolve(position);
        }

        let resolutions = self
            .resolved
            .into_iter()
            .map(|outcome| outcome.unwrap_or(Err(UnscheduledReason::Cycle)))
            .collect();
        ForwardPassOutput {
            resolutions,
            ledgers: self.ledgers,
        }
    }

    fn resolve(&mut self, position: usize) -> Resolution {
        if let Some(outcome) = self.resolved[position] {
            return outcome;
        }
        // Reaching a task that is still on the stack closes a cycle.
        if !self.visiting.insert(position) {
            return Err(UnscheduledReason::Cycle);
        }

        let outcome = self
            .earliest_start(position)
            .and_then(|earliest| self.place(position, earliest));

        self.visiting.remove(&position);
        self.resolved[position] = Some(outcome);

        let task = &self.tasks[position];
        match outcome {
            Ok(span) => tracing::debug!(
                task = %task.id,
                start = %span.start,
                end = %span.end,
                "task scheduled"
            ),
            Err(reason) => tracing::debug!(
                task = %task.id,
                reason = reason.as_str(),
                "task left unscheduled"
            ),
        }
        outcome
    }

    /// First working day after every blocker has ended, never before the
    /// release start. A failed blocker fails the task with the same reason.
    fn earliest_start(&mut self, position: usize) -> Result<NaiveDate, UnscheduledReason> {
        let tasks = self.tasks;
        let mut earliest = self.release_start;

        for blocker_id in &tasks[position].blocker_task_ids {
            let Some(blocker) = self.dag.position_of(blocker_id) else {
                return Err(UnscheduledReason::ExternalBlocker);
            };
            let span = self.resolve(blocker)?;
            let after_blocker = self
                .calendar
                .add_working_days(span.end, 1)
                .ok_or(UnscheduledReason::NoCapacity)?;
            if after_blocker > earliest {
                earliest = after_blocker;
            }
        }

        self.calendar
            .next_working_day(earliest)
            .ok_or(UnscheduledReason::NoCapacity)
    }

    fn place(&mut self, position: usize, earliest: NaiveDate) -> Resolution {
        let tasks = self.tasks;
        let task = &tasks[position];

        let Some(employee_id) = task.assigned_employee_id.as_deref() else {
            let days = (task.estimated_hours / self.config.hours_per_working_day)
                .ceil()
                .max(0.0);
            // A span longer than the date range can represent has no end date.
            if !(0.0..=f64::from(u32::MAX)).contains(&days) {
                return Err(UnscheduledReason::NoCapacity);
            }
            let end = self
                .calendar
                .add_working_days(earliest, days as u32)
                .ok_or(UnscheduledReason::NoCapacity)?;
            return Ok(DateSpan {
                start: earliest,
                end,
            });
        };

        let Some(ledger) = self.ledgers.get_mut(employee_id) else {
            return Err(UnscheduledReason::NoCapacity);
        };
        if ledger.is_empty() {
            return Err(UnscheduledReason::NoCapacity);
        }
        let from = ledger
            .first_index_at_or_after(earliest)
            .ok_or(UnscheduledReason::NoCapacity)?;

        if task.estimated_hours <= HOURS_EPSILON {
            let date = ledger.days()[from].date;
            return Ok(DateSpan {
                start: date,
                end: date,
            });
        }

        let allocation = ledger.allocate(from, task.estimated_hours);
        match (allocation.first_day, allocation.last_day) {
            (Some(start), Some(end)) if allocation.is_complete() => Ok(DateSpan { start, end }),
            _ => Err(UnscheduledReason::NoCapacity),
        }
    }
}
