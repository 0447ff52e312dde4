use crate::calculations::forward_pass::ForwardPass;
use crate::config::EngineConfig;
use crate::palette::{self, EmployeeColor, UNASSIGNED_COLOR};
use crate::release::Release;
use chrono::{Datelike, NaiveDate};
use polars::prelude::*;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fmt;

// polars stores dates as days since 1970-01-01.
const DAYS_FROM_CE_TO_UNIX_EPOCH: i32 = 719_163;

/// Why a task has no dates. These are ordinary outcomes, not errors.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum UnscheduledReason {
    Cycle,
    ExternalBlocker,
    NoCapacity,
}

impl UnscheduledReason {
    pub fn as_str(&self) -> &'static str {
        match self {
            UnscheduledReason::Cycle => "cycle",
            UnscheduledReason::ExternalBlocker => "external_blocker",
            UnscheduledReason::NoCapacity => "no_capacity",
        }
    }
}

impl fmt::Display for UnscheduledReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct DateSpan {
    pub start: NaiveDate,
    pub end: NaiveDate,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScheduledTask {
    pub id: String,
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub start_date: Option<NaiveDate>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub end_date: Option<NaiveDate>,
    pub progress: u8,
    pub dependencies: Vec<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub assigned_employee_name: Option<String>,
    pub color: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub unscheduled_reason: Option<UnscheduledReason>,
}

impl ScheduledTask {
    pub fn is_scheduled(&self) -> bool {
        self.unscheduled_reason.is_none()
    }

    pub fn span(&self) -> Option<DateSpan> {
        match (self.start_date, self.end_date) {
            (Some(start), Some(end)) => Some(DateSpan { start, end }),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EmployeeLoad {
    pub employee_id: String,
    pub allocated_hours: f64,
    pub available_hours: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScheduleSummary {
    pub task_count: usize,
    pub scheduled_count: usize,
    pub cycle_count: usize,
    pub external_blocker_count: usize,
    pub no_capacity_count: usize,
    pub release_date: Option<NaiveDate>,
    /// Mean of task progress, 0 to 100.
    pub progress: f64,
}

impl ScheduleSummary {
    pub fn to_cli_summary(&self) -> String {
        let mut parts = Vec::new();
        parts.push(format!("tasks={}", self.task_count));
        parts.push(format!("scheduled={}", self.scheduled_count));
        if self.cycle_count > 0 {
            parts.push(format!("cycle={}", self.cycle_count));
        }
        if self.external_blocker_count > 0 {
            parts.push(format!("external_blocker={}", self.external_blocker_count));
        }
        if self.no_capacity_count > 0 {
            parts.push(format!("no_capacity={}", self.no_capacity_count));
        }
        match self.release_date {
            Some(date) => parts.push(format!("release={}", date)),
            None => parts.push("release=unplanned".to_string()),
        }
        parts.push(format!("progress={:.0}%", self.progress));
        parts.join(", ")
    }
}

/// Derived view of a release. Recomputed from scratch on every call and
/// never stored.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScheduleResult {
    pub release_id: String,
    /// Same order as the release's task list.
    pub tasks: Vec<ScheduledTask>,
    pub employee_colors: Vec<EmployeeColor>,
    pub employee_loads: Vec<EmployeeLoad>,
    /// Latest end date, present only when every task was scheduled.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub release_date: Option<NaiveDate>,
}

pub fn compute_schedule(release: &Release) -> ScheduleResult {
    compute_schedule_with_config(release, &EngineConfig::default())
}

pub fn compute_schedule_with_config(release: &Release, config: &EngineConfig) -> ScheduleResult {
    let output = ForwardPass::new(release, config).execute();
    let employee_colors = palette::employee_colors(&release.employees);

    let mut employee_lookup: HashMap<&str, (&str, &str)> = HashMap::new();
    for (employee, color) in release.employees.iter().zip(&employee_colors) {
        employee_lookup
            .entry(employee.id.as_str())
            .or_insert((employee.name.as_str(), color.color.as_str()));
    }

    let tasks: Vec<ScheduledTask> = release
        .tasks
        .iter()
        .zip(&output.resolutions)
        .map(|(task, resolution)| {
            let assignee = task
                .assigned_employee_id
                .as_deref()
                .and_then(|id| employee_lookup.get(id));
            let (start_date, end_date, unscheduled_reason) = match resolution {
                Ok(span) => (Some(span.start), Some(span.end), None),
                Err(reason) => (None, None, Some(*reason)),
            };
            ScheduledTask {
                id: task.id.clone(),
                name: task.name.clone(),
                start_date,
                end_date,
                progress: task.progress(),
                dependencies: task.blocker_task_ids.clone(),
                assigned_employee_name: assignee.map(|(name, _)| (*name).to_string()),
                color: assignee
                    .map(|(_, color)| *color)
                    .unwrap_or(UNASSIGNED_COLOR)
                    .to_string(),
                unscheduled_reason,
            }
        })
        .collect();

    let release_date = if tasks.iter().all(ScheduledTask::is_scheduled) {
        tasks.iter().filter_map(|task| task.end_date).max()
    } else {
        None
    };

    let employee_loads = release
        .employees
        .iter()
        .filter_map(|employee| {
            output.ledgers.get(&employee.id).map(|ledger| EmployeeLoad {
                employee_id: employee.id.clone(),
                allocated_hours: ledger.total_allocated(),
                available_hours: ledger.total_available(),
            })
        })
        .collect();

    let result = ScheduleResult {
        release_id: release.id.clone(),
        tasks,
        employee_colors,
        employee_loads,
        release_date,
    };

    let summary = result.summary();
    tracing::info!(
        release = %result.release_id,
        tasks = summary.task_count,
        scheduled = summary.scheduled_count,
        release_date = ?summary.release_date,
        "schedule computed"
    );
    result
}

impl ScheduleResult {
    pub fn find(&self, task_id: &str) -> Option<&ScheduledTask> {
        self.tasks.iter().find(|task| task.id == task_id)
    }

    pub fn summary(&self) -> ScheduleSummary {
        let mut summary = ScheduleSummary {
            task_count: self.tasks.len(),
            scheduled_count: 0,
            cycle_count: 0,
            external_blocker_count: 0,
            no_capacity_count: 0,
            release_date: self.release_date,
            progress: 0.0,
        };
        for task in &self.tasks {
            match task.unscheduled_reason {
                None => summary.scheduled_count += 1,
                Some(UnscheduledReason::Cycle) => summary.cycle_count += 1,
                Some(UnscheduledReason::ExternalBlocker) => summary.external_blocker_count += 1,
                Some(UnscheduledReason::NoCapacity) => summary.no_capacity_count += 1,
            }
        }
        if !self.tasks.is_empty() {
            let total: f64 = self.tasks.iter().map(|task| f64::from(task.progress)).sum();
            summary.progress = total / self.tasks.len() as f64;
        }
        summary
    }

    /// Tabular view for display, one row per task.
    pub fn to_dataframe(&self) -> PolarsResult<DataFrame> {
        let mut columns: Vec<Column> = Vec::with_capacity(9);

        let ids: Vec<&str> = self.tasks.iter().map(|t| t.id.as_str()).collect();
        columns.push(Series::new(PlSmallStr::from_static("id"), ids).into_column());

        let names: Vec<&str> = self.tasks.iter().map(|t| t.name.as_str()).collect();
        columns.push(Series::new(PlSmallStr::from_static("name"), names).into_column());

        let starts: Vec<Option<NaiveDate>> = self.tasks.iter().map(|t| t.start_date).collect();
        columns.push(Self::series_from_dates("start_date", &starts)?.into_column());

        let ends: Vec<Option<NaiveDate>> = self.tasks.iter().map(|t| t.end_date).collect();
        columns.push(Self::series_from_dates("end_date", &ends)?.into_column());

        let progress: Vec<i32> = self.tasks.iter().map(|t| i32::from(t.progress)).collect();
        columns.push(Series::new(PlSmallStr::from_static("progress"), progress).into_column());

        let assignees: Vec<Option<&str>> = self
            .tasks
            .iter()
            .map(|t| t.assigned_employee_name.as_deref())
            .collect();
        columns.push(Series::new(PlSmallStr::from_static("assignee"), assignees).into_column());

        let colors: Vec<&str> = self.tasks.iter().map(|t| t.color.as_str()).collect();
        columns.push(Series::new(PlSmallStr::from_static("color"), colors).into_column());

        let reasons: Vec<Option<&str>> = self
            .tasks
            .iter()
            .map(|t| t.unscheduled_reason.map(|r| r.as_str()))
            .collect();
        columns.push(
            Series::new(PlSmallStr::from_static("unscheduled_reason"), reasons).into_column(),
        );

        let dependencies: Vec<Series> = self
            .tasks
            .iter()
            .map(|t| {
                let inner: Vec<&str> = t.dependencies.iter().map(String::as_str).collect();
                Series::new(PlSmallStr::from_static(""), inner)
            })
            .collect();
        columns.push(
            Series::new(PlSmallStr::from_static("dependencies"), dependencies).into_column(),
        );

        DataFrame::new(columns)
    }

    fn series_from_dates(name: &str, dates: &[Option<NaiveDate>]) -> PolarsResult<Series> {
        let data: Vec<Option<i32>> = dates.iter().map(|d| d.map(Self::date_to_i32)).collect();
        Series::new(name.into(), data).cast(&DataType::Date)
    }

    fn date_to_i32(date: NaiveDate) -> i32 {
        date.num_days_from_ce() - DAYS_FROM_CE_TO_UNIX_EPOCH
    }
}
