use crate::calendar::WorkCalendar;
use crate::config::EngineConfig;
use crate::employee::{CapacityPeriod, Employee};
use crate::schedule::{self, ScheduleResult};
use crate::task::{Task, TaskStatus};
use crate::validation::{self, ValidationError};
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use std::fmt;

#[derive(Debug, Clone, PartialEq)]
pub enum ReleaseError {
    TaskNotFound(String),
    EmployeeNotFound(String),
    Invalid(ValidationError),
}

impl fmt::Display for ReleaseError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ReleaseError::TaskNotFound(id) => write!(f, "task {id} not found"),
            ReleaseError::EmployeeNotFound(id) => write!(f, "employee {id} not found"),
            ReleaseError::Invalid(err) => write!(f, "invalid release data: {err}"),
        }
    }
}

impl std::error::Error for ReleaseError {}

impl From<ValidationError> for ReleaseError {
    fn from(value: ValidationError) -> Self {
        Self::Invalid(value)
    }
}

/// A release owns its employees and tasks. It is the only stored record;
/// schedules are derived from it on demand.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Release {
    pub id: String,
    pub name: String,
    pub start_date: NaiveDate,
    #[serde(default)]
    pub custom_holidays: BTreeSet<NaiveDate>,
    #[serde(default)]
    pub employees: Vec<Employee>,
    #[serde(default)]
    pub tasks: Vec<Task>,
}

impl Release {
    pub fn new(id: impl Into<String>, name: impl Into<String>, start_date: NaiveDate) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            start_date,
            custom_holidays: BTreeSet::new(),
            employees: Vec::new(),
            tasks: Vec::new(),
        }
    }

    pub fn calendar(&self) -> WorkCalendar {
        WorkCalendar::new(self.custom_holidays.iter().copied())
    }

    pub fn schedule(&self) -> ScheduleResult {
        schedule::compute_schedule(self)
    }

    pub fn schedule_with_config(&self, config: &EngineConfig) -> ScheduleResult {
        schedule::compute_schedule_with_config(self, config)
    }

    pub fn validate(&self) -> Result<(), ValidationError> {
        validation::validate_release(self)
    }

    pub fn find_task(&self, task_id: &str) -> Option<&Task> {
        self.tasks.iter().find(|task| task.id == task_id)
    }

    pub fn find_employee(&self, employee_id: &str) -> Option<&Employee> {
        self.employees.iter().find(|employee| employee.id == employee_id)
    }

    fn task_mut(&mut self, task_id: &str) -> Result<&mut Task, ReleaseError> {
        self.tasks
            .iter_mut()
            .find(|task| task.id == task_id)
            .ok_or_else(|| ReleaseError::TaskNotFound(task_id.to_string()))
    }

    fn employee_mut(&mut self, employee_id: &str) -> Result<&mut Employee, ReleaseError> {
        self.employees
            .iter_mut()
            .find(|employee| employee.id == employee_id)
            .ok_or_else(|| ReleaseError::EmployeeNotFound(employee_id.to_string()))
    }

    /// Inserts the task, or replaces the stored task with the same id in place.
    /// Returns true when the task is new.
    pub fn upsert_task(&mut self, task: Task) -> Result<bool, ReleaseError> {
        validation::validate_task(&task)?;
        match self.tasks.iter_mut().find(|existing| existing.id == task.id) {
            Some(existing) => {
                *existing = task;
                Ok(false)
            }
            None => {
                self.tasks.push(task);
                Ok(true)
            }
        }
    }

    /// Removes the task and drops it from every other task's blocker list.
    pub fn delete_task(&mut self, task_id: &str) -> bool {
        let before = self.tasks.len();
        self.tasks.retain(|task| task.id != task_id);
        if self.tasks.len() == before {
            return false;
        }
        for task in &mut self.tasks {
            task.blocker_task_ids.retain(|blocker| blocker != task_id);
        }
        true
    }

    pub fn set_task_status(&mut self, task_id: &str, status: TaskStatus) -> Result<(), ReleaseError> {
        self.task_mut(task_id)?.status = status;
        Ok(())
    }

    pub fn assign_task(
        &mut self,
        task_id: &str,
        employee_id: Option<&str>,
    ) -> Result<(), ReleaseError> {
        if let Some(employee_id) = employee_id {
            if self.find_employee(employee_id).is_none() {
                return Err(ReleaseError::EmployeeNotFound(employee_id.to_string()));
            }
        }
        self.task_mut(task_id)?.assigned_employee_id = employee_id.map(ToOwned::to_owned);
        Ok(())
    }

    /// Manual reorder: the listed tasks get priorities 0..n in the given
    /// order, every other task follows in its current relative order.
    pub fn reorder_tasks(&mut self, ordered_ids: &[&str]) -> Result<(), ReleaseError> {
        for id in ordered_ids {
            if self.find_task(id).is_none() {
                return Err(ReleaseError::TaskNotFound((*id).to_string()));
            }
        }

        let mut rest: Vec<usize> = (0..self.tasks.len())
            .filter(|&idx| !ordered_ids.contains(&self.tasks[idx].id.as_str()))
            .collect();
        rest.sort_by_key(|&idx| (self.tasks[idx].priority, idx));

        let mut next = 0;
        for id in ordered_ids {
            if let Some(task) = self.tasks.iter_mut().find(|task| task.id == *id) {
                task.priority = next;
                next += 1;
            }
        }
        for idx in rest {
            self.tasks[idx].priority = next;
            next += 1;
        }
        Ok(())
    }

    pub fn upsert_employee(&mut self, employee: Employee) -> Result<bool, ReleaseError> {
        validation::validate_employee(&employee)?;
        match self
            .employees
            .iter_mut()
            .find(|existing| existing.id == employee.id)
        {
            Some(existing) => {
                *existing = employee;
                Ok(false)
            }
            None => {
                self.employees.push(employee);
                Ok(true)
            }
        }
    }

    /// Removes the employee and unassigns their tasks.
    pub fn delete_employee(&mut self, employee_id: &str) -> bool {
        let before = self.employees.len();
        self.employees.retain(|employee| employee.id != employee_id);
        if self.employees.len() == before {
            return false;
        }
        for task in &mut self.tasks {
            if task.assigned_employee_id.as_deref() == Some(employee_id) {
                task.assigned_employee_id = None;
            }
        }
        true
    }

    pub fn add_capacity_period(
        &mut self,
        employee_id: &str,
        period: CapacityPeriod,
    ) -> Result<(), ReleaseError> {
        let employee = self.employee_mut(employee_id)?;
        employee.capacity.push(period);
        if let Err(err) = validation::validate_employee(employee) {
            employee.capacity.pop();
            return Err(err.into());
        }
        Ok(())
    }

    pub fn add_holiday(&mut self, date: NaiveDate) -> bool {
        self.custom_holidays.insert(date)
    }

    pub fn remove_holiday(&mut self, date: NaiveDate) -> bool {
        self.custom_holidays.remove(&date)
    }
}
