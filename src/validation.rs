use crate::employee::Employee;
use crate::release::Release;
use crate::task::Task;
use std::collections::HashSet;
use std::fmt;

#[derive(Debug, Clone, PartialEq)]
pub struct ValidationError {
    message: String,
}

impl ValidationError {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }

    pub fn message(&self) -> &str {
        &self.message
    }
}

impl fmt::Display for ValidationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.message)
    }
}

impl std::error::Error for ValidationError {}

pub fn validate_task(task: &Task) -> Result<(), ValidationError> {
    if task.id.trim().is_empty() {
        return Err(ValidationError::new("task requires a non-empty id"));
    }
    if !task.estimated_hours.is_finite() || task.estimated_hours < 0.0 {
        return Err(ValidationError::new(format!(
            "task {} has invalid estimated_hours {}",
            task.id, task.estimated_hours
        )));
    }
    if let Some(employee_id) = &task.assigned_employee_id {
        if employee_id.trim().is_empty() {
            return Err(ValidationError::new(format!(
                "task {} has an empty assigned_employee_id",
                task.id
            )));
        }
    }
    if task.blocker_task_ids.iter().any(|id| id.trim().is_empty()) {
        return Err(ValidationError::new(format!(
            "task {} lists an empty blocker id",
            task.id
        )));
    }
    Ok(())
}

pub fn validate_employee(employee: &Employee) -> Result<(), ValidationError> {
    if employee.id.trim().is_empty() {
        return Err(ValidationError::new("employee requires a non-empty id"));
    }
    for (idx, period) in employee.capacity.iter().enumerate() {
        if period.start_date > period.end_date {
            return Err(ValidationError::new(format!(
                "employee {} capacity period #{} starts {} after it ends {}",
                employee.id, idx, period.start_date, period.end_date
            )));
        }
        if !period.hours_per_day.is_finite() || period.hours_per_day < 0.0 {
            return Err(ValidationError::new(format!(
                "employee {} capacity period #{} has invalid hours_per_day {}",
                employee.id, idx, period.hours_per_day
            )));
        }
        if period.hours_per_day > 24.0 {
            return Err(ValidationError::new(format!(
                "employee {} capacity period #{} exceeds 24 hours per day ({})",
                employee.id, idx, period.hours_per_day
            )));
        }
    }
    Ok(())
}

/// Checks a whole release the way the storage layer does before handing it
/// to the scheduler. Dangling blocker ids and cycles are not errors here;
/// the scheduler reports them per task.
pub fn validate_release(release: &Release) -> Result<(), ValidationError> {
    let mut seen_employees = HashSet::with_capacity(release.employees.len());
    for employee in &release.employees {
        if !seen_employees.insert(employee.id.as_str()) {
            return Err(ValidationError::new(format!(
                "duplicate employee id {}",
                employee.id
            )));
        }
        validate_employee(employee)?;
    }

    let mut seen_tasks = HashSet::with_capacity(release.tasks.len());
    for task in &release.tasks {
        if !seen_tasks.insert(task.id.as_str()) {
            return Err(ValidationError::new(format!("duplicate task id {}", task.id)));
        }
        validate_task(task)?;
    }
    Ok(())
}
