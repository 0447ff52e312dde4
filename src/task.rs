use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TaskStatus {
    #[default]
    Pending,
    InProgress,
    Completed,
    Blocked,
}

impl TaskStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            TaskStatus::Pending => "pending",
            TaskStatus::InProgress => "in_progress",
            TaskStatus::Completed => "completed",
            TaskStatus::Blocked => "blocked",
        }
    }

    /// Display progress percentage. Depends on status only, never on dates.
    pub fn progress(&self) -> u8 {
        match self {
            TaskStatus::Completed => 100,
            TaskStatus::InProgress => 50,
            TaskStatus::Pending | TaskStatus::Blocked => 0,
        }
    }

    pub fn variants() -> &'static [TaskStatus] {
        &[
            TaskStatus::Pending,
            TaskStatus::InProgress,
            TaskStatus::Completed,
            TaskStatus::Blocked,
        ]
    }
}

impl fmt::Display for TaskStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for TaskStatus {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().replace('-', "_").as_str() {
            "pending" => Ok(TaskStatus::Pending),
            "in_progress" => Ok(TaskStatus::InProgress),
            "completed" => Ok(TaskStatus::Completed),
            "blocked" => Ok(TaskStatus::Blocked),
            other => Err(format!("unknown task status '{other}'")),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Task {
    pub id: String,
    pub name: String,
    pub estimated_hours: f64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub assigned_employee_id: Option<String>,
    /// Tasks that must finish first. May name ids outside the release.
    #[serde(default)]
    pub blocker_task_ids: Vec<String>,
    /// Lower runs first among otherwise unordered tasks.
    #[serde(default)]
    pub priority: i32,
    #[serde(default)]
    pub status: TaskStatus,
}

impl Task {
    pub fn new(id: impl Into<String>, name: impl Into<String>, estimated_hours: f64) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            estimated_hours,
            assigned_employee_id: None,
            blocker_task_ids: Vec::new(),
            priority: 0,
            status: TaskStatus::Pending,
        }
    }

    pub fn assigned_to(mut self, employee_id: impl Into<String>) -> Self {
        self.assigned_employee_id = Some(employee_id.into());
        self
    }

    pub fn blocked_by<I, S>(mut self, blockers: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.blocker_task_ids = blockers.into_iter().map(Into::into).collect();
        self
    }

    pub fn with_priority(mut self, priority: i32) -> Self {
        self.priority = priority;
        self
    }

    pub fn with_status(mut self, status: TaskStatus) -> Self {
        self.status = status;
        self
    }

    pub fn progress(&self) -> u8 {
        self.status.progress()
    }
}
