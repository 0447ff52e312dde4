use crate::employee::Employee;
use serde::{Deserialize, Serialize};

/// Bar color for tasks with no (known) assignee.
pub const UNASSIGNED_COLOR: &str = "#9e9e9e";

pub const EMPLOYEE_PALETTE: [&str; 10] = [
    "#4e79a7", "#f28e2b", "#e15759", "#76b7b2", "#59a14f", "#edc948", "#b07aa1", "#ff9da7",
    "#9c755f", "#17becf",
];

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EmployeeColor {
    pub employee_id: String,
    pub name: String,
    pub color: String,
}

/// Palette slot for the employee at `index` in the release; wraps around.
pub fn employee_color(index: usize) -> &'static str {
    EMPLOYEE_PALETTE[index % EMPLOYEE_PALETTE.len()]
}

pub fn employee_colors(employees: &[Employee]) -> Vec<EmployeeColor> {
    employees
        .iter()
        .enumerate()
        .map(|(idx, employee)| EmployeeColor {
            employee_id: employee.id.clone(),
            name: employee.name.clone(),
            color: employee_color(idx).to_string(),
        })
        .collect()
}
