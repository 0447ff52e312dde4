use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

/// Daily hours an employee can give over an inclusive date range.
/// `hours_per_day == 0` marks vacation or other unavailability.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CapacityPeriod {
    pub start_date: NaiveDate,
    pub end_date: NaiveDate,
    pub hours_per_day: f64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
}

impl CapacityPeriod {
    pub fn new(start_date: NaiveDate, end_date: NaiveDate, hours_per_day: f64) -> Self {
        Self {
            start_date,
            end_date,
            hours_per_day,
            description: None,
        }
    }

    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }

    pub fn covers(&self, date: NaiveDate) -> bool {
        self.start_date <= date && date <= self.end_date
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Employee {
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub position: String,
    /// Kept in the order entered. Periods may overlap or leave gaps.
    #[serde(default)]
    pub capacity: Vec<CapacityPeriod>,
}

impl Employee {
    pub fn new(id: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            position: String::new(),
            capacity: Vec::new(),
        }
    }

    pub fn with_position(mut self, position: impl Into<String>) -> Self {
        self.position = position.into();
        self
    }

    pub fn with_period(mut self, period: CapacityPeriod) -> Self {
        self.capacity.push(period);
        self
    }

    /// Hours from the first period (in list order) covering `date`, or 0.
    pub fn hours_on(&self, date: NaiveDate) -> f64 {
        self.capacity
            .iter()
            .find(|period| period.covers(date))
            .map(|period| period.hours_per_day)
            .unwrap_or(0.0)
    }
}
