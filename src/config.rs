use serde::{Deserialize, Serialize};
use std::fs;
use std::io;
use std::path::Path;

pub const DEFAULT_HORIZON_MONTHS: u32 = 12;
pub const DEFAULT_HOURS_PER_WORKING_DAY: f64 = 8.0;
/// Upper bound on the capacity horizon, ten years.
pub const MAX_HORIZON_MONTHS: u32 = 120;

/// Tunables for one scheduling pass.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EngineConfig {
    /// Calendar months of capacity materialized past the release start.
    pub horizon_months: u32,
    /// Hours that make up one working day for unassigned tasks.
    pub hours_per_working_day: f64,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            horizon_months: DEFAULT_HORIZON_MONTHS,
            hours_per_working_day: DEFAULT_HOURS_PER_WORKING_DAY,
        }
    }
}

impl EngineConfig {
    pub fn from_json_str(contents: &str) -> Result<Self, serde_json::Error> {
        let config: EngineConfig = serde_json::from_str(contents)?;
        Ok(config.sanitized())
    }

    pub fn load<P: AsRef<Path>>(path: P) -> io::Result<Self> {
        let contents = fs::read_to_string(path)?;
        Self::from_json_str(&contents).map_err(|err| io::Error::new(io::ErrorKind::InvalidData, err))
    }

    /// Non-positive or non-finite day lengths fall back to the default and
    /// the horizon is capped at `MAX_HORIZON_MONTHS`.
    pub fn sanitized(mut self) -> Self {
        if !self.hours_per_working_day.is_finite() || self.hours_per_working_day <= 0.0 {
            tracing::warn!(
                hours = self.hours_per_working_day,
                "invalid hours_per_working_day, using default"
            );
            self.hours_per_working_day = DEFAULT_HOURS_PER_WORKING_DAY;
        }
        if self.horizon_months > MAX_HORIZON_MONTHS {
            tracing::warn!(
                months = self.horizon_months,
                max = MAX_HORIZON_MONTHS,
                "horizon_months capped"
            );
            self.horizon_months = MAX_HORIZON_MONTHS;
        }
        self
    }
}
