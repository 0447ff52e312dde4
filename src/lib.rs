pub mod calculations;
pub mod calendar;
pub mod config;
pub mod employee;
pub mod graph;
#[cfg(feature = "http_api")]
pub mod http_api;
pub mod palette;
pub mod persistence;
pub mod release;
pub mod schedule;
pub mod task;
pub mod validation;

pub use calendar::{WorkCalendar, WorkCalendarConfig};
pub use config::EngineConfig;
pub use employee::{CapacityPeriod, Employee};
pub use palette::EmployeeColor;
#[cfg(feature = "sqlite")]
pub use persistence::sqlite::SqliteReleaseStore;
pub use persistence::{
    PersistenceError, ReleaseStore, load_release_from_json, save_release_to_json,
    save_schedule_to_csv,
};
pub use release::{Release, ReleaseError};
pub use schedule::{
    DateSpan, EmployeeLoad, ScheduleResult, ScheduleSummary, ScheduledTask, UnscheduledReason,
    compute_schedule, compute_schedule_with_config,
};
pub use task::{Task, TaskStatus};
pub use validation::ValidationError;
