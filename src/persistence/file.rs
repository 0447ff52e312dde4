use super::{PersistenceError, PersistenceResult, ReleaseStore};
use crate::Release;
use crate::schedule::{ScheduleResult, ScheduledTask};
use chrono::NaiveDate;
use serde::Serialize;
use std::fs::{self, File};
use std::path::{Path, PathBuf};

pub fn save_release_to_json<P: AsRef<Path>>(release: &Release, path: P) -> PersistenceResult<()> {
    super::validate_release(release)?;
    let file = File::create(path.as_ref())?;
    serde_json::to_writer_pretty(file, release)?;
    tracing::info!(release = %release.id, path = %path.as_ref().display(), "release saved");
    Ok(())
}

pub fn load_release_from_json<P: AsRef<Path>>(path: P) -> PersistenceResult<Release> {
    let file = File::open(path.as_ref())?;
    let release: Release = serde_json::from_reader(file)?;
    super::validate_release(&release)?;
    tracing::info!(release = %release.id, path = %path.as_ref().display(), "release loaded");
    Ok(release)
}

/// One `<release id>.json` file per release inside a directory.
pub struct JsonDirectoryStore {
    root: PathBuf,
}

impl JsonDirectoryStore {
    pub fn new<P: AsRef<Path>>(root: P) -> PersistenceResult<Self> {
        fs::create_dir_all(root.as_ref())?;
        Ok(Self {
            root: root.as_ref().to_path_buf(),
        })
    }

    fn path_for(&self, release_id: &str) -> PersistenceResult<PathBuf> {
        let valid = !release_id.is_empty()
            && release_id
                .chars()
                .all(|c| c.is_ascii_alphanumeric() || c == '-' || c == '_');
        if !valid {
            return Err(PersistenceError::InvalidData(format!(
                "release id '{release_id}' cannot be used as a file name"
            )));
        }
        Ok(self.root.join(format!("{release_id}.json")))
    }
}

impl ReleaseStore for JsonDirectoryStore {
    fn save_release(&self, release: &Release) -> PersistenceResult<()> {
        let path = self.path_for(&release.id)?;
        save_release_to_json(release, path)
    }

    fn load_release(&self, release_id: &str) -> PersistenceResult<Option<Release>> {
        let path = self.path_for(release_id)?;
        if !path.exists() {
            return Ok(None);
        }
        load_release_from_json(path).map(Some)
    }

    fn list_release_ids(&self) -> PersistenceResult<Vec<String>> {
        let mut ids = Vec::new();
        for entry in fs::read_dir(&self.root)? {
            let path = entry?.path();
            if path.extension().and_then(|ext| ext.to_str()) != Some("json") {
                continue;
            }
            if let Some(stem) = path.file_stem().and_then(|stem| stem.to_str()) {
                ids.push(stem.to_string());
            }
        }
        ids.sort();
        Ok(ids)
    }

    fn delete_release(&self, release_id: &str) -> PersistenceResult<bool> {
        let path = self.path_for(release_id)?;
        if !path.exists() {
            return Ok(false);
        }
        fs::remove_file(path)?;
        Ok(true)
    }
}

#[derive(Default, Serialize)]
struct ScheduledTaskCsvRecord {
    id: String,
    name: String,
    start_date: String,
    end_date: String,
    progress: u8,
    dependencies: String,
    assignee: String,
    color: String,
    unscheduled_reason: String,
}

impl From<&ScheduledTask> for ScheduledTaskCsvRecord {
    fn from(task: &ScheduledTask) -> Self {
        Self {
            id: task.id.clone(),
            name: task.name.clone(),
            start_date: format_date(task.start_date),
            end_date: format_date(task.end_date),
            progress: task.progress,
            dependencies: task.dependencies.join(";"),
            assignee: task.assigned_employee_name.clone().unwrap_or_default(),
            color: task.color.clone(),
            unscheduled_reason: task
                .unscheduled_reason
                .map(|reason| reason.as_str().to_string())
                .unwrap_or_default(),
        }
    }
}

/// Writes one CSV row per task of a computed schedule.
pub fn save_schedule_to_csv<P: AsRef<Path>>(
    schedule: &ScheduleResult,
    path: P,
) -> PersistenceResult<()> {
    let file = File::create(path.as_ref())?;
    let mut writer = csv::Writer::from_writer(file);
    for task in &schedule.tasks {
        writer.serialize(ScheduledTaskCsvRecord::from(task))?;
    }
    writer.flush()?;
    tracing::info!(
        release = %schedule.release_id,
        rows = schedule.tasks.len(),
        path = %path.as_ref().display(),
        "schedule exported"
    );
    Ok(())
}

fn format_date(date: Option<NaiveDate>) -> String {
    date.map(|d| d.format("%Y-%m-%d").to_string())
        .unwrap_or_default()
}
