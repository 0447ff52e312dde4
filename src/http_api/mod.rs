use std::{net::SocketAddr, sync::Arc};

use axum::{
    Json, Router,
    extract::{Path, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::{delete, get, post},
};
use parking_lot::RwLock;
use serde::Serialize;
use serde_json::json;

use crate::{
    CapacityPeriod, Employee, EngineConfig, Release, ReleaseError, ScheduleResult,
    ScheduleSummary, Task,
};

#[derive(Clone)]
pub struct AppState {
    release: Arc<RwLock<Release>>,
    config: Arc<EngineConfig>,
}

impl AppState {
    pub fn new(release: Release) -> Self {
        Self::with_config(release, EngineConfig::default())
    }

    pub fn with_config(release: Release, config: EngineConfig) -> Self {
        Self {
            release: Arc::new(RwLock::new(release)),
            config: Arc::new(config),
        }
    }

    fn release(&self) -> Arc<RwLock<Release>> {
        self.release.clone()
    }

    fn compute(&self) -> ScheduleResult {
        let guard = self.release.read();
        guard.schedule_with_config(&self.config)
    }
}

#[derive(Debug, Serialize)]
struct ErrorBody<'a> {
    error: &'a str,
    message: String,
}

#[derive(Debug)]
enum ApiError {
    NotFound(String),
    Conflict(String),
    Invalid(String),
}

impl ApiError {
    fn not_found(message: impl Into<String>) -> Self {
        ApiError::NotFound(message.into())
    }

    fn invalid(message: impl Into<String>) -> Self {
        ApiError::Invalid(message.into())
    }
}

impl From<ReleaseError> for ApiError {
    fn from(value: ReleaseError) -> Self {
        match value {
            ReleaseError::TaskNotFound(_) | ReleaseError::EmployeeNotFound(_) => {
                ApiError::NotFound(value.to_string())
            }
            ReleaseError::Invalid(_) => ApiError::Invalid(value.to_string()),
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, error, message) = match self {
            ApiError::NotFound(message) => (StatusCode::NOT_FOUND, "not_found", message),
            ApiError::Conflict(message) => (StatusCode::CONFLICT, "conflict", message),
            ApiError::Invalid(message) => (StatusCode::BAD_REQUEST, "invalid_request", message),
        };
        tracing::warn!(status = status.as_u16(), %message, "request rejected");
        (status, Json(ErrorBody { error, message })).into_response()
    }
}

pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(health))
        .route("/release", get(get_release).put(replace_release))
        .route("/tasks", get(list_tasks).post(create_task))
        .route(
            "/tasks/:id",
            get(get_task).put(update_task).delete(delete_task),
        )
        .route("/employees", get(list_employees).post(create_employee))
        .route("/employees/:id", delete(delete_employee))
        .route("/employees/:id/capacity", post(add_capacity_period))
        .route("/schedule", get(get_schedule).post(preview_schedule))
        .route("/schedule/summary", get(get_schedule_summary))
        .with_state(state)
}

pub async fn serve(addr: SocketAddr, state: AppState) -> std::io::Result<()> {
    let app = router(state);
    let listener = tokio::net::TcpListener::bind(addr).await?;
    tracing::info!(%addr, "http api listening");
    axum::serve(listener, app).await
}

async fn health() -> impl IntoResponse {
    Json(json!({ "status": "ok" }))
}

async fn get_release(State(state): State<AppState>) -> Json<Release> {
    let release = state.release();
    let snapshot = release.read().clone();
    Json(snapshot)
}

async fn replace_release(
    State(state): State<AppState>,
    Json(incoming): Json<Release>,
) -> Result<Json<Release>, ApiError> {
    incoming
        .validate()
        .map_err(|err| ApiError::invalid(err.to_string()))?;
    let release = state.release();
    *release.write() = incoming.clone();
    Ok(Json(incoming))
}

async fn list_tasks(State(state): State<AppState>) -> Json<Vec<Task>> {
    let release = state.release();
    let tasks = release.read().tasks.clone();
    Json(tasks)
}

async fn get_task(
    State(state): State<AppState>,
    Path(task_id): Path<String>,
) -> Result<Json<Task>, ApiError> {
    let release = state.release();
    let found = release.read().find_task(&task_id).cloned();
    found
        .map(Json)
        .ok_or_else(|| ApiError::not_found(format!("task {task_id} not found")))
}

async fn create_task(
    State(state): State<AppState>,
    Json(task): Json<Task>,
) -> Result<(StatusCode, Json<Task>), ApiError> {
    let release = state.release();
    let mut guard = release.write();
    if guard.find_task(&task.id).is_some() {
        return Err(ApiError::Conflict(format!("task {} already exists", task.id)));
    }
    guard.upsert_task(task.clone())?;
    Ok((StatusCode::CREATED, Json(task)))
}

async fn update_task(
    State(state): State<AppState>,
    Path(task_id): Path<String>,
    Json(task): Json<Task>,
) -> Result<Json<Task>, ApiError> {
    if task.id != task_id {
        return Err(ApiError::invalid(
            "task id in payload does not match path parameter",
        ));
    }
    let release = state.release();
    let mut guard = release.write();
    if guard.find_task(&task_id).is_none() {
        return Err(ApiError::not_found(format!("task {task_id} not found")));
    }
    guard.upsert_task(task.clone())?;
    Ok(Json(task))
}

async fn delete_task(
    State(state): State<AppState>,
    Path(task_id): Path<String>,
) -> Result<StatusCode, ApiError> {
    let release = state.release();
    let removed = release.write().delete_task(&task_id);
    if !removed {
        return Err(ApiError::not_found(format!("task {task_id} not found")));
    }
    Ok(StatusCode::NO_CONTENT)
}

async fn list_employees(State(state): State<AppState>) -> Json<Vec<Employee>> {
    let release = state.release();
    let employees = release.read().employees.clone();
    Json(employees)
}

async fn create_employee(
    State(state): State<AppState>,
    Json(employee): Json<Employee>,
) -> Result<(StatusCode, Json<Employee>), ApiError> {
    let release = state.release();
    let mut guard = release.write();
    if guard.find_employee(&employee.id).is_some() {
        return Err(ApiError::Conflict(format!(
            "employee {} already exists",
            employee.id
        )));
    }
    guard.upsert_employee(employee.clone())?;
    Ok((StatusCode::CREATED, Json(employee)))
}

async fn delete_employee(
    State(state): State<AppState>,
    Path(employee_id): Path<String>,
) -> Result<StatusCode, ApiError> {
    let release = state.release();
    let removed = release.write().delete_employee(&employee_id);
    if !removed {
        return Err(ApiError::not_found(format!(
            "employee {employee_id} not found"
        )));
    }
    Ok(StatusCode::NO_CONTENT)
}

async fn add_capacity_period(
    State(state): State<AppState>,
    Path(employee_id): Path<String>,
    Json(period): Json<CapacityPeriod>,
) -> Result<Json<Employee>, ApiError> {
    let release = state.release();
    let mut guard = release.write();
    guard.add_capacity_period(&employee_id, period)?;
    let employee = guard
        .find_employee(&employee_id)
        .cloned()
        .ok_or_else(|| ApiError::not_found(format!("employee {employee_id} not found")))?;
    Ok(Json(employee))
}

async fn get_schedule(State(state): State<AppState>) -> Json<ScheduleResult> {
    Json(state.compute())
}

async fn get_schedule_summary(State(state): State<AppState>) -> Json<ScheduleSummary> {
    Json(state.compute().summary())
}

/// Schedules a release sent in the request body without touching the
/// stored one.
async fn preview_schedule(
    State(state): State<AppState>,
    Json(release): Json<Release>,
) -> Result<Json<ScheduleResult>, ApiError> {
    release
        .validate()
        .map_err(|err| ApiError::invalid(err.to_string()))?;
    Ok(Json(release.schedule_with_config(&state.config)))
}
