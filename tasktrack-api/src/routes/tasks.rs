/// Task endpoints
///
/// All endpoints require `Authorization: Bearer <token>`.
///
/// - `POST /createtask` - Create a task owned by the caller
/// - `GET /dashboard` - Task counts for the caller
/// - `GET /assigned-tasks` - Tasks visible to the caller
/// - `PATCH /tasks/:id/status` - Overwrite a task's status
/// - `DELETE /tasks/:id` - Delete a task (owner only)

use crate::{
    app::AppState,
    error::{ApiError, ApiResult},
};
use axum::{
    extract::{rejection::JsonRejection, Path, State},
    http::StatusCode,
    Extension, Json,
};
use serde::{Deserialize, Serialize};
use tasktrack_shared::{
    auth::middleware::AuthContext,
    models::task::{CreateTaskInput, Task, TaskStatus, VisibleTask},
};
use uuid::Uuid;

/// Task plus a confirmation message
#[derive(Debug, Serialize, Deserialize)]
pub struct TaskResponse {
    pub message: String,
    pub task: Task,
}

/// Dashboard summary
#[derive(Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DashboardResponse {
    pub full_name: String,
    pub personal_tasks_count: i64,
    pub assigned_tasks_count: i64,
}

/// Tasks visible to the caller
#[derive(Debug, Serialize, Deserialize)]
pub struct TaskListResponse {
    pub tasks: Vec<VisibleTask>,
}

/// Status update request
#[derive(Debug, Deserialize)]
pub struct UpdateStatusRequest {
    /// "pending", "in-progress" or "completed"
    #[serde(default)]
    pub status: String,
}

/// Confirmation message
#[derive(Debug, Serialize, Deserialize)]
pub struct DeleteResponse {
    pub message: String,
}

/// Ids that aren't UUIDs can't name a task
fn parse_task_id(raw: &str) -> Result<Uuid, ApiError> {
    Uuid::parse_str(raw).map_err(|_| ApiError::NotFound("Task not found".to_string()))
}

/// Create a task
///
/// ```text
/// POST /createtask
///
/// {
///   "name": "Write report",
///   "description": "Quarterly numbers",
///   "assignedTo": "others",
///   "assigneeEmail": "bob@example.com"
/// }
/// ```
///
/// `assigneeEmail` is required for `others` and ignored for `personal`.
///
/// # Errors
///
/// - `400 Bad Request`: Validation failed
pub async fn create_task(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthContext>,
    payload: Result<Json<CreateTaskInput>, JsonRejection>,
) -> ApiResult<(StatusCode, Json<TaskResponse>)> {
    let Json(input) = payload?;
    let task = state.tasks.create(&auth, input).await?;

    Ok((
        StatusCode::CREATED,
        Json(TaskResponse {
            message: "Task created successfully".to_string(),
            task,
        }),
    ))
}

/// Dashboard counts
///
/// # Errors
///
/// - `404 Not Found`: The token's subject no longer exists
pub async fn dashboard(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthContext>,
) -> ApiResult<Json<DashboardResponse>> {
    let user = state
        .authenticator
        .current_user(&auth)
        .await?
        .ok_or_else(|| ApiError::NotFound("User not found".to_string()))?;

    let counts = state.tasks.summary(&auth).await?;

    Ok(Json(DashboardResponse {
        full_name: user.full_name,
        personal_tasks_count: counts.personal_tasks_count,
        assigned_tasks_count: counts.assigned_tasks_count,
    }))
}

/// Tasks assigned to the caller plus the caller's personal tasks, newest first
pub async fn assigned_tasks(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthContext>,
) -> ApiResult<Json<TaskListResponse>> {
    let tasks = state.tasks.list_visible(&auth).await?;

    Ok(Json(TaskListResponse { tasks }))
}

/// Update a task's status
///
/// ```text
/// PATCH /tasks/:id/status
///
/// { "status": "in-progress" }
/// ```
///
/// # Errors
///
/// - `400 Bad Request`: Malformed body or unknown status
/// - `404 Not Found`: No such task
pub async fn update_status(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthContext>,
    Path(id): Path<String>,
    payload: Result<Json<UpdateStatusRequest>, JsonRejection>,
) -> ApiResult<Json<TaskResponse>> {
    let task_id = parse_task_id(&id)?;
    let Json(req) = payload?;
    let status = req
        .status
        .parse::<TaskStatus>()
        .map_err(|e| ApiError::field("status", e))?;

    let task = state.tasks.update_status(&auth, task_id, status).await?;

    Ok(Json(TaskResponse {
        message: "Task status updated successfully".to_string(),
        task,
    }))
}

/// Delete a task
///
/// # Errors
///
/// - `403 Forbidden`: Caller isn't the owner
/// - `404 Not Found`: No such task
pub async fn delete_task(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthContext>,
    Path(id): Path<String>,
) -> ApiResult<Json<DeleteResponse>> {
    let task_id = parse_task_id(&id)?;

    state.tasks.delete(&auth, task_id).await?;

    Ok(Json(DeleteResponse {
        message: "Task deleted successfully".to_string(),
    }))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_task_id() {
        let id = Uuid::new_v4();
        assert_eq!(parse_task_id(&id.to_string()).unwrap(), id);
        assert!(matches!(parse_task_id("not-a-uuid"), Err(ApiError::NotFound(_))));
    }

    #[test]
    fn test_dashboard_response_is_camel_case() {
        let json = serde_json::to_value(DashboardResponse {
            full_name: "Ada".to_string(),
            personal_tasks_count: 2,
            assigned_tasks_count: 1,
        })
        .unwrap();

        assert_eq!(json["fullName"], "Ada");
        assert_eq!(json["personalTasksCount"], 2);
        assert_eq!(json["assignedTasksCount"], 1);
    }
}
