/// Task model and database operations
///
/// A task is created by one user (its owner) and is either kept for
/// themselves (`personal`) or assigned to somebody else by email (`others`).
///
/// # Status
///
/// ```text
/// pending ⇄ in-progress ⇄ completed
/// ```
///
/// Any status may overwrite any other; stepping forward or back is decided by
/// the client.
///
/// # Schema
///
/// ```sql
/// CREATE TYPE task_assignment AS ENUM ('personal', 'others');
/// CREATE TYPE task_status AS ENUM ('pending', 'in-progress', 'completed');
///
/// CREATE TABLE tasks (
///     id UUID PRIMARY KEY DEFAULT gen_random_uuid(),
///     name TEXT NOT NULL,
///     description TEXT NOT NULL,
///     assigned_to task_assignment NOT NULL,
///     assignee_email VARCHAR(255),
///     status task_status NOT NULL DEFAULT 'pending',
///     assigned_by UUID NOT NULL,
///     created_at TIMESTAMPTZ NOT NULL DEFAULT NOW()
/// );
/// ```
///
/// `assigned_by` has no foreign key. Deleting a user leaves their tasks in
/// place and listings show the owner as "Unknown".

use chrono::{DateTime, Utc};
use regex::Regex;
use serde::{Deserialize, Serialize};
use sqlx::PgPool;
use std::{fmt, str::FromStr, sync::OnceLock};
use uuid::Uuid;

use super::FieldError;

/// Placeholder shown when a task's owner no longer exists
pub const UNKNOWN_OWNER: &str = "Unknown";

/// Who a task is for
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, sqlx::Type)]
#[sqlx(type_name = "task_assignment", rename_all = "lowercase")]
#[serde(rename_all = "lowercase")]
pub enum AssignmentMode {
    /// Kept by the owner
    Personal,

    /// Delegated to the assignee email
    Others,
}

impl AssignmentMode {
    pub fn as_str(&self) -> &'static str {
        match self {
            AssignmentMode::Personal => "personal",
            AssignmentMode::Others => "others",
        }
    }
}

impl FromStr for AssignmentMode {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "personal" => Ok(AssignmentMode::Personal),
            "others" => Ok(AssignmentMode::Others),
            _ => Err("Invalid assignment type".to_string()),
        }
    }
}

/// Task progress
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize, sqlx::Type)]
#[sqlx(type_name = "task_status", rename_all = "kebab-case")]
#[serde(rename_all = "kebab-case")]
pub enum TaskStatus {
    #[default]
    Pending,
    InProgress,
    Completed,
}

impl TaskStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            TaskStatus::Pending => "pending",
            TaskStatus::InProgress => "in-progress",
            TaskStatus::Completed => "completed",
        }
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
        match s {
            "pending" => Ok(TaskStatus::Pending),
            "in-progress" => Ok(TaskStatus::InProgress),
            "completed" => Ok(TaskStatus::Completed),
            _ => Err("Invalid task status".to_string()),
        }
    }
}

fn email_pattern() -> Option<&'static Regex> {
    static PATTERN: OnceLock<Option<Regex>> = OnceLock::new();
    PATTERN
        .get_or_init(|| Regex::new(r"^[^\s@]+@[^\s@]+\.[^\s@]+$").ok())
        .as_ref()
}

/// Basic `local@domain.tld` email check
///
/// # Example
///
/// ```
/// use tasktrack_shared::models::task::is_valid_email;
///
/// assert!(is_valid_email("bob@example.com"));
/// assert!(!is_valid_email("not-an-email"));
/// ```
pub fn is_valid_email(email: &str) -> bool {
    email_pattern().is_some_and(|re| re.is_match(email))
}

/// Task model
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, sqlx::FromRow)]
#[serde(rename_all = "camelCase")]
pub struct Task {
    /// Unique task ID
    pub id: Uuid,

    pub name: String,

    pub description: String,

    /// Assignment mode
    pub assigned_to: AssignmentMode,

    /// Normalized assignee email, only present for `others` tasks
    #[serde(skip_serializing_if = "Option::is_none")]
    pub assignee_email: Option<String>,

    pub status: TaskStatus,

    /// Owning identity (creator's user ID), immutable
    pub assigned_by: Uuid,

    pub created_at: DateTime<Utc>,
}

/// Task as listed for a user, with the owner's email resolved
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct VisibleTask {
    #[serde(flatten)]
    pub task: Task,

    /// Owner's email, or "Unknown" when the owner is gone
    pub assigned_by_email: String,
}

#[derive(sqlx::FromRow)]
struct VisibleTaskRow {
    #[sqlx(flatten)]
    task: Task,
    owner_email: Option<String>,
}

impl From<VisibleTaskRow> for VisibleTask {
    fn from(row: VisibleTaskRow) -> Self {
        Self {
            task: row.task,
            assigned_by_email: row.owner_email.unwrap_or_else(|| UNKNOWN_OWNER.to_string()),
        }
    }
}

/// Unvalidated task creation request
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateTaskInput {
    #[serde(default)]
    pub name: String,

    #[serde(default)]
    pub description: String,

    /// "personal" or "others"
    #[serde(default)]
    pub assigned_to: String,

    #[serde(default)]
    pub assignee_email: Option<String>,
}

/// Validated input for inserting a task
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewTask {
    pub owner: Uuid,
    pub name: String,
    pub description: String,
    pub assigned_to: AssignmentMode,
    pub assignee_email: Option<String>,
}

impl NewTask {
    /// Validates a creation request on behalf of `owner`
    ///
    /// Rules:
    /// - name and description must not be blank
    /// - `assigned_to` must be "personal" or "others"
    /// - for "others", an assignee email is required and must look like an
    ///   email; it is stored normalized
    /// - for "personal", any supplied assignee email is dropped
    ///
    /// All violations are reported at once.
    pub fn validate(owner: Uuid, input: CreateTaskInput) -> Result<Self, Vec<FieldError>> {
        let mut errors = Vec::new();

        if input.name.trim().is_empty() {
            errors.push(FieldError::new("name", "Task name is required"));
        }

        if input.description.trim().is_empty() {
            errors.push(FieldError::new("description", "Task description is required"));
        }

        let mode = match input.assigned_to.parse::<AssignmentMode>() {
            Ok(mode) => Some(mode),
            Err(message) => {
                errors.push(FieldError::new("assignedTo", message));
                None
            }
        };

        let assignee_email = match mode {
            Some(AssignmentMode::Others) => {
                let email = input
                    .assignee_email
                    .as_deref()
                    .map(super::user::normalize_email)
                    .unwrap_or_default();

                if !is_valid_email(&email) {
                    errors.push(FieldError::new(
                        "assigneeEmail",
                        "Invalid email format for assignee",
                    ));
                }
                Some(email)
            }
            _ => None,
        };

        match mode {
            Some(assigned_to) if errors.is_empty() => Ok(Self {
                owner,
                name: input.name,
                description: input.description,
                assigned_to,
                assignee_email,
            }),
            _ => Err(errors),
        }
    }
}

/// Aggregate counts shown on a user's dashboard
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TaskCounts {
    /// Personal tasks owned by the user
    pub personal_tasks_count: i64,

    /// Tasks assigned to the user's email
    pub assigned_tasks_count: i64,
}

impl Task {
    /// Creates a new task in pending state
    pub async fn create(pool: &PgPool, data: NewTask) -> Result<Self, sqlx::Error> {
        let task = sqlx::query_as::<_, Task>(
            r#"
            INSERT INTO tasks (name, description, assigned_to, assignee_email, assigned_by)
            VALUES ($1, $2, $3, $4, $5)
            RETURNING id, name, description, assigned_to, assignee_email, status,
                      assigned_by, created_at
            "#,
        )
        .bind(data.name)
        .bind(data.description)
        .bind(data.assigned_to)
        .bind(data.assignee_email)
        .bind(data.owner)
        .fetch_one(pool)
        .await?;

        Ok(task)
    }

    /// Finds a task by ID
    pub async fn find_by_id(pool: &PgPool, id: Uuid) -> Result<Option<Self>, sqlx::Error> {
        let task = sqlx::query_as::<_, Task>(
            r#"
            SELECT id, name, description, assigned_to, assignee_email, status,
                   assigned_by, created_at
            FROM tasks
            WHERE id = $1
            "#,
        )
        .bind(id)
        .fetch_optional(pool)
        .await?;

        Ok(task)
    }

    /// Lists the tasks a user can see
    ///
    /// A task is visible when it is assigned to `email`, or when it is a
    /// personal task owned by `user_id`. Newest first.
    pub async fn list_visible(
        pool: &PgPool,
        user_id: Uuid,
        email: &str,
    ) -> Result<Vec<VisibleTask>, sqlx::Error> {
        let rows = sqlx::query_as::<_, VisibleTaskRow>(
            r#"
            SELECT t.id, t.name, t.description, t.assigned_to, t.assignee_email, t.status,
                   t.assigned_by, t.created_at, u.email AS owner_email
            FROM tasks t
            LEFT JOIN users u ON u.id = t.assigned_by
            WHERE t.assignee_email = $2
               OR (t.assigned_to = 'personal' AND t.assigned_by = $1)
            ORDER BY t.created_at DESC
            "#,
        )
        .bind(user_id)
        .bind(email)
        .fetch_all(pool)
        .await?;

        Ok(rows.into_iter().map(VisibleTask::from).collect())
    }

    /// Overwrites a task's status
    ///
    /// Returns `None` if the task doesn't exist.
    pub async fn update_status(
        pool: &PgPool,
        id: Uuid,
        status: TaskStatus,
    ) -> Result<Option<Self>, sqlx::Error> {
        let task = sqlx::query_as::<_, Task>(
            r#"
            UPDATE tasks
            SET status = $2
            WHERE id = $1
            RETURNING id, name, description, assigned_to, assignee_email, status,
                      assigned_by, created_at
            "#,
        )
        .bind(id)
        .bind(status)
        .fetch_optional(pool)
        .await?;

        Ok(task)
    }

    /// Deletes a task
    ///
    /// Returns true if a row was removed.
    pub async fn delete(pool: &PgPool, id: Uuid) -> Result<bool, sqlx::Error> {
        let result = sqlx::query("DELETE FROM tasks WHERE id = $1")
            .bind(id)
            .execute(pool)
            .await?;

        Ok(result.rows_affected() > 0)
    }

    /// Counts personal tasks owned by a user
    pub async fn count_personal_by_owner(pool: &PgPool, owner: Uuid) -> Result<i64, sqlx::Error> {
        let (count,): (i64,) = sqlx::query_as(
            "SELECT COUNT(*) FROM tasks WHERE assigned_to = 'personal' AND assigned_by = $1",
        )
        .bind(owner)
        .fetch_one(pool)
        .await?;

        Ok(count)
    }

    /// Counts tasks assigned to an email
    pub async fn count_by_assignee_email(pool: &PgPool, email: &str) -> Result<i64, sqlx::Error> {
        let (count,): (i64,) =
            sqlx::query_as("SELECT COUNT(*) FROM tasks WHERE assignee_email = $1")
                .bind(email)
                .fetch_one(pool)
                .await?;

        Ok(count)
    }
}
