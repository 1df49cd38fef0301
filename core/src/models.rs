use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::str::FromStr;

/// A persisted task row.
///
/// `id`, `created_at` and `updated_at` are always produced by storage. The
/// `updated_at` column is maintained by a database trigger, so application
/// code never writes it.
///
/// # Examples
///
/// ```rust
/// use task_core::models::{Task, TaskPriority, TaskStatus};
/// use chrono::Utc;
///
/// let now = Utc::now();
/// let task = Task {
///     id: 1,
///     title: "Learn Docker".to_string(),
///     description: None,
///     status: TaskStatus::Pending,
///     priority: TaskPriority::High,
///     created_at: now,
///     updated_at: now,
///     due_date: None,
/// };
///
/// assert!(!task.is_overdue_at(now));
/// ```
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Task {
    /// Auto-increment primary key
    pub id: i32,
    /// Short title, 1-255 characters
    pub title: String,
    /// Optional free text, at most 1000 characters
    pub description: Option<String>,
    /// Workflow status
    pub status: TaskStatus,
    /// Priority bucket
    pub priority: TaskPriority,
    /// Creation timestamp
    pub created_at: DateTime<Utc>,
    /// Last modification timestamp (trigger-maintained)
    pub updated_at: DateTime<Utc>,
    /// Optional deadline
    pub due_date: Option<DateTime<Utc>>,
}

impl Task {
    /// A task is overdue when its deadline has passed and it is not completed.
    pub fn is_overdue_at(&self, now: DateTime<Utc>) -> bool {
        match self.due_date {
            Some(due) => due < now && self.status != TaskStatus::Completed,
            None => false,
        }
    }
}

/// Task workflow status.
///
/// Stored as lowercase snake_case text guarded by a CHECK constraint.
#[derive(Debug, Clone, Copy, Hash, Serialize, Deserialize, PartialEq, Eq, Default)]
#[serde(rename_all = "snake_case")]
pub enum TaskStatus {
    #[default]
    Pending,
    InProgress,
    Completed,
}

impl TaskStatus {
    /// Every accepted value, in declaration order
    pub const ALL: [TaskStatus; 3] = [
        TaskStatus::Pending,
        TaskStatus::InProgress,
        TaskStatus::Completed,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            TaskStatus::Pending => "pending",
            TaskStatus::InProgress => "in_progress",
            TaskStatus::Completed => "completed",
        }
    }
}

impl FromStr for TaskStatus {
    type Err = ();

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "pending" => Ok(TaskStatus::Pending),
            "in_progress" => Ok(TaskStatus::InProgress),
            "completed" => Ok(TaskStatus::Completed),
            _ => Err(()),
        }
    }
}

impl std::fmt::Display for TaskStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Task priority bucket.
#[derive(Debug, Clone, Copy, Hash, Serialize, Deserialize, PartialEq, Eq, Default)]
#[serde(rename_all = "snake_case")]
pub enum TaskPriority {
    Low,
    #[default]
    Medium,
    High,
}

impl TaskPriority {
    /// Every accepted value, in declaration order
    pub const ALL: [TaskPriority; 3] = [TaskPriority::Low, TaskPriority::Medium, TaskPriority::High];

    pub fn as_str(&self) -> &'static str {
        match self {
            TaskPriority::Low => "low",
            TaskPriority::Medium => "medium",
            TaskPriority::High => "high",
        }
    }
}

impl FromStr for TaskPriority {
    type Err = ();

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "low" => Ok(TaskPriority::Low),
            "medium" => Ok(TaskPriority::Medium),
            "high" => Ok(TaskPriority::High),
            _ => Err(()),
        }
    }
}

impl std::fmt::Display for TaskPriority {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Validated data for inserting a task
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct NewTask {
    pub title: String,
    pub description: Option<String>,
    #[serde(default)]
    pub status: TaskStatus,
    #[serde(default)]
    pub priority: TaskPriority,
    pub due_date: Option<DateTime<Utc>>,
}

impl NewTask {
    /// Create a NewTask with default status and priority
    pub fn new(title: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            description: None,
            status: TaskStatus::default(),
            priority: TaskPriority::default(),
            due_date: None,
        }
    }
}

/// Validated partial update.
///
/// Outer `None` means "leave the column alone". For the nullable columns the
/// inner `None` clears the stored value.
#[derive(Debug, Clone, Serialize, Deserialize, Default, PartialEq)]
pub struct UpdateTask {
    pub title: Option<String>,
    pub description: Option<Option<String>>,
    pub status: Option<TaskStatus>,
    pub priority: Option<TaskPriority>,
    pub due_date: Option<Option<DateTime<Utc>>>,
}

impl UpdateTask {
    pub fn new() -> Self {
        Self::default()
    }

    /// True when no recognized field was supplied
    pub fn is_empty(&self) -> bool {
        self.changed_fields().is_empty()
    }

    /// Names of the columns this update touches, in a fixed order
    pub fn changed_fields(&self) -> Vec<&'static str> {
        let mut fields = Vec::new();
        if self.title.is_some() {
            fields.push("title");
        }
        if self.description.is_some() {
            fields.push("description");
        }
        if self.status.is_some() {
            fields.push("status");
        }
        if self.priority.is_some() {
            fields.push("priority");
        }
        if self.due_date.is_some() {
            fields.push("due_date");
        }
        fields
    }

    /// Apply the supplied fields to an in-memory task.
    ///
    /// Storage implementations that cannot run the trigger (the test mock)
    /// use this to mirror the SQL semantics.
    pub fn apply_to(&self, task: &mut Task) {
        if let Some(title) = &self.title {
            task.title = title.clone();
        }
        if let Some(description) = &self.description {
            task.description = description.clone();
        }
        if let Some(status) = self.status {
            task.status = status;
        }
        if let Some(priority) = self.priority {
            task.priority = priority;
        }
        if let Some(due_date) = self.due_date {
            task.due_date = due_date;
        }
    }
}

/// Equality filters for listing tasks.
///
/// Values are kept as raw strings: an unrecognized status or priority is not
/// rejected, it simply matches no rows.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct TaskFilter {
    pub status: Option<String>,
    pub priority: Option<String>,
}

impl TaskFilter {
    pub fn matches(&self, task: &Task) -> bool {
        let status_ok = self
            .status
            .as_deref()
            .map_or(true, |s| s == task.status.as_str());
        let priority_ok = self
            .priority
            .as_deref()
            .map_or(true, |p| p == task.priority.as_str());
        status_ok && priority_ok
    }
}

/// Requested page of a listing
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub struct PageRequest {
    pub page: i64,
    pub limit: i64,
}

impl PageRequest {
    pub const DEFAULT_PAGE: i64 = 1;
    pub const DEFAULT_LIMIT: i64 = 10;

    /// Build a page request from raw query-string values.
    ///
    /// Missing, non-numeric and non-positive values fall back to the
    /// defaults. No upper bound is applied to `limit`.
    pub fn from_query(page: Option<&str>, limit: Option<&str>) -> Self {
        fn positive(raw: Option<&str>, default: i64) -> i64 {
            raw.and_then(|v| v.trim().parse::<i64>().ok())
                .filter(|v| *v > 0)
                .unwrap_or(default)
        }

        Self {
            page: positive(page, Self::DEFAULT_PAGE),
            limit: positive(limit, Self::DEFAULT_LIMIT),
        }
    }

    /// Rows to skip before this page starts
    pub fn offset(&self) -> i64 {
        (self.page - 1).saturating_mul(self.limit)
    }
}

impl Default for PageRequest {
    fn default() -> Self {
        Self {
            page: Self::DEFAULT_PAGE,
            limit: Self::DEFAULT_LIMIT,
        }
    }
}

/// Pagination block returned next to a page of tasks
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub struct Pagination {
    pub page: i64,
    pub limit: i64,
    pub total: i64,
    pub pages: i64,
}

impl Pagination {
    pub fn new(request: PageRequest, total: i64) -> Self {
        let pages = if total <= 0 {
            0
        } else {
            (total - 1) / request.limit + 1
        };

        Self {
            page: request.page,
            limit: request.limit,
            total,
            pages,
        }
    }
}

/// One page of a task listing
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct TaskPage {
    pub tasks: Vec<Task>,
    pub pagination: Pagination,
}
