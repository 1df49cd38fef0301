//! Custom assertion helpers for testing
//!
//! Provides specialized assertions for:
//! - Task equality with clear error messages
//! - Listing order and filter conformance
//! - Pagination metadata consistency

use task_core::{Pagination, Task, TaskFilter, TaskPriority, TaskStatus};

/// Assert tasks are equal ignoring timestamps
pub fn assert_task_equals(actual: &Task, expected: &Task) {
    assert_eq!(actual.id, expected.id, "Task IDs don't match");
    assert_eq!(actual.title, expected.title, "Task titles don't match");
    assert_eq!(actual.description, expected.description, "Task descriptions don't match");
    assert_eq!(actual.status, expected.status, "Task statuses don't match");
    assert_eq!(actual.priority, expected.priority, "Task priorities don't match");
    assert_eq!(actual.due_date, expected.due_date, "Task due dates don't match");
}

/// Assert task matches partial criteria
pub fn assert_task_matches(task: &Task, matcher: &TaskMatcher) {
    if let Some(expected_id) = matcher.id {
        assert_eq!(task.id, expected_id, "Task ID doesn't match expected");
    }
    if let Some(ref expected_title) = matcher.title {
        assert_eq!(task.title, *expected_title, "Task title doesn't match expected");
    }
    if let Some(expected_status) = matcher.status {
        assert_eq!(task.status, expected_status, "Task status doesn't match expected");
    }
    if let Some(expected_priority) = matcher.priority {
        assert_eq!(task.priority, expected_priority, "Task priority doesn't match expected");
    }
}

/// Assert listing order: newest `created_at` first, ties broken by higher id
pub fn assert_tasks_sorted_newest_first(tasks: &[Task]) {
    for window in tasks.windows(2) {
        let (a, b) = (&window[0], &window[1]);
        assert!(
            a.created_at > b.created_at || (a.created_at == b.created_at && a.id > b.id),
            "Tasks are not sorted newest first. Task {} ({}) comes before task {} ({})",
            a.id,
            a.created_at,
            b.id,
            b.created_at
        );
    }
}

/// Assert every task satisfies the filter
pub fn assert_tasks_match_filter(tasks: &[Task], filter: &TaskFilter) {
    for task in tasks {
        assert!(
            filter.matches(task),
            "Task {} (status={}, priority={}) does not match filter {:?}",
            task.id,
            task.status,
            task.priority,
            filter
        );
    }
}

/// Assert pagination metadata is internally consistent
pub fn assert_pagination_consistent(pagination: &Pagination) {
    assert!(pagination.page >= 1, "Page must be at least 1");
    assert!(pagination.limit >= 1, "Limit must be at least 1");
    let expected_pages = if pagination.total <= 0 {
        0
    } else {
        (pagination.total + pagination.limit - 1) / pagination.limit
    };
    assert_eq!(
        pagination.pages, expected_pages,
        "pages should be ceil(total / limit) for {pagination:?}"
    );
}

/// Flexible task matcher for partial assertions
#[derive(Debug, Default)]
pub struct TaskMatcher {
    pub id: Option<i32>,
    pub title: Option<String>,
    pub status: Option<TaskStatus>,
    pub priority: Option<TaskPriority>,
}

impl TaskMatcher {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_id(mut self, id: i32) -> Self {
        self.id = Some(id);
        self
    }

    pub fn with_title(mut self, title: impl Into<String>) -> Self {
        self.title = Some(title.into());
        self
    }

    pub fn with_status(mut self, status: TaskStatus) -> Self {
        self.status = Some(status);
        self
    }

    pub fn with_priority(mut self, priority: TaskPriority) -> Self {
        self.priority = Some(priority);
        self
    }
}
