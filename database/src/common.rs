use crate::schema::TASK_COLUMNS;
use chrono::{DateTime, Utc};
use sqlx::{postgres::PgRow, Postgres, QueryBuilder, Row};
use task_core::{
    error::{Result, TaskError},
    models::{PageRequest, Task, TaskFilter, TaskPriority, TaskStatus, UpdateTask},
};

/// PostgreSQL SQLSTATE for a CHECK constraint violation
const CHECK_VIOLATION: &str = "23514";

/// Convert string from database to TaskStatus enum
pub fn string_to_status(s: &str) -> Result<TaskStatus> {
    s.parse::<TaskStatus>()
        .map_err(|_| TaskError::Database(format!("Invalid task status in database: {s}")))
}

/// Convert string from database to TaskPriority enum
pub fn string_to_priority(s: &str) -> Result<TaskPriority> {
    s.parse::<TaskPriority>()
        .map_err(|_| TaskError::Database(format!("Invalid task priority in database: {s}")))
}

/// Convert a PostgreSQL row to the Task model
pub fn row_to_task(row: &PgRow) -> Result<Task> {
    let status: String = row.try_get("status").map_err(sqlx_error_to_task_error)?;
    let priority: String = row.try_get("priority").map_err(sqlx_error_to_task_error)?;
    let created_at: DateTime<Utc> = row.try_get("created_at").map_err(sqlx_error_to_task_error)?;
    let updated_at: DateTime<Utc> = row.try_get("updated_at").map_err(sqlx_error_to_task_error)?;
    let due_date: Option<DateTime<Utc>> =
        row.try_get("due_date").map_err(sqlx_error_to_task_error)?;

    Ok(Task {
        id: row.try_get("id").map_err(sqlx_error_to_task_error)?,
        title: row.try_get("title").map_err(sqlx_error_to_task_error)?,
        description: row.try_get("description").map_err(sqlx_error_to_task_error)?,
        status: string_to_status(&status)?,
        priority: string_to_priority(&priority)?,
        created_at,
        updated_at,
        due_date,
    })
}

/// Convert SQLx error to TaskError
///
/// Connectivity failures become `Unavailable`; everything else is a
/// `Database` error whose text stays server-side.
pub fn sqlx_error_to_task_error(err: sqlx::Error) -> TaskError {
    match &err {
        sqlx::Error::Database(db_err) => {
            if db_err.code().as_deref() == Some(CHECK_VIOLATION) {
                TaskError::Database(format!("Check constraint violated: {}", db_err.message()))
            } else {
                TaskError::Database(format!("Database error: {}", db_err.message()))
            }
        }
        sqlx::Error::RowNotFound => {
            TaskError::Database("Unexpected RowNotFound error".to_string())
        }
        sqlx::Error::PoolTimedOut => TaskError::Unavailable("Connection pool timeout".to_string()),
        sqlx::Error::PoolClosed => TaskError::Unavailable("Connection pool closed".to_string()),
        sqlx::Error::Io(io_err) => TaskError::Unavailable(format!("Database I/O error: {io_err}")),
        sqlx::Error::Tls(tls_err) => TaskError::Unavailable(format!("Database TLS error: {tls_err}")),
        _ => TaskError::Database(format!("Database operation failed: {err}")),
    }
}

/// Append `WHERE` conditions for the equality filters.
///
/// Filter values are bound as parameters, never spliced into the SQL text.
pub fn push_filter_conditions(query_builder: &mut QueryBuilder<'_, Postgres>, filter: &TaskFilter) {
    let mut has_conditions = false;

    if let Some(status) = &filter.status {
        query_builder.push(" WHERE status = ");
        query_builder.push_bind(status.clone());
        has_conditions = true;
    }

    if let Some(priority) = &filter.priority {
        if has_conditions {
            query_builder.push(" AND ");
        } else {
            query_builder.push(" WHERE ");
        }
        query_builder.push("priority = ");
        query_builder.push_bind(priority.clone());
    }
}

/// Build the paginated listing query, newest first
pub fn build_list_query(filter: &TaskFilter, page: PageRequest) -> QueryBuilder<'static, Postgres> {
    let mut query_builder: QueryBuilder<'static, Postgres> =
        QueryBuilder::new(format!("SELECT {TASK_COLUMNS} FROM tasks"));

    push_filter_conditions(&mut query_builder, filter);

    query_builder.push(" ORDER BY created_at DESC, id DESC");
    query_builder.push(" LIMIT ");
    query_builder.push_bind(page.limit);
    query_builder.push(" OFFSET ");
    query_builder.push_bind(page.offset());

    query_builder
}

/// Build the COUNT query over the same filters as [`build_list_query`]
pub fn build_count_query(filter: &TaskFilter) -> QueryBuilder<'static, Postgres> {
    let mut query_builder: QueryBuilder<'static, Postgres> =
        QueryBuilder::new("SELECT COUNT(*) AS total FROM tasks");

    push_filter_conditions(&mut query_builder, filter);

    query_builder
}

/// Build a partial UPDATE from the whitelisted fields of `updates`.
///
/// Each recognized field maps to exactly one typed setter. `updated_at` is
/// left to the trigger. Returns `None` when nothing would change.
pub fn build_update_query(id: i32, updates: &UpdateTask) -> Option<QueryBuilder<'static, Postgres>> {
    if updates.is_empty() {
        return None;
    }

    let mut query_builder: QueryBuilder<'static, Postgres> = QueryBuilder::new("UPDATE tasks SET ");
    {
        let mut setters = query_builder.separated(", ");

        if let Some(title) = &updates.title {
            setters.push("title = ");
            setters.push_bind_unseparated(title.clone());
        }
        if let Some(description) = &updates.description {
            setters.push("description = ");
            setters.push_bind_unseparated(description.clone());
        }
        if let Some(status) = updates.status {
            setters.push("status = ");
            setters.push_bind_unseparated(status.as_str());
        }
        if let Some(priority) = updates.priority {
            setters.push("priority = ");
            setters.push_bind_unseparated(priority.as_str());
        }
        if let Some(due_date) = updates.due_date {
            setters.push("due_date = ");
            setters.push_bind_unseparated(due_date);
        }
    }

    query_builder.push(" WHERE id = ");
    query_builder.push_bind(id);
    query_builder.push(format!(" RETURNING {TASK_COLUMNS}"));

    Some(query_builder)
}

/// Single aggregate query backing the stats summary
pub const STATS_QUERY: &str = r#"
SELECT
    COUNT(*) AS total_tasks,
    COUNT(*) FILTER (WHERE status = 'pending') AS pending_tasks,
    COUNT(*) FILTER (WHERE status = 'in_progress') AS in_progress_tasks,
    COUNT(*) FILTER (WHERE status = 'completed') AS completed_tasks,
    COUNT(*) FILTER (WHERE priority = 'high') AS high_priority_tasks,
    COUNT(*) FILTER (WHERE due_date < NOW() AND status != 'completed') AS overdue_tasks
FROM tasks
"#;

#[cfg(test)]
mod tests {
    use super::*;
    use sqlx::Execute;

    #[test]
    fn test_enum_conversions() {
        for status in TaskStatus::ALL {
            assert_eq!(string_to_status(status.as_str()).unwrap(), status);
        }
        for priority in TaskPriority::ALL {
            assert_eq!(string_to_priority(priority.as_str()).unwrap(), priority);
        }
        assert!(string_to_status("Invalid").is_err());
        assert!(string_to_priority("urgent").is_err());
    }

    #[test]
    fn test_list_query_without_filters() {
        let mut query_builder = build_list_query(&TaskFilter::default(), PageRequest::default());
        let query = query_builder.build();
        let sql = query.sql();

        assert!(sql.starts_with("SELECT id, title"));
        assert!(!sql.contains("WHERE"));
        assert!(sql.contains("ORDER BY created_at DESC, id DESC"));
        assert!(sql.contains("LIMIT $1"));
        assert!(sql.contains("OFFSET $2"));
    }

    #[test]
    fn test_list_query_with_both_filters() {
        let filter = TaskFilter {
            status: Some("pending".to_string()),
            priority: Some("high".to_string()),
        };
        let mut query_builder = build_list_query(&filter, PageRequest { page: 2, limit: 5 });
        let query = query_builder.build();
        let sql = query.sql();

        assert!(sql.contains("WHERE status = $1 AND priority = $2"));
        assert!(sql.contains("LIMIT $3 OFFSET $4"));
    }

    #[test]
    fn test_count_query_shares_filters() {
        let filter = TaskFilter {
            status: None,
            priority: Some("low".to_string()),
        };
        let mut query_builder = build_count_query(&filter);
        let query = query_builder.build();
        assert_eq!(
            query.sql(),
            "SELECT COUNT(*) AS total FROM tasks WHERE priority = $1"
        );
    }

    #[test]
    fn test_filter_values_are_bound_not_interpolated() {
        let filter = TaskFilter {
            status: Some("pending'; DROP TABLE tasks; --".to_string()),
            priority: None,
        };
        let mut query_builder = build_count_query(&filter);
        let query = query_builder.build();
        assert!(!query.sql().contains("DROP TABLE"));
    }

    #[test]
    fn test_update_query_only_sets_supplied_fields() {
        let updates = UpdateTask {
            status: Some(TaskStatus::InProgress),
            due_date: Some(None),
            ..Default::default()
        };
        let mut query_builder = build_update_query(7, &updates).unwrap();
        let query = query_builder.build();
        let sql = query.sql();

        assert!(sql.starts_with("UPDATE tasks SET status = $1, due_date = $2 WHERE id = $3"));
        assert!(sql.contains("RETURNING id, title"));
        assert!(!sql.contains("title ="));
        assert!(!sql.contains("updated_at ="));
    }

    #[test]
    fn test_update_query_field_order_is_fixed() {
        let updates = UpdateTask {
            title: Some("New".to_string()),
            description: Some(Some("Desc".to_string())),
            status: Some(TaskStatus::Completed),
            priority: Some(TaskPriority::Low),
            due_date: Some(Some(Utc::now())),
        };
        let mut query_builder = build_update_query(1, &updates).unwrap();
        let query = query_builder.build();
        assert!(query.sql().starts_with(
            "UPDATE tasks SET title = $1, description = $2, status = $3, priority = $4, due_date = $5 WHERE id = $6"
        ));
    }

    #[test]
    fn test_empty_update_builds_nothing() {
        assert!(build_update_query(1, &UpdateTask::default()).is_none());
    }

    #[test]
    fn test_error_mapping() {
        assert!(matches!(
            sqlx_error_to_task_error(sqlx::Error::PoolTimedOut),
            TaskError::Unavailable(_)
        ));
        assert!(matches!(
            sqlx_error_to_task_error(sqlx::Error::PoolClosed),
            TaskError::Unavailable(_)
        ));
        assert!(matches!(
            sqlx_error_to_task_error(sqlx::Error::RowNotFound),
            TaskError::Database(_)
        ));
    }
}
