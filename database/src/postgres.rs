use crate::common::{
    build_count_query, build_list_query, build_update_query, row_to_task, sqlx_error_to_task_error,
    STATS_QUERY,
};
use crate::schema::{SCHEMA_STEPS, TASK_COLUMNS};
use async_trait::async_trait;
use sqlx::{
    postgres::{PgConnectOptions, PgPoolOptions},
    PgPool, Row,
};
use std::time::Duration;
use task_core::{
    error::{Result, TaskError},
    models::{NewTask, PageRequest, Task, TaskFilter, UpdateTask},
    repository::{TaskRepository, TaskStats},
};
use tracing::{debug, error, info, warn};

/// Upper bound on how long `shutdown` waits for checked-out connections
const SHUTDOWN_TIMEOUT: Duration = Duration::from_secs(10);

/// Connection and pool settings for PostgreSQL
#[derive(Clone)]
pub struct DatabaseSettings {
    pub host: String,
    pub port: u16,
    pub name: String,
    pub user: String,
    pub password: String,
    /// Maximum simultaneous connections
    pub max_connections: u32,
    /// Idle connections are closed after this long
    pub idle_timeout: Duration,
    /// Acquiring a connection fails after this long instead of queuing forever
    pub acquire_timeout: Duration,
}

impl Default for DatabaseSettings {
    fn default() -> Self {
        Self {
            host: "localhost".to_string(),
            port: 5432,
            name: "taskdb".to_string(),
            user: "postgres".to_string(),
            password: "postgres".to_string(),
            max_connections: 20,
            idle_timeout: Duration::from_secs(30),
            acquire_timeout: Duration::from_secs(2),
        }
    }
}

impl std::fmt::Debug for DatabaseSettings {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("DatabaseSettings")
            .field("host", &self.host)
            .field("port", &self.port)
            .field("name", &self.name)
            .field("user", &self.user)
            .field("password", &"[REDACTED]")
            .field("max_connections", &self.max_connections)
            .field("idle_timeout", &self.idle_timeout)
            .field("acquire_timeout", &self.acquire_timeout)
            .finish()
    }
}

/// Retry schedule for the startup connection loop.
///
/// After failed attempt `n` (1-based) the loop sleeps
/// `min(base_delay * 2^n, max_delay)`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RetryPolicy {
    pub max_attempts: u32,
    pub base_delay: Duration,
    pub max_delay: Duration,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            max_attempts: 10,
            base_delay: Duration::from_millis(1000),
            max_delay: Duration::from_millis(10_000),
        }
    }
}

impl RetryPolicy {
    /// Delay to wait after the given failed attempt
    pub fn delay_for(&self, attempt: u32) -> Duration {
        let factor = 1u32.checked_shl(attempt).unwrap_or(u32::MAX);
        self.base_delay
            .checked_mul(factor)
            .map_or(self.max_delay, |delay| delay.min(self.max_delay))
    }
}

/// PostgreSQL implementation of the TaskRepository trait
///
/// Owns the process-wide connection pool. Construct it once at startup,
/// call [`initialize`](Self::initialize), and share it behind an `Arc`.
#[derive(Debug, Clone)]
pub struct PostgresTaskRepository {
    pool: PgPool,
}

impl PostgresTaskRepository {
    /// Build the pool without opening any connection yet.
    ///
    /// Connections are established on first use, so this never fails;
    /// reachability is established by [`initialize`](Self::initialize).
    pub fn connect(settings: &DatabaseSettings) -> Self {
        let connect_options = PgConnectOptions::new()
            .host(&settings.host)
            .port(settings.port)
            .database(&settings.name)
            .username(&settings.user)
            .password(&settings.password)
            .application_name("task-server");

        let pool = pool_options(settings).connect_lazy_with(connect_options);

        Self { pool }
    }

    /// Build the pool from a `postgres://` URL, using the pool limits in `settings`
    pub fn connect_url(database_url: &str, settings: &DatabaseSettings) -> Result<Self> {
        let pool = pool_options(settings)
            .connect_lazy(database_url)
            .map_err(|e| TaskError::Configuration(format!("Invalid database URL: {e}")))?;

        Ok(Self { pool })
    }

    /// Wait for the database, then ensure the schema exists.
    ///
    /// Retries connection acquisition according to `policy`. Exhausting the
    /// attempts is fatal for the caller; the process must not serve
    /// requests against an uninitialized schema.
    ///
    /// # Returns
    /// * `Ok(())` - Database reachable and schema in place
    /// * `Err(TaskError::Unavailable)` - Every connection attempt failed
    /// * `Err(TaskError::Database)` - A schema statement failed
    pub async fn initialize(&self, policy: &RetryPolicy) -> Result<()> {
        let mut attempt = 0;

        loop {
            attempt += 1;
            match self.pool.acquire().await {
                Ok(connection) => {
                    drop(connection);
                    info!(attempt, "Database connection established");
                    break;
                }
                Err(e) if attempt >= policy.max_attempts => {
                    error!(
                        attempt,
                        error = %e,
                        "Database connection failed, giving up"
                    );
                    return Err(TaskError::Unavailable(format!(
                        "Could not connect to database after {attempt} attempts"
                    )));
                }
                Err(e) => {
                    let delay = policy.delay_for(attempt);
                    warn!(
                        attempt,
                        max_attempts = policy.max_attempts,
                        retry_in_ms = delay.as_millis() as u64,
                        error = %e,
                        "Database connection failed, retrying"
                    );
                    tokio::time::sleep(delay).await;
                }
            }
        }

        self.ensure_schema().await
    }

    /// Run every schema step in order. Safe to repeat on every start.
    pub async fn ensure_schema(&self) -> Result<()> {
        for (label, statement) in SCHEMA_STEPS {
            debug!(step = label, "Applying schema step");
            sqlx::query(statement)
                .execute(&self.pool)
                .await
                .map_err(|e| {
                    error!(step = label, error = %e, "Schema step failed");
                    sqlx_error_to_task_error(e)
                })?;
        }

        info!("Database schema initialized");
        Ok(())
    }

    /// Non-fatal connectivity probe for health endpoints
    pub async fn test_connection(&self) -> bool {
        match self.pool.acquire().await {
            Ok(_connection) => true,
            Err(e) => {
                warn!(error = %e, "Database connectivity probe failed");
                false
            }
        }
    }

    /// Close every pooled connection, letting checked-out ones finish.
    ///
    /// Problems are logged only; the process is exiting anyway.
    pub async fn shutdown(&self) {
        if self.pool.is_closed() {
            debug!("Database pool already closed");
            return;
        }

        info!("Closing database pool");
        match tokio::time::timeout(SHUTDOWN_TIMEOUT, self.pool.close()).await {
            Ok(()) => info!("Database pool closed"),
            Err(_) => warn!(
                timeout_secs = SHUTDOWN_TIMEOUT.as_secs(),
                "Timed out waiting for database connections to close"
            ),
        }
    }

    /// Get access to the underlying database pool for custom operations
    ///
    /// This method is primarily intended for testing scenarios where
    /// direct SQL execution is needed.
    pub fn pool(&self) -> &PgPool {
        &self.pool
    }
}

fn pool_options(settings: &DatabaseSettings) -> PgPoolOptions {
    PgPoolOptions::new()
        .max_connections(settings.max_connections)
        .idle_timeout(settings.idle_timeout)
        .acquire_timeout(settings.acquire_timeout)
}

#[async_trait]
impl TaskRepository for PostgresTaskRepository {
    async fn create(&self, task: NewTask) -> Result<Task> {
        let row = sqlx::query(&format!(
            "INSERT INTO tasks (title, description, status, priority, due_date) \
             VALUES ($1, $2, $3, $4, $5) RETURNING {TASK_COLUMNS}"
        ))
        .bind(&task.title)
        .bind(&task.description)
        .bind(task.status.as_str())
        .bind(task.priority.as_str())
        .bind(task.due_date)
        .fetch_one(&self.pool)
        .await
        .map_err(sqlx_error_to_task_error)?;

        row_to_task(&row)
    }

    async fn update(&self, id: i32, updates: UpdateTask) -> Result<Task> {
        let Some(mut query_builder) = build_update_query(id, &updates) else {
            return Err(TaskError::NoFieldsToUpdate);
        };

        let row = query_builder
            .build()
            .fetch_optional(&self.pool)
            .await
            .map_err(sqlx_error_to_task_error)?;

        match row {
            Some(row) => row_to_task(&row),
            None => Err(TaskError::not_found_id(id)),
        }
    }

    async fn get_by_id(&self, id: i32) -> Result<Option<Task>> {
        let row = sqlx::query(&format!("SELECT {TASK_COLUMNS} FROM tasks WHERE id = $1"))
            .bind(id)
            .fetch_optional(&self.pool)
            .await
            .map_err(sqlx_error_to_task_error)?;

        row.as_ref().map(row_to_task).transpose()
    }

    async fn list(&self, filter: &TaskFilter, page: PageRequest) -> Result<Vec<Task>> {
        let mut query_builder = build_list_query(filter, page);

        let rows = query_builder
            .build()
            .fetch_all(&self.pool)
            .await
            .map_err(sqlx_error_to_task_error)?;

        rows.iter().map(row_to_task).collect()
    }

    async fn count(&self, filter: &TaskFilter) -> Result<i64> {
        let mut query_builder = build_count_query(filter);

        let row = query_builder
            .build()
            .fetch_one(&self.pool)
            .await
            .map_err(sqlx_error_to_task_error)?;

        row.try_get("total").map_err(sqlx_error_to_task_error)
    }

    async fn delete(&self, id: i32) -> Result<Option<Task>> {
        let row = sqlx::query(&format!(
            "DELETE FROM tasks WHERE id = $1 RETURNING {TASK_COLUMNS}"
        ))
        .bind(id)
        .fetch_optional(&self.pool)
        .await
        .map_err(sqlx_error_to_task_error)?;

        row.as_ref().map(row_to_task).transpose()
    }

    async fn get_stats(&self) -> Result<TaskStats> {
        let row = sqlx::query(STATS_QUERY)
            .fetch_one(&self.pool)
            .await
            .map_err(sqlx_error_to_task_error)?;

        let count = |column: &str| -> Result<i64> {
            row.try_get(column).map_err(sqlx_error_to_task_error)
        };

        Ok(TaskStats {
            total_tasks: count("total_tasks")?,
            pending_tasks: count("pending_tasks")?,
            in_progress_tasks: count("in_progress_tasks")?,
            completed_tasks: count("completed_tasks")?,
            high_priority_tasks: count("high_priority_tasks")?,
            overdue_tasks: count("overdue_tasks")?,
        })
    }

    async fn health_check(&self) -> Result<()> {
        if self.test_connection().await {
            Ok(())
        } else {
            Err(TaskError::Unavailable("database not available".to_string()))
        }
    }
}
