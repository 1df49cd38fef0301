//! Mock implementation of TaskRepository trait
//!
//! Provides a thread-safe in-memory repository with:
//! - Error injection capabilities
//! - Call tracking for verification
//! - Switchable availability for health probe tests
//! - Ordering, filtering and pagination that mirror the SQL implementation

use async_trait::async_trait;
use chrono::{Duration, Utc};
use parking_lot::Mutex;
use std::collections::HashMap;
use std::sync::{
    atomic::{AtomicBool, AtomicI32, Ordering},
    Arc,
};
use task_core::{
    NewTask, PageRequest, Result, Task, TaskError, TaskFilter, TaskPriority, TaskRepository,
    TaskStats, TaskStatus, UpdateTask,
};

/// Mock implementation of TaskRepository for testing
///
/// Clones share the same underlying state, so a test can keep a handle
/// while the server under test owns another.
#[derive(Clone)]
pub struct MockTaskRepository {
    tasks: Arc<Mutex<HashMap<i32, Task>>>,
    next_id: Arc<AtomicI32>,
    available: Arc<AtomicBool>,
    error_injection: Arc<Mutex<Option<TaskError>>>,
    call_history: Arc<Mutex<Vec<String>>>,
}

impl Default for MockTaskRepository {
    fn default() -> Self {
        Self::new()
    }
}

impl MockTaskRepository {
    /// Create a new empty mock repository
    pub fn new() -> Self {
        Self::with_next_id(1)
    }

    /// Create mock repository with pre-populated tasks
    pub fn with_tasks(tasks: Vec<Task>) -> Self {
        let max_id = tasks.iter().map(|t| t.id).max().unwrap_or(0);
        let repo = Self::with_next_id(max_id + 1);
        {
            let mut map = repo.tasks.lock();
            for task in tasks {
                map.insert(task.id, task);
            }
        }
        repo
    }

    /// Create mock repository with specific starting ID
    pub fn with_next_id(next_id: i32) -> Self {
        Self {
            tasks: Arc::new(Mutex::new(HashMap::new())),
            next_id: Arc::new(AtomicI32::new(next_id)),
            available: Arc::new(AtomicBool::new(true)),
            error_injection: Arc::new(Mutex::new(None)),
            call_history: Arc::new(Mutex::new(Vec::new())),
        }
    }

    /// Insert a fully formed task as-is, bypassing id assignment
    pub fn insert_task(&self, task: Task) {
        self.next_id.fetch_max(task.id + 1, Ordering::SeqCst);
        self.tasks.lock().insert(task.id, task);
    }

    /// Number of stored tasks
    pub fn task_count(&self) -> usize {
        self.tasks.lock().len()
    }

    /// Simulate the database going away or coming back.
    ///
    /// While unavailable, `health_check` fails and every other operation
    /// returns `TaskError::Unavailable`.
    pub fn set_available(&self, available: bool) {
        self.available.store(available, Ordering::SeqCst);
    }

    /// Inject error for next operation
    pub fn inject_error(&self, error: TaskError) {
        *self.error_injection.lock() = Some(error);
    }

    /// Clear error injection
    pub fn clear_error(&self) {
        *self.error_injection.lock() = None;
    }

    /// Get history of called methods
    pub fn call_history(&self) -> Vec<String> {
        self.call_history.lock().clone()
    }

    /// Clear call history
    pub fn clear_history(&self) {
        self.call_history.lock().clear();
    }

    /// Assert method was called
    pub fn assert_called(&self, method: &str) {
        let history = self.call_history.lock();
        assert!(
            history.iter().any(|call| call.starts_with(method)),
            "Method '{}' was not called. Call history: {:?}",
            method,
            *history
        );
    }

    /// Assert method was never called
    pub fn assert_not_called(&self, method: &str) {
        let history = self.call_history.lock();
        assert!(
            !history.iter().any(|call| call.starts_with(method)),
            "Method '{}' was called unexpectedly. Call history: {:?}",
            method,
            *history
        );
    }

    /// Check availability and injected errors, consuming the injection
    fn check_error_injection(&self) -> Result<()> {
        if !self.available.load(Ordering::SeqCst) {
            return Err(TaskError::Unavailable("database not available".to_string()));
        }
        if let Some(error) = self.error_injection.lock().take() {
            return Err(error);
        }
        Ok(())
    }

    fn record_call(&self, method: &str) {
        self.call_history.lock().push(format!("{method}()"));
    }

    fn record_call_with_params(&self, method: &str, params: &str) {
        self.call_history.lock().push(format!("{method}({params})"));
    }

    /// Matching tasks, newest first with id as tie breaker
    fn sorted_matching(&self, filter: &TaskFilter) -> Vec<Task> {
        let tasks = self.tasks.lock();
        let mut matching: Vec<Task> = tasks.values().filter(|t| filter.matches(t)).cloned().collect();
        matching.sort_by(|a, b| b.created_at.cmp(&a.created_at).then(b.id.cmp(&a.id)));
        matching
    }
}

#[async_trait]
impl TaskRepository for MockTaskRepository {
    async fn create(&self, task: NewTask) -> Result<Task> {
        self.record_call_with_params("create", &format!("title={}", task.title));
        self.check_error_injection()?;

        let id = self.next_id.fetch_add(1, Ordering::SeqCst);
        let now = Utc::now();

        let new_task = Task {
            id,
            title: task.title,
            description: task.description,
            status: task.status,
            priority: task.priority,
            created_at: now,
            updated_at: now,
            due_date: task.due_date,
        };

        self.tasks.lock().insert(id, new_task.clone());
        Ok(new_task)
    }

    async fn update(&self, id: i32, updates: UpdateTask) -> Result<Task> {
        self.record_call_with_params(
            "update",
            &format!("id={id}, fields={}", updates.changed_fields().join(",")),
        );
        self.check_error_injection()?;

        if updates.is_empty() {
            return Err(TaskError::NoFieldsToUpdate);
        }

        let mut tasks = self.tasks.lock();
        let task = tasks.get_mut(&id).ok_or_else(|| TaskError::not_found_id(id))?;

        updates.apply_to(task);

        // Mirror the trigger: updated_at strictly advances on every update
        let now = Utc::now();
        task.updated_at = if now > task.updated_at {
            now
        } else {
            task.updated_at + Duration::microseconds(1)
        };

        Ok(task.clone())
    }

    async fn get_by_id(&self, id: i32) -> Result<Option<Task>> {
        self.record_call_with_params("get_by_id", &format!("id={id}"));
        self.check_error_injection()?;

        Ok(self.tasks.lock().get(&id).cloned())
    }

    async fn list(&self, filter: &TaskFilter, page: PageRequest) -> Result<Vec<Task>> {
        self.record_call_with_params(
            "list",
            &format!("filter={filter:?}, page={}, limit={}", page.page, page.limit),
        );
        self.check_error_injection()?;

        let offset = usize::try_from(page.offset()).unwrap_or(0);
        let limit = usize::try_from(page.limit).unwrap_or(usize::MAX);

        Ok(self
            .sorted_matching(filter)
            .into_iter()
            .skip(offset)
            .take(limit)
            .collect())
    }

    async fn count(&self, filter: &TaskFilter) -> Result<i64> {
        self.record_call_with_params("count", &format!("filter={filter:?}"));
        self.check_error_injection()?;

        let tasks = self.tasks.lock();
        Ok(tasks.values().filter(|t| filter.matches(t)).count() as i64)
    }

    async fn delete(&self, id: i32) -> Result<Option<Task>> {
        self.record_call_with_params("delete", &format!("id={id}"));
        self.check_error_injection()?;

        Ok(self.tasks.lock().remove(&id))
    }

    async fn get_stats(&self) -> Result<TaskStats> {
        self.record_call("get_stats");
        self.check_error_injection()?;

        let now = Utc::now();
        let tasks = self.tasks.lock();
        let count = |predicate: &dyn Fn(&Task) -> bool| tasks.values().filter(|t| predicate(t)).count() as i64;

        Ok(TaskStats {
            total_tasks: tasks.len() as i64,
            pending_tasks: count(&|t| t.status == TaskStatus::Pending),
            in_progress_tasks: count(&|t| t.status == TaskStatus::InProgress),
            completed_tasks: count(&|t| t.status == TaskStatus::Completed),
            high_priority_tasks: count(&|t| t.priority == TaskPriority::High),
            overdue_tasks: count(&|t| t.is_overdue_at(now)),
        })
    }

    async fn health_check(&self) -> Result<()> {
        self.record_call("health_check");
        self.check_error_injection()
    }
}
