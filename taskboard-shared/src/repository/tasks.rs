/// Task repository
///
/// Every operation is scoped to the verified owner id taken from the session.
/// Writes validate first, then check existence and ownership with a lookup,
/// then persist, then publish a [`TaskChange`] on the feed.
///
/// # Example
///
/// ```
/// use taskboard_shared::models::task::{NewTask, Priority};
/// use taskboard_shared::repository::TaskRepository;
/// use taskboard_shared::store::Stores;
///
/// # async fn example() -> Result<(), Box<dyn std::error::Error>> {
/// let repo = TaskRepository::with_system_clock(Stores::memory().tasks);
///
/// let task = repo
///     .create("u1", NewTask {
///         title: " Buy milk ".to_string(),
///         description: None,
///         priority: Priority::Low,
///         due_date: None,
///     })
///     .await?;
/// assert_eq!(task.title, "Buy milk");
///
/// let toggled = repo.toggle_completion("u1", task.id).await?;
/// assert!(toggled.completed);
/// # Ok(())
/// # }
/// ```

use crate::clock::{Clock, SystemClock};
use crate::error::{RepositoryError, RepositoryResult, StoreError};
use crate::events::{ChangeFeed, ChangeKind, TaskChange, TaskSubscription};
use crate::models::task::{NewTask, Priority, Task, TaskFilter, TaskPatch, TaskStats};
use crate::store::{TaskChanges, TaskInsert, TaskStore};
use crate::validation::{validate_new_task, validate_patch};
use std::sync::Arc;
use tokio_util::sync::CancellationToken;
use tracing::{error, info, warn};
use uuid::Uuid;

/// Task operations over a [`TaskStore`]
#[derive(Clone)]
pub struct TaskRepository {
    store: Arc<dyn TaskStore>,
    clock: Arc<dyn Clock>,
    feed: ChangeFeed,
}

impl TaskRepository {
    /// Creates a repository publishing to `feed`
    pub fn new(store: Arc<dyn TaskStore>, clock: Arc<dyn Clock>, feed: ChangeFeed) -> Self {
        Self { store, clock, feed }
    }

    /// Repository on the system clock with a fresh feed
    pub fn with_system_clock(store: Arc<dyn TaskStore>) -> Self {
        Self::new(store, Arc::new(SystemClock), ChangeFeed::default())
    }

    /// Change feed this repository publishes to
    pub fn feed(&self) -> &ChangeFeed {
        &self.feed
    }

    /// Owner's tasks matching `filter`, newest first
    pub async fn list(&self, user_id: &str, filter: TaskFilter) -> RepositoryResult<Vec<Task>> {
        self.store
            .query_tasks(user_id, &filter)
            .await
            .map_err(store_failure)
    }

    /// All of the owner's tasks, newest first
    pub async fn list_by_owner(&self, user_id: &str) -> RepositoryResult<Vec<Task>> {
        self.list(user_id, TaskFilter::default()).await
    }

    /// Owner's tasks with the given completion flag, newest first
    pub async fn list_by_owner_and_completion(
        &self,
        user_id: &str,
        completed: bool,
    ) -> RepositoryResult<Vec<Task>> {
        self.list(user_id, TaskFilter::completed(completed)).await
    }

    /// Owner's tasks with the given priority, newest first
    pub async fn list_by_owner_and_priority(
        &self,
        user_id: &str,
        priority: Priority,
    ) -> RepositoryResult<Vec<Task>> {
        self.list(user_id, TaskFilter::priority(priority)).await
    }

    /// Single task owned by `user_id`
    pub async fn get(&self, user_id: &str, id: Uuid) -> RepositoryResult<Task> {
        self.load_owned(user_id, id).await
    }

    /// Validates and inserts a new open task
    pub async fn create(&self, user_id: &str, input: NewTask) -> RepositoryResult<Task> {
        let input = validate_new_task(input)?;

        let task = self
            .store
            .insert_task(TaskInsert {
                title: input.title,
                description: input.description,
                priority: input.priority,
                due_date: input.due_date,
                user_id: user_id.to_string(),
                created_at: self.clock.now_millis(),
            })
            .await
            .map_err(store_failure)?;

        info!(task_id = %task.id, user_id = %user_id, priority = %task.priority, "Task created");
        self.publish(&task, ChangeKind::Created);

        Ok(task)
    }

    /// Applies the supplied fields and refreshes `updated_at`
    pub async fn patch(&self, user_id: &str, id: Uuid, patch: TaskPatch) -> RepositoryResult<Task> {
        let patch = validate_patch(patch)?;
        let current = self.load_owned(user_id, id).await?;

        let changes = TaskChanges {
            title: patch.title,
            description: patch.description,
            completed: patch.completed,
            priority: patch.priority,
            due_date: patch.due_date,
        };

        let task = self.apply(&current, &changes).await?;
        info!(task_id = %id, user_id = %user_id, "Task updated");

        Ok(task)
    }

    /// Flips the committed completion flag
    pub async fn toggle_completion(&self, user_id: &str, id: Uuid) -> RepositoryResult<Task> {
        let current = self.load_owned(user_id, id).await?;

        let changes = TaskChanges {
            completed: Some(!current.completed),
            ..Default::default()
        };

        let task = self.apply(&current, &changes).await?;
        info!(task_id = %id, user_id = %user_id, completed = task.completed, "Task toggled");

        Ok(task)
    }

    /// Deletes a task; false when it was already gone
    pub async fn delete(&self, user_id: &str, id: Uuid) -> RepositoryResult<bool> {
        let current = match self.store.get_task(id).await.map_err(store_failure)? {
            Some(task) => task,
            None => return Ok(false),
        };
        ensure_owner(&current, user_id)?;

        let deleted = self.store.delete_task(id).await.map_err(store_failure)?;
        if deleted {
            info!(task_id = %id, user_id = %user_id, "Task deleted");
            self.publish(&current, ChangeKind::Deleted);
        }

        Ok(deleted)
    }

    /// Dashboard counters for the owner's tasks
    pub async fn stats(&self, user_id: &str) -> RepositoryResult<TaskStats> {
        let tasks = self.list_by_owner(user_id).await?;
        Ok(TaskStats::from_tasks(&tasks, self.clock.now_millis()))
    }

    /// Live view of the owner's tasks matching `filter`
    pub fn subscribe(&self, user_id: &str, filter: TaskFilter) -> TaskSubscription {
        self.subscribe_until(user_id, filter, CancellationToken::new())
    }

    /// Like [`subscribe`](Self::subscribe), ending when `cancel_token` is cancelled
    ///
    /// Pass a child of a server-wide token so open subscriptions end on shutdown.
    pub fn subscribe_until(
        &self,
        user_id: &str,
        filter: TaskFilter,
        cancel_token: CancellationToken,
    ) -> TaskSubscription {
        let receiver = self.feed.subscribe();
        TaskSubscription::new(self.clone(), user_id.to_string(), filter, receiver, cancel_token)
    }

    /// Store connectivity check
    pub async fn health_check(&self) -> RepositoryResult<()> {
        self.store.ping().await.map_err(RepositoryError::from)
    }

    async fn load_owned(&self, user_id: &str, id: Uuid) -> RepositoryResult<Task> {
        let task = self
            .store
            .get_task(id)
            .await
            .map_err(store_failure)?
            .ok_or_else(|| {
                warn!(task_id = %id, "Task not found");
                RepositoryError::task_not_found(id)
            })?;

        ensure_owner(&task, user_id)?;
        Ok(task)
    }

    async fn apply(&self, current: &Task, changes: &TaskChanges) -> RepositoryResult<Task> {
        let updated_at = self.next_updated_at(current.updated_at);

        let task = self
            .store
            .update_task(current.id, changes, updated_at)
            .await
            .map_err(store_failure)?
            // Deleted between the lookup and the update
            .ok_or_else(|| RepositoryError::task_not_found(current.id))?;

        self.publish(&task, ChangeKind::Updated);
        Ok(task)
    }

    /// Strictly after the previous value, even when the clock has not moved
    fn next_updated_at(&self, previous: i64) -> i64 {
        self.clock.now_millis().max(previous + 1)
    }

    fn publish(&self, task: &Task, kind: ChangeKind) {
        self.feed
            .publish(TaskChange::new(task.user_id.clone(), task.id, kind));
    }
}

fn ensure_owner(task: &Task, user_id: &str) -> RepositoryResult<()> {
    if task.user_id != user_id {
        warn!(task_id = %task.id, user_id = %user_id, "Task owned by another user");
        return Err(RepositoryError::Forbidden { entity: "task" });
    }
    Ok(())
}

fn store_failure(err: StoreError) -> RepositoryError {
    error!(error = %err, "Task store call failed");
    RepositoryError::StoreUnavailable(err)
}
