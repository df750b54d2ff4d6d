/// Persistence capabilities
///
/// The repositories are written against these traits, not against a specific
/// database API. Two implementations ship with the crate:
///
/// - [`postgres::PgStore`]: PostgreSQL via sqlx (production)
/// - [`memory::MemoryStore`]: `RwLock`-guarded maps (tests, local development)
///
/// Stores perform no validation and no ownership checks; they only persist.
///
/// # Example
///
/// ```
/// use taskboard_shared::store::Stores;
///
/// let stores = Stores::memory();
/// # let _ = stores;
/// ```

pub mod memory;
pub mod postgres;

use crate::error::StoreError;
use crate::models::task::{Priority, Task, TaskFilter};
use crate::models::user::{UpsertUser, User};
use async_trait::async_trait;
use sqlx::PgPool;
use std::sync::Arc;
use uuid::Uuid;

/// Store result type alias
pub type StoreResult<T> = Result<T, StoreError>;

/// Validated fields for a task insert
///
/// The store assigns the id and sets `completed = false` and
/// `updated_at = created_at`.
#[derive(Debug, Clone)]
pub struct TaskInsert {
    /// Trimmed title
    pub title: String,

    /// Trimmed description
    pub description: Option<String>,

    /// Priority
    pub priority: Priority,

    /// Deadline (epoch ms)
    pub due_date: Option<i64>,

    /// Owner
    pub user_id: String,

    /// Insert instant (epoch ms)
    pub created_at: i64,
}

/// Column changes for a task update
///
/// `None` leaves a column untouched; `Some(None)` clears a nullable column.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TaskChanges {
    /// New title
    pub title: Option<String>,

    /// New description
    pub description: Option<Option<String>>,

    /// New completion flag
    pub completed: Option<bool>,

    /// New priority
    pub priority: Option<Priority>,

    /// New deadline
    pub due_date: Option<Option<i64>>,
}

/// Task persistence capability
#[async_trait]
pub trait TaskStore: Send + Sync {
    /// Inserts a task and returns the stored record
    async fn insert_task(&self, task: TaskInsert) -> StoreResult<Task>;

    /// Point lookup by id
    async fn get_task(&self, id: Uuid) -> StoreResult<Option<Task>>;

    /// Owner's tasks matching `filter`, most recently inserted first
    async fn query_tasks(&self, user_id: &str, filter: &TaskFilter) -> StoreResult<Vec<Task>>;

    /// Applies `changes` and sets `updated_at`; None when the id is missing
    async fn update_task(
        &self,
        id: Uuid,
        changes: &TaskChanges,
        updated_at: i64,
    ) -> StoreResult<Option<Task>>;

    /// Deletes by id; false when nothing was deleted
    async fn delete_task(&self, id: Uuid) -> StoreResult<bool>;

    /// Connectivity check
    async fn ping(&self) -> StoreResult<()>;
}

/// User persistence capability
#[async_trait]
pub trait UserStore: Send + Sync {
    /// Lookup by external identity
    async fn find_user(&self, user_id: &str) -> StoreResult<Option<User>>;

    /// Lookup by email (first match)
    async fn find_user_by_email(&self, email: &str) -> StoreResult<Option<User>>;

    /// Atomic create-or-refresh keyed on `user_id`
    ///
    /// Inserts with `created_at = last_seen = now`, or overwrites `email`,
    /// advances `last_seen` and overwrites `name` / `avatar` when supplied.
    async fn upsert_user(&self, profile: &UpsertUser, now: i64) -> StoreResult<UserUpsert>;

    /// Advances `last_seen`; false when the user does not exist
    async fn touch_user(&self, user_id: &str, now: i64) -> StoreResult<bool>;
}

/// Result of [`UserStore::upsert_user`]
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UserUpsert {
    /// Stored profile after the write
    pub user: User,

    /// True when the write inserted a new row
    pub created: bool,
}

/// Next `last_seen` for an existing row
///
/// Strictly after `previous` even when the clock has not moved.
pub fn next_last_seen(previous: i64, now: i64) -> i64 {
    now.max(previous + 1)
}

/// The pair of stores a deployment runs on
#[derive(Clone)]
pub struct Stores {
    /// Task store
    pub tasks: Arc<dyn TaskStore>,

    /// User store
    pub users: Arc<dyn UserStore>,
}

impl Stores {
    /// Both stores backed by one in-memory instance
    pub fn memory() -> Self {
        let store = Arc::new(memory::MemoryStore::new());
        Self {
            tasks: store.clone(),
            users: store,
        }
    }

    /// Both stores backed by one PostgreSQL pool
    pub fn postgres(pool: PgPool) -> Self {
        let store = Arc::new(postgres::PgStore::new(pool));
        Self {
            tasks: store.clone(),
            users: store,
        }
    }
}
