/// PostgreSQL store
///
/// Implements [`TaskStore`] and [`UserStore`] over a sqlx [`PgPool`].
/// Listings are served by the `(user_id, seq DESC)` index; user upserts are a
/// single `INSERT .. ON CONFLICT (user_id) DO UPDATE`, so concurrent first
/// sign-ins for one identity cannot create two rows.
///
/// # Example
///
/// ```no_run
/// use taskboard_shared::db::pool::{create_pool, DatabaseConfig};
/// use taskboard_shared::store::postgres::PgStore;
/// use taskboard_shared::store::TaskStore;
///
/// # async fn example() -> Result<(), Box<dyn std::error::Error>> {
/// let pool = create_pool(DatabaseConfig::default()).await?;
/// let store = PgStore::new(pool);
/// store.ping().await?;
/// # Ok(())
/// # }
/// ```

use super::{StoreResult, TaskChanges, TaskInsert, TaskStore, UserStore, UserUpsert};
use crate::models::task::{Task, TaskFilter};
use crate::models::user::{UpsertUser, User};
use async_trait::async_trait;
use sqlx::PgPool;
use tracing::debug;
use uuid::Uuid;

const TASK_COLUMNS: &str =
    "id, title, description, completed, priority, due_date, user_id, created_at, updated_at";

const USER_COLUMNS: &str = "user_id, email, name, avatar, created_at, last_seen";

/// Upsert row; `inserted` comes from `xmax = 0`, which holds only for a
/// freshly inserted tuple
#[derive(sqlx::FromRow)]
struct UpsertRow {
    #[sqlx(flatten)]
    user: User,
    inserted: bool,
}

/// PostgreSQL-backed store
#[derive(Debug, Clone)]
pub struct PgStore {
    pool: PgPool,
}

impl PgStore {
    /// Wraps an existing pool
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Underlying pool
    pub fn pool(&self) -> &PgPool {
        &self.pool
    }
}

#[async_trait]
impl TaskStore for PgStore {
    async fn insert_task(&self, task: TaskInsert) -> StoreResult<Task> {
        let query = format!(
            r#"
            INSERT INTO tasks (title, description, priority, due_date, user_id, created_at, updated_at)
            VALUES ($1, $2, $3, $4, $5, $6, $6)
            RETURNING {TASK_COLUMNS}
            "#
        );

        let task = sqlx::query_as::<_, Task>(&query)
            .bind(task.title)
            .bind(task.description)
            .bind(task.priority)
            .bind(task.due_date)
            .bind(task.user_id)
            .bind(task.created_at)
            .fetch_one(&self.pool)
            .await?;

        Ok(task)
    }

    async fn get_task(&self, id: Uuid) -> StoreResult<Option<Task>> {
        let query = format!("SELECT {TASK_COLUMNS} FROM tasks WHERE id = $1");

        let task = sqlx::query_as::<_, Task>(&query)
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;

        Ok(task)
    }

    async fn query_tasks(&self, user_id: &str, filter: &TaskFilter) -> StoreResult<Vec<Task>> {
        let mut query = format!("SELECT {TASK_COLUMNS} FROM tasks WHERE user_id = $1");
        let mut bind_count = 1;

        if filter.completed.is_some() {
            bind_count += 1;
            query.push_str(&format!(" AND completed = ${}", bind_count));
        }
        if filter.priority.is_some() {
            bind_count += 1;
            query.push_str(&format!(" AND priority = ${}", bind_count));
        }
        query.push_str(" ORDER BY seq DESC");

        let mut q = sqlx::query_as::<_, Task>(&query).bind(user_id);
        if let Some(completed) = filter.completed {
            q = q.bind(completed);
        }
        if let Some(priority) = filter.priority {
            q = q.bind(priority);
        }

        let tasks = q.fetch_all(&self.pool).await?;
        debug!(user_id = %user_id, count = tasks.len(), "Queried tasks");

        Ok(tasks)
    }

    async fn update_task(
        &self,
        id: Uuid,
        changes: &TaskChanges,
        updated_at: i64,
    ) -> StoreResult<Option<Task>> {
        // $1 = id, $2 = updated_at
        let mut query = String::from("UPDATE tasks SET updated_at = $2");
        let mut bind_count = 2;

        if changes.title.is_some() {
            bind_count += 1;
            query.push_str(&format!(", title = ${}", bind_count));
        }
        if changes.description.is_some() {
            bind_count += 1;
            query.push_str(&format!(", description = ${}", bind_count));
        }
        if changes.completed.is_some() {
            bind_count += 1;
            query.push_str(&format!(", completed = ${}", bind_count));
        }
        if changes.priority.is_some() {
            bind_count += 1;
            query.push_str(&format!(", priority = ${}", bind_count));
        }
        if changes.due_date.is_some() {
            bind_count += 1;
            query.push_str(&format!(", due_date = ${}", bind_count));
        }

        query.push_str(&format!(" WHERE id = $1 RETURNING {TASK_COLUMNS}"));

        let mut q = sqlx::query_as::<_, Task>(&query).bind(id).bind(updated_at);

        if let Some(ref title) = changes.title {
            q = q.bind(title.clone());
        }
        if let Some(ref description) = changes.description {
            q = q.bind(description.clone());
        }
        if let Some(completed) = changes.completed {
            q = q.bind(completed);
        }
        if let Some(priority) = changes.priority {
            q = q.bind(priority);
        }
        if let Some(due_date) = changes.due_date {
            q = q.bind(due_date);
        }

        let task = q.fetch_optional(&self.pool).await?;

        Ok(task)
    }

    async fn delete_task(&self, id: Uuid) -> StoreResult<bool> {
        let result = sqlx::query("DELETE FROM tasks WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await?;

        Ok(result.rows_affected() > 0)
    }

    async fn ping(&self) -> StoreResult<()> {
        crate::db::pool::health_check(&self.pool).await?;
        Ok(())
    }
}

#[async_trait]
impl UserStore for PgStore {
    async fn find_user(&self, user_id: &str) -> StoreResult<Option<User>> {
        let query = format!("SELECT {USER_COLUMNS} FROM users WHERE user_id = $1");

        let user = sqlx::query_as::<_, User>(&query)
            .bind(user_id)
            .fetch_optional(&self.pool)
            .await?;

        Ok(user)
    }

    async fn find_user_by_email(&self, email: &str) -> StoreResult<Option<User>> {
        let query = format!(
            "SELECT {USER_COLUMNS} FROM users WHERE email = $1 ORDER BY created_at ASC LIMIT 1"
        );

        let user = sqlx::query_as::<_, User>(&query)
            .bind(email)
            .fetch_optional(&self.pool)
            .await?;

        Ok(user)
    }

    async fn upsert_user(&self, profile: &UpsertUser, now: i64) -> StoreResult<UserUpsert> {
        let query = format!(
            r#"
            INSERT INTO users (user_id, email, name, avatar, created_at, last_seen)
            VALUES ($1, $2, $3, $4, $5, $5)
            ON CONFLICT (user_id) DO UPDATE
            SET email = EXCLUDED.email,
                name = COALESCE(EXCLUDED.name, users.name),
                avatar = COALESCE(EXCLUDED.avatar, users.avatar),
                last_seen = GREATEST(EXCLUDED.last_seen, users.last_seen + 1)
            RETURNING {USER_COLUMNS}, (xmax = 0) AS inserted
            "#
        );

        let row = sqlx::query_as::<_, UpsertRow>(&query)
            .bind(&profile.user_id)
            .bind(&profile.email)
            .bind(&profile.name)
            .bind(&profile.avatar)
            .bind(now)
            .fetch_one(&self.pool)
            .await?;

        Ok(UserUpsert {
            user: row.user,
            created: row.inserted,
        })
    }

    async fn touch_user(&self, user_id: &str, now: i64) -> StoreResult<bool> {
        let result = sqlx::query(
            "UPDATE users SET last_seen = GREATEST($2, last_seen + 1) WHERE user_id = $1",
        )
        .bind(user_id)
        .bind(now)
        .execute(&self.pool)
        .await?;

        Ok(result.rows_affected() > 0)
    }
}
