/// In-memory store
///
/// Keeps tasks and users in `RwLock`-guarded maps. Tasks carry an insertion
/// sequence number and a per-owner index, so listing touches only the owner's
/// rows. Upserts run under a single write lock and cannot duplicate a user.
///
/// `set_available(false)` makes every call fail with
/// [`StoreError::Connection`], which lets tests exercise outage handling.

use super::{next_last_seen, StoreResult, TaskChanges, TaskInsert, TaskStore, UserStore, UserUpsert};
use crate::error::StoreError;
use crate::models::task::{Task, TaskFilter};
use crate::models::user::{UpsertUser, User};
use async_trait::async_trait;
use std::collections::{BTreeMap, HashMap};
use std::sync::atomic::{AtomicBool, Ordering};
use tokio::sync::RwLock;
use uuid::Uuid;

#[derive(Debug, Default)]
struct TaskTable {
    rows: HashMap<Uuid, (u64, Task)>,
    by_user: HashMap<String, BTreeMap<u64, Uuid>>,
    next_seq: u64,
}

/// In-memory implementation of [`TaskStore`] and [`UserStore`]
#[derive(Debug)]
pub struct MemoryStore {
    tasks: RwLock<TaskTable>,
    users: RwLock<HashMap<String, User>>,
    available: AtomicBool,
}

impl Default for MemoryStore {
    fn default() -> Self {
        Self::new()
    }
}

impl MemoryStore {
    /// Creates an empty store
    pub fn new() -> Self {
        Self {
            tasks: RwLock::new(TaskTable::default()),
            users: RwLock::new(HashMap::new()),
            available: AtomicBool::new(true),
        }
    }

    /// Simulates the store going down (false) or coming back (true)
    pub fn set_available(&self, available: bool) {
        self.available.store(available, Ordering::SeqCst);
    }

    /// Number of stored users
    pub async fn user_count(&self) -> usize {
        self.users.read().await.len()
    }

    fn check_available(&self) -> StoreResult<()> {
        if self.available.load(Ordering::SeqCst) {
            Ok(())
        } else {
            Err(StoreError::Connection("memory store is unavailable".to_string()))
        }
    }
}

#[async_trait]
impl TaskStore for MemoryStore {
    async fn insert_task(&self, task: TaskInsert) -> StoreResult<Task> {
        self.check_available()?;
        let mut table = self.tasks.write().await;

        let record = Task {
            id: Uuid::new_v4(),
            title: task.title,
            description: task.description,
            completed: false,
            priority: task.priority,
            due_date: task.due_date,
            user_id: task.user_id,
            created_at: task.created_at,
            updated_at: task.created_at,
        };

        let seq = table.next_seq;
        table.next_seq += 1;
        table
            .by_user
            .entry(record.user_id.clone())
            .or_default()
            .insert(seq, record.id);
        table.rows.insert(record.id, (seq, record.clone()));

        Ok(record)
    }

    async fn get_task(&self, id: Uuid) -> StoreResult<Option<Task>> {
        self.check_available()?;
        let table = self.tasks.read().await;
        Ok(table.rows.get(&id).map(|(_, task)| task.clone()))
    }

    async fn query_tasks(&self, user_id: &str, filter: &TaskFilter) -> StoreResult<Vec<Task>> {
        self.check_available()?;
        let table = self.tasks.read().await;

        let Some(index) = table.by_user.get(user_id) else {
            return Ok(Vec::new());
        };

        let tasks = index
            .values()
            .rev()
            .filter_map(|id| table.rows.get(id))
            .map(|(_, task)| task)
            .filter(|task| task.matches(filter))
            .cloned()
            .collect();

        Ok(tasks)
    }

    async fn update_task(
        &self,
        id: Uuid,
        changes: &TaskChanges,
        updated_at: i64,
    ) -> StoreResult<Option<Task>> {
        self.check_available()?;
        let mut table = self.tasks.write().await;

        let Some((_, task)) = table.rows.get_mut(&id) else {
            return Ok(None);
        };

        if let Some(ref title) = changes.title {
            task.title = title.clone();
        }
        if let Some(ref description) = changes.description {
            task.description = description.clone();
        }
        if let Some(completed) = changes.completed {
            task.completed = completed;
        }
        if let Some(priority) = changes.priority {
            task.priority = priority;
        }
        if let Some(due_date) = changes.due_date {
            task.due_date = due_date;
        }
        task.updated_at = updated_at;

        Ok(Some(task.clone()))
    }

    async fn delete_task(&self, id: Uuid) -> StoreResult<bool> {
        self.check_available()?;
        let mut table = self.tasks.write().await;

        let Some((seq, task)) = table.rows.remove(&id) else {
            return Ok(false);
        };

        if let Some(index) = table.by_user.get_mut(&task.user_id) {
            index.remove(&seq);
            if index.is_empty() {
                table.by_user.remove(&task.user_id);
            }
        }

        Ok(true)
    }

    async fn ping(&self) -> StoreResult<()> {
        self.check_available()
    }
}

#[async_trait]
impl UserStore for MemoryStore {
    async fn find_user(&self, user_id: &str) -> StoreResult<Option<User>> {
        self.check_available()?;
        Ok(self.users.read().await.get(user_id).cloned())
    }

    async fn find_user_by_email(&self, email: &str) -> StoreResult<Option<User>> {
        self.check_available()?;
        let users = self.users.read().await;
        Ok(users
            .values()
            .filter(|u| u.email == email)
            .min_by_key(|u| (u.created_at, u.user_id.as_str()))
            .cloned())
    }

    async fn upsert_user(&self, profile: &UpsertUser, now: i64) -> StoreResult<UserUpsert> {
        self.check_available()?;
        let mut users = self.users.write().await;

        if let Some(existing) = users.get_mut(&profile.user_id) {
            existing.email = profile.email.clone();
            if profile.name.is_some() {
                existing.name = profile.name.clone();
            }
            if profile.avatar.is_some() {
                existing.avatar = profile.avatar.clone();
            }
            existing.last_seen = next_last_seen(existing.last_seen, now);

            return Ok(UserUpsert {
                user: existing.clone(),
                created: false,
            });
        }

        let user = User {
            user_id: profile.user_id.clone(),
            email: profile.email.clone(),
            name: profile.name.clone(),
            avatar: profile.avatar.clone(),
            created_at: now,
            last_seen: now,
        };
        users.insert(user.user_id.clone(), user.clone());

        Ok(UserUpsert {
            user,
            created: true,
        })
    }

    async fn touch_user(&self, user_id: &str, now: i64) -> StoreResult<bool> {
        self.check_available()?;
        let mut users = self.users.write().await;

        match users.get_mut(user_id) {
            Some(user) => {
                user.last_seen = next_last_seen(user.last_seen, now);
                Ok(true)
            }
            None => Ok(false),
        }
    }
}
