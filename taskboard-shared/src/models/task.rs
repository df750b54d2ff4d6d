/// Task model
///
/// A task is one actionable item owned by exactly one user. Ownership is fixed
/// at creation and never transferred.
///
/// # Schema
///
/// ```sql
/// CREATE TYPE task_priority AS ENUM ('low', 'medium', 'high');
///
/// CREATE TABLE tasks (
///     id UUID PRIMARY KEY DEFAULT gen_random_uuid(),
///     seq BIGINT GENERATED ALWAYS AS IDENTITY,
///     title VARCHAR(200) NOT NULL,
///     description TEXT,
///     completed BOOLEAN NOT NULL DEFAULT FALSE,
///     priority task_priority NOT NULL,
///     due_date BIGINT,
///     user_id TEXT NOT NULL,
///     created_at BIGINT NOT NULL,
///     updated_at BIGINT NOT NULL
/// );
/// ```
///
/// `seq` records insertion order and is only used for ordering listings.
///
/// # Example
///
/// ```
/// use taskboard_shared::models::task::{NewTask, Priority};
///
/// let input = NewTask {
///     title: " Buy milk ".to_string(),
///     description: None,
///     priority: Priority::High,
///     due_date: None,
/// };
/// assert_eq!(input.priority.as_str(), "high");
/// ```

use serde::{Deserialize, Deserializer, Serialize};
use std::fmt;
use std::str::FromStr;
use uuid::Uuid;
use validator::Validate;

/// Maximum title length in characters
pub const MAX_TITLE_LEN: u64 = 200;

/// Maximum description length in characters
pub const MAX_DESCRIPTION_LEN: u64 = 2000;

/// Task priority
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, sqlx::Type)]
#[sqlx(type_name = "task_priority", rename_all = "lowercase")]
#[serde(rename_all = "lowercase")]
pub enum Priority {
    /// Can wait
    Low,

    /// Normal
    Medium,

    /// Needs attention first
    High,
}

impl Priority {
    /// Converts priority to its wire/database string
    pub fn as_str(&self) -> &'static str {
        match self {
            Priority::Low => "low",
            Priority::Medium => "medium",
            Priority::High => "high",
        }
    }
}

impl fmt::Display for Priority {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Priority {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "low" => Ok(Priority::Low),
            "medium" => Ok(Priority::Medium),
            "high" => Ok(Priority::High),
            other => Err(format!("unknown priority: {}", other)),
        }
    }
}

/// Task record
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, sqlx::FromRow)]
pub struct Task {
    /// Store-assigned identifier
    pub id: Uuid,

    /// Non-empty, trimmed title
    pub title: String,

    /// Optional trimmed description
    pub description: Option<String>,

    /// Whether the task is done
    pub completed: bool,

    /// Task priority
    pub priority: Priority,

    /// Deadline in epoch milliseconds (None = no deadline)
    pub due_date: Option<i64>,

    /// External identity of the owner
    pub user_id: String,

    /// Creation instant (epoch ms)
    pub created_at: i64,

    /// Last mutation instant (epoch ms)
    pub updated_at: i64,
}

impl Task {
    /// True when the task is open and its deadline has passed
    pub fn is_overdue(&self, now_millis: i64) -> bool {
        !self.completed && self.due_date.map_or(false, |due| due < now_millis)
    }

    /// True when the task passes every constraint in `filter`
    pub fn matches(&self, filter: &TaskFilter) -> bool {
        filter.completed.map_or(true, |c| self.completed == c)
            && filter.priority.map_or(true, |p| self.priority == p)
    }
}

/// Input for creating a task
///
/// Validated after normalization (see [`crate::validation`]), so length
/// limits apply to the trimmed values.
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct NewTask {
    /// Task title (required, trimmed)
    #[validate(length(min = 1, max = 200, message = "Title must be between 1 and 200 characters"))]
    pub title: String,

    /// Optional description
    #[validate(length(max = 2000, message = "Description must be at most 2000 characters"))]
    #[serde(default)]
    pub description: Option<String>,

    /// Priority (required, no default)
    pub priority: Priority,

    /// Optional deadline (epoch ms)
    #[validate(range(min = 0, message = "Due date must not be negative"))]
    #[serde(default)]
    pub due_date: Option<i64>,
}

/// Partial update for a task
///
/// Absent fields are left untouched. `description` and `due_date` may be sent
/// as explicit `null` to clear them.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TaskPatch {
    /// New title
    #[serde(default)]
    pub title: Option<String>,

    /// New description (Some(None) clears)
    #[serde(default, deserialize_with = "double_option")]
    pub description: Option<Option<String>>,

    /// New completion flag
    #[serde(default)]
    pub completed: Option<bool>,

    /// New priority
    #[serde(default)]
    pub priority: Option<Priority>,

    /// New deadline (Some(None) clears)
    #[serde(default, deserialize_with = "double_option")]
    pub due_date: Option<Option<i64>>,
}

impl TaskPatch {
    /// True when no field would change
    pub fn is_empty(&self) -> bool {
        self.title.is_none()
            && self.description.is_none()
            && self.completed.is_none()
            && self.priority.is_none()
            && self.due_date.is_none()
    }
}

/// Distinguishes a missing key (None) from an explicit null (Some(None))
fn double_option<'de, T, D>(deserializer: D) -> Result<Option<Option<T>>, D::Error>
where
    T: Deserialize<'de>,
    D: Deserializer<'de>,
{
    Option::<T>::deserialize(deserializer).map(Some)
}

/// Listing constraints; `None` means "any"
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TaskFilter {
    /// Only tasks with this completion flag
    #[serde(default)]
    pub completed: Option<bool>,

    /// Only tasks with this priority
    #[serde(default)]
    pub priority: Option<Priority>,
}

impl TaskFilter {
    /// Filter on completion
    pub fn completed(completed: bool) -> Self {
        Self {
            completed: Some(completed),
            priority: None,
        }
    }

    /// Filter on priority
    pub fn priority(priority: Priority) -> Self {
        Self {
            completed: None,
            priority: Some(priority),
        }
    }
}

/// Dashboard counters for one user's tasks
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TaskStats {
    /// All tasks
    pub total: usize,

    /// Completed tasks
    pub completed: usize,

    /// Open tasks
    pub pending: usize,

    /// Open high-priority tasks
    pub high_priority_open: usize,

    /// Open tasks past their deadline
    pub overdue: usize,

    /// Completed share in whole percent, rounded half up (0 when empty)
    pub completion_rate: u32,
}

impl TaskStats {
    /// Computes counters over `tasks` as of `now_millis`
    pub fn from_tasks(tasks: &[Task], now_millis: i64) -> Self {
        let total = tasks.len();
        let completed = tasks.iter().filter(|t| t.completed).count();
        let high_priority_open = tasks
            .iter()
            .filter(|t| !t.completed && t.priority == Priority::High)
            .count();
        let overdue = tasks.iter().filter(|t| t.is_overdue(now_millis)).count();

        let completion_rate = if total == 0 {
            0
        } else {
            ((completed * 200 + total) / (total * 2)) as u32
        };

        Self {
            total,
            completed,
            pending: total - completed,
            high_priority_open,
            overdue,
            completion_rate,
        }
    }
}
