/// Record types for Taskboard
///
/// # Models
///
/// - `task`: tasks, their inputs, filters and dashboard stats
/// - `user`: cached profiles of externally authenticated users
///
/// Models are plain data. Reads and writes go through the store traits in
/// [`crate::store`] and the repositories in [`crate::repository`].

pub mod task;
pub mod user;

pub use task::{NewTask, Priority, Task, TaskFilter, TaskPatch, TaskStats};
pub use user::{UpsertUser, User};
