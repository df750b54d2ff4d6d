/// API route handlers
///
/// Handlers are organized by resource:
///
/// - `health`: Health check endpoint
/// - `tasks`: Task CRUD, toggle and stats
/// - `stream`: Live task snapshots over Server-Sent Events
/// - `users`: The caller's own profile

pub mod health;
pub mod stream;
pub mod tasks;
pub mod users;
