/// Repositories
///
/// The operations the HTTP layer calls. Each repository wraps a store trait
/// object and adds validation, ownership checks, timestamps and change
/// notification on top of plain persistence.
///
/// - [`TaskRepository`]: task CRUD, stats and live subscriptions
/// - [`UserDirectory`]: profile cache keyed on the external identity

pub mod tasks;
pub mod users;

pub use tasks::TaskRepository;
pub use users::UserDirectory;
