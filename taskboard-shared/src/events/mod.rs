/// Live-query change notifications
///
/// Every committed task write publishes a [`TaskChange`] on the
/// [`ChangeFeed`]. A [`TaskSubscription`] listens to the feed and re-runs its
/// query whenever a change for its owner arrives, yielding a fresh snapshot.
///
/// # Flow
///
/// ```text
/// TaskRepository::create/patch/toggle/delete
///        │ publish(TaskChange)
///        ▼
///   ChangeFeed (tokio broadcast)
///        │ recv
///        ▼
/// TaskSubscription ──query──> TaskStore ──> snapshot
/// ```
///
/// # Example
///
/// ```
/// use taskboard_shared::events::{ChangeFeed, ChangeKind, TaskChange};
/// use uuid::Uuid;
///
/// let feed = ChangeFeed::default();
/// let mut receiver = feed.subscribe();
/// feed.publish(TaskChange::new("u1", Uuid::new_v4(), ChangeKind::Created));
/// assert_eq!(receiver.try_recv().unwrap().user_id, "u1");
/// ```

pub mod feed;
pub mod subscription;

pub use feed::{ChangeFeed, ChangeKind, TaskChange, DEFAULT_FEED_CAPACITY};
pub use subscription::TaskSubscription;
