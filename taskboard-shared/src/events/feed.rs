/// In-process change feed
///
/// A thin wrapper over a `tokio::sync::broadcast` channel. Publishing never
/// blocks and never fails: with no subscribers the change is dropped, and a
/// slow subscriber that falls more than the channel capacity behind receives
/// `Lagged` and resynchronizes by re-querying.

use serde::{Deserialize, Serialize};
use tokio::sync::broadcast;
use tracing::trace;
use uuid::Uuid;

/// Default number of buffered changes per subscriber
pub const DEFAULT_FEED_CAPACITY: usize = 256;

/// Kind of committed write
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ChangeKind {
    /// Task inserted
    Created,

    /// Task patched or toggled
    Updated,

    /// Task removed
    Deleted,
}

/// A committed write to one task
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TaskChange {
    /// Owner of the task
    pub user_id: String,

    /// Task that changed
    pub task_id: Uuid,

    /// What happened
    pub kind: ChangeKind,
}

impl TaskChange {
    /// Creates a change notification
    pub fn new(user_id: impl Into<String>, task_id: Uuid, kind: ChangeKind) -> Self {
        Self {
            user_id: user_id.into(),
            task_id,
            kind,
        }
    }
}

/// Broadcast hub for task changes
#[derive(Debug, Clone)]
pub struct ChangeFeed {
    sender: broadcast::Sender<TaskChange>,
}

impl Default for ChangeFeed {
    fn default() -> Self {
        Self::new(DEFAULT_FEED_CAPACITY)
    }
}

impl ChangeFeed {
    /// Creates a feed buffering up to `capacity` changes per subscriber
    pub fn new(capacity: usize) -> Self {
        let (sender, _) = broadcast::channel(capacity.max(1));
        Self { sender }
    }

    /// Publishes a change to every current subscriber
    pub fn publish(&self, change: TaskChange) {
        match self.sender.send(change) {
            Ok(receivers) => trace!(receivers, "Published task change"),
            Err(_) => trace!("Task change dropped, no subscribers"),
        }
    }

    /// Registers a new receiver; it sees changes published from now on
    pub fn subscribe(&self) -> broadcast::Receiver<TaskChange> {
        self.sender.subscribe()
    }

    /// Number of live receivers
    pub fn receiver_count(&self) -> usize {
        self.sender.receiver_count()
    }
}
