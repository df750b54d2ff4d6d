/// Live task query subscription
///
/// A [`TaskSubscription`] yields the query's current result first, then a
/// fresh result after every committed write to one of the owner's tasks, until
/// it is cancelled through its [`CancellationToken`] or dropped.
///
/// The broadcast receiver is registered before the initial snapshot is taken,
/// so a write that lands between the two is never missed.
///
/// # Example
///
/// ```
/// use taskboard_shared::models::task::{NewTask, Priority, TaskFilter};
/// use taskboard_shared::repository::TaskRepository;
/// use taskboard_shared::store::Stores;
///
/// # async fn example() -> Result<(), Box<dyn std::error::Error>> {
/// let repo = TaskRepository::with_system_clock(Stores::memory().tasks);
/// let mut subscription = repo.subscribe("u1", TaskFilter::default());
///
/// let initial = subscription.next_snapshot().await.unwrap()?;
/// assert!(initial.is_empty());
///
/// repo.create("u1", NewTask {
///     title: "Write report".to_string(),
///     description: None,
///     priority: Priority::High,
///     due_date: None,
/// }).await?;
///
/// let updated = subscription.next_snapshot().await.unwrap()?;
/// assert_eq!(updated.len(), 1);
///
/// subscription.cancel();
/// assert!(subscription.next_snapshot().await.is_none());
/// # Ok(())
/// # }
/// ```

use super::feed::TaskChange;
use crate::error::RepositoryResult;
use crate::models::task::{Task, TaskFilter};
use crate::repository::tasks::TaskRepository;
use futures::stream::{self, Stream};
use tokio::sync::broadcast::{error::RecvError, Receiver};
use tokio_util::sync::CancellationToken;
use tracing::{debug, warn};

/// Live view over one owner's tasks
pub struct TaskSubscription {
    repository: TaskRepository,
    user_id: String,
    filter: TaskFilter,
    receiver: Receiver<TaskChange>,
    cancel_token: CancellationToken,
    initial_sent: bool,
}

impl TaskSubscription {
    pub(crate) fn new(
        repository: TaskRepository,
        user_id: String,
        filter: TaskFilter,
        receiver: Receiver<TaskChange>,
        cancel_token: CancellationToken,
    ) -> Self {
        Self {
            repository,
            user_id,
            filter,
            receiver,
            cancel_token,
            initial_sent: false,
        }
    }

    /// Owner this subscription follows
    pub fn user_id(&self) -> &str {
        &self.user_id
    }

    /// Filter applied to every snapshot
    pub fn filter(&self) -> TaskFilter {
        self.filter
    }

    /// Token that ends the subscription when cancelled
    pub fn cancellation_token(&self) -> CancellationToken {
        self.cancel_token.clone()
    }

    /// Ends the subscription; pending and future `next_snapshot` calls return None
    pub fn cancel(&self) {
        self.cancel_token.cancel();
    }

    /// Waits for the next snapshot
    ///
    /// Returns `None` once cancelled or when the feed is closed. A failed
    /// re-query is yielded as `Some(Err(_))` and the subscription stays open.
    pub async fn next_snapshot(&mut self) -> Option<RepositoryResult<Vec<Task>>> {
        if self.cancel_token.is_cancelled() {
            return None;
        }

        if !self.initial_sent {
            self.initial_sent = true;
            return Some(self.snapshot().await);
        }

        loop {
            tokio::select! {
                _ = self.cancel_token.cancelled() => {
                    debug!(user_id = %self.user_id, "Subscription cancelled");
                    return None;
                }
                received = self.receiver.recv() => match received {
                    Ok(change) if change.user_id == self.user_id => {
                        return Some(self.snapshot().await);
                    }
                    Ok(_) => continue,
                    Err(RecvError::Lagged(skipped)) => {
                        warn!(user_id = %self.user_id, skipped, "Subscription lagged, resyncing");
                        return Some(self.snapshot().await);
                    }
                    Err(RecvError::Closed) => return None,
                }
            }
        }
    }

    /// Converts the subscription into a stream of snapshots
    pub fn into_stream(self) -> impl Stream<Item = RepositoryResult<Vec<Task>>> + Send {
        stream::unfold(self, |mut subscription| async move {
            subscription
                .next_snapshot()
                .await
                .map(|snapshot| (snapshot, subscription))
        })
    }

    async fn snapshot(&self) -> RepositoryResult<Vec<Task>> {
        self.repository.list(&self.user_id, self.filter).await
    }
}
