/// User directory
///
/// Caches profiles of users authenticated by the external identity provider.
/// Rows are keyed on the provider's stable identifier and refreshed on every
/// sign-in through [`UserDirectory::upsert`].

use crate::clock::{Clock, SystemClock};
use crate::error::{RepositoryError, RepositoryResult};
use crate::models::user::{UpsertUser, User};
use crate::store::UserStore;
use crate::validation::validate_profile;
use std::sync::Arc;
use tracing::{debug, error, info};

/// User profile operations over a [`UserStore`]
#[derive(Clone)]
pub struct UserDirectory {
    store: Arc<dyn UserStore>,
    clock: Arc<dyn Clock>,
}

impl UserDirectory {
    /// Creates a directory over `store`, stamping writes with `clock`
    pub fn new(store: Arc<dyn UserStore>, clock: Arc<dyn Clock>) -> Self {
        Self { store, clock }
    }

    /// Directory on the wall clock
    pub fn with_system_clock(store: Arc<dyn UserStore>) -> Self {
        Self::new(store, Arc::new(SystemClock))
    }

    /// Profile for an external identity, if one has been synced
    pub async fn find_by_identity(&self, user_id: &str) -> RepositoryResult<Option<User>> {
        self.store.find_user(user_id).await.map_err(store_failure)
    }

    /// First profile with this email
    pub async fn find_by_email(&self, email: &str) -> RepositoryResult<Option<User>> {
        self.store
            .find_user_by_email(email.trim())
            .await
            .map_err(store_failure)
    }

    /// Creates the profile or refreshes email, name, avatar and `last_seen`
    pub async fn upsert(&self, profile: UpsertUser) -> RepositoryResult<User> {
        let profile = validate_profile(profile)?;
        let now = self.clock.now_millis();

        let outcome = self
            .store
            .upsert_user(&profile, now)
            .await
            .map_err(store_failure)?;

        if outcome.created {
            info!(user_id = %outcome.user.user_id, "User profile created");
        } else {
            info!(user_id = %outcome.user.user_id, "User profile refreshed");
        }

        Ok(outcome.user)
    }

    /// Records activity; unknown users are ignored
    pub async fn touch_last_seen(&self, user_id: &str) -> RepositoryResult<()> {
        let now = self.clock.now_millis();
        let touched = self
            .store
            .touch_user(user_id, now)
            .await
            .map_err(store_failure)?;

        if !touched {
            debug!(user_id = %user_id, "Touch for unknown user ignored");
        }
        Ok(())
    }
}

fn store_failure(err: crate::error::StoreError) -> RepositoryError {
    error!(error = %err, "User store call failed");
    RepositoryError::StoreUnavailable(err)
}
