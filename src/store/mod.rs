use async_trait::async_trait;
use uuid::Uuid;

use crate::error::ProviderError;
use crate::notifications::repo::Notification;
use crate::screams::repo::{Like, Scream};
use crate::users::repo::{UserDoc, UserPatch};

#[cfg(test)]
pub mod memory;
mod postgres;

pub use postgres::PgStore;

pub type StoreResult<T> = Result<T, ProviderError>;

/// Document store holding users, screams, likes and notifications.
#[async_trait]
pub trait Datastore: Send + Sync {
    async fn get_user(&self, handle: &str) -> StoreResult<Option<UserDoc>>;
    async fn get_user_by_id(&self, user_id: Uuid) -> StoreResult<Option<UserDoc>>;
    /// Writes `user` unless its handle is already taken; returns `false` in that case.
    async fn create_user(&self, user: &UserDoc) -> StoreResult<bool>;
    /// Fails with [`ProviderError::DocumentNotFound`] when no such user exists.
    async fn update_user(&self, handle: &str, patch: &UserPatch) -> StoreResult<()>;

    async fn likes_by_user(&self, handle: &str) -> StoreResult<Vec<Like>>;
    /// Newest first, at most `limit`.
    async fn notifications_for(&self, recipient: &str, limit: i64) -> StoreResult<Vec<Notification>>;
    /// All-or-nothing: an unknown id aborts the batch.
    async fn mark_notifications_read(&self, ids: &[Uuid]) -> StoreResult<()>;

    /// Newest first.
    async fn screams_by_user(&self, handle: &str) -> StoreResult<Vec<Scream>>;
    /// Newest first.
    async fn list_screams(&self) -> StoreResult<Vec<Scream>>;
    async fn get_scream(&self, id: Uuid) -> StoreResult<Option<Scream>>;
    async fn create_scream(&self, scream: &Scream) -> StoreResult<()>;
    async fn find_like(&self, handle: &str, scream_id: Uuid) -> StoreResult<Option<Like>>;
    async fn add_like(&self, like: &Like, notification: Option<&Notification>) -> StoreResult<Scream>;
    async fn remove_like(&self, handle: &str, scream_id: Uuid) -> StoreResult<Scream>;
}
