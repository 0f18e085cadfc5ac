use async_trait::async_trait;
use sqlx::PgPool;
use uuid::Uuid;

use super::{Datastore, StoreResult};
use crate::notifications::repo::{self as notifications, Notification};
use crate::screams::repo::{self as screams, Like, Scream};
use crate::users::repo::{self as users, UserDoc, UserPatch};

#[derive(Clone)]
pub struct PgStore {
    db: PgPool,
}

impl PgStore {
    pub fn new(db: PgPool) -> Self {
        Self { db }
    }
}

#[async_trait]
impl Datastore for PgStore {
    async fn get_user(&self, handle: &str) -> StoreResult<Option<UserDoc>> {
        users::find_by_handle(&self.db, handle).await
    }

    async fn get_user_by_id(&self, user_id: Uuid) -> StoreResult<Option<UserDoc>> {
        users::find_by_user_id(&self.db, user_id).await
    }

    async fn create_user(&self, user: &UserDoc) -> StoreResult<bool> {
        users::insert_if_absent(&self.db, user).await
    }

    async fn update_user(&self, handle: &str, patch: &UserPatch) -> StoreResult<()> {
        users::update(&self.db, handle, patch).await
    }

    async fn likes_by_user(&self, handle: &str) -> StoreResult<Vec<Like>> {
        screams::likes_by_handle(&self.db, handle).await
    }

    async fn notifications_for(&self, recipient: &str, limit: i64) -> StoreResult<Vec<Notification>> {
        notifications::recent_for_recipient(&self.db, recipient, limit).await
    }

    async fn mark_notifications_read(&self, ids: &[Uuid]) -> StoreResult<()> {
        notifications::mark_read(&self.db, ids).await
    }

    async fn screams_by_user(&self, handle: &str) -> StoreResult<Vec<Scream>> {
        screams::list_by_handle(&self.db, handle).await
    }

    async fn list_screams(&self) -> StoreResult<Vec<Scream>> {
        screams::list_all(&self.db).await
    }

    async fn get_scream(&self, id: Uuid) -> StoreResult<Option<Scream>> {
        screams::find(&self.db, id).await
    }

    async fn create_scream(&self, scream: &Scream) -> StoreResult<()> {
        screams::insert(&self.db, scream).await
    }

    async fn find_like(&self, handle: &str, scream_id: Uuid) -> StoreResult<Option<Like>> {
        screams::find_like(&self.db, handle, scream_id).await
    }

    async fn add_like(&self, like: &Like, notification: Option<&Notification>) -> StoreResult<Scream> {
        screams::add_like(&self.db, like, notification).await
    }

    async fn remove_like(&self, handle: &str, scream_id: Uuid) -> StoreResult<Scream> {
        screams::remove_like(&self.db, handle, scream_id).await
    }
}
