use std::collections::BTreeMap;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Mutex;

use async_trait::async_trait;
use uuid::Uuid;

use super::{Datastore, StoreResult};
use crate::error::ProviderError;
use crate::notifications::repo::{Notification, NotificationKind};
use crate::screams::repo::{Like, Scream};
use crate::users::repo::{UserDoc, UserPatch};

#[derive(Default)]
struct Docs {
    users: BTreeMap<String, UserDoc>,
    screams: BTreeMap<Uuid, Scream>,
    likes: Vec<Like>,
    notifications: BTreeMap<Uuid, Notification>,
}

/// In-process [`Datastore`] used by handler tests.
#[derive(Default)]
pub struct MemoryStore {
    docs: Mutex<Docs>,
    unavailable: AtomicBool,
    failing_writes: AtomicBool,
    handle_race: AtomicBool,
}

impl MemoryStore {
    /// Makes every subsequent call fail as if the database were unreachable.
    pub fn set_unavailable(&self, down: bool) {
        self.unavailable.store(down, Ordering::SeqCst);
    }

    /// Makes writes fail while reads keep working.
    pub fn set_failing_writes(&self, failing: bool) {
        self.failing_writes.store(failing, Ordering::SeqCst);
    }

    /// Simulates another signup claiming a handle between the lookup and the write:
    /// `get_user` finds nothing and `create_user` reports the handle as taken.
    pub fn set_handle_race(&self, racing: bool) {
        self.handle_race.store(racing, Ordering::SeqCst);
    }

    pub fn insert_user(&self, user: UserDoc) {
        self.docs.lock().unwrap().users.insert(user.handle.clone(), user);
    }

    pub fn insert_scream(&self, scream: Scream) {
        self.docs.lock().unwrap().screams.insert(scream.id, scream);
    }

    pub fn insert_like(&self, like: Like) {
        self.docs.lock().unwrap().likes.push(like);
    }

    pub fn insert_notification(&self, n: Notification) {
        self.docs.lock().unwrap().notifications.insert(n.id, n);
    }

    pub fn user(&self, handle: &str) -> Option<UserDoc> {
        self.docs.lock().unwrap().users.get(handle).cloned()
    }

    pub fn notification(&self, id: Uuid) -> Option<Notification> {
        self.docs.lock().unwrap().notifications.get(&id).cloned()
    }

    pub fn notifications(&self) -> Vec<Notification> {
        self.docs.lock().unwrap().notifications.values().cloned().collect()
    }

    fn check(&self) -> StoreResult<()> {
        if self.unavailable.load(Ordering::SeqCst) {
            return Err(ProviderError::Database(sqlx::Error::PoolTimedOut));
        }
        Ok(())
    }

    fn check_write(&self) -> StoreResult<()> {
        self.check()?;
        if self.failing_writes.load(Ordering::SeqCst) {
            return Err(ProviderError::Database(sqlx::Error::PoolTimedOut));
        }
        Ok(())
    }
}

fn newest_first<T>(items: &mut [T], key: impl Fn(&T) -> time::OffsetDateTime) {
    items.sort_by(|a, b| key(b).cmp(&key(a)));
}

#[async_trait]
impl Datastore for MemoryStore {
    async fn get_user(&self, handle: &str) -> StoreResult<Option<UserDoc>> {
        self.check()?;
        if self.handle_race.load(Ordering::SeqCst) {
            return Ok(None);
        }
        Ok(self.user(handle))
    }

    async fn get_user_by_id(&self, user_id: Uuid) -> StoreResult<Option<UserDoc>> {
        self.check()?;
        let docs = self.docs.lock().unwrap();
        Ok(docs.users.values().find(|u| u.user_id == user_id).cloned())
    }

    async fn create_user(&self, user: &UserDoc) -> StoreResult<bool> {
        self.check_write()?;
        let mut docs = self.docs.lock().unwrap();
        if self.handle_race.load(Ordering::SeqCst) || docs.users.contains_key(&user.handle) {
            return Ok(false);
        }
        docs.users.insert(user.handle.clone(), user.clone());
        Ok(true)
    }

    async fn update_user(&self, handle: &str, patch: &UserPatch) -> StoreResult<()> {
        self.check_write()?;
        let mut docs = self.docs.lock().unwrap();
        let user = docs
            .users
            .get_mut(handle)
            .ok_or_else(|| ProviderError::DocumentNotFound(format!("users/{handle}")))?;
        patch.apply(user);
        Ok(())
    }

    async fn likes_by_user(&self, handle: &str) -> StoreResult<Vec<Like>> {
        self.check()?;
        let docs = self.docs.lock().unwrap();
        Ok(docs.likes.iter().filter(|l| l.user_handle == handle).cloned().collect())
    }

    async fn notifications_for(&self, recipient: &str, limit: i64) -> StoreResult<Vec<Notification>> {
        self.check()?;
        let docs = self.docs.lock().unwrap();
        let mut out: Vec<Notification> = docs
            .notifications
            .values()
            .filter(|n| n.recipient == recipient)
            .cloned()
            .collect();
        newest_first(&mut out, |n| n.created_at);
        out.truncate(usize::try_from(limit).unwrap_or(0));
        Ok(out)
    }

    async fn mark_notifications_read(&self, ids: &[Uuid]) -> StoreResult<()> {
        self.check_write()?;
        let mut docs = self.docs.lock().unwrap();
        if let Some(missing) = ids.iter().find(|id| !docs.notifications.contains_key(*id)) {
            return Err(ProviderError::DocumentNotFound(format!("notifications/{missing}")));
        }
        for id in ids {
            if let Some(n) = docs.notifications.get_mut(id) {
                n.read = true;
            }
        }
        Ok(())
    }

    async fn screams_by_user(&self, handle: &str) -> StoreResult<Vec<Scream>> {
        self.check()?;
        let docs = self.docs.lock().unwrap();
        let mut out: Vec<Scream> = docs
            .screams
            .values()
            .filter(|s| s.user_handle == handle)
            .cloned()
            .collect();
        newest_first(&mut out, |s| s.created_at);
        Ok(out)
    }

    async fn list_screams(&self) -> StoreResult<Vec<Scream>> {
        self.check()?;
        let docs = self.docs.lock().unwrap();
        let mut out: Vec<Scream> = docs.screams.values().cloned().collect();
        newest_first(&mut out, |s| s.created_at);
        Ok(out)
    }

    async fn get_scream(&self, id: Uuid) -> StoreResult<Option<Scream>> {
        self.check()?;
        Ok(self.docs.lock().unwrap().screams.get(&id).cloned())
    }

    async fn create_scream(&self, scream: &Scream) -> StoreResult<()> {
        self.check_write()?;
        self.insert_scream(scream.clone());
        Ok(())
    }

    async fn find_like(&self, handle: &str, scream_id: Uuid) -> StoreResult<Option<Like>> {
        self.check()?;
        let docs = self.docs.lock().unwrap();
        Ok(docs
            .likes
            .iter()
            .find(|l| l.user_handle == handle && l.scream_id == scream_id)
            .cloned())
    }

    async fn add_like(&self, like: &Like, notification: Option<&Notification>) -> StoreResult<Scream> {
        self.check_write()?;
        let mut docs = self.docs.lock().unwrap();
        let scream = docs
            .screams
            .get_mut(&like.scream_id)
            .ok_or_else(|| ProviderError::DocumentNotFound(format!("screams/{}", like.scream_id)))?;
        scream.like_count += 1;
        let scream = scream.clone();
        docs.likes.push(like.clone());
        if let Some(n) = notification {
            docs.notifications.insert(n.id, n.clone());
        }
        Ok(scream)
    }

    async fn remove_like(&self, handle: &str, scream_id: Uuid) -> StoreResult<Scream> {
        self.check_write()?;
        let mut docs = self.docs.lock().unwrap();
        if !docs.screams.contains_key(&scream_id) {
            return Err(ProviderError::DocumentNotFound(format!("screams/{scream_id}")));
        }
        let before = docs.likes.len();
        docs.likes
            .retain(|l| !(l.user_handle == handle && l.scream_id == scream_id));
        if docs.likes.len() == before {
            return Err(ProviderError::DocumentNotFound(format!("likes/{handle}/{scream_id}")));
        }
        let scream = docs
            .screams
            .get_mut(&scream_id)
            .ok_or_else(|| ProviderError::DocumentNotFound(format!("screams/{scream_id}")))?;
        scream.like_count -= 1;
        let scream = scream.clone();
        docs.notifications.retain(|_, n| {
            !(n.sender == handle && n.scream_id == scream_id && n.kind == NotificationKind::Like)
        });
        Ok(scream)
    }
}
