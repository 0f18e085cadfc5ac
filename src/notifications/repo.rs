use serde::{Deserialize, Serialize};
use sqlx::{FromRow, PgPool, Postgres, Transaction};
use time::OffsetDateTime;
use uuid::Uuid;

use crate::error::ProviderError;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, sqlx::Type)]
#[sqlx(type_name = "notification_kind", rename_all = "lowercase")]
#[serde(rename_all = "lowercase")]
pub enum NotificationKind {
    Like,
    Comment,
}

#[derive(Debug, Clone, PartialEq, FromRow)]
pub struct Notification {
    pub id: Uuid,
    pub recipient: String,
    pub sender: String,
    pub kind: NotificationKind,
    pub read: bool,
    pub scream_id: Uuid,
    pub created_at: OffsetDateTime,
}

pub async fn recent_for_recipient(
    db: &PgPool,
    recipient: &str,
    limit: i64,
) -> Result<Vec<Notification>, ProviderError> {
    let rows = sqlx::query_as::<_, Notification>(
        r#"
        SELECT id, recipient, sender, kind, read, scream_id, created_at
          FROM notifications
         WHERE recipient = $1
         ORDER BY created_at DESC
         LIMIT $2
        "#,
    )
    .bind(recipient)
    .bind(limit)
    .fetch_all(db)
    .await?;
    Ok(rows)
}

/// Sets `read` on every listed notification in one transaction.
/// An id without a matching row rolls the whole batch back.
pub async fn mark_read(db: &PgPool, ids: &[Uuid]) -> Result<(), ProviderError> {
    let mut tx = db.begin().await?;
    for id in ids {
        let res = sqlx::query("UPDATE notifications SET read = true WHERE id = $1")
            .bind(id)
            .execute(&mut *tx)
            .await?;
        if res.rows_affected() == 0 {
            tx.rollback().await?;
            return Err(ProviderError::DocumentNotFound(format!("notifications/{id}")));
        }
    }
    tx.commit().await?;
    Ok(())
}

pub async fn insert_tx(
    tx: &mut Transaction<'_, Postgres>,
    n: &Notification,
) -> Result<(), ProviderError> {
    sqlx::query(
        r#"
        INSERT INTO notifications (id, recipient, sender, kind, read, scream_id, created_at)
        VALUES ($1, $2, $3, $4, $5, $6, $7)
        "#,
    )
    .bind(n.id)
    .bind(&n.recipient)
    .bind(&n.sender)
    .bind(n.kind)
    .bind(n.read)
    .bind(n.scream_id)
    .bind(n.created_at)
    .execute(&mut **tx)
    .await?;
    Ok(())
}

pub async fn delete_like_notification_tx(
    tx: &mut Transaction<'_, Postgres>,
    sender: &str,
    scream_id: Uuid,
) -> Result<(), ProviderError> {
    sqlx::query(
        r#"
        DELETE FROM notifications
         WHERE sender = $1 AND scream_id = $2 AND kind = 'like'
        "#,
    )
    .bind(sender)
    .bind(scream_id)
    .execute(&mut **tx)
    .await?;
    Ok(())
}
