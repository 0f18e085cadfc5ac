use serde::{Deserialize, Serialize};
use sqlx::{FromRow, PgPool, Postgres, Transaction};
use time::OffsetDateTime;
use uuid::Uuid;

use crate::error::ProviderError;
use crate::notifications::repo::{self as notifications, Notification};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, FromRow)]
#[serde(rename_all = "camelCase")]
pub struct Scream {
    #[serde(rename = "screamId")]
    pub id: Uuid,
    pub user_handle: String,
    pub body: String,
    pub user_image: String,
    pub like_count: i64,
    #[serde(with = "time::serde::rfc3339")]
    pub created_at: OffsetDateTime,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, FromRow)]
#[serde(rename_all = "camelCase")]
pub struct Like {
    #[serde(skip)]
    pub id: Uuid,
    pub user_handle: String,
    pub scream_id: Uuid,
}

const SCREAM_COLUMNS: &str = "id, user_handle, body, user_image, like_count, created_at";

pub async fn list_all(db: &PgPool) -> Result<Vec<Scream>, ProviderError> {
    let rows = sqlx::query_as::<_, Scream>(&format!(
        "SELECT {SCREAM_COLUMNS} FROM screams ORDER BY created_at DESC"
    ))
    .fetch_all(db)
    .await?;
    Ok(rows)
}

pub async fn list_by_handle(db: &PgPool, handle: &str) -> Result<Vec<Scream>, ProviderError> {
    let rows = sqlx::query_as::<_, Scream>(&format!(
        "SELECT {SCREAM_COLUMNS} FROM screams WHERE user_handle = $1 ORDER BY created_at DESC"
    ))
    .bind(handle)
    .fetch_all(db)
    .await?;
    Ok(rows)
}

pub async fn find(db: &PgPool, id: Uuid) -> Result<Option<Scream>, ProviderError> {
    let row = sqlx::query_as::<_, Scream>(&format!(
        "SELECT {SCREAM_COLUMNS} FROM screams WHERE id = $1"
    ))
    .bind(id)
    .fetch_optional(db)
    .await?;
    Ok(row)
}

pub async fn insert(db: &PgPool, s: &Scream) -> Result<(), ProviderError> {
    sqlx::query(
        r#"
        INSERT INTO screams (id, user_handle, body, user_image, like_count, created_at)
        VALUES ($1, $2, $3, $4, $5, $6)
        "#,
    )
    .bind(s.id)
    .bind(&s.user_handle)
    .bind(&s.body)
    .bind(&s.user_image)
    .bind(s.like_count)
    .bind(s.created_at)
    .execute(db)
    .await?;
    Ok(())
}

pub async fn likes_by_handle(db: &PgPool, handle: &str) -> Result<Vec<Like>, ProviderError> {
    let rows = sqlx::query_as::<_, Like>(
        "SELECT id, user_handle, scream_id FROM likes WHERE user_handle = $1",
    )
    .bind(handle)
    .fetch_all(db)
    .await?;
    Ok(rows)
}

pub async fn find_like(
    db: &PgPool,
    handle: &str,
    scream_id: Uuid,
) -> Result<Option<Like>, ProviderError> {
    let row = sqlx::query_as::<_, Like>(
        "SELECT id, user_handle, scream_id FROM likes WHERE user_handle = $1 AND scream_id = $2",
    )
    .bind(handle)
    .bind(scream_id)
    .fetch_optional(db)
    .await?;
    Ok(row)
}

async fn bump_like_count_tx(
    tx: &mut Transaction<'_, Postgres>,
    scream_id: Uuid,
    delta: i64,
) -> Result<Scream, ProviderError> {
    sqlx::query_as::<_, Scream>(&format!(
        "UPDATE screams SET like_count = like_count + $2 WHERE id = $1 RETURNING {SCREAM_COLUMNS}"
    ))
    .bind(scream_id)
    .bind(delta)
    .fetch_optional(&mut **tx)
    .await?
    .ok_or_else(|| ProviderError::DocumentNotFound(format!("screams/{scream_id}")))
}

/// Records the like, bumps the counter and queues the owner's notification atomically.
pub async fn add_like(
    db: &PgPool,
    like: &Like,
    notification: Option<&Notification>,
) -> Result<Scream, ProviderError> {
    let mut tx = db.begin().await?;
    sqlx::query("INSERT INTO likes (id, user_handle, scream_id) VALUES ($1, $2, $3)")
        .bind(like.id)
        .bind(&like.user_handle)
        .bind(like.scream_id)
        .execute(&mut *tx)
        .await?;
    let scream = bump_like_count_tx(&mut tx, like.scream_id, 1).await?;
    if let Some(n) = notification {
        notifications::insert_tx(&mut tx, n).await?;
    }
    tx.commit().await?;
    Ok(scream)
}

pub async fn remove_like(db: &PgPool, handle: &str, scream_id: Uuid) -> Result<Scream, ProviderError> {
    let mut tx = db.begin().await?;
    let res = sqlx::query("DELETE FROM likes WHERE user_handle = $1 AND scream_id = $2")
        .bind(handle)
        .bind(scream_id)
        .execute(&mut *tx)
        .await?;
    if res.rows_affected() == 0 {
        return Err(ProviderError::DocumentNotFound(format!(
            "likes/{handle}/{scream_id}"
        )));
    }
    let scream = bump_like_count_tx(&mut tx, scream_id, -1).await?;
    notifications::delete_like_notification_tx(&mut tx, handle, scream_id).await?;
    tx.commit().await?;
    Ok(scream)
}
