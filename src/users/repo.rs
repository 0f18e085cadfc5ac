use serde::{Deserialize, Serialize};
use sqlx::{FromRow, PgPool};
use time::OffsetDateTime;
use uuid::Uuid;

use crate::error::ProviderError;

/// A user document, keyed by handle.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, FromRow)]
#[serde(rename_all = "camelCase")]
pub struct UserDoc {
    pub handle: String,
    pub user_id: Uuid,
    pub email: String,
    #[serde(with = "time::serde::rfc3339")]
    pub created_at: OffsetDateTime,
    pub image_url: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub bio: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub website: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub location: Option<String>,
}

/// Partial update of a user document. `None` leaves the stored value untouched.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct UserPatch {
    pub bio: Option<String>,
    pub website: Option<String>,
    pub location: Option<String>,
    pub image_url: Option<String>,
}

impl UserPatch {
    pub fn apply(&self, user: &mut UserDoc) {
        if let Some(bio) = &self.bio {
            user.bio = Some(bio.clone());
        }
        if let Some(website) = &self.website {
            user.website = Some(website.clone());
        }
        if let Some(location) = &self.location {
            user.location = Some(location.clone());
        }
        if let Some(image_url) = &self.image_url {
            user.image_url = image_url.clone();
        }
    }
}

const USER_COLUMNS: &str =
    "handle, user_id, email, created_at, image_url, bio, website, location";

pub async fn find_by_handle(db: &PgPool, handle: &str) -> Result<Option<UserDoc>, ProviderError> {
    let user = sqlx::query_as::<_, UserDoc>(&format!(
        "SELECT {USER_COLUMNS} FROM users WHERE handle = $1"
    ))
    .bind(handle)
    .fetch_optional(db)
    .await?;
    Ok(user)
}

pub async fn find_by_user_id(db: &PgPool, user_id: Uuid) -> Result<Option<UserDoc>, ProviderError> {
    let user = sqlx::query_as::<_, UserDoc>(&format!(
        "SELECT {USER_COLUMNS} FROM users WHERE user_id = $1"
    ))
    .bind(user_id)
    .fetch_optional(db)
    .await?;
    Ok(user)
}

/// Inserts the document unless the handle already exists. Returns whether a row was written.
pub async fn insert_if_absent(db: &PgPool, user: &UserDoc) -> Result<bool, ProviderError> {
    let res = sqlx::query(
        r#"
        INSERT INTO users (handle, user_id, email, created_at, image_url, bio, website, location)
        VALUES ($1, $2, $3, $4, $5, $6, $7, $8)
        ON CONFLICT (handle) DO NOTHING
        "#,
    )
    .bind(&user.handle)
    .bind(user.user_id)
    .bind(&user.email)
    .bind(user.created_at)
    .bind(&user.image_url)
    .bind(&user.bio)
    .bind(&user.website)
    .bind(&user.location)
    .execute(db)
    .await?;
    Ok(res.rows_affected() == 1)
}

pub async fn update(db: &PgPool, handle: &str, patch: &UserPatch) -> Result<(), ProviderError> {
    let res = sqlx::query(
        r#"
        UPDATE users
           SET bio = COALESCE($2, bio),
               website = COALESCE($3, website),
               location = COALESCE($4, location),
               image_url = COALESCE($5, image_url)
         WHERE handle = $1
        "#,
    )
    .bind(handle)
    .bind(&patch.bio)
    .bind(&patch.website)
    .bind(&patch.location)
    .bind(&patch.image_url)
    .execute(db)
    .await?;
    if res.rows_affected() == 0 {
        return Err(ProviderError::DocumentNotFound(format!("users/{handle}")));
    }
    Ok(())
}
