use sqlx::{FromRow, PgPool};
use uuid::Uuid;

use crate::error::ProviderError;

/// Credential record owned by the auth provider.
#[derive(Debug, Clone, FromRow)]
pub struct Account {
    pub id: Uuid,
    pub password_hash: String,
}

pub async fn find_by_email(db: &PgPool, email: &str) -> Result<Option<Account>, ProviderError> {
    let account = sqlx::query_as::<_, Account>(
        r#"
        SELECT id, password_hash
        FROM accounts
        WHERE email = $1
        "#,
    )
    .bind(email)
    .fetch_optional(db)
    .await?;
    Ok(account)
}

/// Returns `None` when the email is already registered.
pub async fn insert_if_absent(
    db: &PgPool,
    email: &str,
    password_hash: &str,
) -> Result<Option<Account>, ProviderError> {
    let account = sqlx::query_as::<_, Account>(
        r#"
        INSERT INTO accounts (id, email, password_hash)
        VALUES ($1, $2, $3)
        ON CONFLICT (email) DO NOTHING
        RETURNING id, password_hash
        "#,
    )
    .bind(Uuid::new_v4())
    .bind(email)
    .bind(password_hash)
    .fetch_optional(db)
    .await?;
    Ok(account)
}

pub async fn delete(db: &PgPool, id: Uuid) -> Result<(), ProviderError> {
    sqlx::query("DELETE FROM accounts WHERE id = $1")
        .bind(id)
        .execute(db)
        .await?;
    Ok(())
}
