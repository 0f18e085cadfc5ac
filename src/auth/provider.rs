use async_trait::async_trait;
use sqlx::PgPool;
use tracing::{debug, info, instrument};
use uuid::Uuid;

use super::{password, repo};
use crate::error::ProviderError;

const MIN_PASSWORD_LEN: usize = 6;

/// Email/password credential store. Identity tokens are minted separately by `JwtKeys`.
#[async_trait]
pub trait AuthProvider: Send + Sync {
    /// Creates a credential and returns its account id.
    async fn create_account(&self, email: &str, password: &str) -> Result<Uuid, ProviderError>;
    /// Checks the credential and returns its account id.
    async fn sign_in(&self, email: &str, password: &str) -> Result<Uuid, ProviderError>;
    async fn delete_account(&self, id: Uuid) -> Result<(), ProviderError>;
}

fn normalize_email(email: &str) -> String {
    email.trim().to_lowercase()
}

#[derive(Clone)]
pub struct PgAuthProvider {
    db: PgPool,
}

impl PgAuthProvider {
    pub fn new(db: PgPool) -> Self {
        Self { db }
    }
}

#[async_trait]
impl AuthProvider for PgAuthProvider {
    #[instrument(skip(self, password))]
    async fn create_account(&self, email: &str, password: &str) -> Result<Uuid, ProviderError> {
        if password.chars().count() < MIN_PASSWORD_LEN {
            return Err(ProviderError::WeakPassword);
        }
        let email = normalize_email(email);
        let hash = password::hash_password(password)?;
        let account = repo::insert_if_absent(&self.db, &email, &hash)
            .await?
            .ok_or(ProviderError::EmailAlreadyInUse)?;
        info!(account_id = %account.id, "account created");
        Ok(account.id)
    }

    #[instrument(skip(self, password))]
    async fn sign_in(&self, email: &str, password: &str) -> Result<Uuid, ProviderError> {
        let email = normalize_email(email);
        let account = repo::find_by_email(&self.db, &email)
            .await?
            .ok_or(ProviderError::UserNotFound)?;
        if !password::verify_password(password, &account.password_hash)? {
            return Err(ProviderError::WrongPassword);
        }
        debug!(account_id = %account.id, "credentials accepted");
        Ok(account.id)
    }

    async fn delete_account(&self, id: Uuid) -> Result<(), ProviderError> {
        repo::delete(&self.db, id).await
    }
}
