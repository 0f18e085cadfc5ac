use std::sync::Arc;

use anyhow::Context;

use crate::auth::{AuthProvider, PgAuthProvider};
use crate::config::AppConfig;
use crate::storage::{Storage, StorageClient};
use crate::store::{Datastore, PgStore};

#[derive(Clone)]
pub struct AppState {
    pub config: Arc<AppConfig>,
    pub store: Arc<dyn Datastore>,
    pub auth: Arc<dyn AuthProvider>,
    pub storage: Arc<dyn StorageClient>,
}

impl AppState {
    pub async fn init() -> anyhow::Result<Self> {
        let config = Arc::new(AppConfig::from_env()?);

        let db = sqlx::postgres::PgPoolOptions::new()
            .max_connections(10)
            .connect(&config.database_url)
            .await
            .context("connect to database")?;

        if let Err(e) = sqlx::migrate!("./migrations").run(&db).await {
            tracing::warn!(error = %e, "migration failed; continuing");
        }

        let storage = Arc::new(
            Storage::new(&config.storage)
                .await
                .context("configure object storage")?,
        ) as Arc<dyn StorageClient>;

        Ok(Self {
            store: Arc::new(PgStore::new(db.clone())),
            auth: Arc::new(PgAuthProvider::new(db)),
            config,
            storage,
        })
    }

    pub fn from_parts(
        config: Arc<AppConfig>,
        store: Arc<dyn Datastore>,
        auth: Arc<dyn AuthProvider>,
        storage: Arc<dyn StorageClient>,
    ) -> Self {
        Self {
            config,
            store,
            auth,
            storage,
        }
    }
}
