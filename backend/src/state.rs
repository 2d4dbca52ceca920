use std::sync::Arc;

use anyhow::Result;

use crate::{
    config::AppConfig,
    db::PgPool,
    maintenance::{default_jobs, MaintenanceJob},
    s3,
    storage::{ObjectStorage, S3Storage},
    store::{DocumentStore, PgStore},
};

#[derive(Clone)]
pub struct AppState {
    pub config: Arc<AppConfig>,
    pub store: Arc<dyn DocumentStore>,
    pub storage: Arc<dyn ObjectStorage>,
}

impl AppState {
    pub fn new(
        config: AppConfig,
        store: Arc<dyn DocumentStore>,
        storage: Arc<dyn ObjectStorage>,
    ) -> Self {
        Self {
            config: Arc::new(config),
            store,
            storage,
        }
    }

    pub async fn connect(
        config: AppConfig,
        pool: PgPool,
        component: &'static str,
    ) -> Result<Self> {
        tracing::info!(
            component,
            database_url = %config.redacted_database_url(),
            pool_size = config.database_max_pool_size,
            s3_bucket = %config.s3.bucket,
            "loaded backend configuration"
        );

        let s3_client = s3::build_client(&config.s3).await?;
        let storage = Arc::new(S3Storage::new(s3_client, config.s3.bucket.clone()));
        let store = Arc::new(PgStore::new(pool));

        Ok(Self::new(config, store, storage))
    }

    pub fn maintenance_jobs(&self) -> Vec<Arc<dyn MaintenanceJob>> {
        default_jobs(
            self.store.clone(),
            self.storage.clone(),
            &self.config.maintenance,
        )
    }
}
