//! Application state - shared across all handlers.

use std::sync::Arc;

use quill_core::ContentRepository;
use quill_core::ports::{PasswordService, PostRepository, SettingsStore, TokenService};
use quill_infra::{Argon2PasswordService, InMemoryPostRepository, JwtConfig, JwtTokenService, YamlSettingsStore};

#[cfg(feature = "postgres")]
use quill_infra::{PostgresPostRepository, database::connect};

use crate::config::{AdminCredentials, AppConfig};
use crate::uploads::UploadStore;
use crate::views::Views;

/// Which post store backs the content repository.
#[derive(Debug, Clone, Copy, PartialEq, Eq, serde::Serialize)]
#[serde(rename_all = "lowercase")]
pub enum StoreKind {
    Postgres,
    Memory,
}

/// Shared application state.
#[derive(Clone)]
pub struct AppState {
    pub content: ContentRepository,
    pub settings: Arc<dyn SettingsStore>,
    pub views: Arc<Views>,
    pub tokens: Arc<dyn TokenService>,
    pub passwords: Arc<dyn PasswordService>,
    pub admin: Option<AdminCredentials>,
    pub uploads: Arc<UploadStore>,
    pub store: StoreKind,
}

impl AppState {
    /// Build the application state with appropriate implementations.
    pub async fn new(config: &AppConfig) -> anyhow::Result<Self> {
        let (posts, store) = post_store(config).await?;

        let settings: Arc<dyn SettingsStore> =
            Arc::new(YamlSettingsStore::open(&config.site_config_path)?);
        let tokens: Arc<dyn TokenService> = Arc::new(JwtTokenService::new(JwtConfig::from_env()));

        if config.admin.is_none() {
            tracing::warn!("ADMIN_USERNAME/ADMIN_PASSWORD_HASH not set. Admin login is disabled.");
        }

        let state = Self::from_parts(posts, settings, tokens, config)?.with_store(store);
        tracing::info!(store = ?state.store, "Application state initialized");
        Ok(state)
    }

    /// Assemble the state from already-built ports.
    pub fn from_parts(
        posts: Arc<dyn PostRepository>,
        settings: Arc<dyn SettingsStore>,
        tokens: Arc<dyn TokenService>,
        config: &AppConfig,
    ) -> anyhow::Result<Self> {
        let views = Views::new(settings.clone())?;

        Ok(Self {
            content: ContentRepository::new(posts),
            settings,
            views: Arc::new(views),
            tokens,
            passwords: Arc::new(Argon2PasswordService::new()),
            admin: config.admin.clone(),
            uploads: Arc::new(UploadStore::new(&config.upload_dir, config.upload_max_bytes)),
            store: StoreKind::Memory,
        })
    }

    fn with_store(mut self, store: StoreKind) -> Self {
        self.store = store;
        self
    }
}

/// An unreachable database falls back to memory; a failed migration on a
/// reachable one aborts startup.
#[cfg(feature = "postgres")]
async fn post_store(config: &AppConfig) -> anyhow::Result<(Arc<dyn PostRepository>, StoreKind)> {
    let Some(db_config) = config.database.as_ref() else {
        tracing::warn!("DATABASE_URL not set. Running without database (in-memory mode).");
        return Ok((Arc::new(InMemoryPostRepository::new()), StoreKind::Memory));
    };

    let db = match connect(db_config).await {
        Ok(db) => db,
        Err(e) => {
            tracing::error!(
                "Failed to connect to database: {}. Using in-memory fallback.",
                e
            );
            return Ok((Arc::new(InMemoryPostRepository::new()), StoreKind::Memory));
        }
    };

    if config.auto_migrate {
        migrate(&db).await?;
    }

    Ok((Arc::new(PostgresPostRepository::new(db)), StoreKind::Postgres))
}

#[cfg(feature = "postgres")]
async fn migrate(db: &sea_orm::DatabaseConnection) -> anyhow::Result<()> {
    use anyhow::Context;
    use migration::MigratorTrait;

    migration::Migrator::up(db, None)
        .await
        .context("schema migration failed")?;
    tracing::info!("Schema migrations applied");
    Ok(())
}

#[cfg(not(feature = "postgres"))]
async fn post_store(_config: &AppConfig) -> anyhow::Result<(Arc<dyn PostRepository>, StoreKind)> {
    tracing::info!("Running without postgres feature - using in-memory repository");
    Ok((Arc::new(InMemoryPostRepository::new()), StoreKind::Memory))
}

#[cfg(all(test, feature = "postgres"))]
mod tests {
    use super::*;
    use sea_orm::{DatabaseBackend, MockDatabase};

    #[tokio::test]
    async fn test_failed_migration_is_an_error() {
        // no exec results queued, so the first statement fails
        let db = MockDatabase::new(DatabaseBackend::Postgres).into_connection();
        let err = migrate(&db).await.unwrap_err();
        assert!(err.to_string().contains("schema migration failed"));
    }
}
