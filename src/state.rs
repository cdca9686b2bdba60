use std::sync::Arc;

use anyhow::Context;

use crate::auth::{jwt::TokenKeys, password::PasswordHasher, repo::PgUserStore};
use crate::categories::repo::PgCategoryStore;
use crate::config::AppConfig;
use crate::db;
use crate::store::{CategoryStore, TaskStore, UserStore};
use crate::tasks::repo::PgTaskStore;

/// Everything a handler may touch. Built once at startup and never mutated.
#[derive(Clone)]
pub struct AppState {
    pub users: Arc<dyn UserStore>,
    pub tasks: Arc<dyn TaskStore>,
    pub categories: Arc<dyn CategoryStore>,
    pub keys: TokenKeys,
    pub hasher: PasswordHasher,
}

impl AppState {
    pub async fn init(config: AppConfig) -> anyhow::Result<Self> {
        let pool = db::connect(&config.database).await?;
        db::migrate(&pool).await?;

        Self::from_parts(
            config,
            Arc::new(PgUserStore::new(pool.clone())),
            Arc::new(PgTaskStore::new(pool.clone())),
            Arc::new(PgCategoryStore::new(pool)),
        )
    }

    pub fn from_parts(
        config: AppConfig,
        users: Arc<dyn UserStore>,
        tasks: Arc<dyn TaskStore>,
        categories: Arc<dyn CategoryStore>,
    ) -> anyhow::Result<Self> {
        let keys = TokenKeys::from_config(&config.jwt);
        let hasher = PasswordHasher::new(&config.password).context("password hasher config")?;
        Ok(Self {
            users,
            tasks,
            categories,
            keys,
            hasher,
        })
    }

    /// In-memory state with cheap hashing parameters, for tests.
    #[cfg(test)]
    pub fn fake() -> Self {
        Self::fake_with_store().0
    }

    #[cfg(test)]
    pub fn fake_with_store() -> (Self, Arc<crate::store::memory::MemoryStore>) {
        use crate::config::{DatabaseConfig, JwtConfig, PasswordConfig};
        use crate::store::memory::MemoryStore;

        let config = AppConfig {
            host: "127.0.0.1".into(),
            port: 0,
            database: DatabaseConfig {
                url: "postgres://unused".into(),
                max_connections: 1,
                connect_timeout_secs: 1,
                statement_timeout_ms: 1_000,
            },
            jwt: JwtConfig {
                secret: "test-secret".into(),
                issuer: "test-issuer".into(),
                audience: "test-aud".into(),
                ttl_minutes: 24 * 60,
            },
            password: PasswordConfig {
                memory_kib: 1024,
                iterations: 1,
                parallelism: 1,
            },
        };

        let store = Arc::new(MemoryStore::new());
        let state = Self::from_parts(config, store.clone(), store.clone(), store.clone())
            .expect("fake state");
        (state, store)
    }
}
