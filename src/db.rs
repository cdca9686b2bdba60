use std::{str::FromStr, time::Duration};

use anyhow::Context;
use sqlx::{
    postgres::{PgConnectOptions, PgPoolOptions},
    PgPool,
};
use tracing::info;

use crate::config::DatabaseConfig;

/// Opens the pool. Connection establishment is bounded by the acquire
/// timeout; every statement by the server-side `statement_timeout`.
pub async fn connect(cfg: &DatabaseConfig) -> anyhow::Result<PgPool> {
    let options = PgConnectOptions::from_str(&cfg.url)
        .context("parse DATABASE_URL")?
        .options([("statement_timeout", cfg.statement_timeout_ms.to_string())]);

    let pool = PgPoolOptions::new()
        .max_connections(cfg.max_connections)
        .acquire_timeout(Duration::from_secs(cfg.connect_timeout_secs))
        .connect_with(options)
        .await
        .context("connect to database")?;

    info!(max_connections = cfg.max_connections, "database pool ready");
    Ok(pool)
}

pub async fn migrate(pool: &PgPool) -> anyhow::Result<()> {
    sqlx::migrate!("./migrations")
        .run(pool)
        .await
        .context("run migrations")?;
    Ok(())
}
