use anyhow::Context;
use sqlx::{postgres::PgPoolOptions, PgPool};
use time::OffsetDateTime;
use tracing::info;

use crate::config::DatabaseConfig;

/// Opens the shared pool and checks one connection; failure here is fatal for the process.
pub async fn connect(config: &DatabaseConfig) -> anyhow::Result<PgPool> {
    let db = PgPoolOptions::new()
        .max_connections(config.max_connections)
        .connect_with(config.connect_options())
        .await
        .with_context(|| {
            format!(
                "connect to database {} at {}:{}",
                config.name, config.host, config.port
            )
        })?;
    info!(host = %config.host, port = config.port, db = %config.name, "connected to database");
    Ok(db)
}

pub async fn migrate(db: &PgPool) -> anyhow::Result<()> {
    sqlx::migrate!("./migrations")
        .run(db)
        .await
        .context("run migrations")?;
    Ok(())
}

/// Current time truncated to whole milliseconds, used for every stored stamp.
pub fn now_millis() -> OffsetDateTime {
    let now = OffsetDateTime::now_utc();
    now.replace_millisecond(now.millisecond()).unwrap_or(now)
}
