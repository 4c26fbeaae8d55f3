use std::sync::Arc;

use sqlx::PgPool;

use crate::{
    auth::{CredentialService, TokenSigner},
    config::AppConfig,
    db,
    tokens::PgTokenRepository,
    users::PgUserRepository,
};

#[derive(Clone)]
pub struct AppState {
    pub db: PgPool,
    pub config: Arc<AppConfig>,
    pub credentials: Arc<CredentialService>,
}

impl AppState {
    pub async fn init() -> anyhow::Result<Self> {
        let config = Arc::new(AppConfig::from_env()?);
        let db = db::connect(&config.database).await?;
        Ok(Self::from_parts(db, config))
    }

    pub fn from_parts(db: PgPool, config: Arc<AppConfig>) -> Self {
        let credentials = CredentialService::new(
            Arc::new(PgUserRepository::new(db.clone())),
            Arc::new(PgTokenRepository::new(db.clone())),
            TokenSigner::new(config.signer.clone()),
        );
        Self {
            db,
            config,
            credentials: Arc::new(credentials),
        }
    }
}
