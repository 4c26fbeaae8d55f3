use async_trait::async_trait;
use sqlx::PgPool;
use time::OffsetDateTime;
use tracing::{debug, instrument, warn};

use crate::{
    db::now_millis,
    error::{Error, Result},
    tokens::repo_types::{Token, TokenWithMetadata},
};

/// Issued-token storage. A token is either active (`deleted_at` unset) or revoked;
/// revocation is terminal and only `alived_at` ever changes on an active row.
#[async_trait]
pub trait TokenRepository: Send + Sync {
    async fn create(&self, params: &TokenWithMetadata) -> Result<Token>;
    async fn get_current_for_user(&self, user_id: &str) -> Result<Token>;
    async fn revoke(&self, token: &Token) -> Result<()>;
    /// Moves `alived_at` of the matching active row; the token value is untouched.
    async fn refresh(&self, params: &TokenWithMetadata) -> Result<Token>;
}

#[derive(Clone)]
pub struct PgTokenRepository {
    db: PgPool,
}

impl PgTokenRepository {
    pub fn new(db: PgPool) -> Self {
        Self { db }
    }
}

#[async_trait]
impl TokenRepository for PgTokenRepository {
    #[instrument(skip(self, params), fields(token_id = %params.token_id, user_id = %params.user_id))]
    async fn create(&self, params: &TokenWithMetadata) -> Result<Token> {
        const OP: &str = "create token";
        params.validate(OP)?;

        let token = sqlx::query_as::<_, Token>(
            r#"
            INSERT INTO tokens (id, user_id, token, created_at, alived_at)
            VALUES ($1, $2, $3, $4, $5)
            RETURNING user_id, token
            "#,
        )
        .bind(&params.token_id)
        .bind(&params.user_id)
        .bind(&params.token)
        .bind(now_millis())
        .bind(params.alived_at)
        .fetch_one(&self.db)
        .await
        .map_err(|e| Error::from_sqlx(OP, e))?;

        debug!(alived_at = %params.alived_at, "token created");
        Ok(token)
    }

    /// Latest active row for the user whose `alived_at` is at or before now.
    ///
    /// Note the direction: this selects rows whose horizon has already passed,
    /// not rows still inside it.
    #[instrument(skip(self))]
    async fn get_current_for_user(&self, user_id: &str) -> Result<Token> {
        const OP: &str = "get current user token";
        sqlx::query_as::<_, Token>(
            r#"
            SELECT user_id, token
            FROM tokens
            WHERE user_id = $1 AND deleted_at IS NULL AND alived_at <= $2
            ORDER BY created_at DESC
            LIMIT 1
            "#,
        )
        .bind(user_id)
        .bind(OffsetDateTime::now_utc())
        .fetch_optional(&self.db)
        .await
        .map_err(|e| Error::from_sqlx(OP, e))?
        .ok_or_else(|| Error::not_found(OP))
    }

    #[instrument(skip(self, token), fields(user_id = %token.user_id))]
    async fn revoke(&self, token: &Token) -> Result<()> {
        const OP: &str = "revoke token";
        let result = sqlx::query(
            r#"
            UPDATE tokens
            SET deleted_at = $3
            WHERE token = $1 AND user_id = $2 AND deleted_at IS NULL
            "#,
        )
        .bind(&token.token)
        .bind(&token.user_id)
        .bind(now_millis())
        .execute(&self.db)
        .await
        .map_err(|e| Error::from_sqlx(OP, e))?;

        if result.rows_affected() == 0 {
            warn!("no active token to revoke");
            return Err(Error::not_found(OP));
        }
        debug!(rows = result.rows_affected(), "token revoked");
        Ok(())
    }

    #[instrument(skip(self, params), fields(token_id = %params.token_id, user_id = %params.user_id))]
    async fn refresh(&self, params: &TokenWithMetadata) -> Result<Token> {
        const OP: &str = "refresh token";
        params.validate(OP)?;

        let token = sqlx::query_as::<_, Token>(
            r#"
            UPDATE tokens
            SET alived_at = $3
            WHERE token = $1 AND user_id = $2 AND deleted_at IS NULL
            RETURNING user_id, token
            "#,
        )
        .bind(&params.token)
        .bind(&params.user_id)
        .bind(params.alived_at)
        .fetch_optional(&self.db)
        .await
        .map_err(|e| Error::from_sqlx(OP, e))?
        .ok_or_else(|| {
            warn!("no active token to refresh");
            Error::not_found(OP)
        })?;

        debug!(alived_at = %params.alived_at, "token refreshed");
        Ok(token)
    }
}
