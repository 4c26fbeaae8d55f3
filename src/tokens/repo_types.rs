use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use time::OffsetDateTime;

use crate::error::{require, Result};

/// Canonical token view: the owning user and the signed value.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, FromRow)]
pub struct Token {
    pub user_id: String,
    pub token: String,
}

/// Input to `TokenRepository::create` and `TokenRepository::refresh`.
#[derive(Debug, Clone)]
pub struct TokenWithMetadata {
    pub token_id: String,
    pub user_id: String,
    pub token: String,
    pub alived_at: OffsetDateTime, // validity horizon
}

impl TokenWithMetadata {
    pub fn validate(&self, op: &'static str) -> Result<()> {
        require(op, "token_id", &self.token_id)?;
        require(op, "user_id", &self.user_id)?;
        require(op, "token", &self.token)
    }

    pub fn as_token(&self) -> Token {
        Token {
            user_id: self.user_id.clone(),
            token: self.token.clone(),
        }
    }
}
