use std::sync::Arc;

use tracing::{info, instrument, warn};

use crate::{
    auth::{ids::generate_id, jwt::TokenSigner, password::hash_password},
    error::{require, Result},
    tokens::{Token, TokenRepository, TokenWithMetadata},
    users::{Profile, User, UserLogin, UserRegistration, UserRepository},
};

/// Registration input carrying the plaintext password; it is hashed before storage.
#[derive(Debug, Clone, Default)]
pub struct NewAccount {
    pub username: String,
    pub password: String,
    pub profile: Profile,
}

/// Composes the hasher, the signer and both repositories.
///
/// Each call is one repository statement; errors from the repositories are
/// returned as they are.
#[derive(Clone)]
pub struct CredentialService {
    users: Arc<dyn UserRepository>,
    tokens: Arc<dyn TokenRepository>,
    signer: TokenSigner,
}

impl CredentialService {
    pub fn new(
        users: Arc<dyn UserRepository>,
        tokens: Arc<dyn TokenRepository>,
        signer: TokenSigner,
    ) -> Self {
        Self {
            users,
            tokens,
            signer,
        }
    }

    pub fn signer(&self) -> &TokenSigner {
        &self.signer
    }

    #[instrument(skip(self, account), fields(username = %account.username))]
    pub async fn register(&self, account: NewAccount) -> Result<User> {
        require("register", "password", &account.password)?;

        let params = UserRegistration {
            id: generate_id(),
            hashed_password: hash_password(&account.password),
            username: account.username,
            profile: account.profile,
        };
        let user = self.users.create(&params).await?;
        info!(user_id = %user.id, "user registered");
        Ok(user)
    }

    /// Hashes `password` and lets the repository match it against the stored
    /// digest. That equality match is the verify step; the digest never leaves storage.
    #[instrument(skip(self, password))]
    pub async fn login(&self, username: &str, password: &str) -> Result<User> {
        let params = UserLogin {
            username: username.to_string(),
            hashed_password: hash_password(password),
        };
        match self.users.login(&params).await {
            Ok(user) => {
                info!(user_id = %user.id, "user logged in");
                Ok(user)
            }
            Err(e) => {
                warn!(error = %e, "login failed");
                Err(e)
            }
        }
    }

    pub async fn user(&self, id: &str) -> Result<User> {
        self.users.get_by_id(id).await
    }

    /// Signs a token for `user` and stores it with the default horizon.
    #[instrument(skip(self, user), fields(user_id = %user.id))]
    pub async fn issue_token(&self, user: &User) -> Result<Token> {
        let token = self.signer.generate(Some(user))?;
        let params = TokenWithMetadata {
            token_id: generate_id(),
            user_id: user.id.clone(),
            token,
            alived_at: self.signer.expiration_horizon(),
        };
        let stored = self.tokens.create(&params).await?;
        info!(token_id = %params.token_id, "token issued");
        Ok(stored)
    }

    pub async fn current_token(&self, user_id: &str) -> Result<Token> {
        self.tokens.get_current_for_user(user_id).await
    }

    pub async fn revoke_token(&self, token: &Token) -> Result<()> {
        self.tokens.revoke(token).await
    }

    pub async fn refresh_token(&self, params: &TokenWithMetadata) -> Result<Token> {
        self.tokens.refresh(params).await
    }

    /// Refresh with the signer's default horizon.
    pub async fn extend_session(&self, token_id: &str, token: &Token) -> Result<Token> {
        let params = TokenWithMetadata {
            token_id: token_id.to_string(),
            user_id: token.user_id.clone(),
            token: token.token.clone(),
            alived_at: self.signer.expiration_horizon(),
        };
        self.tokens.refresh(&params).await
    }
}
