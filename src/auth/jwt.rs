use jsonwebtoken::{encode, Algorithm, EncodingKey, Header};
use ring::{
    rand::SystemRandom,
    signature::{EcdsaKeyPair, KeyPair, ECDSA_P256_SHA256_FIXED_SIGNING},
};
use time::{Duration, OffsetDateTime};
use tracing::{debug, warn};

use crate::{
    auth::claims::Claims,
    config::SignerConfig,
    error::{Error, Result},
    users::User,
};

/// Default validity horizon of an issued token.
pub const EXPIRATION: Duration = Duration::hours(24);

/// A signed token together with the public half of the key that signed it.
///
/// Every call signs with a freshly generated P-256 key, so `public_key` (an
/// uncompressed SEC1 point) is the only way to verify the token later.
#[derive(Debug, Clone)]
pub struct SignedToken {
    pub token: String,
    pub public_key: Vec<u8>,
}

#[derive(Clone)]
pub struct TokenSigner {
    issuer: String,
    salt: String,
    rng: SystemRandom,
}

impl TokenSigner {
    pub fn new(config: SignerConfig) -> Self {
        let SignerConfig { issuer, salt } = config;
        Self {
            issuer,
            salt,
            rng: SystemRandom::new(),
        }
    }

    pub fn issuer(&self) -> &str {
        &self.issuer
    }

    pub fn salt(&self) -> &str {
        &self.salt
    }

    /// Signs an ES256 token with `iss` set to the issuer and `sub` to the username.
    pub fn generate(&self, user: Option<&User>) -> Result<String> {
        self.generate_signed(user).map(|signed| signed.token)
    }

    pub fn generate_signed(&self, user: Option<&User>) -> Result<SignedToken> {
        const OP: &str = "generate token";

        let Some(user) = user else {
            warn!("token requested without a user");
            return Err(Error::validation(OP, "user cannot be empty"));
        };

        let pkcs8 = EcdsaKeyPair::generate_pkcs8(&ECDSA_P256_SHA256_FIXED_SIGNING, &self.rng)
            .map_err(|e| Error::internal(OP, format!("generate signing key: {e}")))?;
        let pair =
            EcdsaKeyPair::from_pkcs8(&ECDSA_P256_SHA256_FIXED_SIGNING, pkcs8.as_ref(), &self.rng)
                .map_err(|e| Error::internal(OP, format!("load signing key: {e}")))?;

        let claims = Claims {
            iss: self.issuer.clone(),
            sub: user.username.clone(),
        };
        let token = encode(
            &Header::new(Algorithm::ES256),
            &claims,
            &EncodingKey::from_ec_der(pkcs8.as_ref()),
        )
        .map_err(|e| Error::internal(OP, format!("signed string: {e}")))?;

        debug!(user_id = %user.id, "token signed");
        Ok(SignedToken {
            token,
            public_key: pair.public_key().as_ref().to_vec(),
        })
    }

    /// Now plus [`EXPIRATION`]; the default `alived_at` for issuance.
    pub fn expiration_horizon(&self) -> OffsetDateTime {
        OffsetDateTime::now_utc() + EXPIRATION
    }
}
