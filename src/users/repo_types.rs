use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use time::{Date, OffsetDateTime};

use crate::error::{require, Result};

/// Optional profile fields, stored as given on registration.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize, FromRow)]
pub struct Profile {
    pub first_name: Option<String>,
    pub second_name: Option<String>,
    pub sex: Option<String>,
    pub birthdate: Option<Date>,
    pub biography: Option<String>,
    pub city: Option<String>,
}

/// User as returned to callers. The password digest is never projected here.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, FromRow)]
pub struct User {
    pub id: String,
    pub username: String,
    #[sqlx(flatten)]
    #[serde(flatten)]
    pub profile: Profile,
    pub created_at: OffsetDateTime,
}

/// Input to `UserRepository::create`.
#[derive(Debug, Clone, Default)]
pub struct UserRegistration {
    pub id: String,
    pub username: String,
    pub hashed_password: String, // digest from `hash_password`, never plaintext
    pub profile: Profile,
}

impl UserRegistration {
    pub fn validate(&self, op: &'static str) -> Result<()> {
        require(op, "id", &self.id)?;
        require(op, "username", &self.username)?;
        require(op, "hashed_password", &self.hashed_password)
    }
}

/// Username and digest pair matched by `UserRepository::login`.
#[derive(Debug, Clone)]
pub struct UserLogin {
    pub username: String,
    pub hashed_password: String,
}
