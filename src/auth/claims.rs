use serde::{Deserialize, Serialize};

/// JWT payload of an issued session token.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Claims {
    pub iss: String, // issuer
    pub sub: String, // username
}
