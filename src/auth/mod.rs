pub mod claims;
pub mod ids;
pub mod jwt;
pub mod password;
pub mod services;

pub use jwt::{SignedToken, TokenSigner};
pub use services::{CredentialService, NewAccount};
