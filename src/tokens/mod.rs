pub mod repo;
pub mod repo_types;

pub use repo::{PgTokenRepository, TokenRepository};
pub use repo_types::{Token, TokenWithMetadata};
