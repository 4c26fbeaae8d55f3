//! Credential and session-token lifecycle backed by Postgres.
//!
//! Users register with a hashed password, log in by digest, and receive
//! ES256-signed tokens that are stored, refreshed and revoked as rows.

pub mod auth;
pub mod config;
pub mod db;
pub mod error;
pub mod state;
pub mod telemetry;
pub mod tokens;
pub mod users;

pub use error::{Error, ErrorKind, Result};
