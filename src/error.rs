//! Error type shared by the repositories, the signer and the credential service.
//!
//! Every variant carries the operation that was being attempted, so a message
//! reads like `create token: not found`. Callers branch on [`Error::kind`].

use thiserror::Error;

pub type Result<T> = std::result::Result<T, Error>;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    Validation,
    NotFound,
    AlreadyExists,
    Internal,
    Storage,
}

#[derive(Debug, Error)]
pub enum Error {
    /// A required field was missing or empty; raised before touching storage.
    #[error("{op}: validation failed: {reason}")]
    Validation { op: &'static str, reason: String },

    /// The lookup or state change matched zero rows.
    #[error("{op}: not found")]
    NotFound { op: &'static str },

    #[error("{op}: already exists")]
    AlreadyExists { op: &'static str },

    /// A defect in how a statement or a signature was put together.
    #[error("{op}: internal error: {reason}")]
    Internal { op: &'static str, reason: String },

    #[error("{op}: storage error")]
    Storage {
        op: &'static str,
        #[source]
        source: sqlx::Error,
    },
}

impl Error {
    pub fn validation(op: &'static str, reason: impl Into<String>) -> Self {
        Error::Validation {
            op,
            reason: reason.into(),
        }
    }

    pub fn not_found(op: &'static str) -> Self {
        Error::NotFound { op }
    }

    pub fn internal(op: &'static str, reason: impl Into<String>) -> Self {
        Error::Internal {
            op,
            reason: reason.into(),
        }
    }

    /// Classifies a driver error raised while running `op`.
    pub fn from_sqlx(op: &'static str, err: sqlx::Error) -> Self {
        match err {
            sqlx::Error::RowNotFound => Error::NotFound { op },
            sqlx::Error::Database(ref db) if db.is_unique_violation() => {
                Error::AlreadyExists { op }
            }
            sqlx::Error::ColumnNotFound(_)
            | sqlx::Error::ColumnIndexOutOfBounds { .. }
            | sqlx::Error::ColumnDecode { .. }
            | sqlx::Error::Decode(_)
            | sqlx::Error::TypeNotFound { .. } => Error::Internal {
                op,
                reason: err.to_string(),
            },
            other => Error::Storage { op, source: other },
        }
    }

    pub fn kind(&self) -> ErrorKind {
        match self {
            Error::Validation { .. } => ErrorKind::Validation,
            Error::NotFound { .. } => ErrorKind::NotFound,
            Error::AlreadyExists { .. } => ErrorKind::AlreadyExists,
            Error::Internal { .. } => ErrorKind::Internal,
            Error::Storage { .. } => ErrorKind::Storage,
        }
    }

    pub fn is_not_found(&self) -> bool {
        self.kind() == ErrorKind::NotFound
    }
}

/// Rejects an empty `value` for `field` with a validation error tagged `op`.
pub(crate) fn require(op: &'static str, field: &str, value: &str) -> Result<()> {
    if value.is_empty() {
        return Err(Error::validation(op, format!("{field} is required")));
    }
    Ok(())
}
