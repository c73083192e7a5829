//! Error types for the session store.

use std::fmt;

use sea_orm::DbErr;
use tower_sessions::session_store;

/// Column a uniqueness violation was attributed to.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum UniqueColumn {
    /// The `session_key` primary key.
    SessionKey,
    /// Any other unique constraint, carrying the driver's description.
    Other(String),
}

impl fmt::Display for UniqueColumn {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::SessionKey => f.write_str("session_key"),
            Self::Other(detail) => write!(f, "other ({detail})"),
        }
    }
}

/// Failures reported by a [`SessionRepository`](crate::SessionRepository).
#[derive(Debug, thiserror::Error)]
pub enum StorageError {
    /// A write violated a unique constraint.
    #[error("unique constraint violated on {column}")]
    UniqueViolation { column: UniqueColumn },

    /// Any other database failure, including connectivity problems.
    #[error(transparent)]
    Database(#[from] DbErr),
}

/// Failures of a [`SessionCodec`](crate::SessionCodec).
#[derive(Debug, thiserror::Error)]
pub enum CodecError {
    /// The payload's integrity tag does not match its body.
    #[error("session data corrupted: signature mismatch")]
    Tampered,

    /// The payload could not be parsed.
    #[error("session data malformed: {0}")]
    Malformed(String),

    /// The in-memory payload could not be serialized.
    #[error("failed to encode session data: {0}")]
    Encode(String),
}

/// Errors surfaced by [`SessionStore`](crate::SessionStore) operations.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// A forced insert hit an existing session key.
    ///
    /// Only returned by `save(SaveMode::MustCreate)`; `create()` absorbs it
    /// and retries with a fresh key.
    #[error("session key already exists")]
    CreateCollision,

    /// `create()` kept colliding until the configured attempt limit.
    #[error("gave up allocating a session key after {attempts} attempts")]
    KeyCollisionLimit { attempts: u32 },

    #[error(transparent)]
    Storage(#[from] StorageError),

    #[error(transparent)]
    Encode(CodecError),

    /// A typed value could not be converted to or from JSON.
    #[error("invalid session value: {0}")]
    Value(#[from] serde_json::Error),

    #[error("timestamp outside the supported range")]
    TimestampOutOfRange,
}

impl From<DbErr> for Error {
    fn from(err: DbErr) -> Self {
        Self::Storage(StorageError::Database(err))
    }
}

impl From<Error> for session_store::Error {
    fn from(err: Error) -> Self {
        match err {
            Error::Encode(e) => session_store::Error::Encode(e.to_string()),
            Error::Value(e) => session_store::Error::Decode(e.to_string()),
            other => session_store::Error::Backend(other.to_string()),
        }
    }
}

pub type Result<T, E = Error> = std::result::Result<T, E>;
