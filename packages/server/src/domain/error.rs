//! Domain layer error definitions.

use thiserror::Error;

use super::value_object::{ServerId, Username};

/// Errors related to Value Objects validation
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ValueObjectError {
    /// Username validation error
    #[error("Username cannot be empty")]
    UsernameEmpty,

    /// Username too long error
    #[error("Username cannot exceed {max} characters (got {actual})")]
    UsernameTooLong { max: usize, actual: usize },

    /// CountryCode must be two ASCII letters
    #[error("CountryCode must be two ASCII letters (got: {0:?})")]
    CountryCodeInvalid(String),
}

/// A snapshot document that cannot be turned into typed entities.
///
/// Any of these rejects the whole snapshot; the previous baseline stays in place.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum SnapshotError {
    /// The document itself is not well-formed
    #[error("snapshot document is not well-formed: {0}")]
    Document(String),

    /// A structurally required element is missing
    #[error("missing element at {path}")]
    MissingElement { path: String },

    /// A required attribute is missing
    #[error("missing attribute `{attribute}` at {path}")]
    MissingAttribute { path: String, attribute: &'static str },

    /// A required attribute does not parse
    #[error("invalid attribute `{attribute}`={value:?} at {path}: {reason}")]
    InvalidAttribute {
        path: String,
        attribute: &'static str,
        value: String,
        reason: String,
    },

    /// Two servers share an id
    #[error("duplicate server id {0}")]
    DuplicateServerId(ServerId),

    /// Two players on one server share a username
    #[error("duplicate username {username} on server {server}")]
    DuplicateUsername { server: ServerId, username: Username },
}

/// Errors surfaced by repository implementations
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum RepositoryError {
    /// The backing store rejected or failed the operation
    #[error("database error: {0}")]
    Database(String),

    /// A stored row could not be mapped back into domain types
    #[error("corrupt row in {table}: {reason}")]
    CorruptRow { table: &'static str, reason: String },
}
