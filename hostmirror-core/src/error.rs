//! Error types for hostmirror operations

use crate::TableName;
use thiserror::Error;

/// Failures at the remote table-access boundary.
///
/// These are transient from the cache's point of view: a failed fetch leaves
/// the affected views unpopulated, so the next read retries. Retry policy,
/// if any, belongs to the `RemoteTableSource` implementation.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum RemoteError {
    #[error("Transport failure: {reason}")]
    Transport { reason: String },

    #[error("Protocol violation in {table} snapshot: {reason}")]
    Protocol { table: TableName, reason: String },
}

/// Internal-consistency faults in fetched data.
///
/// The server guarantees key uniqueness per table; a violation indicates a
/// protocol or server defect, never a condition the cache papers over.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum IntegrityError {
    #[error("Duplicate key {key} in {table} snapshot")]
    DuplicateKey { table: TableName, key: String },
}

/// Authentication failures during session construction.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum AuthError {
    #[error("Invalid credentials for {connect_as}")]
    InvalidCredentials { connect_as: String },

    #[error("Account disabled: {username}")]
    AccountDisabled { username: String },
}

/// Programmer-misuse failures in the session directory.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum LookupError {
    #[error("Table {table} was never wired into this session")]
    TableNotWired { table: TableName },

    #[error("Table {table} registered twice in one session")]
    DuplicateRegistration { table: TableName },

    #[error("Entity type mismatch for table {table}")]
    EntityTypeMismatch { table: TableName },
}

/// Validation errors for structured key and identity literals.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum ValidationError {
    #[error("Invalid account code {value:?}: {reason}")]
    InvalidAccountCode { value: String, reason: String },

    #[error("Invalid user id {value:?}: {reason}")]
    InvalidUserId { value: String, reason: String },

    #[error("Invalid group id {value:?}: {reason}")]
    InvalidGroupId { value: String, reason: String },

    #[error("Invalid POSIX path {value:?}: {reason}")]
    InvalidPosixPath { value: String, reason: String },

    #[error("Invalid locale {value:?}: {reason}")]
    InvalidLocale { value: String, reason: String },
}

/// Shared-state failures.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum StateError {
    #[error("Cache lock poisoned")]
    LockPoisoned,
}

/// Master error type for all hostmirror errors.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum HostmirrorError {
    #[error("Remote error: {0}")]
    Remote(#[from] RemoteError),

    #[error("Integrity error: {0}")]
    Integrity(#[from] IntegrityError),

    #[error("Auth error: {0}")]
    Auth(#[from] AuthError),

    #[error("Lookup error: {0}")]
    Lookup(#[from] LookupError),

    #[error("Validation error: {0}")]
    Validation(#[from] ValidationError),

    #[error("State error: {0}")]
    State(#[from] StateError),
}

/// Result type alias for hostmirror operations.
pub type HostmirrorResult<T> = Result<T, HostmirrorError>;

// =============================================================================
// TESTS
// =============================================================================
