//! Error types for the recommendation engine
//!
//! This module provides the error hierarchy for store and graph operations:
//! - `thiserror` for ergonomic error definitions
//! - Domain-specific variants for actionable error handling
//! - Proper error context and source chaining

use std::borrow::Cow;
use std::path::PathBuf;
use thiserror::Error;

/// Result type alias for engine operations.
pub type Result<T> = std::result::Result<T, Error>;

/// Main error type for the recommendation engine.
#[derive(Debug, Error)]
pub enum Error {
    // ========================================================================
    // Store lifecycle errors
    // ========================================================================
    #[error("store unavailable at {path}: {message}")]
    StoreUnavailable {
        path: PathBuf,
        message: Cow<'static, str>,
        #[source]
        source: Option<redb::DatabaseError>,
    },

    #[error("store is closed")]
    StoreClosed,

    #[error("transaction aborted: {message}")]
    TxnAborted {
        message: Cow<'static, str>,
        #[source]
        source: Option<Box<dyn std::error::Error + Send + Sync>>,
    },

    // ========================================================================
    // Encoding errors
    // ========================================================================
    #[error("failed to decode {entity_type} record: {message}")]
    Encoding {
        entity_type: &'static str,
        message: Cow<'static, str>,
        #[source]
        source: Option<serde_json::Error>,
    },

    // ========================================================================
    // Lookup errors (not surfaced to read-path callers; see is_error_level)
    // ========================================================================
    #[error("{entity_type} not found: {id}")]
    NotFound { entity_type: &'static str, id: String },

    // ========================================================================
    // Internal precondition violations
    // ========================================================================
    #[error("internal invariant violation: {message}")]
    Internal { message: Cow<'static, str> },
}

impl Error {
    // ========================================================================
    // Constructors for common error patterns
    // ========================================================================

    pub fn store_unavailable(path: impl Into<PathBuf>, source: redb::DatabaseError) -> Self {
        Self::StoreUnavailable {
            path: path.into(),
            message: source.to_string().into(),
            source: Some(source),
        }
    }

    pub fn txn_aborted(message: impl Into<Cow<'static, str>>) -> Self {
        Self::TxnAborted {
            message: message.into(),
            source: None,
        }
    }

    pub fn txn_aborted_with_source(
        message: impl Into<Cow<'static, str>>,
        source: impl std::error::Error + Send + Sync + 'static,
    ) -> Self {
        Self::TxnAborted {
            message: message.into(),
            source: Some(Box::new(source)),
        }
    }

    pub fn encoding(entity_type: &'static str, source: serde_json::Error) -> Self {
        Self::Encoding {
            entity_type,
            message: source.to_string().into(),
            source: Some(source),
        }
    }

    pub fn not_found(entity_type: &'static str, id: impl Into<String>) -> Self {
        Self::NotFound {
            entity_type,
            id: id.into(),
        }
    }

    pub fn internal(message: impl Into<Cow<'static, str>>) -> Self {
        Self::Internal {
            message: message.into(),
        }
    }

    // ========================================================================
    // Error classification
    // ========================================================================

    /// Returns true if retrying the operation that produced this error might succeed.
    pub fn is_retryable(&self) -> bool {
        matches!(self, Error::TxnAborted { .. } | Error::StoreUnavailable { .. })
    }

    /// Returns true if this error should be logged at error level rather than warn.
    pub fn is_error_level(&self) -> bool {
        matches!(
            self,
            Error::StoreUnavailable { .. } | Error::StoreClosed | Error::Internal { .. }
        )
    }
}

impl From<redb::TransactionError> for Error {
    fn from(err: redb::TransactionError) -> Self {
        Error::txn_aborted_with_source("failed to begin transaction", err)
    }
}

impl From<redb::TableError> for Error {
    fn from(err: redb::TableError) -> Self {
        Error::txn_aborted_with_source("failed to open table", err)
    }
}

impl From<redb::StorageError> for Error {
    fn from(err: redb::StorageError) -> Self {
        Error::txn_aborted_with_source("storage engine error", err)
    }
}

impl From<redb::CommitError> for Error {
    fn from(err: redb::CommitError) -> Self {
        Error::txn_aborted_with_source("failed to commit transaction", err)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_retryable() {
        assert!(Error::txn_aborted("conflict").is_retryable());
        assert!(!Error::not_found("user", "123").is_retryable());
        assert!(!Error::StoreClosed.is_retryable());
    }

    #[test]
    fn test_error_level() {
        assert!(Error::StoreClosed.is_error_level());
        assert!(Error::internal("asymmetric edge").is_error_level());
        assert!(!Error::not_found("item", "abc").is_error_level());
    }
}
