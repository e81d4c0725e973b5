//! Error types for the paging layer.
//!
//! - [`PagingError::InvalidArgument`] - Relay arguments rejected before any query runs
//! - [`PagingError::Protocol`] - plan sequencing defects (skip requested after take)
//! - [`PagingError::Source`] - failures raised by the query executer, passed through unchanged
//! - [`PagingError::Cancelled`] - the caller's cancellation token fired between queries

use thiserror::Error;

/// Boxed error type used to carry data-source failures without tying the
/// paging layer to a particular driver.
pub type BoxError = Box<dyn std::error::Error + Send + Sync + 'static>;

// =============================================================================
// Paging Errors
// =============================================================================

#[derive(Debug, Error)]
pub enum PagingError {
    /// A Relay argument failed validation.
    #[error("Invalid argument `{argument}`: {message}")]
    InvalidArgument {
        /// Name of the offending argument (`first`, `last`, `before`, `after`).
        argument: &'static str,
        /// Human readable reason.
        message: String,
    },

    /// A paging plan was built in an order the paginator cannot execute.
    ///
    /// Never surfaced by the assembler; indicates a bug in the caller.
    #[error("Paging protocol violation: {0}")]
    Protocol(String),

    /// The query executer failed.
    #[error("Query execution failed: {0}")]
    Source(#[source] BoxError),

    /// The surrounding request was cancelled before the next query started.
    #[error("Paging cancelled")]
    Cancelled,
}

impl PagingError {
    pub fn invalid_argument(argument: &'static str, message: impl Into<String>) -> Self {
        PagingError::InvalidArgument {
            argument,
            message: message.into(),
        }
    }

    /// Wrap any driver error as a data-source failure.
    pub fn source<E>(err: E) -> Self
    where
        E: std::error::Error + Send + Sync + 'static,
    {
        PagingError::Source(Box::new(err))
    }

    /// Name of the offending argument, for validation errors.
    pub fn argument(&self) -> Option<&'static str> {
        match self {
            PagingError::InvalidArgument { argument, .. } => Some(argument),
            _ => None,
        }
    }
}

#[cfg(feature = "sqlite")]
impl From<sqlx::Error> for PagingError {
    fn from(err: sqlx::Error) -> Self {
        PagingError::source(err)
    }
}

/// Result type for paging operations.
pub type PagingResult<T> = Result<T, PagingError>;
