//! Error types for messaging domain validation.

use thiserror::Error;

/// Errors returned while constructing messaging domain values.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum MessagingDomainError {
    /// The message body is empty after trimming.
    #[error("message body must not be empty")]
    EmptyBody,

    /// A page token is not a non-negative decimal offset.
    #[error("invalid page token '{0}', expected a non-negative integer")]
    InvalidPageToken(String),
}
