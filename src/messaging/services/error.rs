//! Service-level errors for messaging operations.

use crate::identity::{domain::CounterpartyId, ports::IdentityError};
use crate::messaging::{
    domain::{ConversationId, MessagingDomainError},
    ports::StoreError,
};
use thiserror::Error;

/// Errors returned by [`super::MessagingService`].
#[derive(Debug, Clone, Error)]
pub enum MessagingError {
    /// The counterparty's public identifier does not resolve.
    #[error("counterparty not found: {0}")]
    CounterpartyNotFound(CounterpartyId),

    /// The conversation does not exist or is not visible to the caller.
    #[error("conversation not found: {0}")]
    ConversationNotFound(ConversationId),

    /// Input validation failed.
    #[error(transparent)]
    Validation(#[from] MessagingDomainError),

    /// The store failed; the enclosing transaction was rolled back.
    #[error(transparent)]
    Storage(#[from] StoreError),

    /// The identity resolver failed.
    #[error(transparent)]
    Identity(#[from] IdentityError),
}

/// Coarse classification of a [`MessagingError`] for callers that map
/// failures onto a transport.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorKind {
    /// A referenced participant or conversation does not exist.
    NotFound,
    /// The request was malformed.
    Invalid,
    /// An infrastructure failure; details are not exposed.
    Internal,
}

impl MessagingError {
    /// Returns the error's classification.
    #[must_use]
    pub const fn kind(&self) -> ErrorKind {
        match self {
            Self::CounterpartyNotFound(_) | Self::ConversationNotFound(_) => ErrorKind::NotFound,
            Self::Validation(_) => ErrorKind::Invalid,
            Self::Storage(_) | Self::Identity(_) => ErrorKind::Internal,
        }
    }
}

/// Result type for messaging service operations.
pub type MessagingResult<T> = Result<T, MessagingError>;
