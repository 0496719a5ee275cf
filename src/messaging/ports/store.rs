//! Storage port for conversations and their messages.
//!
//! Writes go through [`MessagingStore::transaction`], which hands a
//! synchronous [`MessagingTransaction`] to a unit of work and commits only
//! when the work returns `Ok`. Reads are standalone queries and are not
//! serialised with writes.

use crate::identity::domain::{BuyerKey, Participant, VendorKey};
use crate::messaging::domain::{
    Conversation, ConversationId, ConversationKey, Message, NewConversation, NewMessage,
};
use async_trait::async_trait;
use std::sync::Arc;
use thiserror::Error;

/// Result type for messaging store operations.
pub type StoreResult<T> = Result<T, StoreError>;

/// Operations available inside a storage transaction.
///
/// Every call participates in the enclosing transaction. Lookups lock the
/// conversation row they return so that concurrent posts to the same pair
/// are applied one after another.
pub trait MessagingTransaction {
    /// Finds and locks the conversation between `buyer` and `vendor`.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError`] when the query fails.
    fn lock_conversation(
        &mut self,
        buyer: BuyerKey,
        vendor: VendorKey,
    ) -> StoreResult<Option<Conversation>>;

    /// Finds and locks a conversation by public identifier.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError`] when the query fails.
    fn lock_conversation_by_id(&mut self, id: ConversationId) -> StoreResult<Option<Conversation>>;

    /// Inserts a conversation unless one already exists for the pair.
    ///
    /// Returns `None` when another transaction created the pair's
    /// conversation first; the caller should lock and update that one.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError`] when the insert fails for any other reason.
    fn insert_conversation(
        &mut self,
        conversation: &NewConversation,
    ) -> StoreResult<Option<Conversation>>;

    /// Writes the counter, unread flags and timestamp of a conversation.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError::Conflict`] when the conversation does not
    /// exist, or another [`StoreError`] when the update fails.
    fn update_conversation(&mut self, conversation: &Conversation) -> StoreResult<()>;

    /// Appends a message and returns it with its storage key.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError`] when the insert fails, including when the
    /// message number is already taken in its conversation.
    fn append_message(&mut self, message: &NewMessage) -> StoreResult<Message>;
}

/// Conversation and message persistence contract.
#[async_trait]
pub trait MessagingStore: Send + Sync {
    /// Runs `work` inside one atomic transaction.
    ///
    /// Changes are committed when `work` returns `Ok` and discarded when it
    /// returns `Err`. Failures of the transaction machinery itself are
    /// converted into the caller's error type.
    async fn transaction<T, E, F>(&self, work: F) -> Result<T, E>
    where
        F: FnOnce(&mut dyn MessagingTransaction) -> Result<T, E> + Send + 'static,
        T: Send + 'static,
        E: From<StoreError> + Send + 'static;

    /// Finds a conversation by public identifier.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError`] when the query fails.
    async fn find_conversation_by_id(
        &self,
        id: ConversationId,
    ) -> StoreResult<Option<Conversation>>;

    /// Finds the conversation between `buyer` and `vendor`.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError`] when the query fails.
    async fn find_conversation_by_participants(
        &self,
        buyer: BuyerKey,
        vendor: VendorKey,
    ) -> StoreResult<Option<Conversation>>;

    /// Lists `participant`'s conversations in ascending key order.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError`] when the query fails.
    async fn conversations_for(
        &self,
        participant: Participant,
        offset: u64,
        limit: u64,
    ) -> StoreResult<Vec<Conversation>>;

    /// Lists the conversations unread by `participant` in ascending key
    /// order.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError`] when the query fails.
    async fn unread_conversations_for(
        &self,
        participant: Participant,
    ) -> StoreResult<Vec<Conversation>>;

    /// Reads a window of a conversation's messages, newest first.
    ///
    /// Messages are ordered by descending creation time with ties broken by
    /// descending message number.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError`] when the query fails.
    async fn messages_page(
        &self,
        conversation: ConversationKey,
        offset: u64,
        limit: u64,
    ) -> StoreResult<Vec<Message>>;
}

/// Errors returned by messaging store implementations.
#[derive(Debug, Clone, Error)]
pub enum StoreError {
    /// A database error occurred.
    #[error("database error: {0}")]
    Database(Arc<dyn std::error::Error + Send + Sync>),

    /// A stored value could not be converted.
    #[error("serialization error: {0}")]
    Serialization(String),

    /// A connection error occurred.
    #[error("connection error: {0}")]
    Connection(String),

    /// A write did not match the stored state it expected.
    #[error("write conflict: {0}")]
    Conflict(String),
}

impl StoreError {
    /// Creates a database error from any error type.
    #[must_use]
    pub fn database(err: impl std::error::Error + Send + Sync + 'static) -> Self {
        Self::Database(Arc::new(err))
    }

    /// Creates a serialization error.
    #[must_use]
    pub fn serialization(message: impl Into<String>) -> Self {
        Self::Serialization(message.into())
    }

    /// Creates a connection error.
    #[must_use]
    pub fn connection(message: impl Into<String>) -> Self {
        Self::Connection(message.into())
    }

    /// Creates a conflict error.
    #[must_use]
    pub fn conflict(message: impl Into<String>) -> Self {
        Self::Conflict(message.into())
    }
}

impl From<diesel::result::Error> for StoreError {
    fn from(err: diesel::result::Error) -> Self {
        Self::database(err)
    }
}
