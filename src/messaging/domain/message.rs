//! Message value objects.

use super::{
    Conversation, ConversationKey, MessageId, MessageKey, MessageNumber, MessagingDomainError,
};
use crate::identity::domain::Role;
use chrono::{DateTime, Utc};
use mockable::Clock;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Validated message text.
///
/// The body is stored exactly as written; it is only rejected when nothing
/// but whitespace remains after trimming.
///
/// # Examples
///
///     use agora::messaging::domain::MessageBody;
///
///     let body = MessageBody::new("Your Mother was a hamster").expect("valid");
///     assert_eq!(body.as_str(), "Your Mother was a hamster");
///     assert!(MessageBody::new("   ").is_err());
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct MessageBody(String);

impl MessageBody {
    /// Creates a validated message body.
    ///
    /// # Errors
    ///
    /// Returns [`MessagingDomainError::EmptyBody`] when the value is empty
    /// after trimming.
    pub fn new(value: impl Into<String>) -> Result<Self, MessagingDomainError> {
        let raw = value.into();
        if raw.trim().is_empty() {
            return Err(MessagingDomainError::EmptyBody);
        }
        Ok(Self(raw))
    }

    /// Returns the body as a string slice.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Consumes the body and returns the owned text.
    #[must_use]
    pub fn into_inner(self) -> String {
        self.0
    }
}

impl AsRef<str> for MessageBody {
    fn as_ref(&self) -> &str {
        self.as_str()
    }
}

impl fmt::Display for MessageBody {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// An immutable message within a conversation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Message {
    key: MessageKey,
    id: MessageId,
    conversation: ConversationKey,
    body: MessageBody,
    buyer_sent: bool,
    number: MessageNumber,
    created_at: DateTime<Utc>,
}

/// Parameter object for reconstructing a persisted message.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PersistedMessageData {
    /// Storage key.
    pub key: MessageKey,
    /// Public identifier.
    pub id: MessageId,
    /// Owning conversation.
    pub conversation: ConversationKey,
    /// Message text.
    pub body: MessageBody,
    /// Whether the buyer authored the message.
    pub buyer_sent: bool,
    /// Position within the conversation.
    pub number: MessageNumber,
    /// Creation timestamp.
    pub created_at: DateTime<Utc>,
}

/// A message that has not been stored yet.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewMessage {
    id: MessageId,
    conversation: ConversationKey,
    body: MessageBody,
    buyer_sent: bool,
    number: MessageNumber,
    created_at: DateTime<Utc>,
}

impl NewMessage {
    /// Describes the message just accounted for by `conversation`.
    ///
    /// The number is taken from the conversation's counter, so this must be
    /// called after [`Conversation::record_message`] or on a freshly opened
    /// conversation.
    #[must_use]
    pub fn next_in(
        conversation: &Conversation,
        sender: Role,
        body: MessageBody,
        clock: &impl Clock,
    ) -> Self {
        Self {
            id: MessageId::new(),
            conversation: conversation.key(),
            body,
            buyer_sent: sender == Role::Buyer,
            number: conversation.latest_number(),
            created_at: clock.utc(),
        }
    }

    /// Public identifier the message will carry.
    #[must_use]
    pub const fn id(&self) -> MessageId {
        self.id
    }

    /// Owning conversation.
    #[must_use]
    pub const fn conversation(&self) -> ConversationKey {
        self.conversation
    }

    /// Message text.
    #[must_use]
    pub const fn body(&self) -> &MessageBody {
        &self.body
    }

    /// Whether the buyer authored the message.
    #[must_use]
    pub const fn buyer_sent(&self) -> bool {
        self.buyer_sent
    }

    /// Position within the conversation.
    #[must_use]
    pub const fn number(&self) -> MessageNumber {
        self.number
    }

    /// Creation timestamp.
    #[must_use]
    pub const fn created_at(&self) -> DateTime<Utc> {
        self.created_at
    }

    /// Attaches the storage key assigned by the store.
    #[must_use]
    pub fn into_stored(self, key: MessageKey) -> Message {
        Message {
            key,
            id: self.id,
            conversation: self.conversation,
            body: self.body,
            buyer_sent: self.buyer_sent,
            number: self.number,
            created_at: self.created_at,
        }
    }
}

impl Message {
    /// Reconstructs a message from persisted storage.
    #[must_use]
    pub fn from_persisted(data: PersistedMessageData) -> Self {
        Self {
            key: data.key,
            id: data.id,
            conversation: data.conversation,
            body: data.body,
            buyer_sent: data.buyer_sent,
            number: data.number,
            created_at: data.created_at,
        }
    }

    /// Returns the storage key.
    #[must_use]
    pub const fn key(&self) -> MessageKey {
        self.key
    }

    /// Returns the public identifier.
    #[must_use]
    pub const fn id(&self) -> MessageId {
        self.id
    }

    /// Returns the owning conversation.
    #[must_use]
    pub const fn conversation(&self) -> ConversationKey {
        self.conversation
    }

    /// Returns the message text.
    #[must_use]
    pub const fn body(&self) -> &MessageBody {
        &self.body
    }

    /// Returns whether the buyer authored the message.
    #[must_use]
    pub const fn buyer_sent(&self) -> bool {
        self.buyer_sent
    }

    /// Returns the role that authored the message.
    #[must_use]
    pub const fn sender(&self) -> Role {
        if self.buyer_sent {
            Role::Buyer
        } else {
            Role::Vendor
        }
    }

    /// Returns the position within the conversation.
    #[must_use]
    pub const fn number(&self) -> MessageNumber {
        self.number
    }

    /// Returns the creation timestamp.
    #[must_use]
    pub const fn created_at(&self) -> DateTime<Utc> {
        self.created_at
    }
}
