//! Diesel row models for conversation and message persistence.

use super::schema::{conversations, messages};
use crate::identity::domain::{BuyerKey, VendorKey};
use crate::messaging::{
    domain::{
        Conversation, ConversationId, ConversationKey, Message, MessageBody, MessageId,
        MessageKey, MessageNumber, NewConversation, NewMessage, PersistedConversationData,
        PersistedMessageData, UnreadFlags,
    },
    ports::{StoreError, StoreResult},
};
use chrono::{DateTime, Utc};
use diesel::prelude::*;

/// Query result row for conversations.
#[derive(Debug, Clone, Queryable, Selectable)]
#[diesel(table_name = conversations)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub struct ConversationRow {
    /// Internal storage key.
    pub pk: i64,
    /// Public identifier.
    pub id: uuid::Uuid,
    /// Buyer key.
    pub buyer_pk: i64,
    /// Vendor key.
    pub vendor_pk: i64,
    /// Message counter.
    pub message_count: i64,
    /// Buyer-side unread flag.
    pub buyer_unread: bool,
    /// Vendor-side unread flag.
    pub vendor_unread: bool,
    /// Creation timestamp.
    pub created_at: DateTime<Utc>,
    /// Last update timestamp.
    pub updated_at: DateTime<Utc>,
}

/// Insert model for conversations.
#[derive(Debug, Clone, Insertable)]
#[diesel(table_name = conversations)]
pub struct NewConversationRow {
    /// Public identifier.
    pub id: uuid::Uuid,
    /// Buyer key.
    pub buyer_pk: i64,
    /// Vendor key.
    pub vendor_pk: i64,
    /// Message counter.
    pub message_count: i64,
    /// Buyer-side unread flag.
    pub buyer_unread: bool,
    /// Vendor-side unread flag.
    pub vendor_unread: bool,
    /// Creation timestamp.
    pub created_at: DateTime<Utc>,
    /// Last update timestamp.
    pub updated_at: DateTime<Utc>,
}

/// Mutable conversation columns written after a post or mark-read.
#[derive(Debug, Clone, AsChangeset)]
#[diesel(table_name = conversations)]
pub struct ConversationChanges {
    /// Message counter.
    pub message_count: i64,
    /// Buyer-side unread flag.
    pub buyer_unread: bool,
    /// Vendor-side unread flag.
    pub vendor_unread: bool,
    /// Last update timestamp.
    pub updated_at: DateTime<Utc>,
}

/// Query result row for messages.
#[derive(Debug, Clone, Queryable, Selectable)]
#[diesel(table_name = messages)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub struct MessageRow {
    /// Internal storage key.
    pub pk: i64,
    /// Public identifier.
    pub id: uuid::Uuid,
    /// Owning conversation key.
    pub conversation_pk: i64,
    /// Message body.
    pub description: String,
    /// Whether the buyer authored the message.
    pub buyer_sent: bool,
    /// Position within the conversation.
    pub conversation_number: i64,
    /// Creation timestamp.
    pub created_at: DateTime<Utc>,
}

/// Insert model for messages.
#[derive(Debug, Clone, Insertable)]
#[diesel(table_name = messages)]
pub struct NewMessageRow {
    /// Public identifier.
    pub id: uuid::Uuid,
    /// Owning conversation key.
    pub conversation_pk: i64,
    /// Message body.
    pub description: String,
    /// Whether the buyer authored the message.
    pub buyer_sent: bool,
    /// Position within the conversation.
    pub conversation_number: i64,
    /// Creation timestamp.
    pub created_at: DateTime<Utc>,
}

fn to_column(value: u64, column: &str) -> StoreResult<i64> {
    i64::try_from(value)
        .map_err(|_| StoreError::serialization(format!("{column} value {value} exceeds BIGINT")))
}

fn from_column(value: i64, column: &str) -> StoreResult<u64> {
    u64::try_from(value)
        .map_err(|_| StoreError::serialization(format!("{column} value {value} is negative")))
}

impl NewConversationRow {
    /// Builds the insert row for a conversation opened by its first message.
    pub fn from_domain(conversation: &NewConversation) -> StoreResult<Self> {
        let unread = conversation.unread();
        Ok(Self {
            id: conversation.id().into_inner(),
            buyer_pk: conversation.buyer().value(),
            vendor_pk: conversation.vendor().value(),
            message_count: to_column(conversation.message_count(), "message_count")?,
            buyer_unread: unread.buyer(),
            vendor_unread: unread.vendor(),
            created_at: conversation.created_at(),
            updated_at: conversation.created_at(),
        })
    }
}

impl ConversationChanges {
    /// Captures the mutable state of a conversation.
    pub fn from_domain(conversation: &Conversation) -> StoreResult<Self> {
        let unread = conversation.unread();
        Ok(Self {
            message_count: to_column(conversation.message_count(), "message_count")?,
            buyer_unread: unread.buyer(),
            vendor_unread: unread.vendor(),
            updated_at: conversation.updated_at(),
        })
    }
}

impl ConversationRow {
    /// Converts the row into the domain aggregate.
    pub fn into_domain(self) -> StoreResult<Conversation> {
        let message_count = from_column(self.message_count, "message_count")?;
        Ok(Conversation::from_persisted(PersistedConversationData {
            key: ConversationKey::new(self.pk),
            id: ConversationId::from_uuid(self.id),
            buyer: BuyerKey::new(self.buyer_pk),
            vendor: VendorKey::new(self.vendor_pk),
            message_count,
            unread: UnreadFlags::from_persisted(self.buyer_unread, self.vendor_unread),
            created_at: self.created_at,
            updated_at: self.updated_at,
        }))
    }
}

impl NewMessageRow {
    /// Builds the insert row for a message.
    pub fn from_domain(message: &NewMessage) -> StoreResult<Self> {
        Ok(Self {
            id: message.id().into_inner(),
            conversation_pk: message.conversation().value(),
            description: message.body().as_str().to_owned(),
            buyer_sent: message.buyer_sent(),
            conversation_number: to_column(message.number().value(), "conversation_number")?,
            created_at: message.created_at(),
        })
    }
}

impl MessageRow {
    /// Converts the row into the domain value.
    pub fn into_domain(self) -> StoreResult<Message> {
        let number = from_column(self.conversation_number, "conversation_number")?;
        let body = MessageBody::new(self.description)
            .map_err(|err| StoreError::serialization(err.to_string()))?;
        Ok(Message::from_persisted(PersistedMessageData {
            key: MessageKey::new(self.pk),
            id: MessageId::from_uuid(self.id),
            conversation: ConversationKey::new(self.conversation_pk),
            body,
            buyer_sent: self.buyer_sent,
            number: MessageNumber::new(number),
            created_at: self.created_at,
        }))
    }
}
