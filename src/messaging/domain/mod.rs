//! Domain types for conversations and messages.
//!
//! This module contains pure domain types with no infrastructure
//! dependencies. Persisted aggregates are rebuilt through
//! `from_persisted` constructors; new records are described by the `New*`
//! types and receive their storage keys from the store.

mod conversation;
mod error;
mod ids;
mod message;
mod pagination;
mod unread;

pub use conversation::{Conversation, NewConversation, PersistedConversationData};
pub use error::MessagingDomainError;
pub use ids::{ConversationId, ConversationKey, MessageId, MessageKey, MessageNumber};
pub use message::{Message, MessageBody, NewMessage, PersistedMessageData};
pub use pagination::{ConversationPage, MessagePage, PageLimits, PageToken};
pub use unread::UnreadFlags;
