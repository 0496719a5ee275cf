//! JSON views returned to marketplace clients.
//!
//! Field names are camelCase and timestamps are Unix seconds. Internal
//! storage keys never appear in a view.

use super::domain::{
    Conversation, ConversationId, ConversationPage, Message, MessageId, MessagePage,
};
use super::services::{ErrorKind, MessagingError};
use serde::{Deserialize, Serialize};

/// Public message text shown for infrastructure failures.
pub const INTERNAL_ERROR_MESSAGE: &str = "internal error";

/// A message as shown in a conversation history.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MessageView {
    /// Public message identifier.
    pub id: MessageId,
    /// Whether the buyer authored the message.
    pub buyer_sent: bool,
    /// Message text.
    pub description: String,
    /// Creation time in Unix seconds.
    pub created_at: i64,
    /// Position within the conversation.
    pub message_number: u64,
}

impl From<&Message> for MessageView {
    fn from(message: &Message) -> Self {
        Self {
            id: message.id(),
            buyer_sent: message.buyer_sent(),
            description: message.body().as_str().to_owned(),
            created_at: message.created_at().timestamp(),
            message_number: message.number().value(),
        }
    }
}

/// A conversation reference in a listing.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ConversationView {
    /// Public conversation identifier.
    pub id: ConversationId,
}

impl From<&Conversation> for ConversationView {
    fn from(conversation: &Conversation) -> Self {
        Self {
            id: conversation.id(),
        }
    }
}

/// A page of conversation history.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MessagePageView {
    /// Offset to request for the following page.
    pub offset: u64,
    /// Messages on this page, newest first.
    pub messages: Vec<MessageView>,
}

impl From<&MessagePage> for MessagePageView {
    fn from(page: &MessagePage) -> Self {
        Self {
            offset: page.next_offset(),
            messages: page.messages().iter().map(MessageView::from).collect(),
        }
    }
}

/// A page of a participant's conversations.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ConversationPageView {
    /// Token to request for the following page.
    pub page_token: String,
    /// Conversations on this page.
    pub conversations: Vec<ConversationView>,
}

impl From<&ConversationPage> for ConversationPageView {
    fn from(page: &ConversationPage) -> Self {
        Self {
            page_token: page.next_page_token().to_string(),
            conversations: page
                .conversations()
                .iter()
                .map(ConversationView::from)
                .collect(),
        }
    }
}

/// Every conversation with unseen messages.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UnreadConversationsView {
    /// Unread conversations in creation order.
    pub conversations: Vec<ConversationView>,
}

impl From<&[Conversation]> for UnreadConversationsView {
    fn from(conversations: &[Conversation]) -> Self {
        Self {
            conversations: conversations.iter().map(ConversationView::from).collect(),
        }
    }
}

/// Error body returned with a failed request.
///
/// Infrastructure failures are reported with a fixed message so that
/// storage details never reach a client.
///
/// # Examples
///
/// ```
/// use agora::messaging::api::ErrorView;
/// use agora::messaging::domain::MessagingDomainError;
/// use agora::messaging::ports::StoreError;
/// use agora::messaging::services::MessagingError;
///
/// let invalid = ErrorView::from(&MessagingError::from(MessagingDomainError::EmptyBody));
/// assert_eq!(invalid.error, "message body must not be empty");
///
/// let internal = ErrorView::from(&MessagingError::from(StoreError::connection("refused")));
/// assert_eq!(internal.error, "internal error");
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ErrorView {
    /// Human-readable error message.
    pub error: String,
}

impl From<&MessagingError> for ErrorView {
    fn from(err: &MessagingError) -> Self {
        let error = match err.kind() {
            ErrorKind::Internal => INTERNAL_ERROR_MESSAGE.to_owned(),
            ErrorKind::NotFound | ErrorKind::Invalid => err.to_string(),
        };
        Self { error }
    }
}
