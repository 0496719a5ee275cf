//! Offset pagination over messages and conversations.

use super::{Conversation, Message, MessagingDomainError};
use crate::config::{DEFAULT_CONVERSATION_PAGE_SIZE, DEFAULT_MESSAGE_PAGE_SIZE};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Page sizes applied by the messaging service.
///
/// The same sizes serve buyer and vendor views.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct PageLimits {
    message_page_size: u64,
    conversation_page_size: u64,
}

impl PageLimits {
    /// Creates limits from explicit page sizes.
    #[must_use]
    pub const fn new(message_page_size: u64, conversation_page_size: u64) -> Self {
        Self {
            message_page_size,
            conversation_page_size,
        }
    }

    /// Messages returned per history page.
    #[must_use]
    pub const fn message_page_size(self) -> u64 {
        self.message_page_size
    }

    /// Conversations returned per listing page.
    #[must_use]
    pub const fn conversation_page_size(self) -> u64 {
        self.conversation_page_size
    }
}

impl Default for PageLimits {
    fn default() -> Self {
        Self::new(DEFAULT_MESSAGE_PAGE_SIZE, DEFAULT_CONVERSATION_PAGE_SIZE)
    }
}

/// Opaque resume point for conversation listings.
///
/// On the wire the token is the decimal offset; the empty string stands for
/// the first page.
///
/// # Examples
///
/// ```
/// use agora::messaging::domain::PageToken;
///
/// assert_eq!(PageToken::parse("").expect("empty token").offset(), 0);
/// assert_eq!(PageToken::parse("40").expect("numeric token").offset(), 40);
/// assert!(PageToken::parse("forty").is_err());
/// ```
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct PageToken(u64);

impl PageToken {
    /// Token for the first page.
    pub const FIRST: Self = Self(0);

    /// Creates a token from an offset.
    #[must_use]
    pub const fn from_offset(offset: u64) -> Self {
        Self(offset)
    }

    /// Parses a token received from a client.
    ///
    /// # Errors
    ///
    /// Returns [`MessagingDomainError::InvalidPageToken`] when the token is
    /// neither empty nor a non-negative decimal integer.
    pub fn parse(raw: &str) -> Result<Self, MessagingDomainError> {
        let trimmed = raw.trim();
        if trimmed.is_empty() {
            return Ok(Self::FIRST);
        }
        trimmed
            .parse()
            .map(Self)
            .map_err(|_| MessagingDomainError::InvalidPageToken(raw.to_owned()))
    }

    /// Returns the offset encoded by the token.
    #[must_use]
    pub const fn offset(self) -> u64 {
        self.0
    }

    /// Returns the token that follows a page of `page_size` items.
    #[must_use]
    pub const fn advance(self, page_size: u64) -> Self {
        Self(self.0.saturating_add(page_size))
    }
}

impl fmt::Display for PageToken {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// One page of a conversation's history, newest first.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MessagePage {
    messages: Vec<Message>,
    next_offset: u64,
}

impl MessagePage {
    /// Builds a page read at `offset` with the given `limit`.
    ///
    /// The next offset is always `offset + limit`, even for a short or empty
    /// page. Clients stop when a page comes back empty.
    #[must_use]
    pub const fn new(messages: Vec<Message>, offset: u64, limit: u64) -> Self {
        Self {
            messages,
            next_offset: offset.saturating_add(limit),
        }
    }

    /// Messages on this page.
    #[must_use]
    pub fn messages(&self) -> &[Message] {
        &self.messages
    }

    /// Offset to request for the following page.
    #[must_use]
    pub const fn next_offset(&self) -> u64 {
        self.next_offset
    }

    /// Consumes the page and returns its messages.
    #[must_use]
    pub fn into_messages(self) -> Vec<Message> {
        self.messages
    }
}

/// One page of a participant's conversations, in storage key order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConversationPage {
    conversations: Vec<Conversation>,
    next_page_token: PageToken,
}

impl ConversationPage {
    /// Builds a page read at `token` with the given page size.
    #[must_use]
    pub const fn new(conversations: Vec<Conversation>, token: PageToken, page_size: u64) -> Self {
        Self {
            conversations,
            next_page_token: token.advance(page_size),
        }
    }

    /// Conversations on this page.
    #[must_use]
    pub fn conversations(&self) -> &[Conversation] {
        &self.conversations
    }

    /// Token to request for the following page.
    #[must_use]
    pub const fn next_page_token(&self) -> PageToken {
        self.next_page_token
    }

    /// Consumes the page and returns its conversations.
    #[must_use]
    pub fn into_conversations(self) -> Vec<Conversation> {
        self.conversations
    }
}
