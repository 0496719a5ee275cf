//! Conversation aggregate root.

use super::{ConversationId, ConversationKey, MessageNumber, UnreadFlags};
use crate::identity::domain::{BuyerKey, Participant, Role, VendorKey};
use chrono::{DateTime, Utc};
use mockable::Clock;

/// The thread between one buyer and one vendor.
///
/// A conversation is created by the first post between a pair and is never
/// deleted. Its message counter only grows, one step per appended message.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Conversation {
    key: ConversationKey,
    id: ConversationId,
    buyer: BuyerKey,
    vendor: VendorKey,
    message_count: u64,
    unread: UnreadFlags,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

/// Parameter object for reconstructing a persisted conversation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PersistedConversationData {
    /// Storage key.
    pub key: ConversationKey,
    /// Public identifier.
    pub id: ConversationId,
    /// Buyer side of the pair.
    pub buyer: BuyerKey,
    /// Vendor side of the pair.
    pub vendor: VendorKey,
    /// Number of messages appended so far.
    pub message_count: u64,
    /// Persisted unread flags.
    pub unread: UnreadFlags,
    /// Creation timestamp.
    pub created_at: DateTime<Utc>,
    /// Latest modification timestamp.
    pub updated_at: DateTime<Utc>,
}

/// A conversation that has not been stored yet.
///
/// Built only by [`NewConversation::open`], which describes the state right
/// after the opening message: a counter of one and the recipient flagged
/// unread.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewConversation {
    id: ConversationId,
    buyer: BuyerKey,
    vendor: VendorKey,
    unread: UnreadFlags,
    created_at: DateTime<Utc>,
}

impl NewConversation {
    /// Describes a conversation opened by a post from `sender`.
    #[must_use]
    pub fn open(buyer: BuyerKey, vendor: VendorKey, sender: Role, clock: &impl Clock) -> Self {
        Self {
            id: ConversationId::new(),
            buyer,
            vendor,
            unread: UnreadFlags::opened_by(sender),
            created_at: clock.utc(),
        }
    }

    /// Public identifier the conversation will carry.
    #[must_use]
    pub const fn id(&self) -> ConversationId {
        self.id
    }

    /// Buyer side of the pair.
    #[must_use]
    pub const fn buyer(&self) -> BuyerKey {
        self.buyer
    }

    /// Vendor side of the pair.
    #[must_use]
    pub const fn vendor(&self) -> VendorKey {
        self.vendor
    }

    /// Counter value after the opening message.
    #[must_use]
    pub const fn message_count(&self) -> u64 {
        MessageNumber::FIRST.value()
    }

    /// Initial unread flags.
    #[must_use]
    pub const fn unread(&self) -> UnreadFlags {
        self.unread
    }

    /// Creation timestamp.
    #[must_use]
    pub const fn created_at(&self) -> DateTime<Utc> {
        self.created_at
    }

    /// Attaches the storage key assigned by the store.
    #[must_use]
    pub const fn into_stored(self, key: ConversationKey) -> Conversation {
        Conversation {
            key,
            id: self.id,
            buyer: self.buyer,
            vendor: self.vendor,
            message_count: MessageNumber::FIRST.value(),
            unread: self.unread,
            created_at: self.created_at,
            updated_at: self.created_at,
        }
    }
}

impl Conversation {
    /// Reconstructs a conversation from persisted storage.
    #[must_use]
    pub const fn from_persisted(data: PersistedConversationData) -> Self {
        Self {
            key: data.key,
            id: data.id,
            buyer: data.buyer,
            vendor: data.vendor,
            message_count: data.message_count,
            unread: data.unread,
            created_at: data.created_at,
            updated_at: data.updated_at,
        }
    }

    /// Returns the storage key.
    #[must_use]
    pub const fn key(&self) -> ConversationKey {
        self.key
    }

    /// Returns the public identifier.
    #[must_use]
    pub const fn id(&self) -> ConversationId {
        self.id
    }

    /// Returns the buyer side of the pair.
    #[must_use]
    pub const fn buyer(&self) -> BuyerKey {
        self.buyer
    }

    /// Returns the vendor side of the pair.
    #[must_use]
    pub const fn vendor(&self) -> VendorKey {
        self.vendor
    }

    /// Returns how many messages have been appended.
    #[must_use]
    pub const fn message_count(&self) -> u64 {
        self.message_count
    }

    /// Returns the number carried by the most recent message.
    #[must_use]
    pub const fn latest_number(&self) -> MessageNumber {
        MessageNumber::new(self.message_count)
    }

    /// Returns both unread flags.
    #[must_use]
    pub const fn unread(&self) -> UnreadFlags {
        self.unread
    }

    /// Returns whether `role`'s side has unseen messages.
    #[must_use]
    pub const fn is_unread_for(&self, role: Role) -> bool {
        self.unread.is_unread_for(role)
    }

    /// Returns the creation timestamp.
    #[must_use]
    pub const fn created_at(&self) -> DateTime<Utc> {
        self.created_at
    }

    /// Returns the latest modification timestamp.
    #[must_use]
    pub const fn updated_at(&self) -> DateTime<Utc> {
        self.updated_at
    }

    /// Returns whether `participant` is one of the two parties.
    #[must_use]
    pub fn involves(&self, participant: Participant) -> bool {
        match participant {
            Participant::Buyer(key) => self.buyer == key,
            Participant::Vendor(key) => self.vendor == key,
        }
    }

    /// Accounts for a new message from `sender` and returns its number.
    ///
    /// The sender's own flag is left as it was.
    pub fn record_message(&mut self, sender: Role, clock: &impl Clock) -> MessageNumber {
        self.message_count = self.message_count.saturating_add(1);
        self.unread.raise(sender.counterpart());
        self.touch(clock);
        self.latest_number()
    }

    /// Clears `reader`'s unread flag.
    ///
    /// Returns `false` when the flag was already clear, in which case nothing
    /// changes.
    pub fn mark_read(&mut self, reader: Role, clock: &impl Clock) -> bool {
        if !self.unread.is_unread_for(reader) {
            return false;
        }
        self.unread.clear(reader);
        self.touch(clock);
        true
    }

    fn touch(&mut self, clock: &impl Clock) {
        self.updated_at = clock.utc();
    }
}
