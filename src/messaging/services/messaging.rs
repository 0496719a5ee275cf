//! Service layer for posting messages and reading conversations.

use super::{ErrorKind, MessagingError, MessagingResult};
use crate::identity::{
    domain::{BuyerKey, CounterpartyId, Participant, Role, VendorKey},
    ports::IdentityResolver,
};
use crate::messaging::{
    domain::{
        Conversation, ConversationId, ConversationPage, Message, MessageBody, MessagePage,
        NewConversation, NewMessage, PageLimits, PageToken,
    },
    ports::{MessagingStore, MessagingTransaction, StoreError},
};
use mockable::Clock;
use std::sync::Arc;

/// A validated post, ready to be applied inside a transaction.
struct Post {
    buyer: BuyerKey,
    vendor: VendorKey,
    sender: Role,
    body: MessageBody,
}

/// Conversation threading and pagination service.
///
/// One service serves both roles: every operation takes the acting
/// [`Participant`] explicitly.
pub struct MessagingService<S, R, C>
where
    S: MessagingStore,
    R: IdentityResolver,
    C: Clock + Send + Sync + 'static,
{
    store: Arc<S>,
    resolver: Arc<R>,
    clock: Arc<C>,
    limits: PageLimits,
}

impl<S, R, C> Clone for MessagingService<S, R, C>
where
    S: MessagingStore,
    R: IdentityResolver,
    C: Clock + Send + Sync + 'static,
{
    fn clone(&self) -> Self {
        Self {
            store: Arc::clone(&self.store),
            resolver: Arc::clone(&self.resolver),
            clock: Arc::clone(&self.clock),
            limits: self.limits,
        }
    }
}

impl<S, R, C> MessagingService<S, R, C>
where
    S: MessagingStore,
    R: IdentityResolver,
    C: Clock + Send + Sync + 'static,
{
    /// Creates a service with the default page sizes.
    #[must_use]
    pub fn new(store: Arc<S>, resolver: Arc<R>, clock: Arc<C>) -> Self {
        Self {
            store,
            resolver,
            clock,
            limits: PageLimits::default(),
        }
    }

    /// Replaces the page sizes, typically with
    /// [`crate::config::MessagingConfig::page_limits`].
    #[must_use]
    pub const fn with_page_limits(mut self, limits: PageLimits) -> Self {
        self.limits = limits;
        self
    }

    /// Returns the page sizes in use.
    #[must_use]
    pub const fn page_limits(&self) -> PageLimits {
        self.limits
    }

    /// Posts a message from `sender` to the counterparty identified by
    /// `counterparty`.
    ///
    /// The counterparty id is read as a vendor id when a buyer posts and as a
    /// buyer id when a vendor posts. The conversation is created on first
    /// contact. Its counter, the recipient's unread flag and the new message
    /// are written in one transaction.
    ///
    /// # Errors
    ///
    /// Returns [`MessagingError::Validation`] for a blank body,
    /// [`MessagingError::CounterpartyNotFound`] when the counterparty does
    /// not resolve, and [`MessagingError::Storage`] or
    /// [`MessagingError::Identity`] on infrastructure failures. Nothing is
    /// written when an error is returned.
    #[tracing::instrument(skip(self, text))]
    pub async fn post_message(
        &self,
        sender: Participant,
        counterparty: CounterpartyId,
        text: impl Into<String> + Send,
    ) -> MessagingResult<Message> {
        let result = self.try_post(sender, counterparty, text.into()).await;
        match &result {
            Ok(message) => tracing::info!(
                conversation_key = %message.conversation(),
                number = %message.number(),
                "message posted"
            ),
            Err(err) => trace_failure(err),
        }
        result
    }

    async fn try_post(
        &self,
        sender: Participant,
        counterparty: CounterpartyId,
        text: String,
    ) -> MessagingResult<Message> {
        let body = MessageBody::new(text)?;
        let (buyer, vendor) = self.resolve_pair(sender, counterparty).await?;
        let post = Post {
            buyer,
            vendor,
            sender: sender.role(),
            body,
        };
        let clock = Arc::clone(&self.clock);
        self.store
            .transaction(move |tx| append_to_thread(tx, post, &*clock))
            .await
    }

    async fn resolve_pair(
        &self,
        sender: Participant,
        counterparty: CounterpartyId,
    ) -> MessagingResult<(BuyerKey, VendorKey)> {
        match sender {
            Participant::Buyer(buyer) => {
                let vendor = self
                    .resolver
                    .resolve_vendor_key(counterparty.as_vendor_id())
                    .await?
                    .ok_or(MessagingError::CounterpartyNotFound(counterparty))?;
                Ok((buyer, vendor))
            }
            Participant::Vendor(vendor) => {
                let buyer = self
                    .resolver
                    .resolve_buyer_key(counterparty.as_buyer_id())
                    .await?
                    .ok_or(MessagingError::CounterpartyNotFound(counterparty))?;
                Ok((buyer, vendor))
            }
        }
    }

    /// Reads one page of a conversation's history, newest first.
    ///
    /// The returned page's next offset is always `offset` plus the message
    /// page size, even when the page is short or empty.
    ///
    /// # Errors
    ///
    /// Returns [`MessagingError::ConversationNotFound`] when no conversation
    /// has the given id, or [`MessagingError::Storage`] when the read fails.
    #[tracing::instrument(skip(self))]
    pub async fn messages_page(
        &self,
        conversation: ConversationId,
        offset: u64,
    ) -> MessagingResult<MessagePage> {
        self.try_messages_page(conversation, offset)
            .await
            .inspect_err(trace_failure)
    }

    async fn try_messages_page(
        &self,
        conversation: ConversationId,
        offset: u64,
    ) -> MessagingResult<MessagePage> {
        let limit = self.limits.message_page_size();
        let found = self
            .store
            .find_conversation_by_id(conversation)
            .await?
            .ok_or(MessagingError::ConversationNotFound(conversation))?;
        let messages = self.store.messages_page(found.key(), offset, limit).await?;
        Ok(MessagePage::new(messages, offset, limit))
    }

    /// Lists one page of `participant`'s conversations in creation order.
    ///
    /// `page_token` is the decimal offset returned by the previous call; an
    /// empty token starts from the beginning.
    ///
    /// # Errors
    ///
    /// Returns [`MessagingError::Validation`] when the token is malformed,
    /// or [`MessagingError::Storage`] when the read fails.
    #[tracing::instrument(skip(self))]
    pub async fn conversations_page(
        &self,
        participant: Participant,
        page_token: &str,
    ) -> MessagingResult<ConversationPage> {
        self.try_conversations_page(participant, page_token)
            .await
            .inspect_err(trace_failure)
    }

    async fn try_conversations_page(
        &self,
        participant: Participant,
        page_token: &str,
    ) -> MessagingResult<ConversationPage> {
        let page_size = self.limits.conversation_page_size();
        let token = PageToken::parse(page_token)?;
        let conversations = self
            .store
            .conversations_for(participant, token.offset(), page_size)
            .await?;
        Ok(ConversationPage::new(conversations, token, page_size))
    }

    /// Lists every conversation with unseen messages for `participant`.
    ///
    /// # Errors
    ///
    /// Returns [`MessagingError::Storage`] when the read fails.
    #[tracing::instrument(skip(self))]
    pub async fn unread_conversations(
        &self,
        participant: Participant,
    ) -> MessagingResult<Vec<Conversation>> {
        self.store
            .unread_conversations_for(participant)
            .await
            .map_err(MessagingError::from)
            .inspect_err(trace_failure)
    }

    /// Clears `participant`'s unread flag on a conversation.
    ///
    /// Marking an already read conversation succeeds without writing.
    ///
    /// # Errors
    ///
    /// Returns [`MessagingError::ConversationNotFound`] when the conversation
    /// does not exist or `participant` is not one of its parties, or
    /// [`MessagingError::Storage`] when the update fails.
    #[tracing::instrument(skip(self))]
    pub async fn mark_read(
        &self,
        participant: Participant,
        conversation: ConversationId,
    ) -> MessagingResult<Conversation> {
        let clock = Arc::clone(&self.clock);
        self.store
            .transaction(move |tx| -> MessagingResult<Conversation> {
                let mut found = tx
                    .lock_conversation_by_id(conversation)?
                    .filter(|candidate| candidate.involves(participant))
                    .ok_or(MessagingError::ConversationNotFound(conversation))?;
                if found.mark_read(participant.role(), &*clock) {
                    tx.update_conversation(&found)?;
                }
                Ok(found)
            })
            .await
            .inspect_err(trace_failure)
    }

    /// Returns the conversation between `buyer` and `vendor`, if any.
    ///
    /// # Errors
    ///
    /// Returns [`MessagingError::Storage`] when the read fails.
    #[tracing::instrument(skip(self))]
    pub async fn find_conversation(
        &self,
        buyer: BuyerKey,
        vendor: VendorKey,
    ) -> MessagingResult<Option<Conversation>> {
        self.store
            .find_conversation_by_participants(buyer, vendor)
            .await
            .map_err(MessagingError::from)
            .inspect_err(trace_failure)
    }
}

/// Finds or opens the pair's conversation and appends the post to it.
fn append_to_thread(
    tx: &mut dyn MessagingTransaction,
    post: Post,
    clock: &impl Clock,
) -> MessagingResult<Message> {
    let conversation = match tx.lock_conversation(post.buyer, post.vendor)? {
        Some(existing) => continue_thread(tx, existing, post.sender, clock)?,
        None => open_thread(tx, &post, clock)?,
    };
    let message = NewMessage::next_in(&conversation, post.sender, post.body, clock);
    Ok(tx.append_message(&message)?)
}

fn open_thread(
    tx: &mut dyn MessagingTransaction,
    post: &Post,
    clock: &impl Clock,
) -> MessagingResult<Conversation> {
    let opening = NewConversation::open(post.buyer, post.vendor, post.sender, clock);
    if let Some(created) = tx.insert_conversation(&opening)? {
        tracing::info!(
            conversation = %created.id(),
            buyer = %post.buyer,
            vendor = %post.vendor,
            "conversation opened"
        );
        return Ok(created);
    }

    // Another transaction opened the pair's conversation first.
    let existing = tx
        .lock_conversation(post.buyer, post.vendor)?
        .ok_or_else(|| {
            StoreError::conflict(format!(
                "conversation between buyer {} and vendor {} vanished after insert conflict",
                post.buyer, post.vendor
            ))
        })?;
    continue_thread(tx, existing, post.sender, clock)
}

fn continue_thread(
    tx: &mut dyn MessagingTransaction,
    mut conversation: Conversation,
    sender: Role,
    clock: &impl Clock,
) -> MessagingResult<Conversation> {
    conversation.record_message(sender, clock);
    tx.update_conversation(&conversation)?;
    Ok(conversation)
}

fn trace_failure(err: &MessagingError) {
    match err.kind() {
        ErrorKind::Internal => tracing::error!(error = %err, "messaging operation failed"),
        ErrorKind::NotFound | ErrorKind::Invalid => {
            tracing::debug!(error = %err, "messaging request rejected");
        }
    }
}
