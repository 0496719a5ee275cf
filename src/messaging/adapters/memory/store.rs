//! Thread-safe in-memory messaging store.

use async_trait::async_trait;
use std::cmp::Reverse;
use std::collections::{BTreeMap, HashMap};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, PoisonError, RwLock};

use crate::identity::domain::{BuyerKey, Participant, VendorKey};
use crate::messaging::{
    domain::{
        Conversation, ConversationId, ConversationKey, Message, MessageKey, NewConversation,
        NewMessage,
    },
    ports::{MessagingStore, MessagingTransaction, StoreError, StoreResult},
};

/// In-memory implementation of [`MessagingStore`].
///
/// A single lock guards the whole state. Each transaction holds the write
/// lock, stages the conversations and messages it writes, and applies them
/// only when the unit of work succeeds, so a failed post leaves no trace.
///
/// Storage keys are allocated sequentially from 1, mirroring a `BIGSERIAL`
/// primary key.
#[derive(Debug, Clone, Default)]
pub struct InMemoryMessagingStore {
    state: Arc<RwLock<MemoryState>>,
    #[cfg(test)]
    pending_append_failures: Arc<AtomicUsize>,
}

#[derive(Debug, Default)]
struct MemoryState {
    conversations: BTreeMap<ConversationKey, Conversation>,
    messages: HashMap<ConversationKey, Vec<Message>>,
    last_conversation_key: i64,
    last_message_key: i64,
}

impl MemoryState {
    fn conversation_between(&self, buyer: BuyerKey, vendor: VendorKey) -> Option<&Conversation> {
        self.conversations
            .values()
            .find(|conversation| conversation.buyer() == buyer && conversation.vendor() == vendor)
    }

    fn conversation_by_id(&self, id: ConversationId) -> Option<&Conversation> {
        self.conversations
            .values()
            .find(|conversation| conversation.id() == id)
    }

    fn latest_number(&self, conversation: ConversationKey) -> Option<u64> {
        self.messages
            .get(&conversation)
            .and_then(|thread| thread.last())
            .map(|message| message.number().value())
    }

    fn apply(&mut self, changes: StagedChanges) {
        self.conversations.extend(changes.conversations);
        for message in changes.messages {
            self.messages
                .entry(message.conversation())
                .or_default()
                .push(message);
        }
        self.last_conversation_key = changes.last_conversation_key;
        self.last_message_key = changes.last_message_key;
    }
}

fn poisoned<G>(err: &PoisonError<G>) -> StoreError {
    StoreError::connection(format!("lock poisoned: {err}"))
}

fn window<T>(items: impl Iterator<Item = T>, offset: u64, limit: u64) -> Vec<T> {
    let skip = usize::try_from(offset).unwrap_or(usize::MAX);
    let take = usize::try_from(limit).unwrap_or(usize::MAX);
    items.skip(skip).take(take).collect()
}

impl InMemoryMessagingStore {
    /// Creates an empty store.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Makes the next `count` message appends fail with a connection error.
    #[cfg(test)]
    pub(crate) fn fail_next_appends(&self, count: usize) {
        self.pending_append_failures.store(count, Ordering::SeqCst);
    }

    /// Returns the number of stored messages across all conversations.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError`] if the internal lock is poisoned.
    pub fn message_total(&self) -> StoreResult<usize> {
        let state = self.state.read().map_err(|err| poisoned(&err))?;
        Ok(state.messages.values().map(Vec::len).sum())
    }
}

/// Writes made by a successful unit of work.
struct StagedChanges {
    conversations: BTreeMap<ConversationKey, Conversation>,
    messages: Vec<Message>,
    last_conversation_key: i64,
    last_message_key: i64,
}

/// Unit of work layered over the committed state.
///
/// Reads see staged rows first. Only the conversations and messages the work
/// touches are copied, and nothing reaches the committed state until the
/// staged changes are applied.
struct StagedTransaction<'a> {
    committed: &'a MemoryState,
    changes: StagedChanges,
    append_failures: Option<&'a AtomicUsize>,
}

impl<'a> StagedTransaction<'a> {
    const fn over(committed: &'a MemoryState, append_failures: Option<&'a AtomicUsize>) -> Self {
        Self {
            committed,
            changes: StagedChanges {
                conversations: BTreeMap::new(),
                messages: Vec::new(),
                last_conversation_key: committed.last_conversation_key,
                last_message_key: committed.last_message_key,
            },
            append_failures,
        }
    }

    fn take_injected_failure(&self) -> bool {
        self.append_failures.is_some_and(|remaining| {
            remaining
                .fetch_update(Ordering::SeqCst, Ordering::SeqCst, |count| {
                    count.checked_sub(1)
                })
                .is_ok()
        })
    }

    fn find(&self, matches: impl Fn(&Conversation) -> bool) -> Option<Conversation> {
        self.changes
            .conversations
            .values()
            .find(|conversation| matches(conversation))
            .or_else(|| {
                self.committed
                    .conversations
                    .values()
                    .find(|conversation| matches(conversation))
            })
            .cloned()
    }

    fn knows(&self, key: ConversationKey) -> bool {
        self.changes.conversations.contains_key(&key)
            || self.committed.conversations.contains_key(&key)
    }

    fn latest_number(&self, conversation: ConversationKey) -> Option<u64> {
        self.changes
            .messages
            .iter()
            .rev()
            .find(|message| message.conversation() == conversation)
            .map(|message| message.number().value())
            .or_else(|| self.committed.latest_number(conversation))
    }
}

impl MessagingTransaction for StagedTransaction<'_> {
    fn lock_conversation(
        &mut self,
        buyer: BuyerKey,
        vendor: VendorKey,
    ) -> StoreResult<Option<Conversation>> {
        Ok(self.find(|conversation| {
            conversation.buyer() == buyer && conversation.vendor() == vendor
        }))
    }

    fn lock_conversation_by_id(&mut self, id: ConversationId) -> StoreResult<Option<Conversation>> {
        Ok(self.find(|conversation| conversation.id() == id))
    }

    fn insert_conversation(
        &mut self,
        conversation: &NewConversation,
    ) -> StoreResult<Option<Conversation>> {
        let (buyer, vendor) = (conversation.buyer(), conversation.vendor());
        if self
            .find(|existing| existing.buyer() == buyer && existing.vendor() == vendor)
            .is_some()
        {
            return Ok(None);
        }
        self.changes.last_conversation_key += 1;
        let key = ConversationKey::new(self.changes.last_conversation_key);
        let stored = conversation.clone().into_stored(key);
        self.changes.conversations.insert(key, stored.clone());
        Ok(Some(stored))
    }

    fn update_conversation(&mut self, conversation: &Conversation) -> StoreResult<()> {
        if !self.knows(conversation.key()) {
            return Err(StoreError::conflict(format!(
                "conversation {} does not exist",
                conversation.id()
            )));
        }
        self.changes
            .conversations
            .insert(conversation.key(), conversation.clone());
        Ok(())
    }

    fn append_message(&mut self, message: &NewMessage) -> StoreResult<Message> {
        if self.take_injected_failure() {
            return Err(StoreError::connection("injected append failure"));
        }
        if !self.knows(message.conversation()) {
            return Err(StoreError::conflict(format!(
                "conversation key {} does not exist",
                message.conversation()
            )));
        }
        let number = message.number().value();
        if self
            .latest_number(message.conversation())
            .is_some_and(|latest| number <= latest)
        {
            return Err(StoreError::conflict(format!(
                "message number {} already used in conversation key {}",
                message.number(),
                message.conversation()
            )));
        }
        self.changes.last_message_key += 1;
        let key = MessageKey::new(self.changes.last_message_key);
        let stored = message.clone().into_stored(key);
        self.changes.messages.push(stored.clone());
        Ok(stored)
    }
}

#[async_trait]
impl MessagingStore for InMemoryMessagingStore {
    async fn transaction<T, E, F>(&self, work: F) -> Result<T, E>
    where
        F: FnOnce(&mut dyn MessagingTransaction) -> Result<T, E> + Send + 'static,
        T: Send + 'static,
        E: From<StoreError> + Send + 'static,
    {
        #[cfg(test)]
        let append_failures = Some(&*self.pending_append_failures);
        #[cfg(not(test))]
        let append_failures = None;

        let mut state = self.state.write().map_err(|err| E::from(poisoned(&err)))?;
        let mut staged = StagedTransaction::over(&state, append_failures);
        let outcome = work(&mut staged);
        if outcome.is_ok() {
            let changes = staged.changes;
            state.apply(changes);
        }
        outcome
    }

    async fn find_conversation_by_id(
        &self,
        id: ConversationId,
    ) -> StoreResult<Option<Conversation>> {
        let state = self.state.read().map_err(|err| poisoned(&err))?;
        Ok(state.conversation_by_id(id).cloned())
    }

    async fn find_conversation_by_participants(
        &self,
        buyer: BuyerKey,
        vendor: VendorKey,
    ) -> StoreResult<Option<Conversation>> {
        let state = self.state.read().map_err(|err| poisoned(&err))?;
        Ok(state.conversation_between(buyer, vendor).cloned())
    }

    async fn conversations_for(
        &self,
        participant: Participant,
        offset: u64,
        limit: u64,
    ) -> StoreResult<Vec<Conversation>> {
        let state = self.state.read().map_err(|err| poisoned(&err))?;
        let matching = state
            .conversations
            .values()
            .filter(|conversation| conversation.involves(participant))
            .cloned();
        Ok(window(matching, offset, limit))
    }

    async fn unread_conversations_for(
        &self,
        participant: Participant,
    ) -> StoreResult<Vec<Conversation>> {
        let state = self.state.read().map_err(|err| poisoned(&err))?;
        Ok(state
            .conversations
            .values()
            .filter(|conversation| {
                conversation.involves(participant)
                    && conversation.is_unread_for(participant.role())
            })
            .cloned()
            .collect())
    }

    async fn messages_page(
        &self,
        conversation: ConversationKey,
        offset: u64,
        limit: u64,
    ) -> StoreResult<Vec<Message>> {
        let state = self.state.read().map_err(|err| poisoned(&err))?;
        let mut thread: Vec<&Message> = state
            .messages
            .get(&conversation)
            .map(|messages| messages.iter().collect())
            .unwrap_or_default();
        thread.sort_by_key(|message| Reverse((message.created_at(), message.number())));
        Ok(window(thread.into_iter().cloned(), offset, limit))
    }
}
