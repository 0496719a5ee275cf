//! `PostgreSQL` store implementation for conversations and messages.

use super::{
    models::{ConversationChanges, ConversationRow, MessageRow, NewConversationRow, NewMessageRow},
    schema::{conversations, messages},
};
use crate::db::{PgPool, get_conn_with, run_blocking_with};
use crate::identity::domain::{BuyerKey, Participant, VendorKey};
use crate::messaging::{
    domain::{Conversation, ConversationId, ConversationKey, Message, NewConversation, NewMessage},
    ports::{MessagingStore, MessagingTransaction, StoreError, StoreResult},
};
use async_trait::async_trait;
use diesel::pg::{Pg, PgConnection};
use diesel::prelude::*;
use diesel::result::{DatabaseErrorKind, Error as DieselError};

/// `PostgreSQL`-backed messaging store.
///
/// Posts to the same buyer/vendor pair are serialised through
/// `SELECT ... FOR UPDATE` on the conversation row. First contact inserts
/// with `ON CONFLICT DO NOTHING` on the pair's unique index, so two racing
/// first posts end up sharing one conversation.
#[derive(Debug, Clone)]
pub struct PostgresMessagingStore {
    pool: PgPool,
}

impl PostgresMessagingStore {
    /// Creates a store over a `PostgreSQL` connection pool.
    #[must_use]
    pub const fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    async fn run_blocking<F, T>(&self, f: F) -> StoreResult<T>
    where
        F: FnOnce(&mut PgConnection) -> StoreResult<T> + Send + 'static,
        T: Send + 'static,
    {
        let pool = self.pool.clone();
        run_blocking_with(
            move || {
                let mut connection =
                    get_conn_with(&pool, |err| StoreError::connection(err.to_string()))?;
                f(&mut connection)
            },
            |err| StoreError::connection(err.to_string()),
        )
        .await
    }
}

/// Why a Diesel transaction was rolled back.
enum TxAbort<E> {
    /// The unit of work returned its own error.
    Work(E),
    /// The transaction machinery failed.
    Store(StoreError),
}

impl<E> From<diesel::result::Error> for TxAbort<E> {
    fn from(err: diesel::result::Error) -> Self {
        Self::Store(StoreError::from(err))
    }
}

/// Unit of work bound to one open Diesel transaction.
struct PgTransaction<'c> {
    connection: &'c mut PgConnection,
}

impl MessagingTransaction for PgTransaction<'_> {
    fn lock_conversation(
        &mut self,
        buyer: BuyerKey,
        vendor: VendorKey,
    ) -> StoreResult<Option<Conversation>> {
        let row = conversations::table
            .filter(conversations::buyer_pk.eq(buyer.value()))
            .filter(conversations::vendor_pk.eq(vendor.value()))
            .select(ConversationRow::as_select())
            .for_update()
            .get_result::<ConversationRow>(self.connection)
            .optional()?;
        row.map(ConversationRow::into_domain).transpose()
    }

    fn lock_conversation_by_id(&mut self, id: ConversationId) -> StoreResult<Option<Conversation>> {
        let row = conversations::table
            .filter(conversations::id.eq(id.into_inner()))
            .select(ConversationRow::as_select())
            .for_update()
            .get_result::<ConversationRow>(self.connection)
            .optional()?;
        row.map(ConversationRow::into_domain).transpose()
    }

    fn insert_conversation(
        &mut self,
        conversation: &NewConversation,
    ) -> StoreResult<Option<Conversation>> {
        let new_row = NewConversationRow::from_domain(conversation)?;
        let row = diesel::insert_into(conversations::table)
            .values(&new_row)
            .on_conflict((conversations::vendor_pk, conversations::buyer_pk))
            .do_nothing()
            .returning(ConversationRow::as_returning())
            .get_result::<ConversationRow>(self.connection)
            .optional()?;
        row.map(ConversationRow::into_domain).transpose()
    }

    fn update_conversation(&mut self, conversation: &Conversation) -> StoreResult<()> {
        let changes = ConversationChanges::from_domain(conversation)?;
        let updated = diesel::update(conversations::table.find(conversation.key().value()))
            .set(&changes)
            .execute(self.connection)?;
        if updated == 0 {
            return Err(StoreError::conflict(format!(
                "conversation {} does not exist",
                conversation.id()
            )));
        }
        Ok(())
    }

    fn append_message(&mut self, message: &NewMessage) -> StoreResult<Message> {
        let new_row = NewMessageRow::from_domain(message)?;
        let row = diesel::insert_into(messages::table)
            .values(&new_row)
            .returning(MessageRow::as_returning())
            .get_result::<MessageRow>(self.connection)
            .map_err(|err| match err {
                DieselError::DatabaseError(DatabaseErrorKind::UniqueViolation, _) => {
                    StoreError::conflict(format!(
                        "message number {} already used in conversation key {}",
                        message.number(),
                        message.conversation()
                    ))
                }
                _ => StoreError::from(err),
            })?;
        row.into_domain()
    }
}

/// Saturates a window bound at `i64::MAX`; no table holds that many rows.
fn window_bound(value: u64) -> i64 {
    i64::try_from(value).unwrap_or(i64::MAX)
}

fn participant_conversations(participant: Participant) -> conversations::BoxedQuery<'static, Pg> {
    let query = conversations::table.into_boxed();
    match participant {
        Participant::Buyer(key) => query.filter(conversations::buyer_pk.eq(key.value())),
        Participant::Vendor(key) => query.filter(conversations::vendor_pk.eq(key.value())),
    }
}

fn rows_to_conversations(rows: Vec<ConversationRow>) -> StoreResult<Vec<Conversation>> {
    rows.into_iter().map(ConversationRow::into_domain).collect()
}

#[async_trait]
impl MessagingStore for PostgresMessagingStore {
    async fn transaction<T, E, F>(&self, work: F) -> Result<T, E>
    where
        F: FnOnce(&mut dyn MessagingTransaction) -> Result<T, E> + Send + 'static,
        T: Send + 'static,
        E: From<StoreError> + Send + 'static,
    {
        let pool = self.pool.clone();
        let outcome = run_blocking_with(
            move || {
                let mut pooled = get_conn_with(&pool, |err| {
                    TxAbort::Store(StoreError::connection(err.to_string()))
                })?;
                let connection: &mut PgConnection = &mut pooled;
                connection.transaction::<T, TxAbort<E>, _>(|tx_connection| {
                    work(&mut PgTransaction {
                        connection: tx_connection,
                    })
                    .map_err(TxAbort::Work)
                })
            },
            |err| TxAbort::Store(StoreError::connection(err.to_string())),
        )
        .await;

        outcome.map_err(|abort| match abort {
            TxAbort::Work(err) => err,
            TxAbort::Store(err) => {
                tracing::debug!(error = %err, "messaging transaction aborted");
                E::from(err)
            }
        })
    }

    async fn find_conversation_by_id(
        &self,
        id: ConversationId,
    ) -> StoreResult<Option<Conversation>> {
        self.run_blocking(move |connection| {
            let row = conversations::table
                .filter(conversations::id.eq(id.into_inner()))
                .select(ConversationRow::as_select())
                .first::<ConversationRow>(connection)
                .optional()?;
            row.map(ConversationRow::into_domain).transpose()
        })
        .await
    }

    async fn find_conversation_by_participants(
        &self,
        buyer: BuyerKey,
        vendor: VendorKey,
    ) -> StoreResult<Option<Conversation>> {
        self.run_blocking(move |connection| {
            let row = conversations::table
                .filter(conversations::buyer_pk.eq(buyer.value()))
                .filter(conversations::vendor_pk.eq(vendor.value()))
                .select(ConversationRow::as_select())
                .first::<ConversationRow>(connection)
                .optional()?;
            row.map(ConversationRow::into_domain).transpose()
        })
        .await
    }

    async fn conversations_for(
        &self,
        participant: Participant,
        offset: u64,
        limit: u64,
    ) -> StoreResult<Vec<Conversation>> {
        let row_offset = window_bound(offset);
        let row_limit = window_bound(limit);
        self.run_blocking(move |connection| {
            let rows = participant_conversations(participant)
                .order(conversations::pk.asc())
                .offset(row_offset)
                .limit(row_limit)
                .select(ConversationRow::as_select())
                .load::<ConversationRow>(connection)?;
            rows_to_conversations(rows)
        })
        .await
    }

    async fn unread_conversations_for(
        &self,
        participant: Participant,
    ) -> StoreResult<Vec<Conversation>> {
        self.run_blocking(move |connection| {
            let query = participant_conversations(participant);
            let unread = match participant {
                Participant::Buyer(_) => query.filter(conversations::buyer_unread.eq(true)),
                Participant::Vendor(_) => query.filter(conversations::vendor_unread.eq(true)),
            };
            let rows = unread
                .order(conversations::pk.asc())
                .select(ConversationRow::as_select())
                .load::<ConversationRow>(connection)?;
            rows_to_conversations(rows)
        })
        .await
    }

    async fn messages_page(
        &self,
        conversation: ConversationKey,
        offset: u64,
        limit: u64,
    ) -> StoreResult<Vec<Message>> {
        let row_offset = window_bound(offset);
        let row_limit = window_bound(limit);
        self.run_blocking(move |connection| {
            let rows = messages::table
                .filter(messages::conversation_pk.eq(conversation.value()))
                .order((
                    messages::created_at.desc(),
                    messages::conversation_number.desc(),
                ))
                .offset(row_offset)
                .limit(row_limit)
                .select(MessageRow::as_select())
                .load::<MessageRow>(connection)?;
            rows.into_iter().map(MessageRow::into_domain).collect()
        })
        .await
    }
}
