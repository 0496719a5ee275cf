//! Shared helpers for `PostgreSQL` integration tests.

use agora::config::MessagingConfig;
use agora::db::{PgPool, connect};
use agora::identity::{
    adapters::postgres::PostgresIdentityResolver,
    domain::{BuyerId, BuyerKey, CounterpartyId, Participant, VendorId, VendorKey},
};
use agora::messaging::{
    adapters::postgres::PostgresMessagingStore, domain::Message, services::MessagingService,
};
use diesel::connection::SimpleConnection;
use diesel::prelude::*;
use mockable::DefaultClock;
use postgresql_embedded::{PostgreSQL, Settings};
use std::sync::Arc;
use uuid::Uuid;

/// Boxed error type used by test bodies.
pub type BoxError = Box<dyn std::error::Error + Send + Sync>;

/// Service wired to the `PostgreSQL` adapters.
pub type PostgresService =
    MessagingService<PostgresMessagingStore, PostgresIdentityResolver, DefaultClock>;

/// SQL creating the participant tables.
pub const CREATE_PARTICIPANTS_SQL: &str =
    include_str!("../../migrations/2026-10-19-000000_create_participant_tables/up.sql");

/// SQL creating the conversation and message tables.
pub const CREATE_MESSAGING_SQL: &str =
    include_str!("../../migrations/2026-10-19-000001_create_messaging_tables/up.sql");

const INSERT_BUYER_SQL: &str = "INSERT INTO buyers (id) VALUES ($1) RETURNING pk";
const INSERT_VENDOR_SQL: &str = "INSERT INTO vendors (id) VALUES ($1) RETURNING pk";

const DATABASE: &str = "agora_test";
const POOL_SIZE: u32 = 8;

#[derive(QueryableByName)]
struct InsertedKey {
    #[diesel(sql_type = diesel::sql_types::BigInt)]
    pk: i64,
}

/// A migrated database on a private embedded server.
pub struct TestDatabase {
    server: PostgreSQL,
    pool: PgPool,
}

/// A buyer row inserted for a test.
#[derive(Debug, Clone, Copy)]
pub struct Buyer {
    /// Public identifier.
    pub id: BuyerId,
    /// Primary key of the `buyers` row.
    pub key: BuyerKey,
}

/// A vendor row inserted for a test.
#[derive(Debug, Clone, Copy)]
pub struct Vendor {
    /// Public identifier.
    pub id: VendorId,
    /// Primary key of the `vendors` row.
    pub key: VendorKey,
}

impl TestDatabase {
    /// Boots a server, creates the test database and applies migrations.
    ///
    /// # Errors
    ///
    /// Returns an error if the server cannot be installed or started, or if
    /// the schema cannot be applied.
    pub async fn start() -> Result<Self, BoxError> {
        let mut server = PostgreSQL::new(Settings::default());
        server.setup().await?;
        server.start().await?;
        server.create_database(DATABASE).await?;

        let config = MessagingConfig {
            database_url: Some(server.settings().url(DATABASE)),
            pool_max_size: POOL_SIZE,
            ..MessagingConfig::default()
        };
        let pool = tokio::task::spawn_blocking(move || -> Result<PgPool, BoxError> {
            let pool = connect(&config)?;
            let mut connection = pool.get()?;
            connection.batch_execute(CREATE_PARTICIPANTS_SQL)?;
            connection.batch_execute(CREATE_MESSAGING_SQL)?;
            Ok(pool)
        })
        .await??;

        Ok(Self { server, pool })
    }

    /// Builds a messaging service over this database.
    #[must_use]
    pub fn service(&self) -> PostgresService {
        MessagingService::new(
            Arc::new(PostgresMessagingStore::new(self.pool.clone())),
            Arc::new(self.resolver()),
            Arc::new(DefaultClock),
        )
    }

    /// Builds an identity resolver over this database.
    #[must_use]
    pub fn resolver(&self) -> PostgresIdentityResolver {
        PostgresIdentityResolver::new(self.pool.clone())
    }

    /// Inserts a buyer row.
    ///
    /// # Errors
    ///
    /// Returns an error if the insert fails.
    pub async fn buyer(&self) -> Result<Buyer, BoxError> {
        let id = BuyerId::new();
        let pk = self.insert_row(INSERT_BUYER_SQL, *id.as_ref()).await?;
        Ok(Buyer {
            id,
            key: BuyerKey::new(pk),
        })
    }

    /// Inserts a vendor row.
    ///
    /// # Errors
    ///
    /// Returns an error if the insert fails.
    pub async fn vendor(&self) -> Result<Vendor, BoxError> {
        let id = VendorId::new();
        let pk = self.insert_row(INSERT_VENDOR_SQL, *id.as_ref()).await?;
        Ok(Vendor {
            id,
            key: VendorKey::new(pk),
        })
    }

    async fn insert_row(&self, sql: &'static str, id: Uuid) -> Result<i64, BoxError> {
        let pool = self.pool.clone();
        tokio::task::spawn_blocking(move || -> Result<i64, BoxError> {
            let mut pooled = pool.get()?;
            let connection: &mut PgConnection = &mut pooled;
            let row = diesel::sql_query(sql)
                .bind::<diesel::sql_types::Uuid, _>(id)
                .get_result::<InsertedKey>(connection)?;
            Ok(row.pk)
        })
        .await?
    }

    /// Stops the embedded server.
    ///
    /// # Errors
    ///
    /// Returns an error if the server does not shut down cleanly.
    pub async fn stop(self) -> Result<(), BoxError> {
        let Self { server, pool } = self;
        drop(pool);
        server.stop().await?;
        Ok(())
    }
}

/// Posts a message from `buyer` to `vendor`.
///
/// # Errors
///
/// Returns an error if the post fails.
pub async fn buyer_posts(
    service: &PostgresService,
    buyer: Buyer,
    vendor: Vendor,
    text: &str,
) -> Result<Message, BoxError> {
    let message = service
        .post_message(
            Participant::Buyer(buyer.key),
            CounterpartyId::from(vendor.id),
            text,
        )
        .await?;
    Ok(message)
}

/// Posts a message from `vendor` to `buyer`.
///
/// # Errors
///
/// Returns an error if the post fails.
pub async fn vendor_posts(
    service: &PostgresService,
    vendor: Vendor,
    buyer: Buyer,
    text: &str,
) -> Result<Message, BoxError> {
    let message = service
        .post_message(
            Participant::Vendor(vendor.key),
            CounterpartyId::from(buyer.id),
            text,
        )
        .await?;
    Ok(message)
}
