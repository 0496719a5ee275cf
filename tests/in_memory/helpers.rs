//! Shared test helpers for in-memory messaging integration tests.

use agora::identity::{
    adapters::memory::InMemoryIdentityDirectory,
    domain::{BuyerId, BuyerKey, CounterpartyId, Participant, VendorId, VendorKey},
};
use agora::messaging::{
    adapters::memory::InMemoryMessagingStore, domain::Message, services::MessagingService,
};
use mockable::DefaultClock;
use rstest::fixture;
use std::io;
use std::sync::Arc;
use tokio::runtime::Runtime;

/// Boxed error type used by test bodies.
pub type BoxError = Box<dyn std::error::Error + Send + Sync>;

/// Service wired to in-memory adapters.
pub type InMemoryService =
    MessagingService<InMemoryMessagingStore, InMemoryIdentityDirectory, DefaultClock>;

/// Provides a tokio runtime for async operations in tests.
///
/// # Errors
///
/// Returns an error if the runtime cannot be created.
#[fixture]
pub fn runtime() -> io::Result<Runtime> {
    tokio::runtime::Builder::new_current_thread()
        .enable_all()
        .build()
}

/// A marketplace with a participant directory and a messaging service.
pub struct Marketplace {
    /// Participant directory shared with the service.
    pub directory: Arc<InMemoryIdentityDirectory>,
    /// Messaging service under test.
    pub service: InMemoryService,
}

/// A registered buyer.
#[derive(Debug, Clone, Copy)]
pub struct Buyer {
    /// Public identifier.
    pub id: BuyerId,
    /// Internal key.
    pub key: BuyerKey,
}

/// A registered vendor.
#[derive(Debug, Clone, Copy)]
pub struct Vendor {
    /// Public identifier.
    pub id: VendorId,
    /// Internal key.
    pub key: VendorKey,
}

impl Marketplace {
    /// Registers a new buyer.
    ///
    /// # Errors
    ///
    /// Returns an error if the directory rejects the registration.
    pub fn buyer(&self) -> Result<Buyer, BoxError> {
        let (id, key) = self.directory.register_buyer()?;
        Ok(Buyer { id, key })
    }

    /// Registers a new vendor.
    ///
    /// # Errors
    ///
    /// Returns an error if the directory rejects the registration.
    pub fn vendor(&self) -> Result<Vendor, BoxError> {
        let (id, key) = self.directory.register_vendor()?;
        Ok(Vendor { id, key })
    }

    /// Posts a message from `buyer` to `vendor`.
    ///
    /// # Errors
    ///
    /// Returns an error if the post fails.
    pub async fn buyer_posts(
        &self,
        buyer: Buyer,
        vendor: Vendor,
        text: &str,
    ) -> Result<Message, BoxError> {
        let message = self
            .service
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
        &self,
        vendor: Vendor,
        buyer: Buyer,
        text: &str,
    ) -> Result<Message, BoxError> {
        let message = self
            .service
            .post_message(
                Participant::Vendor(vendor.key),
                CounterpartyId::from(buyer.id),
                text,
            )
            .await?;
        Ok(message)
    }
}

/// Provides a fresh marketplace for each test.
#[fixture]
pub fn marketplace() -> Marketplace {
    let directory = Arc::new(InMemoryIdentityDirectory::new());
    let service = MessagingService::new(
        Arc::new(InMemoryMessagingStore::new()),
        Arc::clone(&directory),
        Arc::new(DefaultClock),
    );
    Marketplace { directory, service }
}
