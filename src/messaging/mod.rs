//! Conversation threading and pagination between buyers and vendors.
//!
//! A conversation is the single, lazily created thread between one buyer and
//! one vendor. Every post appends an immutable message numbered from 1 with no
//! gaps, bumps the conversation's message counter, and raises the recipient's
//! unread flag, all inside one storage transaction.
//!
//! # Architecture
//!
//! - **Domain**: [`domain::Conversation`], [`domain::Message`],
//!   [`domain::UnreadFlags`], pagination types
//! - **Ports**: [`ports::MessagingStore`] and its unit of work
//!   [`ports::MessagingTransaction`]
//! - **Adapters**: [`adapters::memory::InMemoryMessagingStore`],
//!   [`adapters::postgres::PostgresMessagingStore`]
//! - **Services**: [`services::MessagingService`]
//! - **API views**: JSON shapes in [`api`]
//!
//! # Example
//!
//! ```
//! use std::sync::Arc;
//!
//! use agora::identity::adapters::memory::InMemoryIdentityDirectory;
//! use agora::identity::domain::{CounterpartyId, Participant};
//! use agora::messaging::adapters::memory::InMemoryMessagingStore;
//! use agora::messaging::services::MessagingService;
//! use mockable::DefaultClock;
//!
//! # tokio::runtime::Runtime::new().expect("runtime").block_on(async {
//! let directory = InMemoryIdentityDirectory::new();
//! let (_, buyer) = directory.register_buyer().expect("buyer");
//! let (vendor_id, _) = directory.register_vendor().expect("vendor");
//!
//! let service = MessagingService::new(
//!     Arc::new(InMemoryMessagingStore::new()),
//!     Arc::new(directory),
//!     Arc::new(DefaultClock),
//! );
//!
//! let message = service
//!     .post_message(Participant::Buyer(buyer), CounterpartyId::from(vendor_id), "Hello!")
//!     .await
//!     .expect("post succeeds");
//! assert_eq!(message.number().value(), 1);
//! assert!(message.buyer_sent());
//! # });
//! ```

pub mod adapters;
pub mod api;
pub mod domain;
pub mod ports;
pub mod services;
