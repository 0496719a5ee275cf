//! Port contracts for conversation and message persistence.
//!
//! Ports define infrastructure-agnostic interfaces used by messaging
//! services.

pub mod store;

pub use store::{MessagingStore, MessagingTransaction, StoreError, StoreResult};
