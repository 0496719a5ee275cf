//! Messaging store adapters.
//!
//! - [`memory::InMemoryMessagingStore`]: process-local store with staged
//!   transactions, used by tests and single-node tooling
//! - [`postgres::PostgresMessagingStore`]: Diesel-backed store using row
//!   locks and upserts to serialise concurrent posts

pub mod memory;
pub mod postgres;
