//! `PostgreSQL` adapter for conversation and message persistence.

mod models;
mod schema;
mod store;

pub use store::PostgresMessagingStore;
