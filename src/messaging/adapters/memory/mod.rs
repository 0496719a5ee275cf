//! In-memory messaging adapter.

mod store;

pub use store::InMemoryMessagingStore;
