//! In-memory identity adapter.

mod directory;

pub use directory::InMemoryIdentityDirectory;
