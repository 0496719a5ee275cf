//! `PostgreSQL` adapter for identity resolution.

mod repository;
mod schema;

pub use repository::PostgresIdentityResolver;
