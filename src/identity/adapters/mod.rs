//! Identity resolver adapters.
//!
//! - [`memory::InMemoryIdentityDirectory`]: process-local directory for tests
//!   and single-node tooling
//! - [`postgres::PostgresIdentityResolver`]: lookups against the `buyers` and
//!   `vendors` tables

pub mod memory;
pub mod postgres;
