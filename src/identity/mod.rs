//! Buyer and vendor identity for the messaging core.
//!
//! Accounts are created and authenticated elsewhere. This module only models
//! the identifiers the messaging core needs and the resolver port that maps a
//! participant's public identifier to its internal key:
//!
//! - Domain types in [`domain`]
//! - Port contracts in [`ports`]
//! - Adapter implementations in [`adapters`]

pub mod adapters;
pub mod domain;
pub mod ports;
