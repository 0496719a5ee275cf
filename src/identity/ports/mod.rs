//! Port contracts for participant identity.

pub mod resolver;

pub use resolver::{IdentityError, IdentityResolver, IdentityResult};
