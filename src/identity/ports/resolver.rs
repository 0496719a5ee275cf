//! Resolver port mapping public participant identifiers to internal keys.

use crate::identity::domain::{BuyerId, BuyerKey, VendorId, VendorKey};
use async_trait::async_trait;
use std::sync::Arc;
use thiserror::Error;

/// Result type for identity resolution.
pub type IdentityResult<T> = Result<T, IdentityError>;

/// Maps public buyer/vendor identifiers to their internal storage keys.
///
/// Unknown identifiers resolve to `Ok(None)`; errors are reserved for
/// backend failures.
#[async_trait]
pub trait IdentityResolver: Send + Sync {
    /// Resolves a buyer's public identifier.
    ///
    /// # Errors
    ///
    /// Returns [`IdentityError`] when the lookup itself fails.
    async fn resolve_buyer_key(&self, id: BuyerId) -> IdentityResult<Option<BuyerKey>>;

    /// Resolves a vendor's public identifier.
    ///
    /// # Errors
    ///
    /// Returns [`IdentityError`] when the lookup itself fails.
    async fn resolve_vendor_key(&self, id: VendorId) -> IdentityResult<Option<VendorKey>>;
}

/// Errors returned by identity resolver implementations.
#[derive(Debug, Clone, Error)]
pub enum IdentityError {
    /// The identity backend could not be reached or queried.
    #[error("identity lookup failed: {0}")]
    Backend(Arc<dyn std::error::Error + Send + Sync>),
}

impl IdentityError {
    /// Wraps a backend failure.
    pub fn backend(err: impl std::error::Error + Send + Sync + 'static) -> Self {
        Self::Backend(Arc::new(err))
    }
}
