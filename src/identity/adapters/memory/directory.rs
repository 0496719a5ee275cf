//! Thread-safe in-memory participant directory.

use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::{Arc, PoisonError, RwLock};

use crate::identity::{
    domain::{BuyerId, BuyerKey, VendorId, VendorKey},
    ports::{IdentityError, IdentityResolver, IdentityResult},
};

/// In-memory implementation of [`IdentityResolver`].
///
/// Keys are allocated sequentially from 1 per role, mirroring a `BIGSERIAL`
/// primary key.
///
/// # Example
///
/// ```
/// use agora::identity::adapters::memory::InMemoryIdentityDirectory;
///
/// let directory = InMemoryIdentityDirectory::new();
/// let (vendor_id, vendor_key) = directory.register_vendor().expect("register vendor");
/// assert_eq!(vendor_key.value(), 1);
/// # let _ = vendor_id;
/// ```
#[derive(Debug, Clone, Default)]
pub struct InMemoryIdentityDirectory {
    state: Arc<RwLock<DirectoryState>>,
}

#[derive(Debug, Default)]
struct DirectoryState {
    buyers: HashMap<BuyerId, BuyerKey>,
    vendors: HashMap<VendorId, VendorKey>,
    last_buyer_key: i64,
    last_vendor_key: i64,
}

fn poisoned<G>(err: &PoisonError<G>) -> IdentityError {
    IdentityError::backend(std::io::Error::other(format!("lock poisoned: {err}")))
}

impl InMemoryIdentityDirectory {
    /// Creates an empty directory.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers a new buyer and returns its public id and internal key.
    ///
    /// # Errors
    ///
    /// Returns [`IdentityError`] if the internal lock is poisoned.
    pub fn register_buyer(&self) -> IdentityResult<(BuyerId, BuyerKey)> {
        let mut state = self.state.write().map_err(|err| poisoned(&err))?;
        state.last_buyer_key = state.last_buyer_key.saturating_add(1);
        let id = BuyerId::new();
        let key = BuyerKey::new(state.last_buyer_key);
        state.buyers.insert(id, key);
        Ok((id, key))
    }

    /// Registers a new vendor and returns its public id and internal key.
    ///
    /// # Errors
    ///
    /// Returns [`IdentityError`] if the internal lock is poisoned.
    pub fn register_vendor(&self) -> IdentityResult<(VendorId, VendorKey)> {
        let mut state = self.state.write().map_err(|err| poisoned(&err))?;
        state.last_vendor_key = state.last_vendor_key.saturating_add(1);
        let id = VendorId::new();
        let key = VendorKey::new(state.last_vendor_key);
        state.vendors.insert(id, key);
        Ok((id, key))
    }
}

#[async_trait]
impl IdentityResolver for InMemoryIdentityDirectory {
    async fn resolve_buyer_key(&self, id: BuyerId) -> IdentityResult<Option<BuyerKey>> {
        let state = self.state.read().map_err(|err| poisoned(&err))?;
        Ok(state.buyers.get(&id).copied())
    }

    async fn resolve_vendor_key(&self, id: VendorId) -> IdentityResult<Option<VendorKey>> {
        let state = self.state.read().map_err(|err| poisoned(&err))?;
        Ok(state.vendors.get(&id).copied())
    }
}
