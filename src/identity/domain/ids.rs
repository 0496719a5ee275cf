//! Public identifiers and internal keys for buyers and vendors.
//!
//! Public identifiers are opaque UUIDs handed to clients. Internal keys are
//! the numeric primary keys the storage layer uses for relationships; they
//! never leave the backend.

use serde::{Deserialize, Serialize};
use std::fmt;
use uuid::Uuid;

/// Public identifier of a buyer account.
///
/// # Examples
///
/// ```
/// use agora::identity::domain::BuyerId;
///
/// let id = BuyerId::new();
/// assert!(!id.as_ref().is_nil());
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct BuyerId(Uuid);

impl BuyerId {
    /// Creates a new random buyer identifier.
    #[must_use]
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }

    /// Creates a buyer identifier from an existing UUID.
    #[must_use]
    pub const fn from_uuid(uuid: Uuid) -> Self {
        Self(uuid)
    }

    /// Returns the inner UUID value.
    #[must_use]
    pub const fn into_inner(self) -> Uuid {
        self.0
    }
}

impl Default for BuyerId {
    fn default() -> Self {
        Self::new()
    }
}

impl AsRef<Uuid> for BuyerId {
    fn as_ref(&self) -> &Uuid {
        &self.0
    }
}

impl fmt::Display for BuyerId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Public identifier of a vendor account.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct VendorId(Uuid);

impl VendorId {
    /// Creates a new random vendor identifier.
    #[must_use]
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }

    /// Creates a vendor identifier from an existing UUID.
    #[must_use]
    pub const fn from_uuid(uuid: Uuid) -> Self {
        Self(uuid)
    }

    /// Returns the inner UUID value.
    #[must_use]
    pub const fn into_inner(self) -> Uuid {
        self.0
    }
}

impl Default for VendorId {
    fn default() -> Self {
        Self::new()
    }
}

impl AsRef<Uuid> for VendorId {
    fn as_ref(&self) -> &Uuid {
        &self.0
    }
}

impl fmt::Display for VendorId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Public identifier of the other party in a message post.
///
/// Whether it names a buyer or a vendor depends on who is posting: a buyer
/// addresses a vendor and a vendor addresses a buyer. The sender's
/// [`Role`](super::Role) selects the interpretation.
///
/// # Examples
///
/// ```
/// use agora::identity::domain::{CounterpartyId, VendorId};
///
/// let vendor = VendorId::new();
/// let counterparty = CounterpartyId::from(vendor);
/// assert_eq!(counterparty.as_vendor_id(), vendor);
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct CounterpartyId(Uuid);

impl CounterpartyId {
    /// Wraps a raw public identifier.
    #[must_use]
    pub const fn from_uuid(uuid: Uuid) -> Self {
        Self(uuid)
    }

    /// Interprets the identifier as a buyer identifier.
    #[must_use]
    pub const fn as_buyer_id(self) -> BuyerId {
        BuyerId::from_uuid(self.0)
    }

    /// Interprets the identifier as a vendor identifier.
    #[must_use]
    pub const fn as_vendor_id(self) -> VendorId {
        VendorId::from_uuid(self.0)
    }
}

impl From<BuyerId> for CounterpartyId {
    fn from(id: BuyerId) -> Self {
        Self(id.into_inner())
    }
}

impl From<VendorId> for CounterpartyId {
    fn from(id: VendorId) -> Self {
        Self(id.into_inner())
    }
}

impl fmt::Display for CounterpartyId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Internal storage key of a buyer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct BuyerKey(i64);

impl BuyerKey {
    /// Wraps a storage key.
    #[must_use]
    pub const fn new(value: i64) -> Self {
        Self(value)
    }

    /// Returns the raw key value.
    #[must_use]
    pub const fn value(self) -> i64 {
        self.0
    }
}

impl fmt::Display for BuyerKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Internal storage key of a vendor.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct VendorKey(i64);

impl VendorKey {
    /// Wraps a storage key.
    #[must_use]
    pub const fn new(value: i64) -> Self {
        Self(value)
    }

    /// Returns the raw key value.
    #[must_use]
    pub const fn value(self) -> i64 {
        self.0
    }
}

impl fmt::Display for VendorKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}
