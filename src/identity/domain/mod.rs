//! Domain types for marketplace participants.

mod ids;
mod role;

pub use ids::{BuyerId, BuyerKey, CounterpartyId, VendorId, VendorKey};
pub use role::{ParseRoleError, Participant, Role};
