//! Participant roles in a buyer/vendor conversation.

use super::{BuyerKey, VendorKey};
use serde::{Deserialize, Serialize};
use std::fmt;
use thiserror::Error;

/// The side of a conversation a participant occupies.
///
/// # Examples
///
/// ```
/// use agora::identity::domain::Role;
///
/// assert_eq!(Role::Buyer.counterpart(), Role::Vendor);
/// assert_eq!(Role::try_from("vendor"), Ok(Role::Vendor));
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    /// A marketplace customer.
    Buyer,
    /// A marketplace seller.
    Vendor,
}

impl Role {
    /// Returns the role on the other side of a conversation.
    #[must_use]
    pub const fn counterpart(self) -> Self {
        match self {
            Self::Buyer => Self::Vendor,
            Self::Vendor => Self::Buyer,
        }
    }

    /// Returns the canonical lowercase name.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Buyer => "buyer",
            Self::Vendor => "vendor",
        }
    }
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Error returned when a string does not name a role.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
#[error("unknown participant role: {0}")]
pub struct ParseRoleError(pub String);

impl TryFrom<&str> for Role {
    type Error = ParseRoleError;

    fn try_from(value: &str) -> Result<Self, Self::Error> {
        match value.trim().to_ascii_lowercase().as_str() {
            "buyer" => Ok(Self::Buyer),
            "vendor" => Ok(Self::Vendor),
            _ => Err(ParseRoleError(value.to_owned())),
        }
    }
}

/// An authenticated participant: a role tag plus that side's internal key.
///
/// Request handlers build this from the session and pass it explicitly to
/// every messaging operation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Participant {
    /// A buyer acting through their internal key.
    Buyer(BuyerKey),
    /// A vendor acting through their internal key.
    Vendor(VendorKey),
}

impl Participant {
    /// Returns the participant's role.
    #[must_use]
    pub const fn role(self) -> Role {
        match self {
            Self::Buyer(_) => Role::Buyer,
            Self::Vendor(_) => Role::Vendor,
        }
    }

    /// Returns the raw internal key, regardless of role.
    #[must_use]
    pub const fn key_value(self) -> i64 {
        match self {
            Self::Buyer(key) => key.value(),
            Self::Vendor(key) => key.value(),
        }
    }
}

impl fmt::Display for Participant {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.role(), self.key_value())
    }
}
