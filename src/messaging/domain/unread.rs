//! Per-side unread state of a conversation.

use crate::identity::domain::Role;

/// Unread flags for the buyer and vendor sides of a conversation.
///
/// The two flags move independently. A post by one side raises the other
/// side's flag and never clears anything; a mark-read clears exactly the
/// reader's flag. There is no operation that touches both flags at once.
///
/// # Examples
///
/// ```
/// use agora::identity::domain::Role;
/// use agora::messaging::domain::UnreadFlags;
///
/// let mut flags = UnreadFlags::opened_by(Role::Buyer);
/// assert!(flags.is_unread_for(Role::Vendor));
/// assert!(!flags.is_unread_for(Role::Buyer));
///
/// flags.clear(Role::Vendor);
/// assert_eq!(flags, UnreadFlags::default());
/// ```
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub struct UnreadFlags {
    buyer: bool,
    vendor: bool,
}

impl UnreadFlags {
    /// Flags for a conversation opened by a post from `sender`.
    #[must_use]
    pub const fn opened_by(sender: Role) -> Self {
        let mut flags = Self {
            buyer: false,
            vendor: false,
        };
        flags.raise(sender.counterpart());
        flags
    }

    /// Rebuilds flags from persisted columns.
    #[must_use]
    pub const fn from_persisted(buyer_unread: bool, vendor_unread: bool) -> Self {
        Self {
            buyer: buyer_unread,
            vendor: vendor_unread,
        }
    }

    /// Marks `role`'s side as having unseen messages.
    pub const fn raise(&mut self, role: Role) {
        match role {
            Role::Buyer => self.buyer = true,
            Role::Vendor => self.vendor = true,
        }
    }

    /// Marks `role`'s side as caught up.
    pub const fn clear(&mut self, role: Role) {
        match role {
            Role::Buyer => self.buyer = false,
            Role::Vendor => self.vendor = false,
        }
    }

    /// Returns whether `role`'s side has unseen messages.
    #[must_use]
    pub const fn is_unread_for(self, role: Role) -> bool {
        match role {
            Role::Buyer => self.buyer,
            Role::Vendor => self.vendor,
        }
    }

    /// Buyer-side flag.
    #[must_use]
    pub const fn buyer(self) -> bool {
        self.buyer
    }

    /// Vendor-side flag.
    #[must_use]
    pub const fn vendor(self) -> bool {
        self.vendor
    }
}
