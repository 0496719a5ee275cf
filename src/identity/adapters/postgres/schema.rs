//! Diesel schema for the participant tables read by the resolver.

diesel::table! {
    /// Buyer accounts.
    buyers (pk) {
        /// Internal buyer key.
        pk -> Int8,
        /// Public buyer identifier.
        id -> Uuid,
    }
}

diesel::table! {
    /// Vendor accounts.
    vendors (pk) {
        /// Internal vendor key.
        pk -> Int8,
        /// Public vendor identifier.
        id -> Uuid,
    }
}
