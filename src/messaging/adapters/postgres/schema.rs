//! Diesel schema for conversation and message persistence.

diesel::table! {
    /// One row per buyer/vendor pair that has exchanged messages.
    conversations (pk) {
        /// Internal storage key.
        pk -> Int8,
        /// Public conversation identifier.
        id -> Uuid,
        /// Buyer side of the pair.
        buyer_pk -> Int8,
        /// Vendor side of the pair.
        vendor_pk -> Int8,
        /// Number of messages appended so far.
        message_count -> Int8,
        /// Whether the buyer has unseen messages.
        buyer_unread -> Bool,
        /// Whether the vendor has unseen messages.
        vendor_unread -> Bool,
        /// Creation timestamp.
        created_at -> Timestamptz,
        /// Last update timestamp.
        updated_at -> Timestamptz,
    }
}

diesel::table! {
    /// Append-only message history.
    messages (pk) {
        /// Internal storage key.
        pk -> Int8,
        /// Public message identifier.
        id -> Uuid,
        /// Owning conversation.
        conversation_pk -> Int8,
        /// Message body.
        description -> Text,
        /// Whether the buyer authored the message.
        buyer_sent -> Bool,
        /// Position within the conversation, from 1.
        conversation_number -> Int8,
        /// Creation timestamp.
        created_at -> Timestamptz,
    }
}

diesel::joinable!(messages -> conversations (conversation_pk));
diesel::allow_tables_to_appear_in_same_query!(conversations, messages);
