//! Unread listings across many conversations.

use crate::in_memory::helpers::{BoxError, Marketplace, Vendor, marketplace, runtime};
use agora::identity::domain::Participant;
use agora::messaging::domain::ConversationKey;
use rstest::rstest;
use std::io;
use tokio::runtime::Runtime;

fn keys(conversations: &[agora::messaging::domain::Conversation]) -> Vec<ConversationKey> {
    conversations.iter().map(|c| c.key()).collect()
}

/// A buyer writes to 50 vendors and hears back from 20 of them.
#[rstest]
fn buyer_sees_only_threads_with_vendor_replies(
    runtime: io::Result<Runtime>,
    marketplace: Marketplace,
) -> Result<(), BoxError> {
    let rt = runtime?;
    let buyer = marketplace.buyer()?;
    let vendors = (0..50)
        .map(|_| marketplace.vendor())
        .collect::<Result<Vec<Vendor>, _>>()?;

    let mut replied = Vec::new();
    for (vendor, replies) in vendors
        .iter()
        .zip([true, false].into_iter().cycle())
    {
        rt.block_on(marketplace.buyer_posts(buyer, *vendor, "Is this still available?"))?;
        if replies && replied.len() < 20 {
            let reply = rt.block_on(marketplace.vendor_posts(*vendor, buyer, "Yes"))?;
            replied.push(reply.conversation());
        }
    }

    let unread = rt.block_on(
        marketplace
            .service
            .unread_conversations(Participant::Buyer(buyer.key)),
    )?;

    assert_eq!(unread.len(), 20);
    assert_eq!(keys(&unread), replied);
    Ok(())
}

/// Vendors who never replied still have the buyer's opener unread.
#[rstest]
fn silent_vendors_keep_the_opener_unread(
    runtime: io::Result<Runtime>,
    marketplace: Marketplace,
) -> Result<(), BoxError> {
    let rt = runtime?;
    let buyer = marketplace.buyer()?;
    let quiet = marketplace.vendor()?;
    let chatty = marketplace.vendor()?;
    rt.block_on(marketplace.buyer_posts(buyer, quiet, "Hello?"))?;
    rt.block_on(marketplace.buyer_posts(buyer, chatty, "Hello?"))?;
    rt.block_on(marketplace.vendor_posts(chatty, buyer, "Hi there"))?;

    let quiet_unread = rt.block_on(
        marketplace
            .service
            .unread_conversations(Participant::Vendor(quiet.key)),
    )?;
    let chatty_unread = rt.block_on(
        marketplace
            .service
            .unread_conversations(Participant::Vendor(chatty.key)),
    )?;

    assert_eq!(quiet_unread.len(), 1);
    assert_eq!(
        chatty_unread.len(),
        1,
        "replying does not clear the vendor's own flag"
    );
    Ok(())
}

/// Marking threads read removes them from the listing one at a time.
#[rstest]
fn mark_read_shrinks_the_unread_listing(
    runtime: io::Result<Runtime>,
    marketplace: Marketplace,
) -> Result<(), BoxError> {
    let rt = runtime?;
    let vendor = marketplace.vendor()?;
    for _ in 0..5 {
        let buyer = marketplace.buyer()?;
        rt.block_on(marketplace.buyer_posts(buyer, vendor, "Do you ship abroad?"))?;
    }
    let participant = Participant::Vendor(vendor.key);
    let before = rt.block_on(marketplace.service.unread_conversations(participant))?;
    assert_eq!(before.len(), 5);

    let mut remaining = before.len();
    for conversation in &before {
        let read = rt.block_on(marketplace.service.mark_read(participant, conversation.id()))?;
        assert!(!read.is_unread_for(participant.role()));
        remaining = remaining.saturating_sub(1);

        let listed = rt.block_on(marketplace.service.unread_conversations(participant))?;
        assert_eq!(listed.len(), remaining);
        assert!(listed.iter().all(|c| c.key() != conversation.key()));
    }
    Ok(())
}

/// A new message after reading raises the flag again.
#[rstest]
fn new_messages_reopen_read_threads(
    runtime: io::Result<Runtime>,
    marketplace: Marketplace,
) -> Result<(), BoxError> {
    let rt = runtime?;
    let buyer = marketplace.buyer()?;
    let vendor = marketplace.vendor()?;
    let opener = rt.block_on(marketplace.buyer_posts(buyer, vendor, "Price?"))?;
    let participant = Participant::Vendor(vendor.key);
    let conversation = rt
        .block_on(marketplace.service.find_conversation(buyer.key, vendor.key))?
        .ok_or("conversation should exist")?;
    assert_eq!(conversation.key(), opener.conversation());

    rt.block_on(marketplace.service.mark_read(participant, conversation.id()))?;
    assert!(
        rt.block_on(marketplace.service.unread_conversations(participant))?
            .is_empty()
    );

    rt.block_on(marketplace.buyer_posts(buyer, vendor, "Still there?"))?;
    let relisted = rt.block_on(marketplace.service.unread_conversations(participant))?;

    assert_eq!(keys(&relisted), vec![conversation.key()]);
    Ok(())
}
