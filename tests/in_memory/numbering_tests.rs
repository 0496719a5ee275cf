//! Conversation creation and message numbering through [`MessagingService`].
//!
//! [`MessagingService`]: agora::messaging::services::MessagingService

use crate::in_memory::helpers::{BoxError, Marketplace, marketplace, runtime};
use rstest::rstest;
use std::io;
use tokio::runtime::Runtime;

/// A buyer's first post opens the conversation; the second continues it.
#[rstest]
fn buyer_posts_increment_the_conversation_count(
    runtime: io::Result<Runtime>,
    marketplace: Marketplace,
) -> Result<(), BoxError> {
    let rt = runtime?;
    let buyer = marketplace.buyer()?;
    let vendor = marketplace.vendor()?;

    let opening = marketplace.buyer_posts(buyer, vendor, "Your Mother was a hamster");
    let first = rt.block_on(opening)?;
    assert_eq!(first.number().value(), 1);
    assert!(first.buyer_sent());
    assert_eq!(first.body().as_str(), "Your Mother was a hamster");

    let conversation = rt
        .block_on(marketplace.service.find_conversation(buyer.key, vendor.key))?
        .ok_or("conversation should exist after the first post")?;
    assert_eq!(conversation.message_count(), 1);

    let repeat = marketplace.buyer_posts(buyer, vendor, "Your Mother was a hamster");
    let second = rt.block_on(repeat)?;
    assert_eq!(second.number().value(), 2);

    let updated = rt
        .block_on(marketplace.service.find_conversation(buyer.key, vendor.key))?
        .ok_or("conversation should still exist")?;
    assert_eq!(updated.message_count(), 2);
    assert_eq!(updated.id(), conversation.id());
    Ok(())
}

/// Numbers continue across senders without gaps.
#[rstest]
fn replies_continue_the_same_sequence(
    runtime: io::Result<Runtime>,
    marketplace: Marketplace,
) -> Result<(), BoxError> {
    let rt = runtime?;
    let buyer = marketplace.buyer()?;
    let vendor = marketplace.vendor()?;

    let mut numbers = Vec::new();
    for _ in 0..3 {
        let question = rt.block_on(marketplace.buyer_posts(buyer, vendor, "question"))?;
        let answer = rt.block_on(marketplace.vendor_posts(vendor, buyer, "answer"))?;
        numbers.push(question.number().value());
        numbers.push(answer.number().value());
    }

    assert_eq!(numbers, vec![1, 2, 3, 4, 5, 6]);
    Ok(())
}

/// Each buyer/vendor pair gets its own conversation and its own sequence.
#[rstest]
fn sequences_are_scoped_to_each_pair(
    runtime: io::Result<Runtime>,
    marketplace: Marketplace,
) -> Result<(), BoxError> {
    let rt = runtime?;
    let buyer = marketplace.buyer()?;
    let first_vendor = marketplace.vendor()?;
    let second_vendor = marketplace.vendor()?;

    let to_first = rt.block_on(marketplace.buyer_posts(buyer, first_vendor, "hi"))?;
    let to_second = rt.block_on(marketplace.buyer_posts(buyer, second_vendor, "hi"))?;
    let again_first = rt.block_on(marketplace.buyer_posts(buyer, first_vendor, "hi again"))?;

    assert_eq!(to_first.number().value(), 1);
    assert_eq!(to_second.number().value(), 1);
    assert_eq!(again_first.number().value(), 2);
    assert_ne!(to_first.conversation(), to_second.conversation());
    assert_eq!(to_first.conversation(), again_first.conversation());
    Ok(())
}
