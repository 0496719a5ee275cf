//! History windows and conversation page tokens.

use crate::in_memory::helpers::{BoxError, Marketplace, marketplace, runtime};
use agora::identity::domain::{Participant, Role};
use agora::messaging::domain::ConversationId;
use rstest::rstest;
use std::io;
use tokio::runtime::Runtime;

const HISTORY_LENGTH: u64 = 210;

fn seed_history(rt: &Runtime, marketplace: &Marketplace) -> Result<ConversationId, BoxError> {
    let buyer = marketplace.buyer()?;
    let vendor = marketplace.vendor()?;
    for (index, from_buyer) in (0..HISTORY_LENGTH).zip([true, false].into_iter().cycle()) {
        let text = format!("message {index}");
        if from_buyer {
            rt.block_on(marketplace.buyer_posts(buyer, vendor, &text))?;
        } else {
            rt.block_on(marketplace.vendor_posts(vendor, buyer, &text))?;
        }
    }
    let conversation = rt
        .block_on(marketplace.service.find_conversation(buyer.key, vendor.key))?
        .ok_or("conversation should exist")?;
    Ok(conversation.id())
}

fn page_numbers(
    rt: &Runtime,
    marketplace: &Marketplace,
    conversation: ConversationId,
    offset: u64,
) -> Result<(Vec<u64>, u64), BoxError> {
    let page = rt.block_on(marketplace.service.messages_page(conversation, offset))?;
    let numbers = page.messages().iter().map(|m| m.number().value()).collect();
    Ok((numbers, page.next_offset()))
}

/// Pages are fixed-size windows over the newest-first history.
#[rstest]
#[case(0, (201..=210).rev().collect(), 10)]
#[case(10, (191..=200).rev().collect(), 20)]
#[case(200, (1..=10).rev().collect(), 210)]
#[case(205, (1..=5).rev().collect(), 215)]
#[case(1000, Vec::new(), 1010)]
fn history_pages_are_newest_first_windows(
    runtime: io::Result<Runtime>,
    marketplace: Marketplace,
    #[case] offset: u64,
    #[case] expected: Vec<u64>,
    #[case] next_offset: u64,
) -> Result<(), BoxError> {
    let rt = runtime?;
    let conversation = seed_history(&rt, &marketplace)?;

    let (numbers, next) = page_numbers(&rt, &marketplace, conversation, offset)?;

    assert_eq!(numbers, expected);
    assert_eq!(next, next_offset);
    Ok(())
}

/// Following `next_offset` until an empty page visits every message once.
#[rstest]
fn following_offsets_walks_the_whole_history(
    runtime: io::Result<Runtime>,
    marketplace: Marketplace,
) -> Result<(), BoxError> {
    let rt = runtime?;
    let conversation = seed_history(&rt, &marketplace)?;

    let mut seen = Vec::new();
    let mut offset = 0;
    loop {
        let (numbers, next) = page_numbers(&rt, &marketplace, conversation, offset)?;
        if numbers.is_empty() {
            break;
        }
        seen.extend(numbers);
        offset = next;
    }

    assert_eq!(seen, (1..=HISTORY_LENGTH).rev().collect::<Vec<_>>());
    assert_eq!(offset, 210);
    Ok(())
}

/// 53 conversations split into pages of 20, 20 and 13 for either role.
#[rstest]
#[case::buyer(Role::Buyer)]
#[case::vendor(Role::Vendor)]
fn conversation_tokens_walk_all_pages(
    runtime: io::Result<Runtime>,
    marketplace: Marketplace,
    #[case] role: Role,
) -> Result<(), BoxError> {
    let rt = runtime?;
    let buyer = marketplace.buyer()?;
    let vendor = marketplace.vendor()?;
    let mut opened = Vec::new();
    for _ in 0..53 {
        let (poster, recipient) = match role {
            Role::Buyer => (buyer, marketplace.vendor()?),
            Role::Vendor => (marketplace.buyer()?, vendor),
        };
        let message = rt.block_on(marketplace.buyer_posts(poster, recipient, "hello"))?;
        opened.push(message.conversation());
    }

    let participant = match role {
        Role::Buyer => Participant::Buyer(buyer.key),
        Role::Vendor => Participant::Vendor(vendor.key),
    };
    let mut token = String::new();
    let mut sizes = Vec::new();
    let mut tokens = Vec::new();
    let mut listed = Vec::new();
    for _ in 0..3 {
        let page = rt.block_on(marketplace.service.conversations_page(participant, &token))?;
        sizes.push(page.conversations().len());
        listed.extend(page.conversations().iter().map(|c| c.key()));
        token = page.next_page_token().to_string();
        tokens.push(token.clone());
    }

    assert_eq!(sizes, vec![20, 20, 13]);
    assert_eq!(tokens, vec!["20", "40", "60"]);
    assert_eq!(listed, opened);

    let past_end = rt.block_on(marketplace.service.conversations_page(participant, &token))?;
    assert!(past_end.conversations().is_empty());
    assert_eq!(past_end.next_page_token().to_string(), "80");
    Ok(())
}

/// A vendor sees only the conversations they are a party to.
#[rstest]
fn vendors_list_only_their_own_conversations(
    runtime: io::Result<Runtime>,
    marketplace: Marketplace,
) -> Result<(), BoxError> {
    let rt = runtime?;
    let vendor = marketplace.vendor()?;
    let other_vendor = marketplace.vendor()?;
    for _ in 0..3 {
        let buyer = marketplace.buyer()?;
        rt.block_on(marketplace.buyer_posts(buyer, vendor, "interested"))?;
        rt.block_on(marketplace.buyer_posts(buyer, other_vendor, "interested"))?;
    }

    let page = rt.block_on(
        marketplace
            .service
            .conversations_page(Participant::Vendor(vendor.key), ""),
    )?;

    assert_eq!(page.conversations().len(), 3);
    assert!(page.conversations().iter().all(|c| c.vendor() == vendor.key));
    Ok(())
}
