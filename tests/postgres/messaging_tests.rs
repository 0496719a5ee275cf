//! Thread creation, numbering and unread flags on `PostgreSQL`.

use crate::postgres::helpers::{BoxError, TestDatabase, Vendor, buyer_posts, vendor_posts};
use agora::identity::domain::{Participant, Role};
use std::collections::BTreeSet;

#[tokio::test(flavor = "multi_thread")]
#[ignore = "boots an embedded PostgreSQL server"]
async fn buyer_opens_and_vendor_replies() -> Result<(), BoxError> {
    let db = TestDatabase::start().await?;
    let service = db.service();
    let buyer = db.buyer().await?;
    let vendor = db.vendor().await?;

    let opener = buyer_posts(&service, buyer, vendor, "Your Mother was a hamster").await?;
    let reply = vendor_posts(
        &service,
        vendor,
        buyer,
        "And your father smelt of elderberries",
    )
    .await?;

    assert_eq!(opener.number().value(), 1);
    assert_eq!(reply.number().value(), 2);
    assert_eq!(opener.conversation(), reply.conversation());

    let conversation = service
        .find_conversation(buyer.key, vendor.key)
        .await?
        .ok_or("conversation should exist")?;
    assert_eq!(conversation.message_count(), 2);
    assert!(conversation.is_unread_for(Role::Buyer));
    assert!(conversation.is_unread_for(Role::Vendor));

    let page = service.messages_page(conversation.id(), 0).await?;
    let senders: Vec<Role> = page.messages().iter().map(|m| m.sender()).collect();
    assert_eq!(senders, vec![Role::Vendor, Role::Buyer]);

    db.stop().await
}

#[tokio::test(flavor = "multi_thread")]
#[ignore = "boots an embedded PostgreSQL server"]
async fn concurrent_first_posts_share_one_thread() -> Result<(), BoxError> {
    let db = TestDatabase::start().await?;
    let service = db.service();
    let buyer = db.buyer().await?;
    let vendor = db.vendor().await?;

    let mut tasks = Vec::new();
    for (index, from_buyer) in (0..20).zip([true, false].into_iter().cycle()) {
        let task_service = service.clone();
        tasks.push(tokio::spawn(async move {
            let text = format!("message {index}");
            if from_buyer {
                buyer_posts(&task_service, buyer, vendor, &text).await
            } else {
                vendor_posts(&task_service, vendor, buyer, &text).await
            }
        }));
    }

    let mut numbers = BTreeSet::new();
    for task in tasks {
        let message = task.await??;
        numbers.insert(message.number().value());
    }

    assert_eq!(numbers, (1..=20).collect::<BTreeSet<u64>>());
    let conversation = service
        .find_conversation(buyer.key, vendor.key)
        .await?
        .ok_or("conversation should exist")?;
    assert_eq!(conversation.message_count(), 20);
    let listed = service
        .conversations_page(Participant::Buyer(buyer.key), "")
        .await?;
    assert_eq!(listed.conversations().len(), 1);

    db.stop().await
}

#[tokio::test(flavor = "multi_thread")]
#[ignore = "boots an embedded PostgreSQL server"]
async fn unread_listing_tracks_vendor_replies() -> Result<(), BoxError> {
    let db = TestDatabase::start().await?;
    let service = db.service();
    let buyer = db.buyer().await?;
    let mut vendors: Vec<Vendor> = Vec::new();
    for _ in 0..50 {
        vendors.push(db.vendor().await?);
    }

    for vendor in &vendors {
        buyer_posts(&service, buyer, *vendor, "Is this still available?").await?;
    }
    for vendor in vendors.iter().take(20) {
        vendor_posts(&service, *vendor, buyer, "Yes").await?;
    }

    let buyer_side = Participant::Buyer(buyer.key);
    let unread = service.unread_conversations(buyer_side).await?;
    assert_eq!(unread.len(), 20);

    let first = unread.first().ok_or("expected an unread conversation")?;
    service.mark_read(buyer_side, first.id()).await?;
    assert_eq!(service.unread_conversations(buyer_side).await?.len(), 19);

    let silent = vendors.last().ok_or("expected a vendor")?;
    let vendor_unread = service
        .unread_conversations(Participant::Vendor(silent.key))
        .await?;
    assert_eq!(vendor_unread.len(), 1);

    db.stop().await
}
