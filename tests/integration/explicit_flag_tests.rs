//! Integration tests for the sensitive-content (explicit) short-circuit.
//!
//! Validates:
//! - An explicit skip purges all reliability votes and labeling records
//!   and clears the reliability flag
//! - The item lands in the admin queue as explicit
//! - Subsequent submissions follow the non-reliability path only

use labelflow::models::item::{ItemState, QueueReason};
use labelflow::models::queue::QueueType;
use labelflow::persistence::label_repo::LabelRepo;
use labelflow::persistence::queue_repo::QueueRepo;
use labelflow::persistence::vote_repo::VoteRepo;

use super::test_helpers::{checkout, fixture, get_item, label_id, seed_items};

#[tokio::test]
async fn explicit_skip_purges_reliability_state() {
    let fx = fixture(3, 10).await;
    let seeded = seed_items(&fx, 1, true).await;
    let item = &seeded[0];
    let positive = label_id(&fx, "positive");
    let neutral = label_id(&fx, "neutral");

    // One reliability vote exists before the explicit mark.
    fx.coordinator
        .fetch_batch(&fx.project.id, "alice", Some(1))
        .await
        .expect("alice fetch");
    fx.coordinator
        .submit_label(&item.id, "alice", &positive, 500, "")
        .await
        .expect("alice vote");

    fx.coordinator
        .fetch_batch(&fx.project.id, "bob", Some(1))
        .await
        .expect("bob fetch");
    fx.coordinator
        .submit_skip(&item.id, "bob", &neutral, 300, "graphic content", true)
        .await
        .expect("explicit skip");

    let mut conn = fx.db.acquire().await.expect("conn");
    assert_eq!(
        VoteRepo::count_for_item(&mut conn, &item.id).await.expect("count"),
        0,
        "all reliability votes purged"
    );
    let records = LabelRepo::for_item(&mut conn, &item.id).await.expect("records");
    assert_eq!(records.len(), 1, "only the skip record survives");
    assert!(records[0].was_skipped);
    assert_eq!(records[0].coder, "bob");

    let entry = QueueRepo::entry_for(&mut conn, &item.id, QueueType::Admin)
        .await
        .expect("query")
        .expect("queued");
    assert_eq!(entry.reason, QueueReason::Explicit);
    drop(conn);

    let current = get_item(&fx, &item.id).await;
    assert!(!current.reliability_flag);
    assert!(current.sensitive_flag);
    assert_eq!(current.state, ItemState::AdminQueued);
}

#[tokio::test]
async fn subsequent_submission_follows_non_reliability_path() {
    let fx = fixture(2, 10).await;
    let seeded = seed_items(&fx, 1, true).await;
    let item = &seeded[0];
    let positive = label_id(&fx, "positive");
    let neutral = label_id(&fx, "neutral");

    fx.coordinator
        .fetch_batch(&fx.project.id, "alice", Some(1))
        .await
        .expect("fetch");
    fx.coordinator
        .submit_skip(&item.id, "alice", &neutral, 300, "", true)
        .await
        .expect("explicit skip");

    // An admin pulls the item back out of the queue; a straggler then
    // labels it. No vote may be recorded: the item is no longer a
    // reliability item.
    let mut conn = fx.db.acquire().await.expect("conn");
    QueueRepo::dequeue(&mut conn, &item.id, QueueType::Admin)
        .await
        .expect("dequeue");
    drop(conn);

    checkout(&fx, &item.id, "carol").await;
    fx.coordinator
        .submit_label(&item.id, "carol", &positive, 200, "")
        .await
        .expect("label");

    let mut conn = fx.db.acquire().await.expect("conn");
    assert_eq!(
        VoteRepo::count_for_item(&mut conn, &item.id).await.expect("count"),
        0
    );
    let records = LabelRepo::for_item(&mut conn, &item.id).await.expect("records");
    assert_eq!(records.len(), 2);
    drop(conn);

    assert_eq!(get_item(&fx, &item.id).await.state, ItemState::Available);
}
