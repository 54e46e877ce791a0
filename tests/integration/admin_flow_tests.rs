//! Integration tests for admin finalization of queued items.
//!
//! Validates:
//! - Prior labels are cleared and replaced by the admin's record
//! - The item leaves the admin queue and the reliability flag drops
//! - The sensitive flag is pinned to the supplied value
//! - The retrain trigger fires after commit

use labelflow::models::item::ItemState;
use labelflow::models::queue::QueueType;
use labelflow::persistence::label_repo::LabelRepo;
use labelflow::persistence::queue_repo::QueueRepo;
use labelflow::persistence::vote_repo::VoteRepo;

use super::test_helpers::{drain_retrain, fixture, get_item, label_id, seed_items};

#[tokio::test]
async fn admin_label_replaces_history_and_dequeues() {
    let mut fx = fixture(0, 10).await;
    let seeded = seed_items(&fx, 1, false).await;
    let item = &seeded[0];
    let neutral = label_id(&fx, "neutral");
    let positive = label_id(&fx, "positive");

    fx.coordinator
        .fetch_batch(&fx.project.id, "alice", Some(1))
        .await
        .expect("fetch");
    fx.coordinator
        .submit_skip(&item.id, "alice", &neutral, 300, "unsure", false)
        .await
        .expect("skip");
    drain_retrain(&mut fx);

    fx.coordinator
        .admin_label(&item.id, "admin", &positive, "clear case", false)
        .await
        .expect("admin label");

    let mut conn = fx.db.acquire().await.expect("conn");
    let records = LabelRepo::for_item(&mut conn, &item.id).await.expect("records");
    assert_eq!(records.len(), 1);
    assert_eq!(records[0].coder, "admin");
    assert_eq!(records[0].label_id, positive);
    assert_eq!(records[0].time_to_label_ms, None, "admin labels carry no time");
    assert!(!records[0].was_skipped);

    assert!(QueueRepo::entry_for(&mut conn, &item.id, QueueType::Admin)
        .await
        .expect("query")
        .is_none());
    drop(conn);

    assert_eq!(get_item(&fx, &item.id).await.state, ItemState::Available);
    assert_eq!(drain_retrain(&mut fx), 1);
}

#[tokio::test]
async fn admin_label_clears_reliability_flag() {
    let fx = fixture(2, 10).await;
    let seeded = seed_items(&fx, 1, true).await;
    let item = &seeded[0];
    let positive = label_id(&fx, "positive");
    let negative = label_id(&fx, "negative");

    fx.coordinator
        .fetch_batch(&fx.project.id, "alice", Some(1))
        .await
        .expect("fetch");
    fx.coordinator
        .submit_label(&item.id, "alice", &positive, 100, "")
        .await
        .expect("vote");
    fx.coordinator
        .fetch_batch(&fx.project.id, "bob", Some(1))
        .await
        .expect("fetch");
    fx.coordinator
        .submit_label(&item.id, "bob", &negative, 100, "")
        .await
        .expect("vote");

    fx.coordinator
        .admin_label(&item.id, "admin", &positive, "tie-break", false)
        .await
        .expect("admin label");

    let current = get_item(&fx, &item.id).await;
    assert!(!current.reliability_flag);
    assert_eq!(current.state, ItemState::Available);

    // The vote history stays for the record; the item still cannot
    // re-enter the pool because an active record exists.
    let mut conn = fx.db.acquire().await.expect("conn");
    assert_eq!(
        VoteRepo::count_for_item(&mut conn, &item.id).await.expect("count"),
        2
    );
    drop(conn);

    let batch = fx
        .coordinator
        .fetch_batch(&fx.project.id, "carol", Some(1))
        .await
        .expect("fetch");
    assert!(batch.items.is_empty());
}

#[tokio::test]
async fn admin_label_pins_sensitive_flag() {
    let fx = fixture(0, 10).await;
    let seeded = seed_items(&fx, 1, false).await;
    let item = &seeded[0];
    let positive = label_id(&fx, "positive");

    fx.coordinator
        .fetch_batch(&fx.project.id, "alice", Some(1))
        .await
        .expect("fetch");
    fx.coordinator
        .submit_skip(&item.id, "alice", &positive, 100, "", true)
        .await
        .expect("explicit skip");
    assert!(get_item(&fx, &item.id).await.sensitive_flag);

    // The admin overrules the sensitive mark while finalizing.
    fx.coordinator
        .admin_label(&item.id, "admin", &positive, "", false)
        .await
        .expect("admin label");
    assert!(!get_item(&fx, &item.id).await.sensitive_flag);
}
