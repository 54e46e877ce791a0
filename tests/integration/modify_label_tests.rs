//! Integration tests for label modification and skip conversion.
//!
//! Validates:
//! - Replace + audit are atomic and exactly one audit row is written
//!   per invocation, even when zero or many records match
//! - Skip conversion appends at most one reliability vote per coder
//! - Non-reliability skip conversions enqueue immediately

use labelflow::models::item::QueueReason;
use labelflow::models::queue::QueueType;
use labelflow::persistence::audit_repo::AuditRepo;
use labelflow::persistence::label_repo::LabelRepo;
use labelflow::persistence::queue_repo::QueueRepo;
use labelflow::persistence::vote_repo::VoteRepo;

use super::test_helpers::{fixture, get_item, label_id, seed_items, Fixture};

/// Fetch one item for the coder and label it.
async fn label_item(fx: &Fixture, item_id: &str, coder: &str, label: &str) {
    fx.coordinator
        .fetch_batch(&fx.project.id, coder, Some(1))
        .await
        .expect("fetch");
    fx.coordinator
        .submit_label(item_id, coder, &label_id(fx, label), 100, "")
        .await
        .expect("label");
}

#[tokio::test]
async fn modify_label_updates_record_and_audits_once() {
    let fx = fixture(0, 10).await;
    let seeded = seed_items(&fx, 1, false).await;
    let item = &seeded[0];
    label_item(&fx, &item.id, "alice", "neutral").await;

    fx.coordinator
        .modify_label(
            &item.id,
            "alice",
            &label_id(&fx, "neutral"),
            &label_id(&fx, "positive"),
            "reconsidered",
        )
        .await
        .expect("modify");

    let mut conn = fx.db.acquire().await.expect("conn");
    let records = LabelRepo::for_item(&mut conn, &item.id).await.expect("records");
    assert_eq!(records.len(), 1);
    assert_eq!(records[0].label_id, label_id(&fx, "positive"));
    assert_eq!(records[0].time_to_label_ms, Some(0));
    assert_eq!(records[0].reason, "reconsidered");

    let audit = AuditRepo::for_project(&mut conn, &fx.project.id)
        .await
        .expect("audit");
    assert_eq!(audit.len(), 1);
    assert_eq!(audit[0].old_label_name, "neutral");
    assert_eq!(audit[0].new_label_name, "positive");
    assert_eq!(audit[0].coder, "alice");
}

#[tokio::test]
async fn modify_label_with_zero_matches_still_audits() {
    let fx = fixture(0, 10).await;
    let seeded = seed_items(&fx, 1, false).await;
    let item = &seeded[0];
    label_item(&fx, &item.id, "alice", "neutral").await;

    // The old label matches no record; the audit row is written anyway.
    fx.coordinator
        .modify_label(
            &item.id,
            "alice",
            &label_id(&fx, "negative"),
            &label_id(&fx, "positive"),
            "",
        )
        .await
        .expect("modify");

    let mut conn = fx.db.acquire().await.expect("conn");
    let records = LabelRepo::for_item(&mut conn, &item.id).await.expect("records");
    assert_eq!(records[0].label_id, label_id(&fx, "neutral"), "untouched");

    let audit = AuditRepo::for_project(&mut conn, &fx.project.id)
        .await
        .expect("audit");
    assert_eq!(audit.len(), 1);
    assert_eq!(audit[0].old_label_name, "negative");
    assert_eq!(audit[0].new_label_name, "positive");
}

#[tokio::test]
async fn modify_label_with_many_matches_audits_once() {
    let fx = fixture(2, 10).await;
    let seeded = seed_items(&fx, 1, true).await;
    let item = &seeded[0];
    label_item(&fx, &item.id, "alice", "positive").await;
    label_item(&fx, &item.id, "bob", "positive").await;

    fx.coordinator
        .modify_label(
            &item.id,
            "admin",
            &label_id(&fx, "positive"),
            &label_id(&fx, "negative"),
            "",
        )
        .await
        .expect("modify");

    let mut conn = fx.db.acquire().await.expect("conn");
    let records = LabelRepo::for_item(&mut conn, &item.id).await.expect("records");
    assert_eq!(records.len(), 2);
    assert!(records
        .iter()
        .all(|r| r.label_id == label_id(&fx, "negative")));

    let audit = AuditRepo::for_project(&mut conn, &fx.project.id)
        .await
        .expect("audit");
    assert_eq!(audit.len(), 1, "one audit row for the whole invocation");
}

#[tokio::test]
async fn modify_to_skip_on_reliability_item_appends_vote_at_most_once() {
    let fx = fixture(3, 10).await;
    let seeded = seed_items(&fx, 1, true).await;
    let item = &seeded[0];
    label_item(&fx, &item.id, "alice", "positive").await;

    fx.coordinator
        .modify_label_to_skip(
            &item.id,
            "alice",
            &label_id(&fx, "positive"),
            &label_id(&fx, "neutral"),
            "second thoughts",
            false,
        )
        .await
        .expect("modify to skip");

    let mut conn = fx.db.acquire().await.expect("conn");
    // Alice's labeling vote already exists; no second entry appears.
    assert_eq!(
        VoteRepo::count_for_item(&mut conn, &item.id).await.expect("count"),
        1
    );
    let records = LabelRepo::for_item(&mut conn, &item.id).await.expect("records");
    assert_eq!(records.len(), 1);
    assert!(records[0].was_skipped);

    // No immediate admin routing for reliability items.
    assert!(QueueRepo::entry_for(&mut conn, &item.id, QueueType::Admin)
        .await
        .expect("query")
        .is_none());

    let audit = AuditRepo::for_project(&mut conn, &fx.project.id)
        .await
        .expect("audit");
    assert_eq!(audit.len(), 1);
    assert_eq!(audit[0].new_label_name, "skip");
}

#[tokio::test]
async fn modify_to_skip_on_normal_item_enqueues() {
    let fx = fixture(0, 10).await;
    let seeded = seed_items(&fx, 1, false).await;
    let item = &seeded[0];
    label_item(&fx, &item.id, "alice", "neutral").await;

    fx.coordinator
        .modify_label_to_skip(
            &item.id,
            "alice",
            &label_id(&fx, "neutral"),
            &label_id(&fx, "neutral"),
            "",
            false,
        )
        .await
        .expect("modify to skip");

    let mut conn = fx.db.acquire().await.expect("conn");
    let entry = QueueRepo::entry_for(&mut conn, &item.id, QueueType::Admin)
        .await
        .expect("query")
        .expect("queued");
    assert_eq!(entry.reason, QueueReason::Skipped);
}

#[tokio::test]
async fn modify_to_skip_explicit_purges_and_enqueues() {
    let fx = fixture(2, 10).await;
    let seeded = seed_items(&fx, 1, true).await;
    let item = &seeded[0];
    label_item(&fx, &item.id, "alice", "positive").await;
    label_item(&fx, &item.id, "bob", "negative").await;

    // The disagreement escalated; pull the entry to watch the explicit
    // conversion re-enqueue with its own reason.
    let mut conn = fx.db.acquire().await.expect("conn");
    QueueRepo::dequeue(&mut conn, &item.id, QueueType::Admin)
        .await
        .expect("dequeue");
    drop(conn);

    fx.coordinator
        .modify_label_to_skip(
            &item.id,
            "bob",
            &label_id(&fx, "negative"),
            &label_id(&fx, "neutral"),
            "graphic content",
            true,
        )
        .await
        .expect("modify to skip");

    let mut conn = fx.db.acquire().await.expect("conn");
    assert_eq!(
        VoteRepo::count_for_item(&mut conn, &item.id).await.expect("count"),
        0
    );
    let records = LabelRepo::for_item(&mut conn, &item.id).await.expect("records");
    assert_eq!(records.len(), 1, "only bob's skip record survives");
    assert!(records[0].was_skipped);

    let entry = QueueRepo::entry_for(&mut conn, &item.id, QueueType::Admin)
        .await
        .expect("query")
        .expect("queued");
    assert_eq!(entry.reason, QueueReason::Explicit);
    drop(conn);

    let current = get_item(&fx, &item.id).await;
    assert!(!current.reliability_flag);
    assert!(current.sensitive_flag);
}
