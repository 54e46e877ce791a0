//! Integration tests for the read-only reporting queries.
//!
//! Validates:
//! - Admin table rows carry the stored reason and skip details
//! - Admin counts split by reason
//! - Recycle table contents
//! - History separates editable records from read-only votes
//! - Distribution pivots per coder and stays empty with no labels

use labelflow::models::item::QueueReason;
use labelflow::workflow::reports;

use super::test_helpers::{fixture, label_id, seed_item, seed_items};

#[tokio::test]
async fn admin_table_carries_reasons_and_skip_details() {
    let fx = fixture(2, 10).await;
    let skipped = seed_item(&fx, "skipped item", false).await;
    let disputed = seed_item(&fx, "disputed item", true).await;
    let neutral = label_id(&fx, "neutral");

    // Normal skip.
    fx.coordinator
        .fetch_batch(&fx.project.id, "alice", Some(2))
        .await
        .expect("fetch");
    fx.coordinator
        .submit_skip(&skipped.id, "alice", &neutral, 250, "too vague", false)
        .await
        .expect("skip");

    // Reliability dispute.
    fx.coordinator
        .submit_label(&disputed.id, "alice", &label_id(&fx, "positive"), 100, "")
        .await
        .expect("vote");
    fx.coordinator
        .fetch_batch(&fx.project.id, "bob", Some(1))
        .await
        .expect("fetch");
    fx.coordinator
        .submit_label(&disputed.id, "bob", &label_id(&fx, "negative"), 100, "")
        .await
        .expect("vote");

    let table = reports::admin_table(&fx.db, &fx.project.id)
        .await
        .expect("table");
    assert_eq!(table.len(), 2);

    let skip_row = table.iter().find(|r| r.item_id == skipped.id).expect("row");
    assert_eq!(skip_row.reason, QueueReason::Skipped);
    assert_eq!(skip_row.label.as_deref(), Some("neutral"));
    assert_eq!(skip_row.label_reason.as_deref(), Some("too vague"));

    let irr_row = table.iter().find(|r| r.item_id == disputed.id).expect("row");
    assert_eq!(irr_row.reason, QueueReason::Irr);
    assert!(irr_row.label.is_none());
}

#[tokio::test]
async fn admin_counts_split_by_reason() {
    let fx = fixture(0, 10).await;
    let items = seed_items(&fx, 3, false).await;
    let neutral = label_id(&fx, "neutral");

    fx.coordinator
        .fetch_batch(&fx.project.id, "alice", Some(3))
        .await
        .expect("fetch");
    fx.coordinator
        .submit_skip(&items[0].id, "alice", &neutral, 100, "", false)
        .await
        .expect("skip");
    fx.coordinator
        .submit_skip(&items[1].id, "alice", &neutral, 100, "", false)
        .await
        .expect("skip");
    fx.coordinator
        .submit_skip(&items[2].id, "alice", &neutral, 100, "", true)
        .await
        .expect("explicit skip");

    let counts = reports::admin_counts(&fx.db, &fx.project.id)
        .await
        .expect("counts");
    assert_eq!(counts.skipped, 2);
    assert_eq!(counts.explicit, 1);
    assert_eq!(counts.irr, 0);
}

#[tokio::test]
async fn recycle_table_lists_discarded_items() {
    let fx = fixture(0, 10).await;
    let items = seed_items(&fx, 2, false).await;

    fx.coordinator
        .discard(&items[0].id, "admin", 2)
        .await
        .expect("discard");

    let table = reports::recycle_table(&fx.db, &fx.project.id)
        .await
        .expect("table");
    assert_eq!(table.len(), 1);
    assert_eq!(table[0].item_id, items[0].id);
    assert_eq!(table[0].text, "item 0");
}

#[tokio::test]
async fn history_separates_editable_and_vote_rows() {
    let fx = fixture(2, 10).await;
    let plain = seed_item(&fx, "plain item", false).await;
    let checked = seed_item(&fx, "checked item", true).await;
    let positive = label_id(&fx, "positive");

    fx.coordinator
        .fetch_batch(&fx.project.id, "alice", Some(2))
        .await
        .expect("fetch");
    fx.coordinator
        .submit_label(&plain.id, "alice", &positive, 100, "")
        .await
        .expect("label");
    fx.coordinator
        .submit_label(&checked.id, "alice", &positive, 100, "")
        .await
        .expect("vote");
    fx.coordinator
        .fetch_batch(&fx.project.id, "bob", Some(1))
        .await
        .expect("fetch");
    fx.coordinator
        .submit_label(&checked.id, "bob", &positive, 100, "")
        .await
        .expect("vote");

    // Admin finalization clears the reliability flag and the per-coder
    // records; alice's vote then shows read-only.
    fx.coordinator
        .admin_label(&checked.id, "admin", &positive, "", false)
        .await
        .expect("admin label");

    let history = reports::label_history(&fx.db, &fx.project.id, "alice")
        .await
        .expect("history");
    assert_eq!(history.len(), 2);

    let plain_row = history.iter().find(|r| r.item_id == plain.id).expect("row");
    assert!(plain_row.editable);
    let vote_row = history.iter().find(|r| r.item_id == checked.id).expect("row");
    assert!(!vote_row.editable);
    assert_eq!(vote_row.label, "positive");
}

#[tokio::test]
async fn distribution_pivots_per_coder() {
    let fx = fixture(0, 10).await;
    let items = seed_items(&fx, 3, false).await;
    let positive = label_id(&fx, "positive");
    let negative = label_id(&fx, "negative");

    let empty = reports::label_distribution(&fx.db, &fx.project.id)
        .await
        .expect("distribution");
    assert!(empty.is_empty());

    fx.coordinator
        .fetch_batch(&fx.project.id, "alice", Some(2))
        .await
        .expect("fetch");
    fx.coordinator
        .submit_label(&items[0].id, "alice", &positive, 100, "")
        .await
        .expect("label");
    fx.coordinator
        .submit_label(&items[1].id, "alice", &positive, 100, "")
        .await
        .expect("label");
    fx.coordinator
        .fetch_batch(&fx.project.id, "bob", Some(1))
        .await
        .expect("fetch");
    fx.coordinator
        .submit_label(&items[2].id, "bob", &negative, 100, "")
        .await
        .expect("label");

    let distribution = reports::label_distribution(&fx.db, &fx.project.id)
        .await
        .expect("distribution");
    assert_eq!(distribution.len(), 2);

    let alice = distribution.iter().find(|d| d.coder == "alice").expect("alice");
    assert_eq!(alice.counts.len(), 1);
    assert_eq!(alice.counts[0].label, "positive");
    assert_eq!(alice.counts[0].count, 2);

    let bob = distribution.iter().find(|d| d.coder == "bob").expect("bob");
    assert_eq!(bob.counts[0].label, "negative");
    assert_eq!(bob.counts[0].count, 1);
}

#[tokio::test]
async fn unlabeled_listing_shrinks_as_work_completes() {
    let fx = fixture(0, 10).await;
    let items = seed_items(&fx, 3, false).await;
    let positive = label_id(&fx, "positive");

    let initial = reports::unlabeled_items(&fx.db, &fx.project.id)
        .await
        .expect("unlabeled");
    assert_eq!(initial.len(), 3);

    fx.coordinator
        .fetch_batch(&fx.project.id, "alice", Some(1))
        .await
        .expect("fetch");
    fx.coordinator
        .submit_label(&items[0].id, "alice", &positive, 100, "")
        .await
        .expect("label");
    fx.coordinator
        .discard(&items[1].id, "admin", 2)
        .await
        .expect("discard");

    let remaining = reports::unlabeled_items(&fx.db, &fx.project.id)
        .await
        .expect("unlabeled");
    assert_eq!(remaining.len(), 1);
    assert_eq!(remaining[0].id, items[2].id);
}
