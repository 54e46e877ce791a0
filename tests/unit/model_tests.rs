//! Unit tests for domain model constructors and helpers.

use labelflow::models::item::{Item, ItemState};
use labelflow::models::project::Project;
use labelflow::models::record::LabelingRecord;
use labelflow::models::vote::ReliabilityVote;

#[test]
fn new_items_start_available() {
    let item = Item::new("project-1".into(), "some text".into(), true);
    assert_eq!(item.state, ItemState::Available);
    assert!(item.reliability_flag);
    assert!(!item.sensitive_flag);
    assert!(!item.id.is_empty());
}

#[test]
fn new_projects_start_at_generation_zero() {
    let project = Project::new("demo".into(), 30, 3);
    assert_eq!(project.current_training_set, 0);
    assert_eq!(project.required_irr_voters, 3);
}

#[test]
fn skip_votes_carry_no_label() {
    let skip = ReliabilityVote::new("item-1".into(), "alice".into(), None, String::new());
    assert!(skip.is_skip());

    let label = ReliabilityVote::new(
        "item-1".into(),
        "alice".into(),
        Some("label-1".into()),
        String::new(),
    );
    assert!(!label.is_skip());
}

#[test]
fn records_keep_the_supplied_labeling_time() {
    let timed = LabelingRecord::new(
        "item-1".into(),
        "label-1".into(),
        "alice".into(),
        2,
        Some(850),
        false,
        "obvious".into(),
    );
    assert_eq!(timed.time_to_label_ms, Some(850));
    assert_eq!(timed.training_set, 2);

    let admin = LabelingRecord::new(
        "item-1".into(),
        "label-1".into(),
        "admin".into(),
        2,
        None,
        false,
        String::new(),
    );
    assert_eq!(admin.time_to_label_ms, None);
}

#[test]
fn item_state_serializes_snake_case() {
    let json = serde_json::to_string(&ItemState::AdminQueued).expect("serialize");
    assert_eq!(json, "\"admin_queued\"");
}
