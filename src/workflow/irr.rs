//! Reliability (IRR) vote resolution.
//!
//! Runs inside the submitting operation's transaction, after the new
//! vote has been appended to the log. Decides whether the item keeps
//! collecting votes, finalizes, or escalates to the admin queue.

use sqlx::SqliteConnection;
use tracing::info;

use crate::models::item::{Item, QueueReason};
use crate::models::project::Project;
use crate::models::queue::QueueType;
use crate::persistence::queue_repo::QueueRepo;
use crate::persistence::vote_repo::VoteRepo;
use crate::Result;

/// Routing decision produced by one vote resolution step.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum VoteOutcome {
    /// Below the required voter count; keep collecting.
    Collecting,
    /// All required votes agree; the item is resolved in place.
    Finalized,
    /// Escalated to the admin queue for a human tie-break.
    Escalated,
}

/// Resolve the vote just appended for `item`.
///
/// A skip vote (`vote_label = None`) escalates unconditionally: it
/// signals the coder could not render a reliability judgment, so waiting
/// for consensus is pointless. A label vote adjudicates once the history
/// reaches the project's required voter count — unanimous non-skip votes
/// finalize, disagreement escalates.
///
/// # Errors
///
/// Returns `AppError::Db` if any store operation fails.
pub async fn resolve(
    conn: &mut SqliteConnection,
    project: &Project,
    item: &Item,
    vote_label: Option<&str>,
) -> Result<VoteOutcome> {
    if vote_label.is_none() {
        QueueRepo::enqueue(
            &mut *conn,
            &item.id,
            &project.id,
            QueueType::Admin,
            QueueReason::Irr,
        )
        .await?;
        info!(item_id = %item.id, "skip vote escalated to admin queue");
        return Ok(VoteOutcome::Escalated);
    }

    let history = VoteRepo::count_for_item(&mut *conn, &item.id).await?;
    if history < i64::from(project.required_irr_voters) {
        return Ok(VoteOutcome::Collecting);
    }

    let votes = VoteRepo::for_item(&mut *conn, &item.id).await?;
    let mut cast = votes.iter().filter_map(|v| v.label_id.as_deref());
    let unanimous = match cast.next() {
        Some(first) => cast.all(|label| label == first),
        None => true,
    };

    if unanimous {
        info!(item_id = %item.id, voters = history, "reliability votes agree, item resolved");
        Ok(VoteOutcome::Finalized)
    } else {
        QueueRepo::enqueue(
            &mut *conn,
            &item.id,
            &project.id,
            QueueType::Admin,
            QueueReason::Irr,
        )
        .await?;
        info!(item_id = %item.id, voters = history, "reliability votes disagree, escalated");
        Ok(VoteOutcome::Escalated)
    }
}
