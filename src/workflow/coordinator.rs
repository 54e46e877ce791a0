//! Workflow coordinator: the public operations of the labeling engine.
//!
//! Every operation that touches more than one store runs as a single
//! transaction, so concurrent submissions for the same item serialize
//! rather than interleave. Retrain notifications fire only after a
//! successful commit.

use std::sync::Arc;

use rand::seq::SliceRandom;
use serde::Serialize;
use tracing::info;

use crate::config::denotes_admin;
use crate::models::audit::ChangeLogEntry;
use crate::models::item::{Item, ItemState, QueueReason};
use crate::models::label::Label;
use crate::models::queue::QueueType;
use crate::models::record::LabelingRecord;
use crate::models::vote::ReliabilityVote;
use crate::notify::RetrainTrigger;
use crate::persistence::assignment_repo::AssignmentRepo;
use crate::persistence::audit_repo::AuditRepo;
use crate::persistence::db::Database;
use crate::persistence::item_repo::ItemRepo;
use crate::persistence::label_repo::LabelRepo;
use crate::persistence::lock_repo::LockRepo;
use crate::persistence::project_repo::ProjectRepo;
use crate::persistence::queue_repo::QueueRepo;
use crate::persistence::recycle_repo::RecycleRepo;
use crate::persistence::vote_repo::VoteRepo;
use crate::workflow::irr;
use crate::{AppError, Result};

/// One fetched batch: the project's labels plus the items handed out.
#[derive(Debug, Clone, Serialize)]
pub struct Batch {
    /// Labels defined for the project.
    pub labels: Vec<Label>,
    /// Items now checked out to the requesting coder, in presentation
    /// order.
    pub items: Vec<Item>,
}

/// Orchestrates the item lifecycle across all stores.
#[derive(Clone)]
pub struct WorkflowCoordinator {
    db: Arc<Database>,
    retrain: RetrainTrigger,
}

impl WorkflowCoordinator {
    /// Create a new coordinator over the shared pool.
    #[must_use]
    pub fn new(db: Arc<Database>, retrain: RetrainTrigger) -> Self {
        Self { db, retrain }
    }

    /// Project an item belongs to. Used by callers that need project
    /// context (e.g. the permission oracle) before invoking an
    /// item-scoped operation.
    ///
    /// # Errors
    ///
    /// Returns `AppError::NotFound` if the item does not exist.
    pub async fn project_of_item(&self, item_id: &str) -> Result<String> {
        let mut conn = self.db.acquire().await?;
        let item = ItemRepo::get(&mut conn, item_id).await?;
        Ok(item.project_id)
    }

    /// Hand out up to `desired_count` items to a coder.
    ///
    /// Re-serves the coder's existing assignments for the project first,
    /// then tops up from the distributable pool with per-item
    /// compare-and-swap claims so two concurrent fetches can never both
    /// own an item. The returned order is shuffled — presentation only,
    /// selection is oldest-first.
    ///
    /// # Errors
    ///
    /// Returns `AppError::NotFound` for an unknown project,
    /// `AppError::Db` on store failures.
    pub async fn fetch_batch(
        &self,
        project_id: &str,
        coder: &str,
        desired_count: Option<u32>,
    ) -> Result<Batch> {
        let mut tx = self.db.begin().await?;

        let project = ProjectRepo::get(&mut tx, project_id).await?;
        let want = desired_count.unwrap_or(project.batch_size);

        let mut items = Vec::new();
        for item_id in AssignmentRepo::items_for_coder(&mut tx, coder, project_id).await? {
            items.push(ItemRepo::get(&mut tx, &item_id).await?);
        }

        let have = u32::try_from(items.len()).unwrap_or(u32::MAX);
        if have < want {
            let missing = want - have;
            let candidates = ItemRepo::distributable(
                &mut tx,
                project_id,
                coder,
                project.required_irr_voters,
                missing,
            )
            .await?;
            for mut candidate in candidates {
                if AssignmentRepo::claim(&mut tx, &candidate.id, coder).await? {
                    candidate.state = ItemState::Assigned;
                    items.push(candidate);
                }
            }
        }

        let labels = ProjectRepo::labels_for_project(&mut tx, project_id).await?;
        tx.commit().await?;

        // Shuffle so reliability items are not clustered at the front.
        items.shuffle(&mut rand::rng());

        info!(project_id, coder, handed_out = items.len(), "batch fetched");
        Ok(Batch { labels, items })
    }

    /// Record a coder's label for an item and release the checkout.
    ///
    /// Recycled items swallow the submission; items whose reliability
    /// history is already complete take the late-vote path (append only,
    /// no re-adjudication); reliability items run vote resolution.
    ///
    /// # Errors
    ///
    /// Returns `AppError::NotFound` for an unknown item or label,
    /// `AppError::NotAssigned` if the coder holds no checkout on the
    /// item, `AppError::Db` on store failures.
    pub async fn submit_label(
        &self,
        item_id: &str,
        coder: &str,
        label_id: &str,
        time_to_label_ms: i64,
        reason: &str,
    ) -> Result<()> {
        let mut tx = self.db.begin().await?;

        let item = ItemRepo::get(&mut tx, item_id).await?;
        let project = ProjectRepo::get(&mut tx, &item.project_id).await?;
        let label = ProjectRepo::get_label(&mut tx, label_id).await?;

        if item.state == ItemState::Recycled {
            // The submission is swallowed; the checkout row may already
            // be gone from the recycle cleanup.
            AssignmentRepo::drop_if_present(&mut tx, item_id, coder).await?;
        } else {
            // History is counted before the new vote is appended.
            let pre = VoteRepo::count_for_item(&mut tx, item_id).await?;
            if pre >= i64::from(project.required_irr_voters) && (item.reliability_flag || pre > 0)
            {
                // Already processed; append the late vote to the history
                // without re-adjudicating.
                let vote = ReliabilityVote::new(
                    item_id.to_owned(),
                    coder.to_owned(),
                    Some(label.id.clone()),
                    reason.to_owned(),
                );
                VoteRepo::append(&mut tx, &vote).await?;
                AssignmentRepo::release(&mut tx, item_id, coder).await?;
            } else {
                let record = LabelingRecord::new(
                    item_id.to_owned(),
                    label.id.clone(),
                    coder.to_owned(),
                    project.current_training_set,
                    Some(time_to_label_ms),
                    false,
                    reason.to_owned(),
                );
                LabelRepo::record(&mut tx, &record).await?;

                if item.reliability_flag {
                    let vote = ReliabilityVote::new(
                        item_id.to_owned(),
                        coder.to_owned(),
                        Some(label.id.clone()),
                        reason.to_owned(),
                    );
                    VoteRepo::append(&mut tx, &vote).await?;
                    irr::resolve(&mut tx, &project, &item, Some(&label.id)).await?;
                }
                AssignmentRepo::release(&mut tx, item_id, coder).await?;
            }
        }

        tx.commit().await?;
        self.retrain.notify(&item.project_id, item_id);

        info!(item_id, coder, label_id, "label submitted");
        Ok(())
    }

    /// Record a skip for an item and route it.
    ///
    /// A freshly set explicit flag purges all reliability state first,
    /// so the item proceeds down the non-reliability path and lands in
    /// the admin queue as explicit. Reliability skips escalate
    /// unconditionally; normal skips go to the admin queue as skipped.
    ///
    /// # Errors
    ///
    /// Returns `AppError::NotFound` for an unknown item or label,
    /// `AppError::NotAssigned` if the coder holds no checkout on the
    /// item, `AppError::Db` on store failures.
    pub async fn submit_skip(
        &self,
        item_id: &str,
        coder: &str,
        label_id: &str,
        time_to_label_ms: i64,
        reason: &str,
        explicit: bool,
    ) -> Result<()> {
        let mut tx = self.db.begin().await?;

        let mut item = ItemRepo::get(&mut tx, item_id).await?;
        let project = ProjectRepo::get(&mut tx, &item.project_id).await?;
        let label = ProjectRepo::get_label(&mut tx, label_id).await?;

        if explicit {
            // Sensitive content short-circuits reliability processing:
            // drop all prior votes and labels and clear the flag.
            ItemRepo::mark_explicit(&mut tx, item_id).await?;
            VoteRepo::purge_item(&mut tx, item_id).await?;
            LabelRepo::delete_all(&mut tx, item_id).await?;
            item = ItemRepo::get(&mut tx, item_id).await?;
        }

        let record = LabelingRecord::new(
            item_id.to_owned(),
            label.id.clone(),
            coder.to_owned(),
            project.current_training_set,
            Some(time_to_label_ms),
            true,
            reason.to_owned(),
        );
        LabelRepo::record(&mut tx, &record).await?;

        let pre = VoteRepo::count_for_item(&mut tx, item_id).await?;

        if item.state == ItemState::Recycled {
            AssignmentRepo::drop_if_present(&mut tx, item_id, coder).await?;
        } else if item.reliability_flag || pre > 0 {
            AssignmentRepo::release(&mut tx, item_id, coder).await?;
            let vote = ReliabilityVote::new(
                item_id.to_owned(),
                coder.to_owned(),
                None,
                reason.to_owned(),
            );
            VoteRepo::append(&mut tx, &vote).await?;
            // Past the required count the history is already processed;
            // the late vote is recorded and nothing else happens.
            if pre <= i64::from(project.required_irr_voters) {
                irr::resolve(&mut tx, &project, &item, None).await?;
            }
        } else {
            AssignmentRepo::release(&mut tx, item_id, coder).await?;
            let reason_tag = if item.sensitive_flag {
                QueueReason::Explicit
            } else {
                QueueReason::Skipped
            };
            QueueRepo::enqueue(&mut tx, item_id, &item.project_id, QueueType::Admin, reason_tag)
                .await?;
        }

        tx.commit().await?;
        self.retrain.notify(&item.project_id, item_id);

        info!(item_id, coder, explicit, "skip submitted");
        Ok(())
    }

    /// Move an item to the recycle bin, wiping its labeling history.
    ///
    /// # Errors
    ///
    /// Returns `AppError::PermissionDenied` unless the caller's level
    /// denotes admin, `AppError::NotFound` for an unknown item,
    /// `AppError::Db` on store failures.
    pub async fn discard(&self, item_id: &str, coder: &str, permission_level: i64) -> Result<()> {
        if !denotes_admin(permission_level) {
            return Err(AppError::PermissionDenied(
                "invalid credentials, must be an admin".into(),
            ));
        }

        let mut tx = self.db.begin().await?;

        let item = ItemRepo::get(&mut tx, item_id).await?;
        QueueRepo::dequeue(&mut tx, item_id, QueueType::Admin).await?;
        VoteRepo::purge_item(&mut tx, item_id).await?;
        LabelRepo::delete_all(&mut tx, item_id).await?;
        ItemRepo::clear_reliability(&mut tx, item_id).await?;
        RecycleRepo::recycle(&mut tx, item_id).await?;

        tx.commit().await?;
        info!(item_id, coder, project_id = %item.project_id, "item discarded");
        Ok(())
    }

    /// Move an item out of the recycle bin.
    ///
    /// # Errors
    ///
    /// Returns `AppError::PermissionDenied` unless the caller's level
    /// denotes admin, `AppError::NotFound` if the item is unknown or not
    /// recycled, `AppError::Db` on store failures.
    pub async fn restore(&self, item_id: &str, coder: &str, permission_level: i64) -> Result<()> {
        if !denotes_admin(permission_level) {
            return Err(AppError::PermissionDenied(
                "invalid credentials, must be an admin".into(),
            ));
        }

        let mut tx = self.db.begin().await?;
        ItemRepo::get(&mut tx, item_id).await?;
        RecycleRepo::restore(&mut tx, item_id).await?;
        tx.commit().await?;

        info!(item_id, coder, "item restored");
        Ok(())
    }

    /// Change the label on an item's existing record(s).
    ///
    /// The record update and the audit append are one transaction —
    /// both succeed or both roll back. Exactly one audit row is written
    /// per invocation, however many records matched.
    ///
    /// # Errors
    ///
    /// Returns `AppError::NotFound` for an unknown item or label,
    /// `AppError::Db` on store failures.
    pub async fn modify_label(
        &self,
        item_id: &str,
        coder: &str,
        old_label_id: &str,
        new_label_id: &str,
        reason: &str,
    ) -> Result<()> {
        let mut tx = self.db.begin().await?;

        let item = ItemRepo::get(&mut tx, item_id).await?;
        let old_label = ProjectRepo::get_label(&mut tx, old_label_id).await?;
        let new_label = ProjectRepo::get_label(&mut tx, new_label_id).await?;

        LabelRepo::replace(&mut tx, item_id, &old_label.id, &new_label.id, reason).await?;
        let entry = ChangeLogEntry::new(
            item.project_id.clone(),
            item_id.to_owned(),
            coder.to_owned(),
            old_label.name.clone(),
            new_label.name.clone(),
        );
        AuditRepo::append(&mut tx, &entry).await?;

        tx.commit().await?;
        info!(item_id, coder, old = %old_label.name, new = %new_label.name, "label modified");
        Ok(())
    }

    /// Convert a coder's existing record on an item into a skip.
    ///
    /// Reliability items get a skip vote appended only when the coder
    /// has no prior vote; other items enqueue for admin review
    /// immediately. The audit entry always carries `"skip"` as the new
    /// label name.
    ///
    /// # Errors
    ///
    /// Returns `AppError::NotFound` for an unknown item or label,
    /// `AppError::Db` on store failures.
    pub async fn modify_label_to_skip(
        &self,
        item_id: &str,
        coder: &str,
        old_label_id: &str,
        new_label_id: &str,
        reason: &str,
        explicit: bool,
    ) -> Result<()> {
        let mut tx = self.db.begin().await?;

        let mut item = ItemRepo::get(&mut tx, item_id).await?;
        let old_label = ProjectRepo::get_label(&mut tx, old_label_id).await?;
        let new_label = ProjectRepo::get_label(&mut tx, new_label_id).await?;

        LabelRepo::replace_for_coder_to_skip(
            &mut tx,
            item_id,
            &old_label.id,
            coder,
            &new_label.id,
            reason,
        )
        .await?;

        if explicit {
            ItemRepo::mark_explicit(&mut tx, item_id).await?;
            VoteRepo::purge_item(&mut tx, item_id).await?;
            // Other coders' live labels are invalidated; the skip record
            // itself survives.
            LabelRepo::delete_all_except_skipped(&mut tx, item_id).await?;
            item = ItemRepo::get(&mut tx, item_id).await?;
        }

        if item.reliability_flag {
            if !VoteRepo::has_vote(&mut tx, item_id, coder).await? {
                let vote = ReliabilityVote::new(
                    item_id.to_owned(),
                    coder.to_owned(),
                    None,
                    reason.to_owned(),
                );
                VoteRepo::append(&mut tx, &vote).await?;
            }
        } else {
            let reason_tag = if item.sensitive_flag {
                QueueReason::Explicit
            } else {
                QueueReason::Skipped
            };
            QueueRepo::enqueue(&mut tx, item_id, &item.project_id, QueueType::Admin, reason_tag)
                .await?;
        }

        let entry = ChangeLogEntry::new(
            item.project_id.clone(),
            item_id.to_owned(),
            coder.to_owned(),
            old_label.name.clone(),
            "skip".to_owned(),
        );
        AuditRepo::append(&mut tx, &entry).await?;

        tx.commit().await?;
        info!(item_id, coder, explicit, "label modified to skip");
        Ok(())
    }

    /// Admin finalization of an item from the review queue.
    ///
    /// Clears all prior labels, pins the sensitive flag to the supplied
    /// value, records the admin's label with no labeling time, removes
    /// the item from the admin queue, and clears the reliability flag.
    ///
    /// # Errors
    ///
    /// Returns `AppError::NotFound` for an unknown item or label,
    /// `AppError::Db` on store failures.
    pub async fn admin_label(
        &self,
        item_id: &str,
        admin: &str,
        label_id: &str,
        reason: &str,
        sensitive: bool,
    ) -> Result<()> {
        let mut tx = self.db.begin().await?;

        let item = ItemRepo::get(&mut tx, item_id).await?;
        let project = ProjectRepo::get(&mut tx, &item.project_id).await?;
        let label = ProjectRepo::get_label(&mut tx, label_id).await?;

        LabelRepo::delete_all(&mut tx, item_id).await?;
        ItemRepo::set_sensitive(&mut tx, item_id, sensitive).await?;

        let record = LabelingRecord::new(
            item_id.to_owned(),
            label.id.clone(),
            admin.to_owned(),
            project.current_training_set,
            None,
            false,
            reason.to_owned(),
        );
        LabelRepo::record(&mut tx, &record).await?;

        QueueRepo::dequeue(&mut tx, item_id, QueueType::Admin).await?;
        if item.reliability_flag {
            ItemRepo::clear_reliability(&mut tx, item_id).await?;
        }

        tx.commit().await?;
        // The retrain check fires, but no queue refill: anything in the
        // admin queue already passed through annotate or skip.
        self.retrain.notify(&item.project_id, item_id);

        info!(item_id, admin, label_id, "admin label applied");
        Ok(())
    }

    /// Session entry hook. Admins take the project's review lock when no
    /// lock exists; everyone else is a no-op.
    ///
    /// # Errors
    ///
    /// Returns `AppError::Db` if the lock insert fails.
    pub async fn enter_session(
        &self,
        project_id: &str,
        coder: &str,
        permission_level: i64,
    ) -> Result<()> {
        if !denotes_admin(permission_level) {
            return Ok(());
        }
        let mut conn = self.db.acquire().await?;
        if LockRepo::acquire_if_absent(&mut conn, project_id, coder).await? {
            info!(project_id, coder, "admin review lock acquired");
        }
        Ok(())
    }

    /// Session exit hook. Releases every assignment the coder holds and,
    /// for admins, their own review lock.
    ///
    /// # Errors
    ///
    /// Returns `AppError::Db` on store failures.
    pub async fn leave_session(
        &self,
        project_id: &str,
        coder: &str,
        permission_level: i64,
    ) -> Result<()> {
        let mut tx = self.db.begin().await?;

        let released = AssignmentRepo::release_all(&mut tx, coder).await?;
        if denotes_admin(permission_level) {
            LockRepo::release_own(&mut tx, project_id, coder).await?;
        }

        tx.commit().await?;
        info!(project_id, coder, released, "session left");
        Ok(())
    }

    /// Whether a coder may currently view the admin review screen:
    /// available when no lock exists, or the existing lock is their own.
    ///
    /// # Errors
    ///
    /// Returns `AppError::Db` if the query fails.
    pub async fn check_admin_availability(&self, project_id: &str, coder: &str) -> Result<bool> {
        let mut conn = self.db.acquire().await?;
        let lock = LockRepo::get(&mut conn, project_id).await?;
        Ok(lock.is_none_or(|l| l.coder == coder))
    }
}
