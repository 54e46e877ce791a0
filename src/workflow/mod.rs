//! Workflow orchestration modules.
//!
//! Covers batch distribution, label/skip submission, reliability
//! adjudication, admin review routing, and the read-only reporting
//! queries.

pub mod coordinator;
pub mod irr;
pub mod reports;
