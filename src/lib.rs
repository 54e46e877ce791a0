#![forbid(unsafe_code)]

//! Workflow engine for a collaborative data-labeling platform.
//!
//! Decides which unlabeled item a coder receives next, tracks in-flight
//! assignments, reconciles independent labels on reliability-checked
//! items, and routes disputed or sensitive items to admin review.

pub mod api;
pub mod config;
pub mod errors;
pub mod models;
pub mod notify;
pub mod persistence;
pub mod workflow;

pub use config::GlobalConfig;
pub use errors::{AppError, Result};
