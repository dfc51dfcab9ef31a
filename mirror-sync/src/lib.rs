//! # mirror-sync
//!
//! Mirror reconciliation and run orchestration.
//!
//! Call [`reconcile`] to bring one resolved repository in line with its
//! remote mirror, or [`pipeline::run`] to resolve and reconcile a single
//! identifier or a whole saved query.

pub mod error;
pub mod pipeline;
pub mod reconciler;

pub use error::SyncError;
pub use pipeline::{MirrorOutcome, SyncReport, SyncScope};
pub use reconciler::reconcile;
