//! Import run status constants.
//!
//! These match the `ck_import_runs_status` check constraint.

use crate::bulk_import::Classification;

pub const RUN_STATUS_PROCESSING: &str = "processing";
pub const RUN_STATUS_COMPLETED: &str = "completed";
pub const RUN_STATUS_PARTIAL: &str = "partial";
pub const RUN_STATUS_FAILED: &str = "failed";
pub const RUN_STATUS_REJECTED: &str = "rejected";

pub const ALL_RUN_STATUSES: &[&str] = &[
    RUN_STATUS_PROCESSING,
    RUN_STATUS_COMPLETED,
    RUN_STATUS_PARTIAL,
    RUN_STATUS_FAILED,
    RUN_STATUS_REJECTED,
];

/// Terminal run status for a finalized classification.
///
/// Batches that never reached row processing (empty file, bad header)
/// are `rejected`.
pub fn status_for_classification(classification: Classification) -> &'static str {
    match classification {
        Classification::AllSucceeded => RUN_STATUS_COMPLETED,
        Classification::PartialSuccess => RUN_STATUS_PARTIAL,
        Classification::AllFailed => RUN_STATUS_FAILED,
        Classification::Empty | Classification::SchemaInvalid => RUN_STATUS_REJECTED,
    }
}
