//! Import run model.

use fleetops_core::types::{DbId, Timestamp};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;

/// A row from the `import_runs` table.
#[derive(Debug, Clone, Serialize, FromRow)]
pub struct ImportRun {
    pub id: DbId,
    pub entity_kind: String,
    pub file_name: Option<String>,
    pub status: String,
    pub classification: Option<String>,
    pub total_rows: i32,
    pub success_count: i32,
    pub failure_count: i32,
    pub skipped_count: i32,
    pub failed_count: i32,
    pub orphaned_count: i32,
    /// The finalized report as returned by the import endpoint.
    pub report: serde_json::Value,
    pub session_closed: bool,
    pub created_at: Timestamp,
    pub completed_at: Option<Timestamp>,
}

/// DTO for opening a run before any row is processed.
#[derive(Debug, Deserialize)]
pub struct CreateImportRun {
    pub entity_kind: String,
    pub file_name: Option<String>,
}

/// Final state written once the batch is finalized.
#[derive(Debug)]
pub struct CompleteImportRun {
    pub status: String,
    pub classification: String,
    pub total_rows: i32,
    pub success_count: i32,
    pub failure_count: i32,
    pub skipped_count: i32,
    pub failed_count: i32,
    pub orphaned_count: i32,
    pub report: serde_json::Value,
    pub session_closed: bool,
}
