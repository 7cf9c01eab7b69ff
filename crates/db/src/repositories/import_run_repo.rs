//! Repository for the `import_runs` table.

use fleetops_core::import_status::RUN_STATUS_PROCESSING;
use fleetops_core::paging::{clamp_limit, clamp_offset, DEFAULT_PAGE_LIMIT, MAX_PAGE_LIMIT};
use fleetops_core::types::DbId;
use sqlx::PgPool;

use crate::models::import_run::{CompleteImportRun, CreateImportRun, ImportRun};

const COLUMNS: &str = "id, entity_kind, file_name, status, classification, total_rows, \
    success_count, failure_count, skipped_count, failed_count, orphaned_count, report, \
    session_closed, created_at, completed_at";

/// Provides persistence for import runs.
pub struct ImportRunRepo;

impl ImportRunRepo {
    /// Open a run in the `processing` status.
    pub async fn create(pool: &PgPool, input: &CreateImportRun) -> Result<ImportRun, sqlx::Error> {
        let query = format!(
            "INSERT INTO import_runs (entity_kind, file_name, status)
             VALUES ($1, $2, $3)
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, ImportRun>(&query)
            .bind(&input.entity_kind)
            .bind(&input.file_name)
            .bind(RUN_STATUS_PROCESSING)
            .fetch_one(pool)
            .await
    }

    pub async fn find_by_id(pool: &PgPool, id: DbId) -> Result<Option<ImportRun>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM import_runs WHERE id = $1");
        sqlx::query_as::<_, ImportRun>(&query)
            .bind(id)
            .fetch_optional(pool)
            .await
    }

    /// List runs, newest first.
    pub async fn list(
        pool: &PgPool,
        limit: Option<i64>,
        offset: Option<i64>,
    ) -> Result<Vec<ImportRun>, sqlx::Error> {
        let limit = clamp_limit(limit, DEFAULT_PAGE_LIMIT, MAX_PAGE_LIMIT);
        let offset = clamp_offset(offset);
        let query = format!(
            "SELECT {COLUMNS} FROM import_runs
             ORDER BY created_at DESC, id DESC
             LIMIT $1 OFFSET $2"
        );
        sqlx::query_as::<_, ImportRun>(&query)
            .bind(limit)
            .bind(offset)
            .fetch_all(pool)
            .await
    }

    /// Record the finalized report and terminal status.
    ///
    /// Returns `None` if no run with the given `id` exists.
    pub async fn complete(
        pool: &PgPool,
        id: DbId,
        input: &CompleteImportRun,
    ) -> Result<Option<ImportRun>, sqlx::Error> {
        let query = format!(
            "UPDATE import_runs SET
                status = $2,
                classification = $3,
                total_rows = $4,
                success_count = $5,
                failure_count = $6,
                skipped_count = $7,
                failed_count = $8,
                orphaned_count = $9,
                report = $10,
                session_closed = $11,
                completed_at = NOW()
             WHERE id = $1
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, ImportRun>(&query)
            .bind(id)
            .bind(&input.status)
            .bind(&input.classification)
            .bind(input.total_rows)
            .bind(input.success_count)
            .bind(input.failure_count)
            .bind(input.skipped_count)
            .bind(input.failed_count)
            .bind(input.orphaned_count)
            .bind(&input.report)
            .bind(input.session_closed)
            .fetch_optional(pool)
            .await
    }
}
