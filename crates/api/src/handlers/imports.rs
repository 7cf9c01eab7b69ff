//! Handlers for bulk CSV imports and their persisted runs.
//!
//! An upload is parsed, recorded as an import run, pushed through the
//! provisioning pipeline and completed with the finalized report. The
//! response carries the report plus the listing/session decision for the
//! dashboard.

use axum::extract::{Multipart, Path, Query, State};
use axum::Json;
use fleetops_core::bulk_import::{parse_tabular, EntityKind, TabularInput};
use fleetops_core::error::CoreError;
use fleetops_core::import_status::status_for_classification;
use fleetops_core::types::DbId;
use fleetops_db::models::import_run::{CompleteImportRun, CreateImportRun, ImportRun};
use fleetops_db::repositories::ImportRunRepo;
use fleetops_events::{event_types, DomainEvent};
use fleetops_pipeline::{ImportSession, ImportSummary, RowProvisioner};
use serde::Serialize;

use crate::error::{AppError, AppResult};
use crate::query::PaginationParams;
use crate::response::DataResponse;
use crate::state::AppState;

/// Multipart field that carries the CSV file.
pub const FILE_FIELD: &str = "file";

// ---------------------------------------------------------------------------
// Response types
// ---------------------------------------------------------------------------

#[derive(Debug, Serialize)]
pub struct ImportResponse {
    pub run: ImportRun,
    #[serde(flatten)]
    pub summary: ImportSummary,
}

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

struct Upload {
    file_name: Option<String>,
    data: Vec<u8>,
}

/// Pull the `file` field out of a multipart body. Other fields are ignored.
async fn read_upload(mut multipart: Multipart) -> AppResult<Upload> {
    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| AppError::BadRequest(e.to_string()))?
    {
        if field.name() != Some(FILE_FIELD) {
            continue;
        }
        let file_name = field.file_name().map(str::to_string);
        let data = field
            .bytes()
            .await
            .map_err(|e| AppError::BadRequest(e.to_string()))?;
        return Ok(Upload {
            file_name,
            data: data.to_vec(),
        });
    }

    Err(AppError::BadRequest(format!(
        "Falta el archivo CSV (campo '{FILE_FIELD}')"
    )))
}

fn parse_upload(upload: &Upload) -> AppResult<TabularInput> {
    parse_tabular(&upload.data).map_err(|e| AppError::BadRequest(e.to_string()))
}

fn count(n: usize) -> i32 {
    i32::try_from(n).unwrap_or(i32::MAX)
}

/// Run an import on its own task and wait for it.
///
/// The task owns the session, the input and the run bookkeeping, so a
/// dropped request (timeout or disconnect) never stops a row between its
/// account and profile writes. The run is still completed and its report
/// stored.
pub async fn spawn_import<P>(
    state: AppState,
    kind: EntityKind,
    file_name: Option<String>,
    input: TabularInput,
    session: ImportSession<P>,
) -> AppResult<ImportResponse>
where
    P: RowProvisioner + 'static,
{
    tokio::spawn(async move { run_import(&state, kind, file_name, &input, session).await })
        .await
        .map_err(|e| AppError::InternalError(format!("import task failed: {e}")))?
}

/// Record a run, execute the session and store its report.
async fn run_import<P: RowProvisioner>(
    state: &AppState,
    kind: EntityKind,
    file_name: Option<String>,
    input: &TabularInput,
    session: ImportSession<P>,
) -> AppResult<ImportResponse> {
    let run = ImportRunRepo::create(
        &state.pool,
        &CreateImportRun {
            entity_kind: kind.as_str().to_string(),
            file_name,
        },
    )
    .await?;

    tracing::info!(run_id = run.id, entity_kind = %kind, rows = input.len(), "Import run opened");

    let summary = session.run(input).await;
    let report = &summary.report;

    let report_json =
        serde_json::to_value(report).map_err(|e| AppError::InternalError(e.to_string()))?;
    let status = status_for_classification(report.classification);

    let run = ImportRunRepo::complete(
        &state.pool,
        run.id,
        &CompleteImportRun {
            status: status.to_string(),
            classification: report.classification.as_str().to_string(),
            total_rows: count(report.total_rows),
            success_count: count(report.success_count),
            failure_count: count(report.failure_count),
            skipped_count: count(report.skipped_count),
            failed_count: count(report.failed_count),
            orphaned_count: count(report.orphaned_count),
            report: report_json,
            session_closed: summary.close_session,
        },
    )
    .await?
    .ok_or(AppError::Core(CoreError::NotFound {
        entity: "ImportRun",
        id: run.id,
    }))?;

    if report.orphaned_count > 0 {
        tracing::error!(
            run_id = run.id,
            orphaned = report.orphaned_count,
            "Import left accounts without profiles",
        );
    }

    state.event_bus.publish(
        DomainEvent::new(event_types::IMPORT_RUN_FINISHED)
            .with_source("import_run", run.id)
            .with_payload(serde_json::json!({
                "entity_kind": kind,
                "status": status,
                "success_count": report.success_count,
                "failure_count": report.failure_count,
            })),
    );

    Ok(ImportResponse { run, summary })
}

// ---------------------------------------------------------------------------
// Handlers
// ---------------------------------------------------------------------------

/// POST /api/v1/imports/passengers
pub async fn import_passengers(
    State(state): State<AppState>,
    multipart: Multipart,
) -> AppResult<Json<DataResponse<ImportResponse>>> {
    let upload = read_upload(multipart).await?;
    let input = parse_upload(&upload)?;

    let session = ImportSession::new(
        state.passenger_provisioner(),
        state.listing_refresher(),
        &state.config.import,
    );
    let data = spawn_import(state, EntityKind::Passenger, upload.file_name, input, session).await?;
    Ok(Json(DataResponse { data }))
}

/// POST /api/v1/imports/vehicles
pub async fn import_vehicles(
    State(state): State<AppState>,
    multipart: Multipart,
) -> AppResult<Json<DataResponse<ImportResponse>>> {
    let upload = read_upload(multipart).await?;
    let input = parse_upload(&upload)?;

    let session = ImportSession::new(
        state.vehicle_provisioner(),
        state.listing_refresher(),
        &state.config.import,
    );
    let data = spawn_import(state, EntityKind::Vehicle, upload.file_name, input, session).await?;
    Ok(Json(DataResponse { data }))
}

/// GET /api/v1/imports/runs
pub async fn list_runs(
    State(state): State<AppState>,
    Query(params): Query<PaginationParams>,
) -> AppResult<Json<DataResponse<Vec<ImportRun>>>> {
    let runs = ImportRunRepo::list(&state.pool, params.limit, params.offset).await?;
    Ok(Json(DataResponse { data: runs }))
}

/// GET /api/v1/imports/runs/{id}
pub async fn get_run(
    State(state): State<AppState>,
    Path(id): Path<DbId>,
) -> AppResult<Json<DataResponse<ImportRun>>> {
    let run = ImportRunRepo::find_by_id(&state.pool, id)
        .await?
        .ok_or(AppError::Core(CoreError::NotFound {
            entity: "ImportRun",
            id,
        }))?;
    Ok(Json(DataResponse { data: run }))
}
