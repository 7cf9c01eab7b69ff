//! Single passenger creation from the dashboard form.

use axum::extract::State;
use axum::http::StatusCode;
use axum::Json;
use fleetops_core::bulk_import::PassengerCandidate;
use fleetops_core::error::CoreError;
use fleetops_core::passenger::NewPassenger;
use fleetops_db::models::passenger::Passenger;
use fleetops_db::models::user::UserResponse;
use fleetops_db::repositories::{PassengerRepo, UserRepo};
use fleetops_pipeline::{ProvisionError, StoreError};
use serde::Serialize;
use validator::Validate;

use crate::error::{AppError, AppResult};
use crate::response::DataResponse;
use crate::state::AppState;

/// A passenger account together with its profile.
#[derive(Debug, Serialize)]
pub struct PassengerDetail {
    pub user: UserResponse,
    pub profile: Passenger,
}

fn provision_error(err: ProvisionError) -> AppError {
    match err {
        ProvisionError::AlreadyExists => AppError::Core(CoreError::Conflict(err.to_string())),
        ProvisionError::Identity(StoreError::Rejected(msg)) => AppError::Unprocessable(msg),
        ProvisionError::Identity(store_err) => AppError::ServiceUnavailable(store_err.to_string()),
        ProvisionError::Profile { .. } | ProvisionError::Orphaned { .. } => {
            AppError::Unprocessable(err.to_string())
        }
        ProvisionError::Saga(core) => AppError::Core(core),
    }
}

/// POST /api/v1/passengers
///
/// Runs the same account-then-profile saga as a bulk import row.
pub async fn create_passenger(
    State(state): State<AppState>,
    Json(input): Json<NewPassenger>,
) -> AppResult<(StatusCode, Json<DataResponse<PassengerDetail>>)> {
    input
        .validate()
        .map_err(|e| AppError::Core(CoreError::Validation(e.to_string())))?;

    let candidate = PassengerCandidate::from(input);
    let id = state
        .passenger_provisioner()
        .create_one(&candidate)
        .await
        .map_err(provision_error)?;

    let user = UserRepo::find_by_id(&state.pool, id)
        .await?
        .ok_or(AppError::Core(CoreError::NotFound { entity: "User", id }))?;
    let profile = PassengerRepo::find_by_id(&state.pool, id)
        .await?
        .ok_or(AppError::Core(CoreError::NotFound {
            entity: "Passenger",
            id,
        }))?;

    tracing::info!(user_id = id, email = %user.email, "Passenger created");

    Ok((
        StatusCode::CREATED,
        Json(DataResponse {
            data: PassengerDetail {
                user: user.into(),
                profile,
            },
        }),
    ))
}
