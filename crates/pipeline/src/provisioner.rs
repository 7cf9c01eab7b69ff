//! Per-row provisioning against the external stores.
//!
//! Passenger rows run a two-phase saga: create the account, then its
//! profile. When the profile write fails the account is deleted again so
//! no half-provisioned passenger remains. If that delete fails too the
//! account is reported as orphaned for manual cleanup.
//!
//! Vehicle rows are a single insert.

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use fleetops_core::bulk_import::outcome::PROFILE_FAILURE_PREFIX;
use fleetops_core::bulk_import::{
    FailurePhase, NormalizedCandidate, PassengerCandidate, RequiredSchema, RowOutcome, SagaEvent,
    SagaState, SkipReason, VehicleCandidate,
};
use fleetops_core::error::CoreError;
use fleetops_core::types::DbId;

use crate::config::ImportConfig;
use crate::error::{with_deadline, StoreError};
use crate::stores::{
    IdentityAttributes, IdentityStore, ProfileAttributes, ProfileStore, VehicleStore,
};

/// Turns one normalized candidate into exactly one [`RowOutcome`].
///
/// Implementations never fail: every store error is folded into the
/// returned outcome.
#[async_trait]
pub trait RowProvisioner: Send + Sync {
    type Candidate: NormalizedCandidate + Send + 'static;

    /// Columns an input must carry for this provisioner.
    fn schema(&self) -> RequiredSchema {
        RequiredSchema::for_kind(<Self::Candidate as NormalizedCandidate>::KIND)
    }

    async fn provision(&self, line: usize, candidate: Self::Candidate) -> RowOutcome;
}

// ---------------------------------------------------------------------------
// Passengers
// ---------------------------------------------------------------------------

/// Why a single passenger could not be created.
#[derive(Debug, thiserror::Error)]
pub enum ProvisionError {
    #[error("Ya existe una cuenta con este email.")]
    AlreadyExists,

    /// The account write failed; nothing was created.
    #[error("{0}")]
    Identity(StoreError),

    /// The profile write failed and the account was deleted again.
    #[error("{}: {message}", PROFILE_FAILURE_PREFIX)]
    Profile { identity_id: DbId, message: String },

    /// The profile write failed and the account could not be deleted.
    #[error(
        "{}: {profile_error}; no se pudo revertir la cuenta {identity_id}: {compensation_error}",
        PROFILE_FAILURE_PREFIX
    )]
    Orphaned {
        identity_id: DbId,
        profile_error: String,
        compensation_error: String,
    },

    #[error(transparent)]
    Saga(#[from] CoreError),
}

/// Provisions passengers through the identity and profile stores.
#[derive(Clone)]
pub struct PassengerProvisioner {
    identity: Arc<dyn IdentityStore>,
    profiles: Arc<dyn ProfileStore>,
    call_timeout: Duration,
    dedup_by_email: bool,
}

impl PassengerProvisioner {
    pub fn new(
        identity: Arc<dyn IdentityStore>,
        profiles: Arc<dyn ProfileStore>,
        config: &ImportConfig,
    ) -> Self {
        Self {
            identity,
            profiles,
            call_timeout: config.call_timeout,
            dedup_by_email: config.dedup_by_email,
        }
    }

    /// Create one passenger and return the new account id.
    pub async fn create_one(&self, candidate: &PassengerCandidate) -> Result<DbId, ProvisionError> {
        match self.run_saga(candidate).await? {
            SagaState::ProfileCreated { identity_id } => Ok(identity_id),
            SagaState::CompensatedRollback {
                identity_id,
                profile_error,
            } => Err(ProvisionError::Profile {
                identity_id,
                message: profile_error,
            }),
            SagaState::OrphanedIdentity {
                identity_id,
                profile_error,
                compensation_error,
            } => Err(ProvisionError::Orphaned {
                identity_id,
                profile_error,
                compensation_error,
            }),
            state => Err(CoreError::Internal(format!(
                "provisioning stopped in non-terminal state {}",
                state.name()
            ))
            .into()),
        }
    }

    /// Execute the saga up to a terminal state.
    ///
    /// Returns `Err` only when nothing remains written: the email is taken
    /// (with dedup enabled) or the account write itself failed.
    async fn run_saga(&self, candidate: &PassengerCandidate) -> Result<SagaState, ProvisionError> {
        let email = candidate.email.as_str();

        if self.dedup_by_email {
            let existing = with_deadline(
                "find_account",
                self.call_timeout,
                self.identity.find_account(email),
            )
            .await
            .map_err(ProvisionError::Identity)?;
            if existing.is_some() {
                return Err(ProvisionError::AlreadyExists);
            }
        }

        let state = SagaState::NotStarted;

        let created = with_deadline(
            "create_account",
            self.call_timeout,
            self.identity.create_account(
                email,
                &candidate.password,
                &IdentityAttributes::for_passenger(candidate),
            ),
        )
        .await;

        let identity_id = match created {
            Ok(id) => id,
            Err(err @ StoreError::Timeout { .. }) => {
                return self.reconcile_timed_out_account(email, state, err).await;
            }
            Err(err) => {
                tracing::warn!(email, error = %err, "Account creation failed");
                return Err(ProvisionError::Identity(err));
            }
        };
        let state = state.apply(SagaEvent::IdentityCreated(identity_id))?;

        let profile = with_deadline(
            "create_profile",
            self.call_timeout,
            self.profiles
                .create_profile(identity_id, &ProfileAttributes::for_passenger(candidate)),
        )
        .await;

        let event = match profile {
            Ok(()) => SagaEvent::ProfileCreated,
            Err(profile_err) => {
                tracing::warn!(
                    email,
                    identity_id,
                    error = %profile_err,
                    "Profile creation failed, deleting account",
                );
                self.compensate(identity_id, profile_err).await
            }
        };

        Ok(state.apply(event)?)
    }

    /// The account write timed out, but the store may still have committed
    /// it. Look the email up and delete whatever landed.
    async fn reconcile_timed_out_account(
        &self,
        email: &str,
        state: SagaState,
        timeout: StoreError,
    ) -> Result<SagaState, ProvisionError> {
        tracing::warn!(email, error = %timeout, "Account creation timed out, checking store");

        let found = with_deadline(
            "find_account",
            self.call_timeout,
            self.identity.find_account(email),
        )
        .await;

        let identity_id = match found {
            Ok(Some(id)) => id,
            Ok(None) => return Err(ProvisionError::Identity(timeout)),
            Err(lookup_err) => {
                tracing::error!(
                    email,
                    error = %lookup_err,
                    "Could not verify account after timeout",
                );
                return Err(ProvisionError::Identity(timeout));
            }
        };

        let state = state.apply(SagaEvent::IdentityCreated(identity_id))?;
        match self.compensate(identity_id, timeout.clone()).await {
            SagaEvent::CompensationSucceeded { .. } => Err(ProvisionError::Identity(timeout)),
            event => Ok(state.apply(event)?),
        }
    }

    async fn compensate(&self, identity_id: DbId, cause: StoreError) -> SagaEvent {
        let deleted = with_deadline(
            "delete_account",
            self.call_timeout,
            self.identity.delete_account(identity_id),
        )
        .await;

        match deleted {
            Ok(()) => {
                tracing::info!(identity_id, "Account deleted after failed provisioning");
                SagaEvent::CompensationSucceeded {
                    profile_error: cause.to_string(),
                }
            }
            Err(compensation_err) => {
                tracing::error!(
                    identity_id,
                    cause = %cause,
                    error = %compensation_err,
                    "Account left without profile, manual cleanup required",
                );
                SagaEvent::CompensationFailed {
                    profile_error: cause.to_string(),
                    compensation_error: compensation_err.to_string(),
                }
            }
        }
    }
}

#[async_trait]
impl RowProvisioner for PassengerProvisioner {
    type Candidate = PassengerCandidate;

    async fn provision(&self, line: usize, candidate: PassengerCandidate) -> RowOutcome {
        let key = candidate.email.clone();
        match self.run_saga(&candidate).await {
            Ok(state) => {
                let name = state.name();
                state.into_outcome(line, key.clone()).unwrap_or_else(|| {
                    internal_failure(line, key, format!("estado inesperado {name}"))
                })
            }
            Err(ProvisionError::AlreadyExists) => {
                RowOutcome::Skipped(SkipReason::already_exists(line, key))
            }
            Err(ProvisionError::Identity(err)) => RowOutcome::Failed {
                line,
                key,
                phase: FailurePhase::Identity,
                message: err.to_string(),
            },
            Err(other) => internal_failure(line, key, other.to_string()),
        }
    }
}

fn internal_failure(line: usize, key: String, message: String) -> RowOutcome {
    tracing::error!(line, key = %key, message = %message, "Provisioning invariant broken");
    RowOutcome::Failed {
        line,
        key,
        phase: FailurePhase::Identity,
        message,
    }
}

// ---------------------------------------------------------------------------
// Vehicles
// ---------------------------------------------------------------------------

/// Provisions vehicles with a single insert per row.
#[derive(Clone)]
pub struct VehicleProvisioner {
    vehicles: Arc<dyn VehicleStore>,
    call_timeout: Duration,
}

impl VehicleProvisioner {
    pub fn new(vehicles: Arc<dyn VehicleStore>, config: &ImportConfig) -> Self {
        Self {
            vehicles,
            call_timeout: config.call_timeout,
        }
    }
}

#[async_trait]
impl RowProvisioner for VehicleProvisioner {
    type Candidate = VehicleCandidate;

    async fn provision(&self, line: usize, candidate: VehicleCandidate) -> RowOutcome {
        let created = with_deadline(
            "create_vehicle",
            self.call_timeout,
            self.vehicles.create_vehicle(&candidate),
        )
        .await;

        match created {
            Ok(entity_id) => RowOutcome::Success { line, entity_id },
            Err(err) => {
                tracing::warn!(line, plate = %candidate.plate_number, error = %err, "Vehicle insert failed");
                RowOutcome::Failed {
                    line,
                    key: candidate.plate_number,
                    phase: FailurePhase::Record,
                    message: err.to_string(),
                }
            }
        }
    }
}
