//! Explicit state of the two-phase identity/profile write for one row.
//!
//! ```text
//! NotStarted --IdentityCreated--> IdentityCreated --ProfileCreated--------> ProfileCreated
//!                                                 --CompensationSucceeded-> CompensatedRollback
//!                                                 --CompensationFailed----> OrphanedIdentity
//! ```
//!
//! A failed identity write never leaves `NotStarted`; nothing durable
//! exists, so there is nothing to compensate.

use crate::error::CoreError;
use crate::types::DbId;

use super::outcome::{FailurePhase, RowOutcome};

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SagaState {
    NotStarted,
    IdentityCreated {
        identity_id: DbId,
    },
    ProfileCreated {
        identity_id: DbId,
    },
    CompensatedRollback {
        identity_id: DbId,
        profile_error: String,
    },
    OrphanedIdentity {
        identity_id: DbId,
        profile_error: String,
        compensation_error: String,
    },
}

/// An observed step of the saga.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SagaEvent {
    IdentityCreated(DbId),
    ProfileCreated,
    CompensationSucceeded { profile_error: String },
    CompensationFailed {
        profile_error: String,
        compensation_error: String,
    },
}

impl SagaState {
    /// Apply `event`, returning the next state.
    ///
    /// Fails with [`CoreError::Internal`] if the event is not valid in the
    /// current state.
    pub fn apply(self, event: SagaEvent) -> Result<Self, CoreError> {
        match (self, event) {
            (Self::NotStarted, SagaEvent::IdentityCreated(identity_id)) => {
                Ok(Self::IdentityCreated { identity_id })
            }
            (Self::IdentityCreated { identity_id }, SagaEvent::ProfileCreated) => {
                Ok(Self::ProfileCreated { identity_id })
            }
            (
                Self::IdentityCreated { identity_id },
                SagaEvent::CompensationSucceeded { profile_error },
            ) => Ok(Self::CompensatedRollback {
                identity_id,
                profile_error,
            }),
            (
                Self::IdentityCreated { identity_id },
                SagaEvent::CompensationFailed {
                    profile_error,
                    compensation_error,
                },
            ) => Ok(Self::OrphanedIdentity {
                identity_id,
                profile_error,
                compensation_error,
            }),
            (state, event) => Err(CoreError::Internal(format!(
                "invalid provisioning transition from {} on {event:?}",
                state.name()
            ))),
        }
    }

    pub fn name(&self) -> &'static str {
        match self {
            Self::NotStarted => "not_started",
            Self::IdentityCreated { .. } => "identity_created",
            Self::ProfileCreated { .. } => "profile_created",
            Self::CompensatedRollback { .. } => "compensated_rollback",
            Self::OrphanedIdentity { .. } => "orphaned_identity",
        }
    }

    pub fn is_terminal(&self) -> bool {
        matches!(
            self,
            Self::ProfileCreated { .. }
                | Self::CompensatedRollback { .. }
                | Self::OrphanedIdentity { .. }
        )
    }

    /// Identity id once phase 1 has succeeded.
    pub fn identity_id(&self) -> Option<DbId> {
        match self {
            Self::NotStarted => None,
            Self::IdentityCreated { identity_id }
            | Self::ProfileCreated { identity_id }
            | Self::CompensatedRollback { identity_id, .. }
            | Self::OrphanedIdentity { identity_id, .. } => Some(*identity_id),
        }
    }

    /// Convert a terminal state into the row's outcome.
    ///
    /// Returns `None` for states that are still in flight.
    pub fn into_outcome(self, line: usize, key: impl Into<String>) -> Option<RowOutcome> {
        match self {
            Self::ProfileCreated { identity_id } => Some(RowOutcome::Success {
                line,
                entity_id: identity_id,
            }),
            Self::CompensatedRollback { profile_error, .. } => Some(RowOutcome::Failed {
                line,
                key: key.into(),
                phase: FailurePhase::Profile,
                message: profile_error,
            }),
            Self::OrphanedIdentity {
                identity_id,
                profile_error,
                compensation_error,
            } => Some(RowOutcome::Orphaned {
                line,
                key: key.into(),
                identity_id,
                profile_error,
                compensation_error,
            }),
            Self::NotStarted | Self::IdentityCreated { .. } => None,
        }
    }
}
