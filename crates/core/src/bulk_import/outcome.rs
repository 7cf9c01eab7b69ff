//! Per-row terminal result of the provisioning pipeline.

use serde::{Deserialize, Serialize};

use super::normalize::SkipReason;
use crate::types::DbId;

/// Prefix the dashboard shows when the account exists but its profile does not.
pub const PROFILE_FAILURE_PREFIX: &str = "Usuario creado, pero perfil de pasajero falló";

/// Which external write a row failed at.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FailurePhase {
    /// Account creation in the identity store.
    Identity,
    /// Profile creation in the profile store, after a successful identity write.
    Profile,
    /// The single insert of a one-phase import (vehicles).
    Record,
}

impl FailurePhase {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Identity => "identity",
            Self::Profile => "profile",
            Self::Record => "record",
        }
    }
}

impl std::fmt::Display for FailurePhase {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Terminal result for one row. Produced once, consumed by the aggregator.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RowOutcome {
    Success {
        line: usize,
        entity_id: DbId,
    },
    Skipped(SkipReason),
    Failed {
        line: usize,
        key: String,
        phase: FailurePhase,
        /// The store's message, verbatim.
        message: String,
    },
    /// Profile write failed and the compensating delete failed too; the
    /// identity now exists without a profile.
    Orphaned {
        line: usize,
        key: String,
        identity_id: DbId,
        profile_error: String,
        compensation_error: String,
    },
}

impl RowOutcome {
    /// 1-based line number of the row this outcome belongs to.
    pub fn line(&self) -> usize {
        match self {
            Self::Success { line, .. }
            | Self::Failed { line, .. }
            | Self::Orphaned { line, .. } => *line,
            Self::Skipped(reason) => reason.line,
        }
    }

    pub fn is_success(&self) -> bool {
        matches!(self, Self::Success { .. })
    }

    /// Operator-facing detail line. `None` for successful rows.
    pub fn detail(&self) -> Option<String> {
        match self {
            Self::Success { .. } => None,
            Self::Skipped(reason) => Some(reason.to_string()),
            Self::Failed {
                line,
                key,
                phase: FailurePhase::Profile,
                message,
            } => Some(format!("Fila {line} ({key}): {PROFILE_FAILURE_PREFIX}: {message}")),
            Self::Failed {
                line, key, message, ..
            } => Some(format!("Fila {line} ({key}): {message}")),
            Self::Orphaned {
                line,
                key,
                identity_id,
                profile_error,
                compensation_error,
            } => Some(format!(
                "Fila {line} ({key}): {PROFILE_FAILURE_PREFIX}: {profile_error}; \
                 no se pudo revertir la cuenta {identity_id}: {compensation_error}"
            )),
        }
    }
}
