//! Core types and pure logic for bulk entity provisioning from CSV uploads.
//!
//! This module has no I/O and no async. It provides:
//!
//! - [`tabular`] -- CSV parsing into a header plus ordered [`ImportRow`]s.
//! - [`schema`] -- required-column contracts and whole-batch header validation.
//! - [`normalize`] -- total conversion of raw rows into typed candidates.
//! - [`outcome`] -- the per-row terminal result.
//! - [`saga`] -- the explicit state of a two-phase identity/profile write.
//! - [`report`] -- the batch aggregator and its finalized report.

pub mod normalize;
pub mod outcome;
pub mod report;
pub mod saga;
pub mod schema;
pub mod tabular;

use serde::{Deserialize, Serialize};

pub use normalize::{
    normalize, InvalidField, NormalizedCandidate, PassengerCandidate, SkipKind, SkipReason,
    VehicleCandidate,
};
pub use outcome::{FailurePhase, RowOutcome};
pub use report::{BatchAggregator, BatchReport, Classification, OrphanedIdentity};
pub use saga::{SagaEvent, SagaState};
pub use schema::{validate_columns, RequiredSchema, SchemaError};
pub use tabular::{parse_tabular, ImportRow, TabularError, TabularInput};

// ---------------------------------------------------------------------------
// Entity kind
// ---------------------------------------------------------------------------

/// The kind of entity a bulk import provisions.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EntityKind {
    Passenger,
    Vehicle,
}

impl EntityKind {
    /// Name as stored in `import_runs.entity_kind`.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Passenger => "passenger",
            Self::Vehicle => "vehicle",
        }
    }

    /// Parse a stored kind. Returns `None` for unknown values.
    pub fn from_str(s: &str) -> Option<Self> {
        match s {
            "passenger" => Some(Self::Passenger),
            "vehicle" => Some(Self::Vehicle),
            _ => None,
        }
    }

    /// Name of the read-side listing that shows entities of this kind.
    pub fn listing(&self) -> &'static str {
        match self {
            Self::Passenger => "passengers",
            Self::Vehicle => "vehicles",
        }
    }

    /// Plural label used in operator-facing summary messages.
    pub fn plural_label(&self) -> &'static str {
        match self {
            Self::Passenger => "pasajeros",
            Self::Vehicle => "vehículos",
        }
    }
}

impl std::fmt::Display for EntityKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}
