//! Batch aggregation and the finalized import report.

use std::collections::BTreeSet;

use serde::{Deserialize, Serialize};

use super::outcome::RowOutcome;
use super::schema::SchemaError;
use super::EntityKind;
use crate::types::DbId;

/// Batch-level summary label.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Classification {
    Empty,
    AllSucceeded,
    PartialSuccess,
    AllFailed,
    SchemaInvalid,
}

impl Classification {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Empty => "empty",
            Self::AllSucceeded => "all_succeeded",
            Self::PartialSuccess => "partial_success",
            Self::AllFailed => "all_failed",
            Self::SchemaInvalid => "schema_invalid",
        }
    }
}

impl std::fmt::Display for Classification {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// An identity left without a profile because compensation failed.
///
/// Operators reconcile these by hand.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OrphanedIdentity {
    pub line: usize,
    pub key: String,
    pub identity_id: DbId,
    pub compensation_error: String,
}

/// Finalized, read-only result of one import.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BatchReport {
    pub entity_kind: EntityKind,
    pub classification: Classification,
    pub message: String,
    pub total_rows: usize,
    pub success_count: usize,
    /// Skipped + failed + orphaned.
    pub failure_count: usize,
    pub skipped_count: usize,
    pub failed_count: usize,
    pub orphaned_count: usize,
    /// Columns the header lacked (only for `schema_invalid`).
    pub missing_columns: Vec<String>,
    /// One entry per non-successful row, in input order.
    pub details: Vec<String>,
    pub orphaned_identities: Vec<OrphanedIdentity>,
}

/// Accumulates row outcomes for one batch. Owned by a single driver.
#[derive(Debug)]
pub struct BatchAggregator {
    kind: EntityKind,
    total_rows: usize,
    schema_error: Option<SchemaError>,
    seen_lines: BTreeSet<usize>,
    success_count: usize,
    skipped_count: usize,
    failed_count: usize,
    details: Vec<String>,
    orphaned: Vec<OrphanedIdentity>,
}

impl BatchAggregator {
    /// Start an empty aggregation for an input of `total_rows` data rows.
    pub fn new(kind: EntityKind, total_rows: usize) -> Self {
        Self {
            kind,
            total_rows,
            schema_error: None,
            seen_lines: BTreeSet::new(),
            success_count: 0,
            skipped_count: 0,
            failed_count: 0,
            details: Vec::new(),
            orphaned: Vec::new(),
        }
    }

    /// Record that the header failed schema validation. No rows follow.
    pub fn reject_schema(&mut self, error: SchemaError) {
        self.schema_error = Some(error);
    }

    /// Record one row outcome.
    ///
    /// Returns `false` and ignores the outcome if that row was already
    /// recorded, so a row can never be counted twice.
    pub fn accumulate(&mut self, outcome: RowOutcome) -> bool {
        if !self.seen_lines.insert(outcome.line()) {
            return false;
        }

        if let Some(detail) = outcome.detail() {
            self.details.push(detail);
        }

        match outcome {
            RowOutcome::Success { .. } => self.success_count += 1,
            RowOutcome::Skipped(_) => self.skipped_count += 1,
            RowOutcome::Failed { .. } => self.failed_count += 1,
            RowOutcome::Orphaned {
                line,
                key,
                identity_id,
                compensation_error,
                ..
            } => self.orphaned.push(OrphanedIdentity {
                line,
                key,
                identity_id,
                compensation_error,
            }),
        }
        true
    }

    /// Number of rows recorded so far.
    pub fn processed(&self) -> usize {
        self.seen_lines.len()
    }

    /// Compute the classification and freeze the report.
    pub fn finalize(self) -> BatchReport {
        let orphaned_count = self.orphaned.len();
        let failure_count = self.skipped_count + self.failed_count + orphaned_count;

        let classification = if self.total_rows == 0 {
            Classification::Empty
        } else if self.schema_error.is_some() {
            Classification::SchemaInvalid
        } else if self.success_count == self.total_rows {
            Classification::AllSucceeded
        } else if self.success_count == 0 {
            Classification::AllFailed
        } else {
            Classification::PartialSuccess
        };

        let message = match (&classification, &self.schema_error) {
            (Classification::Empty, _) => "El archivo CSV estaba vacío.".to_string(),
            (Classification::SchemaInvalid, Some(err)) => err.to_string(),
            _ => summary_message(self.kind, self.success_count, failure_count),
        };

        BatchReport {
            entity_kind: self.kind,
            classification,
            message,
            total_rows: self.total_rows,
            success_count: self.success_count,
            failure_count,
            skipped_count: self.skipped_count,
            failed_count: self.failed_count,
            orphaned_count,
            missing_columns: self
                .schema_error
                .map(|err| err.missing)
                .unwrap_or_default(),
            details: self.details,
            orphaned_identities: self.orphaned,
        }
    }
}

fn summary_message(kind: EntityKind, success: usize, failures: usize) -> String {
    let mut parts = Vec::with_capacity(2);
    if success > 0 {
        parts.push(format!(
            "{success} {} importados con éxito.",
            kind.plural_label()
        ));
    }
    if failures > 0 {
        parts.push(format!("{failures} filas fallaron."));
    }
    parts.join(" ")
}
