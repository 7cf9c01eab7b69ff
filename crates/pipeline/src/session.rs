//! Import session controller.
//!
//! One [`ImportSession::run`] call takes a parsed upload to a finalized
//! report: validate the header, normalize and provision every row, then
//! decide whether the listing is refreshed and the session closed.

use std::sync::Arc;
use std::time::Duration;

use fleetops_core::bulk_import::{
    normalize, validate_columns, BatchAggregator, BatchReport, Classification, ImportRow,
    RequiredSchema, RowOutcome, TabularInput,
};
use futures::stream::{self, StreamExt};
use futures::FutureExt;
use serde::Serialize;

use crate::config::ImportConfig;
use crate::error::with_deadline;
use crate::provisioner::RowProvisioner;
use crate::stores::ListingRefresher;

/// What the caller should do once a batch is finalized.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SessionDecision {
    pub refresh_listing: bool,
    pub close_session: bool,
}

impl SessionDecision {
    pub fn for_classification(classification: Classification) -> Self {
        match classification {
            Classification::AllSucceeded => Self {
                refresh_listing: true,
                close_session: true,
            },
            Classification::PartialSuccess => Self {
                refresh_listing: true,
                close_session: false,
            },
            Classification::Empty | Classification::AllFailed | Classification::SchemaInvalid => {
                Self {
                    refresh_listing: false,
                    close_session: false,
                }
            }
        }
    }
}

/// Result of one import session.
#[derive(Debug, Clone, Serialize)]
pub struct ImportSummary {
    pub report: BatchReport,
    pub refresh_listing: bool,
    pub close_session: bool,
}

/// Drives a whole upload through a [`RowProvisioner`].
pub struct ImportSession<P> {
    provisioner: P,
    refresher: Arc<dyn ListingRefresher>,
    max_concurrency: usize,
    call_timeout: Duration,
}

impl<P: RowProvisioner> ImportSession<P> {
    pub fn new(provisioner: P, refresher: Arc<dyn ListingRefresher>, config: &ImportConfig) -> Self {
        Self {
            provisioner,
            refresher,
            max_concurrency: config.max_concurrency.max(1),
            call_timeout: config.call_timeout,
        }
    }

    /// Run the import over `input`.
    ///
    /// Row outcomes are aggregated in input order regardless of how many
    /// rows are in flight, and a failing row never stops the others.
    pub async fn run(&self, input: &TabularInput) -> ImportSummary {
        let schema = self.provisioner.schema();
        let kind = schema.kind();
        let mut aggregator = BatchAggregator::new(kind, input.len());

        match validate_columns(input.columns(), &schema) {
            Err(err) => {
                tracing::warn!(entity_kind = %kind, missing = ?err.missing, "Import header rejected");
                aggregator.reject_schema(err);
            }
            Ok(()) => {
                tracing::info!(
                    entity_kind = %kind,
                    rows = input.len(),
                    concurrency = self.max_concurrency,
                    "Import started",
                );
                let rows = input.rows();
                let mut outcomes = stream::iter(0..rows.len())
                    .map(|i| self.process_row(&rows[i], &schema).boxed())
                    .buffered(self.max_concurrency);
                while let Some(outcome) = outcomes.next().await {
                    aggregator.accumulate(outcome);
                }
            }
        }

        let report = aggregator.finalize();
        let decision = SessionDecision::for_classification(report.classification);

        tracing::info!(
            entity_kind = %kind,
            classification = %report.classification,
            success = report.success_count,
            failures = report.failure_count,
            orphaned = report.orphaned_count,
            "Import finished",
        );

        if decision.refresh_listing {
            if let Err(err) =
                with_deadline("refresh", self.call_timeout, self.refresher.refresh(kind)).await
            {
                tracing::warn!(entity_kind = %kind, error = %err, "Listing refresh failed");
            }
        }

        ImportSummary {
            report,
            refresh_listing: decision.refresh_listing,
            close_session: decision.close_session,
        }
    }

    async fn process_row(&self, row: &ImportRow, schema: &RequiredSchema) -> RowOutcome {
        match normalize::<P::Candidate>(row, schema) {
            Ok(candidate) => self.provisioner.provision(row.line(), candidate).await,
            Err(reason) => {
                tracing::debug!(line = row.line(), reason = %reason, "Row skipped");
                RowOutcome::Skipped(reason)
            }
        }
    }
}
