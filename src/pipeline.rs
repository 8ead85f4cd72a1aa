use crate::aggregate::{self, DemandMetric};
use crate::columns::ColumnMap;
use crate::normalize::{self, NormalizeReport, NormalizedRequest};
use crate::snapshot::{SnapshotInfo, SnapshotStore, StoreError};
use crate::source::{RowSource, SourceError};
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Which boundary a run failed at.
#[derive(Debug, Error)]
pub enum PipelineError {
    #[error("source fetch failed: {0}")]
    Source(#[from] SourceError),
    #[error("publishing processed records failed: {0}")]
    PublishProcessed(#[source] StoreError),
    #[error("publishing demand metrics failed: {0}")]
    PublishMetrics(#[source] StoreError),
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum RunOutcome {
    /// Nothing to publish; prior snapshots stay current.
    NoData { report: NormalizeReport },
    Published {
        report: NormalizeReport,
        processed: SnapshotInfo,
        metrics: SnapshotInfo,
        top: Vec<DemandMetric>,
    },
}

/// Source → normalize → publish records → aggregate → publish metrics.
#[derive(Debug, Clone)]
pub struct Pipeline {
    pub columns: ColumnMap,
    /// How many leading metrics to echo back in [`RunOutcome::Published`].
    pub preview: usize,
}

impl Default for Pipeline {
    fn default() -> Self {
        Self::new(ColumnMap::default())
    }
}

impl Pipeline {
    pub fn new(columns: ColumnMap) -> Self {
        Self { columns, preview: 5 }
    }

    pub fn run<R, P, D>(&self, source: &R, processed: &P, dashboard: &D) -> Result<RunOutcome, PipelineError>
    where
        R: RowSource + ?Sized,
        P: SnapshotStore<NormalizedRequest> + ?Sized,
        D: SnapshotStore<DemandMetric> + ?Sized,
    {
        tracing::info!(source = %source.describe(), "starting run");
        let rows = source.fetch()?;
        let (requests, report) = normalize::normalize_with_report(&rows, &self.columns);
        if requests.is_empty() {
            tracing::info!(input = report.input_rows, "nothing to publish");
            return Ok(RunOutcome::NoData { report });
        }

        let processed_info = processed.publish(&requests).map_err(PipelineError::PublishProcessed)?;
        let metrics = aggregate::aggregate(&requests);
        let metrics_info = dashboard.publish(&metrics).map_err(PipelineError::PublishMetrics)?;

        Ok(RunOutcome::Published {
            report,
            processed: processed_info,
            metrics: metrics_info,
            top: metrics.into_iter().take(self.preview).collect(),
        })
    }
}
