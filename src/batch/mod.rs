//! Batch processing over registry resources.

use std::path::PathBuf;
use std::sync::Arc;

use bon::Builder;
use chrono::{DateTime, Utc};
use serde::Serialize;
use tracing::{error, info};

use crate::agent_loop::ExtractionLoop;
use crate::error::{HarvestError, Result};
use crate::output::ObservationSink;
use crate::types::Resource;

/// Which part of the registry to process.
#[derive(Debug, Clone, Default, PartialEq, Eq, Builder)]
pub struct BatchOptions {
    /// Start at the first resource with this id, skipping every row before it.
    #[builder(into)]
    pub resume_from: Option<String>,
    /// Process at most this many resources after the resume point.
    pub limit: Option<usize>,
    /// Leave resources that already have an artifact alone.
    #[builder(default)]
    pub skip_existing: bool,
}

/// A resource whose run was abandoned.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FailedResource {
    pub resource_id: String,
    pub error: String,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct BatchSummary {
    /// Resources whose extraction was attempted.
    pub processed: usize,
    pub written: usize,
    pub skipped: usize,
    pub failed: Vec<FailedResource>,
    pub started_at: DateTime<Utc>,
    pub finished_at: DateTime<Utc>,
}

impl BatchSummary {
    fn start() -> Self {
        let now = Utc::now();
        Self {
            processed: 0,
            written: 0,
            skipped: 0,
            failed: Vec::new(),
            started_at: now,
            finished_at: now,
        }
    }

    pub fn is_clean(&self) -> bool {
        self.failed.is_empty()
    }
}

/// Runs the extraction loop once per resource and persists each result.
pub struct BatchDriver {
    extraction: ExtractionLoop,
    sink: Arc<dyn ObservationSink>,
}

impl BatchDriver {
    pub fn new(extraction: ExtractionLoop, sink: Arc<dyn ObservationSink>) -> Self {
        Self { extraction, sink }
    }

    /// The slice of `resources` a run with `options` covers.
    pub fn select<'a>(resources: &'a [Resource], options: &BatchOptions) -> Result<&'a [Resource]> {
        let start = match &options.resume_from {
            Some(id) => resources
                .iter()
                .position(|r| &r.resource_id == id)
                .ok_or_else(|| {
                    HarvestError::InvalidArgument(format!("resume id {id} is not in the registry"))
                })?,
            None => 0,
        };
        let remaining = &resources[start..];
        let end = options.limit.map_or(remaining.len(), |n| n.min(remaining.len()));
        Ok(&remaining[..end])
    }

    /// Extract and persist one resource. Nothing is written if the run fails.
    pub async fn process(&self, resource: &Resource) -> Result<PathBuf> {
        let report = self.extraction.run(resource).await?;
        self.sink.write(resource, &report.observations)
    }

    /// Process resources strictly one after another. A failing resource is
    /// logged and recorded; the batch always moves on to the next one.
    pub async fn run(&self, resources: &[Resource], options: &BatchOptions) -> Result<BatchSummary> {
        let selected = Self::select(resources, options)?;
        let mut summary = BatchSummary::start();

        info!(
            total = resources.len(),
            selected = selected.len(),
            resume_from = ?options.resume_from,
            "batch started"
        );

        for resource in selected {
            if options.skip_existing && self.sink.exists(&resource.resource_id) {
                summary.skipped += 1;
                continue;
            }

            summary.processed += 1;
            match self.process(resource).await {
                Ok(path) => {
                    summary.written += 1;
                    info!(
                        resource_id = %resource.resource_id,
                        path = %path.display(),
                        "resource done"
                    );
                }
                Err(e) => {
                    error!(
                        resource_id = %resource.resource_id,
                        error = %e,
                        "resource failed"
                    );
                    summary.failed.push(FailedResource {
                        resource_id: resource.resource_id.clone(),
                        error: e.to_string(),
                    });
                }
            }
        }

        summary.finished_at = Utc::now();
        info!(
            processed = summary.processed,
            written = summary.written,
            skipped = summary.skipped,
            failed = summary.failed.len(),
            "batch finished"
        );
        Ok(summary)
    }
}
