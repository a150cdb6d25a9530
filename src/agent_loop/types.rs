//! Extraction run results.

use chrono::{DateTime, Utc};

use crate::stop::StopReason;
use crate::types::{Observation, SessionId};

/// Everything one resource's run produced.
#[derive(Debug, Clone, PartialEq)]
pub struct ExtractionReport {
    pub resource_id: String,
    pub session_id: SessionId,
    /// Rows from every turn, in turn order.
    pub observations: Vec<Observation>,
    /// Turns actually taken, turn 0 included.
    pub turns: usize,
    pub stop_reason: StopReason,
    pub finished_at: DateTime<Utc>,
}

impl ExtractionReport {
    pub fn is_empty(&self) -> bool {
        self.observations.is_empty()
    }
}
