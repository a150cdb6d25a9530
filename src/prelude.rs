//! Convenience re-exports for common use.

pub use crate::agent::{AgentInvoker, Completion};
pub use crate::agent_loop::{ExtractionLoop, ExtractionReport, TurnEvent};
pub use crate::batch::{BatchDriver, BatchOptions, BatchSummary};
pub use crate::config::HarvestConfig;
pub use crate::error::{HarvestError, Result};
pub use crate::extract::{extract, Outcome};
pub use crate::output::{CsvObservationSink, ObservationSink};
pub use crate::provider::AgentClient;
pub use crate::registry::{CsvRegistry, ResourceSource};
pub use crate::stop::{StopReason, TerminationPolicy};
pub use crate::types::{Observation, Resource, SessionId};
