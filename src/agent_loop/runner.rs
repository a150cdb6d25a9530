//! Drives one resource's conversation until the agent runs dry or the turn
//! ceiling is reached.

use std::sync::Arc;

use chrono::Utc;
use tracing::{debug, info, warn};

use crate::agent::AgentInvoker;
use crate::error::{HarvestError, Result};
use crate::extract::{extract, Outcome};
use crate::query::QueryBuilder;
use crate::stop::{AgentSignaledTermination, Decision, StopReason, TerminationPolicy};
use crate::types::{Resource, SessionId};

use super::events::{TurnEvent, TurnObserver};
use super::types::ExtractionReport;

/// Turn ceiling per resource, turn 0 included.
pub const DEFAULT_MAX_TURNS: usize = 100;

pub struct ExtractionLoop {
    invoker: AgentInvoker,
    queries: QueryBuilder,
    policy: Arc<dyn TerminationPolicy>,
    max_turns: usize,
    observer: Option<TurnObserver>,
}

impl ExtractionLoop {
    pub fn new(invoker: AgentInvoker) -> Self {
        Self {
            invoker,
            queries: QueryBuilder::new(),
            policy: Arc::new(AgentSignaledTermination),
            max_turns: DEFAULT_MAX_TURNS,
            observer: None,
        }
    }

    pub fn with_max_turns(mut self, max_turns: usize) -> Self {
        self.max_turns = max_turns;
        self
    }

    pub fn with_policy(mut self, policy: Arc<dyn TerminationPolicy>) -> Self {
        self.policy = policy;
        self
    }

    pub fn with_observer(mut self, observer: TurnObserver) -> Self {
        self.observer = Some(observer);
        self
    }

    pub fn max_turns(&self) -> usize {
        self.max_turns
    }

    /// Run every turn for `resource` under one fresh session.
    ///
    /// An agent failure on any turn aborts the run and is returned as is;
    /// rows gathered before it are dropped with the report.
    pub async fn run(&self, resource: &Resource) -> Result<ExtractionReport> {
        if self.max_turns == 0 {
            return Err(HarvestError::Configuration(
                "max_turns must be at least 1".into(),
            ));
        }

        let session_id = SessionId::generate();
        let mut observations = Vec::new();
        let mut turn = 0;

        info!(
            resource_id = %resource.resource_id,
            resource_name = %resource.resource_name,
            session_id = %session_id,
            "extraction started"
        );

        let stop_reason = loop {
            let text = if turn == 0 {
                self.queries.initial(resource)
            } else {
                self.queries.continuation(resource)
            };

            let completion = self.invoker.invoke(&text, Some(&session_id), false).await?;
            let outcome = extract(&completion.text);
            let kind = outcome.kind();
            let new_rows = outcome.row_count();

            match &outcome {
                Outcome::Malformed(reason) => warn!(
                    resource_id = %resource.resource_id,
                    turn,
                    reason = ?reason,
                    "agent reply is not structured data"
                ),
                _ => debug!(
                    resource_id = %resource.resource_id,
                    turn,
                    outcome = %kind,
                    new_rows,
                    "turn complete"
                ),
            }

            let decision = self.policy.decide(turn, &outcome, observations.len()).await;
            if let Outcome::Parsed(rows) = outcome {
                observations.extend(rows);
            }

            if let Some(observer) = &self.observer {
                observer(&TurnEvent {
                    resource_id: resource.resource_id.clone(),
                    session_id: session_id.clone(),
                    turn,
                    outcome: kind,
                    new_rows,
                    total_rows: observations.len(),
                });
            }

            turn += 1;
            match decision {
                Decision::Stop(reason) => break reason,
                Decision::Continue if turn >= self.max_turns => break StopReason::TurnCeiling,
                Decision::Continue => {}
            }
        };

        info!(
            resource_id = %resource.resource_id,
            turns = turn,
            rows = observations.len(),
            stop_reason = %stop_reason,
            "extraction finished"
        );

        Ok(ExtractionReport {
            resource_id: resource.resource_id.clone(),
            session_id,
            observations,
            turns: turn,
            stop_reason,
            finished_at: Utc::now(),
        })
    }
}
