//! Termination policy for the extraction loop.
//!
//! The loop asks exactly one policy, once per turn, whether to keep going.
//! Turn accounting and the turn ceiling stay with the loop itself.

use async_trait::async_trait;
use strum::Display;

use crate::extract::Outcome;

/// Why a resource's extraction run ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Display)]
#[strum(serialize_all = "snake_case")]
pub enum StopReason {
    /// The agent replied with an empty sentinel.
    AgentExhausted,
    /// The reply could not be parsed; treated as implicit exhaustion.
    MalformedReply,
    /// The turn budget ran out.
    TurnCeiling,
    /// A custom termination policy decided to stop.
    Policy,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Decision {
    Continue,
    Stop(StopReason),
}

/// Decides, after each turn, whether another turn is worth asking for.
#[async_trait]
pub trait TerminationPolicy: Send + Sync {
    /// `accumulated` is the row count before this turn's rows are appended.
    async fn decide(&self, turn: usize, outcome: &Outcome, accumulated: usize) -> Decision;
}

/// Trusts the agent: stop on an empty or unreadable reply, continue on rows.
#[derive(Debug, Clone, Copy, Default)]
pub struct AgentSignaledTermination;

#[async_trait]
impl TerminationPolicy for AgentSignaledTermination {
    async fn decide(&self, _turn: usize, outcome: &Outcome, _accumulated: usize) -> Decision {
        match outcome {
            Outcome::Empty => Decision::Stop(StopReason::AgentExhausted),
            Outcome::Malformed(_) => Decision::Stop(StopReason::MalformedReply),
            Outcome::Parsed(_) => Decision::Continue,
        }
    }
}

/// Stop when a custom predicate over the turn's outcome returns true.
pub struct PredicateTermination<F: Fn(usize, &Outcome, usize) -> bool + Send + Sync> {
    predicate: F,
    fallback: AgentSignaledTermination,
}

impl<F: Fn(usize, &Outcome, usize) -> bool + Send + Sync> PredicateTermination<F> {
    pub fn new(predicate: F) -> Self {
        Self {
            predicate,
            fallback: AgentSignaledTermination,
        }
    }
}

#[async_trait]
impl<F: Fn(usize, &Outcome, usize) -> bool + Send + Sync> TerminationPolicy
    for PredicateTermination<F>
{
    async fn decide(&self, turn: usize, outcome: &Outcome, accumulated: usize) -> Decision {
        if (self.predicate)(turn, outcome, accumulated) {
            return Decision::Stop(StopReason::Policy);
        }
        self.fallback.decide(turn, outcome, accumulated).await
    }
}
