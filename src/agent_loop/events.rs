//! Per-turn progress events.

use std::sync::Arc;

use serde::Serialize;

use crate::extract::OutcomeKind;
use crate::types::SessionId;

/// Emitted once per completed turn.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TurnEvent {
    pub resource_id: String,
    pub session_id: SessionId,
    /// Zero-based turn index.
    pub turn: usize,
    #[serde(serialize_with = "serialize_kind")]
    pub outcome: OutcomeKind,
    pub new_rows: usize,
    pub total_rows: usize,
}

/// Callback receiving turn events.
pub type TurnObserver = Arc<dyn Fn(&TurnEvent) + Send + Sync>;

fn serialize_kind<S: serde::Serializer>(kind: &OutcomeKind, s: S) -> Result<S::Ok, S::Error> {
    s.serialize_str(&kind.to_string())
}
