//! Serves the agent's knowledge-base action group.
//!
//! The agent calls the action group with the resource it is researching; the
//! handler turns that into a retrieval query and replies with the raw
//! references as a text body.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};
use serde_json::{json, Value};
use tracing::debug;

use crate::error::{HarvestError, Result};

use super::{truncate_body, Retriever};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ActionGroupEvent {
    #[serde(default)]
    pub agent: Value,
    pub action_group: String,
    pub function: String,
    #[serde(default)]
    pub parameters: Vec<ActionParameter>,
    pub message_version: Value,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ActionParameter {
    pub name: String,
    #[serde(default, rename = "type", skip_serializing_if = "Option::is_none")]
    pub kind: Option<String>,
    pub value: Value,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ActionGroupResponse {
    pub response: Value,
    pub message_version: Value,
}

impl ActionGroupEvent {
    /// Parameters keyed by lowercased name.
    fn parameter_map(&self) -> HashMap<String, String> {
        self.parameters
            .iter()
            .map(|p| {
                let value = match &p.value {
                    Value::String(s) => s.clone(),
                    other => other.to_string(),
                };
                (p.name.to_lowercase(), value)
            })
            .collect()
    }

    /// The retrieval query describing the requested resource.
    pub fn query(&self) -> Result<String> {
        let params = self.parameter_map();
        let name = params.get("resourcename").ok_or_else(|| {
            HarvestError::InvalidArgument("action group call is missing resourcename".into())
        })?;

        let mut query = format!("Tell me about {name}");
        if let Some(kind) = params.get("resourcetype") {
            query.push_str(&format!(" {kind}"));
        }
        if let Some(synonyms) = params.get("synonyms") {
            query.push_str(&format!(" also known as {synonyms}"));
        }
        if let Some(rrid) = params.get("rrid") {
            query.push_str(&format!(" also known as RRID:{rrid}"));
        }
        Ok(query)
    }

    /// Wrap `body` in the function-response envelope the agent expects.
    pub fn respond(&self, body: String) -> ActionGroupResponse {
        ActionGroupResponse {
            response: json!({
                "actionGroup": self.action_group,
                "function": self.function,
                "functionResponse": {
                    "responseBody": { "TEXT": { "body": body } }
                }
            }),
            message_version: self.message_version.clone(),
        }
    }
}

/// Answer one action-group call with the knowledge base's references.
pub async fn handle(retriever: &Retriever, event: &ActionGroupEvent) -> Result<ActionGroupResponse> {
    let query = event.query()?;
    debug!(
        action_group = %event.action_group,
        function = %event.function,
        query = %query,
        "action group call"
    );

    let references = retriever.retrieve(&query).await?;
    let body = serde_json::to_string(&references)?;
    Ok(event.respond(truncate_body(&body)))
}
