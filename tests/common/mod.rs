//! Shared test helpers and a scripted agent.

#![allow(dead_code)]

use std::collections::VecDeque;
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use futures::stream::{self, BoxStream};

use kbharvest::agent::AgentInvoker;
use kbharvest::error::HarvestError;
use kbharvest::provider::{AgentChunk, AgentClient, InvokeAgentRequest};
use kbharvest::types::Resource;

/// What the scripted agent does on one call.
pub enum Reply {
    Text(String),
    /// Raw chunks sent as is, which may split a character.
    Chunks(Vec<Vec<u8>>),
    Fail(HarvestError),
}

/// An agent that replays a queue of replies and records every request.
///
/// Once the queue is drained every further call answers `fallback`.
pub struct ScriptedAgent {
    replies: Mutex<VecDeque<Reply>>,
    fallback: String,
    requests: Mutex<Vec<InvokeAgentRequest>>,
}

impl ScriptedAgent {
    pub fn new() -> Self {
        Self {
            replies: Mutex::new(VecDeque::new()),
            fallback: wrap("[]"),
            requests: Mutex::new(Vec::new()),
        }
    }

    /// Answer every unscripted call with `reply` instead of the empty sentinel.
    pub fn with_fallback(mut self, reply: impl Into<String>) -> Self {
        self.fallback = reply.into();
        self
    }

    pub fn reply(self, text: impl Into<String>) -> Self {
        self.replies.lock().unwrap().push_back(Reply::Text(text.into()));
        self
    }

    /// Send `text` in two chunks cut `at` bytes in, even mid-character.
    pub fn reply_split(self, text: &str, at: usize) -> Self {
        let bytes = text.as_bytes();
        let chunks = vec![bytes[..at].to_vec(), bytes[at..].to_vec()];
        self.replies.lock().unwrap().push_back(Reply::Chunks(chunks));
        self
    }

    pub fn fail(self, error: HarvestError) -> Self {
        self.replies.lock().unwrap().push_back(Reply::Fail(error));
        self
    }

    pub fn requests(&self) -> Vec<InvokeAgentRequest> {
        self.requests.lock().unwrap().clone()
    }

    pub fn call_count(&self) -> usize {
        self.requests.lock().unwrap().len()
    }
}

#[async_trait]
impl AgentClient for ScriptedAgent {
    async fn invoke_agent(
        &self,
        request: &InvokeAgentRequest,
    ) -> Result<BoxStream<'static, Result<AgentChunk, HarvestError>>, HarvestError> {
        self.requests.lock().unwrap().push(request.clone());
        let next = self.replies.lock().unwrap().pop_front();
        let text = match next {
            Some(Reply::Text(text)) => text,
            Some(Reply::Chunks(chunks)) => {
                let chunks: Vec<Result<AgentChunk, HarvestError>> = chunks
                    .into_iter()
                    .map(|bytes| Ok(AgentChunk { bytes }))
                    .collect();
                return Ok(Box::pin(stream::iter(chunks)));
            }
            Some(Reply::Fail(error)) => return Err(error),
            None => self.fallback.clone(),
        };

        // Split the reply so callers have to reassemble it.
        let bytes = text.into_bytes();
        let mid = bytes.len() / 2;
        let chunks: Vec<Result<AgentChunk, HarvestError>> = vec![
            Ok(AgentChunk {
                bytes: bytes[..mid].to_vec(),
            }),
            Ok(AgentChunk {
                bytes: bytes[mid..].to_vec(),
            }),
        ];
        Ok(Box::pin(stream::iter(chunks)))
    }
}

/// Wrap a payload in the reply delimiters.
pub fn wrap(payload: &str) -> String {
    format!("Here is what I found.\n<json_response>{payload}</json_response>")
}

/// A delimited reply carrying `count` distinct observations starting at `first`.
pub fn rows(first: usize, count: usize) -> String {
    let items: Vec<String> = (first..first + count)
        .map(|i| {
            format!(
                r#"{{"resourceName":"NF1OPG","observationType":"Disease Susceptibility","observationText":"finding {i}","doi":"10.1000/{i}"}}"#
            )
        })
        .collect();
    wrap(&format!("[{}]", items.join(",")))
}

pub fn invoker(agent: &Arc<ScriptedAgent>) -> AgentInvoker {
    AgentInvoker::new(agent.clone(), "AGENT", "ALIAS")
}

pub fn resource(id: &str) -> Resource {
    Resource::new(id, format!("resource {id}"), "Animal Model")
}
