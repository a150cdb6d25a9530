//! The invocation adapter around an [`AgentClient`].

use std::sync::Arc;
use std::time::Duration;

use futures::StreamExt;
use tracing::{debug, error};

use crate::config::HarvestConfig;
use crate::error::{HarvestError, Result};
use crate::provider::{AgentClient, InvokeAgentRequest};
use crate::types::SessionId;
use crate::util::retry::RetryPolicy;
use crate::util::timeout::with_timeout;

/// The full text of one agent reply.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Completion {
    pub session_id: SessionId,
    pub text: String,
}

/// Invokes one agent alias. Holds no conversation state of its own; the
/// remote agent keeps that under the session id.
pub struct AgentInvoker {
    client: Arc<dyn AgentClient>,
    agent_id: String,
    agent_alias_id: String,
    enable_trace: bool,
    retry: RetryPolicy,
    timeout: Option<Duration>,
}

impl AgentInvoker {
    pub fn new(
        client: Arc<dyn AgentClient>,
        agent_id: impl Into<String>,
        agent_alias_id: impl Into<String>,
    ) -> Self {
        Self {
            client,
            agent_id: agent_id.into(),
            agent_alias_id: agent_alias_id.into(),
            enable_trace: false,
            retry: RetryPolicy::none(),
            timeout: None,
        }
    }

    pub fn from_config(client: Arc<dyn AgentClient>, config: &HarvestConfig) -> Result<Self> {
        config.validate_for_agent()?;
        let (Some(agent_id), Some(alias_id)) = (&config.agent_id, &config.agent_alias_id) else {
            return Err(HarvestError::Configuration("Missing agent identifiers".into()));
        };
        Ok(Self::new(client, agent_id.clone(), alias_id.clone()).with_trace(config.enable_trace))
    }

    pub fn with_trace(mut self, enable_trace: bool) -> Self {
        self.enable_trace = enable_trace;
        self
    }

    /// Retry a failed call. Only this single call is repeated; turn
    /// accounting in the loop is unaffected.
    pub fn with_retry(mut self, retry: RetryPolicy) -> Self {
        self.retry = retry;
        self
    }

    /// Bound each call, stream included.
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = Some(timeout);
        self
    }

    pub fn agent_id(&self) -> &str {
        &self.agent_id
    }

    /// Send `text` and collect the whole reply.
    ///
    /// Without a session a fresh one is generated and `end_session` is
    /// honored. With a session the call is a continuation and the session is
    /// always kept open.
    pub async fn invoke(
        &self,
        text: &str,
        session_id: Option<&SessionId>,
        end_session: bool,
    ) -> Result<Completion> {
        let (session_id, end_session) = match session_id {
            Some(id) => (id.clone(), false),
            None => (SessionId::generate(), end_session),
        };

        let request = InvokeAgentRequest {
            agent_id: self.agent_id.clone(),
            agent_alias_id: self.agent_alias_id.clone(),
            session_id: session_id.clone(),
            input_text: text.to_string(),
            enable_trace: self.enable_trace,
            end_session,
        };

        let result = self
            .retry
            .execute("invoke_agent", || with_timeout(self.timeout, self.collect(&request)))
            .await;

        match result {
            Ok(text) => {
                debug!(
                    session_id = %session_id,
                    chars = text.len(),
                    "agent reply received"
                );
                Ok(Completion { session_id, text })
            }
            Err(e) if e.is_transport() => {
                error!(
                    agent_id = %self.agent_id,
                    session_id = %session_id,
                    error = %e,
                    "couldn't invoke agent"
                );
                Err(e)
            }
            Err(e) => {
                error!(
                    agent_id = %self.agent_id,
                    session_id = %session_id,
                    error = %e,
                    "unexpected error invoking agent"
                );
                Err(e)
            }
        }
    }

    async fn collect(&self, request: &InvokeAgentRequest) -> Result<String> {
        let mut stream = self.client.invoke_agent(request).await?;
        // Chunk boundaries can fall inside a multi-byte character.
        let mut bytes = Vec::new();
        while let Some(chunk) = stream.next().await {
            bytes.extend_from_slice(&chunk?.bytes);
        }
        String::from_utf8(bytes)
            .map_err(|e| HarvestError::Stream(format!("reply is not valid UTF-8: {e}")))
    }
}
