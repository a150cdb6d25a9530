//! Remote service clients: the conversational agent and the knowledge base.

pub mod agent;
pub mod http;
pub mod knowledge_base;

pub use agent::HttpAgentClient;
pub use knowledge_base::{
    Citation, GeneratedAnswer, HttpKnowledgeBaseClient, KnowledgeBaseClient,
    RetrieveAndGenerateRequest, RetrieveRequest, RetrievedReference, SearchType,
    DEFAULT_RESULT_LIMIT,
};

use async_trait::async_trait;
use futures::stream::BoxStream;
use serde::Serialize;

use crate::error::HarvestError;
use crate::types::SessionId;

/// One call to the conversational agent.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct InvokeAgentRequest {
    #[serde(skip)]
    pub agent_id: String,
    #[serde(skip)]
    pub agent_alias_id: String,
    #[serde(skip)]
    pub session_id: SessionId,
    pub input_text: String,
    pub enable_trace: bool,
    pub end_session: bool,
}

/// One incremental piece of a streamed agent reply.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AgentChunk {
    pub bytes: Vec<u8>,
}

/// Core trait implemented by agent runtimes.
#[async_trait]
pub trait AgentClient: Send + Sync {
    /// Send one turn and return the reply as a stream of chunks.
    async fn invoke_agent(
        &self,
        request: &InvokeAgentRequest,
    ) -> Result<BoxStream<'static, Result<AgentChunk, HarvestError>>, HarvestError>;
}
