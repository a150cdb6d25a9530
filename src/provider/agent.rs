//! Agent runtime over HTTP with a server-sent chunk stream.

use std::time::Duration;

use async_trait::async_trait;
use base64::engine::general_purpose::STANDARD;
use base64::Engine;
use futures::stream::BoxStream;
use futures::StreamExt;
use serde::Deserialize;
use tracing::debug;

use crate::config::HarvestConfig;
use crate::error::HarvestError;

use super::http::{bearer_headers, build_client, network_error, parse_sse_data, status_to_error};
use super::{AgentChunk, AgentClient, InvokeAgentRequest};

pub struct HttpAgentClient {
    client: reqwest::Client,
    endpoint: String,
    api_key: Option<String>,
    timeout: Duration,
}

impl HttpAgentClient {
    pub fn new(
        endpoint: impl Into<String>,
        api_key: Option<String>,
        timeout: Duration,
    ) -> Result<Self, HarvestError> {
        Ok(Self {
            client: build_client(timeout)?,
            endpoint: endpoint.into().trim_end_matches('/').to_string(),
            api_key,
            timeout,
        })
    }

    pub fn from_config(config: &HarvestConfig) -> Result<Self, HarvestError> {
        Self::new(config.endpoint()?, config.api_key.clone(), config.timeout())
    }

    fn url(&self, request: &InvokeAgentRequest) -> String {
        format!(
            "{}/agents/{}/agentAliases/{}/sessions/{}/text",
            self.endpoint, request.agent_id, request.agent_alias_id, request.session_id
        )
    }
}

#[derive(Debug, Deserialize)]
struct StreamEvent {
    chunk: Option<ChunkPayload>,
    trace: Option<serde_json::Value>,
    error: Option<StreamFault>,
}

#[derive(Debug, Deserialize)]
struct ChunkPayload {
    bytes: String,
}

#[derive(Debug, Deserialize)]
struct StreamFault {
    #[serde(default)]
    code: Option<String>,
    message: String,
}

/// Turn one SSE data payload into a chunk, `None` for events carrying no text.
fn decode_event(data: &str) -> Result<Option<AgentChunk>, HarvestError> {
    let event: StreamEvent = serde_json::from_str(data)
        .map_err(|e| HarvestError::Stream(format!("malformed stream event: {e}")))?;

    if let Some(fault) = event.error {
        let code = fault.code.unwrap_or_else(|| "error".to_string());
        return Err(HarvestError::Stream(format!("{code}: {}", fault.message)));
    }
    if let Some(chunk) = event.chunk {
        let bytes = STANDARD
            .decode(chunk.bytes.as_bytes())
            .map_err(|e| HarvestError::Stream(format!("invalid chunk encoding: {e}")))?;
        return Ok(Some(AgentChunk { bytes }));
    }
    if let Some(trace) = event.trace {
        debug!(trace = %trace, "agent trace event");
    }
    Ok(None)
}

#[async_trait]
impl AgentClient for HttpAgentClient {
    async fn invoke_agent(
        &self,
        request: &InvokeAgentRequest,
    ) -> Result<BoxStream<'static, Result<AgentChunk, HarvestError>>, HarvestError> {
        let url = self.url(request);
        let timeout = self.timeout;

        debug!(
            agent_id = %request.agent_id,
            session_id = %request.session_id,
            end_session = request.end_session,
            "invoke_agent"
        );

        let resp = self
            .client
            .post(&url)
            .headers(bearer_headers(self.api_key.as_deref()))
            .json(request)
            .send()
            .await
            .map_err(|e| network_error(e, timeout))?;

        let status = resp.status().as_u16();
        if !(200..300).contains(&status) {
            let body_text = resp.text().await.unwrap_or_default();
            return Err(status_to_error(status, &body_text));
        }

        let byte_stream = resp.bytes_stream();

        let stream = async_stream::stream! {
            let mut buffer = String::new();
            let mut failed = false;
            futures::pin_mut!(byte_stream);

            'read: while let Some(chunk_result) = byte_stream.next().await {
                let chunk = match chunk_result {
                    Ok(c) => c,
                    Err(e) => {
                        yield Err(network_error(e, timeout));
                        failed = true;
                        break 'read;
                    }
                };

                buffer.push_str(&String::from_utf8_lossy(&chunk));

                while let Some(line_end) = buffer.find('\n') {
                    let line = buffer[..line_end].trim().to_string();
                    buffer = buffer[line_end + 1..].to_string();

                    if line.is_empty() || line.starts_with(':') {
                        continue;
                    }
                    if let Some(data) = parse_sse_data(&line) {
                        match decode_event(data) {
                            Ok(Some(piece)) => yield Ok(piece),
                            Ok(None) => {}
                            Err(e) => {
                                yield Err(e);
                                failed = true;
                                break 'read;
                            }
                        }
                    }
                }
            }

            if !failed {
                if let Some(data) = parse_sse_data(buffer.trim()) {
                    match decode_event(data) {
                        Ok(Some(piece)) => yield Ok(piece),
                        Ok(None) => {}
                        Err(e) => yield Err(e),
                    }
                }
            }
        };

        Ok(Box::pin(stream))
    }
}
