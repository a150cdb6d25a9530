//! Knowledge-base retrieval over HTTP.
//!
//! Two calls are exposed: plain `retrieve`, which returns ranked snippets,
//! and `retrieve_and_generate`, which has a foundation model answer the
//! query from those snippets and returns the answer with its citations.

use std::time::Duration;

use async_trait::async_trait;
use bon::Builder;
use serde::{Deserialize, Serialize};
use serde_json::{json, Map, Value};
use strum::{Display, EnumString};
use tracing::debug;

use crate::config::HarvestConfig;
use crate::error::HarvestError;

use super::http::{bearer_headers, build_client, network_error, status_to_error};

/// Snippets requested per retrieval unless the caller overrides it.
pub const DEFAULT_RESULT_LIMIT: u32 = 50;

const DEFAULT_MAX_TOKENS: u32 = 4096;
const DEFAULT_TEMPERATURE: f64 = 0.2;
const DEFAULT_TOP_P: f64 = 0.9;

/// Search strategy override for vector retrieval.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Display, EnumString)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
#[strum(serialize_all = "SCREAMING_SNAKE_CASE", ascii_case_insensitive)]
pub enum SearchType {
    Hybrid,
    Semantic,
}

/// A single retrieval query.
///
/// ```
/// use kbharvest::provider::{RetrieveRequest, SearchType};
///
/// let request = RetrieveRequest::builder()
///     .knowledge_base_id("ZMHF67DY2R")
///     .query("Tell me about HCT 116 Cell Line")
///     .search_type(SearchType::Hybrid)
///     .build();
/// assert_eq!(request.number_of_results, 50);
/// ```
#[derive(Debug, Clone, PartialEq, Builder)]
pub struct RetrieveRequest {
    #[builder(into)]
    pub knowledge_base_id: String,
    #[builder(into)]
    pub query: String,
    #[builder(default = DEFAULT_RESULT_LIMIT)]
    pub number_of_results: u32,
    pub search_type: Option<SearchType>,
}

impl RetrieveRequest {
    fn body(&self) -> Value {
        let mut vector = json!({ "numberOfResults": self.number_of_results });
        if let (Some(search_type), Some(obj)) = (self.search_type, vector.as_object_mut()) {
            obj.insert("overrideSearchType".into(), json!(search_type));
        }
        json!({
            "retrievalQuery": { "text": self.query },
            "retrievalConfiguration": { "vectorSearchConfiguration": vector },
        })
    }
}

/// A retrieval query answered by a foundation model.
///
/// ```
/// use kbharvest::provider::RetrieveAndGenerateRequest;
///
/// let request = RetrieveAndGenerateRequest::builder()
///     .knowledge_base_id("ZMHF67DY2R")
///     .input("Tell me about HCT 116 Cell Line")
///     .model_arn("arn:aws:bedrock:us-east-1::foundation-model/anthropic.claude-3-sonnet-20240229-v1:0")
///     .build();
/// assert_eq!(request.max_tokens, 4096);
/// assert!(request.session_id.is_none());
/// ```
#[derive(Debug, Clone, PartialEq, Builder)]
pub struct RetrieveAndGenerateRequest {
    #[builder(into)]
    pub knowledge_base_id: String,
    #[builder(into)]
    pub input: String,
    #[builder(into)]
    pub model_arn: String,
    #[builder(default = DEFAULT_RESULT_LIMIT)]
    pub number_of_results: u32,
    /// Continues an earlier generation session when set.
    #[builder(into)]
    pub session_id: Option<String>,
    #[builder(default = DEFAULT_MAX_TOKENS)]
    pub max_tokens: u32,
    #[builder(default = DEFAULT_TEMPERATURE)]
    pub temperature: f64,
    #[builder(default = DEFAULT_TOP_P)]
    pub top_p: f64,
}

impl RetrieveAndGenerateRequest {
    fn body(&self) -> Value {
        let mut body = json!({
            "input": { "text": self.input },
            "retrieveAndGenerateConfiguration": {
                "type": "KNOWLEDGE_BASE",
                "knowledgeBaseConfiguration": {
                    "knowledgeBaseId": self.knowledge_base_id,
                    "modelArn": self.model_arn,
                    "generationConfiguration": {
                        "inferenceConfig": {
                            "textInferenceConfig": {
                                "maxTokens": self.max_tokens,
                                "temperature": self.temperature,
                                "topP": self.top_p,
                            }
                        }
                    },
                    "retrievalConfiguration": {
                        "vectorSearchConfiguration": {
                            "numberOfResults": self.number_of_results
                        }
                    }
                }
            }
        });
        if let (Some(session_id), Some(obj)) = (&self.session_id, body.as_object_mut()) {
            obj.insert("sessionId".into(), json!(session_id));
        }
        body
    }
}

/// A ranked snippet returned by the knowledge base.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RetrievedReference {
    pub content: ReferenceContent,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub location: Option<Value>,
    #[serde(default)]
    pub metadata: Map<String, Value>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub score: Option<f64>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ReferenceContent {
    #[serde(default)]
    pub text: String,
}

impl RetrievedReference {
    /// The document identifier from the snippet's metadata. This is the only
    /// legitimate source of an observation's `doi`.
    pub fn doi(&self) -> Option<&str> {
        match self.metadata.get("doi")? {
            Value::String(s) => Some(s.as_str()),
            Value::Array(items) => items.iter().find_map(Value::as_str),
            _ => None,
        }
    }

    pub fn source_uri(&self) -> Option<&str> {
        self.metadata
            .get("x-amz-bedrock-kb-source-uri")
            .and_then(Value::as_str)
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct GeneratedText {
    #[serde(default)]
    pub text: String,
}

/// A span of the generated answer and the snippets backing it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Citation {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub generated_response_part: Option<Value>,
    #[serde(default)]
    pub retrieved_references: Vec<RetrievedReference>,
}

/// Answer produced by `retrieve_and_generate`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GeneratedAnswer {
    #[serde(default)]
    pub output: GeneratedText,
    #[serde(default)]
    pub citations: Vec<Citation>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub session_id: Option<String>,
}

impl GeneratedAnswer {
    pub fn text(&self) -> &str {
        &self.output.text
    }

    /// References behind the first citation, or none when uncited.
    pub fn cited_references(&self) -> &[RetrievedReference] {
        self.citations
            .first()
            .map(|c| c.retrieved_references.as_slice())
            .unwrap_or_default()
    }
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct RetrieveResponse {
    #[serde(default)]
    retrieval_results: Vec<RetrievedReference>,
}

#[async_trait]
pub trait KnowledgeBaseClient: Send + Sync {
    async fn retrieve(
        &self,
        request: &RetrieveRequest,
    ) -> Result<Vec<RetrievedReference>, HarvestError>;

    async fn retrieve_and_generate(
        &self,
        request: &RetrieveAndGenerateRequest,
    ) -> Result<GeneratedAnswer, HarvestError>;
}

pub struct HttpKnowledgeBaseClient {
    client: reqwest::Client,
    endpoint: String,
    api_key: Option<String>,
    timeout: Duration,
}

impl HttpKnowledgeBaseClient {
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

    async fn post_json<T: serde::de::DeserializeOwned>(
        &self,
        url: &str,
        body: &Value,
    ) -> Result<T, HarvestError> {
        let resp = self
            .client
            .post(url)
            .headers(bearer_headers(self.api_key.as_deref()))
            .json(body)
            .send()
            .await
            .map_err(|e| network_error(e, self.timeout))?;

        let status = resp.status().as_u16();
        if !(200..300).contains(&status) {
            let body_text = resp.text().await.unwrap_or_default();
            return Err(status_to_error(status, &body_text));
        }

        resp.json()
            .await
            .map_err(|e| network_error(e, self.timeout))
    }
}

#[async_trait]
impl KnowledgeBaseClient for HttpKnowledgeBaseClient {
    async fn retrieve(
        &self,
        request: &RetrieveRequest,
    ) -> Result<Vec<RetrievedReference>, HarvestError> {
        let url = format!(
            "{}/knowledgebases/{}/retrieve",
            self.endpoint, request.knowledge_base_id
        );

        debug!(
            knowledge_base_id = %request.knowledge_base_id,
            limit = request.number_of_results,
            "knowledge base retrieve"
        );

        let data: RetrieveResponse = self.post_json(&url, &request.body()).await?;
        Ok(data.retrieval_results)
    }

    async fn retrieve_and_generate(
        &self,
        request: &RetrieveAndGenerateRequest,
    ) -> Result<GeneratedAnswer, HarvestError> {
        let url = format!("{}/retrieveAndGenerate", self.endpoint);

        debug!(
            knowledge_base_id = %request.knowledge_base_id,
            model_arn = %request.model_arn,
            session = request.session_id.as_deref().unwrap_or("new"),
            "knowledge base retrieve and generate"
        );

        self.post_json(&url, &request.body()).await
    }
}
