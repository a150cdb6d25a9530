//! Single-shot knowledge-base lookups and the agent action-group adapter.

pub mod action_group;

pub use action_group::{ActionGroupEvent, ActionGroupResponse, ActionParameter};

use std::sync::Arc;

use tracing::info;

use crate::error::{HarvestError, Result};
use crate::provider::{
    GeneratedAnswer, KnowledgeBaseClient, RetrieveAndGenerateRequest, RetrieveRequest,
    RetrievedReference, SearchType, DEFAULT_RESULT_LIMIT,
};

/// Reference bodies handed back to the agent are cut to this many characters.
pub const MAX_BODY_CHARS: usize = 20_000;

/// Runs retrieval queries against one knowledge base.
#[derive(Clone)]
pub struct Retriever {
    client: Arc<dyn KnowledgeBaseClient>,
    knowledge_base_id: String,
    limit: u32,
    search_type: Option<SearchType>,
}

impl Retriever {
    pub fn new(client: Arc<dyn KnowledgeBaseClient>, knowledge_base_id: impl Into<String>) -> Self {
        Self {
            client,
            knowledge_base_id: knowledge_base_id.into(),
            limit: DEFAULT_RESULT_LIMIT,
            search_type: Some(SearchType::Hybrid),
        }
    }

    pub fn with_limit(mut self, limit: u32) -> Self {
        self.limit = limit;
        self
    }

    pub fn with_search_type(mut self, search_type: Option<SearchType>) -> Self {
        self.search_type = search_type;
        self
    }

    pub async fn retrieve(&self, query: &str) -> Result<Vec<RetrievedReference>> {
        require_query(query)?;
        let request = RetrieveRequest::builder()
            .knowledge_base_id(self.knowledge_base_id.clone())
            .query(query)
            .number_of_results(self.limit)
            .maybe_search_type(self.search_type)
            .build();
        let references = self.client.retrieve(&request).await?;
        info!(
            knowledge_base_id = %self.knowledge_base_id,
            results = references.len(),
            "retrieval complete"
        );
        Ok(references)
    }

    /// Answer `query` with the model behind `model_arn`, grounded in this
    /// knowledge base. Pass the `session_id` of an earlier answer to continue
    /// that conversation.
    pub async fn generate(
        &self,
        query: &str,
        model_arn: &str,
        session_id: Option<String>,
    ) -> Result<GeneratedAnswer> {
        require_query(query)?;
        let request = RetrieveAndGenerateRequest::builder()
            .knowledge_base_id(self.knowledge_base_id.clone())
            .input(query)
            .model_arn(model_arn)
            .number_of_results(self.limit)
            .maybe_session_id(session_id)
            .build();
        let answer = self.client.retrieve_and_generate(&request).await?;
        info!(
            knowledge_base_id = %self.knowledge_base_id,
            citations = answer.citations.len(),
            "generation complete"
        );
        Ok(answer)
    }
}

fn require_query(query: &str) -> Result<()> {
    if query.trim().is_empty() {
        return Err(HarvestError::InvalidArgument(
            "retrieval query must not be empty".into(),
        ));
    }
    Ok(())
}

/// Cut `text` to [`MAX_BODY_CHARS`] characters, marking the cut with `...`.
pub fn truncate_body(text: &str) -> String {
    match text.char_indices().nth(MAX_BODY_CHARS) {
        Some((cut, _)) => format!("{}...", &text[..cut]),
        None => text.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn short_bodies_are_untouched() {
        assert_eq!(truncate_body("abc"), "abc");
        let exact = "x".repeat(MAX_BODY_CHARS);
        assert_eq!(truncate_body(&exact), exact);
    }

    #[test]
    fn long_bodies_are_cut_on_a_char_boundary() {
        let long = "é".repeat(MAX_BODY_CHARS + 5);
        let cut = truncate_body(&long);
        assert!(cut.ends_with("..."));
        assert_eq!(cut.chars().count(), MAX_BODY_CHARS + 3);
    }
}
