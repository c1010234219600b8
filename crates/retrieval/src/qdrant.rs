//! Qdrant collection search over the REST API.
//!
//! Only the search endpoint is used: the collection is populated by an
//! external ingestion job.

use async_trait::async_trait;
use fisibot_config::QdrantConfig;
use fisibot_core::error::RetrievalError;
use fisibot_core::retrieval::{ScoredPoint, VectorIndex};
use serde::{Deserialize, Serialize};
use std::time::Duration;
use tracing::{debug, warn};

/// A single Qdrant collection.
pub struct QdrantIndex {
    base_url: String,
    collection: String,
    api_key: Option<String>,
    client: reqwest::Client,
}

impl QdrantIndex {
    pub fn new(
        base_url: impl Into<String>,
        collection: impl Into<String>,
        api_key: Option<String>,
        timeout: Duration,
    ) -> Result<Self, RetrievalError> {
        let client = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| RetrievalError::Network(format!("HTTP client: {e}")))?;

        Ok(Self {
            base_url: base_url.into().trim_end_matches('/').to_string(),
            collection: collection.into(),
            api_key,
            client,
        })
    }

    pub fn from_config(config: &QdrantConfig) -> Result<Self, RetrievalError> {
        Self::new(
            config.url_or_default(),
            &config.collection,
            config.api_key.clone(),
            Duration::from_secs(config.timeout_secs),
        )
    }

    pub fn collection(&self) -> &str {
        &self.collection
    }

    fn search_url(&self) -> String {
        format!("{}/collections/{}/points/search", self.base_url, self.collection)
    }

    fn authorize(&self, builder: reqwest::RequestBuilder) -> reqwest::RequestBuilder {
        match &self.api_key {
            Some(key) => builder.header("api-key", key),
            None => builder,
        }
    }

    fn parse_search_response(body: &str) -> Result<Vec<ScoredPoint>, RetrievalError> {
        let parsed: SearchResponse = serde_json::from_str(body)
            .map_err(|e| RetrievalError::MalformedResponse(e.to_string()))?;
        Ok(parsed.result)
    }

    /// Whether the collection exists and is reachable.
    pub async fn health_check(&self) -> Result<bool, RetrievalError> {
        let url = format!("{}/collections/{}", self.base_url, self.collection);
        let response = self
            .authorize(self.client.get(&url))
            .send()
            .await
            .map_err(|e| RetrievalError::Network(e.to_string()))?;
        Ok(response.status().is_success())
    }
}

#[async_trait]
impl VectorIndex for QdrantIndex {
    fn name(&self) -> &str {
        "qdrant"
    }

    async fn search(&self, vector: &[f32], limit: usize) -> Result<Vec<ScoredPoint>, RetrievalError> {
        let body = SearchRequest {
            vector,
            limit,
            with_payload: true,
        };

        debug!(collection = %self.collection, limit, "Searching Qdrant");

        let response = self
            .authorize(self.client.post(self.search_url()))
            .json(&body)
            .send()
            .await
            .map_err(|e| RetrievalError::Network(e.to_string()))?;

        let status = response.status().as_u16();
        let text = response
            .text()
            .await
            .map_err(|e| RetrievalError::Network(e.to_string()))?;

        if status != 200 {
            warn!(status, body = %text, "Qdrant returned error");
            return Err(RetrievalError::Backend {
                status_code: status,
                message: text,
            });
        }

        Self::parse_search_response(&text)
    }
}

#[derive(Debug, Serialize)]
struct SearchRequest<'a> {
    vector: &'a [f32],
    limit: usize,
    with_payload: bool,
}

#[derive(Debug, Deserialize)]
struct SearchResponse {
    #[serde(default)]
    result: Vec<ScoredPoint>,
}
