//! Query → fragments.
//!
//! Wraps an encoder and an index. Search never fails outward: any encoder or
//! backend error is logged and yields an empty list so a turn can continue
//! without document context.

use fisibot_core::error::RetrievalError;
use fisibot_core::retrieval::{Fragment, TextEncoder, VectorIndex};
use std::sync::Arc;
use tracing::{debug, warn};

#[derive(Clone)]
pub struct VectorRetriever {
    encoder: Arc<dyn TextEncoder>,
    index: Arc<dyn VectorIndex>,
}

impl VectorRetriever {
    pub fn new(encoder: Arc<dyn TextEncoder>, index: Arc<dyn VectorIndex>) -> Self {
        Self { encoder, index }
    }

    pub fn encoder(&self) -> &dyn TextEncoder {
        self.encoder.as_ref()
    }

    pub fn index(&self) -> &dyn VectorIndex {
        self.index.as_ref()
    }

    /// Top-`top_k` fragments for `query`, in backend order. Empty on failure.
    pub async fn search(&self, query: &str, top_k: usize) -> Vec<Fragment> {
        match self.try_search(query, top_k).await {
            Ok(fragments) => fragments,
            Err(e) => {
                warn!(error = %e, index = self.index.name(), "Document search failed");
                Vec::new()
            }
        }
    }

    /// Like [`search`](Self::search) but surfaces the error.
    pub async fn try_search(&self, query: &str, top_k: usize) -> Result<Vec<Fragment>, RetrievalError> {
        if top_k == 0 {
            return Ok(Vec::new());
        }

        let vector = self.encoder.encode(query).await?;
        if vector.len() != self.encoder.dimension() {
            return Err(RetrievalError::DimensionMismatch {
                expected: self.encoder.dimension(),
                actual: vector.len(),
            });
        }

        let points = self.index.search(&vector, top_k).await?;
        let fragments: Vec<Fragment> = points
            .iter()
            .take(top_k)
            .enumerate()
            .map(|(i, p)| Fragment::from_point(i + 1, p))
            .collect();

        debug!(top_k, found = fragments.len(), index = self.index.name(), "Document search complete");
        Ok(fragments)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::*;
    use crate::InMemoryIndex;
    use fisibot_core::retrieval::ScoredPoint;

    fn point(id: u64, score: f32) -> ScoredPoint {
        ScoredPoint {
            id: serde_json::json!(id),
            score,
            payload: serde_json::json!({"pdf_name": format!("doc{id}.pdf"), "text": format!("texto {id}")})
                .as_object()
                .cloned(),
        }
    }

    #[tokio::test]
    async fn caps_results_at_top_k() {
        let index = CannedIndex((1..=8).map(|i| point(i, 1.0 - i as f32 * 0.05)).collect());
        let retriever = VectorRetriever::new(Arc::new(FixedEncoder(vec![1.0])), Arc::new(index));
        let fragments = retriever.search("Doppler", 5).await;
        assert_eq!(fragments.len(), 5);
        assert_eq!(fragments[0].index, 1);
        assert_eq!(fragments[4].index, 5);
        assert_eq!(fragments[0].source, "doc1.pdf");
    }

    #[tokio::test]
    async fn keeps_backend_order_and_rounds() {
        let index = CannedIndex(vec![point(7, 0.612_345), point(3, 0.912_345)]);
        let retriever = VectorRetriever::new(Arc::new(FixedEncoder(vec![1.0])), Arc::new(index));
        let fragments = retriever.search("q", 5).await;
        assert_eq!(fragments[0].source, "doc7.pdf");
        assert_eq!(fragments[0].similarity, 0.6123);
        assert_eq!(fragments[1].similarity, 0.9123);
    }

    #[tokio::test]
    async fn backend_failure_yields_empty() {
        let retriever = VectorRetriever::new(Arc::new(FixedEncoder(vec![1.0])), Arc::new(FailingIndex));
        assert!(retriever.search("q", 5).await.is_empty());
        assert!(matches!(
            retriever.try_search("q", 5).await.unwrap_err(),
            RetrievalError::Network(_)
        ));
    }

    #[tokio::test]
    async fn empty_collection_yields_empty() {
        let retriever = VectorRetriever::new(Arc::new(FixedEncoder(vec![1.0, 0.0])), Arc::new(InMemoryIndex::new(2)));
        assert!(retriever.search("q", 5).await.is_empty());
    }

    #[tokio::test]
    async fn works_against_in_memory_index() {
        let index = InMemoryIndex::new(2);
        index.insert_fragment(1, vec![1.0, 0.0], "ondas.pdf", "Efecto Doppler").await.unwrap();
        index.insert_fragment(2, vec![0.0, 1.0], "termo.pdf", "Calorimetría").await.unwrap();
        let retriever = VectorRetriever::new(Arc::new(FixedEncoder(vec![0.9, 0.1])), Arc::new(index));
        let fragments = retriever.search("Doppler", 1).await;
        assert_eq!(fragments.len(), 1);
        assert_eq!(fragments[0].source, "ondas.pdf");
        assert_eq!(fragments[0].text, "Efecto Doppler");
    }
}
