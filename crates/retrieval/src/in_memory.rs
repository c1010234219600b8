//! Brute-force in-memory vector index.
//!
//! Holds points and their payloads in a `RwLock<Vec<_>>` and scores every
//! point on each search. Intended for tests and small offline corpora.

use async_trait::async_trait;
use fisibot_core::error::RetrievalError;
use fisibot_core::retrieval::{PAYLOAD_SOURCE_KEY, PAYLOAD_TEXT_KEY, ScoredPoint, VectorIndex};
use serde_json::{Map, Value};
use tokio::sync::RwLock;

use crate::similarity::cosine_similarity;

struct StoredPoint {
    id: Value,
    vector: Vec<f32>,
    payload: Map<String, Value>,
}

/// A cosine-similarity index over a fixed vector dimension.
pub struct InMemoryIndex {
    dimension: usize,
    points: RwLock<Vec<StoredPoint>>,
}

impl InMemoryIndex {
    pub fn new(dimension: usize) -> Self {
        Self {
            dimension,
            points: RwLock::new(Vec::new()),
        }
    }

    /// Insert a point with an arbitrary payload.
    pub async fn upsert(
        &self,
        id: impl Into<Value>,
        vector: Vec<f32>,
        payload: Map<String, Value>,
    ) -> Result<(), RetrievalError> {
        if vector.len() != self.dimension {
            return Err(RetrievalError::DimensionMismatch {
                expected: self.dimension,
                actual: vector.len(),
            });
        }
        let id = id.into();
        let mut points = self.points.write().await;
        points.retain(|p| p.id != id);
        points.push(StoredPoint { id, vector, payload });
        Ok(())
    }

    /// Insert a document fragment using the standard payload keys.
    pub async fn insert_fragment(
        &self,
        id: u64,
        vector: Vec<f32>,
        source: &str,
        text: &str,
    ) -> Result<(), RetrievalError> {
        let mut payload = Map::new();
        payload.insert(PAYLOAD_SOURCE_KEY.into(), Value::String(source.into()));
        payload.insert(PAYLOAD_TEXT_KEY.into(), Value::String(text.into()));
        self.upsert(id, vector, payload).await
    }

    pub async fn len(&self) -> usize {
        self.points.read().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.points.read().await.is_empty()
    }
}

#[async_trait]
impl VectorIndex for InMemoryIndex {
    fn name(&self) -> &str {
        "in_memory"
    }

    async fn search(&self, vector: &[f32], limit: usize) -> Result<Vec<ScoredPoint>, RetrievalError> {
        if vector.len() != self.dimension {
            return Err(RetrievalError::DimensionMismatch {
                expected: self.dimension,
                actual: vector.len(),
            });
        }

        let points = self.points.read().await;
        let mut scored: Vec<ScoredPoint> = points
            .iter()
            .map(|p| ScoredPoint {
                id: p.id.clone(),
                score: cosine_similarity(&p.vector, vector),
                payload: Some(p.payload.clone()),
            })
            .collect();

        scored.sort_by(|a, b| b.score.partial_cmp(&a.score).unwrap_or(std::cmp::Ordering::Equal));
        scored.truncate(limit);
        Ok(scored)
    }
}
