//! Canned retrieval backends shared by the workspace's tests.
//!
//! Compiled for this crate's own tests and, through the `test-support`
//! feature, for the dev-dependencies of the crates built on top of it.

use async_trait::async_trait;
use fisibot_core::error::RetrievalError;
use fisibot_core::retrieval::{ScoredPoint, TextEncoder, VectorIndex};

/// Encodes every query as the same fixed vector.
pub struct FixedEncoder(pub Vec<f32>);

impl FixedEncoder {
    /// The 2-d unit vector `[1, 0]`.
    pub fn unit() -> Self {
        Self(vec![1.0, 0.0])
    }
}

#[async_trait]
impl TextEncoder for FixedEncoder {
    fn model_id(&self) -> &str {
        "fixed"
    }
    fn dimension(&self) -> usize {
        self.0.len()
    }
    async fn encode(&self, _text: &str) -> Result<Vec<f32>, RetrievalError> {
        Ok(self.0.clone())
    }
}

/// A Qdrant-shaped hit with `pdf_name` and `text` in its payload.
pub fn hit(id: u64, score: f32, pdf: &str, text: &str) -> ScoredPoint {
    ScoredPoint {
        id: serde_json::json!(id),
        score,
        payload: serde_json::json!({"pdf_name": pdf, "text": text}).as_object().cloned(),
    }
}

/// Returns canned points, ignoring `limit`.
pub struct CannedIndex(pub Vec<ScoredPoint>);

impl CannedIndex {
    /// Two hits about the Doppler effect.
    pub fn doppler() -> Self {
        Self(vec![
            hit(1, 0.912_34, "ondas.pdf", "El efecto Doppler es el cambio aparente de frecuencia."),
            hit(2, 0.8, "sonido.pdf", "Una fuente que se acerca se percibe más aguda."),
        ])
    }
}

#[async_trait]
impl VectorIndex for CannedIndex {
    fn name(&self) -> &str {
        "canned"
    }
    async fn search(&self, _vector: &[f32], _limit: usize) -> Result<Vec<ScoredPoint>, RetrievalError> {
        Ok(self.0.clone())
    }
}

/// Always unreachable.
pub struct FailingIndex;

#[async_trait]
impl VectorIndex for FailingIndex {
    fn name(&self) -> &str {
        "failing"
    }
    async fn search(&self, _vector: &[f32], _limit: usize) -> Result<Vec<ScoredPoint>, RetrievalError> {
        Err(RetrievalError::Network("connection refused".into()))
    }
}
