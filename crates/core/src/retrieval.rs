//! Retrieval traits: query encoding and nearest-neighbour search.
//!
//! The encoder and the index are separate seams: the encoder is a
//! process-wide, read-only service built once at startup; the index is a
//! remote collection queried per request.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use crate::error::RetrievalError;

/// Payload key holding the source document name.
pub const PAYLOAD_SOURCE_KEY: &str = "pdf_name";
/// Payload key holding the fragment text.
pub const PAYLOAD_TEXT_KEY: &str = "text";

const MISSING_SOURCE: &str = "N/A";
const MISSING_TEXT: &str = "No disponible";

/// Turns text into a fixed-dimension vector.
#[async_trait]
pub trait TextEncoder: Send + Sync {
    /// Identifier of the underlying model (e.g. a Hugging Face repo id).
    fn model_id(&self) -> &str;

    /// Output vector dimension.
    fn dimension(&self) -> usize;

    /// Encode a single query.
    async fn encode(&self, text: &str) -> Result<Vec<f32>, RetrievalError>;
}

/// A single hit from a vector index, before mapping into a [`Fragment`].
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ScoredPoint {
    /// Point id as stored by the backend (integer or UUID).
    pub id: serde_json::Value,

    /// Similarity score in the backend's native metric.
    pub score: f32,

    /// Stored payload fields.
    #[serde(default)]
    pub payload: Option<serde_json::Map<String, serde_json::Value>>,
}

/// Collection-scoped nearest-neighbour search.
#[async_trait]
pub trait VectorIndex: Send + Sync {
    /// Backend name (e.g. "qdrant", "in_memory").
    fn name(&self) -> &str;

    /// Return up to `limit` points, in the backend's similarity order.
    async fn search(&self, vector: &[f32], limit: usize) -> Result<Vec<ScoredPoint>, RetrievalError>;
}

/// A scored unit of retrieved text, ready to be folded into a prompt.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Fragment {
    /// 1-based rank within the result list.
    #[serde(rename = "fragmento")]
    pub index: usize,

    /// Source document identifier.
    #[serde(rename = "pdf")]
    pub source: String,

    #[serde(rename = "texto")]
    pub text: String,

    /// Similarity rounded to 4 decimal places.
    #[serde(rename = "similitud")]
    pub similarity: f64,
}

impl Fragment {
    /// Map a backend hit into a fragment. Missing payload fields fall back
    /// to placeholders rather than failing.
    pub fn from_point(index: usize, point: &ScoredPoint) -> Self {
        let field = |key: &str, fallback: &str| {
            point
                .payload
                .as_ref()
                .and_then(|p| p.get(key))
                .and_then(|v| v.as_str())
                .unwrap_or(fallback)
                .to_string()
        };

        Self {
            index,
            source: field(PAYLOAD_SOURCE_KEY, MISSING_SOURCE),
            text: field(PAYLOAD_TEXT_KEY, MISSING_TEXT),
            similarity: round_score(point.score),
        }
    }

    /// `--- Fragmento N (PDF: x, similitud: s) ---` header plus text.
    pub fn render(&self) -> String {
        format!(
            "--- Fragmento {} (PDF: {}, similitud: {}) ---\n{}",
            self.index, self.source, self.similarity, self.text
        )
    }
}

/// Render fragments into the context blob stored on the session.
pub fn render_context(fragments: &[Fragment]) -> String {
    fragments
        .iter()
        .map(Fragment::render)
        .collect::<Vec<_>>()
        .join("\n\n")
}

/// Round a similarity score to 4 decimal places.
pub fn round_score(score: f32) -> f64 {
    (score as f64 * 10_000.0).round() / 10_000.0
}

#[cfg(test)]
mod tests {
    use super::*;

    fn point(score: f32, payload: serde_json::Value) -> ScoredPoint {
        ScoredPoint {
            id: serde_json::json!(1),
            score,
            payload: payload.as_object().cloned(),
        }
    }

    #[test]
    fn rounds_to_four_decimals() {
        assert_eq!(round_score(0.876_543_2), 0.8765);
        assert_eq!(round_score(0.123_46), 0.1235);
        assert_eq!(round_score(1.0), 1.0);
    }

    #[test]
    fn maps_payload_fields() {
        let p = point(0.91234, serde_json::json!({"pdf_name": "ondas.pdf", "text": "El efecto Doppler..."}));
        let f = Fragment::from_point(1, &p);
        assert_eq!(f.index, 1);
        assert_eq!(f.source, "ondas.pdf");
        assert_eq!(f.text, "El efecto Doppler...");
        assert_eq!(f.similarity, 0.9123);
    }

    #[test]
    fn missing_payload_uses_placeholders() {
        let p = ScoredPoint { id: serde_json::json!("a"), score: 0.5, payload: None };
        let f = Fragment::from_point(2, &p);
        assert_eq!(f.source, "N/A");
        assert_eq!(f.text, "No disponible");
    }

    #[test]
    fn serializes_with_course_field_names() {
        let f = Fragment { index: 1, source: "a.pdf".into(), text: "t".into(), similarity: 0.5 };
        let json = serde_json::to_value(&f).unwrap();
        assert_eq!(json["fragmento"], 1);
        assert_eq!(json["pdf"], "a.pdf");
        assert_eq!(json["texto"], "t");
        assert_eq!(json["similitud"], 0.5);
    }

    #[test]
    fn context_blob_format() {
        let fragments = vec![
            Fragment { index: 1, source: "a.pdf".into(), text: "uno".into(), similarity: 0.9 },
            Fragment { index: 2, source: "b.pdf".into(), text: "dos".into(), similarity: 0.8 },
        ];
        let blob = render_context(&fragments);
        assert_eq!(
            blob,
            "--- Fragmento 1 (PDF: a.pdf, similitud: 0.9) ---\nuno\n\n--- Fragmento 2 (PDF: b.pdf, similitud: 0.8) ---\ndos"
        );
        assert!(render_context(&[]).is_empty());
    }
}
