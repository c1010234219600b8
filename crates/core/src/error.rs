//! Error types for the fisibot domain.
//!
//! Uses `thiserror` for ergonomic error definitions.
//! Each bounded context has its own error type, and callers match on the
//! one their seam returns.

use thiserror::Error;

// --- Bounded context errors ---

#[derive(Debug, Clone, Error)]
pub enum ProviderError {
    #[error("API request failed: {message} (status: {status_code})")]
    ApiError {
        status_code: u16,
        message: String,
    },

    #[error("Rate limited by provider, retry after {retry_after_secs}s")]
    RateLimited { retry_after_secs: u64 },

    #[error("Authentication failed: {0}")]
    AuthenticationFailed(String),

    #[error("Model not found: {0}")]
    ModelNotFound(String),

    #[error("Provider not configured: {0}")]
    NotConfigured(String),

    #[error("Response blocked: {0}")]
    Blocked(String),

    #[error("Network error: {0}")]
    Network(String),
}

/// Failures while encoding a query or talking to the vector backend.
///
/// These never escape the retriever: they are logged and degrade to an
/// empty fragment list.
#[derive(Debug, Clone, Error)]
pub enum RetrievalError {
    #[error("Encoder not available: {0}")]
    EncoderUnavailable(String),

    #[error("Encoding failed: {0}")]
    EncodingFailed(String),

    #[error("Vector backend unreachable: {0}")]
    Network(String),

    #[error("Vector backend returned {status_code}: {message}")]
    Backend { status_code: u16, message: String },

    #[error("Malformed search response: {0}")]
    MalformedResponse(String),

    #[error("Vector dimension mismatch: expected {expected}, got {actual}")]
    DimensionMismatch { expected: usize, actual: usize },
}

#[derive(Debug, Error)]
pub enum ToolError {
    #[error("Tool not found: {0}")]
    NotFound(String),

    #[error("Invalid tool arguments: {0}")]
    InvalidArguments(String),
}
