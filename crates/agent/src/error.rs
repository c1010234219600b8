use fisibot_core::error::ProviderError;

use crate::phase::TurnPhase;

/// Failures that abort a turn. Tool and retrieval failures never do.
#[derive(Debug, thiserror::Error)]
pub enum AgentError {
    #[error("Model call failed: {0}")]
    Provider(#[from] ProviderError),

    #[error("Query is empty")]
    EmptyQuery,

    #[error("Invalid turn transition: {from} -> {to}")]
    InvalidTransition { from: TurnPhase, to: TurnPhase },
}
