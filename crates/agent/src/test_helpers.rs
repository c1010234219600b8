//! Tool registries over canned retrieval backends.

pub use fisibot_providers::test_support::{ScriptedProvider, make_tool_call, text_response, tool_call_response};

use fisibot_core::tool::ToolRegistry;
use fisibot_retrieval::VectorRetriever;
use fisibot_retrieval::test_support::{CannedIndex, FailingIndex, FixedEncoder};
use std::sync::Arc;

/// Registry whose search returns two Doppler fragments.
pub fn doppler_registry() -> Arc<ToolRegistry> {
    let retriever = VectorRetriever::new(Arc::new(FixedEncoder::unit()), Arc::new(CannedIndex::doppler()));
    Arc::new(fisibot_tools::default_registry(retriever, 5))
}

/// Registry whose search backend is unreachable.
pub fn failing_registry() -> Arc<ToolRegistry> {
    let retriever = VectorRetriever::new(Arc::new(FixedEncoder::unit()), Arc::new(FailingIndex));
    Arc::new(fisibot_tools::default_registry(retriever, 5))
}
