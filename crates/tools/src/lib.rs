//! Model-callable tools for the physics tutor.
//!
//! - `clasificar_consulta`: builds a syllabus classification prompt
//! - `buscar_documentos`: vector search over the course documents
//! - `guardar_interaccion`: appends a turn to the interaction log
//!
//! Every tool reports failures as a `{status: "error", message}` result
//! rather than an `Err`, so a failing tool never ends a turn.

pub mod classifier;
pub mod classify_query;
pub mod save_interaction;
pub mod search_documents;

pub use classifier::{ClassificationPrompt, ClassifyError, classify_query};
pub use classify_query::ClassifyQueryTool;
pub use save_interaction::SaveInteractionTool;
pub use search_documents::SearchDocumentsTool;

use fisibot_core::tool::ToolRegistry;
use fisibot_retrieval::VectorRetriever;

pub const CLASSIFY_QUERY: &str = "clasificar_consulta";
pub const SEARCH_DOCUMENTS: &str = "buscar_documentos";
pub const SAVE_INTERACTION: &str = "guardar_interaccion";

/// Registry with the three tutor tools.
pub fn default_registry(retriever: VectorRetriever, top_k: usize) -> ToolRegistry {
    let mut registry = ToolRegistry::new();
    registry.register(Box::new(ClassifyQueryTool));
    registry.register(Box::new(SearchDocumentsTool::new(retriever, top_k)));
    registry.register(Box::new(SaveInteractionTool));
    registry
}

#[cfg(test)]
mod tests {
    use super::*;
    use fisibot_retrieval::test_support::{FailingIndex, FixedEncoder};
    use std::sync::Arc;

    #[test]
    fn default_registry_has_three_tools() {
        let retriever = VectorRetriever::new(Arc::new(FixedEncoder::unit()), Arc::new(FailingIndex));
        let registry = default_registry(retriever, 5);
        assert_eq!(
            registry.names(),
            vec!["buscar_documentos", "clasificar_consulta", "guardar_interaccion"]
        );
        for def in registry.definitions() {
            assert_eq!(def.parameters["type"], "object");
            assert!(def.parameters.to_string().find("\"default\"").is_none());
        }
    }
}
