//! `buscar_documentos`: vector search over the course documents.
//!
//! Stores the rendered fragments on the session so the next prompt can
//! include them.

use async_trait::async_trait;
use fisibot_core::SessionState;
use fisibot_core::error::ToolError;
use fisibot_core::retrieval::render_context;
use fisibot_core::tool::{Tool, ToolResult};
use fisibot_retrieval::VectorRetriever;
use tracing::debug;

/// Upper bound on `top_k` accepted from the model.
pub const MAX_TOP_K: usize = 20;

pub struct SearchDocumentsTool {
    retriever: VectorRetriever,
    default_top_k: usize,
}

impl SearchDocumentsTool {
    pub fn new(retriever: VectorRetriever, default_top_k: usize) -> Self {
        Self {
            retriever,
            default_top_k: default_top_k.clamp(1, MAX_TOP_K),
        }
    }
}

#[async_trait]
impl Tool for SearchDocumentsTool {
    fn name(&self) -> &str {
        crate::SEARCH_DOCUMENTS
    }

    fn description(&self) -> &str {
        "Busca fragmentos relevantes en los documentos del curso (base de datos vectorial)."
    }

    fn parameters_schema(&self) -> serde_json::Value {
        serde_json::json!({
            "type": "object",
            "properties": {
                "consulta_busqueda": {
                    "type": "string",
                    "description": "Consulta optimizada para búsqueda, con palabras clave relevantes"
                },
                "top_k": {
                    "type": "integer",
                    "description": format!("Número de documentos a retornar (por defecto {})", self.default_top_k)
                }
            },
            "required": ["consulta_busqueda"]
        })
    }

    async fn execute(
        &self,
        session: &mut SessionState,
        arguments: serde_json::Value,
    ) -> Result<ToolResult, ToolError> {
        let query = arguments["consulta_busqueda"].as_str().ok_or_else(|| {
            ToolError::InvalidArguments("Missing 'consulta_busqueda' argument".into())
        })?;

        let top_k = arguments["top_k"]
            .as_u64()
            .map(|k| (k as usize).clamp(1, MAX_TOP_K))
            .unwrap_or(self.default_top_k);

        let fragments = self.retriever.search(query, top_k).await;
        let context = render_context(&fragments);
        session.set_retrieved_context(context.clone());

        debug!(top_k, found = fragments.len(), "buscar_documentos");

        Ok(ToolResult::from_json(serde_json::json!({
            "status": "success",
            "total_encontrados": fragments.len(),
            "documentos": fragments,
            "contexto_formateado": context,
        })))
    }
}
