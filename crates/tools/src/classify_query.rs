//! `clasificar_consulta`: builds the syllabus classification prompt.

use async_trait::async_trait;
use fisibot_core::SessionState;
use fisibot_core::error::ToolError;
use fisibot_core::tool::{Tool, ToolResult};

use crate::classifier::classify_query;

pub struct ClassifyQueryTool;

#[async_trait]
impl Tool for ClassifyQueryTool {
    fn name(&self) -> &str {
        crate::CLASSIFY_QUERY
    }

    fn description(&self) -> &str {
        "Clasifica una consulta del usuario según el temario de Física I. \
         Devuelve un prompt con el temario, la conversación previa y la consulta."
    }

    fn parameters_schema(&self) -> serde_json::Value {
        serde_json::json!({
            "type": "object",
            "properties": {
                "consulta": {
                    "type": "string",
                    "description": "La consulta del usuario a clasificar"
                }
            },
            "required": ["consulta"]
        })
    }

    async fn execute(
        &self,
        session: &mut SessionState,
        arguments: serde_json::Value,
    ) -> Result<ToolResult, ToolError> {
        let query = arguments["consulta"]
            .as_str()
            .ok_or_else(|| ToolError::InvalidArguments("Missing 'consulta' argument".into()))?;

        match classify_query(query, session.recent_history()) {
            Ok(prompt) => Ok(ToolResult::from_json(serde_json::json!({
                "status": "success",
                "clasificacion": prompt.prompt,
                "consulta_original": prompt.query,
            }))),
            Err(e) => Ok(ToolResult::error(format!("Error clasificando consulta: {e}"))),
        }
    }
}
