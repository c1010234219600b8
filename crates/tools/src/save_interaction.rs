//! `guardar_interaccion`: appends a turn to the session's interaction log.

use async_trait::async_trait;
use fisibot_core::SessionState;
use fisibot_core::error::ToolError;
use fisibot_core::tool::{Tool, ToolResult};

pub struct SaveInteractionTool;

#[async_trait]
impl Tool for SaveInteractionTool {
    fn name(&self) -> &str {
        crate::SAVE_INTERACTION
    }

    fn description(&self) -> &str {
        "Guarda una interacción (consulta, respuesta y tema opcional) en el historial de conversación."
    }

    fn parameters_schema(&self) -> serde_json::Value {
        serde_json::json!({
            "type": "object",
            "properties": {
                "consulta": {
                    "type": "string",
                    "description": "Consulta del usuario"
                },
                "respuesta": {
                    "type": "string",
                    "description": "Respuesta del asistente"
                },
                "tema": {
                    "type": "string",
                    "description": "Tema clasificado (opcional)"
                }
            },
            "required": ["consulta", "respuesta"]
        })
    }

    async fn execute(
        &self,
        session: &mut SessionState,
        arguments: serde_json::Value,
    ) -> Result<ToolResult, ToolError> {
        let (Some(query), Some(response)) = (
            arguments["consulta"].as_str(),
            arguments["respuesta"].as_str(),
        ) else {
            return Ok(ToolResult::error(
                "Error guardando interacción: faltan 'consulta' o 'respuesta'",
            ));
        };
        let topic = arguments["tema"].as_str().map(str::to_string);

        // Empty text is still a turn worth keeping.
        session.record_interaction(query, response, topic);
        Ok(ToolResult::from_json(serde_json::json!({
            "status": "success",
            "message": "Interacción guardada",
        })))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn appends_in_order_and_tracks_topic() {
        let mut session = SessionState::new();
        for (i, tema) in [None, Some("Ondas"), None].into_iter().enumerate() {
            let mut args = serde_json::json!({"consulta": format!("q{i}"), "respuesta": format!("r{i}")});
            if let Some(t) = tema {
                args["tema"] = t.into();
            }
            let result = SaveInteractionTool.execute(&mut session, args).await.unwrap();
            assert!(result.success);
        }
        assert_eq!(session.history().len(), 3);
        assert_eq!(session.history()[2].query, "q2");
        assert_eq!(session.last_topic.as_deref(), Some("Ondas"));
    }

    #[tokio::test]
    async fn empty_response_is_recorded() {
        let mut session = SessionState::new();
        let calls = [
            serde_json::json!({"consulta": "q0", "respuesta": "r0"}),
            serde_json::json!({"consulta": "q1", "respuesta": ""}),
            serde_json::json!({"consulta": "q2", "respuesta": "r2"}),
        ];
        for args in calls {
            let result = SaveInteractionTool.execute(&mut session, args).await.unwrap();
            assert!(result.success);
        }
        assert_eq!(session.history().len(), 3);
        assert_eq!(session.history()[1].response, "");
    }

    #[tokio::test]
    async fn missing_response_is_error_result() {
        let mut session = SessionState::new();
        let result = SaveInteractionTool
            .execute(&mut session, serde_json::json!({"consulta": "q"}))
            .await
            .unwrap();
        assert!(!result.success);
        assert!(result.output.contains("Error guardando interacción"));
        assert!(session.history().is_empty());
    }
}
