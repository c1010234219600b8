//! Classification prompt builder.
//!
//! Pairs the syllabus and the recent conversation with a new query. The
//! classification itself is left to the language model; nothing here calls
//! out or parses an answer.

use fisibot_core::SYLLABUS;
use fisibot_core::session::{HISTORY_WINDOW, InteractionRecord};
use serde::{Deserialize, Serialize};

/// Characters of each past response quoted back into the prompt.
pub const RESPONSE_EXCERPT_CHARS: usize = 200;

const NO_HISTORY: &str = "No hay conversación previa";

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ClassifyError {
    #[error("la consulta está vacía")]
    EmptyQuery,
}

/// A ready-to-send classification prompt.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ClassificationPrompt {
    #[serde(rename = "clasificacion")]
    pub prompt: String,

    #[serde(rename = "consulta_original")]
    pub query: String,
}

/// Build the classification prompt for `query` given the session history.
///
/// Only the last [`HISTORY_WINDOW`] records are used.
pub fn classify_query(
    query: &str,
    history: &[InteractionRecord],
) -> Result<ClassificationPrompt, ClassifyError> {
    if query.trim().is_empty() {
        return Err(ClassifyError::EmptyQuery);
    }

    let start = history.len().saturating_sub(HISTORY_WINDOW);
    let context = render_history(&history[start..], RESPONSE_EXCERPT_CHARS);
    let context = if context.is_empty() { NO_HISTORY.to_string() } else { context };

    let prompt = format!(
        "\nTEMARIO:\n{SYLLABUS}\n\n\
         CONTEXTO DE CONVERSACIÓN PREVIA:\n{context}\n\n\
         CONSULTA DEL USUARIO:\n{query}\n\n\
         Clasifica esta consulta según el temario. Responde SOLO con:\n\
         TEMA: [número y título]\n\
         SUBTEMAS: [lista]\n\
         KEYWORDS: [palabras clave separadas por comas]\n"
    );

    Ok(ClassificationPrompt {
        prompt,
        query: query.to_string(),
    })
}

/// `Usuario: q\nAsistente: r...` per record, responses cut to `excerpt` chars.
pub fn render_history(records: &[InteractionRecord], excerpt: usize) -> String {
    records
        .iter()
        .map(|r| {
            let response: String = r.response.chars().take(excerpt).collect();
            format!("Usuario: {}\nAsistente: {}...", r.query, response)
        })
        .collect::<Vec<_>>()
        .join("\n")
}

#[cfg(test)]
mod tests {
    use super::*;
    use fisibot_core::SessionState;

    fn session_with(n: usize) -> SessionState {
        let mut state = SessionState::new();
        for i in 0..n {
            state
                .record_interaction(format!("pregunta {i}"), format!("respuesta {i}"), None);
        }
        state
    }

    #[test]
    fn empty_history_uses_placeholder() {
        let prompt = classify_query("¿Qué es el efecto Doppler?", &[]).unwrap();
        assert!(prompt.prompt.contains("No hay conversación previa"));
        assert!(prompt.prompt.contains(SYLLABUS));
        assert!(prompt.prompt.contains("CONSULTA DEL USUARIO:\n¿Qué es el efecto Doppler?"));
        assert_eq!(prompt.query, "¿Qué es el efecto Doppler?");
    }

    #[test]
    fn sections_in_order() {
        let prompt = classify_query("q", &[]).unwrap().prompt;
        let temario = prompt.find("TEMARIO:").unwrap();
        let contexto = prompt.find("CONTEXTO DE CONVERSACIÓN PREVIA:").unwrap();
        let consulta = prompt.find("CONSULTA DEL USUARIO:").unwrap();
        let tema = prompt.find("TEMA: [número y título]").unwrap();
        assert!(temario < contexto && contexto < consulta && consulta < tema);
        assert!(prompt.contains("KEYWORDS:"));
    }

    #[test]
    fn uses_only_last_three_records() {
        let state = session_with(5);
        let prompt = classify_query("q", state.history()).unwrap().prompt;
        assert!(!prompt.contains("pregunta 0"));
        assert!(!prompt.contains("pregunta 1"));
        assert!(prompt.contains("Usuario: pregunta 2\nAsistente: respuesta 2..."));
        assert!(prompt.contains("pregunta 4"));
        assert!(!prompt.contains("No hay conversación previa"));
    }

    #[test]
    fn long_responses_truncated_to_200_chars() {
        let mut state = SessionState::new();
        let long = "á".repeat(250);
        state.record_interaction("q", long, None);
        let prompt = classify_query("otra", state.history()).unwrap().prompt;
        let expected = format!("Asistente: {}...", "á".repeat(200));
        assert!(prompt.contains(&expected));
        assert!(!prompt.contains(&"á".repeat(201)));
    }

    #[test]
    fn empty_query_rejected() {
        assert_eq!(classify_query("   ", &[]).unwrap_err(), ClassifyError::EmptyQuery);
    }
}
