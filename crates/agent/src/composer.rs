//! System preamble built from session state before every model call.

use fisibot_core::{SYLLABUS, SessionState};
use fisibot_tools::classifier::render_history;

/// Characters of each past response quoted back into the preamble.
pub const RESPONSE_EXCERPT_CHARS: usize = 300;

const ROLE_LINE: &str = "Eres un profesor experto en Física I de la UBA.";
const NO_HISTORY: &str = "No hay conversación previa.";
const NO_TOPIC: &str = "Ninguno";
const NO_DOCUMENTS: &str = "No hay documentos cargados aún.";

/// Syllabus, recent conversation, last topic and retrieved fragments, in that
/// order, closed by a `---` separator.
pub fn compose_preamble(session: &SessionState) -> String {
    let history = render_history(session.recent_history(), RESPONSE_EXCERPT_CHARS);
    let history = if history.is_empty() { NO_HISTORY } else { history.as_str() };

    let topic = session
        .last_topic
        .as_deref()
        .filter(|t| !t.is_empty())
        .unwrap_or(NO_TOPIC);

    let documents = session
        .retrieved_context
        .as_deref()
        .filter(|c| !c.is_empty())
        .unwrap_or(NO_DOCUMENTS);

    format!(
        "{ROLE_LINE}\n\n\
         TEMARIO DEL CURSO:\n{SYLLABUS}\n\n\
         CONTEXTO DE CONVERSACIÓN PREVIA:\n{history}\n\n\
         ÚLTIMO TEMA DISCUTIDO: {topic}\n\n\
         FRAGMENTOS DE DOCUMENTOS RELEVANTES:\n{documents}\n\n\
         ---\n\n"
    )
}

/// Prepend `preamble` to an existing system instruction. The existing text is
/// kept verbatim after the preamble.
pub fn inject_preamble(existing: Option<&str>, preamble: &str) -> String {
    let mut instruction = String::with_capacity(preamble.len() + existing.map_or(0, str::len));
    instruction.push_str(preamble);
    instruction.push_str(existing.unwrap_or_default());
    instruction
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_session_uses_placeholders() {
        let preamble = compose_preamble(&SessionState::new());
        assert!(preamble.starts_with("Eres un profesor experto en Física I de la UBA."));
        assert!(preamble.contains("No hay conversación previa."));
        assert!(preamble.contains("ÚLTIMO TEMA DISCUTIDO: Ninguno"));
        assert!(preamble.contains("No hay documentos cargados aún."));
        assert!(preamble.ends_with("---\n\n"));
    }

    #[test]
    fn sections_in_order() {
        let mut session = SessionState::new();
        session.record_interaction("¿Qué es la fricción?", "Es una fuerza...", Some("Dinámica".into()));
        session.set_retrieved_context("--- Fragmento 1 (PDF: a.pdf, similitud: 0.9) ---\ntexto".into());
        let p = compose_preamble(&session);

        let syllabus = p.find("TEMARIO DEL CURSO:").unwrap();
        let history = p.find("Usuario: ¿Qué es la fricción?\nAsistente: Es una fuerza......").unwrap();
        let topic = p.find("ÚLTIMO TEMA DISCUTIDO: Dinámica").unwrap();
        let docs = p.find("--- Fragmento 1 (PDF: a.pdf").unwrap();
        assert!(syllabus < history && history < topic && topic < docs);
        assert!(p.contains(SYLLABUS));
    }

    #[test]
    fn responses_truncated_to_300_chars() {
        let mut session = SessionState::new();
        session.record_interaction("q", "x".repeat(400), None);
        let p = compose_preamble(&session);
        assert!(p.contains(&format!("Asistente: {}...", "x".repeat(300))));
        assert!(!p.contains(&"x".repeat(301)));
    }

    #[test]
    fn only_last_three_records() {
        let mut session = SessionState::new();
        for i in 0..4 {
            session.record_interaction(format!("pregunta {i}"), "r", None);
        }
        let p = compose_preamble(&session);
        assert!(!p.contains("pregunta 0"));
        assert!(p.contains("pregunta 3"));
    }

    #[test]
    fn existing_instruction_is_kept() {
        let out = inject_preamble(Some("Instrucción base."), "PREÁMBULO\n---\n\n");
        assert_eq!(out, "PREÁMBULO\n---\n\nInstrucción base.");
        assert_eq!(inject_preamble(None, "P"), "P");
    }
}
