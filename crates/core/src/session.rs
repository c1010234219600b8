//! Per-conversation session state.
//!
//! Holds the interaction log, the last classified topic and the most recent
//! retrieved-context blob. Lives in process memory only.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// How many trailing interactions the prompt builders read back.
pub const HISTORY_WINDOW: usize = 3;

/// One completed turn. Immutable once appended.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct InteractionRecord {
    #[serde(rename = "consulta")]
    pub query: String,

    #[serde(rename = "respuesta")]
    pub response: String,

    #[serde(rename = "tema", default)]
    pub topic: Option<String>,

    pub timestamp: DateTime<Utc>,
}

/// Conversation memory for a single session.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SessionState {
    #[serde(rename = "historial")]
    history: Vec<InteractionRecord>,

    #[serde(rename = "ultimo_tema")]
    pub last_topic: Option<String>,

    #[serde(rename = "contexto_documentos")]
    pub retrieved_context: Option<String>,

    pub created_at: DateTime<Utc>,
    pub last_active: DateTime<Utc>,
}

impl SessionState {
    pub fn new() -> Self {
        let now = Utc::now();
        Self {
            history: Vec::new(),
            last_topic: None,
            retrieved_context: None,
            created_at: now,
            last_active: now,
        }
    }

    /// Append a completed turn to the log. Every call appends exactly one
    /// record, whatever the text.
    ///
    /// `last_topic` is only overwritten when a non-empty topic is given.
    pub fn record_interaction(
        &mut self,
        query: impl Into<String>,
        response: impl Into<String>,
        topic: Option<String>,
    ) {
        let query = query.into();
        let response = response.into();
        let topic = topic.filter(|t| !t.trim().is_empty());
        if let Some(t) = &topic {
            self.last_topic = Some(t.clone());
        }

        self.history.push(InteractionRecord {
            query,
            response,
            topic,
            timestamp: Utc::now(),
        });
        self.touch();
    }

    /// Replace the retrieved-context blob. An empty blob clears it.
    pub fn set_retrieved_context(&mut self, blob: String) {
        self.retrieved_context = if blob.is_empty() { None } else { Some(blob) };
    }

    /// The full log in insertion order.
    pub fn history(&self) -> &[InteractionRecord] {
        &self.history
    }

    /// The last `HISTORY_WINDOW` records, oldest first.
    pub fn recent_history(&self) -> &[InteractionRecord] {
        let start = self.history.len().saturating_sub(HISTORY_WINDOW);
        &self.history[start..]
    }

    pub fn touch(&mut self) {
        self.last_active = Utc::now();
    }

    /// Whether the session has been idle for longer than `timeout`.
    pub fn is_expired(&self, now: DateTime<Utc>, timeout: chrono::Duration) -> bool {
        now - self.last_active > timeout
    }
}

impl Default for SessionState {
    fn default() -> Self {
        Self::new()
    }
}
