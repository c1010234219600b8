//! AG-UI protocol endpoint.
//!
//! `POST /` accepts a `RunAgentInput` and answers with a Server-Sent Events
//! stream: `RUN_STARTED`, the assistant text as a start/content/end triple,
//! a `STATE_SNAPSHOT` of the session and finally `RUN_FINISHED`. Failures
//! surface as a single `RUN_ERROR` event after `RUN_STARTED`.

use axum::{
    Json,
    extract::State,
    http::StatusCode,
    response::sse::{Event as SseEvent, KeepAlive, Sse},
};
use fisibot_agent::{AgentError, TutorAgent};
use serde::{Deserialize, Serialize};
use std::convert::Infallible;
use std::sync::Arc;
use tokio::sync::mpsc;
use tokio_stream::StreamExt;
use tokio_stream::wrappers::ReceiverStream;
use tracing::{info, warn};

use crate::session::SharedSession;
use crate::{ErrorResponse, SharedState};

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RunAgentInput {
    #[serde(default)]
    pub thread_id: Option<String>,
    #[serde(default)]
    pub run_id: Option<String>,
    #[serde(default)]
    pub messages: Vec<AgUiMessage>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct AgUiMessage {
    #[serde(default)]
    pub id: Option<String>,
    pub role: String,
    /// Either a plain string or a list of `{type, text}` parts.
    #[serde(default)]
    pub content: Option<serde_json::Value>,
}

impl AgUiMessage {
    fn text(&self) -> Option<String> {
        match self.content.as_ref()? {
            serde_json::Value::String(s) => Some(s.clone()),
            serde_json::Value::Array(parts) => {
                let joined: Vec<&str> = parts
                    .iter()
                    .filter_map(|p| p.get("text").and_then(|t| t.as_str()))
                    .collect();
                (!joined.is_empty()).then(|| joined.join("\n"))
            }
            _ => None,
        }
    }
}

impl RunAgentInput {
    /// Text of the last user message that has any content.
    pub fn latest_user_query(&self) -> Option<String> {
        self.messages
            .iter()
            .rev()
            .filter(|m| m.role == "user")
            .filter_map(AgUiMessage::text)
            .find(|t| !t.trim().is_empty())
    }
}

#[derive(Debug, Clone, Serialize)]
#[serde(
    tag = "type",
    rename_all = "SCREAMING_SNAKE_CASE",
    rename_all_fields = "camelCase"
)]
pub enum AgUiEvent {
    RunStarted {
        thread_id: String,
        run_id: String,
    },
    TextMessageStart {
        message_id: String,
        role: String,
    },
    TextMessageContent {
        message_id: String,
        delta: String,
    },
    TextMessageEnd {
        message_id: String,
    },
    StateSnapshot {
        snapshot: serde_json::Value,
    },
    RunFinished {
        thread_id: String,
        run_id: String,
    },
    RunError {
        message: String,
        #[serde(skip_serializing_if = "Option::is_none")]
        code: Option<String>,
    },
}

fn to_sse(event: &AgUiEvent) -> SseEvent {
    SseEvent::default().data(serde_json::to_string(event).unwrap_or_default())
}

/// `POST /`: run one tutor turn and stream AG-UI events.
pub async fn run_handler(
    State(state): State<SharedState>,
    Json(input): Json<RunAgentInput>,
) -> Result<Sse<impl futures::Stream<Item = Result<SseEvent, Infallible>>>, (StatusCode, Json<ErrorResponse>)>
{
    let Some(query) = input.latest_user_query() else {
        return Err((
            StatusCode::BAD_REQUEST,
            Json(ErrorResponse {
                error: "No user message in input".into(),
            }),
        ));
    };

    let thread_id = input
        .thread_id
        .filter(|t| !t.is_empty())
        .unwrap_or_else(|| uuid::Uuid::new_v4().to_string());
    let run_id = input
        .run_id
        .filter(|r| !r.is_empty())
        .unwrap_or_else(|| uuid::Uuid::new_v4().to_string());

    info!(thread_id = %thread_id, run_id = %run_id, "AG-UI run");

    let session = state.sessions.get_or_create(&thread_id).await;
    let (tx, rx) = mpsc::channel(16);
    tokio::spawn(drive_run(
        state.agent.clone(),
        session,
        query,
        thread_id,
        run_id,
        tx,
    ));

    let stream = ReceiverStream::new(rx).map(|event| Ok(to_sse(&event)));
    Ok(Sse::new(stream).keep_alive(KeepAlive::default()))
}

/// Run the turn to completion and push its events.
///
/// A client that disconnects mid-run does not cancel the turn, so the
/// session log stays consistent with what the model answered.
async fn drive_run(
    agent: Arc<TutorAgent>,
    session: SharedSession,
    query: String,
    thread_id: String,
    run_id: String,
    tx: mpsc::Sender<AgUiEvent>,
) {
    let emit = |event: AgUiEvent| {
        let tx = tx.clone();
        async move {
            if tx.send(event).await.is_err() {
                warn!("AG-UI client went away before the run finished");
            }
        }
    };

    emit(AgUiEvent::RunStarted {
        thread_id: thread_id.clone(),
        run_id: run_id.clone(),
    })
    .await;

    let mut state = session.lock().await;
    let outcome = match agent.run_turn(&mut state, &query).await {
        Ok(outcome) => outcome,
        Err(e) => {
            warn!(thread_id = %thread_id, error = %e, "AG-UI run failed");
            emit(AgUiEvent::RunError {
                message: e.to_string(),
                code: Some(error_code(&e).into()),
            })
            .await;
            return;
        }
    };

    let message_id = uuid::Uuid::new_v4().to_string();
    emit(AgUiEvent::TextMessageStart {
        message_id: message_id.clone(),
        role: "assistant".into(),
    })
    .await;
    emit(AgUiEvent::TextMessageContent {
        message_id: message_id.clone(),
        delta: outcome.answer.clone(),
    })
    .await;
    emit(AgUiEvent::TextMessageEnd { message_id }).await;

    emit(AgUiEvent::StateSnapshot {
        snapshot: serde_json::json!({
            "total_interacciones": state.history().len(),
            "ultimo_tema": state.last_topic,
            "fragmentos": outcome.fragments.len(),
            "herramientas": outcome.tool_calls,
        }),
    })
    .await;
    drop(state);

    emit(AgUiEvent::RunFinished { thread_id, run_id }).await;
}

fn error_code(error: &AgentError) -> &'static str {
    match error {
        AgentError::Provider(_) => "model_error",
        AgentError::EmptyQuery => "empty_query",
        AgentError::InvalidTransition { .. } => "internal_error",
    }
}
