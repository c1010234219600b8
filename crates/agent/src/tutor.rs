//! One tutoring turn, start to finish.
//!
//! 1. **Classifying**: run `clasificar_consulta` through the registry
//! 2. **Retrieving**: run `buscar_documentos` with the raw query
//! 3. **Composing**: preamble from session state + base instruction
//! 4. **ModelCall**: call the model; execute any tools it requests and loop
//! 5. **Finalizing**: stop on the first assistant message with text, then
//!    record the exchange if the model did not record it itself
//!
//! The pre-executed calls are placed in the transcript as ordinary
//! tool request / tool result pairs, so the model sees what already ran.

use fisibot_config::AppConfig;
use fisibot_core::message::{Message, MessageToolCall};
use fisibot_core::provider::{Provider, ProviderRequest, Usage};
use fisibot_core::retrieval::Fragment;
use fisibot_core::tool::{ToolCall, ToolRegistry, ToolResult};
use fisibot_core::SessionState;
use fisibot_tools::{CLASSIFY_QUERY, SAVE_INTERACTION, SEARCH_DOCUMENTS};
use serde::Serialize;
use std::sync::Arc;
use tracing::{debug, info, warn};

use crate::composer::{compose_preamble, inject_preamble};
use crate::error::AgentError;
use crate::finalizer::{TurnSignal, finalize};
use crate::instruction::{BASE_INSTRUCTION, UNFINISHED_ANSWER};
use crate::phase::TurnPhase;

/// The physics tutor.
pub struct TutorAgent {
    provider: Arc<dyn Provider>,
    tools: Arc<ToolRegistry>,
    model: String,
    temperature: f32,
    max_tokens: Option<u32>,

    /// Maximum model calls per turn
    max_iterations: u32,

    /// Fragments requested by the pre-executed search
    top_k: usize,

    /// Record the exchange when the model never calls `guardar_interaccion`
    auto_record: bool,

    instruction: String,
}

/// Result of a completed turn.
#[derive(Debug, Clone, Serialize)]
pub struct TurnOutcome {
    pub answer: String,

    /// Fragments from the last `buscar_documentos` call of the turn
    pub fragments: Vec<Fragment>,

    /// Names of every tool executed, in order
    pub tool_calls: Vec<String>,

    /// Model calls made
    pub iterations: u32,

    pub usage: Usage,

    /// False when the model never produced text and `answer` is a fallback
    pub finished: bool,
}

/// Bookkeeping for tools executed during one turn.
#[derive(Default)]
struct TurnLedger {
    tool_calls: Vec<String>,
    fragments: Vec<Fragment>,
    saved_by_model: bool,
}

impl TutorAgent {
    pub fn new(provider: Arc<dyn Provider>, tools: Arc<ToolRegistry>, model: impl Into<String>) -> Self {
        Self {
            provider,
            tools,
            model: model.into(),
            temperature: 0.7,
            max_tokens: None,
            max_iterations: 8,
            top_k: 5,
            auto_record: true,
            instruction: BASE_INSTRUCTION.to_string(),
        }
    }

    /// Build from the application configuration.
    pub fn from_config(provider: Arc<dyn Provider>, tools: Arc<ToolRegistry>, config: &AppConfig) -> Self {
        Self::new(provider, tools, &config.model.name)
            .with_temperature(config.model.temperature)
            .with_max_tokens(config.model.max_tokens)
            .with_max_iterations(config.agent.max_iterations)
            .with_top_k(config.retrieval.top_k)
            .with_auto_record(config.agent.auto_record)
    }

    pub fn with_temperature(mut self, temperature: f32) -> Self {
        self.temperature = temperature;
        self
    }

    pub fn with_max_tokens(mut self, max_tokens: u32) -> Self {
        self.max_tokens = Some(max_tokens);
        self
    }

    pub fn with_max_iterations(mut self, max: u32) -> Self {
        self.max_iterations = max.max(1);
        self
    }

    pub fn with_top_k(mut self, top_k: usize) -> Self {
        self.top_k = top_k.max(1);
        self
    }

    pub fn with_auto_record(mut self, enabled: bool) -> Self {
        self.auto_record = enabled;
        self
    }

    /// Replace the base instruction the preamble is prepended to.
    pub fn with_instruction(mut self, instruction: impl Into<String>) -> Self {
        self.instruction = instruction.into();
        self
    }

    pub fn model(&self) -> &str {
        &self.model
    }

    pub fn provider(&self) -> &dyn Provider {
        self.provider.as_ref()
    }

    pub fn tool_names(&self) -> Vec<&str> {
        self.tools.names()
    }

    /// Run one turn against `session`.
    ///
    /// Only an empty query or a failing model call is an error; tool and
    /// retrieval failures are handed to the model as tool results.
    pub async fn run_turn(&self, session: &mut SessionState, query: &str) -> Result<TurnOutcome, AgentError> {
        let query = query.trim();
        if query.is_empty() {
            return Err(AgentError::EmptyQuery);
        }

        info!(model = %self.model, history = session.history().len(), "Starting turn");

        let mut phase = TurnPhase::Idle;
        let mut ledger = TurnLedger::default();
        let mut transcript = vec![Message::user(query)];

        phase.advance(TurnPhase::Classifying)?;
        self.pre_execute(
            session,
            &mut transcript,
            &mut ledger,
            CLASSIFY_QUERY,
            serde_json::json!({ "consulta": query }),
        )
        .await;

        phase.advance(TurnPhase::Retrieving)?;
        self.pre_execute(
            session,
            &mut transcript,
            &mut ledger,
            SEARCH_DOCUMENTS,
            serde_json::json!({ "consulta_busqueda": query, "top_k": self.top_k }),
        )
        .await;

        phase.advance(TurnPhase::Composing)?;
        let tool_definitions = self.tools.definitions();
        let mut usage = Usage::default();
        let mut iterations = 0;
        let mut answer = None;

        phase.advance(TurnPhase::ModelCall)?;
        while iterations < self.max_iterations {
            iterations += 1;

            // Recomposed every call: tools may have changed the session.
            let system_instruction = inject_preamble(Some(&self.instruction), &compose_preamble(session));

            let request = ProviderRequest {
                model: self.model.clone(),
                system_instruction: Some(system_instruction),
                messages: transcript.clone(),
                temperature: self.temperature,
                max_tokens: self.max_tokens,
                tools: tool_definitions.clone(),
            };

            debug!(phase = %phase, iteration = iterations, messages = transcript.len(), "Calling model");
            let response = self.provider.complete(request).await?;
            if let Some(u) = &response.usage {
                usage.add(u);
            }

            let message = response.message;
            if finalize(&message) == TurnSignal::Finished {
                if !message.tool_calls.is_empty() {
                    debug!(skipped = message.tool_calls.len(), "Answer carried tool calls; not executed");
                }
                answer = Some(message.content.clone());
                transcript.push(message);
                break;
            }

            if message.tool_calls.is_empty() {
                warn!(iteration = iterations, "Model returned neither text nor tool calls");
                break;
            }

            let calls = message.tool_calls.clone();
            transcript.push(message);
            for call in &calls {
                self.execute_call(session, &mut transcript, &mut ledger, call).await;
            }
            phase.advance(TurnPhase::ModelCall)?;
        }

        phase.advance(TurnPhase::Finalizing)?;
        let finished = answer.is_some();
        if !finished {
            warn!(iterations, max = self.max_iterations, "Turn ended without an answer");
        }
        let answer = answer.unwrap_or_else(|| UNFINISHED_ANSWER.to_string());

        if finished && self.auto_record && !ledger.saved_by_model {
            session.record_interaction(query, answer.as_str(), None);
        }
        session.touch();
        phase.advance(TurnPhase::Idle)?;

        info!(
            iterations,
            tools = ledger.tool_calls.len(),
            fragments = ledger.fragments.len(),
            tokens = usage.total_tokens,
            finished,
            "Turn complete"
        );

        Ok(TurnOutcome {
            answer,
            fragments: ledger.fragments,
            tool_calls: ledger.tool_calls,
            iterations,
            usage,
            finished,
        })
    }

    /// Run a tool on the model's behalf and show it in the transcript as if
    /// the model had requested it.
    async fn pre_execute(
        &self,
        session: &mut SessionState,
        transcript: &mut Vec<Message>,
        ledger: &mut TurnLedger,
        name: &str,
        arguments: serde_json::Value,
    ) {
        let call = MessageToolCall {
            id: format!("turn_{name}"),
            name: name.to_string(),
            arguments: arguments.to_string(),
        };
        transcript.push(Message::tool_request(vec![call.clone()]));
        self.execute_call(session, transcript, ledger, &call).await;
    }

    async fn execute_call(
        &self,
        session: &mut SessionState,
        transcript: &mut Vec<Message>,
        ledger: &mut TurnLedger,
        call: &MessageToolCall,
    ) {
        let tool_call = ToolCall {
            id: call.id.clone(),
            name: call.name.clone(),
            arguments: serde_json::from_str(&call.arguments).unwrap_or_else(|_| serde_json::json!({})),
        };

        let result = match self.tools.execute(session, &tool_call).await {
            Ok(result) => result,
            Err(e) => {
                warn!(tool = %call.name, error = %e, "Tool execution failed");
                ToolResult::error(e.to_string())
            }
        };

        debug!(tool = %call.name, success = result.success, "Tool executed");

        if result.success {
            match call.name.as_str() {
                SEARCH_DOCUMENTS => {
                    ledger.fragments = result
                        .data
                        .as_ref()
                        .and_then(|d| serde_json::from_value(d["documentos"].clone()).ok())
                        .unwrap_or_default();
                }
                SAVE_INTERACTION => ledger.saved_by_model = true,
                _ => {}
            }
        }

        ledger.tool_calls.push(call.name.clone());
        transcript.push(Message::tool_result(&call.id, &result.output));
    }
}
