//! HTTP gateway for the physics tutor.
//!
//! Routes:
//!
//! - `POST /`       AG-UI run, answered as an SSE event stream
//! - `POST /chat`   plain JSON turn
//! - `GET  /health` liveness and model name
//! - `GET  /info`   static capability description

pub mod agui;
pub mod session;

use axum::extract::DefaultBodyLimit;
use axum::{
    Router,
    extract::State,
    http::{Method, StatusCode, header},
    response::Json,
    routing::{get, post},
};
use fisibot_agent::{AGENT_NAME, AgentError, TutorAgent};
use fisibot_config::AppConfig;
use fisibot_core::Fragment;
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use std::time::Duration;
use tower_http::cors::{Any, CorsLayer};
use tracing::{info, warn};

pub use session::{SessionStore, SharedSession};

/// Request bodies above this size are rejected.
const MAX_BODY_BYTES: usize = 1024 * 1024;

/// How often idle sessions are swept.
const SWEEP_INTERVAL: Duration = Duration::from_secs(300);

/// Shared application state for the gateway.
pub struct GatewayState {
    pub agent: Arc<TutorAgent>,
    pub sessions: SessionStore,
    /// Name of the backing vector database, shown in `/info`.
    pub vector_db: String,
}

impl GatewayState {
    pub fn new(agent: Arc<TutorAgent>, sessions: SessionStore) -> Self {
        Self {
            agent,
            sessions,
            vector_db: "Qdrant".into(),
        }
    }
}

pub type SharedState = Arc<GatewayState>;

#[derive(Debug, Serialize)]
pub struct ErrorResponse {
    pub error: String,
}

/// Build the router with every gateway route.
pub fn build_router(state: SharedState) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods([Method::GET, Method::POST])
        .allow_headers([header::CONTENT_TYPE, header::ACCEPT]);

    Router::new()
        .route("/", post(agui::run_handler))
        .route("/chat", post(chat_handler))
        .route("/health", get(health_handler))
        .route("/info", get(info_handler))
        .layer(DefaultBodyLimit::max(MAX_BODY_BYTES))
        .layer(cors)
        .layer(tower_http::trace::TraceLayer::new_for_http())
        .with_state(state)
}

/// Serve the gateway until Ctrl-C.
pub async fn start(config: &AppConfig, agent: Arc<TutorAgent>) -> Result<(), Box<dyn std::error::Error>> {
    let addr = format!("{}:{}", config.gateway.host, config.gateway.port);
    let state = Arc::new(GatewayState::new(
        agent,
        SessionStore::from_secs(config.gateway.session_timeout_secs),
    ));

    let sweeper = tokio::spawn(sweep_sessions(state.clone()));
    let app = build_router(state);

    info!(addr = %addr, "Gateway listening");
    let listener = tokio::net::TcpListener::bind(&addr).await?;
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    sweeper.abort();
    info!("Gateway stopped");
    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        warn!(error = %e, "Could not listen for Ctrl-C");
        std::future::pending::<()>().await;
    }
    info!("Shutdown requested");
}

async fn sweep_sessions(state: SharedState) {
    let mut ticker = tokio::time::interval(SWEEP_INTERVAL);
    loop {
        ticker.tick().await;
        let purged = state.sessions.purge_expired().await;
        if purged > 0 {
            info!(purged, "Expired sessions removed");
        }
    }
}

// ── Handlers ──────────────────────────────────────────────────────────────

#[derive(Debug, Deserialize)]
pub struct ChatRequest {
    #[serde(default)]
    pub session_id: Option<String>,
    pub message: String,
}

#[derive(Debug, Serialize)]
pub struct ChatResponse {
    pub session_id: String,
    pub response: String,
    pub fragments: Vec<Fragment>,
    pub tool_calls: Vec<String>,
    pub iterations: u32,
}

/// `POST /chat`: run one turn and answer with JSON.
async fn chat_handler(
    State(state): State<SharedState>,
    Json(payload): Json<ChatRequest>,
) -> Result<Json<ChatResponse>, (StatusCode, Json<ErrorResponse>)> {
    let session_id = payload
        .session_id
        .filter(|s| !s.is_empty())
        .unwrap_or_else(|| uuid::Uuid::new_v4().to_string());
    info!(session_id = %session_id, "Chat request");

    let session = state.sessions.get_or_create(&session_id).await;
    let mut session = session.lock().await;
    let outcome = state
        .agent
        .run_turn(&mut session, &payload.message)
        .await
        .map_err(|e| {
            let status = match e {
                AgentError::EmptyQuery => StatusCode::BAD_REQUEST,
                AgentError::Provider(_) => StatusCode::BAD_GATEWAY,
                AgentError::InvalidTransition { .. } => StatusCode::INTERNAL_SERVER_ERROR,
            };
            warn!(session_id = %session_id, error = %e, "Chat turn failed");
            (status, Json(ErrorResponse { error: e.to_string() }))
        })?;

    Ok(Json(ChatResponse {
        session_id,
        response: outcome.answer,
        fragments: outcome.fragments,
        tool_calls: outcome.tool_calls,
        iterations: outcome.iterations,
    }))
}

async fn health_handler(State(state): State<SharedState>) -> Json<serde_json::Value> {
    Json(serde_json::json!({
        "status": "healthy",
        "agent": AGENT_NAME,
        "model": state.agent.model(),
    }))
}

async fn info_handler(State(state): State<SharedState>) -> Json<serde_json::Value> {
    Json(serde_json::json!({
        "name": "Asistente de Física I - UBA",
        "description": "Sistema RAG con agentes ADK",
        "model": state.agent.model(),
        "vector_db": state.vector_db,
        "features": [
            "Clasificación automática de consultas",
            format!("Búsqueda en base de datos vectorial ({})", state.vector_db),
            "Respuestas basadas en documentos del curso",
            "Memoria de conversación",
            "Explicaciones didácticas"
        ],
        "tools": [
            "clasificar_consulta - Identifica temas",
            "buscar_documentos - Busca información relevante",
            "guardar_interaccion - Registra conversación"
        ]
    }))
}
