//! End-to-end tests for the tutor pipeline.
//!
//! A local axum server stands in for both the Gemini and Qdrant REST APIs,
//! so the real HTTP clients, the turn loop and the gateway are exercised
//! together.

use std::collections::VecDeque;
use std::sync::{Arc, Mutex};
use std::time::Duration;

use axum::{
    Json, Router,
    extract::{Path, State},
    http::{HeaderMap, StatusCode},
    routing::post,
};
use fisibot_agent::TutorAgent;
use fisibot_core::SessionState;
use fisibot_providers::GeminiProvider;
use fisibot_retrieval::test_support::FixedEncoder;
use fisibot_retrieval::{QdrantIndex, VectorRetriever};
use http_body_util::BodyExt;
use serde_json::{Value, json};
use tower::ServiceExt;

// ── Mock backends ────────────────────────────────────────────────────────

#[derive(Default)]
struct Backend {
    gemini_script: Mutex<VecDeque<(StatusCode, Value)>>,
    gemini_requests: Mutex<Vec<Value>>,
    qdrant_requests: Mutex<Vec<(Option<String>, Value)>>,
}

async fn gemini_handler(
    State(backend): State<Arc<Backend>>,
    Path(_model): Path<String>,
    headers: HeaderMap,
    Json(body): Json<Value>,
) -> (StatusCode, Json<Value>) {
    if headers.get("x-goog-api-key").and_then(|v| v.to_str().ok()) != Some("test-key") {
        return (StatusCode::UNAUTHORIZED, Json(json!({"error": {"message": "bad key"}})));
    }
    backend.gemini_requests.lock().unwrap().push(body);
    let next = backend.gemini_script.lock().unwrap().pop_front();
    match next {
        Some((status, body)) => (status, Json(body)),
        None => (
            StatusCode::INTERNAL_SERVER_ERROR,
            Json(json!({"error": {"message": "script exhausted"}})),
        ),
    }
}

async fn qdrant_handler(
    State(backend): State<Arc<Backend>>,
    Path(_collection): Path<String>,
    headers: HeaderMap,
    Json(body): Json<Value>,
) -> Json<Value> {
    let key = headers
        .get("api-key")
        .and_then(|v| v.to_str().ok())
        .map(str::to_string);
    backend.qdrant_requests.lock().unwrap().push((key, body));
    Json(json!({
        "result": [
            {"id": 11, "version": 1, "score": 0.91234, "payload": {
                "pdf_name": "ondas.pdf",
                "text": "El efecto Doppler es el cambio aparente de frecuencia de una onda."
            }},
            {"id": 12, "version": 1, "score": 0.8, "payload": {
                "pdf_name": "sonido.pdf",
                "text": "Una fuente que se acerca se percibe más aguda."
            }}
        ],
        "status": "ok",
        "time": 0.001
    }))
}

/// Serve the mock on an ephemeral port and return its base URL.
async fn spawn_backend(backend: Arc<Backend>) -> String {
    let app = Router::new()
        .route("/v1beta/models/{model}", post(gemini_handler))
        .route("/collections/{collection}/points/search", post(qdrant_handler))
        .with_state(backend);
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        axum::serve(listener, app).await.unwrap();
    });
    format!("http://{addr}")
}

fn gemini_text(text: &str) -> (StatusCode, Value) {
    (
        StatusCode::OK,
        json!({
            "candidates": [{
                "content": {"role": "model", "parts": [{"text": text}]},
                "finishReason": "STOP"
            }],
            "usageMetadata": {"promptTokenCount": 120, "candidatesTokenCount": 40, "totalTokenCount": 160}
        }),
    )
}

fn gemini_call(name: &str, args: Value) -> (StatusCode, Value) {
    (
        StatusCode::OK,
        json!({
            "candidates": [{
                "content": {"role": "model", "parts": [{"functionCall": {"name": name, "args": args}}]},
                "finishReason": "STOP"
            }]
        }),
    )
}

fn axis_encoder() -> Arc<FixedEncoder> {
    Arc::new(FixedEncoder(vec![0.0, 1.0, 0.0]))
}

fn build_agent(base_url: &str) -> TutorAgent {
    let provider = GeminiProvider::with_base_url("test-key", base_url).unwrap();
    let index = QdrantIndex::new(
        base_url,
        "documentos_pdf",
        Some("qdrant-key".into()),
        Duration::from_secs(5),
    )
    .unwrap();
    let retriever = VectorRetriever::new(axis_encoder(), Arc::new(index));
    let tools = Arc::new(fisibot_tools::default_registry(retriever, 5));
    TutorAgent::new(Arc::new(provider), tools, "gemini-2.5-flash")
}

// ── Scenarios ────────────────────────────────────────────────────────────

#[tokio::test]
async fn doppler_turn_runs_through_real_clients() {
    let backend = Arc::new(Backend::default());
    backend.gemini_script.lock().unwrap().extend([
        gemini_call(
            "guardar_interaccion",
            json!({
                "consulta": "¿Qué es el efecto Doppler?",
                "respuesta": "Es el cambio aparente de frecuencia.",
                "tema": "Ondas"
            }),
        ),
        gemini_text("El efecto Doppler es el cambio aparente de frecuencia de una onda."),
    ]);
    let base_url = spawn_backend(backend.clone()).await;
    let agent = build_agent(&base_url);
    let mut session = SessionState::new();

    let outcome = agent
        .run_turn(&mut session, "¿Qué es el efecto Doppler?")
        .await
        .unwrap();

    assert!(outcome.answer.contains("Doppler"));
    assert_eq!(outcome.fragments.len(), 2);
    assert_eq!(outcome.fragments[0].source, "ondas.pdf");
    assert!((outcome.fragments[0].similarity - 0.9123).abs() < 1e-9);

    // The model recorded the interaction itself, so exactly one entry.
    assert_eq!(session.history().len(), 1);
    assert_eq!(session.last_topic.as_deref(), Some("Ondas"));

    let qdrant = backend.qdrant_requests.lock().unwrap();
    assert_eq!(qdrant.len(), 1);
    assert_eq!(qdrant[0].0.as_deref(), Some("qdrant-key"));
    assert_eq!(qdrant[0].1["limit"], 5);
    assert_eq!(qdrant[0].1["with_payload"], true);
    assert_eq!(qdrant[0].1["vector"], json!([0.0, 1.0, 0.0]));

    let gemini = backend.gemini_requests.lock().unwrap();
    assert_eq!(gemini.len(), 2);
    let instruction = gemini[0]["systemInstruction"]["parts"][0]["text"].as_str().unwrap();
    assert!(instruction.contains("TEMARIO DEL CURSO:"));
    assert!(instruction.contains("FRAGMENTOS DE DOCUMENTOS RELEVANTES:"));
    assert!(instruction.contains("ondas.pdf"));
    let declared: Vec<&str> = gemini[0]["tools"][0]["functionDeclarations"]
        .as_array()
        .unwrap()
        .iter()
        .map(|d| d["name"].as_str().unwrap())
        .collect();
    assert!(declared.contains(&"buscar_documentos"));
}

#[tokio::test]
async fn history_from_first_turn_reaches_second_preamble() {
    let backend = Arc::new(Backend::default());
    backend.gemini_script.lock().unwrap().extend([
        gemini_text("La velocidad es la derivada de la posición."),
        gemini_text("La aceleración es la derivada de la velocidad."),
    ]);
    let base_url = spawn_backend(backend.clone()).await;
    let agent = build_agent(&base_url);
    let mut session = SessionState::new();

    agent.run_turn(&mut session, "¿Qué es la velocidad?").await.unwrap();
    agent.run_turn(&mut session, "¿Y la aceleración?").await.unwrap();

    assert_eq!(session.history().len(), 2);
    let gemini = backend.gemini_requests.lock().unwrap();
    let second = gemini[1]["systemInstruction"]["parts"][0]["text"].as_str().unwrap();
    assert!(second.contains("CONTEXTO DE CONVERSACIÓN PREVIA:"));
    assert!(second.contains("Usuario: ¿Qué es la velocidad?"));
}

#[tokio::test]
async fn rate_limited_model_fails_the_turn() {
    let backend = Arc::new(Backend::default());
    backend.gemini_script.lock().unwrap().push_back((
        StatusCode::TOO_MANY_REQUESTS,
        json!({"error": {"message": "quota"}}),
    ));
    let base_url = spawn_backend(backend.clone()).await;
    let agent = build_agent(&base_url);
    let mut session = SessionState::new();

    let err = agent
        .run_turn(&mut session, "¿Qué es la energía?")
        .await
        .unwrap_err();
    assert!(matches!(err, fisibot_agent::AgentError::Provider(_)));
    assert!(session.history().is_empty());
}

#[tokio::test]
async fn unreachable_index_still_answers() {
    let backend = Arc::new(Backend::default());
    backend
        .gemini_script
        .lock()
        .unwrap()
        .push_back(gemini_text("Respondo con lo que sé de física."));
    let base_url = spawn_backend(backend.clone()).await;

    let provider = GeminiProvider::with_base_url("test-key", &base_url).unwrap();
    let index = QdrantIndex::new("http://127.0.0.1:1", "documentos_pdf", None, Duration::from_secs(2)).unwrap();
    let retriever = VectorRetriever::new(axis_encoder(), Arc::new(index));
    let tools = Arc::new(fisibot_tools::default_registry(retriever, 5));
    let agent = TutorAgent::new(Arc::new(provider), tools, "gemini-2.5-flash");
    let mut session = SessionState::new();

    let outcome = agent.run_turn(&mut session, "¿Qué es la energía?").await.unwrap();
    assert_eq!(outcome.answer, "Respondo con lo que sé de física.");
    assert!(outcome.fragments.is_empty());
    assert_eq!(session.history().len(), 1);
}

#[tokio::test]
async fn gateway_chat_over_real_clients() {
    let backend = Arc::new(Backend::default());
    backend
        .gemini_script
        .lock()
        .unwrap()
        .push_back(gemini_text("El efecto Doppler..."));
    let base_url = spawn_backend(backend.clone()).await;

    let state = Arc::new(fisibot_gateway::GatewayState::new(
        Arc::new(build_agent(&base_url)),
        fisibot_gateway::SessionStore::default(),
    ));
    let app = fisibot_gateway::build_router(state);

    let request = axum::http::Request::builder()
        .method("POST")
        .uri("/chat")
        .header("content-type", "application/json")
        .body(axum::body::Body::from(
            json!({"session_id": "e2e", "message": "¿Qué es el efecto Doppler?"}).to_string(),
        ))
        .unwrap();
    let response = app.oneshot(request).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    let body: Value = serde_json::from_slice(&bytes).unwrap();
    assert_eq!(body["session_id"], "e2e");
    assert_eq!(body["response"], "El efecto Doppler...");
    assert_eq!(body["fragments"].as_array().unwrap().len(), 2);
}
