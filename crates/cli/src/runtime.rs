//! Wiring shared by the commands: encoder, index, provider, tools, agent.

use std::sync::Arc;

use fisibot_agent::TutorAgent;
use fisibot_config::AppConfig;
use fisibot_retrieval::{BertEncoder, QdrantIndex, VectorRetriever};
use tracing::info;

/// Load the sentence encoder off the async runtime.
pub async fn load_encoder(config: &AppConfig) -> Result<BertEncoder, Box<dyn std::error::Error>> {
    let encoder_config = config.encoder.clone();
    let encoder = tokio::task::spawn_blocking(move || BertEncoder::load(&encoder_config)).await??;
    Ok(encoder)
}

/// Encoder plus Qdrant index.
pub async fn build_retriever(config: &AppConfig) -> Result<VectorRetriever, Box<dyn std::error::Error>> {
    let encoder = load_encoder(config).await?;
    let index = QdrantIndex::from_config(&config.qdrant)?;
    info!(
        collection = %index.collection(),
        url = %config.qdrant.url_or_default(),
        "Vector index ready"
    );
    Ok(VectorRetriever::new(Arc::new(encoder), Arc::new(index)))
}

/// The full tutor: retriever, tools, model provider.
///
/// A missing API key does not stop the build; turns then fail with a
/// not-configured provider error.
pub async fn build_agent(config: &AppConfig) -> Result<Arc<TutorAgent>, Box<dyn std::error::Error>> {
    let provider = fisibot_providers::from_config_or_unconfigured(&config.model);
    let retriever = build_retriever(config).await?;
    let tools = Arc::new(fisibot_tools::default_registry(retriever, config.retrieval.top_k));
    let agent = TutorAgent::from_config(provider, tools, config);
    info!(model = %agent.model(), tools = ?agent.tool_names(), "Tutor ready");
    Ok(Arc::new(agent))
}

/// Load configuration with a readable error.
pub fn load_config() -> Result<AppConfig, Box<dyn std::error::Error>> {
    Ok(AppConfig::load().map_err(|e| format!("Failed to load config: {e}"))?)
}
