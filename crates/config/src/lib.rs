//! Configuration loading, validation, and management for fisibot.
//!
//! Loads configuration from `fisibot.toml` (or the path in `FISIBOT_CONFIG`)
//! with environment variable overrides. Validates all settings at startup.

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Environment variable naming an explicit config file.
pub const CONFIG_PATH_ENV: &str = "FISIBOT_CONFIG";

/// The root configuration structure.
///
/// Maps directly to `fisibot.toml`.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AppConfig {
    /// Hosted language model
    #[serde(default)]
    pub model: ModelConfig,

    /// Vector database
    #[serde(default)]
    pub qdrant: QdrantConfig,

    /// Query encoder
    #[serde(default)]
    pub encoder: EncoderConfig,

    /// Retrieval defaults
    #[serde(default)]
    pub retrieval: RetrievalConfig,

    /// HTTP server
    #[serde(default)]
    pub gateway: GatewayConfig,

    /// Turn orchestration
    #[serde(default)]
    pub agent: AgentConfig,
}

/// Redact a secret for Debug output.
fn redact(s: &Option<String>) -> &'static str {
    match s {
        Some(_) => "[REDACTED]",
        None => "None",
    }
}

#[derive(Clone, Serialize, Deserialize)]
pub struct ModelConfig {
    #[serde(default = "default_model_name")]
    pub name: String,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub api_key: Option<String>,

    /// Override the API base URL (defaults to the public Gemini endpoint)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub api_url: Option<String>,

    #[serde(default = "default_temperature")]
    pub temperature: f32,

    #[serde(default = "default_max_tokens")]
    pub max_tokens: u32,
}

fn default_model_name() -> String {
    "gemini-2.5-flash".into()
}
fn default_temperature() -> f32 {
    0.7
}
fn default_max_tokens() -> u32 {
    4096
}

impl Default for ModelConfig {
    fn default() -> Self {
        Self {
            name: default_model_name(),
            api_key: None,
            api_url: None,
            temperature: default_temperature(),
            max_tokens: default_max_tokens(),
        }
    }
}

impl std::fmt::Debug for ModelConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ModelConfig")
            .field("name", &self.name)
            .field("api_key", &redact(&self.api_key))
            .field("api_url", &self.api_url)
            .field("temperature", &self.temperature)
            .field("max_tokens", &self.max_tokens)
            .finish()
    }
}

#[derive(Clone, Serialize, Deserialize)]
pub struct QdrantConfig {
    /// `None` until set; clients fall back to [`QdrantConfig::DEFAULT_URL`].
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub url: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub api_key: Option<String>,

    #[serde(default = "default_collection")]
    pub collection: String,

    #[serde(default = "default_qdrant_timeout")]
    pub timeout_secs: u64,
}

fn default_collection() -> String {
    "documentos_pdf".into()
}
fn default_qdrant_timeout() -> u64 {
    30
}

impl QdrantConfig {
    pub const DEFAULT_URL: &'static str = "http://localhost:6333";

    pub fn url_or_default(&self) -> &str {
        self.url.as_deref().unwrap_or(Self::DEFAULT_URL)
    }
}

impl Default for QdrantConfig {
    fn default() -> Self {
        Self {
            url: None,
            api_key: None,
            collection: default_collection(),
            timeout_secs: default_qdrant_timeout(),
        }
    }
}

impl std::fmt::Debug for QdrantConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("QdrantConfig")
            .field("url", &self.url)
            .field("api_key", &redact(&self.api_key))
            .field("collection", &self.collection)
            .field("timeout_secs", &self.timeout_secs)
            .finish()
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EncoderConfig {
    /// Hugging Face repo id of a BERT-family sentence encoder
    #[serde(default = "default_encoder_model")]
    pub model_id: String,

    #[serde(default = "default_encoder_revision")]
    pub revision: String,

    /// Token limit applied before encoding
    #[serde(default = "default_max_length")]
    pub max_length: usize,
}

fn default_encoder_model() -> String {
    "sentence-transformers/all-MiniLM-L6-v2".into()
}
fn default_encoder_revision() -> String {
    "main".into()
}
fn default_max_length() -> usize {
    512
}

impl Default for EncoderConfig {
    fn default() -> Self {
        Self {
            model_id: default_encoder_model(),
            revision: default_encoder_revision(),
            max_length: default_max_length(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RetrievalConfig {
    #[serde(default = "default_top_k")]
    pub top_k: usize,
}

fn default_top_k() -> usize {
    5
}

impl Default for RetrievalConfig {
    fn default() -> Self {
        Self { top_k: default_top_k() }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GatewayConfig {
    #[serde(default = "default_host")]
    pub host: String,

    #[serde(default = "default_port")]
    pub port: u16,

    /// Idle time after which a session is discarded
    #[serde(default = "default_session_timeout")]
    pub session_timeout_secs: u64,
}

fn default_host() -> String {
    "0.0.0.0".into()
}
fn default_port() -> u16 {
    8000
}
fn default_session_timeout() -> u64 {
    7200
}

/// Longest accepted `gateway.session_timeout_secs`: 30 days.
pub const MAX_SESSION_TIMEOUT_SECS: u64 = 30 * 24 * 60 * 60;

impl Default for GatewayConfig {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
            session_timeout_secs: default_session_timeout(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AgentConfig {
    /// Maximum model calls per turn
    #[serde(default = "default_max_iterations")]
    pub max_iterations: u32,

    /// Record the turn when the model never called `guardar_interaccion`
    #[serde(default = "default_true")]
    pub auto_record: bool,
}

fn default_max_iterations() -> u32 {
    8
}
fn default_true() -> bool {
    true
}

impl Default for AgentConfig {
    fn default() -> Self {
        Self {
            max_iterations: default_max_iterations(),
            auto_record: true,
        }
    }
}

impl AppConfig {
    /// Load configuration from `FISIBOT_CONFIG` or `./fisibot.toml`, then
    /// apply environment overrides:
    /// - `GOOGLE_API_KEY`, `FISIBOT_MODEL`
    /// - `QDRANT_URL`, `QDRANT_KEY`, `QDRANT_COLLECTION_NAME`
    /// - `PORT`
    pub fn load() -> Result<Self, ConfigError> {
        let path = std::env::var(CONFIG_PATH_ENV)
            .map(PathBuf::from)
            .unwrap_or_else(|_| PathBuf::from("fisibot.toml"));
        let mut config = Self::load_from(&path)?;
        config.apply_env(|key| std::env::var(key).ok())?;
        config.validate()?;
        Ok(config)
    }

    /// Load configuration from a specific file path.
    pub fn load_from(path: &Path) -> Result<Self, ConfigError> {
        if !path.exists() {
            tracing::info!("No config file found at {}, using defaults", path.display());
            return Ok(Self::default());
        }

        let content = std::fs::read_to_string(path).map_err(|e| ConfigError::ReadError {
            path: path.to_path_buf(),
            reason: e.to_string(),
        })?;

        let config: Self = toml::from_str(&content).map_err(|e| ConfigError::ParseError {
            path: path.to_path_buf(),
            reason: e.to_string(),
        })?;

        config.validate()?;
        Ok(config)
    }

    /// Apply environment overrides through `lookup`. Empty values are ignored.
    pub fn apply_env<F>(&mut self, lookup: F) -> Result<(), ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());

        if let Some(key) = get("GOOGLE_API_KEY") {
            self.model.api_key = Some(key);
        }
        if let Some(model) = get("FISIBOT_MODEL") {
            self.model.name = model;
        }
        if let Some(url) = get("QDRANT_URL") {
            self.qdrant.url = Some(url);
        }
        if let Some(key) = get("QDRANT_KEY") {
            self.qdrant.api_key = Some(key);
        }
        if let Some(collection) = get("QDRANT_COLLECTION_NAME") {
            self.qdrant.collection = collection;
        }
        if let Some(port) = get("PORT") {
            self.gateway.port = port.trim().parse().map_err(|_| {
                ConfigError::ValidationError(format!("PORT must be a valid port number, got '{port}'"))
            })?;
        }
        Ok(())
    }

    /// Validate the configuration.
    fn validate(&self) -> Result<(), ConfigError> {
        if self.model.temperature < 0.0 || self.model.temperature > 2.0 {
            return Err(ConfigError::ValidationError(
                "model.temperature must be between 0.0 and 2.0".into(),
            ));
        }

        if self.retrieval.top_k == 0 {
            return Err(ConfigError::ValidationError("retrieval.top_k must be >= 1".into()));
        }

        if self.encoder.max_length == 0 {
            return Err(ConfigError::ValidationError("encoder.max_length must be >= 1".into()));
        }

        if self.qdrant.collection.trim().is_empty() {
            return Err(ConfigError::ValidationError("qdrant.collection must not be empty".into()));
        }

        if self.agent.max_iterations == 0 {
            return Err(ConfigError::ValidationError("agent.max_iterations must be >= 1".into()));
        }

        let timeout = self.gateway.session_timeout_secs;
        if timeout == 0 || timeout > MAX_SESSION_TIMEOUT_SECS {
            return Err(ConfigError::ValidationError(format!(
                "gateway.session_timeout_secs must be between 1 and {MAX_SESSION_TIMEOUT_SECS}, got {timeout}"
            )));
        }

        Ok(())
    }

    /// Non-fatal startup warnings about missing credentials.
    pub fn credential_warnings(&self) -> Vec<String> {
        let mut warnings = Vec::new();
        if self.model.api_key.is_none() {
            warnings.push("GOOGLE_API_KEY no configurada! Configúrala con: export GOOGLE_API_KEY='tu-clave'".into());
        }
        if self.qdrant.url.is_none() || self.qdrant.api_key.is_none() {
            warnings.push("QDRANT_URL o QDRANT_KEY no configuradas! Configúralas en tu entorno".into());
        }
        warnings
    }

    /// Generate a config TOML string with every default filled in.
    pub fn default_toml() -> String {
        toml::to_string_pretty(&Self::default()).unwrap_or_default()
    }
}

/// Configuration errors.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Failed to read config file at {path}: {reason}")]
    ReadError { path: PathBuf, reason: String },

    #[error("Failed to parse config file at {path}: {reason}")]
    ParseError { path: PathBuf, reason: String },

    #[error("Configuration validation failed: {0}")]
    ValidationError(String),
}
