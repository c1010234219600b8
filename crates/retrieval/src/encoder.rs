//! BERT-family sentence encoder running locally via Candle.
//!
//! Weights, config and tokenizer are fetched from the Hugging Face Hub
//! (cached by `hf-hub`) and loaded once. Queries are truncated to the
//! configured token limit and pooled from the CLS position of the last
//! hidden state.

use async_trait::async_trait;
use candle_core::{Device, Tensor};
use candle_nn::VarBuilder;
use candle_transformers::models::bert::{BertModel, Config, DTYPE};
use fisibot_config::EncoderConfig;
use fisibot_core::error::RetrievalError;
use fisibot_core::retrieval::TextEncoder;
use hf_hub::api::sync::Api;
use hf_hub::{Repo, RepoType};
use std::path::Path;
use std::sync::Arc;
use tokenizers::{Tokenizer, TruncationParams};
use tracing::info;

/// Loaded model state, shared read-only across requests.
struct EncoderState {
    model: BertModel,
    tokenizer: Tokenizer,
    device: Device,
}

pub struct BertEncoder {
    model_id: String,
    dimension: usize,
    state: Arc<EncoderState>,
}

impl BertEncoder {
    /// Download (if needed) and load the configured encoder.
    ///
    /// Blocking: call from startup code or `spawn_blocking`.
    pub fn load(config: &EncoderConfig) -> Result<Self, RetrievalError> {
        info!(model = %config.model_id, revision = %config.revision, "Loading sentence encoder");

        let api = Api::new().map_err(|e| {
            RetrievalError::EncoderUnavailable(format!("Failed to initialize HuggingFace Hub API: {e}"))
        })?;
        let repo = api.repo(Repo::with_revision(
            config.model_id.clone(),
            RepoType::Model,
            config.revision.clone(),
        ));

        let fetch = |file: &str| {
            repo.get(file).map_err(|e| {
                RetrievalError::EncoderUnavailable(format!(
                    "Failed to download '{file}' from '{}': {e}",
                    config.model_id
                ))
            })
        };
        let config_path = fetch("config.json")?;
        let tokenizer_path = fetch("tokenizer.json")?;
        let weights_path = fetch("model.safetensors")?;

        Self::load_from_files(
            &config.model_id,
            &config_path,
            &tokenizer_path,
            &weights_path,
            config.max_length,
        )
    }

    /// Load from files already on disk.
    pub fn load_from_files(
        model_id: &str,
        config_path: &Path,
        tokenizer_path: &Path,
        weights_path: &Path,
        max_length: usize,
    ) -> Result<Self, RetrievalError> {
        let device = Device::Cpu;

        let raw_config = std::fs::read_to_string(config_path)
            .map_err(|e| RetrievalError::EncoderUnavailable(format!("Failed to read model config: {e}")))?;
        let bert_config: Config = serde_json::from_str(&raw_config)
            .map_err(|e| RetrievalError::EncoderUnavailable(format!("Invalid model config: {e}")))?;
        let dimension = hidden_size(&raw_config)?;

        let mut tokenizer = Tokenizer::from_file(tokenizer_path)
            .map_err(|e| RetrievalError::EncoderUnavailable(format!("Failed to load tokenizer: {e}")))?;
        tokenizer
            .with_padding(None)
            .with_truncation(Some(TruncationParams {
                max_length,
                ..Default::default()
            }))
            .map_err(|e| RetrievalError::EncoderUnavailable(format!("Invalid truncation settings: {e}")))?;

        // SAFETY: the safetensors file is not modified while mapped.
        let vb = unsafe { VarBuilder::from_mmaped_safetensors(&[weights_path], DTYPE, &device) }
            .map_err(map_candle_err)?;
        let model = BertModel::load(vb, &bert_config).map_err(map_candle_err)?;

        info!(model = model_id, dimension, max_length, "Sentence encoder loaded");

        Ok(Self {
            model_id: model_id.to_string(),
            dimension,
            state: Arc::new(EncoderState { model, tokenizer, device }),
        })
    }
}

impl EncoderState {
    fn embed(&self, text: &str) -> Result<Vec<f32>, RetrievalError> {
        let encoding = self
            .tokenizer
            .encode(text, true)
            .map_err(|e| RetrievalError::EncodingFailed(format!("Tokenization failed: {e}")))?;

        let input_ids = Tensor::new(encoding.get_ids(), &self.device)
            .and_then(|t| t.unsqueeze(0))
            .map_err(map_candle_err)?;
        let token_type_ids = Tensor::new(encoding.get_type_ids(), &self.device)
            .and_then(|t| t.unsqueeze(0))
            .map_err(map_candle_err)?;
        let attention_mask = Tensor::new(encoding.get_attention_mask(), &self.device)
            .and_then(|t| t.unsqueeze(0))
            .map_err(map_candle_err)?;

        // (batch, seq, hidden)
        let hidden = self
            .model
            .forward(&input_ids, &token_type_ids, Some(&attention_mask))
            .map_err(map_candle_err)?;

        hidden
            .get(0)
            .and_then(|seq| seq.get(0))
            .and_then(|cls| cls.to_vec1::<f32>())
            .map_err(map_candle_err)
    }
}

fn hidden_size(raw_config: &str) -> Result<usize, RetrievalError> {
    let value: serde_json::Value = serde_json::from_str(raw_config)
        .map_err(|e| RetrievalError::EncoderUnavailable(format!("Invalid model config: {e}")))?;
    value["hidden_size"]
        .as_u64()
        .map(|n| n as usize)
        .ok_or_else(|| RetrievalError::EncoderUnavailable("Model config has no hidden_size".into()))
}

fn map_candle_err(e: candle_core::Error) -> RetrievalError {
    RetrievalError::EncodingFailed(format!("Candle error: {e}"))
}

#[async_trait]
impl TextEncoder for BertEncoder {
    fn model_id(&self) -> &str {
        &self.model_id
    }

    fn dimension(&self) -> usize {
        self.dimension
    }

    async fn encode(&self, text: &str) -> Result<Vec<f32>, RetrievalError> {
        let state = self.state.clone();
        let text = text.to_string();
        // CPU-bound inference
        tokio::task::spawn_blocking(move || state.embed(&text))
            .await
            .map_err(|e| RetrievalError::EncodingFailed(format!("Encoder task failed: {e}")))?
    }
}
