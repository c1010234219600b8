//! Hosted language model providers for fisibot.
//!
//! All providers implement the `fisibot_core::Provider` trait.

pub mod gemini;
#[cfg(any(test, feature = "test-support"))]
pub mod test_support;
pub mod unconfigured;

pub use gemini::GeminiProvider;
pub use unconfigured::UnconfiguredProvider;

use fisibot_config::ModelConfig;
use fisibot_core::Provider;
use fisibot_core::error::ProviderError;
use std::sync::Arc;

/// Build the configured provider. Fails when no API key is set.
pub fn from_config(config: &ModelConfig) -> Result<Arc<dyn Provider>, ProviderError> {
    let api_key = config
        .api_key
        .as_deref()
        .filter(|k| !k.is_empty())
        .ok_or_else(|| ProviderError::NotConfigured("GOOGLE_API_KEY is not set".into()))?;

    let provider = match config.api_url.as_deref() {
        Some(url) => GeminiProvider::with_base_url(api_key, url)?,
        None => GeminiProvider::new(api_key)?,
    };
    tracing::debug!(model = %config.name, "Gemini provider ready");
    Ok(Arc::new(provider))
}

/// Like [`from_config`], but never fails: without a usable key the server
/// gets an [`UnconfiguredProvider`] whose turns report the missing setup.
pub fn from_config_or_unconfigured(config: &ModelConfig) -> Arc<dyn Provider> {
    match from_config(config) {
        Ok(provider) => provider,
        Err(e) => {
            tracing::warn!(error = %e, "Model provider unavailable; turns will fail until it is configured");
            Arc::new(UnconfiguredProvider::new(e.to_string()))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn missing_key_is_not_configured() {
        let err = from_config(&ModelConfig::default()).err().unwrap();
        assert!(matches!(err, ProviderError::NotConfigured(_)));
    }

    #[test]
    fn missing_key_falls_back_to_unconfigured() {
        let provider = from_config_or_unconfigured(&ModelConfig::default());
        assert_eq!(provider.name(), "unconfigured");
    }

    #[test]
    fn builds_with_key() {
        let config = ModelConfig {
            api_key: Some("test-key".into()),
            ..Default::default()
        };
        let provider = from_config(&config).unwrap();
        assert_eq!(provider.name(), "gemini");
    }
}
