//! Stand-in provider used when no model credentials are available.
//!
//! The server still starts and answers `/health` and `/info`; every turn
//! fails with `ProviderError::NotConfigured` until a key is supplied.

use async_trait::async_trait;
use fisibot_core::error::ProviderError;
use fisibot_core::provider::{Provider, ProviderRequest, ProviderResponse};

pub struct UnconfiguredProvider {
    reason: String,
}

impl UnconfiguredProvider {
    pub fn new(reason: impl Into<String>) -> Self {
        Self { reason: reason.into() }
    }

    pub fn reason(&self) -> &str {
        &self.reason
    }
}

#[async_trait]
impl Provider for UnconfiguredProvider {
    fn name(&self) -> &str {
        "unconfigured"
    }

    async fn complete(&self, _request: ProviderRequest) -> Result<ProviderResponse, ProviderError> {
        Err(ProviderError::NotConfigured(self.reason.clone()))
    }

    async fn health_check(&self) -> Result<bool, ProviderError> {
        Ok(false)
    }
}
