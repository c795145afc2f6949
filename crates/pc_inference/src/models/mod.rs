use pc_core::{Error, LlmClient, Result, RetryPolicy};
use std::str::FromStr;
use std::sync::Arc;

pub mod dummy;
pub mod openai;
pub mod retrying;

pub use dummy::DummyClient;
pub use openai::{OpenAiClient, OpenAiConfig};
pub use retrying::RetryingClient;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ModelKind {
    #[default]
    OpenAi,
    Dummy,
}

impl FromStr for ModelKind {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_lowercase().as_str() {
            "openai" => Ok(ModelKind::OpenAi),
            "dummy" => Ok(ModelKind::Dummy),
            other => Err(Error::InvalidInput(format!("unknown model kind '{}'", other))),
        }
    }
}

#[derive(Debug, Clone)]
pub struct ModelConfig {
    pub kind: ModelKind,
    pub openai: Option<OpenAiConfig>,
    pub retry: RetryPolicy,
}

impl ModelConfig {
    pub fn openai(config: OpenAiConfig) -> Self {
        Self {
            kind: ModelKind::OpenAi,
            openai: Some(config),
            retry: RetryPolicy::default(),
        }
    }

    pub fn dummy() -> Self {
        Self {
            kind: ModelKind::Dummy,
            openai: None,
            retry: RetryPolicy::default(),
        }
    }

    pub fn with_retry(mut self, retry: RetryPolicy) -> Self {
        self.retry = retry;
        self
    }
}

/// Builds the configured model, wrapped in the retry policy.
pub fn create_model(config: ModelConfig) -> Result<Arc<dyn LlmClient>> {
    let inner: Arc<dyn LlmClient> = match config.kind {
        ModelKind::OpenAi => {
            let openai = config
                .openai
                .ok_or_else(|| Error::InvalidInput("OpenAI configuration is missing".to_string()))?;
            tracing::info!("Using OpenAI model {} at {}", openai.model, openai.base_url);
            Arc::new(OpenAiClient::new(openai)?)
        }
        ModelKind::Dummy => {
            tracing::warn!("Using dummy model; generated columns are placeholders");
            Arc::new(DummyClient::new())
        }
    };
    Ok(Arc::new(RetryingClient::new(inner, config.retry)))
}
