use async_trait::async_trait;
use pc_core::{Error, LlmClient, Prompt, Result, RetryPolicy};
use std::fmt;
use std::sync::Arc;

/// Applies a [`RetryPolicy`] to every call of the wrapped model.
///
/// Whatever the inner model fails with, callers see
/// [`Error::GenerationFailed`] once the policy gives up.
pub struct RetryingClient {
    inner: Arc<dyn LlmClient>,
    policy: RetryPolicy,
}

impl RetryingClient {
    pub fn new(inner: Arc<dyn LlmClient>, policy: RetryPolicy) -> Self {
        Self { inner, policy }
    }
}

impl fmt::Debug for RetryingClient {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RetryingClient")
            .field("inner", &self.inner.name())
            .field("policy", &self.policy)
            .finish()
    }
}

#[async_trait]
impl LlmClient for RetryingClient {
    fn name(&self) -> &str {
        self.inner.name()
    }

    async fn complete(&self, prompt: &Prompt) -> Result<String> {
        let inner = &self.inner;
        self.policy
            .run(inner.name(), || inner.complete(prompt))
            .await
            .map_err(|e| match e {
                Error::GenerationFailed(_) => e,
                other => Error::GenerationFailed(other.to_string()),
            })
    }
}
