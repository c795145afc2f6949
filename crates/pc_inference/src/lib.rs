pub mod evaluator;
pub mod generator;
pub mod models;
pub mod prompts;
pub mod structure;

pub use evaluator::ContentEvaluator;
pub use generator::ContentGenerator;
pub use models::{create_model, DummyClient, ModelConfig, ModelKind, OpenAiClient, OpenAiConfig, RetryingClient};

pub mod prelude {
    pub use super::models::{create_model, ModelConfig, ModelKind};
    pub use super::{ContentEvaluator, ContentGenerator};
    pub use pc_core::{Error, LlmClient, Prompt, Result};
}
