pub mod error;
pub mod llm;
pub mod logging;
pub mod news;
pub mod retry;
pub mod types;

pub use error::{Error, Result, GENERIC_FAILURE};
pub use llm::{LlmClient, Prompt, ResponseFormat};
pub use news::{canonical_uri, to_sources, NewsSource};
pub use retry::RetryPolicy;
pub use types::*;

pub mod prelude {
    pub use crate::{
        ArticleData, ColumnRequest, Draft, Error, EvaluationResult, LlmClient, NewsItem,
        NewsSource, Prompt, QualityScores, Result, Source, Topic,
    };
}
