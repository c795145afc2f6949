use pc_core::logging::preview;
use pc_core::{to_sources, Draft, Error, LlmClient, NewsItem, Result, Topic};
use std::cmp::Ordering;
use std::fmt;
use std::sync::Arc;

use crate::prompts::PromptBuilder;

pub const DEFAULT_MAX_NEWS_ITEMS: usize = 10;

/// Writes the first draft of a column from collected news.
pub struct ContentGenerator {
    llm: Arc<dyn LlmClient>,
    prompts: PromptBuilder,
    max_news_items: usize,
}

impl fmt::Debug for ContentGenerator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ContentGenerator")
            .field("llm", &self.llm.name())
            .field("max_news_items", &self.max_news_items)
            .finish()
    }
}

impl ContentGenerator {
    pub fn new(llm: Arc<dyn LlmClient>) -> Self {
        Self {
            llm,
            prompts: PromptBuilder::new(),
            max_news_items: DEFAULT_MAX_NEWS_ITEMS,
        }
    }

    pub fn with_max_news_items(mut self, max: usize) -> Self {
        self.max_news_items = max.max(1);
        self
    }

    /// Most relevant items first, newest first among equals.
    pub fn select_news<'a>(&self, news: &'a [NewsItem]) -> Vec<&'a NewsItem> {
        let mut selected: Vec<&NewsItem> = news.iter().collect();
        selected.sort_by(|a, b| {
            b.relevance
                .partial_cmp(&a.relevance)
                .unwrap_or(Ordering::Equal)
                .then_with(|| b.published_at.cmp(&a.published_at))
        });
        selected.truncate(self.max_news_items);
        selected
    }

    pub async fn generate_column_from_news(&self, topic: &Topic, news: &[NewsItem]) -> Result<Draft> {
        let selected = self.select_news(news);
        tracing::info!(
            "Generating draft for '{}' from {} of {} news items",
            topic,
            selected.len(),
            news.len()
        );

        let prompt = self.prompts.draft(topic, &selected);
        let content = self
            .llm
            .complete(&prompt)
            .await
            .map_err(|e| match e {
                Error::GenerationFailed(_) => e,
                other => Error::GenerationFailed(other.to_string()),
            })?;

        let content = content.trim().to_string();
        if content.is_empty() {
            return Err(Error::GenerationFailed("draft came back empty".to_string()));
        }
        tracing::debug!("Draft preview: {}", preview(&content, 120));

        let used: Vec<NewsItem> = selected.into_iter().cloned().collect();
        Ok(Draft {
            content,
            sources: to_sources(&used),
        })
    }
}
