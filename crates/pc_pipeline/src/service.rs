use chrono::Utc;
use pc_core::{
    iso_timestamp, ArticleData, ColumnOutcome, ColumnRequest, ColumnResponse, Error,
    ErrorResponse, GenerationRequest, LlmClient, NewsItem, NewsSource, QualityThresholds, Result,
};
use pc_inference::generator::DEFAULT_MAX_NEWS_ITEMS;
use pc_inference::{ContentEvaluator, ContentGenerator};
use std::fmt;
use std::sync::Arc;
use std::time::{Duration, Instant};
use tracing::{error, info, warn};

use crate::assembler::assemble;
use crate::revision::{LoopStatus, RevisionLoop};

#[derive(Debug, Clone)]
pub struct PipelineConfig {
    /// Wall-clock bound on one whole request.
    pub request_deadline: Duration,
    /// News items embedded in the draft prompt.
    pub max_news_items: usize,
    pub thresholds: QualityThresholds,
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            request_deadline: Duration::from_secs(300),
            max_news_items: DEFAULT_MAX_NEWS_ITEMS,
            thresholds: QualityThresholds::default(),
        }
    }
}

impl PipelineConfig {
    pub fn with_request_deadline(mut self, deadline: Duration) -> Self {
        self.request_deadline = deadline;
        self
    }

    pub fn with_thresholds(mut self, thresholds: QualityThresholds) -> Self {
        self.thresholds = thresholds;
        self
    }
}

/// A finished column with the revision loop's record.
#[derive(Debug, Clone)]
pub struct ColumnReport {
    pub article: ArticleData,
    pub status: LoopStatus,
    pub revisions_used: u32,
}

/// Runs one request end to end: news, draft, revision loop, assembly.
pub struct ColumnService {
    news: Arc<dyn NewsSource>,
    generator: ContentGenerator,
    revision: RevisionLoop,
    config: PipelineConfig,
}

impl fmt::Debug for ColumnService {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ColumnService")
            .field("news", &self.news)
            .field("generator", &self.generator)
            .field("config", &self.config)
            .finish()
    }
}

impl ColumnService {
    pub fn new(news: Arc<dyn NewsSource>, llm: Arc<dyn LlmClient>, config: PipelineConfig) -> Self {
        let generator = ContentGenerator::new(llm.clone()).with_max_news_items(config.max_news_items);
        let evaluator = ContentEvaluator::new(llm).with_thresholds(config.thresholds);
        Self {
            news,
            generator,
            revision: RevisionLoop::new(evaluator),
            config,
        }
    }

    pub fn config(&self) -> &PipelineConfig {
        &self.config
    }

    /// Validates the request, then runs the pipeline under the request deadline.
    pub async fn generate(&self, request: &ColumnRequest) -> Result<ArticleData> {
        Ok(self.generate_report(request).await?.article)
    }

    /// Same as [`generate`](Self::generate), keeping the loop status and the
    /// number of revisions spent.
    pub async fn generate_report(&self, request: &ColumnRequest) -> Result<ColumnReport> {
        let request = request.validate()?;
        let deadline = self.config.request_deadline;
        let started = Instant::now();

        let report = match tokio::time::timeout(deadline, self.run(&request)).await {
            Ok(result) => result?,
            Err(_) => {
                error!("⏰ Request for '{}' exceeded {:?}", request.topic, deadline);
                return Err(Error::Timeout(deadline));
            }
        };
        let article = &report.article;
        info!(
            "✅ Column '{}' ready in {:.1}s ({} chars, {} sources, {} after {} revisions)",
            article.title,
            started.elapsed().as_secs_f64(),
            article.metadata.word_count,
            article.metadata.sources.len(),
            report.status,
            report.revisions_used
        );
        Ok(report)
    }

    /// Like [`generate`](Self::generate) but folds every failure into the
    /// sanitized error envelope.
    pub async fn respond(&self, request: &ColumnRequest) -> ColumnOutcome {
        match self.generate(request).await {
            Ok(article) => ColumnOutcome::Success(ColumnResponse {
                success: true,
                article,
                processed_date: iso_timestamp(Utc::now()),
            }),
            Err(e) => {
                error!("❌ Column generation failed: {}", e);
                ColumnOutcome::Failure(ErrorResponse::from_error(&e))
            }
        }
    }

    async fn collect_news(&self, request: &GenerationRequest) -> Vec<NewsItem> {
        match self.news.search_recent_news(&request.topic, &request.news).await {
            Ok(items) => {
                info!("📰 Collected {} news items for '{}'", items.len(), request.topic);
                items
            }
            Err(Error::NoResultsFound(query)) => {
                info!("📭 No news found for '{}', writing without sources", query);
                Vec::new()
            }
            Err(e) => {
                warn!("⚠️ News search failed, writing without sources: {}", e);
                Vec::new()
            }
        }
    }

    async fn run(&self, request: &GenerationRequest) -> Result<ColumnReport> {
        info!("🚀 Generating column for '{}'", request.topic);
        let news = self.collect_news(request).await;

        let draft = self
            .generator
            .generate_column_from_news(&request.topic, &news)
            .await?;
        info!("📝 Draft ready ({} chars)", draft.content.chars().count());

        let outcome = self
            .revision
            .evaluate_and_revise(&draft.content, request.max_revision_attempts)
            .await;

        Ok(ColumnReport {
            article: assemble(&outcome.content, draft.sources, Utc::now()),
            status: outcome.status,
            revisions_used: outcome.revisions_used,
        })
    }
}
