use async_trait::async_trait;
use chrono::{DateTime, Duration as ChronoDuration, Utc};
use pc_core::{Error, NewsItem, NewsQuery, NewsSource, Result, RetryPolicy, SearchMode, Topic};
use reqwest::{Client, StatusCode};
use serde::Deserialize;
use std::fmt;
use tracing::{debug, info, warn};

use crate::markup::clean_text;
use crate::query::{is_political, optimize_query, relevance, topic_terms};

pub const DEFAULT_BASE_URL: &str = "https://openapi.naver.com/v1/search/news.json";
const PROVIDER_MAX_DISPLAY: u32 = 100;

#[derive(Clone)]
pub struct NewsConfig {
    pub base_url: String,
    pub client_id: String,
    pub client_secret: String,
    /// Items requested from the provider per search.
    pub max_results: u32,
    /// Minimum share of topic terms an item must mention.
    pub min_relevance: f32,
    /// Drop items without any political keyword.
    pub require_political: bool,
    pub retry: RetryPolicy,
}

impl NewsConfig {
    pub fn new(client_id: impl Into<String>, client_secret: impl Into<String>) -> Self {
        Self {
            base_url: DEFAULT_BASE_URL.to_string(),
            client_id: client_id.into(),
            client_secret: client_secret.into(),
            max_results: 20,
            min_relevance: 0.2,
            require_political: true,
            retry: RetryPolicy::default().with_call_timeout(std::time::Duration::from_secs(30)),
        }
    }

    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into();
        self
    }

    pub fn with_retry(mut self, retry: RetryPolicy) -> Self {
        self.retry = retry;
        self
    }
}

impl fmt::Debug for NewsConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("NewsConfig")
            .field("base_url", &self.base_url)
            .field("client_id", &"<redacted>")
            .field("client_secret", &"<redacted>")
            .field("max_results", &self.max_results)
            .field("min_relevance", &self.min_relevance)
            .field("require_political", &self.require_political)
            .finish()
    }
}

#[derive(Debug, Deserialize)]
struct SearchResponse {
    #[serde(default)]
    items: Vec<RawItem>,
}

#[derive(Debug, Deserialize)]
struct RawItem {
    #[serde(default)]
    title: String,
    #[serde(default)]
    originallink: String,
    #[serde(default)]
    link: String,
    #[serde(default)]
    description: String,
    #[serde(rename = "pubDate", default)]
    pub_date: String,
}

/// News search backed by the Naver search API.
pub struct NaverNewsClient {
    client: Client,
    config: NewsConfig,
}

impl fmt::Debug for NaverNewsClient {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("NaverNewsClient")
            .field("client", &"<reqwest::Client>")
            .field("config", &self.config)
            .finish()
    }
}

impl NaverNewsClient {
    pub fn new(config: NewsConfig) -> Result<Self> {
        if config.client_id.is_empty() || config.client_secret.is_empty() {
            return Err(Error::InvalidInput("Naver client id and secret are required".to_string()));
        }
        let client = Client::builder()
            .user_agent("political-columnist/0.1")
            .build()?;
        Ok(Self { client, config })
    }

    async fn fetch(&self, query: &str) -> Result<Vec<RawItem>> {
        let display = self.config.max_results.clamp(1, PROVIDER_MAX_DISPLAY).to_string();
        let response = self
            .client
            .get(&self.config.base_url)
            .header("X-Naver-Client-Id", &self.config.client_id)
            .header("X-Naver-Client-Secret", &self.config.client_secret)
            .query(&[("query", query), ("display", display.as_str()), ("start", "1"), ("sort", "date")])
            .send()
            .await
            .map_err(|e| Error::Transient(format!("news request failed: {}", e)))?;

        let status = response.status();
        if status == StatusCode::TOO_MANY_REQUESTS || status.is_server_error() {
            return Err(Error::Transient(format!("news provider returned {}", status)));
        }
        if !status.is_success() {
            return Err(Error::Rejected(format!("news provider returned {}", status)));
        }

        let body = response
            .json::<SearchResponse>()
            .await
            .map_err(|e| Error::Transient(format!("malformed news response: {}", e)))?;
        Ok(body.items)
    }

    fn process(&self, topic: &Topic, query: &NewsQuery, raw: Vec<RawItem>) -> Vec<NewsItem> {
        let cutoff = Utc::now() - ChronoDuration::days(i64::from(query.days_back));
        let terms = topic_terms(topic);
        let total = raw.len();

        let mut items: Vec<NewsItem> = raw
            .into_iter()
            .filter_map(|item| {
                let title = clean_text(&item.title);
                let description = clean_text(&item.description);
                let published_at = parse_pub_date(&item.pub_date);

                if matches!(published_at, Some(at) if at < cutoff) {
                    return None;
                }
                if self.config.require_political && !is_political(&format!("{} {}", title, description)) {
                    return None;
                }
                let score = match query.search_mode {
                    SearchMode::Title => relevance(&terms, &title),
                    SearchMode::All => relevance(&terms, &format!("{} {}", title, description)),
                };
                if score < self.config.min_relevance {
                    return None;
                }
                let link = if item.originallink.trim().is_empty() {
                    item.link
                } else {
                    item.originallink
                };
                Some(NewsItem {
                    title,
                    description,
                    link,
                    published_at,
                    relevance: score,
                })
            })
            .collect();

        items.sort_by(|a, b| b.published_at.cmp(&a.published_at));
        debug!("News filtering: {} -> {} items", total, items.len());
        items
    }
}

/// Provider dates look like `Tue, 03 Sep 2024 10:30:00 +0900`.
fn parse_pub_date(raw: &str) -> Option<DateTime<Utc>> {
    match DateTime::parse_from_rfc2822(raw.trim()) {
        Ok(at) => Some(at.with_timezone(&Utc)),
        Err(e) => {
            if !raw.trim().is_empty() {
                warn!("Unparseable pubDate '{}': {}", raw, e);
            }
            None
        }
    }
}

#[async_trait]
impl NewsSource for NaverNewsClient {
    async fn search_recent_news(&self, topic: &Topic, query: &NewsQuery) -> Result<Vec<NewsItem>> {
        let search = optimize_query(topic);
        info!("🔍 Searching news for '{}' (last {} days)", search, query.days_back);

        let raw = self
            .config
            .retry
            .run("news search", || self.fetch(&search))
            .await
            .map_err(|e| Error::UpstreamUnavailable(e.to_string()))?;

        let items = self.process(topic, query, raw);
        if items.is_empty() {
            return Err(Error::NoResultsFound(search));
        }
        info!("📰 Found {} relevant news items", items.len());
        Ok(items)
    }
}

/// Stand-in used when no provider credentials are configured.
#[derive(Debug, Default)]
pub struct DisabledNewsSource;

#[async_trait]
impl NewsSource for DisabledNewsSource {
    async fn search_recent_news(&self, topic: &Topic, _query: &NewsQuery) -> Result<Vec<NewsItem>> {
        warn!("News search disabled, continuing without sources for '{}'", topic);
        Err(Error::NoResultsFound(topic.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use mockito::Matcher;
    use std::time::Duration;

    fn rfc2822(hours_ago: i64) -> String {
        (Utc::now() - ChronoDuration::hours(hours_ago)).to_rfc2822()
    }

    fn client_for(server: &mockito::Server) -> NaverNewsClient {
        let retry = RetryPolicy::default()
            .with_initial_backoff(Duration::from_millis(1))
            .with_call_timeout(Duration::from_secs(5));
        let config = NewsConfig::new("id", "secret")
            .with_base_url(format!("{}/v1/search/news.json", server.url()))
            .with_retry(retry);
        NaverNewsClient::new(config).unwrap()
    }

    fn topic() -> Topic {
        Topic::parse("대선 여론조사").unwrap()
    }

    #[test]
    fn test_client_requires_credentials() {
        assert!(NaverNewsClient::new(NewsConfig::new("", "")).is_err());
    }

    #[test]
    fn test_parse_pub_date() {
        let parsed = parse_pub_date("Tue, 03 Sep 2024 10:30:00 +0900").unwrap();
        assert_eq!(parsed.to_rfc3339(), "2024-09-03T01:30:00+00:00");
        assert!(parse_pub_date("yesterday").is_none());
    }

    #[tokio::test]
    async fn test_search_filters_and_orders_items() {
        let mut server = mockito::Server::new_async().await;
        let body = serde_json::json!({
            "items": [
                {
                    "title": "<b>대선</b> 여론조사 접전",
                    "originallink": "https://news.example.com/older",
                    "link": "https://n.news.naver.com/1",
                    "description": "국회 안팎 정치권 촉각",
                    "pubDate": rfc2822(10)
                },
                {
                    "title": "대선 여론조사 &quot;오차범위&quot;",
                    "originallink": "",
                    "link": "https://n.news.naver.com/2",
                    "description": "정당 지지율 변화",
                    "pubDate": rfc2822(1)
                },
                {
                    "title": "대선 여론조사 과거 기록",
                    "originallink": "https://news.example.com/stale",
                    "link": "https://n.news.naver.com/3",
                    "description": "선거 통계",
                    "pubDate": rfc2822(24 * 30)
                },
                {
                    "title": "대선 여론조사 앱 출시",
                    "originallink": "https://news.example.com/app",
                    "link": "https://n.news.naver.com/4",
                    "description": "스타트업 소식",
                    "pubDate": rfc2822(2)
                },
                {
                    "title": "주말 날씨 정치권 관심",
                    "originallink": "https://news.example.com/weather",
                    "link": "https://n.news.naver.com/5",
                    "description": "맑음",
                    "pubDate": rfc2822(3)
                }
            ]
        });
        let mock = server
            .mock("GET", "/v1/search/news.json")
            .match_header("x-naver-client-id", "id")
            .match_header("x-naver-client-secret", "secret")
            .match_query(Matcher::AllOf(vec![
                Matcher::UrlEncoded("query".into(), "대선 여론조사 정치".into()),
                Matcher::UrlEncoded("sort".into(), "date".into()),
            ]))
            .with_status(200)
            .with_header("content-type", "application/json")
            .with_body(body.to_string())
            .create_async()
            .await;

        let client = client_for(&server);
        let items = client
            .search_recent_news(&topic(), &NewsQuery::default())
            .await
            .unwrap();
        mock.assert_async().await;

        // stale item is outside the window, the app item is not political,
        // the weather item does not mention the topic.
        assert_eq!(items.len(), 2);
        assert_eq!(items[0].title, "대선 여론조사 \"오차범위\"");
        assert_eq!(items[0].link, "https://n.news.naver.com/2");
        assert_eq!(items[1].title, "대선 여론조사 접전");
        assert_eq!(items[1].link, "https://news.example.com/older");
    }

    #[tokio::test]
    async fn test_empty_result_is_no_results_found() {
        let mut server = mockito::Server::new_async().await;
        server
            .mock("GET", "/v1/search/news.json")
            .match_query(Matcher::Any)
            .with_status(200)
            .with_body(r#"{"items": []}"#)
            .create_async()
            .await;

        let result = client_for(&server)
            .search_recent_news(&topic(), &NewsQuery::default())
            .await;
        assert!(matches!(result, Err(Error::NoResultsFound(_))));
    }

    #[tokio::test]
    async fn test_server_errors_are_retried_then_unavailable() {
        let mut server = mockito::Server::new_async().await;
        let mock = server
            .mock("GET", "/v1/search/news.json")
            .match_query(Matcher::Any)
            .with_status(503)
            .expect(3)
            .create_async()
            .await;

        let result = client_for(&server)
            .search_recent_news(&topic(), &NewsQuery::default())
            .await;
        mock.assert_async().await;
        assert!(matches!(result, Err(Error::UpstreamUnavailable(_))));
    }

    #[tokio::test]
    async fn test_auth_failure_is_not_retried() {
        let mut server = mockito::Server::new_async().await;
        let mock = server
            .mock("GET", "/v1/search/news.json")
            .match_query(Matcher::Any)
            .with_status(401)
            .expect(1)
            .create_async()
            .await;

        let result = client_for(&server)
            .search_recent_news(&topic(), &NewsQuery::default())
            .await;
        mock.assert_async().await;
        assert!(matches!(result, Err(Error::UpstreamUnavailable(_))));
    }

    #[tokio::test]
    async fn test_disabled_source_yields_no_results() {
        let result = DisabledNewsSource
            .search_recent_news(&topic(), &NewsQuery::default())
            .await;
        assert!(matches!(result, Err(Error::NoResultsFound(_))));
    }
}
