use async_trait::async_trait;
use std::collections::HashSet;
use std::fmt;
use url::Url;

use crate::types::{NewsItem, NewsQuery, Source, Topic};
use crate::Result;

#[async_trait]
pub trait NewsSource: Send + Sync + fmt::Debug {
    /// Recent news for the topic, newest first.
    ///
    /// Fails with `UpstreamUnavailable` when the provider cannot be reached and
    /// `NoResultsFound` when nothing survives filtering. Callers treat both as
    /// an empty list.
    async fn search_recent_news(&self, topic: &Topic, query: &NewsQuery) -> Result<Vec<NewsItem>>;
}

/// Canonical form of a link used for deduplication.
pub fn canonical_uri(raw: &str) -> String {
    let trimmed = raw.trim();
    match Url::parse(trimmed) {
        Ok(mut url) => {
            url.set_fragment(None);
            let mut canonical = url.to_string();
            if url.query().is_none() && canonical.ends_with('/') && url.path() != "/" {
                canonical.pop();
            }
            canonical
        }
        Err(_) => trimmed.to_string(),
    }
}

/// Converts news items to sources: newest first, one entry per canonical URI,
/// items without a usable link dropped.
pub fn to_sources(items: &[NewsItem]) -> Vec<Source> {
    let mut ordered: Vec<&NewsItem> = items.iter().collect();
    // Stable sort keeps provider order among equal or missing dates.
    ordered.sort_by(|a, b| b.published_at.cmp(&a.published_at));

    let mut seen = HashSet::new();
    ordered
        .into_iter()
        .filter_map(|item| {
            let uri = canonical_uri(&item.link);
            if uri.is_empty() || !seen.insert(uri.clone()) {
                return None;
            }
            Some(Source {
                title: item.title.trim().to_string(),
                uri,
            })
        })
        .collect()
}
