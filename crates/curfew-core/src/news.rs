//! RSS news feed client.
//!
//! Fetches one RSS 2.0 document and flattens `rss/channel/item` into
//! [`NewsItem`]s, keeping document order. Callers that only want to display
//! news use [`NewsClient::fetch_or_empty`], which turns every failure into an
//! empty list.

use std::time::Duration;

use serde::{Deserialize, Serialize};
use tracing::{debug, warn};
use url::Url;

use crate::error::FeedError;
use crate::storage::NewsConfig;

/// One feed entry. Any element may be absent in the source document.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NewsItem {
    pub title: Option<String>,
    pub link: Option<String>,
    pub description: Option<String>,
    pub pub_date: Option<String>,
}

#[derive(Debug, Deserialize)]
struct RssDocument {
    #[serde(default)]
    channel: Option<RssChannel>,
}

#[derive(Debug, Deserialize)]
struct RssChannel {
    #[serde(rename = "item", default)]
    items: Vec<RssItem>,
}

#[derive(Debug, Deserialize)]
struct RssItem {
    #[serde(default)]
    title: Option<String>,
    #[serde(default)]
    link: Option<String>,
    #[serde(default)]
    description: Option<String>,
    #[serde(rename = "pubDate", default)]
    pub_date: Option<String>,
}

fn clean(value: Option<String>) -> Option<String> {
    value
        .map(|s| s.trim().to_string())
        .filter(|s| !s.is_empty())
}

impl From<RssItem> for NewsItem {
    fn from(item: RssItem) -> Self {
        Self {
            title: clean(item.title),
            link: clean(item.link),
            description: clean(item.description),
            pub_date: clean(item.pub_date),
        }
    }
}

/// Parse an RSS document. A document without a channel has no items.
pub fn parse_feed(xml: &str) -> Result<Vec<NewsItem>, FeedError> {
    let doc: RssDocument = quick_xml::de::from_str(xml)?;
    Ok(doc
        .channel
        .map(|c| c.items.into_iter().map(NewsItem::from).collect())
        .unwrap_or_default())
}

/// Keep items whose title contains any keyword, ignoring case.
///
/// An empty keyword list keeps everything.
pub fn filter_by_keywords(items: Vec<NewsItem>, keywords: &[String]) -> Vec<NewsItem> {
    let needles: Vec<String> = keywords
        .iter()
        .map(|k| k.trim().to_lowercase())
        .filter(|k| !k.is_empty())
        .collect();
    if needles.is_empty() {
        return items;
    }
    items
        .into_iter()
        .filter(|item| {
            item.title.as_deref().is_some_and(|title| {
                let title = title.to_lowercase();
                needles.iter().any(|n| title.contains(n.as_str()))
            })
        })
        .collect()
}

pub struct NewsClient {
    http: reqwest::Client,
    url: Url,
    keywords: Vec<String>,
}

impl NewsClient {
    pub fn new(url: &str, keywords: Vec<String>, timeout: Duration) -> Result<Self, FeedError> {
        let url = Url::parse(url).map_err(|source| FeedError::InvalidUrl {
            url: url.to_string(),
            source,
        })?;
        let http = reqwest::Client::builder().timeout(timeout).build()?;
        Ok(Self {
            http,
            url,
            keywords,
        })
    }

    pub fn from_config(config: &NewsConfig) -> Result<Self, FeedError> {
        Self::new(
            &config.url,
            config.keywords.clone(),
            Duration::from_secs(config.timeout_secs),
        )
    }

    pub fn url(&self) -> &Url {
        &self.url
    }

    /// Fetch, parse and filter the feed.
    pub async fn fetch(&self) -> Result<Vec<NewsItem>, FeedError> {
        debug!(url = %self.url, "fetching news feed");
        let response = self.http.get(self.url.clone()).send().await?;
        let status = response.status();
        if !status.is_success() {
            return Err(FeedError::Status {
                status: status.as_u16(),
            });
        }
        let body = response.text().await?;
        let items = parse_feed(&body)?;
        let total = items.len();
        let items = filter_by_keywords(items, &self.keywords);
        debug!(total, kept = items.len(), "news feed loaded");
        Ok(items)
    }

    /// Like [`NewsClient::fetch`], with failures logged and read as "no news".
    pub async fn fetch_or_empty(&self) -> Vec<NewsItem> {
        match self.fetch().await {
            Ok(items) => items,
            Err(e) => {
                warn!(url = %self.url, error = %e, "news feed unavailable");
                Vec::new()
            }
        }
    }
}
