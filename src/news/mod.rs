// =============================================================================
// News Module: best-effort headline pull
// =============================================================================
//
// Feeds are fetched one after another. A feed that cannot be downloaded or
// parsed contributes nothing; the failure is logged and the remaining feeds
// are still read. There are no retries.

pub mod parser;

use anyhow::Context;
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use tracing::{debug, instrument, warn};

use crate::error::FeedParseError;

pub use parser::parse_feed;

/// One headline as shown in the news widget.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Headline {
    pub title: String,
    pub link: String,
}

/// Downloads a feed document.
#[async_trait]
pub trait FeedFetcher: Send + Sync {
    async fn fetch(&self, url: &str) -> Result<String, FeedParseError>;
}

/// `FeedFetcher` over plain HTTP GET.
#[derive(Debug, Clone)]
pub struct HttpFeedFetcher {
    client: reqwest::Client,
}

impl HttpFeedFetcher {
    pub fn new(timeout: std::time::Duration) -> anyhow::Result<Self> {
        let client = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .context("failed to build reqwest client for HttpFeedFetcher")?;
        Ok(Self { client })
    }
}

#[async_trait]
impl FeedFetcher for HttpFeedFetcher {
    async fn fetch(&self, url: &str) -> Result<String, FeedParseError> {
        let fail = |reason: String| FeedParseError::Fetch {
            url: url.to_string(),
            reason,
        };

        let resp = self
            .client
            .get(url)
            .send()
            .await
            .map_err(|e| fail(e.to_string()))?;

        let status = resp.status();
        if !status.is_success() {
            return Err(fail(format!("HTTP {status}")));
        }

        resp.text().await.map_err(|e| fail(e.to_string()))
    }
}

/// Collect up to `limit_per_feed` headlines from each feed, in feed order.
#[instrument(skip(fetcher), name = "news::fetch_headlines")]
pub async fn fetch_headlines(
    fetcher: &dyn FeedFetcher,
    feed_urls: &[String],
    limit_per_feed: usize,
) -> Vec<Headline> {
    let mut headlines = Vec::new();

    for url in feed_urls {
        let parsed = match fetcher.fetch(url).await {
            Ok(body) => parse_feed(&body, limit_per_feed),
            Err(e) => Err(e),
        };

        match parsed {
            Ok(items) => {
                debug!(feed = %url, count = items.len(), "feed parsed");
                headlines.extend(items);
            }
            Err(e) => {
                warn!(feed = %url, error = %e, "feed skipped");
            }
        }
    }

    headlines
}


#[cfg(test)]
mod tests {
    use super::testing::{rss, StaticFeeds};
    use super::*;

    #[tokio::test]
    async fn failing_feed_contributes_nothing() {
        let feeds = StaticFeeds::default()
            .with("https://a.example.com/rss", "<rss><channel><item><title>x</link></item></channel></rss>")
            .with("https://b.example.com/rss", &rss(&["one", "two", "three", "four"]));
        let urls = vec![
            "https://a.example.com/rss".to_string(),
            "https://b.example.com/rss".to_string(),
        ];

        let headlines = fetch_headlines(&feeds, &urls, 3).await;
        assert_eq!(headlines.len(), 3);
        assert_eq!(headlines[0].title, "one");
        assert_eq!(headlines[2].title, "three");
    }

    #[tokio::test]
    async fn unreachable_feed_is_skipped_and_order_is_kept() {
        let feeds = StaticFeeds::default()
            .with("https://a.example.com/rss", &rss(&["a1", "a2"]))
            .with("https://c.example.com/rss", &rss(&["c1"]));
        let urls = vec![
            "https://a.example.com/rss".to_string(),
            "https://down.example.com/rss".to_string(),
            "https://c.example.com/rss".to_string(),
        ];

        let titles: Vec<String> = fetch_headlines(&feeds, &urls, 5)
            .await
            .into_iter()
            .map(|h| h.title)
            .collect();
        assert_eq!(titles, vec!["a1", "a2", "c1"]);
    }

    #[tokio::test]
    async fn feed_broken_past_the_limit_contributes_nothing() {
        let broken = "<rss><channel>\
            <item><title>early</title><link>https://a.example.com/1</link></item>\
            <item><title>late</link></item>\
            </channel></rss>";
        let feeds = StaticFeeds::default()
            .with("https://a.example.com/rss", broken)
            .with("https://b.example.com/rss", &rss(&["b1"]));
        let urls = vec![
            "https://a.example.com/rss".to_string(),
            "https://b.example.com/rss".to_string(),
        ];

        let titles: Vec<String> = fetch_headlines(&feeds, &urls, 1)
            .await
            .into_iter()
            .map(|h| h.title)
            .collect();
        assert_eq!(titles, vec!["b1"]);
    }

    #[tokio::test]
    async fn no_feeds_no_headlines() {
        let feeds = StaticFeeds::default();
        assert!(fetch_headlines(&feeds, &[], 5).await.is_empty());
    }
}
