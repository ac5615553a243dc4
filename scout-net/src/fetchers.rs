//! Fetch strategies
//!
//! Each [`FetchProtocol`] maps to one strategy. Network access goes through
//! [`HttpFetcher`]; the response parsers are plain functions over the body so
//! they can be exercised without a network.

use async_trait::async_trait;
use chrono::{DateTime, TimeZone, Utc};
use futures::future::join_all;
use reqwest::Client;
use serde::Deserialize;
use std::sync::Arc;
use tracing::debug;

use crate::{clean_description, create_client, ensure_success, strip_html, HttpConfig, NetError};
use scout_core::{Clock, FetchProtocol, HeadlineRecord, SourceDescriptor, SystemClock};

/// Titles shorter than this are navigation or noise
pub const MIN_TITLE_CHARS: usize = 10;

/// HackerNews stories looked up per fetch
pub const HN_STORY_LIMIT: usize = 15;

/// Minimum HackerNews points
pub const HN_MIN_SCORE: i64 = 50;

/// Minimum Reddit score
pub const REDDIT_MIN_SCORE: i64 = 100;

/// Reddit posts kept per fetch
pub const REDDIT_POST_LIMIT: usize = 20;

const HN_ITEM_BASE: &str = "https://hacker-news.firebaseio.com/v0/item";

/// Fetches the headlines of a single source
#[async_trait]
pub trait SourceFetcher: Send + Sync {
    async fn fetch(&self, source: &SourceDescriptor) -> Result<Vec<HeadlineRecord>, NetError>;
}

/// reqwest-backed fetcher covering every protocol
pub struct HttpFetcher {
    client: Client,
    config: HttpConfig,
    clock: Arc<dyn Clock>,
}

impl HttpFetcher {
    pub fn new(config: HttpConfig) -> Result<Self, NetError> {
        Ok(Self {
            client: create_client(&config)?,
            config,
            clock: Arc::new(SystemClock),
        })
    }

    pub fn with_clock(mut self, clock: Arc<dyn Clock>) -> Self {
        self.clock = clock;
        self
    }

    async fn get_bytes(&self, url: &str) -> Result<Vec<u8>, NetError> {
        let response = ensure_success(self.client.get(url).send().await?)?;
        Ok(response.bytes().await?.to_vec())
    }

    async fn get_text(&self, url: &str) -> Result<String, NetError> {
        let response = ensure_success(self.client.get(url).send().await?)?;
        Ok(response.text().await?)
    }

    async fn fetch_hackernews(&self, source: &SourceDescriptor) -> Result<Vec<HeadlineRecord>, NetError> {
        let ids = parse_hn_ids(&self.get_text(source.endpoint).await?)?;

        let lookups = ids.into_iter().take(HN_STORY_LIMIT).map(|id| async move {
            let url = format!("{}/{}.json", HN_ITEM_BASE, id);
            match self.get_text(&url).await {
                Ok(body) => serde_json::from_str::<HnItem>(&body).ok(),
                Err(e) => {
                    debug!("HackerNews item {} failed: {}", id, e);
                    None
                }
            }
        });

        let items: Vec<HnItem> = join_all(lookups).await.into_iter().flatten().collect();
        Ok(items
            .into_iter()
            .filter_map(|item| hn_item_to_headline(item, source))
            .collect())
    }
}

#[async_trait]
impl SourceFetcher for HttpFetcher {
    async fn fetch(&self, source: &SourceDescriptor) -> Result<Vec<HeadlineRecord>, NetError> {
        let now = self.clock.now();
        let cap = self.config.max_items_per_source;

        match source.protocol {
            FetchProtocol::Feed => {
                let body = self.get_bytes(source.endpoint).await?;
                parse_feed(&body, source, now, cap)
            }
            FetchProtocol::RestJson => {
                let body = self.get_text(source.endpoint).await?;
                parse_news_api(&body, source, now, cap)
            }
            FetchProtocol::HackerNews => self.fetch_hackernews(source).await,
            FetchProtocol::Reddit => {
                let body = self.get_text(source.endpoint).await?;
                parse_reddit(&body, source)
            }
        }
    }
}

fn long_enough(title: &str) -> bool {
    title.chars().count() >= MIN_TITLE_CHARS
}

/// Parse an RSS/Atom/JSON feed body
pub fn parse_feed(
    body: &[u8],
    source: &SourceDescriptor,
    now: DateTime<Utc>,
    max_items: usize,
) -> Result<Vec<HeadlineRecord>, NetError> {
    let feed = feed_rs::parser::parse(body).map_err(|e| NetError::Parse(e.to_string()))?;

    let headlines = feed
        .entries
        .into_iter()
        .filter_map(|entry| {
            let title = strip_html(&entry.title?.content);
            if !long_enough(&title) {
                return None;
            }

            let url = entry
                .links
                .first()
                .map(|l| l.href.trim().to_string())
                .unwrap_or_default();
            let published_at = entry.published.or(entry.updated).unwrap_or(now);

            let mut record = HeadlineRecord::new(title, url, source.name, source.tier, published_at);
            if let Some(desc) = entry.summary.and_then(|s| clean_description(&s.content)) {
                record = record.with_description(&desc);
            }
            Some(record)
        })
        .take(max_items)
        .collect();

    Ok(headlines)
}

#[derive(Debug, Deserialize)]
struct NewsApiResponse {
    #[serde(default)]
    articles: Vec<NewsApiArticle>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct NewsApiArticle {
    title: Option<String>,
    url: Option<String>,
    source: Option<NewsApiSource>,
    published_at: Option<String>,
    description: Option<String>,
}

#[derive(Debug, Deserialize)]
struct NewsApiSource {
    name: Option<String>,
}

/// Parse a REST-JSON `articles` listing
pub fn parse_news_api(
    body: &str,
    source: &SourceDescriptor,
    now: DateTime<Utc>,
    max_items: usize,
) -> Result<Vec<HeadlineRecord>, NetError> {
    let response: NewsApiResponse = serde_json::from_str(body)?;

    let headlines = response
        .articles
        .into_iter()
        .take(max_items)
        .filter_map(|article| {
            let title = article.title.map(|t| t.trim().to_string())?;
            if !long_enough(&title) {
                return None;
            }

            let source_name = article
                .source
                .and_then(|s| s.name)
                .filter(|n| !n.trim().is_empty())
                .unwrap_or_else(|| source.name.to_string());

            let mut record = HeadlineRecord::new(
                title,
                article.url.unwrap_or_default(),
                source_name,
                source.tier,
                article
                    .published_at
                    .as_deref()
                    .and_then(|d| DateTime::parse_from_rfc3339(d).ok())
                    .map(|d| d.with_timezone(&Utc))
                    .unwrap_or(now),
            );
            if let Some(desc) = article.description.as_deref().and_then(clean_description) {
                record = record.with_description(&desc);
            }
            Some(record)
        })
        .collect();

    Ok(headlines)
}

/// Parse the HackerNews top-stories id list
pub fn parse_hn_ids(body: &str) -> Result<Vec<u64>, NetError> {
    Ok(serde_json::from_str(body)?)
}

/// A HackerNews item
#[derive(Debug, Clone, Deserialize)]
pub struct HnItem {
    pub id: u64,
    pub title: Option<String>,
    pub url: Option<String>,
    #[serde(default)]
    pub time: i64,
    #[serde(default)]
    pub score: i64,
}

/// Keep stories with a title and at least [`HN_MIN_SCORE`] points
pub fn hn_item_to_headline(item: HnItem, source: &SourceDescriptor) -> Option<HeadlineRecord> {
    let title = item.title.filter(|t| !t.trim().is_empty())?;
    if item.score < HN_MIN_SCORE {
        return None;
    }

    let url = item
        .url
        .unwrap_or_else(|| format!("https://news.ycombinator.com/item?id={}", item.id));
    let published_at = Utc.timestamp_opt(item.time, 0).single()?;

    Some(
        HeadlineRecord::new(title, url, source.name, source.tier, published_at)
            .with_engagement(item.score as f64),
    )
}

#[derive(Debug, Deserialize)]
struct RedditListing {
    data: RedditListingData,
}

#[derive(Debug, Deserialize)]
struct RedditListingData {
    // Decoded one by one so a malformed post only drops itself
    #[serde(default)]
    children: Vec<serde_json::Value>,
}

#[derive(Debug, Deserialize)]
struct RedditChild {
    data: RedditPost,
}

#[derive(Debug, Deserialize)]
struct RedditPost {
    title: String,
    #[serde(default)]
    url: String,
    created_utc: f64,
    #[serde(default)]
    score: i64,
    #[serde(default)]
    over_18: bool,
    subreddit: String,
}

/// Parse a Reddit listing; keeps popular, safe-for-work posts
pub fn parse_reddit(body: &str, source: &SourceDescriptor) -> Result<Vec<HeadlineRecord>, NetError> {
    let listing: RedditListing = serde_json::from_str(body)?;

    let headlines = listing
        .data
        .children
        .into_iter()
        .filter_map(|child| match serde_json::from_value::<RedditChild>(child) {
            Ok(child) => Some(child.data),
            Err(e) => {
                debug!("Skipping malformed post from {}: {}", source.name, e);
                None
            }
        })
        .filter(|post| post.score >= REDDIT_MIN_SCORE && !post.over_18)
        .take(REDDIT_POST_LIMIT)
        .filter_map(|post| {
            let published_at = Utc.timestamp_opt(post.created_utc as i64, 0).single()?;
            Some(
                HeadlineRecord::new(
                    post.title,
                    post.url,
                    format!("Reddit r/{}", post.subreddit),
                    source.tier,
                    published_at,
                )
                .with_engagement(post.score as f64),
            )
        })
        .collect();

    Ok(headlines)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn source(protocol: FetchProtocol) -> SourceDescriptor {
        SourceDescriptor {
            name: "Test Source",
            tier: 1,
            protocol,
            endpoint: "https://example.com/feed",
            applicable_categories: &["Technology"],
        }
    }

    #[test]
    fn test_parse_rss_feed() {
        let xml = br#"<?xml version="1.0"?>
            <rss version="2.0"><channel><title>T</title>
            <item>
              <title><![CDATA[Parliament passes <b>sweeping</b> data law]]></title>
              <link>https://example.com/a</link>
              <pubDate>Tue, 10 Jun 2025 09:00:00 GMT</pubDate>
              <description>&lt;p&gt;The bill &lt;i&gt;now&lt;/i&gt; heads to the senate&lt;/p&gt;</description>
            </item>
            <item><title>Short</title><link>https://example.com/b</link></item>
            </channel></rss>"#;

        let now = Utc::now();
        let headlines = parse_feed(xml, &source(FetchProtocol::Feed), now, 30).unwrap();
        assert_eq!(headlines.len(), 1);
        assert_eq!(headlines[0].title, "Parliament passes sweeping data law");
        assert_eq!(headlines[0].url, "https://example.com/a");
        assert_eq!(headlines[0].source_name, "Test Source");
        assert_ne!(headlines[0].published_at, now);
        assert_eq!(
            headlines[0].description.as_deref(),
            Some("The bill now heads to the senate")
        );
    }

    #[test]
    fn test_parse_feed_applies_cap_and_rejects_garbage() {
        let mut xml = String::from("<rss version=\"2.0\"><channel><title>T</title>");
        for i in 0..40 {
            xml.push_str(&format!(
                "<item><title>Headline number {} about trade</title><link>https://e.com/{}</link></item>",
                i, i
            ));
        }
        xml.push_str("</channel></rss>");

        let headlines = parse_feed(xml.as_bytes(), &source(FetchProtocol::Feed), Utc::now(), 30).unwrap();
        assert_eq!(headlines.len(), 30);
        assert!(parse_feed(b"not a feed", &source(FetchProtocol::Feed), Utc::now(), 30).is_err());
    }

    #[test]
    fn test_parse_news_api_prefers_article_source() {
        let body = r#"{"articles":[
            {"title":"Central bank holds rates steady","url":"https://x.com/1","source":{"name":"Reuters"},"publishedAt":"2025-06-10T08:00:00Z","description":"Policy unchanged"},
            {"title":"Markets rally on jobs data","url":"https://x.com/2","source":{"name":null}},
            {"title":null,"url":"https://x.com/3"}
        ]}"#;

        let headlines = parse_news_api(body, &source(FetchProtocol::RestJson), Utc::now(), 30).unwrap();
        assert_eq!(headlines.len(), 2);
        assert_eq!(headlines[0].source_name, "Reuters");
        assert_eq!(headlines[1].source_name, "Test Source");
        assert_eq!(headlines[0].description.as_deref(), Some("Policy unchanged"));
    }

    #[test]
    fn test_hn_item_filters_low_scores() {
        let src = source(FetchProtocol::HackerNews);
        let popular = HnItem {
            id: 1,
            title: Some("Show HN: a new database engine".into()),
            url: None,
            time: 1_700_000_000,
            score: 120,
        };
        let quiet = HnItem {
            id: 2,
            title: Some("Ask HN: anyone?".into()),
            url: Some("https://example.com".into()),
            time: 1_700_000_000,
            score: 12,
        };

        let headline = hn_item_to_headline(popular, &src).unwrap();
        assert_eq!(headline.url, "https://news.ycombinator.com/item?id=1");
        assert_eq!(headline.engagement_score, Some(120.0));
        assert!(hn_item_to_headline(quiet, &src).is_none());
        assert_eq!(parse_hn_ids("[3, 2, 1]").unwrap(), vec![3, 2, 1]);
    }

    #[test]
    fn test_parse_reddit_filters_nsfw_and_score() {
        let body = r#"{"data":{"children":[
            {"data":{"title":"Scientists map ocean floor","url":"https://r.com/1","created_utc":1700000000.0,"score":500,"over_18":false,"subreddit":"science"}},
            {"data":{"title":"NSFW post title here","url":"https://r.com/2","created_utc":1700000000.0,"score":900,"over_18":true,"subreddit":"science"}},
            {"data":{"title":"Low score post title","url":"https://r.com/3","created_utc":1700000000.0,"score":5,"over_18":false,"subreddit":"science"}}
        ]}}"#;

        let headlines = parse_reddit(body, &source(FetchProtocol::Reddit)).unwrap();
        assert_eq!(headlines.len(), 1);
        assert_eq!(headlines[0].source_name, "Reddit r/science");
        assert_eq!(headlines[0].engagement_score, Some(500.0));
    }

    #[test]
    fn test_parse_reddit_skips_malformed_posts() {
        let body = r#"{"data":{"children":[
            {"data":{"url":"https://r.com/1","created_utc":1700000000.0,"score":500,"subreddit":"science"}},
            {"data":{"title":"Score is not a number","created_utc":1700000000.0,"score":"lots","subreddit":"science"}},
            {"kind":"t3"},
            {"data":{"title":"Glacier retreat speeds up","url":"https://r.com/4","created_utc":1700000000.0,"score":250,"subreddit":"science"}}
        ]}}"#;

        let headlines = parse_reddit(body, &source(FetchProtocol::Reddit)).unwrap();
        assert_eq!(headlines.len(), 1);
        assert_eq!(headlines[0].title, "Glacier retreat speeds up");
        assert_eq!(headlines[0].engagement_score, Some(250.0));
    }
}
