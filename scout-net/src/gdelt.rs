//! Article-index client (GDELT DOC 2.0)
//!
//! Read-only keyword search over recent worldwide news coverage. Used for
//! enrichment only; callers treat every failure as "no data".

use async_trait::async_trait;
use chrono::{DateTime, NaiveDateTime, Utc};
use reqwest::Client;
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::{create_client, ensure_success, HttpConfig, NetError};

const GDELT_DOC_API: &str = "https://api.gdeltproject.org/api/v2/doc/doc";

/// An article returned by the index
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Article {
    pub url: String,
    pub title: String,
    /// Compact `YYYYMMDDTHHMMSSZ` timestamp as reported by the service
    pub seen_date: String,
    pub domain: String,
    pub language: String,
    pub country_code: String,
    /// Average tone (-100 to +100)
    pub tone: f64,
}

impl Article {
    /// Parsed `seen_date`
    pub fn seen_at(&self) -> Option<DateTime<Utc>> {
        parse_seen_date(&self.seen_date)
    }
}

/// Keyword search over recent news
#[async_trait]
pub trait ArticleIndex: Send + Sync {
    async fn search(&self, keywords: &[String], timespan_hours: u32) -> Result<Vec<Article>, NetError>;
}

/// HTTP client for the GDELT DOC API
pub struct GdeltClient {
    client: Client,
    base_url: String,
    max_records: u32,
}

impl GdeltClient {
    pub fn new(config: &HttpConfig, max_records: u32) -> Result<Self, NetError> {
        Ok(Self {
            client: create_client(config)?,
            base_url: GDELT_DOC_API.to_string(),
            max_records,
        })
    }

    pub fn with_base_url(mut self, base_url: &str) -> Self {
        self.base_url = base_url.trim_end_matches('/').to_string();
        self
    }

    /// Full request URL for a query
    pub fn build_url(&self, keywords: &[String], timespan_hours: u32) -> String {
        format!(
            "{}?query={}&mode=artlist&maxrecords={}&format=json&timespan={}h&sort=datedesc",
            self.base_url,
            urlencoding::encode(&build_query(keywords)),
            self.max_records,
            timespan_hours
        )
    }
}

#[async_trait]
impl ArticleIndex for GdeltClient {
    async fn search(&self, keywords: &[String], timespan_hours: u32) -> Result<Vec<Article>, NetError> {
        let url = self.build_url(keywords, timespan_hours);
        debug!("Querying article index: {} ({}h)", keywords.join(", "), timespan_hours);

        let response = self
            .client
            .get(&url)
            .header("Accept", "application/json")
            .send()
            .await?;
        let body = ensure_success(response)?.text().await?;
        let articles = parse_response(&body)?;

        debug!("Article index returned {} articles", articles.len());
        Ok(articles)
    }
}

/// Join keywords with OR, quoting multi-word phrases
pub fn build_query(keywords: &[String]) -> String {
    keywords
        .iter()
        .map(|k| k.trim().replace('"', ""))
        .filter(|k| !k.is_empty())
        .map(|k| if k.contains(' ') { format!("\"{}\"", k) } else { k })
        .collect::<Vec<_>>()
        .join(" OR ")
}

/// Parse `YYYYMMDDHHMMSS`, with or without the `T`/`Z` markers
pub fn parse_seen_date(raw: &str) -> Option<DateTime<Utc>> {
    let digits: String = raw.chars().filter(|c| c.is_ascii_digit()).collect();
    if digits.len() < 14 {
        return None;
    }
    NaiveDateTime::parse_from_str(&digits[..14], "%Y%m%d%H%M%S")
        .ok()
        .map(|naive| naive.and_utc())
}

/// First comma-separated field of the tone value; the service sends
/// either a number or a string like `"-3.2,1.1,4.3,..."`
fn parse_tone(value: Option<&serde_json::Value>) -> f64 {
    match value {
        Some(serde_json::Value::Number(n)) => n.as_f64().unwrap_or(0.0),
        Some(serde_json::Value::String(s)) => s
            .split(',')
            .next()
            .and_then(|first| first.trim().parse::<f64>().ok())
            .unwrap_or(0.0),
        _ => 0.0,
    }
}

#[derive(Debug, Deserialize)]
struct DocResponse {
    #[serde(default)]
    articles: Vec<DocArticle>,
}

#[derive(Debug, Deserialize)]
struct DocArticle {
    #[serde(default)]
    url: String,
    #[serde(default)]
    title: String,
    #[serde(default)]
    seendate: String,
    #[serde(default)]
    domain: String,
    language: Option<String>,
    sourcecountry: Option<String>,
    tone: Option<serde_json::Value>,
}

/// Parse a DOC API `artlist` response. An empty body means no matches.
pub fn parse_response(body: &str) -> Result<Vec<Article>, NetError> {
    if body.trim().is_empty() {
        return Ok(Vec::new());
    }

    let response: DocResponse = serde_json::from_str(body)?;
    Ok(response
        .articles
        .into_iter()
        .map(|a| Article {
            tone: parse_tone(a.tone.as_ref()),
            url: a.url,
            title: a.title,
            seen_date: a.seendate,
            domain: a.domain,
            language: a.language.unwrap_or_else(|| "en".to_string()),
            country_code: a.sourcecountry.unwrap_or_else(|| "unknown".to_string()),
        })
        .collect())
}
