//! Headline records and source descriptors
//!
//! Every fetch strategy normalizes into [`HeadlineRecord`]; the registry
//! describes where those records come from with [`SourceDescriptor`].

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};

/// Quality tier of a source (0 = deep analysis, 3 = general/social)
pub type SourceTier = u8;

/// Lowest-quality tier value
pub const MAX_TIER: SourceTier = 3;

/// How a source is fetched
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FetchProtocol {
    /// RSS-style pull returning an item list (title/link/date/description)
    Feed,
    /// REST-JSON pull returning an `articles` list
    RestJson,
    /// HackerNews top-stories id list plus per-item lookups
    HackerNews,
    /// Reddit listing JSON
    Reddit,
}

/// A configured headline source
#[derive(Debug, Clone, Serialize)]
pub struct SourceDescriptor {
    /// Human-readable name
    pub name: &'static str,
    /// Quality tier (0-3)
    pub tier: SourceTier,
    /// Fetch strategy
    pub protocol: FetchProtocol,
    /// Endpoint URL
    pub endpoint: &'static str,
    /// Categories this source is relevant for (`*` = any)
    pub applicable_categories: &'static [&'static str],
}

impl SourceDescriptor {
    /// Whether the source serves a category
    pub fn applies_to(&self, category: &str) -> bool {
        self.applicable_categories
            .iter()
            .any(|c| *c == "*" || c.eq_ignore_ascii_case(category))
    }
}

/// A single normalized headline
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct HeadlineRecord {
    pub title: String,
    pub url: String,
    pub source_name: String,
    pub source_tier: SourceTier,
    pub published_at: DateTime<Utc>,
    pub description: Option<String>,
    /// Community engagement (HN points, Reddit score)
    pub engagement_score: Option<f64>,
}

impl HeadlineRecord {
    pub fn new(
        title: impl Into<String>,
        url: impl Into<String>,
        source_name: impl Into<String>,
        source_tier: SourceTier,
        published_at: DateTime<Utc>,
    ) -> Self {
        Self {
            title: title.into(),
            url: url.into(),
            source_name: source_name.into(),
            source_tier: source_tier.min(MAX_TIER),
            published_at,
            description: None,
            engagement_score: None,
        }
    }

    pub fn with_description(mut self, description: &str) -> Self {
        self.description = Some(description.to_string());
        self
    }

    pub fn with_engagement(mut self, score: f64) -> Self {
        self.engagement_score = Some(score.max(0.0));
        self
    }

    /// Stable identity used to collapse the same story reported twice.
    /// Keyed on the URL, or on the title when a source omits links.
    pub fn fingerprint(&self) -> String {
        let key = if self.url.trim().is_empty() {
            self.title.trim().to_lowercase()
        } else {
            self.url.trim().trim_end_matches('/').to_lowercase()
        };
        let mut hasher = Sha256::new();
        hasher.update(key.as_bytes());
        format!("{:x}", hasher.finalize())[..16].to_string()
    }
}
