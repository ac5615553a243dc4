//! Enrichment adapter
//!
//! Wraps an [`ArticleIndex`] with a timeout and a TTL cache. Lookups never
//! fail: timeouts, transport errors and empty responses all come back as an
//! empty [`EnrichmentData`], and the meat scorer falls back accordingly.

use chrono::{DateTime, Duration, Utc};
use std::collections::HashSet;
use std::sync::Arc;
use tracing::{debug, warn};

use crate::top_keywords;
use scout_core::{
    extract_entities, Clock, EnrichmentPolicy, KeyValueCache, SystemClock, TopicCluster, TtlCache,
};
use scout_net::{Article, ArticleIndex};

/// Keywords per article-index query
pub const QUERY_KEYWORDS: usize = 3;

/// Width of each velocity comparison window
pub const VELOCITY_WINDOW_HOURS: i64 = 12;

/// What the article index knows about a cluster's story
#[derive(Debug, Clone, Default, PartialEq)]
pub struct EnrichmentData {
    pub articles: Vec<Article>,
    /// Articles seen in the most recent window
    pub recent_12h: usize,
    /// Articles seen in the window before that
    pub previous_12h: usize,
}

impl EnrichmentData {
    pub fn is_empty(&self) -> bool {
        self.articles.is_empty()
    }
}

/// Cache key: sorted keywords and the timespan
pub fn cache_key(keywords: &[String], timespan_hours: u32) -> String {
    let mut sorted: Vec<&str> = keywords.iter().map(String::as_str).collect();
    sorted.sort_unstable();
    format!("{}:{}h", sorted.join("|"), timespan_hours)
}

/// Unique entities across article titles, case-insensitive
pub fn article_entities(articles: &[Article]) -> Vec<String> {
    let mut seen = HashSet::new();
    let mut entities = Vec::new();
    for article in articles {
        for entity in extract_entities(&article.title) {
            if seen.insert(entity.clone()) {
                entities.push(entity);
            }
        }
    }
    entities
}

/// Split articles into the last 12h and the 12h before that
pub fn velocity_windows(articles: &[Article], now: DateTime<Utc>) -> (usize, usize) {
    let recent_cutoff = now - Duration::hours(VELOCITY_WINDOW_HOURS);
    let previous_cutoff = recent_cutoff - Duration::hours(VELOCITY_WINDOW_HOURS);

    articles
        .iter()
        .filter_map(Article::seen_at)
        .fold((0, 0), |(recent, previous), seen| {
            if seen > recent_cutoff {
                (recent + 1, previous)
            } else if seen > previous_cutoff {
                (recent, previous + 1)
            } else {
                (recent, previous)
            }
        })
}

/// Cached, time-bounded access to the article index
pub struct EnrichmentAdapter {
    index: Arc<dyn ArticleIndex>,
    cache: Arc<dyn KeyValueCache<Vec<Article>>>,
    clock: Arc<dyn Clock>,
    policy: EnrichmentPolicy,
}

impl EnrichmentAdapter {
    pub fn new(index: Arc<dyn ArticleIndex>, policy: EnrichmentPolicy) -> Self {
        let clock: Arc<dyn Clock> = Arc::new(SystemClock);
        let cache = Arc::new(TtlCache::with_clock(
            Duration::minutes(policy.cache_ttl_minutes),
            clock.clone(),
        ));
        Self {
            index,
            cache,
            clock,
            policy,
        }
    }

    pub fn with_cache(mut self, cache: Arc<dyn KeyValueCache<Vec<Article>>>) -> Self {
        self.cache = cache;
        self
    }

    /// Replace the clock; the default cache is rebuilt on the same clock
    pub fn with_clock(mut self, clock: Arc<dyn Clock>) -> Self {
        self.cache = Arc::new(TtlCache::with_clock(
            Duration::minutes(self.policy.cache_ttl_minutes),
            clock.clone(),
        ));
        self.clock = clock;
        self
    }

    pub fn policy(&self) -> &EnrichmentPolicy {
        &self.policy
    }

    /// Drop every cached lookup
    pub fn clear_cache(&self) {
        self.cache.clear();
    }

    /// Articles matching any keyword within the timespan. Empty on failure.
    pub async fn query(&self, keywords: &[String], timespan_hours: u32) -> Vec<Article> {
        if keywords.is_empty() {
            return Vec::new();
        }

        let key = cache_key(keywords, timespan_hours);
        if let Some(hit) = self.cache.get(&key) {
            debug!("Enrichment cache hit for {}", key);
            return hit;
        }

        let limit = std::time::Duration::from_secs(self.policy.timeout_secs);
        let articles = match tokio::time::timeout(limit, self.index.search(keywords, timespan_hours)).await {
            Ok(Ok(articles)) => articles,
            Ok(Err(e)) => {
                warn!("Enrichment query for {} failed: {}", keywords.join(", "), e);
                Vec::new()
            }
            Err(_) => {
                warn!(
                    "Enrichment query for {} timed out after {}s",
                    keywords.join(", "),
                    self.policy.timeout_secs
                );
                Vec::new()
            }
        };

        if articles.is_empty() {
            debug!("No articles for {}", keywords.join(", "));
        } else {
            self.cache.put(&key, articles.clone());
        }
        articles
    }

    /// Look up a cluster's top keywords and split the hits into velocity windows
    pub async fn enrich(&self, cluster: &TopicCluster) -> EnrichmentData {
        let keywords = top_keywords(cluster, QUERY_KEYWORDS);
        let articles = self.query(&keywords, self.policy.timespan_hours).await;
        let (recent_12h, previous_12h) = velocity_windows(&articles, self.clock.now());

        EnrichmentData {
            articles,
            recent_12h,
            previous_12h,
        }
    }
}
