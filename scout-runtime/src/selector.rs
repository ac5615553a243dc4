//! Topic Selector
//!
//! One call runs one bounded pass through the pipeline:
//! - Fetch every source for the category concurrently
//! - Cluster, then score hotness for every cluster
//! - Enrich the hottest clusters concurrently, meat and depth for all
//! - Rank by combined score, drop recently used topics
//! - Select the best cluster if it clears the gate, else a fallback prompt
//!
//! Results are cached per category, so repeated calls inside the TTL
//! return the same topic without touching the network.

use chrono::{DateTime, Duration, Utc};
use futures::future::join_all;
use std::fmt;
use std::sync::Arc;
use thiserror::Error;
use tracing::{debug, info, warn};
use uuid::Uuid;

use crate::{pick_fallback, HistoryProvider};
use scout_core::{
    sources_for_category, AggregationResult, Clock, KeyValueCache, ScoutConfig, SelectionOutcome, SystemClock,
    TopicCluster, TrendingTopic, TtlCache,
};
use scout_net::{Aggregator, GdeltClient, HttpConfig, HttpFetcher, NetError};
use scout_pipeline::{
    filter_unused, rank_by_hotness, tone_spread, Clusterer, CombinedRanker, DepthScorer, EnrichmentAdapter,
    EnrichmentData, MeatScorer, RankedCluster,
};

#[derive(Error, Debug)]
pub enum SelectorError {
    #[error("Invalid rule pattern: {0}")]
    Rules(#[from] regex::Error),

    #[error("Network setup failed: {0}")]
    Net(#[from] NetError),
}

/// Pipeline state, logged on every transition
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SelectionStage {
    Aggregating,
    Clustering,
    Scoring,
    Enriching,
    Ranking,
    Filtering,
    Selected,
    Fallback,
}

impl SelectionStage {
    pub fn is_terminal(&self) -> bool {
        matches!(self, SelectionStage::Selected | SelectionStage::Fallback)
    }
}

impl fmt::Display for SelectionStage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            SelectionStage::Aggregating => "AGGREGATING",
            SelectionStage::Clustering => "CLUSTERING",
            SelectionStage::Scoring => "SCORING",
            SelectionStage::Enriching => "ENRICHING",
            SelectionStage::Ranking => "RANKING",
            SelectionStage::Filtering => "FILTERING",
            SelectionStage::Selected => "SELECTED",
            SelectionStage::Fallback => "FALLBACK",
        };
        f.write_str(name)
    }
}

fn enter(category: &str, stage: SelectionStage) {
    debug!("[{}] -> {}", category, stage);
}

fn cache_key(category: &str) -> String {
    category.trim().to_lowercase()
}

/// The topic selection orchestrator
pub struct Selector {
    config: ScoutConfig,
    aggregator: Aggregator,
    enrichment: EnrichmentAdapter,
    depth: Arc<DepthScorer>,
    meat: MeatScorer,
    cache: Arc<dyn KeyValueCache<AggregationResult>>,
    clock: Arc<dyn Clock>,
}

impl Selector {
    /// Assemble a selector from its collaborators
    pub fn new(config: ScoutConfig, aggregator: Aggregator, enrichment: EnrichmentAdapter) -> Result<Self, SelectorError> {
        let clock: Arc<dyn Clock> = Arc::new(SystemClock);
        let cache = Arc::new(TtlCache::with_clock(
            Duration::minutes(config.selection.cache_ttl_minutes),
            clock.clone(),
        ));
        let meat = MeatScorer::new(config.meat);

        Ok(Self {
            aggregator: aggregator.with_max_concurrent(config.selection.max_concurrent_fetches),
            enrichment,
            depth: Arc::new(DepthScorer::new()?),
            meat,
            cache,
            clock,
            config,
        })
    }

    /// Selector wired to the live HTTP fetchers and article index
    pub fn from_config(config: ScoutConfig, http: HttpConfig) -> Result<Self, SelectorError> {
        let fetcher = Arc::new(HttpFetcher::new(http.clone())?);
        let aggregator = Aggregator::new(fetcher);
        let index = Arc::new(GdeltClient::new(&http, config.enrichment.max_records)?);
        let enrichment = EnrichmentAdapter::new(index, config.enrichment);
        Self::new(config, aggregator, enrichment)
    }

    pub fn with_cache(mut self, cache: Arc<dyn KeyValueCache<AggregationResult>>) -> Self {
        self.cache = cache;
        self
    }

    /// Replace the clock; the default result cache is rebuilt on it
    pub fn with_clock(mut self, clock: Arc<dyn Clock>) -> Self {
        self.cache = Arc::new(TtlCache::with_clock(
            Duration::minutes(self.config.selection.cache_ttl_minutes),
            clock.clone(),
        ));
        self.clock = clock;
        self
    }

    pub fn with_depth_scorer(mut self, depth: DepthScorer) -> Self {
        self.depth = Arc::new(depth);
        self
    }

    pub fn config(&self) -> &ScoutConfig {
        &self.config
    }

    /// Pick the topic for a category. Never fails: every error path ends
    /// in a fallback prompt.
    pub async fn select_topic(&self, category: &str, history: &dyn HistoryProvider) -> TrendingTopic {
        self.aggregate(category, history).await.selected_topic
    }

    /// Ranked review list: retained clusters minus recently used topics
    pub async fn trending_topics(&self, category: &str, history: &dyn HistoryProvider) -> Vec<TrendingTopic> {
        let used = self.used_topics(history).await;
        let result = match self.cached(category) {
            Some(cached) => cached,
            None => self.refresh(category, &used).await,
        };
        filter_unused(result.clusters, &used, |t| t.topic.as_str())
            .into_iter()
            .take(self.config.selection.retained_clusters)
            .collect()
    }

    /// Full aggregation result for a category, cached for the configured TTL
    pub async fn aggregate(&self, category: &str, history: &dyn HistoryProvider) -> AggregationResult {
        if let Some(cached) = self.cached(category) {
            return cached;
        }
        let used = self.used_topics(history).await;
        self.refresh(category, &used).await
    }

    fn cached(&self, category: &str) -> Option<AggregationResult> {
        let cached = self.cache.get(&cache_key(category))?;
        info!("Using cached topics for {}", category);
        Some(cached)
    }

    async fn refresh(&self, category: &str, used: &[String]) -> AggregationResult {
        let result = self.run(category, used).await;
        self.cache.put(&cache_key(category), result.clone());
        result
    }

    /// Drop cached aggregation results and enrichment lookups
    pub fn clear_cache(&self) {
        self.cache.clear();
        self.enrichment.clear_cache();
    }

    async fn used_topics(&self, history: &dyn HistoryProvider) -> Vec<String> {
        match history.topics_used_since(self.config.selection.history_days).await {
            Ok(used) => {
                debug!("Found {} recently used topics", used.len());
                used
            }
            Err(e) => {
                warn!("History unavailable, assuming no used topics: {}", e);
                Vec::new()
            }
        }
    }

    async fn run(&self, category: &str, used: &[String]) -> AggregationResult {
        let now = self.clock.now();
        let tuning = self.config.tuning_for(category);
        let selection = &self.config.selection;

        enter(category, SelectionStage::Aggregating);
        let sources = sources_for_category(category);
        let headlines = self.aggregator.aggregate(sources).await;
        let total_headlines = headlines.len();

        enter(category, SelectionStage::Clustering);
        let clusters = Clusterer::new(tuning).cluster(&headlines, now);
        info!("Formed {} topic clusters for {}", clusters.len(), category);
        if clusters.is_empty() {
            return self.fallback(category, now, total_headlines, Vec::new());
        }

        enter(category, SelectionStage::Scoring);
        let clusters = rank_by_hotness(clusters, now);

        enter(category, SelectionStage::Enriching);
        let clusters = self.enrich(clusters).await;

        enter(category, SelectionStage::Ranking);
        let ranker = CombinedRanker::new(self.config.ranking, tuning, self.depth.clone());
        let ranked = ranker.rank(clusters, now);
        let retained: Vec<TrendingTopic> = ranked
            .iter()
            .take(selection.retained_clusters)
            .map(|r| trending(r, category, now))
            .collect();

        enter(category, SelectionStage::Filtering);
        let available = filter_unused(ranked, used, |r| r.cluster.topic_label.as_str());
        for (i, r) in available.iter().take(5).enumerate() {
            debug!(
                "  {}. [C:{} M:{} H:{}] {} ({} sources)",
                i + 1,
                r.combined_score,
                r.cluster.meat_score.map_or(0, |m| m.meat_score),
                r.cluster.hotness_score,
                r.cluster.topic_label,
                r.cluster.source_count()
            );
        }

        match available.first() {
            Some(best) if self.meets_threshold(&best.cluster) => {
                enter(category, SelectionStage::Selected);
                let selected_topic = trending(best, category, now);
                info!(
                    "Selected \"{}\" for {} (combined {}, hotness {})",
                    selected_topic.topic, category, best.combined_score, selected_topic.hotness_score
                );
                AggregationResult {
                    run_id: Uuid::new_v4(),
                    category: category.to_string(),
                    fetched_at: now,
                    total_headlines,
                    clusters: retained,
                    selected_topic,
                    outcome: SelectionOutcome::Selected,
                }
            }
            _ => self.fallback(category, now, total_headlines, retained),
        }
    }

    /// Meat for every cluster, from enrichment for the hottest K and from
    /// cluster signals for the rest; depth for every cluster
    async fn enrich(&self, clusters: Vec<TopicCluster>) -> Vec<TopicCluster> {
        let k = self.config.selection.enrich_top_k.min(clusters.len());
        let mut clusters = clusters;
        let rest = clusters.split_off(k);
        let top = clusters;

        debug!("Enriching top {} clusters", top.len());
        let lookups: Vec<EnrichmentData> = join_all(top.iter().map(|c| self.enrichment.enrich(c))).await;

        let enriched = top.into_iter().zip(lookups).map(|(cluster, data)| {
            let spread = tone_spread(&data.articles);
            let cluster = self.meat.apply(cluster, Some(&data));
            self.depth.apply(cluster, spread)
        });
        let estimated = rest.into_iter().map(|cluster| {
            let cluster = self.meat.apply(cluster, None);
            self.depth.apply(cluster, None)
        });

        enriched.chain(estimated).collect()
    }

    /// Either threshold is enough to qualify
    fn meets_threshold(&self, cluster: &TopicCluster) -> bool {
        let selection = &self.config.selection;
        let meat = cluster.meat_score.map_or(0, |m| m.meat_score);
        meat >= selection.min_meat_score || cluster.hotness_score >= selection.min_hotness_score
    }

    fn fallback(
        &self,
        category: &str,
        now: DateTime<Utc>,
        total_headlines: usize,
        clusters: Vec<TrendingTopic>,
    ) -> AggregationResult {
        enter(category, SelectionStage::Fallback);
        let topic = pick_fallback(category);
        warn!("No trending topic met threshold for {}, using fallback: \"{}\"", category, topic);

        AggregationResult {
            run_id: Uuid::new_v4(),
            category: category.to_string(),
            fetched_at: now,
            total_headlines,
            clusters,
            selected_topic: TrendingTopic::fallback(topic, category),
            outcome: SelectionOutcome::Fallback,
        }
    }
}

fn trending(ranked: &RankedCluster, category: &str, now: DateTime<Utc>) -> TrendingTopic {
    ranked
        .cluster
        .to_trending(category, now)
        .with_combined_score(ranked.combined_score)
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use scout_core::{HeadlineRecord, ManualClock, NoopCache, SourceDescriptor};
    use scout_net::{Article, ArticleIndex, SourceFetcher};
    use std::collections::HashMap;
    use std::sync::atomic::{AtomicUsize, Ordering};

    use crate::{fallback_topics, HistoryError, HistoryRecord, InMemoryHistory};

    struct ScriptedFetcher {
        by_source: HashMap<String, Vec<HeadlineRecord>>,
        calls: AtomicUsize,
    }

    impl ScriptedFetcher {
        fn new(headlines: Vec<HeadlineRecord>) -> Self {
            let mut by_source: HashMap<String, Vec<HeadlineRecord>> = HashMap::new();
            for h in headlines {
                by_source.entry(h.source_name.clone()).or_default().push(h);
            }
            Self {
                by_source,
                calls: AtomicUsize::new(0),
            }
        }
    }

    #[async_trait]
    impl SourceFetcher for ScriptedFetcher {
        async fn fetch(&self, source: &SourceDescriptor) -> Result<Vec<HeadlineRecord>, NetError> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            Ok(self.by_source.get(source.name).cloned().unwrap_or_default())
        }
    }

    struct FailingFetcher;

    #[async_trait]
    impl SourceFetcher for FailingFetcher {
        async fn fetch(&self, source: &SourceDescriptor) -> Result<Vec<HeadlineRecord>, NetError> {
            Err(NetError::Status {
                url: source.endpoint.to_string(),
                status: 503,
            })
        }
    }

    struct EmptyIndex;

    #[async_trait]
    impl ArticleIndex for EmptyIndex {
        async fn search(&self, _keywords: &[String], _hours: u32) -> Result<Vec<Article>, NetError> {
            Ok(Vec::new())
        }
    }

    struct BrokenHistory;

    #[async_trait]
    impl HistoryProvider for BrokenHistory {
        async fn topics_used_since(&self, _days: u32) -> Result<Vec<String>, HistoryError> {
            Err(HistoryError::Unavailable("offline".to_string()))
        }
    }

    struct CountingHistory {
        inner: InMemoryHistory,
        reads: AtomicUsize,
    }

    #[async_trait]
    impl HistoryProvider for CountingHistory {
        async fn topics_used_since(&self, days: u32) -> Result<Vec<String>, HistoryError> {
            self.reads.fetch_add(1, Ordering::SeqCst);
            self.inner.topics_used_since(days).await
        }
    }

    fn headline(title: &str, source: &str, tier: u8, hours_ago: i64, now: DateTime<Utc>) -> HeadlineRecord {
        HeadlineRecord::new(
            title,
            format!("https://{}.example/{}", source.replace(' ', "-").to_lowercase(), title.len()),
            source,
            tier,
            now - Duration::hours(hours_ago),
        )
    }

    // Two stories for the Science category: fusion (3 sources), microbes (2 sources)
    fn science_headlines(now: DateTime<Utc>) -> Vec<HeadlineRecord> {
        vec![
            headline("Fusion reactor achieves record plasma confinement milestone", "Quanta Magazine", 0, 1, now),
            headline("Record plasma confinement achieved in fusion reactor", "Nature", 1, 2, now),
            headline("Fusion reactor plasma confinement record confirmed", "Science Mag", 1, 3, now),
            headline("Deep sea microbes survive extreme pressure experiments", "Nautilus", 0, 2, now),
            headline("Microbes from deep sea survive extreme pressure", "Phys.org", 1, 4, now),
        ]
    }

    fn config() -> ScoutConfig {
        ScoutConfig::embedded().unwrap()
    }

    fn selector(fetcher: Arc<dyn SourceFetcher>, clock: Arc<ManualClock>, config: ScoutConfig) -> Selector {
        let aggregator = Aggregator::new(fetcher);
        let enrichment = EnrichmentAdapter::new(Arc::new(EmptyIndex), config.enrichment).with_clock(clock.clone());
        Selector::new(config, aggregator, enrichment).unwrap().with_clock(clock)
    }

    #[tokio::test]
    async fn test_selects_multi_source_story() {
        let now = Utc::now();
        let clock = Arc::new(ManualClock::new(now));
        let fetcher = Arc::new(ScriptedFetcher::new(science_headlines(now)));
        let selector = selector(fetcher, clock, config());

        let result = selector.aggregate("Science", &InMemoryHistory::empty()).await;
        assert_eq!(result.outcome, SelectionOutcome::Selected);
        assert_eq!(result.total_headlines, 5);
        assert_eq!(result.clusters.len(), 2);
        assert!(result.selected_topic.source_count >= 2);
        assert!(result.selected_topic.meat_score.is_some());
        assert!(result.selected_topic.depth_score.is_some());
        assert!(result.selected_topic.combined_score.is_some());
        assert_eq!(result.selected_topic.category, "Science");
    }

    #[tokio::test]
    async fn test_no_headlines_falls_back() {
        let clock = Arc::new(ManualClock::new(Utc::now()));
        let selector = selector(Arc::new(ScriptedFetcher::new(Vec::new())), clock, config());

        let topic = selector.select_topic("Climate", &InMemoryHistory::empty()).await;
        assert_eq!(topic.source_count, 0);
        assert!(topic.is_fallback());
        assert!(fallback_topics("Climate").contains(&topic.topic.as_str()));
    }

    #[tokio::test]
    async fn test_failing_sources_fall_back() {
        let clock = Arc::new(ManualClock::new(Utc::now()));
        let selector = selector(Arc::new(FailingFetcher), clock, config());

        let result = selector.aggregate("Conflict", &InMemoryHistory::empty()).await;
        assert_eq!(result.outcome, SelectionOutcome::Fallback);
        assert_eq!(result.total_headlines, 0);
        assert!(fallback_topics("Conflict").contains(&result.selected_topic.topic.as_str()));
    }

    #[tokio::test]
    async fn test_gate_rejects_weak_best_cluster() {
        let now = Utc::now();
        let clock = Arc::new(ManualClock::new(now));
        let mut config = config();
        config.selection.min_meat_score = 1001;
        config.selection.min_hotness_score = 1001;
        let selector = selector(Arc::new(ScriptedFetcher::new(science_headlines(now))), clock, config);

        let result = selector.aggregate("Science", &InMemoryHistory::empty()).await;
        assert_eq!(result.outcome, SelectionOutcome::Fallback);
        assert_eq!(result.selected_topic.source_count, 0);
        assert_eq!(result.clusters.len(), 2);
    }

    #[tokio::test]
    async fn test_repeat_calls_are_cached() {
        let now = Utc::now();
        let clock = Arc::new(ManualClock::new(now));
        let fetcher = Arc::new(ScriptedFetcher::new(science_headlines(now)));
        let selector = selector(fetcher.clone(), clock.clone(), config());
        let history = InMemoryHistory::empty();

        let first = selector.select_topic("Science", &history).await;
        let fetches = fetcher.calls.load(Ordering::SeqCst);
        assert!(fetches > 0);

        clock.advance(Duration::minutes(10));
        let second = selector.select_topic("science", &history).await;
        assert_eq!(first, second);
        assert_eq!(fetcher.calls.load(Ordering::SeqCst), fetches);

        clock.advance(Duration::minutes(25));
        selector.select_topic("Science", &history).await;
        assert_eq!(fetcher.calls.load(Ordering::SeqCst), fetches * 2);

        selector.clear_cache();
        selector.select_topic("Science", &history).await;
        assert_eq!(fetcher.calls.load(Ordering::SeqCst), fetches * 3);
    }

    #[tokio::test]
    async fn test_noop_cache_always_refetches() {
        let now = Utc::now();
        let clock = Arc::new(ManualClock::new(now));
        let fetcher = Arc::new(ScriptedFetcher::new(science_headlines(now)));
        let selector = selector(fetcher.clone(), clock, config()).with_cache(Arc::new(NoopCache));
        let history = InMemoryHistory::empty();

        selector.select_topic("Science", &history).await;
        let fetches = fetcher.calls.load(Ordering::SeqCst);
        selector.select_topic("Science", &history).await;
        assert_eq!(fetcher.calls.load(Ordering::SeqCst), fetches * 2);
    }

    #[tokio::test]
    async fn test_used_topic_is_skipped() {
        let now = Utc::now();
        let clock = Arc::new(ManualClock::new(now));
        let fetcher = Arc::new(ScriptedFetcher::new(science_headlines(now)));
        let selector = selector(fetcher, clock.clone(), config());

        let unfiltered = selector.select_topic("Science", &InMemoryHistory::empty()).await;
        assert!(!unfiltered.is_fallback());

        selector.clear_cache();
        let history = InMemoryHistory::new(vec![HistoryRecord::new(&unfiltered.topic, now - Duration::days(1))])
            .with_clock(clock);
        let filtered = selector.select_topic("Science", &history).await;

        assert!(!filtered.is_fallback());
        assert_ne!(filtered.topic, unfiltered.topic);

        let trending = selector.trending_topics("Science", &history).await;
        assert_eq!(trending.len(), 1);
        assert_eq!(trending[0].topic, filtered.topic);
    }

    #[tokio::test]
    async fn test_trending_reads_history_once() {
        let now = Utc::now();
        let clock = Arc::new(ManualClock::new(now));
        let selector = selector(Arc::new(ScriptedFetcher::new(science_headlines(now))), clock, config());
        let history = CountingHistory {
            inner: InMemoryHistory::empty(),
            reads: AtomicUsize::new(0),
        };

        let trending = selector.trending_topics("Science", &history).await;
        assert_eq!(trending.len(), 2);
        assert_eq!(history.reads.load(Ordering::SeqCst), 1);

        selector.trending_topics("Science", &history).await;
        assert_eq!(history.reads.load(Ordering::SeqCst), 2);
    }

    #[tokio::test]
    async fn test_history_failure_is_ignored() {
        let now = Utc::now();
        let clock = Arc::new(ManualClock::new(now));
        let selector = selector(Arc::new(ScriptedFetcher::new(science_headlines(now))), clock, config());

        let topic = selector.select_topic("Science", &BrokenHistory).await;
        assert!(!topic.is_fallback());
    }

    #[test]
    fn test_stage_names() {
        assert_eq!(SelectionStage::Aggregating.to_string(), "AGGREGATING");
        assert!(SelectionStage::Fallback.is_terminal());
        assert!(!SelectionStage::Ranking.is_terminal());
    }
}
