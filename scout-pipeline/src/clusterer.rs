//! Headline clustering
//!
//! Greedy single pass, no backtracking. Headlines are seeded in quality
//! order (tier ascending, then newest first) and each one either joins the
//! cluster whose accumulated keyword set it overlaps most, or starts a new
//! cluster.

use chrono::{DateTime, Duration, Utc};
use std::collections::{BTreeSet, HashMap};
use tracing::debug;

use scout_core::{capitalize, extract_keywords, jaccard, truncate_chars, CategoryTuning, HeadlineRecord, TopicCluster};

/// Headlines with fewer keywords cannot be clustered meaningfully
pub const MIN_HEADLINE_KEYWORDS: usize = 2;

const LABEL_KEYWORDS: usize = 3;
const LABEL_KEYWORD_CHARS: usize = 30;
const LABEL_TITLE_WORDS: usize = 8;
const LABEL_TITLE_CHARS: usize = 50;

/// Groups headlines into topic clusters
#[derive(Debug, Clone)]
pub struct Clusterer {
    tuning: CategoryTuning,
}

impl Clusterer {
    pub fn new(tuning: CategoryTuning) -> Self {
        Self { tuning }
    }

    pub fn tuning(&self) -> &CategoryTuning {
        &self.tuning
    }

    /// Cluster headlines published within the recency window before `now`.
    /// Clusters below the minimum distinct-source count are dropped.
    pub fn cluster(&self, headlines: &[HeadlineRecord], now: DateTime<Utc>) -> Vec<TopicCluster> {
        let window_ms = (self.tuning.recency_window_hours * 3_600_000.0) as i64;
        let cutoff = Duration::try_milliseconds(window_ms)
            .and_then(|window| now.checked_sub_signed(window))
            .unwrap_or(DateTime::<Utc>::MIN_UTC);

        let mut seeded: Vec<&HeadlineRecord> = headlines
            .iter()
            .filter(|h| h.published_at > cutoff)
            .collect();
        seeded.sort_by(|a, b| {
            a.source_tier
                .cmp(&b.source_tier)
                .then_with(|| b.published_at.cmp(&a.published_at))
        });

        let mut clusters: Vec<TopicCluster> = Vec::new();
        let mut skipped = 0usize;

        for headline in seeded {
            let keywords = extract_keywords(&headline.title);
            if keywords.len() < MIN_HEADLINE_KEYWORDS {
                skipped += 1;
                continue;
            }
            let keyword_set: BTreeSet<String> = keywords.into_iter().collect();

            match self.best_match(&keyword_set, &clusters) {
                Some(idx) => clusters[idx].absorb(headline.clone(), keyword_set),
                None => clusters.push(TopicCluster::seed(headline.clone(), keyword_set)),
            }
        }

        let formed = clusters.len();
        let surviving: Vec<TopicCluster> = clusters
            .into_iter()
            .filter(|c| c.source_count() >= self.tuning.min_sources)
            .map(|c| {
                let label = topic_label(&c);
                c.with_label(label)
            })
            .collect();

        debug!(
            "Formed {} clusters ({} skipped headlines), {} with at least {} sources",
            formed,
            skipped,
            surviving.len(),
            self.tuning.min_sources
        );
        surviving
    }

    /// Index of the most similar cluster at or above the threshold.
    /// Ties go to the earliest created cluster.
    fn best_match(&self, keywords: &BTreeSet<String>, clusters: &[TopicCluster]) -> Option<usize> {
        let mut best: Option<(usize, f64)> = None;

        for (idx, cluster) in clusters.iter().enumerate() {
            let similarity = jaccard(keywords, &cluster.keywords);
            if similarity < self.tuning.similarity_threshold || similarity <= 0.0 {
                continue;
            }
            if best.map_or(true, |(_, score)| similarity > score) {
                best = Some((idx, similarity));
            }
        }

        best.map(|(idx, _)| idx)
    }
}

/// Keywords of a cluster ranked by how many of its headlines mention them.
/// Equal counts keep first-seen order.
pub fn keyword_frequencies(cluster: &TopicCluster) -> Vec<(String, usize)> {
    let mut order: Vec<String> = Vec::new();
    let mut counts: HashMap<String, usize> = HashMap::new();

    for headline in &cluster.headlines {
        for keyword in extract_keywords(&headline.title) {
            let count = counts.entry(keyword.clone()).or_insert(0);
            if *count == 0 {
                order.push(keyword);
            }
            *count += 1;
        }
    }

    let mut ranked: Vec<(String, usize)> = order
        .into_iter()
        .map(|k| {
            let count = counts.get(&k).copied().unwrap_or(0);
            (k, count)
        })
        .collect();
    ranked.sort_by(|a, b| b.1.cmp(&a.1));
    ranked
}

/// Most frequent keywords of a cluster, at most `n`
pub fn top_keywords(cluster: &TopicCluster, n: usize) -> Vec<String> {
    keyword_frequencies(cluster)
        .into_iter()
        .take(n)
        .map(|(k, _)| k)
        .collect()
}

/// Human-readable label: the top keywords when there are at least two,
/// otherwise the leading words of the seed headline
pub fn topic_label(cluster: &TopicCluster) -> String {
    let top = top_keywords(cluster, LABEL_KEYWORDS);
    if top.len() >= 2 {
        let joined = top.iter().map(|k| capitalize(k)).collect::<Vec<_>>().join(" ");
        return truncate_chars(&joined, LABEL_KEYWORD_CHARS);
    }

    let title = cluster
        .headlines
        .first()
        .map(|h| h.title.as_str())
        .unwrap_or_default();
    let words = title
        .split_whitespace()
        .filter(|w| w.chars().count() > 2)
        .take(LABEL_TITLE_WORDS)
        .collect::<Vec<_>>()
        .join(" ");
    truncate_chars(&words, LABEL_TITLE_CHARS)
}

#[cfg(test)]
mod tests {
    use super::*;
    use scout_core::SourceTier;

    fn headline(title: &str, source: &str, tier: SourceTier, hours_ago: i64, now: DateTime<Utc>) -> HeadlineRecord {
        HeadlineRecord::new(
            title,
            format!("https://{}.example/{}", source.to_lowercase(), title.len()),
            source,
            tier,
            now - Duration::hours(hours_ago),
        )
    }

    fn grain_deal_headlines(now: DateTime<Utc>) -> Vec<HeadlineRecord> {
        vec![
            headline("Russia and Ukraine sign grain export deal", "Alpha", 0, 1, now),
            headline("Ukraine and Russia grain export deal signed", "Beta", 1, 2, now),
            headline("Russia and Ukraine grain deal reopens export corridor", "Gamma", 0, 3, now),
            headline("Grain export deal between Russia and Ukraine holds", "Alpha", 0, 4, now),
            headline("Ukraine says Russia grain deal export talks continue", "Beta", 1, 5, now),
        ]
    }

    #[test]
    fn test_same_story_from_three_sources_forms_one_cluster() {
        let now = Utc::now();
        let mut headlines = grain_deal_headlines(now);
        headlines.push(headline("Heatwave grips southern european cities", "Delta", 2, 2, now));

        let clusters = Clusterer::new(CategoryTuning::default()).cluster(&headlines, now);

        assert_eq!(clusters.len(), 1);
        assert_eq!(clusters[0].source_count(), 3);
        assert_eq!(clusters[0].headline_count(), 5);
        assert!(clusters[0].keywords.contains("russia"));
        assert!(clusters[0].keywords.contains("ukraine"));
    }

    #[test]
    fn test_merges_respect_threshold() {
        let now = Utc::now();
        let tuning = CategoryTuning::default();
        let clusters = Clusterer::new(CategoryTuning { min_sources: 1, ..tuning }).cluster(
            &[
                headline("Central bank raises interest rates again", "A", 1, 1, now),
                headline("Volcano erupts near remote island village", "B", 1, 1, now),
                headline("Interest rates climb as central bank acts", "C", 1, 2, now),
            ],
            now,
        );

        assert_eq!(clusters.len(), 2);
        for cluster in &clusters {
            for h in &cluster.headlines {
                let kws: BTreeSet<String> = extract_keywords(&h.title).into_iter().collect();
                assert!(jaccard(&kws, &cluster.keywords) > 0.0);
            }
        }
    }

    fn with_threshold(threshold: f64) -> Clusterer {
        Clusterer::new(CategoryTuning {
            similarity_threshold: threshold,
            min_sources: 1,
            ..CategoryTuning::default()
        })
    }

    #[test]
    fn test_similarity_at_threshold_merges() {
        let now = Utc::now();
        // 3 shared of 6 distinct keywords: similarity exactly 0.5
        let headlines = vec![
            headline("quartz marble granite basalt", "A", 1, 1, now),
            headline("quartz marble granite pumice shale", "B", 1, 2, now),
        ];

        let merged = with_threshold(0.5).cluster(&headlines, now);
        assert_eq!(merged.len(), 1);
        assert_eq!(merged[0].headline_count(), 2);

        let split = with_threshold(0.51).cluster(&headlines, now);
        assert_eq!(split.len(), 2);
        assert!(split.iter().all(|c| c.headline_count() == 1));
    }

    #[test]
    fn test_similarity_tie_joins_earliest_cluster() {
        let now = Utc::now();
        let headlines = vec![
            headline("quartz marble granite", "A", 1, 1, now),
            headline("basalt pumice shale", "B", 1, 2, now),
            // 1 of 5 against each cluster
            headline("quartz basalt slate", "C", 1, 3, now),
        ];

        let clusters = with_threshold(0.2).cluster(&headlines, now);
        assert_eq!(clusters.len(), 2);
        assert_eq!(clusters[0].headline_count(), 2);
        assert!(clusters[0].keywords.contains("slate"));
        assert!(clusters[0].keywords.contains("granite"));
        assert_eq!(clusters[1].headline_count(), 1);
        assert!(!clusters[1].keywords.contains("slate"));
    }

    #[test]
    fn test_min_sources_gate_and_recency_window() {
        let now = Utc::now();
        let headlines = vec![
            headline("Senate passes sweeping housing reform bill", "A", 0, 1, now),
            headline("Housing reform bill clears senate vote", "A", 0, 2, now),
            headline("Housing reform bill passes senate floor", "B", 1, 100, now),
        ];

        let clusters = Clusterer::new(CategoryTuning::default()).cluster(&headlines, now);
        // the only second source is outside the 72h window
        assert!(clusters.is_empty());
    }

    #[test]
    fn test_oversized_window_keeps_everything() {
        let now = Utc::now();
        let tuning = CategoryTuning {
            recency_window_hours: f64::MAX,
            ..CategoryTuning::default()
        };
        let headlines = vec![
            headline("Housing reform bill clears senate vote", "A", 0, 2, now),
            headline("Housing reform bill passes senate floor", "B", 1, 24 * 400, now),
        ];

        let clusters = Clusterer::new(tuning).cluster(&headlines, now);
        assert_eq!(clusters.len(), 1);
        assert_eq!(clusters[0].source_count(), 2);
    }

    #[test]
    fn test_short_headlines_are_skipped() {
        let now = Utc::now();
        let headlines = vec![
            headline("Breaking news today", "A", 0, 1, now),
            headline("Wildfire", "B", 0, 1, now),
        ];
        let tuning = CategoryTuning {
            min_sources: 1,
            ..CategoryTuning::default()
        };
        assert!(Clusterer::new(tuning).cluster(&headlines, now).is_empty());
    }

    #[test]
    fn test_label_from_top_keywords() {
        let now = Utc::now();
        let clusters = Clusterer::new(CategoryTuning::default()).cluster(&grain_deal_headlines(now), now);
        let label = &clusters[0].topic_label;
        assert!(label.chars().count() <= 33);
        assert!(label.starts_with(char::is_uppercase));
        assert!(label.to_lowercase().contains("russia") || label.to_lowercase().contains("grain"));
    }
}
