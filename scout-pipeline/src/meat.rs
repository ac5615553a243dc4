//! Meat scoring
//!
//! `M = alpha * (E * Vv) + beta * (Svar * L)`, scaled to 0-1000, where
//! E is entity density, Vv mention velocity, Svar sentiment spread and L
//! source linkage. Every component is clamped to [0, 1].

use std::collections::HashSet;

use crate::{article_entities, EnrichmentData};
use scout_core::{MeatScoreComponents, MeatWeights, TopicCluster, MAX_SCORE};
use scout_net::Article;

/// Entities per article that saturate E
pub const ENTITY_DENSITY_NORM: f64 = 10.0;
/// Raw velocity ratio that saturates Vv
pub const VELOCITY_NORM: f64 = 5.0;
/// Tone standard deviation that saturates Svar
pub const SENTIMENT_NORM: f64 = 50.0;
/// Unique domains that saturate L
pub const LINKAGE_NORM: f64 = 20.0;
/// Keyword count that saturates E when no articles are available
pub const KEYWORD_DENSITY_NORM: f64 = 5.0;

/// Population standard deviation; 0 for fewer than two values
fn std_dev(values: &[f64]) -> f64 {
    if values.len() < 2 {
        return 0.0;
    }
    let n = values.len() as f64;
    let mean = values.iter().sum::<f64>() / n;
    let variance = values.iter().map(|v| (v - mean).powi(2)).sum::<f64>() / n;
    variance.sqrt()
}

fn keyword_density(cluster: &TopicCluster) -> f64 {
    (cluster.keywords.len() as f64 / KEYWORD_DENSITY_NORM).min(1.0)
}

/// Unique article entities per article, normalized
pub fn entity_density(articles: &[Article], cluster: &TopicCluster) -> f64 {
    if articles.is_empty() {
        return keyword_density(cluster);
    }
    let density = article_entities(articles).len() as f64 / articles.len() as f64;
    (density / ENTITY_DENSITY_NORM).min(1.0)
}

/// Growth of the recent window over the previous one, mapped onto [0, 1]
pub fn mention_velocity(recent: usize, previous: usize) -> f64 {
    let baseline = previous.max(1) as f64;
    let raw = (recent as f64 - previous as f64) / baseline;
    ((raw + 1.0) / (VELOCITY_NORM + 1.0)).clamp(0.0, 1.0)
}

/// Raw standard deviation of article tone; `None` below two articles
pub fn tone_spread(articles: &[Article]) -> Option<f64> {
    if articles.len() < 2 {
        return None;
    }
    let tones: Vec<f64> = articles.iter().map(|a| a.tone).collect();
    Some(std_dev(&tones))
}

/// Spread of article tone, normalized
pub fn sentiment_variance(articles: &[Article]) -> f64 {
    tone_spread(articles).map_or(0.0, |spread| (spread / SENTIMENT_NORM).min(1.0))
}

/// Unique article domains plus the cluster's own sources, normalized
pub fn linkage(articles: &[Article], cluster: &TopicCluster) -> f64 {
    let domains: HashSet<String> = articles
        .iter()
        .map(|a| a.domain.trim().to_lowercase())
        .filter(|d| !d.is_empty())
        .chain(cluster.source_names.iter().map(|s| s.to_lowercase()))
        .collect();
    (domains.len() as f64 / LINKAGE_NORM).min(1.0)
}

/// Combines meat components under configurable weights
#[derive(Debug, Clone, Copy, Default)]
pub struct MeatScorer {
    weights: MeatWeights,
}

impl MeatScorer {
    pub fn new(weights: MeatWeights) -> Self {
        Self { weights }
    }

    pub fn weights(&self) -> &MeatWeights {
        &self.weights
    }

    fn combine(&self, entity_density: f64, velocity: f64, sentiment_variance: f64, linkage: f64) -> MeatScoreComponents {
        let raw = self.weights.alpha * entity_density * velocity + self.weights.beta * sentiment_variance * linkage;
        let meat_score = ((raw * MAX_SCORE as f64).round().max(0.0) as u32).min(MAX_SCORE);

        MeatScoreComponents {
            entity_density,
            velocity,
            sentiment_variance,
            linkage,
            meat_score,
            enriched: false,
        }
    }

    /// Score from enrichment data; empty data degrades to [`MeatScorer::fallback`]
    pub fn score(&self, cluster: &TopicCluster, data: &EnrichmentData) -> MeatScoreComponents {
        if data.is_empty() {
            return self.fallback(cluster);
        }
        MeatScoreComponents {
            enriched: true,
            ..self.combine(
                entity_density(&data.articles, cluster),
                mention_velocity(data.recent_12h, data.previous_12h),
                sentiment_variance(&data.articles),
                linkage(&data.articles, cluster),
            )
        }
    }

    /// Cluster-native estimate used when no enrichment is available
    pub fn fallback(&self, cluster: &TopicCluster) -> MeatScoreComponents {
        self.combine(
            keyword_density(cluster),
            (cluster.velocity / VELOCITY_NORM).min(1.0),
            0.0,
            (cluster.source_count() as f64 / LINKAGE_NORM).min(1.0),
        )
    }

    /// Attach a meat score to a cluster
    pub fn apply(&self, cluster: TopicCluster, data: Option<&EnrichmentData>) -> TopicCluster {
        let meat = match data {
            Some(data) => self.score(&cluster, data),
            None => self.fallback(&cluster),
        };
        cluster.with_meat(meat)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;
    use scout_core::HeadlineRecord;

    fn article(title: &str, domain: &str, tone: f64) -> Article {
        Article {
            url: format!("https://{}/story", domain),
            title: title.to_string(),
            seen_date: String::new(),
            domain: domain.to_string(),
            language: "English".to_string(),
            country_code: String::new(),
            tone,
        }
    }

    fn cluster() -> TopicCluster {
        let now = Utc::now();
        let mut cluster = TopicCluster::seed(
            HeadlineRecord::new("NATO summit weighs Ukraine aid", "https://a/1", "Alpha", 0, now),
            ["nato", "summit", "ukraine", "aid"].map(String::from),
        );
        cluster.absorb(
            HeadlineRecord::new("Ukraine aid tops NATO summit agenda", "https://b/1", "Beta", 1, now),
            ["nato", "summit", "ukraine", "agenda"].map(String::from),
        );
        cluster.with_hotness(400, 25.0, 2.0)
    }

    #[test]
    fn test_velocity_mapping() {
        assert!((mention_velocity(0, 0) - 1.0 / 6.0).abs() < 1e-9);
        assert_eq!(mention_velocity(0, 10), 0.0);
        assert_eq!(mention_velocity(100, 1), 1.0);
        assert!((mention_velocity(20, 10) - 2.0 / 6.0).abs() < 1e-9);
    }

    #[test]
    fn test_sentiment_variance_needs_two_articles() {
        assert_eq!(sentiment_variance(&[article("a", "a.com", -40.0)]), 0.0);
        let spread = sentiment_variance(&[article("a", "a.com", -10.0), article("b", "b.com", 10.0)]);
        assert!((spread - 0.2).abs() < 1e-9);
    }

    #[test]
    fn test_linkage_counts_domains_and_sources() {
        let articles = vec![article("a", "a.com", 0.0), article("b", "A.com", 0.0), article("c", "c.com", 0.0)];
        assert!((linkage(&articles, &cluster()) - 4.0 / 20.0).abs() < 1e-9);
    }

    #[test]
    fn test_fallback_uses_cluster_signals() {
        let meat = MeatScorer::default().fallback(&cluster());
        assert_eq!(meat.entity_density, 1.0);
        assert!((meat.velocity - 0.4).abs() < 1e-9);
        assert_eq!(meat.sentiment_variance, 0.0);
        assert_eq!(meat.meat_score, 240);
        assert!(!meat.enriched);
    }

    #[test]
    fn test_empty_enrichment_degrades_to_fallback() {
        let scorer = MeatScorer::default();
        let c = cluster();
        assert_eq!(scorer.score(&c, &EnrichmentData::default()), scorer.fallback(&c));
    }

    #[test]
    fn test_components_stay_in_range() {
        let articles: Vec<Article> = (0..30)
            .map(|i| article("NATO Russia China Iran United States", &format!("d{}.com", i), (i as f64 - 15.0) * 10.0))
            .collect();
        let data = EnrichmentData {
            articles,
            recent_12h: 500,
            previous_12h: 0,
        };
        let meat = MeatScorer::default().score(&cluster(), &data);
        for component in [meat.entity_density, meat.velocity, meat.sentiment_variance, meat.linkage] {
            assert!((0.0..=1.0).contains(&component));
        }
        assert!(meat.meat_score <= MAX_SCORE);
        assert!(meat.enriched);
    }
}
