//! Hotness scoring
//!
//! Pure function of a cluster and `now`. Always computed; it is the only
//! score available when enrichment is not.

use chrono::{DateTime, Utc};
use serde::Serialize;

use scout_core::{hours_between, tier_weight, TopicCluster, MAX_SCORE};

/// Sub-scores on a 0-100 scale (engagement 0-50) and the weighted total
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct HotnessBreakdown {
    pub diversity: f64,
    pub quality: f64,
    pub recency: f64,
    pub velocity: f64,
    pub engagement: f64,
    /// Weighted sum scaled to 0-1000
    pub total: u32,
}

/// Sum of per-headline tier weights, uncapped
pub fn quality_sum(cluster: &TopicCluster) -> f64 {
    cluster.headlines.iter().map(|h| tier_weight(h.source_tier)).sum()
}

/// Headlines per hour over the cluster's span (span floored at 1h)
pub fn headline_velocity(cluster: &TopicCluster) -> f64 {
    cluster.headline_count() as f64 / cluster.time_span_hours()
}

fn recency_step(hours_old: f64) -> f64 {
    match hours_old {
        h if h < 6.0 => 100.0,
        h if h < 12.0 => 80.0,
        h if h < 24.0 => 60.0,
        h if h < 48.0 => 40.0,
        _ => 20.0,
    }
}

/// Compute every hotness component for a cluster
pub fn hotness(cluster: &TopicCluster, now: DateTime<Utc>) -> HotnessBreakdown {
    let diversity = (cluster.source_count() as f64 * 15.0).min(100.0);
    let quality = quality_sum(cluster).min(100.0);
    let recency = recency_step(hours_between(cluster.last_seen_at, now));
    let velocity = (headline_velocity(cluster) * 20.0).min(100.0);
    let engagement = cluster
        .headlines
        .iter()
        .filter_map(|h| h.engagement_score)
        .map(|score| (score / 100.0).min(10.0))
        .sum::<f64>()
        .min(50.0);

    let weighted = 0.30 * diversity + 0.25 * quality + 0.20 * recency + 0.15 * velocity + 0.10 * engagement;
    let total = ((weighted * 10.0).round() as u32).min(MAX_SCORE);

    HotnessBreakdown {
        diversity,
        quality,
        recency,
        velocity,
        engagement,
        total,
    }
}

/// Attach hotness, quality and velocity to a cluster
pub fn score_hotness(cluster: TopicCluster, now: DateTime<Utc>) -> TopicCluster {
    let breakdown = hotness(&cluster, now);
    let quality = quality_sum(&cluster);
    let velocity = headline_velocity(&cluster);
    cluster.with_hotness(breakdown.total, quality, velocity)
}

/// Score every cluster and order them hottest first
pub fn rank_by_hotness(clusters: Vec<TopicCluster>, now: DateTime<Utc>) -> Vec<TopicCluster> {
    let mut scored: Vec<TopicCluster> = clusters.into_iter().map(|c| score_hotness(c, now)).collect();
    scored.sort_by(|a, b| b.hotness_score.cmp(&a.hotness_score));
    scored
}
