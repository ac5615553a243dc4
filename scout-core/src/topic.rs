//! Topic clusters, score components and the externally visible result
//!
//! A [`TopicCluster`] is built fresh per selection run. Scoring stages do
//! not mutate clusters they are handed; they return a new value with the
//! component attached (`with_hotness`, `with_meat`, `with_depth`).

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use uuid::Uuid;

use crate::{hours_between, HeadlineRecord};

/// Number of headline titles surfaced in a [`TrendingTopic`]
pub const SAMPLE_HEADLINES: usize = 3;

/// Shallow penalty at or above which a topic is flagged shallow
pub const SHALLOW_FLAG_THRESHOLD: f64 = 0.3;

/// Enrichment-informed substance score
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MeatScoreComponents {
    /// Unique entities per article, normalized (0-1)
    pub entity_density: f64,
    /// Mention acceleration, normalized (0-1)
    pub velocity: f64,
    /// Tone standard deviation, normalized (0-1)
    pub sentiment_variance: f64,
    /// Unique referring domains, normalized (0-1)
    pub linkage: f64,
    /// Combined score (0-1000)
    pub meat_score: u32,
    /// Computed from external coverage rather than estimated from the cluster
    #[serde(default)]
    pub enriched: bool,
}

/// Investigation-worthiness versus shallow popularity
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DepthScoreComponents {
    pub systemic_impact: f64,
    pub controversy: f64,
    pub emerging_pattern: f64,
    /// Product-update penalty (0-0.7)
    pub shallow_penalty: f64,
    /// Combined score (0-1000)
    pub depth_score: u32,
}

impl DepthScoreComponents {
    pub fn is_shallow(&self) -> bool {
        self.shallow_penalty >= SHALLOW_FLAG_THRESHOLD
    }
}

/// A group of headlines judged to describe the same story
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TopicCluster {
    pub topic_label: String,
    pub keywords: BTreeSet<String>,
    pub headlines: Vec<HeadlineRecord>,
    pub source_names: BTreeSet<String>,
    pub first_seen_at: DateTime<Utc>,
    pub last_seen_at: DateTime<Utc>,
    pub hotness_score: u32,
    /// Sum of per-headline tier weights (uncapped)
    pub quality_score: f64,
    /// Headlines per hour across the cluster's time span
    pub velocity: f64,
    pub meat_score: Option<MeatScoreComponents>,
    pub depth_score: Option<DepthScoreComponents>,
}

impl TopicCluster {
    /// Start a cluster from its seed headline
    pub fn seed(headline: HeadlineRecord, keywords: impl IntoIterator<Item = String>) -> Self {
        let mut source_names = BTreeSet::new();
        source_names.insert(headline.source_name.clone());
        Self {
            topic_label: headline.title.clone(),
            keywords: keywords.into_iter().collect(),
            first_seen_at: headline.published_at,
            last_seen_at: headline.published_at,
            headlines: vec![headline],
            source_names,
            hotness_score: 0,
            quality_score: 0.0,
            velocity: 0.0,
            meat_score: None,
            depth_score: None,
        }
    }

    /// Merge a headline and its keywords into the cluster
    pub fn absorb(&mut self, headline: HeadlineRecord, keywords: impl IntoIterator<Item = String>) {
        self.keywords.extend(keywords);
        self.source_names.insert(headline.source_name.clone());
        if headline.published_at < self.first_seen_at {
            self.first_seen_at = headline.published_at;
        }
        if headline.published_at > self.last_seen_at {
            self.last_seen_at = headline.published_at;
        }
        self.headlines.push(headline);
    }

    pub fn source_count(&self) -> usize {
        self.source_names.len()
    }

    pub fn headline_count(&self) -> usize {
        self.headlines.len()
    }

    /// Hours between first and last headline, at least 1
    pub fn time_span_hours(&self) -> f64 {
        hours_between(self.first_seen_at, self.last_seen_at).max(1.0)
    }

    /// Topic label followed by every headline title
    pub fn combined_text(&self) -> String {
        std::iter::once(self.topic_label.as_str())
            .chain(self.headlines.iter().map(|h| h.title.as_str()))
            .collect::<Vec<_>>()
            .join(" ")
    }

    pub fn with_label(mut self, label: String) -> Self {
        self.topic_label = label;
        self
    }

    pub fn with_hotness(mut self, hotness_score: u32, quality_score: f64, velocity: f64) -> Self {
        self.hotness_score = hotness_score;
        self.quality_score = quality_score;
        self.velocity = velocity;
        self
    }

    pub fn with_meat(mut self, meat: MeatScoreComponents) -> Self {
        self.meat_score = Some(meat);
        self
    }

    pub fn with_depth(mut self, depth: DepthScoreComponents) -> Self {
        self.depth_score = Some(depth);
        self
    }

    /// Project the cluster into the externally visible record
    pub fn to_trending(&self, category: &str, now: DateTime<Utc>) -> TrendingTopic {
        TrendingTopic {
            topic: self.topic_label.clone(),
            hotness_score: self.hotness_score,
            source_count: self.source_count(),
            sources: self.source_names.iter().cloned().collect(),
            first_seen_hours_ago: hours_between(self.first_seen_at, now).round().max(0.0) as i64,
            sample_headlines: self
                .headlines
                .iter()
                .take(SAMPLE_HEADLINES)
                .map(|h| h.title.clone())
                .collect(),
            category: category.to_string(),
            meat_score: self.meat_score.map(|m| m.meat_score),
            depth_score: self.depth_score.map(|d| d.depth_score),
            is_shallow: self.depth_score.map(|d| d.is_shallow()),
            depth_label: self.depth_score.map(|d| depth_label(&d).to_string()),
            entity_density: self.meat_score.map(|m| m.entity_density),
            sentiment_variance: self.meat_score.map(|m| m.sentiment_variance),
            combined_score: None,
        }
    }
}

/// The selected (or reviewable) topic handed to downstream consumers
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TrendingTopic {
    pub topic: String,
    pub hotness_score: u32,
    pub source_count: usize,
    pub sources: Vec<String>,
    pub first_seen_hours_ago: i64,
    pub sample_headlines: Vec<String>,
    pub category: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub meat_score: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub depth_score: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub is_shallow: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub depth_label: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub entity_density: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub sentiment_variance: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub combined_score: Option<u32>,
}

impl TrendingTopic {
    /// An evergreen topic with no backing sources
    pub fn fallback(topic: &str, category: &str) -> Self {
        Self {
            topic: topic.to_string(),
            hotness_score: 0,
            source_count: 0,
            sources: Vec::new(),
            first_seen_hours_ago: 0,
            sample_headlines: Vec::new(),
            category: category.to_string(),
            meat_score: None,
            depth_score: None,
            is_shallow: None,
            depth_label: None,
            entity_density: None,
            sentiment_variance: None,
            combined_score: None,
        }
    }

    pub fn with_combined_score(mut self, score: u32) -> Self {
        self.combined_score = Some(score);
        self
    }

    pub fn is_fallback(&self) -> bool {
        self.source_count == 0
    }
}

/// How a selection run ended
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SelectionOutcome {
    Selected,
    Fallback,
}

/// Full outcome of one aggregation pass for a category
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AggregationResult {
    pub run_id: Uuid,
    pub category: String,
    pub fetched_at: DateTime<Utc>,
    pub total_headlines: usize,
    /// Retained top-N ranked clusters
    pub clusters: Vec<TrendingTopic>,
    pub selected_topic: TrendingTopic,
    pub outcome: SelectionOutcome,
}

/// Display label for a meat score
pub fn meat_label(score: u32) -> &'static str {
    match score {
        s if s >= 400 => "Prime Cut",
        s if s >= 250 => "Choice",
        s if s >= 150 => "Select",
        _ => "Standard",
    }
}

/// Display label for a depth score
pub fn depth_label(depth: &DepthScoreComponents) -> &'static str {
    if depth.shallow_penalty >= 0.4 {
        return "Shallow Update";
    }
    match depth.depth_score {
        s if s >= 500 => "Deep Analysis",
        s if s >= 300 => "Substantive",
        s if s >= 150 => "Moderate Depth",
        _ => "Breaking News",
    }
}
