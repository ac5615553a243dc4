//! Combined ranking
//!
//! Folds semantic meat, depth and meat into one 0-1000 score, then applies
//! the shallow and negative-signal penalties, a per-category time decay
//! and a Wilson lower-bound confidence discount.

use chrono::{DateTime, Utc};
use regex::Regex;
use serde::Serialize;
use std::collections::HashSet;
use std::sync::{Arc, LazyLock};

use crate::DepthScorer;
use scout_core::{hours_between, CategoryTuning, RankingPolicy, TopicCluster, MAX_SCORE};

/// Lowest multiplier time decay can apply
pub const DECAY_FLOOR: f64 = 0.5;

/// Largest boost the meat score can give the base score
pub const MEAT_BOOST: f64 = 0.1;

// Capitalized run following a lowercase word, i.e. not at sentence start
static PROPER_NOUN_REGEX: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"\b[a-z]+\s+([A-Z][a-z]+(?:\s+[A-Z][a-z]+)*)\b").unwrap()
});

static ENTITY_PHRASE_REGEX: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"\b([A-Z][a-z]+(?:\s+[A-Z][a-z]+)+)\b").unwrap()
});

static TECH_TERM_REGEXES: LazyLock<Vec<Regex>> = LazyLock::new(|| {
    [
        r"(?i)\b(artificial intelligence|machine learning|deep learning|neural network|llm|gpt|transformer|diffusion)\b",
        r"(?i)\b(reinforcement learning|natural language|computer vision|generative ai|foundation model)\b",
        r"(?i)\b(blockchain|cryptocurrency|bitcoin|ethereum|defi|nft|smart contract|web3)\b",
        r"(?i)\b(kubernetes|docker|microservices|serverless|cloud native|api|sdk|devops|ci/cd)\b",
        r"(?i)\b(cybersecurity|zero-day|ransomware|encryption|vulnerability|exploit|malware|phishing)\b",
        r"(?i)\b(crispr|mrna|gene therapy|biomarker|clinical trial|fda approval|drug discovery)\b",
        r"(?i)\b(quantum computing|fusion|satellite|spacecraft|telescope|particle accelerator|dark matter)\b",
        r"(?i)\b(gdp|inflation rate|interest rate|quantitative easing|fiscal policy|monetary policy)\b",
        r"(?i)\b(bond yield|credit default|derivative|hedge fund|private equity|venture capital)\b",
    ]
    .iter()
    .map(|p| Regex::new(p).unwrap())
    .collect()
});

/// Semantic meat of one text: (proper nouns + tech terms) / tokens, 0-1000
pub fn semantic_meat(text: &str) -> u32 {
    let tokens = text.split_whitespace().count().max(1);

    let proper_nouns: HashSet<&str> = PROPER_NOUN_REGEX
        .find_iter(text)
        .chain(ENTITY_PHRASE_REGEX.find_iter(text))
        .map(|m| m.as_str())
        .collect();
    let tech_terms: usize = TECH_TERM_REGEXES.iter().map(|p| p.find_iter(text).count()).sum();

    let ratio = (proper_nouns.len() + tech_terms) as f64 / tokens as f64;
    ((ratio * 5.0).min(1.0) * MAX_SCORE as f64).round() as u32
}

/// Best semantic meat among the cluster's headline titles
pub fn cluster_semantic_meat(cluster: &TopicCluster) -> u32 {
    cluster
        .headlines
        .iter()
        .map(|h| semantic_meat(&h.title))
        .max()
        .unwrap_or(0)
}

/// Exponential decay by age, floored at [`DECAY_FLOOR`]
pub fn time_decay(hours_since_last: f64, gravity: f64) -> f64 {
    (-gravity * hours_since_last.max(0.0)).exp().max(DECAY_FLOOR)
}

/// Lower bound of the Wilson score interval for proportion `p` over `n` samples
pub fn wilson_lower_bound(p: f64, n: f64, z: f64) -> f64 {
    if n <= 0.0 {
        return 0.0;
    }
    let p = p.clamp(0.0, 1.0);
    let z2 = z * z;
    let centre = p + z2 / (2.0 * n);
    let margin = z * ((p * (1.0 - p) + z2 / (4.0 * n)) / n).sqrt();
    ((centre - margin) / (1.0 + z2 / n)).clamp(0.0, 1.0)
}

/// Everything the combined score depends on
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct ScoreInputs {
    pub semantic_meat: u32,
    pub depth_score: u32,
    /// Enrichment-backed meat only; cluster-only estimates give no boost
    pub meat_score: Option<u32>,
    pub shallow_penalty: f64,
    pub negative_penalty: f64,
    pub hours_since_last: f64,
    pub decay_gravity: f64,
    pub sample_size: f64,
}

/// Combined 0-1000 score
pub fn combined_score(inputs: &ScoreInputs, confidence_z: f64) -> u32 {
    let mut score = 0.4 * inputs.semantic_meat as f64 + 0.6 * inputs.depth_score as f64;

    if let Some(meat) = inputs.meat_score {
        score *= 1.0 + MEAT_BOOST * (meat.min(MAX_SCORE) as f64 / MAX_SCORE as f64);
    }

    score *= 1.0 - inputs.shallow_penalty.clamp(0.0, 1.0);
    score *= 1.0 - inputs.negative_penalty.clamp(0.0, 1.0);
    score *= time_decay(inputs.hours_since_last, inputs.decay_gravity);

    let p = (score / MAX_SCORE as f64).min(1.0);
    let bounded = wilson_lower_bound(p, inputs.sample_size, confidence_z);
    ((bounded * MAX_SCORE as f64).round() as u32).min(MAX_SCORE)
}

/// A cluster with its ranking inputs and final score
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RankedCluster {
    pub cluster: TopicCluster,
    pub inputs: ScoreInputs,
    pub combined_score: u32,
}

/// Orders clusters by combined score
pub struct CombinedRanker {
    policy: RankingPolicy,
    tuning: CategoryTuning,
    depth: Arc<DepthScorer>,
}

impl CombinedRanker {
    pub fn new(policy: RankingPolicy, tuning: CategoryTuning, depth: Arc<DepthScorer>) -> Self {
        Self { policy, tuning, depth }
    }

    /// Effective sample size: sources plus a third of the headlines, plus
    /// the virtual seeding bonus when a top-tier source reported recently
    pub fn sample_size(&self, cluster: &TopicCluster, now: DateTime<Utc>) -> f64 {
        let base = cluster.source_count() as f64 + cluster.headline_count() as f64 / 3.0;

        let bonus = match &self.policy.virtual_seeding {
            Some(seeding) => {
                let fresh_top_tier = cluster.headlines.iter().any(|h| {
                    h.source_tier <= seeding.max_tier && hours_between(h.published_at, now) <= seeding.window_hours
                });
                if fresh_top_tier {
                    seeding.bonus_samples
                } else {
                    0.0
                }
            }
            None => 0.0,
        };

        base + bonus
    }

    pub fn inputs(&self, cluster: &TopicCluster, now: DateTime<Utc>) -> ScoreInputs {
        let depth = cluster
            .depth_score
            .unwrap_or_else(|| self.depth.score_cluster(cluster, None));

        ScoreInputs {
            semantic_meat: cluster_semantic_meat(cluster),
            depth_score: depth.depth_score,
            meat_score: cluster
                .meat_score
                .filter(|m| m.enriched)
                .map(|m| m.meat_score),
            shallow_penalty: depth.shallow_penalty,
            negative_penalty: self.depth.negative_penalty(cluster),
            hours_since_last: hours_between(cluster.last_seen_at, now),
            decay_gravity: self.tuning.decay_gravity,
            sample_size: self.sample_size(cluster, now),
        }
    }

    pub fn score(&self, cluster: TopicCluster, now: DateTime<Utc>) -> RankedCluster {
        let inputs = self.inputs(&cluster, now);
        let combined_score = combined_score(&inputs, self.policy.confidence_z);
        RankedCluster {
            cluster,
            inputs,
            combined_score,
        }
    }

    /// Score and sort, highest combined score first; ties go to the hotter cluster
    pub fn rank(&self, clusters: Vec<TopicCluster>, now: DateTime<Utc>) -> Vec<RankedCluster> {
        let mut ranked: Vec<RankedCluster> = clusters.into_iter().map(|c| self.score(c, now)).collect();
        ranked.sort_by(|a, b| {
            b.combined_score
                .cmp(&a.combined_score)
                .then(b.cluster.hotness_score.cmp(&a.cluster.hotness_score))
        });
        ranked
    }
}
