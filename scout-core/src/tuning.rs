//! Category tuning table and selection policy
//!
//! Loads the category-keyed configuration from TOML. The default table is
//! embedded in the binary; operators may point at a replacement file.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use thiserror::Error;

use crate::{
    Category, DEFAULT_MIN_SOURCES, DEFAULT_RECENCY_WINDOW_HOURS, DEFAULT_SIMILARITY_THRESHOLD,
};

const EMBEDDED_CONFIG: &str = include_str!("../config/scout.toml");

/// Longest recency window a profile may configure (30 days)
pub const MAX_RECENCY_WINDOW_HOURS: f64 = 720.0;

/// Configuration errors
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to read {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Parse error: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("Invalid value: {0}")]
    Invalid(String),

    #[error("Unknown category: {0}")]
    UnknownCategory(String),
}

/// Per-category clustering and decay constants
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct CategoryTuning {
    #[serde(default = "default_similarity_threshold")]
    pub similarity_threshold: f64,
    #[serde(default = "default_min_sources")]
    pub min_sources: usize,
    #[serde(default = "default_decay_gravity")]
    pub decay_gravity: f64,
    #[serde(default = "default_recency_window_hours")]
    pub recency_window_hours: f64,
}

fn default_similarity_threshold() -> f64 {
    DEFAULT_SIMILARITY_THRESHOLD
}

fn default_min_sources() -> usize {
    DEFAULT_MIN_SOURCES
}

fn default_decay_gravity() -> f64 {
    0.02
}

fn default_recency_window_hours() -> f64 {
    DEFAULT_RECENCY_WINDOW_HOURS
}

impl Default for CategoryTuning {
    fn default() -> Self {
        Self {
            similarity_threshold: default_similarity_threshold(),
            min_sources: default_min_sources(),
            decay_gravity: default_decay_gravity(),
            recency_window_hours: default_recency_window_hours(),
        }
    }
}

/// Partial per-category override of [`CategoryTuning`]
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct CategoryOverride {
    pub similarity_threshold: Option<f64>,
    pub min_sources: Option<usize>,
    pub decay_gravity: Option<f64>,
    pub recency_window_hours: Option<f64>,
}

impl CategoryOverride {
    fn apply(&self, base: CategoryTuning) -> CategoryTuning {
        CategoryTuning {
            similarity_threshold: self.similarity_threshold.unwrap_or(base.similarity_threshold),
            min_sources: self.min_sources.unwrap_or(base.min_sources),
            decay_gravity: self.decay_gravity.unwrap_or(base.decay_gravity),
            recency_window_hours: self.recency_window_hours.unwrap_or(base.recency_window_hours),
        }
    }
}

/// Gate thresholds and pipeline sizing
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SelectionPolicy {
    pub min_meat_score: u32,
    pub min_hotness_score: u32,
    pub enrich_top_k: usize,
    pub retained_clusters: usize,
    pub history_days: u32,
    pub cache_ttl_minutes: i64,
    pub max_concurrent_fetches: usize,
}

impl Default for SelectionPolicy {
    fn default() -> Self {
        Self {
            min_meat_score: 100,
            min_hotness_score: 150,
            enrich_top_k: 5,
            retained_clusters: 10,
            history_days: 30,
            cache_ttl_minutes: 30,
            max_concurrent_fetches: 8,
        }
    }
}

/// Article-index query bounds
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EnrichmentPolicy {
    pub timespan_hours: u32,
    pub timeout_secs: u64,
    pub max_records: u32,
    pub cache_ttl_minutes: i64,
}

impl Default for EnrichmentPolicy {
    fn default() -> Self {
        Self {
            timespan_hours: 24,
            timeout_secs: 10,
            max_records: 100,
            cache_ttl_minutes: 30,
        }
    }
}

/// Weights of the two meat-score terms
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct MeatWeights {
    /// Entity x velocity term
    pub alpha: f64,
    /// Sentiment x linkage term
    pub beta: f64,
}

impl Default for MeatWeights {
    fn default() -> Self {
        Self { alpha: 0.6, beta: 0.4 }
    }
}

/// Extra confidence samples for fresh reports from top-tier sources
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct VirtualSeeding {
    /// Highest (numerically) tier that qualifies
    pub max_tier: u8,
    /// How recent the report must be
    pub window_hours: f64,
    /// Samples added when a qualifying report exists
    pub bonus_samples: f64,
}

/// Combined-ranker constants
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RankingPolicy {
    /// z-value of the Wilson lower bound
    pub confidence_z: f64,
    pub virtual_seeding: Option<VirtualSeeding>,
}

impl Default for RankingPolicy {
    fn default() -> Self {
        Self {
            confidence_z: 1.96,
            virtual_seeding: None,
        }
    }
}

/// Complete engine configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScoutConfig {
    #[serde(default)]
    pub default: CategoryTuning,
    #[serde(default)]
    pub categories: BTreeMap<String, CategoryOverride>,
    #[serde(default)]
    pub selection: SelectionPolicy,
    #[serde(default)]
    pub enrichment: EnrichmentPolicy,
    #[serde(default)]
    pub meat: MeatWeights,
    #[serde(default)]
    pub ranking: RankingPolicy,
}

impl ScoutConfig {
    /// Configuration shipped with the binary
    pub fn embedded() -> Result<Self, ConfigError> {
        Self::from_toml_str(EMBEDDED_CONFIG)
    }

    pub fn from_toml_str(content: &str) -> Result<Self, ConfigError> {
        let config: ScoutConfig = toml::from_str(content)?;
        config.validate()?;
        Ok(config)
    }

    /// Load a replacement configuration file
    pub fn load_from_path<P: AsRef<Path>>(path: P) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_toml_str(&content)
    }

    /// Tuning for a category name; unknown names get the default profile
    pub fn tuning_for(&self, category: &str) -> CategoryTuning {
        self.categories
            .iter()
            .find(|(name, _)| name.eq_ignore_ascii_case(category.trim()))
            .map(|(_, over)| over.apply(self.default))
            .unwrap_or(self.default)
    }

    /// Tuning for a category that must be one of the known ones
    pub fn strict_tuning_for(&self, category: &str) -> Result<CategoryTuning, ConfigError> {
        category
            .parse::<Category>()
            .map_err(|_| ConfigError::UnknownCategory(category.to_string()))?;
        Ok(self.tuning_for(category))
    }

    fn validate(&self) -> Result<(), ConfigError> {
        let mut profiles = vec![("default".to_string(), self.default)];
        for name in self.categories.keys() {
            profiles.push((name.clone(), self.tuning_for(name)));
        }

        for (name, tuning) in profiles {
            if !(0.0..=1.0).contains(&tuning.similarity_threshold) {
                return Err(ConfigError::Invalid(format!(
                    "{}: similarity_threshold must be within [0, 1]",
                    name
                )));
            }
            if tuning.min_sources == 0 {
                return Err(ConfigError::Invalid(format!("{}: min_sources must be at least 1", name)));
            }
            if tuning.decay_gravity.is_nan() || tuning.decay_gravity < 0.0 {
                return Err(ConfigError::Invalid(format!("{}: decay_gravity must not be negative", name)));
            }
            let window = tuning.recency_window_hours;
            if window.is_nan() || window <= 0.0 || window > MAX_RECENCY_WINDOW_HOURS {
                return Err(ConfigError::Invalid(format!(
                    "{}: recency_window_hours must be within (0, {}]",
                    name, MAX_RECENCY_WINDOW_HOURS
                )));
            }
        }

        if self.ranking.confidence_z <= 0.0 {
            return Err(ConfigError::Invalid("ranking.confidence_z must be positive".into()));
        }
        if self.selection.cache_ttl_minutes < 0 || self.enrichment.cache_ttl_minutes < 0 {
            return Err(ConfigError::Invalid("cache TTLs must not be negative".into()));
        }

        Ok(())
    }
}
