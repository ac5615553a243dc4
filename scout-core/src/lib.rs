//! topic-scout Core - Data model and heuristics for topic discovery
//!
//! This crate provides the foundational primitives:
//! - Headline, cluster and trending-topic records
//! - Per-category source registry with quality tiers
//! - Keyword and named-entity extraction
//! - Pluggable pattern rule tables for shallow/negative signal detection
//! - Category tuning table, clock and TTL cache abstractions

pub mod cache;
pub mod clock;
pub mod headline;
pub mod rules;
pub mod sources;
pub mod text;
pub mod topic;
pub mod tuning;

pub use cache::*;
pub use clock::*;
pub use headline::*;
pub use rules::*;
pub use sources::*;
pub use text::*;
pub use topic::*;
pub use tuning::*;

/// Upper bound of every `*_score` aggregate
pub const MAX_SCORE: u32 = 1000;

/// Default recency window applied before clustering (hours)
pub const DEFAULT_RECENCY_WINDOW_HOURS: f64 = 72.0;

/// Default Jaccard threshold for merging a headline into a cluster
pub const DEFAULT_SIMILARITY_THRESHOLD: f64 = 0.25;

/// Default minimum number of distinct sources a cluster needs
pub const DEFAULT_MIN_SOURCES: usize = 2;

/// Hours elapsed between two instants, as a float
pub fn hours_between(earlier: chrono::DateTime<chrono::Utc>, later: chrono::DateTime<chrono::Utc>) -> f64 {
    (later - earlier).num_milliseconds() as f64 / 3_600_000.0
}
