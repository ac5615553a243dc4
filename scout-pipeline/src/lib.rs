//! topic-scout Pipeline - Clustering, scoring and ranking stages
//!
//! Stages run in a fixed order, each returning new cluster values:
//! - **Clusterer**: greedy keyword-overlap grouping of recent headlines
//! - **Hotness**: source diversity, quality, recency, velocity, engagement
//! - **Enrichment**: article-index lookups for the hottest clusters
//! - **Meat**: entity density x velocity plus sentiment spread x linkage
//! - **Depth**: systemic impact, controversy, emerging pattern, shallowness
//! - **Ranker**: combined score with time decay and a confidence bound
//! - **History**: drops topics that overlap recently used ones

pub mod clusterer;
pub mod depth;
pub mod enrichment;
pub mod history;
pub mod hotness;
pub mod meat;
pub mod ranker;

pub use clusterer::*;
pub use depth::*;
pub use enrichment::*;
pub use history::*;
pub use hotness::*;
pub use meat::*;
pub use ranker::*;
