//! topic-scout Network Layer
//!
//! Provides outbound HTTP access for topic discovery:
//! - HTTP client construction with user-agent rotation
//! - Feed, REST-JSON, HackerNews and Reddit fetch strategies
//! - Concurrent best-effort aggregation across a source list
//! - Article-index (GDELT DOC) client used for enrichment

pub mod aggregator;
pub mod client;
pub mod fetchers;
pub mod gdelt;
pub mod html;

pub use aggregator::*;
pub use client::*;
pub use fetchers::*;
pub use gdelt::*;
pub use html::*;
