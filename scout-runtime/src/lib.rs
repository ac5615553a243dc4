//! topic-scout Runtime - Topic selection
//!
//! Runs the full pipeline for one category and always produces a topic:
//! - **Selector**: aggregation, clustering, scoring, enrichment, ranking,
//!   history filtering and the final threshold gate
//! - **History**: read-only providers of recently used topics
//! - **Fallback**: evergreen prompts used when nothing qualifies

pub mod fallback;
pub mod history;
pub mod selector;

pub use fallback::*;
pub use history::*;
pub use selector::*;
