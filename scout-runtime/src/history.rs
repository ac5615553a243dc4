//! Recently used topic providers
//!
//! The selector only ever reads history. Providers return the topics used
//! within the last N days; what counts as "used" is the caller's business.

use async_trait::async_trait;
use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use thiserror::Error;
use tracing::debug;

use scout_core::{Clock, SystemClock};

#[derive(Error, Debug)]
pub enum HistoryError {
    #[error("Failed to read history file {path}: {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("Invalid history data: {0}")]
    Parse(#[from] serde_json::Error),

    #[error("History backend unavailable: {0}")]
    Unavailable(String),
}

/// Read access to recently used topics
#[async_trait]
pub trait HistoryProvider: Send + Sync {
    async fn topics_used_since(&self, days: u32) -> Result<Vec<String>, HistoryError>;
}

/// One use of a topic
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct HistoryRecord {
    pub topic: String,
    pub used_at: DateTime<Utc>,
}

impl HistoryRecord {
    pub fn new(topic: &str, used_at: DateTime<Utc>) -> Self {
        Self {
            topic: topic.to_string(),
            used_at,
        }
    }
}

fn used_since(records: &[HistoryRecord], days: u32, now: DateTime<Utc>) -> Vec<String> {
    let cutoff = now - Duration::days(i64::from(days));
    records
        .iter()
        .filter(|r| r.used_at >= cutoff)
        .map(|r| r.topic.clone())
        .collect()
}

/// Fixed in-memory history
pub struct InMemoryHistory {
    records: Vec<HistoryRecord>,
    clock: Arc<dyn Clock>,
}

impl InMemoryHistory {
    pub fn new(records: Vec<HistoryRecord>) -> Self {
        Self {
            records,
            clock: Arc::new(SystemClock),
        }
    }

    /// History with no used topics
    pub fn empty() -> Self {
        Self::new(Vec::new())
    }

    pub fn with_clock(mut self, clock: Arc<dyn Clock>) -> Self {
        self.clock = clock;
        self
    }
}

impl Default for InMemoryHistory {
    fn default() -> Self {
        Self::empty()
    }
}

#[async_trait]
impl HistoryProvider for InMemoryHistory {
    async fn topics_used_since(&self, days: u32) -> Result<Vec<String>, HistoryError> {
        Ok(used_since(&self.records, days, self.clock.now()))
    }
}

/// History stored as a JSON array of `{ "topic", "usedAt" }` records.
/// A missing file means nothing has been used yet.
pub struct JsonFileHistory {
    path: PathBuf,
    clock: Arc<dyn Clock>,
}

impl JsonFileHistory {
    pub fn new<P: AsRef<Path>>(path: P) -> Self {
        Self {
            path: path.as_ref().to_path_buf(),
            clock: Arc::new(SystemClock),
        }
    }

    pub fn with_clock(mut self, clock: Arc<dyn Clock>) -> Self {
        self.clock = clock;
        self
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Parse every record in the file
    pub async fn load(&self) -> Result<Vec<HistoryRecord>, HistoryError> {
        let content = match tokio::fs::read_to_string(&self.path).await {
            Ok(content) => content,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                debug!("No history file at {}", self.path.display());
                return Ok(Vec::new());
            }
            Err(e) => {
                return Err(HistoryError::Io {
                    path: self.path.display().to_string(),
                    source: e,
                })
            }
        };

        if content.trim().is_empty() {
            return Ok(Vec::new());
        }
        Ok(serde_json::from_str(&content)?)
    }
}

#[async_trait]
impl HistoryProvider for JsonFileHistory {
    async fn topics_used_since(&self, days: u32) -> Result<Vec<String>, HistoryError> {
        let records = self.load().await?;
        Ok(used_since(&records, days, self.clock.now()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use scout_core::ManualClock;

    #[tokio::test]
    async fn test_in_memory_window() {
        let now = Utc::now();
        let history = InMemoryHistory::new(vec![
            HistoryRecord::new("Grain corridor talks", now - Duration::days(2)),
            HistoryRecord::new("Arctic shipping routes", now - Duration::days(45)),
        ])
        .with_clock(Arc::new(ManualClock::new(now)));

        let used = history.topics_used_since(30).await.unwrap();
        assert_eq!(used, vec!["Grain corridor talks".to_string()]);
    }

    #[tokio::test]
    async fn test_json_file_history() {
        let now = Utc::now();
        let path = std::env::temp_dir().join(format!("scout-history-{}.json", uuid::Uuid::new_v4()));
        let records = vec![
            HistoryRecord::new("Chip export controls", now - Duration::days(1)),
            HistoryRecord::new("Old story", now - Duration::days(90)),
        ];
        tokio::fs::write(&path, serde_json::to_string(&records).unwrap())
            .await
            .unwrap();

        let history = JsonFileHistory::new(&path).with_clock(Arc::new(ManualClock::new(now)));
        let used = history.topics_used_since(30).await.unwrap();
        assert_eq!(used, vec!["Chip export controls".to_string()]);

        let _ = tokio::fs::remove_file(&path).await;
    }

    #[tokio::test]
    async fn test_missing_file_is_empty() {
        let history = JsonFileHistory::new("/nonexistent/scout/history.json");
        assert!(history.topics_used_since(30).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_malformed_file_is_error() {
        let path = std::env::temp_dir().join(format!("scout-history-{}.json", uuid::Uuid::new_v4()));
        tokio::fs::write(&path, "{not json").await.unwrap();

        let history = JsonFileHistory::new(&path);
        assert!(matches!(
            history.topics_used_since(30).await,
            Err(HistoryError::Parse(_))
        ));

        let _ = tokio::fs::remove_file(&path).await;
    }

    #[test]
    fn test_record_uses_camel_case() {
        let record = HistoryRecord::new("x", Utc::now());
        let json = serde_json::to_string(&record).unwrap();
        assert!(json.contains("usedAt"));
    }
}
