//! Concurrent headline aggregation
//!
//! Fans out one fetch per source, waits for every outcome and keeps what
//! succeeded. A failing or slow source contributes nothing; it never aborts
//! the others.

use futures::stream::{self, StreamExt};
use std::collections::HashSet;
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, info, warn};

use crate::{NetError, SourceFetcher};
use scout_core::{HeadlineRecord, SourceDescriptor};

/// Best-effort fan-out over a source list
pub struct Aggregator {
    fetcher: Arc<dyn SourceFetcher>,
    fetch_timeout: Duration,
    max_concurrent: usize,
}

impl Aggregator {
    pub fn new(fetcher: Arc<dyn SourceFetcher>) -> Self {
        Self {
            fetcher,
            fetch_timeout: Duration::from_secs(20),
            max_concurrent: 8,
        }
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.fetch_timeout = timeout;
        self
    }

    pub fn with_max_concurrent(mut self, max_concurrent: usize) -> Self {
        self.max_concurrent = max_concurrent.max(1);
        self
    }

    async fn fetch_one(&self, source: &SourceDescriptor) -> Result<Vec<HeadlineRecord>, NetError> {
        match tokio::time::timeout(self.fetch_timeout, self.fetcher.fetch(source)).await {
            Ok(result) => result,
            Err(_) => Err(NetError::Timeout(self.fetch_timeout.as_secs())),
        }
    }

    /// Fetch every source and concatenate the successful results.
    /// Identical URLs from several sources are collapsed, first wins.
    pub async fn aggregate(&self, sources: &[SourceDescriptor]) -> Vec<HeadlineRecord> {
        let results: Vec<Vec<HeadlineRecord>> = stream::iter(sources)
            .map(|source| async move {
                match self.fetch_one(source).await {
                    Ok(headlines) => {
                        debug!("{}: {} headlines", source.name, headlines.len());
                        headlines
                    }
                    Err(e) => {
                        warn!("Source {} failed: {}", source.name, e);
                        Vec::new()
                    }
                }
            })
            .buffered(self.max_concurrent)
            .collect()
            .await;

        let mut seen: HashSet<String> = HashSet::new();
        let mut deduped = Vec::new();

        for headline in results.into_iter().flatten() {
            if seen.insert(headline.fingerprint()) {
                deduped.push(headline);
            }
        }

        info!("Aggregated {} headlines from {} sources", deduped.len(), sources.len());
        deduped
    }
}
