use async_trait::async_trait;
use nr_core::{FeedbackEntry, FeedbackStore, Result};
use std::sync::Arc;
use tokio::sync::RwLock;

/// Feedback kept in process memory; lost when the process exits.
#[derive(Debug, Clone, Default)]
pub struct MemoryFeedbackStore {
    entries: Arc<RwLock<Vec<FeedbackEntry>>>,
}

impl MemoryFeedbackStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_entries(entries: Vec<FeedbackEntry>) -> Self {
        Self {
            entries: Arc::new(RwLock::new(entries)),
        }
    }
}

#[async_trait]
impl FeedbackStore for MemoryFeedbackStore {
    async fn append(&self, entry: FeedbackEntry) -> Result<()> {
        self.entries.write().await.push(entry);
        Ok(())
    }

    async fn entries(&self) -> Result<Vec<FeedbackEntry>> {
        Ok(self.entries.read().await.clone())
    }

    async fn flush(&self) -> Result<()> {
        Ok(())
    }
}
