use async_trait::async_trait;
use crate::types::FeedbackEntry;
use crate::Result;

#[async_trait]
pub trait FeedbackStore: Send + Sync {
    /// Append one feedback row
    async fn append(&self, entry: FeedbackEntry) -> Result<()>;

    /// All feedback recorded so far, in append order
    async fn entries(&self) -> Result<Vec<FeedbackEntry>>;

    /// Make every appended row durable
    async fn flush(&self) -> Result<()>;
}
