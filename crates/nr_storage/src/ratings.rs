use nr_core::{FeedbackStore, StaticRatings, Result};

/// Ratings implied by recorded feedback, usable as a rating source in place
/// of synthetic draws.
pub async fn feedback_ratings(store: &dyn FeedbackStore) -> Result<StaticRatings> {
    let entries = store.entries().await?;
    Ok(StaticRatings::new(entries.iter().map(|e| e.to_rating()).collect()))
}
