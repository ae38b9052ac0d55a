use nr_core::{FeedbackStore, Result};
use std::path::Path;
use std::sync::Arc;

pub mod backends;
pub mod corpus;
pub mod ratings;

pub use backends::*;
pub use corpus::{load_corpus, parse_corpus};
pub use ratings::feedback_ratings;

/// Open a feedback store: a CSV file when `path` is given, memory otherwise.
pub fn create_store(path: Option<&Path>) -> Result<Arc<dyn FeedbackStore>> {
    match path {
        Some(path) => Ok(Arc::new(CsvFeedbackStore::open(path)?)),
        None => Ok(Arc::new(MemoryFeedbackStore::new())),
    }
}

pub mod prelude {
    pub use super::backends::*;
    pub use super::{create_store, feedback_ratings, load_corpus};
}
