pub mod error;
pub mod ratings;
pub mod storage;
pub mod types;

pub use error::{Error, Result};
pub use ratings::{RatingSource, StaticRatings};
pub use storage::FeedbackStore;
pub use types::{
    Article, ArticleRef, FeedbackEntry, FeedbackLabel, RawArticle, Rating, DEFAULT_CATEGORY,
    DEFAULT_IMAGE, UNAVAILABLE_SUMMARY,
};
