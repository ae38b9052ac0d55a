use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

pub const UNAVAILABLE_SUMMARY: &str = "Full article unavailable.";
pub const DEFAULT_IMAGE: &str = "https://via.placeholder.com/150";
pub const DEFAULT_CATEGORY: &str = "General";

/// An article as handed over by the fetch collaborator.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RawArticle {
    pub title: String,
    pub link: String,
    #[serde(default = "unavailable_summary")]
    pub summary: String,
    #[serde(default = "default_category")]
    pub category: String,
    #[serde(default)]
    pub image: Option<String>,
    #[serde(default)]
    pub published: Option<DateTime<Utc>>,
}

fn unavailable_summary() -> String {
    UNAVAILABLE_SUMMARY.to_string()
}

fn default_category() -> String {
    DEFAULT_CATEGORY.to_string()
}

/// An article inside a corpus snapshot. `id` is its position in the snapshot.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Article {
    pub id: usize,
    pub title: String,
    pub link: String,
    pub raw_summary: String,
    pub cleaned_summary: String,
    pub category: String,
    pub image: String,
    pub published: Option<DateTime<Utc>>,
}

impl Article {
    pub fn from_raw(id: usize, raw: RawArticle, cleaned_summary: String) -> Self {
        Self {
            id,
            title: raw.title,
            link: raw.link,
            raw_summary: raw.summary,
            cleaned_summary,
            category: raw.category,
            image: raw
                .image
                .filter(|image| !image.trim().is_empty())
                .unwrap_or_else(|| DEFAULT_IMAGE.to_string()),
            published: raw.published,
        }
    }
}

/// The subset of an article returned by the recommenders, with the score
/// that ranked it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ArticleRef {
    pub id: usize,
    pub title: String,
    pub link: String,
    pub image: String,
    pub category: String,
    pub score: f64,
}

impl ArticleRef {
    pub fn new(article: &Article, score: f64) -> Self {
        Self {
            id: article.id,
            title: article.title.clone(),
            link: article.link.clone(),
            image: article.image.clone(),
            category: article.category.clone(),
            score,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Rating {
    pub user_id: u32,
    pub article_id: usize,
    pub rating: u8,
}

impl Rating {
    pub fn new(user_id: u32, article_id: usize, rating: u8) -> Self {
        Self { user_id, article_id, rating }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum FeedbackLabel {
    Liked,
    Disliked,
    Viewed,
}

impl FeedbackLabel {
    /// Rating on the 1-5 scale implied by this feedback.
    pub fn as_rating(self) -> u8 {
        match self {
            FeedbackLabel::Liked => 5,
            FeedbackLabel::Viewed => 3,
            FeedbackLabel::Disliked => 1,
        }
    }
}

impl fmt::Display for FeedbackLabel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            FeedbackLabel::Liked => "Liked",
            FeedbackLabel::Disliked => "Disliked",
            FeedbackLabel::Viewed => "Viewed",
        };
        f.write_str(label)
    }
}

impl FromStr for FeedbackLabel {
    type Err = crate::Error;

    fn from_str(s: &str) -> crate::Result<Self> {
        match s.trim().to_lowercase().as_str() {
            "liked" | "like" => Ok(FeedbackLabel::Liked),
            "disliked" | "dislike" => Ok(FeedbackLabel::Disliked),
            "viewed" | "view" => Ok(FeedbackLabel::Viewed),
            other => Err(crate::Error::InvalidInput(format!("Unknown feedback label: {}", other))),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FeedbackEntry {
    pub user_id: u32,
    pub article_id: usize,
    pub feedback: FeedbackLabel,
}

impl FeedbackEntry {
    pub fn new(user_id: u32, article_id: usize, feedback: FeedbackLabel) -> Self {
        Self { user_id, article_id, feedback }
    }

    pub fn to_rating(&self) -> Rating {
        Rating::new(self.user_id, self.article_id, self.feedback.as_rating())
    }
}
