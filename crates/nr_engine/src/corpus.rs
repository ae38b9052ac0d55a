use nr_core::{Article, RawArticle};
use tracing::warn;

use crate::text::normalize;

pub const ALL_CATEGORIES: &str = "All";

/// Turn fetched articles into a corpus snapshot. Ids follow input order.
pub fn build_corpus(raw: Vec<RawArticle>) -> Vec<Article> {
    raw.into_iter()
        .enumerate()
        .map(|(id, raw)| {
            if raw.title.trim().is_empty() {
                warn!("Article {} ({}) has an empty title", id, raw.link);
            }
            let cleaned = normalize(&raw.summary);
            Article::from_raw(id, raw, cleaned)
        })
        .collect()
}

/// Distinct categories in first-seen order.
pub fn categories(corpus: &[Article]) -> Vec<String> {
    let mut seen: Vec<String> = Vec::new();
    for article in corpus {
        if !seen.contains(&article.category) {
            seen.push(article.category.clone());
        }
    }
    seen
}

/// Articles in `category`; [`ALL_CATEGORIES`] selects everything.
pub fn filter_by_category<'a>(corpus: &'a [Article], category: &str) -> Vec<&'a Article> {
    corpus
        .iter()
        .filter(|article| category == ALL_CATEGORIES || article.category == category)
        .collect()
}
