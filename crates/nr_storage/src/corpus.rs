use nr_core::{RawArticle, Result};
use std::path::Path;
use tracing::info;

/// Read a JSON array of fetched articles.
pub fn load_corpus(path: impl AsRef<Path>) -> Result<Vec<RawArticle>> {
    let path = path.as_ref();
    let raw = std::fs::read_to_string(path)?;
    let articles = parse_corpus(&raw)?;
    info!("📰 Loaded {} articles from {}", articles.len(), path.display());
    Ok(articles)
}

pub fn parse_corpus(raw: &str) -> Result<Vec<RawArticle>> {
    Ok(serde_json::from_str(raw)?)
}
