pub mod index;
pub mod resolver;
pub mod tfidf;

pub use index::ContentIndex;
pub use resolver::{TitleMatch, TitleResolver};
pub use tfidf::{SparseVector, TfidfVectorizer};

use nr_core::{Article, ArticleRef};
use tracing::{debug, info};

use crate::config::EngineConfig;

/// Articles most similar in content to the one whose title best matches
/// `query_title`, most similar first. The matched article is never included.
pub fn content_recommendations(
    corpus: &[Article],
    query_title: &str,
    index: &ContentIndex,
    config: &EngineConfig,
) -> Vec<ArticleRef> {
    let resolver = TitleResolver::new(config.match_threshold);
    let Some(found) = resolver.resolve(query_title, corpus) else {
        return Vec::new();
    };
    info!("Best match found: {} (similarity {}%)", found.title, found.ratio);

    let recommendations = similar_to(corpus, found.index, index, config.top_k);
    if recommendations.is_empty() {
        info!("No similar articles found for '{}'", found.title);
    }
    recommendations
}

/// Up to `top_k` articles ranked by similarity to `corpus[article]`,
/// ties broken by corpus order.
pub fn similar_to(
    corpus: &[Article],
    article: usize,
    index: &ContentIndex,
    top_k: usize,
) -> Vec<ArticleRef> {
    let Some(row) = index.row(article) else {
        debug!("Article {} is outside the content index", article);
        return Vec::new();
    };

    let mut ranked: Vec<(usize, f64)> = row
        .iter()
        .copied()
        .enumerate()
        .filter(|&(candidate, _)| candidate != article && candidate < corpus.len())
        .collect();
    // Stable sort keeps corpus order among equal scores.
    ranked.sort_by(|a, b| b.1.total_cmp(&a.1));

    ranked
        .into_iter()
        .take(top_k)
        .map(|(candidate, score)| ArticleRef::new(&corpus[candidate], score))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::corpus::build_corpus;
    use nr_core::RawArticle;

    fn raw(title: &str, summary: &str) -> RawArticle {
        RawArticle {
            title: title.to_string(),
            link: format!("http://news.test/{}", title.to_lowercase().replace(' ', "-")),
            summary: summary.to_string(),
            category: "World".to_string(),
            image: None,
            published: None,
        }
    }

    fn newsroom() -> Vec<Article> {
        build_corpus(vec![
            raw("Fed raises rates", "The central bank raised interest rates by a quarter point"),
            raw("Rates decision looms", "Investors await the central bank interest rate decision"),
            raw("Cup final tonight", "Fans gather for the football cup final in the capital"),
            raw("Striker transfer", "The football club signs a striker before the cup final"),
            raw("Mortgage costs", "Higher interest rates push mortgage costs up for homeowners"),
            raw("Weather warning", "Heavy snow expected across the north this weekend"),
            raw("Bank profits", "Bank profits rise as interest margins widen"),
        ])
    }

    #[test]
    fn test_never_returns_the_query_article() {
        let corpus = newsroom();
        let index = ContentIndex::build(&corpus);
        let config = EngineConfig::default();
        for article in &corpus {
            let recs = content_recommendations(&corpus, &article.title, &index, &config);
            assert!(recs.len() <= 5);
            assert!(recs.iter().all(|r| r.id != article.id));
            assert!(recs.windows(2).all(|w| w[0].score >= w[1].score));
        }
    }

    #[test]
    fn test_related_story_ranks_first() {
        let corpus = newsroom();
        let index = ContentIndex::build(&corpus);
        let config = EngineConfig::default();
        let recs = content_recommendations(&corpus, "cup final tonight", &index, &config);
        assert_eq!(recs.len(), 5);
        assert_eq!(recs[0].title, "Striker transfer");
    }

    #[test]
    fn test_unknown_title_yields_nothing() {
        let corpus = newsroom();
        let index = ContentIndex::build(&corpus);
        let config = EngineConfig::default();
        let recs = content_recommendations(&corpus, "zzz-nonexistent-zzz", &index, &config);
        assert!(recs.is_empty());
    }

    #[test]
    fn test_duplicate_text_before_query_does_not_leak_self() {
        let corpus = build_corpus(vec![
            raw("Copy one", "identical wording about elections"),
            raw("Copy two", "identical wording about elections"),
            raw("Elsewhere", "volcano erupts island"),
        ]);
        let index = ContentIndex::build(&corpus);
        let recs = similar_to(&corpus, 1, &index, 5);
        assert_eq!(recs.iter().map(|r| r.id).collect::<Vec<_>>(), vec![0, 2]);
    }

    #[test]
    fn test_top_k_respected() {
        let corpus = newsroom();
        let index = ContentIndex::build(&corpus);
        assert_eq!(similar_to(&corpus, 0, &index, 2).len(), 2);
        assert!(similar_to(&corpus, 99, &index, 2).is_empty());
    }
}
