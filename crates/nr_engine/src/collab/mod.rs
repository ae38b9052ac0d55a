pub mod evaluation;
pub mod store;
pub mod svd;

pub use evaluation::{evaluate, Evaluation};
pub use store::{RandomRatings, RatingStore};
pub use svd::{train_test_split, SvdModel, TrainedModel};

use nr_core::{Article, ArticleRef};
use tracing::info;

use crate::config::EngineConfig;

/// Articles `user_id` has not rated yet, highest predicted rating first.
/// Users absent from `store` get no recommendations.
pub fn collaborative_recommendations(
    corpus: &[Article],
    user_id: u32,
    model: &SvdModel,
    store: &RatingStore,
    config: &EngineConfig,
) -> Vec<ArticleRef> {
    if !store.contains_user(user_id) {
        info!("No recommendations: user {} not found", user_id);
        return Vec::new();
    }

    let rated = store.rated_by(user_id);
    let mut predictions: Vec<(usize, f64)> = (0..corpus.len())
        .filter(|article| !rated.contains(article))
        .map(|article| (article, model.predict(user_id, article)))
        .collect();

    if predictions.is_empty() {
        info!("No new recommendations available for user {}", user_id);
        return Vec::new();
    }

    // Candidates are generated in index order, so a stable sort breaks ties
    // by ascending article id.
    predictions.sort_by(|a, b| b.1.total_cmp(&a.1));

    predictions
        .into_iter()
        .take(config.top_k)
        .map(|(article, score)| ArticleRef::new(&corpus[article], score))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::SvdParams;
    use crate::corpus::build_corpus;
    use crate::rng;
    use nr_core::{RawArticle, Rating};

    fn corpus(n: usize) -> Vec<Article> {
        build_corpus(
            (0..n)
                .map(|i| RawArticle {
                    title: format!("Story {}", i),
                    link: format!("http://news.test/{}", i),
                    summary: format!("summary number {}", i),
                    category: "World".to_string(),
                    image: None,
                    published: None,
                })
                .collect(),
        )
    }

    fn small_params() -> SvdParams {
        SvdParams {
            n_factors: 3,
            ..SvdParams::default()
        }
    }

    #[test]
    fn test_unknown_user_gets_nothing() {
        let corpus = corpus(4);
        let store = RatingStore::from_ratings(vec![Rating::new(1, 0, 5)]);
        let model = SvdModel::fit(store.ratings(), &small_params(), &mut rng(Some(1)));
        let config = EngineConfig::default();
        assert!(collaborative_recommendations(&corpus, 2, &model, &store, &config).is_empty());
    }

    #[test]
    fn test_user_who_rated_everything_gets_nothing() {
        let corpus = corpus(3);
        let store = RatingStore::from_ratings((0..3).map(|i| Rating::new(1, i, 4)).collect());
        let model = SvdModel::fit(store.ratings(), &small_params(), &mut rng(Some(1)));
        let config = EngineConfig::default();
        assert!(collaborative_recommendations(&corpus, 1, &model, &store, &config).is_empty());
    }

    #[test]
    fn test_excludes_rated_and_sorts_descending() {
        let corpus = corpus(10);
        let ratings = vec![
            Rating::new(1, 0, 5),
            Rating::new(1, 1, 2),
            Rating::new(2, 2, 5),
            Rating::new(2, 3, 1),
            Rating::new(3, 4, 4),
            Rating::new(3, 2, 5),
        ];
        let store = RatingStore::from_ratings(ratings);
        let model = SvdModel::fit(store.ratings(), &small_params(), &mut rng(Some(4)));
        let config = EngineConfig::default();
        let recs = collaborative_recommendations(&corpus, 1, &model, &store, &config);

        assert_eq!(recs.len(), 5);
        assert!(recs.iter().all(|r| r.id != 0 && r.id != 1));
        for pair in recs.windows(2) {
            let (a, b) = (&pair[0], &pair[1]);
            assert!(a.score > b.score || (a.score == b.score && a.id < b.id));
        }
    }

    #[test]
    fn test_ties_break_by_ascending_index() {
        let corpus = corpus(8);
        // Articles 1..8 are unknown to the model, so all share the same estimate.
        let store = RatingStore::from_ratings(vec![Rating::new(1, 0, 3)]);
        let model = SvdModel::fit(store.ratings(), &small_params(), &mut rng(Some(1)));
        let config = EngineConfig::default();
        let recs = collaborative_recommendations(&corpus, 1, &model, &store, &config);
        assert_eq!(recs.iter().map(|r| r.id).collect::<Vec<_>>(), vec![1, 2, 3, 4, 5]);
    }

    #[test]
    fn test_empty_store_yields_nothing() {
        let corpus = corpus(5);
        let store = RatingStore::default();
        let model = SvdModel::fit(&[], &small_params(), &mut rng(Some(1)));
        let config = EngineConfig::default();
        for user in 1..=100 {
            let recs = collaborative_recommendations(&corpus, user, &model, &store, &config);
            assert!(recs.is_empty());
        }
    }
}
