use nr_core::{Article, ArticleRef, RatingSource, Result};
use std::collections::{HashMap, HashSet};
use std::sync::atomic::AtomicBool;
use tracing::info;

use crate::collab::{self, evaluate, Evaluation, RandomRatings, RatingStore, SvdModel};
use crate::config::EngineConfig;
use crate::content::{self, ContentIndex};
use crate::corpus::{self, ALL_CATEGORIES};

/// Both models built from one corpus snapshot. Immutable once built; a new
/// snapshot means a new `Session`.
#[derive(Debug, Clone)]
pub struct Session {
    config: EngineConfig,
    corpus: Vec<Article>,
    index: ContentIndex,
    store: RatingStore,
    model: SvdModel,
    test_set: Vec<nr_core::Rating>,
}

/// Build the content index and train the collaborative model from synthetic
/// ratings.
pub fn build_models(corpus: Vec<Article>, config: &EngineConfig) -> Result<Session> {
    let mut source = RandomRatings::new(config.rating_samples, config.max_user_id, config.seed);
    Session::build_with_source(corpus, &mut source, config)
}

impl Session {
    pub fn build_with_source(
        corpus: Vec<Article>,
        source: &mut dyn RatingSource,
        config: &EngineConfig,
    ) -> Result<Self> {
        Self::build_cancellable(corpus, source, config, &AtomicBool::new(false))
    }

    /// Same as [`Session::build_with_source`], but training gives up with
    /// [`nr_core::Error::Cancelled`] once `cancelled` is set.
    pub fn build_cancellable(
        corpus: Vec<Article>,
        source: &mut dyn RatingSource,
        config: &EngineConfig,
        cancelled: &AtomicBool,
    ) -> Result<Self> {
        let index = ContentIndex::build(&corpus);
        let store = RatingStore::build(source, corpus.len())?;

        // Offset the seed so the split does not replay the rating draws.
        let mut rng = crate::rng(config.seed.map(|seed| seed.wrapping_add(1)));
        let trained = SvdModel::train(
            store.ratings(),
            &config.svd,
            config.test_fraction,
            &mut rng,
            cancelled,
        )?;

        info!(
            "Built models for {} articles from {} ratings by {} users",
            corpus.len(),
            store.len(),
            store.users()
        );

        Ok(Self {
            config: config.clone(),
            corpus,
            index,
            store,
            model: trained.model,
            test_set: trained.test_set,
        })
    }

    /// A session over no articles; every recommendation is empty.
    pub fn empty(config: &EngineConfig) -> Self {
        let mut rng = crate::rng(config.seed);
        Self {
            config: config.clone(),
            corpus: Vec::new(),
            index: ContentIndex::default(),
            store: RatingStore::default(),
            model: SvdModel::fit(&[], &config.svd, &mut rng),
            test_set: Vec::new(),
        }
    }

    pub fn content_recommendations(&self, query_title: &str) -> Vec<ArticleRef> {
        content::content_recommendations(&self.corpus, query_title, &self.index, &self.config)
    }

    /// Content recommendations for a known article id.
    pub fn similar_to(&self, article_id: usize) -> Vec<ArticleRef> {
        content::similar_to(&self.corpus, article_id, &self.index, self.config.top_k)
    }

    pub fn collaborative_recommendations(&self, user_id: u32) -> Vec<ArticleRef> {
        collab::collaborative_recommendations(
            &self.corpus,
            user_id,
            &self.model,
            &self.store,
            &self.config,
        )
    }

    pub fn evaluate(&self) -> Evaluation {
        evaluate(&self.model, &self.test_set)
    }

    pub fn categories(&self) -> Vec<String> {
        corpus::categories(&self.corpus)
    }

    pub fn filter_by_category(&self, category: &str) -> Vec<&Article> {
        corpus::filter_by_category(&self.corpus, category)
    }

    pub fn article(&self, id: usize) -> Option<&Article> {
        self.corpus.get(id)
    }

    pub fn corpus(&self) -> &[Article] {
        &self.corpus
    }

    pub fn index(&self) -> &ContentIndex {
        &self.index
    }

    pub fn store(&self) -> &RatingStore {
        &self.store
    }

    pub fn model(&self) -> &SvdModel {
        &self.model
    }

    pub fn test_set(&self) -> &[nr_core::Rating] {
        &self.test_set
    }

    pub fn config(&self) -> &EngineConfig {
        &self.config
    }
}

/// Per-reader browsing state: the selected category, the articles opened so
/// far and their cached content recommendations.
#[derive(Debug, Clone)]
pub struct SessionContext {
    pub user_id: u32,
    category: String,
    clicked: HashSet<usize>,
    cached: HashMap<usize, Vec<ArticleRef>>,
}

impl SessionContext {
    pub fn new(user_id: u32) -> Self {
        Self {
            user_id,
            category: ALL_CATEGORIES.to_string(),
            clicked: HashSet::new(),
            cached: HashMap::new(),
        }
    }

    pub fn category(&self) -> &str {
        &self.category
    }

    /// Switch category. Cached recommendations are dropped when it changes.
    pub fn select_category(&mut self, category: &str) -> bool {
        if self.category == category {
            return false;
        }
        self.category = category.to_string();
        self.cached.clear();
        true
    }

    pub fn visible<'a>(&self, session: &'a Session) -> Vec<&'a Article> {
        session.filter_by_category(&self.category)
    }

    /// Record that `article_id` was opened and return its recommendations,
    /// computing them on first use.
    pub fn open(&mut self, session: &Session, article_id: usize) -> &[ArticleRef] {
        self.clicked.insert(article_id);
        self.cached
            .entry(article_id)
            .or_insert_with(|| session.similar_to(article_id))
    }

    pub fn was_opened(&self, article_id: usize) -> bool {
        self.clicked.contains(&article_id)
    }

    pub fn cached(&self, article_id: usize) -> Option<&[ArticleRef]> {
        self.cached.get(&article_id).map(Vec::as_slice)
    }
}
