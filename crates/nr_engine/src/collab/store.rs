use nr_core::{Rating, RatingSource, Result};
use rand::rngs::StdRng;
use rand::Rng;
use std::collections::{HashMap, HashSet};
use tracing::{debug, warn};

use crate::config::{DEFAULT_MAX_USER_ID, DEFAULT_RATING_SAMPLES};

const RATING_MIN: u8 = 1;
const RATING_MAX: u8 = 5;

/// Synthetic ratings drawn uniformly at random. Stands in for real
/// interaction data.
#[derive(Debug)]
pub struct RandomRatings {
    samples: usize,
    max_user_id: u32,
    rng: StdRng,
}

impl RandomRatings {
    pub fn new(samples: usize, max_user_id: u32, seed: Option<u64>) -> Self {
        Self {
            samples,
            max_user_id: max_user_id.max(1),
            rng: crate::rng(seed),
        }
    }
}

impl Default for RandomRatings {
    fn default() -> Self {
        Self::new(DEFAULT_RATING_SAMPLES, DEFAULT_MAX_USER_ID, None)
    }
}

impl RatingSource for RandomRatings {
    fn ratings(&mut self, corpus_size: usize) -> Result<Vec<Rating>> {
        if corpus_size == 0 {
            return Ok(Vec::new());
        }
        Ok((0..self.samples)
            .map(|_| Rating {
                user_id: self.rng.gen_range(1..=self.max_user_id),
                article_id: self.rng.gen_range(0..corpus_size),
                rating: self.rng.gen_range(RATING_MIN..=RATING_MAX),
            })
            .collect())
    }
}

/// Sparse user-article ratings for one corpus snapshot. Duplicate
/// (user, article) pairs are kept.
#[derive(Debug, Clone, Default)]
pub struct RatingStore {
    ratings: Vec<Rating>,
    rated: HashMap<u32, HashSet<usize>>,
}

impl RatingStore {
    /// Collect ratings from `source`, dropping any that do not reference an
    /// article of the snapshot or fall outside the 1-5 scale.
    pub fn build(source: &mut dyn RatingSource, corpus_size: usize) -> Result<Self> {
        let collected = source.ratings(corpus_size)?;
        let total = collected.len();
        let ratings: Vec<Rating> = collected
            .into_iter()
            .filter(|r| r.article_id < corpus_size && (RATING_MIN..=RATING_MAX).contains(&r.rating))
            .collect();
        if ratings.len() < total {
            warn!("Dropped {} ratings outside the corpus or rating scale", total - ratings.len());
        }
        debug!("Rating store holds {} ratings", ratings.len());
        Ok(Self::from_ratings(ratings))
    }

    pub fn from_ratings(ratings: Vec<Rating>) -> Self {
        let mut rated: HashMap<u32, HashSet<usize>> = HashMap::new();
        for rating in &ratings {
            rated.entry(rating.user_id).or_default().insert(rating.article_id);
        }
        Self { ratings, rated }
    }

    pub fn ratings(&self) -> &[Rating] {
        &self.ratings
    }

    pub fn contains_user(&self, user_id: u32) -> bool {
        self.rated.contains_key(&user_id)
    }

    /// Article ids `user_id` has rated; empty for unknown users.
    pub fn rated_by(&self, user_id: u32) -> HashSet<usize> {
        self.rated.get(&user_id).cloned().unwrap_or_default()
    }

    pub fn users(&self) -> usize {
        self.rated.len()
    }

    pub fn len(&self) -> usize {
        self.ratings.len()
    }

    pub fn is_empty(&self) -> bool {
        self.ratings.is_empty()
    }
}
