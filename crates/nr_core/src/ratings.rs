use crate::types::Rating;
use crate::Result;

/// Supplies the ratings a collaborative model is trained on.
///
/// Implementations may draw synthetic ratings or replay real interactions;
/// downstream components only see the returned triples.
pub trait RatingSource {
    fn ratings(&mut self, corpus_size: usize) -> Result<Vec<Rating>>;
}

/// A fixed, pre-collected set of ratings.
#[derive(Debug, Clone, Default)]
pub struct StaticRatings {
    ratings: Vec<Rating>,
}

impl StaticRatings {
    pub fn new(ratings: Vec<Rating>) -> Self {
        Self { ratings }
    }

    pub fn len(&self) -> usize {
        self.ratings.len()
    }

    pub fn is_empty(&self) -> bool {
        self.ratings.is_empty()
    }
}

impl RatingSource for StaticRatings {
    fn ratings(&mut self, _corpus_size: usize) -> Result<Vec<Rating>> {
        Ok(self.ratings.clone())
    }
}
