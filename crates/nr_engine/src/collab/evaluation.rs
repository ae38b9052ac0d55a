use nr_core::Rating;
use serde::Serialize;

use super::svd::SvdModel;

/// Offline accuracy of a model over held-out ratings.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Evaluation {
    pub count: usize,
    pub rmse: Option<f64>,
    pub mae: Option<f64>,
}

pub fn evaluate(model: &SvdModel, test_set: &[Rating]) -> Evaluation {
    if test_set.is_empty() {
        return Evaluation { count: 0, rmse: None, mae: None };
    }

    let (squared, absolute) = test_set.iter().fold((0.0, 0.0), |(sq, abs), rating| {
        let err = f64::from(rating.rating) - model.predict(rating.user_id, rating.article_id);
        (sq + err * err, abs + err.abs())
    });
    let n = test_set.len() as f64;

    Evaluation {
        count: test_set.len(),
        rmse: Some((squared / n).sqrt()),
        mae: Some(absolute / n),
    }
}
