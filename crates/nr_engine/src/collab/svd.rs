//! Biased latent factor model trained with stochastic gradient descent.
//!
//! The estimate for user `u` and article `i` is
//! `mu + b_u + b_i + q_i . p_u`. Users or articles absent from training
//! contribute neither a bias nor a factor term, so the model falls back to
//! the global mean for them.

use nr_core::{Error, Rating, Result};
use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use rand::Rng;
use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, Ordering};
use tracing::{debug, info};

use crate::config::SvdParams;

#[derive(Debug, Clone)]
pub struct SvdModel {
    params: SvdParams,
    global_mean: f64,
    users: HashMap<u32, usize>,
    items: HashMap<usize, usize>,
    user_bias: Vec<f64>,
    item_bias: Vec<f64>,
    user_factors: Vec<Vec<f64>>,
    item_factors: Vec<Vec<f64>>,
}

/// A fitted model together with the ratings held out from training.
#[derive(Debug, Clone)]
pub struct TrainedModel {
    pub model: SvdModel,
    pub test_set: Vec<Rating>,
}

/// Shuffle `ratings` and hold out `ceil(test_fraction * n)` of them.
/// Returns `(train, test)`.
pub fn train_test_split(
    ratings: &[Rating],
    test_fraction: f64,
    rng: &mut StdRng,
) -> (Vec<Rating>, Vec<Rating>) {
    let mut shuffled = ratings.to_vec();
    shuffled.shuffle(rng);
    let n_test = ((test_fraction * shuffled.len() as f64).ceil() as usize).min(shuffled.len());
    let train = shuffled.split_off(n_test);
    (train, shuffled)
}

impl SvdModel {
    /// Split `ratings`, then fit a model on the training part. Training
    /// stops with [`Error::Cancelled`] once `cancelled` is set.
    pub fn train(
        ratings: &[Rating],
        params: &SvdParams,
        test_fraction: f64,
        rng: &mut StdRng,
        cancelled: &AtomicBool,
    ) -> Result<TrainedModel> {
        let (train, test_set) = train_test_split(ratings, test_fraction, rng);
        info!(
            "Training latent factor model on {} ratings ({} held out)",
            train.len(),
            test_set.len()
        );
        Ok(TrainedModel {
            model: Self::fit_cancellable(&train, params, rng, cancelled)?,
            test_set,
        })
    }

    pub fn fit(ratings: &[Rating], params: &SvdParams, rng: &mut StdRng) -> Self {
        let mut model = Self::init(ratings, params, rng);
        for epoch in 0..params.n_epochs {
            model.run_epoch(ratings, epoch);
        }
        model
    }

    /// [`SvdModel::fit`], checking `cancelled` before every epoch.
    pub fn fit_cancellable(
        ratings: &[Rating],
        params: &SvdParams,
        rng: &mut StdRng,
        cancelled: &AtomicBool,
    ) -> Result<Self> {
        let mut model = Self::init(ratings, params, rng);
        for epoch in 0..params.n_epochs {
            if cancelled.load(Ordering::Relaxed) {
                info!("Training cancelled after {}/{} epochs", epoch, params.n_epochs);
                return Err(Error::Cancelled);
            }
            model.run_epoch(ratings, epoch);
        }
        Ok(model)
    }

    fn init(ratings: &[Rating], params: &SvdParams, rng: &mut StdRng) -> Self {
        let mut users = HashMap::new();
        let mut items = HashMap::new();
        for rating in ratings {
            let next_user = users.len();
            users.entry(rating.user_id).or_insert(next_user);
            let next_item = items.len();
            items.entry(rating.article_id).or_insert(next_item);
        }

        let global_mean = if ratings.is_empty() {
            (params.rating_min + params.rating_max) / 2.0
        } else {
            ratings.iter().map(|r| f64::from(r.rating)).sum::<f64>() / ratings.len() as f64
        };

        Self {
            params: params.clone(),
            global_mean,
            user_bias: vec![0.0; users.len()],
            item_bias: vec![0.0; items.len()],
            user_factors: init_factors(users.len(), params, rng),
            item_factors: init_factors(items.len(), params, rng),
            users,
            items,
        }
    }

    fn run_epoch(&mut self, ratings: &[Rating], epoch: usize) {
        let mut squared_error = 0.0;
        for rating in ratings {
            let u = self.users[&rating.user_id];
            let i = self.items[&rating.article_id];
            let err = f64::from(rating.rating) - self.raw_estimate(u, i);
            squared_error += err * err;
            self.step(u, i, err);
        }
        if !ratings.is_empty() {
            debug!(
                "Epoch {}/{}: training rmse {:.4}",
                epoch + 1,
                self.params.n_epochs,
                (squared_error / ratings.len() as f64).sqrt()
            );
        }
    }

    fn step(&mut self, u: usize, i: usize, err: f64) {
        let SvdParams { lr, reg, .. } = self.params;

        self.user_bias[u] += lr * (err - reg * self.user_bias[u]);
        self.item_bias[i] += lr * (err - reg * self.item_bias[i]);

        let user = &mut self.user_factors[u];
        let item = &mut self.item_factors[i];
        for (p, q) in user.iter_mut().zip(item.iter_mut()) {
            let (p_old, q_old) = (*p, *q);
            *p += lr * (err * q_old - reg * p_old);
            *q += lr * (err * p_old - reg * q_old);
        }
    }

    fn raw_estimate(&self, u: usize, i: usize) -> f64 {
        let dot: f64 = self.user_factors[u]
            .iter()
            .zip(&self.item_factors[i])
            .map(|(p, q)| p * q)
            .sum();
        self.global_mean + self.user_bias[u] + self.item_bias[i] + dot
    }

    /// Unclipped estimate for `(user_id, article_id)`.
    pub fn estimate(&self, user_id: u32, article_id: usize) -> f64 {
        let user = self.users.get(&user_id).copied();
        let item = self.items.get(&article_id).copied();
        match (user, item) {
            (Some(u), Some(i)) => self.raw_estimate(u, i),
            (Some(u), None) => self.global_mean + self.user_bias[u],
            (None, Some(i)) => self.global_mean + self.item_bias[i],
            (None, None) => self.global_mean,
        }
    }

    /// Estimate for `(user_id, article_id)`, clipped to the rating scale when
    /// the model was configured to clip.
    pub fn predict(&self, user_id: u32, article_id: usize) -> f64 {
        let estimate = self.estimate(user_id, article_id);
        if self.params.clip {
            estimate.clamp(self.params.rating_min, self.params.rating_max)
        } else {
            estimate
        }
    }

    pub fn global_mean(&self) -> f64 {
        self.global_mean
    }

    pub fn knows_user(&self, user_id: u32) -> bool {
        self.users.contains_key(&user_id)
    }

    pub fn knows_article(&self, article_id: usize) -> bool {
        self.items.contains_key(&article_id)
    }
}

/// Factor matrix drawn from N(init_mean, init_std) via Box-Muller.
fn init_factors(rows: usize, params: &SvdParams, rng: &mut StdRng) -> Vec<Vec<f64>> {
    (0..rows)
        .map(|_| {
            (0..params.n_factors)
                .map(|_| {
                    let u1: f64 = rng.gen_range(f64::EPSILON..1.0);
                    let u2: f64 = rng.gen_range(0.0..1.0);
                    let z = (-2.0 * u1.ln()).sqrt() * (2.0 * std::f64::consts::PI * u2).cos();
                    params.init_mean + params.init_std * z
                })
                .collect()
        })
        .collect()
}
