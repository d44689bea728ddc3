//! Collaborative rating estimation via biased matrix factorization.
//!
//! A latent-factor model (global mean + user/item biases + factor dot
//! product) trained once over the full interaction log with seeded SGD.
//! Queries for users or products unseen at fit time fall back to the bias
//! terms that are known, bottoming out at the global mean — the cold-start
//! default — rather than failing.

use crate::catalog::ProductId;
use crate::error::{Error, Result};
use crate::interactions::InteractionLog;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use rustc_hash::FxHashMap;
use serde::{Deserialize, Serialize};

/// Hyperparameters for the collaborative estimator.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CollabConfig {
    /// Number of latent factors per user/item.
    pub latent_factors: usize,
    /// SGD passes over the log.
    pub epochs: usize,
    /// SGD learning rate.
    pub learning_rate: f32,
    /// L2 regularization strength.
    pub regularization: f32,
    /// (min, max) of the rating scale; predictions are clamped to it.
    pub rating_scale: (f32, f32),
    /// Seed for factor initialization.
    pub seed: u64,
}

impl Default for CollabConfig {
    fn default() -> Self {
        Self {
            latent_factors: 32,
            epochs: 20,
            learning_rate: 0.005,
            regularization: 0.02,
            rating_scale: (1.0, 5.0),
            seed: 42,
        }
    }
}

/// Fitted latent-factor rating model.
#[derive(Debug, Clone)]
pub struct SvdModel {
    global_mean: f32,
    user_index: FxHashMap<String, usize>,
    item_index: FxHashMap<ProductId, usize>,
    user_bias: Vec<f32>,
    item_bias: Vec<f32>,
    user_factors: Vec<Vec<f32>>,
    item_factors: Vec<Vec<f32>>,
    scale: (f32, f32),
}

impl SvdModel {
    /// Fits the model over the full interaction log.
    ///
    /// # Errors
    ///
    /// Returns [`Error::ModelFit`] when the log is empty or the configured
    /// factor count is zero.
    pub fn fit(log: &InteractionLog, config: &CollabConfig) -> Result<Self> {
        if log.is_empty() {
            return Err(Error::ModelFit(
                "cannot fit the collaborative model on an empty interaction log".to_string(),
            ));
        }
        if config.latent_factors == 0 {
            return Err(Error::ModelFit(
                "latent_factors must be at least 1".to_string(),
            ));
        }

        let mut user_index: FxHashMap<String, usize> = FxHashMap::default();
        let mut item_index: FxHashMap<ProductId, usize> = FxHashMap::default();
        let mut triples: Vec<(usize, usize, f32)> = Vec::with_capacity(log.len());
        let mut rating_sum = 0.0f64;
        for interaction in log.iter() {
            let next_user = user_index.len();
            let u = *user_index
                .entry(interaction.user_id.clone())
                .or_insert(next_user);
            let next_item = item_index.len();
            let i = *item_index.entry(interaction.product_id).or_insert(next_item);
            triples.push((u, i, interaction.rating));
            rating_sum += f64::from(interaction.rating);
        }

        #[allow(clippy::cast_precision_loss)] // log sizes are well below 2^52
        let global_mean = (rating_sum / log.len() as f64) as f32;

        let mut rng = StdRng::seed_from_u64(config.seed);
        let mut init_factors = |count: usize| -> Vec<Vec<f32>> {
            (0..count)
                .map(|_| {
                    (0..config.latent_factors)
                        .map(|_| rng.gen_range(-0.05..0.05))
                        .collect()
                })
                .collect()
        };
        let mut user_factors = init_factors(user_index.len());
        let mut item_factors = init_factors(item_index.len());
        let mut user_bias = vec![0.0f32; user_index.len()];
        let mut item_bias = vec![0.0f32; item_index.len()];

        let lr = config.learning_rate;
        let reg = config.regularization;
        for _ in 0..config.epochs {
            for &(u, i, rating) in &triples {
                let prediction = global_mean
                    + user_bias[u]
                    + item_bias[i]
                    + dot(&user_factors[u], &item_factors[i]);
                let err = rating - prediction;

                user_bias[u] += lr * (err - reg * user_bias[u]);
                item_bias[i] += lr * (err - reg * item_bias[i]);
                for f in 0..config.latent_factors {
                    let pu = user_factors[u][f];
                    let qi = item_factors[i][f];
                    user_factors[u][f] += lr * (err * qi - reg * pu);
                    item_factors[i][f] += lr * (err * pu - reg * qi);
                }
            }
        }

        tracing::info!(
            users = user_index.len(),
            items = item_index.len(),
            events = log.len(),
            factors = config.latent_factors,
            "collaborative model fitted"
        );

        Ok(Self {
            global_mean,
            user_index,
            item_index,
            user_bias,
            item_bias,
            user_factors,
            item_factors,
            scale: config.rating_scale,
        })
    }

    /// Mean rating over the training log — the cold-start default.
    #[must_use]
    pub fn global_mean(&self) -> f32 {
        self.global_mean
    }

    /// Predicts a rating for a (user, product) pair.
    ///
    /// Unknown users or products contribute nothing beyond the bias terms
    /// that are known; a fully cold pair predicts the global mean. The
    /// result is clamped to the configured rating scale.
    #[must_use]
    pub fn predict(&self, user_id: &str, product_id: ProductId) -> f32 {
        let user = self.user_index.get(user_id).copied();
        let item = self.item_index.get(&product_id).copied();

        let mut estimate = self.global_mean;
        if let Some(u) = user {
            estimate += self.user_bias[u];
        }
        if let Some(i) = item {
            estimate += self.item_bias[i];
        }
        if let (Some(u), Some(i)) = (user, item) {
            estimate += dot(&self.user_factors[u], &self.item_factors[i]);
        }
        estimate.clamp(self.scale.0, self.scale.1)
    }

    /// Ranks candidate products by predicted rating descending, ties broken
    /// by product id ascending.
    #[must_use]
    pub fn rank(&self, user_id: &str, candidates: &[ProductId]) -> Vec<(ProductId, f32)> {
        let mut ranked: Vec<(ProductId, f32)> = candidates
            .iter()
            .map(|&id| (id, self.predict(user_id, id)))
            .collect();
        ranked.sort_by(|a, b| b.1.total_cmp(&a.1).then(a.0.cmp(&b.0)));
        ranked
    }
}

fn dot(a: &[f32], b: &[f32]) -> f32 {
    a.iter().zip(b).map(|(x, y)| x * y).sum()
}
