//! Randomly weighted allocation.
//!
//! Mostly useful as a baseline and for exercising allocator plumbing: the
//! weights carry no information about prices, but they are valid (positive,
//! summing to one) and reproducible when a seed is given.

use allocation_traits::{FromParams, Params, PriceMatrix, Strategy, StrategyError, Weights};
use ndarray::Array1;
use rand::SeedableRng;
use rand::distributions::{Distribution, Uniform};
use rand::rngs::StdRng;

/// Draws uniform weights for every asset and normalizes them to sum to one.
///
/// With a seed, a fresh generator is built from it on every prediction, so
/// each call (on this instance or any other with the same seed) returns the
/// same weights. Without a seed every call draws from the operating system.
#[derive(Debug, Clone)]
pub struct RandomWeight {
    min_observations: usize,
    seed: Option<u64>,
}

impl RandomWeight {
    /// Create a random-weight strategy.
    #[must_use]
    pub const fn new(min_observations: usize, seed: Option<u64>) -> Self {
        Self {
            min_observations,
            seed,
        }
    }

    /// Seed the generator was created with, if any.
    #[must_use]
    pub const fn seed(&self) -> Option<u64> {
        self.seed
    }

    fn draw(&self, n_assets: usize) -> Array1<f64> {
        let mut rng = self.seed.map_or_else(StdRng::from_entropy, StdRng::seed_from_u64);
        let dist = Uniform::new(0.0, 1.0);
        let raw: Array1<f64> = (0..n_assets).map(|_| dist.sample(&mut rng)).collect();
        let total = raw.sum();
        if total > 0.0 {
            raw / total
        } else {
            // All draws were zero.
            Array1::from_elem(n_assets, 1.0 / n_assets as f64)
        }
    }
}

impl Default for RandomWeight {
    fn default() -> Self {
        Self::new(1, None)
    }
}

impl Strategy for RandomWeight {
    fn name(&self) -> &str {
        "random_weight"
    }

    fn predict(&mut self, prices: &PriceMatrix) -> Result<Weights, StrategyError> {
        Ok(Weights::Single(self.draw(prices.n_assets())))
    }

    fn min_observations(&self) -> usize {
        self.min_observations
    }
}

impl FromParams for RandomWeight {
    fn from_params(params: &Params) -> Result<Self, StrategyError> {
        Ok(Self::new(
            params.usize("min_observations")?,
            params.optional_u64("seed")?,
        ))
    }
}
