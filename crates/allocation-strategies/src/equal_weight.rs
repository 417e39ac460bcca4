//! Equal-weighted allocation.

use allocation_traits::{FromParams, Params, PriceMatrix, Strategy, StrategyError, Weights};
use ndarray::Array1;

/// Allocates `1 / n_assets` to every asset, ignoring prices.
///
/// # Examples
///
/// ```rust
/// use allocation_strategies::EqualWeight;
/// use allocation_traits::{PriceMatrix, Strategy};
/// use ndarray::Array2;
///
/// let mut strategy = EqualWeight::new(1);
/// let prices = PriceMatrix::assets_by_time(Array2::ones((4, 10))).unwrap();
/// let weights = strategy.predict(&prices).unwrap();
/// assert_eq!(weights.as_single().unwrap()[0], 0.25);
/// ```
#[derive(Debug, Clone)]
pub struct EqualWeight {
    min_observations: usize,
}

impl EqualWeight {
    /// Create an equal-weight strategy requiring `min_observations` time steps.
    #[must_use]
    pub const fn new(min_observations: usize) -> Self {
        Self { min_observations }
    }
}

impl Default for EqualWeight {
    fn default() -> Self {
        Self::new(1)
    }
}

impl Strategy for EqualWeight {
    fn name(&self) -> &str {
        "equal_weight"
    }

    fn predict(&mut self, prices: &PriceMatrix) -> Result<Weights, StrategyError> {
        let n_assets = prices.n_assets();
        Ok(Weights::Single(Array1::from_elem(n_assets, 1.0 / n_assets as f64)))
    }

    fn min_observations(&self) -> usize {
        self.min_observations
    }
}

impl FromParams for EqualWeight {
    fn from_params(params: &Params) -> Result<Self, StrategyError> {
        Ok(Self::new(params.usize("min_observations")?))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use allocation_traits::params;
    use approx::assert_relative_eq;
    use ndarray::Array2;

    #[test]
    fn test_equal_weights() {
        let mut strategy = EqualWeight::default();
        let prices = PriceMatrix::assets_by_time(Array2::ones((5, 20))).unwrap();

        let weights = strategy.predict(&prices).unwrap();
        let single = weights.as_single().unwrap();

        assert_eq!(single.len(), 5);
        for &w in single {
            assert_relative_eq!(w, 0.2, epsilon = 1e-12);
        }
        assert_relative_eq!(single.sum(), 1.0, epsilon = 1e-12);
    }

    #[test]
    fn test_from_params() {
        let params = Params::new(params! { "min_observations" => 30 });
        let strategy = EqualWeight::from_params(&params).unwrap();
        assert_eq!(strategy.min_observations(), 30);
    }

    #[test]
    fn test_from_params_rejects_negative() {
        let params = Params::new(params! { "min_observations" => -3 });
        assert!(EqualWeight::from_params(&params).is_err());
    }
}
