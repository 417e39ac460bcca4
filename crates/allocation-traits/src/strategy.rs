//! Strategy traits: the capability contract every wrapped strategy satisfies.
//!
//! A strategy maps a [`PriceMatrix`] to [`Weights`]. It is constructed from a
//! resolved [`Params`] set through [`FromParams`], or through any closure that
//! produces a boxed [`Strategy`] when the concrete type is only known at
//! runtime.

use crate::error::StrategyError;
use crate::params::Params;
use crate::types::{PriceMatrix, Weights};

/// An allocation strategy.
///
/// The trait is object safe so allocators can hold any strategy behind a
/// `Box<dyn Strategy>`. `predict` takes `&mut self`: strategies may keep
/// internal state such as a seeded random generator that advances on every
/// call.
///
/// # Example
///
/// ```
/// use allocation_traits::{PriceMatrix, Strategy, StrategyError, Weights};
/// use ndarray::Array1;
///
/// struct FirstAsset;
///
/// impl Strategy for FirstAsset {
///     fn name(&self) -> &str {
///         "first_asset"
///     }
///
///     fn predict(&mut self, prices: &PriceMatrix) -> Result<Weights, StrategyError> {
///         let mut weights = Array1::zeros(prices.n_assets());
///         weights[0] = 1.0;
///         Ok(Weights::Single(weights))
///     }
/// }
/// ```
pub trait Strategy: Send {
    /// Identifier used in logs and help output.
    fn name(&self) -> &str;

    /// Compute allocation weights for a window of prices.
    ///
    /// # Errors
    ///
    /// Any error the strategy reports. Allocators pass it through unchanged.
    fn predict(&mut self, prices: &PriceMatrix) -> Result<Weights, StrategyError>;

    /// Minimum number of time steps the strategy needs.
    fn min_observations(&self) -> usize {
        1
    }
}

impl<S: Strategy + ?Sized> Strategy for Box<S> {
    fn name(&self) -> &str {
        (**self).name()
    }

    fn predict(&mut self, prices: &PriceMatrix) -> Result<Weights, StrategyError> {
        (**self).predict(prices)
    }

    fn min_observations(&self) -> usize {
        (**self).min_observations()
    }
}

/// Construction of a strategy from named parameters.
///
/// This is the constructor half of the capability contract. Implementations
/// read what they need from `params` with its typed accessors; every
/// parameter the allocator declares is present.
pub trait FromParams: Strategy + Sized {
    /// Build the strategy.
    ///
    /// # Errors
    ///
    /// Any error the strategy reports, e.g. a parameter outside its valid range.
    fn from_params(params: &Params) -> Result<Self, StrategyError>;
}
