//! Opt-in validation of strategy output.
//!
//! By default an allocator returns whatever the strategy produced. An
//! [`OutputCheck`] makes it reject weights of the wrong shape or that do not
//! sum to one. Checks never modify weights.

use allocation_traits::{AllocationError, PriceMatrix, Result, Weights};

/// What an allocator verifies about returned weights.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub enum OutputCheck {
    /// Return weights as produced.
    #[default]
    None,
    /// Each allocation must cover exactly the input's assets.
    Shape,
    /// Shape check, plus every weight finite and each allocation summing to
    /// one within `tolerance`.
    ShapeAndSum {
        /// Maximum absolute deviation of an allocation's sum from 1.0.
        tolerance: f64,
    },
}

impl OutputCheck {
    /// Tolerance used by [`Self::sum`] when none is given.
    pub const DEFAULT_TOLERANCE: f64 = 1e-6;

    /// Shape and sum check with the default tolerance.
    #[must_use]
    pub const fn sum() -> Self {
        Self::ShapeAndSum {
            tolerance: Self::DEFAULT_TOLERANCE,
        }
    }

    /// Validate `weights` produced for `prices`.
    ///
    /// # Errors
    ///
    /// [`AllocationError::InvalidOutput`] describing the first violation.
    pub fn validate(&self, prices: &PriceMatrix, weights: &Weights) -> Result<()> {
        match *self {
            Self::None => Ok(()),
            Self::Shape => check_shape(prices, weights),
            Self::ShapeAndSum { tolerance } => {
                check_shape(prices, weights)?;
                check_sums(weights, tolerance)
            }
        }
    }
}

fn check_shape(prices: &PriceMatrix, weights: &Weights) -> Result<()> {
    if weights.n_assets() != prices.n_assets() {
        return Err(AllocationError::InvalidOutput(format!(
            "expected weights for {} assets, got {}",
            prices.n_assets(),
            weights.n_assets()
        )));
    }
    if weights.n_allocations() == 0 {
        return Err(AllocationError::InvalidOutput(
            "strategy returned an empty batch".to_string(),
        ));
    }
    Ok(())
}

fn check_sums(weights: &Weights, tolerance: f64) -> Result<()> {
    if !weights.is_finite() {
        return Err(AllocationError::InvalidOutput(
            "weights contain non-finite values".to_string(),
        ));
    }
    for (i, sum) in weights.allocation_sums().into_iter().enumerate() {
        if (sum - 1.0).abs() > tolerance {
            return Err(AllocationError::InvalidOutput(format!(
                "allocation {i} sums to {sum}, expected 1.0 (tolerance {tolerance})"
            )));
        }
    }
    Ok(())
}
