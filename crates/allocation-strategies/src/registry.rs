//! Strategy registry for discovering the built-in strategies by name.
//!
//! Each entry carries display metadata and knows how to build the
//! [`AllocatorType`] for its strategy, parameter declarations included.

use allocation_factory::{AllocatorType, ParamSpec, create_allocator_class};
use allocation_traits::{ParamType, Result};
use serde::Serialize;

use crate::{EqualWeight, RandomWeight};

const PRICES_SHAPE: &str = "[n_assets, time_steps]";
const WEIGHTS_SHAPE: &str = "[n_assets]";

/// Metadata about a built-in strategy.
#[derive(Debug, Clone, Serialize)]
pub struct StrategyInfo {
    /// Registry key, as accepted on the command line
    pub name: &'static str,

    /// Human-readable description
    pub description: &'static str,

    #[serde(skip)]
    build: fn() -> Result<AllocatorType>,
}

impl StrategyInfo {
    /// Build the allocator type for this strategy.
    ///
    /// # Errors
    ///
    /// Propagates factory errors; the built-in declarations are valid, so
    /// this only fails if they are edited into an inconsistent state.
    pub fn allocator_type(&self) -> Result<AllocatorType> {
        (self.build)()
    }
}

fn min_observations(spec: ParamSpec) -> ParamSpec {
    spec.with_default("min_observations", ParamType::Int, 1)
        .describe("min_observations", "time steps required before predicting")
}

fn equal_weight() -> Result<AllocatorType> {
    create_allocator_class::<EqualWeight>(
        min_observations(ParamSpec::new()),
        Some(PRICES_SHAPE),
        Some(WEIGHTS_SHAPE),
    )
}

fn random_weight() -> Result<AllocatorType> {
    let spec = min_observations(ParamSpec::new())
        .optional("seed", ParamType::Int)
        .describe("seed", "RNG seed; drawn from the OS when absent");
    create_allocator_class::<RandomWeight>(spec, Some(PRICES_SHAPE), Some(WEIGHTS_SHAPE))
}

/// Get information about all available strategies.
#[must_use]
pub fn available_strategies() -> Vec<StrategyInfo> {
    vec![
        StrategyInfo {
            name: "equal_weight",
            description: "1/N allocation across all assets",
            build: equal_weight,
        },
        StrategyInfo {
            name: "random_weight",
            description: "Uniform random weights normalized to sum to one",
            build: random_weight,
        },
    ]
}

/// Get information about a specific strategy by name.
#[must_use]
pub fn get_strategy_info(name: &str) -> Option<StrategyInfo> {
    available_strategies()
        .into_iter()
        .find(|info| info.name == name)
}

#[cfg(test)]
mod tests {
    use super::*;
    use allocation_traits::{ParamValue, PriceMatrix, params};
    use approx::assert_relative_eq;
    use ndarray::Array2;

    #[test]
    fn test_available_strategies() {
        let names: Vec<_> = available_strategies().iter().map(|s| s.name).collect();
        assert_eq!(names, vec!["equal_weight", "random_weight"]);
    }

    #[test]
    fn test_get_strategy_info() {
        let info = get_strategy_info("random_weight").unwrap();
        assert_eq!(info.name, "random_weight");
        assert!(get_strategy_info("nonexistent_strategy").is_none());
    }

    #[test]
    fn test_every_entry_builds() {
        for info in available_strategies() {
            let allocator_type = info.allocator_type().unwrap();
            assert!(allocator_type.param_spec().contains("min_observations"));
            assert_eq!(allocator_type.input_shape_desc(), Some(PRICES_SHAPE));
        }
    }

    #[test]
    fn test_random_weight_declarations() {
        let allocator_type = get_strategy_info("random_weight")
            .unwrap()
            .allocator_type()
            .unwrap();
        assert_eq!(allocator_type.name(), "RandomWeight");

        let allocator = allocator_type.instantiate_default().unwrap();
        assert_eq!(allocator.params().get("min_observations"), Some(&ParamValue::Int(1)));
        assert_eq!(allocator.params().get("seed"), Some(&ParamValue::None));
    }

    #[test]
    fn test_seeded_random_allocator_repeats() {
        let allocator_type = get_strategy_info("random_weight")
            .unwrap()
            .allocator_type()
            .unwrap();
        let mut allocator = allocator_type.instantiate(params! { "seed" => 42 }).unwrap();
        let prices = PriceMatrix::assets_by_time(Array2::ones((5, 100))).unwrap();

        let first = allocator.predict(&prices).unwrap();
        let second = allocator.predict(&prices).unwrap();
        assert_eq!(first, second);
    }

    #[test]
    fn test_explicit_none_rejected_by_strategy() {
        let allocator_type = get_strategy_info("random_weight")
            .unwrap()
            .allocator_type()
            .unwrap();
        let err = allocator_type
            .instantiate(params! { "min_observations" => None::<i64> })
            .unwrap_err();

        assert!(!err.is_type_coercion());
        assert!(err.as_strategy().is_some());
    }

    #[test]
    fn test_min_observations_enforced() {
        let allocator_type = get_strategy_info("equal_weight")
            .unwrap()
            .allocator_type()
            .unwrap();
        let mut allocator = allocator_type
            .instantiate(params! { "min_observations" => 30 })
            .unwrap();

        let short = PriceMatrix::assets_by_time(Array2::ones((3, 10))).unwrap();
        assert!(allocator.predict(&short).is_err());

        let long = PriceMatrix::assets_by_time(Array2::ones((3, 30))).unwrap();
        let weights = allocator.predict(&long).unwrap();
        assert_relative_eq!(weights.allocation_sums()[0], 1.0, epsilon = 1e-12);
    }
}
