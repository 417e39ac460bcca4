#![doc(issue_tracker_base_url = "https://github.com/allocation-rs/allocation/issues/")]
#![cfg_attr(docsrs, feature(doc_cfg, doc_auto_cfg))]
#![warn(missing_docs)]
#![forbid(unsafe_code)]

//! # allocation
//!
//! Uniform wrappers around portfolio allocation strategies.
//!
//! allocation is an umbrella crate that re-exports the allocation sub-crates
//! for convenience. A strategy is any type that maps a price matrix to
//! portfolio weights; the factory turns it into an allocator type with
//! declared, validated and coerced constructor parameters.
//!
//! ## Quick Start
//!
//! ```rust
//! use allocation::prelude::*;
//! use allocation::strategies::RandomWeight;
//! use ndarray::Array2;
//!
//! # fn main() -> allocation::Result<()> {
//! let random_allocator = create_allocator_class::<RandomWeight>(
//!     ParamSpec::new()
//!         .with_default("min_observations", ParamType::Int, 1)
//!         .optional("seed", ParamType::Int),
//!     Some("[n_assets, time_steps]"),
//!     Some("[n_assets]"),
//! )?;
//!
//! let mut allocator = random_allocator.instantiate(params! { "seed" => 42 })?;
//! let prices = PriceMatrix::assets_by_time(Array2::ones((5, 100)))?;
//! let weights = allocator.predict(&prices)?;
//! assert_eq!(weights.n_assets(), 5);
//! # Ok(())
//! # }
//! ```
//!
//! ## Crate Organization
//!
//! - [`traits`] - The strategy contract, price and weight types, errors
//! - [`factory`] - Parameter specs, allocator types and instances
//! - [`strategies`] - Built-in strategies and their registry
//!
//! ## Lifecycle
//!
//! 1. **Declare** the strategy's parameters in a [`ParamSpec`]
//! 2. **Create** an [`AllocatorType`] once; defaults are checked here
//! 3. **Instantiate** it with user parameters; unknown, missing and
//!    mistyped values are rejected before the strategy is built
//! 4. **Predict** weights; the call is forwarded to the strategy

/// Version information for the allocation crate.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

// ============================================================================
// Core Traits
// ============================================================================

/// Core trait definitions and data types.
///
/// - [`Strategy`] - Maps prices to weights
/// - [`FromParams`] - Builds a strategy from resolved parameters
/// - [`PriceMatrix`] / [`Weights`] - Prediction input and output
pub mod traits {
    pub use allocation_traits::*;
}

// Re-export core traits at top level for convenience
pub use allocation_traits::{FromParams, Strategy};

// Re-export error types
pub use allocation_traits::{AllocationError, Result, StrategyError};

// Re-export common types
pub use allocation_traits::{
    ParamMap, ParamType, ParamValue, Params, PriceLayout, PriceMatrix, Weights, params,
};

// ============================================================================
// Factory
// ============================================================================

/// Allocator factory.
///
/// ## Parameter Resolution
///
/// Each declared parameter is one of:
///
/// - **Required**: must be supplied on instantiation
/// - **OptionalWithDefault**: the default is used when omitted
/// - **OptionalAbsent**: resolves to `None` when omitted
///
/// Supplied values are coerced to the declared [`ParamType`]: `"10"` becomes
/// `10` for an int parameter, `3.0` becomes `3`, but `3.5` is rejected.
pub mod factory {
    pub use allocation_factory::*;
}

pub use allocation_factory::{
    Allocator, AllocatorType, OutputCheck, ParamDefault, ParamSpec, create_allocator_class,
};

// ============================================================================
// Strategies
// ============================================================================

/// Built-in strategies.
///
/// ```rust
/// use allocation::strategies::get_strategy_info;
///
/// let info = get_strategy_info("equal_weight").unwrap();
/// let allocator_type = info.allocator_type().unwrap();
/// println!("{}", allocator_type.describe());
/// ```
pub mod strategies {
    pub use allocation_strategies::*;
}

// ============================================================================
// Prelude
// ============================================================================

/// Prelude module for convenient imports.
///
/// ```rust
/// use allocation::prelude::*;
/// ```
pub mod prelude {
    pub use crate::{
        AllocationError, Allocator, AllocatorType, FromParams, OutputCheck, ParamSpec,
        ParamType, ParamValue, Params, PriceLayout, PriceMatrix, Result, Strategy,
        StrategyError, Weights, create_allocator_class, params,
    };
}

// ============================================================================
// Tests
// ============================================================================
