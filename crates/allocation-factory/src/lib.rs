//! Allocator factory for wrapping allocation strategies.
//!
//! Given a strategy, a declarative [`ParamSpec`] and some shape documentation,
//! [`create_allocator_class`] produces an [`AllocatorType`]. Instances of that
//! type resolve and coerce constructor parameters, build the strategy, and
//! forward every `predict` call to it with input validation and an optional
//! [`OutputCheck`] on the way back.
//!
//! # Examples
//!
//! ```rust,no_run
//! use allocation_factory::{create_allocator_class, ParamSpec};
//! use allocation_traits::{params, FromParams, ParamType, PriceMatrix};
//! # use allocation_traits::{Params, Strategy, StrategyError, Weights};
//! # struct RandomWeight;
//! # impl Strategy for RandomWeight {
//! #     fn name(&self) -> &str { "random_weight" }
//! #     fn predict(&mut self, _: &PriceMatrix) -> Result<Weights, StrategyError> { todo!() }
//! # }
//! # impl FromParams for RandomWeight {
//! #     fn from_params(_: &Params) -> Result<Self, StrategyError> { Ok(Self) }
//! # }
//!
//! let random_allocator = create_allocator_class::<RandomWeight>(
//!     ParamSpec::new()
//!         .with_default("min_observations", ParamType::Int, 1)
//!         .optional("seed", ParamType::Int),
//!     Some("[n_assets, time_steps]"),
//!     Some("[n_assets]"),
//! )
//! .unwrap();
//!
//! let mut allocator = random_allocator.instantiate(params! { "seed" => 42 }).unwrap();
//! let prices = PriceMatrix::from_shape_vec(5, 100, vec![1.0; 500]).unwrap();
//! let weights = allocator.predict(&prices).unwrap();
//! ```

mod allocator;
mod check;
mod param_spec;

// Re-export main types
pub use allocator::{Allocator, AllocatorType, StrategyConstructor, create_allocator_class};
pub use check::OutputCheck;
pub use param_spec::{ParamDefault, ParamInfo, ParamSpec};
