//! Reference allocation strategies.
//!
//! Provides two simple strategies implementing
//! [`Strategy`](allocation_traits::Strategy) and
//! [`FromParams`](allocation_traits::FromParams), plus a [`registry`] that
//! maps names to ready-made allocator types.
//!
//! - [`EqualWeight`]: `1 / n_assets` for every asset
//! - [`RandomWeight`]: seeded uniform weights normalized to one

mod equal_weight;
mod random_weight;

pub mod registry;

pub use equal_weight::EqualWeight;
pub use random_weight::RandomWeight;
pub use registry::{StrategyInfo, available_strategies, get_strategy_info};
