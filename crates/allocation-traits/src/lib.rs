#![doc(issue_tracker_base_url = "https://github.com/allocation-rs/allocation/issues/")]
#![cfg_attr(docsrs, feature(doc_cfg, doc_auto_cfg))]
#![warn(missing_docs)]
#![forbid(unsafe_code)]

//! Core trait definitions for wrapping allocation strategies.
//!
//! This crate provides the capability contract a strategy must satisfy
//! ([`Strategy`], [`FromParams`]), the data exchanged with it ([`PriceMatrix`],
//! [`Weights`]), parameter values ([`ParamValue`], [`Params`]) and the shared
//! error types.

/// The version of the allocation-traits crate.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

// Module declarations
pub mod error;
pub mod params;
pub mod strategy;
pub mod types;

// Re-exports
pub use error::{AllocationError, Result, StrategyError};
pub use params::{ParamMap, ParamType, ParamValue, Params};
pub use strategy::{FromParams, Strategy};
pub use types::{PriceLayout, PriceMatrix, Weights};
