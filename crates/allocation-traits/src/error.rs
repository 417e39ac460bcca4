//! Error types for the allocation framework.
//!
//! Two layers of errors exist. [`AllocationError`] is raised by the adapter
//! itself (parameter resolution, input and output checks). [`StrategyError`]
//! is whatever the wrapped strategy reports; the adapter carries it through
//! untouched via the transparent [`AllocationError::Strategy`] variant.

use std::error::Error as StdError;
use std::fmt;

use thiserror::Error;

use crate::params::{ParamType, ParamValue};

/// The main error type for allocator operations.
#[derive(Debug, Error)]
pub enum AllocationError {
    /// A parameter name was supplied that the allocator type does not declare.
    #[error("Unknown parameter '{name}' for allocator '{allocator}'")]
    UnknownParameter {
        /// Allocator type name.
        allocator: String,
        /// The offending parameter name.
        name: String,
    },

    /// A required parameter was not supplied.
    #[error("Missing required parameter '{name}' for allocator '{allocator}'")]
    MissingParameter {
        /// Allocator type name.
        allocator: String,
        /// The missing parameter name.
        name: String,
    },

    /// A declared default does not match its declared type.
    #[error("Invalid default for parameter '{name}': {reason}")]
    InvalidDefault {
        /// Parameter name.
        name: String,
        /// Why the default was rejected.
        reason: String,
    },

    /// A supplied value could not be coerced to the declared type.
    #[error("Parameter '{name}' expects {expected}, got {value}")]
    TypeCoercion {
        /// Parameter name.
        name: String,
        /// Declared type.
        expected: ParamType,
        /// The value as supplied.
        value: ParamValue,
    },

    /// The price matrix handed to `predict` is unusable.
    #[error("Invalid input: {0}")]
    InvalidInput(String),

    /// The strategy returned weights that fail the configured output check.
    #[error("Invalid output: {0}")]
    InvalidOutput(String),

    /// Error from Polars while converting tabular price data.
    #[error("Polars error: {0}")]
    Polars(#[from] polars::error::PolarsError),

    /// Failure raised by the wrapped strategy.
    #[error(transparent)]
    Strategy(#[from] StrategyError),
}

impl AllocationError {
    /// Whether this error is a configuration error (unknown or missing
    /// parameter, or a broken parameter declaration).
    #[must_use]
    pub const fn is_configuration(&self) -> bool {
        matches!(
            self,
            Self::UnknownParameter { .. }
                | Self::MissingParameter { .. }
                | Self::InvalidDefault { .. }
        )
    }

    /// Whether this error is a type coercion failure.
    #[must_use]
    pub const fn is_type_coercion(&self) -> bool {
        matches!(self, Self::TypeCoercion { .. })
    }

    /// Returns the wrapped strategy error, if this is one.
    #[must_use]
    pub const fn as_strategy(&self) -> Option<&StrategyError> {
        match self {
            Self::Strategy(err) => Some(err),
            _ => None,
        }
    }
}

/// An error raised by a strategy implementation.
///
/// Strategies come from anywhere, so the inner error is type-erased. Display
/// and `source()` both defer to the inner error.
pub struct StrategyError {
    inner: Box<dyn StdError + Send + Sync + 'static>,
}

impl StrategyError {
    /// Wrap an arbitrary error.
    pub fn new<E>(err: E) -> Self
    where
        E: Into<Box<dyn StdError + Send + Sync + 'static>>,
    {
        Self { inner: err.into() }
    }

    /// Create an error from a message.
    pub fn msg(message: impl fmt::Display) -> Self {
        Self::new(message.to_string())
    }

    /// Borrow the inner error.
    pub fn inner(&self) -> &(dyn StdError + Send + Sync + 'static) {
        self.inner.as_ref()
    }

    /// Attempt to downcast the inner error to a concrete type.
    pub fn downcast_ref<E: StdError + 'static>(&self) -> Option<&E> {
        self.inner.downcast_ref::<E>()
    }

    /// Consume and return the inner error.
    pub fn into_inner(self) -> Box<dyn StdError + Send + Sync + 'static> {
        self.inner
    }
}

impl fmt::Debug for StrategyError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Debug::fmt(&self.inner, f)
    }
}

impl fmt::Display for StrategyError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Display::fmt(&self.inner, f)
    }
}

impl StdError for StrategyError {
    fn source(&self) -> Option<&(dyn StdError + 'static)> {
        self.inner.source()
    }
}

/// A specialized Result type for allocator operations.
pub type Result<T> = std::result::Result<T, AllocationError>;
