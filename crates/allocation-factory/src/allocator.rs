//! Allocator types and instances.
//!
//! An [`AllocatorType`] pairs a strategy constructor with the [`ParamSpec`]
//! describing its parameters and some shape documentation. It is built once
//! and then stamps out [`Allocator`] instances, each owning one freshly
//! constructed strategy.

use std::any::type_name;
use std::fmt;
use std::sync::Arc;

use allocation_traits::{
    AllocationError, FromParams, ParamMap, Params, PriceLayout, PriceMatrix, Result, Strategy,
    StrategyError, Weights,
};
use log::{debug, trace};

use crate::check::OutputCheck;
use crate::param_spec::ParamSpec;

/// Boxed strategy constructor stored by an [`AllocatorType`].
pub type StrategyConstructor =
    dyn Fn(&Params) -> std::result::Result<Box<dyn Strategy>, StrategyError> + Send + Sync;

/// Create an allocator type for strategy `S`.
///
/// The type is named after `S`. Defaults in `param_info` are checked against
/// their declared types here, so a broken declaration fails once up front
/// instead of on every instantiation.
///
/// # Errors
///
/// [`AllocationError::InvalidDefault`] if a default does not fit its type.
///
/// # Example
///
/// ```
/// use allocation_factory::{create_allocator_class, ParamSpec};
/// use allocation_traits::{
///     params, FromParams, ParamType, Params, PriceMatrix, Strategy, StrategyError, Weights,
/// };
/// use ndarray::{Array1, Array2};
///
/// struct EqualWeight;
///
/// impl Strategy for EqualWeight {
///     fn name(&self) -> &str {
///         "equal_weight"
///     }
///
///     fn predict(&mut self, prices: &PriceMatrix) -> Result<Weights, StrategyError> {
///         let n = prices.n_assets();
///         Ok(Weights::Single(Array1::from_elem(n, 1.0 / n as f64)))
///     }
/// }
///
/// impl FromParams for EqualWeight {
///     fn from_params(_params: &Params) -> Result<Self, StrategyError> {
///         Ok(Self)
///     }
/// }
///
/// let allocator_type = create_allocator_class::<EqualWeight>(
///     ParamSpec::new().with_default("min_observations", ParamType::Int, 1),
///     Some("[n_assets, time_steps]"),
///     Some("[n_assets]"),
/// )
/// .unwrap();
///
/// let mut allocator = allocator_type.instantiate(params! {}).unwrap();
/// let prices = PriceMatrix::assets_by_time(Array2::ones((4, 30))).unwrap();
/// let weights = allocator.predict(&prices).unwrap();
/// assert_eq!(weights.n_assets(), 4);
/// ```
pub fn create_allocator_class<S>(
    param_info: ParamSpec,
    input_shape_desc: Option<&str>,
    output_shape_desc: Option<&str>,
) -> Result<AllocatorType>
where
    S: FromParams + 'static,
{
    let name = short_type_name::<S>();
    let mut allocator_type = AllocatorType::for_strategy::<S>(name, param_info)?;
    if let Some(desc) = input_shape_desc {
        allocator_type = allocator_type.with_input_shape_desc(desc);
    }
    if let Some(desc) = output_shape_desc {
        allocator_type = allocator_type.with_output_shape_desc(desc);
    }
    Ok(allocator_type)
}

fn short_type_name<S>() -> &'static str {
    let full = type_name::<S>();
    let base = full.split('<').next().unwrap_or(full);
    base.rsplit("::").next().unwrap_or(base)
}

/// A factory-produced allocator type.
///
/// Cheap to clone and safe to share between threads: it only holds immutable
/// configuration and the strategy constructor.
#[derive(Clone)]
pub struct AllocatorType {
    name: Arc<str>,
    spec: Arc<ParamSpec>,
    input_shape_desc: Option<Arc<str>>,
    output_shape_desc: Option<Arc<str>>,
    layout: PriceLayout,
    output_check: OutputCheck,
    constructor: Arc<StrategyConstructor>,
}

impl AllocatorType {
    /// Create an allocator type for a strategy implementing [`FromParams`].
    ///
    /// # Errors
    ///
    /// [`AllocationError::InvalidDefault`] if a default does not fit its type.
    pub fn for_strategy<S>(name: impl Into<Arc<str>>, spec: ParamSpec) -> Result<Self>
    where
        S: FromParams + 'static,
    {
        Self::from_constructor(name, spec, |params| {
            S::from_params(params).map(|s| Box::new(s) as Box<dyn Strategy>)
        })
    }

    /// Create an allocator type from an arbitrary constructor.
    ///
    /// This is the entry point for strategies whose concrete type is only
    /// known at runtime, e.g. ones chosen by name from a registry.
    ///
    /// # Errors
    ///
    /// [`AllocationError::InvalidDefault`] if a default does not fit its type.
    pub fn from_constructor<F>(
        name: impl Into<Arc<str>>,
        spec: ParamSpec,
        constructor: F,
    ) -> Result<Self>
    where
        F: Fn(&Params) -> std::result::Result<Box<dyn Strategy>, StrategyError>
            + Send
            + Sync
            + 'static,
    {
        let name = name.into();
        let spec = spec.normalized()?;
        debug!(
            "created allocator type '{}' with parameters [{}]",
            name,
            spec.iter().map(|(n, _)| n).collect::<Vec<_>>().join(", ")
        );
        Ok(Self {
            name,
            spec: Arc::new(spec),
            input_shape_desc: None,
            output_shape_desc: None,
            layout: PriceLayout::default(),
            output_check: OutputCheck::default(),
            constructor: Arc::new(constructor),
        })
    }

    /// Attach an input shape description.
    #[must_use]
    pub fn with_input_shape_desc(mut self, desc: impl Into<Arc<str>>) -> Self {
        self.input_shape_desc = Some(desc.into());
        self
    }

    /// Attach an output shape description.
    #[must_use]
    pub fn with_output_shape_desc(mut self, desc: impl Into<Arc<str>>) -> Self {
        self.output_shape_desc = Some(desc.into());
        self
    }

    /// Set the price layout instances accept.
    #[must_use]
    pub fn with_layout(mut self, layout: PriceLayout) -> Self {
        self.layout = layout;
        self
    }

    /// Set the output check instances apply.
    #[must_use]
    pub fn with_output_check(mut self, check: OutputCheck) -> Self {
        self.output_check = check;
        self
    }

    /// Type name.
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Parameter declarations.
    #[must_use]
    pub fn param_spec(&self) -> &ParamSpec {
        &self.spec
    }

    /// Input shape description, if one was attached.
    #[must_use]
    pub fn input_shape_desc(&self) -> Option<&str> {
        self.input_shape_desc.as_deref()
    }

    /// Output shape description, if one was attached.
    #[must_use]
    pub fn output_shape_desc(&self) -> Option<&str> {
        self.output_shape_desc.as_deref()
    }

    /// Price layout instances accept.
    #[must_use]
    pub const fn layout(&self) -> PriceLayout {
        self.layout
    }

    /// Output check instances apply.
    #[must_use]
    pub const fn output_check(&self) -> OutputCheck {
        self.output_check
    }

    /// Human-readable help text.
    #[must_use]
    pub fn describe(&self) -> String {
        let mut out = format!("{}\n", self.name);
        out.push_str(&format!(
            "  input:  {}\n",
            self.input_shape_desc().unwrap_or(self.layout.shape_desc())
        ));
        out.push_str(&format!(
            "  output: {}\n",
            self.output_shape_desc().unwrap_or("unspecified")
        ));
        if self.spec.is_empty() {
            out.push_str("  parameters: none\n");
        } else {
            out.push_str("  parameters:\n");
            for (name, info) in self.spec.iter() {
                out.push_str(&format!("    {name}: {info}\n"));
            }
        }
        out
    }

    /// Construct an allocator from caller-chosen parameters.
    ///
    /// Parameters are resolved against the declarations first; the strategy
    /// is only constructed if that succeeds.
    ///
    /// # Errors
    ///
    /// - configuration errors for unknown or missing parameters
    /// - [`AllocationError::TypeCoercion`] for values that do not fit
    /// - [`AllocationError::Strategy`] if the strategy constructor fails
    pub fn instantiate(&self, supplied: ParamMap) -> Result<Allocator> {
        let params = self.spec.resolve(&self.name, &supplied)?;
        let strategy = (self.constructor)(&params)?;
        debug!(
            "instantiated allocator '{}' wrapping strategy '{}'",
            self.name,
            strategy.name()
        );
        Ok(Allocator {
            allocator_type: self.clone(),
            params,
            strategy,
        })
    }

    /// Construct an allocator with every parameter at its default.
    pub fn instantiate_default(&self) -> Result<Allocator> {
        self.instantiate(ParamMap::new())
    }
}

impl fmt::Debug for AllocatorType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AllocatorType")
            .field("name", &self.name)
            .field("spec", &self.spec)
            .field("input_shape_desc", &self.input_shape_desc)
            .field("output_shape_desc", &self.output_shape_desc)
            .field("layout", &self.layout)
            .field("output_check", &self.output_check)
            .finish_non_exhaustive()
    }
}

/// An allocator instance wrapping one strategy.
///
/// `predict` takes `&mut self`, so one instance serves one caller at a time.
/// Separate instances share nothing mutable and may live on different threads.
pub struct Allocator {
    allocator_type: AllocatorType,
    params: Params,
    strategy: Box<dyn Strategy>,
}

impl Allocator {
    /// Compute weights for a window of prices.
    ///
    /// Prices in the other layout are rearranged into the type's layout
    /// before the strategy sees them. The input must span at least
    /// [`Self::min_observations`] time steps. The strategy's weights are
    /// returned as produced, after the type's [`OutputCheck`].
    ///
    /// # Errors
    ///
    /// - [`AllocationError::InvalidInput`] for too little history
    /// - [`AllocationError::Strategy`] for anything the strategy reports
    /// - [`AllocationError::InvalidOutput`] if the output check fails
    pub fn predict(&mut self, prices: &PriceMatrix) -> Result<Weights> {
        let expected = self.allocator_type.layout();
        let arranged;
        let prices = if prices.layout() == expected {
            prices
        } else {
            arranged = prices.to_layout(expected);
            &arranged
        };
        self.validate_input(prices)?;
        trace!(
            "allocator '{}' predicting on {} assets x {} steps",
            self.allocator_type.name(),
            prices.n_assets(),
            prices.time_steps()
        );
        let weights = self.strategy.predict(prices)?;
        self.allocator_type.output_check().validate(prices, &weights)?;
        Ok(weights)
    }

    fn validate_input(&self, prices: &PriceMatrix) -> Result<()> {
        let needed = self.min_observations();
        if prices.time_steps() < needed {
            return Err(AllocationError::InvalidInput(format!(
                "strategy '{}' needs at least {needed} observations, got {}",
                self.strategy.name(),
                prices.time_steps()
            )));
        }
        Ok(())
    }

    /// The resolved parameters the strategy was built with.
    #[must_use]
    pub const fn params(&self) -> &Params {
        &self.params
    }

    /// The type this instance was created from.
    #[must_use]
    pub const fn allocator_type(&self) -> &AllocatorType {
        &self.allocator_type
    }

    /// Name of the wrapped strategy.
    #[must_use]
    pub fn strategy_name(&self) -> &str {
        self.strategy.name()
    }

    /// Minimum number of time steps the wrapped strategy needs.
    #[must_use]
    pub fn min_observations(&self) -> usize {
        self.strategy.min_observations()
    }
}

impl fmt::Debug for Allocator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Allocator")
            .field("allocator_type", &self.allocator_type.name())
            .field("strategy", &self.strategy.name())
            .field("params", &self.params)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use allocation_traits::{ParamType, ParamValue, params};
    use approx::assert_relative_eq;
    use ndarray::{Array1, Array2, array};
    use std::sync::atomic::{AtomicUsize, Ordering};

    struct Constant {
        weights: Array1<f64>,
        min_observations: usize,
    }

    impl Strategy for Constant {
        fn name(&self) -> &str {
            "constant"
        }

        fn predict(
            &mut self,
            _prices: &PriceMatrix,
        ) -> std::result::Result<Weights, StrategyError> {
            Ok(Weights::Single(self.weights.clone()))
        }

        fn min_observations(&self) -> usize {
            self.min_observations
        }
    }

    impl FromParams for Constant {
        fn from_params(params: &Params) -> std::result::Result<Self, StrategyError> {
            let n = params.usize("n_assets")?;
            Ok(Self {
                weights: Array1::from_elem(n, 1.0 / n as f64),
                min_observations: params.usize("min_observations")?,
            })
        }
    }

    fn constant_type() -> AllocatorType {
        create_allocator_class::<Constant>(
            ParamSpec::new()
                .with_default("n_assets", ParamType::Int, 5)
                .with_default("min_observations", ParamType::Int, 1),
            Some("[n_assets, time_steps]"),
            Some("[n_assets]"),
        )
        .unwrap()
    }

    fn ones(n_assets: usize, time_steps: usize) -> PriceMatrix {
        PriceMatrix::assets_by_time(Array2::ones((n_assets, time_steps))).unwrap()
    }

    #[test]
    fn test_type_metadata() {
        let t = constant_type();
        assert_eq!(t.name(), "Constant");
        assert_eq!(t.input_shape_desc(), Some("[n_assets, time_steps]"));
        assert_eq!(t.output_shape_desc(), Some("[n_assets]"));
        assert_eq!(t.layout(), PriceLayout::AssetsByTime);
        assert_eq!(t.output_check(), OutputCheck::None);
        assert_eq!(t.param_spec().len(), 2);
    }

    #[test]
    fn test_describe() {
        let text = constant_type().describe();
        assert!(text.starts_with("Constant\n"));
        assert!(text.contains("input:  [n_assets, time_steps]"));
        assert!(text.contains("min_observations: int = 1"));
        assert!(text.contains("n_assets: int = 5"));
    }

    #[test]
    fn test_instantiate_with_defaults() {
        let allocator = constant_type().instantiate_default().unwrap();
        assert_eq!(allocator.params().get("n_assets"), Some(&ParamValue::Int(5)));
        assert_eq!(allocator.min_observations(), 1);
        assert_eq!(allocator.strategy_name(), "constant");
        assert_eq!(allocator.allocator_type().name(), "Constant");
    }

    #[test]
    fn test_predict_passes_weights_through() {
        let mut allocator = constant_type().instantiate(params! { "n_assets" => 4 }).unwrap();
        let weights = allocator.predict(&ones(4, 10)).unwrap();
        let w = weights.as_single().unwrap();
        assert_eq!(w.len(), 4);
        for x in w {
            assert_relative_eq!(*x, 0.25);
        }
    }

    #[test]
    fn test_other_layout_rearranged() {
        struct FirstStep;

        impl Strategy for FirstStep {
            fn name(&self) -> &str {
                "first_step"
            }

            fn predict(
                &mut self,
                prices: &PriceMatrix,
            ) -> std::result::Result<Weights, StrategyError> {
                if prices.layout() != PriceLayout::AssetsByTime {
                    return Err(StrategyError::msg("prices not rows-per-asset"));
                }
                Ok(Weights::Single(prices.values().column(0).to_owned()))
            }
        }

        let t = AllocatorType::from_constructor("first_step", ParamSpec::new(), |_params| {
            Ok(Box::new(FirstStep) as Box<dyn Strategy>)
        })
        .unwrap();
        let mut allocator = t.instantiate_default().unwrap();

        let prices = PriceMatrix::time_by_assets(array![[0.2, 0.3, 0.5], [9.0, 9.0, 9.0]]).unwrap();
        let weights = allocator.predict(&prices).unwrap();
        assert_eq!(weights, Weights::Single(array![0.2, 0.3, 0.5]));
    }

    #[test]
    fn test_min_observations_enforced() {
        let mut allocator = constant_type()
            .instantiate(params! { "min_observations" => 20 })
            .unwrap();
        assert!(matches!(
            allocator.predict(&ones(5, 19)),
            Err(AllocationError::InvalidInput(_))
        ));
        assert!(allocator.predict(&ones(5, 20)).is_ok());
    }

    #[test]
    fn test_output_check_applied() {
        let t = constant_type().with_output_check(OutputCheck::Shape);
        let mut allocator = t.instantiate(params! { "n_assets" => 3 }).unwrap();
        let err = allocator.predict(&ones(5, 10)).unwrap_err();
        assert!(matches!(err, AllocationError::InvalidOutput(_)));
    }

    #[test]
    fn test_strategy_constructor_error_propagates() {
        let err = constant_type()
            .instantiate(params! { "n_assets" => -2 })
            .unwrap_err();
        assert!(err.as_strategy().is_some());
        assert_eq!(err.to_string(), "parameter 'n_assets' must be non-negative, got -2");
    }

    #[test]
    fn test_unknown_parameter_skips_construction() {
        let calls = Arc::new(AtomicUsize::new(0));
        let counter = Arc::clone(&calls);
        let t = AllocatorType::from_constructor("counted", ParamSpec::new(), move |_params| {
            counter.fetch_add(1, Ordering::SeqCst);
            Ok(Box::new(Constant {
                weights: array![1.0],
                min_observations: 1,
            }) as Box<dyn Strategy>)
        })
        .unwrap();

        assert!(t.instantiate(params! { "foo" => 1 }).is_err());
        assert_eq!(calls.load(Ordering::SeqCst), 0);

        t.instantiate_default().unwrap();
        assert_eq!(calls.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn test_invalid_default_rejected_at_creation() {
        let result = create_allocator_class::<Constant>(
            ParamSpec::new().with_default("n_assets", ParamType::Int, "five"),
            None,
            None,
        );
        assert!(matches!(result, Err(AllocationError::InvalidDefault { .. })));
    }

    #[test]
    fn test_types_are_thread_safe() {
        fn assert_send_sync<T: Send + Sync>() {}
        fn assert_send<T: Send>() {}
        assert_send_sync::<AllocatorType>();
        assert_send::<Allocator>();
    }

    #[test]
    fn test_short_type_name() {
        assert_eq!(short_type_name::<Constant>(), "Constant");
        assert_eq!(short_type_name::<Vec<u8>>(), "Vec");
    }
}
