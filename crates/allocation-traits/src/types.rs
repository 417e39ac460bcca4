//! Price and weight containers exchanged between allocators and strategies.
//!
//! A [`PriceMatrix`] is the 2-D input window; [`Weights`] is the strategy's
//! answer, either one allocation or a batch of them.

use ndarray::{Array1, Array2, ArrayD, ArrayView1, Axis};
use polars::prelude::*;
use serde::{Deserialize, Serialize};

use crate::error::{AllocationError, Result};

/// Axis order of a [`PriceMatrix`].
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PriceLayout {
    /// Rows are assets, columns are time steps: `[n_assets, time_steps]`.
    #[default]
    AssetsByTime,
    /// Rows are time steps, columns are assets: `[time_steps, n_assets]`.
    TimeByAssets,
}

impl PriceLayout {
    /// Conventional shape description for this layout.
    #[must_use]
    pub const fn shape_desc(&self) -> &'static str {
        match self {
            Self::AssetsByTime => "[n_assets, time_steps]",
            Self::TimeByAssets => "[time_steps, n_assets]",
        }
    }

    const fn asset_axis(self) -> Axis {
        match self {
            Self::AssetsByTime => Axis(0),
            Self::TimeByAssets => Axis(1),
        }
    }
}

/// A window of historical prices.
///
/// The matrix is never empty. Which axis holds assets is recorded in its
/// [`PriceLayout`]; strategies that care should read [`Self::n_assets`] and
/// [`Self::asset_series`] instead of indexing raw axes.
///
/// # Example
///
/// ```
/// use allocation_traits::PriceMatrix;
/// use ndarray::Array2;
///
/// let prices = PriceMatrix::assets_by_time(Array2::ones((5, 100))).unwrap();
/// assert_eq!(prices.n_assets(), 5);
/// assert_eq!(prices.time_steps(), 100);
/// ```
#[derive(Debug, Clone, PartialEq)]
pub struct PriceMatrix {
    values: Array2<f64>,
    layout: PriceLayout,
}

impl PriceMatrix {
    /// Wrap a 2-D array with an explicit layout.
    ///
    /// # Errors
    ///
    /// Returns [`AllocationError::InvalidInput`] if either dimension is zero.
    pub fn new(values: Array2<f64>, layout: PriceLayout) -> Result<Self> {
        if values.is_empty() {
            return Err(AllocationError::InvalidInput(format!(
                "price matrix must be non-empty, got shape {:?}",
                values.shape()
            )));
        }
        Ok(Self { values, layout })
    }

    /// Wrap a `[n_assets, time_steps]` array.
    pub fn assets_by_time(values: Array2<f64>) -> Result<Self> {
        Self::new(values, PriceLayout::AssetsByTime)
    }

    /// Wrap a `[time_steps, n_assets]` array.
    pub fn time_by_assets(values: Array2<f64>) -> Result<Self> {
        Self::new(values, PriceLayout::TimeByAssets)
    }

    /// Build an `[n_assets, time_steps]` matrix from row-major data.
    pub fn from_shape_vec(n_assets: usize, time_steps: usize, data: Vec<f64>) -> Result<Self> {
        let values = Array2::from_shape_vec((n_assets, time_steps), data)
            .map_err(|e| AllocationError::InvalidInput(format!("bad price data: {e}")))?;
        Self::assets_by_time(values)
    }

    /// Build a `[time_steps, n_assets]` matrix from a DataFrame with one
    /// numeric column per asset and one row per time step.
    ///
    /// # Errors
    ///
    /// Fails if the frame is empty, a column is not castable to `f64`, or a
    /// value is missing.
    pub fn from_dataframe(df: &DataFrame) -> Result<Self> {
        let (time_steps, n_assets) = (df.height(), df.width());
        if time_steps == 0 || n_assets == 0 {
            return Err(AllocationError::InvalidInput(format!(
                "price table must be non-empty, got {time_steps} rows and {n_assets} columns"
            )));
        }

        let mut values = Array2::zeros((time_steps, n_assets));
        for (j, column) in df.get_columns().iter().enumerate() {
            let series = column.as_materialized_series().cast(&DataType::Float64)?;
            for (i, value) in series.f64()?.into_iter().enumerate() {
                values[[i, j]] = value.ok_or_else(|| {
                    AllocationError::InvalidInput(format!(
                        "column '{}' has a missing value at row {i}",
                        column.name()
                    ))
                })?;
            }
        }

        Self::time_by_assets(values)
    }

    /// The layout of the underlying array.
    #[must_use]
    pub const fn layout(&self) -> PriceLayout {
        self.layout
    }

    /// Borrow the raw array.
    #[must_use]
    pub const fn values(&self) -> &Array2<f64> {
        &self.values
    }

    /// Consume and return the raw array.
    #[must_use]
    pub fn into_inner(self) -> Array2<f64> {
        self.values
    }

    /// Raw array shape.
    #[must_use]
    pub fn shape(&self) -> (usize, usize) {
        self.values.dim()
    }

    /// Number of assets.
    #[must_use]
    pub fn n_assets(&self) -> usize {
        self.values.len_of(self.layout.asset_axis())
    }

    /// Number of time steps.
    #[must_use]
    pub fn time_steps(&self) -> usize {
        self.values.len() / self.n_assets()
    }

    /// Price history of one asset, oldest first.
    #[must_use]
    pub fn asset_series(&self, asset: usize) -> Option<ArrayView1<'_, f64>> {
        let axis = self.layout.asset_axis();
        (asset < self.values.len_of(axis)).then(|| self.values.index_axis(axis, asset))
    }

    /// Return a copy arranged in the requested layout.
    #[must_use]
    pub fn to_layout(&self, layout: PriceLayout) -> Self {
        if layout == self.layout {
            return self.clone();
        }
        Self {
            values: self.values.t().to_owned(),
            layout,
        }
    }
}

/// Allocation weights produced by a strategy.
///
/// `Single` holds one weight per asset. `Batch` holds one allocation per row
/// (for strategies that emit a weight path), with assets along columns.
#[derive(Debug, Clone, PartialEq)]
pub enum Weights {
    /// A single allocation.
    Single(Array1<f64>),
    /// A batch of allocations, one per row.
    Batch(Array2<f64>),
}

impl Weights {
    /// Number of assets each allocation covers.
    #[must_use]
    pub fn n_assets(&self) -> usize {
        match self {
            Self::Single(w) => w.len(),
            Self::Batch(w) => w.ncols(),
        }
    }

    /// Number of allocations (1 for `Single`).
    #[must_use]
    pub fn n_allocations(&self) -> usize {
        match self {
            Self::Single(_) => 1,
            Self::Batch(w) => w.nrows(),
        }
    }

    /// Sum of weights for each allocation.
    #[must_use]
    pub fn allocation_sums(&self) -> Vec<f64> {
        match self {
            Self::Single(w) => vec![w.sum()],
            Self::Batch(w) => w.sum_axis(Axis(1)).to_vec(),
        }
    }

    /// Whether every weight is finite.
    #[must_use]
    pub fn is_finite(&self) -> bool {
        match self {
            Self::Single(w) => w.iter().all(|x| x.is_finite()),
            Self::Batch(w) => w.iter().all(|x| x.is_finite()),
        }
    }

    /// Borrow as a single allocation.
    #[must_use]
    pub const fn as_single(&self) -> Option<&Array1<f64>> {
        match self {
            Self::Single(w) => Some(w),
            Self::Batch(_) => None,
        }
    }

    /// Borrow as a batch.
    #[must_use]
    pub const fn as_batch(&self) -> Option<&Array2<f64>> {
        match self {
            Self::Single(_) => None,
            Self::Batch(w) => Some(w),
        }
    }

    /// Allocations as plain nested vectors, one inner vector per allocation.
    #[must_use]
    pub fn to_rows(&self) -> Vec<Vec<f64>> {
        match self {
            Self::Single(w) => vec![w.to_vec()],
            Self::Batch(w) => w.rows().into_iter().map(|row| row.to_vec()).collect(),
        }
    }

    /// Convert to a dynamically shaped array.
    #[must_use]
    pub fn into_dyn(self) -> ArrayD<f64> {
        match self {
            Self::Single(w) => w.into_dyn(),
            Self::Batch(w) => w.into_dyn(),
        }
    }
}

impl From<Array1<f64>> for Weights {
    fn from(w: Array1<f64>) -> Self {
        Self::Single(w)
    }
}

impl From<Array2<f64>> for Weights {
    fn from(w: Array2<f64>) -> Self {
        Self::Batch(w)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;
    use ndarray::array;

    #[test]
    fn test_empty_matrix_rejected() {
        let result = PriceMatrix::assets_by_time(Array2::zeros((0, 10)));
        assert!(matches!(result, Err(AllocationError::InvalidInput(_))));

        let result = PriceMatrix::assets_by_time(Array2::zeros((3, 0)));
        assert!(result.is_err());
    }

    #[test]
    fn test_layout_dimensions() {
        let values = Array2::ones((5, 100));

        let a = PriceMatrix::assets_by_time(values.clone()).unwrap();
        assert_eq!((a.n_assets(), a.time_steps()), (5, 100));

        let t = PriceMatrix::time_by_assets(values).unwrap();
        assert_eq!((t.n_assets(), t.time_steps()), (100, 5));
    }

    #[test]
    fn test_asset_series() {
        let values = array![[1.0, 2.0, 3.0], [10.0, 20.0, 30.0]];

        let a = PriceMatrix::assets_by_time(values.clone()).unwrap();
        assert_eq!(a.asset_series(1).unwrap().to_vec(), vec![10.0, 20.0, 30.0]);
        assert!(a.asset_series(2).is_none());

        let t = PriceMatrix::time_by_assets(values).unwrap();
        assert_eq!(t.asset_series(2).unwrap().to_vec(), vec![3.0, 30.0]);
    }

    #[test]
    fn test_to_layout_transposes() {
        let a = PriceMatrix::from_shape_vec(2, 3, vec![1.0, 2.0, 3.0, 4.0, 5.0, 6.0]).unwrap();
        let t = a.to_layout(PriceLayout::TimeByAssets);

        assert_eq!(t.shape(), (3, 2));
        assert_eq!(t.n_assets(), 2);
        assert_eq!(t.asset_series(0), a.asset_series(0));
        assert_eq!(t.to_layout(PriceLayout::AssetsByTime), a);
    }

    #[test]
    fn test_from_dataframe() {
        let df = df! {
            "SPY" => &[100.0, 101.0, 102.0],
            "TLT" => &[90.0, 89.5, 91.0],
        }
        .unwrap();

        let prices = PriceMatrix::from_dataframe(&df).unwrap();
        assert_eq!(prices.layout(), PriceLayout::TimeByAssets);
        assert_eq!(prices.n_assets(), 2);
        assert_eq!(prices.time_steps(), 3);
        assert_relative_eq!(prices.asset_series(1).unwrap()[1], 89.5);
    }

    #[test]
    fn test_from_dataframe_integer_columns() {
        let df = df! { "A" => &[1i64, 2, 3] }.unwrap();
        let prices = PriceMatrix::from_dataframe(&df).unwrap();
        assert_relative_eq!(prices.values()[[2, 0]], 3.0);
    }

    #[test]
    fn test_from_dataframe_missing_value() {
        let df = df! { "A" => &[Some(1.0), None, Some(3.0)] }.unwrap();
        let result = PriceMatrix::from_dataframe(&df);
        assert!(matches!(result, Err(AllocationError::InvalidInput(_))));
    }

    #[test]
    fn test_weights_single() {
        let w = Weights::from(array![0.2, 0.3, 0.5]);
        assert_eq!(w.n_assets(), 3);
        assert_eq!(w.n_allocations(), 1);
        assert_relative_eq!(w.allocation_sums()[0], 1.0);
        assert!(w.is_finite());
        assert!(w.as_batch().is_none());
    }

    #[test]
    fn test_weights_batch() {
        let w = Weights::from(array![[0.5, 0.5], [0.25, 0.75], [1.0, 0.0]]);
        assert_eq!(w.n_assets(), 2);
        assert_eq!(w.n_allocations(), 3);
        assert_eq!(w.to_rows()[1], vec![0.25, 0.75]);
        for sum in w.allocation_sums() {
            assert_relative_eq!(sum, 1.0);
        }
        assert_eq!(w.into_dyn().shape(), &[3, 2]);
    }

    #[test]
    fn test_weights_non_finite() {
        let w = Weights::from(array![0.5, f64::NAN]);
        assert!(!w.is_finite());
    }
}
