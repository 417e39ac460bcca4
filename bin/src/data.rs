//! Input loading utilities for the allocation CLI.

use std::fs;
use std::path::Path;

use allocation_strategies::{StrategyInfo, available_strategies, get_strategy_info};
use allocation_traits::{ParamMap, ParamValue, PriceMatrix};
use anyhow::{Context, Result, anyhow, bail};
use log::debug;
use polars::prelude::*;

/// Find a built-in strategy by name.
pub(crate) fn lookup_strategy(name: &str) -> Result<StrategyInfo> {
    get_strategy_info(name).ok_or_else(|| {
        let known: Vec<_> = available_strategies().iter().map(|s| s.name).collect();
        anyhow!("Unknown strategy '{name}' (available: {})", known.join(", "))
    })
}

/// Price table read from disk.
#[derive(Debug)]
pub(crate) struct PriceTable {
    /// Column headers, one per asset
    pub(crate) assets: Vec<String>,
    /// Prices with rows as time steps
    pub(crate) prices: PriceMatrix,
}

/// Load a CSV price table: a header row of asset names, then one row per
/// time step.
pub(crate) fn load_prices(path: &Path) -> Result<PriceTable> {
    let df = CsvReadOptions::default()
        .with_has_header(true)
        .try_into_reader_with_file_path(Some(path.to_path_buf()))?
        .finish()
        .with_context(|| format!("Failed to read prices from {}", path.display()))?;

    debug!("loaded {} rows x {} columns from {}", df.height(), df.width(), path.display());

    let assets = df
        .get_column_names()
        .into_iter()
        .map(|name| name.to_string())
        .collect();
    let prices = PriceMatrix::from_dataframe(&df)?;
    Ok(PriceTable { assets, prices })
}

/// Parse a `key=value` parameter.
///
/// The value is read as a JSON scalar when it is one (`10`, `0.5`, `true`,
/// `null`, `"text"`) and kept as a plain string otherwise. Either way the
/// allocator coerces it to the declared type afterwards.
pub(crate) fn parse_param(raw: &str) -> Result<(String, ParamValue)> {
    let (key, value) = raw
        .split_once('=')
        .ok_or_else(|| anyhow!("Invalid parameter '{raw}': expected key=value"))?;
    let key = key.trim();
    if key.is_empty() {
        bail!("Invalid parameter '{raw}': empty key");
    }
    let value = value.trim();
    let value = serde_json::from_str::<ParamValue>(value)
        .unwrap_or_else(|_| ParamValue::Str(value.to_string()));
    Ok((key.to_string(), value))
}

/// Read a JSON object of parameters.
pub(crate) fn load_params_file(path: &Path) -> Result<ParamMap> {
    let text = fs::read_to_string(path)
        .with_context(|| format!("Failed to read parameters from {}", path.display()))?;
    serde_json::from_str(&text)
        .with_context(|| format!("{} is not a JSON object of scalar parameters", path.display()))
}

/// Combine parameters from a file with command-line overrides.
///
/// Command-line values win; anything left unset falls back to the
/// strategy's declared defaults when the allocator is instantiated.
pub(crate) fn merge_params(file: Option<ParamMap>, overrides: &[String]) -> Result<ParamMap> {
    let mut merged = file.unwrap_or_default();
    for raw in overrides {
        let (key, value) = parse_param(raw)?;
        merged.insert(key, value);
    }
    Ok(merged)
}
