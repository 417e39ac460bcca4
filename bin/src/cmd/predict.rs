//! Prediction command implementation.

use std::path::Path;

use allocation_factory::OutputCheck;
use allocation_traits::{PriceLayout, Weights};
use anyhow::Result;
use log::{info, warn};
use serde_json::json;

use crate::data::{PriceTable, load_params_file, load_prices, lookup_strategy, merge_params};

/// Options for a single prediction run.
#[derive(Debug)]
pub(crate) struct PredictOptions<'a> {
    pub(crate) strategy: &'a str,
    pub(crate) prices: &'a Path,
    pub(crate) params: &'a [String],
    pub(crate) params_file: Option<&'a Path>,
    pub(crate) layout: PriceLayout,
    pub(crate) check: OutputCheck,
    pub(crate) json: bool,
}

/// Build the allocator, run it on the price table and print the weights.
pub(crate) fn run_prediction(opts: &PredictOptions<'_>) -> Result<()> {
    let info = lookup_strategy(opts.strategy)?;
    let allocator_type = info
        .allocator_type()?
        .with_layout(opts.layout)
        .with_input_shape_desc(opts.layout.shape_desc())
        .with_output_check(opts.check);

    let file_params = opts.params_file.map(load_params_file).transpose()?;
    let params = merge_params(file_params, opts.params)?;
    let mut allocator = allocator_type.instantiate(params)?;

    let PriceTable { assets, prices } = load_prices(opts.prices)?;
    let prices = prices.to_layout(opts.layout);
    info!(
        "running {} on {} assets x {} time steps",
        allocator_type.name(),
        prices.n_assets(),
        prices.time_steps()
    );

    let weights = allocator.predict(&prices)?;
    let assets = weight_labels(assets, weights.n_assets());

    if opts.json {
        print_json(opts.strategy, &assets, &weights)?;
    } else {
        print_text(&assets, &weights);
    }
    Ok(())
}

/// Labels for the weight columns. Falls back to positional names when the
/// strategy returned a different number of weights than there are assets.
fn weight_labels(assets: Vec<String>, n_weights: usize) -> Vec<String> {
    if assets.len() == n_weights {
        return assets;
    }
    warn!(
        "strategy returned {n_weights} weights for {} assets; labelling by position",
        assets.len()
    );
    (0..n_weights).map(|i| format!("#{i}")).collect()
}

fn print_text(assets: &[String], weights: &Weights) {
    let rows = weights.to_rows();
    for (i, row) in rows.iter().enumerate() {
        if rows.len() > 1 {
            println!("Allocation {i}:");
        }
        for (asset, w) in assets.iter().zip(row) {
            println!("  {asset:12} {w:>10.6}");
        }
        println!("  {:12} {:>10.6}", "total", row.iter().sum::<f64>());
    }
}

fn print_json(strategy: &str, assets: &[String], weights: &Weights) -> Result<()> {
    let weights = match weights {
        Weights::Single(w) => json!(w.to_vec()),
        Weights::Batch(_) => json!(weights.to_rows()),
    };
    let output = json!({
        "strategy": strategy,
        "assets": assets,
        "weights": weights,
    });
    println!("{}", serde_json::to_string_pretty(&output)?);
    Ok(())
}
