//! Strategy listing command implementation.

use allocation_strategies::{StrategyInfo, available_strategies};
use anyhow::Result;
use serde_json::{Map, Value, json};

/// List the built-in strategies.
pub(crate) fn list_strategies(verbose: bool, json: bool) -> Result<()> {
    let strategies = available_strategies();
    if json {
        println!("{}", strategies_json(&strategies, verbose)?);
        return Ok(());
    }

    println!("Available strategies:");
    println!("{}", "-".repeat(60));

    for info in &strategies {
        println!("  {:20} - {}", info.name, info.description);
        if verbose {
            let allocator_type = info.allocator_type()?;
            for (name, param) in allocator_type.param_spec().iter() {
                println!("      {name}: {param}");
            }
        }
    }
    println!();

    if !verbose {
        println!("Use --verbose to show parameters.\n");
    }

    Ok(())
}

/// Render the registry as JSON; `verbose` adds each strategy's declarations.
fn strategies_json(strategies: &[StrategyInfo], verbose: bool) -> Result<String> {
    if !verbose {
        return Ok(serde_json::to_string_pretty(strategies)?);
    }
    let entries = strategies
        .iter()
        .map(|info| {
            let allocator_type = info.allocator_type()?;
            let params: Map<String, Value> = allocator_type
                .param_spec()
                .iter()
                .map(|(name, param)| Ok((name.to_string(), serde_json::to_value(param)?)))
                .collect::<Result<_>>()?;
            Ok(json!({
                "name": info.name,
                "description": info.description,
                "parameters": params,
            }))
        })
        .collect::<Result<Vec<_>>>()?;
    Ok(serde_json::to_string_pretty(&entries)?)
}
