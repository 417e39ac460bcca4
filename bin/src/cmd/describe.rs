//! Allocator description command implementation.

use anyhow::Result;

use crate::data::lookup_strategy;

/// Print the help text of a strategy's allocator type.
pub(crate) fn describe_strategy(strategy: &str) -> Result<()> {
    let info = lookup_strategy(strategy)?;
    println!("{}", info.description);
    println!();
    print!("{}", info.allocator_type()?.describe());
    Ok(())
}
