//! CLI subcommand modules.
//!
//! This module contains the implementations for all allocation CLI subcommands.

pub(crate) mod describe;
pub(crate) mod predict;
pub(crate) mod strategies;
