//! CLI subcommand implementations.

pub mod charity;
pub mod financials;
pub mod regulators;
pub mod search;
pub mod trustees;
