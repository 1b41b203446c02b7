//! CLI command implementations

pub mod output;
