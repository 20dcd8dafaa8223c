//! CLI command implementations.

pub mod check_seed;
pub mod serve;
