//! CLI command implementations.

pub mod config;
pub mod observe;
pub mod probe;
pub mod run;
