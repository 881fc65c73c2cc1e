//! Command-line interface module.

mod args;
pub mod dev;
pub mod prod;
pub mod serve;

pub use args::{Cli, Commands, DEFAULT_CONFIG};
