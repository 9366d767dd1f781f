//! Command-line interface module.

mod args;
pub mod clean;
pub mod package;
pub mod serve;
pub mod zip;

pub use args::{BuildArgs, Cli, Commands};
