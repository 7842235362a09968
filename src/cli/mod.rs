//! Command-line front end over the dashboard pipeline.

pub mod args;
pub mod commands;
pub mod output;

pub use args::{Cli, Commands, OutputFormat};
pub use commands::{execute, run};
