//! Careerwire CLI library.
//!
//! Offline batch runner: reads a JSON array of posts, runs the extraction
//! pipeline in batches and writes `{metadata, results}` to a JSON file.

pub mod cli;
pub mod config;
pub mod error;
pub mod output;
pub mod runner;

pub use cli::Cli;
pub use config::Config;
pub use error::{CliError, Result};
pub use output::{Formatter, RunMetadata, RunOutput};
