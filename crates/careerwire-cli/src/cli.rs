//! CLI argument parsing.

use clap::Parser;
use std::path::PathBuf;

/// Default input file
pub const DEFAULT_INPUT_FILE: &str = "data/sample_data.json";

/// Directory for auto-named output files
pub const DEFAULT_OUTPUT_DIR: &str = "results";

/// Careerwire - extract career changes from scraped LinkedIn posts.
#[derive(Debug, Parser)]
#[command(name = "careerwire")]
#[command(version, about, long_about = None)]
#[command(after_help = "Examples:
    careerwire
    careerwire --input data/custom_data.json
    careerwire --output results/my_output.json --batch-size 10
    careerwire -i data/test.json -o results/test_output.json -b 3")]
pub struct Cli {
    /// Input JSON file path
    #[arg(short, long, default_value = DEFAULT_INPUT_FILE)]
    pub input: PathBuf,

    /// Output JSON file path (default: auto-generated in results/)
    #[arg(short, long)]
    pub output: Option<PathBuf>,

    /// Number of items to process concurrently (default: 5)
    #[arg(short, long, value_parser = clap::value_parser!(u64).range(1..))]
    pub batch_size: Option<u64>,

    /// Enable verbose logging
    #[arg(short, long)]
    pub verbose: bool,

    /// Configuration file path
    #[arg(short, long, env = "CAREERWIRE_CONFIG")]
    pub config: Option<PathBuf>,

    /// Disable colored output
    #[arg(long)]
    pub no_color: bool,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let cli = Cli::try_parse_from(["careerwire"]).unwrap();
        assert_eq!(cli.input, PathBuf::from(DEFAULT_INPUT_FILE));
        assert!(cli.output.is_none());
        assert!(cli.batch_size.is_none());
        assert!(!cli.verbose);
    }

    #[test]
    fn test_short_flags() {
        let cli = Cli::try_parse_from([
            "careerwire", "-i", "in.json", "-o", "out.json", "-b", "3", "-v",
        ])
        .unwrap();
        assert_eq!(cli.input, PathBuf::from("in.json"));
        assert_eq!(cli.output, Some(PathBuf::from("out.json")));
        assert_eq!(cli.batch_size, Some(3));
        assert!(cli.verbose);
    }

    #[test]
    fn test_zero_batch_size_rejected() {
        assert!(Cli::try_parse_from(["careerwire", "--batch-size", "0"]).is_err());
    }
}
