//! Command-line argument definitions

use clap::Parser;

/// Command-line arguments for fetch-sparse
#[derive(Parser, Debug, Clone)]
#[command(name = "fetch-sparse")]
#[command(about = "A CLI tool for partial, pattern-filtered clones of Git repositories")]
#[command(long_about = None)]
#[command(version)]
pub struct Args {
    /// Repository URL, org/repo shorthand, or local path
    #[arg(long, value_name = "URL", requires = "dest")]
    pub url: Option<String>,

    /// Destination directory for the working tree
    #[arg(long, value_name = "PATH", requires = "url")]
    pub dest: Option<String>,

    /// Exclusion glob, e.g. '**/*.tar' (can be specified multiple times)
    #[arg(long = "exclude", value_name = "GLOB")]
    pub excludes: Vec<String>,

    /// Explicit ordered sparse-checkout pattern line (overrides --exclude)
    #[arg(long = "pattern", value_name = "LINE", conflicts_with = "excludes")]
    pub patterns: Vec<String>,

    /// Sparse-checkout mode: --cone or --cone=false (non-cone is the
    /// default; wildcard exclusions require it)
    #[arg(
        long,
        value_name = "BOOL",
        num_args = 0..=1,
        default_missing_value = "true",
        action = clap::ArgAction::Set
    )]
    pub cone: Option<bool>,

    /// Append patterns to an existing sparse rule set instead of replacing it
    #[arg(long)]
    pub append: bool,

    /// Configuration file path
    #[arg(long, value_name = "PATH", default_value = "./fetch-sparse.yaml")]
    pub config: String,

    /// Number of fetches to run concurrently
    #[arg(long, value_name = "N", default_value_t = 1)]
    pub jobs: usize,

    /// Preview operations without executing
    #[arg(long)]
    pub dry_run: bool,

    /// Enable verbose logging output
    #[arg(short, long)]
    pub verbose: bool,
}
