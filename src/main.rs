//! # fetch-sparse
//!
//! `fetch-sparse` clones a Git repository without its heavyweight files.
//! It performs a partial, blob-filtered clone with no checkout, writes
//! non-cone sparse-checkout rules (include everything, then negate the
//! exclusion globs), and materializes the filtered tree from HEAD.
//!
//! ## Usage
//!
//! **Basic example:**
//! ```sh
//! fetch-sparse --url https://github.com/openitools/openitools-ipcc.git \
//!     --dest ./openitools-ipcc --exclude '**/*.tar'
//! ```
//!
//! **With config:**
//! ```sh
//! fetch-sparse --config fetch-sparse.yaml
//! ```
//!
//! See `fetch-sparse --help` for more options and details.

use anyhow::Result;
use clap::Parser as _;
use fetch_sparse::cli::Args;
use fetch_sparse::error::FetchError;
use tracing::error;
use tracing_subscriber::{EnvFilter, fmt};

fn main() -> Result<()> {
    let args = Args::parse();

    // Initialize tracing subscriber based on verbose flag
    let log_level = if args.verbose { "debug" } else { "info" };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(log_level));

    fmt().with_target(false).with_env_filter(filter).init();

    match fetch_sparse::run(args) {
        Ok(()) => std::process::exit(0),
        Err(err) => {
            // "{:#}" keeps the failing step and git's own message visible
            error!("{:#}", err);
            std::process::exit(
                err.downcast_ref::<FetchError>()
                    .map_or(2, FetchError::exit_code),
            );
        }
    }
}
