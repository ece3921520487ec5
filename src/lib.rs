//! fetch-sparse - A CLI tool for partial, pattern-filtered clones of Git
//! repositories
//!
//! This library wraps git's partial-clone and sparse-checkout machinery to
//! produce a working tree of a remote repository while excluding files that
//! match glob patterns (the canonical case: large `*.tar` archives). The
//! pipeline is strictly ordered: clone with a blob filter and no checkout,
//! configure the sparse-checkout mode, write the ordered rule set, then
//! materialize the tree from HEAD.

pub mod cli;
pub mod config;
pub mod error;
pub mod git;
pub mod operations;
pub mod system;
pub mod utils;

use anyhow::Result;
use cli::Args;
use operations::fetch::FetchOperation;
use system::RealSystem;

/// Main entry point for the fetch-sparse library
pub fn run(args: Args) -> Result<()> {
    let system = RealSystem;
    let fetch_operation = FetchOperation::new(args, &system)?;
    fetch_operation.execute()
}
