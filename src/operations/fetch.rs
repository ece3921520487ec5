//! Fetch operation coordination

use crate::cli::Args;
use crate::config::{Config, FetchSpec};
use crate::error::FetchError;
use crate::git::{FetchReport, Repository, SparseFetch, check_git_availability};
use crate::system::System;
use crate::utils::path::resolve_user_path;
use anyhow::{Context as _, Result};
use indicatif::ProgressBar;
use std::path::Path;
use std::sync::Mutex;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Duration;
use tracing::{debug, info};

/// Coordinates the complete fetch run
#[non_exhaustive]
pub struct FetchOperation<'src> {
    config: Config,
    dry_run: bool,
    jobs: usize,
    progress: bool,
    system: &'src dyn System,
}

impl<'src> FetchOperation<'src> {
    /// Create a new fetch run from CLI arguments
    ///
    /// # Errors
    ///
    /// Returns an error if:
    /// - Neither `--url`/`--dest` nor a configuration file is provided
    /// - The configuration file cannot be loaded or parsed
    /// - The configuration is invalid
    /// - Git availability check fails
    #[inline]
    pub fn new(args: Args, system: &'src dyn System) -> Result<Self> {
        let config = if args.url.is_some() {
            build_config_from_args(&args)?
        } else if !args.config.ends_with("fetch-sparse.yaml") || Path::new(&args.config).exists() {
            // Explicitly named config files must exist; load_config reports
            // the missing-file case
            let mut config = Config::load_from_file(system, &args.config)?;
            merge_cli_defaults(&mut config, &args);
            config.validate()?;
            config
        } else {
            return Err(FetchError::config(
                "No fetch specified. Provide --url and --dest, or create a fetch-sparse.yaml file",
            )
            .into());
        };

        if !args.dry_run {
            check_git_availability().context("Git validation failed")?;
        }

        Ok(FetchOperation {
            config,
            dry_run: args.dry_run,
            jobs: args.jobs.max(1),
            progress: !args.verbose,
            system,
        })
    }

    /// Execute the fetch run
    ///
    /// # Errors
    ///
    /// Returns an error if any fetch pipeline fails; the error names the
    /// failing operation and step.
    #[inline]
    pub fn execute(&self) -> Result<()> {
        if self.dry_run {
            return self.preview_operations();
        }

        info!("Starting fetch-sparse...");

        let reports = if self.jobs > 1 && self.config.fetches.len() > 1 {
            self.execute_concurrent()?
        } else {
            self.execute_sequential()?
        };

        let total_files: usize = reports.iter().map(|report| report.files_materialized).sum();
        info!("\n\u{2713} Completed {} fetch operation(s)", reports.len());
        info!("  Files materialized: {}", total_files);

        Ok(())
    }

    /// Run every fetch in order, one at a time
    fn execute_sequential(&self) -> Result<Vec<FetchReport>> {
        let mut reports = Vec::with_capacity(self.config.fetches.len());

        for (index, fetch) in self.config.fetches.iter().enumerate() {
            info!("\n=> Fetch operation #{}", index + 1);

            let spinner = self.progress.then(|| {
                let pb = ProgressBar::new_spinner();
                pb.set_message(format!("Fetching {}", fetch.url));
                pb.enable_steady_tick(Duration::from_millis(120));
                pb
            });

            let result = self.run_single(fetch);

            if let Some(pb) = spinner {
                pb.finish_and_clear();
            }

            let report =
                result.with_context(|| format!("Fetch operation #{} failed", index + 1))?;
            report_fetch(fetch, &report);
            reports.push(report);
        }

        Ok(reports)
    }

    /// Run independent fetches concurrently on scoped worker threads
    ///
    /// Each repository's own pipeline still runs strictly in order; only
    /// distinct repositories overlap.
    fn execute_concurrent(&self) -> Result<Vec<FetchReport>> {
        let next = AtomicUsize::new(0);
        let results: Mutex<Vec<(usize, Result<FetchReport>)>> = Mutex::new(Vec::new());
        let worker_count = self.jobs.min(self.config.fetches.len());

        debug!("Running {} fetches on {} workers", self.config.fetches.len(), worker_count);

        std::thread::scope(|scope| {
            for _ in 0..worker_count {
                scope.spawn(|| {
                    loop {
                        let index = next.fetch_add(1, Ordering::SeqCst);
                        let Some(fetch) = self.config.fetches.get(index) else {
                            break;
                        };
                        info!("=> Fetch operation #{}", index + 1);
                        let result = self.run_single(fetch);
                        if let Ok(mut guard) = results.lock() {
                            guard.push((index, result));
                        }
                    }
                });
            }
        });

        let mut collected = results
            .into_inner()
            .map_err(|e| anyhow::anyhow!("Fetch worker panicked: {e}"))?;
        collected.sort_by_key(|&(index, _)| index);

        let mut reports = Vec::with_capacity(collected.len());
        for (index, result) in collected {
            let report =
                result.with_context(|| format!("Fetch operation #{} failed", index + 1))?;
            report_fetch(&self.config.fetches[index], &report);
            reports.push(report);
        }

        Ok(reports)
    }

    /// Run the pipeline for one fetch
    fn run_single(&self, fetch: &FetchSpec) -> Result<FetchReport> {
        let repository = Repository::new(self.system, &fetch.url)
            .context("Failed to resolve repository source")?;
        let dest = resolve_user_path(self.system, &fetch.dest)?;
        let patterns = fetch.pattern_set(&self.config)?;
        let cone = fetch.cone_mode(&self.config);

        debug!(
            "Fetching {} into {:?} (cone: {}, append: {})",
            repository.original_url(),
            dest,
            cone,
            fetch.append
        );

        SparseFetch::new(repository, dest, patterns, cone, fetch.append).execute()
    }

    /// Preview operations without executing them
    fn preview_operations(&self) -> Result<()> {
        info!("Dry run preview - no repositories will be touched:");
        info!("");
        info!("Planned operations:");

        for (index, fetch) in self.config.fetches.iter().enumerate() {
            let patterns = fetch.pattern_set(&self.config)?;
            let mode = if fetch.cone_mode(&self.config) {
                "cone"
            } else {
                "non-cone"
            };

            info!(
                "  [{}] Fetch {} \u{2192} {} ({} mode)",
                index + 1,
                fetch.url,
                fetch.dest,
                mode
            );
            info!("      - Clone: partial (blob-filtered), no checkout");

            for line in patterns.lines() {
                info!("      - Rule: {}", line);
            }

            if fetch.append {
                info!("      - Would append to existing sparse rules");
            }
        }

        info!("");
        info!("Run without --dry-run to execute these operations.");

        Ok(())
    }
}

/// Log the outcome of one completed fetch
fn report_fetch(fetch: &FetchSpec, report: &FetchReport) {
    let reused = if report.reused_repository {
        ", reused existing repository"
    } else {
        ""
    };
    info!(
        "  \u{2713} {} \u{2192} {} ({} files{})",
        fetch.url,
        report.dest.display(),
        report.files_materialized,
        reused
    );
}

/// Build a configuration from `--url`/`--dest` style arguments
///
/// # Errors
///
/// Returns an error if the resulting configuration is invalid.
#[inline]
pub fn build_config_from_args(args: &Args) -> Result<Config> {
    let url = args.url.clone().ok_or_else(|| {
        FetchError::config("--url is required when no configuration file is used")
    })?;
    let dest = args.dest.clone().ok_or_else(|| {
        FetchError::config("--dest is required when no configuration file is used")
    })?;

    let config = Config {
        excludes: Vec::new(),
        cone: None,
        fetches: vec![FetchSpec {
            url,
            dest,
            excludes: args.excludes.clone(),
            patterns: (!args.patterns.is_empty()).then(|| args.patterns.clone()),
            cone: args.cone,
            append: args.append,
        }],
    };

    config.validate()?;
    Ok(config)
}

/// Apply CLI defaults on top of a loaded configuration file
fn merge_cli_defaults(config: &mut Config, args: &Args) {
    if !args.excludes.is_empty() {
        config.excludes = args.excludes.clone();
    }
    if let Some(cone) = args.cone {
        config.cone = Some(cone);
    }
}
