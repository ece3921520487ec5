//! Configuration validation logic

use crate::config::{Config, FetchSpec};
use crate::error::FetchError;
use anyhow::Result;
use regex::Regex;
use tracing::warn;

/// Validate a complete configuration
///
/// # Errors
///
/// Returns an error if:
/// - The configuration does not contain at least one fetch operation
/// - A repository URL has an unrecognized format
/// - A pattern or exclusion glob is invalid
/// - Cone mode is combined with rules it cannot express
#[inline]
pub fn validate_config(config: &Config) -> Result<()> {
    if config.fetches.is_empty() {
        return Err(FetchError::config(
            "Configuration must contain at least one fetch operation",
        )
        .into());
    }

    for (index, fetch) in config.fetches.iter().enumerate() {
        validate_fetch_spec(config, fetch, index)?;
    }

    Ok(())
}

/// Validate a single fetch specification
fn validate_fetch_spec(config: &Config, fetch: &FetchSpec, index: usize) -> Result<()> {
    let context = format!("Fetch operation #{}", index + 1);

    validate_repository_url(&fetch.url)
        .map_err(|e| FetchError::config(format!("{context}: {e}")))?;

    if fetch.dest.trim().is_empty() {
        return Err(FetchError::config(format!(
            "{context}: Destination path cannot be empty"
        ))
        .into());
    }

    // Compiling the rule set surfaces bad globs before any git runs
    let patterns = fetch
        .pattern_set(config)
        .map_err(|e| FetchError::config(format!("{context}: {e}")))?;

    if effective_cone(fetch, config) {
        if patterns.has_negation() {
            return Err(FetchError::config(format!(
                "{context}: Cone mode cannot express negated patterns; \
                drop the exclusions or disable cone mode"
            ))
            .into());
        }
        if fetch.patterns.is_none() {
            return Err(FetchError::config(format!(
                "{context}: Cone mode requires explicit directory patterns"
            ))
            .into());
        }
    }

    if patterns.negation_precedes_include() {
        warn!(
            "{context}: a negation precedes the first include; it will never take effect"
        );
    }

    Ok(())
}

/// The sparse-checkout mode a fetch runs under, after defaults
#[must_use]
pub fn effective_cone(fetch: &FetchSpec, config: &Config) -> bool {
    fetch.cone.or(config.cone).unwrap_or(false)
}

/// Validate a repository URL format
///
/// # Errors
///
/// Returns an error if:
/// - The repository URL is invalid
#[inline]
pub fn validate_repository_url(url: &str) -> Result<()> {
    // Local filesystem sources; detailed validation happens in Repository::new()
    if url.starts_with("file:")
        || url.starts_with('/')
        || url.starts_with("./")
        || url.starts_with("../")
        || url.starts_with('~')
    {
        return Ok(());
    }

    // Patterns for valid remote repository URLs
    let patterns = [
        r"^https?://\S+$",        // HTTPS: https://github.com/user/repo(.git)
        r"^git@\S+$",             // SSH: git@github.com:user/repo.git
        r"^[\w.-]+/[\w.-]+$",     // Short: user/repo
    ];

    for pattern in &patterns {
        let regex = Regex::new(pattern)?;
        if regex.is_match(url) {
            return Ok(());
        }
    }

    Err(FetchError::config(format!(
        "Invalid repository URL format: '{url}'\n\
        Supported formats:\n\
        - Short format: my_organization/repo\n\
        - HTTPS: https://github.com/my_organization/repo.git\n\
        - SSH: git@github.com:my_organization/repo.git\n\
        - Local: file:/path/to/repo or /path/to/repo"
    ))
    .into())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn fetch(url: &str, dest: &str) -> FetchSpec {
        FetchSpec {
            url: url.to_owned(),
            dest: dest.to_owned(),
            excludes: Vec::new(),
            patterns: None,
            cone: None,
            append: false,
        }
    }

    fn config_with(fetches: Vec<FetchSpec>) -> Config {
        Config {
            excludes: Vec::new(),
            cone: None,
            fetches,
        }
    }

    #[test]
    fn accepts_common_url_formats() {
        assert!(validate_repository_url("openitools/openitools-ipcc").is_ok());
        assert!(
            validate_repository_url("https://github.com/openitools/openitools-ipcc.git").is_ok()
        );
        assert!(validate_repository_url("git@github.com:openitools/openitools-ipcc.git").is_ok());
        assert!(validate_repository_url("file:///srv/mirror").is_ok());
        assert!(validate_repository_url("./mirror").is_ok());
    }

    #[test]
    fn rejects_unrecognized_urls() {
        assert!(validate_repository_url("not a url").is_err());
        assert!(validate_repository_url("").is_err());
    }

    #[test]
    fn empty_fetch_list_is_invalid() {
        let err = validate_config(&config_with(Vec::new())).unwrap_err();
        assert!(err.to_string().contains("at least one fetch"));
    }

    #[test]
    fn empty_dest_is_invalid() {
        let config = config_with(vec![fetch("openitools/openitools-ipcc", "  ")]);
        assert!(validate_config(&config).is_err());
    }

    #[test]
    fn bad_glob_is_invalid() {
        let mut spec = fetch("openitools/openitools-ipcc", "./ipcc");
        spec.excludes = vec!["[a-".to_owned()];
        assert!(validate_config(&config_with(vec![spec])).is_err());
    }

    #[test]
    fn cone_mode_rejects_negations() {
        let mut spec = fetch("openitools/openitools-ipcc", "./ipcc");
        spec.cone = Some(true);
        spec.excludes = vec!["**/*.tar".to_owned()];
        let err = validate_config(&config_with(vec![spec])).unwrap_err();
        assert!(err.to_string().contains("Cone mode"));
    }

    #[test]
    fn cone_mode_requires_explicit_patterns() {
        let mut spec = fetch("openitools/openitools-ipcc", "./ipcc");
        spec.cone = Some(true);
        let err = validate_config(&config_with(vec![spec])).unwrap_err();
        assert!(err.to_string().contains("explicit directory patterns"));
    }

    #[test]
    fn cone_mode_with_directory_patterns_is_valid() {
        let mut spec = fetch("openitools/openitools-ipcc", "./ipcc");
        spec.cone = Some(true);
        spec.patterns = Some(vec!["docs".to_owned(), "src".to_owned()]);
        validate_config(&config_with(vec![spec])).unwrap();
    }
}
