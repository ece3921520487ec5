//! Configuration management module
//!
//! Handles YAML configuration parsing, JSON schema validation, and merging
//! with command-line overrides

pub mod schema;
pub mod validation;
pub mod yaml;

use crate::config::validation::effective_cone;
use crate::git::patterns::SparsePatternSet;
use crate::system::System;
use anyhow::Result;
use serde::{Deserialize, Serialize};

/// Main configuration structure
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    /// Default exclusion globs inherited by every fetch
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub excludes: Vec<String>,

    /// Default sparse-checkout mode
    #[serde(skip_serializing_if = "Option::is_none")]
    pub cone: Option<bool>,

    /// List of fetch operations
    pub fetches: Vec<FetchSpec>,
}

/// A single fetch: one repository, one destination, one rule set
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FetchSpec {
    pub url: String,
    pub dest: String,

    /// Exclusion globs for this fetch; replaces the file-level defaults
    /// when non-empty
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub excludes: Vec<String>,

    /// Explicit ordered pattern lines; overrides exclusion globs entirely
    #[serde(skip_serializing_if = "Option::is_none")]
    pub patterns: Option<Vec<String>>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub cone: Option<bool>,

    /// Append to an existing sparse rule set instead of replacing it
    #[serde(default)]
    pub append: bool,
}

impl Config {
    /// Load configuration from file
    pub fn load_from_file(system: &dyn System, path: &str) -> Result<Self> {
        yaml::load_config(system, path)
    }

    /// Validate configuration logic after parsing
    pub fn validate(&self) -> Result<()> {
        validation::validate_config(self)
    }
}

impl FetchSpec {
    /// The sparse-checkout mode this fetch runs under
    #[must_use]
    pub fn cone_mode(&self, config: &Config) -> bool {
        effective_cone(self, config)
    }

    /// Build the ordered rule set for this fetch
    ///
    /// Explicit `patterns` win; otherwise the rule set is derived from the
    /// fetch's exclusion globs, falling back to the file-level defaults.
    ///
    /// # Errors
    ///
    /// Returns an error if any pattern or glob is invalid.
    pub fn pattern_set(&self, config: &Config) -> Result<SparsePatternSet> {
        if let Some(lines) = self.patterns.as_ref() {
            return SparsePatternSet::parse(lines);
        }

        let excludes = if self.excludes.is_empty() {
            &config.excludes
        } else {
            &self.excludes
        };
        SparsePatternSet::from_excludes(excludes)
    }
}
