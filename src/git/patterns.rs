//! Sparse-checkout pattern sets
//!
//! Non-cone sparse-checkout rules follow gitignore semantics: ordered lines,
//! later matches override earlier ones, `!` negates. The evaluator here
//! mirrors those semantics with `globset` so previews and tests can reason
//! about a rule set without cloning anything. Git itself remains the
//! authority at materialization time; both sides agree on the cases this
//! tool produces.

use crate::error::FetchError;
use anyhow::Result;
use globset::{GlobBuilder, GlobSet, GlobSetBuilder};

/// An ordered set of non-cone sparse-checkout rules
#[derive(Debug)]
pub struct SparsePatternSet {
    rules: Vec<PatternRule>,
}

/// A single rule line plus its compiled matcher
#[derive(Debug)]
struct PatternRule {
    line: String,
    negated: bool,
    matcher: GlobSet,
}

impl SparsePatternSet {
    /// Parse an ordered sequence of raw pattern lines
    ///
    /// # Errors
    ///
    /// Returns an error if:
    /// - A line is empty or whitespace-only
    /// - A line is not a valid glob
    pub fn parse<S: AsRef<str>>(lines: &[S]) -> Result<Self> {
        let mut rules = Vec::with_capacity(lines.len());

        for line in lines {
            let line = line.as_ref().trim();
            if line.is_empty() {
                return Err(FetchError::config("Sparse pattern lines cannot be empty").into());
            }

            let (negated, body) = match line.strip_prefix('!') {
                Some(rest) => (true, rest),
                None => (false, line),
            };

            if body.trim().is_empty() {
                return Err(FetchError::config(format!(
                    "Sparse pattern '{line}' has no glob after the negation"
                ))
                .into());
            }

            rules.push(PatternRule {
                line: line.to_owned(),
                negated,
                matcher: build_matcher(body)?,
            });
        }

        Ok(Self { rules })
    }

    /// Build a rule set from exclusion globs
    ///
    /// Emits the broad `/*` include first, then one negated line per glob,
    /// so the negations take effect under last-match-wins ordering.
    ///
    /// # Errors
    ///
    /// Returns an error if a glob is empty or invalid.
    pub fn from_excludes<S: AsRef<str>>(excludes: &[S]) -> Result<Self> {
        let mut lines = vec!["/*".to_owned()];
        for glob in excludes {
            lines.push(format!("!{}", glob.as_ref()));
        }
        Self::parse(&lines)
    }

    /// The raw pattern lines, in order, as handed to git
    #[must_use]
    #[inline]
    pub fn lines(&self) -> Vec<&str> {
        self.rules.iter().map(|rule| rule.line.as_str()).collect()
    }

    /// Whether any rule is a negation
    ///
    /// Cone mode cannot express negated rules; callers use this to reject
    /// the combination up front.
    #[must_use]
    #[inline]
    pub fn has_negation(&self) -> bool {
        self.rules.iter().any(|rule| rule.negated)
    }

    /// Whether a negation appears before the first include
    ///
    /// Such a negation never takes effect (there is nothing to subtract
    /// from yet), which almost always signals a mis-ordered rule set.
    #[must_use]
    pub fn negation_precedes_include(&self) -> bool {
        self.rules.first().is_some_and(|rule| rule.negated)
    }

    /// Evaluate a repository-relative path (with `/` separators) against
    /// the rule set
    ///
    /// Returns true when the path would be present in the materialized
    /// working tree. The last matching rule decides; a path no rule matches
    /// is excluded.
    #[must_use]
    pub fn is_included(&self, path: &str) -> bool {
        let path = path.trim_start_matches("./");
        let mut included = false;

        for rule in &self.rules {
            if rule.matcher.is_match(path) {
                included = !rule.negated;
            }
        }

        included
    }
}

/// Compile one pattern body into a matcher
///
/// Mirrors the gitignore rules git applies to non-cone sparse patterns:
/// a leading `/` anchors to the repository root; a pattern without `/`
/// matches at any depth; a pattern matching a directory also matches
/// everything beneath it.
fn build_matcher(body: &str) -> Result<GlobSet> {
    let anchored = body.starts_with('/');
    let mut glob_body = body
        .strip_prefix('/')
        .unwrap_or(body)
        .trim_end_matches('/')
        .to_owned();

    if !anchored && !glob_body.contains('/') {
        glob_body = format!("**/{glob_body}");
    }

    let mut builder = GlobSetBuilder::new();
    for glob in [glob_body.clone(), format!("{glob_body}/**")] {
        let compiled = GlobBuilder::new(&glob)
            .literal_separator(true)
            .build()
            .map_err(|e| FetchError::config(format!("Invalid sparse pattern '{body}': {e}")))?;
        builder.add(compiled);
    }

    builder
        .build()
        .map_err(|e| FetchError::config(format!("Invalid sparse pattern '{body}': {e}")))
        .map_err(Into::into)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn set(lines: &[&str]) -> SparsePatternSet {
        SparsePatternSet::parse(lines).unwrap()
    }

    #[test]
    fn include_all_excludes_tars_at_any_depth() {
        let patterns = set(&["/*", "!**/*.tar"]);

        assert!(patterns.is_included("README.md"));
        assert!(patterns.is_included("data/notes.txt"));
        assert!(!patterns.is_included("archive.tar"));
        assert!(!patterns.is_included("data/big.tar"));
        assert!(!patterns.is_included("a/b/c/deep.tar"));
    }

    #[test]
    fn fixed_depth_variant_only_matches_two_levels() {
        let patterns = set(&["/*", "!/*/*/*.tar"]);

        assert!(!patterns.is_included("a/b/file.tar"));
        assert!(patterns.is_included("file.tar"));
        assert!(patterns.is_included("a/file.tar"));
        assert!(patterns.is_included("a/b/c/file.tar"));
    }

    #[test]
    fn order_matters_include_after_negation_wins() {
        let patterns = set(&["!**/*.tar", "/*"]);

        // The trailing broad include overrides the negation for every path.
        assert!(patterns.is_included("archive.tar"));
        assert!(patterns.is_included("data/big.tar"));
        assert!(patterns.is_included("README.md"));
    }

    #[test]
    fn unmatched_paths_are_excluded() {
        let patterns = set(&["/docs"]);

        assert!(patterns.is_included("docs"));
        assert!(patterns.is_included("docs/guide.md"));
        assert!(!patterns.is_included("src/main.rs"));
    }

    #[test]
    fn bare_glob_matches_at_any_depth() {
        let patterns = set(&["/*", "!*.tar"]);

        assert!(!patterns.is_included("archive.tar"));
        assert!(!patterns.is_included("data/big.tar"));
        assert!(patterns.is_included("tarball.txt"));
    }

    #[test]
    fn from_excludes_places_include_first() {
        let patterns = SparsePatternSet::from_excludes(&["**/*.tar", "**/*.zip"]).unwrap();

        assert_eq!(patterns.lines(), vec!["/*", "!**/*.tar", "!**/*.zip"]);
        assert!(patterns.has_negation());
        assert!(!patterns.negation_precedes_include());
        assert!(patterns.is_included("README.md"));
        assert!(!patterns.is_included("a/b.zip"));
    }

    #[test]
    fn leading_negation_is_flagged() {
        let patterns = set(&["!**/*.tar", "/*"]);
        assert!(patterns.negation_precedes_include());
    }

    #[test]
    fn rejects_empty_and_invalid_lines() {
        assert!(SparsePatternSet::parse(&[""]).is_err());
        assert!(SparsePatternSet::parse(&["!"]).is_err());
        assert!(SparsePatternSet::parse(&["/*", "![a-"]).is_err());
    }
}
