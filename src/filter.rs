//! File selection rules for the directory scanner.
//!
//! A file is selected iff its extension is accepted, its name passes the
//! name pattern, and its content matches the content marker. Directories
//! are pruned when hidden, when they are a dependency cache, or when they
//! match one of the configured exclusion globs.

use crate::error::{Error, Result};
use globset::{Glob, GlobSet, GlobSetBuilder};
use regex::Regex;
use std::path::Path;

/// Default content marker: a property documentation decorator call.
pub const DEFAULT_CONTENT_MARKER: &str = r"@ApiProperty\s*\(";

/// Filename substrings accepted when no custom pattern is given.
pub const DEFAULT_NAME_SUBSTRINGS: [&str; 2] = ["request.ts", "dto.ts"];

/// Source extensions accepted by default.
pub const DEFAULT_EXTENSIONS: [&str; 2] = ["ts", "js"];

/// Directory names that are never descended into.
const DEPENDENCY_DIRECTORIES: [&str; 1] = ["node_modules"];

/// User-facing filter settings, compiled into a [`ScanFilter`] before a scan.
#[derive(Debug, Clone)]
pub struct ScanFilterConfig {
    name_pattern: Option<String>,
    content_marker: String,
    extensions: Vec<String>,
    exclude_directories: Vec<String>,
}

impl Default for ScanFilterConfig {
    fn default() -> Self {
        Self {
            name_pattern: None,
            content_marker: DEFAULT_CONTENT_MARKER.to_string(),
            extensions: DEFAULT_EXTENSIONS.iter().map(ToString::to_string).collect(),
            exclude_directories: Vec::new(),
        }
    }
}

impl ScanFilterConfig {
    /// Creates the default configuration.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets a custom case-insensitive filename substring.
    ///
    /// Blank patterns fall back to the default substrings.
    #[must_use]
    pub fn name_pattern(mut self, pattern: Option<String>) -> Self {
        self.name_pattern = pattern
            .map(|p| p.trim().to_string())
            .filter(|p| !p.is_empty());
        self
    }

    /// Sets the regular expression file content must match.
    #[must_use]
    pub fn content_marker(mut self, marker: impl Into<String>) -> Self {
        self.content_marker = marker.into();
        self
    }

    /// Replaces the accepted extension list (without leading dots).
    #[must_use]
    pub fn extensions(mut self, extensions: Vec<String>) -> Self {
        self.extensions = extensions
            .into_iter()
            .map(|e| e.trim_start_matches('.').to_string())
            .collect();
        self
    }

    /// Adds glob patterns for directories that must not be descended into.
    #[must_use]
    pub fn exclude_directories(mut self, patterns: Vec<String>) -> Self {
        self.exclude_directories = patterns;
        self
    }

    /// Returns the custom filename pattern, if any.
    #[must_use]
    pub fn custom_name_pattern(&self) -> Option<&str> {
        self.name_pattern.as_deref()
    }

    /// Returns the content marker expression.
    #[must_use]
    pub fn marker(&self) -> &str {
        &self.content_marker
    }

    /// Returns a one-line description of the filename rule.
    #[must_use]
    pub fn describe_name_rule(&self) -> String {
        match &self.name_pattern {
            Some(pattern) => format!("Files containing '{pattern}' in filename"),
            None => format!(
                "Files must contain '{}' or '{}' in filename",
                DEFAULT_NAME_SUBSTRINGS[0], DEFAULT_NAME_SUBSTRINGS[1]
            ),
        }
    }
}

/// Case-insensitive filename rule.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) enum NamePattern {
    /// Name must contain one of the default substrings
    Default,
    /// Name must contain this (lower-cased) substring
    Custom(String),
}

impl NamePattern {
    pub(crate) fn matches(&self, file_name: &str) -> bool {
        let lower = file_name.to_lowercase();
        match self {
            Self::Default => DEFAULT_NAME_SUBSTRINGS.iter().any(|s| lower.contains(s)),
            Self::Custom(pattern) => lower.contains(pattern.as_str()),
        }
    }
}

/// Compiled filter used by the scanner.
#[derive(Debug, Clone)]
pub(crate) struct ScanFilter {
    name_pattern: NamePattern,
    content_marker: Regex,
    extensions: Vec<String>,
    exclude_directories: GlobSet,
}

impl ScanFilter {
    /// Compiles the marker regex and exclusion globs.
    ///
    /// # Errors
    ///
    /// Returns an error if the marker or any glob is invalid.
    pub(crate) fn new(config: &ScanFilterConfig) -> Result<Self> {
        let content_marker = Regex::new(&config.content_marker)
            .map_err(|e| Error::invalid_pattern(&config.content_marker, e.to_string()))?;

        let name_pattern = config
            .name_pattern
            .as_ref()
            .map_or(NamePattern::Default, |p| NamePattern::Custom(p.to_lowercase()));

        Ok(Self {
            name_pattern,
            content_marker,
            extensions: config.extensions.clone(),
            exclude_directories: Self::build_globset(&config.exclude_directories)?,
        })
    }

    fn build_globset(patterns: &[String]) -> Result<GlobSet> {
        let mut builder = GlobSetBuilder::new();

        for pattern in patterns {
            let glob =
                Glob::new(pattern).map_err(|e| Error::invalid_pattern(pattern, e.to_string()))?;
            builder.add(glob);
        }

        builder
            .build()
            .map_err(|e| Error::config(format!("Failed to build glob set: {e}")))
    }

    /// Returns true if the walk may enter this directory.
    pub(crate) fn should_descend(&self, dir: &Path) -> bool {
        let Some(name) = dir.file_name().and_then(|n| n.to_str()) else {
            return true;
        };

        if name.starts_with('.') || DEPENDENCY_DIRECTORIES.contains(&name) {
            return false;
        }

        !self.exclude_directories.is_match(dir)
    }

    /// Cheap checks that do not need the file content.
    pub(crate) fn accepts_path(&self, path: &Path) -> bool {
        if !crate::file::has_accepted_extension(path, &self.extensions) {
            return false;
        }

        path.file_name()
            .and_then(|n| n.to_str())
            .is_some_and(|name| self.name_pattern.matches(name))
    }

    /// Content check, applied after the file has been read.
    pub(crate) fn accepts_content(&self, content: &str) -> bool {
        self.content_marker.is_match(content)
    }

    /// Returns the compiled content marker.
    pub(crate) fn marker(&self) -> &Regex {
        &self.content_marker
    }
}
