//! Sanity check applied to generated output before it replaces a file.

use regex::Regex;

/// Rejects generated bodies that are obviously not a usable source file.
#[derive(Debug, Clone)]
pub(crate) struct OutputCheck {
    marker: Regex,
}

impl OutputCheck {
    pub(crate) const fn new(marker: Regex) -> Self {
        Self { marker }
    }

    /// Returns the rejection reason, or `None` when the output looks usable.
    pub(crate) fn inspect(&self, output: &str) -> Option<&'static str> {
        let trimmed = output.trim();

        if trimmed.is_empty() {
            return Some("generated output is empty");
        }

        if trimmed.starts_with("```") || trimmed.ends_with("```") {
            return Some("generated output is wrapped in a Markdown code fence");
        }

        if !self.marker.is_match(output) {
            return Some("generated output no longer contains the content marker");
        }

        None
    }
}
