//! Console scan report and machine-readable batch report.

use crate::{
    cost::CostEstimate,
    error::{Error, Result},
    file::FileRecord,
    model::ModelId,
    pipeline::{BatchSummary, TransformationOutcome},
    recipe::RecipeKind,
};
use chrono::{DateTime, Utc};
use serde::Serialize;
use std::{fs, path::Path, path::PathBuf};
use tracing::info;

const SAMPLE_FILES: usize = 5;
const PREVIEW_CHARS: usize = 20;

/// Prints the scan totals, the cost estimate and a few sample files.
pub fn print_scan_report(files: &[FileRecord], estimate: &CostEstimate, model: ModelId, root: &Path) {
    let total_chars = crate::file::total_chars(files);
    let pricing = model.pricing();

    println!("\n📊 Found {} file(s) to process", files.len());
    println!("   Total characters:  {total_chars}");
    println!("\n💰 Cost estimate for {model}:");
    println!(
        "   Input tokens:  {:>10}  (${:.2}/1M)  ${:.4}",
        estimate.input_tokens, pricing.input_per_million, estimate.input_cost
    );
    println!(
        "   Output tokens: {:>10}  (${:.2}/1M)  ${:.4}",
        estimate.output_tokens, pricing.output_per_million, estimate.output_cost
    );
    println!(
        "   Total tokens:  {:>10}               ${:.4}",
        estimate.total_tokens, estimate.total_cost
    );

    if files.is_empty() {
        return;
    }

    println!("\n📄 Sample files:");
    for file in files.iter().take(SAMPLE_FILES) {
        println!("   {}", sample_line(file, root));
    }
    if files.len() > SAMPLE_FILES {
        println!("   ... and {} more", files.len() - SAMPLE_FILES);
    }
    println!();
}

/// One sample entry: relative path, size, and the start of the content.
fn sample_line(file: &FileRecord, root: &Path) -> String {
    let ellipsis = if file.content.chars().count() > PREVIEW_CHARS {
        "..."
    } else {
        ""
    };

    format!(
        "{} ({} chars, {} lines): {}{ellipsis}",
        file.display_path(root),
        file.size,
        file.line_count(),
        file.preview(PREVIEW_CHARS)
    )
}

/// Serializable record of one batch run.
#[derive(Debug, Clone, Serialize)]
pub struct BatchReport {
    /// Report creation time
    pub generated_at: DateTime<Utc>,
    /// Scanned root directory
    pub root_dir: PathBuf,
    /// Model used for generation
    pub model: ModelId,
    /// Recipe used to build instructions
    pub recipe: RecipeKind,
    /// Pre-run cost estimate
    pub estimate: CostEstimate,
    /// Number of files overwritten
    pub succeeded: usize,
    /// Number of files that failed
    pub failed: usize,
    /// Batch duration in seconds
    pub duration_secs: f64,
    /// Per-file outcomes in processing order
    pub outcomes: Vec<TransformationOutcome>,
}

impl BatchReport {
    /// Builds a report from a finished batch.
    #[must_use]
    pub fn new(
        root_dir: impl Into<PathBuf>,
        model: ModelId,
        recipe: RecipeKind,
        estimate: CostEstimate,
        outcomes: Vec<TransformationOutcome>,
        summary: &BatchSummary,
    ) -> Self {
        Self {
            generated_at: Utc::now(),
            root_dir: root_dir.into(),
            model,
            recipe,
            estimate,
            succeeded: summary.succeeded,
            failed: summary.failed,
            duration_secs: summary.duration.as_secs_f64(),
            outcomes,
        }
    }

    /// Writes the report as pretty-printed JSON.
    ///
    /// # Errors
    ///
    /// Returns an error if serialization or the write fails.
    pub fn write_json(&self, path: &Path) -> Result<()> {
        let json = serde_json::to_string_pretty(self)?;
        fs::write(path, json).map_err(|e| Error::io(path, e))?;

        info!("✓ Wrote batch report to {}", path.display());
        Ok(())
    }
}
