use crate::{
    config::Config,
    error::{Error, Result},
    file::FileRecord,
    filter::ScanFilter,
    generate::{GeminiClient, Generator},
    guard::OutputCheck,
    recipe::Recipe,
    writer,
};
use serde::Serialize;
use std::path::{Path, PathBuf};
use std::time::{Duration, Instant};
use tracing::{debug, info, instrument, warn};

/// Result of transforming a single file.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TransformationOutcome {
    /// Path of the processed file
    pub file_path: PathBuf,

    /// Whether the file was overwritten with generated content
    pub success: bool,

    /// Failure message, if any
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl TransformationOutcome {
    fn succeeded(file_path: PathBuf) -> Self {
        Self {
            file_path,
            success: true,
            error: None,
        }
    }

    fn failed(file_path: PathBuf, error: &Error) -> Self {
        Self {
            file_path,
            success: false,
            error: Some(error.to_string()),
        }
    }
}

/// Aggregate counts derived from a batch of outcomes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct BatchSummary {
    /// Files overwritten successfully
    pub succeeded: usize,

    /// Files that failed
    pub failed: usize,

    /// Wall-clock time of the batch
    pub duration: Duration,
}

impl BatchSummary {
    /// Counts successes and failures in `outcomes`.
    #[must_use]
    pub fn from_outcomes(outcomes: &[TransformationOutcome], duration: Duration) -> Self {
        let succeeded = outcomes.iter().filter(|o| o.success).count();

        Self {
            succeeded,
            failed: outcomes.len() - succeeded,
            duration,
        }
    }

    /// Total number of processed files.
    #[must_use]
    pub const fn total(&self) -> usize {
        self.succeeded + self.failed
    }

    /// Prints a human-readable summary to stdout.
    pub fn print_summary(&self) {
        println!("\n╔═══════════════════════════════════════════════════════╗");
        println!("║              Batch Transformation Summary             ║");
        println!("╠═══════════════════════════════════════════════════════╣");
        println!(
            "║ Files Processed:      {:>8}                        ║",
            self.total()
        );
        println!(
            "║   - Succeeded:        {:>8}                        ║",
            self.succeeded
        );
        println!(
            "║   - Failed:           {:>8}                        ║",
            self.failed
        );
        println!(
            "║ Total Time:           {:>8.2}s                       ║",
            self.duration.as_secs_f64()
        );
        println!("╚═══════════════════════════════════════════════════════╝\n");
    }
}

/// Sequential driver that rewrites each file through a [`Generator`].
pub struct Pipeline<G> {
    generator: G,
    recipe: Recipe,
    output_check: Option<OutputCheck>,
}

impl Pipeline<GeminiClient> {
    /// Creates a pipeline backed by the Gemini API.
    ///
    /// This is where the credential is checked: nothing has been read or
    /// written yet when it fails.
    ///
    /// # Errors
    ///
    /// Returns an error if:
    /// - No API key is configured ([`Error::MissingCredential`])
    /// - The recipe templates fail to compile
    pub fn from_config(config: &Config) -> Result<Self> {
        let client = GeminiClient::from_config(config)?;
        info!("Generating with {}", client.model());
        Self::with_generator(config, client)
    }
}

impl<G: Generator> Pipeline<G> {
    /// Creates a pipeline using an arbitrary generator.
    ///
    /// # Errors
    ///
    /// Returns an error if the recipe templates or the content marker fail
    /// to compile.
    pub fn with_generator(config: &Config, generator: G) -> Result<Self> {
        let recipe = Recipe::new(config.recipe)?;

        let output_check = if config.check_output {
            let filter = ScanFilter::new(&config.scan_filter)?;
            Some(OutputCheck::new(filter.marker().clone()))
        } else {
            None
        };

        Ok(Self {
            generator,
            recipe,
            output_check,
        })
    }

    /// Transforms every file in order and returns one outcome per file.
    ///
    /// # Process
    ///
    /// For each file, strictly one after another:
    /// 1. **Build**: Renders the recipe instruction from name and content
    /// 2. **Generate**: Calls the generator and waits for the new body
    /// 3. **Write**: Overwrites the original file with the returned text
    ///
    /// A failure in any step is recorded for that file and the batch moves
    /// on. Outcomes are returned in input order.
    ///
    /// # Examples
    ///
    /// ```no_run
    /// use dto_hardener::{BatchSummary, Config, Pipeline, Scanner};
    /// use std::time::Instant;
    ///
    /// # fn main() -> anyhow::Result<()> {
    /// let config = Config::builder().root_dir("./src").build()?;
    /// let files = Scanner::new(&config)?.scan();
    ///
    /// let start = Instant::now();
    /// let outcomes = Pipeline::from_config(&config)?.run(&files);
    /// BatchSummary::from_outcomes(&outcomes, start.elapsed()).print_summary();
    /// # Ok(())
    /// # }
    /// ```
    #[instrument(skip_all, fields(files = files.len(), recipe = %self.recipe.kind()))]
    pub fn run(&self, files: &[FileRecord]) -> Vec<TransformationOutcome> {
        info!("Starting batch transformation");

        let total = files.len();
        let mut outcomes = Vec::with_capacity(total);
        let mut succeeded = 0;

        for (index, file) in files.iter().enumerate() {
            println!("Processing {}/{}: {}", index + 1, total, file.path.display());

            let started = Instant::now();
            let outcome = match self.transform(file) {
                Ok(reason) => {
                    succeeded += 1;
                    println!("{}", success_line(&file.path, succeeded, total));
                    if let Some(reason) = reason {
                        println!("     {reason}");
                    }
                    debug!(
                        "Transformed {} in {:.2}s",
                        file.path.display(),
                        started.elapsed().as_secs_f64()
                    );
                    TransformationOutcome::succeeded(file.path.clone())
                }
                Err(e) => {
                    println!("  ❌ Error processing {}: {e}", file.path.display());
                    warn!("Failed to transform {}: {e}", file.path.display());
                    TransformationOutcome::failed(file.path.clone(), &e)
                }
            };
            outcomes.push(outcome);
        }

        println!("\nModified {succeeded} of {total} file(s)");
        info!("✓ Batch finished: {succeeded} succeeded, {} failed", total - succeeded);

        outcomes
    }

    /// Runs build, generate, check and write for one file.
    fn transform(&self, file: &FileRecord) -> Result<Option<String>> {
        let instruction = self
            .recipe
            .build_instruction(&file.file_name(), &file.content)?;

        debug!(
            "Sending {} ({} instruction chars)",
            file.path.display(),
            instruction.char_count()
        );

        let generation = self.generator.generate(&instruction)?;

        if let Some(check) = &self.output_check {
            if let Some(reason) = check.inspect(&generation.text) {
                return Err(Error::rejected_output(&file.path, reason));
            }
        }

        writer::overwrite(&file.path, &generation.text)?;

        Ok(generation.reason)
    }
}

/// Progress line printed after each successful file, with the running tally.
fn success_line(path: &Path, succeeded: usize, total: usize) -> String {
    format!(
        "  ✅ Modified {} ({succeeded}/{total} succeeded so far)",
        path.display()
    )
}
