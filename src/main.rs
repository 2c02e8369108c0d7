use anyhow::Context;
use clap::Parser;
use dto_hardener::{
    BatchSummary, Config, ModelId, Pipeline, RecipeKind, Scanner, report, total_chars,
};
use std::path::PathBuf;
use std::process::ExitCode;
use std::time::Instant;
use tracing_subscriber::{EnvFilter, fmt, prelude::*};

mod interactive;

#[derive(Parser, Debug)]
#[command(
    name = "dto-hardener",
    version,
    author,
    about = "Harden validation decorators on TypeScript DTOs with an LLM",
    long_about = "Harden validation decorators on TypeScript request/DTO classes.\n\n\
    This tool scans a directory for .ts/.js files whose name contains `request.ts` or \
    `dto.ts` and whose content uses @ApiProperty, estimates the cost of rewriting them, \
    and then sends each file to a Gemini model and overwrites it in place with the result.\n\n\
    USAGE EXAMPLES:\n  \
      # Scan a project and answer the prompts\n  \
      dto-hardener ./src\n\n  \
      # Only files containing 'create', with the pro model\n  \
      dto-hardener ./src --pattern create --model gemini-2.5-pro\n\n  \
      # Unattended run with a JSON report\n  \
      dto-hardener ./src --no-interactive --yes --report hardening.json"
)]
struct Cli {
    /// Root directory to scan for DTO files
    #[arg(value_name = "DIR")]
    dir: PathBuf,

    /// Case-insensitive filename substring replacing the default filter
    #[arg(short, long, value_name = "TEXT")]
    pattern: Option<String>,

    /// Generation model
    #[arg(short, long, value_enum)]
    model: Option<CliModel>,

    /// Prompt recipe used to build each instruction
    #[arg(short, long, value_enum)]
    recipe: Option<CliRecipe>,

    /// Skip the confirmation prompt
    #[arg(short, long)]
    yes: bool,

    /// Never prompt; use defaults for anything not given
    #[arg(long)]
    no_interactive: bool,

    /// Reject generated output that is empty, fenced, or lost its @ApiProperty marker
    #[arg(long)]
    check_output: bool,

    /// Write a JSON report of the batch to this file
    #[arg(long, value_name = "FILE")]
    report: Option<PathBuf>,

    /// Characters per token used for the cost estimate
    #[arg(long, default_value_t = dto_hardener::DEFAULT_CHARS_PER_TOKEN)]
    chars_per_token: usize,

    /// Extra directory glob to skip (can be used multiple times)
    ///
    /// Example: dto-hardener ./src --exclude "**/generated" --exclude "**/legacy"
    #[arg(long, value_name = "GLOB")]
    exclude: Vec<String>,

    /// Gemini API key
    #[arg(
        long,
        env = "GOOGLE_GENERATIVE_AI_API_KEY",
        hide_env_values = true,
        value_name = "KEY"
    )]
    api_key: Option<String>,

    /// Verbose output
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,
}

#[derive(Debug, Clone, Copy, clap::ValueEnum)]
enum CliModel {
    /// Fast and inexpensive
    #[value(name = "gemini-2.5-flash")]
    Gemini25Flash,
    /// Higher quality, higher price
    #[value(name = "gemini-2.5-pro")]
    Gemini25Pro,
}

impl From<CliModel> for ModelId {
    fn from(m: CliModel) -> Self {
        match m {
            CliModel::Gemini25Flash => Self::Gemini25Flash,
            CliModel::Gemini25Pro => Self::Gemini25Pro,
        }
    }
}

#[derive(Debug, Clone, Copy, clap::ValueEnum)]
enum CliRecipe {
    /// Strict rules with secure patterns and examples
    Security,
    /// Prefer in-house composite validation decorators
    CustomDecorators,
    /// Single prompt focused on token and ID injection
    Incident,
    /// Compact prompt with field-name heuristics
    Concise,
}

impl From<CliRecipe> for RecipeKind {
    fn from(r: CliRecipe) -> Self {
        match r {
            CliRecipe::Security => Self::Security,
            CliRecipe::CustomDecorators => Self::CustomDecorators,
            CliRecipe::Incident => Self::Incident,
            CliRecipe::Concise => Self::Concise,
        }
    }
}

fn main() -> ExitCode {
    let cli = match Cli::try_parse() {
        Ok(cli) => cli,
        Err(e) => {
            let _ = e.print();
            return if e.use_stderr() {
                ExitCode::FAILURE
            } else {
                ExitCode::SUCCESS
            };
        }
    };

    if let Err(e) = setup_tracing(cli.verbose) {
        eprintln!("Error: {e:#}");
        return ExitCode::FAILURE;
    }

    match run(cli) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("❌ Error: {e:#}");
            ExitCode::FAILURE
        }
    }
}

fn run(cli: Cli) -> anyhow::Result<()> {
    let interactive = !cli.no_interactive;

    // Options not given on the command line are asked for
    let name_pattern = match cli.pattern {
        Some(pattern) => Some(pattern),
        None if interactive => interactive::ask_name_pattern()?,
        None => None,
    };

    let model = match cli.model {
        Some(model) => model.into(),
        None if interactive => interactive::select_model()?,
        None => ModelId::default(),
    };

    let recipe = match cli.recipe {
        Some(recipe) => recipe.into(),
        None if interactive => interactive::select_recipe()?,
        None => RecipeKind::default(),
    };

    let config = Config::builder()
        .root_dir(cli.dir)
        .name_pattern(name_pattern)
        .exclude_directories(cli.exclude)
        .model(model)
        .recipe(recipe)
        .chars_per_token(cli.chars_per_token)
        .api_key(cli.api_key)
        .check_output(cli.check_output)
        .build()
        .context("Failed to build configuration")?;

    println!(
        "🔍 Scanning {} for {}",
        config.root_dir.display(),
        config.scan_filter.describe_name_rule()
    );

    let files = Scanner::new(&config)
        .context("Failed to create scanner")?
        .scan();

    if files.is_empty() {
        println!("No matching files found.");
        return Ok(());
    }

    let estimate = config
        .cost_estimator()
        .estimate(total_chars(&files), config.model);
    report::print_scan_report(&files, &estimate, config.model, &config.root_dir);

    let proceed = if cli.yes {
        true
    } else if interactive {
        interactive::confirm_overwrite(files.len())?
    } else {
        println!("Nothing was modified: pass --yes to overwrite files without prompting.");
        return Ok(());
    };

    if !proceed {
        println!("Cancelled, no files were modified.");
        return Ok(());
    }

    let pipeline = Pipeline::from_config(&config).context("Failed to start transformation")?;

    let start = Instant::now();
    let outcomes = pipeline.run(&files);
    let summary = BatchSummary::from_outcomes(&outcomes, start.elapsed());
    summary.print_summary();

    if let Some(path) = cli.report {
        report::BatchReport::new(
            &config.root_dir,
            config.model,
            config.recipe,
            estimate,
            outcomes,
            &summary,
        )
        .write_json(&path)
        .context("Failed to write batch report")?;
    }

    Ok(())
}

fn setup_tracing(verbosity: u8) -> anyhow::Result<()> {
    let filter = match verbosity {
        0 => EnvFilter::new("dto_hardener=warn"),
        1 => EnvFilter::new("dto_hardener=info"),
        2 => EnvFilter::new("dto_hardener=debug"),
        _ => EnvFilter::new("dto_hardener=trace"),
    };

    tracing_subscriber::registry()
        .with(filter)
        .with(
            fmt::layer()
                .with_target(false)
                .with_thread_ids(false)
                .with_writer(std::io::stderr),
        )
        .try_init()
        .context("Failed to install tracing subscriber")?;

    Ok(())
}
