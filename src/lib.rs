//! # dto-hardener
//!
//! A library for finding request/DTO classes documented with `@ApiProperty`
//! and rewriting them, one file at a time, through a generative model that
//! tightens their validation decorators.
//!
//! ## Features
//!
//! - Filtered directory walk (extension, filename, content marker)
//! - Character-based token and price estimation per model
//! - Built-in prompt recipes rendered from Tera templates
//! - Sequential rewrite loop with per-file failure isolation
//! - In-place writes and an optional output sanity check
//!
//! ## Quick Start
//!
//! ```no_run
//! use dto_hardener::{Config, ModelId, Pipeline, RecipeKind, Scanner};
//!
//! # fn main() -> anyhow::Result<()> {
//! let config = Config::builder()
//!     .root_dir("./src")
//!     .model(ModelId::Gemini25Flash)
//!     .recipe(RecipeKind::Security)
//!     .api_key(std::env::var("GOOGLE_GENERATIVE_AI_API_KEY").ok())
//!     .build()?;
//!
//! let files = Scanner::new(&config)?.scan();
//! let estimate = config.cost_estimator().estimate(dto_hardener::total_chars(&files), config.model);
//! println!("~${:.4}", estimate.total_cost);
//!
//! let outcomes = Pipeline::from_config(&config)?.run(&files);
//! # let _ = outcomes;
//! # Ok(())
//! # }
//! ```
//!
//! ## Architecture
//!
//! 1. **Scanner**: Walks the tree and snapshots matching files
//! 2. **Cost**: Estimates tokens and price from the total character count
//! 3. **Recipe**: Builds the instruction for each file
//! 4. **Pipeline**: Calls the generator and overwrites each file in turn

#![warn(
    missing_docs,
    rust_2018_idioms,
    unreachable_pub,
    clippy::all,
    clippy::pedantic,
    clippy::nursery
)]
#![allow(clippy::module_name_repetitions)]

mod config;
mod cost;
mod error;
mod file;
mod filter;
mod generate;
mod guard;
mod model;
mod pipeline;
mod recipe;
mod scanner;
mod template;
mod writer;

pub mod report;

pub use config::{API_KEY_ENV, Config, ConfigBuilder, DEFAULT_API_BASE_URL};
pub use cost::{CostEstimate, CostEstimator, DEFAULT_CHARS_PER_TOKEN, DEFAULT_OUTPUT_PERCENT, estimate};
pub use error::{Error, Result};
pub use file::{FileRecord, total_chars};
pub use filter::{DEFAULT_CONTENT_MARKER, DEFAULT_EXTENSIONS, DEFAULT_NAME_SUBSTRINGS, ScanFilterConfig};
pub use generate::{GeminiClient, Generation, Generator};
pub use model::{ModelId, ModelPricing};
pub use pipeline::{BatchSummary, Pipeline, TransformationOutcome};
pub use recipe::{Instruction, Recipe, RecipeKind};
pub use scanner::{Scanner, scan};
