//! Token and price estimation for a batch of files.
//!
//! The estimate is purely informational: it is shown to the user before the
//! confirmation gate and never enforced as a budget.

use crate::model::{ModelId, ModelPricing};
use serde::Serialize;

/// Default heuristic: roughly four characters per token.
pub const DEFAULT_CHARS_PER_TOKEN: usize = 4;

/// Default assumption that generated output is 80% of the input length.
pub const DEFAULT_OUTPUT_PERCENT: u32 = 80;

const TOKENS_PER_PRICE_UNIT: f64 = 1_000_000.0;

/// Token and price breakdown for a batch.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize)]
pub struct CostEstimate {
    /// Estimated prompt tokens
    pub input_tokens: u64,
    /// Estimated generated tokens
    pub output_tokens: u64,
    /// Sum of input and output tokens
    pub total_tokens: u64,
    /// Price of the input tokens in USD
    pub input_cost: f64,
    /// Price of the output tokens in USD
    pub output_cost: f64,
    /// Sum of input and output cost in USD
    pub total_cost: f64,
}

/// Character-count based cost estimator.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CostEstimator {
    chars_per_token: usize,
    output_percent: u32,
}

impl Default for CostEstimator {
    fn default() -> Self {
        Self {
            chars_per_token: DEFAULT_CHARS_PER_TOKEN,
            output_percent: DEFAULT_OUTPUT_PERCENT,
        }
    }
}

impl CostEstimator {
    /// Creates an estimator with explicit heuristics.
    ///
    /// A `chars_per_token` of zero is clamped to one.
    #[must_use]
    pub fn new(chars_per_token: usize, output_percent: u32) -> Self {
        Self {
            chars_per_token: chars_per_token.max(1),
            output_percent,
        }
    }

    /// Estimates tokens and cost for `total_chars` characters sent to `model`.
    #[must_use]
    pub fn estimate(&self, total_chars: u64, model: ModelId) -> CostEstimate {
        self.estimate_with_pricing(total_chars, model.pricing())
    }

    /// Estimates tokens and cost against an arbitrary price table entry.
    #[must_use]
    pub fn estimate_with_pricing(&self, total_chars: u64, pricing: ModelPricing) -> CostEstimate {
        let input_tokens = total_chars.div_ceil(self.chars_per_token as u64);
        let output_tokens = (input_tokens * u64::from(self.output_percent)).div_ceil(100);

        let input_cost = input_tokens as f64 / TOKENS_PER_PRICE_UNIT * pricing.input_per_million;
        let output_cost =
            output_tokens as f64 / TOKENS_PER_PRICE_UNIT * pricing.output_per_million;

        CostEstimate {
            input_tokens,
            output_tokens,
            total_tokens: input_tokens + output_tokens,
            input_cost,
            output_cost,
            total_cost: input_cost + output_cost,
        }
    }
}

/// Estimates with the default heuristics.
#[must_use]
pub fn estimate(total_chars: u64, model: ModelId) -> CostEstimate {
    CostEstimator::default().estimate(total_chars, model)
}
