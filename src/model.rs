//! Supported generation models and their static price table.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Price of a model in US dollars per million tokens.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ModelPricing {
    /// Price per one million input (prompt) tokens
    pub input_per_million: f64,
    /// Price per one million output (generated) tokens
    pub output_per_million: f64,
}

/// Generation model used for a batch run.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum ModelId {
    /// Fast, inexpensive model
    #[default]
    #[serde(rename = "gemini-2.5-flash")]
    Gemini25Flash,
    /// Higher quality, more expensive model
    #[serde(rename = "gemini-2.5-pro")]
    Gemini25Pro,
}

impl ModelId {
    /// Returns the identifier the generation service expects.
    #[must_use]
    pub const fn id(self) -> &'static str {
        match self {
            Self::Gemini25Flash => "gemini-2.5-flash",
            Self::Gemini25Pro => "gemini-2.5-pro",
        }
    }

    /// Returns all available models, in menu order.
    #[must_use]
    pub const fn all() -> &'static [Self] {
        &[Self::Gemini25Flash, Self::Gemini25Pro]
    }

    /// Returns the price table entry for this model.
    #[must_use]
    pub const fn pricing(self) -> ModelPricing {
        match self {
            Self::Gemini25Flash => ModelPricing {
                input_per_million: 0.3,
                output_per_million: 2.5,
            },
            Self::Gemini25Pro => ModelPricing {
                input_per_million: 1.25,
                output_per_million: 5.0,
            },
        }
    }
}

impl fmt::Display for ModelId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.id())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_serde_name_matches_id() {
        for model in ModelId::all() {
            let json = serde_json::to_string(model).unwrap();
            assert_eq!(json, format!("\"{}\"", model.id()));
            assert_eq!(model.to_string(), model.id());
        }
    }

    #[test]
    fn test_default_is_flash() {
        assert_eq!(ModelId::default(), ModelId::Gemini25Flash);
    }

    #[test]
    fn test_pro_costs_more_than_flash() {
        let flash = ModelId::Gemini25Flash.pricing();
        let pro = ModelId::Gemini25Pro.pricing();
        assert!(pro.input_per_million > flash.input_per_million);
        assert!(pro.output_per_million > flash.output_per_million);
    }

    #[test]
    fn test_serde_uses_service_ids() {
        let json = serde_json::to_string(&ModelId::Gemini25Pro).unwrap();
        assert_eq!(json, "\"gemini-2.5-pro\"");
    }
}
