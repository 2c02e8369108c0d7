use crate::cost::{CostEstimator, DEFAULT_CHARS_PER_TOKEN, DEFAULT_OUTPUT_PERCENT};
use crate::error::{Error, Result};
use crate::filter::ScanFilterConfig;
use crate::model::ModelId;
use crate::recipe::RecipeKind;
use std::path::PathBuf;

/// Environment variable holding the generation service key.
pub const API_KEY_ENV: &str = "GOOGLE_GENERATIVE_AI_API_KEY";

/// Default base URL of the generation service.
pub const DEFAULT_API_BASE_URL: &str = "https://generativelanguage.googleapis.com";

const DEFAULT_TEMPERATURE: f32 = 0.3;
const MAX_TEMPERATURE: f32 = 2.0;

/// Configuration for a scan and transformation batch.
///
/// Use [`Config::builder()`] to construct a new configuration.
#[derive(Clone)]
#[non_exhaustive]
pub struct Config {
    /// Root directory to scan for files
    pub root_dir: PathBuf,

    /// File selection rules
    pub scan_filter: ScanFilterConfig,

    /// Model used for generation and pricing
    pub model: ModelId,

    /// Instruction recipe used for every file in the batch
    pub recipe: RecipeKind,

    /// Characters per token for cost estimation
    pub chars_per_token: usize,

    /// Expected output size as a percentage of input tokens
    pub output_percent: u32,

    /// Sampling temperature sent to the generation service
    pub temperature: f32,

    /// Generation service key
    pub api_key: Option<String>,

    /// Generation service base URL
    pub api_base_url: String,

    /// Reject suspicious generated output instead of writing it
    pub check_output: bool,
}

impl std::fmt::Debug for Config {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Config")
            .field("root_dir", &self.root_dir)
            .field("scan_filter", &self.scan_filter)
            .field("model", &self.model)
            .field("recipe", &self.recipe)
            .field("chars_per_token", &self.chars_per_token)
            .field("output_percent", &self.output_percent)
            .field("temperature", &self.temperature)
            .field("api_key", &self.api_key.as_ref().map(|_| "<redacted>"))
            .field("api_base_url", &self.api_base_url)
            .field("check_output", &self.check_output)
            .finish()
    }
}

impl Config {
    /// Creates a new configuration builder.
    ///
    /// # Examples
    ///
    /// ```
    /// use dto_hardener::{Config, ModelId};
    ///
    /// let config = Config::builder()
    ///     .root_dir(".")
    ///     .model(ModelId::Gemini25Pro)
    ///     .build()
    ///     .expect("valid configuration");
    /// ```
    #[must_use]
    pub fn builder() -> ConfigBuilder {
        ConfigBuilder::default()
    }

    /// Validates the configuration.
    ///
    /// # Errors
    ///
    /// Returns an error if:
    /// - Root directory doesn't exist or is not a directory
    /// - `chars_per_token` is zero
    /// - Temperature is outside `0.0..=2.0`
    /// - The base URL is empty
    pub fn validate(&self) -> Result<()> {
        if !self.root_dir.exists() {
            return Err(Error::config(format!(
                "Root directory does not exist: {}",
                self.root_dir.display()
            )));
        }

        if !self.root_dir.is_dir() {
            return Err(Error::config(format!(
                "Root path is not a directory: {}",
                self.root_dir.display()
            )));
        }

        if self.chars_per_token == 0 {
            return Err(Error::config("chars_per_token must be greater than 0"));
        }

        if !(0.0..=MAX_TEMPERATURE).contains(&self.temperature) {
            return Err(Error::config(format!(
                "temperature ({}) must be between 0.0 and {MAX_TEMPERATURE}",
                self.temperature
            )));
        }

        if self.api_base_url.trim().is_empty() {
            return Err(Error::config("api_base_url must not be empty"));
        }

        // Compile once so bad patterns surface before the scan starts.
        crate::filter::ScanFilter::new(&self.scan_filter)?;

        Ok(())
    }

    /// Returns the cost estimator configured for this batch.
    #[must_use]
    pub fn cost_estimator(&self) -> CostEstimator {
        CostEstimator::new(self.chars_per_token, self.output_percent)
    }

    /// Returns the API key if one is set and non-blank.
    #[must_use]
    pub fn api_key(&self) -> Option<&str> {
        self.api_key
            .as_deref()
            .map(str::trim)
            .filter(|key| !key.is_empty())
    }
}

/// Builder for creating a [`Config`].
#[derive(Default)]
pub struct ConfigBuilder {
    root_dir: Option<PathBuf>,
    scan_filter: ScanFilterConfig,
    model: Option<ModelId>,
    recipe: Option<RecipeKind>,
    chars_per_token: Option<usize>,
    output_percent: Option<u32>,
    temperature: Option<f32>,
    api_key: Option<String>,
    api_base_url: Option<String>,
    check_output: bool,
}

impl ConfigBuilder {
    /// Sets the root directory to scan.
    #[must_use]
    pub fn root_dir(mut self, path: impl Into<PathBuf>) -> Self {
        self.root_dir = Some(path.into());
        self
    }

    /// Sets a custom case-insensitive filename substring.
    #[must_use]
    pub fn name_pattern(mut self, pattern: Option<String>) -> Self {
        self.scan_filter = self.scan_filter.name_pattern(pattern);
        self
    }

    /// Sets the regular expression file content must match.
    #[must_use]
    pub fn content_marker(mut self, marker: impl Into<String>) -> Self {
        self.scan_filter = self.scan_filter.content_marker(marker);
        self
    }

    /// Replaces the accepted file extensions.
    #[must_use]
    pub fn extensions(mut self, extensions: Vec<String>) -> Self {
        self.scan_filter = self.scan_filter.extensions(extensions);
        self
    }

    /// Adds glob patterns for directories to skip.
    #[must_use]
    pub fn exclude_directories(mut self, patterns: Vec<String>) -> Self {
        self.scan_filter = self.scan_filter.exclude_directories(patterns);
        self
    }

    /// Sets the generation model.
    #[must_use]
    pub fn model(mut self, model: ModelId) -> Self {
        self.model = Some(model);
        self
    }

    /// Sets the instruction recipe.
    #[must_use]
    pub fn recipe(mut self, recipe: RecipeKind) -> Self {
        self.recipe = Some(recipe);
        self
    }

    /// Sets the characters-per-token heuristic.
    #[must_use]
    pub fn chars_per_token(mut self, chars: usize) -> Self {
        self.chars_per_token = Some(chars);
        self
    }

    /// Sets the expected output size as a percentage of input tokens.
    #[must_use]
    pub fn output_percent(mut self, percent: u32) -> Self {
        self.output_percent = Some(percent);
        self
    }

    /// Sets the sampling temperature.
    #[must_use]
    pub fn temperature(mut self, temperature: f32) -> Self {
        self.temperature = Some(temperature);
        self
    }

    /// Sets the generation service key.
    #[must_use]
    pub fn api_key(mut self, key: Option<String>) -> Self {
        self.api_key = key;
        self
    }

    /// Overrides the generation service base URL.
    #[must_use]
    pub fn api_base_url(mut self, url: impl Into<String>) -> Self {
        self.api_base_url = Some(url.into());
        self
    }

    /// Enables the output sanity check before each overwrite.
    #[must_use]
    pub fn check_output(mut self, enabled: bool) -> Self {
        self.check_output = enabled;
        self
    }

    /// Builds the configuration.
    ///
    /// # Errors
    ///
    /// Returns an error if validation fails.
    pub fn build(self) -> Result<Config> {
        let config = Config {
            root_dir: self.root_dir.unwrap_or_else(|| PathBuf::from(".")),
            scan_filter: self.scan_filter,
            model: self.model.unwrap_or_default(),
            recipe: self.recipe.unwrap_or_default(),
            chars_per_token: self.chars_per_token.unwrap_or(DEFAULT_CHARS_PER_TOKEN),
            output_percent: self.output_percent.unwrap_or(DEFAULT_OUTPUT_PERCENT),
            temperature: self.temperature.unwrap_or(DEFAULT_TEMPERATURE),
            api_key: self.api_key,
            api_base_url: self
                .api_base_url
                .unwrap_or_else(|| DEFAULT_API_BASE_URL.to_string()),
            check_output: self.check_output,
        };

        config.validate()?;
        Ok(config)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let temp = assert_fs::TempDir::new().unwrap();
        let config = Config::builder().root_dir(temp.path()).build().unwrap();

        assert_eq!(config.model, ModelId::Gemini25Flash);
        assert_eq!(config.recipe, RecipeKind::Security);
        assert_eq!(config.chars_per_token, 4);
        assert_eq!(config.output_percent, 80);
        assert!(!config.check_output);
        assert_eq!(config.api_base_url, DEFAULT_API_BASE_URL);
        assert_eq!(config.scan_filter.custom_name_pattern(), None);
    }

    #[test]
    fn test_invalid_root_dir() {
        let result = Config::builder()
            .root_dir("/nonexistent/path/that/should/not/exist")
            .build();

        assert!(result.unwrap_err().is_config());
    }

    #[test]
    fn test_root_must_be_directory() {
        let temp = assert_fs::TempDir::new().unwrap();
        let file = temp.path().join("user.dto.ts");
        std::fs::write(&file, "x").unwrap();

        assert!(Config::builder().root_dir(file).build().is_err());
    }

    #[test]
    fn test_zero_chars_per_token() {
        let temp = assert_fs::TempDir::new().unwrap();
        let result = Config::builder()
            .root_dir(temp.path())
            .chars_per_token(0)
            .build();

        assert!(result.is_err());
    }

    #[test]
    fn test_temperature_range() {
        let temp = assert_fs::TempDir::new().unwrap();
        assert!(Config::builder()
            .root_dir(temp.path())
            .temperature(2.5)
            .build()
            .is_err());
        assert!(Config::builder()
            .root_dir(temp.path())
            .temperature(0.0)
            .build()
            .is_ok());
    }

    #[test]
    fn test_invalid_content_marker() {
        let temp = assert_fs::TempDir::new().unwrap();
        let result = Config::builder()
            .root_dir(temp.path())
            .content_marker("[unclosed")
            .build();

        assert!(matches!(result, Err(Error::InvalidPattern { .. })));
    }

    #[test]
    fn test_blank_api_key_is_treated_as_missing() {
        let temp = assert_fs::TempDir::new().unwrap();
        let config = Config::builder()
            .root_dir(temp.path())
            .api_key(Some("  ".to_string()))
            .build()
            .unwrap();

        assert_eq!(config.api_key(), None);
    }

    #[test]
    fn test_debug_redacts_api_key() {
        let temp = assert_fs::TempDir::new().unwrap();
        let config = Config::builder()
            .root_dir(temp.path())
            .api_key(Some("secret-key".to_string()))
            .build()
            .unwrap();

        let debug = format!("{config:?}");
        assert!(!debug.contains("secret-key"));
        assert!(debug.contains("<redacted>"));
    }
}
