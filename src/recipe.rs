//! Transformation recipes.
//!
//! A recipe turns a file name and its content into the instruction sent to
//! the generation service. Recipes form a small closed set selected once per
//! batch; every recipe asks for the complete rewritten file as plain text.

use crate::error::Result;
use crate::template::PromptTemplates;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Instruction payload produced by a recipe.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Instruction {
    /// Single text blob carrying both the rules and the file
    Combined(String),
    /// Rules as a system instruction, the file as the user message
    Pair {
        /// System instruction
        system: String,
        /// User message
        user: String,
    },
}

impl Instruction {
    /// Returns the system instruction, if the recipe provides one.
    #[must_use]
    pub fn system(&self) -> Option<&str> {
        match self {
            Self::Combined(_) => None,
            Self::Pair { system, .. } => Some(system),
        }
    }

    /// Returns the user message.
    #[must_use]
    pub fn user(&self) -> &str {
        match self {
            Self::Combined(text) => text,
            Self::Pair { user, .. } => user,
        }
    }

    /// Total instruction length in characters.
    #[must_use]
    pub fn char_count(&self) -> usize {
        self.system().map_or(0, |s| s.chars().count()) + self.user().chars().count()
    }
}

/// Available recipe variants.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum RecipeKind {
    /// Strict rule set with secure patterns and worked examples
    #[default]
    Security,
    /// Prefers the in-house composite validation decorators
    CustomDecorators,
    /// Single prompt built around the token injection incident
    Incident,
    /// Compact single prompt with field-name heuristics
    Concise,
}

impl RecipeKind {
    /// Returns the ID string for this recipe.
    #[must_use]
    pub const fn id(self) -> &'static str {
        match self {
            Self::Security => "security",
            Self::CustomDecorators => "custom-decorators",
            Self::Incident => "incident",
            Self::Concise => "concise",
        }
    }

    /// Returns all available recipes.
    #[must_use]
    pub const fn all() -> &'static [Self] {
        &[
            Self::Security,
            Self::CustomDecorators,
            Self::Incident,
            Self::Concise,
        ]
    }

    /// Returns a short human-readable description.
    #[must_use]
    pub const fn description(self) -> &'static str {
        match self {
            Self::Security => "strict validation rules with secure patterns and examples",
            Self::CustomDecorators => "prefer @shared/decorator/validation composite decorators",
            Self::Incident => "single prompt focused on token and ID injection",
            Self::Concise => "compact prompt with field-name heuristics",
        }
    }

    /// Returns true if the recipe sends a separate system instruction.
    #[must_use]
    pub const fn uses_system_instruction(self) -> bool {
        matches!(self, Self::Security | Self::CustomDecorators)
    }
}

impl fmt::Display for RecipeKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.id())
    }
}

/// A selected recipe ready to build instructions.
pub struct Recipe {
    kind: RecipeKind,
    templates: PromptTemplates,
}

impl Recipe {
    /// Compiles the templates for `kind`.
    ///
    /// # Errors
    ///
    /// Returns an error if the built-in templates fail to compile.
    pub fn new(kind: RecipeKind) -> Result<Self> {
        Ok(Self {
            kind,
            templates: PromptTemplates::new()?,
        })
    }

    /// Returns the recipe variant.
    #[must_use]
    pub const fn kind(&self) -> RecipeKind {
        self.kind
    }

    /// Builds the instruction for one file.
    ///
    /// # Errors
    ///
    /// Returns an error only if template rendering fails.
    pub fn build_instruction(&self, file_name: &str, content: &str) -> Result<Instruction> {
        let id = self.kind.id();

        if self.kind.uses_system_instruction() {
            Ok(Instruction::Pair {
                system: self
                    .templates
                    .render(&format!("{id}/system"), file_name, content)?,
                user: self
                    .templates
                    .render(&format!("{id}/user"), file_name, content)?,
            })
        } else {
            Ok(Instruction::Combined(self.templates.render(
                &format!("{id}/combined"),
                file_name,
                content,
            )?))
        }
    }
}
