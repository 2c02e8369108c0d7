//! Terminal prompts used when options are not given on the command line.

use anyhow::Result;
use dialoguer::{Confirm, Input, Select, theme::ColorfulTheme};
use dto_hardener::{DEFAULT_NAME_SUBSTRINGS, ModelId, RecipeKind};

/// Asks for an optional filename substring; an empty answer keeps the defaults.
pub(crate) fn ask_name_pattern() -> Result<Option<String>> {
    let answer: String = Input::with_theme(&ColorfulTheme::default())
        .with_prompt(format!(
            "Filename filter (Enter for \"{}\")",
            DEFAULT_NAME_SUBSTRINGS.join("\" or \"")
        ))
        .allow_empty(true)
        .interact_text()?;

    let answer = answer.trim();
    Ok((!answer.is_empty()).then(|| answer.to_string()))
}

/// Lets the user pick a model; the default is preselected.
pub(crate) fn select_model() -> Result<ModelId> {
    let models = ModelId::all();
    let labels: Vec<String> = models
        .iter()
        .map(|model| {
            let pricing = model.pricing();
            format!(
                "{model}  (${:.2} in / ${:.2} out per 1M tokens)",
                pricing.input_per_million, pricing.output_per_million
            )
        })
        .collect();

    let default_index = models
        .iter()
        .position(|m| *m == ModelId::default())
        .unwrap_or(0);

    let selection = Select::with_theme(&ColorfulTheme::default())
        .with_prompt("Model")
        .items(&labels)
        .default(default_index)
        .interact_opt()?;

    Ok(selection.map_or_else(ModelId::default, |index| models[index]))
}

/// Lets the user pick the prompt recipe; the default is preselected.
pub(crate) fn select_recipe() -> Result<RecipeKind> {
    let recipes = RecipeKind::all();
    let labels: Vec<String> = recipes
        .iter()
        .map(|recipe| format!("{recipe}  ({})", recipe.description()))
        .collect();

    let default_index = recipes
        .iter()
        .position(|r| *r == RecipeKind::default())
        .unwrap_or(0);

    let selection = Select::with_theme(&ColorfulTheme::default())
        .with_prompt("Recipe")
        .items(&labels)
        .default(default_index)
        .interact_opt()?;

    Ok(selection.map_or_else(RecipeKind::default, |index| recipes[index]))
}

/// Final yes/no gate before any file is overwritten. Defaults to no.
pub(crate) fn confirm_overwrite(file_count: usize) -> Result<bool> {
    let proceed = Confirm::with_theme(&ColorfulTheme::default())
        .with_prompt(format!("Overwrite {file_count} file(s) in place?"))
        .default(false)
        .interact()?;

    Ok(proceed)
}
