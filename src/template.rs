use crate::error::{Error, Result};
use serde::Serialize;
use tera::{Context, Tera};

/// Values interpolated into every recipe template.
#[derive(Serialize)]
struct PromptContext<'a> {
    file_name: &'a str,
    content: &'a str,
}

const BUILTIN_TEMPLATES: &[(&str, &str)] = &[
    (
        "security/system",
        include_str!("../templates/security_system.tera"),
    ),
    ("security/user", include_str!("../templates/security_user.tera")),
    (
        "custom-decorators/system",
        include_str!("../templates/custom_decorators_system.tera"),
    ),
    (
        "custom-decorators/user",
        include_str!("../templates/custom_decorators_user.tera"),
    ),
    ("incident/combined", include_str!("../templates/incident.tera")),
    ("concise/combined", include_str!("../templates/concise.tera")),
];

/// Compiled set of built-in recipe templates.
pub(crate) struct PromptTemplates {
    tera: Tera,
}

impl PromptTemplates {
    /// Compiles all built-in templates.
    ///
    /// # Errors
    ///
    /// Returns an error if a template fails to parse.
    pub(crate) fn new() -> Result<Self> {
        let mut tera = Tera::default();
        // File contents are sent verbatim, never HTML-escaped.
        tera.autoescape_on(Vec::new());

        for (name, source) in BUILTIN_TEMPLATES {
            tera.add_raw_template(name, source)
                .map_err(|e| Error::template(*name, e))?;
        }

        Ok(Self { tera })
    }

    /// Renders `template` with the file name and content.
    ///
    /// # Errors
    ///
    /// Returns an error if the template is unknown or rendering fails.
    pub(crate) fn render(&self, template: &str, file_name: &str, content: &str) -> Result<String> {
        let context = Context::from_serialize(PromptContext { file_name, content })
            .map_err(|e| Error::template(template, e))?;

        self.tera
            .render(template, &context)
            .map_err(|e| Error::template(template, e))
    }
}
