//! Loading and rendering of the code generation templates

use std::error::Error as StdError;
use std::path::Path;
use std::sync::Arc;

use serde::Serialize;
use tera::{Context, Tera};

use super::{MOD_TEMPLATE, SERVICE_TEMPLATE, TemplateDir};
use crate::error::{Error, Result};

/// Templates compiled into the binary, used for anything a template
/// directory does not override
const BUILTIN_TEMPLATES: &[(&str, &str)] = &[
    (
        SERVICE_TEMPLATE,
        include_str!("../../templates/service_impl.rs.tera"),
    ),
    (MOD_TEMPLATE, include_str!("../../templates/mod.rs.tera")),
];

/// Manages loading and rendering of code generation templates
#[derive(Debug, Clone)]
pub struct TemplateManager {
    /// Cached Tera template engine instance
    tera: Arc<Tera>,
    /// Directory the overriding templates came from, if any
    template_dir: Option<TemplateDir>,
}

impl TemplateManager {
    /// Create a TemplateManager.
    ///
    /// # Arguments
    /// * `template_dir` - Optional template directory. If None, the standard
    ///   locations are searched and the built-in templates are used when none
    ///   exists.
    pub fn new(template_dir: Option<&Path>) -> Result<Self> {
        let template_dir = TemplateDir::discover(template_dir)?;

        let mut tera = match &template_dir {
            Some(dir) => {
                log::info!("Loading templates from {}", dir.display());
                let pattern = format!("{}/**/*.tera", dir.path().display());
                Tera::new(&pattern).map_err(|e| {
                    Error::template(format!(
                        "Failed to parse templates in {}: {}",
                        dir.display(),
                        describe(&e)
                    ))
                })?
            }
            None => Tera::default(),
        };

        let loaded: Vec<String> = tera.get_template_names().map(str::to_string).collect();
        for (name, source) in BUILTIN_TEMPLATES {
            if loaded.iter().any(|n| n.as_str() == *name) {
                log::debug!("Template {} overridden", name);
                continue;
            }
            tera.add_raw_template(name, source)?;
        }

        Ok(Self {
            tera: Arc::new(tera),
            template_dir,
        })
    }

    /// A manager using only the built-in templates
    pub fn builtin() -> Result<Self> {
        let mut tera = Tera::default();
        tera.add_raw_templates(BUILTIN_TEMPLATES.iter().copied())?;
        Ok(Self {
            tera: Arc::new(tera),
            template_dir: None,
        })
    }

    /// Get the template directory, if templates were loaded from one
    pub fn template_dir(&self) -> Option<&TemplateDir> {
        self.template_dir.as_ref()
    }

    /// Check if a template exists
    pub fn has_template(&self, name: &str) -> bool {
        self.tera.get_template_names().any(|n| n == name)
    }

    /// Render `template_name` with `context`
    pub fn render<T: Serialize>(&self, template_name: &str, context: &T) -> Result<String> {
        if !self.has_template(template_name) {
            return Err(Error::template(format!(
                "Template not found: {}",
                template_name
            )));
        }

        let value = serde_json::to_value(context)?;
        let tera_context = Context::from_value(value.clone()).map_err(|e| {
            Error::template(format!("Failed to build context: {}", describe(&e)))
        })?;

        log::debug!("Rendering template: {}", template_name);
        match self.tera.render(template_name, &tera_context) {
            Ok(content) => {
                log::debug!(
                    "Rendered {} ({} bytes)",
                    template_name,
                    content.len()
                );
                Ok(content)
            }
            Err(e) => {
                log::error!("Template rendering failed for '{}': {}", template_name, describe(&e));
                log::error!(
                    "Available context keys: {:?}",
                    value.as_object().map(|o| o.keys().collect::<Vec<_>>())
                );
                Err(Error::template(format!(
                    "Failed to render template '{}': {}",
                    template_name,
                    describe(&e)
                )))
            }
        }
    }
}

/// Tera reports the useful detail in the error's source chain
fn describe(error: &tera::Error) -> String {
    let mut message = error.to_string();
    let mut source = error.source();
    while let Some(cause) = source {
        message.push_str(": ");
        message.push_str(&cause.to_string());
        source = cause.source();
    }
    message
}
