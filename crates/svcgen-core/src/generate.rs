//! Code generation entry points

use std::collections::BTreeSet;
use std::fmt;
use std::path::Path;

use crate::{
    builder::DescriptorBuilder,
    config::Config,
    emit::{Emitter, ModuleEntry},
    error::{Error, Result},
    interface::InterfaceDocument,
    templates::TemplateManager,
};

/// One rendered source file
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GeneratedFile {
    /// Fully qualified name of the interface it implements
    pub interface: String,
    pub module_name: String,
    pub file_name: String,
    pub impl_name: String,
    pub contents: String,
}

/// A message about one interface
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Diagnostic {
    pub interface: String,
    pub message: String,
}

impl Diagnostic {
    fn new(interface: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            interface: interface.into(),
            message: message.into(),
        }
    }
}

impl fmt::Display for Diagnostic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.interface, self.message)
    }
}

/// Outcome of generating one interface document
#[derive(Debug, Clone, Default)]
pub struct GenerationReport {
    pub generated: Vec<GeneratedFile>,
    /// Interfaces that were not generation targets
    pub skipped: Vec<Diagnostic>,
    /// Interfaces rejected with a schema error
    pub failed: Vec<Diagnostic>,
}

impl GenerationReport {
    pub fn has_errors(&self) -> bool {
        !self.failed.is_empty()
    }
}

/// Drives the descriptor builder and the emitter over a document
#[derive(Debug, Clone)]
pub struct Generator {
    builder: DescriptorBuilder,
    emitter: Emitter,
}

impl Generator {
    pub fn new(builder: DescriptorBuilder, emitter: Emitter) -> Self {
        Self { builder, emitter }
    }

    /// Build a generator from the runtime crate and template settings of `config`
    pub fn from_config(config: &Config) -> Result<Self> {
        let templates = TemplateManager::new(config.template_dir.as_deref().map(Path::new))?;
        Ok(Self::new(
            DescriptorBuilder::new(&config.runtime_crate),
            Emitter::new(templates),
        ))
    }

    /// Generate every interface `filter` accepts.
    ///
    /// Schema errors are recorded in the report and generation continues with
    /// the next interface; any other error aborts the run.
    pub fn generate_document<F>(&self, doc: &InterfaceDocument, filter: F) -> Result<GenerationReport>
    where
        F: Fn(&str) -> bool,
    {
        let mut report = GenerationReport::default();
        let mut file_names = BTreeSet::new();

        for interface in &doc.interfaces {
            if !filter(&interface.name) {
                log::debug!("{} excluded by configuration", interface.name);
                report
                    .skipped
                    .push(Diagnostic::new(&interface.name, "excluded by configuration"));
                continue;
            }

            let model = match self.builder.build(interface) {
                Ok(Some(model)) => model,
                Ok(None) => {
                    let reason = if interface.service_interface {
                        "no methods with request information"
                    } else {
                        "not a service interface"
                    };
                    report.skipped.push(Diagnostic::new(&interface.name, reason));
                    continue;
                }
                Err(e) if e.is_schema_error() => {
                    log::error!("Cannot generate {}: {}", interface.name, e);
                    report.failed.push(Diagnostic::new(&interface.name, e.to_string()));
                    continue;
                }
                Err(e) => return Err(e),
            };

            let file_name = Emitter::file_name(&model);
            if !file_names.insert(file_name.clone()) {
                let e = Error::schema(
                    &interface.name,
                    format!("output file {} is already generated for another interface", file_name),
                );
                log::error!("Cannot generate {}: {}", interface.name, e);
                report.failed.push(Diagnostic::new(&interface.name, e.to_string()));
                continue;
            }

            let contents = self.emitter.render(&model)?;
            report.generated.push(GeneratedFile {
                interface: interface.name.clone(),
                module_name: Emitter::module_name(&model),
                file_name,
                impl_name: model.impl_name,
                contents,
            });
        }

        Ok(report)
    }

    /// Render the `mod.rs` for the files in `report`
    pub fn render_mod(&self, report: &GenerationReport) -> Result<String> {
        let modules: Vec<_> = report
            .generated
            .iter()
            .map(|file| ModuleEntry {
                name: file.module_name.clone(),
                impl_name: file.impl_name.clone(),
            })
            .collect();
        self.emitter.render_mod(&modules)
    }
}

/// Main entry point for code generation
pub async fn generate(config: &Config) -> Result<GenerationReport> {
    // 1. Load the interface document
    log::info!("Loading interfaces from {}", config.interface_path);
    let doc = InterfaceDocument::from_file_or_url(&config.interface_path).await?;

    // 2. Build and render every selected interface
    let generator = Generator::from_config(config)?;
    let report = generator.generate_document(&doc, |name| config.includes(name))?;

    // 3. Write the output files
    let output_dir = Path::new(&config.output_dir);
    tokio::fs::create_dir_all(output_dir).await?;
    for file in &report.generated {
        let path = output_dir.join(&file.file_name);
        log::info!("Writing {} for {}", path.display(), file.interface);
        tokio::fs::write(&path, &file.contents).await?;
    }

    if config.emit_mod_file && !report.generated.is_empty() {
        let path = output_dir.join("mod.rs");
        log::info!("Writing {}", path.display());
        tokio::fs::write(&path, generator.render_mod(&report)?).await?;
    }

    Ok(report)
}
