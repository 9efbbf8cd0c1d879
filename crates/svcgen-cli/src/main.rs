//! svcgen CLI entrypoint
//! Parses command-line arguments and dispatches to the core generator.

use std::path::PathBuf;

use anyhow::Context;
use clap::{Args, Parser};
use svcgen_core::{Config, GenerationReport};
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "svcgen")]
#[command(author, version, about, long_about = None)]
struct Cli {
    #[command(subcommand)]
    pub command: Commands,
}

#[derive(clap::Subcommand, Debug)]
pub enum Commands {
    /// Generate client implementations from an interface document
    Generate(GenerateArgs),
    /// Write a starter configuration file
    Init {
        /// Path or URL of the interface document
        #[arg(long, default_value = "interfaces.yaml")]
        interface_path: String,
        /// Output directory for generated code
        #[arg(long, default_value = "src/generated")]
        output_dir: String,
        /// Where to write the configuration
        #[arg(long, default_value = "svcgen.yaml")]
        path: PathBuf,
    },
}

#[derive(Args, Debug, Default)]
pub struct GenerateArgs {
    /// Configuration file (YAML); flags below override its values
    #[arg(long)]
    config: Option<PathBuf>,
    /// Path or URL of the interface document (YAML, JSON or TOML)
    ///
    /// Example: --interface-path interfaces.yaml
    /// Example: --interface-path https://example.com/interfaces.json
    #[arg(long)]
    interface_path: Option<String>,
    /// Output directory for generated code
    #[arg(long)]
    output_dir: Option<PathBuf>,
    /// Directory of templates overriding the built-in ones
    #[arg(long)]
    template_dir: Option<PathBuf>,
    /// Path generated code uses to reach the runtime crate
    #[arg(long)]
    runtime_crate: Option<String>,
    /// Also write a mod.rs declaring every generated module
    #[arg(long)]
    emit_mod_file: bool,
    /// Only generate these interfaces (repeatable)
    #[arg(long = "include")]
    include_interfaces: Vec<String>,
    /// Skip these interfaces (repeatable)
    #[arg(long = "exclude")]
    exclude_interfaces: Vec<String>,
}

impl GenerateArgs {
    /// Start from the config file, if any, and apply the flags on top
    async fn resolve_config(&self) -> anyhow::Result<Config> {
        let mut config = match &self.config {
            Some(path) => Config::from_file(path)
                .await
                .with_context(|| format!("Failed to load config from {}", path.display()))?,
            None => {
                let interface_path = self
                    .interface_path
                    .clone()
                    .context("--interface-path is required without --config")?;
                let output_dir = self
                    .output_dir
                    .as_ref()
                    .context("--output-dir is required without --config")?;
                Config::new(interface_path, output_dir.to_string_lossy())
            }
        };

        if let Some(interface_path) = &self.interface_path {
            config.interface_path = interface_path.clone();
        }
        if let Some(output_dir) = &self.output_dir {
            config.output_dir = output_dir.to_string_lossy().into_owned();
        }
        if let Some(template_dir) = &self.template_dir {
            config.template_dir = Some(template_dir.to_string_lossy().into_owned());
        }
        if let Some(runtime_crate) = &self.runtime_crate {
            config.runtime_crate = runtime_crate.clone();
        }
        if self.emit_mod_file {
            config.emit_mod_file = true;
        }
        config
            .include_interfaces
            .extend(self.include_interfaces.iter().cloned());
        config
            .exclude_interfaces
            .extend(self.exclude_interfaces.iter().cloned());
        Ok(config)
    }
}

fn print_report(report: &GenerationReport, config: &Config) {
    for file in &report.generated {
        println!(
            "Generated {} for {}",
            PathBuf::from(&config.output_dir).join(&file.file_name).display(),
            file.interface
        );
    }
    for skipped in &report.skipped {
        println!("Skipped {}", skipped);
    }
    for failed in &report.failed {
        eprintln!("error: {}", failed);
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Initialize logging
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    let cli = Cli::parse();
    match &cli.command {
        Commands::Generate(args) => {
            let config = args.resolve_config().await?;
            tracing::debug!(?config, "resolved configuration");

            let report = svcgen_core::generate(&config)
                .await
                .context("Failed to generate service implementations")?;
            print_report(&report, &config);

            if report.has_errors() {
                anyhow::bail!(
                    "{} interface(s) could not be generated",
                    report.failed.len()
                );
            }
        }
        Commands::Init {
            interface_path,
            output_dir,
            path,
        } => {
            if path.exists() {
                anyhow::bail!("{} already exists", path.display());
            }
            Config::new(interface_path.as_str(), output_dir.as_str())
                .save(path)
                .await
                .with_context(|| format!("Failed to write {}", path.display()))?;
            println!("Wrote {}", path.display());
        }
    }
    Ok(())
}
