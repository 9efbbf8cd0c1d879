//! Configuration management for svcgen code generation.
//!
//! This module defines the `Config` struct used to drive a generation run.
//! The configuration can be loaded from a YAML file, created
//! programmatically, or assembled from command-line arguments.
//!
//! # Examples
//!
//! ```no_run
//! use svcgen_core::config::Config;
//!
//! # async fn run() -> svcgen_core::Result<()> {
//! // Create a new config programmatically
//! let mut config = Config::new("interfaces.yaml", "src/generated");
//! config.emit_mod_file = true;
//!
//! // Or load from a config file
//! let config = Config::from_file("svcgen.yaml").await?;
//! # Ok(())
//! # }
//! ```

use std::path::Path;

use serde::{Deserialize, Serialize};
use tokio::fs;

/// Configuration for a generation run
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Config {
    /// Path or URL of the interface document
    pub interface_path: String,

    /// Output directory for generated code
    pub output_dir: String,

    /// Optional directory of templates overriding the built-in ones
    #[serde(default)]
    pub template_dir: Option<String>,

    /// Path generated code uses to reach the runtime crate
    #[serde(default = "default_runtime_crate")]
    pub runtime_crate: String,

    /// Also write a `mod.rs` declaring every generated module
    #[serde(default)]
    pub emit_mod_file: bool,

    /// Interfaces to generate; empty means all of them
    #[serde(default)]
    pub include_interfaces: Vec<String>,

    /// Interfaces to leave out
    #[serde(default)]
    pub exclude_interfaces: Vec<String>,
}

impl Config {
    /// Create a new Config with default values
    pub fn new(interface_path: impl Into<String>, output_dir: impl Into<String>) -> Self {
        Self {
            interface_path: interface_path.into(),
            output_dir: output_dir.into(),
            template_dir: None,
            runtime_crate: default_runtime_crate(),
            emit_mod_file: false,
            include_interfaces: Vec::new(),
            exclude_interfaces: Vec::new(),
        }
    }

    /// Load configuration from a file
    pub async fn from_file<P: AsRef<Path>>(path: P) -> crate::Result<Self> {
        let content = fs::read_to_string(path).await?;
        let config = serde_yaml::from_str(&content)?;
        Ok(config)
    }

    /// Save configuration to a file
    pub async fn save<P: AsRef<Path>>(&self, path: P) -> crate::Result<()> {
        let content = serde_yaml::to_string(self)?;
        fs::write(path, content).await?;
        Ok(())
    }

    /// Whether the interface named `fqn` should be generated
    pub fn includes(&self, fqn: &str) -> bool {
        let included =
            self.include_interfaces.is_empty() || self.include_interfaces.iter().any(|i| i == fqn);
        included && !self.exclude_interfaces.iter().any(|e| e == fqn)
    }
}

fn default_runtime_crate() -> String {
    "svcgen_runtime".to_string()
}
