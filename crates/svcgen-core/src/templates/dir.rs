//! Template directory resolution

use std::io;
use std::path::{Path, PathBuf};

/// Environment variable naming a template directory
pub const TEMPLATE_DIR_ENV: &str = "SVCGEN_TEMPLATE_DIR";

/// A directory of `.tera` templates overriding the built-in ones
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TemplateDir {
    path: PathBuf,
}

impl TemplateDir {
    pub fn new(path: PathBuf) -> Self {
        Self { path }
    }

    /// Returns a displayable version of the template path
    pub fn display(&self) -> std::path::Display<'_> {
        self.path.display()
    }

    /// Resolve the template directory.
    ///
    /// An explicit directory must exist. Without one the standard locations
    /// are searched, and `Ok(None)` means the built-in templates apply.
    pub fn discover(custom_dir: Option<&Path>) -> io::Result<Option<Self>> {
        if let Some(dir) = custom_dir {
            if !dir.is_dir() {
                return Err(io::Error::new(
                    io::ErrorKind::NotFound,
                    format!("Template directory not found: {}", dir.display()),
                ));
            }
            return Ok(Some(Self::new(dir.to_path_buf())));
        }

        Ok(Self::find_template_dir().map(Self::new))
    }

    /// Check the standard locations in order
    fn find_template_dir() -> Option<PathBuf> {
        // 1. Environment variable
        if let Ok(dir) = std::env::var(TEMPLATE_DIR_ENV) {
            let path = PathBuf::from(dir);
            if path.is_dir() {
                return Some(path);
            }
            log::warn!(
                "{} points to {}, which is not a directory",
                TEMPLATE_DIR_ENV,
                path.display()
            );
        }

        // 2. Current directory
        let templates_dir = PathBuf::from(".").join("templates");
        if templates_dir.join(super::SERVICE_TEMPLATE).is_file() {
            return Some(templates_dir);
        }

        // 3. The user's home directory
        if let Some(home_dir) = dirs::home_dir() {
            let templates_dir = home_dir.join(".svcgen").join("templates");
            if templates_dir.is_dir() {
                return Some(templates_dir);
            }
        }

        None
    }

    /// Path of the directory
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Path of one template inside the directory
    pub fn template_file(&self, name: &str) -> PathBuf {
        self.path.join(name)
    }
}
