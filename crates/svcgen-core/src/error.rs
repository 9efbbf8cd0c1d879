//! Error handling for the svcgen code generation library.
//!
//! This module defines the main error type `Error` used throughout the library,
//! along with a convenient `Result` type alias. Schema errors (`Schema`,
//! `MultipleBodies`, `UnresolvableType`) abort generation for a single
//! interface; everything else aborts the whole run.
//!
//! # Examples
//!
//! ```
//! use svcgen_core::error::{Error, Result};
//!
//! fn might_fail() -> Result<()> {
//!     Err(Error::config("missing output directory"))
//! }
//!
//! assert!(might_fail().is_err());
//! ```

use thiserror::Error;

/// Result type for svcgen generation operations
pub type Result<T> = std::result::Result<T, Error>;

/// Main error type for svcgen generation operations
#[derive(Debug, Error)]
pub enum Error {
    /// I/O error
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// YAML parsing error
    #[error("YAML parsing error: {0}")]
    Yaml(#[from] serde_yaml::Error),

    /// JSON parsing error
    #[error("JSON parsing error: {0}")]
    Json(#[from] serde_json::Error),

    /// TOML parsing error
    #[error("TOML parsing error: {0}")]
    Toml(#[from] toml::de::Error),

    /// Fetching an interface document over HTTP failed
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// Interface document error
    #[error("Interface document error: {0}")]
    InterfaceDocument(String),

    /// Template error
    #[error("Template error: {0}")]
    Template(String),

    /// Template engine error
    #[error("Template engine error: {0}")]
    Tera(#[from] tera::Error),

    /// Configuration error
    #[error("Configuration error: {0}")]
    Config(String),

    /// An interface declaration that cannot be generated
    #[error("{interface}: {message}")]
    Schema { interface: String, message: String },

    /// More than one parameter of a method claims the body role
    #[error("{interface}: method '{method}' declares more than one body parameter")]
    MultipleBodies { interface: String, method: String },

    /// A type reference the resolver cannot express
    #[error("unresolvable type reference '{type_ref}': {reason}")]
    UnresolvableType { type_ref: String, reason: String },
}

impl Error {
    /// Create a new configuration error
    pub fn config<S: Into<String>>(msg: S) -> Self {
        Self::Config(msg.into())
    }

    /// Create a new interface document error
    pub fn document<S: Into<String>>(msg: S) -> Self {
        Self::InterfaceDocument(msg.into())
    }

    /// Create a new template error
    pub fn template<S: Into<String>>(msg: S) -> Self {
        Self::Template(msg.into())
    }

    /// Create a new schema error for an interface
    pub fn schema<I: Into<String>, S: Into<String>>(interface: I, msg: S) -> Self {
        Self::Schema {
            interface: interface.into(),
            message: msg.into(),
        }
    }

    /// Create a new unresolvable type error
    pub fn unresolvable<T: Into<String>, S: Into<String>>(type_ref: T, reason: S) -> Self {
        Self::UnresolvableType {
            type_ref: type_ref.into(),
            reason: reason.into(),
        }
    }

    /// Whether this error only invalidates the interface being generated
    pub fn is_schema_error(&self) -> bool {
        matches!(
            self,
            Self::Schema { .. } | Self::MultipleBodies { .. } | Self::UnresolvableType { .. }
        )
    }
}

impl From<&str> for Error {
    fn from(s: &str) -> Self {
        Self::Config(s.to_string())
    }
}

impl From<String> for Error {
    fn from(s: String) -> Self {
        Self::Config(s)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_schema_errors_are_classified() {
        assert!(Error::schema("Keys", "bad").is_schema_error());
        assert!(Error::unresolvable("dyn Fn()", "trait objects").is_schema_error());
        assert!(
            Error::MultipleBodies {
                interface: "Keys".into(),
                method: "put_key".into(),
            }
            .is_schema_error()
        );
        assert!(!Error::config("x").is_schema_error());
    }

    #[test]
    fn test_multiple_bodies_names_method() {
        let err = Error::MultipleBodies {
            interface: "crate::Keys".into(),
            method: "put_key".into(),
        };
        let msg = err.to_string();
        assert!(msg.contains("crate::Keys"));
        assert!(msg.contains("put_key"));
    }
}
