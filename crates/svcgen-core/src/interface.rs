//! Interface documents: the declarative input svcgen generates from.
//!
//! A document lists service interfaces, their methods and per-parameter role
//! tags. It can be written in YAML, JSON or TOML and loaded from disk or
//! fetched over HTTP.
//!
//! # Examples
//!
//! ```
//! use svcgen_core::interface::InterfaceDocument;
//!
//! let doc = InterfaceDocument::parse_content(r#"
//! interfaces:
//!   - name: crate::service::Keys
//!     methods:
//!       - name: get_keys
//!         request: { method: GET, path: /keys, expected_status_codes: 200 }
//!         return_type: Vec<String>
//!         parameters:
//!           - { name: filter, type: String, query_param: { name: q } }
//! "#).unwrap();
//!
//! let keys = doc.interface("crate::service::Keys").unwrap();
//! assert_eq!(keys.methods[0].parameters[0].name, "filter");
//! ```

use std::path::Path;

use serde::de::DeserializeOwned;
use serde::{Deserialize, Deserializer, Serialize};
use serde_value::Value as SerdeValue;
use tokio::fs;
use url::Url;

use crate::Error;
use crate::model::HttpMethod;

/// A set of interface declarations
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct InterfaceDocument {
    #[serde(default)]
    pub interfaces: Vec<InterfaceDefinition>,
}

/// One annotated service interface
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct InterfaceDefinition {
    /// Fully qualified path of the interface trait
    pub name: String,

    /// Marks the interface as a generation target
    #[serde(default = "default_true")]
    pub service_interface: bool,

    #[serde(default)]
    pub methods: Vec<MethodDefinition>,
}

/// One interface method
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MethodDefinition {
    pub name: String,

    /// HTTP request information; methods without it are not generated
    #[serde(default)]
    pub request: Option<RequestInformation>,

    /// Declared return type; absent or `()` means void
    #[serde(default)]
    pub return_type: Option<String>,

    #[serde(default)]
    pub parameters: Vec<ParameterDefinition>,
}

/// Per-method HTTP metadata
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RequestInformation {
    pub method: HttpMethod,

    #[serde(default)]
    pub path: String,

    /// Constant headers in `Name: value` form
    #[serde(default, deserialize_with = "one_or_many")]
    pub request_headers: Vec<String>,

    #[serde(default, deserialize_with = "one_or_many")]
    pub expected_status_codes: Vec<u16>,

    #[serde(default)]
    pub return_value_wire_type: Option<String>,
}

/// One method parameter and its role tags
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ParameterDefinition {
    pub name: String,

    #[serde(rename = "type")]
    pub type_ref: String,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub host_param: Option<HostParam>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub header_param: Option<HeaderParam>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub query_param: Option<QueryParam>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub body_param: Option<BodyParam>,
}

impl ParameterDefinition {
    /// A parameter with no role tags
    pub fn plain(name: impl Into<String>, type_ref: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            type_ref: type_ref.into(),
            host_param: None,
            header_param: None,
            query_param: None,
            body_param: None,
        }
    }

    /// Number of role tags present
    pub fn tag_count(&self) -> usize {
        [
            self.host_param.is_some(),
            self.header_param.is_some(),
            self.query_param.is_some(),
            self.body_param.is_some(),
        ]
        .into_iter()
        .filter(|present| *present)
        .count()
    }
}

/// Substitutes `{name}` in the host/path template
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HostParam {
    pub name: String,
    /// The value is already encoded and is inserted verbatim
    #[serde(default = "default_true")]
    pub encoded: bool,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HeaderParam {
    pub name: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct QueryParam {
    pub name: String,
    /// The value is already encoded and is appended verbatim
    #[serde(default)]
    pub encoded: bool,
    /// Send each item of a collection as its own `name=value` pair
    #[serde(default)]
    pub multiple_query_params: bool,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BodyParam {
    pub content_type: String,
}

fn default_true() -> bool {
    true
}

/// Accept either a single value or a list of values
fn one_or_many<'de, D, T>(deserializer: D) -> Result<Vec<T>, D::Error>
where
    D: Deserializer<'de>,
    T: DeserializeOwned,
{
    let value = SerdeValue::deserialize(deserializer)?;

    match value {
        SerdeValue::Seq(seq) => seq
            .into_iter()
            .map(|item| item.deserialize_into().map_err(serde::de::Error::custom))
            .collect(),
        SerdeValue::Unit | SerdeValue::Option(None) => Ok(Vec::new()),
        other => Ok(vec![
            other.deserialize_into().map_err(serde::de::Error::custom)?,
        ]),
    }
}

impl InterfaceDocument {
    /// Load a document from a file or URL (YAML, JSON or TOML)
    pub async fn from_file_or_url<P: AsRef<str>>(location: P) -> crate::Result<Self> {
        let location = location.as_ref();

        if let Ok(url) = Url::parse(location) {
            if matches!(url.scheme(), "http" | "https") {
                return Self::from_url(url).await;
            }
        }

        Self::from_file(location).await
    }

    /// Load a document from a file; `.toml` files are parsed as TOML
    pub async fn from_file<P: AsRef<Path>>(path: P) -> crate::Result<Self> {
        let path = path.as_ref();
        let content = fs::read_to_string(path).await?;
        Self::parse_located(&content, &path.display().to_string(), has_toml_extension(path))
    }

    /// Fetch a document over HTTP(S); URLs whose path ends in `.toml` are parsed as TOML
    pub async fn from_url(url: Url) -> crate::Result<Self> {
        log::info!("Fetching interface document from {}", url);
        let response = reqwest::get(url.clone()).await?;

        if !response.status().is_success() {
            return Err(Error::document(format!(
                "Failed to fetch interface document from {}: HTTP {}",
                url,
                response.status()
            )));
        }

        let content = response.text().await?;
        Self::parse_located(&content, url.as_str(), url_is_toml(&url))
    }

    fn parse_located(content: &str, location: &str, is_toml: bool) -> crate::Result<Self> {
        if is_toml {
            return toml::from_str(content).map_err(|e| {
                log::error!("Failed to parse TOML interface document at {}", location);
                Error::from(e)
            });
        }
        Self::parse_content(content).map_err(|e| {
            Error::document(format!(
                "Failed to parse interface document at {}: {}",
                location, e
            ))
        })
    }

    /// Parse content as JSON, falling back to YAML
    pub fn parse_content(content: &str) -> Result<Self, String> {
        if let Ok(doc) = serde_json::from_str(content) {
            return Ok(doc);
        }

        serde_yaml::from_str(content).map_err(|e| e.to_string())
    }

    /// Look up an interface by its fully qualified name
    pub fn interface(&self, name: &str) -> Option<&InterfaceDefinition> {
        self.interfaces.iter().find(|i| i.name == name)
    }
}

fn has_toml_extension(path: &Path) -> bool {
    path.extension()
        .and_then(|ext| ext.to_str())
        .map(|ext| ext.eq_ignore_ascii_case("toml"))
        .unwrap_or(false)
}

fn url_is_toml(url: &Url) -> bool {
    has_toml_extension(Path::new(url.path()))
}
