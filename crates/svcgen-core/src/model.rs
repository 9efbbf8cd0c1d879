//! Generation-ready description of a service interface.
//!
//! These values are produced by the [`DescriptorBuilder`](crate::builder::DescriptorBuilder)
//! and consumed read-only by the [`Emitter`](crate::emit::Emitter).

use std::collections::{BTreeMap, BTreeSet};
use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Deserializer, Serialize};

use crate::resolver::ImportTable;

/// HTTP verb of a generated method
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub enum HttpMethod {
    Get,
    Post,
    Put,
    Delete,
    Patch,
    Head,
    Options,
}

impl HttpMethod {
    /// Returns the verb as it appears on the wire
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Get => "GET",
            Self::Post => "POST",
            Self::Put => "PUT",
            Self::Delete => "DELETE",
            Self::Patch => "PATCH",
            Self::Head => "HEAD",
            Self::Options => "OPTIONS",
        }
    }

    /// Name of the matching runtime enum variant
    pub fn variant(&self) -> &'static str {
        match self {
            Self::Get => "Get",
            Self::Post => "Post",
            Self::Put => "Put",
            Self::Delete => "Delete",
            Self::Patch => "Patch",
            Self::Head => "Head",
            Self::Options => "Options",
        }
    }
}

impl FromStr for HttpMethod {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_uppercase().as_str() {
            "GET" => Ok(Self::Get),
            "POST" => Ok(Self::Post),
            "PUT" => Ok(Self::Put),
            "DELETE" => Ok(Self::Delete),
            "PATCH" => Ok(Self::Patch),
            "HEAD" => Ok(Self::Head),
            "OPTIONS" => Ok(Self::Options),
            _ => Err(format!("Unknown HTTP method: {}", s)),
        }
    }
}

impl<'de> Deserialize<'de> for HttpMethod {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        let s = String::deserialize(deserializer)?;
        s.parse().map_err(serde::de::Error::custom)
    }
}

impl fmt::Display for HttpMethod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// The functional purpose of a method parameter, decided once during classification
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", rename_all = "lowercase")]
pub enum Role {
    /// Substituted into `{name}` placeholders of the host/path template
    Host { name: String, encoded: bool },
    /// Sent as a request header
    Header { name: String },
    /// Sent as a query parameter
    Query {
        name: String,
        encoded: bool,
        multiple: bool,
    },
    /// Sent as the request body
    Body { content_type: String },
    /// Passed through untouched
    Plain,
}

/// A parameter of the original interface method
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct MethodParameter {
    pub name: String,
    /// Short name of the raw (non-parameterized) type
    pub type_short_name: String,
    /// Full type as written in generated signatures
    pub type_expr: String,
    pub role: Role,
}

/// The single body parameter of a method
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Body {
    pub content_type: String,
    /// Declared type of the body parameter
    pub parameter_type: String,
    pub parameter_name: String,
}

/// Query parameter binding
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct QueryBinding {
    pub parameter: String,
    pub encoded: bool,
    pub multiple: bool,
}

/// Host/path placeholder binding
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct HostBinding {
    pub parameter: String,
    pub encoded: bool,
}

/// Declared return type of a method
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", rename_all = "lowercase")]
pub enum ReturnType {
    Void,
    Value { short_name: String, expr: String },
}

impl ReturnType {
    pub fn is_void(&self) -> bool {
        matches!(self, Self::Void)
    }

    /// Type as written in generated signatures
    pub fn expr(&self) -> &str {
        match self {
            Self::Void => "()",
            Self::Value { expr, .. } => expr,
        }
    }
}

/// One generated method
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct MethodDescriptor {
    pub name: String,
    pub http_method: HttpMethod,
    pub path_template: String,
    pub return_type: ReturnType,
    /// Every parameter, in declaration order
    pub parameters: Vec<MethodParameter>,
    /// Header name -> parameter name
    pub headers: BTreeMap<String, String>,
    /// Constant headers sent on every request, in declaration order
    pub static_headers: Vec<(String, String)>,
    /// Query key -> binding
    pub query_params: BTreeMap<String, QueryBinding>,
    /// Placeholder name -> binding
    pub host_params: BTreeMap<String, HostBinding>,
    pub body: Option<Body>,
    /// Empty means the status code is not validated
    pub expected_status_codes: BTreeSet<u16>,
    pub return_wire_type: Option<String>,
}

impl MethodDescriptor {
    pub fn new(name: impl Into<String>, http_method: HttpMethod, path_template: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            http_method,
            path_template: path_template.into(),
            return_type: ReturnType::Void,
            parameters: Vec::new(),
            headers: BTreeMap::new(),
            static_headers: Vec::new(),
            query_params: BTreeMap::new(),
            host_params: BTreeMap::new(),
            body: None,
            expected_status_codes: BTreeSet::new(),
            return_wire_type: None,
        }
    }

    /// Parameter names in declaration order, comma separated
    pub fn argument_list(&self) -> String {
        self.parameters
            .iter()
            .map(|p| p.name.as_str())
            .collect::<Vec<_>>()
            .join(", ")
    }
}

/// Everything the emitter needs for one interface
#[derive(Debug, Clone)]
pub struct ServiceModel {
    /// Fully qualified interface path, e.g. `crate::service::Keys`
    pub interface_fqn: String,
    /// Name the interface trait is referred to by in generated code
    pub interface_name: String,
    /// Name of the generated implementation type
    pub impl_name: String,
    pub methods: Vec<MethodDescriptor>,
    pub imports: ImportTable,
    /// Short names of the runtime support types, keyed by their canonical name
    pub runtime: BTreeMap<String, String>,
}
