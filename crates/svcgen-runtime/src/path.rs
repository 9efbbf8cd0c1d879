//! Host/path template substitution.

use std::fmt::Display;

use crate::http::encode_component;

/// A host/path template with `{name}` placeholders.
///
/// Placeholders without a value are left in place.
#[derive(Debug, Clone)]
pub struct PathTemplate {
    template: String,
    values: Vec<(String, String)>,
}

impl PathTemplate {
    pub fn new(template: impl Into<String>) -> Self {
        Self {
            template: template.into(),
            values: Vec::new(),
        }
    }

    /// Bind a placeholder. `encoded` marks the value as already encoded, so it
    /// is inserted verbatim; otherwise it is percent-encoded first.
    pub fn with(mut self, name: &str, value: impl Display, encoded: bool) -> Self {
        let value = value.to_string();
        let value = if encoded {
            value
        } else {
            encode_component(&value)
        };
        self.values.push((name.to_string(), value));
        self
    }

    pub fn render(&self) -> String {
        let mut out = String::with_capacity(self.template.len());
        let mut rest = self.template.as_str();
        while let Some(open) = rest.find('{') {
            let Some(len) = rest[open..].find('}') else {
                break;
            };
            let name = &rest[open + 1..open + len];
            out.push_str(&rest[..open]);
            match self.values.iter().find(|(n, _)| n == name) {
                Some((_, value)) => out.push_str(value),
                None => out.push_str(&rest[open..=open + len]),
            }
            rest = &rest[open + len + 1..];
        }
        out.push_str(rest);
        out
    }
}
