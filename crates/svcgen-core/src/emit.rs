//! Code emission: renders a [`ServiceModel`] into Rust source.
//!
//! The model is flattened into an [`EmitContext`] holding ready-to-print
//! fragments (literals, argument lists, status conditions), which the
//! service template stitches together. Rendering the same model twice yields
//! byte-identical output.

use serde::Serialize;

use crate::error::Result;
use crate::model::{MethodDescriptor, Role, ServiceModel};
use crate::templates::{MOD_TEMPLATE, SERVICE_TEMPLATE, TemplateManager};
use crate::utils::to_snake_case;

/// Template context for one generated file
#[derive(Debug, Clone, Serialize)]
pub struct EmitContext {
    pub interface_fqn: String,
    pub interface_name: String,
    pub impl_name: String,
    /// `use` declarations, one per line
    pub imports: String,
    /// Runtime type short names keyed by canonical name
    pub rt: std::collections::BTreeMap<String, String>,
    pub methods: Vec<MethodContext>,
}

/// Template context for one generated method pair
#[derive(Debug, Clone, Serialize)]
pub struct MethodContext {
    pub name: String,
    pub full_name: String,
    pub name_literal: String,
    pub http_method: String,
    pub http_verb: String,
    pub path: String,
    pub path_literal: String,
    /// `, a: A, b: B` appended after the receiver
    pub params_suffix: String,
    /// `, a, b` appended after the pipeline argument
    pub args_suffix: String,
    pub return_type: String,
    pub is_void: bool,
    pub host_params: Vec<HostContext>,
    pub query_params: Vec<QueryContext>,
    pub headers: Vec<HeaderContext>,
    pub body: Option<BodyContext>,
    pub request_mut: bool,
    pub uses_response: bool,
    pub status_check: Option<String>,
    pub expected_codes: String,
    pub wire_type: String,
}

#[derive(Debug, Clone, Serialize)]
pub struct HostContext {
    pub placeholder_literal: String,
    pub parameter: String,
    pub encoded: bool,
}

#[derive(Debug, Clone, Serialize)]
pub struct QueryContext {
    pub key_literal: String,
    pub parameter: String,
    pub encoded: bool,
    pub multiple: bool,
}

#[derive(Debug, Clone, Serialize)]
pub struct HeaderContext {
    pub name_literal: String,
    /// Expression producing the header value
    pub value: String,
}

#[derive(Debug, Clone, Serialize)]
pub struct BodyContext {
    pub parameter: String,
    pub content_type_literal: String,
}

/// Entry of the generated `mod.rs`
#[derive(Debug, Clone, Serialize)]
pub struct ModuleEntry {
    pub name: String,
    pub impl_name: String,
}

/// Renders service models through the templates
#[derive(Debug, Clone)]
pub struct Emitter {
    templates: TemplateManager,
}

impl Emitter {
    pub fn new(templates: TemplateManager) -> Self {
        Self { templates }
    }

    /// An emitter using only the built-in templates
    pub fn builtin() -> Result<Self> {
        Ok(Self::new(TemplateManager::builtin()?))
    }

    /// Module name of the generated file, `<interface_snake>_impl`
    pub fn module_name(model: &ServiceModel) -> String {
        let trait_name = model
            .interface_fqn
            .rsplit("::")
            .next()
            .unwrap_or(&model.interface_fqn);
        format!("{}_impl", to_snake_case(trait_name))
    }

    /// File name of the generated file
    pub fn file_name(model: &ServiceModel) -> String {
        format!("{}.rs", Self::module_name(model))
    }

    /// Render the implementation of one interface
    pub fn render(&self, model: &ServiceModel) -> Result<String> {
        self.templates.render(SERVICE_TEMPLATE, &Self::context(model))
    }

    /// Render a `mod.rs` declaring `modules` and re-exporting their impls
    pub fn render_mod(&self, modules: &[ModuleEntry]) -> Result<String> {
        self.templates
            .render(MOD_TEMPLATE, &serde_json::json!({ "modules": modules }))
    }

    pub fn context(model: &ServiceModel) -> EmitContext {
        EmitContext {
            interface_fqn: model.interface_fqn.clone(),
            interface_name: model.interface_name.clone(),
            impl_name: model.impl_name.clone(),
            imports: model.imports.use_declarations().join("\n"),
            rt: model.runtime.clone(),
            methods: model.methods.iter().map(method_context).collect(),
        }
    }
}

fn literal(s: &str) -> String {
    format!("{:?}", s)
}

fn method_context(method: &MethodDescriptor) -> MethodContext {
    let params_suffix: String = method
        .parameters
        .iter()
        .map(|p| format!(", {}: {}", p.name, p.type_expr))
        .collect();
    let args_suffix: String = method
        .parameters
        .iter()
        .map(|p| format!(", {}", p.name))
        .collect();

    let host_params = method
        .host_params
        .iter()
        .map(|(placeholder, binding)| HostContext {
            placeholder_literal: literal(placeholder),
            parameter: binding.parameter.clone(),
            encoded: binding.encoded,
        })
        .collect();

    let query_params: Vec<_> = method
        .query_params
        .iter()
        .map(|(key, binding)| QueryContext {
            key_literal: literal(key),
            parameter: binding.parameter.clone(),
            encoded: binding.encoded,
            multiple: binding.multiple,
        })
        .collect();

    // Constant headers first, then parameter headers in declaration order
    let mut headers: Vec<_> = method
        .static_headers
        .iter()
        .map(|(name, value)| HeaderContext {
            name_literal: literal(name),
            value: literal(value),
        })
        .collect();
    headers.extend(method.parameters.iter().filter_map(|p| match &p.role {
        Role::Header { name } => Some(HeaderContext {
            name_literal: literal(name),
            value: format!("{}.to_string()", p.name),
        }),
        _ => None,
    }));

    let body = method.body.as_ref().map(|body| BodyContext {
        parameter: body.parameter_name.clone(),
        content_type_literal: literal(&body.content_type),
    });

    let codes: Vec<String> = method
        .expected_status_codes
        .iter()
        .map(u16::to_string)
        .collect();
    let status_check = match codes.len() {
        0 => None,
        1 => Some(format!("status != {}", codes[0])),
        _ => Some(format!("![{}].contains(&status)", codes.join(", "))),
    };

    let is_void = method.return_type.is_void();
    MethodContext {
        name: method.name.clone(),
        full_name: format!("{}_with_pipeline", method.name),
        name_literal: literal(&method.name),
        http_method: method.http_method.as_str().to_string(),
        http_verb: method.http_method.variant().to_string(),
        path: method.path_template.clone(),
        path_literal: literal(&method.path_template),
        params_suffix,
        args_suffix,
        return_type: method.return_type.expr().to_string(),
        is_void,
        request_mut: !query_params.is_empty() || !headers.is_empty() || body.is_some(),
        uses_response: !is_void || status_check.is_some(),
        host_params,
        query_params,
        headers,
        body,
        status_check,
        expected_codes: codes.join(", "),
        wire_type: match &method.return_wire_type {
            Some(wire) => format!("Some({})", literal(wire)),
            None => "None".to_string(),
        },
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::builder::DescriptorBuilder;
    use crate::interface::InterfaceDocument;

    fn model(yaml: &str) -> ServiceModel {
        let doc = InterfaceDocument::parse_content(yaml).unwrap();
        DescriptorBuilder::new("svcgen_runtime")
            .build(&doc.interfaces[0])
            .unwrap()
            .unwrap()
    }

    fn render(yaml: &str) -> String {
        Emitter::builtin().unwrap().render(&model(yaml)).unwrap()
    }

    /// Source lines with surrounding whitespace removed
    fn lines(source: &str) -> Vec<&str> {
        source.lines().map(str::trim).filter(|l| !l.is_empty()).collect()
    }

    const KEYS: &str = r#"
interfaces:
  - name: crate::service::Keys
    methods:
      - name: get_keys
        request: { method: GET, path: /keys, expected_status_codes: 200 }
        return_type: Vec<String>
        parameters:
          - { name: path, type: String }
          - { name: filter, type: String, query_param: { name: q } }
"#;

    #[test]
    fn test_keys_scenario() {
        let source = render(KEYS);
        let lines = lines(&source);
        let expected = [
            "use crate::service::Keys;",
            "use std::sync::Arc;",
            "use svcgen_runtime::HttpPipeline;",
            "pub struct KeysImpl {",
            "default_pipeline: Arc<dyn HttpPipeline>,",
            "pub fn get_instance(pipeline: Arc<dyn HttpPipeline>) -> Arc<KeysImpl> {",
            "static INSTANCES: InstanceCache<KeysImpl> = InstanceCache::new();",
            "pub fn get_keys_with_pipeline(&self, pipeline: &Arc<dyn HttpPipeline>, path: String, filter: String) -> ServiceResult<Vec<String>> {",
            "let scope = InstrumentationScope::start(\"get_keys\");",
            "let url = PathTemplate::new(\"/keys\")",
            ".render();",
            "let mut request = HttpRequest::new(HttpMethod::Get, url);",
            "request.add_query_param(\"q\", filter.to_string(), false);",
            "let response = pipeline.send(request)?;",
            "if status != 200 {",
            "return Err(ServiceError::unexpected_status(status, &[200]));",
            "<Vec<String> as FromResponse>::from_response(response, None)",
            "impl Keys for KeysImpl {",
            "fn get_keys(&self, path: String, filter: String) -> ServiceResult<Vec<String>> {",
            "self.get_keys_with_pipeline(&self.default_pipeline, path, filter)",
        ];
        for line in expected {
            assert!(lines.contains(&line), "missing `{}` in\n{}", line, source);
        }
        assert!(!source.contains("HttpHeaders"));
        assert!(!source.contains("set_body"));
    }

    #[test]
    fn test_rendering_is_deterministic() {
        assert_eq!(render(KEYS), render(KEYS));
    }

    #[test]
    fn test_status_set_uses_membership() {
        let source = render(
            r#"
interfaces:
  - name: Keys
    methods:
      - name: delete_key
        request: { method: DELETE, path: /keys, expected_status_codes: [204, 200, 201] }
"#,
        );
        let lines = lines(&source);
        assert!(lines.contains(&"if ![200, 201, 204].contains(&status) {"));
        assert!(lines.contains(&"return Err(ServiceError::unexpected_status(status, &[200, 201, 204]));"));
    }

    #[test]
    fn test_void_forwarding_is_not_returned() {
        let source = render(
            r#"
interfaces:
  - name: Keys
    methods:
      - name: purge
        request: { method: POST, path: /purge }
        parameters:
          - { name: b, type: u8 }
          - { name: a, type: u8 }
"#,
        );
        let lines = lines(&source);
        assert!(lines.contains(&"self.purge_with_pipeline(&self.default_pipeline, b, a)?;"));
        assert!(lines.contains(&"Ok(())"));
        assert!(lines.contains(&"pipeline.send(request)?;"));
        assert!(lines.contains(&"let request = HttpRequest::new(HttpMethod::Post, url);"));
        assert!(!source.contains("let response"));
        assert!(!source.contains("ServiceError"));
    }

    #[test]
    fn test_host_header_query_and_body() {
        let source = render(
            r#"
interfaces:
  - name: crate::service::Secrets
    methods:
      - name: set_secret
        request:
          method: PUT
          path: "{vault}/secrets/{name}"
          request_headers: "Accept: application/json"
          expected_status_codes: [200]
          return_value_wire_type: json
        return_type: crate::models::Secret
        parameters:
          - { name: vault, type: String, host_param: { name: vault } }
          - { name: name, type: "&str", host_param: { name: name, encoded: false } }
          - { name: request_id, type: u64, header_param: { name: x-request-id } }
          - { name: tags, type: "Vec<String>", query_param: { name: tag, multiple_query_params: true } }
          - { name: secret, type: crate::models::SecretBundle, body_param: { content_type: application/json } }
"#,
        );
        let lines = lines(&source);
        let expected = [
            "use crate::models::Secret;",
            "use crate::models::SecretBundle;",
            "use svcgen_runtime::HttpHeaders;",
            "use svcgen_runtime::IntoRequestBody;",
            "let url = PathTemplate::new(\"{vault}/secrets/{name}\")",
            ".with(\"name\", &name, false)",
            ".with(\"vault\", &vault, true)",
            "for value in tags.iter() {",
            "request.add_query_param(\"tag\", value.to_string(), false);",
            "let mut headers = HttpHeaders::new();",
            "headers.add(\"Accept\", \"application/json\");",
            "headers.add(\"x-request-id\", request_id.to_string());",
            "request.set_headers(headers);",
            "request.set_body(IntoRequestBody::into_request_body(secret)?, \"application/json\");",
            "<Secret as FromResponse>::from_response(response, Some(\"json\"))",
            "fn set_secret(&self, vault: String, name: &str, request_id: u64, tags: Vec<String>, secret: SecretBundle) -> ServiceResult<Secret> {",
            "self.set_secret_with_pipeline(&self.default_pipeline, vault, name, request_id, tags, secret)",
        ];
        for line in expected {
            assert!(lines.contains(&line), "missing `{}` in\n{}", line, source);
        }
        let accept = source.find("\"Accept\"").unwrap();
        let request_id = source.find("\"x-request-id\"").unwrap();
        assert!(accept < request_id);
    }

    #[test]
    fn test_file_and_module_names() {
        let model = model(
            "interfaces:\n  - name: app::KeyVault\n    methods:\n      - { name: ping, request: { method: HEAD, path: / } }\n",
        );
        assert_eq!(Emitter::module_name(&model), "key_vault_impl");
        assert_eq!(Emitter::file_name(&model), "key_vault_impl.rs");
    }

    #[test]
    fn test_mod_file_lists_modules() {
        let source = Emitter::builtin()
            .unwrap()
            .render_mod(&[
                ModuleEntry {
                    name: "keys_impl".into(),
                    impl_name: "KeysImpl".into(),
                },
                ModuleEntry {
                    name: "secrets_impl".into(),
                    impl_name: "SecretsImpl".into(),
                },
            ])
            .unwrap();
        let lines = lines(&source);
        assert!(lines.contains(&"pub mod keys_impl;"));
        assert!(lines.contains(&"pub mod secrets_impl;"));
        assert!(lines.contains(&"pub use secrets_impl::SecretsImpl;"));
    }
}
