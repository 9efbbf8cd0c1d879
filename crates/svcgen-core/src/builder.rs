//! Descriptor building: turns one [`InterfaceDefinition`] into a
//! generation-ready [`ServiceModel`].
//!
//! One [`Resolver`] is used per interface. The runtime support types are
//! registered with it first so they keep their bare names in generated code,
//! then the interface itself, then every return and parameter type in
//! declaration order.

use std::collections::{BTreeMap, BTreeSet};

use once_cell::sync::Lazy;
use regex::Regex;

use crate::classify::{classify, decide_role};
use crate::error::{Error, Result};
use crate::interface::{InterfaceDefinition, MethodDefinition, RequestInformation};
use crate::model::{MethodDescriptor, ReturnType, Role, ServiceModel};
use crate::resolver::Resolver;
use crate::utils::is_identifier;

/// `{name}` placeholders in a host/path template
static PLACEHOLDER: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"\{([A-Za-z_][A-Za-z0-9_]*)\}").expect("placeholder pattern"));

/// Locals introduced by generated method bodies
const GENERATED_LOCALS: &[&str] = &[
    "pipeline", "request", "headers", "url", "scope", "response", "status", "value",
];

/// Runtime types every generated file refers to
const ALWAYS_USED: &[&str] = &[
    "HttpMethod",
    "HttpPipeline",
    "HttpRequest",
    "InstanceCache",
    "InstrumentationScope",
    "PathTemplate",
    "ServiceResult",
];

/// Builds [`ServiceModel`]s for the interfaces of a document
#[derive(Debug, Clone)]
pub struct DescriptorBuilder {
    runtime_crate: String,
}

impl DescriptorBuilder {
    /// `runtime_crate` is the path generated code reaches the runtime through,
    /// e.g. `svcgen_runtime` or `crate::rt`
    pub fn new(runtime_crate: impl Into<String>) -> Self {
        Self {
            runtime_crate: runtime_crate.into(),
        }
    }

    pub fn runtime_crate(&self) -> &str {
        &self.runtime_crate
    }

    /// Build the model for `interface`.
    ///
    /// Returns `Ok(None)` when the interface is not a generation target or
    /// has no method carrying request information.
    pub fn build(&self, interface: &InterfaceDefinition) -> Result<Option<ServiceModel>> {
        if !interface.service_interface {
            log::debug!("{} is not marked as a service interface, skipping", interface.name);
            return Ok(None);
        }

        let eligible: Vec<(&MethodDefinition, &RequestInformation)> = interface
            .methods
            .iter()
            .filter_map(|m| m.request.as_ref().map(|r| (m, r)))
            .collect();
        if eligible.is_empty() {
            log::warn!(
                "{} declares no methods with request information, nothing to generate",
                interface.name
            );
            return Ok(None);
        }

        self.validate_runtime_crate()?;

        let trait_name = interface
            .name
            .rsplit("::")
            .next()
            .unwrap_or(&interface.name)
            .to_string();
        if !is_identifier(&trait_name) {
            return Err(Error::schema(
                &interface.name,
                "interface name must be a path ending in an identifier",
            ));
        }
        let impl_name = format!("{}Impl", trait_name);

        let mut resolver = Resolver::new();
        resolver.reserve(impl_name.clone());
        resolver.reserve("Self");

        let runtime = self.register_runtime(&mut resolver, &eligible);

        let interface_name = resolver
            .resolve(&interface.name)
            .map_err(|e| Error::schema(&interface.name, e.to_string()))?;
        if interface_name.expr != interface_name.short_name {
            return Err(Error::schema(
                &interface.name,
                "generic interfaces are not supported",
            ));
        }

        let mut generated_names = BTreeSet::from(["get_instance".to_string(), "new".to_string()]);
        let mut methods = Vec::with_capacity(eligible.len());
        for (method, request) in eligible {
            for name in [method.name.clone(), format!("{}_with_pipeline", method.name)] {
                if !generated_names.insert(name.clone()) {
                    return Err(Error::schema(
                        &interface.name,
                        format!("method '{}' clashes with generated method '{}'", method.name, name),
                    ));
                }
            }
            methods.push(self.build_method(&interface.name, method, request, &mut resolver)?);
        }

        log::debug!(
            "Built {} with {} methods and {} imports",
            impl_name,
            methods.len(),
            resolver.imports().len()
        );

        Ok(Some(ServiceModel {
            interface_fqn: interface.name.clone(),
            interface_name: interface_name.short_name,
            impl_name,
            methods,
            imports: resolver.into_imports(),
            runtime,
        }))
    }

    fn validate_runtime_crate(&self) -> Result<()> {
        let valid = !self.runtime_crate.is_empty()
            && self
                .runtime_crate
                .split("::")
                .all(|segment| is_identifier(segment) || segment == "crate" || segment == "super");
        if valid {
            Ok(())
        } else {
            Err(Error::config(format!(
                "invalid runtime crate path '{}'",
                self.runtime_crate
            )))
        }
    }

    /// Register the runtime types this interface needs, keyed by canonical name
    fn register_runtime(
        &self,
        resolver: &mut Resolver,
        eligible: &[(&MethodDefinition, &RequestInformation)],
    ) -> BTreeMap<String, String> {
        let mut needed: BTreeSet<&str> = ALWAYS_USED.iter().copied().collect();
        for (method, request) in eligible {
            if !request.request_headers.is_empty() {
                needed.insert("HttpHeaders");
            }
            for param in &method.parameters {
                match decide_role(param) {
                    Role::Header { .. } => {
                        needed.insert("HttpHeaders");
                    }
                    Role::Body { .. } => {
                        needed.insert("IntoRequestBody");
                    }
                    _ => {}
                }
            }
            if !is_void(method.return_type.as_deref()) {
                needed.insert("FromResponse");
            }
            if !request.expected_status_codes.is_empty() {
                needed.insert("ServiceError");
            }
        }

        let mut runtime = BTreeMap::new();
        runtime.insert("Arc".to_string(), resolver.add_import("std::sync::Arc"));
        for name in needed {
            let short = resolver.add_import(&format!("{}::{}", self.runtime_crate, name));
            runtime.insert(name.to_string(), short);
        }
        runtime
    }

    fn build_method(
        &self,
        interface: &str,
        method: &MethodDefinition,
        request: &RequestInformation,
        resolver: &mut Resolver,
    ) -> Result<MethodDescriptor> {
        if !is_identifier(&method.name) {
            return Err(Error::schema(
                interface,
                format!("'{}' is not a valid method name", method.name),
            ));
        }

        let mut descriptor = MethodDescriptor::new(&method.name, request.method, &request.path);
        descriptor.return_type = self.return_type(interface, method, resolver)?;
        descriptor.return_wire_type = request.return_value_wire_type.clone();

        for code in &request.expected_status_codes {
            if !(100..=599).contains(code) {
                return Err(Error::schema(
                    interface,
                    format!("method '{}' expects invalid status code {}", method.name, code),
                ));
            }
            descriptor.expected_status_codes.insert(*code);
        }

        for header in &request.request_headers {
            descriptor
                .static_headers
                .push(parse_static_header(interface, &method.name, header)?);
        }

        let mut seen = BTreeSet::new();
        for param in &method.parameters {
            if !is_identifier(&param.name) || GENERATED_LOCALS.contains(&param.name.as_str()) {
                return Err(Error::schema(
                    interface,
                    format!(
                        "method '{}' cannot use '{}' as a parameter name",
                        method.name, param.name
                    ),
                ));
            }
            if !seen.insert(param.name.as_str()) {
                return Err(Error::schema(
                    interface,
                    format!("method '{}' declares parameter '{}' twice", method.name, param.name),
                ));
            }
            classify(interface, &mut descriptor, param, resolver)?;
        }

        for placeholder in unmatched_placeholders(&descriptor) {
            log::warn!(
                "{}::{}: placeholder '{{{}}}' in '{}' has no host parameter and is left as is",
                interface,
                method.name,
                placeholder,
                descriptor.path_template
            );
        }

        Ok(descriptor)
    }

    fn return_type(
        &self,
        interface: &str,
        method: &MethodDefinition,
        resolver: &mut Resolver,
    ) -> Result<ReturnType> {
        let declared = match method.return_type.as_deref() {
            Some(ty) if !is_void(Some(ty)) => ty,
            _ => return Ok(ReturnType::Void),
        };
        let resolved = resolver.resolve(declared).map_err(|e| {
            Error::schema(
                interface,
                format!("method '{}', return type: {}", method.name, e),
            )
        })?;
        if resolved.is_unit() {
            return Ok(ReturnType::Void);
        }
        if resolved.expr.starts_with('&') {
            return Err(Error::schema(
                interface,
                format!("method '{}' must return an owned type", method.name),
            ));
        }
        Ok(ReturnType::Value {
            short_name: resolved.short_name,
            expr: resolved.expr,
        })
    }
}

fn is_void(return_type: Option<&str>) -> bool {
    match return_type {
        None => true,
        Some(ty) => {
            let ty = ty.trim();
            ty.is_empty() || ty.replace(' ', "") == "()"
        }
    }
}

fn parse_static_header(interface: &str, method: &str, header: &str) -> Result<(String, String)> {
    let invalid = || {
        Error::schema(
            interface,
            format!(
                "method '{}': request header '{}' is not in 'Name: value' form",
                method, header
            ),
        )
    };
    let (name, value) = header.split_once(':').ok_or_else(invalid)?;
    let name = name.trim();
    if name.is_empty() || name.contains(char::is_whitespace) {
        return Err(invalid());
    }
    Ok((name.to_string(), value.trim().to_string()))
}

/// Placeholders in the path template no host parameter substitutes
fn unmatched_placeholders(descriptor: &MethodDescriptor) -> Vec<String> {
    PLACEHOLDER
        .captures_iter(&descriptor.path_template)
        .map(|c| c[1].to_string())
        .filter(|name| !descriptor.host_params.contains_key(name))
        .collect()
}
