//! Parameter classification.
//!
//! Each parameter's role tags are collapsed into a single [`Role`] and the
//! owning [`MethodDescriptor`] is updated accordingly. When several tags are
//! present the precedence is host, header, query, body, then plain.

use crate::error::{Error, Result};
use crate::interface::ParameterDefinition;
use crate::model::{Body, HostBinding, MethodDescriptor, MethodParameter, QueryBinding, Role};
use crate::resolver::Resolver;

/// Pick the role honored for a parameter
pub fn decide_role(param: &ParameterDefinition) -> Role {
    if let Some(host) = &param.host_param {
        Role::Host {
            name: host.name.clone(),
            encoded: host.encoded,
        }
    } else if let Some(header) = &param.header_param {
        Role::Header {
            name: header.name.clone(),
        }
    } else if let Some(query) = &param.query_param {
        Role::Query {
            name: query.name.clone(),
            encoded: query.encoded,
            multiple: query.multiple_query_params,
        }
    } else if let Some(body) = &param.body_param {
        Role::Body {
            content_type: body.content_type.clone(),
        }
    } else {
        Role::Plain
    }
}

/// Classify one parameter of `method` (declared on `interface`) and record it
pub fn classify(
    interface: &str,
    method: &mut MethodDescriptor,
    param: &ParameterDefinition,
    resolver: &mut Resolver,
) -> Result<()> {
    let resolved = resolver.resolve(&param.type_ref).map_err(|e| {
        Error::schema(
            interface,
            format!("method '{}', parameter '{}': {}", method.name, param.name, e),
        )
    })?;

    let role = decide_role(param);
    if param.tag_count() > 1 {
        log::debug!(
            "{}::{}: parameter '{}' has {} role tags, using {:?}",
            interface,
            method.name,
            param.name,
            param.tag_count(),
            role
        );
    }

    let method_name = method.name.clone();
    let duplicate = |kind: &str, name: &str| {
        Error::schema(
            interface,
            format!(
                "method '{}' binds {} '{}' more than once",
                method_name, kind, name
            ),
        )
    };

    match &role {
        Role::Host { name, encoded } => {
            if method.host_params.contains_key(name) {
                return Err(duplicate("host placeholder", name));
            }
            method.host_params.insert(
                name.clone(),
                HostBinding {
                    parameter: param.name.clone(),
                    encoded: *encoded,
                },
            );
        }
        Role::Header { name } => {
            let taken = method.headers.keys().any(|h| h.eq_ignore_ascii_case(name));
            if taken {
                return Err(duplicate("header", name));
            }
            method.headers.insert(name.clone(), param.name.clone());
        }
        Role::Query {
            name,
            encoded,
            multiple,
        } => {
            if method.query_params.contains_key(name) {
                return Err(duplicate("query parameter", name));
            }
            method.query_params.insert(
                name.clone(),
                QueryBinding {
                    parameter: param.name.clone(),
                    encoded: *encoded,
                    multiple: *multiple,
                },
            );
        }
        Role::Body { content_type } => {
            if method.body.is_some() {
                return Err(Error::MultipleBodies {
                    interface: interface.to_string(),
                    method: method_name.clone(),
                });
            }
            method.body = Some(Body {
                content_type: content_type.clone(),
                parameter_type: resolved.expr.clone(),
                parameter_name: param.name.clone(),
            });
        }
        Role::Plain => {}
    }

    method.parameters.push(MethodParameter {
        name: param.name.clone(),
        type_short_name: resolved.short_name,
        type_expr: resolved.expr,
        role,
    });
    Ok(())
}
