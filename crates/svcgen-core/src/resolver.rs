//! Import/name resolution for types referenced by generated code.
//!
//! Every type an interface mentions goes through a [`Resolver`], which maps
//! fully-qualified paths to short, collision-free names and accumulates the
//! [`ImportTable`] the emitter turns into `use` declarations.

use std::collections::{BTreeMap, BTreeSet};

use serde::Serialize;
use syn::{GenericArgument, Path, PathArguments, Type};

use crate::error::{Error, Result};
use crate::utils::to_upper_camel_case;

/// Canonical mapping from fully-qualified type name to short display name.
///
/// Iteration is lexicographic by fully-qualified name.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct ImportTable {
    entries: BTreeMap<String, String>,
}

impl ImportTable {
    pub fn get(&self, fqn: &str) -> Option<&str> {
        self.entries.get(fqn).map(String::as_str)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.entries.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// `use` declarations for every path entry; bare names need none
    pub fn use_declarations(&self) -> Vec<String> {
        self.iter()
            .filter(|(fqn, _)| fqn.contains("::"))
            .map(|(fqn, short)| {
                if last_segment(fqn) == short {
                    format!("use {};", fqn)
                } else {
                    format!("use {} as {};", fqn, short)
                }
            })
            .collect()
    }

    fn insert(&mut self, fqn: String, short: String) {
        self.entries.insert(fqn, short);
    }
}

/// A resolved type reference
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResolvedType {
    /// Short name of the raw type (generic arguments dropped)
    pub short_name: String,
    /// The full type rewritten with short names, for use in signatures
    pub expr: String,
}

impl ResolvedType {
    pub fn is_unit(&self) -> bool {
        self.expr == "()"
    }
}

/// Resolves type references against one generation unit's import table
#[derive(Debug, Default)]
pub struct Resolver {
    imports: ImportTable,
    /// short name -> owning fully-qualified name
    owners: BTreeMap<String, String>,
    reserved: BTreeSet<String>,
}

impl Resolver {
    pub fn new() -> Self {
        Self::default()
    }

    /// Keep `name` from being handed out as a short name
    pub fn reserve(&mut self, name: impl Into<String>) {
        self.reserved.insert(name.into());
    }

    pub fn imports(&self) -> &ImportTable {
        &self.imports
    }

    pub fn into_imports(self) -> ImportTable {
        self.imports
    }

    /// Resolve a type reference written in Rust type syntax
    pub fn resolve(&mut self, type_ref: &str) -> Result<ResolvedType> {
        let ty: Type = syn::parse_str(type_ref)
            .map_err(|e| Error::unresolvable(type_ref, e.to_string()))?;
        self.resolve_type(&ty, type_ref)
    }

    /// Record a plain path (no generic arguments) and return its short name
    pub fn add_import(&mut self, fqn: &str) -> String {
        if let Some(short) = self.imports.get(fqn) {
            return short.to_string();
        }
        let short = if fqn.contains("::") {
            self.allocate_short_name(fqn)
        } else {
            fqn.to_string()
        };
        log::debug!("Import {} as {}", fqn, short);
        self.owners.insert(short.clone(), fqn.to_string());
        self.imports.insert(fqn.to_string(), short.clone());
        short
    }

    fn resolve_type(&mut self, ty: &Type, source: &str) -> Result<ResolvedType> {
        match ty {
            Type::Path(type_path) => {
                if type_path.qself.is_some() {
                    return Err(Error::unresolvable(source, "qualified self types are not supported"));
                }
                self.resolve_path(&type_path.path, source)
            }
            Type::Tuple(tuple) => {
                let elems = tuple
                    .elems
                    .iter()
                    .map(|elem| self.resolve_type(elem, source).map(|r| r.expr))
                    .collect::<Result<Vec<_>>>()?;
                let expr = match elems.len() {
                    0 => "()".to_string(),
                    1 => format!("({},)", elems[0]),
                    _ => format!("({})", elems.join(", ")),
                };
                Ok(ResolvedType {
                    short_name: expr.clone(),
                    expr,
                })
            }
            Type::Reference(reference) => {
                let lifetime = match &reference.lifetime {
                    Some(l) => format!("{} ", static_lifetime(l, source)?),
                    None => String::new(),
                };
                let inner = self.resolve_type(&reference.elem, source)?;
                let mutability = if reference.mutability.is_some() { "mut " } else { "" };
                Ok(ResolvedType {
                    short_name: inner.short_name,
                    expr: format!("&{}{}{}", lifetime, mutability, inner.expr),
                })
            }
            Type::Slice(slice) => {
                let inner = self.resolve_type(&slice.elem, source)?;
                Ok(ResolvedType {
                    short_name: inner.short_name,
                    expr: format!("[{}]", inner.expr),
                })
            }
            Type::Array(array) => {
                let inner = self.resolve_type(&array.elem, source)?;
                let len = match &array.len {
                    syn::Expr::Lit(syn::ExprLit {
                        lit: syn::Lit::Int(int),
                        ..
                    }) => int.base10_digits().to_string(),
                    _ => {
                        return Err(Error::unresolvable(
                            source,
                            "array lengths must be integer literals",
                        ));
                    }
                };
                Ok(ResolvedType {
                    short_name: inner.short_name,
                    expr: format!("[{}; {}]", inner.expr, len),
                })
            }
            Type::Paren(paren) => self.resolve_type(&paren.elem, source),
            Type::Group(group) => self.resolve_type(&group.elem, source),
            _ => Err(Error::unresolvable(
                source,
                "only paths, references, slices, arrays and tuples are supported",
            )),
        }
    }

    fn resolve_path(&mut self, path: &Path, source: &str) -> Result<ResolvedType> {
        let Some(last) = path.segments.last() else {
            return Err(Error::unresolvable(source, "empty path"));
        };
        let last_index = path.segments.len() - 1;
        if path
            .segments
            .iter()
            .take(last_index)
            .any(|segment| !segment.arguments.is_none())
        {
            return Err(Error::unresolvable(
                source,
                "generic arguments are only supported on the last path segment",
            ));
        }

        // The raw path is what gets imported; arguments are resolved on their own
        let mut fqn = path
            .segments
            .iter()
            .map(|segment| segment.ident.to_string())
            .collect::<Vec<_>>()
            .join("::");
        if path.leading_colon.is_some() {
            fqn.insert_str(0, "::");
        }

        let short_name = if path.segments.len() == 1 && path.leading_colon.is_none() {
            self.record_bare(&fqn, source)?
        } else {
            self.add_import(&fqn)
        };

        let arguments = match &last.arguments {
            PathArguments::None => Vec::new(),
            PathArguments::AngleBracketed(args) => args
                .args
                .iter()
                .map(|arg| self.resolve_argument(arg, source))
                .collect::<Result<Vec<_>>>()?,
            PathArguments::Parenthesized(_) => {
                return Err(Error::unresolvable(source, "function traits are not supported"));
            }
        };

        let expr = if arguments.is_empty() {
            short_name.clone()
        } else {
            format!("{}<{}>", short_name, arguments.join(", "))
        };
        Ok(ResolvedType { short_name, expr })
    }

    fn resolve_argument(&mut self, arg: &GenericArgument, source: &str) -> Result<String> {
        match arg {
            GenericArgument::Type(ty) => Ok(self.resolve_type(ty, source)?.expr),
            GenericArgument::Lifetime(lifetime) => static_lifetime(lifetime, source),
            GenericArgument::AssocType(assoc) if assoc.generics.is_none() => Ok(format!(
                "{} = {}",
                assoc.ident,
                self.resolve_type(&assoc.ty, source)?.expr
            )),
            _ => Err(Error::unresolvable(
                source,
                "only type, lifetime and associated type arguments are supported",
            )),
        }
    }

    /// Primitive and in-scope names resolve to themselves
    fn record_bare(&mut self, name: &str, source: &str) -> Result<String> {
        if let Some(owner) = self.owners.get(name) {
            if owner != name {
                return Err(Error::unresolvable(
                    source,
                    format!("'{}' is ambiguous with imported '{}'", name, owner),
                ));
            }
            return Ok(name.to_string());
        }
        Ok(self.add_import(name))
    }

    fn is_free(&self, short: &str) -> bool {
        !self.owners.contains_key(short) && !self.reserved.contains(short)
    }

    /// First come keeps the bare name; later collisions are qualified by
    /// their parent module, then numbered.
    fn allocate_short_name(&self, fqn: &str) -> String {
        let bare = last_segment(fqn);
        if self.is_free(bare) {
            return bare.to_string();
        }

        let parent = fqn
            .trim_start_matches("::")
            .rsplit("::")
            .nth(1)
            .map(to_upper_camel_case)
            .unwrap_or_default();
        let qualified = format!("{}{}", parent, bare);
        if self.is_free(&qualified) {
            return qualified;
        }

        let mut n = 2;
        loop {
            let candidate = format!("{}{}", qualified, n);
            if self.is_free(&candidate) {
                return candidate;
            }
            n += 1;
        }
    }
}

/// Generated signatures declare no generic parameters, so only `'static` is nameable
fn static_lifetime(lifetime: &syn::Lifetime, source: &str) -> Result<String> {
    if lifetime.ident == "static" {
        Ok("'static".to_string())
    } else {
        Err(Error::unresolvable(
            source,
            format!("lifetime '{} is not declared; use an elided or 'static lifetime", lifetime.ident),
        ))
    }
}

fn last_segment(fqn: &str) -> &str {
    fqn.rsplit("::").next().unwrap_or(fqn)
}
