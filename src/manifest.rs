//! JSON module manifests.
//!
//! A manifest declares classes and typedefs the way generated code would
//! (`generic(...)`, `mixin(...)`, lazy signatures) and then evaluates type
//! queries against them:
//!
//! ```json
//! {
//!   "options": { "genericVariance": "invariant" },
//!   "declarations": [
//!     { "kind": "class", "name": "Box", "typeParams": ["T"],
//!       "fields": { "value": "T" }, "methods": { "get": "() => T" } },
//!     { "kind": "typedef", "name": "Getter", "typeParams": ["T"], "type": "() => T" }
//!   ],
//!   "queries": [
//!     { "isSubtype": { "source": "Box<int>", "target": "Box<num>" } },
//!     { "render": { "type": "Getter<Box<String>>" } }
//!   ]
//! }
//! ```
//!
//! Declarations are evaluated top to bottom; a failing declaration aborts
//! the manifest. Each query records its own result or error.

use anyhow::{Context, Result, bail};
use ddcrt_types::{ConfigurationError, TypeId};
use ddcrt_runtime::{ClassBuilder, ClassSignature, MemberKind, Runtime, RuntimeOptions};
use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use std::path::Path;
use std::rc::Rc;
use tracing::{debug, info};

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct Manifest {
    #[serde(default)]
    pub options: RuntimeOptions,
    #[serde(default)]
    pub declarations: Vec<Declaration>,
    #[serde(default)]
    pub queries: Vec<Query>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(tag = "kind", rename_all = "camelCase")]
pub enum Declaration {
    Class(ClassDecl),
    Typedef(TypedefDecl),
}

/// A class declaration. Member maps go from member name to a type
/// expression that may mention the class's type parameters.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct ClassDecl {
    pub name: String,
    #[serde(default)]
    pub type_params: Vec<String>,
    #[serde(default)]
    pub extends: Option<String>,
    #[serde(default)]
    pub mixins: Vec<String>,
    #[serde(default)]
    pub implements: Vec<String>,
    #[serde(default, rename = "abstract")]
    pub is_abstract: bool,
    #[serde(default)]
    pub fields: IndexMap<String, String>,
    #[serde(default)]
    pub methods: IndexMap<String, String>,
    #[serde(default)]
    pub getters: IndexMap<String, String>,
    #[serde(default)]
    pub setters: IndexMap<String, String>,
    #[serde(default)]
    pub constructors: IndexMap<String, String>,
    #[serde(default)]
    pub statics: IndexMap<String, String>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct TypedefDecl {
    pub name: String,
    #[serde(default)]
    pub type_params: Vec<String>,
    #[serde(rename = "type")]
    pub underlying: String,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum Query {
    /// `source <: target`, with the first mismatch when it fails.
    IsSubtype { source: String, target: String },
    /// Canonical display string of a type expression.
    Render {
        #[serde(rename = "type")]
        ty: String,
    },
    /// Instantiate twice and report whether both requests share one class.
    Instantiate {
        #[serde(rename = "type")]
        ty: String,
    },
    /// Declared type of a member.
    MemberType {
        #[serde(rename = "type")]
        ty: String,
        member: String,
        #[serde(default = "MemberKindName::method")]
        kind: MemberKindName,
    },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MemberKindName {
    Constructor,
    Method,
    Getter,
    Setter,
    Field,
    Static,
}

impl MemberKindName {
    fn method() -> Self {
        Self::Method
    }
}

impl From<MemberKindName> for MemberKind {
    fn from(kind: MemberKindName) -> Self {
        match kind {
            MemberKindName::Constructor => MemberKind::Constructor,
            MemberKindName::Method => MemberKind::Method,
            MemberKindName::Getter => MemberKind::Getter,
            MemberKindName::Setter => MemberKind::Setter,
            MemberKindName::Field => MemberKind::Field,
            MemberKindName::Static => MemberKind::Static,
        }
    }
}

/// Outcome of one query.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct QueryResult {
    /// Short human-readable form of the query.
    pub query: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub value: Option<serde_json::Value>,
    /// Extra explanation, e.g. why a subtype test failed.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub detail: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl QueryResult {
    fn ok(query: String, value: serde_json::Value) -> Self {
        Self {
            query,
            value: Some(value),
            detail: None,
            error: None,
        }
    }

    fn failed(query: String, error: impl std::fmt::Display) -> Self {
        Self {
            query,
            value: None,
            detail: None,
            error: Some(error.to_string()),
        }
    }

    pub fn is_error(&self) -> bool {
        self.error.is_some()
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Report {
    pub results: Vec<QueryResult>,
    /// Distinct generic instantiations built while evaluating.
    pub instantiations: usize,
}

impl Report {
    pub fn error_count(&self) -> usize {
        self.results.iter().filter(|r| r.is_error()).count()
    }
}

impl Manifest {
    pub fn from_json(text: &str) -> Result<Self> {
        serde_json::from_str(text).context("invalid manifest")
    }

    pub fn load(path: &Path) -> Result<Self> {
        let text = std::fs::read_to_string(path)
            .with_context(|| format!("failed to read manifest {}", path.display()))?;
        Self::from_json(&text).with_context(|| format!("in {}", path.display()))
    }

    /// Declare everything into `rt`, in order.
    pub fn declare(&self, rt: &Runtime) -> Result<()> {
        for decl in &self.declarations {
            match decl {
                Declaration::Class(class) => declare_class(rt, class)
                    .with_context(|| format!("declaring class '{}'", class.name))?,
                Declaration::Typedef(typedef) => declare_typedef(rt, typedef)
                    .with_context(|| format!("declaring typedef '{}'", typedef.name))?,
            }
        }
        Ok(())
    }

    /// Evaluate in a fresh runtime configured with the manifest's options.
    pub fn evaluate(&self) -> Result<Report> {
        self.evaluate_with(self.options)
    }

    pub fn evaluate_with(&self, options: RuntimeOptions) -> Result<Report> {
        let rt = Runtime::with_options(options);
        let baseline = rt.cache_stats().entries;
        self.declare(&rt)?;
        let results: Vec<QueryResult> = self.queries.iter().map(|q| run_query(&rt, q)).collect();
        let report = Report {
            results,
            instantiations: rt.cache_stats().entries.saturating_sub(baseline),
        };
        info!(
            declarations = self.declarations.len(),
            queries = report.results.len(),
            errors = report.error_count(),
            "manifest evaluated"
        );
        Ok(report)
    }
}

fn check_name(name: &str, rt: &Runtime) -> Result<()> {
    if name.is_empty() {
        bail!("declaration without a name");
    }
    if rt.lookup_type(name).is_some() || rt.lookup_generic(name).is_some() {
        bail!("'{name}' is already declared");
    }
    Ok(())
}

fn scoped(bindings: &[(String, TypeId)]) -> Vec<(&str, TypeId)> {
    bindings.iter().map(|(n, t)| (n.as_str(), *t)).collect()
}

fn bind(params: &[String], args: &[TypeId]) -> Vec<(String, TypeId)> {
    params.iter().cloned().zip(args.iter().copied()).collect()
}

fn declare_class(rt: &Runtime, decl: &ClassDecl) -> Result<()> {
    check_name(&decl.name, rt)?;
    let decl = Rc::new(decl.clone());
    if decl.type_params.is_empty() {
        let class = configure_class(rt, rt.class_builder(&decl.name), &decl, Vec::new())?;
        rt.define_class(class)?;
    } else {
        let params: Vec<&str> = decl.type_params.iter().map(String::as_str).collect();
        let generic_decl = decl.clone();
        rt.generic(&decl.name, &params, move |rt, class, args| {
            let bindings = bind(&generic_decl.type_params, args);
            configure_class(rt, class, &generic_decl, bindings)
        });
    }
    debug!(name = %decl.name, params = decl.type_params.len(), "manifest: class declared");
    Ok(())
}

fn configure_class(
    rt: &Runtime,
    mut class: ClassBuilder,
    decl: &Rc<ClassDecl>,
    bindings: Vec<(String, TypeId)>,
) -> Result<ClassBuilder, ConfigurationError> {
    let names = scoped(&bindings);
    if let Some(extends) = &decl.extends {
        class = class.extends(rt.parse_type_with(extends, &names)?);
    }
    for mixin in &decl.mixins {
        class = class.with_mixin(rt.parse_type_with(mixin, &names)?);
    }
    for interface in &decl.implements {
        class = class.implements(rt.parse_type_with(interface, &names)?);
    }
    if decl.is_abstract {
        class = class.abstract_class();
    }
    for field in decl.fields.keys() {
        class = class.field(field);
    }
    let decl = decl.clone();
    Ok(class.signature(move |rt| class_signature(rt, &decl, &bindings)))
}

fn class_signature(
    rt: &Runtime,
    decl: &ClassDecl,
    bindings: &[(String, TypeId)],
) -> Result<ClassSignature, ConfigurationError> {
    let names = scoped(bindings);
    let parse = |src: &String| rt.parse_type_with(src, &names);
    let mut sig = ClassSignature::new();
    for (name, ty) in &decl.fields {
        sig = sig.with_field(name, parse(ty)?);
    }
    for (name, ty) in &decl.methods {
        sig = sig.with_method(name, parse(ty)?);
    }
    for (name, ty) in &decl.getters {
        sig = sig.with_getter(name, parse(ty)?);
    }
    for (name, ty) in &decl.setters {
        sig = sig.with_setter(name, parse(ty)?);
    }
    for (name, ty) in &decl.constructors {
        sig = sig.with_constructor(name, parse(ty)?);
    }
    for (name, ty) in &decl.statics {
        sig = sig.with_static(name, parse(ty)?);
    }
    Ok(sig)
}

fn declare_typedef(rt: &Runtime, decl: &TypedefDecl) -> Result<()> {
    check_name(&decl.name, rt)?;
    if decl.type_params.is_empty() {
        let underlying = rt.parse_type(&decl.underlying)?;
        rt.typedef(&decl.name, underlying);
    } else {
        let params: Vec<&str> = decl.type_params.iter().map(String::as_str).collect();
        let type_params = decl.type_params.clone();
        let underlying = decl.underlying.clone();
        rt.generic_typedef(&decl.name, &params, move |rt, args| {
            let bindings = bind(&type_params, args);
            rt.parse_type_with(&underlying, &scoped(&bindings))
        });
    }
    debug!(name = %decl.name, "manifest: typedef declared");
    Ok(())
}

fn run_query(rt: &Runtime, query: &Query) -> QueryResult {
    match query {
        Query::IsSubtype { source, target } => {
            let label = format!("{source} <: {target}");
            let parsed = rt
                .parse_type(source)
                .and_then(|s| rt.parse_type(target).map(|t| (s, t)));
            match parsed {
                Ok((s, t)) => {
                    let holds = rt.is_subtype(s, t);
                    let mut result = QueryResult::ok(label, serde_json::Value::Bool(holds));
                    if !holds {
                        result.detail = rt
                            .explain_subtype_failure(s, t)
                            .map(|reason| reason.render(rt.interner()));
                    }
                    result
                }
                Err(e) => QueryResult::failed(label, e),
            }
        }
        Query::Render { ty } => {
            let label = format!("render {ty}");
            match rt.parse_type(ty) {
                Ok(t) => QueryResult::ok(label, serde_json::Value::String(rt.render(t))),
                Err(e) => QueryResult::failed(label, e),
            }
        }
        Query::Instantiate { ty } => {
            let label = format!("instantiate {ty}");
            let twice = rt
                .parse_type(ty)
                .and_then(|first| rt.parse_type(ty).map(|second| (first, second)));
            match twice {
                Ok((first, second)) => QueryResult::ok(
                    label,
                    serde_json::json!({
                        "type": rt.render(first),
                        "typeId": first.0,
                        "shared": first == second,
                    }),
                ),
                Err(e) => QueryResult::failed(label, e),
            }
        }
        Query::MemberType { ty, member, kind } => {
            let label = format!("{ty}.{member}");
            let declared = rt
                .parse_type(ty)
                .and_then(|t| rt.member_type(t, member, (*kind).into()));
            match declared {
                Ok(Some(t)) => QueryResult::ok(label, serde_json::Value::String(rt.render(t))),
                Ok(None) => QueryResult::ok(label, serde_json::Value::Null),
                Err(e) => QueryResult::failed(label, e),
            }
        }
    }
}

#[cfg(test)]
#[path = "tests/manifest_unit_tests.rs"]
mod tests;
